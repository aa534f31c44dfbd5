//! Method-set filter
//!
//! Every generator narrows the service interface through [`filter_methods`]
//! before synthesizing anything, so all artifacts of one service agree on the
//! method set.

use std::fmt;

use tracing::warn;

use crate::parser::Method;

/// Why a method is left out of generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// An explicit method list was given and does not name this method
    NotRequested,
    /// First letter is not upper-case
    Unexported,
    /// Declares no results
    NoResults,
    /// No parameter of type exactly `context.Context`
    NoContext,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::NotRequested => write!(f, "is not in the requested method list"),
            Exclusion::Unexported => write!(f, "is private"),
            Exclusion::NoResults => write!(f, "does not have any return value"),
            Exclusion::NoContext => write!(f, "does not have a context"),
        }
    }
}

/// Check a single method; the first failing rule wins
pub fn check(method: &Method, allow: &[String]) -> Result<(), Exclusion> {
    if !allow.is_empty() && !allow.iter().any(|m| *m == method.name) {
        return Err(Exclusion::NotRequested);
    }
    if !method.name.chars().next().is_some_and(char::is_uppercase) {
        return Err(Exclusion::Unexported);
    }
    if method.results.is_empty() {
        return Err(Exclusion::NoResults);
    }
    if !method.has_context() {
        return Err(Exclusion::NoContext);
    }
    Ok(())
}

/// Methods eligible for generation, in declaration order
///
/// `allow` restricts the result to the named methods when non-empty. Methods
/// dropped for any reason other than the allow-list are reported with a warning.
pub fn filter_methods(methods: &[Method], allow: &[String]) -> Vec<Method> {
    methods
        .iter()
        .filter(|m| match check(m, allow) {
            Ok(()) => true,
            Err(Exclusion::NotRequested) => false,
            Err(reason) => {
                warn!("The method '{}' {reason} and will be ignored", m.name);
                false
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::parser::NamedTypeValue;

    fn method(name: &str, ctx: bool, results: bool) -> Method {
        let mut params = Vec::new();
        if ctx {
            params.push(NamedTypeValue::new("ctx", "context.Context"));
        }
        params.push(NamedTypeValue::new("a", "int"));
        let results = if results {
            vec![
                NamedTypeValue::new("r", "string"),
                NamedTypeValue::new("err", "error"),
            ]
        } else {
            Vec::new()
        };
        Method::new(name, params, results)
    }

    fn names(methods: &[Method]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_only_eligible_methods_survive() {
        let methods = vec![
            method("Foo", true, true),
            method("bar", false, true),
            method("Baz", false, true),
            method("Qux", true, false),
        ];
        assert_eq!(names(&filter_methods(&methods, &[])), vec!["Foo"]);
    }

    #[test]
    fn test_first_failing_rule_wins() {
        assert_eq!(
            check(&method("bar", false, false), &[]),
            Err(Exclusion::Unexported)
        );
        assert_eq!(
            check(&method("Qux", false, false), &[]),
            Err(Exclusion::NoResults)
        );
        assert_eq!(
            check(&method("Baz", false, true), &[]),
            Err(Exclusion::NoContext)
        );
        assert_eq!(
            check(&method("Foo", true, true), &["Other".to_string()]),
            Err(Exclusion::NotRequested)
        );
    }

    #[test]
    fn test_allow_list_preserves_declaration_order() {
        let methods = vec![
            method("A", true, true),
            method("B", true, true),
            method("C", true, true),
        ];
        let allow = vec!["C".to_string(), "A".to_string()];
        assert_eq!(names(&filter_methods(&methods, &allow)), vec!["A", "C"]);
    }

    #[test]
    fn test_aliased_context_is_not_a_context() {
        let m = Method::new(
            "Foo",
            vec![NamedTypeValue::new("ctx", "ct.Context")],
            vec![NamedTypeValue::new("err", "error")],
        );
        assert_eq!(check(&m, &[]), Err(Exclusion::NoContext));
    }
}
