//! Case conversion and name synthesis
//!
//! Identifiers in generated code are derived from the user's service and method
//! names. These helpers are the single place that decides their spelling.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::imports::{Import, ImportSet};
use crate::parser::NamedTypeValue;

/// `pkg.` qualifier at the start of a selector type, not preceded by another selector
#[allow(clippy::expect_used)]
static QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^.\w])([A-Za-z_]\w*)\.[A-Za-z_]").expect("qualifier regex should be valid")
});

/// Exported identifier not already qualified by a package
#[allow(clippy::expect_used)]
static LOCAL_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^.\w]|\.\.\.)([A-Z]\w*)").expect("local type regex should be valid")
});

/// Split on every non-alphanumeric character and upper-case the first letter of
/// each word, leaving the rest untouched
///
/// `"test -to camel Case"` -> `"TestToCamelCase"`
pub fn to_camel_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(to_upper_first)
        .collect()
}

/// [`to_camel_case`] with a lower-case first letter
///
/// `"test -to lowerCamel Case"` -> `"testToLowerCamelCase"`
pub fn to_lower_first_camel_case(s: &str) -> String {
    to_lower_first(&to_camel_case(s))
}

/// Lower-case snake form of the camel-cased input
///
/// An underscore goes before each upper-case letter that follows a lower-case
/// letter or a digit: `"test -to lowerCamel Case"` -> `"test_to_lower_camel_case"`,
/// `"t es_t"` -> `"tes_t"`.
pub fn to_lower_snake_case(s: &str) -> String {
    let camel = to_camel_case(s);
    let mut out = String::with_capacity(camel.len() + 4);
    let mut prev: Option<char> = None;
    for c in camel.chars() {
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    out
}

pub fn to_upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn to_lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Service interface name: `"foo"` -> `"FooService"`
pub fn interface_name(service: &str) -> String {
    to_camel_case(&format!("{service}Service"))
}

/// Service implementation struct: `"foo"` with prefix `basic` -> `"basicFooService"`
pub fn service_struct_name(service: &str, prefix: &str) -> String {
    to_lower_first_camel_case(&format!("{prefix}-{}", interface_name(service)))
}

/// HTTP route for a method: `"GetUserName"` -> `"/get-user-name"`
pub fn url_path(method: &str) -> String {
    format!("/{}", to_lower_snake_case(method).replace('_', "-"))
}

/// Short variable name derived from `sample` that does not collide with any
/// name in `exclude`
///
/// Starts with the first letter of the lower-camel sample and grows the prefix
/// one character at a time; when the whole sample is taken a numeric suffix is
/// added.
pub fn generate_name_by_sample(sample: &str, exclude: &[NamedTypeValue]) -> String {
    let base = to_lower_first_camel_case(sample);
    let taken = |name: &str| exclude.iter().any(|v| v.name == name);
    let chars: Vec<char> = base.chars().collect();
    for len in 1..=chars.len() {
        let name: String = chars[..len].iter().collect();
        if !taken(&name) {
            return name;
        }
    }
    let stem = if base.is_empty() { "v" } else { base.as_str() };
    let mut n = 1usize;
    loop {
        let name = format!("{stem}{n}");
        if !taken(&name) {
            return name;
        }
        n += 1;
    }
}

/// Package qualifiers referenced by a type expression, in order of appearance
///
/// `map[string]*kit.Foo` -> `["kit"]`. Variadic and composite types are
/// searched as well.
pub fn qualifiers(ty: &str) -> Vec<String> {
    let ty = ty.replace("...", " ");
    let mut out: Vec<String> = Vec::new();
    for cap in QUALIFIER.captures_iter(&ty) {
        if let Some(q) = cap.get(1) {
            if !out.iter().any(|o| o == q.as_str()) {
                out.push(q.as_str().to_string());
            }
        }
    }
    out
}

/// Imports from `available` that a type expression needs
pub fn qualifier_imports(ty: &str, available: &ImportSet) -> Vec<Import> {
    qualifiers(ty)
        .iter()
        .filter_map(|q| available.binding(q).cloned())
        .collect()
}

/// Prefix every unqualified exported type name in `ty` with `package.`
///
/// Used when a type declared next to the service interface is referenced from
/// another package: `*Hi` -> `*service.Hi`, `map[string]Item` ->
/// `map[string]service.Item`. Qualified names and builtins stay as they are.
pub fn qualify_local_types(ty: &str, package: &str) -> String {
    LOCAL_TYPE
        .replace_all(ty, |caps: &regex::Captures<'_>| {
            format!("{}{package}.{}", &caps[1], &caps[2])
        })
        .into_owned()
}

/// Import path of the project root
///
/// The configured module wins. Otherwise the working directory (plus the
/// optional project folder) is made relative to `$GOPATH/src`.
pub fn project_import_path(
    module: Option<&str>,
    gopath: Option<&str>,
    cwd: &Path,
    folder: Option<&str>,
) -> String {
    if let Some(module) = module.filter(|m| !m.is_empty()) {
        return module.trim_end_matches('/').to_string();
    }
    let mut pwd = cwd.to_string_lossy().replace('\\', "/");
    if let Some(folder) = folder.filter(|f| !f.is_empty()) {
        pwd = format!("{}/{}", pwd.trim_end_matches('/'), folder.trim_matches('/'));
    }
    let Some(gopath) = gopath.filter(|g| !g.is_empty()) else {
        return pwd.trim_start_matches('/').to_string();
    };
    let gosrc = format!("{}/src/", gopath.replace('\\', "/").trim_end_matches('/'));
    pwd.strip_prefix(&gosrc)
        .map(str::to_string)
        .unwrap_or_else(|| pwd.trim_start_matches('/').to_string())
}

/// Expand a `%s` path template with the lower-snake service name
pub fn fill_template(template: &str, service: &str) -> String {
    template
        .replace("%s", &to_lower_snake_case(service))
        .replace('\\', "/")
}

/// Import path of a package laid out by `template` for `service`
pub fn import_path(project: &str, template: &str, service: &str) -> String {
    let rel = fill_template(template, service);
    if project.is_empty() {
        rel
    } else {
        format!("{}/{rel}", project.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_camel_case("test -to camel Case"), "TestToCamelCase");
        assert_eq!(
            to_lower_first_camel_case("test -to lowerCamel Case"),
            "testToLowerCamelCase"
        );
        assert_eq!(
            to_lower_snake_case("test -to lowerCamel Case"),
            "test_to_lower_camel_case"
        );
        assert_eq!(to_upper_first("test"), "Test");
    }

    #[test]
    fn test_case_conversion_edge_cases() {
        assert_eq!(to_camel_case("t es_t"), "TEsT");
        assert_eq!(to_lower_snake_case("t es_t"), "tes_t");
        assert_eq!(to_lower_snake_case("HTTPServer2Go"), "httpserver2_go");
        assert_eq!(to_lower_first_camel_case("a"), "a");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_service_names() {
        assert_eq!(interface_name("foo"), "FooService");
        assert_eq!(interface_name("user-account"), "UserAccountService");
        assert_eq!(service_struct_name("foo", "basic"), "basicFooService");
        assert_eq!(url_path("Bar"), "/bar");
        assert_eq!(url_path("GetUserName"), "/get-user-name");
    }

    #[test]
    fn test_generate_name_by_sample() {
        let exclude = vec![
            NamedTypeValue::new("b", "int"),
            NamedTypeValue::new("ba", "string"),
        ];
        assert_eq!(generate_name_by_sample("basicFooService", &[]), "b");
        assert_eq!(generate_name_by_sample("basicFooService", &exclude), "bas");
        let all = vec![NamedTypeValue::new("a", "int")];
        assert_eq!(generate_name_by_sample("a", &all), "a1");
    }

    #[test]
    fn test_qualifiers_and_imports() {
        assert_eq!(qualifiers("map[string]*kit.Foo"), vec!["kit"]);
        assert_eq!(qualifiers("...io.Reader"), vec!["io"]);
        assert!(qualifiers("[]string").is_empty());

        let available: ImportSet = vec![
            Import::aliased("ct", "context"),
            Import::new("github.com/acme/kit"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            qualifier_imports("ct.Context", &available),
            vec![Import::aliased("ct", "context")]
        );
        assert!(qualifier_imports("string", &available).is_empty());
    }

    #[test]
    fn test_qualify_local_types() {
        assert_eq!(qualify_local_types("*Hi", "service"), "*service.Hi");
        assert_eq!(
            qualify_local_types("map[Key]Value", "service"),
            "map[service.Key]service.Value"
        );
        assert_eq!(qualify_local_types("pkg.Type", "service"), "pkg.Type");
        assert_eq!(qualify_local_types("string", "service"), "string");
        assert_eq!(qualify_local_types("...Item", "service"), "...service.Item");
    }

    #[test]
    fn test_import_paths() {
        let cwd = Path::new("/home/me/go/src/github.com/me/project");
        assert_eq!(
            project_import_path(None, Some("/home/me/go"), cwd, None),
            "github.com/me/project"
        );
        assert_eq!(
            project_import_path(None, Some("/home/me/go"), cwd, Some("app")),
            "github.com/me/project/app"
        );
        assert_eq!(
            project_import_path(Some("example.com/mod"), Some("/home/me/go"), cwd, None),
            "example.com/mod"
        );
        assert_eq!(
            import_path("example.com/mod", "%s/pkg/service", "UserAccount"),
            "example.com/mod/user_account/pkg/service"
        );
    }
}
