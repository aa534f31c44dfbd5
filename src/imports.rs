//! # Import sets
//!
//! [`Import`] and [`ImportSet`] are the value types the merge engine reconciles.
//! They know nothing about parsing or printing whole files: the parser fills an
//! [`ImportSet`], generators declare the imports each fragment needs, and
//! [`reconcile`] decides which imports to add and which qualifiers in freshly
//! rendered text must be rewritten.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// One import spec: an optional alias and an unquoted path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Import {
    pub alias: Option<String>,
    pub path: String,
}

impl Import {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// Package name an unaliased import of `path` binds
    ///
    /// The last path element, skipping a trailing major-version element such as
    /// `v2`. Hyphens and dots cannot appear in identifiers, so `go-kit` and
    /// `gopkg.in/yaml.v3` fall back to the part before them.
    pub fn default_name(path: &str) -> String {
        let mut segments = path.rsplit('/');
        let mut last = segments.next().unwrap_or(path);
        if is_major_version(last) {
            if let Some(prev) = segments.next() {
                last = prev;
            }
        }
        let last = last.split('.').next().unwrap_or(last);
        last.rsplit('-').next().unwrap_or(last).to_string()
    }

    /// Qualifier this import binds in file scope
    pub fn name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => Self::default_name(&self.path),
        }
    }

    /// Blank (`_`) and dot (`.`) imports bind no qualifier
    pub fn binds_qualifier(&self) -> bool {
        !matches!(self.alias.as_deref(), Some("_") | Some("."))
    }

    /// Standard-library paths have no dot in their first element
    pub fn is_std(&self) -> bool {
        let first = self.path.split('/').next().unwrap_or(&self.path);
        !first.contains('.')
    }

    /// Whether this existing import already provides `required`
    ///
    /// Both must name the same path. Aliases must then agree exactly, except that
    /// an unaliased import satisfies a requirement whose alias equals the name the
    /// path binds by default.
    pub fn satisfies(&self, required: &Import) -> bool {
        if self.path != required.path {
            return false;
        }
        if self.alias == required.alias {
            return true;
        }
        match (&self.alias, &required.alias) {
            (None, Some(alias)) => *alias == Self::default_name(&self.path),
            (Some(alias), None) => *alias == Self::default_name(&self.path),
            _ => false,
        }
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias} \"{}\"", self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

fn is_major_version(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

/// Ordered import list, unique by `(alias, path)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportSet {
    items: Vec<Import>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Import> {
        self.items.iter()
    }

    pub fn contains(&self, import: &Import) -> bool {
        self.items.contains(import)
    }

    /// Add `import` unless an identical spec is present. Returns whether it was added.
    pub fn insert(&mut self, import: Import) -> bool {
        if self.contains(&import) {
            return false;
        }
        self.items.push(import);
        true
    }

    /// Insert every import of `other`, preserving its order
    pub fn merge(&mut self, other: &ImportSet) {
        for import in other.iter() {
            self.insert(import.clone());
        }
    }

    /// First import of `path` that binds a usable qualifier
    pub fn find_by_path(&self, path: &str) -> Option<&Import> {
        self.items
            .iter()
            .find(|i| i.path == path && i.binds_qualifier())
    }

    /// Import bound to qualifier `name`
    pub fn binding(&self, name: &str) -> Option<&Import> {
        self.items
            .iter()
            .find(|i| i.binds_qualifier() && i.name() == name)
    }

    /// Every qualifier bound by this set
    pub fn names(&self) -> HashSet<String> {
        self.items
            .iter()
            .filter(|i| i.binds_qualifier())
            .map(Import::name)
            .collect()
    }

    /// Imports of `self` that `existing` does not already satisfy
    ///
    /// An empty `existing` set cannot be trusted to satisfy anything, so every
    /// import is reported missing.
    pub fn missing_from(&self, existing: &ImportSet) -> ImportSet {
        if existing.is_empty() {
            return self.clone();
        }
        self.items
            .iter()
            .filter(|r| !existing.iter().any(|e| e.satisfies(r)))
            .cloned()
            .collect()
    }

    /// Rename the alias of every import bound to `from`
    pub fn rename(&mut self, from: &str, to: &str) {
        for import in self.items.iter_mut() {
            if import.binds_qualifier() && import.name() == from {
                import.alias = Some(to.to_string());
            }
        }
    }

    /// Parenthesised import declaration: standard library first, a blank line,
    /// then everything else, each group sorted by path. Empty for an empty set.
    pub fn render_block(&self) -> String {
        if self.items.is_empty() {
            return String::new();
        }
        let (mut std, mut rest): (Vec<&Import>, Vec<&Import>) =
            self.items.iter().partition(|i| i.is_std());
        std.sort_by(|a, b| (&a.path, &a.alias).cmp(&(&b.path, &b.alias)));
        rest.sort_by(|a, b| (&a.path, &a.alias).cmp(&(&b.path, &b.alias)));

        let mut out = String::from("import (\n");
        for import in &std {
            out.push_str(&format!("\t{import}\n"));
        }
        if !std.is_empty() && !rest.is_empty() {
            out.push('\n');
        }
        for import in &rest {
            out.push_str(&format!("\t{import}\n"));
        }
        out.push_str(")\n");
        out
    }
}

impl FromIterator<Import> for ImportSet {
    fn from_iter<T: IntoIterator<Item = Import>>(iter: T) -> Self {
        let mut set = ImportSet::new();
        for import in iter {
            set.insert(import);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ImportSet {
    type Item = &'a Import;
    type IntoIter = std::slice::Iter<'a, Import>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Outcome of reconciling required imports against an existing file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Imports to add to the file
    pub additions: ImportSet,
    /// Qualifier rewrites to apply to the new text, old name to new name
    pub renames: BTreeMap<String, String>,
}

/// Decide how the imports `required` by new text fit into `existing`
///
/// * A requirement already satisfied is dropped.
/// * A path already imported under another name is reused: the new text's
///   qualifier is rewritten to the existing name.
/// * A name already bound to a different path, or present in `reserved`
///   (top-level identifiers of the file), is renumbered to the smallest free
///   `name1`, `name2`, … and the new text rewritten to match.
pub fn reconcile(
    existing: &ImportSet,
    required: &ImportSet,
    reserved: &HashSet<String>,
) -> Reconciliation {
    let mut out = Reconciliation::default();
    if existing.is_empty() {
        out.additions = required.clone();
        return out;
    }

    let mut taken: HashSet<String> = existing.names();
    taken.extend(reserved.iter().cloned());
    taken.extend(required.names());

    for import in required.missing_from(existing).iter() {
        if !import.binds_qualifier() {
            if existing.iter().all(|e| e.path != import.path) {
                out.additions.insert(import.clone());
            }
            continue;
        }
        let name = import.name();
        if let Some(found) = existing.find_by_path(&import.path) {
            let existing_name = found.name();
            if existing_name != name {
                out.renames.insert(name, existing_name);
            }
            continue;
        }
        let collides = existing.binding(&name).is_some() || reserved.contains(&name);
        if !collides {
            out.additions.insert(import.clone());
            continue;
        }
        let fresh = (1..)
            .map(|n| format!("{name}{n}"))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| format!("{name}_"));
        taken.insert(fresh.clone());
        out.additions
            .insert(Import::aliased(fresh.clone(), import.path.clone()));
        out.renames.insert(name, fresh);
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn set(items: &[(&str, &str)]) -> ImportSet {
        items
            .iter()
            .map(|(alias, path)| {
                if alias.is_empty() {
                    Import::new(*path)
                } else {
                    Import::aliased(*alias, *path)
                }
            })
            .collect()
    }

    #[test]
    fn test_default_names() {
        assert_eq!(Import::default_name("context"), "context");
        assert_eq!(Import::default_name("net/http"), "http");
        assert_eq!(Import::default_name("github.com/go-kit/kit/log"), "log");
        assert_eq!(Import::default_name("github.com/foo/bar/v2"), "bar");
        assert_eq!(Import::default_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(Import::default_name("github.com/oklog/go-group"), "group");
    }

    #[test]
    fn test_insert_dedups_by_alias_and_path() {
        let mut imports = ImportSet::new();
        assert!(imports.insert(Import::new("fmt")));
        assert!(!imports.insert(Import::new("fmt")));
        assert!(imports.insert(Import::aliased("f", "fmt")));
        assert_eq!(imports.len(), 2);
    }

    #[test]
    fn test_unaliased_import_satisfies_default_alias() {
        let existing = Import::new("net/http");
        assert!(existing.satisfies(&Import::aliased("http", "net/http")));
        assert!(!existing.satisfies(&Import::aliased("stdhttp", "net/http")));
        assert!(!existing.satisfies(&Import::new("github.com/go-kit/kit/transport/http")));
    }

    #[test]
    fn test_missing_from_empty_existing_reports_everything() {
        let required = set(&[("", "context"), ("", "fmt")]);
        assert_eq!(required.missing_from(&ImportSet::new()), required);

        let existing = set(&[("", "context")]);
        assert_eq!(required.missing_from(&existing), set(&[("", "fmt")]));
    }

    #[test]
    fn test_render_block_groups_std_first() {
        let imports = set(&[
            ("http1", "github.com/go-kit/kit/transport/http"),
            ("", "net/http"),
            ("", "context"),
            ("", "github.com/go-kit/kit/endpoint"),
        ]);
        assert_eq!(
            imports.render_block(),
            "import (\n\t\"context\"\n\t\"net/http\"\n\n\t\"github.com/go-kit/kit/endpoint\"\n\thttp1 \"github.com/go-kit/kit/transport/http\"\n)\n"
        );
        assert_eq!(ImportSet::new().render_block(), "");
    }

    #[test]
    fn test_reconcile_renumbers_colliding_name() {
        let existing = set(&[("", "net/http")]);
        let required = set(&[("", "github.com/go-kit/kit/transport/http")]);
        let result = reconcile(&existing, &required, &HashSet::new());
        assert_eq!(
            result.additions,
            set(&[("http1", "github.com/go-kit/kit/transport/http")])
        );
        assert_eq!(result.renames.get("http").map(String::as_str), Some("http1"));
    }

    #[test]
    fn test_reconcile_skips_taken_numbers() {
        let existing = set(&[("", "net/http"), ("http1", "example.com/other/http")]);
        let required = set(&[("", "github.com/go-kit/kit/transport/http")]);
        let result = reconcile(&existing, &required, &HashSet::new());
        assert_eq!(result.renames.get("http").map(String::as_str), Some("http2"));
    }

    #[test]
    fn test_reconcile_reuses_existing_alias_for_same_path() {
        let existing = set(&[("kithttp", "github.com/go-kit/kit/transport/http")]);
        let required = set(&[
            ("", "github.com/go-kit/kit/transport/http"),
            ("", "context"),
        ]);
        let result = reconcile(&existing, &required, &HashSet::new());
        assert_eq!(result.additions, set(&[("", "context")]));
        assert_eq!(
            result.renames.get("http").map(String::as_str),
            Some("kithttp")
        );
    }

    #[test]
    fn test_reconcile_with_swapped_aliases() {
        // existing binds http to the go-kit package and http1 to net/http
        let existing = set(&[
            ("http", "github.com/go-kit/kit/transport/http"),
            ("http1", "net/http"),
        ]);
        let required = set(&[
            ("", "net/http"),
            ("http1", "github.com/go-kit/kit/transport/http"),
        ]);
        let result = reconcile(&existing, &required, &HashSet::new());
        assert!(result.additions.is_empty());
        assert_eq!(result.renames.get("http").map(String::as_str), Some("http1"));
        assert_eq!(result.renames.get("http1").map(String::as_str), Some("http"));
    }

    #[test]
    fn test_reconcile_avoids_reserved_identifiers() {
        let existing = set(&[("", "fmt")]);
        let required = set(&[("", "github.com/acme/svc/pkg/endpoint")]);
        let reserved: HashSet<String> = ["endpoint".to_string()].into_iter().collect();
        let result = reconcile(&existing, &required, &reserved);
        assert_eq!(
            result.additions,
            set(&[("endpoint1", "github.com/acme/svc/pkg/endpoint")])
        );
    }
}
