//! Declaration Model
//!
//! Plain data describing the top-level declarations of one Go source file. A
//! [`File`] is rebuilt from the on-disk text on every generation pass and dropped
//! once the merge engine has produced the next version of that text.

use std::fmt;
use std::ops::Range;

use crate::imports::ImportSet;

/// A `(name, type, value)` triple
///
/// Used uniformly for struct fields, constants, variables and method
/// parameters/results. Imports have their own [`crate::imports::Import`] type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamedTypeValue {
    /// Identifier; `_` for blank parameters
    pub name: String,
    /// Flattened type expression (`*pkg.Type`, `[]int`, `map[string]int`)
    pub ty: String,
    /// Unparsed initializer text, when one was declared
    pub value: Option<String>,
}

impl NamedTypeValue {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: None,
        }
    }

    pub fn with_value(
        name: impl Into<String>,
        ty: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: Some(value.into()),
        }
    }

    /// Whether an initializer was declared
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// A function, a method, or an interface method signature
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Method {
    pub name: String,
    /// Receiver for methods; `None` for free functions and interface methods
    pub receiver: Option<NamedTypeValue>,
    /// Raw body text without the outer braces. Empty for signatures.
    pub body: String,
    pub parameters: Vec<NamedTypeValue>,
    pub results: Vec<NamedTypeValue>,
}

impl Method {
    /// Build a signature-only method (no receiver, no body)
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<NamedTypeValue>,
        results: Vec<NamedTypeValue>,
    ) -> Self {
        Self {
            name: name.into(),
            receiver: None,
            body: String::new(),
            parameters,
            results,
        }
    }

    /// Identity of this declaration within a file
    pub fn id(&self) -> DeclId {
        match &self.receiver {
            Some(recv) => DeclId::method(&self.name, &recv.ty),
            None => DeclId::function(&self.name),
        }
    }

    /// Whether any parameter has exactly the `context.Context` type
    pub fn has_context(&self) -> bool {
        self.parameters.iter().any(|p| p.ty == "context.Context")
    }

    /// Whether any result has the `error` type
    pub fn returns_error(&self) -> bool {
        self.results.iter().any(|r| r.ty == "error")
    }
}

/// A named interface type and its method set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<Method>,
}

impl Interface {
    pub fn new(name: impl Into<String>, methods: Vec<Method>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }
}

/// A named struct type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<NamedTypeValue>,
}

impl Struct {
    pub fn new(name: impl Into<String>, fields: Vec<NamedTypeValue>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// A named function type, e.g. `type Middleware func(FooService) FooService`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncType {
    pub name: String,
    pub parameters: Vec<NamedTypeValue>,
    pub results: Vec<NamedTypeValue>,
}

/// Root of a parse
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
    pub package: String,
    pub imports: ImportSet,
    pub constants: Vec<NamedTypeValue>,
    pub vars: Vec<NamedTypeValue>,
    pub structures: Vec<Struct>,
    pub interfaces: Vec<Interface>,
    pub methods: Vec<Method>,
    pub func_type: Option<FuncType>,
    /// Names of type declarations that are neither struct, interface nor func types
    pub other_types: Vec<String>,
    /// Byte offset just past the package clause
    pub package_end: usize,
    /// Byte ranges of every `import` declaration, in source order
    pub import_decls: Vec<Range<usize>>,
}

impl File {
    /// Find an interface by exact name
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Whether a declaration with this identity is present
    pub fn contains(&self, id: &DeclId) -> bool {
        match id.kind {
            DeclKind::Function | DeclKind::Method => self.methods.iter().any(|m| &m.id() == id),
            DeclKind::Type => {
                self.structures.iter().any(|s| s.name == id.name)
                    || self.interfaces.iter().any(|i| i.name == id.name)
                    || self.func_type.as_ref().is_some_and(|f| f.name == id.name)
                    || self.other_types.iter().any(|t| t == &id.name)
            }
            DeclKind::Var => self.vars.iter().any(|v| v.name == id.name),
            DeclKind::Const => self.constants.iter().any(|c| c.name == id.name),
        }
    }
}

/// Namespace a declaration lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKind {
    /// Free function
    Function,
    /// Function with a receiver
    Method,
    /// Any named type: struct, interface, func type, alias
    Type,
    Var,
    Const,
}

/// Identity of a top-level declaration
///
/// Two declarations are the same when kind, name and (for methods) the owning
/// type agree. The owner is stored without pointer stars or whitespace so `*foo`
/// and `foo` receivers collide, as they do in Go's method sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId {
    pub kind: DeclKind,
    pub name: String,
    pub owner: Option<String>,
}

impl DeclId {
    pub fn function(name: &str) -> Self {
        Self {
            kind: DeclKind::Function,
            name: name.to_string(),
            owner: None,
        }
    }

    pub fn method(name: &str, receiver_type: &str) -> Self {
        Self {
            kind: DeclKind::Method,
            name: name.to_string(),
            owner: Some(normalize_owner(receiver_type)),
        }
    }

    pub fn type_decl(name: &str) -> Self {
        Self {
            kind: DeclKind::Type,
            name: name.to_string(),
            owner: None,
        }
    }

    pub fn var(name: &str) -> Self {
        Self {
            kind: DeclKind::Var,
            name: name.to_string(),
            owner: None,
        }
    }

    pub fn constant(name: &str) -> Self {
        Self {
            kind: DeclKind::Const,
            name: name.to_string(),
            owner: None,
        }
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "({owner}).{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

fn normalize_owner(receiver_type: &str) -> String {
    receiver_type
        .chars()
        .filter(|c| *c != '*' && !c.is_whitespace())
        .collect()
}
