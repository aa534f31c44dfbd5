//! # Code emission
//!
//! Structured Go declarations and the printer that turns them into
//! gofmt-shaped text: tab indentation, aligned struct fields and tags, aligned
//! keyed literals. Generators build [`Decl`] values; the merge engine renders
//! only those that survive duplicate suppression.

use crate::imports::ImportSet;
use crate::parser::{DeclId, NamedTypeValue};

/// One statement line or nested block inside a function body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// A single line, printed at the current indentation
    Line(String),
    /// `open` line, body indented one level, `close` line
    Block {
        open: String,
        body: Vec<Stmt>,
        close: String,
    },
    /// `key: value,` pairs with values aligned
    KeyValues(Vec<(String, String)>),
    /// `// text`
    Comment(String),
    Blank,
}

impl Stmt {
    pub fn line(text: impl Into<String>) -> Self {
        Stmt::Line(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Stmt::Comment(text.into())
    }

    /// `open {` ... `}`
    pub fn block(open: impl Into<String>, body: Vec<Stmt>) -> Self {
        Stmt::Block {
            open: format!("{} {{", open.into()),
            body,
            close: "}".to_string(),
        }
    }

    /// Block with explicit opening and closing lines, e.g. `return Foo{` / `}`
    pub fn wrapped(open: impl Into<String>, body: Vec<Stmt>, close: impl Into<String>) -> Self {
        Stmt::Block {
            open: open.into(),
            body,
            close: close.into(),
        }
    }

    fn render(&self, depth: usize, out: &mut String) {
        let indent = "\t".repeat(depth);
        match self {
            Stmt::Line(text) => {
                for line in text.lines() {
                    push_line(out, &indent, line);
                }
            }
            Stmt::Comment(text) => push_line(out, &indent, &format!("// {text}")),
            Stmt::Blank => out.push('\n'),
            Stmt::Block { open, body, close } => {
                push_line(out, &indent, open);
                for stmt in body {
                    stmt.render(depth + 1, out);
                }
                push_line(out, &indent, close);
            }
            Stmt::KeyValues(pairs) => {
                let width = pairs.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
                for (key, value) in pairs {
                    let key = format!("{key}:");
                    push_line(out, &indent, &format!("{key:<width$} {value},"));
                }
            }
        }
    }
}

fn push_line(out: &mut String, indent: &str, text: &str) {
    if text.is_empty() {
        out.push('\n');
    } else {
        out.push_str(indent);
        out.push_str(text);
        out.push('\n');
    }
}

/// Struct field; an empty name means an embedded type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub tag: Option<String>,
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Func {
    pub doc: Vec<String>,
    pub receiver: Option<NamedTypeValue>,
    pub name: String,
    pub params: Vec<NamedTypeValue>,
    pub results: Vec<NamedTypeValue>,
    /// Print result names, `(r string, err error)`
    pub named_results: bool,
    pub body: Vec<Stmt>,
}

impl Func {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    pub fn receiver(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.receiver = Some(NamedTypeValue::new(name, ty));
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push(NamedTypeValue::new(name, ty));
        self
    }

    pub fn params(mut self, params: &[NamedTypeValue]) -> Self {
        self.params.extend(params.iter().cloned());
        self
    }

    /// Unnamed result
    pub fn result(mut self, ty: impl Into<String>) -> Self {
        self.results.push(NamedTypeValue::new("", ty));
        self
    }

    pub fn named_results(mut self, results: &[NamedTypeValue]) -> Self {
        self.results.extend(results.iter().cloned());
        self.named_results = true;
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }

    pub fn id(&self) -> DeclId {
        match &self.receiver {
            Some(recv) => DeclId::method(&self.name, &recv.ty),
            None => DeclId::function(&self.name),
        }
    }

    fn render(&self, out: &mut String) {
        render_doc(&self.doc, out);
        out.push_str("func ");
        if let Some(recv) = &self.receiver {
            out.push_str(&format!("({} {}) ", recv.name, recv.ty));
        }
        out.push_str(&self.name);
        out.push_str(&signature(&self.params, &self.results, self.named_results));
        if self.body.is_empty() {
            out.push_str(" {}\n");
            return;
        }
        out.push_str(" {\n");
        for stmt in &self.body {
            stmt.render(1, out);
        }
        out.push_str("}\n");
    }
}

/// `(a int, b string) (r string, err error)` or `(a int) error`
pub fn signature(params: &[NamedTypeValue], results: &[NamedTypeValue], named: bool) -> String {
    let params = params
        .iter()
        .map(|p| {
            if p.name.is_empty() {
                p.ty.clone()
            } else {
                format!("{} {}", p.name, p.ty)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let results = match results {
        [] => String::new(),
        [single] if !named => format!(" {}", single.ty),
        many => {
            let inner = many
                .iter()
                .map(|r| {
                    if named && !r.name.is_empty() {
                        format!("{} {}", r.name, r.ty)
                    } else {
                        r.ty.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!(" ({inner})")
        }
    };
    format!("({params}){results}")
}

/// Named struct type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructDecl {
    pub doc: Vec<String>,
    pub name: String,
    pub fields: Vec<Field>,
}

impl StructDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty: ty.into(),
            tag: None,
        });
        self
    }

    pub fn tagged(
        mut self,
        name: impl Into<String>,
        ty: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty: ty.into(),
            tag: Some(tag.into()),
        });
        self
    }

    pub fn embed(mut self, ty: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: String::new(),
            ty: ty.into(),
            tag: None,
        });
        self
    }

    fn render(&self, out: &mut String) {
        render_doc(&self.doc, out);
        if self.fields.is_empty() {
            out.push_str(&format!("type {} struct{{}}\n", self.name));
            return;
        }
        out.push_str(&format!("type {} struct {{\n", self.name));
        let name_width = self.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        let type_width = self
            .fields
            .iter()
            .filter(|f| f.tag.is_some())
            .map(|f| f.ty.len())
            .max()
            .unwrap_or(0);
        for field in &self.fields {
            let mut line = String::from("\t");
            if field.name.is_empty() {
                line.push_str(&field.ty);
            } else {
                line.push_str(&format!("{:<name_width$} {}", field.name, field.ty));
            }
            if let Some(tag) = &field.tag {
                let pad = type_width.saturating_sub(field.ty.len());
                line.push_str(&" ".repeat(pad));
                line.push_str(&format!(" `{tag}`"));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push_str("}\n");
    }
}

/// A top-level declaration ready to be printed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Func(Func),
    Struct(StructDecl),
    /// `type Name func(params) results`
    FuncType {
        doc: Vec<String>,
        name: String,
        params: Vec<NamedTypeValue>,
        results: Vec<NamedTypeValue>,
    },
    /// `type Name interface { ... }`
    Interface {
        doc: Vec<String>,
        name: String,
        methods: Vec<Func>,
    },
    /// `var name type = value`
    Var {
        doc: Vec<String>,
        name: String,
        ty: Option<String>,
        value: Option<String>,
    },
    /// Text rendered elsewhere, identified by `id`
    Raw { id: DeclId, text: String },
}

impl Decl {
    /// Identity used for duplicate suppression
    pub fn id(&self) -> DeclId {
        match self {
            Decl::Func(f) => f.id(),
            Decl::Struct(s) => DeclId::type_decl(&s.name),
            Decl::FuncType { name, .. } | Decl::Interface { name, .. } => DeclId::type_decl(name),
            Decl::Var { name, .. } => DeclId::var(name),
            Decl::Raw { id, .. } => id.clone(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        match self {
            Decl::Func(f) => f.render(&mut out),
            Decl::Struct(s) => s.render(&mut out),
            Decl::FuncType {
                doc,
                name,
                params,
                results,
            } => {
                render_doc(doc, &mut out);
                out.push_str(&format!(
                    "type {name} func{}\n",
                    signature(params, results, false)
                ));
            }
            Decl::Interface { doc, name, methods } => {
                render_doc(doc, &mut out);
                if methods.is_empty() {
                    out.push_str(&format!("type {name} interface{{}}\n"));
                } else {
                    out.push_str(&format!("type {name} interface {{\n"));
                    for m in methods {
                        render_doc_indented(&m.doc, &mut out);
                        out.push_str(&format!(
                            "\t{}{}\n",
                            m.name,
                            signature(&m.params, &m.results, m.named_results)
                        ));
                    }
                    out.push_str("}\n");
                }
            }
            Decl::Var {
                doc,
                name,
                ty,
                value,
            } => {
                render_doc(doc, &mut out);
                out.push_str(&format!("var {name}"));
                if let Some(ty) = ty {
                    out.push_str(&format!(" {ty}"));
                }
                if let Some(value) = value {
                    out.push_str(&format!(" = {value}"));
                }
                out.push('\n');
            }
            Decl::Raw { text, .. } => {
                out.push_str(text.trim_end());
                out.push('\n');
            }
        }
        out
    }
}

impl From<Func> for Decl {
    fn from(f: Func) -> Self {
        Decl::Func(f)
    }
}

impl From<StructDecl> for Decl {
    fn from(s: StructDecl) -> Self {
        Decl::Struct(s)
    }
}

fn render_doc(doc: &[String], out: &mut String) {
    for line in doc {
        out.push_str(&format!("// {line}\n"));
    }
}

fn render_doc_indented(doc: &[String], out: &mut String) {
    for line in doc {
        out.push_str(&format!("\t// {line}\n"));
    }
}

/// Render a declaration list separated by blank lines
pub fn render_decls(decls: &[Decl]) -> String {
    decls
        .iter()
        .map(Decl::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Complete source file: package clause, import block, declarations
pub fn render_file(package: &str, imports: &ImportSet, decls: &[Decl]) -> String {
    let mut out = format!("package {package}\n");
    let block = imports.render_block();
    if !block.is_empty() {
        out.push('\n');
        out.push_str(&block);
    }
    if !decls.is_empty() {
        out.push('\n');
        out.push_str(&render_decls(decls));
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::imports::Import;

    #[test]
    fn test_struct_fields_and_tags_are_aligned() {
        let decl: Decl = StructDecl::new("BarRequest")
            .tagged("A", "int", "json:\"a\"")
            .tagged("Name", "[]string", "json:\"name\"")
            .into();
        assert_eq!(
            decl.render(),
            "type BarRequest struct {\n\tA    int      `json:\"a\"`\n\tName []string `json:\"name\"`\n}\n"
        );
    }

    #[test]
    fn test_empty_struct_and_embedded_field() {
        assert_eq!(
            Decl::from(StructDecl::new("basicFooService")).render(),
            "type basicFooService struct{}\n"
        );
        let decl: Decl = StructDecl::new("User")
            .embed("db.BaseModel")
            .field("Name", "string")
            .into();
        assert_eq!(
            decl.render(),
            "type User struct {\n\tdb.BaseModel\n\tName string\n}\n"
        );
    }

    #[test]
    fn test_method_with_nested_blocks() {
        let f = Func::new("Bar")
            .doc("Bar logs the call.")
            .receiver("l", "loggingMiddleware")
            .param("ctx", "context.Context")
            .param("a", "int")
            .named_results(&[
                NamedTypeValue::new("r", "string"),
                NamedTypeValue::new("err", "error"),
            ])
            .body(vec![
                Stmt::wrapped(
                    "defer func() {",
                    vec![Stmt::line("l.logger.Log(\"method\", \"Bar\")")],
                    "}()",
                ),
                Stmt::line("return l.next.Bar(ctx, a)"),
            ]);
        assert_eq!(
            Decl::from(f).render(),
            "// Bar logs the call.\nfunc (l loggingMiddleware) Bar(ctx context.Context, a int) (r string, err error) {\n\tdefer func() {\n\t\tl.logger.Log(\"method\", \"Bar\")\n\t}()\n\treturn l.next.Bar(ctx, a)\n}\n"
        );
    }

    #[test]
    fn test_key_values_are_aligned() {
        let mut out = String::new();
        Stmt::KeyValues(vec![
            ("A".into(), "a".into()),
            ("Longer".into(), "b".into()),
        ])
        .render(1, &mut out);
        assert_eq!(out, "\tA:      a,\n\tLonger: b,\n");
    }

    #[test]
    fn test_signatures() {
        let r = [NamedTypeValue::new("", "error")];
        assert_eq!(signature(&[], &r, false), "() error");
        let two = [
            NamedTypeValue::new("", "interface{}"),
            NamedTypeValue::new("", "error"),
        ];
        assert_eq!(signature(&[], &two, false), "() (interface{}, error)");
        let named = [NamedTypeValue::new("err", "error")];
        assert_eq!(signature(&[], &named, true), "() (err error)");
    }

    #[test]
    fn test_render_file() {
        let imports: ImportSet = vec![Import::new("context")].into_iter().collect();
        let decls = vec![
            Decl::FuncType {
                doc: vec!["Middleware describes a service middleware.".into()],
                name: "Middleware".into(),
                params: vec![NamedTypeValue::new("", "FooService")],
                results: vec![NamedTypeValue::new("", "FooService")],
            },
            Decl::Interface {
                doc: vec![],
                name: "FooService".into(),
                methods: vec![],
            },
        ];
        assert_eq!(
            render_file("service", &imports, &decls),
            "package service\n\nimport (\n\t\"context\"\n)\n\n// Middleware describes a service middleware.\ntype Middleware func(FooService) FooService\n\ntype FooService interface{}\n"
        );
    }
}
