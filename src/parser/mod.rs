//! # Structural Go Parser
//!
//! Turns Go source text into the [`File`] declaration model. Only the top-level
//! structure is parsed: package clause, imports, `const`/`var` specs, type
//! declarations and function signatures. Function bodies and initializer
//! expressions are captured as raw text after their delimiters have been checked
//! for balance.
//!
//! ## Type rendering
//!
//! Type expressions are flattened into a single canonical string: `*pkg.Type`,
//! `[]int`, `map[string]int`, `...T`, `chan<- T`, `func(int) (string, error)`.
//! Struct and interface literals keep their source text with whitespace collapsed.
//!
//! ## Anonymous parameters
//!
//! Unnamed parameters and results get a synthetic name made of the first letter
//! of their base type and their index in the list, so `([]string, *Hi, error)`
//! becomes `s0, h1, e2` on every parse.

mod error;
mod lexer;
mod model;

#[cfg(test)]
mod tests;

use std::ops::Range;

use tracing::{debug, warn};

use crate::imports::Import;

pub use error::{LexErrorKind, ParseError};
pub use lexer::{tokenize, Tok, Token};
pub use model::{
    DeclId, DeclKind, File, FuncType, Interface, Method, NamedTypeValue, Struct,
};

/// Parse Go source text into a [`File`]
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] when the top-level structure is not valid Go.
/// Declarations the model has no slot for (embedded interface elements, aliases
/// of non-struct types) are skipped or recorded by name only.
pub fn parse(src: &str) -> Result<File, ParseError> {
    let toks = tokenize(src)?;
    Parser { src, toks, pos: 0 }.file()
}

/// Synthetic name for an anonymous parameter at `index` with type `ty`
pub fn synthetic_name(ty: &str, index: usize) -> String {
    let mut rest = ty;
    loop {
        let next = rest
            .trim_start_matches("...")
            .trim_start_matches('*')
            .trim_start_matches("[]");
        if next.len() == rest.len() {
            break;
        }
        rest = next;
    }
    let letter = rest
        .chars()
        .find(|c| c.is_alphabetic())
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_else(|| "p".to_string());
    format!("{letter}{index}")
}

/// Render a function type from its parameters and results, dropping names
pub fn render_func_type(parameters: &[NamedTypeValue], results: &[NamedTypeValue]) -> String {
    let params = parameters
        .iter()
        .map(|p| p.ty.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    match results {
        [] => format!("func({params})"),
        [single] => format!("func({params}) {}", single.ty),
        many => {
            let results = many
                .iter()
                .map(|r| r.ty.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("func({params}) ({results})")
        }
    }
}

fn closer(kind: Tok) -> Option<Tok> {
    match kind {
        Tok::LParen => Some(Tok::RParen),
        Tok::LBrack => Some(Tok::RBrack),
        Tok::LBrace => Some(Tok::RBrace),
        _ => None,
    }
}

fn is_closer(kind: Tok) -> bool {
    matches!(kind, Tok::RParen | Tok::RBrack | Tok::RBrace)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Base name of an embedded field type: `*pkg.Base[T]` -> `Base`
fn embedded_name(ty: &str) -> String {
    let base = ty.trim_start_matches('*');
    let base = base.split('[').next().unwrap_or(base);
    base.rsplit('.').next().unwrap_or(base).to_string()
}

type Entry = (Option<String>, Option<String>);

struct Parser<'a> {
    src: &'a str,
    toks: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    // ----------------------------------------------------------------------
    // Token cursor
    // ----------------------------------------------------------------------

    fn peek(&self) -> Option<Tok> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<Tok> {
        self.toks.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: Tok) -> bool {
        self.peek() == Some(kind)
    }

    fn eat(&mut self, kind: Tok) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        match self.toks.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                Ok(tok.clone())
            }
            None => Err(self.error("unexpected end of file")),
        }
    }

    fn expect(&mut self, kind: Tok) -> Result<Token, ParseError> {
        match self.toks.get(self.pos) {
            Some(tok) if tok.kind == kind => {
                self.pos += 1;
                Ok(tok.clone())
            }
            Some(tok) => Err(ParseError::syntax_at(
                self.src,
                tok.span.start,
                format!(
                    "expected {}, found {}",
                    kind.describe(),
                    self.describe_token(tok)
                ),
            )),
            None => Err(self.error(format!("expected {}, found EOF", kind.describe()))),
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        let tok = self.expect(Tok::Ident)?;
        Ok(self.text(&tok).to_string())
    }

    fn text(&self, tok: &Token) -> &'a str {
        self.src.get(tok.span.clone()).unwrap_or_default()
    }

    fn describe_token(&self, tok: &Token) -> String {
        match tok.kind {
            Tok::Ident => format!("'{}'", self.text(tok)),
            Tok::Semi if tok.implicit => "newline".to_string(),
            kind => kind.describe().to_string(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .toks
            .get(self.pos)
            .map_or(self.src.len(), |t| t.span.start);
        ParseError::syntax_at(self.src, offset, message)
    }

    /// End offset of the last consumed token
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.toks.get(i))
            .map_or(0, |t| t.span.end)
    }

    /// A top-level declaration ends at a semicolon or at end of input
    fn end_of_decl(&mut self) -> Result<(), ParseError> {
        if self.pos >= self.toks.len() {
            return Ok(());
        }
        self.expect(Tok::Semi).map(|_| ())
    }

    /// Consume a bracketed region starting at the current opener, checking that
    /// every nested delimiter closes in order. Returns the span including both
    /// outer delimiters.
    fn skip_balanced(&mut self) -> Result<Range<usize>, ParseError> {
        let open = self.bump()?;
        let Some(first) = closer(open.kind) else {
            return Err(ParseError::syntax_at(
                self.src,
                open.span.start,
                format!("expected delimiter, found {}", open.kind.describe()),
            ));
        };
        let mut stack = vec![first];
        loop {
            let Some(tok) = self.toks.get(self.pos).cloned() else {
                return Err(ParseError::syntax_at(
                    self.src,
                    open.span.start,
                    format!("unclosed {}", open.kind.describe()),
                ));
            };
            self.pos += 1;
            if let Some(close) = closer(tok.kind) {
                stack.push(close);
            } else if is_closer(tok.kind) {
                if stack.last() != Some(&tok.kind) {
                    return Err(ParseError::syntax_at(
                        self.src,
                        tok.span.start,
                        format!("unexpected {}", tok.kind.describe()),
                    ));
                }
                stack.pop();
                if stack.is_empty() {
                    return Ok(open.span.start..tok.span.end);
                }
            }
        }
    }

    /// Run `spec` once, or once per entry of a parenthesised group
    fn group<F>(&mut self, mut spec: F) -> Result<(), ParseError>
    where
        F: FnMut(&mut Self) -> Result<(), ParseError>,
    {
        if !self.eat(Tok::LParen) {
            return spec(self);
        }
        loop {
            match self.peek() {
                Some(Tok::Semi) => self.pos += 1,
                Some(Tok::RParen) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => {
                    spec(self)?;
                    if !self.at(Tok::RParen) {
                        self.expect(Tok::Semi)?;
                    }
                }
                None => return Err(self.error("expected ')', found EOF")),
            }
        }
    }

    // ----------------------------------------------------------------------
    // Declarations
    // ----------------------------------------------------------------------

    fn file(mut self) -> Result<File, ParseError> {
        let mut file = File::default();
        self.expect(Tok::KwPackage)?;
        let name = self.expect(Tok::Ident)?;
        file.package = self.text(&name).to_string();
        file.package_end = name.span.end;
        self.end_of_decl()?;

        while let Some(kind) = self.peek() {
            match kind {
                Tok::Semi => self.pos += 1,
                Tok::KwImport => self.import_decl(&mut file)?,
                Tok::KwConst => {
                    let specs = self.value_decl()?;
                    file.constants.extend(specs);
                }
                Tok::KwVar => {
                    let specs = self.value_decl()?;
                    file.vars.extend(specs);
                }
                Tok::KwType => self.type_decl(&mut file)?,
                Tok::KwFunc => {
                    let method = self.func_decl()?;
                    if file.methods.iter().any(|m| m.id() == method.id()) {
                        warn!(decl = %method.id(), "duplicate declaration ignored");
                    } else {
                        file.methods.push(method);
                    }
                }
                _ => return Err(self.error("non-declaration statement outside function body")),
            }
        }
        Ok(file)
    }

    fn import_decl(&mut self, file: &mut File) -> Result<(), ParseError> {
        let start = self.expect(Tok::KwImport)?.span.start;
        self.group(|p| {
            let import = p.import_spec()?;
            file.imports.insert(import);
            Ok(())
        })?;
        file.import_decls.push(start..self.prev_end());
        self.end_of_decl()
    }

    fn import_spec(&mut self) -> Result<Import, ParseError> {
        let alias = match self.peek() {
            Some(Tok::Ident) => Some(self.ident()?),
            Some(Tok::Dot) => {
                self.pos += 1;
                Some(".".to_string())
            }
            _ => None,
        };
        let tok = self.bump()?;
        if !matches!(tok.kind, Tok::String | Tok::RawString) {
            return Err(ParseError::syntax_at(
                self.src,
                tok.span.start,
                "expected import path",
            ));
        }
        let quoted = self.text(&tok);
        let path = quoted
            .get(1..quoted.len().saturating_sub(1))
            .unwrap_or_default()
            .to_string();
        Ok(match alias {
            Some(alias) => Import::aliased(alias, path),
            None => Import::new(path),
        })
    }

    fn value_decl(&mut self) -> Result<Vec<NamedTypeValue>, ParseError> {
        self.bump()?;
        let mut out = Vec::new();
        self.group(|p| p.value_spec(&mut out))?;
        self.end_of_decl()?;
        Ok(out)
    }

    fn value_spec(&mut self, out: &mut Vec<NamedTypeValue>) -> Result<(), ParseError> {
        let mut names = vec![self.ident()?];
        while self.eat(Tok::Comma) {
            names.push(self.ident()?);
        }
        let ty = match self.peek() {
            None | Some(Tok::Assign | Tok::Semi | Tok::RParen) => String::new(),
            Some(_) => self.parse_type()?,
        };
        let values = if self.eat(Tok::Assign) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        for (i, name) in names.into_iter().enumerate() {
            out.push(NamedTypeValue {
                name,
                ty: ty.clone(),
                value: values.get(i).cloned(),
            });
        }
        Ok(())
    }

    /// Raw text of a comma-separated expression list, stopping before the
    /// terminating semicolon or the `)` closing an enclosing group
    fn expr_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut values = Vec::new();
        let mut stack: Vec<Tok> = Vec::new();
        let mut current: Option<Range<usize>> = None;

        while let Some(tok) = self.toks.get(self.pos).cloned() {
            if stack.is_empty() {
                match tok.kind {
                    Tok::Semi | Tok::RParen => break,
                    Tok::Comma => {
                        if let Some(range) = current.take() {
                            values.push(self.src.get(range).unwrap_or_default().trim().to_string());
                        }
                        self.pos += 1;
                        continue;
                    }
                    _ => {}
                }
            }
            if let Some(close) = closer(tok.kind) {
                stack.push(close);
            } else if is_closer(tok.kind) {
                if stack.last() != Some(&tok.kind) {
                    return Err(ParseError::syntax_at(
                        self.src,
                        tok.span.start,
                        format!("unexpected {}", tok.kind.describe()),
                    ));
                }
                stack.pop();
            }
            current = Some(match current {
                Some(range) => range.start..tok.span.end,
                None => tok.span.clone(),
            });
            self.pos += 1;
        }
        if !stack.is_empty() {
            return Err(self.error("unclosed delimiter in expression"));
        }
        if let Some(range) = current {
            values.push(self.src.get(range).unwrap_or_default().trim().to_string());
        }
        Ok(values)
    }

    fn type_decl(&mut self, file: &mut File) -> Result<(), ParseError> {
        self.expect(Tok::KwType)?;
        self.group(|p| p.type_spec(file))?;
        self.end_of_decl()
    }

    fn type_spec(&mut self, file: &mut File) -> Result<(), ParseError> {
        let name = self.ident()?;
        if self.at(Tok::LBrack) && self.starts_type_params() {
            self.skip_balanced()?;
        }
        self.eat(Tok::Assign);
        match self.peek() {
            Some(Tok::KwStruct) if self.peek_nth(1) == Some(Tok::LBrace) => {
                self.pos += 1;
                let fields = self.struct_fields()?;
                file.structures.push(Struct::new(name, fields));
            }
            Some(Tok::KwInterface) if self.peek_nth(1) == Some(Tok::LBrace) => {
                self.pos += 1;
                let methods = self.interface_methods()?;
                file.interfaces.push(Interface::new(name, methods));
            }
            Some(Tok::KwFunc) => {
                self.pos += 1;
                let (parameters, results) = self.signature()?;
                if file.func_type.is_none() {
                    file.func_type = Some(FuncType {
                        name,
                        parameters,
                        results,
                    });
                } else {
                    warn!(name = %name, "more than one function type declared, keeping the first");
                    file.other_types.push(name);
                }
            }
            _ => {
                let ty = self.parse_type()?;
                debug!(name = %name, ty = %ty, "recording type by name only");
                file.other_types.push(name);
            }
        }
        Ok(())
    }

    /// `type L[T any]` opens a type parameter list, `type A [N]int` an array
    fn starts_type_params(&self) -> bool {
        self.peek_nth(1) == Some(Tok::Ident)
            && matches!(
                self.peek_nth(2),
                Some(
                    Tok::Ident
                        | Tok::Comma
                        | Tok::KwInterface
                        | Tok::Tilde
                        | Tok::LBrack
                        | Tok::KwMap
                        | Tok::KwFunc
                        | Tok::KwChan
                )
            )
    }

    fn struct_fields(&mut self) -> Result<Vec<NamedTypeValue>, ParseError> {
        self.expect(Tok::LBrace)?;
        let mut fields = Vec::new();
        loop {
            match self.peek() {
                Some(Tok::Semi) => self.pos += 1,
                Some(Tok::RBrace) => {
                    self.pos += 1;
                    return Ok(fields);
                }
                Some(_) => {
                    self.field_decl(&mut fields)?;
                    if matches!(self.peek(), Some(Tok::String | Tok::RawString)) {
                        self.pos += 1;
                    }
                    if !self.at(Tok::RBrace) {
                        self.expect(Tok::Semi)?;
                    }
                }
                None => return Err(self.error("expected '}', found EOF")),
            }
        }
    }

    fn field_decl(&mut self, fields: &mut Vec<NamedTypeValue>) -> Result<(), ParseError> {
        let embedded = match (self.peek(), self.peek_nth(1)) {
            (Some(Tok::Star), _) => true,
            (
                Some(Tok::Ident),
                None
                | Some(Tok::Dot | Tok::Semi | Tok::RBrace | Tok::String | Tok::RawString),
            ) => true,
            _ => false,
        };
        if embedded {
            let ty = self.parse_type()?;
            fields.push(NamedTypeValue::new(embedded_name(&ty), ty));
            return Ok(());
        }
        let mut names = vec![self.ident()?];
        while self.eat(Tok::Comma) {
            names.push(self.ident()?);
        }
        let ty = self.parse_type()?;
        fields.extend(names.into_iter().map(|n| NamedTypeValue::new(n, ty.clone())));
        Ok(())
    }

    fn interface_methods(&mut self) -> Result<Vec<Method>, ParseError> {
        self.expect(Tok::LBrace)?;
        let mut methods = Vec::new();
        loop {
            match self.peek() {
                Some(Tok::Semi) => self.pos += 1,
                Some(Tok::RBrace) => {
                    self.pos += 1;
                    return Ok(methods);
                }
                Some(Tok::Ident) if self.peek_nth(1) == Some(Tok::LParen) => {
                    let name = self.ident()?;
                    let (parameters, results) = self.signature()?;
                    methods.push(Method::new(name, parameters, results));
                    if !self.at(Tok::RBrace) {
                        self.expect(Tok::Semi)?;
                    }
                }
                Some(_) => {
                    let start = self.pos;
                    self.skip_element()?;
                    debug!(
                        element = %self.src.get(self.toks[start].span.start..self.prev_end()).unwrap_or_default(),
                        "skipping embedded interface element"
                    );
                }
                None => return Err(self.error("expected '}', found EOF")),
            }
        }
    }

    /// Skip tokens up to the next `;` or `}` at the current nesting level
    fn skip_element(&mut self) -> Result<(), ParseError> {
        while let Some(kind) = self.peek() {
            if matches!(kind, Tok::Semi | Tok::RBrace) {
                break;
            }
            if closer(kind).is_some() {
                self.skip_balanced()?;
            } else if is_closer(kind) {
                return Err(self.error(format!("unexpected {}", kind.describe())));
            } else {
                self.pos += 1;
            }
        }
        Ok(())
    }

    fn func_decl(&mut self) -> Result<Method, ParseError> {
        self.expect(Tok::KwFunc)?;
        let receiver = if self.at(Tok::LParen) {
            self.params()?.into_iter().next()
        } else {
            None
        };
        let name = self.ident()?;
        if self.at(Tok::LBrack) {
            self.skip_balanced()?;
        }
        let (parameters, results) = self.signature()?;
        let body = if self.at(Tok::LBrace) {
            let span = self.skip_balanced()?;
            self.src
                .get(span.start + 1..span.end - 1)
                .unwrap_or_default()
                .to_string()
        } else {
            String::new()
        };
        self.end_of_decl()?;
        Ok(Method {
            name,
            receiver,
            body,
            parameters,
            results,
        })
    }

    // ----------------------------------------------------------------------
    // Signatures and types
    // ----------------------------------------------------------------------

    fn starts_type_at(&self, n: usize) -> bool {
        matches!(
            self.peek_nth(n),
            Some(
                Tok::Ident
                    | Tok::Star
                    | Tok::LBrack
                    | Tok::LParen
                    | Tok::KwMap
                    | Tok::KwChan
                    | Tok::KwFunc
                    | Tok::KwInterface
                    | Tok::KwStruct
                    | Tok::Arrow
            )
        )
    }

    fn signature(&mut self) -> Result<(Vec<NamedTypeValue>, Vec<NamedTypeValue>), ParseError> {
        let parameters = self.params()?;
        let results = if self.at(Tok::LParen) {
            self.params()?
        } else if self.starts_type_at(0) {
            let ty = self.parse_type()?;
            vec![NamedTypeValue::new(synthetic_name(&ty, 0), ty)]
        } else {
            Vec::new()
        };
        Ok((parameters, results))
    }

    fn params(&mut self) -> Result<Vec<NamedTypeValue>, ParseError> {
        self.expect(Tok::LParen)?;
        let mut entries: Vec<Entry> = Vec::new();
        loop {
            while self.eat(Tok::Semi) {}
            if self.eat(Tok::RParen) {
                break;
            }
            entries.push(self.param_entry()?);
            if !self.eat(Tok::Comma) {
                while self.eat(Tok::Semi) {}
                self.expect(Tok::RParen)?;
                break;
            }
        }

        let named = entries.iter().any(|(n, t)| n.is_some() && t.is_some());
        if !named {
            return Ok(entries
                .into_iter()
                .enumerate()
                .map(|(i, (name, ty))| {
                    let ty = ty.or(name).unwrap_or_default();
                    NamedTypeValue::new(synthetic_name(&ty, i), ty)
                })
                .collect());
        }

        let mut out = Vec::new();
        let mut pending = Vec::new();
        for (name, ty) in entries {
            match (name, ty) {
                (Some(name), None) => pending.push(name),
                (Some(name), Some(ty)) => {
                    out.extend(pending.drain(..).map(|p| NamedTypeValue::new(p, ty.clone())));
                    out.push(NamedTypeValue::new(name, ty));
                }
                (None, _) => return Err(self.error("mixed named and unnamed parameters")),
            }
        }
        if !pending.is_empty() {
            return Err(self.error("mixed named and unnamed parameters"));
        }
        Ok(out)
    }

    /// One comma-separated entry: `name Type`, a lone identifier (name or type,
    /// decided by the whole list), or an unnamed type
    fn param_entry(&mut self) -> Result<Entry, ParseError> {
        if self.at(Tok::Ident) {
            match self.peek_nth(1) {
                Some(Tok::Comma | Tok::RParen) => return Ok((Some(self.ident()?), None)),
                Some(Tok::Dot) => {}
                Some(Tok::Ellipsis) => {
                    let name = self.ident()?;
                    return Ok((Some(name), Some(self.parse_type()?)));
                }
                _ if self.starts_type_at(1) => {
                    let name = self.ident()?;
                    return Ok((Some(name), Some(self.parse_type()?)));
                }
                _ => {}
            }
        }
        Ok((None, Some(self.parse_type()?)))
    }

    fn parse_type(&mut self) -> Result<String, ParseError> {
        let Some(tok) = self.toks.get(self.pos).cloned() else {
            return Err(self.error("expected type, found EOF"));
        };
        match tok.kind {
            Tok::Ident => {
                self.pos += 1;
                let mut ty = self.text(&tok).to_string();
                if self.eat(Tok::Dot) {
                    let sel = self.ident()?;
                    ty = format!("{ty}.{sel}");
                }
                if self.at(Tok::LBrack) {
                    let args = self.type_args()?;
                    ty = format!("{ty}[{}]", args.join(", "));
                }
                Ok(ty)
            }
            Tok::Star => {
                self.pos += 1;
                Ok(format!("*{}", self.parse_type()?))
            }
            Tok::Ellipsis => {
                self.pos += 1;
                Ok(format!("...{}", self.parse_type()?))
            }
            Tok::LParen => {
                self.pos += 1;
                let ty = self.parse_type()?;
                self.expect(Tok::RParen)?;
                Ok(ty)
            }
            Tok::LBrack => {
                if self.peek_nth(1) == Some(Tok::RBrack) {
                    self.pos += 2;
                    return Ok(format!("[]{}", self.parse_type()?));
                }
                let span = self.skip_balanced()?;
                let len = self
                    .src
                    .get(span.start + 1..span.end - 1)
                    .unwrap_or_default();
                Ok(format!("[{}]{}", collapse_whitespace(len), self.parse_type()?))
            }
            Tok::KwMap => {
                self.pos += 1;
                self.expect(Tok::LBrack)?;
                let key = self.parse_type()?;
                self.expect(Tok::RBrack)?;
                let value = self.parse_type()?;
                Ok(format!("map[{key}]{value}"))
            }
            Tok::KwChan => {
                self.pos += 1;
                if self.eat(Tok::Arrow) {
                    Ok(format!("chan<- {}", self.parse_type()?))
                } else {
                    Ok(format!("chan {}", self.parse_type()?))
                }
            }
            Tok::Arrow => {
                self.pos += 1;
                self.expect(Tok::KwChan)?;
                Ok(format!("<-chan {}", self.parse_type()?))
            }
            Tok::KwFunc => {
                self.pos += 1;
                let (parameters, results) = self.signature()?;
                Ok(render_func_type(&parameters, &results))
            }
            Tok::KwInterface | Tok::KwStruct => {
                self.pos += 1;
                if !self.at(Tok::LBrace) {
                    return Err(self.error("expected '{'"));
                }
                let span = self.skip_balanced()?;
                let body = collapse_whitespace(self.src.get(span).unwrap_or_default());
                Ok(format!("{}{body}", self.text(&tok)))
            }
            kind => Err(ParseError::syntax_at(
                self.src,
                tok.span.start,
                format!("expected type, found {}", kind.describe()),
            )),
        }
    }

    fn type_args(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(Tok::LBrack)?;
        let mut args = Vec::new();
        while !self.eat(Tok::RBrack) {
            args.push(self.parse_type()?);
            if !self.eat(Tok::Comma) {
                self.expect(Tok::RBrack)?;
                break;
            }
        }
        Ok(args)
    }
}
