//! # Merge engine
//!
//! Appends synthesized declarations to a Go file without touching what is
//! already there.
//!
//! ```text
//! NoFileYet ──stub──▶ FirstGeneration ──┐
//!                                        ├─▶ Parsed ─▶ Reconciled ─▶ Written
//! (existing file) ───────────────────────┘
//! ```
//!
//! A declaration already present in the file (same kind, name and, for
//! methods, receiver type) is never regenerated, so hand edits survive and a
//! second run with the same input writes nothing.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::emit::{render_decls, render_file, Decl};
use crate::fs::FileSystem;
use crate::generator::GenerateError;
use crate::imports::{reconcile, Import, ImportSet};
use crate::parser::{self, DeclId, DeclKind, File, ParseError, Tok};

/// A synthesized declaration and the imports its text uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub decl: Decl,
    pub imports: ImportSet,
}

impl Fragment {
    pub fn new(decl: impl Into<Decl>) -> Self {
        Self {
            decl: decl.into(),
            imports: ImportSet::new(),
        }
    }

    pub fn import(mut self, path: &str) -> Self {
        self.imports.insert(Import::new(path));
        self
    }

    pub fn aliased_import(mut self, alias: &str, path: &str) -> Self {
        self.imports.insert(Import::aliased(alias, path));
        self
    }

    pub fn imports<I: IntoIterator<Item = Import>>(mut self, imports: I) -> Self {
        for import in imports {
            self.imports.insert(import);
        }
        self
    }

    pub fn id(&self) -> DeclId {
        self.decl.id()
    }
}

/// Stage of one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    NoFileYet,
    FirstGeneration,
    Parsed,
    Reconciled,
    Written,
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeState::NoFileYet => "no-file-yet",
            MergeState::FirstGeneration => "first-generation",
            MergeState::Parsed => "parsed",
            MergeState::Reconciled => "reconciled",
            MergeState::Written => "written",
        };
        f.write_str(name)
    }
}

/// What a merge did to its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Last state reached: `Written` when the file changed, `Parsed` otherwise
    pub state: MergeState,
    /// The target did not exist and was created
    pub created: bool,
    pub added: Vec<DeclId>,
    pub skipped: Vec<DeclId>,
    pub imports_added: ImportSet,
    /// Qualifier rewrites applied to the appended text
    pub renames: BTreeMap<String, String>,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        self.state == MergeState::Written
    }
}

/// Drives fragments into files through a [`FileSystem`]
pub struct MergeEngine<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> MergeEngine<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Merge `fragments` into the Go file at `path`
    ///
    /// # Errors
    ///
    /// Fails when the existing file does not parse, when the synthesized text
    /// does not parse ([`GenerateError::ImportReconciliation`]), or on I/O
    /// errors. Nothing is written in any of these cases except the package stub
    /// of a brand-new file.
    pub fn merge(
        &self,
        path: &Path,
        package: &str,
        fragments: Vec<Fragment>,
    ) -> anyhow::Result<MergeOutcome> {
        let shown = path.display().to_string();
        let mut state = MergeState::NoFileYet;
        let created = !self.fs.exists(path)?;
        if created {
            self.fs
                .write_file(path, &format!("package {package}\n"), true)
                .with_context(|| format!("failed to create {shown}"))?;
            state = transition(&shown, state, MergeState::FirstGeneration);
        }

        let text = self.fs.read_file(path)?;
        let existing = parser::parse(&text).map_err(|source| GenerateError::Parse {
            path: shown.clone(),
            source,
        })?;
        state = transition(&shown, state, MergeState::Parsed);

        let mut outcome = MergeOutcome {
            state,
            created,
            added: Vec::new(),
            skipped: Vec::new(),
            imports_added: ImportSet::new(),
            renames: BTreeMap::new(),
        };

        let mut seen: HashSet<DeclId> = HashSet::new();
        let mut survivors: Vec<Fragment> = Vec::new();
        for fragment in fragments {
            let id = fragment.id();
            if existing.contains(&id) || !seen.insert(id.clone()) {
                info!("`{id}` already exists in {shown}, it will not be recreated");
                outcome.skipped.push(id);
            } else {
                survivors.push(fragment);
            }
        }
        if survivors.is_empty() {
            debug!(path = %shown, "nothing new to add");
            return Ok(outcome);
        }

        let decls: Vec<Decl> = survivors.iter().map(|f| f.decl.clone()).collect();
        let mut declared = ImportSet::new();
        for fragment in &survivors {
            declared.merge(&fragment.imports);
        }
        let scratch = render_file(&existing.package, &declared, &decls);
        let required = parser::parse(&scratch)
            .map_err(|source| GenerateError::ImportReconciliation {
                path: shown.clone(),
                source,
            })?
            .imports;

        let mut reserved = top_level_names(&existing);
        reserved.extend(decls.iter().filter_map(scope_name));
        let plan = reconcile(&existing.imports, &required, &reserved);
        let appended = rewrite_qualifiers(&render_decls(&decls), &plan.renames).map_err(
            |source| GenerateError::ImportReconciliation {
                path: shown.clone(),
                source,
            },
        )?;
        outcome.state = transition(&shown, outcome.state, MergeState::Reconciled);

        let body = splice_imports(&text, &existing, &plan.additions);
        let merged = append_decls(&body, &appended);
        self.fs.write_file(path, &merged, true)?;
        outcome.state = transition(&shown, outcome.state, MergeState::Written);

        outcome.added = decls.iter().map(Decl::id).collect();
        outcome.imports_added = plan.additions;
        outcome.renames = plan.renames;
        info!(
            path = %shown,
            added = outcome.added.len(),
            skipped = outcome.skipped.len(),
            "merged declarations"
        );
        Ok(outcome)
    }
}

fn transition(path: &str, from: MergeState, to: MergeState) -> MergeState {
    debug!(path = %path, from = %from, to = %to, "merge state");
    to
}

/// Identifiers declared at package scope that an import alias must not shadow
fn top_level_names(file: &File) -> HashSet<String> {
    let mut names = HashSet::new();
    names.extend(file.structures.iter().map(|s| s.name.clone()));
    names.extend(file.interfaces.iter().map(|i| i.name.clone()));
    names.extend(file.func_type.iter().map(|f| f.name.clone()));
    names.extend(file.other_types.iter().cloned());
    names.extend(file.vars.iter().map(|v| v.name.clone()));
    names.extend(file.constants.iter().map(|c| c.name.clone()));
    names.extend(
        file.methods
            .iter()
            .filter(|m| m.receiver.is_none())
            .map(|m| m.name.clone()),
    );
    names
}

fn scope_name(decl: &Decl) -> Option<String> {
    let id = decl.id();
    match id.kind {
        DeclKind::Method => None,
        _ => Some(id.name),
    }
}

/// Rewrite package qualifiers in Go source
///
/// Only identifiers used as the left side of a selector (`http.Handler`) and
/// not themselves preceded by a selector dot are renamed; string literals,
/// comments and field accesses like `r.http.X` are left alone. All renames are
/// applied at once, so swapping two names is safe.
pub fn rewrite_qualifiers(
    src: &str,
    renames: &BTreeMap<String, String>,
) -> Result<String, ParseError> {
    if renames.is_empty() {
        return Ok(src.to_string());
    }
    let toks = parser::tokenize(src)?;
    let mut out = String::with_capacity(src.len());
    let mut last = 0;
    for (i, tok) in toks.iter().enumerate() {
        if tok.kind != Tok::Ident {
            continue;
        }
        let followed_by_dot = toks.get(i + 1).is_some_and(|t| t.kind == Tok::Dot);
        let preceded_by_dot = i > 0 && toks.get(i - 1).is_some_and(|t| t.kind == Tok::Dot);
        if !followed_by_dot || preceded_by_dot {
            continue;
        }
        let Some(name) = src.get(tok.span.clone()) else {
            continue;
        };
        if let Some(replacement) = renames.get(name) {
            out.push_str(src.get(last..tok.span.start).unwrap_or_default());
            out.push_str(replacement);
            last = tok.span.end;
        }
    }
    out.push_str(src.get(last..).unwrap_or_default());
    Ok(out)
}

/// Line ending the file already uses
fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Join `appended` to `body`. Only trailing blank space of `body` changes;
/// the appended text is normalized and follows the file's line ending.
fn append_decls(body: &str, appended: &str) -> String {
    let eol = line_ending(body);
    let mut tail = normalize(appended);
    if eol != "\n" {
        tail = tail.replace('\n', eol);
    }
    format!("{}{eol}{eol}{tail}", body.trim_end())
}

/// Add `additions` to the file's imports. The text is returned untouched when
/// there is nothing to add.
///
/// A parenthesised declaration is extended in place so its comments and spec
/// order survive. Otherwise the single-line declarations are replaced by one
/// block, or a block is inserted after the package clause.
fn splice_imports(text: &str, file: &File, additions: &ImportSet) -> String {
    if additions.is_empty() {
        return text.to_string();
    }
    let eol = line_ending(text);
    if let Some(extended) = file
        .import_decls
        .last()
        .and_then(|decl| extend_block(text, decl.clone(), additions, eol))
    {
        return extended;
    }

    let mut all = file.imports.clone();
    all.merge(additions);
    let block = all.render_block();
    let block = block.trim_end().replace('\n', eol);

    match (file.import_decls.first(), file.import_decls.last()) {
        (Some(first), Some(last)) => format!(
            "{}{block}{}",
            text.get(..first.start).unwrap_or_default(),
            text.get(last.end..).unwrap_or_default()
        ),
        _ => {
            let at = file.package_end.min(text.len());
            format!(
                "{}{eol}{eol}{block}{}",
                text.get(..at).unwrap_or_default(),
                text.get(at..).unwrap_or_default()
            )
        }
    }
}

/// Insert `additions` into the multi-line `import ( ... )` at `decl`
///
/// Standard-library paths go after the last standard-library spec, the rest
/// before the closing paren, separated by a blank line when they open the
/// second group. `None` when the declaration is not a multi-line block.
fn extend_block(
    text: &str,
    decl: Range<usize>,
    additions: &ImportSet,
    eol: &str,
) -> Option<String> {
    let src = text.get(decl.clone())?;
    let toks = parser::tokenize(src).ok()?;
    let open = toks.get(1).filter(|t| t.kind == Tok::LParen)?;
    let close = toks.iter().rev().find(|t| t.kind == Tok::RParen)?;
    if !src.get(open.span.end..close.span.start)?.contains('\n') {
        return None;
    }
    let close_line = src
        .get(..close.span.start)?
        .rfind('\n')
        .map_or(close.span.start, |i| i + 1);
    let line_end = |at: usize| {
        src.get(at..)
            .and_then(|rest| rest.find('\n'))
            .map_or(close_line, |i| at + i + 1)
            .min(close_line)
    };

    let mut last_std = None;
    let mut has_rest = false;
    for tok in toks.iter().filter(|t| t.kind == Tok::String) {
        let path = src.get(tok.span.clone())?.trim_matches('"');
        if Import::new(path).is_std() {
            last_std = Some(line_end(tok.span.end));
        } else {
            has_rest = true;
        }
    }

    let (mut std, mut rest): (Vec<&Import>, Vec<&Import>) =
        additions.iter().partition(|i| i.is_std());
    std.sort_by(|a, b| a.path.cmp(&b.path));
    rest.sort_by(|a, b| a.path.cmp(&b.path));
    let spec_lines = |imports: &[&Import]| -> String {
        imports.iter().map(|i| format!("\t{i}{eol}")).collect()
    };

    let std_at = last_std.unwrap_or_else(|| line_end(open.span.end));
    let mut std_text = spec_lines(&std);
    if last_std.is_none() && has_rest && !std.is_empty() {
        std_text.push_str(eol);
    }
    let mut rest_text = String::new();
    if !rest.is_empty() {
        if !has_rest && (last_std.is_some() || !std.is_empty()) {
            rest_text.push_str(eol);
        }
        rest_text.push_str(&spec_lines(&rest));
    }

    let at = |offset: usize| decl.start + offset;
    Some(format!(
        "{}{std_text}{}{rest_text}{}",
        text.get(..at(std_at))?,
        text.get(at(std_at)..at(close_line))?,
        text.get(at(close_line)..)?
    ))
}

/// Strip trailing whitespace, collapse blank-line runs, end with one newline
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut blank_run = false;
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !blank_run && !out.is_empty() {
                out.push('\n');
            }
            blank_run = true;
            continue;
        }
        blank_run = false;
        out.push_str(line);
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}
