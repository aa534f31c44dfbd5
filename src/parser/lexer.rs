//! Go tokenizer with automatic semicolon insertion
//!
//! Only the token classes the structural parser needs are distinguished; every
//! other keyword lexes as an identifier, which is harmless because statement
//! bodies are matched by delimiter depth rather than parsed.

use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

use super::error::{LexErrorKind, ParseError};

fn lex_block_comment(lex: &mut LogosLexer<'_, Tok>) -> Result<(), LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

fn unterminated_string(_: &mut LogosLexer<'_, Tok>) -> Result<(), LexErrorKind> {
    Err(LexErrorKind::UnterminatedString)
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\u{FEFF}]+")]
#[rustfmt::skip]
pub enum Tok {
    // Trivia, never emitted by `tokenize`
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", logos::skip, allow_greedy = true)] _LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    #[token("break")] KwBreak,
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("continue")] KwContinue,
    #[token("fallthrough")] KwFallthrough,
    #[token("func")] KwFunc,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("return")] KwReturn,
    #[token("struct")] KwStruct,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,
    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9a-zA-Z_]*)?")]
    #[regex(r"\.[0-9][0-9a-zA-Z_]*")]
    Number,
    #[regex(r"`[^`]*`", allow_greedy = true)] RawString,
    #[regex(r#""([^"\\\n\r]|\\.)*""#)] String,
    #[regex(r"'([^'\\\n\r]|\\.)+'")] Rune,
    #[token("\"", unterminated_string)]
    #[token("`", unterminated_string)]
    BadString,

    #[token("...")] Ellipsis,
    #[token("<<=")] ShlAssign,
    #[token(">>=")] ShrAssign,
    #[token("&^=")] AndNotAssign,
    #[token("+=")] AddAssign,
    #[token("-=")] SubAssign,
    #[token("*=")] MulAssign,
    #[token("/=")] DivAssign,
    #[token("%=")] ModAssign,
    #[token("&=")] AndAssign,
    #[token("|=")] OrAssign,
    #[token("^=")] XorAssign,
    #[token("<<")] Shl,
    #[token(">>")] Shr,
    #[token("&^")] AndNot,
    #[token("&&")] LAnd,
    #[token("||")] LOr,
    #[token("==")] EqEq,
    #[token("!=")] NotEq,
    #[token("<=")] Le,
    #[token(">=")] Ge,
    #[token("++")] Inc,
    #[token("--")] Dec,
    #[token(":=")] Define,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("/")] Slash,
    #[token("%")] Percent,
    #[token("&")] Amp,
    #[token("|")] Pipe,
    #[token("^")] Caret,
    #[token("~")] Tilde,
    #[token("!")] Bang,
    #[token("<")] Lt,
    #[token(">")] Gt,

    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,
}

impl Tok {
    /// Go inserts a semicolon after these tokens when a line ends
    fn ends_statement(self) -> bool {
        matches!(
            self,
            Tok::Ident
                | Tok::Number
                | Tok::String
                | Tok::RawString
                | Tok::Rune
                | Tok::KwBreak
                | Tok::KwContinue
                | Tok::KwFallthrough
                | Tok::KwReturn
                | Tok::Inc
                | Tok::Dec
                | Tok::RParen
                | Tok::RBrack
                | Tok::RBrace
        )
    }

    /// Human-readable token name for diagnostics
    pub fn describe(self) -> &'static str {
        match self {
            Tok::Ident => "identifier",
            Tok::Number | Tok::String | Tok::RawString | Tok::Rune => "literal",
            Tok::KwFunc => "'func'",
            Tok::KwImport => "'import'",
            Tok::KwPackage => "'package'",
            Tok::KwType => "'type'",
            Tok::KwVar => "'var'",
            Tok::KwConst => "'const'",
            Tok::LParen => "'('",
            Tok::RParen => "')'",
            Tok::LBrack => "'['",
            Tok::RBrack => "']'",
            Tok::LBrace => "'{'",
            Tok::RBrace => "'}'",
            Tok::Comma => "','",
            Tok::Semi => "';' or newline",
            Tok::Dot => "'.'",
            Tok::Star => "'*'",
            _ => "token",
        }
    }
}

/// A significant token and its byte span in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Tok,
    pub span: Range<usize>,
    /// Semicolon produced by a line break rather than written in the source
    pub implicit: bool,
}

/// Tokenize `src`, dropping trivia and inserting semicolons at line ends
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] for unterminated comments or literals and for
/// characters that do not start any Go token.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut lex = Tok::lexer(src);
    let mut out: Vec<Token> = Vec::new();
    let mut last: Option<Tok> = None;

    while let Some(item) = lex.next() {
        let span = lex.span();
        match item {
            Ok(Tok::Newline) => line_break(&mut out, &mut last, span),
            Ok(Tok::BlockComment) => {
                if lex.slice().contains('\n') {
                    line_break(&mut out, &mut last, span);
                }
            }
            Ok(kind) => {
                out.push(Token {
                    kind,
                    span,
                    implicit: false,
                });
                last = Some(kind);
            }
            Err(kind) => {
                return Err(ParseError::syntax_at(src, span.start, kind.to_string()));
            }
        }
    }
    line_break(&mut out, &mut last, src.len()..src.len());
    Ok(out)
}

fn line_break(out: &mut Vec<Token>, last: &mut Option<Tok>, at: Range<usize>) {
    if last.is_some_and(Tok::ends_statement) {
        out.push(Token {
            kind: Tok::Semi,
            span: at,
            implicit: true,
        });
        *last = Some(Tok::Semi);
    }
}
