use thiserror::Error;

/// Lexical error kinds raised while tokenizing Go source
#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("comment not terminated")]
    UnterminatedComment,
    #[error("string literal not terminated")]
    UnterminatedString,
}

/// Failure to turn source text into a [`super::File`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input is not syntactically valid Go at the top-level structure
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl ParseError {
    /// Build a syntax error for byte offset `offset` of `src`
    pub fn syntax_at(src: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(src, offset);
        ParseError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// 1-based line and column (in chars) of a byte offset
fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let before = src.get(..offset).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map(|l| l.chars().count() + 1)
        .unwrap_or(1);
    (line, column)
}
