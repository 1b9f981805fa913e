//! Lexer failure modes (spec §4.2.8, §7).

use crate::position::Position;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LexErrorKind {
    UnclosedQuote,
    UnclosedExpansion,
    UnmatchedBracket,
    InvalidEscape,
    UnexpectedChar,
}

impl LexErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            LexErrorKind::UnclosedQuote => "unclosed quote",
            LexErrorKind::UnclosedExpansion => "unclosed expansion",
            LexErrorKind::UnmatchedBracket => "unmatched bracket",
            LexErrorKind::InvalidEscape => "invalid escape sequence",
            LexErrorKind::UnexpectedChar => "unexpected character",
        }
    }
}

/// An error produced while tokenizing.
///
/// In strict mode the first `LexError` aborts tokenization; in
/// recoverable mode the lexer records it, emits a synthetic token
/// carrying the error, and resumes at the next plausible boundary
/// (spec §4.2.8).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{}: {message}", kind.message())]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
    pub message: String,
    /// What the lexer was expecting instead, if known (e.g. the
    /// closing quote character).
    pub expected: Option<String>,
}

impl LexError {
    pub fn new(kind: LexErrorKind, position: Position, message: impl Into<String>) -> Self {
        LexError {
            kind,
            position,
            message: message.into(),
            expected: None,
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}
