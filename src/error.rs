//! The top-level error type unifying every stage of the front end
//! (spec §7).
//!
//! Each stage — brace expansion, lexing, heredoc collection, parsing —
//! has its own focused error type with its own `thiserror` message.
//! [`Error`] is a thin wrapper so a caller driving the whole pipeline
//! (see [`crate::parse`]) can propagate any of them with a single `?`
//! without losing which stage failed.

use crate::brace_expansion::BraceExpansionError;
use crate::heredoc::HeredocError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::position::Position;
use crate::source::pretty::{Annotation, Report, Severity};
use crate::source::{Code, Location};
use std::rc::Rc;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    BraceExpansion(#[from] BraceExpansionError),
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Heredoc(#[from] HeredocError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// The position in the original source this error is anchored to,
    /// where one is known. `BraceExpansion` errors have none: they are
    /// raised before any `Position` exists for the input.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::BraceExpansion(_) => None,
            Error::Lex(e) => Some(e.position),
            Error::Heredoc(HeredocError::Unterminated { position, .. }) => Some(*position),
            Error::Parse(e) => Some(e.position),
        }
    }

    /// Builds a renderable [`Report`] anchored at `code`, for callers
    /// that have one (every caller that went through
    /// [`crate::lexer::Lexer`] does). Falls back to an unknown-source
    /// zero-length location when this error has no position of its
    /// own.
    pub fn report(&self, code: &Rc<Code>) -> Report<'static> {
        let position = self.position().unwrap_or_default();
        let location = Location {
            code: Rc::clone(code),
            range: position.byte_range(),
        };
        Report::new(
            Severity::Error,
            self.to_string(),
            Annotation {
                location,
                label: "here".into(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::error::LexErrorKind;

    #[test]
    fn lex_error_converts_and_keeps_position() {
        let lex_err = LexError::new(LexErrorKind::UnexpectedChar, Position::new(3, 1, 4, 1), "bad char");
        let err: Error = lex_err.into();
        assert_eq!(err.position(), Some(Position::new(3, 1, 4, 1)));
    }
}
