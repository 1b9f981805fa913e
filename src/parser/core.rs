//! The parser's token cursor and shared recursive-descent machinery
//! (spec §4.5.6).
//!
//! Unlike the teacher's `Parser`, this one is not async and carries no
//! alias-substitution machinery (SPEC_FULL §5: alias expansion and
//! the interactive token-pull interface are out of scope; this crate
//! parses a token stream it is handed in full). What survives from
//! the teacher's design is the shape of the cursor itself: a mark/
//! reset snapshot pair for speculative parsing (used by
//! [`super::pipeline`]'s function-definition lookahead), and a
//! strict-vs-collecting error policy mirroring
//! [`crate::lexer::Lexer`]'s `ErrorMode`.

use super::error::{ParseError, ParseErrorKind};
use crate::ast::*;
use crate::config::{Config, ParseErrorMode};
use crate::heredoc::CollectedHeredoc;
use crate::position::Position;
use crate::token::{Token, TokenKind};
use std::collections::VecDeque;

pub type PResult<T> = Result<T, ParseError>;

/// A saved cursor position, for backtracking out of a speculative
/// parse (e.g. "is this `NAME (` a function definition or a simple
/// command whose first word happens to be followed by `(`?").
#[derive(Clone, Copy, Debug)]
pub struct Mark(usize);

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    heredocs: VecDeque<CollectedHeredoc>,
    pub config: Config,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], heredocs: VecDeque<CollectedHeredoc>, config: Config) -> Self {
        Parser {
            tokens,
            pos: 0,
            heredocs,
            config,
            errors: Vec::new(),
        }
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    fn current(&self) -> &Token {
        // The token stream always ends in `Eof`, so this never runs
        // past the end (spec §4.2.2).
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    pub fn peek(&self) -> &Token {
        self.current()
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    pub fn at_eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    pub fn position(&self) -> Position {
        self.current().position
    }

    /// Consumes and returns the current token unconditionally.
    pub fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !tok.is_eof() {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token if it has `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_kind() == kind {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consumes the current token if it has `kind`, else records
    /// `err_kind` at the current position.
    pub fn expect(&mut self, kind: TokenKind, err_kind: ParseErrorKind) -> PResult<Token> {
        self.eat(kind).ok_or_else(|| ParseError::new(err_kind, self.position()))
    }

    /// Consumes one or more `;`/newline statement separators. Returns
    /// whether at least one was consumed — the parser's grammar
    /// treats `;` and a newline as fully interchangeable everywhere
    /// (spec §4.5.1).
    pub fn skip_separators(&mut self) -> bool {
        let mut any = false;
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
            any = true;
        }
        any
    }

    pub fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline).is_some() {}
    }

    /// Pops the next collected heredoc body, in source order. Called
    /// exactly once per `<<`/`<<-`/`<<<` redirect, at the point the
    /// parser builds that [`Redirect`] node (spec §4.4, §9).
    pub fn take_heredoc(&mut self) -> Option<CollectedHeredoc> {
        self.heredocs.pop_front()
    }

    /// Records a parse error according to the configured policy. In
    /// strict mode, returns it for the caller to propagate with `?`.
    /// In collecting mode, stores it (up to the configured cap) and
    /// returns `Ok(())` so the caller can attempt to resynchronize and
    /// keep going.
    pub fn record_error(&mut self, err: ParseError) -> PResult<()> {
        match self.config.parse_error_mode {
            ParseErrorMode::Strict => Err(err),
            ParseErrorMode::Collecting { max_errors } => {
                if self.errors.len() >= max_errors {
                    return Err(ParseError::new(ParseErrorKind::TooManyErrors, err.position));
                }
                self.errors.push(err);
                Ok(())
            }
        }
    }

    /// Whether collecting mode is active (strict callers never need
    /// to resynchronize: the first error already aborted the parse).
    pub fn is_collecting(&self) -> bool {
        matches!(self.config.parse_error_mode, ParseErrorMode::Collecting { .. })
    }

    /// After recording an error in collecting mode, advances past
    /// tokens until a statement boundary (`;`, `&`, a newline, or
    /// EOF) so the next `statement_list` call starts clean instead of
    /// re-tripping on the same malformed tokens.
    ///
    /// A "missing command" error (a stray `;` right where a pipeline
    /// was expected, say `if ; then`) is detected with the cursor
    /// already sitting on a boundary token: the scan below would then
    /// exit immediately without consuming anything, and the caller
    /// would trip over the exact same token and record the exact same
    /// error forever. Unconditionally stepping past one boundary
    /// token first guarantees this always makes progress.
    pub fn resynchronize(&mut self) {
        if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::Newline | TokenKind::Amp
        ) {
            self.advance();
        }
        while !matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::Newline | TokenKind::Amp | TokenKind::Eof
        ) {
            self.advance();
        }
    }
}
