//! The lexer: a single-threaded, synchronous state machine that turns
//! source text into a flat stream of [`Token`]s (spec §4.2).
//!
//! There is no coroutine and no suspension point anywhere in this
//! module — the lexer runs a character buffer to completion in one
//! call. Heredoc bodies are *not* read here; [`crate::heredoc`] pairs
//! heredoc redirections with their bodies in a later pass over the
//! already-produced token stream (spec §4.4, §9).

mod expansion;
mod operator;
mod quote;
mod word;

pub mod config;
pub mod error;

pub use config::{ErrorMode, LexerConfig};
pub use error::{LexError, LexErrorKind};

use crate::position::Position;
use crate::source::{source_chars, Code, Source, SourceChar};
use crate::token::{Token, TokenKind};
use std::cell::RefCell;
use std::num::NonZeroU64;
use std::rc::Rc;

/// Returns true if `c` is a blank (a shell-whitespace character that
/// is not a newline).
pub fn is_blank(c: char, unicode: bool) -> bool {
    if c == '\n' {
        return false;
    }
    if unicode {
        c.is_whitespace()
    } else {
        c == ' ' || c == '\t' || c == '\r'
    }
}

/// Characters that always terminate a word when unquoted.
pub(crate) const OPERATOR_LEAD_CHARS: &[char] = &[
    '<', '>', '|', '&', ';', '(', ')', '{', '}', '\n',
];

pub(crate) fn is_identifier_start(c: char, unicode: bool) -> bool {
    if c == '_' {
        return true;
    }
    if unicode {
        c.is_alphabetic()
    } else {
        c.is_ascii_alphabetic()
    }
}

pub(crate) fn is_identifier_continue(c: char, unicode: bool) -> bool {
    if c == '_' {
        return true;
    }
    if unicode {
        c.is_alphanumeric()
    } else {
        c.is_ascii_alphanumeric()
    }
}

/// A saved lexer position, for speculative scans that may need to
/// backtrack (balanced-delimiter scans, the `$((` vs `$(` peek, and
/// the parser's own snapshot/restore of a whole lexer).
#[derive(Clone, Copy, Debug)]
pub struct Mark {
    index: usize,
    line: u32,
    column: u32,
}

/// The lexical analyzer.
///
/// Owns the character buffer for the duration of a single `tokenize`
/// call; nothing survives it except the returned tokens (spec §3.2,
/// §5: "the token stream is owned by the parser for the duration of a
/// parse and discarded afterward" — likewise here for the lexer and
/// its character buffer).
pub struct Lexer {
    chars: Vec<SourceChar>,
    index: usize,
    line: u32,
    column: u32,
    pub config: LexerConfig,
    pub code: Rc<Code>,
    errors: Vec<LexError>,
}

impl Lexer {
    /// Creates a lexer over `text`, attributing all positions to
    /// `source`.
    pub fn new(text: &str, source: Source, config: LexerConfig) -> Self {
        let code = Rc::new(Code {
            value: RefCell::new(text.to_string()),
            start_line_number: NonZeroU64::new(1).unwrap(),
            source,
        });
        let chars = source_chars(text, &code, 0);
        Lexer {
            chars,
            index: 0,
            line: 1,
            column: 1,
            config,
            code,
            errors: Vec::new(),
        }
    }

    /// Appends more text to the end of the buffer, for callers (the
    /// heredoc collector in interactive mode) that pull additional
    /// lines mid-parse. The new characters are attributed to the same
    /// `Code`.
    pub fn extend(&mut self, more: &str) {
        let offset = self.code.value.borrow().len();
        self.code.value.borrow_mut().push_str(more);
        let more_chars = source_chars(more, &self.code, offset);
        self.chars.extend(more_chars);
    }

    pub fn mark(&self) -> Mark {
        Mark {
            index: self.index,
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.index = mark.index;
        self.line = mark.line;
        self.column = mark.column;
    }

    pub fn at_eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.index).map(|c| c.value)
    }

    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).map(|c| c.value)
    }

    pub fn peek_str(&self, n: usize) -> String {
        self.chars
            .iter()
            .skip(self.index)
            .take(n)
            .map(|c| c.value)
            .collect()
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.chars
            .get(index)
            .map(|c| c.location.range.start)
            .unwrap_or_else(|| self.code.value.borrow().len())
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.byte_offset(self.index), self.line, self.column, 0)
    }

    /// Advances past the current character, returning it.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes `self.peek()` if it equals `c`.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.peek_str(s.chars().count()) == s {
            for _ in 0..s.chars().count() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    fn make_position(&self, start: Mark) -> Position {
        let length = self.byte_offset(self.index) - self.byte_offset(start.index);
        Position::new(self.byte_offset(start.index), start.line, start.column, length)
    }

    fn slice_since(&self, start: Mark) -> String {
        self.chars[start.index..self.index].iter().map(|c| c.value).collect()
    }

    fn record_error(&mut self, err: LexError) -> Result<(), LexError> {
        match self.config.error_mode {
            ErrorMode::Strict => Err(err),
            ErrorMode::Recoverable => {
                self.errors.push(err);
                Ok(())
            }
        }
    }

    /// Skips blanks (not newlines) and, at a word boundary, a `#`
    /// comment through end of line.
    fn skip_blanks_and_comment(&mut self) {
        loop {
            while self.peek().map_or(false, |c| is_blank(c, self.config.unicode_whitespace)) {
                self.advance();
            }
            if self.peek() == Some('#') {
                while self.peek().map_or(false, |c| c != '\n') {
                    self.advance();
                }
                continue;
            }
            break;
        }
    }

    /// Tokenizes `text` to completion and returns the token list
    /// ending with `Eof`. In strict mode, returns the first error
    /// instead. In recoverable mode, always succeeds, returning any
    /// errors encountered alongside the (possibly partial, synthetic-
    /// token-padded) token list.
    pub fn tokenize(text: &str, source: Source, config: LexerConfig) -> TokenizeResult {
        let mut lexer = Lexer::new(text, source, config);
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token() {
                Ok(token) => {
                    let is_eof = token.is_eof();
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                Err(err) => {
                    return TokenizeResult {
                        tokens,
                        errors: vec![err],
                        lexer,
                    };
                }
            }
        }
        let errors = std::mem::take(&mut lexer.errors);
        TokenizeResult {
            tokens,
            errors,
            lexer,
        }
    }

    /// Produces the next token, or the `Eof` token once the buffer is
    /// exhausted. This is the dispatcher described in spec §4.2.2: a
    /// prioritized list of recognizers, the first applicable one
    /// wins.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_blanks_and_comment();

        if self.at_eof() {
            return Ok(Token::eof(self.current_position()));
        }

        if self.peek() == Some('\n') {
            let start = self.mark();
            self.advance();
            return Ok(Token::new(TokenKind::Newline, "\n", self.make_position(start)));
        }

        // Priority: process substitution, the bare arithmetic command,
        // operators, `$`/backquote expansions, then a literal word
        // (which itself absorbs quoted runs — see `lex_word`). A bare
        // `((` must be claimed before the generic operator recognizer
        // gets a chance to read it as two bracket tokens.
        if self.config.process_substitution_enabled() {
            if let Some(tok) = self.try_process_substitution()? {
                return Ok(tok);
            }
        }
        if !self.config.posix_strict {
            if let Some(tok) = self.try_arithmetic_command()? {
                return Ok(tok);
            }
        }
        if let Some(tok) = self.try_operator()? {
            return Ok(tok);
        }
        if let Some(tok) = self.try_bare_expansion()? {
            return Ok(tok);
        }
        self.lex_word()
    }

    fn try_process_substitution(&mut self) -> Result<Option<Token>, LexError> {
        let c = self.peek();
        if !(c == Some('<') || c == Some('>')) || self.peek_at(1) != Some('(') {
            return Ok(None);
        }
        let start = self.mark();
        let direction_in = c == Some('<');
        self.advance(); // < or >
        self.advance(); // (
        let body_start = self.index;
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => {
                    let err = LexError::new(
                        LexErrorKind::UnclosedExpansion,
                        self.make_position(start),
                        "unterminated process substitution",
                    )
                    .with_expected(")");
                    self.record_error(err.clone())?;
                    break;
                }
                Some('(') => {
                    depth += 1;
                    self.advance();
                }
                Some(')') => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    while self.peek().is_some() && self.peek() != Some('\'') {
                        self.advance();
                    }
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    while self.peek().is_some() && self.peek() != Some('"') {
                        if self.peek() == Some('\\') {
                            self.advance();
                        }
                        self.advance();
                    }
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let body_end = if depth == 0 { self.index.saturating_sub(1) } else { self.index };
        let body: String = self.chars[body_start..body_end].iter().map(|c| c.value).collect();
        let lexeme = self.slice_since(start);
        let kind = if direction_in {
            TokenKind::ProcessSubstitutionIn
        } else {
            TokenKind::ProcessSubstitutionOut
        };
        let mut token = Token::new(kind, lexeme, self.make_position(start));
        token.parts = Some(vec![crate::token::TokenPart {
            value: body,
            kind: crate::token::PartKind::Expansion,
            quote_type: crate::token::QuoteType::None,
        }]);
        Ok(Some(token))
    }
}

/// Result of a full [`Lexer::tokenize`] call: the token list, any
/// errors collected along the way, and the lexer itself (so a caller
/// like the heredoc collector can `extend` it with more input and
/// keep scanning from where it left off).
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
    pub lexer: Lexer,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> Vec<Token> {
        Lexer::tokenize(text, Source::Unknown, LexerConfig::batch()).tokens
    }

    #[test]
    fn empty_input_is_eof_only() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn whitespace_only_is_eof_only() {
        let tokens = tokenize("   \t  ");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn comment_line_is_eof_only() {
        let tokens = tokenize("# just a comment");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn simple_words_and_pipe() {
        let tokens = tokenize("echo hello | grep txt");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![Word, Word, Pipe, Word, Word, Eof]
        );
    }

    #[test]
    fn every_token_lexeme_matches_source_span() {
        let text = "echo hello | grep txt";
        let tokens = tokenize(text);
        for t in &tokens {
            if t.is_eof() {
                continue;
            }
            let slice = &text.as_bytes()[t.position.byte_range()];
            assert_eq!(std::str::from_utf8(slice).unwrap(), t.lexeme);
        }
    }
}
