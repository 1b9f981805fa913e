//! `$...` expansions, backquoted command substitution, and the bare
//! `((...))` arithmetic command (spec §4.2.6).

use super::error::{LexError, LexErrorKind};
use super::{is_identifier_continue, is_identifier_start, Lexer};
use crate::position::Position;
use crate::token::{PartKind, QuoteType, Token, TokenKind, TokenPart};

/// Special single-character parameters, recognized as a `$x` token of
/// length 2 (spec §4.2.6).
const SPECIAL_PARAMS: &[char] = &[
    '?', '#', '$', '!', '@', '*', '-', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

impl Lexer {
    /// Scans a balanced run starting just after an opening delimiter,
    /// honoring nested nesting of the same delimiter pair, single and
    /// double quotes, and backslash escapes. Returns the raw text of
    /// the body (not including the delimiters) once the matching
    /// closer has been consumed, or records/raises an
    /// `UnclosedExpansion` error if input runs out first.
    fn scan_balanced(
        &mut self,
        open: char,
        close: char,
        whole_start: super::Mark,
        what: &'static str,
    ) -> Result<String, LexError> {
        let body_start = self.index;
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => {
                    let err = LexError::new(
                        LexErrorKind::UnclosedExpansion,
                        self.make_position(whole_start),
                        format!("unterminated {what}"),
                    )
                    .with_expected(close.to_string());
                    self.record_error(err.clone())?;
                    let body: String = self.chars[body_start..self.index]
                        .iter()
                        .map(|c| c.value)
                        .collect();
                    return Ok(body);
                }
                Some(c) if c == open => {
                    depth += 1;
                    self.advance();
                }
                Some(c) if c == close => {
                    depth -= 1;
                    let end = self.index;
                    self.advance();
                    if depth == 0 {
                        let body: String =
                            self.chars[body_start..end].iter().map(|c| c.value).collect();
                        return Ok(body);
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
    }

    /// Recognizes a bare `((...))` arithmetic command. A doubled `(`
    /// with no intervening whitespace is always an arithmetic command
    /// in this grammar; two genuinely nested subshells require a
    /// space (`( (cmd) )`), matching real shell behavior.
    pub(super) fn try_arithmetic_command(&mut self) -> Result<Option<Token>, LexError> {
        if self.peek() != Some('(') || self.peek_at(1) != Some('(') {
            return Ok(None);
        }
        let start = self.mark();
        self.advance();
        self.advance();
        let body_start = self.index;
        let mut depth = 1usize;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (None, _) => {
                    let err = LexError::new(
                        LexErrorKind::UnclosedExpansion,
                        self.make_position(start),
                        "unterminated arithmetic command",
                    )
                    .with_expected("))");
                    self.record_error(err)?;
                    break;
                }
                (Some('('), _) => {
                    depth += 1;
                    self.advance();
                }
                (Some(')'), Some(')')) if depth == 1 => {
                    let body_end = self.index;
                    self.advance();
                    self.advance();
                    let body: String =
                        self.chars[body_start..body_end].iter().map(|c| c.value).collect();
                    let lexeme = self.slice_since(start);
                    let mut token =
                        Token::new(TokenKind::ArithmeticCommand, lexeme, self.make_position(start));
                    token.parts = Some(vec![TokenPart {
                        value: body,
                        kind: PartKind::Expansion,
                        quote_type: QuoteType::None,
                    }]);
                    return Ok(Some(token));
                }
                (Some(')'), _) => {
                    depth -= 1;
                    self.advance();
                }
                (Some('\''), _) => {
                    self.advance();
                    while self.peek().is_some() && self.peek() != Some('\'') {
                        self.advance();
                    }
                    self.advance();
                }
                (Some('"'), _) => {
                    self.advance();
                    while self.peek().is_some() && self.peek() != Some('"') {
                        if self.peek() == Some('\\') {
                            self.advance();
                        }
                        self.advance();
                    }
                    self.advance();
                }
                (Some('\\'), _) => {
                    self.advance();
                    self.advance();
                }
                (Some(_), _) => {
                    self.advance();
                }
            }
        }
        let body: String = self.chars[body_start..self.index].iter().map(|c| c.value).collect();
        let lexeme = self.slice_since(start);
        let mut token = Token::new(TokenKind::ArithmeticCommand, lexeme, self.make_position(start));
        token.parts = Some(vec![TokenPart {
            value: body,
            kind: PartKind::Expansion,
            quote_type: QuoteType::None,
        }]);
        Ok(Some(token))
    }

    /// Recognizes a standalone `$...` expansion or a backquoted
    /// command substitution as a whole token (used when such an
    /// expansion appears where a fresh word begins; when it appears
    /// mid-word, [`super::word`] calls [`Lexer::scan_dollar_part`] /
    /// [`Lexer::scan_backquote_part`] instead to produce a
    /// [`TokenPart`]).
    pub(super) fn try_bare_expansion(&mut self) -> Result<Option<Token>, LexError> {
        if self.peek() == Some('$') {
            let start = self.mark();
            let (kind, body) = self.scan_dollar(start)?;
            let lexeme = self.slice_since(start);
            let mut token = Token::new(kind, lexeme, self.make_position(start));
            token.parts = Some(vec![TokenPart {
                value: body,
                kind: PartKind::Expansion,
                quote_type: QuoteType::None,
            }]);
            return Ok(Some(token));
        }
        if self.peek() == Some('`') {
            let start = self.mark();
            let body = self.scan_backquote(start)?;
            let lexeme = self.slice_since(start);
            let mut token = Token::new(TokenKind::Backquote, lexeme, self.make_position(start));
            token.parts = Some(vec![TokenPart {
                value: body,
                kind: PartKind::Expansion,
                quote_type: QuoteType::None,
            }]);
            return Ok(Some(token));
        }
        Ok(None)
    }

    /// Scans one `$...` form starting at `$`, returning its
    /// `TokenKind` and the raw body text (without the `$`, and
    /// without the delimiters for bracketed forms).
    pub(super) fn scan_dollar(
        &mut self,
        start: super::Mark,
    ) -> Result<(TokenKind, String), LexError> {
        self.advance(); // $

        // `$((` is peeked two characters ahead before falling back to `$(`.
        if self.peek() == Some('(') && self.peek_at(1) == Some('(') {
            self.advance();
            self.advance();
            let body = self.scan_balanced('(', ')', start, "arithmetic expansion")?;
            // scan_balanced stops at the first matching `)`; consume the second.
            if self.peek() == Some(')') {
                self.advance();
            }
            return Ok((TokenKind::ArithmeticExpansion, body));
        }
        if self.peek() == Some('(') {
            self.advance();
            let body = self.scan_balanced('(', ')', start, "command substitution")?;
            return Ok((TokenKind::CommandSubstitution, body));
        }
        if self.peek() == Some('{') {
            self.advance();
            let body = self.scan_balanced('{', '}', start, "parameter expansion")?;
            return Ok((TokenKind::ParamExpansion, body));
        }
        if let Some(c) = self.peek() {
            if SPECIAL_PARAMS.contains(&c) {
                // `$0`..`$9` and the punctuation parameters are
                // length-2 tokens; multi-digit positional parameters
                // beyond `$9` require `${10}`.
                self.advance();
                return Ok((TokenKind::Variable, c.to_string()));
            }
            if is_identifier_start(c, self.config.unicode_identifiers) {
                let name_start = self.index;
                while self
                    .peek()
                    .map_or(false, |c| is_identifier_continue(c, self.config.unicode_identifiers))
                {
                    self.advance();
                }
                let name: String =
                    self.chars[name_start..self.index].iter().map(|c| c.value).collect();
                return Ok((TokenKind::Variable, name));
            }
        }
        // A bare `$` with nothing recognizable after it is a literal
        // dollar sign, not an expansion. The caller treats this as an
        // ordinary literal character.
        Ok((TokenKind::Variable, String::new()))
    }

    /// Scans a backquoted command substitution, honoring the
    /// restricted escape set `\$ \\ \``.
    pub(super) fn scan_backquote(&mut self, start: super::Mark) -> Result<String, LexError> {
        self.advance(); // `
        let body_start = self.index;
        loop {
            match self.peek() {
                None => {
                    let err = LexError::new(
                        LexErrorKind::UnclosedExpansion,
                        self.make_position(start),
                        "unterminated backquoted command substitution",
                    )
                    .with_expected("`");
                    self.record_error(err)?;
                    let body: String =
                        self.chars[body_start..self.index].iter().map(|c| c.value).collect();
                    return Ok(body);
                }
                Some('`') => {
                    let end = self.index;
                    self.advance();
                    let body: String = self.chars[body_start..end].iter().map(|c| c.value).collect();
                    return Ok(body);
                }
                Some('\\') if matches!(self.peek_at(1), Some('$') | Some('\\') | Some('`')) => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}
