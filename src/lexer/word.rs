//! Literal word scanning and composite-word assembly (spec §4.2.3,
//! §4.2.2's "literal word" recognizer, and the extglob/tilde
//! supplements from SPEC_FULL §4.2).

use super::error::{LexError, LexErrorKind};
use super::Lexer;
use crate::token::{PartKind, QuoteType, Token, TokenKind, TokenPart};

const EXTGLOB_PREFIXES: &[char] = &['?', '*', '+', '@', '!'];

impl Lexer {
    fn is_word_terminator(&self, c: char) -> bool {
        if c == '\n' {
            return true;
        }
        if super::is_blank(c, self.config.unicode_whitespace) {
            return true;
        }
        // A `#` is only a comment at a word boundary, which
        // `skip_blanks_and_comment` already strips before a word
        // starts; inside a word (e.g. `foo#bar`) it is literal.
        matches!(c, '<' | '>' | '|' | '&' | ';' | '(' | ')' | '{' | '}')
    }

    /// Scans a `?(...)`, `*(...)`, ... extglob group as raw literal
    /// text (balanced parens, quote-aware), appended verbatim to the
    /// caller's literal buffer. The pattern semantics are the
    /// executor's concern; the lexer only needs to avoid splitting
    /// the group at its internal `|` and `)` characters.
    fn scan_extglob_group(&mut self, buf: &mut String) {
        buf.push(self.peek().unwrap()); // the prefix char
        self.advance();
        buf.push('(');
        self.advance();
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => break,
                Some('(') => {
                    depth += 1;
                    buf.push('(');
                    self.advance();
                }
                Some(')') => {
                    depth -= 1;
                    buf.push(')');
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                Some('\\') => {
                    buf.push('\\');
                    self.advance();
                    if let Some(c) = self.peek() {
                        buf.push(c);
                        self.advance();
                    }
                }
                Some(c) => {
                    buf.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Scans a leading `~` or `~user` run at the start of a word.
    fn scan_tilde(&mut self) -> String {
        let mut s = String::new();
        s.push('~');
        self.advance();
        while self
            .peek()
            .map_or(false, |c| is_tilde_name_char(c))
        {
            s.push(self.peek().unwrap());
            self.advance();
        }
        s
    }

    /// The lowest-priority recognizer: whatever is left once none of
    /// comment, process substitution, the arithmetic command,
    /// operators, `$`/backquote expansions or quotes matched becomes
    /// part of a word. This function owns the whole composite-word
    /// assembly loop (spec §4.2.3).
    pub(super) fn lex_word(&mut self) -> Result<Token, LexError> {
        let start = self.mark();
        let mut parts: Vec<TokenPart> = Vec::new();
        let mut literal = String::new();
        let mut first = true;

        loop {
            let Some(c) = self.peek() else { break };
            if self.is_word_terminator(c) {
                break;
            }
            match c {
                '~' if first => {
                    if !literal.is_empty() {
                        parts.push(TokenPart {
                            value: std::mem::take(&mut literal),
                            kind: PartKind::Literal,
                            quote_type: QuoteType::None,
                        });
                    }
                    let text = self.scan_tilde();
                    parts.push(TokenPart {
                        value: text,
                        kind: PartKind::Tilde,
                        quote_type: QuoteType::None,
                    });
                }
                '\'' => {
                    if !literal.is_empty() {
                        parts.push(TokenPart {
                            value: std::mem::take(&mut literal),
                            kind: PartKind::Literal,
                            quote_type: QuoteType::None,
                        });
                    }
                    let text = self.scan_single_quote()?;
                    parts.push(TokenPart {
                        value: text,
                        kind: PartKind::Literal,
                        quote_type: QuoteType::Single,
                    });
                }
                '"' => {
                    if !literal.is_empty() {
                        parts.push(TokenPart {
                            value: std::mem::take(&mut literal),
                            kind: PartKind::Literal,
                            quote_type: QuoteType::None,
                        });
                    }
                    let mut sub = self.scan_double_quote_parts()?;
                    parts.append(&mut sub);
                }
                '$' => {
                    if !literal.is_empty() {
                        parts.push(TokenPart {
                            value: std::mem::take(&mut literal),
                            kind: PartKind::Literal,
                            quote_type: QuoteType::None,
                        });
                    }
                    let mark = self.mark();
                    let (kind, body) = self.scan_dollar(mark)?;
                    if body.is_empty() && kind == TokenKind::Variable {
                        // Bare `$` with nothing recognizable after it:
                        // a literal dollar sign.
                        literal.push('$');
                    } else {
                        let part_kind = match kind {
                            TokenKind::Variable => PartKind::Variable,
                            _ => PartKind::Expansion,
                        };
                        parts.push(TokenPart {
                            value: body,
                            kind: part_kind,
                            quote_type: QuoteType::None,
                        });
                    }
                }
                '`' => {
                    if !literal.is_empty() {
                        parts.push(TokenPart {
                            value: std::mem::take(&mut literal),
                            kind: PartKind::Literal,
                            quote_type: QuoteType::None,
                        });
                    }
                    let mark = self.mark();
                    let body = self.scan_backquote(mark)?;
                    parts.push(TokenPart {
                        value: body,
                        kind: PartKind::Expansion,
                        quote_type: QuoteType::None,
                    });
                }
                '\\' => {
                    self.advance();
                    match self.peek() {
                        Some('\n') => {
                            self.advance(); // line continuation, removed
                        }
                        Some(c2) => {
                            literal.push('\\');
                            literal.push(c2);
                            self.advance();
                        }
                        None => {
                            let err = LexError::new(
                                LexErrorKind::InvalidEscape,
                                self.current_position(),
                                "trailing backslash at end of input",
                            );
                            self.record_error(err)?;
                        }
                    }
                }
                c if self.config.extglob_enabled()
                    && EXTGLOB_PREFIXES.contains(&c)
                    && self.peek_at(1) == Some('(') =>
                {
                    self.scan_extglob_group(&mut literal);
                }
                c => {
                    literal.push(c);
                    self.advance();
                }
            }
            first = false;
        }

        if !literal.is_empty() {
            parts.push(TokenPart {
                value: literal,
                kind: PartKind::Literal,
                quote_type: QuoteType::None,
            });
        }

        if parts.is_empty() {
            let err = LexError::new(
                LexErrorKind::UnexpectedChar,
                self.current_position(),
                format!(
                    "unexpected character {:?}",
                    self.peek().unwrap_or('\u{0}')
                ),
            );
            self.record_error(err)?;
            // Consume one character so recoverable mode makes progress.
            self.advance();
            let lexeme = self.slice_since(start);
            return Ok(Token::new(TokenKind::Word, lexeme, self.make_position(start)));
        }

        let lexeme = self.slice_since(start);
        let position = self.make_position(start);

        let is_whole_single_quote =
            parts.len() == 1 && parts[0].quote_type == QuoteType::Single && lexeme.starts_with('\'');
        let is_whole_double_quote = lexeme.starts_with('"')
            && lexeme.ends_with('"')
            && parts.iter().all(|p| p.quote_type == QuoteType::Double);

        if is_whole_single_quote {
            return Ok(Token {
                kind: TokenKind::SingleQuoted,
                lexeme,
                position,
                parts: None,
                quote_type: QuoteType::Single,
                fd: None,
                dup_fd: None,
            });
        }
        if is_whole_double_quote {
            let parts = if parts.len() == 1 && parts[0].kind == PartKind::Literal {
                None
            } else {
                Some(parts)
            };
            return Ok(Token {
                kind: TokenKind::DoubleQuoted,
                lexeme,
                position,
                parts,
                quote_type: QuoteType::Double,
                fd: None,
                dup_fd: None,
            });
        }

        let parts = if parts.len() == 1
            && parts[0].kind == PartKind::Literal
            && parts[0].quote_type == QuoteType::None
        {
            None
        } else {
            Some(parts)
        };
        Ok(Token {
            kind: TokenKind::Word,
            lexeme,
            position,
            parts,
            quote_type: QuoteType::None,
            fd: None,
            dup_fd: None,
        })
    }
}

fn is_tilde_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::super::{Lexer, LexerConfig};
    use crate::source::Source;
    use crate::token::{PartKind, TokenKind};

    fn tokenize(text: &str) -> Vec<crate::token::Token> {
        Lexer::tokenize(text, Source::Unknown, LexerConfig::batch()).tokens
    }

    #[test]
    fn composite_word_has_three_parts() {
        let tokens = tokenize(r#"foo"$bar"baz"#);
        assert_eq!(tokens[0].kind, TokenKind::Word);
        let parts = tokens[0].parts.as_ref().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].kind, PartKind::Literal);
        assert_eq!(parts[0].value, "foo");
        assert_eq!(parts[1].kind, PartKind::Variable);
        assert_eq!(parts[1].value, "bar");
        assert_eq!(parts[2].kind, PartKind::Literal);
        assert_eq!(parts[2].value, "baz");
    }

    #[test]
    fn plain_word_has_no_parts() {
        let tokens = tokenize("hello");
        assert!(tokens[0].parts.is_none());
        assert_eq!(tokens[0].lexeme, "hello");
    }

    #[test]
    fn tilde_prefix_is_its_own_part_kind() {
        let tokens = tokenize("~user/bin");
        let parts = tokens[0].parts.as_ref().unwrap();
        assert_eq!(parts[0].kind, PartKind::Tilde);
        assert_eq!(parts[0].value, "~user");
    }

    #[test]
    fn extglob_group_stays_one_word() {
        let tokens = tokenize("@(foo|bar)");
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[0].lexeme, "@(foo|bar)");
    }
}
