//! Single- and double-quote scanning (spec §4.2.5).

use super::error::{LexError, LexErrorKind};
use super::Lexer;
use crate::token::{PartKind, QuoteType, TokenPart};

impl Lexer {
    /// Scans a `'...'` run, consuming both quote characters. No
    /// escapes and no expansions are recognized inside single quotes.
    /// Returns the inner text (without the quote marks).
    pub(super) fn scan_single_quote(&mut self) -> Result<String, LexError> {
        let start = self.mark();
        self.advance(); // opening '
        let body_start = self.index;
        loop {
            match self.peek() {
                None => {
                    let err = LexError::new(
                        LexErrorKind::UnclosedQuote,
                        self.make_position(start),
                        "unclosed single quote",
                    )
                    .with_expected("'");
                    self.record_error(err)?;
                    let body: String =
                        self.chars[body_start..self.index].iter().map(|c| c.value).collect();
                    return Ok(body);
                }
                Some('\'') => {
                    let end = self.index;
                    self.advance();
                    let body: String = self.chars[body_start..end].iter().map(|c| c.value).collect();
                    return Ok(body);
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scans a `"..."` run, consuming both quote characters, and
    /// decomposes the content into literal / variable / expansion
    /// parts. Recognizes the escapes `\$ \` \" \\ \newline`; a
    /// backslash before any other character is kept literally,
    /// together with the character it precedes (spec §4.2.5).
    pub(super) fn scan_double_quote_parts(&mut self) -> Result<Vec<TokenPart>, LexError> {
        let whole_start = self.mark();
        self.advance(); // opening "
        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            match self.peek() {
                None => {
                    let err = LexError::new(
                        LexErrorKind::UnclosedQuote,
                        self.make_position(whole_start),
                        "unclosed double quote",
                    )
                    .with_expected("\"");
                    self.record_error(err)?;
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => match self.peek_at(1) {
                    Some('\n') => {
                        // Line continuation: removed entirely.
                        self.advance();
                        self.advance();
                    }
                    Some(c @ ('$' | '`' | '"' | '\\')) => {
                        self.advance();
                        self.advance();
                        literal.push(c);
                    }
                    _ => {
                        // Backslash is literal before any other character.
                        self.advance();
                        literal.push('\\');
                    }
                },
                Some('$') => {
                    if !literal.is_empty() {
                        parts.push(TokenPart {
                            value: std::mem::take(&mut literal),
                            kind: PartKind::Literal,
                            quote_type: QuoteType::Double,
                        });
                    }
                    let mark = self.mark();
                    let (kind, body) = self.scan_dollar(mark)?;
                    let part_kind = match kind {
                        crate::token::TokenKind::Variable => PartKind::Variable,
                        _ => PartKind::Expansion,
                    };
                    parts.push(TokenPart {
                        value: body,
                        kind: part_kind,
                        quote_type: QuoteType::Double,
                    });
                }
                Some('`') => {
                    if !literal.is_empty() {
                        parts.push(TokenPart {
                            value: std::mem::take(&mut literal),
                            kind: PartKind::Literal,
                            quote_type: QuoteType::Double,
                        });
                    }
                    let mark = self.mark();
                    let body = self.scan_backquote(mark)?;
                    parts.push(TokenPart {
                        value: body,
                        kind: PartKind::Expansion,
                        quote_type: QuoteType::Double,
                    });
                }
                Some(c) => {
                    literal.push(c);
                    self.advance();
                }
            }
        }
        if !literal.is_empty() {
            parts.push(TokenPart {
                value: literal,
                kind: PartKind::Literal,
                quote_type: QuoteType::Double,
            });
        }
        if parts.is_empty() {
            // An empty "" still needs a representable part so callers
            // can tell this was a (possibly zero-length) double-quoted
            // run rather than nothing at all.
            parts.push(TokenPart {
                value: String::new(),
                kind: PartKind::Literal,
                quote_type: QuoteType::Double,
            });
        }
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Lexer, LexerConfig};
    use crate::source::Source;
    use crate::token::{PartKind, QuoteType, TokenKind};

    fn tokenize(text: &str) -> Vec<crate::token::Token> {
        Lexer::tokenize(text, Source::Unknown, LexerConfig::batch()).tokens
    }

    #[test]
    fn single_quote_has_no_parts() {
        let tokens = tokenize("'hello $x'");
        assert_eq!(tokens[0].kind, TokenKind::SingleQuoted);
        assert!(tokens[0].parts.is_none());
        assert_eq!(tokens[0].quote_type, QuoteType::Single);
    }

    #[test]
    fn double_quote_splits_on_variable() {
        let tokens = tokenize(r#""$x""#);
        assert_eq!(tokens[0].kind, TokenKind::DoubleQuoted);
        let parts = tokens[0].parts.as_ref().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].kind, PartKind::Variable);
        assert_eq!(parts[0].value, "x");
    }

    #[test]
    fn double_quote_literal_only() {
        let tokens = tokenize(r#""value""#);
        assert_eq!(tokens[0].kind, TokenKind::DoubleQuoted);
        assert_eq!(tokens[0].quote_type, QuoteType::Double);
    }

    #[test]
    fn unclosed_single_quote_is_strict_error() {
        let result = Lexer::tokenize("'abc", Source::Unknown, LexerConfig::batch());
        assert_eq!(result.errors.len(), 1);
    }
}
