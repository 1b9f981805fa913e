//! Operator recognition: redirections, separators, logical operators,
//! pipes, background, and bracket operators (spec §4.2.4).

use super::Lexer;
use crate::token::{DupTarget, Token, TokenKind};

/// Operators tried longest-first, as spec §4.2.4 prescribes.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("<<<", TokenKind::TLess),
    ("<<-", TokenKind::DLessDash),
    ("<<", TokenKind::DLess),
    (">>", TokenKind::DGreat),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    (";;&", TokenKind::DSemiAnd),
    (";;", TokenKind::DSemi),
    (";&", TokenKind::SemiAnd),
    ("<>", TokenKind::LessGreat),
    (">|", TokenKind::ClobberGreat),
    ("&>", TokenKind::AndGreat),
    ("<&", TokenKind::LessAnd),
    (">&", TokenKind::GreatAnd),
    ("[[", TokenKind::DOpenBracket),
    ("]]", TokenKind::DCloseBracket),
    // Note: a bare `((`/`))` pair is deliberately NOT in this table.
    // Doubled parens are always claimed by `try_arithmetic_command`
    // before this recognizer runs; matching `))` here as one token
    // would wrongly merge two closes of separately nested `(...)`
    // groups (`(echo hi))` needs two distinct `)` tokens).
    ("<", TokenKind::Less),
    (">", TokenKind::Great),
    ("|", TokenKind::Pipe),
    ("&", TokenKind::Amp),
    (";", TokenKind::Semicolon),
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    ("{", TokenKind::OpenBrace),
    ("}", TokenKind::CloseBrace),
];

impl Lexer {
    /// Tries to match an operator at the current position, including
    /// the optional leading file-descriptor digit run that
    /// distinguishes `2>` from the word `2` followed by `>`.
    pub(super) fn try_operator(&mut self) -> Result<Option<Token>, super::LexError> {
        let start = self.mark();

        // Optional leading digit run naming a file descriptor.
        let mut fd = None;
        if self.peek().map_or(false, |c| c.is_ascii_digit()) {
            let digits_start = self.index;
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
            let next_is_redir = matches!(self.peek(), Some('<') | Some('>'));
            if next_is_redir {
                let digits: String =
                    self.chars[digits_start..self.index].iter().map(|c| c.value).collect();
                fd = digits.parse::<u32>().ok();
            } else {
                self.reset(start);
            }
        }

        let remaining = self.peek_str(3);
        let Some((lexeme, kind)) = OPERATORS
            .iter()
            .find(|(op, _)| remaining.starts_with(op))
            .map(|(op, kind)| (*op, *kind))
        else {
            self.reset(start);
            return Ok(None);
        };

        for _ in 0..lexeme.chars().count() {
            self.advance();
        }

        let mut dup_fd = None;
        if matches!(kind, TokenKind::LessAnd | TokenKind::GreatAnd) {
            if self.peek() == Some('-') {
                self.advance();
                dup_fd = Some(DupTarget::Close);
            } else if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                let digits_start = self.index;
                while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
                let digits: String =
                    self.chars[digits_start..self.index].iter().map(|c| c.value).collect();
                if let Ok(n) = digits.parse::<u32>() {
                    dup_fd = Some(DupTarget::Fd(n));
                }
            }
        }

        let full_lexeme = self.slice_since(start);
        let mut token = Token::new(kind, full_lexeme, self.make_position(start));
        token.fd = fd;
        token.dup_fd = dup_fd;
        Ok(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Lexer, LexerConfig};
    use crate::source::Source;
    use crate::token::{DupTarget, TokenKind};

    fn tokenize(text: &str) -> Vec<crate::token::Token> {
        Lexer::tokenize(text, Source::Unknown, LexerConfig::batch()).tokens
    }

    #[test]
    fn fd_duplication_is_one_token() {
        let tokens = tokenize("2>&1");
        assert_eq!(tokens.len(), 2); // REDIRECT_DUP + Eof
        assert_eq!(tokens[0].kind, TokenKind::GreatAnd);
        assert_eq!(tokens[0].fd, Some(2));
        assert_eq!(tokens[0].dup_fd, Some(DupTarget::Fd(1)));
    }

    #[test]
    fn close_fd_form() {
        let tokens = tokenize("3>&-");
        assert_eq!(tokens[0].fd, Some(3));
        assert_eq!(tokens[0].dup_fd, Some(DupTarget::Close));
    }

    #[test]
    fn here_string_operator() {
        let tokens = tokenize("<<<");
        assert_eq!(tokens[0].kind, TokenKind::TLess);
    }

    #[test]
    fn plain_number_is_not_consumed_as_fd() {
        let tokens = tokenize("echo 123");
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].lexeme, "123");
    }

    #[test]
    fn longest_match_wins_for_case_terminators() {
        let tokens = tokenize(";;&");
        assert_eq!(tokens[0].kind, TokenKind::DSemiAnd);
    }
}
