//! `[[ ... ]]` expression parsing (spec §4.5.3): a small precedence
//! grammar layered directly on top of the token cursor, independent
//! from the compound-command dispatch in [`super::compound`] that
//! recognizes the surrounding `[[`/`]]` brackets.
//!
//! Precedence, lowest to highest: `||` < `&&` < unary `!` < the
//! unary/binary test operators themselves. Grouping with `( )` resets
//! to the lowest precedence inside.

use super::core::{PResult, Parser};
use super::error::{ParseError, ParseErrorKind};
use crate::ast::{BinaryTestOp, TestExpression, UnaryTestOp, Word};
use crate::token::{QuoteType, TokenKind};

const UNARY_FLAGS: &[&str] = &[
    "-a", "-b", "-c", "-d", "-e", "-f", "-g", "-h", "-k", "-n", "-p", "-r", "-s", "-t", "-u", "-w", "-x", "-z", "-G",
    "-L", "-N", "-O", "-S",
];

fn binary_op_for_word(lexeme: &str) -> Option<BinaryTestOp> {
    Some(match lexeme {
        "==" | "=" => BinaryTestOp::Eq,
        "!=" => BinaryTestOp::NotEq,
        "=~" => BinaryTestOp::Match,
        "!~" => BinaryTestOp::NotMatch,
        "-eq" => BinaryTestOp::IntEq,
        "-ne" => BinaryTestOp::IntNotEq,
        "-lt" => BinaryTestOp::IntLess,
        "-le" => BinaryTestOp::IntLessEq,
        "-gt" => BinaryTestOp::IntGreater,
        "-ge" => BinaryTestOp::IntGreaterEq,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    /// Parses the full `[[ ... ]]` body, called by
    /// [`super::compound`] with the cursor positioned just after
    /// `[[`. Does not consume the closing `]]`.
    pub fn parse_test_expression(&mut self) -> PResult<TestExpression> {
        self.parse_test_or()
    }

    fn parse_test_or(&mut self) -> PResult<TestExpression> {
        let position = self.position();
        let mut left = self.parse_test_and()?;
        while self.eat(TokenKind::OrOr).is_some() {
            let right = self.parse_test_and()?;
            left = TestExpression::Or(Box::new(left), Box::new(right), position);
        }
        Ok(left)
    }

    fn parse_test_and(&mut self) -> PResult<TestExpression> {
        let position = self.position();
        let mut left = self.parse_test_not()?;
        while self.eat(TokenKind::AndAnd).is_some() {
            let right = self.parse_test_not()?;
            left = TestExpression::And(Box::new(left), Box::new(right), position);
        }
        Ok(left)
    }

    fn parse_test_not(&mut self) -> PResult<TestExpression> {
        if self.is_test_bang() {
            let position = self.position();
            self.advance();
            let inner = self.parse_test_not()?;
            return Ok(TestExpression::Not(Box::new(inner), position));
        }
        self.parse_test_atom()
    }

    fn is_test_bang(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Bang => true,
            TokenKind::Word => {
                let tok = self.peek();
                tok.parts.is_none() && tok.quote_type == QuoteType::None && tok.lexeme == "!"
            }
            _ => false,
        }
    }

    fn parse_test_atom(&mut self) -> PResult<TestExpression> {
        let position = self.position();

        if self.eat(TokenKind::OpenParen).is_some() {
            let inner = self.parse_test_or()?;
            self.expect(TokenKind::CloseParen, ParseErrorKind::InvalidTestExpression)?;
            return Ok(TestExpression::Group(Box::new(inner), position));
        }

        if self.is_unary_flag() {
            let flag = self.advance().lexeme;
            let operand = self.take_word_operand(ParseErrorKind::InvalidTestExpression)?;
            return Ok(TestExpression::Unary {
                op: UnaryTestOp::FileOrStringTest,
                flag,
                operand,
                position,
            });
        }

        let left = self.take_word_operand(ParseErrorKind::InvalidTestExpression)?;

        if let Some(op) = self.peek_binary_op() {
            self.advance();
            let rhs_quote_type = self.peek_quote_type();
            let right = self.take_word_operand(ParseErrorKind::InvalidTestExpression)?;
            return Ok(TestExpression::Binary {
                op,
                left,
                right,
                rhs_quote_type,
                position,
            });
        }

        // `<`/`>` are lexed as redirection-looking operator tokens
        // even inside `[[ ]]`; recognized here instead of as ordinary
        // words (spec §4.5.3).
        if matches!(self.peek_kind(), TokenKind::Less | TokenKind::Great) {
            let op = if self.peek_kind() == TokenKind::Less {
                BinaryTestOp::Less
            } else {
                BinaryTestOp::Greater
            };
            self.advance();
            let right = self.take_word_operand(ParseErrorKind::InvalidTestExpression)?;
            return Ok(TestExpression::Binary {
                op,
                left,
                right,
                rhs_quote_type: QuoteType::None,
                position,
            });
        }

        Ok(TestExpression::Word(left))
    }

    fn is_unary_flag(&self) -> bool {
        let tok = self.peek();
        if tok.kind != TokenKind::Word || tok.parts.is_some() || tok.quote_type != QuoteType::None {
            return false;
        }
        UNARY_FLAGS.contains(&tok.lexeme.as_str())
    }

    fn peek_binary_op(&self) -> Option<BinaryTestOp> {
        let tok = self.peek();
        if tok.kind != TokenKind::Word || tok.parts.is_some() || tok.quote_type != QuoteType::None {
            return None;
        }
        binary_op_for_word(&tok.lexeme)
    }

    fn peek_quote_type(&self) -> QuoteType {
        self.peek().quote_type
    }

    fn take_word_operand(&mut self, err_kind: ParseErrorKind) -> PResult<Word> {
        if !matches!(
            self.peek_kind(),
            TokenKind::Word | TokenKind::SingleQuoted | TokenKind::DoubleQuoted | TokenKind::Variable
        ) {
            return Err(ParseError::new(err_kind, self.position()));
        }
        Ok(self.advance().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::heredoc;
    use crate::keyword;
    use crate::lexer::{Lexer, LexerConfig};
    use crate::source::Source;
    use crate::token::Token;
    use std::collections::VecDeque;

    fn parser_for(text: &str) -> (Vec<Token>, VecDeque<crate::heredoc::CollectedHeredoc>) {
        let mut tokens = Lexer::tokenize(text, Source::Unknown, LexerConfig::batch()).tokens;
        let (pruned, bodies, errors) = heredoc::collect(&tokens, text);
        assert!(errors.is_empty());
        tokens = pruned;
        keyword::normalize(&mut tokens);
        (tokens, bodies)
    }

    #[test]
    fn bare_word_is_an_implicit_emptiness_test() {
        let (tokens, heredocs) = parser_for("$x");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        assert!(matches!(expr, TestExpression::Word(_)));
    }

    #[test]
    fn unary_file_test() {
        let (tokens, heredocs) = parser_for("-f foo.txt");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        match expr {
            TestExpression::Unary { flag, operand, .. } => {
                assert_eq!(flag, "-f");
                assert_eq!(operand.lexeme, "foo.txt");
            }
            _ => panic!("expected unary test"),
        }
    }

    #[test]
    fn string_equality() {
        let (tokens, heredocs) = parser_for("a == b");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        match expr {
            TestExpression::Binary { op, .. } => assert_eq!(op, BinaryTestOp::Eq),
            _ => panic!("expected binary test"),
        }
    }

    #[test]
    fn glob_match_quote_type_is_tracked() {
        let (tokens, heredocs) = parser_for(r#"a == "b""#);
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        match expr {
            TestExpression::Binary { rhs_quote_type, .. } => assert_eq!(rhs_quote_type, QuoteType::Double),
            _ => panic!("expected binary test"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let (tokens, heredocs) = parser_for("a == a && b == b || c == c");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        match expr {
            TestExpression::Or(left, _, _) => assert!(matches!(*left, TestExpression::And(_, _, _))),
            _ => panic!("expected top-level or"),
        }
    }

    #[test]
    fn negation_applies_to_following_expression() {
        let (tokens, heredocs) = parser_for("! -f foo.txt");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        assert!(matches!(expr, TestExpression::Not(_, _)));
    }

    #[test]
    fn grouping_overrides_precedence() {
        let (tokens, heredocs) = parser_for("( a == a || b == b ) && c == c");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        match expr {
            TestExpression::And(left, _, _) => assert!(matches!(*left, TestExpression::Group(_, _))),
            _ => panic!("expected top-level and"),
        }
    }

    #[test]
    fn string_comparison_operators_reuse_redirection_tokens() {
        let (tokens, heredocs) = parser_for("a < b");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let expr = p.parse_test_expression().unwrap();
        match expr {
            TestExpression::Binary { op, .. } => assert_eq!(op, BinaryTestOp::Less),
            _ => panic!("expected binary test"),
        }
    }
}
