//! Pipeline and command dispatch (spec §4.5.1), including the
//! speculative lookahead that tells a `NAME()` function definition
//! apart from a simple command (spec §4.5.6's snapshot/restore
//! parsing).
//!
//! Grounded on the teacher's `parser::pipeline::pipeline` (negation
//! and `|`-joined command loop), rewritten without its `async`/`Rec`/
//! alias-substitution machinery — this parser never suspends mid-
//! pipeline and has nothing to substitute.

use super::core::{PResult, Parser};
use super::error::{ParseError, ParseErrorKind};
use crate::ast::*;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Parses a pipeline: an optional leading `!`, then one or more
    /// commands joined by `|`. Returns `Ok(None)` if there is no
    /// command at all at the current position.
    pub fn parse_pipeline(&mut self) -> PResult<Option<Pipeline>> {
        let start = self.position();
        let mut negate = false;
        if self.peek_kind() == TokenKind::Bang {
            self.advance();
            negate = true;
            if self.peek_kind() == TokenKind::Bang {
                return Err(ParseError::new(ParseErrorKind::InvalidNegation, self.position()));
            }
        }

        let Some(first) = self.parse_command()? else {
            if negate {
                return Err(ParseError::new(ParseErrorKind::MissingCommand, self.position()));
            }
            return Ok(None);
        };

        let mut commands = vec![first];
        while self.eat(TokenKind::Pipe).is_some() {
            self.skip_newlines();
            match self.parse_command()? {
                Some(next) => commands.push(next),
                None => {
                    return Err(ParseError::new(ParseErrorKind::MissingCommandAfterPipe, self.position()));
                }
            }
        }

        Ok(Some(Pipeline {
            negate,
            commands,
            position: start,
        }))
    }

    /// Dispatches on the current token to parse one element of a
    /// pipeline: a compound command, a function definition, `break`/
    /// `continue`, or a simple command (spec §4.5.1).
    pub fn parse_command(&mut self) -> PResult<Option<Command>> {
        if let Some(compound) = self.try_compound_command(ExecutionContext::Pipeline)? {
            return Ok(Some(Command::Compound(compound)));
        }

        if let Some(func) = self.try_function_definition()? {
            return Ok(Some(Command::FunctionDef(func)));
        }

        if self.peek_kind() == TokenKind::Break {
            let position = self.position();
            self.advance();
            let level = self.try_loop_level()?;
            return Ok(Some(Command::Break(BreakStatement { level }, position)));
        }
        if self.peek_kind() == TokenKind::Continue {
            let position = self.position();
            self.advance();
            let level = self.try_loop_level()?;
            return Ok(Some(Command::Continue(ContinueStatement { level }, position)));
        }

        match self.parse_simple_command()? {
            Some(cmd) => Ok(Some(Command::Simple(cmd))),
            None => Ok(None),
        }
    }

    fn try_loop_level(&mut self) -> PResult<Option<u32>> {
        if self.peek_kind() != TokenKind::Word {
            return Ok(None);
        }
        let tok = self.peek().clone();
        if tok.parts.is_some() {
            return Ok(None);
        }
        match tok.lexeme.parse::<u32>() {
            Ok(0) | Err(_) => Ok(None),
            Ok(n) => {
                self.advance();
                Ok(Some(n))
            }
        }
    }

    /// Speculatively tries to parse `NAME() compound-command` or
    /// `function NAME [()] compound-command`. On failure, restores
    /// the cursor so the caller can retry as a simple command instead
    /// (spec §4.5.6).
    fn try_function_definition(&mut self) -> PResult<Option<FunctionDef>> {
        let mark = self.mark();

        if self.peek_kind() == TokenKind::Function {
            let position = self.position();
            self.advance();
            let Some(name) = self.try_bare_name() else {
                self.reset(mark);
                return Ok(None);
            };
            // Optional empty `()` after `function NAME`.
            if self.peek_kind() == TokenKind::OpenParen && self.peek_at(1).kind == TokenKind::CloseParen {
                self.advance();
                self.advance();
            }
            self.skip_newlines();
            return self.finish_function_definition(name, position, mark);
        }

        if self.peek_kind() == TokenKind::Word {
            let Some(name) = self.try_bare_name() else {
                return Ok(None);
            };
            if self.peek_kind() != TokenKind::OpenParen || self.peek_at(1).kind != TokenKind::CloseParen {
                self.reset(mark);
                return Ok(None);
            }
            let position = self.position();
            self.advance();
            self.advance();
            self.skip_newlines();
            return self.finish_function_definition(name, position, mark);
        }

        Ok(None)
    }

    /// Consumes the current token as a bare function/variable name if
    /// it is an unquoted, partless word, restoring nothing itself —
    /// callers decide whether to back out.
    fn try_bare_name(&mut self) -> Option<String> {
        if self.peek_kind() != TokenKind::Word {
            return None;
        }
        let tok = self.peek().clone();
        if tok.parts.is_some() || tok.quote_type != crate::token::QuoteType::None {
            return None;
        }
        self.advance();
        Some(tok.lexeme)
    }

    fn finish_function_definition(&mut self, name: String, position: crate::position::Position, mark: super::core::Mark) -> PResult<Option<FunctionDef>> {
        match self.try_compound_command(ExecutionContext::Statement)? {
            Some(body) => Ok(Some(FunctionDef {
                name,
                body: Box::new(body),
                position,
            })),
            None => {
                self.reset(mark);
                Err(ParseError::new(ParseErrorKind::InvalidFunctionBody, self.position()))
            }
        }
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
    fn single_command_pipeline() {
        let (tokens, heredocs) = parser_for("foo");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let pipeline = p.parse_pipeline().unwrap().unwrap();
        assert!(!pipeline.negate);
        assert_eq!(pipeline.commands.len(), 1);
    }

    #[test]
    fn pipeline_joins_multiple_commands() {
        let (tokens, heredocs) = parser_for("one | two | three");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let pipeline = p.parse_pipeline().unwrap().unwrap();
        assert_eq!(pipeline.commands.len(), 3);
    }

    #[test]
    fn negated_pipeline() {
        let (tokens, heredocs) = parser_for("! foo");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let pipeline = p.parse_pipeline().unwrap().unwrap();
        assert!(pipeline.negate);
    }

    #[test]
    fn double_negation_is_an_error() {
        let (tokens, heredocs) = parser_for("! ! foo");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let err = p.parse_pipeline().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNegation);
    }

    #[test]
    fn missing_command_after_pipe_is_an_error() {
        let (tokens, heredocs) = parser_for("foo | ;");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let err = p.parse_pipeline().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingCommandAfterPipe);
    }

    #[test]
    fn function_definition_with_parens() {
        let (tokens, heredocs) = parser_for("greet() { echo hi; }");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_command().unwrap().unwrap();
        match cmd {
            Command::FunctionDef(f) => assert_eq!(f.name, "greet"),
            _ => panic!("expected function definition"),
        }
    }

    #[test]
    fn function_keyword_form() {
        let (tokens, heredocs) = parser_for("function greet { echo hi; }");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_command().unwrap().unwrap();
        assert!(matches!(cmd, Command::FunctionDef(_)));
    }

    #[test]
    fn bare_parens_without_body_is_not_a_function() {
        let (tokens, heredocs) = parser_for("name() echo hi");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        // `echo hi` is not a compound command, so this must fail
        // rather than silently parse as a simple command named
        // `name()`.
        assert!(p.parse_command().is_err());
    }

    #[test]
    fn break_with_level() {
        let (tokens, heredocs) = parser_for("break 2");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_command().unwrap().unwrap();
        match cmd {
            Command::Break(b, _) => assert_eq!(b.level, Some(2)),
            _ => panic!("expected break"),
        }
    }
}
