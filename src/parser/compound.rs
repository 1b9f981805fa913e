//! Compound command dispatch: subshells, brace groups, `if`/`while`/
//! `until`/`for`/`case`/`select`, the C-style `for ((;;))` form, the
//! bare `((...))` arithmetic command, and `[[ ... ]]` (spec §4.5.4,
//! §4.5.5, SPEC_FULL §4.5 for `select` and `[[ ]]`).
//!
//! Every construct here follows the same shape: recognize the opening
//! token, parse a body of [`crate::ast::StatementList`]s, require the
//! matching close, then collect any trailing redirections that attach
//! to the construct as a whole (spec §4.5.5).

use super::core::{PResult, Parser};
use super::error::{ParseError, ParseErrorKind};
use crate::ast::*;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Tries to parse a compound command at the current position.
    /// Returns `Ok(None)` if the current token cannot start one.
    pub fn try_compound_command(&mut self, context: ExecutionContext) -> PResult<Option<CompoundCommand>> {
        let position = self.position();
        let kind = match self.peek_kind() {
            TokenKind::OpenParen => CompoundCommandKind::Subshell(self.parse_subshell()?),
            TokenKind::OpenBrace => CompoundCommandKind::BraceGroup(self.parse_brace_group()?),
            TokenKind::If => CompoundCommandKind::If(self.parse_if()?),
            TokenKind::While => CompoundCommandKind::While(self.parse_while()?),
            TokenKind::Until => CompoundCommandKind::Until(self.parse_until()?),
            TokenKind::For => return self.parse_for_or_c_style_for(position, context).map(Some),
            TokenKind::Case => CompoundCommandKind::Case(self.parse_case()?),
            TokenKind::Select if self.config.bash_extensions => CompoundCommandKind::Select(self.parse_select()?),
            TokenKind::ArithmeticCommand => CompoundCommandKind::Arithmetic(self.parse_arithmetic_command()?),
            TokenKind::DOpenBracket if self.config.bash_extensions => {
                CompoundCommandKind::Test(self.parse_enhanced_test()?)
            }
            _ => return Ok(None),
        };
        let redirects = self.parse_trailing_redirects()?;
        Ok(Some(CompoundCommand {
            kind,
            redirects,
            context,
            position,
        }))
    }

    fn parse_trailing_redirects(&mut self) -> PResult<Vec<Redirect>> {
        let mut redirects = Vec::new();
        while let Some(r) = self.try_redirect()? {
            redirects.push(r);
        }
        Ok(redirects)
    }

    fn parse_subshell(&mut self) -> PResult<SubshellGroup> {
        let position = self.position();
        self.advance(); // (
        let body = self.parse_statement_list_until(&[TokenKind::CloseParen])?;
        self.expect(
            TokenKind::CloseParen,
            ParseErrorKind::UnclosedConstruct { opening: "(", expected: ")", opening_position: position },
        )?;
        if body.is_empty() {
            self.record_error(ParseError::new(ParseErrorKind::EmptyBody { construct: "subshell" }, position))?;
        }
        Ok(SubshellGroup { body, position })
    }

    fn parse_brace_group(&mut self) -> PResult<BraceGroup> {
        let position = self.position();
        self.advance(); // {
        let body = self.parse_statement_list_until(&[TokenKind::CloseBrace])?;
        self.expect(
            TokenKind::CloseBrace,
            ParseErrorKind::UnclosedConstruct { opening: "{", expected: "}", opening_position: position },
        )?;
        if body.is_empty() {
            self.record_error(ParseError::new(ParseErrorKind::EmptyBody { construct: "{ }" }, position))?;
        }
        Ok(BraceGroup { body, position })
    }

    fn parse_if(&mut self) -> PResult<IfConditional> {
        let position = self.position();
        self.advance(); // if
        let condition = self.parse_statement_list_until(&[TokenKind::Then])?;
        self.expect(
            TokenKind::Then,
            ParseErrorKind::UnclosedConstruct { opening: "if", expected: "then", opening_position: position },
        )?;
        let then_body = self.parse_statement_list_until(&[TokenKind::Elif, TokenKind::Else, TokenKind::Fi])?;

        let mut elifs = Vec::new();
        while self.peek_kind() == TokenKind::Elif {
            let elif_position = self.position();
            self.advance();
            let elif_condition = self.parse_statement_list_until(&[TokenKind::Then])?;
            self.expect(
                TokenKind::Then,
                ParseErrorKind::UnclosedConstruct { opening: "elif", expected: "then", opening_position: elif_position },
            )?;
            let elif_body = self.parse_statement_list_until(&[TokenKind::Elif, TokenKind::Else, TokenKind::Fi])?;
            elifs.push(ElifClause {
                condition: elif_condition,
                body: elif_body,
                position: elif_position,
            });
        }

        let else_body = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_statement_list_until(&[TokenKind::Fi])?)
        } else {
            None
        };

        self.expect(
            TokenKind::Fi,
            ParseErrorKind::UnclosedConstruct { opening: "if", expected: "fi", opening_position: position },
        )?;

        Ok(IfConditional {
            condition,
            then_body,
            elifs,
            else_body,
            position,
        })
    }

    fn parse_while(&mut self) -> PResult<WhileLoop> {
        let position = self.position();
        self.advance(); // while
        let condition = self.parse_statement_list_until(&[TokenKind::Do])?;
        let body = self.parse_do_clause(position, "while")?;
        Ok(WhileLoop { condition, body, position })
    }

    fn parse_until(&mut self) -> PResult<UntilLoop> {
        let position = self.position();
        self.advance(); // until
        let condition = self.parse_statement_list_until(&[TokenKind::Do])?;
        let body = self.parse_do_clause(position, "until")?;
        Ok(UntilLoop { condition, body, position })
    }

    fn parse_do_clause(&mut self, opening_position: crate::position::Position, opening: &'static str) -> PResult<StatementList> {
        self.expect(
            TokenKind::Do,
            ParseErrorKind::UnclosedConstruct { opening, expected: "do", opening_position },
        )?;
        let body = self.parse_statement_list_until(&[TokenKind::Done])?;
        self.expect(
            TokenKind::Done,
            ParseErrorKind::UnclosedConstruct { opening: "do", expected: "done", opening_position },
        )?;
        Ok(body)
    }

    fn parse_for_or_c_style_for(&mut self, position: crate::position::Position, context: ExecutionContext) -> PResult<CompoundCommand> {
        self.advance(); // for

        if self.peek_kind() == TokenKind::ArithmeticCommand {
            let arith_tok = self.advance();
            let text = arith_tok
                .parts
                .as_ref()
                .and_then(|p| p.first())
                .map(|p| p.value.as_str())
                .unwrap_or("");
            let clauses: Vec<&str> = text.splitn(3, ';').collect();
            let (init, condition, update) = match clauses.as_slice() {
                [a, b, c] => (a.trim().to_string(), b.trim().to_string(), c.trim().to_string()),
                _ => {
                    self.record_error(ParseError::new(ParseErrorKind::InvalidLoopVariable, position))?;
                    (String::new(), String::new(), String::new())
                }
            };
            self.skip_separators();
            let body = self.parse_do_clause(position, "for")?;
            let redirects = self.parse_trailing_redirects()?;
            return Ok(CompoundCommand {
                kind: CompoundCommandKind::CStyleFor(CStyleForLoop {
                    init,
                    condition,
                    update,
                    body,
                    position,
                }),
                redirects,
                context,
                position,
            });
        }

        let variable = self.take_loop_variable()?;
        self.skip_newlines();
        let words = self.parse_optional_in_word_list()?;
        self.skip_separators();
        let body = self.parse_do_clause(position, "for")?;
        let redirects = self.parse_trailing_redirects()?;
        Ok(CompoundCommand {
            kind: CompoundCommandKind::For(ForLoop { variable, words, body, position }),
            redirects,
            context,
            position,
        })
    }

    fn parse_select(&mut self) -> PResult<SelectLoop> {
        let position = self.position();
        self.advance(); // select
        let variable = self.take_loop_variable()?;
        self.skip_newlines();
        let words = self.parse_optional_in_word_list()?;
        self.skip_separators();
        let body = self.parse_do_clause(position, "select")?;
        Ok(SelectLoop { variable, words, body, position })
    }

    fn take_loop_variable(&mut self) -> PResult<String> {
        if self.peek_kind() != TokenKind::Word {
            return Err(ParseError::new(ParseErrorKind::InvalidLoopVariable, self.position()));
        }
        let tok = self.peek().clone();
        if tok.parts.is_some() || tok.quote_type != crate::token::QuoteType::None {
            return Err(ParseError::new(ParseErrorKind::InvalidLoopVariable, self.position()));
        }
        self.advance();
        Ok(tok.lexeme)
    }

    /// Parses the optional `in word...` clause shared by `for` and
    /// `select`. `None` means the clause was omitted entirely.
    fn parse_optional_in_word_list(&mut self) -> PResult<Option<Vec<Operand>>> {
        if self.eat(TokenKind::In).is_none() {
            return Ok(None);
        }
        let mut words = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Word | TokenKind::SingleQuoted | TokenKind::DoubleQuoted | TokenKind::Variable => {
                    words.push(Operand::Word(self.advance().into()));
                }
                TokenKind::ProcessSubstitutionIn | TokenKind::ProcessSubstitutionOut => {
                    let tok = self.advance();
                    let direction = if tok.kind == TokenKind::ProcessSubstitutionIn {
                        ProcessSubstitutionDirection::In
                    } else {
                        ProcessSubstitutionDirection::Out
                    };
                    let command_text = tok.parts.as_ref().and_then(|p| p.first()).map(|p| p.value.clone()).unwrap_or_default();
                    words.push(Operand::ProcessSubstitution(ProcessSubstitution {
                        direction,
                        command_text,
                        position: tok.position,
                    }));
                }
                _ => break,
            }
        }
        Ok(Some(words))
    }

    fn parse_case(&mut self) -> PResult<CaseConditional> {
        let position = self.position();
        self.advance(); // case
        if !matches!(
            self.peek_kind(),
            TokenKind::Word | TokenKind::SingleQuoted | TokenKind::DoubleQuoted | TokenKind::Variable
        ) {
            return Err(ParseError::new(ParseErrorKind::MalformedCaseHeader, self.position()));
        }
        let subject: Word = self.advance().into();
        self.skip_newlines();
        self.expect(TokenKind::In, ParseErrorKind::MalformedCaseHeader)?;
        self.skip_newlines();

        let mut items = Vec::new();
        while self.peek_kind() != TokenKind::Esac {
            if self.at_eof() {
                return Err(ParseError::new(
                    ParseErrorKind::UnclosedConstruct { opening: "case", expected: "esac", opening_position: position },
                    self.position(),
                ));
            }
            items.push(self.parse_case_item()?);
            self.skip_newlines();
        }
        self.advance(); // esac
        Ok(CaseConditional { subject, items, position })
    }

    fn parse_case_item(&mut self) -> PResult<CaseItem> {
        let position = self.position();
        self.eat(TokenKind::OpenParen);
        let mut patterns = vec![self.take_case_pattern()?];
        while self.eat(TokenKind::Pipe).is_some() {
            patterns.push(self.take_case_pattern()?);
        }
        self.expect(TokenKind::CloseParen, ParseErrorKind::UnclosedPatternList)?;
        self.skip_newlines();
        let body = self.parse_statement_list_until(&[TokenKind::DSemi, TokenKind::SemiAnd, TokenKind::DSemiAnd, TokenKind::Esac]);
        let body = match body {
            Ok(b) => b,
            Err(e) => return Err(e),
        };
        let terminator = match self.peek_kind() {
            TokenKind::DSemi => {
                self.advance();
                CaseTerminator::Break
            }
            TokenKind::SemiAnd => {
                self.advance();
                CaseTerminator::FallThrough
            }
            TokenKind::DSemiAnd => {
                self.advance();
                CaseTerminator::FallThroughTest
            }
            // `esac` immediately after a case item's body implies `;;`.
            _ => CaseTerminator::Break,
        };
        self.skip_newlines();
        Ok(CaseItem { patterns, body, terminator, position })
    }

    fn take_case_pattern(&mut self) -> PResult<Word> {
        if !matches!(
            self.peek_kind(),
            TokenKind::Word | TokenKind::SingleQuoted | TokenKind::DoubleQuoted | TokenKind::Variable
        ) {
            return Err(ParseError::new(ParseErrorKind::InvalidAssignment, self.position()));
        }
        Ok(self.advance().into())
    }

    fn parse_arithmetic_command(&mut self) -> PResult<ArithmeticEvaluation> {
        let position = self.position();
        let tok = self.advance();
        let expression = tok
            .parts
            .as_ref()
            .and_then(|p| p.first())
            .map(|p| p.value.clone())
            .unwrap_or_default();
        Ok(ArithmeticEvaluation { expression, position })
    }

    fn parse_enhanced_test(&mut self) -> PResult<EnhancedTestStatement> {
        let position = self.position();
        self.advance(); // [[
        let expr = self.parse_test_expression()?;
        self.expect(
            TokenKind::DCloseBracket,
            ParseErrorKind::UnclosedConstruct { opening: "[[", expected: "]]", opening_position: position },
        )?;
        Ok(EnhancedTestStatement { expr, position })
    }
}
