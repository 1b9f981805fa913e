//! And-or lists, statement lists, and the top-level `program` grammar
//! that ties every compound-command body and the whole parse together
//! (spec §4.5.1, §4.5.6).
//!
//! Grounded on the teacher's `parser::list` (`and_or_list`,
//! `maybe_compound_list`, `command_line`), stripped of its async
//! suspension points: this parser already holds its whole token stream,
//! so every loop here just keeps pulling from the cursor.

use super::core::{PResult, Parser};
use super::error::ParseError;
use super::error::ParseErrorKind;
use crate::ast::*;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Parses one and-or list: a pipeline, then zero or more
    /// `&&`/`||`-joined pipelines. Returns `Ok(None)` if there is no
    /// pipeline at all at the current position.
    pub fn parse_and_or_list(&mut self) -> PResult<Option<AndOrList>> {
        let position = self.position();
        let Some(first) = self.parse_pipeline()? else {
            return Ok(None);
        };

        let mut pipelines = vec![first];
        let mut operators = Vec::new();

        loop {
            let op = match self.peek_kind() {
                TokenKind::AndAnd => AndOrOp::And,
                TokenKind::OrOr => AndOrOp::Or,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            match self.parse_pipeline()? {
                Some(next) => {
                    operators.push(op);
                    pipelines.push(next);
                }
                None => return Err(ParseError::new(ParseErrorKind::MissingCommand, self.position())),
            }
        }

        Ok(Some(AndOrList { pipelines, operators, position }))
    }

    /// Parses the body shared by every compound command: and-or lists
    /// separated by `;`, `&` or a newline, stopping at (without
    /// consuming) the first token in `stop` or at end of input.
    ///
    /// This is `maybe_compound_list` in the teacher, generalized to
    /// take its stop set as a parameter instead of hard-coding `fi`/
    /// `done`/`}` per call site.
    pub fn parse_statement_list_until(&mut self, stop: &[TokenKind]) -> PResult<StatementList> {
        let position = self.position();
        let mut items = Vec::new();

        loop {
            self.skip_newlines();
            if self.at_eof() || stop.contains(&self.peek_kind()) {
                break;
            }

            let outcome = match self.parse_and_or_list() {
                Ok(Some(and_or)) => Ok(and_or),
                Ok(None) => Err(ParseError::new(ParseErrorKind::MissingCommand, self.position())),
                Err(err) => Err(err),
            };
            let and_or = match outcome {
                Ok(and_or) => and_or,
                Err(err) if self.is_collecting() => {
                    self.record_error(err)?;
                    self.resynchronize();
                    continue;
                }
                Err(err) => return Err(err),
            };

            let separator = if self.eat(TokenKind::Amp).is_some() {
                Some(Separator::Background)
            } else if self.skip_separators() {
                Some(Separator::Sequential)
            } else {
                None
            };

            let item_position = and_or.position;
            items.push(StatementListItem { and_or, separator, position: item_position });

            if separator.is_none() {
                if self.at_eof() || stop.contains(&self.peek_kind()) {
                    break;
                }
                // Another and-or list starts right here with nothing
                // separating it from the one just parsed (spec
                // §4.5.1: `;`, `&` and newline are the only things
                // that can join two statements).
                let err = ParseError::new(ParseErrorKind::MissingSeparator, self.position());
                if self.is_collecting() {
                    self.record_error(err)?;
                    self.resynchronize();
                    continue;
                }
                return Err(err);
            }
        }

        Ok(StatementList { items, position })
    }

    /// Parses a whole program: an interleaving of function definitions
    /// and ordinary statements, run to end of input (spec §3.4
    /// `TopLevel`).
    ///
    /// A standalone and-or list that is nothing but a single,
    /// unnegated `NAME() { ... }` already parses as a
    /// [`Command::FunctionDef`] inside [`super::pipeline::parse_command`];
    /// this just promotes that shape to its own [`TopLevelItem`] so
    /// callers can tell function definitions apart from plain
    /// statements without re-inspecting every pipeline.
    pub fn parse_top_level(&mut self) -> PResult<TopLevel> {
        let position = self.position();
        let mut items = Vec::new();
        let mut pending: Vec<StatementListItem> = Vec::new();

        loop {
            self.skip_newlines();
            if self.at_eof() {
                break;
            }

            let outcome = match self.parse_and_or_list() {
                Ok(Some(and_or)) => Ok(and_or),
                Ok(None) => Err(ParseError::new(ParseErrorKind::MissingCommand, self.position())),
                Err(err) => Err(err),
            };
            let and_or = match outcome {
                Ok(and_or) => and_or,
                Err(err) if self.is_collecting() => {
                    self.record_error(err)?;
                    self.resynchronize();
                    continue;
                }
                Err(err) => return Err(err),
            };

            let separator = if self.eat(TokenKind::Amp).is_some() {
                Some(Separator::Background)
            } else if self.skip_separators() {
                Some(Separator::Sequential)
            } else {
                None
            };

            let item_position = and_or.position;
            match take_standalone_function_def(and_or) {
                Ok(func) => {
                    flush_pending(&mut items, &mut pending);
                    items.push(TopLevelItem::FunctionDef(func));
                }
                Err(and_or) => {
                    pending.push(StatementListItem { and_or, separator, position: item_position });
                }
            }

            if separator.is_none() {
                if self.at_eof() {
                    break;
                }
                let err = ParseError::new(ParseErrorKind::MissingSeparator, self.position());
                if self.is_collecting() {
                    self.record_error(err)?;
                    self.resynchronize();
                    continue;
                }
                return Err(err);
            }
        }

        flush_pending(&mut items, &mut pending);
        Ok(TopLevel { items, position })
    }
}

/// If `and_or` is nothing but a single, unnegated, pipe-free
/// `Command::FunctionDef`, pulls the definition back out; otherwise
/// hands the list back unchanged so the caller can still use it as an
/// ordinary statement.
fn take_standalone_function_def(mut and_or: AndOrList) -> Result<FunctionDef, AndOrList> {
    if and_or.operators.is_empty() && and_or.pipelines.len() == 1 {
        let pipeline = &and_or.pipelines[0];
        if !pipeline.negate && pipeline.commands.len() == 1 && matches!(pipeline.commands[0], Command::FunctionDef(_)) {
            let command = and_or.pipelines.pop().unwrap().commands.pop().unwrap();
            let Command::FunctionDef(func) = command else {
                unreachable!("just matched Command::FunctionDef above");
            };
            return Ok(func);
        }
    }
    Err(and_or)
}

fn flush_pending(items: &mut Vec<TopLevelItem>, pending: &mut Vec<StatementListItem>) {
    if pending.is_empty() {
        return;
    }
    let position = pending[0].position;
    items.push(TopLevelItem::Statement(StatementList {
        items: std::mem::take(pending),
        position,
    }));
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
    fn and_or_list_tracks_operators_in_order() {
        let (tokens, heredocs) = parser_for("a && b || c");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let list = p.parse_and_or_list().unwrap().unwrap();
        assert!(list.is_well_formed());
        assert_eq!(list.operators, vec![AndOrOp::And, AndOrOp::Or]);
        assert_eq!(list.pipelines.len(), 3);
    }

    #[test]
    fn and_or_list_without_operators_is_a_single_pipeline() {
        let (tokens, heredocs) = parser_for("a");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let list = p.parse_and_or_list().unwrap().unwrap();
        assert!(list.operators.is_empty());
        assert_eq!(list.pipelines.len(), 1);
    }

    #[test]
    fn missing_pipeline_after_operator_is_an_error() {
        let (tokens, heredocs) = parser_for("a &&");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let err = p.parse_and_or_list().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingCommand);
    }

    #[test]
    fn statement_list_collects_sequential_items() {
        let (tokens, heredocs) = parser_for("a; b; c\n");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let list = p.parse_statement_list_until(&[]).unwrap();
        assert_eq!(list.items.len(), 3);
        assert!(list.items.iter().all(|i| i.separator == Some(Separator::Sequential)));
    }

    #[test]
    fn statement_list_stops_before_keyword() {
        let (tokens, heredocs) = parser_for("echo hi; fi");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let list = p.parse_statement_list_until(&[TokenKind::Fi]).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(p.peek_kind(), TokenKind::Fi);
    }

    #[test]
    fn statement_list_marks_last_item_background() {
        let (tokens, heredocs) = parser_for("sleep 1 &");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let list = p.parse_statement_list_until(&[]).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].separator, Some(Separator::Background));
    }

    #[test]
    fn top_level_separates_function_defs_from_statements() {
        let (tokens, heredocs) = parser_for("greet() { echo hi; }\necho before\necho after\n");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let top = p.parse_top_level().unwrap();
        assert_eq!(top.items.len(), 2);
        assert!(matches!(top.items[0], TopLevelItem::FunctionDef(_)));
        match &top.items[1] {
            TopLevelItem::Statement(list) => assert_eq!(list.items.len(), 2),
            _ => panic!("expected trailing statements"),
        }
    }

    #[test]
    fn top_level_of_plain_script_is_one_statement_block() {
        let (tokens, heredocs) = parser_for("echo a\necho b\n");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let top = p.parse_top_level().unwrap();
        assert_eq!(top.items.len(), 1);
        match &top.items[0] {
            TopLevelItem::Statement(list) => assert_eq!(list.items.len(), 2),
            _ => panic!("expected statement block"),
        }
    }

    #[test]
    fn adjacent_statements_without_separator_is_an_error() {
        let (tokens, heredocs) = parser_for("(echo a)(echo b)");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let err = p.parse_top_level().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingSeparator);
    }

    #[test]
    fn collecting_mode_recovers_trailing_statement_after_missing_separator() {
        let (tokens, heredocs) = parser_for("(echo a)(echo b)\necho c\n");
        let mut p = Parser::new(&tokens, heredocs, Config::permissive());
        let top = p.parse_top_level().unwrap();
        assert!(!p.errors().is_empty());
        assert!(p.errors().iter().any(|e| e.kind == ParseErrorKind::MissingSeparator));
        // The resynchronized parser should still pick the trailing
        // `echo c` statement back up instead of dropping it silently.
        let has_trailing = top.items.iter().any(|item| match item {
            TopLevelItem::Statement(list) => list.items.iter().any(|i| i.position.offset > 16),
            _ => false,
        });
        assert!(has_trailing, "expected recovery to retain a statement after the malformed pair");
    }

    #[test]
    fn resynchronize_makes_progress_when_error_sits_on_a_boundary_token() {
        // A regression guard for a parser that previously spun forever
        // when a "missing command" error was detected with the cursor
        // already sitting on the boundary token `resynchronize` scans
        // for (here, the stray `;` right after `if`).
        let (tokens, heredocs) = parser_for("if ; then echo hi; fi\necho after\n");
        let mut p = Parser::new(&tokens, heredocs, Config::permissive());
        let top = p.parse_top_level().unwrap();
        assert!(!p.errors().is_empty());
        assert!(!top.items.is_empty());
    }
}
