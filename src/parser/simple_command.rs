//! Simple command parsing: prefix assignments, operand words and
//! process substitutions, and trailing redirections interleaved in
//! any order (spec §4.5.2, SPEC_FULL §3 "Assignment words").

use super::core::{PResult, Parser};
use super::error::ParseErrorKind;
use crate::ast::{Assign, AssignValue, Operand, ProcessSubstitution, ProcessSubstitutionDirection, SimpleCommand, Word};
use crate::token::{PartKind, TokenKind};

/// An assignment word is `NAME=...` where `NAME` is a valid
/// identifier and nothing before the first unquoted `=` — a plain
/// literal word check, since the lexer hands assignment-shaped text
/// through as an ordinary `Word` token (spec §4.5.2).
fn assignment_name(word: &str) -> Option<&str> {
    let eq = word.find('=')?;
    let name = &word[..eq];
    if name.is_empty() {
        return None;
    }
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '[' || c == ']') {
        return None;
    }
    Some(name)
}

impl<'a> Parser<'a> {
    /// Tries to parse the current word token as a prefix assignment.
    /// Returns `Ok(None)` without consuming anything if the current
    /// token isn't assignment-shaped.
    fn try_assignment(&mut self) -> PResult<Option<Assign>> {
        // Clone the token up front so nothing below borrows from
        // `self`: every branch needs to call `self.advance()` at
        // least once, which a live borrow from `self.peek()` would
        // conflict with.
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Word || tok.quote_type != crate::token::QuoteType::None {
            return Ok(None);
        }
        // An assignment word must be a single literal run up to `=`;
        // a composite word like `$x=1` is an ordinary operand, not an
        // assignment (the left-hand side can't itself expand).
        let literal_prefix = match &tok.parts {
            None => tok.lexeme.clone(),
            Some(parts) => match parts.first() {
                Some(p) if p.kind == PartKind::Literal => p.value.clone(),
                _ => return Ok(None),
            },
        };
        let Some(name) = assignment_name(&literal_prefix).map(str::to_string) else {
            return Ok(None);
        };
        let eq_offset = literal_prefix.find('=').unwrap();
        let position = tok.position;
        let next_is_open_paren = self.peek_at(1).kind == TokenKind::OpenParen;

        // Array assignment `NAME=(a b c)`: only recognized when the
        // literal prefix is the whole token (`NAME=` with nothing
        // else attached) and the very next token is `(` with no
        // intervening blanks — which the lexer already guarantees by
        // having tokenized `(` as its own operator token immediately
        // following.
        if tok.parts.is_none() && eq_offset + 1 == tok.lexeme.len() && next_is_open_paren {
            self.advance(); // consume NAME=
            self.advance(); // consume (
            let mut words = Vec::new();
            loop {
                self.skip_newlines();
                if self.eat(TokenKind::CloseParen).is_some() {
                    break;
                }
                if self.at_eof() {
                    self.record_error(super::error::ParseError::new(ParseErrorKind::InvalidAssignment, self.position()))?;
                    break;
                }
                let w: Word = self.advance().into();
                words.push(w);
            }
            return Ok(Some(Assign {
                name,
                value: AssignValue::Array(words),
                position,
            }));
        }

        // `NAME[index]=value`: the index expression lives inside the
        // same literal run up to the first unquoted `=`.
        let name_only = name.split('[').next().unwrap_or(&name).to_string();
        if name_only.len() != name.len() {
            let index_text = name[name_only.len() + 1..name.len().saturating_sub(1)].to_string();
            let rhs_text = literal_prefix[eq_offset + 1..].to_string();
            self.advance();
            let index = Word {
                position,
                lexeme: index_text,
                parts: None,
                quote_type: crate::token::QuoteType::None,
            };
            let value_word = Word {
                position,
                lexeme: rhs_text,
                parts: None,
                quote_type: crate::token::QuoteType::None,
            };
            return Ok(Some(Assign {
                name: name_only,
                value: AssignValue::Element(index, value_word),
                position,
            }));
        }

        // Plain scalar assignment: the whole token, parts and all, is
        // the assignment; the AST value word keeps everything after
        // the first `=` so expansions in the value still work.
        let value = scalar_assignment_value(&tok, eq_offset);
        self.advance();
        Ok(Some(Assign {
            name,
            value: AssignValue::Scalar(value),
            position,
        }))
    }

    /// Tries to parse the current token as an operand: a plain word
    /// or a process substitution. Returns `Ok(None)` if the current
    /// token cannot start an operand.
    fn try_operand(&mut self) -> Option<Operand> {
        match self.peek_kind() {
            TokenKind::Word | TokenKind::SingleQuoted | TokenKind::DoubleQuoted | TokenKind::Variable => {
                Some(Operand::Word(self.advance().into()))
            }
            TokenKind::ProcessSubstitutionIn | TokenKind::ProcessSubstitutionOut => {
                let tok = self.advance();
                let direction = if tok.kind == TokenKind::ProcessSubstitutionIn {
                    ProcessSubstitutionDirection::In
                } else {
                    ProcessSubstitutionDirection::Out
                };
                let command_text = tok
                    .parts
                    .as_ref()
                    .and_then(|p| p.first())
                    .map(|p| p.value.clone())
                    .unwrap_or_default();
                Some(Operand::ProcessSubstitution(ProcessSubstitution {
                    direction,
                    command_text,
                    position: tok.position,
                }))
            }
            _ => None,
        }
    }

    /// Parses a simple command: any mix of leading assignments,
    /// operand words and redirections, in the order they appear
    /// (spec §4.5.2 allows redirections to interleave with operands,
    /// e.g. `echo > out.txt hello`). Returns `Ok(None)` if there is
    /// nothing here at all — this is how the caller distinguishes "no
    /// command" from "an empty one", which cannot otherwise occur.
    pub fn parse_simple_command(&mut self) -> PResult<Option<SimpleCommand>> {
        let start = self.position();
        let mut assigns = Vec::new();
        let mut words = Vec::new();
        let mut redirects = Vec::new();

        loop {
            if let Some(r) = self.try_redirect()? {
                redirects.push(r);
                continue;
            }
            if words.is_empty() {
                if let Some(a) = self.try_assignment()? {
                    assigns.push(a);
                    continue;
                }
            }
            if let Some(op) = self.try_operand() {
                words.push(op);
                continue;
            }
            break;
        }

        if assigns.is_empty() && words.is_empty() && redirects.is_empty() {
            return Ok(None);
        }

        Ok(Some(SimpleCommand {
            assigns,
            words,
            redirects,
            position: start,
        }))
    }
}

fn scalar_assignment_value(tok: &crate::token::Token, eq_offset: usize) -> Word {
    match &tok.parts {
        None => Word {
            position: tok.position,
            lexeme: tok.lexeme[eq_offset + 1..].to_string(),
            parts: None,
            quote_type: crate::token::QuoteType::None,
        },
        Some(parts) => {
            // The first part is the literal `NAME=` prefix (possibly
            // with extra literal text fused on by the lexer); strip
            // just the `NAME=` portion from it and keep every
            // subsequent part as-is.
            let mut rest = parts.clone();
            if let Some(first) = rest.first_mut() {
                let stripped = first.value[eq_offset + 1..].to_string();
                first.value = stripped;
            }
            let lexeme = tok.lexeme[eq_offset + 1..].to_string();
            Word {
                position: tok.position,
                lexeme,
                parts: Some(rest),
                quote_type: crate::token::QuoteType::None,
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
    fn plain_command_has_no_assignments() {
        let (tokens, heredocs) = parser_for("echo hello world");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_simple_command().unwrap().unwrap();
        assert!(cmd.assigns.is_empty());
        assert_eq!(cmd.words.len(), 3);
    }

    #[test]
    fn leading_assignment_is_recognized() {
        let (tokens, heredocs) = parser_for("FOO=bar echo hi");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_simple_command().unwrap().unwrap();
        assert_eq!(cmd.assigns.len(), 1);
        assert_eq!(cmd.assigns[0].name, "FOO");
        match &cmd.assigns[0].value {
            AssignValue::Scalar(w) => assert_eq!(w.lexeme, "bar"),
            _ => panic!("expected scalar"),
        }
        assert_eq!(cmd.words.len(), 2);
    }

    #[test]
    fn assignment_only_statement_has_no_words() {
        let (tokens, heredocs) = parser_for("FOO=bar");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_simple_command().unwrap().unwrap();
        assert_eq!(cmd.assigns.len(), 1);
        assert!(cmd.words.is_empty());
    }

    #[test]
    fn array_assignment_collects_elements() {
        let (tokens, heredocs) = parser_for("ARR=(1 2 3)");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_simple_command().unwrap().unwrap();
        match &cmd.assigns[0].value {
            AssignValue::Array(words) => {
                assert_eq!(words.iter().map(|w| w.lexeme.as_str()).collect::<Vec<_>>(), vec!["1", "2", "3"]);
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn word_after_equals_is_not_misread_as_assignment() {
        let (tokens, heredocs) = parser_for("echo FOO=bar");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_simple_command().unwrap().unwrap();
        assert!(cmd.assigns.is_empty());
        assert_eq!(cmd.words.len(), 2);
    }

    #[test]
    fn redirect_before_operands_still_attaches_to_command() {
        let (tokens, heredocs) = parser_for("> out.txt echo hi");
        let mut p = Parser::new(&tokens, heredocs, Config::bash_compat());
        let cmd = p.parse_simple_command().unwrap().unwrap();
        assert_eq!(cmd.redirects.len(), 1);
        assert_eq!(cmd.words.len(), 2);
    }
}
