//! Redirection parsing, shared by simple commands and compound
//! commands (spec §4.5.2).

use super::core::{PResult, Parser};
use super::error::ParseErrorKind;
use crate::ast::{RedirOp, Redirect, RedirectTarget};
use crate::token::{DupTarget, TokenKind};

fn redir_op(kind: TokenKind) -> Option<RedirOp> {
    Some(match kind {
        TokenKind::Less => RedirOp::In,
        TokenKind::Great => RedirOp::Out,
        TokenKind::DGreat => RedirOp::Append,
        TokenKind::ClobberGreat => RedirOp::Clobber,
        TokenKind::LessGreat => RedirOp::ReadWrite,
        TokenKind::LessAnd => RedirOp::DupIn,
        TokenKind::GreatAnd => RedirOp::DupOut,
        TokenKind::AndGreat => RedirOp::OutErr,
        TokenKind::DLess => RedirOp::HereDoc,
        TokenKind::DLessDash => RedirOp::HereDocStripTabs,
        TokenKind::TLess => RedirOp::HereString,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    /// Parses one redirection if the current token is a redirection
    /// operator, else returns `Ok(None)` without consuming anything.
    pub fn try_redirect(&mut self) -> PResult<Option<Redirect>> {
        let Some(op) = redir_op(self.peek_kind()) else {
            return Ok(None);
        };
        let op_tok = self.advance();

        // `N>&M` / `N>&-`: the lexer already folded the duplication
        // target into the operator token, so there is no separate
        // word to consume.
        if let Some(dup) = op_tok.dup_fd {
            let redirect = Redirect {
                fd: op_tok.fd,
                operator: op,
                target: RedirectTarget::Fd(dup),
                heredoc_content: None,
                heredoc_quoted: false,
                position: op_tok.position,
            };
            return Ok(Some(redirect));
        }

        // `N>&M` where the lexer did not recognize a digit or `-`
        // right after `>&` (e.g. `>&$fd`) falls through to reading an
        // ordinary word operand below instead of a bare Fd target.
        let target_tok = self.advance();
        if !matches!(
            target_tok.kind,
            TokenKind::Word | TokenKind::SingleQuoted | TokenKind::DoubleQuoted | TokenKind::Variable
        ) {
            self.record_error(missing_target_error(&target_tok))?;
            // Don't consume further; let the caller keep parsing from
            // the unexpected token.
            return Ok(Some(Redirect {
                fd: op_tok.fd,
                operator: op,
                target: RedirectTarget::Word(crate::ast::Word {
                    position: target_tok.position,
                    lexeme: String::new(),
                    parts: None,
                    quote_type: crate::token::QuoteType::None,
                }),
                heredoc_content: None,
                heredoc_quoted: false,
                position: op_tok.position,
            }));
        }

        if matches!(op, RedirOp::HereDoc | RedirOp::HereDocStripTabs) {
            let body = self.take_heredoc();
            let (content, quoted) = match body {
                Some(h) => (Some(h.content), h.quoted),
                None => (Some(String::new()), false),
            };
            return Ok(Some(Redirect {
                fd: op_tok.fd,
                operator: op,
                target: RedirectTarget::Word(target_tok.into()),
                heredoc_content: content,
                heredoc_quoted: quoted,
                position: op_tok.position,
            }));
        }

        Ok(Some(Redirect {
            fd: op_tok.fd,
            operator: op,
            target: RedirectTarget::Word(target_tok.into()),
            heredoc_content: None,
            heredoc_quoted: false,
            position: op_tok.position,
        }))
    }
}

fn missing_target_error(tok: &crate::token::Token) -> super::error::ParseError {
    super::error::ParseError::new(ParseErrorKind::MissingRedirectTarget, tok.position)
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

    fn tokens_for(text: &str) -> (Vec<Token>, std::collections::VecDeque<crate::heredoc::CollectedHeredoc>) {
        let mut tokens = Lexer::tokenize(text, Source::Unknown, LexerConfig::batch()).tokens;
        let (pruned, bodies, errors) = heredoc::collect(&tokens, text);
        assert!(errors.is_empty());
        tokens = pruned;
        keyword::normalize(&mut tokens);
        (tokens, bodies)
    }

    #[test]
    fn simple_output_redirect() {
        let (tokens, heredocs) = tokens_for("> out.txt");
        let mut parser = Parser::new(&tokens, heredocs, Config::bash_compat());
        let r = parser.try_redirect().unwrap().unwrap();
        assert_eq!(r.operator, RedirOp::Out);
        match r.target {
            RedirectTarget::Word(w) => assert_eq!(w.lexeme, "out.txt"),
            _ => panic!("expected word target"),
        }
    }

    #[test]
    fn fd_duplication_redirect() {
        let (tokens, heredocs) = tokens_for("2>&1");
        let mut parser = Parser::new(&tokens, heredocs, Config::bash_compat());
        let r = parser.try_redirect().unwrap().unwrap();
        assert_eq!(r.fd, Some(2));
        assert_eq!(r.target, RedirectTarget::Fd(DupTarget::Fd(1)));
    }

    #[test]
    fn heredoc_redirect_carries_collected_body() {
        let text = "<<EOF\nbody\nEOF\n";
        let (tokens, heredocs) = tokens_for(text);
        let mut parser = Parser::new(&tokens, heredocs, Config::bash_compat());
        let r = parser.try_redirect().unwrap().unwrap();
        assert_eq!(r.heredoc_content.as_deref(), Some("body\n"));
    }
}
