//! Keyword promotion: the single pass that turns a `Word` token
//! spelled like a reserved word into its keyword `TokenKind`, but only
//! where the grammar actually expects a reserved word (spec §4.3).
//!
//! A reserved word is recognized only in "command position": the
//! first word of the script, or the first word following one of a
//! fixed set of token kinds that can only precede a new command
//! (`;`, `&`, `&&`, `||`, `|`, a newline, or one of the keywords that
//! themselves open a nested command list: `then`, `else`, `elif`,
//! `do`, `{`, `!`). Anywhere else — an argument, an assignment value,
//! the word after `case WORD in` — `if`/`then`/... are ordinary words
//! (spec §4.3, scenario "`echo if` prints the word `if`").
//!
//! `((` never appears in this trigger set: a bare arithmetic command
//! is already lexed as one `ArithmeticCommand` token (see
//! `lexer::mod::next_token`), so there is no `Word` spelled `((` for
//! this pass to ever promote.

use crate::token::{Token, TokenKind};

/// Token kinds after which the next `Word` is in command position.
fn starts_command_position(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Semicolon
            | DSemi
            | SemiAnd
            | DSemiAnd
            | Newline
            | AndAnd
            | OrOr
            | Pipe
            | PipeAnd
            | Amp
            | OpenParen
            | OpenBrace
            | Then
            | Else
            | Elif
            | Do
            | Bang
    )
}

/// Promotes `Word` tokens spelled like reserved words to their
/// keyword `TokenKind`, in place, wherever they occur in command
/// position. Tokens after `in` in a `case`/`for`/`select` header and
/// the case-pattern position are deliberately left alone by the
/// simple trigger-set rule above: `case` bodies start a fresh command
/// position only at `in`, and the parser — not this pass — is
/// responsible for not mis-reading a pattern word as a keyword, since
/// case patterns are exactly the position where e.g. a literal `esac`
/// pattern would otherwise collide.
pub fn normalize(tokens: &mut [Token]) {
    let mut previous_significant: Option<TokenKind> = None;
    let mut at_start = true;

    for i in 0..tokens.len() {
        let kind = tokens[i].kind;
        if kind == TokenKind::Eof {
            break;
        }

        let in_command_position = at_start || previous_significant.map_or(false, starts_command_position);

        if kind == TokenKind::Word && in_command_position {
            if let Some(promoted) = TokenKind::keyword_from_str(&tokens[i].lexeme) {
                // Only a plain, unquoted single-literal word can ever
                // be a keyword; `"if"` or `\if` stay ordinary words
                // (spec §4.3, "quoting defeats keyword recognition").
                if tokens[i].parts.is_none() && tokens[i].quote_type == crate::token::QuoteType::None {
                    tokens[i].kind = promoted;
                }
            }
        }

        previous_significant = Some(tokens[i].kind);
        at_start = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexer, LexerConfig};
    use crate::source::Source;

    fn tokenize(text: &str) -> Vec<Token> {
        let mut tokens = Lexer::tokenize(text, Source::Unknown, LexerConfig::batch()).tokens;
        normalize(&mut tokens);
        tokens
    }

    #[test]
    fn leading_if_is_promoted() {
        let tokens = tokenize("if true; then echo hi; fi");
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[3].kind, TokenKind::Then);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn if_as_argument_stays_a_word() {
        let tokens = tokenize("echo if");
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].lexeme, "if");
    }

    #[test]
    fn quoted_keyword_stays_a_word() {
        let tokens = tokenize(r#""if" true"#);
        assert_eq!(tokens[0].kind, TokenKind::DoubleQuoted);
    }

    #[test]
    fn keyword_after_pipe_is_promoted() {
        let tokens = tokenize("true | if true; then echo hi; fi");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::If));
    }

    #[test]
    fn fi_after_newline_inside_body_is_promoted() {
        let tokens = tokenize("if true\nthen\necho hi\nfi");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Fi));
    }
}
