//! The completeness probe (spec §4.6): re-invokes the lexer in
//! recoverable mode and the parser in collecting mode over a
//! candidate buffer to decide whether an interactive front end should
//! submit it or keep reading more lines.
//!
//! The teacher solves the same problem by letting its async `Lexer`
//! suspend and pull another line through its `Input` trait whenever a
//! quote, expansion or heredoc runs off the end of the buffer it has
//! so far; a REPL built on it never has to ask "is this complete?"
//! separately; it just keeps awaiting. This crate's lexer and parser
//! are synchronous and own their whole input up front (spec §9), so
//! an interactive front end needs an explicit answer instead: this
//! module re-lexes and re-parses the candidate buffer from scratch on
//! every keystroke-equivalent (cheap at interactive-line sizes) and
//! reports whether the failure it hit, if any, is the synchronous
//! equivalent of "ran off the end" rather than a genuine syntax
//! error.

use crate::config::Config;
use crate::heredoc;
use crate::keyword;
use crate::lexer::{LexErrorKind, Lexer};
use crate::parser::{ParseErrorKind, Parser};
use crate::source::Source;
use crate::token::TokenKind;

/// A nested construct a shallow scan of the buffer is still inside,
/// used to render contextual continuation prompts (`for>`, `then>`,
/// ...) the way an interactive front end would (spec §4.6).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextKind {
    For,
    While,
    Until,
    If,
    Then,
    Case,
    Function,
    Paren,
    Brace,
    DoubleBracket,
}

impl ContextKind {
    /// The conventional prompt tag a shell would show for this
    /// context (e.g. bash's `PS2` rendering).
    pub fn prompt_tag(self) -> &'static str {
        match self {
            ContextKind::For => "for",
            ContextKind::While => "while",
            ContextKind::Until => "until",
            ContextKind::If => "if",
            ContextKind::Then => "then",
            ContextKind::Case => "case",
            ContextKind::Function => "function",
            ContextKind::Paren => "(",
            ContextKind::Brace => "{",
            ContextKind::DoubleBracket => "[[",
        }
    }
}

/// Answers whether `buffer` terminates a syntactically complete
/// command (spec §4.6). Runs the lexer in recoverable mode and the
/// parser in collecting mode; never panics, never blocks.
pub fn is_complete(buffer: &str) -> bool {
    if ends_in_line_continuation(buffer) {
        return false;
    }

    let config = Config::permissive();
    let source_result = Lexer::tokenize(buffer, Source::Unknown, config.lexer);

    if source_result
        .errors
        .iter()
        .any(|e| matches!(e.kind, LexErrorKind::UnclosedQuote | LexErrorKind::UnclosedExpansion))
    {
        return false;
    }

    let mut tokens = source_result.tokens;
    keyword::normalize(&mut tokens);
    let (tokens, heredocs, heredoc_errors) = heredoc::collect(&tokens, buffer);
    if !heredoc_errors.is_empty() {
        return false;
    }

    let mut parser = Parser::new(&tokens, heredocs, config);
    let result = parser.parse_top_level();
    let mut all_errors: Vec<ParseErrorKind> = parser.into_errors().into_iter().map(|e| e.kind).collect();
    if let Err(err) = result {
        all_errors.push(err.kind);
    }

    !all_errors.iter().any(needs_more_input)
}

fn needs_more_input(kind: &ParseErrorKind) -> bool {
    !kind.expected_set().is_empty()
}

fn ends_in_line_continuation(buffer: &str) -> bool {
    let trimmed = buffer.strip_suffix('\n').unwrap_or(buffer);
    let backslashes = trimmed.chars().rev().take_while(|&c| c == '\\').count();
    backslashes % 2 == 1
}

/// Shallow scan of `buffer` for unclosed `for`/`while`/`until`/`if`/
/// `case`/`function`/`(`/`{`/`[[` constructs, returned innermost-last,
/// for an interactive front end to render a contextual continuation
/// prompt (spec §4.6). This does not attempt a full parse: it is a
/// best-effort keyword/bracket walk over the already-tokenized,
/// keyword-normalized stream, tolerant of the buffer being incomplete
/// (which it usually is, by construction — this is only meaningful to
/// call when [`is_complete`] says `false`).
pub fn context_stack(buffer: &str) -> Vec<ContextKind> {
    let config = Config::permissive();
    let result = Lexer::tokenize(buffer, Source::Unknown, config.lexer);
    let mut tokens = result.tokens;
    keyword::normalize(&mut tokens);

    let mut stack = Vec::new();
    for tok in &tokens {
        match tok.kind {
            TokenKind::For => stack.push(ContextKind::For),
            TokenKind::While => stack.push(ContextKind::While),
            TokenKind::Until => stack.push(ContextKind::Until),
            TokenKind::If => stack.push(ContextKind::If),
            TokenKind::Case => stack.push(ContextKind::Case),
            TokenKind::Function => stack.push(ContextKind::Function),
            TokenKind::OpenParen => stack.push(ContextKind::Paren),
            TokenKind::OpenBrace => stack.push(ContextKind::Brace),
            TokenKind::DOpenBracket => stack.push(ContextKind::DoubleBracket),
            TokenKind::Then => {
                if matches!(stack.last(), Some(ContextKind::If)) {
                    stack.push(ContextKind::Then);
                }
            }
            TokenKind::Elif => {
                pop_matching(&mut stack, ContextKind::Then);
            }
            TokenKind::Else => {
                pop_matching(&mut stack, ContextKind::Then);
            }
            TokenKind::Fi => {
                pop_matching(&mut stack, ContextKind::Then);
                pop_matching(&mut stack, ContextKind::If);
            }
            TokenKind::Done => {
                pop_any(&mut stack, &[ContextKind::For, ContextKind::While, ContextKind::Until]);
            }
            TokenKind::Esac => pop_matching(&mut stack, ContextKind::Case),
            TokenKind::CloseParen => pop_matching(&mut stack, ContextKind::Paren),
            TokenKind::CloseBrace => pop_matching(&mut stack, ContextKind::Brace),
            TokenKind::DCloseBracket => pop_matching(&mut stack, ContextKind::DoubleBracket),
            _ => {}
        }
    }
    stack
}

fn pop_matching(stack: &mut Vec<ContextKind>, kind: ContextKind) {
    if stack.last() == Some(&kind) {
        stack.pop();
    }
}

fn pop_any(stack: &mut Vec<ContextKind>, kinds: &[ContextKind]) {
    if let Some(last) = stack.last() {
        if kinds.contains(last) {
            stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_command_is_complete() {
        assert!(is_complete("echo hello\n"));
    }

    #[test]
    fn unclosed_double_quote_is_incomplete() {
        assert!(!is_complete("echo \"hello"));
    }

    #[test]
    fn unclosed_single_quote_is_incomplete() {
        assert!(!is_complete("echo 'hello"));
    }

    #[test]
    fn trailing_backslash_is_incomplete() {
        assert!(!is_complete("echo hello \\\n"));
    }

    #[test]
    fn open_if_is_incomplete() {
        assert!(!is_complete("if true; then\n"));
    }

    #[test]
    fn closed_if_is_complete() {
        assert!(is_complete("if true; then echo yes; fi\n"));
    }

    #[test]
    fn open_heredoc_is_incomplete() {
        assert!(!is_complete("cat << EOF\nhello\n"));
    }

    #[test]
    fn closed_heredoc_is_complete() {
        assert!(is_complete("cat << EOF\nhello\nEOF\n"));
    }

    #[test]
    fn unrelated_error_is_complete() {
        // `done` with no matching loop is a genuine syntax error, not
        // "needs more input" (spec §4.6: "even if the command contains
        // other errors; those surface at execution").
        assert!(is_complete("done\n"));
    }

    #[test]
    fn context_stack_tracks_open_for() {
        let stack = context_stack("for x in a b c; do\n");
        assert_eq!(stack, vec![ContextKind::For]);
    }

    #[test]
    fn context_stack_tracks_nested_if_then() {
        let stack = context_stack("if true; then\n  if false; then\n");
        assert_eq!(stack, vec![ContextKind::If, ContextKind::Then, ContextKind::If, ContextKind::Then]);
    }

    #[test]
    fn context_stack_empty_when_closed() {
        assert!(context_stack("if true; then echo hi; fi\n").is_empty());
    }
}
