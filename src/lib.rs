//! Front end of a POSIX-style shell: brace expansion, lexer, keyword
//! normalizer, heredoc collector and recursive-descent parser, wired
//! together into the four entry points named in spec §6
//! (`parse`, `parse_collecting`, `tokenize`, `is_complete`).
//!
//! ```
//! # use shfront::{parse, Config};
//! let ast = parse("echo hello | grep l", &Config::bash_compat()).unwrap();
//! assert_eq!(ast.items.len(), 1);
//! ```
//!
//! The pipeline (spec §2) is eager and synchronous end to end: each
//! stage runs to completion and hands a plain value to the next one.
//! Nothing here suspends, and nothing here executes a command —
//! variable expansion, process spawning and job control are the
//! caller's problem (spec §1).

#![forbid(unsafe_code)]

pub mod ast;
pub mod brace_expansion;
pub mod completeness;
pub mod config;
pub mod error;
pub mod heredoc;
pub mod keyword;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod source;
pub mod token;

pub use completeness::is_complete;
pub use config::{Config, Dialect, ParseErrorMode};
pub use error::Error;

use ast::TopLevel;
use lexer::Lexer;
use parser::Parser;
use source::Source;
use token::Token;

/// Runs brace expansion, the lexer, keyword normalization and heredoc
/// collection, and hands the parser the resulting token stream. Used
/// by every public entry point below so the five passes stay in the
/// same order everywhere (spec §2).
///
/// Brace expansion (spec §4.1) is textual and line-oriented, so it
/// runs per physical line rather than over the whole buffer at once —
/// a brace group is never intended to span a command boundary, and
/// expanding the buffer as one unit would turn every newline in a
/// multi-statement script into part of the cartesian product. A line
/// whose expansion would exceed the item limit falls back to its
/// unexpanded form, per spec §4.1.
fn preprocess(text: &str, config: &Config) -> String {
    if config.lexer.posix_strict || !config.lexer.brace_expansion_enabled() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        match brace_expansion::expand(line) {
            Ok(items) => out.push_str(&items.join("\n")),
            Err(_) => out.push_str(line),
        }
        if lines.peek().is_some() {
            out.push('\n');
        }
    }
    out
}

/// Tokenizes, normalizes keywords and collects heredoc bodies, but
/// stops short of parsing. This is the shared prefix of every entry
/// point; [`tokenize`] is the public, diagnostic-only wrapper around
/// it (spec §6c).
fn lex_and_collect(text: &str, config: &Config) -> (Vec<Token>, std::collections::VecDeque<heredoc::CollectedHeredoc>, Vec<lexer::LexError>, Vec<heredoc::HeredocError>) {
    let expanded = preprocess(text, config);
    let result = Lexer::tokenize(&expanded, Source::Unknown, config.lexer);
    let mut tokens = result.tokens;
    keyword::normalize(&mut tokens);
    let (tokens, heredocs, heredoc_errors) = heredoc::collect(&tokens, &expanded);
    (tokens, heredocs, result.errors, heredoc_errors)
}

/// Parses `text` to completion, aborting at the first error from any
/// stage (spec §6a). This is what a batch front end (`sh script.sh`)
/// uses: a script with a syntax error should fail outright rather
/// than limp along on a partial tree.
pub fn parse(text: &str, config: &Config) -> Result<TopLevel, Error> {
    let (tokens, heredocs, lex_errors, heredoc_errors) = lex_and_collect(text, config);
    if let Some(err) = lex_errors.into_iter().next() {
        return Err(err.into());
    }
    if let Some(err) = heredoc_errors.into_iter().next() {
        return Err(err.into());
    }
    let mut parser = Parser::new(&tokens, heredocs, *config);
    parser.parse_top_level().map_err(Error::from)
}

/// Parses `text`, accumulating up to `config.max_errors` parse errors
/// instead of stopping at the first one, and always returns whatever
/// partial tree it managed to build (spec §6b). Intended for tooling
/// that wants to show a user more than one mistake per pass (an
/// editor's live diagnostics, say); [`parse`] is what a script
/// interpreter should call instead.
///
/// Lexer and heredoc errors are still fatal: a token stream that
/// doesn't even tokenize, or a heredoc that never found its
/// delimiter, leaves nothing sound for the parser to recover into.
pub fn parse_collecting(text: &str, config: &Config) -> (TopLevel, Vec<Error>) {
    let mut collecting = *config;
    collecting.parse_error_mode = ParseErrorMode::Collecting { max_errors: config.max_errors };

    let (tokens, heredocs, lex_errors, heredoc_errors) = lex_and_collect(text, &collecting);
    let mut errors: Vec<Error> = lex_errors.into_iter().map(Error::from).collect();
    errors.extend(heredoc_errors.into_iter().map(Error::from));

    let mut parser = Parser::new(&tokens, heredocs, collecting);
    let top_level = match parser.parse_top_level() {
        Ok(top_level) => top_level,
        Err(err) => {
            let position = err.position;
            errors.push(Error::from(err));
            TopLevel { items: Vec::new(), position }
        }
    };
    errors.extend(parser.into_errors().into_iter().map(Error::from));
    (top_level, errors)
}

/// Tokenizes `text` without parsing, for diagnostic tooling (spec
/// §6c: syntax highlighters, `tokenize`-only test harnesses). Runs
/// brace expansion and keyword normalization, but not heredoc
/// collection, since that pass needs the parser's eventual redirect
/// structure to know which tokens to drop; callers that need a
/// heredoc-clean stream should go through [`parse`] instead.
pub fn tokenize(text: &str, config: &Config) -> Result<Vec<Token>, lexer::LexError> {
    let expanded = preprocess(text, config);
    let result = Lexer::tokenize(&expanded, Source::Unknown, config.lexer);
    if let Some(err) = result.errors.into_iter().next() {
        return Err(err);
    }
    let mut tokens = result.tokens;
    keyword::normalize(&mut tokens);
    Ok(tokens)
}
