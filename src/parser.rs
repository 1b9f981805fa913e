//! Recursive-descent parser over a lexed, heredoc-collected,
//! keyword-normalized [`Token`](crate::token::Token) stream (spec
//! §4.5).
//!
//! Single-token lookahead with explicit mark/reset snapshots for the
//! few constructs that need to look further ahead (spec §4.5.6): no
//! general backtracking, no grammar ambiguity resolved by trying both
//! branches and keeping whichever didn't error.

mod compound;
mod core;
mod error;
mod list;
mod pipeline;
mod redir;
mod simple_command;
mod test_expr;

pub use self::core::{Mark, PResult, Parser};
pub use self::error::{ParseError, ParseErrorKind};
