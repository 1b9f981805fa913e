//! Provenance of source code fed to the lexer.
//!
//! This mirrors the shape of a typical shell front end's source
//! module: a [`Source`] describes *where* a piece of text came from,
//! a [`Code`] bundles the text with that description, and a
//! [`Location`] pins a byte range inside a particular `Code`. Plain
//! [`Position`](crate::position::Position) values (offset/line/column/
//! length) are what tokens and AST nodes actually carry day to day;
//! `Location` is the richer form used when rendering diagnostics that
//! need to show a source line.

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroU64;
use std::rc::Rc;

pub mod pretty;

/// Describes where a piece of source code came from.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Source {
    /// No provenance information is available.
    Unknown,
    /// Text typed at an interactive prompt.
    Interactive,
    /// A command string passed in directly (e.g. `sh -c '...'`).
    CommandString,
    /// A script file.
    File { name: Rc<str> },
}

impl Default for Source {
    fn default() -> Self {
        Source::Unknown
    }
}

impl Source {
    /// A short label used as the "path" in `path:line:column: message`.
    pub fn label(&self) -> String {
        match self {
            Source::Unknown => "<unknown>".to_string(),
            Source::Interactive => "<stdin>".to_string(),
            Source::CommandString => "<command string>".to_string(),
            Source::File { name } => name.to_string(),
        }
    }
}

/// A unit of source text, together with its provenance.
///
/// The text is held in a `RefCell` because recoverable-mode lexing
/// may append synthesized continuation lines (e.g. heredoc bodies
/// read interactively) after the initial scan has started.
#[derive(Debug)]
pub struct Code {
    pub value: RefCell<String>,
    pub start_line_number: NonZeroU64,
    pub source: Source,
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
impl Eq for Code {}

/// A byte range within a particular [`Code`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    pub code: Rc<Code>,
    pub range: std::ops::Range<usize>,
}

impl Location {
    /// A location with no real source, for ASTs built without a lexer
    /// (e.g. via `FromStr`, as the teacher crate supports).
    pub fn dummy(text: impl Into<String>) -> Self {
        Location {
            code: Rc::new(Code {
                value: RefCell::new(text.into()),
                start_line_number: NonZeroU64::new(1).unwrap(),
                source: Source::Unknown,
            }),
            range: 0..0,
        }
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.range.clone()
    }

    /// 1-based line and column of `self.range.start` within `self.code`.
    pub fn line_column(&self) -> (u64, u32) {
        let text = self.code.value.borrow();
        let mut line = self.code.start_line_number.get();
        let mut column: u32 = 1;
        for (i, ch) in text.char_indices() {
            if i >= self.range.start {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.line_column();
        write!(f, "{}:{}:{}", self.code.source.label(), line, column)
    }
}

/// A single character annotated with the location it came from.
///
/// Produced by [`source_chars`] and consumed by the lexer, which
/// advances a cursor over a `Vec<SourceChar>` rather than a raw
/// `&str` so that every recognizer can cheaply attach a `Position` to
/// the tokens it emits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceChar {
    pub value: char,
    pub location: Location,
}

/// Builds [`SourceChar`]s from a string, with locations anchored in
/// `code` starting at byte offset `index_offset`.
pub fn source_chars(s: &str, code: &Rc<Code>, index_offset: usize) -> Vec<SourceChar> {
    let mut offset = index_offset;
    let mut chars = Vec::with_capacity(s.len());
    for ch in s.chars() {
        let len = ch.len_utf8();
        chars.push(SourceChar {
            value: ch,
            location: Location {
                code: Rc::clone(code),
                range: offset..offset + len,
            },
        });
        offset += len;
    }
    chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_column_tracks_newlines() {
        let code = Rc::new(Code {
            value: RefCell::new("ab\ncd".to_string()),
            start_line_number: NonZeroU64::new(1).unwrap(),
            source: Source::Unknown,
        });
        let loc = Location {
            code: Rc::clone(&code),
            range: 4..5,
        };
        assert_eq!(loc.line_column(), (2, 2));
    }

    #[test]
    fn label_for_file_source() {
        let source = Source::File {
            name: Rc::from("script.sh"),
        };
        assert_eq!(source.label(), "script.sh");
    }
}
