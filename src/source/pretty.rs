//! Rendering diagnostics that reference source code.
//!
//! An [`Error`](crate::error::Error) converts into a [`Report`], a
//! formatter-agnostic description of a diagnostic. With the
//! `annotate-snippets` feature enabled, a `Report` converts further
//! into `annotate_snippets::Renderer` input for a fully decorated,
//! multi-line diagnostic; without it, [`Report::to_line`] produces the
//! plain `path:line:column: message` form required by the external
//! interface.

use super::Location;
use std::borrow::Cow;

/// Severity of a diagnostic, per the external interface's
/// `severity ∈ {error, fatal}`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Error,
    Fatal,
}

/// One labeled span inside a report.
#[derive(Clone, Debug)]
pub struct Annotation<'a> {
    pub location: Location,
    pub label: Cow<'a, str>,
}

/// A complete diagnostic: a headline message plus zero or more spans
/// into source code and zero or more plain-text suggestions.
#[derive(Clone, Debug)]
pub struct Report<'a> {
    pub severity: Severity,
    pub title: Cow<'a, str>,
    pub main: Annotation<'a>,
    pub related: Vec<Annotation<'a>>,
    pub suggestions: Vec<Cow<'a, str>>,
}

impl<'a> Report<'a> {
    pub fn new(severity: Severity, title: impl Into<Cow<'a, str>>, main: Annotation<'a>) -> Self {
        Report {
            severity,
            title: title.into(),
            main,
            related: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// The one-line `path:line:column: message` form mandated by the
    /// external interface in all build configurations.
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.main.location, self.title)
    }
}

#[cfg(feature = "annotate-snippets")]
mod annotate_snippets_support {
    use super::*;
    use annotate_snippets::{Level, Renderer, Snippet};

    impl From<Severity> for Level<'_> {
        fn from(severity: Severity) -> Self {
            match severity {
                Severity::Error => Level::ERROR,
                Severity::Fatal => Level::ERROR,
            }
        }
    }

    impl<'a> Report<'a> {
        /// Renders the full report, with source context, using
        /// `annotate-snippets`.
        pub fn render(&self) -> String {
            let code = self.main.location.code.value.borrow();
            let (line, _) = self.main.location.line_column();
            let line_start: usize = line.try_into().unwrap_or(usize::MAX);
            let snippet = Snippet::source(&*code)
                .line_start(line_start)
                .path(self.main.location.code.source.label())
                .annotation(
                    annotate_snippets::AnnotationKind::Primary
                        .span(self.main.location.byte_range())
                        .label(&self.main.label),
                );
            let group = Level::from(self.severity)
                .primary_title(&*self.title)
                .element(snippet);
            Renderer::plain().render(&[group])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn plain_line_format() {
        let location = Location::dummy("echo $");
        let report = Report::new(
            Severity::Error,
            "unexpected end of input",
            Annotation {
                location,
                label: "expected a word here".into(),
            },
        );
        let line = report.to_line();
        assert!(line.ends_with("unexpected end of input"));
        let _ = Rc::strong_count(&report.main.location.code);
    }
}
