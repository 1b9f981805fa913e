//! Lexer configuration (spec §4.2.7).

/// How the lexer reacts to the first error it encounters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorMode {
    /// Abort tokenization and return the error (batch mode).
    Strict,
    /// Emit a synthetic error token and keep scanning (interactive
    /// mode, completeness probing).
    Recoverable,
}

/// Feature toggles that parameterize the lexer.
///
/// Values compose as plain data (spec §4.2.7: "Configurations compose
/// as values"); three canonical presets are provided below.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LexerConfig {
    /// Accept non-ASCII letters in identifiers (`$héllo`).
    pub unicode_identifiers: bool,
    /// Treat Unicode whitespace, not just ASCII blanks, as word
    /// separators.
    pub unicode_whitespace: bool,
    /// Disables brace expansion, process substitution and extglob,
    /// and tightens operator recognition to the POSIX set.
    pub posix_strict: bool,
    /// Track `{`/`}`/`((`/`))`/`[[`/`]]` nesting depth as tokens are
    /// produced, for callers (like the completeness probe) that need
    /// a running bracket-depth count without re-walking the stream.
    pub track_bracket_depth: bool,
    /// Case-sensitive keyword and operator matching. Always `true` in
    /// practice; exposed because the teacher's config surface makes
    /// it an explicit, testable flag rather than an assumption.
    pub case_sensitive: bool,
    /// Enables `?(...)`, `*(...)`, `+(...)`, `@(...)`, `!(...)`
    /// extended glob words. Forced off when `posix_strict` is set.
    pub extglob: bool,
    pub error_mode: ErrorMode,
}

impl LexerConfig {
    /// Non-interactive, strict-on-first-error configuration.
    pub const fn batch() -> Self {
        LexerConfig {
            unicode_identifiers: true,
            unicode_whitespace: true,
            posix_strict: false,
            track_bracket_depth: true,
            case_sensitive: true,
            extglob: true,
            error_mode: ErrorMode::Strict,
        }
    }

    /// Best-effort configuration used by interactive front ends and
    /// the completeness probe.
    pub const fn interactive() -> Self {
        LexerConfig {
            error_mode: ErrorMode::Recoverable,
            ..Self::batch()
        }
    }

    /// `set -o posix` configuration: disables the bash extensions.
    pub const fn posix() -> Self {
        LexerConfig {
            posix_strict: true,
            extglob: false,
            ..Self::batch()
        }
    }

    pub fn extglob_enabled(&self) -> bool {
        self.extglob && !self.posix_strict
    }

    pub fn process_substitution_enabled(&self) -> bool {
        !self.posix_strict
    }

    pub fn brace_expansion_enabled(&self) -> bool {
        !self.posix_strict
    }

    pub fn is_strict(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Strict)
    }
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig::batch()
    }
}
