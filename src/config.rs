//! Top-level configuration aggregating the lexer and parser knobs
//! (spec §4.2.7, SPEC_FULL §6: "Configuration composes as values,
//! mirroring the lexer's own `LexerConfig`").

use crate::lexer::LexerConfig;

/// How the parser reacts to the first [`crate::parser::ParseError`]
/// it encounters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseErrorMode {
    /// Abort at the first error (what [`crate::parse`] uses).
    Strict,
    /// Record errors up to `max_errors`, resynchronize, and keep
    /// parsing (what [`crate::parse_collecting`] uses).
    Collecting { max_errors: usize },
}

/// Dialect presets, mirroring [`crate::lexer::LexerConfig`]'s battery
/// of named constructors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dialect {
    /// Plain POSIX sh: no `[[ ]]`, no `select`, no array assignment,
    /// no process substitution, no extglob.
    StrictPosix,
    /// bash-compatible: every supplement this crate implements is
    /// available.
    BashCompat,
    /// Like `BashCompat`, but the lexer runs in recoverable mode and
    /// the parser collects errors instead of aborting on the first
    /// one — the preset used by [`crate::completeness::is_complete`]
    /// and by interactive front ends.
    Permissive,
}

/// Aggregates every feature toggle the front end exposes, composed as
/// plain data rather than threaded through as separate arguments
/// (spec §4.2.7).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub lexer: LexerConfig,
    pub parse_error_mode: ParseErrorMode,
    /// Enables `[[ ... ]]`, `select`, array assignment and process
    /// substitution parsing (SPEC_FULL §4.5 supplements). Forced off
    /// under `Dialect::StrictPosix`.
    pub bash_extensions: bool,
    /// Default cap on how many collected errors
    /// [`crate::parse_collecting`] returns before giving up.
    pub max_errors: usize,
}

impl Config {
    pub const fn strict_posix() -> Self {
        Config {
            lexer: LexerConfig::posix(),
            parse_error_mode: ParseErrorMode::Strict,
            bash_extensions: false,
            max_errors: 10,
        }
    }

    pub const fn bash_compat() -> Self {
        Config {
            lexer: LexerConfig::batch(),
            parse_error_mode: ParseErrorMode::Strict,
            bash_extensions: true,
            max_errors: 10,
        }
    }

    pub const fn permissive() -> Self {
        Config {
            lexer: LexerConfig::interactive(),
            parse_error_mode: ParseErrorMode::Collecting { max_errors: 10 },
            bash_extensions: true,
            max_errors: 10,
        }
    }

    pub const fn from_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::StrictPosix => Config::strict_posix(),
            Dialect::BashCompat => Config::bash_compat(),
            Dialect::Permissive => Config::permissive(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::bash_compat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_posix_disables_extensions() {
        let cfg = Config::strict_posix();
        assert!(!cfg.bash_extensions);
    }

    #[test]
    fn permissive_collects_errors() {
        let cfg = Config::permissive();
        assert!(matches!(cfg.parse_error_mode, ParseErrorMode::Collecting { .. }));
    }
}
