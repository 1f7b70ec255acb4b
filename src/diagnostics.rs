//! Errors and non-fatal diagnostics.
//!
//! Resolution itself never fails: "no feature applies" is the normal answer.
//! What can go wrong is limited to the accumulation phase:
//!
//! - a clear directive that names no live entry ([`Diagnostic`], collected
//!   and reported, never thrown),
//! - malformed pattern text ([`PatternError`]),
//! - malformed interface scripts ([`ScriptError`]).
//!
//! Structurally invalid data built through the typed constructors (an empty
//! parameter type, a non-trailing default) is a caller bug and panics at
//! construction time.

use thiserror::Error;

/// Non-fatal finding recorded while the feature table is accumulated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A clear directive whose pattern is not structurally identical to any
    /// live entry. The directive has no effect.
    #[error("clear of feature \"{feature}\" on `{pattern}` (directive #{sequence}) matches no live entry; ignored")]
    AmbiguousClearTarget { feature: String, pattern: String, sequence: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("malformed pattern `{text}`: {reason}")]
    Malformed { text: String, reason: String },
}

/// Errors reading an interface script. `line` is 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("line {line}: unknown directive `%{name}`")]
    UnknownDirective { line: usize, name: String },

    #[error("line {line}: unterminated {what}")]
    Unterminated { line: usize, what: &'static str },

    #[error("line {line}: invalid parameter list for `{name}`: {reason}")]
    Parameters { line: usize, name: String, reason: String },

    #[error("line {line}: {source}")]
    Pattern {
        line: usize,
        #[source]
        source: PatternError,
    },
}

impl ScriptError {
    pub fn line(&self) -> usize {
        match self {
            ScriptError::Syntax { line, .. }
            | ScriptError::UnknownDirective { line, .. }
            | ScriptError::Unterminated { line, .. }
            | ScriptError::Parameters { line, .. }
            | ScriptError::Pattern { line, .. } => *line,
        }
    }
}
