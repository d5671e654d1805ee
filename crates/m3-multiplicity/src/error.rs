//! Multiplicity errors

use m3_diagnostics::{
    ErrorCode, M30300, M30301, M30302, M30303, M30304, M30305, SourceLocation, ToDiagnostic,
};
use std::fmt;
use thiserror::Error;

/// Multiplicity errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultiplicityError {
    /// Malformed construction (negative lower bound, lower above upper)
    #[error("Invalid multiplicity [{literal}]: {reason}")]
    Invalid {
        literal: String,
        reason: &'static str,
        location: Option<SourceLocation>,
    },

    /// An operation that needs numeric bounds received a parameter
    #[error("Multiplicity '{multiplicity}' is not concrete")]
    NonConcrete { multiplicity: String },

    /// A parameterized operand was met while its policy is `Error`
    #[error("Ambiguous multiplicity match: {operand} multiplicity '{parameter}' is a parameter (target {target}, value {value})")]
    AmbiguousMatch {
        operand: MatchOperand,
        parameter: String,
        target: String,
        value: String,
    },

    /// No value multiplicity was supplied while the null policy is `Error`
    #[error("No multiplicity supplied to match against target {target}")]
    MissingValue { target: String },

    /// A minimal subsuming multiplicity was requested for an empty list
    #[error("Cannot compute the minimal subsuming multiplicity of an empty list")]
    EmptyInput,

    /// A multiplicity literal could not be read
    #[error("Invalid multiplicity literal '{literal}'")]
    Parse { literal: String },
}

/// Multiplicity result
pub type MultiplicityResult<T> = Result<T, MultiplicityError>;

/// Which side of a match an operand sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOperand {
    /// The declared (expected) multiplicity
    Target,
    /// The supplied multiplicity
    Value,
}

impl fmt::Display for MatchOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOperand::Target => write!(f, "target"),
            MatchOperand::Value => write!(f, "value"),
        }
    }
}

impl ToDiagnostic for MultiplicityError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Invalid { .. } => M30300,
            Self::NonConcrete { .. } => M30301,
            Self::AmbiguousMatch { .. } => M30302,
            Self::MissingValue { .. } => M30303,
            Self::EmptyInput => M30304,
            Self::Parse { .. } => M30305,
        }
    }

    fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Invalid { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}
