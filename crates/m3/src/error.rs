//! Umbrella error for the semantic core

use m3_diagnostics::{ErrorCode, RelatedInfo, SourceLocation, ToDiagnostic};
use m3_multiplicity::MultiplicityError;
use m3_types::semantic::PropertyError;
use m3_types::{GraphError, HierarchyError};
use thiserror::Error;

/// Any error raised by the semantic core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Multiplicity(#[from] MultiplicityError),

    /// A path does not name a type of the context's graph
    #[error("Unknown type '{path}'")]
    UnknownPath { path: String },
}

/// Result type for semantic core operations
pub type Result<T> = std::result::Result<T, Error>;

impl ToDiagnostic for Error {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Graph(err) => err.code(),
            Self::Hierarchy(err) => err.code(),
            Self::Property(err) => err.code(),
            Self::Multiplicity(err) => err.code(),
            Self::UnknownPath { .. } => m3_diagnostics::M30001,
        }
    }

    fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Graph(err) => err.location(),
            Self::Hierarchy(err) => err.location(),
            Self::Property(err) => err.location(),
            Self::Multiplicity(err) => err.location(),
            Self::UnknownPath { .. } => None,
        }
    }

    fn related(&self) -> Vec<RelatedInfo> {
        match self {
            Self::Hierarchy(err) => err.related(),
            Self::Property(err) => err.related(),
            _ => Vec::new(),
        }
    }
}
