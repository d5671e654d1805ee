//! Diagnostic values and the conversion trait implemented by every error type

use crate::{ErrorCode, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - compilation of the affected type cannot proceed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
    /// Related information
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
            help: code.info().help.map(str::to_string),
            related: Vec::new(),
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the location if one is known
    pub fn with_optional_location(mut self, location: Option<SourceLocation>) -> Self {
        if location.is_some() {
            self.location = location;
        }
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add related information
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Related diagnostic information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedInfo {
    /// Location of related code
    pub location: Option<SourceLocation>,
    /// Message explaining the relationship
    pub message: String,
}

impl RelatedInfo {
    /// Create new related info
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            location: None,
            message: message.into(),
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Conversion of a structured error into a [`Diagnostic`]
///
/// Implemented by the error enums of every crate in the semantic core so the
/// diagnostics layer can report them uniformly.
pub trait ToDiagnostic: fmt::Display {
    /// The error code for this error
    fn code(&self) -> ErrorCode;

    /// Source position of the offending declaration, if known
    fn location(&self) -> Option<&SourceLocation> {
        None
    }

    /// Related declarations worth pointing at
    fn related(&self) -> Vec<RelatedInfo> {
        Vec::new()
    }

    /// Build the diagnostic
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag =
            Diagnostic::error(self.code(), self.to_string()).with_optional_location(self.location().cloned());
        for info in self.related() {
            diag = diag.with_related(info);
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{M30100, M30300};

    #[derive(Debug)]
    struct CycleError {
        location: SourceLocation,
    }

    impl fmt::Display for CycleError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Class 'A' extends itself")
        }
    }

    impl ToDiagnostic for CycleError {
        fn code(&self) -> ErrorCode {
            M30100
        }

        fn location(&self) -> Option<&SourceLocation> {
            Some(&self.location)
        }

        fn related(&self) -> Vec<RelatedInfo> {
            vec![RelatedInfo::new("declared here").with_location(self.location.clone())]
        }
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(M30300, "Invalid multiplicity [3..1]")
            .with_location(SourceLocation::point("a.pure", 1, 5));

        assert_eq!(
            diag.to_string(),
            "error: M30300 - Invalid multiplicity [3..1] at a.pure:1:5"
        );
    }

    #[test]
    fn test_to_diagnostic_defaults() {
        let err = CycleError {
            location: SourceLocation::new("a.pure", 1, 1, 1, 20),
        };
        let diag = err.to_diagnostic();

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code, M30100);
        assert_eq!(diag.message, "Class 'A' extends itself");
        assert_eq!(diag.location, Some(err.location.clone()));
        assert_eq!(diag.help.as_deref(), M30100.info().help);
        assert_eq!(diag.related.len(), 1);
    }

    #[test]
    fn test_diagnostic_serializes() {
        let diag = Diagnostic::error(M30300, "check").with_help("nothing to do");
        let json = serde_json::to_value(&diag).unwrap();

        assert_eq!(json["severity"], "Error");
        assert_eq!(json["code"], 300);
        assert_eq!(json["help"], "nothing to do");
        assert!(json["location"].is_null());
    }
}
