//! M3 error codes following a structured numbering system
//!
//! Error code ranges:
//! - M30001-M30099: Graph construction errors (declarations, references)
//! - M30100-M30199: Hierarchy errors (linearization)
//! - M30200-M30299: Property errors (visibility, conflicts)
//! - M30300-M30399: Multiplicity errors (construction, matching)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a graph construction error (0001-0099)
    pub const fn is_graph_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a hierarchy error (0100-0199)
    pub const fn is_hierarchy_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a property error (0200-0299)
    pub const fn is_property_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a multiplicity error (0300-0399)
    pub const fn is_multiplicity_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M3{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Graph construction errors (0001-0099)
    map.insert(1, ErrorInfo::new("Unknown type"));
    map.insert(2, ErrorInfo::new("Duplicate type declaration"));
    map.insert(3, ErrorInfo::new("Duplicate property declaration"));
    map.insert(4, ErrorInfo::new("Type graph capacity exceeded"));

    // Hierarchy errors (0100-0199)
    map.insert(100, ErrorInfo::new("Inconsistent generalization hierarchy")
        .with_help("Reorder the generalizations so that every ancestor keeps the precedence declared by its subtypes"));
    map.insert(101, ErrorInfo::new("Circular generalization")
        .with_help("A type cannot be its own generalization, directly or indirectly"));

    // Property errors (0200-0299)
    map.insert(200, ErrorInfo::new("Property conflict")
        .with_help("Make the unrelated ancestors agree on the property's type and multiplicity"));
    map.insert(201, ErrorInfo::new("Incompatible property redeclaration"));
    map.insert(202, ErrorInfo::new("Ambiguous qualified property"));

    // Multiplicity errors (0300-0399)
    map.insert(300, ErrorInfo::new("Invalid multiplicity"));
    map.insert(301, ErrorInfo::new("Non-concrete multiplicity"));
    map.insert(302, ErrorInfo::new("Ambiguous multiplicity match"));
    map.insert(303, ErrorInfo::new("Missing multiplicity"));
    map.insert(304, ErrorInfo::new("Empty multiplicity list"));
    map.insert(305, ErrorInfo::new("Invalid multiplicity literal"));

    map
});

// Graph construction errors
pub const M30001: ErrorCode = ErrorCode::new(1);
pub const M30002: ErrorCode = ErrorCode::new(2);
pub const M30003: ErrorCode = ErrorCode::new(3);
pub const M30004: ErrorCode = ErrorCode::new(4);

// Hierarchy errors
pub const M30100: ErrorCode = ErrorCode::new(100);
pub const M30101: ErrorCode = ErrorCode::new(101);

// Property errors
pub const M30200: ErrorCode = ErrorCode::new(200);
pub const M30201: ErrorCode = ErrorCode::new(201);
pub const M30202: ErrorCode = ErrorCode::new(202);

// Multiplicity errors
pub const M30300: ErrorCode = ErrorCode::new(300);
pub const M30301: ErrorCode = ErrorCode::new(301);
pub const M30302: ErrorCode = ErrorCode::new(302);
pub const M30303: ErrorCode = ErrorCode::new(303);
pub const M30304: ErrorCode = ErrorCode::new(304);
pub const M30305: ErrorCode = ErrorCode::new(305);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(M30001.to_string(), "M30001");
        assert_eq!(M30100.to_string(), "M30100");
        assert_eq!(M30305.to_string(), "M30305");
    }

    #[test]
    fn test_error_categories() {
        assert!(M30001.is_graph_error());
        assert!(!M30001.is_hierarchy_error());

        assert!(M30101.is_hierarchy_error());
        assert!(M30200.is_property_error());
        assert!(M30302.is_multiplicity_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(M30100.info().description, "Inconsistent generalization hierarchy");
        assert!(M30101.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
