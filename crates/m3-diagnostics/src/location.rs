//! Source location tracking for declarations reported in diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a declaration in its source, supplied by the declaration layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Identifier of the source (usually a file path)
    pub source_id: String,
    /// Start line number (1-based)
    pub line: usize,
    /// Start column number (1-based)
    pub column: usize,
    /// End line number (1-based, inclusive)
    pub end_line: usize,
    /// End column number (1-based, inclusive)
    pub end_column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(
        source_id: impl Into<String>,
        line: usize,
        column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Create a location covering a single position
    pub fn point(source_id: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(source_id, line, column, line, column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_id, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = SourceLocation::new("model/person.pure", 3, 5, 7, 1);
        assert_eq!(loc.to_string(), "model/person.pure:3:5");
    }
}
