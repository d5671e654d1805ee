//! Semantic core of the M3 metamodel
//!
//! This crate bundles the semantic core including:
//! - The type graph and C3 linearization of multiple-inheritance hierarchies
//! - Multiplicities, their algebra, and variance-aware matching and ranking
//! - Property resolution and conflict detection
//! - Structured diagnostics for every failure
//!
//! # Example
//!
//! ```
//! use m3::{GraphBuilder, SemanticContext};
//!
//! let graph = GraphBuilder::new()
//!     .class("A")
//!     .class("B")
//!     .class("C")
//!     .extends("A", "B")
//!     .extends("A", "C")
//!     .build()?;
//!
//! let context = SemanticContext::new(graph);
//! assert_eq!(context.linearize_paths("A")?, vec!["A", "B", "C"]);
//! # Ok::<(), m3::Error>(())
//! ```

mod context;
mod error;

// Re-export all public APIs from internal crates
pub use m3_diagnostics as diagnostics;
pub use m3_multiplicity as multiplicity;
pub use m3_types as types;

// Convenience re-exports
pub use context::SemanticContext;
pub use error::{Error, Result};
pub use m3_diagnostics::{Diagnostic, ToDiagnostic};
pub use m3_multiplicity::{MatchPolicies, MatchPolicy, Multiplicity, MultiplicityMatcher};
pub use m3_types::semantic::PropertyResolver;
pub use m3_types::{GraphBuilder, Linearizer, TypeGraph, TypeId};
