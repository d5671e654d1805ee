//! M3 multiplicities
//!
//! This crate defines the cardinality model used throughout the metamodel:
//! - [`Multiplicity`] values, concrete (`[lower..upper]`) or bound to a named parameter
//! - The multiplicity algebra (subsumption, intersection, minimal subsuming multiplicity)
//! - Variance- and parameter-aware matching and ranking used by override and
//!   overload resolution

mod algebra;
mod error;
mod matcher;
mod multiplicity;

pub use algebra::*;
pub use error::*;
pub use matcher::*;
pub use multiplicity::*;
