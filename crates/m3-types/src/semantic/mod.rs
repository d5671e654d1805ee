//! Semantic queries over the type graph
//!
//! This module provides:
//! - Property visibility and shadowing along linearizations
//! - Property conflict detection
//! - Qualified property selection by multiplicity

mod properties;

pub use properties::*;
