//! M3 type graph
//!
//! This crate defines the type side of the semantic core:
//! - [`TypeGraph`], an arena of types with ordered generalization edges
//! - [`GraphBuilder`] for path-based declarations with forward references
//! - [`Linearizer`], memoized C3 linearization and the hierarchy queries built on it
//! - [`semantic::PropertyResolver`] for property lookup and conflict detection

mod builder;
mod graph;
mod linearizer;
pub mod semantic;

pub use builder::*;
pub use graph::*;
pub use linearizer::*;
