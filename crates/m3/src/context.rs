//! Semantic context for one compilation pass
//!
//! A [`SemanticContext`] owns the type graph snapshot together with its
//! linearization cache and the multiplicity matcher configured for the pass. Path
//! based helpers cover what the declaration and diagnostics layers need most.

use indexmap::IndexSet;
use m3_diagnostics::{Diagnostic, ToDiagnostic};
use m3_multiplicity::{MatchPolicies, MultiplicityMatcher};
use m3_types::semantic::PropertyResolver;
use m3_types::{Linearizer, TypeGraph, TypeId};
use std::sync::Arc;

use crate::{Error, Result};

/// Type graph, linearizer and matcher of a compilation pass
#[derive(Debug, Default)]
pub struct SemanticContext {
    graph: TypeGraph,
    linearizer: Linearizer,
    matcher: MultiplicityMatcher,
}

impl SemanticContext {
    /// Create a context with default match policies
    pub fn new(graph: TypeGraph) -> Self {
        Self {
            graph,
            linearizer: Linearizer::new(),
            matcher: MultiplicityMatcher::new(),
        }
    }

    /// Set the match policies used for multiplicity matching
    pub fn with_policies(mut self, policies: MatchPolicies) -> Self {
        self.matcher = MultiplicityMatcher::with_policies(policies);
        self
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Mutable access to the graph between passes
    ///
    /// Cached linearizations touching modified types are recomputed on next use.
    pub fn graph_mut(&mut self) -> &mut TypeGraph {
        &mut self.graph
    }

    pub fn linearizer(&self) -> &Linearizer {
        &self.linearizer
    }

    pub fn matcher(&self) -> &MultiplicityMatcher {
        &self.matcher
    }

    /// A property resolver sharing this context's cache and matcher
    pub fn property_resolver(&self) -> PropertyResolver<'_> {
        PropertyResolver::new(&self.graph, &self.linearizer).with_matcher(self.matcher)
    }

    /// Find a type by path
    pub fn resolve_path(&self, path: &str) -> Result<TypeId> {
        self.graph.lookup(path).ok_or_else(|| Error::UnknownPath {
            path: path.to_string(),
        })
    }

    /// Linearize a type
    pub fn linearize(&self, ty: TypeId) -> Result<Arc<[TypeId]>> {
        Ok(self.linearizer.linearize(&self.graph, ty)?)
    }

    /// Linearize the type at `path`, returning paths
    pub fn linearize_paths(&self, path: &str) -> Result<Vec<String>> {
        let linearization = self.linearize(self.resolve_path(path)?)?;
        Ok(linearization
            .iter()
            .map(|ty| self.graph.display_name(*ty))
            .collect())
    }

    /// Maximal non-root generalizations of a type
    pub fn top_most_non_root_generalizations(&self, ty: TypeId) -> Result<IndexSet<TypeId>> {
        Ok(self
            .linearizer
            .top_most_non_root_generalizations(&self.graph, ty)?)
    }

    /// Check the hierarchy and properties of one type
    pub fn check_type(&self, ty: TypeId) -> Result<()> {
        self.linearize(ty)?;
        self.property_resolver().validate(ty)?;
        Ok(())
    }

    /// Check every type of the graph, reporting one diagnostic per failing type
    ///
    /// A failing type does not stop the check of unrelated types.
    pub fn check_all(&self) -> Vec<Diagnostic> {
        let diagnostics: Vec<Diagnostic> = self
            .graph
            .iter()
            .filter_map(|(ty, _)| self.check_type(ty).err())
            .map(|err| err.to_diagnostic())
            .collect();
        log::debug!(
            "checked {} types, {} failing",
            self.graph.len(),
            diagnostics.len()
        );
        diagnostics
    }
}
