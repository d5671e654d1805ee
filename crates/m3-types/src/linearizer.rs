//! C3 linearization of generalization hierarchies
//!
//! The linearization of a type `T` with direct generalizations `G1..Gn` is `T`
//! followed by the merge of `lin(G1), ..., lin(Gn), [G1, ..., Gn]`. The merge
//! repeatedly takes the first head that does not occur in the tail of any list.
//! When no such head exists the hierarchy is inconsistent.
//!
//! Results are memoized per type. A cached linearization stays valid while no type
//! it contains has been modified since it was computed. Failures are never cached.

use indexmap::IndexSet;
use m3_diagnostics::{ErrorCode, M30001, M30100, M30101, RelatedInfo, SourceLocation, ToDiagnostic};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::{TypeGraph, TypeId, TypeNode};

/// Hierarchy errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// The merge has no valid head
    #[error("Inconsistent generalization hierarchy for '{type_name}': cannot order {}", .conflicting.join(", "))]
    Inconsistent {
        type_name: String,
        /// Heads left when the merge got stuck
        conflicting: Vec<String>,
        location: Option<SourceLocation>,
    },

    /// A type is its own generalization
    #[error("Circular generalization: {}", .cycle.join(" -> "))]
    Cycle {
        /// The type closing the cycle
        type_name: String,
        /// Types along the cycle, starting and ending with `type_name`
        cycle: Vec<String>,
        location: Option<SourceLocation>,
    },

    #[error("Unknown type {id}")]
    UnknownType { id: TypeId },
}

impl ToDiagnostic for HierarchyError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Inconsistent { .. } => M30100,
            Self::Cycle { .. } => M30101,
            Self::UnknownType { .. } => M30001,
        }
    }

    fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Inconsistent { location, .. } | Self::Cycle { location, .. } => {
                location.as_ref()
            }
            Self::UnknownType { .. } => None,
        }
    }

    fn related(&self) -> Vec<RelatedInfo> {
        match self {
            Self::Cycle { cycle, .. } => cycle
                .windows(2)
                .map(|pair| RelatedInfo::new(format!("'{}' extends '{}'", pair[0], pair[1])))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Hierarchy result
pub type HierarchyResult<T> = Result<T, HierarchyError>;

#[derive(Debug, Clone)]
struct CachedLinearization {
    linearization: Arc<[TypeId]>,
    computed_at: u64,
}

impl CachedLinearization {
    fn is_current(&self, graph: &TypeGraph) -> bool {
        self.linearization.iter().all(|ty| {
            graph
                .get(*ty)
                .is_some_and(|node| node.modified_at() <= self.computed_at)
        })
    }
}

/// Memoizing C3 linearizer
///
/// A linearizer serves one [`TypeGraph`]; call [`Linearizer::clear`] before using
/// it with another graph.
#[derive(Debug, Default)]
pub struct Linearizer {
    cache: RwLock<HashMap<TypeId, CachedLinearization>>,
}

impl Linearizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Linearize `ty`: the type itself, then its ancestors in precedence order
    ///
    /// A type without generalizations linearizes to `[ty]`; the root is only
    /// included when declared as a generalization.
    pub fn linearize(&self, graph: &TypeGraph, ty: TypeId) -> HierarchyResult<Arc<[TypeId]>> {
        let mut in_progress = Vec::new();
        self.linearize_with(graph, ty, &mut in_progress)
    }

    fn linearize_with(
        &self,
        graph: &TypeGraph,
        ty: TypeId,
        in_progress: &mut Vec<TypeId>,
    ) -> HierarchyResult<Arc<[TypeId]>> {
        if let Some(cached) = self.cached(graph, ty) {
            log::trace!("linearization cache hit for {}", graph.display_name(ty));
            return Ok(cached);
        }

        let node = graph.get(ty).ok_or(HierarchyError::UnknownType { id: ty })?;

        if let Some(start) = in_progress.iter().position(|t| *t == ty) {
            let cycle = in_progress[start..]
                .iter()
                .chain(std::iter::once(&ty))
                .map(|t| graph.display_name(*t))
                .collect();
            return Err(HierarchyError::Cycle {
                type_name: node.path().to_string(),
                cycle,
                location: node.location().cloned(),
            });
        }

        in_progress.push(ty);
        let result = self.compute(graph, ty, node, in_progress);
        in_progress.pop();
        let linearization: Arc<[TypeId]> = result?.into();

        log::debug!(
            "linearized {} as [{}]",
            node.path(),
            linearization
                .iter()
                .map(|t| graph.display_name(*t))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.cache.write().insert(
            ty,
            CachedLinearization {
                linearization: Arc::clone(&linearization),
                computed_at: graph.generation(),
            },
        );
        Ok(linearization)
    }

    fn compute(
        &self,
        graph: &TypeGraph,
        ty: TypeId,
        node: &TypeNode,
        in_progress: &mut Vec<TypeId>,
    ) -> HierarchyResult<Vec<TypeId>> {
        let generals: Vec<TypeId> = node.generalizations().iter().map(|g| g.general).collect();
        if generals.is_empty() {
            return Ok(vec![ty]);
        }

        let mut parent_linearizations = Vec::with_capacity(generals.len());
        for general in &generals {
            parent_linearizations.push(self.linearize_with(graph, *general, in_progress)?);
        }

        let mut sequences: Vec<&[TypeId]> = parent_linearizations
            .iter()
            .map(|lin| &lin[..])
            .chain(std::iter::once(&generals[..]))
            .collect();

        let mut result = vec![ty];
        loop {
            sequences.retain(|sequence| !sequence.is_empty());
            if sequences.is_empty() {
                return Ok(result);
            }

            let head = sequences
                .iter()
                .map(|sequence| sequence[0])
                .find(|candidate| {
                    !sequences
                        .iter()
                        .any(|sequence| sequence[1..].contains(candidate))
                });

            let Some(head) = head else {
                let conflicting: IndexSet<TypeId> =
                    sequences.iter().map(|sequence| sequence[0]).collect();
                return Err(HierarchyError::Inconsistent {
                    type_name: node.path().to_string(),
                    conflicting: conflicting
                        .into_iter()
                        .map(|t| graph.display_name(t))
                        .collect(),
                    location: node.location().cloned(),
                });
            };

            log::trace!(
                "merge step for {}: selected {}",
                node.path(),
                graph.display_name(head)
            );
            result.push(head);
            for sequence in sequences.iter_mut() {
                if sequence[0] == head {
                    *sequence = &sequence[1..];
                }
            }
        }
    }

    fn cached(&self, graph: &TypeGraph, ty: TypeId) -> Option<Arc<[TypeId]>> {
        let cache = self.cache.read();
        cache
            .get(&ty)
            .filter(|entry| entry.is_current(graph))
            .map(|entry| Arc::clone(&entry.linearization))
    }

    /// Check if a current or stale linearization of `ty` is held
    pub fn is_cached(&self, ty: TypeId) -> bool {
        self.cache.read().contains_key(&ty)
    }

    /// Drop every cached linearization containing `ty`
    pub fn invalidate(&self, ty: TypeId) {
        let mut cache = self.cache.write();
        let before = cache.len();
        cache.retain(|_, entry| !entry.linearization.contains(&ty));
        log::debug!(
            "invalidated {} cached linearizations containing {}",
            before - cache.len(),
            ty
        );
    }

    /// Drop all cached linearizations
    pub fn clear(&self) {
        self.cache.write().clear();
        log::debug!("cleared linearization cache");
    }

    // === Queries built on linearization ===

    /// Check if `general` is `specific` or one of its ancestors
    ///
    /// Every type specializes the root.
    pub fn is_specialization_of(
        &self,
        graph: &TypeGraph,
        specific: TypeId,
        general: TypeId,
    ) -> HierarchyResult<bool> {
        let linearization = self.linearize(graph, specific)?;
        Ok(general == TypeId::ROOT || linearization.contains(&general))
    }

    /// Ancestors of `ty` in precedence order, `ty` itself excluded
    pub fn all_generalizations(&self, graph: &TypeGraph, ty: TypeId) -> HierarchyResult<Vec<TypeId>> {
        let linearization = self.linearize(graph, ty)?;
        Ok(linearization[1..].to_vec())
    }

    /// Maximal non-root members of the linearization of `ty`
    ///
    /// These are the types of the linearization, `ty` included, whose only
    /// generalization (if any) is the root. In linearization order.
    pub fn top_most_non_root_generalizations(
        &self,
        graph: &TypeGraph,
        ty: TypeId,
    ) -> HierarchyResult<IndexSet<TypeId>> {
        let linearization = self.linearize(graph, ty)?;
        Ok(linearization
            .iter()
            .copied()
            .filter(|t| *t != TypeId::ROOT)
            .filter(|t| {
                graph
                    .direct_generalizations(*t)
                    .iter()
                    .all(|g| g.general == TypeId::ROOT)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Generalization, TypeKind};

    fn graph_with(types: &[&str]) -> (TypeGraph, Vec<TypeId>) {
        let mut graph = TypeGraph::new();
        let ids = types
            .iter()
            .map(|path| graph.add_type(*path, TypeKind::Class).unwrap())
            .collect();
        (graph, ids)
    }

    fn extend(graph: &mut TypeGraph, specific: TypeId, generals: &[TypeId]) {
        graph
            .set_generalizations(
                specific,
                generals.iter().map(|g| Generalization::new(*g)).collect(),
            )
            .unwrap();
    }

    #[test]
    fn test_orphan() {
        let (graph, ids) = graph_with(&["A"]);
        let linearizer = Linearizer::new();
        assert_eq!(&*linearizer.linearize(&graph, ids[0]).unwrap(), &[ids[0]]);
        assert_eq!(&*linearizer.linearize(&graph, TypeId::ROOT).unwrap(), &[TypeId::ROOT]);
    }

    #[test]
    fn test_cache_hit_returns_same_allocation() {
        let (mut graph, ids) = graph_with(&["A", "B"]);
        extend(&mut graph, ids[0], &[ids[1]]);
        let linearizer = Linearizer::new();

        let first = linearizer.linearize(&graph, ids[0]).unwrap();
        let second = linearizer.linearize(&graph, ids[0]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(linearizer.is_cached(ids[1]));
    }

    #[test]
    fn test_stale_entry_recomputed() {
        let (mut graph, ids) = graph_with(&["A", "B", "C"]);
        extend(&mut graph, ids[0], &[ids[1]]);
        let linearizer = Linearizer::new();
        assert_eq!(&*linearizer.linearize(&graph, ids[0]).unwrap(), &[ids[0], ids[1]]);

        extend(&mut graph, ids[1], &[ids[2]]);
        assert_eq!(
            &*linearizer.linearize(&graph, ids[0]).unwrap(),
            &[ids[0], ids[1], ids[2]]
        );
    }

    #[test]
    fn test_invalidate_drops_dependents() {
        let (mut graph, ids) = graph_with(&["A", "B", "C"]);
        extend(&mut graph, ids[0], &[ids[1]]);
        let linearizer = Linearizer::new();
        linearizer.linearize(&graph, ids[0]).unwrap();
        linearizer.linearize(&graph, ids[2]).unwrap();

        linearizer.invalidate(ids[1]);
        assert!(!linearizer.is_cached(ids[0]));
        assert!(!linearizer.is_cached(ids[1]));
        assert!(linearizer.is_cached(ids[2]));

        linearizer.clear();
        assert!(!linearizer.is_cached(ids[2]));
    }

    #[test]
    fn test_self_extension_reports_cycle() {
        let (mut graph, ids) = graph_with(&["A"]);
        extend(&mut graph, ids[0], &[ids[0]]);

        let err = Linearizer::new().linearize(&graph, ids[0]).unwrap_err();
        assert_eq!(
            err,
            HierarchyError::Cycle {
                type_name: "A".to_string(),
                cycle: vec!["A".to_string(), "A".to_string()],
                location: None,
            }
        );
        assert_eq!(err.code(), M30101);
        assert_eq!(err.to_string(), "Circular generalization: A -> A");
    }

    #[test]
    fn test_unknown_type() {
        let (_, larger_ids) = graph_with(&["A", "B", "C"]);
        let (graph, _) = graph_with(&["A"]);

        let result = Linearizer::new().linearize(&graph, larger_ids[2]);
        assert!(matches!(result, Err(HierarchyError::UnknownType { .. })));
    }
}
