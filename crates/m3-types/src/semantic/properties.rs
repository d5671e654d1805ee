//! Property resolution over linearizations
//!
//! This module handles:
//! - Nearest-declaration lookup of simple properties
//! - Detection of conflicting declarations from unrelated ancestors
//! - Detection of incompatible redeclarations on subtypes
//! - Qualified property selection by argument multiplicities

use indexmap::IndexMap;
use m3_diagnostics::{ErrorCode, M30200, M30201, M30202, RelatedInfo, SourceLocation, ToDiagnostic};
use m3_multiplicity::{CandidateSelection, Multiplicity, MultiplicityError, MultiplicityMatch, MultiplicityMatcher};
use thiserror::Error;

use crate::{HierarchyError, Linearizer, PropertyDef, QualifiedPropertyDef, TypeGraph, TypeId};

/// Property resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// Unrelated ancestors declare the property differently
    #[error("Property '{property}' of '{type_name}' is declared as {first_signature} by '{first_owner}' and as {second_signature} by '{second_owner}'")]
    Conflict {
        type_name: String,
        property: String,
        first_owner: String,
        first_signature: String,
        second_owner: String,
        second_signature: String,
        location: Option<SourceLocation>,
    },

    /// A subtype redeclares an inherited property with another type or multiplicity
    #[error("Property '{property}' of '{type_name}' is declared as {found}, but '{overridden_owner}' declares it as {expected}")]
    IncompatibleRedeclaration {
        type_name: String,
        property: String,
        overridden_owner: String,
        expected: String,
        found: String,
        location: Option<SourceLocation>,
    },

    /// Several qualified properties of one type fit the arguments equally well
    #[error("Ambiguous qualified property '{property}' of '{owner}' for arguments ({arguments})")]
    AmbiguousQualifiedProperty {
        owner: String,
        property: String,
        arguments: String,
    },

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Multiplicity(#[from] MultiplicityError),
}

impl ToDiagnostic for PropertyError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Conflict { .. } => M30200,
            Self::IncompatibleRedeclaration { .. } => M30201,
            Self::AmbiguousQualifiedProperty { .. } => M30202,
            Self::Hierarchy(err) => err.code(),
            Self::Multiplicity(err) => err.code(),
        }
    }

    fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Conflict { location, .. } | Self::IncompatibleRedeclaration { location, .. } => {
                location.as_ref()
            }
            Self::AmbiguousQualifiedProperty { .. } => None,
            Self::Hierarchy(err) => err.location(),
            Self::Multiplicity(err) => err.location(),
        }
    }

    fn related(&self) -> Vec<RelatedInfo> {
        match self {
            Self::Hierarchy(err) => err.related(),
            _ => Vec::new(),
        }
    }
}

/// Property result
pub type PropertyResult<T> = Result<T, PropertyError>;

/// A property as seen from a type
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperty<'g> {
    /// Type declaring the visible property
    pub owner: TypeId,
    pub property: &'g PropertyDef,
    /// Farther declarations hidden by this one, in linearization order
    pub shadowed: Vec<TypeId>,
}

/// A qualified property chosen for a list of argument multiplicities
#[derive(Debug, Clone)]
pub struct ResolvedQualifiedProperty<'g> {
    pub owner: TypeId,
    pub property: &'g QualifiedPropertyDef,
    /// One match per argument
    pub matches: Vec<MultiplicityMatch>,
}

/// Resolves properties of a type through its linearization
pub struct PropertyResolver<'g> {
    graph: &'g TypeGraph,
    linearizer: &'g Linearizer,
    matcher: MultiplicityMatcher,
}

impl<'g> PropertyResolver<'g> {
    /// Create a resolver using a matcher with default policies
    pub fn new(graph: &'g TypeGraph, linearizer: &'g Linearizer) -> Self {
        Self {
            graph,
            linearizer,
            matcher: MultiplicityMatcher::new(),
        }
    }

    /// Use the given matcher for qualified property selection
    pub fn with_matcher(mut self, matcher: MultiplicityMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Declarations of `name` along the linearization of `ty`, nearest first
    fn declarations(&self, ty: TypeId, name: &str) -> PropertyResult<Vec<(TypeId, &'g PropertyDef)>> {
        let linearization = self.linearizer.linearize(self.graph, ty)?;
        Ok(linearization
            .iter()
            .filter_map(|owner| {
                self.graph
                    .get(*owner)
                    .and_then(|node| node.properties().get(name))
                    .map(|property| (*owner, property))
            })
            .collect())
    }

    /// Resolve the property `name` of `ty` to its nearest declaration
    ///
    /// Fails when the declarations seen from `ty` conflict or a redeclaration is
    /// incompatible with what it overrides.
    pub fn resolve_property(&self, ty: TypeId, name: &str) -> PropertyResult<Option<ResolvedProperty<'g>>> {
        let declarations = self.declarations(ty, name)?;
        self.check_declarations(ty, &declarations)?;

        let mut declarations = declarations.into_iter();
        Ok(declarations.next().map(|(owner, property)| ResolvedProperty {
            owner,
            property,
            shadowed: declarations.map(|(shadowed, _)| shadowed).collect(),
        }))
    }

    /// Every property visible from `ty`, nearest declaration per name
    ///
    /// Ordered by linearization, then declaration order. Conflicts are not checked;
    /// see [`PropertyResolver::validate`].
    pub fn visible_properties(&self, ty: TypeId) -> PropertyResult<Vec<ResolvedProperty<'g>>> {
        let linearization = self.linearizer.linearize(self.graph, ty)?;
        let mut visible: IndexMap<&str, ResolvedProperty<'g>> = IndexMap::new();

        for owner in linearization.iter() {
            let Some(node) = self.graph.get(*owner) else {
                continue;
            };
            for (name, property) in node.properties() {
                visible
                    .entry(name.as_str())
                    .and_modify(|resolved| resolved.shadowed.push(*owner))
                    .or_insert_with(|| ResolvedProperty {
                        owner: *owner,
                        property,
                        shadowed: Vec::new(),
                    });
            }
        }

        Ok(visible.into_values().collect())
    }

    /// Check every property visible from `ty` for conflicts
    pub fn validate(&self, ty: TypeId) -> PropertyResult<()> {
        for resolved in self.visible_properties(ty)? {
            let declarations = self.declarations(ty, &resolved.property.name)?;
            self.check_declarations(ty, &declarations)?;
        }
        Ok(())
    }

    /// Conflicts between unrelated owners are reported before incompatible
    /// redeclarations, so a conflict always names both ancestors involved.
    fn check_declarations(&self, ty: TypeId, declarations: &[(TypeId, &PropertyDef)]) -> PropertyResult<()> {
        let mut redeclaration = None;

        for (index, (near_owner, near)) in declarations.iter().enumerate() {
            for (far_owner, far) in &declarations[index + 1..] {
                if near.is_compatible_with(far) {
                    continue;
                }
                // A subtype always precedes its generalizations in a linearization,
                // so only `near` can specialize `far`.
                if self
                    .linearizer
                    .is_specialization_of(self.graph, *near_owner, *far_owner)?
                {
                    if redeclaration.is_none() {
                        redeclaration = Some(PropertyError::IncompatibleRedeclaration {
                            type_name: self.graph.display_name(*near_owner),
                            property: near.name.clone(),
                            overridden_owner: self.graph.display_name(*far_owner),
                            expected: self.signature(far),
                            found: self.signature(near),
                            location: near.location.clone(),
                        });
                    }
                    continue;
                }
                return Err(PropertyError::Conflict {
                    type_name: self.graph.display_name(ty),
                    property: near.name.clone(),
                    first_owner: self.graph.display_name(*near_owner),
                    first_signature: self.signature(near),
                    second_owner: self.graph.display_name(*far_owner),
                    second_signature: self.signature(far),
                    location: self.graph.get(ty).and_then(|node| node.location().cloned()),
                });
            }
        }

        redeclaration.map_or(Ok(()), Err)
    }

    fn signature(&self, property: &PropertyDef) -> String {
        format!(
            "{}{}",
            self.graph.display_name(property.ty),
            property.multiplicity.print(true)
        )
    }

    /// Choose the qualified property `name` of `ty` for the given arguments
    ///
    /// Candidates are the qualified properties of matching name and arity along the
    /// linearization. Each argument multiplicity is matched covariantly into the
    /// corresponding parameter multiplicity and the best ranked candidate wins.
    /// Among equally ranked candidates the nearest declaration wins; equally ranked
    /// candidates of the same owner are ambiguous.
    pub fn resolve_qualified_property(
        &self,
        ty: TypeId,
        name: &str,
        arguments: &[Option<Multiplicity>],
    ) -> PropertyResult<Option<ResolvedQualifiedProperty<'g>>> {
        let linearization = self.linearizer.linearize(self.graph, ty)?;

        let mut candidates = Vec::new();
        for owner in linearization.iter() {
            let Some(node) = self.graph.get(*owner) else {
                continue;
            };
            for property in node.qualified_properties().iter().filter(|q| q.name == name) {
                if let Some(matches) = self.matcher.match_all(&property.parameters, arguments, true) {
                    candidates.push((*owner, property, matches));
                }
            }
        }

        let match_lists: Vec<Vec<MultiplicityMatch>> = candidates
            .iter()
            .map(|(_, _, matches)| matches.clone())
            .collect();

        let chosen = match self.matcher.best_candidate(&match_lists)? {
            CandidateSelection::NoMatch => return Ok(None),
            CandidateSelection::Unique(index) => index,
            CandidateSelection::Ambiguous(tied) => {
                let nearest = tied[0];
                if tied[1..]
                    .iter()
                    .any(|index| candidates[*index].0 == candidates[nearest].0)
                {
                    return Err(PropertyError::AmbiguousQualifiedProperty {
                        owner: self.graph.display_name(candidates[nearest].0),
                        property: name.to_string(),
                        arguments: arguments
                            .iter()
                            .map(|argument| argument.as_ref().map_or("null".to_string(), |m| m.print(true)))
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
                log::debug!(
                    "qualified property {} of {} chosen by proximity among {} tied candidates",
                    name,
                    self.graph.display_name(ty),
                    tied.len()
                );
                nearest
            }
        };

        let (owner, property, matches) = candidates.swap_remove(chosen);
        Ok(Some(ResolvedQualifiedProperty {
            owner,
            property,
            matches,
        }))
    }
}
