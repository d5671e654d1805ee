//! Arena type graph
//!
//! Types live in a single arena indexed by [`TypeId`]. Each type carries its ordered
//! generalization edges, its properties and its qualified properties. Every mutation
//! advances the graph generation and stamps the touched type, which lets the
//! [`Linearizer`](crate::Linearizer) detect stale cache entries.

use indexmap::IndexMap;
use m3_diagnostics::{ErrorCode, M30001, M30002, M30003, M30004, SourceLocation, ToDiagnostic};
use m3_multiplicity::Multiplicity;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::num::TryFromIntError;
use thiserror::Error;

/// Path of the universal root type unless another is chosen
pub const DEFAULT_ROOT_PATH: &str = "Any";

/// Stable index of a type in a [`TypeGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    /// The universal root type
    pub const ROOT: TypeId = TypeId(0);

    /// Position in the arena
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for TypeId {
    type Error = TryFromIntError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index).map(TypeId)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// The universal root
    Root,
    Class,
    Association,
    Primitive,
}

/// Argument bound to a type parameter of a generalization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeArgument {
    /// A concrete type
    Type(TypeId),
    /// A type parameter of the specializing type
    Parameter(String),
}

/// A directed "extends" edge with its bound arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generalization {
    /// The more general type
    pub general: TypeId,
    /// Type arguments, in the general type's parameter order
    pub type_arguments: SmallVec<[TypeArgument; 2]>,
    /// Multiplicity arguments, in the general type's parameter order
    pub multiplicity_arguments: SmallVec<[Multiplicity; 1]>,
}

impl Generalization {
    /// Create an edge without arguments
    pub fn new(general: TypeId) -> Self {
        Self {
            general,
            type_arguments: SmallVec::new(),
            multiplicity_arguments: SmallVec::new(),
        }
    }

    /// Bind the next type argument
    pub fn with_type_argument(mut self, argument: TypeArgument) -> Self {
        self.type_arguments.push(argument);
        self
    }

    /// Bind the next multiplicity argument
    pub fn with_multiplicity_argument(mut self, argument: Multiplicity) -> Self {
        self.multiplicity_arguments.push(argument);
        self
    }
}

/// A simple property declared on a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    /// Property type
    pub ty: TypeId,
    pub multiplicity: Multiplicity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl PropertyDef {
    /// Create a property
    pub fn new(name: impl Into<String>, ty: TypeId, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.into(),
            ty,
            multiplicity,
            location: None,
        }
    }

    /// Set the source location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Check if `other` declares the same type and multiplicity
    pub fn is_compatible_with(&self, other: &PropertyDef) -> bool {
        self.ty == other.ty && self.multiplicity.equals(&other.multiplicity, true)
    }
}

/// A property taking arguments, e.g. `employeesByName(name: String[1]): Person[*]`
///
/// Only parameter multiplicities take part in resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedPropertyDef {
    pub name: String,
    /// Multiplicities of the parameters, in declaration order
    pub parameters: Vec<Multiplicity>,
    /// Result type
    pub ty: TypeId,
    /// Result multiplicity
    pub multiplicity: Multiplicity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl QualifiedPropertyDef {
    /// Create a qualified property
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Multiplicity>,
        ty: TypeId,
        multiplicity: Multiplicity,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            ty,
            multiplicity,
            location: None,
        }
    }

    /// Set the source location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// A type in the graph
#[derive(Debug, Clone)]
pub struct TypeNode {
    path: String,
    kind: TypeKind,
    generalizations: Vec<Generalization>,
    properties: IndexMap<String, PropertyDef>,
    qualified_properties: Vec<QualifiedPropertyDef>,
    location: Option<SourceLocation>,
    modified_at: u64,
}

impl TypeNode {
    fn new(path: String, kind: TypeKind, modified_at: u64) -> Self {
        Self {
            path,
            kind,
            generalizations: Vec::new(),
            properties: IndexMap::new(),
            qualified_properties: Vec::new(),
            location: None,
            modified_at,
        }
    }

    /// Fully qualified path, e.g. `meta::pure::Person`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Direct generalizations in declared order
    pub fn generalizations(&self) -> &[Generalization] {
        &self.generalizations
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &IndexMap<String, PropertyDef> {
        &self.properties
    }

    pub fn qualified_properties(&self) -> &[QualifiedPropertyDef] {
        &self.qualified_properties
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Graph generation of the last change to this type
    pub fn modified_at(&self) -> u64 {
        self.modified_at
    }
}

/// Type graph construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A path or id does not name a type of the graph
    #[error("Unknown type '{name}'")]
    UnknownType { name: String },

    /// A path is declared twice
    #[error("Type '{path}' is already declared")]
    DuplicateType { path: String },

    /// A property name is declared twice on the same type
    #[error("Property '{property}' is already declared on '{owner}'")]
    DuplicateProperty { owner: String, property: String },

    /// No type id is left for a new declaration
    #[error("Cannot declare '{path}': the type graph is full")]
    CapacityExceeded { path: String },
}

impl ToDiagnostic for GraphError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownType { .. } => M30001,
            Self::DuplicateType { .. } => M30002,
            Self::DuplicateProperty { .. } => M30003,
            Self::CapacityExceeded { .. } => M30004,
        }
    }
}

/// Graph result
pub type GraphResult<T> = Result<T, GraphError>;

/// Arena of types and their generalization edges
#[derive(Debug, Clone)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    by_path: HashMap<String, TypeId>,
    generation: u64,
}

impl TypeGraph {
    /// Create a graph rooted at [`DEFAULT_ROOT_PATH`]
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT_PATH)
    }

    /// Create a graph whose universal root has the given path
    pub fn with_root(root_path: impl Into<String>) -> Self {
        let root_path = root_path.into();
        let mut by_path = HashMap::new();
        by_path.insert(root_path.clone(), TypeId::ROOT);
        Self {
            nodes: vec![TypeNode::new(root_path, TypeKind::Root, 0)],
            by_path,
            generation: 0,
        }
    }

    /// Current generation; advanced by every mutation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self, id: TypeId) -> GraphResult<&mut TypeNode> {
        self.check(id)?;
        self.generation += 1;
        let node = &mut self.nodes[id.index()];
        node.modified_at = self.generation;
        Ok(node)
    }

    fn check(&self, id: TypeId) -> GraphResult<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownType {
                name: id.to_string(),
            })
        }
    }

    // === Mutation ===

    /// Declare a type
    pub fn add_type(&mut self, path: impl Into<String>, kind: TypeKind) -> GraphResult<TypeId> {
        let path = path.into();
        if self.by_path.contains_key(&path) {
            return Err(GraphError::DuplicateType { path });
        }
        let Ok(id) = TypeId::try_from(self.nodes.len()) else {
            return Err(GraphError::CapacityExceeded { path });
        };
        self.generation += 1;
        self.by_path.insert(path.clone(), id);
        self.nodes.push(TypeNode::new(path, kind, self.generation));
        Ok(id)
    }

    /// Append a generalization edge to `specific`
    pub fn add_generalization(
        &mut self,
        specific: TypeId,
        generalization: Generalization,
    ) -> GraphResult<()> {
        self.check(generalization.general)?;
        self.touch(specific)?.generalizations.push(generalization);
        Ok(())
    }

    /// Replace all generalization edges of `specific`
    pub fn set_generalizations(
        &mut self,
        specific: TypeId,
        generalizations: Vec<Generalization>,
    ) -> GraphResult<()> {
        for generalization in &generalizations {
            self.check(generalization.general)?;
        }
        self.touch(specific)?.generalizations = generalizations;
        Ok(())
    }

    /// Declare a property on `owner`
    pub fn add_property(&mut self, owner: TypeId, property: PropertyDef) -> GraphResult<()> {
        self.check(property.ty)?;
        self.check(owner)?;
        if self.nodes[owner.index()].properties.contains_key(&property.name) {
            return Err(GraphError::DuplicateProperty {
                owner: self.nodes[owner.index()].path.clone(),
                property: property.name,
            });
        }
        self.touch(owner)?
            .properties
            .insert(property.name.clone(), property);
        Ok(())
    }

    /// Declare a qualified property on `owner`
    ///
    /// Several qualified properties may share a name; they are told apart by their
    /// parameter multiplicities.
    pub fn add_qualified_property(
        &mut self,
        owner: TypeId,
        property: QualifiedPropertyDef,
    ) -> GraphResult<()> {
        self.check(property.ty)?;
        self.touch(owner)?.qualified_properties.push(property);
        Ok(())
    }

    /// Attach a source location to a type
    pub fn set_location(&mut self, id: TypeId, location: SourceLocation) -> GraphResult<()> {
        self.check(id)?;
        self.nodes[id.index()].location = Some(location);
        Ok(())
    }

    // === Queries ===

    pub fn get(&self, id: TypeId) -> Option<&TypeNode> {
        self.nodes.get(id.index())
    }

    /// Find a type by path
    pub fn lookup(&self, path: &str) -> Option<TypeId> {
        self.by_path.get(path).copied()
    }

    /// Path of a type
    pub fn path(&self, id: TypeId) -> Option<&str> {
        self.get(id).map(TypeNode::path)
    }

    /// Path of a type, or its id when it is not in the graph
    pub fn display_name(&self, id: TypeId) -> String {
        self.path(id)
            .map_or_else(|| id.to_string(), str::to_string)
    }

    /// Direct generalizations in declared order; empty for unknown ids
    pub fn direct_generalizations(&self, id: TypeId) -> &[Generalization] {
        self.get(id)
            .map(TypeNode::generalizations)
            .unwrap_or_default()
    }

    /// Types declaring `id` as a direct generalization, in arena order
    pub fn direct_specializations(&self, id: TypeId) -> Vec<TypeId> {
        self.iter()
            .filter(|(_, node)| node.generalizations.iter().any(|g| g.general == id))
            .map(|(specific, _)| specific)
            .collect()
    }

    /// Number of types, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is present from creation
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All types in arena order, root first
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeNode)> {
        self.nodes
            .iter()
            .zip(0u32..)
            .map(|(node, index)| (TypeId(index), node))
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}
