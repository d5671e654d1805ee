//! Declaration-by-path construction of a [`TypeGraph`]
//!
//! The declaration layer names types by path and may refer to a type before
//! declaring it. [`GraphBuilder`] records declarations in order and resolves every
//! path when [`GraphBuilder::build`] is called.
//!
//! ```
//! use m3_multiplicity::PURE_ONE;
//! use m3_types::GraphBuilder;
//!
//! let graph = GraphBuilder::new()
//!     .class("Employee")
//!     .extends("Employee", "Person")
//!     .class("Person")
//!     .primitive("String")
//!     .property("Person", "name", "String", PURE_ONE.clone())
//!     .build()
//!     .unwrap();
//!
//! assert!(graph.lookup("Employee").is_some());
//! ```

use m3_diagnostics::SourceLocation;
use m3_multiplicity::Multiplicity;

use crate::{
    DEFAULT_ROOT_PATH, Generalization, GraphError, GraphResult, PropertyDef, QualifiedPropertyDef,
    TypeArgument, TypeGraph, TypeId, TypeKind,
};

/// Type argument of a generalization, naming its type by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgumentDecl {
    Type(String),
    Parameter(String),
}

#[derive(Debug, Clone)]
struct TypeDecl {
    path: String,
    kind: TypeKind,
}

#[derive(Debug, Clone)]
struct ExtendsDecl {
    specific: String,
    general: String,
    type_arguments: Vec<TypeArgumentDecl>,
    multiplicity_arguments: Vec<Multiplicity>,
}

#[derive(Debug, Clone)]
struct PropertyDecl {
    owner: String,
    name: String,
    type_path: String,
    multiplicity: Multiplicity,
    parameters: Option<Vec<Multiplicity>>,
    location: Option<SourceLocation>,
}

/// Builder for a [`TypeGraph`] from path-based declarations
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    root: String,
    types: Vec<TypeDecl>,
    extends: Vec<ExtendsDecl>,
    properties: Vec<PropertyDecl>,
    locations: Vec<(String, SourceLocation)>,
}

impl GraphBuilder {
    /// Create a builder for a graph rooted at [`DEFAULT_ROOT_PATH`]
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT_PATH)
    }

    /// Create a builder for a graph with the given root path
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            types: Vec::new(),
            extends: Vec::new(),
            properties: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// Declare a type of the given kind
    pub fn declare(mut self, path: impl Into<String>, kind: TypeKind) -> Self {
        self.types.push(TypeDecl {
            path: path.into(),
            kind,
        });
        self
    }

    /// Declare a class
    pub fn class(self, path: impl Into<String>) -> Self {
        self.declare(path, TypeKind::Class)
    }

    /// Declare an association
    pub fn association(self, path: impl Into<String>) -> Self {
        self.declare(path, TypeKind::Association)
    }

    /// Declare a primitive type
    pub fn primitive(self, path: impl Into<String>) -> Self {
        self.declare(path, TypeKind::Primitive)
    }

    /// Append a generalization edge without arguments
    pub fn extends(self, specific: impl Into<String>, general: impl Into<String>) -> Self {
        self.extends_with(specific, general, Vec::new(), Vec::new())
    }

    /// Append a generalization edge binding type and multiplicity arguments
    pub fn extends_with(
        mut self,
        specific: impl Into<String>,
        general: impl Into<String>,
        type_arguments: Vec<TypeArgumentDecl>,
        multiplicity_arguments: Vec<Multiplicity>,
    ) -> Self {
        self.extends.push(ExtendsDecl {
            specific: specific.into(),
            general: general.into(),
            type_arguments,
            multiplicity_arguments,
        });
        self
    }

    /// Declare a property
    pub fn property(
        mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        type_path: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        self.properties.push(PropertyDecl {
            owner: owner.into(),
            name: name.into(),
            type_path: type_path.into(),
            multiplicity,
            parameters: None,
            location: None,
        });
        self
    }

    /// Declare a qualified property with the given parameter multiplicities
    pub fn qualified_property(
        mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<Multiplicity>,
        type_path: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        self.properties.push(PropertyDecl {
            owner: owner.into(),
            name: name.into(),
            type_path: type_path.into(),
            multiplicity,
            parameters: Some(parameters),
            location: None,
        });
        self
    }

    /// Attach a source location to the last declared property
    pub fn at(mut self, location: SourceLocation) -> Self {
        if let Some(property) = self.properties.last_mut() {
            property.location = Some(location);
        }
        self
    }

    /// Attach a source location to a type
    pub fn located(mut self, path: impl Into<String>, location: SourceLocation) -> Self {
        self.locations.push((path.into(), location));
        self
    }

    /// Resolve every path and build the graph
    ///
    /// Types are added in declaration order, then generalizations, then
    /// properties, each in declaration order.
    pub fn build(self) -> GraphResult<TypeGraph> {
        let mut graph = TypeGraph::with_root(self.root);

        for decl in self.types {
            graph.add_type(decl.path, decl.kind)?;
        }

        for (path, location) in self.locations {
            let id = resolve(&graph, &path)?;
            graph.set_location(id, location)?;
        }

        for decl in self.extends {
            let specific = resolve(&graph, &decl.specific)?;
            let mut generalization = Generalization::new(resolve(&graph, &decl.general)?);
            for argument in decl.type_arguments {
                generalization = generalization.with_type_argument(match argument {
                    TypeArgumentDecl::Type(path) => TypeArgument::Type(resolve(&graph, &path)?),
                    TypeArgumentDecl::Parameter(name) => TypeArgument::Parameter(name),
                });
            }
            for multiplicity in decl.multiplicity_arguments {
                generalization = generalization.with_multiplicity_argument(multiplicity);
            }
            graph.add_generalization(specific, generalization)?;
        }

        for decl in self.properties {
            let owner = resolve(&graph, &decl.owner)?;
            let ty = resolve(&graph, &decl.type_path)?;
            match decl.parameters {
                None => {
                    let mut property = PropertyDef::new(decl.name, ty, decl.multiplicity);
                    property.location = decl.location;
                    graph.add_property(owner, property)?;
                }
                Some(parameters) => {
                    let mut property =
                        QualifiedPropertyDef::new(decl.name, parameters, ty, decl.multiplicity);
                    property.location = decl.location;
                    graph.add_qualified_property(owner, property)?;
                }
            }
        }

        Ok(graph)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(graph: &TypeGraph, path: &str) -> GraphResult<TypeId> {
    graph.lookup(path).ok_or_else(|| GraphError::UnknownType {
        name: path.to_string(),
    })
}
