//! Scheme types — the entity-relationship input and output
//!
//! A `Scheme` is what the diagram editor exchanges with the normalizer:
//! entities with typed attributes, the functional dependencies authored for
//! each entity, and the relationships between entities.
//!
//! ## Example Scheme
//!
//! ```yaml
//! entities:
//!   - name: enrollment
//!     attributes:
//!       - name: student_id
//!         type: integer
//!         constraints: [primary_key]
//!       - name: course_id
//!         type: integer
//!         constraints: [primary_key]
//!       - name: grade
//!         type: string
//!       - name: student_name
//!         type: string
//!     dependencies:
//!       - determinants: [student_id]
//!         dependants: [student_name]
//! relationships: []
//! ```
//!
//! The primary key implicitly determines every other attribute; declared
//! dependencies come after that implicit one.

use crate::error::{Error, Result};
use crate::matrix::FunctionalDependency;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A complete entity-relationship scheme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(
    title = "fdnorm Scheme",
    description = "Entity-relationship scheme with functional dependencies"
)]
pub struct Scheme {
    /// Entities (tables)
    #[serde(default)]
    pub entities: Vec<Entity>,

    /// Attribute-level links between entities
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// An entity (table)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    /// Entity name, unique within the scheme
    pub name: String,

    /// Attributes (columns)
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Authored functional dependencies, in addition to the key dependency
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<TableDependency>,
}

/// An attribute (column)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub name: String,

    #[serde(rename = "type", default)]
    pub typ: AttributeType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<AttributeConstraint>,
}

/// Attribute data types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    #[default]
    Unknown,
    Integer,
    Float,
    String,
    Boolean,
}

/// Attribute constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttributeConstraint {
    NotNullable,
    PrimaryKey,
    ForeignKey,
}

/// A functional dependency as authored on an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableDependency {
    /// Left-hand side attribute names
    #[serde(default)]
    pub determinants: Vec<String>,

    /// Right-hand side attribute names
    #[serde(default, alias = "dependents")]
    pub dependants: Vec<String>,
}

/// A link from one entity attribute to another
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    pub from: RelationshipEnd,
    pub to: RelationshipEnd,
}

/// One side of a relationship
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipEnd {
    #[serde(alias = "entityName")]
    pub entity_name: String,

    #[serde(alias = "attributeName")]
    pub attribute_name: String,
}

impl RelationshipEnd {
    pub fn new(entity_name: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            attribute_name: attribute_name.into(),
        }
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, typ: AttributeType) -> Self {
        Self {
            name: name.into(),
            typ,
            constraints: Vec::new(),
        }
    }

    /// Builder-style constraint
    pub fn with(mut self, constraint: AttributeConstraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    pub fn has_constraint(&self, constraint: AttributeConstraint) -> bool {
        self.constraints.contains(&constraint)
    }

    /// Add a constraint unless already present
    pub fn add_constraint(&mut self, constraint: AttributeConstraint) {
        if !self.has_constraint(constraint) {
            self.constraints.push(constraint);
        }
    }

    pub fn remove_constraint(&mut self, constraint: AttributeConstraint) {
        self.constraints.retain(|c| *c != constraint);
    }

    pub fn is_primary_key(&self) -> bool {
        self.has_constraint(AttributeConstraint::PrimaryKey)
    }
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Names of the primary-key attributes
    pub fn primary_key(&self) -> BTreeSet<String> {
        self.attributes
            .iter()
            .filter(|a| a.is_primary_key())
            .map(|a| a.name.clone())
            .collect()
    }

    /// Raw dependency list fed to the dependency matrix
    ///
    /// With `implicit_key` the key → non-key dependency comes first, provided
    /// both sides are non-empty.
    pub fn functional_dependencies(&self, implicit_key: bool) -> Vec<FunctionalDependency> {
        let mut fds = Vec::with_capacity(self.dependencies.len() + 1);

        if implicit_key {
            let key = self.primary_key();
            let non_key: BTreeSet<String> = self
                .attributes
                .iter()
                .filter(|a| !key.contains(&a.name))
                .map(|a| a.name.clone())
                .collect();

            if !key.is_empty() && !non_key.is_empty() {
                fds.push(FunctionalDependency {
                    determinants: key,
                    dependents: non_key,
                });
            }
        }

        fds.extend(self.dependencies.iter().map(FunctionalDependency::from));
        fds
    }
}

impl TableDependency {
    pub fn new<I, J, S, T>(determinants: I, dependants: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            determinants: determinants.into_iter().map(Into::into).collect(),
            dependants: dependants.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&TableDependency> for FunctionalDependency {
    fn from(dependency: &TableDependency) -> Self {
        FunctionalDependency::new(
            dependency.determinants.iter().cloned(),
            dependency.dependants.iter().cloned(),
        )
    }
}

impl Scheme {
    /// Parse scheme from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::SchemeParse(e.to_string()))
    }

    /// Serialize scheme to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::SchemeParse(e.to_string()))
    }

    /// Parse scheme from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::SchemeParse(e.to_string()))
    }

    /// Serialize scheme to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SchemeParse(e.to_string()))
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}
