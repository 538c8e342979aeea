//! Scheme validation
//!
//! The dependency matrix trusts its input. Everything it cannot cope with
//! (dependencies over unknown attributes, empty sides, ambiguous names) is
//! caught here and reported as violations before any entity is normalized.

use crate::scheme::{RelationshipEnd, Scheme};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Kind of problem found in a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DuplicateEntity,
    DuplicateAttribute,
    EmptyName,
    EmptyDeterminants,
    EmptyDependents,
    UnknownAttribute,
    UnknownRelationshipEnd,
    UnsupportedNormalForm,
}

/// A problem that prevents normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    /// Entity the problem belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(entity: Option<&str>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            entity: entity.map(str::to_string),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(f, "{}: {}", entity, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Check a scheme before normalization
pub fn validate_scheme(scheme: &Scheme) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut entity_names = HashSet::new();

    for entity in &scheme.entities {
        let name = entity.name.as_str();

        if name.is_empty() {
            violations.push(Violation::new(None, ViolationKind::EmptyName, "Entity name is empty"));
        } else if !entity_names.insert(name) {
            violations.push(Violation::new(
                Some(name),
                ViolationKind::DuplicateEntity,
                format!("Duplicate entity name: {}", name),
            ));
        }

        let mut attribute_names = HashSet::new();
        for attr in &entity.attributes {
            if attr.name.is_empty() {
                violations.push(Violation::new(
                    Some(name),
                    ViolationKind::EmptyName,
                    "Attribute name is empty",
                ));
            } else if !attribute_names.insert(attr.name.as_str()) {
                violations.push(Violation::new(
                    Some(name),
                    ViolationKind::DuplicateAttribute,
                    format!("Duplicate attribute name: {}", attr.name),
                ));
            }
        }

        for (i, dependency) in entity.dependencies.iter().enumerate() {
            if dependency.determinants.is_empty() {
                violations.push(Violation::new(
                    Some(name),
                    ViolationKind::EmptyDeterminants,
                    format!("Dependency {} has no determinants", i),
                ));
            }
            if dependency.dependants.is_empty() {
                violations.push(Violation::new(
                    Some(name),
                    ViolationKind::EmptyDependents,
                    format!("Dependency {} has no dependents", i),
                ));
            }

            for attr in dependency.determinants.iter().chain(&dependency.dependants) {
                if !entity.has_attribute(attr) {
                    violations.push(Violation::new(
                        Some(name),
                        ViolationKind::UnknownAttribute,
                        format!("Dependency {} references unknown attribute: {}", i, attr),
                    ));
                }
            }
        }
    }

    for relationship in &scheme.relationships {
        for end in [&relationship.from, &relationship.to] {
            if !end_exists(scheme, end) {
                violations.push(Violation::new(
                    None,
                    ViolationKind::UnknownRelationshipEnd,
                    format!(
                        "Relationship references unknown attribute: {}.{}",
                        end.entity_name, end.attribute_name
                    ),
                ));
            }
        }
    }

    violations
}

fn end_exists(scheme: &Scheme, end: &RelationshipEnd) -> bool {
    scheme
        .entity(&end.entity_name)
        .is_some_and(|entity| entity.has_attribute(&end.attribute_name))
}
