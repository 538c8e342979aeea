//! Scheme normalization
//!
//! Drives the [`DependencyMatrix`] once per entity and rebuilds the scheme
//! from its output:
//!
//! - every final row becomes an entity keyed by the row's determinants
//! - the row keyed by the declared primary key keeps the entity's name; when
//!   no row is, a key-only entity keeps it, with a foreign key to each row
//!   keyed by part of that key
//! - every migration record becomes a foreign key from the row that lost
//!   dependents to the row that now owns them
//! - relationships pointing at a split entity are re-pointed to whichever new
//!   entity holds the attribute
//!
//! ```rust
//! use fdnorm::{Normalizer, Scheme};
//!
//! let scheme = Scheme::from_yaml(r#"
//! entities:
//!   - name: enrollment
//!     attributes:
//!       - { name: student_id, type: integer, constraints: [primary_key] }
//!       - { name: course_id, type: integer, constraints: [primary_key] }
//!       - { name: grade, type: string }
//!       - { name: student_name, type: string }
//!     dependencies:
//!       - { determinants: [student_id], dependants: [student_name] }
//! "#)?;
//!
//! let report = Normalizer::new(&scheme).second_normal_form();
//! assert!(report.is_ok());
//! assert_eq!(report.scheme.unwrap().entities.len(), 2);
//! # Ok::<(), fdnorm::Error>(())
//! ```

use crate::config::NormalizeConfig;
use crate::matrix::{DependencyMatrix, FunctionalDependency, MergeOutcome, MigrationRecord};
use crate::scheme::{
    Attribute, AttributeConstraint, Entity, Relationship, RelationshipEnd, Scheme,
};
use crate::validate::{validate_scheme, Violation, ViolationKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Target normal form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NormalForm {
    /// No partial dependencies on a composite key
    Second,
    /// No transitive dependencies on the key; not supported by the engine
    Third,
}

impl TryFrom<u8> for NormalForm {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(NormalForm::Second),
            3 => Ok(NormalForm::Third),
            other => Err(format!("Unknown normal form: {} (expected 2 or 3)", other)),
        }
    }
}

impl From<NormalForm> for u8 {
    fn from(nf: NormalForm) -> Self {
        match nf {
            NormalForm::Second => 2,
            NormalForm::Third => 3,
        }
    }
}

impl FromStr for NormalForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "2" | "2nf" | "second" => Ok(NormalForm::Second),
            "3" | "3nf" | "third" => Ok(NormalForm::Third),
            other => Err(format!("Unknown normal form: {} (expected 2 or 3)", other)),
        }
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalForm::Second => f.write_str("2NF"),
            NormalForm::Third => f.write_str("3NF"),
        }
    }
}

/// How one entity was decomposed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDecomposition {
    /// Name of the entity in the input scheme
    pub entity: String,
    /// Output entity names, parallel to `rows`
    pub entities: Vec<String>,
    /// Row that kept the original entity name; `None` when the declared key
    /// matched no row and a key-only entity took the name instead
    pub primary_row: Option<usize>,
    /// Final rows of the dependency matrix
    pub rows: Vec<FunctionalDependency>,
    /// Migrations recorded per row
    pub migrations: Vec<Vec<MigrationRecord>>,
    pub merge: MergeOutcome,
}

impl EntityDecomposition {
    /// Whether the entity was split into more than one
    pub fn is_split(&self) -> bool {
        self.entities.len() > 1 || self.primary_row.is_none()
    }

    /// Every output entity name, the one carrying the original name first
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.entities.len() + 1);
        match self.primary_row {
            Some(row) => names.push(&self.entities[row]),
            None => names.push(&self.entity),
        }
        for (i, name) in self.entities.iter().enumerate() {
            if Some(i) != self.primary_row {
                names.push(name);
            }
        }
        names
    }
}

/// Result of a normalization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub normal_form: NormalForm,
    /// Transformed scheme; `None` when violations were found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<Scheme>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decompositions: Vec<EntityDecomposition>,
}

impl NormalizationReport {
    fn rejected(normal_form: NormalForm, violations: Vec<Violation>) -> Self {
        Self {
            normal_form,
            scheme: None,
            violations,
            decompositions: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty() && self.scheme.is_some()
    }

    /// Human-readable summary
    pub fn to_report(&self) -> String {
        let mut out = String::new();

        if !self.is_ok() {
            out.push_str(&format!(
                "✗ {}: {} violation(s)\n",
                self.normal_form,
                self.violations.len()
            ));
            for violation in &self.violations {
                out.push_str(&format!("  - {}\n", violation));
            }
            return out;
        }

        let entity_count = self.scheme.as_ref().map_or(0, |s| s.entities.len());
        out.push_str(&format!("✓ {}: {} entities\n", self.normal_form, entity_count));

        for decomposition in &self.decompositions {
            if !decomposition.is_split() {
                out.push_str(&format!("  {}: unchanged\n", decomposition.entity));
                continue;
            }

            out.push_str(&format!(
                "  {} → {}\n",
                decomposition.entity,
                decomposition.entity_names().join(", ")
            ));
            if decomposition.primary_row.is_none() {
                out.push_str(&format!("    {}: key only\n", decomposition.entity));
            }
            for (i, row) in decomposition.rows.iter().enumerate() {
                out.push_str(&format!("    {}: {}\n", decomposition.entities[i], row));
                for migration in &decomposition.migrations[i] {
                    let keys: Vec<&str> =
                        migration.moved_attributes.iter().map(String::as_str).collect();
                    out.push_str(&format!(
                        "      fk ({}) → {}\n",
                        keys.join(", "),
                        decomposition.entities[migration.target_row]
                    ));
                }
            }
        }

        out
    }
}

/// Normalizes every entity of a scheme
pub struct Normalizer<'a> {
    scheme: &'a Scheme,
    config: NormalizeConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(scheme: &'a Scheme) -> Self {
        Self {
            scheme,
            config: NormalizeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: &NormalizeConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Normalize to the configured normal form
    pub fn run(&self) -> NormalizationReport {
        self.normalize(self.config.normal_form)
    }

    pub fn second_normal_form(&self) -> NormalizationReport {
        self.normalize(NormalForm::Second)
    }

    pub fn normalize(&self, normal_form: NormalForm) -> NormalizationReport {
        let mut violations = validate_scheme(self.scheme);
        if normal_form != NormalForm::Second {
            violations.push(Violation::new(
                None,
                ViolationKind::UnsupportedNormalForm,
                format!("{} is not supported, only 2NF", normal_form),
            ));
        }

        if !violations.is_empty() {
            info!(violations = violations.len(), "scheme rejected");
            return NormalizationReport::rejected(normal_form, violations);
        }

        let mut used_names: HashSet<String> =
            self.scheme.entities.iter().map(|e| e.name.clone()).collect();
        let mut entities = Vec::new();
        let mut relationships = Vec::new();
        let mut decompositions = Vec::new();
        let mut replaced: BTreeMap<&str, Vec<Entity>> = BTreeMap::new();

        for entity in &self.scheme.entities {
            match self.decompose_entity(entity, &mut used_names) {
                Some((decomposition, new_entities, links)) => {
                    if decomposition.is_split() {
                        info!(
                            entity = %entity.name,
                            into = decomposition.entities.len(),
                            "entity decomposed"
                        );
                    }
                    replaced.insert(entity.name.as_str(), new_entities.clone());
                    entities.extend(new_entities);
                    relationships.extend(links);
                    decompositions.push(decomposition);
                }
                None => entities.push(entity.clone()),
            }
        }

        for relationship in &self.scheme.relationships {
            let relinked = Relationship {
                from: relink(&relationship.from, &replaced),
                to: relink(&relationship.to, &replaced),
            };
            if !relationships.contains(&relinked) {
                relationships.push(relinked);
            }
        }

        NormalizationReport {
            normal_form,
            scheme: Some(Scheme {
                entities,
                relationships,
            }),
            violations: Vec::new(),
            decompositions,
        }
    }

    /// Split one entity; `None` when it declares no dependencies at all
    fn decompose_entity(
        &self,
        entity: &Entity,
        used_names: &mut HashSet<String>,
    ) -> Option<(EntityDecomposition, Vec<Entity>, Vec<Relationship>)> {
        let fds = entity.functional_dependencies(self.config.implicit_key_dependency);
        if fds.is_empty() {
            debug!(entity = %entity.name, "no dependencies, kept as is");
            return None;
        }

        let mut matrix = DependencyMatrix::new(fds);
        let migrations = matrix.to_second_normal_form();
        let merge = matrix.last_merge().copied().unwrap_or_default();
        let rows = matrix.canonical_rows().to_vec();

        let key = entity.primary_key();
        let primary_row = primary_row(&rows, &key);
        let names: Vec<String> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if Some(i) == primary_row {
                    entity.name.clone()
                } else {
                    let name = self
                        .config
                        .naming
                        .entity_name(&entity.name, &row.determinants);
                    unique_name(name, used_names)
                }
            })
            .collect();

        let mut new_entities: Vec<Entity> = rows
            .iter()
            .zip(&names)
            .map(|(row, name)| project(entity, name, row))
            .collect();

        // no row is keyed by the declared key: the entity keeps it on its own
        let mut key_entity = match primary_row {
            Some(_) => None,
            None => {
                debug!(entity = %entity.name, "declared key kept on a key entity");
                Some(project_key(entity, &key))
            }
        };

        // attributes no row kept stay with the primary entity
        let placed: BTreeSet<&str> = rows
            .iter()
            .flat_map(|r| r.determinants.iter().chain(r.dependents.iter()))
            .chain(key.iter())
            .map(String::as_str)
            .collect();
        for attr in &entity.attributes {
            if !placed.contains(attr.name.as_str()) {
                let mut attr = attr.clone();
                attr.remove_constraint(AttributeConstraint::PrimaryKey);
                match (&mut key_entity, primary_row) {
                    (Some(primary), _) => primary.attributes.push(attr),
                    (None, Some(row)) => new_entities[row].attributes.push(attr),
                    (None, None) => {}
                }
            }
        }

        let mut links = Vec::new();
        if let Some(primary) = &mut key_entity {
            for (row, name) in rows.iter().zip(&names) {
                if !row.determinants.is_subset(&key) {
                    continue;
                }
                for attr in &row.determinants {
                    if let Some(fk) = primary.attribute_mut(attr) {
                        fk.add_constraint(AttributeConstraint::ForeignKey);
                    }
                    push_link(
                        &mut links,
                        RelationshipEnd::new(&primary.name, attr),
                        RelationshipEnd::new(name, attr),
                    );
                }
            }
        }

        for (source, records) in migrations.iter().enumerate() {
            for record in records {
                for attr in &record.moved_attributes {
                    if let Some(fk) = new_entities[source].attribute_mut(attr) {
                        fk.add_constraint(AttributeConstraint::ForeignKey);
                    }
                    push_link(
                        &mut links,
                        RelationshipEnd::new(&names[source], attr),
                        RelationshipEnd::new(&names[record.target_row], attr),
                    );
                }
            }
        }

        let decomposition = EntityDecomposition {
            entity: entity.name.clone(),
            entities: names,
            primary_row,
            rows,
            migrations,
            merge,
        };

        let entities = key_entity.into_iter().chain(new_entities).collect();
        Some((decomposition, entities, links))
    }
}

/// Row keyed by the declared key
///
/// A keyless entity falls back to the first row with the widest key. An
/// entity whose declared key matches no row has no primary row.
fn primary_row(rows: &[FunctionalDependency], key: &BTreeSet<String>) -> Option<usize> {
    if !key.is_empty() {
        return rows.iter().position(|r| r.determinants == *key);
    }

    let widest = rows.iter().map(|r| r.determinants.len()).max()?;
    rows.iter().position(|r| r.determinants.len() == widest)
}

fn push_link(links: &mut Vec<Relationship>, from: RelationshipEnd, to: RelationshipEnd) {
    let link = Relationship { from, to };
    if !links.contains(&link) {
        links.push(link);
    }
}

/// Entity holding only the declared key attributes
fn project_key(entity: &Entity, key: &BTreeSet<String>) -> Entity {
    Entity {
        name: entity.name.clone(),
        attributes: entity
            .attributes
            .iter()
            .filter(|attr| key.contains(&attr.name))
            .map(|attr| attr.clone().with(AttributeConstraint::PrimaryKey))
            .collect(),
        dependencies: Vec::new(),
    }
}

/// Entity holding `row`, with attributes in the original entity's order
fn project(entity: &Entity, name: &str, row: &FunctionalDependency) -> Entity {
    let attributes = entity
        .attributes
        .iter()
        .filter_map(|attr| {
            if row.determinants.contains(&attr.name) {
                Some(attr.clone().with(AttributeConstraint::PrimaryKey))
            } else if row.dependents.contains(&attr.name) {
                let mut attr = attr.clone();
                attr.remove_constraint(AttributeConstraint::PrimaryKey);
                Some(attr)
            } else {
                None
            }
        })
        .collect::<Vec<Attribute>>();

    Entity {
        name: name.to_string(),
        attributes,
        dependencies: Vec::new(),
    }
}

fn unique_name(name: String, used_names: &mut HashSet<String>) -> String {
    let mut candidate = name.clone();
    let mut n = 2;
    while used_names.contains(&candidate) {
        candidate = format!("{}_{}", name, n);
        n += 1;
    }
    used_names.insert(candidate.clone());
    candidate
}

/// Point a relationship end at the entity that now holds its attribute
fn relink(end: &RelationshipEnd, replaced: &BTreeMap<&str, Vec<Entity>>) -> RelationshipEnd {
    let Some(candidates) = replaced.get(end.entity_name.as_str()) else {
        return end.clone();
    };

    let attr = end.attribute_name.as_str();
    let target = candidates
        .iter()
        .find(|e| e.name == end.entity_name && e.has_attribute(attr))
        .or_else(|| {
            candidates
                .iter()
                .find(|e| e.attribute(attr).is_some_and(Attribute::is_primary_key))
        })
        .or_else(|| candidates.iter().find(|e| e.has_attribute(attr)));

    match target {
        Some(entity) => RelationshipEnd::new(&entity.name, attr),
        None => end.clone(),
    }
}
