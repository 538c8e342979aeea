//! Scheme normalization end to end

use fdnorm::{
    AttributeConstraint, Config, Entity, NormalForm, Normalizer, Relationship, RelationshipEnd,
    Scheme, ViolationKind,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const ENROLLMENT: &str = r#"
entities:
  - name: enrollment
    attributes:
      - { name: student_id, type: integer, constraints: [primary_key] }
      - { name: course_id, type: integer, constraints: [primary_key] }
      - { name: grade, type: string }
      - { name: student_name, type: string }
      - { name: course_title, type: string }
    dependencies:
      - { determinants: [student_id], dependants: [student_name] }
      - { determinants: [course_id], dependants: [course_title] }
  - name: mailing
    attributes:
      - { name: id, type: integer, constraints: [primary_key] }
      - { name: student_name, type: string }
relationships:
  - from: { entity_name: mailing, attribute_name: student_name }
    to: { entity_name: enrollment, attribute_name: student_name }
"#;

fn entity_names(scheme: &Scheme) -> Vec<&str> {
    scheme.entities.iter().map(|e| e.name.as_str()).collect()
}

fn attribute_names(entity: &Entity) -> Vec<&str> {
    entity.attributes.iter().map(|a| a.name.as_str()).collect()
}

fn link(from: (&str, &str), to: (&str, &str)) -> Relationship {
    Relationship {
        from: RelationshipEnd::new(from.0, from.1),
        to: RelationshipEnd::new(to.0, to.1),
    }
}

fn normalized(yaml: &str) -> Scheme {
    let scheme = Scheme::from_yaml(yaml).expect("scheme should parse");
    let report = Normalizer::new(&scheme).second_normal_form();
    assert!(report.is_ok(), "unexpected violations: {:?}", report.violations);
    report.scheme.expect("normalized scheme")
}

#[test]
fn test_enrollment_is_split_per_key_part() {
    let scheme = normalized(ENROLLMENT);

    assert_eq!(
        entity_names(&scheme),
        vec![
            "enrollment",
            "enrollment_student_id",
            "enrollment_course_id",
            "mailing"
        ]
    );

    let enrollment = scheme.entity("enrollment").unwrap();
    assert_eq!(
        attribute_names(enrollment),
        vec!["student_id", "course_id", "grade"]
    );
    assert_eq!(
        enrollment.attribute("student_id").unwrap().constraints,
        vec![AttributeConstraint::PrimaryKey, AttributeConstraint::ForeignKey]
    );

    let students = scheme.entity("enrollment_student_id").unwrap();
    assert_eq!(attribute_names(students), vec!["student_id", "student_name"]);
    assert!(students.attribute("student_id").unwrap().is_primary_key());
    assert!(!students.attribute("student_name").unwrap().is_primary_key());

    let courses = scheme.entity("enrollment_course_id").unwrap();
    assert_eq!(attribute_names(courses), vec!["course_id", "course_title"]);
}

#[test]
fn test_migrations_become_relationships() {
    let scheme = normalized(ENROLLMENT);

    assert_eq!(
        scheme.relationships,
        vec![
            link(
                ("enrollment", "student_id"),
                ("enrollment_student_id", "student_id")
            ),
            link(
                ("enrollment", "course_id"),
                ("enrollment_course_id", "course_id")
            ),
            // re-pointed at the entity that now holds student_name
            link(
                ("mailing", "student_name"),
                ("enrollment_student_id", "student_name")
            ),
        ]
    );
}

#[test]
fn test_decomposition_report() {
    let scheme = Scheme::from_yaml(ENROLLMENT).unwrap();
    let report = Normalizer::new(&scheme).second_normal_form();

    assert_eq!(report.decompositions.len(), 2);
    let enrollment = &report.decompositions[0];
    assert!(enrollment.is_split());
    assert_eq!(enrollment.primary_row, Some(0));
    assert_eq!(enrollment.migrations[0].len(), 2);
    assert!(!report.decompositions[1].is_split());

    let text = report.to_report();
    assert!(text.starts_with("✓ 2NF: 4 entities"));
    assert!(text.contains("enrollment → enrollment, enrollment_student_id, enrollment_course_id"));
    assert!(text.contains("fk (course_id) → enrollment_course_id"));
    assert!(text.contains("mailing: unchanged"));
}

#[test]
fn test_already_normalized_entity_is_unchanged() {
    let yaml = r#"
entities:
  - name: product
    attributes:
      - { name: id, type: integer, constraints: [primary_key] }
      - { name: label, type: string }
      - { name: price, type: float }
"#;
    let input = Scheme::from_yaml(yaml).unwrap();
    let scheme = normalized(yaml);

    assert_eq!(scheme, input);
}

#[test]
fn test_split_names_do_not_collide_with_existing_entities() {
    let yaml = r#"
entities:
  - name: order_line
    attributes:
      - { name: order_id, type: integer, constraints: [primary_key] }
      - { name: product_id, type: integer, constraints: [primary_key] }
      - { name: quantity, type: integer }
      - { name: product_label, type: string }
    dependencies:
      - { determinants: [product_id], dependants: [product_label] }
  - name: order_line_product_id
    attributes:
      - { name: id, type: integer }
"#;
    let scheme = normalized(yaml);

    assert_eq!(
        entity_names(&scheme),
        vec!["order_line", "order_line_product_id_2", "order_line_product_id"]
    );
}

#[test]
fn test_json_scheme_with_camel_case_ends() {
    let json = r#"{
        "entities": [
            {
                "name": "t",
                "attributes": [
                    { "name": "a", "type": "integer", "constraints": ["primary_key"] },
                    { "name": "b", "type": "integer", "constraints": ["primary_key"] },
                    { "name": "c", "type": "string" },
                    { "name": "d", "type": "string" }
                ],
                "dependencies": [ { "determinants": ["a"], "dependents": ["d"] } ]
            },
            { "name": "u", "attributes": [ { "name": "d", "type": "string" } ] }
        ],
        "relationships": [
            {
                "from": { "entityName": "u", "attributeName": "d" },
                "to": { "entityName": "t", "attributeName": "d" }
            }
        ]
    }"#;
    let scheme = Scheme::from_json(json).unwrap();
    let out = Normalizer::new(&scheme).second_normal_form().scheme.unwrap();

    assert_eq!(entity_names(&out), vec!["t", "t_a", "u"]);
    assert_eq!(out.relationships.last(), Some(&link(("u", "d"), ("t_a", "d"))));

    // output round-trips through JSON
    let again = Scheme::from_json(&out.to_json().unwrap()).unwrap();
    assert_eq!(again, out);
}

// ============================================================================
// Rejected schemes
// ============================================================================

#[rstest]
#[case::unknown_attribute(
    "{ determinants: [student_id], dependants: [nickname] }",
    ViolationKind::UnknownAttribute
)]
#[case::empty_determinants(
    "{ determinants: [], dependants: [grade] }",
    ViolationKind::EmptyDeterminants
)]
#[case::empty_dependants(
    "{ determinants: [student_id], dependants: [] }",
    ViolationKind::EmptyDependents
)]
fn test_invalid_dependency_is_rejected(#[case] dependency: &str, #[case] expected: ViolationKind) {
    let yaml = format!(
        r#"
entities:
  - name: enrollment
    attributes:
      - {{ name: student_id, type: integer, constraints: [primary_key] }}
      - {{ name: grade, type: string }}
    dependencies:
      - {}
"#,
        dependency
    );
    let scheme = Scheme::from_yaml(&yaml).unwrap();
    let report = Normalizer::new(&scheme).second_normal_form();

    assert!(!report.is_ok());
    assert!(report.scheme.is_none());
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, expected);
    assert_eq!(report.violations[0].entity.as_deref(), Some("enrollment"));
}

#[test]
fn test_third_normal_form_is_not_supported() {
    let scheme = Scheme::from_yaml(ENROLLMENT).unwrap();
    let report = Normalizer::new(&scheme).normalize(NormalForm::Third);

    assert!(report.scheme.is_none());
    assert_eq!(report.normal_form, NormalForm::Third);
    assert_eq!(
        report.violations.last().map(|v| v.kind),
        Some(ViolationKind::UnsupportedNormalForm)
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_without_implicit_key_dependency() {
    let config = Config::from_yaml(
        r#"
normalize:
  implicit_key_dependency: false
  naming:
    split_entity: "{determinants}_of_{entity}"
"#,
    )
    .unwrap();
    let scheme = Scheme::from_yaml(ENROLLMENT).unwrap();
    let report = Normalizer::new(&scheme).with_config(&config.normalize).run();
    let out = report.scheme.clone().unwrap();

    // no row is keyed by {course_id, student_id}, so enrollment keeps the key alone
    assert_eq!(
        entity_names(&out),
        vec![
            "enrollment",
            "student_id_of_enrollment",
            "course_id_of_enrollment",
            "mailing"
        ]
    );

    let enrollment = out.entity("enrollment").unwrap();
    assert_eq!(
        attribute_names(enrollment),
        vec!["student_id", "course_id", "grade"]
    );
    for key in ["student_id", "course_id"] {
        assert_eq!(
            enrollment.attribute(key).unwrap().constraints,
            vec![AttributeConstraint::PrimaryKey, AttributeConstraint::ForeignKey]
        );
    }
    assert!(!enrollment.attribute("grade").unwrap().is_primary_key());

    assert_eq!(
        out.relationships,
        vec![
            link(
                ("enrollment", "student_id"),
                ("student_id_of_enrollment", "student_id")
            ),
            link(
                ("enrollment", "course_id"),
                ("course_id_of_enrollment", "course_id")
            ),
            link(
                ("mailing", "student_name"),
                ("student_id_of_enrollment", "student_name")
            ),
        ]
    );

    let decomposition = &report.decompositions[0];
    assert_eq!(decomposition.primary_row, None);
    assert!(decomposition.is_split());
    let text = report.to_report();
    assert!(text.contains(
        "enrollment → enrollment, student_id_of_enrollment, course_id_of_enrollment"
    ));
    assert!(text.contains("enrollment: key only"));
}
