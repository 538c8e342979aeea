//! Matrix inspection, closure and schema CLI commands

use super::util::{has_flag, load_config, load_scheme, positional};
use fdnorm::*;

pub fn cmd_matrix(args: &[String]) -> Result<()> {
    let paths = positional(args);
    let (Some(scheme_path), Some(entity_name)) = (paths.first(), paths.get(1)) else {
        return Err("Usage: fdnorm matrix <scheme.yaml> <entity> [--json] [--config <file>]".into());
    };

    let config = load_config(args)?;
    let scheme = load_scheme(scheme_path)?;
    let entity = scheme
        .entity(entity_name)
        .ok_or_else(|| Error::Other(format!("Unknown entity: {}", entity_name)))?;

    let fds = entity.functional_dependencies(config.normalize.implicit_key_dependency);
    let mut matrix = DependencyMatrix::new(fds);

    matrix.canonicalize();
    let canonical = matrix.to_string();
    let grid = render_grid(&matrix);
    let orders = matrix.determinant_order_per_attribute();

    let merge = matrix.merge_transitive();
    let unified = matrix.merge_identical_determinants();
    let migrations = matrix.remove_duplicated_dependents();

    if has_flag(args, "--json") {
        let output = serde_json::json!({
            "entity": entity.name,
            "attributes": matrix.attributes(),
            "rows": matrix.rows(),
            "merge": merge,
            "unified": unified,
            "final_rows": matrix.canonical_rows(),
            "migrations": migrations,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Entity: {}", entity.name);
    println!("Attributes: {}", matrix.attributes().join(", "));
    println!();
    println!("Initial dependencies:\n{}", matrix.display_initial());
    println!();
    println!("Canonical dependencies:\n{}", canonical);
    println!();
    println!("Matrix (1 = determinant, 0 = dependent):\n{}", grid);
    println!();
    let order_line: Vec<String> = matrix
        .attributes()
        .iter()
        .zip(&orders)
        .map(|(attr, order)| format!("{}={}", attr, order))
        .collect();
    println!("Determinant order: {}", order_line.join(", "));
    println!(
        "Merge: start row {}, {} iteration(s), {} row(s) merged; {} merged by identical determinants",
        merge.start_row, merge.iterations, merge.total_merged, unified
    );
    println!();
    println!("Final dependencies:\n{}", matrix);

    let total: usize = migrations.iter().map(Vec::len).sum();
    if total > 0 {
        println!();
        println!("Migrations:");
        for (row, records) in migrations.iter().enumerate() {
            for record in records {
                let keys: Vec<&str> = record.moved_attributes.iter().map(String::as_str).collect();
                println!("  row {}: fk ({}) → row {}", row, keys.join(", "), record.target_row);
            }
        }
    }

    Ok(())
}

pub fn cmd_closure(args: &[String]) -> Result<()> {
    let paths = positional(args);
    if paths.len() < 3 {
        return Err(
            "Usage: fdnorm closure <scheme.yaml> <entity> <attribute>... [--json] [--config <file>]"
                .into(),
        );
    }

    let config = load_config(args)?;
    let scheme = load_scheme(paths[0])?;
    let entity = scheme
        .entity(paths[1])
        .ok_or_else(|| Error::Other(format!("Unknown entity: {}", paths[1])))?;

    let fds = entity.functional_dependencies(config.normalize.implicit_key_dependency);
    let attrs = &paths[2..];
    for attr in attrs {
        if !entity.has_attribute(attr) {
            return Err(format!("Unknown attribute: {}.{}", entity.name, attr).into());
        }
    }

    let (closure, superkey) = closure_of_entity(entity, &fds, attrs);

    if has_flag(args, "--json") {
        let output = serde_json::json!({
            "attributes": attrs,
            "closure": closure,
            "superkey": superkey,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let members: Vec<&str> = closure.iter().map(String::as_str).collect();
        println!("{{{}}}+ = {{{}}}", attrs.join(", "), members.join(", "));
        if superkey {
            println!("✓ superkey of {}", entity.name);
        }
    }

    Ok(())
}

pub fn cmd_schema(args: &[String]) -> Result<()> {
    let name = positional(args).first().copied().unwrap_or("scheme");

    let schema = match name {
        "scheme" => schemars::schema_for!(Scheme),
        "config" => schemars::schema_for!(Config),
        "violation" => schemars::schema_for!(Violation),
        other => {
            return Err(format!(
                "Unknown schema: {} (available: scheme, config, violation)",
                other
            )
            .into())
        }
    };

    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Closure of `attrs` within `entity`, and whether they form a superkey of it
fn closure_of_entity(
    entity: &Entity,
    fds: &[FunctionalDependency],
    attrs: &[&str],
) -> (std::collections::BTreeSet<String>, bool) {
    let start: std::collections::BTreeSet<String> =
        attrs.iter().map(|a| a.to_string()).collect();
    let universe: Vec<String> = entity.attributes.iter().map(|a| a.name.clone()).collect();

    let superkey = is_superkey(&start, &universe, fds);
    (closure(start, fds), superkey)
}

/// Canonical rows drawn as a `rows x attributes` grid
fn render_grid(matrix: &DependencyMatrix) -> String {
    let attrs = matrix.attributes();
    let widths: Vec<usize> = attrs.iter().map(|a| a.chars().count().max(1)).collect();

    let mut lines = Vec::new();
    let header: Vec<String> = attrs
        .iter()
        .zip(&widths)
        .map(|(a, w)| format!("{:>w$}", a, w = w))
        .collect();
    lines.push(format!("    {}", header.join(" ")));

    for row in 0..matrix.canonical_rows().len() {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(column, w)| {
                let cell = matrix
                    .matrix_value(row, column)
                    .map(|v| v.as_digit().to_string())
                    .unwrap_or_else(|| ".".to_string());
                format!("{:>w$}", cell, w = w)
            })
            .collect();
        lines.push(format!("{:>3} {}", row, cells.join(" ")));
    }

    lines.join("\n")
}
