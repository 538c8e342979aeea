//! Normalization and validation CLI commands

use super::util::{
    flag_value, has_flag, load_config, load_scheme, parse_output_arg, positional, render_scheme,
    write_output,
};
use fdnorm::*;

pub fn cmd_normalize(args: &[String]) -> Result<()> {
    let paths = positional(args);
    let Some(scheme_path) = paths.first() else {
        return Err(
            "Usage: fdnorm normalize <scheme.yaml> [--nf 2|3] [--json] [--report] [--output <file>] [--config <file>]"
                .into(),
        );
    };

    let config = load_config(args)?;
    let normal_form = match flag_value(args, "--nf", None) {
        Some(nf) => nf.parse::<NormalForm>()?,
        None => config.normalize.normal_form,
    };
    let format = if has_flag(args, "--json") {
        OutputFormat::Json
    } else {
        config.output
    };

    let scheme = load_scheme(scheme_path)?;
    let report = Normalizer::new(&scheme)
        .with_config(&config.normalize)
        .normalize(normal_form);

    if !report.is_ok() {
        if format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&report.violations)?);
        } else {
            eprint!("{}", report.to_report());
        }
        return Err(format!("{} violation(s)", report.violations.len()).into());
    }

    if has_flag(args, "--report") {
        eprint!("{}", report.to_report());
    }

    if let Some(normalized) = &report.scheme {
        let content = render_scheme(normalized, format)?;
        write_output(&parse_output_arg(args), &content)?;
    }

    Ok(())
}

pub fn cmd_validate(args: &[String]) -> Result<()> {
    let paths = positional(args);
    let Some(scheme_path) = paths.first() else {
        return Err("Usage: fdnorm validate <scheme.yaml> [--json]".into());
    };

    let scheme = load_scheme(scheme_path)?;
    let violations = validate_scheme(&scheme);

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&violations)?);
    } else if violations.is_empty() {
        println!("✓ {}: valid (no violations found)", scheme_path);
    } else {
        println!("✗ {}: {} violation(s)\n", scheme_path, violations.len());
        for violation in &violations {
            println!("  [{:?}] {}", violation.kind, violation);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err("Validation failed".into())
    }
}
