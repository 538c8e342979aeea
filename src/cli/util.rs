//! CLI utility helpers

use fdnorm::{Config, Error, OutputFormat, Result, Scheme};
use std::fs;
use std::path::{Path, PathBuf};

/// Value following `flag` (or its short form), if present
pub fn flag_value<'a>(args: &'a [String], flag: &str, short: Option<&str>) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag || Some(arg.as_str()) == short)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

/// Arguments that are neither flags nor flag values
pub fn positional(args: &[String]) -> Vec<&str> {
    const WITH_VALUE: [&str; 5] = ["--nf", "--output", "-o", "--config", "-c"];

    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
        } else if WITH_VALUE.contains(&arg.as_str()) {
            skip = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

/// Parse --output argument to determine output file path
pub fn parse_output_arg(args: &[String]) -> Option<PathBuf> {
    flag_value(args, "--output", Some("-o")).map(PathBuf::from)
}

/// `--config <file>` if given, else `fdnorm.yaml` in the working directory
pub fn load_config(args: &[String]) -> Result<Config> {
    let explicit = flag_value(args, "--config", Some("-c")).map(Path::new);
    Config::discover(explicit)
}

/// Read a scheme, as JSON for `.json` files and YAML otherwise
pub fn load_scheme(path: &str) -> Result<Scheme> {
    let content = fs::read_to_string(path).map_err(Error::Io)?;
    if Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        Scheme::from_json(&content)
    } else {
        Scheme::from_yaml(&content)
    }
}

/// Serialize a scheme in the requested format
pub fn render_scheme(scheme: &Scheme, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => scheme.to_yaml(),
        OutputFormat::Json => scheme.to_json(),
    }
}

/// Write content to file or stdout
pub fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
