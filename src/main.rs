//! fdnorm CLI - Command-line interface
//!
//! Commands:
//!   normalize - Decompose a scheme into second normal form
//!   validate  - Check a scheme for violations
//!   matrix    - Show the dependency matrix of one entity, phase by phase
//!   closure   - Compute an attribute closure
//!   schema    - Print JSON schema of the input formats

mod cli;

use fdnorm::{Result, VERSION};
use std::process::ExitCode;
use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    init_tracing(args.iter().any(|a| a == "--verbose"));

    let result: Result<()> = match args[1].as_str() {
        "normalize" => cli::cmd_normalize(&args[2..]),
        "validate" => cli::cmd_validate(&args[2..]),
        "matrix" => cli::cmd_matrix(&args[2..]),
        "closure" => cli::cmd_closure(&args[2..]),
        "schema" => cli::cmd_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("fdnorm {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Reads `FDNORM_LOG` for per-module levels, e.g. `FDNORM_LOG=fdnorm::matrix=trace`.
///
/// Falls back to `fdnorm=warn`, or `fdnorm=debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose { "fdnorm=debug" } else { "fdnorm=warn" };
        let filter =
            EnvFilter::try_from_env("FDNORM_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn print_usage() {
    println!(
        r#"
fdnorm - Functional-dependency normalization

USAGE:
    fdnorm <COMMAND> [OPTIONS]

COMMANDS:
    normalize <scheme.yaml|json>           Decompose every entity into 2NF
    validate <scheme.yaml|json>            Check a scheme for violations
    matrix <scheme> <entity>               Show the dependency matrix phase by phase
    closure <scheme> <entity> <attr>...    Compute the closure of attributes
    schema [scheme|config|violation]       Print JSON schema for an input format
    version                                Print version

OPTIONS:
    --nf <2|3>                        Target normal form (default: from config, 2)
    --json                            JSON output format
    --report                          Print a decomposition summary to stderr (normalize)
    --output <file>                   Output file (default: stdout)
    --config <file>                   Config file (default: ./fdnorm.yaml)
    --verbose                         Log each normalization phase to stderr

EXAMPLES:
    fdnorm normalize shop.yaml --report
    fdnorm normalize shop.json --json --output shop.2nf.json
    fdnorm matrix shop.yaml order_line
    fdnorm closure shop.yaml order_line order_id
"#
    );
}
