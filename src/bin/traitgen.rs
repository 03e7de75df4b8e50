//! Traitgen CLI
//!
//! Generates trait and specification views from one or more package
//! descriptions.
//!
//! Exit codes: 0 success, 1 generation error, 2 usage error, 3 configuration
//! error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use traitgen::{
    generate, generator_for, load_package, GenerateOptions, TraitgenConfig, TraitgenError,
};

const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIGURATION: i32 = 3;

#[derive(Parser)]
#[command(name = "traitgen", version)]
#[command(about = "Generate trait and specification views from package descriptions")]
struct Cli {
    /// Package descriptions (YAML), generated in order. Each one's traits
    /// are visible to the descriptions after it.
    #[arg(required = true, value_name = "DESCRIPTION")]
    descriptions: Vec<PathBuf>,

    /// Root directory for generated code
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Generator to use (cpp, python)
    #[arg(short, long)]
    generator: Option<String>,

    /// Validate and log the package structure without generating
    #[arg(short, long)]
    dry_run: bool,

    /// Print each created file and directory
    #[arg(short, long)]
    verbose: bool,

    /// Log filter (e.g. warn, info, debug), RUST_LOG takes precedence
    #[arg(short, long)]
    log_level: Option<String>,

    /// Copyright owner written to generated file headers
    #[arg(long)]
    copyright_owner: Option<String>,

    /// Copyright date (defaults to the current year)
    #[arg(long)]
    copyright_date: Option<String>,

    /// SPDX license identifier (defaults to Apache-2.0)
    #[arg(long)]
    spdx_license_identifier: Option<String>,

    /// Description loaded only so its traits can be referenced
    #[arg(long = "with", value_name = "DESCRIPTION")]
    with: Vec<PathBuf>,

    /// Additional config file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let config = match TraitgenConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIGURATION);
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, config) {
        eprintln!("Error: {:#}", e);
        let is_configuration = e
            .downcast_ref::<TraitgenError>()
            .map_or(false, TraitgenError::is_configuration);
        std::process::exit(if is_configuration {
            EXIT_CONFIGURATION
        } else {
            EXIT_FAILURE
        });
    }
}

fn run(cli: Cli, config: TraitgenConfig) -> Result<()> {
    let dry_run = cli.dry_run || config.generation.dry_run;
    let generator = cli
        .generator
        .or(config.generation.generator)
        .unwrap_or_default();
    let output_dir = cli.output_dir.or(config.generation.output_dir);

    // Fail on bad arguments before doing any work
    if !dry_run {
        generator_for(&generator)?;
        if output_dir.is_none() {
            return Err(
                TraitgenError::Configuration("No output directory specified".to_string()).into(),
            );
        }
    }

    let mut template_globals = config.globals.template_globals();
    let flags = [
        ("copyrightOwner", cli.copyright_owner),
        ("copyrightDate", cli.copyright_date),
        ("spdxLicenseIdentifier", cli.spdx_license_identifier),
    ];
    for (key, value) in flags {
        if let Some(value) = value {
            template_globals.insert(key.to_string(), Value::String(value));
        }
    }

    let mut known_packages = Vec::new();
    for path in cli.with.iter().chain(config.generation.with.iter()) {
        let package = load_package(path, &known_packages)
            .with_context(|| format!("Failed to load context description '{}'", path.display()))?;
        debug!(package = package.id.as_str(), "Loaded context package");
        known_packages.push(package);
    }

    let verbose = cli.verbose;
    let mut report = |path: &Path| {
        if verbose {
            println!("{}", path.display());
        }
    };

    for path in &cli.descriptions {
        let options = GenerateOptions {
            description_path: path.clone(),
            output_dir: output_dir.clone().unwrap_or_default(),
            generator: generator.clone(),
            dry_run,
            template_globals: template_globals.clone(),
        };
        let package = generate(&options, &known_packages, &mut report)
            .with_context(|| format!("Failed to generate '{}'", path.display()))?;
        known_packages.push(package);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "traitgen", "-g", "python", "-o", "out", "-d", "-v", "--with", "ctx.yaml", "a.yaml",
            "b.yaml",
        ])
        .unwrap();
        assert_eq!(cli.generator.as_deref(), Some("python"));
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.with, vec![PathBuf::from("ctx.yaml")]);
        assert_eq!(cli.descriptions.len(), 2);
    }

    #[test]
    fn test_description_is_required() {
        assert!(Cli::try_parse_from(["traitgen", "-g", "cpp"]).is_err());
    }
}
