use std::path::{Path, PathBuf};

mod terminal;

use anyhow::Context;
use clap::ArgAction;
use sammgen::{Config, Report, Site, storage::load_templates};
use terminal::Palette;
use tracing::instrument;

/// Configuration file read when `--config` is not given.
const DEFAULT_CONFIG: &str = "sammgen.toml";

#[derive(Debug, clap::Parser)]
#[command(
    version,
    about = "Generate markdown pages for the SAMM website from the model's YAML files"
)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Directory containing the model's YAML files
    #[arg(short, long)]
    input: PathBuf,

    /// Directory to write the markdown pages to
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file [default: sammgen.toml, if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of template overrides (`<template>.md`)
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Fail without writing anything if any reference is unresolved or any
    /// pages share a path
    #[arg(long)]
    strict: bool,

    /// Summary format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = self.load_config()?;
        let templates_dir = self.templates.clone().or(config.templates);
        let strict = self.strict || config.strict;

        self.build(templates_dir.as_deref(), strict)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // stdout carries the summary
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        load_config(self.config.as_deref(), Path::new(DEFAULT_CONFIG))
    }

    #[instrument(skip(self))]
    fn build(&self, templates_dir: Option<&Path>, strict: bool) -> anyhow::Result<()> {
        let templates = load_templates(templates_dir).context("failed to load templates")?;

        let site = Site::new(self.input.clone())
            .load()
            .with_context(|| format!("failed to load model from {}", self.input.display()))?;

        let report = site
            .publish(&self.output, &templates, strict)
            .with_context(|| format!("failed to publish to {}", self.output.display()))?;

        match self.format {
            OutputFormat::Table => output_table(&report, &self.output),
            OutputFormat::Json => output_json(&report)?,
        }

        Ok(())
    }
}

/// Load the `explicit` config file, or `default` if it exists.
///
/// A file that exists must parse. Only a missing `default` falls back to the
/// built-in configuration.
fn load_config(explicit: Option<&Path>, default: &Path) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(path) => path,
        None if default.exists() => default,
        None => {
            tracing::debug!("No {}, using the default config", default.display());
            return Ok(Config::default());
        }
    };
    Config::load(path).with_context(|| format!("failed to load config from {}", path.display()))
}

fn output_table(report: &Report, output: &Path) {
    let palette = Palette::detect();

    for (kind, count) in &report.written {
        println!("{}", palette.ok(&format!("✓ {count} {kind}")));
    }
    println!(
        "  {} pages written to {}",
        report.total(),
        palette.path(&output.display().to_string())
    );

    if report.has_issues() {
        println!();
        println!(
            "{}",
            palette.issue(&format!("✗ {} problems found:", report.issues.len()))
        );
        for (path, issue) in &report.issues {
            println!("  {}: {issue}", palette.path(&path.display().to_string()));
        }
    }
}

fn output_json(report: &Report) -> anyhow::Result<()> {
    use serde_json::json;

    let written: serde_json::Map<_, _> = report
        .written
        .iter()
        .map(|(kind, count)| (kind.to_string(), json!(count)))
        .collect();

    let issues: Vec<_> = report
        .issues
        .iter()
        .map(|(path, issue)| {
            json!({
                "document": path,
                "issue": issue.to_string(),
            })
        })
        .collect();

    let output = json!({
        "status": if report.has_issues() { "issues_found" } else { "ok" },
        "written": written,
        "total": report.total(),
        "issues": issues,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn input_and_output_are_required() {
        assert!(Cli::try_parse_from(["sammgen"]).is_err());
        assert!(Cli::try_parse_from(["sammgen", "-i", "model"]).is_err());
        assert!(Cli::try_parse_from(["sammgen", "-o", "site"]).is_err());
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "sammgen",
            "--input",
            "model",
            "--output",
            "site",
            "--templates",
            "tpl",
            "--strict",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("model"));
        assert_eq!(cli.output, PathBuf::from("site"));
        assert_eq!(cli.templates, Some(PathBuf::from("tpl")));
        assert!(cli.strict);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn missing_default_config_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();

        let config = load_config(None, &tmp.path().join(DEFAULT_CONFIG)).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn present_default_config_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        let default = tmp.path().join(DEFAULT_CONFIG);
        std::fs::write(&default, "_version = \"1\"\nstrict = true\n").unwrap();

        let config = load_config(None, &default).unwrap();

        assert!(config.strict);
    }

    #[test]
    fn malformed_default_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let default = tmp.path().join(DEFAULT_CONFIG);
        std::fs::write(&default, "_version = \"1\"\nstrict = \"yes\"\n").unwrap();

        let error = load_config(None, &default).unwrap_err();

        assert!(error.to_string().contains(DEFAULT_CONFIG));
    }

    #[test]
    fn explicit_config_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let missing = tmp.path().join("missing.toml");
        let cli = Cli::try_parse_from([
            "sammgen",
            "-i",
            dir,
            "-o",
            dir,
            "-c",
            missing.to_str().unwrap(),
        ])
        .unwrap();

        assert!(cli.load_config().is_err());
    }
}
