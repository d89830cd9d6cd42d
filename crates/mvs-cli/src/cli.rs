use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "MVS CLI - Interpret MolViewSpec scene trees and inspect the scene they build.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the scene described by an MVS document and print it.
    Compile(CompileArgs),
    /// Check an MVS document against the node placement rules.
    Validate(ValidateArgs),
    /// List the distinct annotation sources an MVS document references.
    Annotations(AnnotationsArgs),
}

/// How `compile` presents the built scene.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Full JSON report: actions, diagnostics, annotations, settings and cells.
    #[default]
    Scene,
    /// One line per cell, indented by depth.
    Summary,
}

/// Arguments for the `compile` subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    // --- Core Arguments ---
    /// Path to the MVS document (.mvsj).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the report here instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Load Overrides ---
    /// Address of the document, used to resolve relative download URLs.
    #[arg(long, value_name = "URL")]
    pub source_url: Option<String>,

    /// Color of representations without color nodes (name, #rgb or #rrggbb).
    #[arg(long, value_name = "COLOR")]
    pub default_color: Option<String>,

    /// Fail when a node sits under a parent kind the format does not allow.
    #[arg(long)]
    pub strict: bool,

    /// Ignore focus and camera nodes.
    #[arg(long)]
    pub keep_camera: bool,

    // --- Output Overrides ---
    /// Report format.
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Print JSON on a single line.
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the MVS document (.mvsj).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Exit with an error when any issue is found.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `annotations` subcommand.
#[derive(Args, Debug)]
pub struct AnnotationsArgs {
    /// Path to the MVS document (.mvsj).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the list here instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
