use crate::cli::{CompileArgs, OutputFormat};
use crate::error::{CliError, Result};
use molviewspec::core::color::Color;
use molviewspec::engine::config::{LoadOptions, LoadOptionsBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialLoadConfig {
    replace_existing: Option<bool>,
    keep_camera: Option<bool>,
    source_url: Option<String>,
    default_color: Option<String>,
    strict_validation: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    format: Option<OutputFormat>,
    pretty: Option<bool>,
}

/// The `compile` settings a TOML file may provide.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialCompileConfig {
    load: Option<PartialLoadConfig>,
    output: Option<PartialOutputConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub load: LoadOptions,
    pub output: OutputConfig,
}

impl PartialCompileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Combines file values with command-line overrides; the command line wins.
    pub fn merge_with_cli(self, args: &CompileArgs) -> Result<AppConfig> {
        let load = self.load.unwrap_or_default();
        let output = self.output.unwrap_or_default();

        let mut builder = LoadOptionsBuilder::new()
            .replace_existing(load.replace_existing.unwrap_or(false))
            .keep_camera(args.keep_camera || load.keep_camera.unwrap_or(false))
            .strict_validation(args.strict || load.strict_validation.unwrap_or(false));

        if let Some(url) = args.source_url.as_ref().or(load.source_url.as_ref()) {
            builder = builder.source_url(url.clone());
        }
        if let Some(color) = args.default_color.as_ref().or(load.default_color.as_ref()) {
            let color = color
                .parse::<Color>()
                .map_err(|e| CliError::Config(e.to_string()))?;
            builder = builder.default_color(color);
        }

        let load = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let output = OutputConfig {
            format: args.format.or(output.format).unwrap_or_default(),
            pretty: !args.compact && output.pretty.unwrap_or(true),
        };

        Ok(AppConfig { load, output })
    }
}
