use crate::core::color::Color;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// Per-run options for loading a tree into a host.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Remove everything under the host anchor before adding the new content.
    pub replace_existing: bool,
    /// Leave the camera where it is, ignoring focus and camera nodes.
    pub keep_camera: bool,
    /// Address of the document, used to resolve relative download URLs.
    pub source_url: Option<String>,
    /// Color of representations without color children.
    pub default_color: Color,
    /// Fail the run when the tree breaks the parent-kind rules.
    pub strict_validation: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            replace_existing: false,
            keep_camera: false,
            source_url: None,
            default_color: Color::DEFAULT,
            strict_validation: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadOptionsBuilder {
    replace_existing: Option<bool>,
    keep_camera: Option<bool>,
    source_url: Option<String>,
    default_color: Option<Color>,
    strict_validation: Option<bool>,
}

impl LoadOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = Some(replace);
        self
    }

    pub fn keep_camera(mut self, keep: bool) -> Self {
        self.keep_camera = Some(keep);
        self
    }

    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn default_color(mut self, color: Color) -> Self {
        self.default_color = Some(color);
        self
    }

    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = Some(strict);
        self
    }

    pub fn build(self) -> Result<LoadOptions, ConfigError> {
        let defaults = LoadOptions::default();
        if let Some(url) = &self.source_url {
            let address = url.split(['?', '#']).next().unwrap_or(url);
            if !address.contains("://") {
                return Err(ConfigError::InvalidParameter {
                    parameter: "source_url",
                    reason: format!("'{url}' is not an absolute URL"),
                });
            }
        }
        Ok(LoadOptions {
            replace_existing: self.replace_existing.unwrap_or(defaults.replace_existing),
            keep_camera: self.keep_camera.unwrap_or(defaults.keep_camera),
            source_url: self.source_url,
            default_color: self.default_color.unwrap_or(defaults.default_color),
            strict_validation: self.strict_validation.unwrap_or(defaults.strict_validation),
        })
    }
}
