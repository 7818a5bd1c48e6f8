use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Cli;
use crate::domain::DEFAULT_MODEL_NAME;
use crate::model::ids::DEFAULT_ID_PREFIX;

/// Prefix of environment overrides, e.g. `SCHEMA_FORMS_ID_PREFIX`.
pub const ENV_PREFIX: &str = "SCHEMA_FORMS";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FormSettings {
    /// Prefix of generated field ids (`field7`)
    pub id_prefix: String,
    /// Model object name for schemas that name none
    pub default_model_name: String,
    /// Log synthesized templates at info level instead of debug
    #[serde(default)]
    pub log_templates: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            default_model_name: DEFAULT_MODEL_NAME.to_string(),
            log_templates: false,
        }
    }
}

impl FormSettings {
    /// Defaults plus environment overrides.
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::load(None)
    }

    /// Settings from an optional config file, then environment variables.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let mut builder = Config::builder()
            .set_default("id_prefix", DEFAULT_ID_PREFIX)?
            .set_default("default_model_name", DEFAULT_MODEL_NAME)?
            .set_default("log_templates", false)?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let s = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let settings: FormSettings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Create settings from CLI arguments (config file, env, then CLI flags)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(Some(cli.config.as_path()))?;
        settings.apply_cli_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(prefix) = &cli.id_prefix {
            self.id_prefix = prefix.clone();
        }
        if let Some(name) = &cli.model_name {
            self.default_model_name = name.clone();
        }
        if let Some(log) = cli.log_templates {
            self.log_templates = log;
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut errors = Vec::new();
        if self.id_prefix.trim().is_empty() {
            errors.push("id_prefix must not be empty");
        }
        if self.default_model_name.trim().is_empty() {
            errors.push("default_model_name must not be empty");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        }
    }
}
