use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::builder::{FormBuilder, FormChanges};
use crate::config::FormSettings;
use crate::domain::{PropertyPath, SchemaNode, ValidationError};
use crate::model::constraints::builtin_validators;

/// Schema Forms - build a form from a JSON schema and render it
#[derive(Parser, Debug, Clone)]
#[command(name = "schema-forms", version, about, long_about = None)]
pub struct Cli {
    /// Path to the form schema (JSON)
    #[arg(short, long, env = "SCHEMA_FORMS_SCHEMA")]
    pub schema: PathBuf,

    /// Path to the initial model (JSON)
    #[arg(short, long, env = "SCHEMA_FORMS_MODEL")]
    pub model: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(short, long, env = "SCHEMA_FORMS_CONFIG", default_value = "schema-forms.toml")]
    pub config: PathBuf,

    /// Field edit applied through the live form, as `path=json` (repeatable)
    #[arg(long = "set", value_name = "PATH=JSON", value_parser = parse_edit)]
    pub edits: Vec<FieldEdit>,

    /// Reset the form to schema defaults after the edits
    #[arg(long)]
    pub reset: bool,

    /// Prefix of generated field ids
    #[arg(long, env = "SCHEMA_FORMS_ID_PREFIX")]
    pub id_prefix: Option<String>,

    /// Model name for schemas that name none
    #[arg(long, env = "SCHEMA_FORMS_DEFAULT_MODEL_NAME")]
    pub model_name: Option<String>,

    /// Log synthesized templates at info level
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub log_templates: Option<bool>,
}

/// One `--set` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub path: PropertyPath,
    pub value: Value,
}

/// Parse `path=json`. A value that is not JSON is taken as a plain string.
pub fn parse_edit(raw: &str) -> Result<FieldEdit, String> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=JSON, got '{}'", raw))?;
    if path.trim().is_empty() {
        return Err(format!("empty path in '{}'", raw));
    }
    let path = PropertyPath::parse(path).map_err(|e| e.to_string())?;
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok(FieldEdit { path, value })
}

/// What the binary prints.
#[derive(Debug, Serialize)]
pub struct FormReport {
    pub markup: String,
    pub value: Value,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Build the form described by `cli`, apply its edits and report the result.
pub fn run(cli: &Cli, settings: &FormSettings) -> anyhow::Result<FormReport> {
    let schema: SchemaNode = read_json(&cli.schema)
        .and_then(|value| SchemaNode::from_value(value).map_err(Into::into))
        .with_context(|| format!("Failed to load schema {}", cli.schema.display()))?;

    let mut changes = FormChanges::new()
        .validators(builtin_validators())
        .schema(schema);
    if let Some(path) = &cli.model {
        let model = read_json(path)
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        changes = changes.model(model);
    }

    let mut form = FormBuilder::from_settings(settings);
    form.apply(changes)?;

    if !cli.edits.is_empty() {
        let view = form
            .instance()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("form has no mounted view"))?;
        for edit in &cli.edits {
            if !view.input(&edit.path, edit.value.clone()) {
                warn!(path = %edit.path, "edit ignored, no such field");
            }
        }
        // array edits add fields the current view does not have
        form.rebuild_view()?;
    }
    if cli.reset {
        form.reset()?;
    }

    let root = form
        .root_property()
        .ok_or_else(|| anyhow::anyhow!("form has no root property"))?;
    let view = form
        .instance()
        .ok_or_else(|| anyhow::anyhow!("form has no mounted view"))?;
    let report = FormReport {
        markup: view.render(),
        value: root.value(),
        valid: root.is_valid(),
        errors: root.errors(),
    };
    info!(valid = report.valid, errors = report.errors.len(), "form built");
    Ok(report)
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
