use schema_forms::builder::{FormBuilder, FormChanges};
use schema_forms::config::FormSettings;
use schema_forms::domain::SchemaNode;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_settings_drive_ids_and_model_name() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("schema-forms.toml");
    fs::write(
        &path,
        r#"
id_prefix = "ctl"
default_model_name = "data"
"#,
    )?;
    let settings = FormSettings::load(Some(path.as_path()))?;

    let mut form = FormBuilder::from_settings(&settings);
    let schema = SchemaNode::from_value(json!({
        "properties": { "name": { "type": "string" } }
    }))?;
    form.apply(FormChanges::new().schema(schema))?;

    let schema = form.schema().expect("schema bound");
    assert!(schema.form_id.as_deref().unwrap_or_default().starts_with("ctl"));
    assert_eq!(schema.model_name(), "data");

    let view = form.instance().expect("view mounted");
    assert_eq!(view.bindings()[0].model_path, "data.name");
    Ok(())
}

#[test]
fn test_environment_overrides_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("schema-forms.toml");
    fs::write(&path, "log_templates = false\n")?;

    std::env::set_var("SCHEMA_FORMS_LOG_TEMPLATES", "true");
    let settings = FormSettings::load(Some(path.as_path()));
    std::env::remove_var("SCHEMA_FORMS_LOG_TEMPLATES");

    assert!(settings?.log_templates);
    Ok(())
}
