//! Checks derived from schema keywords, and a small set of stock validators
//! hosts can register by id.
//!
//! Each node's own keywords (`type`, `minLength`, `maxLength`, `minimum`,
//! `maximum`, `enum`, `format`) are compiled once into a JSON Schema
//! validator. Presence (`required`) is decided by the parent and checked here
//! with [`has_value`], since an empty container counts as absent.

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::OnceLock;

use crate::domain::{
    FormError, FormResult, LengthBound, PropertyPath, SchemaNode, SharedValidator, ValidationError,
};

/// Whether a value counts as filled in: not `null`, not `{}`, not `[]`.
pub fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// The keyword subset of `schema` that constrains the node's own value.
///
/// Length hints that are not whole numbers stay display-only.
pub fn keyword_schema(schema: &SchemaNode) -> Value {
    let mut keywords = Map::new();
    keywords.insert("type".to_string(), json!(schema.schema_type().as_str()));
    if let Some(min) = schema.min_length.as_ref().and_then(LengthBound::limit) {
        keywords.insert("minLength".to_string(), json!(min));
    }
    if let Some(max) = schema.max_length.as_ref().and_then(LengthBound::limit) {
        keywords.insert("maxLength".to_string(), json!(max));
    }
    if let Some(min) = schema.minimum {
        keywords.insert("minimum".to_string(), json!(min));
    }
    if let Some(max) = schema.maximum {
        keywords.insert("maximum".to_string(), json!(max));
    }
    if !schema.enum_values.is_empty() {
        keywords.insert("enum".to_string(), Value::Array(schema.enum_values.clone()));
    }
    if let Some(format) = &schema.format {
        keywords.insert("format".to_string(), json!(format));
    }
    Value::Object(keywords)
}

fn compile(keywords: &Value) -> Result<Validator, jsonschema::ValidationError<'static>> {
    jsonschema::options()
        .should_validate_formats(true)
        .build(keywords)
}

/// Compiled keyword checks for one schema node.
pub struct Keywords {
    validator: Validator,
}

impl Keywords {
    pub fn compile(schema: &SchemaNode, path: &PropertyPath) -> FormResult<Self> {
        let validator = compile(&keyword_schema(schema)).map_err(|e| FormError::Schema {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { validator })
    }

    /// Errors for the value at `path`.
    ///
    /// An absent value only fails `required`. A type mismatch hides the
    /// other keyword failures.
    pub fn check(&self, value: &Value, path: &PropertyPath, required: bool) -> Vec<ValidationError> {
        if !has_value(value) {
            return if required {
                vec![ValidationError::new("REQUIRED", "Value is required").at(path.to_string())]
            } else {
                Vec::new()
            };
        }

        let mut errors: Vec<ValidationError> = self
            .validator
            .iter_errors(value)
            .map(|error| {
                let at = path.join(&PropertyPath::from_pointer(&error.instance_path.to_string()));
                ValidationError::new(error_code(&error.kind), error.to_string()).at(at.to_string())
            })
            .collect();
        if errors.iter().any(|e| e.code == "INVALID_TYPE") {
            errors.retain(|e| e.code == "INVALID_TYPE");
        }
        errors
    }
}

fn error_code(kind: &ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::Type { .. } => "INVALID_TYPE",
        ValidationErrorKind::MinLength { .. } => "MIN_LENGTH",
        ValidationErrorKind::MaxLength { .. } => "MAX_LENGTH",
        ValidationErrorKind::Minimum { .. } => "MINIMUM",
        ValidationErrorKind::Maximum { .. } => "MAXIMUM",
        ValidationErrorKind::Enum { .. } => "ENUM_MISMATCH",
        ValidationErrorKind::Format { .. } => "INVALID_FORMAT",
        _ => "INVALID",
    }
}

/// Stock validators keyed by the id a schema uses to reference them.
pub fn builtin_validators() -> BTreeMap<String, SharedValidator> {
    let mut validators: BTreeMap<String, SharedValidator> = BTreeMap::new();
    validators.insert("required".to_string(), Rc::new(required));
    validators.insert("email".to_string(), Rc::new(email));
    validators.insert("trimmed".to_string(), Rc::new(trimmed));
    validators
}

/// Fails on null, blank strings and empty containers.
pub fn required(value: &Value, _path: &PropertyPath) -> Option<ValidationError> {
    let blank = value.as_str().is_some_and(|s| s.trim().is_empty());
    (blank || !has_value(value)).then(|| ValidationError::new("REQUIRED", "Value is required"))
}

fn email_format() -> Option<&'static Validator> {
    static EMAIL: OnceLock<Option<Validator>> = OnceLock::new();
    EMAIL
        .get_or_init(|| compile(&json!({ "type": "string", "format": "email" })).ok())
        .as_ref()
}

/// Checks non-empty strings against the `email` format.
pub fn email(value: &Value, _path: &PropertyPath) -> Option<ValidationError> {
    let s = value.as_str().filter(|s| !s.is_empty())?;
    let valid = email_format()?.is_valid(value);
    (!valid).then(|| ValidationError::new("INVALID_EMAIL", format!("'{}' is not an email address", s)))
}

pub fn trimmed(value: &Value, _path: &PropertyPath) -> Option<ValidationError> {
    let s = value.as_str()?;
    (s.trim() != s).then(|| ValidationError::new("UNTRIMMED", "Leading or trailing whitespace"))
}
