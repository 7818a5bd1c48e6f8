//! Schema nodes describing form fields.
//!
//! A schema is supplied in-process as a structured value. The wire shape uses
//! camelCase keys, for example:
//!
//! ```json
//! {
//!   "modelName": "m",
//!   "properties": {
//!     "name": { "type": "string", "widget": { "id": "string" }, "minLength": 2 }
//!   }
//! }
//! ```
//!
//! `properties` keep their document order; field order on screen follows it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Model object name used when no ancestor names one.
pub const DEFAULT_MODEL_NAME: &str = "model";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Widget descriptor. Accepts either `"textarea"` or `{ "id": "textarea" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WidgetRepr")]
pub struct WidgetInfo {
    pub id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WidgetRepr {
    Id(String),
    Info {
        #[serde(default)]
        id: String,
    },
}

impl From<WidgetRepr> for WidgetInfo {
    fn from(repr: WidgetRepr) -> Self {
        match repr {
            WidgetRepr::Id(id) | WidgetRepr::Info { id } => WidgetInfo { id },
        }
    }
}

impl WidgetInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A `minLength`/`maxLength` hint.
///
/// Hand-written schemas carry these as numbers or as strings, and a blank
/// string still counts as a present attribute. Only a whole, non-negative
/// number is enforced as a length; anything else is rendered as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthBound {
    Count(u64),
    Number(f64),
    Text(String),
}

impl LengthBound {
    /// Length to enforce, if the hint is a usable number.
    pub fn limit(&self) -> Option<u64> {
        match self {
            LengthBound::Count(n) => Some(*n),
            LengthBound::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64 => {
                Some(*n as u64)
            }
            LengthBound::Number(_) | LengthBound::Text(_) => None,
        }
    }
}

impl fmt::Display for LengthBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthBound::Count(n) => write!(f, "{}", n),
            LengthBound::Number(n) => write!(f, "{}", n),
            LengthBound::Text(s) => f.write_str(s),
        }
    }
}

/// Button bound to an action id, rendered by object widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(
        default,
        with = "ordered_properties",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub properties: Vec<(String, SchemaNode)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<LengthBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<LengthBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Value format checked on strings, e.g. `email`, `uri`, `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub debug: bool,
    /// Ids of validators looked up in the validator registry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ButtonSpec>,
}

impl SchemaNode {
    /// Parse a schema from a JSON value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn object() -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            ..Default::default()
        }
    }

    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// Builder-style property insertion, keeping insertion order.
    pub fn with_property(mut self, name: &str, node: SchemaNode) -> Self {
        self.properties.push((name.to_string(), node));
        self
    }

    pub fn with_widget(mut self, id: &str) -> Self {
        self.widget = Some(WidgetInfo::new(id));
        self
    }

    /// Declared type, inferred from shape when absent.
    pub fn schema_type(&self) -> SchemaType {
        match self.schema_type {
            Some(t) => t,
            None if self.items.is_some() => SchemaType::Array,
            None if !self.properties.is_empty() => SchemaType::Object,
            None => SchemaType::String,
        }
    }

    /// Widget id used for registry lookup; falls back to the type name.
    pub fn widget_id(&self) -> &str {
        match &self.widget {
            Some(w) if !w.id.is_empty() => &w.id,
            _ => self.schema_type().as_str(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }

    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Label text: title, then name, then empty.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

/// (De)serializes `properties` as a JSON object while keeping key order.
mod ordered_properties {
    use super::SchemaNode;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(props: &[(String, SchemaNode)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(props.len()))?;
        for (key, node) in props {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, SchemaNode)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Vec<(String, SchemaNode)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property name to schema")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut props = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, node)) = access.next_entry::<String, SchemaNode>()? {
                    props.push((key, node));
                }
                Ok(props)
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_property_order() {
        let schema = SchemaNode::from_value(json!({
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "integer" },
                "mid": { "type": "boolean" }
            }
        }))
        .unwrap();

        let keys: Vec<&str> = schema.properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(schema.schema_type(), SchemaType::Object);
        assert_eq!(schema.schema_type, None);
    }

    #[test]
    fn test_widget_accepts_string_or_object() {
        let schema = SchemaNode::from_value(json!({
            "properties": {
                "a": { "type": "string", "widget": "textarea" },
                "b": { "type": "string", "widget": { "id": "color" } },
                "c": { "type": "integer" }
            }
        }))
        .unwrap();

        assert_eq!(schema.property("a").unwrap().widget_id(), "textarea");
        assert_eq!(schema.property("b").unwrap().widget_id(), "color");
        assert_eq!(schema.property("c").unwrap().widget_id(), "integer");
    }

    #[test]
    fn test_length_bounds_number_or_string() {
        let schema = SchemaNode::from_value(json!({
            "type": "string",
            "minLength": 0,
            "maxLength": ""
        }))
        .unwrap();

        assert_eq!(schema.min_length, Some(LengthBound::Count(0)));
        assert_eq!(schema.max_length, Some(LengthBound::Text(String::new())));
        assert_eq!(schema.max_length.as_ref().unwrap().limit(), None);
        assert_eq!(LengthBound::Text("12".into()).limit(), None);
    }

    #[test]
    fn test_fractional_and_negative_lengths_parse() {
        let schema = SchemaNode::from_value(json!({
            "type": "string",
            "minLength": -1,
            "maxLength": 5.0
        }))
        .unwrap();

        assert_eq!(schema.min_length, Some(LengthBound::Number(-1.0)));
        assert_eq!(schema.min_length.as_ref().unwrap().limit(), None);
        assert_eq!(schema.max_length.as_ref().unwrap().limit(), Some(5));
        assert_eq!(schema.max_length.as_ref().unwrap().to_string(), "5");
        assert_eq!(LengthBound::Number(2.5).limit(), None);
    }

    #[test]
    fn test_camel_case_fields() {
        let schema = SchemaNode::from_value(json!({
            "modelName": "m",
            "readOnly": true,
            "formId": "field3",
            "enum": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(schema.model_name(), "m");
        assert!(schema.read_only);
        assert_eq!(schema.form_id.as_deref(), Some("field3"));
        assert_eq!(schema.enum_values.len(), 2);
        assert_eq!(SchemaNode::default().model_name(), DEFAULT_MODEL_NAME);
    }

    #[test]
    fn test_serialize_round_trips_properties() {
        let schema = SchemaNode::object()
            .with_property("b", SchemaNode::of_type(SchemaType::String))
            .with_property("a", SchemaNode::of_type(SchemaType::Number));
        let value = serde_json::to_value(&schema).unwrap();
        let keys: Vec<&String> = value["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
