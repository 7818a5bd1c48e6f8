use super::factory::FormPropertyFactory;
use super::ids::SequentialIdGenerator;
use super::preprocessor::SchemaPreprocessor;
use super::registry::ValidatorRegistry;
use crate::domain::{FormError, PropertyPath, SchemaNode, SharedValidator, ValidationError};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn schema(value: Value) -> SchemaNode {
    let mut schema = SchemaNode::from_value(value).unwrap();
    SchemaPreprocessor::new(&SequentialIdGenerator::default()).preprocess(&mut schema);
    schema
}

fn person() -> SchemaNode {
    schema(json!({
        "modelName": "m",
        "required": ["name"],
        "properties": {
            "name": { "type": "string", "minLength": 2 },
            "age": { "type": "integer", "default": 30 },
            "address": {
                "type": "object",
                "properties": {
                    "city": { "type": "string", "default": "Paris" }
                }
            },
            "tags": { "type": "array", "items": { "type": "string" } }
        }
    }))
}

fn no_validators() -> ValidatorRegistry {
    ValidatorRegistry::new()
}

#[test]
fn test_round_trip_value() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();

    let value = json!({
        "name": "Alice",
        "age": 41,
        "address": { "city": "Lyon" },
        "tags": ["a", "b"]
    });
    root.set_value(value.clone());

    assert_eq!(root.value(), value);
    assert!(root.is_valid());
    assert_eq!(root.children().len(), 4);
}

#[test]
fn test_initial_value_is_empty() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();
    assert_eq!(root.value(), json!({}));
    assert_eq!(root.search_property("address").unwrap().value(), json!({}));
    assert_eq!(root.search_property("tags").unwrap().value(), json!([]));
}

#[test]
fn test_leaf_edit_reaches_root_once() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();
    root.reset(Some(&json!({ "name": "Alice" })), false);

    let events = Rc::new(RefCell::new(Vec::new()));
    let e = Rc::clone(&events);
    let _sub = root.subscribe_value(move |v| e.borrow_mut().push(v.clone()));

    let city = root.get_property(&PropertyPath::parse("address.city").unwrap()).unwrap();
    city.set_value(json!("Nice"));

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["address"]["city"], "Nice");
    assert_eq!(events[0]["name"], "Alice");
}

#[test]
fn test_errors_aggregate_at_root() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();
    root.reset(Some(&json!({ "age": "old" })), false);

    let codes: Vec<(String, String)> = root
        .errors()
        .into_iter()
        .map(|e| (e.path, e.code))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("name".to_string(), "REQUIRED".to_string()),
            ("age".to_string(), "INVALID_TYPE".to_string()),
        ]
    );

    let name = root.search_property("name").unwrap();
    name.set_value(json!("A"));
    assert_eq!(name.errors()[0].code, "MIN_LENGTH");
    assert!(!root.is_valid());
}

#[test]
fn test_reset_with_defaults_notifies_every_leaf() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();

    let notified = Rc::new(Cell::new(0));
    let mut subs = Vec::new();
    for path in ["name", "age", "address.city"] {
        let n = Rc::clone(&notified);
        let leaf = root.get_property(&PropertyPath::parse(path).unwrap()).unwrap();
        subs.push(leaf.subscribe_value(move |_| n.set(n.get() + 1)));
    }

    root.reset(None, true);

    assert_eq!(notified.get(), 3);
    assert_eq!(root.value(), json!({ "age": 30, "address": { "city": "Paris" } }));
}

#[test]
fn test_reset_without_defaults_keeps_model_only() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();

    root.reset(Some(&json!({ "name": "Bob" })), false);

    assert_eq!(root.value(), json!({ "name": "Bob" }));
}

#[test]
fn test_required_object_absent_from_model() {
    let registry = no_validators();
    let schema = schema(json!({
        "required": ["address"],
        "properties": {
            "name": { "type": "string" },
            "address": {
                "type": "object",
                "properties": { "city": { "type": "string" } }
            }
        }
    }));
    let root = FormPropertyFactory::new(&registry)
        .create_property(&schema)
        .unwrap();

    root.reset(Some(&json!({ "name": "Bob" })), false);
    let errors = root.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!((errors[0].path.as_str(), errors[0].code.as_str()), ("address", "REQUIRED"));

    root.reset(Some(&json!({ "name": "Bob", "address": { "city": "Oslo" } })), false);
    assert!(root.is_valid());
}

#[test]
fn test_wrong_shape_for_container_is_reported() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();

    root.reset(Some(&json!({ "name": "Ann", "address": "10 Main St", "tags": "a,b" })), false);

    let codes: Vec<(String, String)> = root
        .errors()
        .into_iter()
        .map(|e| (e.path, e.code))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("address".to_string(), "INVALID_TYPE".to_string()),
            ("tags".to_string(), "INVALID_TYPE".to_string()),
        ]
    );
    assert!(!root.is_valid());
    assert_eq!(root.value(), json!({ "name": "Ann" }));

    let city = root.get_property(&PropertyPath::parse("address.city").unwrap()).unwrap();
    city.set_value(json!("Rome"));
    let tags = root.search_property("tags").unwrap();
    tags.set_value(json!(["a", "b"]));

    assert!(root.is_valid());
    assert_eq!(
        root.value(),
        json!({ "name": "Ann", "address": { "city": "Rome" }, "tags": ["a", "b"] })
    );
}

#[test]
fn test_registry_validator_by_id() {
    let mut registry = ValidatorRegistry::new();
    let not_bob: SharedValidator = Rc::new(|value: &Value, _: &PropertyPath| {
        (value == "Bob").then(|| ValidationError::new("NO_BOB", "Bob is not allowed"))
    });
    registry.register("notBob", not_bob);

    let schema = schema(json!({
        "properties": { "name": { "type": "string", "validators": ["notBob"] } }
    }));
    let root = FormPropertyFactory::new(&registry)
        .create_property(&schema)
        .unwrap();

    root.set_value(json!({ "name": "Bob" }));
    let errors = root.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "NO_BOB");
    assert_eq!(errors[0].path, "name");
}

#[test]
fn test_registry_validator_by_pointer() {
    let mut registry = ValidatorRegistry::new();
    let short: SharedValidator = Rc::new(|value: &Value, _: &PropertyPath| {
        value
            .as_str()
            .filter(|s| s.len() > 3)
            .map(|_| ValidationError::new("TOO_LONG", "Tag too long"))
    });
    registry.register("/tags/*", short);

    let schema = schema(json!({
        "properties": { "tags": { "type": "array", "items": { "type": "string" } } }
    }));
    let root = FormPropertyFactory::new(&registry)
        .create_property(&schema)
        .unwrap();

    root.set_value(json!({ "tags": ["ok", "toolong"] }));
    let errors = root.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "tags[1]");
}

#[test]
fn test_unknown_validator_fails_fast() {
    let registry = no_validators();
    let schema = schema(json!({
        "properties": { "name": { "type": "string", "validators": ["required"] } }
    }));

    let err = FormPropertyFactory::new(&registry)
        .create_property(&schema)
        .unwrap_err();
    assert!(matches!(
        err,
        FormError::UnknownValidator { ref path, ref id } if path == "name" && id == "required"
    ));
}

#[test]
fn test_array_without_items_is_schema_error() {
    let registry = no_validators();
    let schema = schema(json!({
        "properties": { "list": { "type": "array" } }
    }));

    let err = FormPropertyFactory::new(&registry)
        .create_property(&schema)
        .unwrap_err();
    assert!(matches!(err, FormError::Schema { .. }));
}

#[test]
fn test_array_add_and_remove_items() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();
    let tags = root.search_property("tags").unwrap();

    let first = tags.add_item(Some(json!("x"))).unwrap();
    assert_eq!(first.path().to_string(), "tags[0]");
    tags.add_item(Some(json!("y")));
    assert_eq!(root.value()["tags"], json!(["x", "y"]));

    assert!(tags.remove_item(0));
    assert!(!tags.remove_item(5));
    assert_eq!(root.value()["tags"], json!(["y"]));
    let remaining = root.get_property(&PropertyPath::parse("tags[0]").unwrap()).unwrap();
    assert_eq!(remaining.value(), json!("y"));
    assert_eq!(remaining.parent().unwrap().name(), "tags");
}

#[test]
fn test_lookup_helpers() {
    let registry = no_validators();
    let root = FormPropertyFactory::new(&registry)
        .create_property(&person())
        .unwrap();

    let city = root.search_property("city").unwrap();
    assert_eq!(city.path().to_string(), "address.city");
    assert_eq!(city.root().path().depth(), 0);
    assert!(root.get_property(&PropertyPath::parse("address.zip").unwrap()).is_none());
    assert!(root.search_property("name").unwrap().is_required());
}
