use std::rc::{Rc, Weak};

use tracing::debug;

use super::constraints::Keywords;
use super::property::{Blueprint, FormProperty};
use super::registry::ValidatorRegistry;
use crate::domain::{FormError, FormResult, PropertyPath, SchemaNode, SchemaType, SharedValidator};

/// Builds property trees from preprocessed schemas.
///
/// Validators come from two places: ids listed in a node's `validators`, and a
/// registry entry keyed by the node's pointer (`/address/city`, with `*`
/// standing for array elements: `/tags/*/label`). An id listed on a node that
/// the registry does not know fails the whole build.
pub struct FormPropertyFactory<'a> {
    validators: &'a ValidatorRegistry,
}

impl<'a> FormPropertyFactory<'a> {
    pub fn new(validators: &'a ValidatorRegistry) -> Self {
        Self { validators }
    }

    /// Build the tree for `schema`. Nothing is notified during construction.
    pub fn create_property(&self, schema: &SchemaNode) -> FormResult<FormProperty> {
        let blueprint = self.blueprint(schema, &PropertyPath::root(), "", false)?;
        let root = FormProperty::instantiate(&Rc::new(blueprint), PropertyPath::root(), Weak::new());
        debug!(fields = root.children().len(), "property tree created");
        Ok(root)
    }

    fn blueprint(
        &self,
        schema: &SchemaNode,
        path: &PropertyPath,
        pointer: &str,
        required: bool,
    ) -> FormResult<Blueprint> {
        let validators = self.resolve_validators(schema, path, pointer)?;
        let keywords = Keywords::compile(schema, path)?;

        let mut children = Vec::new();
        let mut items = None;
        match schema.schema_type() {
            SchemaType::Object => {
                for (key, child) in &schema.properties {
                    let blueprint = self.blueprint(
                        child,
                        &path.push_property(key),
                        &format!("{}/{}", pointer, key),
                        schema.is_required(key),
                    )?;
                    children.push((key.clone(), Rc::new(blueprint)));
                }
            }
            SchemaType::Array => {
                let item_schema = schema.items.as_deref().ok_or_else(|| FormError::Schema {
                    path: path.to_string(),
                    reason: "array node has no items schema".to_string(),
                })?;
                let blueprint = self.blueprint(
                    item_schema,
                    &path.push_index(0),
                    &format!("{}/*", pointer),
                    false,
                )?;
                items = Some(Rc::new(blueprint));
            }
            _ => {
                if !schema.properties.is_empty() {
                    return Err(FormError::Schema {
                        path: path.to_string(),
                        reason: format!("{} node cannot declare properties", schema.schema_type()),
                    });
                }
            }
        }

        Ok(Blueprint {
            schema: Rc::new(schema.clone()),
            required,
            keywords,
            validators,
            children,
            items,
        })
    }

    fn resolve_validators(
        &self,
        schema: &SchemaNode,
        path: &PropertyPath,
        pointer: &str,
    ) -> FormResult<Vec<SharedValidator>> {
        let mut resolved = Vec::with_capacity(schema.validators.len());
        for id in &schema.validators {
            let validator = self
                .validators
                .get(id)
                .ok_or_else(|| FormError::UnknownValidator {
                    path: path.to_string(),
                    id: id.clone(),
                })?;
            resolved.push(validator);
        }

        let key = if pointer.is_empty() { "/" } else { pointer };
        if !schema.validators.iter().any(|id| id == key) {
            if let Some(validator) = self.validators.get(key) {
                resolved.push(validator);
            }
        }
        Ok(resolved)
    }
}
