use crate::domain::FormResult;
use crate::model::FormProperty;
use crate::widgets::WidgetRegistry;

use super::ir::{RenderNode, RenderTree};

/// Walks a property tree and asks each node's widget for its fragment.
///
/// The builder knows no field-specific markup; composite widgets call back
/// into [`TemplateBuilder::build_node`] for their children.
pub struct TemplateBuilder<'a> {
    registry: &'a WidgetRegistry,
}

impl<'a> TemplateBuilder<'a> {
    pub fn new(registry: &'a WidgetRegistry) -> Self {
        Self { registry }
    }

    pub fn build(&self, root: &FormProperty) -> FormResult<RenderTree> {
        Ok(RenderTree {
            root: self.build_node(root)?,
            model_name: root.schema().model_name().to_string(),
        })
    }

    /// Markup for the whole form.
    pub fn build_template(&self, root: &FormProperty) -> FormResult<String> {
        Ok(self.build(root)?.to_markup())
    }

    /// Fragment for one node, resolved through the widget registry.
    pub fn build_node(&self, property: &FormProperty) -> FormResult<RenderNode> {
        let widget = self.registry.get(property.schema().widget_id())?;
        widget.render(property, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FormError, SchemaNode};
    use crate::model::{FormPropertyFactory, SchemaPreprocessor, SequentialIdGenerator, ValidatorRegistry};
    use crate::render::ir::BindingKind;
    use crate::widgets::Widget;
    use serde_json::{json, Value};

    fn property(value: Value) -> FormProperty {
        let mut schema = SchemaNode::from_value(value).unwrap();
        SchemaPreprocessor::new(&SequentialIdGenerator::default()).preprocess(&mut schema);
        FormPropertyFactory::new(&ValidatorRegistry::new())
            .create_property(&schema)
            .unwrap()
    }

    fn profile() -> FormProperty {
        property(json!({
            "modelName": "m",
            "title": "Profile",
            "properties": {
                "name": { "type": "string", "widget": { "id": "string" } },
                "bio": { "type": "string", "widget": "textarea" },
                "age": { "type": "integer" },
                "newsletter": { "type": "boolean" },
                "address": {
                    "properties": { "city": { "type": "string" } }
                }
            },
            "buttons": [{ "id": "save", "label": "Save" }]
        }))
    }

    #[test]
    fn test_bindings_follow_schema_order() {
        let root = profile();
        let tree = TemplateBuilder::new(&WidgetRegistry::new()).build(&root).unwrap();

        let paths: Vec<&str> = tree.bindings().iter().map(|b| b.model_path.as_str()).collect();
        assert_eq!(paths, vec!["m.name", "m.bio", "m.age", "m.newsletter", "m.address.city"]);
        assert_eq!(tree.bindings()[3].kind, BindingKind::Checked);
        assert_eq!(tree.model_name, "m");
    }

    #[test]
    fn test_object_renders_legend_and_buttons() {
        let root = profile();
        let markup = TemplateBuilder::new(&WidgetRegistry::new())
            .build_template(&root)
            .unwrap();

        assert!(markup.starts_with("<fieldset id=\"field0\"><legend>Profile</legend>"));
        assert!(markup.contains("data-action=\"save\">Save</button>"));
        assert!(markup.ends_with("</fieldset>"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let root = profile();
        let registry = WidgetRegistry::new();
        let builder = TemplateBuilder::new(&registry);
        assert_eq!(
            builder.build_template(&root).unwrap(),
            builder.build_template(&root).unwrap()
        );
    }

    #[test]
    fn test_array_renders_current_elements() {
        let root = property(json!({
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        }));
        root.set_value(json!({ "tags": ["a", "b"] }));

        let tree = TemplateBuilder::new(&WidgetRegistry::new()).build(&root).unwrap();
        let paths: Vec<String> = tree.bindings().iter().map(|b| b.path.to_string()).collect();
        assert_eq!(paths, vec!["tags[0]", "tags[1]"]);
        assert!(tree.to_markup().contains("class=\"array-item\""));
    }

    #[test]
    fn test_unknown_widget_is_registry_miss() {
        let root = property(json!({
            "properties": { "body": { "type": "string", "widget": "rich-text" } }
        }));
        let err = TemplateBuilder::new(&WidgetRegistry::new()).build(&root).unwrap_err();
        assert!(matches!(err, FormError::WidgetNotFound { ref id } if id == "rich-text"));
    }

    #[test]
    fn test_override_changes_rendering() {
        let root = property(json!({
            "properties": { "body": { "type": "string", "widget": "rich-text" } }
        }));
        let mut registry = WidgetRegistry::new();
        registry.register("rich-text", Widget::Textarea);

        let markup = TemplateBuilder::new(&registry).build_template(&root).unwrap();
        assert!(markup.contains("<textarea name=\"body\""));
    }
}
