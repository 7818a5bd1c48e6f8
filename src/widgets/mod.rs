//! Widgets: the closed set of renderable field kinds.
//!
//! Each variant owns the markup logic for its own node type and nothing else.
//! Composite widgets (`Object`, `Array`) ask the template builder to render
//! their children and splice the results.

use crate::domain::{FormResult, SchemaNode};
use crate::model::FormProperty;
use crate::render::ir::{BindingKind, Element, FieldBinding, RenderNode};
use crate::render::TemplateBuilder;

pub mod object;
pub mod registry;
pub mod scalar;
pub mod string;

pub use registry::WidgetRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Object,
    Array,
    /// Single-line input; the widget id doubles as the input type
    String,
    Textarea,
    Number,
    Checkbox,
    Select,
}

impl Widget {
    /// Render the fragment for `property`.
    pub fn render(
        &self,
        property: &FormProperty,
        builder: &TemplateBuilder<'_>,
    ) -> FormResult<RenderNode> {
        match self {
            Widget::Object => object::render_object(property, builder),
            Widget::Array => object::render_array(property, builder),
            Widget::String => Ok(string::render(property)),
            Widget::Textarea => Ok(scalar::render_textarea(property)),
            Widget::Number => Ok(scalar::render_number(property)),
            Widget::Checkbox => Ok(scalar::render_checkbox(property)),
            Widget::Select => Ok(scalar::render_select(property)),
        }
    }
}

pub(crate) fn binding(property: &FormProperty, kind: BindingKind) -> FieldBinding {
    let schema = property.schema();
    FieldBinding {
        path: property.path().clone(),
        model_path: property.path().qualified(schema.model_name()),
        kind,
    }
}

pub(crate) fn form_id(schema: &SchemaNode) -> String {
    schema.form_id.clone().unwrap_or_default()
}

/// `div.widget.form-group` with the label and optional help text.
pub(crate) fn form_group(schema: &SchemaNode) -> Element {
    let group = Element::new("div")
        .attr("class", "widget form-group")
        .child(
            Element::new("label")
                .attr("for", form_id(schema))
                .attr("class", "horizontal control-label")
                .child(RenderNode::text(schema.label())),
        );
    with_description(group, schema)
}

pub(crate) fn with_description(el: Element, schema: &SchemaNode) -> Element {
    match &schema.description {
        Some(description) => el.child(
            Element::new("span")
                .attr("class", "formHelp")
                .child(RenderNode::text(description.as_str())),
        ),
        None => el,
    }
}
