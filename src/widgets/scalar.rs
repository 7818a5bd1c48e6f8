//! Textarea, number, checkbox and select widgets.

use serde_json::Value;

use crate::domain::SchemaType;
use crate::model::FormProperty;
use crate::render::ir::{BindingKind, Element, RenderNode};

use super::{binding, form_group, form_id, with_description};

pub fn render_textarea(property: &FormProperty) -> RenderNode {
    let schema = property.schema();
    let area = Element::new("textarea")
        .attr("name", property.name())
        .flag("readonly", schema.read_only)
        .attr("class", "text-widget textarea-widget form-control")
        .attr("id", form_id(schema))
        .attr("placeholder", schema.placeholder.clone().unwrap_or_default())
        .attr_opt("maxLength", schema.max_length.as_ref().map(ToString::to_string))
        .attr_opt("minLength", schema.min_length.as_ref().map(ToString::to_string))
        .bind(binding(property, BindingKind::Value));
    form_group(schema).child(area).into()
}

pub fn render_number(property: &FormProperty) -> RenderNode {
    let schema = property.schema();
    let kind = match schema.widget_id() {
        "range" => "range",
        _ => "number",
    };
    let step = (schema.schema_type() == SchemaType::Integer).then_some("1");
    let input = Element::new("input")
        .attr("name", property.name())
        .flag("readonly", schema.read_only)
        .attr("class", "text-widget integer-widget form-control")
        .attr("type", kind)
        .attr("id", form_id(schema))
        .attr_opt("min", schema.minimum.map(|n| n.to_string()))
        .attr_opt("max", schema.maximum.map(|n| n.to_string()))
        .attr_opt("step", step)
        .bind(binding(property, BindingKind::Value));
    form_group(schema).child(input).into()
}

pub fn render_checkbox(property: &FormProperty) -> RenderNode {
    let schema = property.schema();
    let input = Element::new("input")
        .attr("name", property.name())
        .attr("type", "checkbox")
        .attr("id", form_id(schema))
        .flag("disabled", schema.read_only)
        .bind(binding(property, BindingKind::Checked));
    let label = Element::new("label")
        .attr("for", form_id(schema))
        .attr("class", "horizontal control-label")
        .child(input)
        .child(RenderNode::text(schema.label()));
    let group = Element::new("div")
        .attr("class", "widget form-group")
        .child(Element::new("div").attr("class", "checkbox").child(label));
    with_description(group, schema).into()
}

pub fn render_select(property: &FormProperty) -> RenderNode {
    let schema = property.schema();
    let options = schema.enum_values.iter().map(|choice| {
        let text = option_text(choice);
        RenderNode::from(
            Element::new("option")
                .attr("value", text.as_str())
                .child(RenderNode::text(text)),
        )
    });
    let select = Element::new("select")
        .attr("name", property.name())
        .flag("disabled", schema.read_only)
        .attr("class", "form-control")
        .attr("id", form_id(schema))
        .bind(binding(property, BindingKind::Value))
        .children(options);
    form_group(schema).child(select).into()
}

fn option_text(choice: &Value) -> String {
    match choice {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
