//! Single-line text input.

use crate::domain::SchemaNode;
use crate::model::FormProperty;
use crate::render::ir::{BindingKind, Element, RenderNode};

use super::{binding, form_group, form_id};

/// `type` attribute for the input: the widget id, or `text` for plain strings.
pub fn input_type(schema: &SchemaNode) -> &str {
    match schema.widget.as_ref().map(|w| w.id.as_str()) {
        None | Some("") | Some("string") => "text",
        Some(id) => id,
    }
}

pub fn render(property: &FormProperty) -> RenderNode {
    let schema = property.schema();
    let name = property.name();
    let kind = input_type(schema);

    if kind == "hidden" {
        return Element::new("input")
            .attr("name", name)
            .attr("type", "hidden")
            .bind(binding(property, BindingKind::Value))
            .into();
    }

    // read-only colors are disabled and submit through a hidden companion
    let locked_color = kind == "color" && schema.read_only;

    let input = Element::new("input")
        .attr("name", name.as_str())
        .flag("readonly", kind != "color" && schema.read_only)
        .attr("class", "text-widget textline-widget form-control")
        .attr("type", kind)
        .attr("id", form_id(schema))
        .attr("placeholder", schema.placeholder.clone().unwrap_or_default())
        .attr_opt("maxLength", schema.max_length.as_ref().map(ToString::to_string))
        .attr_opt("minLength", schema.min_length.as_ref().map(ToString::to_string))
        .flag("disabled", locked_color)
        .bind(binding(property, BindingKind::Value));

    let group = form_group(schema).child(input);
    if locked_color {
        group
            .child(
                Element::new("input")
                    .attr("name", name)
                    .attr("type", "hidden")
                    .bind(binding(property, BindingKind::Mirror)),
            )
            .into()
    } else {
        group.into()
    }
}
