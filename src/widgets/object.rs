//! Composite widgets: field groups and arrays.

use crate::domain::FormResult;
use crate::model::FormProperty;
use crate::render::ir::{Element, RenderNode};
use crate::render::TemplateBuilder;

use super::{form_id, with_description};

/// Fieldset of the children in schema order, followed by the object's buttons.
pub fn render_object(property: &FormProperty, builder: &TemplateBuilder<'_>) -> FormResult<RenderNode> {
    let schema = property.schema();
    let mut fieldset = Element::new("fieldset").attr("id", form_id(schema));
    if let Some(title) = &schema.title {
        fieldset = fieldset.child(Element::new("legend").child(RenderNode::text(title.as_str())));
    }
    fieldset = with_description(fieldset, schema);

    for child in property.children() {
        fieldset = fieldset.child(builder.build_node(&child)?);
    }

    for button in &schema.buttons {
        fieldset = fieldset.child(
            Element::new("div").attr("class", "widget form-group").child(
                Element::new("button")
                    .attr("type", "button")
                    .attr("class", "btn btn-default")
                    .on_action(&button.id)
                    .child(RenderNode::text(button.label.as_str())),
            ),
        );
    }

    Ok(fieldset.into())
}

/// One wrapper per current element. Elements added later need a new build.
pub fn render_array(property: &FormProperty, builder: &TemplateBuilder<'_>) -> FormResult<RenderNode> {
    let schema = property.schema();
    let mut group = Element::new("div")
        .attr("class", "widget form-group")
        .attr("id", form_id(schema))
        .child(
            Element::new("label")
                .attr("class", "horizontal control-label")
                .child(RenderNode::text(schema.label())),
        );
    group = with_description(group, schema);

    for element in property.children() {
        group = group.child(
            Element::new("div")
                .attr("class", "array-item")
                .child(builder.build_node(&element)?),
        );
    }

    Ok(group.into())
}
