//! From property tree to live view: render IR, markup, template building and
//! instantiation.

pub mod ir;
pub mod markup;
pub mod template_builder;
pub mod widget_factory;

pub use ir::{BindingKind, Element, FieldBinding, RenderNode, RenderTree};
pub use template_builder::TemplateBuilder;
pub use widget_factory::{
    BindingContext, Control, FormView, ViewContainer, WidgetBinding, WidgetFactory, WidgetOwner,
    WidgetRef,
};
