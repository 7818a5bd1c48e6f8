//! Instantiation of a render tree into a live, bound form view.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

use crate::domain::PropertyPath;
use crate::model::{ActionRegistry, FormProperty};

use super::ir::{BindingKind, Element, FieldBinding, RenderNode, RenderTree};
use super::markup;

#[derive(Debug, Default)]
struct ContainerState {
    render_passes: Cell<u64>,
    mounted: Cell<usize>,
}

/// Host slot that views are attached to. Cloning shares the slot.
#[derive(Debug, Clone, Default)]
pub struct ViewContainer {
    state: Rc<ContainerState>,
}

impl ViewContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a render pass.
    pub fn detect_changes(&self) {
        let passes = &self.state.render_passes;
        passes.set(passes.get() + 1);
    }

    pub fn render_passes(&self) -> u64 {
        self.state.render_passes.get()
    }

    /// Number of views currently attached
    pub fn mounted(&self) -> usize {
        self.state.mounted.get()
    }

    fn attach(&self) {
        let mounted = &self.state.mounted;
        mounted.set(mounted.get() + 1);
    }

    fn detach(&self) {
        let mounted = &self.state.mounted;
        mounted.set(mounted.get().saturating_sub(1));
    }
}

#[derive(Debug, Default)]
struct ControlState {
    dirty: Cell<bool>,
}

/// Interaction state shared by every field of one form.
#[derive(Debug, Clone, Default)]
pub struct Control {
    state: Rc<ControlState>,
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&self) {
        self.state.dirty.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty.get()
    }

    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }
}

/// Initial state handed to an instantiated view.
#[derive(Clone)]
pub struct BindingContext {
    pub form_property: FormProperty,
    pub control: Control,
    pub visible: bool,
    pub debug: bool,
    pub model_name: String,
    pub model: Rc<RefCell<Value>>,
    pub actions: Rc<RefCell<ActionRegistry>>,
}

/// Data binding of the root widget, set by the view's owner once the view
/// exists.
#[derive(Debug, Clone)]
pub struct WidgetBinding {
    pub form_property: FormProperty,
    pub name: String,
    pub id: String,
    pub control: Control,
}

/// Receives every view the factory instantiates for it.
pub trait WidgetOwner {
    fn on_widget_instantiated(&self, view: &FormView);
}

/// A live form: compiled bindings over the property tree.
pub struct FormView {
    context: BindingContext,
    tree: RenderTree,
    container: ViewContainer,
    widget: RefCell<Option<WidgetBinding>>,
    destroyed: Cell<bool>,
}

impl FormView {
    pub fn context(&self) -> &BindingContext {
        &self.context
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn property(&self) -> &FormProperty {
        &self.context.form_property
    }

    pub fn control(&self) -> &Control {
        &self.context.control
    }

    pub fn bindings(&self) -> Vec<&FieldBinding> {
        self.tree.bindings()
    }

    pub fn bind_widget(&self, binding: WidgetBinding) {
        *self.widget.borrow_mut() = Some(binding);
    }

    pub fn widget(&self) -> Option<WidgetBinding> {
        self.widget.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// A user edit on the field at `path`. Returns false when the view is gone
    /// or nothing is bound there.
    pub fn input(&self, path: &PropertyPath, value: Value) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let Some(property) = self.context.form_property.get_property(path) else {
            warn!(path = %path, "input on unknown field");
            return false;
        };
        property.set_value(value);
        self.context.control.mark_dirty();
        self.container.detect_changes();
        true
    }

    /// Click on the button wired to action `id`.
    ///
    /// The action runs against the object owning the button, with the
    /// button's parameters. Returns false when no such button or action
    /// exists.
    pub fn trigger(&self, id: &str) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let Some((owner, parameters)) = find_button(&self.context.form_property, id) else {
            warn!(action = id, "no button for action");
            return false;
        };
        let action = self.context.actions.borrow().get(id);
        match action {
            Some(action) => {
                debug!(action = id, path = %owner.path(), "running action");
                action.run(&owner, parameters.as_ref());
                self.container.detect_changes();
                true
            }
            None => {
                warn!(action = id, "action not registered");
                false
            }
        }
    }

    /// Current value behind a bound expression such as `m.name`.
    pub fn rendered_value(&self, model_path: &str) -> Option<Value> {
        let binding = self
            .tree
            .bindings()
            .into_iter()
            .find(|b| b.model_path == model_path)?;
        self.context
            .form_property
            .get_property(&binding.path)
            .map(|p| p.value())
    }

    /// Markup with the current field values filled in.
    pub fn render(&self) -> String {
        let mut root = self.tree.root.clone();
        fill_values(&mut root, &self.context.form_property);
        markup::render(&root)
    }

    fn destroy(&self) {
        if !self.destroyed.replace(true) {
            self.container.detach();
            debug!(model = %self.context.model_name, "form view destroyed");
        }
    }
}

/// Handle on an instantiated view.
#[derive(Clone)]
pub struct WidgetRef {
    pub instance: Rc<FormView>,
}

impl WidgetRef {
    /// Detach the view. Later edits and actions on it are ignored.
    pub fn destroy(&self) {
        self.instance.destroy();
    }
}

pub struct WidgetFactory;

impl WidgetFactory {
    /// Instantiate `tree` into `container` and run a render pass.
    ///
    /// Every call builds a fresh view; nothing is cached across builds.
    pub fn add_widget(
        container: &ViewContainer,
        tree: RenderTree,
        context: BindingContext,
        owner: &dyn WidgetOwner,
    ) -> WidgetRef {
        let view = Rc::new(FormView {
            context,
            tree,
            container: container.clone(),
            widget: RefCell::new(None),
            destroyed: Cell::new(false),
        });
        container.attach();
        owner.on_widget_instantiated(&view);
        container.detect_changes();
        WidgetRef { instance: view }
    }
}

fn find_button(property: &FormProperty, id: &str) -> Option<(FormProperty, Option<Value>)> {
    if let Some(button) = property.schema().buttons.iter().find(|b| b.id == id) {
        return Some((property.clone(), button.parameters.clone()));
    }
    property
        .children()
        .iter()
        .find_map(|child| find_button(child, id))
}

fn fill_values(node: &mut RenderNode, root: &FormProperty) {
    match node {
        RenderNode::Element(el) => {
            let bound = el.binding.as_ref().and_then(|b| {
                root.get_property(&b.path).map(|p| (b.kind, p.value()))
            });
            if let Some((kind, value)) = bound {
                show_value(el, kind, &value);
            }
            for child in el.children.iter_mut() {
                fill_values(child, root);
            }
        }
        RenderNode::Fragment { children } => {
            for child in children.iter_mut() {
                fill_values(child, root);
            }
        }
        RenderNode::Text { .. } => {}
    }
}

fn show_value(el: &mut Element, kind: BindingKind, value: &Value) {
    if value.is_null() {
        return;
    }
    if kind == BindingKind::Checked {
        if value.as_bool() == Some(true) {
            el.attrs.push(("checked".to_string(), "checked".to_string()));
        }
        return;
    }
    let text = display(value);
    match el.tag.as_str() {
        "textarea" => el.children = vec![RenderNode::text(text)],
        "select" => {
            for child in el.children.iter_mut() {
                if let RenderNode::Element(option) = child {
                    if option.get_attr("value") == Some(text.as_str()) {
                        option.attrs.push(("selected".to_string(), "selected".to_string()));
                    }
                }
            }
        }
        _ => el.attrs.push(("value".to_string(), text)),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SchemaNode, SharedAction};
    use crate::model::{FormPropertyFactory, SchemaPreprocessor, SequentialIdGenerator, ValidatorRegistry};
    use crate::render::TemplateBuilder;
    use crate::widgets::WidgetRegistry;
    use serde_json::json;

    struct Recorder {
        seen: Cell<usize>,
    }

    impl WidgetOwner for Recorder {
        fn on_widget_instantiated(&self, view: &FormView) {
            self.seen.set(self.seen.get() + 1);
            view.bind_widget(WidgetBinding {
                form_property: view.property().clone(),
                name: "root".to_string(),
                id: "field99".to_string(),
                control: view.control().clone(),
            });
        }
    }

    fn mount(
        container: &ViewContainer,
        actions: Rc<RefCell<ActionRegistry>>,
        owner: &Recorder,
    ) -> WidgetRef {
        let mut schema = SchemaNode::from_value(json!({
            "modelName": "m",
            "properties": {
                "name": { "type": "string" },
                "bio": { "type": "string", "widget": "textarea" },
                "agree": { "type": "boolean" },
                "color": { "type": "string", "widget": "select", "enum": ["red", "blue"] }
            },
            "buttons": [{ "id": "clear", "label": "Clear", "parameters": { "keep": "agree" } }]
        }))
        .unwrap();
        SchemaPreprocessor::new(&SequentialIdGenerator::default()).preprocess(&mut schema);
        let root = FormPropertyFactory::new(&ValidatorRegistry::new())
            .create_property(&schema)
            .unwrap();
        root.reset(
            Some(&json!({ "name": "Alice", "bio": "hi", "agree": true, "color": "blue" })),
            false,
        );
        let tree = TemplateBuilder::new(&WidgetRegistry::new()).build(&root).unwrap();
        let context = BindingContext {
            form_property: root,
            control: Control::new(),
            visible: true,
            debug: false,
            model_name: "m".to_string(),
            model: Rc::new(RefCell::new(json!({}))),
            actions,
        };
        WidgetFactory::add_widget(container, tree, context, owner)
    }

    #[test]
    fn test_add_widget_mounts_and_renders() {
        let container = ViewContainer::new();
        let owner = Recorder { seen: Cell::new(0) };
        let widget = mount(&container, Rc::default(), &owner);

        assert_eq!(owner.seen.get(), 1);
        assert_eq!(container.mounted(), 1);
        assert_eq!(container.render_passes(), 1);
        assert_eq!(widget.instance.widget().unwrap().id, "field99");

        widget.destroy();
        widget.destroy();
        assert_eq!(container.mounted(), 0);
        assert!(widget.instance.is_destroyed());
    }

    #[test]
    fn test_render_fills_live_values() {
        let container = ViewContainer::new();
        let owner = Recorder { seen: Cell::new(0) };
        let view = mount(&container, Rc::default(), &owner).instance;

        let markup = view.render();
        assert!(markup.contains("value=\"Alice\""));
        assert!(markup.contains(">hi</textarea>"));
        assert!(markup.contains("checked=\"checked\""));
        assert!(markup.contains("<option value=\"blue\" selected=\"selected\">"));
        assert_eq!(view.rendered_value("m.name"), Some(json!("Alice")));
        assert_eq!(view.rendered_value("m.missing"), None);
    }

    #[test]
    fn test_input_updates_property_and_control() {
        let container = ViewContainer::new();
        let owner = Recorder { seen: Cell::new(0) };
        let view = mount(&container, Rc::default(), &owner).instance;
        assert!(view.control().is_pristine());

        assert!(view.input(&PropertyPath::parse("name").unwrap(), json!("Bob")));
        assert!(!view.input(&PropertyPath::parse("nope").unwrap(), json!(1)));

        assert_eq!(view.property().value()["name"], "Bob");
        assert!(view.control().is_dirty());
        assert_eq!(container.render_passes(), 2);
        assert!(view.render().contains("value=\"Bob\""));
    }

    #[test]
    fn test_trigger_runs_action_on_owner() {
        let actions: Rc<RefCell<ActionRegistry>> = Rc::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&calls);
        let clear: SharedAction = Rc::new(move |form: &FormProperty, params: Option<&Value>| {
            c.borrow_mut().push(params.cloned());
            form.set_value(json!({}));
        });
        actions.borrow_mut().register("clear", clear);

        let container = ViewContainer::new();
        let owner = Recorder { seen: Cell::new(0) };
        let view = mount(&container, Rc::clone(&actions), &owner).instance;

        assert!(view.trigger("clear"));
        assert!(!view.trigger("unknown"));
        assert_eq!(calls.borrow()[0], Some(json!({ "keep": "agree" })));
        assert_eq!(view.property().value(), json!({}));
    }

    #[test]
    fn test_destroyed_view_ignores_input() {
        let container = ViewContainer::new();
        let owner = Recorder { seen: Cell::new(0) };
        let widget = mount(&container, Rc::default(), &owner);
        widget.destroy();
        assert!(!widget.instance.input(&PropertyPath::parse("name").unwrap(), json!("Eve")));
        assert_eq!(widget.instance.property().value()["name"], "Alice");
    }
}
