//! Form builder: owns the lifecycle of one form.
//!
//! Inputs arrive as [`FormChanges`] (schema, model, validators, actions), the
//! way a host framework reports changed inputs. Each application runs, in
//! order:
//!
//! 1. validators, then actions: registry cleared and fully repopulated
//! 2. schema: previous form torn down, schema preprocessed, property tree
//!    built and subscribed
//! 3. schema or model: root reset from the model without defaults
//! 4. always: template rebuilt and a fresh view mounted
//!
//! Structural errors tear the form down completely: after a failed build
//! nothing stays mounted and the builder is back to
//! [`BuilderState::Uninitialized`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::config::FormSettings;
use crate::domain::{
    FormError, FormResult, IdGenerator, SchemaNode, SharedAction, SharedValidator, ValidationError,
    DEFAULT_MODEL_NAME,
};
use crate::model::{
    ActionRegistry, EventEmitter, FormProperty, FormPropertyFactory, ProcessIdGenerator,
    SchemaPreprocessor, Subscription, ValidatorRegistry,
};
use crate::render::{
    BindingContext, Control, FormView, TemplateBuilder, ViewContainer, WidgetBinding,
    WidgetFactory, WidgetOwner, WidgetRef,
};
use crate::widgets::WidgetRegistry;

/// Host model object. Shared so two-way binding can update it in place.
pub type SharedModel = Rc<RefCell<Value>>;

/// Payload of [`FormBuilder::on_change`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub value: Value,
}

/// Payload of [`FormBuilder::on_error_change`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEvent {
    pub value: Vec<ValidationError>,
}

/// Errors grouped by property path.
pub type ErrorsByPath = BTreeMap<String, Vec<ValidationError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Uninitialized,
    SchemaBound,
    /// A new schema is being applied; the previous form is gone
    Rebuilding,
    Rendered,
}

/// Changed inputs for one [`FormBuilder::apply`] call.
#[derive(Default)]
pub struct FormChanges {
    pub schema: Option<SchemaNode>,
    pub model: Option<SharedModel>,
    pub validators: Option<Vec<(String, SharedValidator)>>,
    pub actions: Option<Vec<(String, SharedAction)>>,
}

impl FormChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(mut self, schema: SchemaNode) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn model(self, model: Value) -> Self {
        self.shared_model(Rc::new(RefCell::new(model)))
    }

    pub fn shared_model(mut self, model: SharedModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn validators<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, SharedValidator)>,
        K: Into<String>,
    {
        self.validators = Some(entries.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    pub fn actions<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, SharedAction)>,
        K: Into<String>,
    {
        self.actions = Some(entries.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_none()
            && self.model.is_none()
            && self.validators.is_none()
            && self.actions.is_none()
    }
}

pub struct FormBuilder {
    ids: Rc<dyn IdGenerator>,
    default_model_name: String,
    log_templates: bool,

    widgets: WidgetRegistry,
    validators: ValidatorRegistry,
    actions: Rc<RefCell<ActionRegistry>>,
    container: ViewContainer,
    control: Control,

    state: BuilderState,
    schema: Option<SchemaNode>,
    model: Rc<RefCell<Option<SharedModel>>>,
    root: Option<FormProperty>,
    instance: Option<WidgetRef>,
    subscriptions: Vec<Subscription>,

    widget_instantiated: EventEmitter<WidgetRef>,
    on_change: EventEmitter<ChangeEvent>,
    model_changed: EventEmitter<SharedModel>,
    is_valid: EventEmitter<bool>,
    on_error_change: EventEmitter<ErrorEvent>,
    on_errors_change: EventEmitter<ErrorsByPath>,
}

impl fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilder")
            .field("state", &self.state)
            .field("validators", &self.validators)
            .field("mounted", &self.container.mounted())
            .finish()
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::with_id_generator(Rc::new(ProcessIdGenerator::default()))
    }

    /// Builder with an injected id supplier, e.g. a sequential one in tests.
    pub fn with_id_generator(ids: Rc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            default_model_name: DEFAULT_MODEL_NAME.to_string(),
            log_templates: false,
            widgets: WidgetRegistry::new(),
            validators: ValidatorRegistry::new(),
            actions: Rc::default(),
            container: ViewContainer::new(),
            control: Control::new(),
            state: BuilderState::Uninitialized,
            schema: None,
            model: Rc::default(),
            root: None,
            instance: None,
            subscriptions: Vec::new(),
            widget_instantiated: EventEmitter::new(),
            on_change: EventEmitter::new(),
            model_changed: EventEmitter::new(),
            is_valid: EventEmitter::new(),
            on_error_change: EventEmitter::new(),
            on_errors_change: EventEmitter::new(),
        }
    }

    pub fn from_settings(settings: &FormSettings) -> Self {
        let mut builder =
            Self::with_id_generator(Rc::new(ProcessIdGenerator::new(settings.id_prefix.clone())));
        builder.default_model_name = settings.default_model_name.clone();
        builder.log_templates = settings.log_templates;
        builder
    }

    /// Replace the widget registry used for template building.
    pub fn with_widgets(mut self, widgets: WidgetRegistry) -> Self {
        self.widgets = widgets;
        self
    }

    /// Apply changed inputs. See the module docs for the order of steps.
    pub fn apply(&mut self, changes: FormChanges) -> FormResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        match self.apply_changes(changes) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "form build failed, tearing down");
                self.teardown();
                self.schema = None;
                self.transition(BuilderState::Uninitialized);
                Err(err)
            }
        }
    }

    fn apply_changes(&mut self, changes: FormChanges) -> FormResult<()> {
        let FormChanges {
            schema,
            model,
            validators,
            actions,
        } = changes;

        let validators_changed = validators.is_some();
        if let Some(entries) = validators {
            self.validators.replace_all(entries);
            debug!(count = self.validators.len(), "validators registered");
        }
        if let Some(entries) = actions {
            self.actions.borrow_mut().replace_all(entries);
            debug!(count = self.actions.borrow().len(), "actions registered");
        }

        let model_changed = model.is_some();
        if let Some(model) = model {
            *self.model.borrow_mut() = Some(model);
        }

        let mut tree_rebuilt = false;
        if let Some(schema) = schema {
            self.bind_schema(schema)?;
            tree_rebuilt = true;
        } else if validators_changed && self.schema.is_some() {
            // newly registered validators attach only at construction
            self.mount_tree()?;
            tree_rebuilt = true;
        }

        if tree_rebuilt || model_changed {
            if let Some(root) = &self.root {
                let model = self.model_value();
                root.reset(model.as_ref(), false);
                self.container.detect_changes();
            }
        }

        self.create_form()
    }

    pub fn set_schema(&mut self, schema: SchemaNode) -> FormResult<()> {
        self.apply(FormChanges::new().schema(schema))
    }

    pub fn set_model(&mut self, model: Value) -> FormResult<()> {
        self.apply(FormChanges::new().model(model))
    }

    pub fn set_shared_model(&mut self, model: SharedModel) -> FormResult<()> {
        self.apply(FormChanges::new().shared_model(model))
    }

    pub fn set_validators<I, K>(&mut self, entries: I) -> FormResult<()>
    where
        I: IntoIterator<Item = (K, SharedValidator)>,
        K: Into<String>,
    {
        self.apply(FormChanges::new().validators(entries))
    }

    pub fn set_actions<I, K>(&mut self, entries: I) -> FormResult<()>
    where
        I: IntoIterator<Item = (K, SharedAction)>,
        K: Into<String>,
    {
        self.apply(FormChanges::new().actions(entries))
    }

    /// Clear the form back to schema defaults, notifying every field.
    pub fn reset(&mut self) -> FormResult<()> {
        let root = self.root.as_ref().ok_or(FormError::NoSchema)?;
        root.reset(None, true);
        self.container.detect_changes();
        Ok(())
    }

    /// Rebuild the template and remount, e.g. after array elements were added.
    pub fn rebuild_view(&mut self) -> FormResult<()> {
        if self.root.is_none() {
            return Err(FormError::NoSchema);
        }
        self.create_form()
    }

    /// Tear down the form. Registries and the model are kept.
    pub fn destroy(&mut self) {
        self.teardown();
        self.schema = None;
        self.transition(BuilderState::Uninitialized);
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Preprocessed schema of the current form.
    pub fn schema(&self) -> Option<&SchemaNode> {
        self.schema.as_ref()
    }

    pub fn root_property(&self) -> Option<&FormProperty> {
        self.root.as_ref()
    }

    pub fn instance(&self) -> Option<&Rc<FormView>> {
        self.instance.as_ref().map(|w| &w.instance)
    }

    pub fn model(&self) -> Option<SharedModel> {
        self.model.borrow().clone()
    }

    pub fn container(&self) -> &ViewContainer {
        &self.container
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn widgets_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.widgets
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Fires once per mounted view.
    pub fn widget_instantiated(&self) -> &EventEmitter<WidgetRef> {
        &self.widget_instantiated
    }

    /// Fires on every root value change.
    pub fn on_change(&self) -> &EventEmitter<ChangeEvent> {
        &self.on_change
    }

    /// Two-way binding channel. While anybody listens, root value changes
    /// are merged into the host model, which is then emitted.
    pub fn model_changed(&self) -> &EventEmitter<SharedModel> {
        &self.model_changed
    }

    pub fn is_valid(&self) -> &EventEmitter<bool> {
        &self.is_valid
    }

    pub fn on_error_change(&self) -> &EventEmitter<ErrorEvent> {
        &self.on_error_change
    }

    pub fn on_errors_change(&self) -> &EventEmitter<ErrorsByPath> {
        &self.on_errors_change
    }

    fn bind_schema(&mut self, mut schema: SchemaNode) -> FormResult<()> {
        if self.state != BuilderState::Uninitialized {
            self.teardown();
            self.transition(BuilderState::Rebuilding);
        }
        if schema.debug {
            warn!(?schema, "schema debugger");
        }
        SchemaPreprocessor::new(self.ids.as_ref())
            .with_default_model_name(&self.default_model_name)
            .preprocess(&mut schema);
        self.schema = Some(schema);
        self.mount_tree()
    }

    /// Build the property tree from the bound schema and subscribe to it.
    fn mount_tree(&mut self) -> FormResult<()> {
        self.teardown();
        let schema = self.schema.as_ref().ok_or(FormError::NoSchema)?;
        let root = FormPropertyFactory::new(&self.validators).create_property(schema)?;
        self.subscriptions = self.subscribe(&root);
        self.root = Some(root);
        self.transition(BuilderState::SchemaBound);
        Ok(())
    }

    fn subscribe(&self, root: &FormProperty) -> Vec<Subscription> {
        let on_change = self.on_change.clone();
        let model_changed = self.model_changed.clone();
        let model = Rc::clone(&self.model);
        let values = root.subscribe_value(move |value| {
            if model_changed.observer_count() > 0 {
                let merged = merge_into_model(&model, value);
                model_changed.emit(&merged);
            }
            on_change.emit(&ChangeEvent {
                value: value.clone(),
            });
        });

        let on_error_change = self.on_error_change.clone();
        let is_valid = self.is_valid.clone();
        let on_errors_change = self.on_errors_change.clone();
        let errors = root.subscribe_errors(move |errors| {
            on_error_change.emit(&ErrorEvent {
                value: errors.clone(),
            });
            is_valid.emit(&errors.is_empty());
            on_errors_change.emit(&group_by_path(errors));
        });

        vec![values, errors]
    }

    fn create_form(&mut self) -> FormResult<()> {
        let Some(root) = self.root.clone() else {
            return Ok(());
        };
        let tree = TemplateBuilder::new(&self.widgets).build(&root)?;
        if self.log_templates {
            info!(template = %tree.to_markup(), "form template");
        } else {
            debug!(template = %tree.to_markup(), "form template");
        }

        if let Some(previous) = self.instance.take() {
            previous.destroy();
        }

        let schema = root.schema();
        let context = BindingContext {
            form_property: root.clone(),
            control: self.control.clone(),
            visible: true,
            debug: schema.debug,
            model_name: schema.model_name().to_string(),
            model: self
                .model()
                .unwrap_or_else(|| Rc::new(RefCell::new(Value::Object(Map::new())))),
            actions: Rc::clone(&self.actions),
        };
        let widget = WidgetFactory::add_widget(&self.container, tree, context, &*self);
        self.widget_instantiated.emit(&widget);
        self.instance = Some(widget);
        self.container.detect_changes();
        self.transition(BuilderState::Rendered);
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(instance) = self.instance.take() {
            instance.destroy();
        }
        self.subscriptions.clear();
        self.root = None;
    }

    fn transition(&mut self, next: BuilderState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "form builder state");
            self.state = next;
        }
    }

    fn model_value(&self) -> Option<Value> {
        self.model
            .borrow()
            .as_ref()
            .map(|model| model.borrow().clone())
    }
}

impl WidgetOwner for FormBuilder {
    fn on_widget_instantiated(&self, view: &FormView) {
        let id = self.ids.next_id();
        view.bind_widget(WidgetBinding {
            form_property: view.property().clone(),
            name: id.clone(),
            id,
            control: self.control.clone(),
        });
    }
}

impl Drop for FormBuilder {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Shallow-merge `value` into the host model, keeping its identity. Without a
/// model the value becomes the model.
fn merge_into_model(slot: &RefCell<Option<SharedModel>>, value: &Value) -> SharedModel {
    let existing = slot.borrow().clone();
    match existing {
        Some(model) => {
            {
                let mut target = model.borrow_mut();
                match (&mut *target, value) {
                    (Value::Object(target), Value::Object(source)) => {
                        for (key, v) in source {
                            target.insert(key.clone(), v.clone());
                        }
                    }
                    (target, value) => *target = value.clone(),
                }
            }
            model
        }
        None => {
            let model = Rc::new(RefCell::new(value.clone()));
            *slot.borrow_mut() = Some(Rc::clone(&model));
            model
        }
    }
}

fn group_by_path(errors: &[ValidationError]) -> ErrorsByPath {
    let mut grouped = ErrorsByPath::new();
    for error in errors {
        grouped
            .entry(error.path.clone())
            .or_default()
            .push(error.clone());
    }
    grouped
}
