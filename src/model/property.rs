//! Runtime form properties mirroring a schema tree.
//!
//! Each [`FormProperty`] holds a current value and the current error list as
//! [`Observable`]s. Objects own their children; arrays own one child per
//! element, rebuilt whenever the array value is replaced.
//!
//! # Values
//!
//! - leaf: its own value, `null` meaning absent
//! - object: map of the children that hold a value, in schema order; `null`,
//!   `{}` and `[]` count as absent
//! - array: list of the children's values
//!
//! A container handed a value of the wrong shape keeps it aside and reports
//! it as a type error until the node is written again.
//!
//! # Propagation
//!
//! Writes land silently on the written subtree, which then notifies. After
//! that every ancestor recomputes its value and errors and notifies once, so a
//! root listener sees exactly one value event per edit.
//!
//! Errors of a node are its own errors followed by its descendants' errors in
//! tree order; the root therefore carries every error of the form.

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::constraints::{self, Keywords};
use super::observable::{Observable, Subscription};
use crate::domain::{PathSegment, PropertyPath, SchemaNode, SchemaType, SharedValidator, ValidationError};

/// Resolved construction plan for one schema node: the schema plus the
/// validators attached to it. Arrays keep their item plan to build elements on
/// demand.
pub(crate) struct Blueprint {
    pub(crate) schema: Rc<SchemaNode>,
    pub(crate) required: bool,
    pub(crate) keywords: Keywords,
    pub(crate) validators: Vec<SharedValidator>,
    pub(crate) children: Vec<(String, Rc<Blueprint>)>,
    pub(crate) items: Option<Rc<Blueprint>>,
}

enum PropertyKind {
    Leaf,
    Object(Vec<(String, FormProperty)>),
    Array {
        items: Rc<Blueprint>,
        children: RefCell<Vec<FormProperty>>,
    },
}

pub(crate) struct PropertyInner {
    blueprint: Rc<Blueprint>,
    path: PropertyPath,
    parent: Weak<PropertyInner>,
    kind: PropertyKind,
    value: Observable<Value>,
    errors: Observable<Vec<ValidationError>>,
    rejected: RefCell<Option<Value>>,
}

/// Handle to a node of the property tree. Cloning shares the node.
#[derive(Clone)]
pub struct FormProperty {
    inner: Rc<PropertyInner>,
}

impl fmt::Debug for FormProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormProperty")
            .field("path", &self.inner.path.to_string())
            .field("value", &self.value())
            .finish()
    }
}

impl FormProperty {
    pub(crate) fn instantiate(
        blueprint: &Rc<Blueprint>,
        path: PropertyPath,
        parent: Weak<PropertyInner>,
    ) -> FormProperty {
        let inner = Rc::new_cyclic(|me: &Weak<PropertyInner>| {
            let kind = match blueprint.schema.schema_type() {
                SchemaType::Object => PropertyKind::Object(
                    blueprint
                        .children
                        .iter()
                        .map(|(key, child)| {
                            let child_path = path.push_property(key);
                            (key.clone(), FormProperty::instantiate(child, child_path, me.clone()))
                        })
                        .collect(),
                ),
                SchemaType::Array => match &blueprint.items {
                    Some(items) => PropertyKind::Array {
                        items: Rc::clone(items),
                        children: RefCell::new(Vec::new()),
                    },
                    None => PropertyKind::Leaf,
                },
                _ => PropertyKind::Leaf,
            };
            let initial = compose(&kind).unwrap_or(Value::Null);
            PropertyInner {
                blueprint: Rc::clone(blueprint),
                path,
                parent,
                kind,
                value: Observable::new(initial),
                errors: Observable::new(Vec::new()),
                rejected: RefCell::new(None),
            }
        });
        let property = FormProperty { inner };
        property.validate_self();
        property
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.inner.blueprint.schema
    }

    pub fn path(&self) -> &PropertyPath {
        &self.inner.path
    }

    /// Field name: schema name, else the last path segment.
    pub fn name(&self) -> String {
        if let Some(name) = &self.schema().name {
            return name.clone();
        }
        match self.inner.path.last() {
            Some(PathSegment::Property(key)) => key.clone(),
            Some(PathSegment::Index(idx)) => idx.to_string(),
            None => String::new(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.inner.blueprint.required
    }

    pub fn value(&self) -> Value {
        self.inner.value.get()
    }

    /// Own and descendant errors.
    pub fn errors(&self) -> Vec<ValidationError> {
        self.inner.errors.get()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.errors.with(|e| e.is_empty())
    }

    pub fn subscribe_value(&self, f: impl Fn(&Value) + 'static) -> Subscription {
        self.inner.value.subscribe(f)
    }

    pub fn subscribe_errors(&self, f: impl Fn(&Vec<ValidationError>) + 'static) -> Subscription {
        self.inner.errors.subscribe(f)
    }

    pub fn parent(&self) -> Option<FormProperty> {
        self.inner.parent.upgrade().map(|inner| FormProperty { inner })
    }

    pub fn root(&self) -> FormProperty {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.inner.kind, PropertyKind::Leaf)
    }

    /// Direct children in schema (or element) order.
    pub fn children(&self) -> Vec<FormProperty> {
        match &self.inner.kind {
            PropertyKind::Leaf => Vec::new(),
            PropertyKind::Object(children) => children.iter().map(|(_, c)| c.clone()).collect(),
            PropertyKind::Array { children, .. } => children.borrow().clone(),
        }
    }

    pub fn child(&self, segment: &PathSegment) -> Option<FormProperty> {
        match (&self.inner.kind, segment) {
            (PropertyKind::Object(children), PathSegment::Property(key)) => children
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, c)| c.clone()),
            (PropertyKind::Array { children, .. }, PathSegment::Index(idx)) => {
                children.borrow().get(*idx).cloned()
            }
            _ => None,
        }
    }

    /// Descendant at `path`, relative to this node.
    pub fn get_property(&self, path: &PropertyPath) -> Option<FormProperty> {
        path.segments()
            .try_fold(self.clone(), |node, segment| node.child(segment))
    }

    /// First node in depth-first order whose name is `name`.
    pub fn search_property(&self, name: &str) -> Option<FormProperty> {
        if self.name() == name {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.search_property(name))
    }

    /// Write a value (a user edit, or a programmatic set).
    ///
    /// The subtree takes the value and notifies; ancestors then recompute and
    /// notify once each.
    pub fn set_value(&self, value: Value) {
        self.assign(Some(&value), false);
        self.notify_tree();
        self.bubble();
    }

    /// Overwrite the value without recreating the node.
    ///
    /// With `emit_default`, absent leaves fall back to their schema `default`
    /// and every node in the subtree notifies. Without it, absent stays absent
    /// and only this node notifies.
    pub fn reset(&self, value: Option<&Value>, emit_default: bool) {
        self.assign(value, emit_default);
        if emit_default {
            self.notify_tree();
        } else {
            self.notify_self();
        }
        self.bubble();
    }

    /// Append an element to an array property. Returns the new element.
    pub fn add_item(&self, value: Option<Value>) -> Option<FormProperty> {
        let PropertyKind::Array { items, .. } = &self.inner.kind else {
            return None;
        };
        let mut elements = match self.value() {
            Value::Array(elements) => elements,
            _ => Vec::new(),
        };
        let element = value
            .or_else(|| items.schema.default.clone())
            .unwrap_or(Value::Null);
        elements.push(element);
        let index = elements.len() - 1;
        self.set_value(Value::Array(elements));
        self.child(&PathSegment::Index(index))
    }

    /// Remove an element from an array property.
    pub fn remove_item(&self, index: usize) -> bool {
        if !matches!(self.inner.kind, PropertyKind::Array { .. }) {
            return false;
        }
        let mut elements = match self.value() {
            Value::Array(elements) => elements,
            _ => return false,
        };
        if index >= elements.len() {
            return false;
        }
        elements.remove(index);
        self.set_value(Value::Array(elements));
        true
    }

    fn assign(&self, value: Option<&Value>, use_default: bool) {
        let value = value.filter(|v| !v.is_null());
        let fallback = if use_default {
            self.schema().default.as_ref()
        } else {
            None
        };
        let value = value.or(fallback);

        match &self.inner.kind {
            PropertyKind::Leaf => {
                self.inner
                    .value
                    .set_silent(value.cloned().unwrap_or(Value::Null));
            }
            PropertyKind::Object(children) => {
                let fields = self.accept(value, Value::is_object);
                for (key, child) in children {
                    child.assign(fields.and_then(|v| v.get(key)), use_default);
                }
            }
            PropertyKind::Array { items, children } => {
                let elements: Vec<Value> = self
                    .accept(value, Value::is_array)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let rebuilt: Vec<FormProperty> = elements
                    .iter()
                    .enumerate()
                    .map(|(idx, element)| {
                        let child = FormProperty::instantiate(
                            items,
                            self.inner.path.push_index(idx),
                            Rc::downgrade(&self.inner),
                        );
                        child.assign(Some(element), use_default);
                        child
                    })
                    .collect();
                *children.borrow_mut() = rebuilt;
            }
        }

        self.recompose();
        self.validate_self();
    }

    /// `value` if it has the container shape, else `None` with the value
    /// kept aside for validation.
    fn accept<'v>(&self, value: Option<&'v Value>, shape: fn(&Value) -> bool) -> Option<&'v Value> {
        let (accepted, rejected) = match value {
            Some(v) if !shape(v) => (None, Some(v.clone())),
            other => (other, None),
        };
        *self.inner.rejected.borrow_mut() = rejected;
        accepted
    }

    fn recompose(&self) {
        if let Some(value) = compose(&self.inner.kind) {
            self.inner.value.set_silent(value);
        }
    }

    fn validate_self(&self) {
        let value = self
            .inner
            .rejected
            .borrow()
            .clone()
            .unwrap_or_else(|| self.value());
        let blueprint = &self.inner.blueprint;
        let path = &self.inner.path;
        let path_str = path.to_string();

        let mut errors = blueprint.keywords.check(&value, path, blueprint.required);
        errors.extend(
            blueprint
                .validators
                .iter()
                .filter_map(|validator| validator.validate(&value, path)),
        );
        for error in errors.iter_mut() {
            if error.path.is_empty() {
                error.path = path_str.clone();
            }
        }
        for child in self.children() {
            errors.extend(child.errors());
        }
        self.inner.errors.set_silent(errors);
    }

    fn notify_self(&self) {
        self.inner.value.notify();
        self.inner.errors.notify();
    }

    fn notify_tree(&self) {
        self.notify_self();
        for child in self.children() {
            child.notify_tree();
        }
    }

    fn bubble(&self) {
        let mut current = self.parent();
        while let Some(node) = current {
            node.inner.rejected.replace(None);
            node.recompose();
            node.validate_self();
            node.notify_self();
            current = node.parent();
        }
    }
}

fn compose(kind: &PropertyKind) -> Option<Value> {
    match kind {
        PropertyKind::Leaf => None,
        PropertyKind::Object(children) => {
            let mut map = Map::new();
            for (key, child) in children {
                let value = child.value();
                if constraints::has_value(&value) {
                    map.insert(key.clone(), value);
                }
            }
            Some(Value::Object(map))
        }
        PropertyKind::Array { children, .. } => Some(Value::Array(
            children.borrow().iter().map(FormProperty::value).collect(),
        )),
    }
}
