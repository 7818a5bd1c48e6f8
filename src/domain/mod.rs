use serde_json::Value;
use std::rc::Rc;

pub mod error;
pub mod path;
pub mod schema;

pub use error::{FormError, FormResult, ValidationError};
pub use path::{PathSegment, PropertyPath};
pub use schema::{ButtonSpec, LengthBound, SchemaNode, SchemaType, WidgetInfo, DEFAULT_MODEL_NAME};

use crate::model::FormProperty;

/// Host-supplied check on a single field value.
///
/// Returning `None` means the value passes. The returned error's path is
/// filled in by the property the validator is attached to.
pub trait Validator {
    fn validate(&self, value: &Value, path: &PropertyPath) -> Option<ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Value, &PropertyPath) -> Option<ValidationError>,
{
    fn validate(&self, value: &Value, path: &PropertyPath) -> Option<ValidationError> {
        self(value, path)
    }
}

/// Host-supplied callback triggered by a form button.
pub trait Action {
    fn run(&self, form: &FormProperty, parameters: Option<&Value>);
}

impl<F> Action for F
where
    F: Fn(&FormProperty, Option<&Value>),
{
    fn run(&self, form: &FormProperty, parameters: Option<&Value>) {
        self(form, parameters)
    }
}

pub type SharedValidator = Rc<dyn Validator>;
pub type SharedAction = Rc<dyn Action>;

/// Supplier of unique identifiers. No ordering guarantee beyond uniqueness.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}
