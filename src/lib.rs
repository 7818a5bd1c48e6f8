//! # Schema Forms
//!
//! Schema-driven forms: a JSON-like schema goes in, a live, validated form
//! comes out.
//!
//! ## Pipeline
//!
//! - **Preprocessing**: every schema node gets a type, a widget id, a unique
//!   `formId` and the `modelName` it binds to
//! - **Property tree**: one observable [`model::FormProperty`] per node,
//!   holding the current value and validation errors
//! - **Template building**: each node's widget renders its own fragment of a
//!   render tree; object and array widgets recurse into their children
//! - **Instantiation**: the render tree becomes a [`render::FormView`] bound
//!   to the property tree
//! - **Orchestration**: [`builder::FormBuilder`] drives all of the above from
//!   changed inputs and reports value, model and validity events
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use schema_forms::builder::{FormBuilder, FormChanges};
//! use schema_forms::domain::SchemaNode;
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let schema = SchemaNode::from_value(json!({
//!         "modelName": "m",
//!         "properties": { "name": { "type": "string" } }
//!     }))?;
//!
//!     let mut form = FormBuilder::new();
//!     let _valid = form.is_valid().subscribe(|valid| println!("valid: {}", valid));
//!     form.apply(FormChanges::new().schema(schema).model(json!({ "name": "Alice" })))?;
//!
//!     if let Some(view) = form.instance() {
//!         println!("{}", view.render());
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod domain;
pub mod model;
pub mod render;
pub mod widgets;

pub use builder::{BuilderState, FormBuilder, FormChanges};
pub use domain::{FormError, FormResult, SchemaNode, ValidationError};
pub use model::FormProperty;
