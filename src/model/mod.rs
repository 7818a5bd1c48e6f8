//! Form model: schema preprocessing, property trees and the registries they
//! draw validators and actions from.

pub mod constraints;
pub mod factory;
pub mod ids;
pub mod observable;
pub mod preprocessor;
pub mod property;
pub mod registry;

pub use factory::FormPropertyFactory;
pub use ids::{ProcessIdGenerator, SequentialIdGenerator};
pub use observable::{EventEmitter, Observable, Subscription};
pub use preprocessor::SchemaPreprocessor;
pub use property::FormProperty;
pub use registry::{ActionRegistry, Registry, ValidatorRegistry};

#[cfg(test)]
mod property_test;
