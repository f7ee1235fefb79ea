//! OntoUML Core - Element model and typed attribute validation.
//!
//! Elements carry identity and timestamps ([`BaseElement`]), naming metadata
//! ([`NamedElement`]) and, for projects, publication metadata ([`Project`]).
//! Every write by attribute name goes through [`validate_and_set`], which
//! checks the value against a [`TypeDescriptor`] before mutating anything.

pub mod clock;
pub mod config;
pub mod element;
pub mod error;
pub mod id;
pub mod langstring;
pub mod named;
pub mod project;
pub mod validation;
pub mod value;

// Re-exports for convenience
pub use clock::{Clock, SystemClock};
pub use config::ModelConfig;
pub use element::{BaseElement, ElementContext};
pub use error::{ConfigError, ModelError};
pub use id::{ElementId, IdGenerator, RandomIds};
pub use langstring::LangString;
pub use named::{NamedElement, NamedElementInit, NAMING_ATTRIBUTES};
pub use project::{OntologyRepresentationStyle, Project, ProjectInit};
pub use validation::{validate, validate_and_set, AttributeSpec, Attributes, TypeDescriptor};
pub use value::{FromValue, Value, ValueKind};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
#[cfg(any(test, feature = "test-utils"))]
pub use id::SequentialIds;
