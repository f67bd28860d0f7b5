//! kset setters
//!
//! Marks fields of a multi-document YAML resource as named setters and
//! registers each setter's schema in a companion registry document.
//!
//! # Core Operations
//!
//! - **Resolve**: find every occurrence of the target field, by path or by value
//! - **Validate**: require all occurrences to hold the same value
//! - **Register**: synthesize the schema entry and upsert it into the registry
//! - **Annotate**: write `# {"$openapi":"<name>"}` on each field's line
//!
//! # Architecture
//!
//! ```text
//! DocumentSet ─→ resolve ─→ validate ─→ check_collision ─→ synthesize
//!                                                              │
//!          CreateOutcome ←─ annotate (copy) ←─ upsert_setter (copy)
//! ```
//!
//! # Example
//!
//! ```rust
//! use kset_doc::DocumentSet;
//! use kset_setters::{create_setter, CreateSetterRequest, Registry, RegistryLayout, SetterName};
//!
//! let resources = DocumentSet::parse("spec:\n  replicas: 3\n").unwrap();
//! let registry = Registry::parse("kind: Example\n", RegistryLayout::new()).unwrap();
//! let request = CreateSetterRequest::new(SetterName::new("replicas").unwrap()).with_value("3");
//!
//! let outcome = create_setter(&request, &resources, &registry).unwrap();
//! assert_eq!(
//!     outcome.resources.render(),
//!     "spec:\n  replicas: 3 # {\"$openapi\":\"replicas\"}\n"
//! );
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod annotate;
pub mod config;
pub mod create;
pub mod entity;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod types;
pub mod validate;

mod emit;

pub use annotate::annotate;
pub use config::RegistryLayout;
pub use create::{create_setter, CreateOutcome};
pub use entity::{
    CliExtension, EntityKind, RegistryEntity, SetterDefinition, SetterMeta, SubstitutionDefinition,
    SubstitutionMeta, SubstitutionValue,
};
pub use error::{SetterError, SetterResult, ValueShape};
pub use registry::{Registry, Upsert};
pub use resolve::resolve;
pub use schema::{synthesize, ConstraintFragment, RegistryEntry};
pub use types::{CreateSetterRequest, ResolvedField, SetterName, SetterType, SetterValue};
pub use validate::validate;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
