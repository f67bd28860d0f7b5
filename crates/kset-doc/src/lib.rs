//! kset document layer
//!
//! Format-preserving editing of multi-document YAML sources.
//!
//! # Core Operations
//!
//! - **Load**: split a source on `---` into [`Document`]s, each keeping its raw
//!   text next to the parsed `serde_yaml::Value`
//! - **Address**: [`FieldPath`] selects values and locates their source lines
//! - **Edit**: set trailing line comments or splice whole lines, leaving every
//!   other byte untouched
//! - **Render**: re-join documents with their original separators
//!
//! # Architecture
//!
//! ```text
//! text → DocumentSet ─┬─ Document.value   (serde_yaml, semantics)
//!                     └─ Document.body    (raw lines, Layout → NodeSpan → edits)
//! ```
//!
//! # Example
//!
//! ```rust
//! use kset_doc::DocumentSet;
//!
//! let mut set = DocumentSet::parse("spec:\n  replicas: 3\n").unwrap();
//! let path = "spec.replicas".parse().unwrap();
//! set.get_mut(0).unwrap().set_line_comment(&path, "note").unwrap();
//! assert_eq!(set.render(), "spec:\n  replicas: 3 # note\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod comment;
pub mod document;
pub mod error;
pub mod layout;
pub mod path;
pub mod value;

pub use document::{Document, DocumentSet};
pub use error::DocError;
pub use layout::{Layout, LocateFailure, NodeSpan};
pub use path::{FieldPath, PathError, PathSegment};
pub use value::{scalar_text, untag};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
