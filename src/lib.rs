//! # Formcast — schema introspection and form projection
//!
//! Formcast derives a declarative UI form description from an arbitrary,
//! possibly deeply nested, wrapped, and unioned data-shape schema — the kind
//! of serialized type descriptor a runtime validation library produces — with
//! no hand-written per-field mapping.
//!
//! ## Features
//!
//! - **Total reflection**: every introspection primitive degrades to a safe
//!   `None`/`[]`/fallback on unexpected shapes instead of panicking
//! - **Closed field-kind set** with an explicit classification precedence
//! - **Serializable wire types**: `FormFieldConfig` and `ValidationRules`
//!   carry no reference back to the source schema
//! - **Override tables**: per-field UI customization with an asymmetric merge
//!   that never silently deletes nested structure
//! - **Defaults**: fresh-form initial values, including discriminated-union
//!   branch selection
//! - **Bounded recursion**: depth-capped traversal with structured
//!   diagnostics instead of stack exhaustion
//!
//! ## Quick Start
//!
//! ```rust
//! use formcast::form::{project, FieldKind, ProjectOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "typeName": "object",
//!     "shape": {
//!         "name": {"typeName": "string"},
//!         "role": {"typeName": "enum", "values": ["lead", "support"]}
//!     }
//! });
//!
//! let fields = project(&schema, &ProjectOptions::default());
//! assert_eq!(fields.len(), 2);
//! assert_eq!(fields[1].kind, FieldKind::Radio);
//! ```
//!
//! ## Architecture
//!
//! Data flows one direction: the `schema` adapter and introspector feed the
//! kind mapper, validation extractor, and metadata extractor, which feed the
//! config builder, which feeds the defaults resolver. Nothing calls back up
//! the chain, and everything is synchronous and referentially transparent.

pub mod diagnostics;
pub mod form;
pub mod schema;

pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticsSink, RecordingSink, TracingSink};
pub use form::{
    defaults_for, merge_initial, project, FieldKind, FieldMetadata, FieldOption, FormFieldConfig,
    ProjectOptions, Projector, ValidationRules,
};
pub use schema::{SchemaNode, SchemaRegistry};
