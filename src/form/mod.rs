//! Form projection: field kinds, wire configs, overrides, and defaults.

pub mod builder;
pub mod config;
pub mod defaults;
pub mod kind;
pub mod metadata;
pub mod validation;

pub use builder::{project, ProjectOptions, Projector, MAX_DEPTH};
pub use config::{FieldKind, FieldOption, FormFieldConfig, ValidationRules};
pub use defaults::{defaults_for, merge_initial};
pub use kind::{classify, BLOB_TABLE};
pub use metadata::{extract_label, merge_overrides, parse_descriptor, FieldMetadata};
pub use validation::extract as extract_validation;
