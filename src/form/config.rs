//! Wire types consumed by form renderers.
//!
//! `FormFieldConfig` and `ValidationRules` are the only artifacts that cross
//! a process or cache boundary, so both are plain serializable data with no
//! reference back to the schema descriptor they were derived from.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of UI input kinds a schema node can project to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Select,
    Multiselect,
    Checkbox,
    Radio,
    Date,
    Chips,
    Combobox,
    Relationship,
    File,
    Object,
    Array,
}

/// One selectable option of a select/radio/multiselect field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
}

/// Engine-agnostic validation record, decoupled from the live descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    pub required: bool,
    /// Lower-cased canonical type tag with wrapper prefixes stripped.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<bool>,
}

/// Declarative description of one form input, derived from a schema node.
///
/// `name` is the dotted path from the form root; nested structure lives under
/// `fields` and is never flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldConfig {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    pub validation: ValidationRules,
    /// Nested configs; present only for object and array-of-object fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FormFieldConfig>>,
    /// Referenced table of a relationship field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_table: Option<String>,
    /// Renderer component override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Open key→value bag for renderer hints (width, order, group, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl FormFieldConfig {
    /// Minimal config used as the starting point by the builder.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: true,
            placeholder: None,
            help_text: None,
            options: None,
            validation: ValidationRules::default(),
            fields: None,
            related_table: None,
            component: None,
            metadata: Map::new(),
        }
    }
}
