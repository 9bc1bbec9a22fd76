//! Field metadata: descriptor parsing, label derivation, and override merging.
//!
//! Two metadata channels exist. The legacy channel is an inline descriptor
//! string on the schema node (`"label:Start Date|width:half"`), kept for
//! compatibility. The structured channel is a caller-supplied override table
//! keyed by field name, which is the recommended way to attach per-category
//! UI customization.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::schema::SchemaNode;

use super::config::{FieldOption, FormFieldConfig};

/// Caller-supplied per-field overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMetadata {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub component: Option<String>,
    pub options: Option<Vec<FieldOption>>,
    pub suggestions: Option<Vec<String>>,
    pub width: Option<String>,
    pub order: Option<i64>,
    pub group: Option<String>,
    pub read_only: Option<bool>,
    pub disabled: Option<bool>,
    /// Replaces the base config's nested fields only when explicitly set.
    pub fields: Option<Vec<FormFieldConfig>>,
    /// Extra renderer hints, deep-merged into the config's metadata bag.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn coerce(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                return Value::Number(int.into());
            }
            if let Ok(float) = raw.parse::<f64>() {
                if let Some(number) = Number::from_f64(float) {
                    return Value::Number(number);
                }
            }
            Value::String(raw.to_string())
        }
    }
}

/// Parse an inline descriptor string into structured metadata.
///
/// Segments are `|`-separated; each splits on the first `:` into key/value.
/// Numeric-looking values become numbers, `true`/`false` become booleans,
/// everything else stays a string. A segment without a `:` is skipped.
pub fn parse_descriptor(raw: &str) -> Map<String, Value> {
    let mut parsed = Map::new();
    for segment in raw.split('|') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        parsed.insert(key.to_string(), coerce(value.trim()));
    }
    parsed
}

/// Derive a human-readable label from a field name: a space before each
/// capital, underscores to spaces, first character capitalized.
pub fn humanize(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch == '_' {
            label.push(' ');
        } else if ch.is_uppercase() && !label.is_empty() && !label.ends_with(' ') {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => label,
    }
}

/// Label for a field: an explicit `label:` descriptor entry wins, otherwise
/// the label is derived from the field name.
pub fn extract_label(field_name: &str, node: Option<SchemaNode<'_>>) -> String {
    if let Some(node) = node {
        let descriptor = node
            .description()
            .map(parse_descriptor)
            .unwrap_or_default();
        if let Some(Value::String(label)) = descriptor.get("label") {
            return label.clone();
        }
    }
    humanize(field_name)
}

fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Apply one override entry to a config, producing a new config.
///
/// The merge is deliberately asymmetric: label/placeholder/help text/
/// component are shallow-replaced, the metadata bag is deep-merged, and
/// nested `fields` are replaced only when the override explicitly provides
/// them — otherwise the base config's nested structure is preserved
/// untouched.
pub fn merge_overrides(config: &FormFieldConfig, overrides: &FieldMetadata) -> FormFieldConfig {
    let mut merged = config.clone();

    if let Some(label) = &overrides.label {
        merged.label = label.clone();
    }
    if let Some(placeholder) = &overrides.placeholder {
        merged.placeholder = Some(placeholder.clone());
    }
    if let Some(help_text) = &overrides.help_text {
        merged.help_text = Some(help_text.clone());
    }
    if let Some(component) = &overrides.component {
        merged.component = Some(component.clone());
    }
    if let Some(options) = &overrides.options {
        merged.options = Some(options.clone());
    }
    if let Some(fields) = &overrides.fields {
        merged.fields = Some(fields.clone());
    }

    let mut bag = Map::new();
    if let Some(suggestions) = &overrides.suggestions {
        bag.insert(
            "suggestions".into(),
            Value::Array(suggestions.iter().map(|s| Value::String(s.clone())).collect()),
        );
    }
    if let Some(width) = &overrides.width {
        bag.insert("width".into(), Value::String(width.clone()));
    }
    if let Some(order) = overrides.order {
        bag.insert("order".into(), Value::Number(order.into()));
    }
    if let Some(group) = &overrides.group {
        bag.insert("group".into(), Value::String(group.clone()));
    }
    if let Some(read_only) = overrides.read_only {
        bag.insert("readOnly".into(), Value::Bool(read_only));
    }
    if let Some(disabled) = overrides.disabled {
        bag.insert("disabled".into(), Value::Bool(disabled));
    }
    deep_merge(&mut bag, &overrides.extra);
    deep_merge(&mut merged.metadata, &bag);

    merged
}
