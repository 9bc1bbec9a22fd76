//! Initial values for a fresh form instance.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use crate::schema::{
    get_array_element_type, get_discriminated_union_info, get_enum_values, get_object_shape,
    presence_of, unwrap_all, SchemaNode,
};

use super::config::{FieldKind, FormFieldConfig};

fn primitive_default(node: SchemaNode<'_>) -> Option<Value> {
    if let Some(values) = get_enum_values(node) {
        // First declared literal; a single literal defaults to its value.
        return values.first().map(|v| (*v).clone());
    }
    match node.type_name()? {
        "string" => Some(Value::String(String::new())),
        "boolean" => Some(Value::Bool(false)),
        "object" => Some(Value::Object(Map::new())),
        // A number is never guessed; the field starts absent.
        _ => None,
    }
}

fn default_for_field(node: SchemaNode<'_>) -> Option<Value> {
    let resolved = unwrap_all(node);
    if get_array_element_type(resolved).is_some() || resolved.type_name() == Some("array") {
        return Some(Value::Array(Vec::new()));
    }
    primitive_default(resolved)
}

fn object_defaults(node: SchemaNode<'_>) -> Map<String, Value> {
    let mut defaults = Map::new();
    let Some(shape) = get_object_shape(node) else {
        return defaults;
    };
    for (name, child) in shape {
        // Optional fields stay absent so the UI can tell "untouched" from
        // "explicitly cleared".
        if !presence_of(child).required() {
            continue;
        }
        if let Some(value) = default_for_field(child) {
            defaults.insert(name.to_string(), value);
        }
    }
    defaults
}

/// Compute initial values for a fresh form over `node`.
///
/// For a discriminated union, `discriminator_tag` selects the branch: the
/// discriminator field is set to the tag and only the matching branch
/// contributes defaults. A plain object contributes defaults only for its
/// presence-required fields.
pub fn defaults_for(node: SchemaNode<'_>, discriminator_tag: Option<&str>) -> Value {
    let resolved = unwrap_all(node);

    if let Some(info) = get_discriminated_union_info(resolved) {
        let Some(tag) = discriminator_tag else {
            return Value::Object(Map::new());
        };
        let Some(branch) = info.options.iter().find(|b| b.tag == tag) else {
            return Value::Object(Map::new());
        };
        let mut defaults = object_defaults(unwrap_all(branch.schema));
        defaults.insert(
            info.discriminator.to_string(),
            Value::String(tag.to_string()),
        );
        return Value::Object(defaults);
    }

    Value::Object(object_defaults(resolved))
}

fn parse_date(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_rfc3339());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.to_string())
}

/// Merge caller-supplied initial data over computed defaults.
///
/// Only keys present in the known field set are copied; null values are
/// skipped; a string arriving for a date-typed field is parsed, and the
/// default is kept when it does not parse.
pub fn merge_initial(
    defaults: &Value,
    initial_data: &Value,
    fields: &[FormFieldConfig],
) -> Value {
    let mut merged = match defaults.as_object() {
        Some(map) => map.clone(),
        None => Map::new(),
    };
    let Some(initial) = initial_data.as_object() else {
        return Value::Object(merged);
    };

    for (key, value) in initial {
        let Some(field) = fields.iter().find(|f| &f.name == key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if field.kind == FieldKind::Date {
            if let Some(raw) = value.as_str() {
                if let Some(parsed) = parse_date(raw) {
                    merged.insert(key.clone(), Value::String(parsed));
                }
                // Unparseable date strings keep the default.
                continue;
            }
        }
        merged.insert(key.clone(), value.clone());
    }

    Value::Object(merged)
}
