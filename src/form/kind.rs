//! Classification of a schema node into a UI field kind.

use crate::schema::{
    detect_tagged_id, get_array_element_type, get_enum_values, unwrap_all, SchemaNode,
};

use super::config::FieldKind;

/// Table reserved for uploaded binary blobs; references to it render as file
/// inputs rather than relationship pickers.
pub const BLOB_TABLE: &str = "_storage";

/// Enum members a radio group can hold before it becomes a select.
const RADIO_MAX_OPTIONS: usize = 3;

fn has_check(node: SchemaNode<'_>, wanted: &[&str]) -> bool {
    node.checks().iter().any(|check| {
        check
            .get("kind")
            .and_then(|k| k.as_str())
            .is_some_and(|k| wanted.contains(&k))
    })
}

fn has_iso_date_pattern(node: SchemaNode<'_>) -> bool {
    node.checks().iter().any(|check| {
        let is_regex = check
            .get("kind")
            .and_then(|k| k.as_str())
            .is_some_and(|k| k == "regex" || k == "pattern");
        if !is_regex {
            return false;
        }
        check
            .get("regex")
            .or_else(|| check.get("value"))
            .and_then(|v| v.as_str())
            .is_some_and(|pattern| pattern.contains(r"\d{4}-\d{2}-\d{2}"))
    })
}

fn classify_string(node: SchemaNode<'_>) -> FieldKind {
    if has_check(node, &["email"]) {
        FieldKind::Email
    } else if has_check(node, &["datetime", "date"]) || has_iso_date_pattern(node) {
        FieldKind::Date
    } else {
        FieldKind::Text
    }
}

fn classify_array(node: SchemaNode<'_>) -> FieldKind {
    let Some(element) = get_array_element_type(node) else {
        return FieldKind::Array;
    };
    let element = unwrap_all(element);
    if let Some(values) = get_enum_values(element) {
        if values.iter().all(|v| v.is_string()) {
            return FieldKind::Multiselect;
        }
    }
    match element.type_name() {
        Some("string") => FieldKind::Chips,
        _ => FieldKind::Array,
    }
}

/// Map a schema node to its UI field kind.
///
/// Precedence is load-bearing, first match wins:
/// 1. tagged id → relationship (file when it references the blob table)
/// 2. array → dispatch on the element type
/// 3. enum-like → radio up to three members, select beyond
/// 4. string → email/date by declared checks, else text
/// 5. number/boolean/date/object, falling back to text
///
/// A tagged id is stored as a string, so rule 1 must run before the string
/// heuristics of rule 4 ever see it.
pub fn classify(node: SchemaNode<'_>) -> FieldKind {
    if let Some(tagged) = detect_tagged_id(node) {
        return if tagged.table.as_deref() == Some(BLOB_TABLE) {
            FieldKind::File
        } else {
            FieldKind::Relationship
        };
    }

    let resolved = unwrap_all(node);

    if resolved.type_name() == Some("array") {
        return classify_array(resolved);
    }

    if let Some(values) = get_enum_values(resolved) {
        return if values.len() <= RADIO_MAX_OPTIONS {
            FieldKind::Radio
        } else {
            FieldKind::Select
        };
    }

    match resolved.type_name() {
        Some("string") => classify_string(resolved),
        Some("number") | Some("bigint") => FieldKind::Number,
        Some("boolean") => FieldKind::Checkbox,
        Some("date") => FieldKind::Date,
        Some("object") => FieldKind::Object,
        _ => FieldKind::Text,
    }
}
