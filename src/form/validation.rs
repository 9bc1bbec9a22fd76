//! Translation of schema constraints into the serializable validation record.

use serde_json::Value;

use crate::schema::{
    get_enum_values, is_immediately_nullable, presence_of, unwrap_all, SchemaNode,
};

use super::config::ValidationRules;

fn check_number(check: &Value) -> Option<f64> {
    check.get("value")?.as_f64()
}

fn check_length(check: &Value) -> Option<u64> {
    check.get("value")?.as_u64()
}

fn check_pattern(check: &Value) -> Option<String> {
    check
        .get("regex")
        .or_else(|| check.get("value"))?
        .as_str()
        .map(str::to_string)
}

fn apply_check(rules: &mut ValidationRules, check: &Value, is_string: bool) {
    let Some(kind) = check.get("kind").and_then(|k| k.as_str()) else {
        return;
    };
    match kind {
        // On strings, min/max constrain length; on numbers, the value.
        "min" | "gte" if is_string => rules.min_length = check_length(check),
        "max" | "lte" if is_string => rules.max_length = check_length(check),
        "min" | "gte" => rules.min = check_number(check),
        "max" | "lte" => rules.max = check_number(check),
        "minLength" | "min_length" => rules.min_length = check_length(check),
        "maxLength" | "max_length" => rules.max_length = check_length(check),
        "length" => {
            rules.min_length = check_length(check);
            rules.max_length = check_length(check);
        }
        "email" => rules.email = Some(true),
        "regex" | "pattern" => rules.pattern = check_pattern(check),
        "datetime" | "date" => rules.datetime = Some(true),
        // Unrecognized check kinds are ignored, not errors.
        _ => {}
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract the validation record for one schema node.
///
/// The result retains no reference to the descriptor and is the only
/// artifact allowed to cross a process or cache boundary.
pub fn extract(node: SchemaNode<'_>) -> ValidationRules {
    let flags = presence_of(node);
    let resolved = unwrap_all(node);
    let kind = resolved
        .type_name()
        .unwrap_or("unknown")
        .to_ascii_lowercase();
    let is_string = kind == "string";

    let mut rules = ValidationRules {
        required: flags.required(),
        kind,
        ..Default::default()
    };

    if is_immediately_nullable(node) {
        rules.nullable = Some(true);
    }

    for check in resolved.checks() {
        apply_check(&mut rules, check, is_string);
    }

    if let Some(values) = get_enum_values(resolved) {
        rules.enum_values = Some(values.iter().map(|v| stringify(v)).collect());
    }

    rules
}
