//! Recursive projection of an object schema into an ordered config tree.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticsSink, TracingSink};
use crate::schema::{
    detect_tagged_id, get_array_element_type, get_enum_values, get_object_shape, presence_of,
    unwrap_all, SchemaNode, SchemaRegistry,
};

use super::config::{FieldKind, FieldOption, FormFieldConfig};
use super::kind::classify;
use super::metadata::{humanize, merge_overrides, parse_descriptor, FieldMetadata};
use super::validation;

/// Maximum nesting depth a projection will walk. Shapes beyond the cap are
/// dropped with a warning; a depth-capped tree is still a usable form.
pub const MAX_DEPTH: usize = 10;

/// Descriptor keys consumed into dedicated config slots rather than the
/// metadata bag.
const CONSUMED_DESCRIPTOR_KEYS: &[&str] = &["label", "placeholder", "helpText", "component", "taggedId"];

/// Caller-facing knobs for one projection.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Whitelist of top-level field names; applied first when present.
    pub include: Option<Vec<String>>,
    /// Blacklist of top-level field names; applied after `include` and may
    /// remove names `include` selected.
    pub exclude: Option<Vec<String>>,
    /// Per-field overrides, keyed by top-level field name.
    pub overrides: HashMap<String, FieldMetadata>,
}

/// Projection entry point carrying the diagnostics sink.
///
/// Stateless apart from the sink; one projector can serve any number of
/// schemas, and identical inputs always produce identical output.
#[derive(Clone)]
pub struct Projector {
    sink: Arc<dyn DiagnosticsSink>,
}

impl Default for Projector {
    fn default() -> Self {
        Self {
            sink: Arc::new(TracingSink),
        }
    }
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom diagnostics sink, e.g. a recording sink in tests.
    pub fn with_sink(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { sink }
    }

    /// Project a raw schema descriptor into an ordered list of field configs.
    ///
    /// A value that is not descriptor-shaped degrades to `[]` with a warning;
    /// this is the one uniform failure contract of the whole engine.
    pub fn project(&self, schema: &Value, options: &ProjectOptions) -> Vec<FormFieldConfig> {
        match SchemaNode::new(schema) {
            Some(node) => self.project_node(node, options),
            None => {
                self.sink.report(Diagnostic::warn(
                    "",
                    "project() called with a value that is not a schema node",
                ));
                Vec::new()
            }
        }
    }

    /// Like [`Self::project`], resolving `$ref` nodes against `registry`.
    pub fn project_in(
        &self,
        schema: &Value,
        registry: &SchemaRegistry,
        options: &ProjectOptions,
    ) -> Vec<FormFieldConfig> {
        match SchemaNode::with_registry(schema, registry) {
            Some(node) => self.project_node(node, options),
            None => {
                self.sink.report(Diagnostic::warn(
                    "",
                    "project() called with a value that is not a schema node",
                ));
                Vec::new()
            }
        }
    }

    fn project_node(
        &self,
        node: SchemaNode<'_>,
        options: &ProjectOptions,
    ) -> Vec<FormFieldConfig> {
        let resolved = unwrap_all(node);
        let mut fields = if get_object_shape(resolved).is_some() {
            self.build(resolved, "", 0)
        } else {
            // A single non-object schema still projects, as one synthetic
            // field named `value`.
            vec![self.build_field("value", "value", node, 0)]
        };

        if let Some(include) = &options.include {
            fields.retain(|f| include.iter().any(|name| name == &f.name));
        }
        if let Some(exclude) = &options.exclude {
            fields.retain(|f| !exclude.iter().any(|name| name == &f.name));
        }

        fields
            .iter()
            .map(|field| match options.overrides.get(&field.name) {
                Some(meta) => merge_overrides(field, meta),
                None => field.clone(),
            })
            .collect()
    }

    /// Walk an object node into its ordered field configs.
    ///
    /// Nested structure stays under `fields`; the returned list is never
    /// flattened.
    pub fn build(
        &self,
        node: SchemaNode<'_>,
        parent_path: &str,
        depth: usize,
    ) -> Vec<FormFieldConfig> {
        if depth > MAX_DEPTH {
            self.sink.report(Diagnostic::warn(
                parent_path,
                format!("recursion depth {depth} exceeds the cap of {MAX_DEPTH}, subtree dropped"),
            ));
            return Vec::new();
        }
        let Some(shape) = get_object_shape(node) else {
            self.sink.report(Diagnostic::debug(
                parent_path,
                "node has no resolvable object shape",
            ));
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut configs = Vec::with_capacity(shape.len());
        for (name, child) in shape {
            if !seen.insert(name) {
                self.sink.report(Diagnostic::debug(
                    parent_path,
                    format!("duplicate sibling field '{name}' skipped"),
                ));
                continue;
            }
            let full_path = if parent_path.is_empty() {
                name.to_string()
            } else {
                format!("{parent_path}.{name}")
            };
            configs.push(self.build_field(name, &full_path, child, depth));
        }
        configs
    }

    fn build_field(
        &self,
        name: &str,
        full_path: &str,
        node: SchemaNode<'_>,
        depth: usize,
    ) -> FormFieldConfig {
        let kind = classify(node);
        let resolved = unwrap_all(node);

        let descriptor = node
            .description()
            .or_else(|| resolved.description())
            .map(parse_descriptor)
            .unwrap_or_default();

        let label = match descriptor.get("label").and_then(Value::as_str) {
            Some(label) => label.to_string(),
            None => humanize(name),
        };

        let mut config = FormFieldConfig::new(full_path, label, kind);
        config.required = presence_of(node).required();
        config.validation = validation::extract(node);
        config.placeholder = descriptor
            .get("placeholder")
            .and_then(Value::as_str)
            .map(str::to_string);
        config.help_text = descriptor
            .get("helpText")
            .and_then(Value::as_str)
            .map(str::to_string);
        config.component = descriptor
            .get("component")
            .and_then(Value::as_str)
            .map(str::to_string);
        for (key, value) in &descriptor {
            if !CONSUMED_DESCRIPTOR_KEYS.contains(&key.as_str()) {
                config.metadata.insert(key.clone(), value.clone());
            }
        }

        match kind {
            FieldKind::Relationship | FieldKind::File => {
                config.related_table = detect_tagged_id(node).and_then(|t| t.table);
            }
            FieldKind::Radio | FieldKind::Select => {
                config.options = enum_options(resolved);
            }
            FieldKind::Multiselect => {
                config.options = get_array_element_type(resolved)
                    .map(unwrap_all)
                    .and_then(enum_options);
            }
            FieldKind::Object => {
                config.fields = Some(self.build(resolved, full_path, depth + 1));
            }
            FieldKind::Array => {
                if let Some(element) = get_array_element_type(resolved).map(unwrap_all) {
                    if get_object_shape(element).is_some() {
                        let element_path = format!("{full_path}[0]");
                        config.fields = Some(self.build(element, &element_path, depth + 1));
                    }
                }
            }
            _ => {}
        }

        config
    }
}

fn enum_options(node: SchemaNode<'_>) -> Option<Vec<FieldOption>> {
    let values = get_enum_values(node)?;
    let options = values
        .into_iter()
        .map(|value| FieldOption {
            label: match value.as_str() {
                Some(s) => humanize(s),
                None => value.to_string(),
            },
            value: value.clone(),
        })
        .collect();
    Some(options)
}

/// Project with the default tracing-backed diagnostics sink.
pub fn project(schema: &Value, options: &ProjectOptions) -> Vec<FormFieldConfig> {
    Projector::new().project(schema, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;
    use serde_json::json;

    fn person_schema() -> Value {
        json!({
            "typeName": "object",
            "shape": {
                "name": {"typeName": "string"},
                "age": {"typeName": "optional", "innerType": {"typeName": "number"}},
                "role": {"typeName": "enum", "values": ["lead", "support"]}
            }
        })
    }

    #[test]
    fn test_end_to_end_projection() {
        let fields = project(&person_schema(), &ProjectOptions::default());
        assert_eq!(fields.len(), 3);

        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[0].kind, FieldKind::Text);
        assert!(fields[0].required);

        assert_eq!(fields[1].name, "age");
        assert_eq!(fields[1].kind, FieldKind::Number);
        assert!(!fields[1].required);

        assert_eq!(fields[2].name, "role");
        assert_eq!(fields[2].kind, FieldKind::Radio);
        let options = fields[2].options.as_ref().unwrap();
        assert_eq!(options[0].label, "Lead");
        assert_eq!(options[0].value, json!("lead"));
        assert_eq!(options[1].label, "Support");
    }

    #[test]
    fn test_non_schema_input_degrades_with_warning() {
        let sink = Arc::new(RecordingSink::new());
        let projector = Projector::with_sink(sink.clone());

        let fields = projector.project(&json!(42), &ProjectOptions::default());
        assert!(fields.is_empty());
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_non_object_root_projects_synthetic_value_field() {
        let raw = json!({"typeName": "optional", "innerType": {"typeName": "string"}});
        let fields = project(&raw, &ProjectOptions::default());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "value");
        assert_eq!(fields[0].kind, FieldKind::Text);
        assert!(!fields[0].required);
    }

    #[test]
    fn test_include_then_exclude() {
        let options = ProjectOptions {
            include: Some(vec!["name".into(), "role".into()]),
            exclude: Some(vec!["role".into()]),
            ..Default::default()
        };
        let fields = project(&person_schema(), &options);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "name");
    }

    #[test]
    fn test_overrides_applied_per_field() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "name".to_string(),
            FieldMetadata {
                label: Some("Full Name".into()),
                placeholder: Some("Jane Doe".into()),
                ..Default::default()
            },
        );
        let options = ProjectOptions {
            overrides,
            ..Default::default()
        };

        let fields = project(&person_schema(), &options);
        assert_eq!(fields[0].label, "Full Name");
        assert_eq!(fields[0].placeholder.as_deref(), Some("Jane Doe"));
        assert_eq!(fields[1].label, "Age");
    }

    #[test]
    fn test_nested_object_builds_subtree() {
        let raw = json!({
            "typeName": "object",
            "shape": {
                "address": {
                    "typeName": "object",
                    "shape": {
                        "street": {"typeName": "string"},
                        "city": {"typeName": "string"}
                    }
                }
            }
        });
        let fields = project(&raw, &ProjectOptions::default());
        assert_eq!(fields[0].kind, FieldKind::Object);
        let nested = fields[0].fields.as_ref().unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].name, "address.street");
        assert_eq!(nested[1].name, "address.city");
    }

    #[test]
    fn test_array_of_object_uses_indexed_path() {
        let raw = json!({
            "typeName": "object",
            "shape": {
                "contacts": {
                    "typeName": "array",
                    "element": {
                        "typeName": "object",
                        "shape": {"email": {"typeName": "string", "checks": [{"kind": "email"}]}}
                    }
                }
            }
        });
        let fields = project(&raw, &ProjectOptions::default());
        assert_eq!(fields[0].kind, FieldKind::Array);
        let nested = fields[0].fields.as_ref().unwrap();
        assert_eq!(nested[0].name, "contacts[0].email");
        assert_eq!(nested[0].kind, FieldKind::Email);
    }

    #[test]
    fn test_depth_cap_drops_subtree_with_warning() {
        // Build a schema nested 12 objects deep.
        let mut schema = json!({"typeName": "string"});
        for level in (0..12).rev() {
            let key = format!("level{level}");
            schema = json!({
                "typeName": "object",
                "shape": {(key): schema}
            });
        }

        let sink = Arc::new(RecordingSink::new());
        let projector = Projector::with_sink(sink.clone());
        let fields = projector.project(&schema, &ProjectOptions::default());

        // The top of the tree still projects.
        assert_eq!(fields.len(), 1);
        assert!(sink
            .warnings()
            .iter()
            .any(|d| d.message.contains("recursion depth")));

        // The capped branch is empty rather than missing entirely.
        let mut cursor = &fields[0];
        let mut depth = 0;
        while let Some(children) = cursor.fields.as_ref().and_then(|f| f.first()) {
            cursor = children;
            depth += 1;
        }
        assert!(cursor.fields.as_ref().is_some_and(|f| f.is_empty()));
        assert!(depth <= MAX_DEPTH);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let first = project(&person_schema(), &ProjectOptions::default());
        let second = project(&person_schema(), &ProjectOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_descriptor_metadata_lands_in_config() {
        let raw = json!({
            "typeName": "object",
            "shape": {
                "start": {
                    "typeName": "string",
                    "description": "label:Start Date|placeholder:2024-01-01|width:half",
                    "checks": [{"kind": "datetime"}]
                }
            }
        });
        let fields = project(&raw, &ProjectOptions::default());
        assert_eq!(fields[0].label, "Start Date");
        assert_eq!(fields[0].kind, FieldKind::Date);
        assert_eq!(fields[0].placeholder.as_deref(), Some("2024-01-01"));
        assert_eq!(fields[0].metadata["width"], json!("half"));
    }
}
