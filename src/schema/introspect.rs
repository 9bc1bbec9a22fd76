//! Total reflection primitives over [`SchemaNode`].
//!
//! Every function here is pure and never panics: an unexpected shape always
//! degrades to `None`/`false`/empty. A single malformed field must never
//! take down the projection of an unrelated part of a form, so nothing in
//! this module propagates errors upward.

use std::collections::HashSet;

use serde_json::Value;

use super::node::{PresenceKind, SchemaNode};
use super::SchemaRegistry;

/// Presence semantics accumulated over a node's wrapper chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceFlags {
    pub optional: bool,
    pub nullable: bool,
    pub has_default: bool,
}

impl PresenceFlags {
    /// A field is required unless its wrapper chain marks it optional or
    /// gives it a default. Nullable alone does not clear required: the value
    /// may be null but the key must still be present.
    pub fn required(&self) -> bool {
        !(self.optional || self.has_default)
    }
}

/// Branded-reference detection result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedId {
    /// Referenced table/collection, when the brand declares one.
    pub table: Option<String>,
}

/// One resolved branch of a tagged union.
#[derive(Debug, Clone, Copy)]
pub struct UnionBranch<'a> {
    pub tag: &'a str,
    pub schema: SchemaNode<'a>,
}

/// Discriminator plus the ordered branches it selects among.
#[derive(Debug, Clone)]
pub struct DiscriminatedUnionInfo<'a> {
    pub discriminator: &'a str,
    pub options: Vec<UnionBranch<'a>>,
}

/// Structural guard re-exported at the introspection surface.
pub fn is_schema_node(value: &Value) -> bool {
    super::node::is_schema_value(value)
}

/// Wrap a raw descriptor for introspection.
pub fn schema_node(value: &Value) -> Option<SchemaNode<'_>> {
    SchemaNode::new(value)
}

/// Wrap a raw descriptor whose `$ref` nodes resolve against `registry`.
pub fn schema_node_in<'a>(
    value: &'a Value,
    registry: &'a SchemaRegistry,
) -> Option<SchemaNode<'a>> {
    SchemaNode::with_registry(value, registry)
}

/// Canonical type tag of a node, or `None` if it is not introspectable.
pub fn type_name_of(node: SchemaNode<'_>) -> Option<&str> {
    node.type_name()
}

fn next_inner<'a>(node: SchemaNode<'a>, peel_indirection: bool) -> Option<SchemaNode<'a>> {
    if node.presence_kind().is_some() {
        return node.wrapper_inner();
    }
    if !peel_indirection {
        return None;
    }
    if node.is_indirection() {
        return node.wrapper_inner().or_else(|| node.generic_inner());
    }
    if node.is_terminal() || node.type_name().is_none() {
        return None;
    }
    // Unknown wrapper kind: follow the first recognized inner-type property.
    node.generic_inner()
}

fn unwrap_chain<'a>(
    node: SchemaNode<'a>,
    peel_indirection: bool,
    mut observe: impl FnMut(SchemaNode<'a>),
) -> SchemaNode<'a> {
    let mut current = node.resolve();
    let mut visited = HashSet::new();
    visited.insert(current.id());
    loop {
        observe(current);
        let Some(next) = next_inner(current, peel_indirection) else {
            return current;
        };
        let next = next.resolve();
        // Repeat visit means a self-referential schema: stop at the last
        // distinct node instead of looping.
        if !visited.insert(next.id()) {
            return current;
        }
        current = next;
    }
}

/// Peel presence wrappers (optional/nullable/default) until a non-presence
/// node remains.
pub fn unwrap_presence(node: SchemaNode<'_>) -> SchemaNode<'_> {
    unwrap_chain(node, false, |_| {})
}

/// Peel presence wrappers and behavioral indirection (branded, effects,
/// pipelines, unknown wrapper kinds) down to the structural node.
pub fn unwrap_all(node: SchemaNode<'_>) -> SchemaNode<'_> {
    unwrap_chain(node, true, |_| {})
}

/// Presence semantics across the whole wrapper chain, indirection included,
/// so `Branded(Optional(String))` still reads as optional.
pub fn presence_of(node: SchemaNode<'_>) -> PresenceFlags {
    let mut flags = PresenceFlags::default();
    unwrap_chain(node, true, |n| match n.presence_kind() {
        Some(PresenceKind::Optional) => flags.optional = true,
        Some(PresenceKind::Nullable) => flags.nullable = true,
        Some(PresenceKind::HasDefault) => flags.has_default = true,
        None => {}
    });
    flags
}

/// Whether the immediate outer node (before any unwrapping) is the nullable
/// wrapper. The serialized validation record reports only this layer.
pub fn is_immediately_nullable(node: SchemaNode<'_>) -> bool {
    node.resolve().presence_kind() == Some(PresenceKind::Nullable)
}

fn description_tagged_table(description: &str) -> Option<String> {
    let rest = description.split("taggedId:").nth(1)?;
    let table = rest.split('|').next().unwrap_or("").trim();
    if table.is_empty() {
        None
    } else {
        Some(table.to_string())
    }
}

/// Recognize a branded reference type anywhere in the wrapper chain.
///
/// Resolution order per node: the brand-side marker field carrying a table
/// name, then out-of-band registry metadata, then a `taggedId:<table>`
/// pattern in the description string.
pub fn detect_tagged_id(node: SchemaNode<'_>) -> Option<TaggedId> {
    let mut found = None;
    unwrap_chain(node, true, |n| {
        if found.is_some() {
            return;
        }
        if let Some(table) = n.brand_table() {
            found = Some(TaggedId {
                table: Some(table.to_string()),
            });
        } else if let Some(table) = n.metadata_table() {
            found = Some(TaggedId {
                table: Some(table.to_string()),
            });
        } else if let Some(table) = n.description().and_then(description_tagged_table) {
            found = Some(TaggedId { table: Some(table) });
        }
    });
    found
}

/// Ordered literal values of an enum-like node (enum, native enum, or a
/// single literal); `None` otherwise.
pub fn get_enum_values(node: SchemaNode<'_>) -> Option<Vec<&Value>> {
    node.resolve().enum_members()
}

/// Element node of an array-like node; `None` otherwise.
pub fn get_array_element_type(node: SchemaNode<'_>) -> Option<SchemaNode<'_>> {
    node.resolve().element()
}

/// Ordered name→child mapping of an object-like node; `None` (never a panic)
/// when every access strategy fails.
pub fn get_object_shape(node: SchemaNode<'_>) -> Option<Vec<(&str, SchemaNode<'_>)>> {
    node.resolve().object_shape()
}

fn branch_tag<'a>(discriminator: &str, branch: SchemaNode<'a>) -> Option<&'a Value> {
    let shape = get_object_shape(branch)?;
    let (_, tag_node) = shape.into_iter().find(|(name, _)| *name == discriminator)?;
    unwrap_all(tag_node).literal_value()
}

/// Resolve the branches of a tagged union, whether stored as a keyed map or
/// as a list of object schemas each carrying a literal discriminator field.
/// Returns `None` when zero branches resolve.
pub fn get_discriminated_union_info(node: SchemaNode<'_>) -> Option<DiscriminatedUnionInfo<'_>> {
    let node = node.resolve();
    let discriminator = node.discriminator()?;
    let mut options = Vec::new();
    for (tag, branch) in node.union_branches()? {
        let tag = match tag {
            Some(tag) => Some(tag),
            None => branch_tag(discriminator, branch).and_then(Value::as_str),
        };
        if let Some(tag) = tag {
            options.push(UnionBranch {
                tag,
                schema: branch,
            });
        }
    }
    if options.is_empty() {
        None
    } else {
        Some(DiscriminatedUnionInfo {
            discriminator,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: &Value) -> SchemaNode<'_> {
        SchemaNode::new(value).unwrap()
    }

    #[test]
    fn test_unwrap_presence_peels_stacked_wrappers() {
        let raw = json!({
            "typeName": "optional",
            "innerType": {
                "typeName": "nullable",
                "innerType": {"typeName": "string"}
            }
        });
        assert_eq!(unwrap_presence(node(&raw)).type_name(), Some("string"));
    }

    #[test]
    fn test_unwrap_presence_stops_at_branded() {
        let raw = json!({
            "typeName": "optional",
            "innerType": {"typeName": "branded", "innerType": {"typeName": "string"}}
        });
        assert_eq!(unwrap_presence(node(&raw)).type_name(), Some("branded"));
        assert_eq!(unwrap_all(node(&raw)).type_name(), Some("string"));
    }

    #[test]
    fn test_unwrap_all_follows_unknown_wrapper() {
        let raw = json!({
            "typeName": "someFutureWrapper",
            "innerType": {"typeName": "number"}
        });
        assert_eq!(unwrap_all(node(&raw)).type_name(), Some("number"));
    }

    #[test]
    fn test_cyclic_ref_terminates_at_last_distinct_node() {
        let mut registry = SchemaRegistry::new();
        registry
            .insert(
                "Loop",
                json!({"typeName": "optional", "innerType": {"$ref": "Loop"}}),
            )
            .unwrap();
        let raw = json!({"$ref": "Loop"});
        let start = SchemaNode::with_registry(&raw, &registry).unwrap();

        let end = unwrap_all(start);
        assert_eq!(end.type_name(), Some("optional"));
    }

    #[test]
    fn test_presence_laws() {
        let bare = json!({"typeName": "string"});
        let optional = json!({"typeName": "optional", "innerType": {"typeName": "string"}});
        let nullable = json!({"typeName": "nullable", "innerType": {"typeName": "string"}});
        let with_default = json!({
            "typeName": "default",
            "defaultValue": "x",
            "innerType": {"typeName": "string"}
        });

        assert!(presence_of(node(&bare)).required());
        assert!(!presence_of(node(&optional)).required());
        assert!(presence_of(node(&nullable)).required());
        assert!(!presence_of(node(&with_default)).required());
    }

    #[test]
    fn test_presence_seen_through_indirection() {
        let raw = json!({
            "typeName": "branded",
            "innerType": {
                "typeName": "optional",
                "innerType": {"typeName": "string"}
            }
        });
        let flags = presence_of(node(&raw));
        assert!(flags.optional);
        assert!(!flags.required());
    }

    #[test]
    fn test_immediate_nullability_only() {
        let outer_nullable = json!({"typeName": "nullable", "innerType": {"typeName": "string"}});
        let inner_nullable = json!({
            "typeName": "optional",
            "innerType": {"typeName": "nullable", "innerType": {"typeName": "string"}}
        });
        assert!(is_immediately_nullable(node(&outer_nullable)));
        assert!(!is_immediately_nullable(node(&inner_nullable)));
    }

    #[test]
    fn test_detect_tagged_id_resolution_order() {
        let brand = json!({
            "typeName": "branded",
            "brand": {"table": "projects"},
            "description": "taggedId:ignored",
            "innerType": {"typeName": "string"}
        });
        assert_eq!(
            detect_tagged_id(node(&brand)).unwrap().table.as_deref(),
            Some("projects")
        );

        let metadata = json!({
            "typeName": "string",
            "metadata": {"table": "users"}
        });
        assert_eq!(
            detect_tagged_id(node(&metadata)).unwrap().table.as_deref(),
            Some("users")
        );

        let description = json!({
            "typeName": "string",
            "description": "label:Owner|taggedId:members|width:half"
        });
        assert_eq!(
            detect_tagged_id(node(&description)).unwrap().table.as_deref(),
            Some("members")
        );

        let plain = json!({"typeName": "string"});
        assert!(detect_tagged_id(node(&plain)).is_none());
    }

    #[test]
    fn test_tagged_id_under_optional_wrapper() {
        let raw = json!({
            "typeName": "optional",
            "innerType": {
                "typeName": "branded",
                "brand": {"table": "tasks"},
                "innerType": {"typeName": "string"}
            }
        });
        assert!(detect_tagged_id(node(&raw)).is_some());
    }

    #[test]
    fn test_discriminated_union_from_options_map() {
        let raw = json!({
            "typeName": "discriminatedUnion",
            "discriminator": "kind",
            "optionsMap": {
                "a": {"typeName": "object", "shape": {"kind": {"typeName": "literal", "value": "a"}}},
                "b": {"typeName": "object", "shape": {"kind": {"typeName": "literal", "value": "b"}}}
            }
        });
        let info = get_discriminated_union_info(node(&raw)).unwrap();
        assert_eq!(info.discriminator, "kind");
        assert_eq!(info.options.len(), 2);
        assert_eq!(info.options[0].tag, "a");
        assert_eq!(info.options[1].tag, "b");
    }

    #[test]
    fn test_discriminated_union_from_branch_list() {
        let raw = json!({
            "typeName": "discriminatedUnion",
            "discriminator": "kind",
            "options": [
                {"typeName": "object", "shape": {
                    "kind": {"typeName": "literal", "value": "email"},
                    "address": {"typeName": "string"}
                }},
                {"typeName": "object", "shape": {
                    "kind": {"typeName": "literal", "value": "sms"},
                    "number": {"typeName": "string"}
                }}
            ]
        });
        let info = get_discriminated_union_info(node(&raw)).unwrap();
        assert_eq!(info.options[0].tag, "email");
        assert_eq!(info.options[1].tag, "sms");
    }

    #[test]
    fn test_discriminated_union_zero_branches_is_none() {
        let raw = json!({
            "typeName": "discriminatedUnion",
            "discriminator": "kind",
            "options": [{"typeName": "object", "shape": {"other": {"typeName": "string"}}}]
        });
        assert!(get_discriminated_union_info(node(&raw)).is_none());
    }
}
