//! The concrete adapter over a validation library's serialized descriptor.
//!
//! A schema node arrives as an opaque `serde_json::Value` — the internal type
//! representation of a third-party, version-sensitive schema library. All
//! duck-typed probing of that representation is confined to this module:
//! which key holds the inner type of a wrapper, which access strategies yield
//! an object shape, where brand metadata lives. Everything above this layer
//! works against the [`SchemaNode`] handle and never touches raw keys.
//!
//! All accessors are total: any shape this adapter does not recognize yields
//! `None`, never a panic.

use serde_json::{Map, Value};

use super::registry::SchemaRegistry;

/// Wrapper type names that only add presence semantics around an inner type.
const PRESENCE_WRAPPERS: &[&str] = &["optional", "nullable", "default"];

/// Wrapper type names that add behavior but not structure.
const INDIRECTION_WRAPPERS: &[&str] = &["branded", "pipeline", "effects", "readonly", "catch", "lazy"];

/// Keys tried, in order, when following an unknown wrapper to its inner type.
const INNER_KEYS: &[&str] = &["innerType", "schema", "in", "out", "type"];

/// Type names that are structural leaves or compounds, never wrappers.
/// Unwrapping stops here even when one of the generic inner keys is present.
const TERMINAL_TYPES: &[&str] = &[
    "string", "number", "bigint", "boolean", "date", "literal", "enum", "nativeEnum", "object",
    "array", "tuple", "record", "map", "set", "union", "discriminatedUnion", "any", "unknown",
    "null", "undefined", "void", "never",
];

/// Presence semantics a wrapper can add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceKind {
    /// Key may be absent.
    Optional,
    /// Value may be null; the key must still be present.
    Nullable,
    /// Key may be absent; the library fills in a declared default.
    HasDefault,
}

/// Borrowed handle over one schema descriptor, carrying the registry used to
/// resolve `$ref` nodes. `Copy` so traversals can pass it by value.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    value: &'a Value,
    registry: Option<&'a SchemaRegistry>,
}

/// Structural test: does this value look like a schema descriptor at all?
///
/// A descriptor is an object with a string `typeName`, or a one-key `$ref`
/// object naming a registry definition.
pub fn is_schema_value(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => {
            matches!(map.get("typeName"), Some(Value::String(_)))
                || (map.len() == 1 && matches!(map.get("$ref"), Some(Value::String(_))))
        }
        None => false,
    }
}

impl<'a> SchemaNode<'a> {
    /// Wrap a raw descriptor, or `None` if it is not descriptor-shaped.
    pub fn new(value: &'a Value) -> Option<Self> {
        is_schema_value(value).then_some(Self {
            value,
            registry: None,
        })
    }

    /// Wrap a raw descriptor that may contain `$ref` nodes into `registry`.
    pub fn with_registry(value: &'a Value, registry: &'a SchemaRegistry) -> Option<Self> {
        is_schema_value(value).then_some(Self {
            value,
            registry: Some(registry),
        })
    }

    /// The underlying raw descriptor.
    pub fn raw(&self) -> &'a Value {
        self.value
    }

    /// Stable identity for cycle guards: the address of the backing value.
    pub fn id(&self) -> usize {
        self.value as *const Value as usize
    }

    /// Follow `$ref` indirection until a concrete descriptor is reached.
    ///
    /// Unresolvable or cyclic reference chains stop at the last node reached
    /// rather than erroring; the depth guard covers registries whose
    /// definitions reference each other.
    pub fn resolve(self) -> Self {
        let mut current = self;
        let mut hops = 0usize;
        while let Some(name) = current.ref_name() {
            let Some(target) = current.registry.and_then(|r| r.get(name)) else {
                return current;
            };
            current = Self {
                value: target,
                registry: current.registry,
            };
            hops += 1;
            if hops > 32 {
                return current;
            }
        }
        current
    }

    fn ref_name(&self) -> Option<&'a str> {
        let map = self.value.as_object()?;
        if map.len() == 1 {
            map.get("$ref")?.as_str()
        } else {
            None
        }
    }

    fn object(&self) -> Option<&'a Map<String, Value>> {
        self.resolve().value.as_object()
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.object()?.get(key)
    }

    /// Canonical type tag, or `None` when the node is not introspectable.
    pub fn type_name(&self) -> Option<&'a str> {
        self.get("typeName")?.as_str()
    }

    /// Free-text description attached to the node, if any.
    pub fn description(&self) -> Option<&'a str> {
        self.get("description")?.as_str()
    }

    /// Ordered constraint checks declared on the node.
    pub fn checks(&self) -> &'a [Value] {
        self.get("checks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Presence semantics, when this node is a presence wrapper.
    pub fn presence_kind(&self) -> Option<PresenceKind> {
        match self.type_name()? {
            "optional" => Some(PresenceKind::Optional),
            "nullable" => Some(PresenceKind::Nullable),
            "default" => Some(PresenceKind::HasDefault),
            _ => None,
        }
    }

    /// Whether this node is a non-presence wrapper (branded, effects, ...).
    pub fn is_indirection(&self) -> bool {
        self.type_name()
            .is_some_and(|t| INDIRECTION_WRAPPERS.contains(&t))
    }

    /// Whether this node is a structural leaf/compound that unwrapping must
    /// not look through.
    pub fn is_terminal(&self) -> bool {
        self.type_name().is_some_and(|t| TERMINAL_TYPES.contains(&t))
    }

    /// Inner type of a known wrapper (presence or indirection).
    pub fn wrapper_inner(&self) -> Option<SchemaNode<'a>> {
        let name = self.type_name()?;
        if !PRESENCE_WRAPPERS.contains(&name) && !INDIRECTION_WRAPPERS.contains(&name) {
            return None;
        }
        // `pipeline` projects its input side: that is the shape a form edits.
        let keys: &[&str] = match name {
            "effects" | "lazy" => &["schema", "innerType"],
            "pipeline" => &["in", "out"],
            _ => &["innerType", "schema", "type"],
        };
        self.first_child(keys)
    }

    /// Fallback for wrapper kinds this adapter has never seen: follow the
    /// first recognized inner-type property.
    pub fn generic_inner(&self) -> Option<SchemaNode<'a>> {
        self.first_child(INNER_KEYS)
    }

    fn first_child(&self, keys: &[&str]) -> Option<SchemaNode<'a>> {
        keys.iter().find_map(|key| self.child(key))
    }

    fn child(&self, key: &str) -> Option<SchemaNode<'a>> {
        let value = self.get(key)?;
        is_schema_value(value).then_some(SchemaNode {
            value,
            registry: self.registry,
        })
    }

    fn adopt(&self, value: &'a Value) -> Option<SchemaNode<'a>> {
        is_schema_value(value).then_some(SchemaNode {
            value,
            registry: self.registry,
        })
    }

    /// Declared default of a `default` wrapper.
    pub fn default_value(&self) -> Option<&'a Value> {
        self.get("defaultValue")
    }

    /// Literal value of a `literal` node.
    pub fn literal_value(&self) -> Option<&'a Value> {
        if self.type_name()? == "literal" {
            self.get("value")
        } else {
            None
        }
    }

    /// Declared enum members, in declaration order.
    ///
    /// Covers `enum` (value list), `nativeEnum` (name→value map or list), and
    /// a single `literal`.
    pub fn enum_members(&self) -> Option<Vec<&'a Value>> {
        let members: Vec<&Value> = match self.type_name()? {
            "enum" => self.get("values")?.as_array()?.iter().collect(),
            "nativeEnum" => match self.get("values")? {
                Value::Object(map) => map.values().collect(),
                Value::Array(list) => list.iter().collect(),
                _ => return None,
            },
            "literal" => vec![self.get("value")?],
            _ => return None,
        };
        if members.is_empty() {
            None
        } else {
            Some(members)
        }
    }

    /// Element node of an array-like node.
    pub fn element(&self) -> Option<SchemaNode<'a>> {
        if self.type_name()? != "array" {
            return None;
        }
        self.first_child(&["element", "items"])
    }

    /// Ordered name→child mapping of an object-like node.
    ///
    /// Several access strategies are tried in order, covering the descriptor
    /// layouts observed across library versions: `shape` as a map, `entries`
    /// as a map, `properties` as a map, and `shape` as a list of
    /// `[name, node]` pairs. Children that are not descriptor-shaped are
    /// skipped.
    pub fn object_shape(&self) -> Option<Vec<(&'a str, SchemaNode<'a>)>> {
        if self.type_name().is_some_and(|t| t != "object") {
            return None;
        }
        for key in ["shape", "entries", "properties"] {
            if let Some(Value::Object(map)) = self.get(key) {
                let entries = map
                    .iter()
                    .filter_map(|(name, value)| {
                        self.adopt(value).map(|node| (name.as_str(), node))
                    })
                    .collect();
                return Some(entries);
            }
        }
        if let Some(Value::Array(pairs)) = self.get("shape") {
            let entries: Vec<(&str, SchemaNode)> = pairs
                .iter()
                .filter_map(|pair| {
                    let pair = pair.as_array()?;
                    let name = pair.first()?.as_str()?;
                    let node = self.adopt(pair.get(1)?)?;
                    Some((name, node))
                })
                .collect();
            return Some(entries);
        }
        None
    }

    /// Discriminator field name of a tagged union.
    pub fn discriminator(&self) -> Option<&'a str> {
        self.get("discriminator")?.as_str()
    }

    /// Raw branch descriptors of a union, whether stored as a keyed map
    /// (tag → schema) or as a plain branch list.
    pub fn union_branches(&self) -> Option<Vec<(Option<&'a str>, SchemaNode<'a>)>> {
        let name = self.type_name()?;
        if name != "union" && name != "discriminatedUnion" {
            return None;
        }
        if let Some(Value::Object(map)) = self.get("optionsMap") {
            let branches = map
                .iter()
                .filter_map(|(tag, value)| {
                    self.adopt(value).map(|node| (Some(tag.as_str()), node))
                })
                .collect();
            return Some(branches);
        }
        if let Some(Value::Array(options)) = self.get("options") {
            let branches = options
                .iter()
                .filter_map(|value| self.adopt(value).map(|node| (None, node)))
                .collect();
            return Some(branches);
        }
        None
    }

    /// Brand marker table name of a `branded` node, if declared.
    pub fn brand_table(&self) -> Option<&'a str> {
        if self.type_name()? != "branded" {
            return None;
        }
        self.get("brand")?.get("table")?.as_str()
    }

    /// Out-of-band registry metadata attached to the node.
    pub fn metadata_table(&self) -> Option<&'a str> {
        self.get("metadata")?.get("table")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guard_accepts_descriptor_shapes() {
        assert!(is_schema_value(&json!({"typeName": "string"})));
        assert!(is_schema_value(&json!({"$ref": "User"})));
        assert!(!is_schema_value(&json!({"$ref": "User", "other": 1})));
        assert!(!is_schema_value(&json!("string")));
        assert!(!is_schema_value(&json!({"type": "string"})));
        assert!(!is_schema_value(&json!(null)));
    }

    #[test]
    fn test_ref_resolution() {
        let mut registry = SchemaRegistry::new();
        registry.insert("Name", json!({"typeName": "string"})).unwrap();
        let raw = json!({"$ref": "Name"});

        let node = SchemaNode::with_registry(&raw, &registry).unwrap();
        assert_eq!(node.type_name(), Some("string"));
    }

    #[test]
    fn test_unresolvable_ref_degrades() {
        let registry = SchemaRegistry::new();
        let raw = json!({"$ref": "Missing"});

        let node = SchemaNode::with_registry(&raw, &registry).unwrap();
        assert_eq!(node.type_name(), None);
        assert!(node.object_shape().is_none());
    }

    #[test]
    fn test_shape_strategies() {
        let shape_map = json!({"typeName": "object", "shape": {"a": {"typeName": "string"}}});
        let entries_map = json!({"typeName": "object", "entries": {"a": {"typeName": "string"}}});
        let properties = json!({"typeName": "object", "properties": {"a": {"typeName": "string"}}});
        let pair_list = json!({
            "typeName": "object",
            "shape": [["a", {"typeName": "string"}], ["b", {"typeName": "number"}]]
        });

        for raw in [&shape_map, &entries_map, &properties] {
            let node = SchemaNode::new(raw).unwrap();
            let shape = node.object_shape().unwrap();
            assert_eq!(shape.len(), 1);
            assert_eq!(shape[0].0, "a");
        }

        let node = SchemaNode::new(&pair_list).unwrap();
        let shape = node.object_shape().unwrap();
        assert_eq!(shape.len(), 2);
        assert_eq!(shape[1].0, "b");
    }

    #[test]
    fn test_shape_skips_non_descriptor_children() {
        let raw = json!({
            "typeName": "object",
            "shape": {"good": {"typeName": "string"}, "bad": 42}
        });
        let node = SchemaNode::new(&raw).unwrap();
        let shape = node.object_shape().unwrap();
        assert_eq!(shape.len(), 1);
        assert_eq!(shape[0].0, "good");
    }

    #[test]
    fn test_enum_members_ordering() {
        let raw = json!({"typeName": "enum", "values": ["b", "a", "c"]});
        let node = SchemaNode::new(&raw).unwrap();
        let members = node.enum_members().unwrap();
        assert_eq!(members, vec![&json!("b"), &json!("a"), &json!("c")]);
    }

    #[test]
    fn test_native_enum_map_values() {
        let raw = json!({"typeName": "nativeEnum", "values": {"Lead": "lead", "Support": "support"}});
        let node = SchemaNode::new(&raw).unwrap();
        let members = node.enum_members().unwrap();
        assert_eq!(members, vec![&json!("lead"), &json!("support")]);
    }

    #[test]
    fn test_wrapper_inner_and_generic_fallback() {
        let optional = json!({"typeName": "optional", "innerType": {"typeName": "number"}});
        let node = SchemaNode::new(&optional).unwrap();
        assert_eq!(node.wrapper_inner().unwrap().type_name(), Some("number"));

        let unknown = json!({"typeName": "futureWrapper", "innerType": {"typeName": "string"}});
        let node = SchemaNode::new(&unknown).unwrap();
        assert!(node.wrapper_inner().is_none());
        assert_eq!(node.generic_inner().unwrap().type_name(), Some("string"));
    }

    #[test]
    fn test_terminal_never_unwraps_through_type_key() {
        // An object node may carry stray keys named like inner-type keys;
        // terminals must not be treated as wrappers.
        let raw = json!({"typeName": "object", "shape": {}, "type": {"typeName": "string"}});
        let node = SchemaNode::new(&raw).unwrap();
        assert!(node.is_terminal());
        assert!(node.wrapper_inner().is_none());
    }
}
