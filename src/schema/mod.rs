//! Schema descriptor adapter and reflection primitives.

pub mod introspect;
pub mod node;
pub mod registry;

pub use introspect::{
    detect_tagged_id, get_array_element_type, get_discriminated_union_info, get_enum_values,
    get_object_shape, is_immediately_nullable, is_schema_node, presence_of, schema_node,
    schema_node_in, type_name_of, unwrap_all, unwrap_presence, DiscriminatedUnionInfo,
    PresenceFlags, TaggedId, UnionBranch,
};
pub use node::{PresenceKind, SchemaNode};
pub use registry::{RegistryError, SchemaRegistry};
