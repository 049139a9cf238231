//! HTML to document tree conversion and back.
//!
//! Deserialization is driven by [`ClassificationTables`], which callers may
//! override per call. Serialization always uses the default element table, so
//! node types that only exist in custom tables cannot be written back.

mod deserialize;
pub mod dom;
mod serialize;
pub mod tables;

pub use deserialize::{deserialize, deserialize_with};
pub use dom::Element;
pub use serialize::{serialize, serialize_value};
pub use tables::{ClassificationOverrides, ClassificationTables, ElementType, NodeHook};

/// Deepest block nesting either direction will walk.
pub const MAX_DEPTH: usize = 256;
