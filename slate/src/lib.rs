pub mod document;
pub mod error;
pub mod html;
pub mod plain;
mod text;

pub use document::{DocNode, Document, Leaf, Node};
pub use error::{Error, Result};
