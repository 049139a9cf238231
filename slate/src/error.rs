use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning a document tree back into text.
///
/// Deserialization never fails; malformed input degrades to an empty state.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no tag mapping for node type `{0}`")]
    UnmappedType(String),

    #[error("document nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
