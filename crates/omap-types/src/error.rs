use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid variant name {name:?}: {reason}")]
    InvalidVariantName { name: String, reason: String },

    /// A combine policy was requested where only merging is available.
    #[error("combine policy requires joinable values")]
    CombineUnsupported,
}
