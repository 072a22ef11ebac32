use omap_types::TypeError;

/// Errors from object map construction and configuration.
///
/// Lookups and removals never fail: a missing entry is reported as `None`.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The configuration could not be parsed or is inconsistent.
    #[error("invalid map configuration: {0}")]
    Config(String),

    /// A type-level precondition was violated at runtime, e.g. a combine
    /// policy handed to a map of merge-only values.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for object map operations.
pub type MapResult<T> = Result<T, MapError>;
