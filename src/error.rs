use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KDStoreError {
    /// The tree was configured with fewer than one axis.
    #[error("Tree arity must be at least 1, got {0}")]
    InvalidArity(usize),

    /// A key or bound has a different number of coordinates than the tree.
    #[error("Key has {actual} coordinates when the tree expects {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A fully specified key was required but a wildcard coordinate was supplied.
    #[error("Cannot store a partial key")]
    PartialKeyRejected,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Tree is empty")]
    EmptyTree,

    /// Distance requested between points of different arity.
    #[error("Points have different sizes: {left} and {right}")]
    PointSizeMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, KDStoreError>;
