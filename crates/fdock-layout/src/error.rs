use fdock_core::{CodecError, Version};
use fdock_split::SplitTreeError;
use thiserror::Error;

/// Errors raised while converting or (de)serializing layouts.
///
/// An unknown factory on the read side is not an error: the node keeps a
/// `None` layout and reconstruction skips it.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// No factory for the id. Fatal when writing: every element that is
    /// persisted must be understood by some factory.
    #[error("no factory registered for '{0}'")]
    MissingFactory(String),

    #[error("unsupported layout format version {found} (expected {expected})")]
    UnsupportedVersion { found: Version, expected: Version },

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A factory was handed an element it does not build, or a layout of a
    /// different factory.
    #[error("factory '{factory}' cannot handle this element")]
    ElementMismatch { factory: String },

    #[error("station rejected the operation: {0}")]
    Station(String),

    #[error(transparent)]
    Split(#[from] SplitTreeError),
}

impl LayoutError {
    pub(crate) fn mismatch(factory: &str) -> Self {
        Self::ElementMismatch {
            factory: factory.to_owned(),
        }
    }
}
