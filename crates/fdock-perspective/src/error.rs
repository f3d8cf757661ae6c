use fdock_core::CodecError;
use fdock_layout::LayoutError;
use thiserror::Error;

/// Errors raised while building, converting, or storing perspectives.
#[derive(Debug, Error)]
pub enum PerspectiveError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The mode-settings block is inconsistent (unknown mode name, a mode
    /// listed twice in one history).
    #[error("invalid mode settings: {0}")]
    InvalidModeSettings(String),

    #[error("no root station named '{0}'")]
    UnknownStation(String),

    #[error("no perspective named '{0}'")]
    UnknownPerspective(String),

    /// Only stations can be roots.
    #[error("element registered as root '{0}' is not a station")]
    NonRootStation(String),
}
