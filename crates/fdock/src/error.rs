use fdock_core::CodecError;
use fdock_layout::LayoutError;
use fdock_perspective::PerspectiveError;
use thiserror::Error;

/// Errors raised by [`crate::Control`].
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Perspective(#[from] PerspectiveError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("no layout named '{0}'")]
    UnknownLayout(String),

    /// The name is taken by a multiple-dockable factory or a stock factory.
    #[error("factory '{0}' is already registered")]
    DuplicateFactory(String),

    #[error("no multiple-dockable factory named '{0}'")]
    UnknownFactory(String),

    #[error("a dockable with unique id '{0}' already exists")]
    DuplicateDockable(String),

    #[error("no dockable with unique id '{0}'")]
    UnknownDockable(String),

    #[error("no root station named '{0}'")]
    UnknownRoot(String),

    #[error("root station '{0}' already exists")]
    DuplicateRoot(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl ControlError {
    /// Whether the error is the caller naming something that does not exist,
    /// as opposed to a failed conversion or a broken stream.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::UnknownLayout(_)
                | Self::UnknownFactory(_)
                | Self::UnknownDockable(_)
                | Self::UnknownRoot(_)
        )
    }
}
