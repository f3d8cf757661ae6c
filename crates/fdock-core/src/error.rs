use thiserror::Error;

/// Framing and parsing failures shared by the binary and XML codecs.
///
/// Every variant is fatal for the read in progress: a stream that fails here
/// is considered corrupt and nothing decoded from it is exposed.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stream: {reason}")]
    MalformedStream { reason: String },

    #[error("payload of {len} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { len: u32, limit: u32 },

    #[error("XML error: {message}")]
    Xml { message: String },

    #[error("missing element <{name}> in <{parent}>")]
    MissingElement { parent: String, name: String },

    #[error("missing attribute '{name}' on <{element}>")]
    MissingAttribute { element: String, name: String },

    #[error("invalid value '{value}' for attribute '{name}' on <{element}>")]
    InvalidAttribute {
        element: String,
        name: String,
        value: String,
    },
}

impl CodecError {
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedStream {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn xml(message: impl std::fmt::Display) -> Self {
        Self::Xml {
            message: message.to_string(),
        }
    }

    /// Whether the failure means the stream ended or lied about its framing.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedStream { .. } | Self::PayloadTooLarge { .. }
        )
    }
}
