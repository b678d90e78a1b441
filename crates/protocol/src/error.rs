/// Crate-wide result type for wire decoding.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while decoding a handshake payload received from a peer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The payload is not valid JSON or does not match the frame shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The payload exceeds [`crate::MAX_MANIFEST_BYTES`].
    #[error("manifest of {size} bytes exceeds limit of {max}")]
    TooLarge { size: usize, max: usize },

    /// The same channel name appears more than once in one manifest.
    #[error("channel {name} listed more than once in manifest")]
    DuplicateChannel { name: String },

    /// A peer advertised the reserved absent sentinel as a real version.
    #[error("channel {name} advertised the reserved absent version")]
    ReservedVersion { name: String },
}

impl ProtocolError {
    #[must_use]
    pub fn duplicate_channel(name: impl std::fmt::Display) -> Self {
        Self::DuplicateChannel {
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn reserved_version(name: impl std::fmt::Display) -> Self {
        Self::ReservedVersion {
            name: name.to_string(),
        }
    }
}
