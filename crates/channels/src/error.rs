use netreg_protocol::ProtocolError;

/// Crate-wide result type for channel registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors raised by the registry, builder and manifest codec.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A channel name could not be parsed.
    #[error("invalid channel name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A channel with this name is already registered.
    #[error("network channel {name} already registered")]
    AlreadyRegistered { name: String },

    /// The builder was asked to register a channel without one of its
    /// negotiation behaviours.
    #[error("channel {name} is missing its {missing}")]
    IncompleteChannel { name: String, missing: &'static str },

    /// A received handshake payload could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl Error {
    #[must_use]
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    #[must_use]
    pub fn already_registered(name: impl std::fmt::Display) -> Self {
        Self::AlreadyRegistered {
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn incomplete(name: impl std::fmt::Display, missing: &'static str) -> Self {
        Self::IncompleteChannel {
            name: name.to_string(),
            missing,
        }
    }
}
