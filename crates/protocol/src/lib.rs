//! Handshake wire definitions for channel negotiation.
//!
//! Each peer sends one frame during connection setup listing every channel it
//! has registered together with that channel's protocol version:
//! - `channel_list`: server to client
//! - `channel_list_reply`: client to server
//!
//! Frames are JSON. The channel list itself is a plain array of
//! `{"name": ..., "version": ...}` records and can also travel bare.

pub mod direction;
pub mod error;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use {
    direction::{NetworkDirection, Side},
    error::{ProtocolError, Result},
};

// ── Constants ────────────────────────────────────────────────────────────────

/// Version passed to acceptance predicates when the remote peer has no entry
/// for a channel. Never a legitimate version string; decoding rejects
/// manifests that carry it.
pub const ABSENT: &str = "ABSENT \u{1F914}";

/// Largest manifest payload accepted from a peer.
pub const MAX_MANIFEST_BYTES: usize = 262_144; // 256 KB

/// Returns `true` if `version` is the absent sentinel.
#[must_use]
pub fn is_absent(version: &str) -> bool {
    version == ABSENT
}

// ── Manifest ─────────────────────────────────────────────────────────────────

/// One `(channel, version)` record of a handshake manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelVersion {
    /// Canonical `namespace:path` channel name.
    pub name: String,
    pub version: String,
}

impl ChannelVersion {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Ordered list of channel versions exchanged during the handshake.
///
/// Order reflects the sender's registry and carries no meaning for the
/// receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandshakeManifest {
    entries: Vec<ChannelVersion>,
}

impl HandshakeManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.entries.push(ChannelVersion::new(name, version));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChannelVersion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Version advertised for `name`, if the sender listed it.
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.version.as_str())
    }

    /// Serialize as a bare JSON array.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.entries)?)
    }

    /// Parse a bare JSON array received from a peer.
    ///
    /// Unknown channel names are kept. Duplicate names and the reserved
    /// absent version are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_size(bytes)?;
        let manifest: Self = serde_json::from_slice(bytes)?;
        manifest.check()?;
        Ok(manifest)
    }

    fn check(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ProtocolError::duplicate_channel(&entry.name));
            }
            if is_absent(&entry.version) {
                return Err(ProtocolError::reserved_version(&entry.name));
            }
        }
        Ok(())
    }
}

impl FromIterator<ChannelVersion> for HandshakeManifest {
    fn from_iter<I: IntoIterator<Item = ChannelVersion>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a HandshakeManifest {
    type Item = &'a ChannelVersion;
    type IntoIter = std::slice::Iter<'a, ChannelVersion>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn check_size(bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_MANIFEST_BYTES {
        return Err(ProtocolError::TooLarge {
            size: bytes.len(),
            max: MAX_MANIFEST_BYTES,
        });
    }
    Ok(())
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// Handshake frame, sent once per direction before normal traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandshakeFrame {
    /// Server → client: the server's channels.
    ChannelList { channels: HandshakeManifest },
    /// Client → server: the client's channels, sent after it accepted the
    /// server's list.
    ChannelListReply { channels: HandshakeManifest },
}

impl HandshakeFrame {
    /// Frame a local manifest for sending from `side`.
    pub fn from_side(side: Side, channels: HandshakeManifest) -> Self {
        match side {
            Side::Server => Self::ChannelList { channels },
            Side::Client => Self::ChannelListReply { channels },
        }
    }

    /// The side that sent this frame.
    pub fn origin(&self) -> Side {
        match self {
            Self::ChannelList { .. } => Side::Server,
            Self::ChannelListReply { .. } => Side::Client,
        }
    }

    pub fn manifest(&self) -> &HandshakeManifest {
        match self {
            Self::ChannelList { channels } | Self::ChannelListReply { channels } => channels,
        }
    }

    pub fn into_manifest(self) -> HandshakeManifest {
        match self {
            Self::ChannelList { channels } | Self::ChannelListReply { channels } => channels,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a frame received from a peer, applying the same checks as
    /// [`HandshakeManifest::from_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_size(bytes)?;
        let frame: Self = serde_json::from_slice(bytes)?;
        frame.manifest().check()?;
        Ok(frame)
    }
}
