//! Registry ↔ handshake manifest conversion.

use {
    netreg_protocol::{
        ABSENT, ChannelVersion, HandshakeFrame, HandshakeManifest, ProtocolError, Side,
    },
    tracing::{debug, warn},
};

use crate::{Result, registry::ChannelRegistry};

/// Build the manifest of every registered channel with its current version.
///
/// Each version supplier runs exactly once.
pub fn encode_manifest(registry: &ChannelRegistry) -> HandshakeManifest {
    let manifest: HandshakeManifest = registry
        .instances()
        .iter()
        .map(|instance| {
            let version = instance.network_protocol_version();
            if version == ABSENT {
                warn!(
                    channel = %instance.name(),
                    "version supplier returned the reserved absent sentinel"
                );
            }
            ChannelVersion::new(instance.name().to_string(), version)
        })
        .collect();
    debug!(channels = manifest.len(), "built channel manifest");
    manifest
}

/// Parse a bare manifest list received from a peer.
pub fn decode_manifest(bytes: &[u8]) -> Result<HandshakeManifest> {
    Ok(HandshakeManifest::from_bytes(bytes)?)
}

/// Encode the local manifest as the handshake frame `local` sends.
pub fn encode_frame(registry: &ChannelRegistry, local: Side) -> Result<Vec<u8>> {
    let frame = HandshakeFrame::from_side(local, encode_manifest(registry));
    Ok(frame.to_bytes()?)
}

/// Parse a received payload that is either a handshake frame or a bare list.
pub fn decode_frame_or_manifest(bytes: &[u8]) -> Result<HandshakeManifest> {
    match HandshakeFrame::from_bytes(bytes) {
        Ok(frame) => Ok(frame.into_manifest()),
        Err(ProtocolError::Json(_)) => decode_manifest(bytes),
        Err(e) => Err(e.into()),
    }
}

impl ChannelRegistry {
    /// See [`encode_manifest`].
    pub fn build_manifest(&self) -> HandshakeManifest {
        encode_manifest(self)
    }
}
