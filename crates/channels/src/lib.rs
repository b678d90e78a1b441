//! Channel registry and version-negotiation handshake.
//!
//! Channels are registered once through a [`ChannelBuilder`]. At connection
//! time each peer sends the manifest produced by [`encode_manifest`] and
//! checks the one it receives with [`validate_as_client`] or
//! [`validate_as_server`]. While the client is still logging in, the server
//! collects early payloads with [`gather_login_payloads`].

pub mod builder;
pub mod error;
pub mod handshake;
pub mod instance;
pub mod login;
pub mod manifest;
pub mod name;
pub mod registry;
pub mod versions;

pub use {
    builder::ChannelBuilder,
    error::{Error, Result},
    handshake::{
        ChannelVerdict, ValidationReport, validate_as_client, validate_as_server,
        validate_channels,
    },
    instance::{ChannelInstance, LoginGatherer, VersionPredicate, VersionSupplier},
    login::{LoginPayload, LoginPayloadSink, gather_login_payloads},
    manifest::{decode_frame_or_manifest, decode_manifest, encode_frame, encode_manifest},
    name::{ChannelName, DEFAULT_NAMESPACE},
    netreg_protocol::{ABSENT, HandshakeManifest, NetworkDirection, Side},
    registry::ChannelRegistry,
};
