//! Login-phase payload gathering.
//!
//! Before a connection leaves the login phase the server asks every channel
//! for payloads the client must receive first. Only
//! [`NetworkDirection::LoginToClient`] gathers anything.

use {
    bytes::Bytes,
    netreg_protocol::NetworkDirection,
    tracing::{debug, trace},
};

#[cfg(feature = "metrics")]
use netreg_metrics::{counter, login as login_metrics};

use crate::{name::ChannelName, registry::ChannelRegistry};

/// Outbound data for one channel, delivered during the login phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPayload {
    channel: ChannelName,
    data: Bytes,
    context: String,
}

impl LoginPayload {
    pub fn new(channel: ChannelName, data: impl Into<Bytes>, context: impl Into<String>) -> Self {
        Self {
            channel,
            data: data.into(),
            context: context.into(),
        }
    }

    /// Channel that receives the payload on the remote side.
    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Free-form label for logging.
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Collects the payloads a single login gatherer produces.
pub struct LoginPayloadSink<'a> {
    channel: &'a ChannelName,
    payloads: Vec<LoginPayload>,
}

impl<'a> LoginPayloadSink<'a> {
    pub(crate) fn new(channel: &'a ChannelName) -> Self {
        Self {
            channel,
            payloads: Vec::new(),
        }
    }

    /// Channel whose gatherer is running.
    pub fn channel(&self) -> &ChannelName {
        self.channel
    }

    /// Queue a payload for the gathering channel.
    pub fn push(&mut self, data: impl Into<Bytes>, context: impl Into<String>) {
        self.payloads
            .push(LoginPayload::new(self.channel.clone(), data, context));
    }

    /// Queue a payload addressed to any channel.
    pub fn push_payload(&mut self, payload: LoginPayload) {
        self.payloads.push(payload);
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub(crate) fn into_payloads(self) -> Vec<LoginPayload> {
        self.payloads
    }
}

/// Gather login payloads from every registered channel for `direction`.
///
/// Payloads keep registry order across channels and contribution order
/// within a channel. Directions other than `LoginToClient` yield nothing and
/// run no gatherers.
pub fn gather_login_payloads(
    registry: &ChannelRegistry,
    direction: NetworkDirection,
) -> Vec<LoginPayload> {
    if direction != NetworkDirection::LoginToClient {
        trace!(%direction, "login payloads are only gathered for login-to-client");
        return Vec::new();
    }

    let mut gathered = Vec::new();
    let mut failures = 0;
    for instance in registry.instances() {
        failures += instance.dispatch_gather_login(&mut gathered);
    }

    debug!(
        payloads = gathered.len(),
        failed_gatherers = failures,
        "gathered login payloads"
    );

    #[cfg(feature = "metrics")]
    counter!(login_metrics::PAYLOADS_GATHERED_TOTAL).increment(gathered.len() as u64);

    gathered
}

impl ChannelRegistry {
    /// See [`gather_login_payloads`].
    pub fn gather_login_payloads(&self, direction: NetworkDirection) -> Vec<LoginPayload> {
        gather_login_payloads(self, direction)
    }
}
