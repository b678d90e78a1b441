use std::sync::Arc;

use crate::{
    Error, Result,
    instance::{ChannelInstance, LoginGatherer, VersionPredicate, VersionSupplier},
    login::LoginPayloadSink,
    name::ChannelName,
    registry::ChannelRegistry,
};

/// Fluent construction of a channel, registered on [`build`](Self::build).
///
/// ```
/// use netreg_channels::{ChannelRegistry, versions};
///
/// let registry = ChannelRegistry::new();
/// let channel = registry
///     .channel("mymod:main".parse().unwrap())
///     .protocol_version(|| "1".to_string())
///     .client_accepted_versions(versions::accept_exact("1"))
///     .server_accepted_versions(versions::accept_missing_or("1"))
///     .build()
///     .unwrap();
/// assert_eq!(channel.name().to_string(), "mymod:main");
/// ```
///
/// The builder keeps no record of having been built: a second `build()`
/// attempts a second registration and fails with
/// [`Error::AlreadyRegistered`].
#[must_use]
pub struct ChannelBuilder<'a> {
    registry: &'a ChannelRegistry,
    name: ChannelName,
    network_protocol_version: Option<VersionSupplier>,
    client_accepted_versions: Option<VersionPredicate>,
    server_accepted_versions: Option<VersionPredicate>,
    login_gatherers: Vec<LoginGatherer>,
}

impl<'a> ChannelBuilder<'a> {
    /// Start a builder for `name`. Nothing is registered yet.
    pub fn named(registry: &'a ChannelRegistry, name: ChannelName) -> Self {
        Self {
            registry,
            name,
            network_protocol_version: None,
            client_accepted_versions: None,
            server_accepted_versions: None,
            login_gatherers: Vec::new(),
        }
    }

    /// Version offered to the remote side, re-evaluated on every handshake.
    pub fn protocol_version<F>(mut self, supplier: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.network_protocol_version = Some(Arc::new(supplier));
        self
    }

    /// Predicate run on the client with the server's version, or
    /// [`netreg_protocol::ABSENT`] when the server lacks the channel.
    pub fn client_accepted_versions<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.client_accepted_versions = Some(Arc::new(predicate));
        self
    }

    /// Predicate run on the server with the client's version, or
    /// [`netreg_protocol::ABSENT`] when the client lacks the channel.
    pub fn server_accepted_versions<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.server_accepted_versions = Some(Arc::new(predicate));
        self
    }

    /// Attach a login gatherer. May be called more than once.
    pub fn login_payloads<F>(mut self, gatherer: F) -> Self
    where
        F: Fn(&mut LoginPayloadSink<'_>) -> netreg_common::Result<()> + Send + Sync + 'static,
    {
        self.login_gatherers.push(Arc::new(gatherer));
        self
    }

    /// Register the configured channel.
    pub fn build(&self) -> Result<Arc<ChannelInstance>> {
        let network_protocol_version = self
            .network_protocol_version
            .clone()
            .ok_or_else(|| Error::incomplete(&self.name, "protocol version supplier"))?;
        let client_accepted_versions = self
            .client_accepted_versions
            .clone()
            .ok_or_else(|| Error::incomplete(&self.name, "client acceptance test"))?;
        let server_accepted_versions = self
            .server_accepted_versions
            .clone()
            .ok_or_else(|| Error::incomplete(&self.name, "server acceptance test"))?;

        self.registry.insert(ChannelInstance::new(
            self.name.clone(),
            network_protocol_version,
            client_accepted_versions,
            server_accepted_versions,
            self.login_gatherers.clone(),
        ))
    }

    /// Register the channel and wrap it in a higher-level channel type.
    pub fn build_as<C>(&self) -> Result<C>
    where
        C: From<Arc<ChannelInstance>>,
    {
        self.build().map(C::from)
    }
}
