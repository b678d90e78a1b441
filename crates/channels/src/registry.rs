use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use tracing::{error, info};

#[cfg(feature = "metrics")]
use netreg_metrics::{channels as ch_metrics, counter, gauge};

use crate::{
    Error, Result,
    builder::ChannelBuilder,
    instance::{ChannelInstance, VersionPredicate, VersionSupplier},
    name::ChannelName,
};

/// Table of every channel registered in this process.
///
/// Registration is a write; lookups, manifest encoding, validation and
/// login gathering are reads. Iteration follows channel name order.
/// Channels are never removed; the table lives as long as the registry.
#[derive(Debug)]
pub struct ChannelRegistry {
    instances: RwLock<BTreeMap<ChannelName, Arc<ChannelInstance>>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            instances: RwLock::new(BTreeMap::new()),
        }
    }

    /// Start building a channel bound to this registry.
    pub fn channel(&self, name: ChannelName) -> ChannelBuilder<'_> {
        ChannelBuilder::named(self, name)
    }

    /// Create and store a new channel.
    ///
    /// Fails with [`Error::AlreadyRegistered`] if `name` is taken; the
    /// existing channel is left untouched.
    pub fn register<V, C, S>(
        &self,
        name: ChannelName,
        network_protocol_version: V,
        client_accepted_versions: C,
        server_accepted_versions: S,
    ) -> Result<Arc<ChannelInstance>>
    where
        V: Fn() -> String + Send + Sync + 'static,
        C: Fn(&str) -> bool + Send + Sync + 'static,
        S: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.insert(ChannelInstance::new(
            name,
            Arc::new(network_protocol_version) as VersionSupplier,
            Arc::new(client_accepted_versions) as VersionPredicate,
            Arc::new(server_accepted_versions) as VersionPredicate,
            Vec::new(),
        ))
    }

    pub(crate) fn insert(&self, instance: ChannelInstance) -> Result<Arc<ChannelInstance>> {
        let mut instances = self.instances.write().unwrap_or_else(|e| e.into_inner());

        if instances.contains_key(instance.name()) {
            error!(channel = %instance.name(), "network channel already registered");
            #[cfg(feature = "metrics")]
            counter!(ch_metrics::REGISTRATION_CONFLICTS_TOTAL).increment(1);
            return Err(Error::already_registered(instance.name()));
        }

        let name = instance.name().clone();
        let instance = Arc::new(instance);
        instances.insert(name.clone(), Arc::clone(&instance));

        info!(channel = %name, total = instances.len(), "registered network channel");
        #[cfg(feature = "metrics")]
        gauge!(ch_metrics::REGISTERED).set(instances.len() as f64);

        Ok(instance)
    }

    pub fn lookup(&self, name: &ChannelName) -> Option<Arc<ChannelInstance>> {
        self.instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Names of all registered channels, e.g. to report which non-default
    /// channels are active.
    pub fn list_identities(&self) -> Vec<ChannelName> {
        self.instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of all registered channels in iteration order.
    ///
    /// The lock is released before returning, so callers may invoke channel
    /// callbacks that touch the registry again.
    pub fn instances(&self) -> Vec<Arc<ChannelInstance>> {
        self.instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A registry without channels can talk to peers that do not negotiate
    /// channels at all.
    pub fn accepts_vanilla_connections(&self) -> bool {
        self.is_empty()
    }
}
