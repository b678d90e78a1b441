use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, RwLock},
};

use {netreg_protocol::Side, tracing::warn};

#[cfg(feature = "metrics")]
use netreg_metrics::{counter, labels, login as login_metrics};

use crate::{
    login::{LoginPayload, LoginPayloadSink},
    name::ChannelName,
};

/// Produces this side's protocol version for a channel. Called every time a
/// manifest is built.
pub type VersionSupplier = Arc<dyn Fn() -> String + Send + Sync>;

/// Decides whether a remote version string (or [`netreg_protocol::ABSENT`])
/// is acceptable.
pub type VersionPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Contributes payloads to be sent while the remote client is still in the
/// login phase.
pub type LoginGatherer =
    Arc<dyn Fn(&mut LoginPayloadSink<'_>) -> netreg_common::Result<()> + Send + Sync>;

/// One registered channel: its name and version-negotiation behaviour.
///
/// Higher-level channel types hold an `Arc<ChannelInstance>` as their handle.
pub struct ChannelInstance {
    name: ChannelName,
    network_protocol_version: VersionSupplier,
    client_accepted_versions: VersionPredicate,
    server_accepted_versions: VersionPredicate,
    login_gatherers: RwLock<Vec<LoginGatherer>>,
}

impl ChannelInstance {
    pub(crate) fn new(
        name: ChannelName,
        network_protocol_version: VersionSupplier,
        client_accepted_versions: VersionPredicate,
        server_accepted_versions: VersionPredicate,
        login_gatherers: Vec<LoginGatherer>,
    ) -> Self {
        Self {
            name,
            network_protocol_version,
            client_accepted_versions,
            server_accepted_versions,
            login_gatherers: RwLock::new(login_gatherers),
        }
    }

    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    /// Current local protocol version. Not cached.
    pub fn network_protocol_version(&self) -> String {
        (self.network_protocol_version)()
    }

    /// Run on the client with the version the server advertised.
    pub fn try_server_version_on_client(&self, server_version: &str) -> bool {
        (self.client_accepted_versions)(server_version)
    }

    /// Run on the server with the version the client advertised.
    pub fn try_client_version_on_server(&self, client_version: &str) -> bool {
        (self.server_accepted_versions)(client_version)
    }

    /// Run the acceptance test that belongs to `local` against the version
    /// advertised by the opposite side.
    pub fn accepts(&self, local: Side, remote_version: &str) -> bool {
        match local {
            Side::Client => self.try_server_version_on_client(remote_version),
            Side::Server => self.try_client_version_on_server(remote_version),
        }
    }

    /// Attach another login gatherer. Gatherers run in attachment order.
    pub fn add_login_gatherer<F>(&self, gatherer: F)
    where
        F: Fn(&mut LoginPayloadSink<'_>) -> netreg_common::Result<()> + Send + Sync + 'static,
    {
        self.login_gatherers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(gatherer));
    }

    pub fn login_gatherer_count(&self) -> usize {
        self.login_gatherers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Append this channel's login payloads to `out`.
    ///
    /// Each gatherer runs in isolation: if it returns an error or panics,
    /// whatever it produced is discarded and the remaining gatherers still
    /// run. Returns the number of gatherers that failed.
    pub(crate) fn dispatch_gather_login(&self, out: &mut Vec<LoginPayload>) -> usize {
        let gatherers = self
            .login_gatherers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let mut failures = 0;
        for gatherer in gatherers {
            let mut sink = LoginPayloadSink::new(&self.name);
            let outcome = catch_unwind(AssertUnwindSafe(|| gatherer(&mut sink)));
            match outcome {
                Ok(Ok(())) => out.extend(sink.into_payloads()),
                Ok(Err(e)) => {
                    failures += 1;
                    warn!(channel = %self.name, error = %e, "login payload gatherer failed");
                },
                Err(_) => {
                    failures += 1;
                    warn!(channel = %self.name, "login payload gatherer panicked");
                },
            }
        }

        #[cfg(feature = "metrics")]
        if failures > 0 {
            counter!(login_metrics::GATHER_FAILURES_TOTAL, labels::CHANNEL => self.name.to_string())
                .increment(failures as u64);
        }

        failures
    }
}

impl fmt::Debug for ChannelInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelInstance")
            .field("name", &self.name.to_string())
            .field("login_gatherers", &self.login_gatherer_count())
            .finish_non_exhaustive()
    }
}
