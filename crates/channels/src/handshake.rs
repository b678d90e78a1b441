//! Validation of a remote peer's channel manifest.
//!
//! Every locally registered channel runs its acceptance test for the local
//! side against the version the peer advertised, or against
//! [`ABSENT`] when the peer did not list the channel. Channels
//! only the peer knows about are ignored. The handshake passes only when no
//! local channel rejects and the peer listed each channel at most once.
//!
//! Names are compared after parsing, so `core` and `netreg:core` are the same
//! channel. A peer that lists one channel under both spellings fails the
//! handshake whatever order the entries arrive in.

use std::collections::{BTreeSet, HashMap};

use {
    netreg_protocol::{ABSENT, HandshakeManifest, Side},
    tracing::{debug, error},
};

#[cfg(feature = "metrics")]
use {
    netreg_metrics::{counter, handshake as hs_metrics, histogram, labels},
    std::time::Instant,
};

use crate::{name::ChannelName, registry::ChannelRegistry};

/// Outcome of one channel's acceptance test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelVerdict {
    pub name: ChannelName,
    /// Version the peer advertised, `None` when it lacks the channel.
    pub remote_version: Option<String>,
    pub accepted: bool,
}

/// Result of validating a peer's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Side that ran the validation.
    pub local_side: Side,
    /// One verdict per local channel, in registry order.
    pub verdicts: Vec<ChannelVerdict>,
    /// Channels the peer listed more than once, in name order.
    pub duplicates: Vec<ChannelName>,
}

impl ValidationReport {
    /// `true` when every local channel accepted and the peer listed no
    /// channel twice.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.duplicates.is_empty() && self.verdicts.iter().all(|v| v.accepted)
    }

    /// Side whose manifest was validated.
    #[must_use]
    pub fn origin(&self) -> Side {
        self.local_side.opposite()
    }

    /// Channels whose acceptance test failed.
    #[must_use]
    pub fn rejected(&self) -> Vec<&ChannelName> {
        self.verdicts
            .iter()
            .filter(|v| !v.accepted)
            .map(|v| &v.name)
            .collect()
    }
}

/// Validate the server's manifest on the client, using each channel's
/// client acceptance test.
pub fn validate_as_client(
    registry: &ChannelRegistry,
    manifest_from_server: &HandshakeManifest,
) -> ValidationReport {
    validate_channels(registry, manifest_from_server, Side::Client)
}

/// Validate the client's manifest on the server, using each channel's
/// server acceptance test.
pub fn validate_as_server(
    registry: &ChannelRegistry,
    manifest_from_client: &HandshakeManifest,
) -> ValidationReport {
    validate_channels(registry, manifest_from_client, Side::Server)
}

/// Validate `manifest` from the side opposite `local`.
pub fn validate_channels(
    registry: &ChannelRegistry,
    manifest: &HandshakeManifest,
    local: Side,
) -> ValidationReport {
    #[cfg(feature = "metrics")]
    let started = Instant::now();

    let origin = local.opposite();
    let incoming = incoming_versions(manifest);

    let verdicts: Vec<ChannelVerdict> = registry
        .instances()
        .iter()
        .map(|instance| {
            if incoming.duplicates.contains(instance.name()) {
                return ChannelVerdict {
                    name: instance.name().clone(),
                    remote_version: None,
                    accepted: false,
                };
            }
            let remote_version = incoming.versions.get(instance.name()).copied();
            let tested = remote_version.unwrap_or(ABSENT);
            let accepted = instance.accepts(local, tested);
            debug!(
                channel = %instance.name(),
                version = tested,
                from = %origin,
                result = if accepted { "ACCEPTED" } else { "REJECTED" },
                "channel version test"
            );
            ChannelVerdict {
                name: instance.name().clone(),
                remote_version: remote_version.map(str::to_owned),
                accepted,
            }
        })
        .collect();

    let report = ValidationReport {
        local_side: local,
        verdicts,
        duplicates: incoming.duplicates.into_iter().collect(),
    };

    if !report.duplicates.is_empty() {
        let names = report
            .duplicates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        error!(channels = %names, from = %origin, "remote listed channels more than once");
    }

    let rejected = report.rejected();
    if report.is_accepted() {
        debug!(from = %origin, "accepting channel list");
    } else if !rejected.is_empty() {
        let names = rejected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        error!(channels = %names, from = %origin, "channels rejected their remote version");
    }

    #[cfg(feature = "metrics")]
    {
        let side = local.to_string();
        let outcome = if report.is_accepted() {
            "accepted"
        } else {
            "rejected"
        };
        counter!(hs_metrics::VALIDATIONS_TOTAL, labels::SIDE => side.clone(), labels::OUTCOME => outcome)
            .increment(1);
        for name in &rejected {
            counter!(
                hs_metrics::REJECTIONS_TOTAL,
                labels::SIDE => side.clone(),
                labels::CHANNEL => name.to_string()
            )
            .increment(1);
        }
        histogram!(hs_metrics::VALIDATION_DURATION_SECONDS, labels::SIDE => side)
            .record(started.elapsed().as_secs_f64());
    }

    report
}

/// A received manifest indexed by parsed channel name.
struct Incoming<'a> {
    versions: HashMap<ChannelName, &'a str>,
    /// Names that appeared more than once after parsing.
    duplicates: BTreeSet<ChannelName>,
}

/// Entries whose names do not parse cannot match a local channel and are
/// skipped.
fn incoming_versions(manifest: &HandshakeManifest) -> Incoming<'_> {
    let mut versions = HashMap::with_capacity(manifest.len());
    let mut duplicates = BTreeSet::new();
    for entry in manifest {
        let name = match entry.name.parse::<ChannelName>() {
            Ok(name) => name,
            Err(e) => {
                debug!(name = %entry.name, error = %e, "ignoring unparseable remote channel");
                continue;
            },
        };
        if versions.insert(name.clone(), entry.version.as_str()).is_some() {
            duplicates.insert(name);
        }
    }
    Incoming {
        versions,
        duplicates,
    }
}

impl ChannelRegistry {
    /// See [`validate_as_client`].
    pub fn validate_as_client(&self, manifest_from_server: &HandshakeManifest) -> ValidationReport {
        validate_as_client(self, manifest_from_server)
    }

    /// See [`validate_as_server`].
    pub fn validate_as_server(&self, manifest_from_client: &HandshakeManifest) -> ValidationReport {
        validate_as_server(self, manifest_from_client)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        rstest::rstest,
        std::sync::{Arc, Mutex},
    };

    fn manifest(entries: &[(&str, &str)]) -> HandshakeManifest {
        let mut m = HandshakeManifest::new();
        for (name, version) in entries {
            m.push(*name, *version);
        }
        m
    }

    #[test]
    fn server_test_sees_client_version() {
        let registry = ChannelRegistry::new();
        registry
            .register("c:test".parse().unwrap(), || "1.0".into(), |_| false, |v| v == "1.0")
            .unwrap();

        assert!(registry.validate_as_server(&manifest(&[("c:test", "1.0")])).is_accepted());
        let report = registry.validate_as_server(&manifest(&[("c:test", "2.0")]));
        assert!(!report.is_accepted());
        assert_eq!(report.verdicts[0].remote_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn absent_channel_uses_sentinel() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let registry = ChannelRegistry::new();
        registry
            .register(
                "c:test".parse().unwrap(),
                || "1.0".into(),
                |_| true,
                move |v| {
                    recorder.lock().unwrap().push(v.to_string());
                    v == ABSENT
                },
            )
            .unwrap();

        let report = registry.validate_as_server(&manifest(&[("other:chan", "9")]));
        assert!(report.is_accepted());
        assert_eq!(report.verdicts[0].remote_version, None);
        assert_eq!(*seen.lock().unwrap(), [ABSENT.to_string()]);
    }

    #[test]
    fn bare_remote_names_match_default_namespace() {
        let registry = ChannelRegistry::new();
        registry
            .register("netreg:core".parse().unwrap(), || "3".into(), |v| v == "3", |_| true)
            .unwrap();
        assert!(registry.validate_as_client(&manifest(&[("core", "3")])).is_accepted());
    }

    #[rstest]
    #[case(&[("core", "1"), ("netreg:core", "2")])]
    #[case(&[("netreg:core", "2"), ("core", "1")])]
    #[case(&[("netreg:core", "1"), ("core", "1")])]
    fn one_channel_under_two_spellings_fails_in_any_order(#[case] entries: &[(&str, &str)]) {
        let registry = ChannelRegistry::new();
        registry
            .register("netreg:core".parse().unwrap(), || "1".into(), |v| v == "1", |_| true)
            .unwrap();

        let report = registry.validate_as_client(&manifest(entries));
        assert!(!report.is_accepted());
        assert_eq!(report.duplicates, ["netreg:core".parse::<ChannelName>().unwrap()]);
        assert_eq!(report.verdicts[0].remote_version, None);
        assert!(!report.verdicts[0].accepted);
    }

    #[test]
    fn remote_only_duplicate_still_fails() {
        let registry = ChannelRegistry::new();
        registry
            .register("c:test".parse().unwrap(), || "1".into(), |v| v == "1", |_| true)
            .unwrap();

        let report =
            registry.validate_as_client(&manifest(&[("c:test", "1"), ("x", "1"), ("netreg:x", "1")]));
        assert!(report.verdicts[0].accepted);
        assert!(report.rejected().is_empty());
        assert!(!report.is_accepted());
        assert_eq!(report.duplicates[0].to_string(), "netreg:x");
    }

    #[test]
    fn unparseable_remote_names_are_ignored() {
        let registry = ChannelRegistry::new();
        registry
            .register("c:test".parse().unwrap(), || "1".into(), |v| v == "1", |_| true)
            .unwrap();
        let report =
            registry.validate_as_client(&manifest(&[("Not A Name", "1"), ("c:test", "1")]));
        assert!(report.is_accepted());
    }

    #[test]
    fn origin_is_opposite_side() {
        let registry = ChannelRegistry::new();
        let report = registry.validate_as_client(&HandshakeManifest::new());
        assert_eq!(report.origin(), Side::Server);
        assert!(report.is_accepted());
        assert!(report.verdicts.is_empty());
    }
}
