//! Metric name and label definitions.
//!
//! All metric names emitted by netreg crates live here so the exported set is
//! documented in one place.

/// Channel registry metrics
pub mod channels {
    /// Number of channels currently registered
    pub const REGISTERED: &str = "netreg_channels_registered";
    /// Registrations refused because the name was already taken
    pub const REGISTRATION_CONFLICTS_TOTAL: &str = "netreg_channel_registration_conflicts_total";
}

/// Handshake validation metrics
pub mod handshake {
    /// Total number of remote manifests validated
    pub const VALIDATIONS_TOTAL: &str = "netreg_handshake_validations_total";
    /// Channels that rejected the remote version, per validation
    pub const REJECTIONS_TOTAL: &str = "netreg_handshake_rejections_total";
    /// Time spent running acceptance predicates, in seconds
    pub const VALIDATION_DURATION_SECONDS: &str = "netreg_handshake_validation_duration_seconds";
}

/// Login-phase payload metrics
pub mod login {
    /// Payloads collected for delivery during login
    pub const PAYLOADS_GATHERED_TOTAL: &str = "netreg_login_payloads_gathered_total";
    /// Login gatherers that returned an error or panicked
    pub const GATHER_FAILURES_TOTAL: &str = "netreg_login_gather_failures_total";
}

/// Common label keys
pub mod labels {
    pub const SIDE: &str = "side";
    pub const CHANNEL: &str = "channel";
    pub const OUTCOME: &str = "outcome";
}

/// Histogram buckets
pub mod buckets {
    /// Predicate evaluation buckets (in seconds)
    /// Covers 10µs to 1s
    pub const VALIDATION_DURATION: &[f64] = &[
        0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
    ];
}
