//! Configuration validation.
//!
//! Catches mistakes that would otherwise only surface at registration or
//! handshake time: malformed or duplicate channel names, unusable versions,
//! and login payloads that can never be sent.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use {
    netreg_channels::ChannelName,
    netreg_protocol::{ABSENT, Side},
};

use crate::{
    env_subst::substitute_env,
    loader::{find_config_file, parse_config},
    schema::{AcceptPolicy, NetregConfig},
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "file-ref", "name", "duplicate", "version",
    /// "reserved", "policy", "payload", "side"
    pub category: &'static str,
    /// Dotted path, e.g. "channels[2].server.versions"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a config file at the given path, or the discovered config file
/// if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let Some(config_path) = path.map(Path::to_path_buf).or_else(find_config_file) else {
        let mut result = ValidationResult::default();
        result.push(
            Severity::Info,
            "file-ref",
            "",
            "no config file found; using defaults",
        );
        return result;
    };

    let mut result = match std::fs::read_to_string(&config_path) {
        Ok(raw) => match parse_config(&substitute_env(&raw), &config_path) {
            Ok(config) => validate_config(&config),
            Err(e) => {
                let mut result = ValidationResult::default();
                result.push(Severity::Error, "syntax", "", format!("parse error: {e}"));
                result
            },
        },
        Err(e) => {
            let mut result = ValidationResult::default();
            result.push(
                Severity::Error,
                "file-ref",
                "",
                format!("failed to read config file: {e}"),
            );
            result
        },
    };
    result.config_path = Some(config_path);
    result
}

/// Validate an already parsed configuration.
#[must_use]
pub fn validate_config(config: &NetregConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.channels.is_empty() {
        result.push(
            Severity::Info,
            "name",
            "channels",
            "no channels configured; only vanilla peers will be accepted",
        );
    }

    let mut seen: HashMap<ChannelName, usize> = HashMap::new();
    for (i, channel) in config.channels.iter().enumerate() {
        let at = format!("channels[{i}]");

        match channel.name.parse::<ChannelName>() {
            Ok(name) => {
                if let Some(first) = seen.get(&name) {
                    result.push(
                        Severity::Error,
                        "duplicate",
                        format!("{at}.name"),
                        format!("channel {name} is already declared at channels[{first}]"),
                    );
                } else {
                    seen.insert(name, i);
                }
            },
            Err(e) => result.push(Severity::Error, "name", format!("{at}.name"), e.to_string()),
        }

        if channel.version.is_empty() {
            result.push(
                Severity::Error,
                "version",
                format!("{at}.version"),
                "version must not be empty",
            );
        } else if channel.version == ABSENT {
            result.push(
                Severity::Error,
                "reserved",
                format!("{at}.version"),
                "version is the reserved absent sentinel",
            );
        }

        check_policy(&channel.client, &format!("{at}.client"), &mut result);
        check_policy(&channel.server, &format!("{at}.server"), &mut result);

        if !channel.login_payloads.is_empty() && config.side == Side::Client {
            result.push(
                Severity::Warning,
                "side",
                format!("{at}.login_payloads"),
                "login payloads are only sent by the server",
            );
        }
        for (j, payload) in channel.login_payloads.iter().enumerate() {
            if let Err(e) = payload.decode() {
                result.push(
                    Severity::Error,
                    "payload",
                    format!("{at}.login_payloads[{j}].data"),
                    e.to_string(),
                );
            }
        }
    }

    result
}

fn check_policy(policy: &AcceptPolicy, at: &str, result: &mut ValidationResult) {
    if policy.versions.iter().any(|v| v == ABSENT) {
        result.push(
            Severity::Warning,
            "reserved",
            format!("{at}.versions"),
            "the absent sentinel is matched through allow_absent, not versions",
        );
    }
    if policy.versions.iter().any(String::is_empty) {
        result.push(
            Severity::Warning,
            "policy",
            format!("{at}.versions"),
            "empty version strings are never advertised",
        );
    }
    if policy.any && (policy.allow_absent || !policy.versions.is_empty()) {
        result.push(
            Severity::Info,
            "policy",
            at,
            "`any` overrides versions and allow_absent",
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::schema::{ChannelConfig, LoginPayloadConfig, PayloadEncoding},
        rstest::rstest,
    };

    fn channel(name: &str, version: &str) -> ChannelConfig {
        ChannelConfig {
            name: name.to_string(),
            version: version.to_string(),
            client: AcceptPolicy::default(),
            server: AcceptPolicy::default(),
            login_payloads: Vec::new(),
        }
    }

    fn config(channels: Vec<ChannelConfig>) -> NetregConfig {
        NetregConfig {
            channels,
            ..Default::default()
        }
    }

    fn categories(result: &ValidationResult) -> Vec<&'static str> {
        result.diagnostics.iter().map(|d| d.category).collect()
    }

    #[test]
    fn clean_config_has_no_diagnostics() {
        let result = validate_config(&config(vec![channel("core:main", "1")]));
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn empty_config_is_informational() {
        let result = validate_config(&NetregConfig::default());
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Info), 1);
    }

    #[rstest]
    #[case("Bad Name", "1", "name")]
    #[case("core:main", "", "version")]
    #[case("core:main", ABSENT, "reserved")]
    fn channel_errors(#[case] name: &str, #[case] version: &str, #[case] category: &str) {
        let result = validate_config(&config(vec![channel(name, version)]));
        assert!(result.has_errors());
        assert_eq!(categories(&result), [category]);
    }

    #[test]
    fn duplicates_compare_normalised_names() {
        let result = validate_config(&config(vec![
            channel("netreg:core", "1"),
            channel("core", "2"),
        ]));
        let dup = &result.diagnostics[0];
        assert_eq!(dup.category, "duplicate");
        assert_eq!(dup.path, "channels[1].name");
        assert!(dup.message.contains("channels[0]"));
    }

    #[test]
    fn policy_warnings() {
        let mut ch = channel("core:main", "1");
        ch.server.versions = vec![ABSENT.to_string()];
        ch.client = AcceptPolicy {
            any: true,
            allow_absent: true,
            ..Default::default()
        };
        let result = validate_config(&config(vec![ch]));
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 1);
        assert_eq!(result.count(Severity::Info), 1);
    }

    #[test]
    fn login_payloads_on_client_and_bad_hex() {
        let mut ch = channel("core:main", "1");
        ch.login_payloads.push(LoginPayloadConfig {
            data: "xyz".into(),
            encoding: PayloadEncoding::Hex,
            context: None,
        });
        let mut cfg = config(vec![ch]);
        cfg.side = Side::Client;
        let result = validate_config(&cfg);
        assert_eq!(categories(&result), ["side", "payload"]);
        assert_eq!(result.diagnostics[1].path, "channels[0].login_payloads[0].data");
    }

    #[test]
    fn validate_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netreg.toml");
        std::fs::write(&path, "[[channels]]\nname = 1\n").unwrap();
        let result = validate(Some(&path));
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate(Some(&dir.path().join("absent.toml")));
        assert_eq!(categories(&result), ["file-ref"]);
    }
}
