/// Config schema types: local side, handshake encoding, metrics and the
/// channels to register at startup.
use std::collections::HashMap;

use {
    anyhow::Context,
    netreg_protocol::Side,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetregConfig {
    /// Which end of the connection this process plays.
    pub side: Side,
    pub handshake: HandshakeConfig,
    pub metrics: MetricsConfig,
    pub channels: Vec<ChannelConfig>,
}

impl Default for NetregConfig {
    fn default() -> Self {
        Self {
            side: Side::Server,
            handshake: HandshakeConfig::default(),
            metrics: MetricsConfig::default(),
            channels: Vec::new(),
        }
    }
}

/// How the local manifest is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    /// Tagged `channel_list` / `channel_list_reply` frame.
    #[default]
    Frame,
    /// Bare `[{name, version}]` list.
    List,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandshakeConfig {
    pub format: ManifestFormat,
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder. Has no effect unless the binary was
    /// built with the `prometheus` feature.
    pub enabled: bool,
    /// Labels added to every metric.
    pub labels: HashMap<String, String>,
}

/// A channel registered from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// `namespace:path`; a bare path uses the default namespace.
    pub name: String,
    /// Version this side advertises.
    pub version: String,
    /// Test run on the client against the server's version.
    #[serde(default)]
    pub client: AcceptPolicy,
    /// Test run on the server against the client's version.
    #[serde(default)]
    pub server: AcceptPolicy,
    #[serde(default)]
    pub login_payloads: Vec<LoginPayloadConfig>,
}

/// Declarative acceptance test for a remote version. `any` wins over the
/// other fields; otherwise absence is accepted only with `allow_absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcceptPolicy {
    /// Accepted remote versions. Empty means the local version only.
    pub versions: Vec<String>,
    /// Accept a peer that does not have the channel.
    pub allow_absent: bool,
    /// Accept everything, absence included.
    pub any: bool,
}

impl AcceptPolicy {
    /// Versions this policy accepts when the channel's own version is
    /// `local`.
    pub fn accepted_versions(&self, local: &str) -> Vec<String> {
        if self.versions.is_empty() {
            vec![local.to_string()]
        } else {
            self.versions.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    #[default]
    Utf8,
    Hex,
}

/// Static payload sent to clients during login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginPayloadConfig {
    pub data: String,
    #[serde(default)]
    pub encoding: PayloadEncoding,
    /// Label for logs. Defaults to the channel name.
    #[serde(default)]
    pub context: Option<String>,
}

impl LoginPayloadConfig {
    /// Payload bytes after applying `encoding`.
    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        match self.encoding {
            PayloadEncoding::Utf8 => Ok(self.data.as_bytes().to_vec()),
            PayloadEncoding::Hex => {
                let digits: String = self.data.split_ascii_whitespace().collect();
                hex::decode(digits).context("invalid hex payload")
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(AcceptPolicy::default(), &["1"])]
    #[case(AcceptPolicy { versions: vec!["0.9".into(), "1.1".into()], ..Default::default() }, &["0.9", "1.1"])]
    fn accepted_versions_default_to_local(#[case] policy: AcceptPolicy, #[case] expected: &[&str]) {
        assert_eq!(policy.accepted_versions("1"), expected);
    }

    #[test]
    fn toml_channel_table() {
        let cfg: NetregConfig = toml::from_str(
            r#"
            side = "client"

            [[channels]]
            name = "core:main"
            version = "3"
            server = { allow_absent = true }

            [[channels.login_payloads]]
            data = "cafe"
            encoding = "hex"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.side, Side::Client);
        assert_eq!(cfg.handshake.format, ManifestFormat::Frame);
        let channel = &cfg.channels[0];
        assert!(channel.server.allow_absent);
        assert_eq!(channel.client, AcceptPolicy::default());
        assert_eq!(channel.login_payloads[0].encoding, PayloadEncoding::Hex);
    }

    #[rstest]
    #[case(PayloadEncoding::Utf8, "hi", Some(b"hi".to_vec()))]
    #[case(PayloadEncoding::Hex, "ca fe", Some(vec![0xca, 0xfe]))]
    #[case(PayloadEncoding::Hex, "caf", None)]
    #[case(PayloadEncoding::Hex, "zz", None)]
    #[case(PayloadEncoding::Hex, "CA\nFE 01", Some(vec![0xca, 0xfe, 0x01]))]
    fn payload_decoding(
        #[case] encoding: PayloadEncoding,
        #[case] data: &str,
        #[case] expected: Option<Vec<u8>>,
    ) {
        let payload = LoginPayloadConfig {
            data: data.to_string(),
            encoding,
            context: None,
        };
        assert_eq!(payload.decode().ok(), expected);
    }

    #[test]
    fn unknown_fields_are_refused() {
        let err = toml::from_str::<NetregConfig>("sied = \"client\"").unwrap_err();
        assert!(err.to_string().contains("sied"), "{err}");
    }
}
