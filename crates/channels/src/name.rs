//! Namespaced channel identity.
//!
//! Format: `namespace:path`, e.g. `mymod:main`. A bare `path` is placed in
//! the [`DEFAULT_NAMESPACE`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Namespace assumed when a name has no `:` separator.
pub const DEFAULT_NAMESPACE: &str = "netreg";

/// Identity of one registered channel, used as the registry key and as the
/// name on the wire.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName {
    namespace: String,
    path: String,
}

impl ChannelName {
    /// Build a name from its parts, validating both.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self, Error> {
        let namespace = namespace.into();
        let path = path.into();
        let full = format!("{namespace}:{path}");

        if namespace.is_empty() {
            return Err(Error::invalid_name(full, "namespace cannot be empty"));
        }
        if path.is_empty() {
            return Err(Error::invalid_name(full, "path cannot be empty"));
        }
        if !namespace.chars().all(is_namespace_char) {
            return Err(Error::invalid_name(
                full,
                "namespace may only contain [a-z0-9_.-]",
            ));
        }
        if !path.chars().all(|c| is_namespace_char(c) || c == '/') {
            return Err(Error::invalid_name(full, "path may only contain [a-z0-9_.-/]"));
        }

        Ok(Self { namespace, path })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ChannelName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }
}

impl TryFrom<String> for ChannelName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChannelName> for String {
    fn from(name: ChannelName) -> Self {
        name.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn parse_namespaced() {
        let name: ChannelName = "mymod:main".parse().unwrap();
        assert_eq!(name.namespace(), "mymod");
        assert_eq!(name.path(), "main");
        assert_eq!(name.to_string(), "mymod:main");
    }

    #[test]
    fn bare_path_uses_default_namespace() {
        let name: ChannelName = "handshake".parse().unwrap();
        assert_eq!(name.to_string(), "netreg:handshake");
    }

    #[test]
    fn path_may_nest() {
        let name: ChannelName = "mymod:play/sync".parse().unwrap();
        assert_eq!(name.path(), "play/sync");
    }

    #[rstest]
    #[case(":main")]
    #[case("mymod:")]
    #[case("MyMod:main")]
    #[case("my mod:main")]
    #[case("my/mod:main")]
    #[case("mymod:a:b")]
    fn rejects_invalid(#[case] input: &str) {
        assert!(matches!(
            input.parse::<ChannelName>(),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn orders_by_namespace_then_path() {
        let mut names: Vec<ChannelName> = ["b:a", "a:z", "a:b"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        names.sort();
        let rendered: Vec<String> = names.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["a:b", "a:z", "b:a"]);
    }

    #[test]
    fn serde_uses_canonical_string() {
        let name: ChannelName = "mymod:main".parse().unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"mymod:main\"");
        let back: ChannelName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
        assert!(serde_json::from_str::<ChannelName>("\"Bad Name\"").is_err());
    }
}
