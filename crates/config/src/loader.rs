use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::NetregConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["netreg.toml", "netreg.yaml", "netreg.yml", "netreg.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<NetregConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&substitute_env(&raw), path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./netreg.{toml,yaml,yml,json}`
/// 2. `<user config dir>/netreg.{toml,yaml,yml,json}`
///
/// Returns `NetregConfig::default()` if no file is found or the file fails
/// to load.
pub fn discover_and_load() -> NetregConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return NetregConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
        NetregConfig::default()
    })
}

/// First existing config file in the standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

/// User-global config directory, e.g. `~/.config/netreg/`.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "netreg").map(|d| d.config_dir().to_path_buf())
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> anyhow::Result<NetregConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, netreg_protocol::Side};

    #[test]
    fn loads_each_format() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("netreg.toml");
        std::fs::write(
            &toml_path,
            "side = \"client\"\n[[channels]]\nname = \"a:b\"\nversion = \"1\"\n",
        )
        .unwrap();
        let cfg = load_config(&toml_path).unwrap();
        assert_eq!(cfg.side, Side::Client);
        assert_eq!(cfg.channels[0].name, "a:b");

        let yaml_path = dir.path().join("netreg.yaml");
        std::fs::write(
            &yaml_path,
            "side: server\nchannels:\n  - name: a:b\n    version: \"2\"\n",
        )
        .unwrap();
        assert_eq!(load_config(&yaml_path).unwrap().channels[0].version, "2");

        let json_path = dir.path().join("netreg.json");
        std::fs::write(
            &json_path,
            r#"{"channels":[{"name":"a:b","version":"3","server":{"any":true}}]}"#,
        )
        .unwrap();
        let cfg = load_config(&json_path).unwrap();
        assert_eq!(cfg.side, Side::Server);
        assert!(cfg.channels[0].server.any);
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = parse_config("", Path::new("netreg.ini")).unwrap_err();
        assert!(err.to_string().contains(".ini"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn find_in_respects_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("netreg.json"), "{}").unwrap();
        std::fs::write(dir.path().join("netreg.yaml"), "{}").unwrap();
        assert_eq!(
            find_in(dir.path()).unwrap(),
            dir.path().join("netreg.yaml")
        );
    }
}
