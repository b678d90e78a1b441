use std::path::Path;

use {
    anyhow::{Context, Result},
    netreg_channels::{
        ChannelRegistry, HandshakeManifest, NetworkDirection, Side, ValidationReport,
        decode_frame_or_manifest, encode_frame,
    },
    netreg_config::ManifestFormat,
    tokio::io::AsyncReadExt,
    tracing::info,
};

pub fn list_channels(registry: &ChannelRegistry) {
    if registry.accepts_vanilla_connections() {
        println!("vanilla (no channels registered)");
        return;
    }
    for instance in registry.instances() {
        println!(
            "{}\t{}",
            instance.name(),
            instance.network_protocol_version()
        );
    }
}

pub fn print_manifest(registry: &ChannelRegistry, side: Side, format: ManifestFormat) -> Result<()> {
    let bytes = match format {
        ManifestFormat::Frame => encode_frame(registry, side)?,
        ManifestFormat::List => registry.build_manifest().to_bytes()?,
    };
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

/// Validate a peer manifest read from `input` (`-` for stdin).
///
/// Returns `false` when a local channel rejected it or the peer listed a
/// channel twice.
pub async fn validate_manifest(
    registry: &ChannelRegistry,
    local: Side,
    input: &Path,
) -> Result<bool> {
    let manifest = read_manifest(input).await?;
    info!(
        side = %local,
        remote_channels = manifest.len(),
        "validating remote channel list"
    );
    let report = match local {
        Side::Client => registry.validate_as_client(&manifest),
        Side::Server => registry.validate_as_server(&manifest),
    };
    print_report(&report);
    Ok(report.is_accepted())
}

async fn read_manifest(input: &Path) -> Result<HandshakeManifest> {
    let bytes = if input == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("failed to read manifest from stdin")?;
        buf
    } else {
        tokio::fs::read(input)
            .await
            .with_context(|| format!("failed to read {}", input.display()))?
    };
    Ok(decode_frame_or_manifest(&bytes)?)
}

fn print_report(report: &ValidationReport) {
    for verdict in &report.verdicts {
        let remote = verdict.remote_version.as_deref().unwrap_or("<absent>");
        let mark = if verdict.accepted { "ok" } else { "REJECTED" };
        println!("{mark}\t{}\t{remote}", verdict.name);
    }
    for name in &report.duplicates {
        println!("DUPLICATE\t{name}");
    }
    if report.is_accepted() {
        println!("accepted {} channel list", report.origin());
    } else {
        let rejected: Vec<String> = report.rejected().iter().map(ToString::to_string).collect();
        println!(
            "rejected {} channel list: {}",
            report.origin(),
            rejected.join(", ")
        );
    }
}

pub fn print_login_payloads(registry: &ChannelRegistry, direction: NetworkDirection) {
    let payloads = registry.gather_login_payloads(direction);
    if payloads.is_empty() {
        println!("no login payloads for {direction}");
        return;
    }
    for payload in &payloads {
        println!(
            "{}\t{} bytes\t{}",
            payload.channel(),
            payload.data().len(),
            payload.context()
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, netreg_channels::versions};

    fn registry() -> ChannelRegistry {
        let registry = ChannelRegistry::new();
        registry
            .channel("core:main".parse().unwrap())
            .protocol_version(|| "3".to_string())
            .client_accepted_versions(versions::accept_exact("3"))
            .server_accepted_versions(versions::accept_exact("3"))
            .build()
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn validates_frame_from_file() {
        let server = registry();
        let frame = encode_frame(&server, Side::Server).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.json");
        std::fs::write(&path, frame).unwrap();

        let accepted = validate_manifest(&registry(), Side::Client, &path).await.unwrap();
        assert!(accepted);
    }

    #[tokio::test]
    async fn mismatched_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        std::fs::write(&path, br#"[{"name":"core:main","version":"4"}]"#).unwrap();

        let accepted = validate_manifest(&registry(), Side::Server, &path).await.unwrap();
        assert!(!accepted);
    }

    #[tokio::test]
    async fn respelled_duplicate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        std::fs::write(
            &path,
            br#"[{"name":"core:main","version":"3"},{"name":"thing","version":"1"},{"name":"netreg:thing","version":"2"}]"#,
        )
        .unwrap();

        let accepted = validate_manifest(&registry(), Side::Server, &path).await.unwrap();
        assert!(!accepted);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = validate_manifest(&registry(), Side::Server, Path::new("/nonexistent/x.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x.json"));
    }
}
