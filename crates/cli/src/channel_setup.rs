//! Registers the channels declared in the config file.

use {
    anyhow::Result,
    netreg_channels::{ChannelName, ChannelRegistry, LoginPayloadSink, versions},
    netreg_common::Context,
    netreg_config::{AcceptPolicy, ChannelConfig, LoginPayloadConfig, NetregConfig},
    tracing::debug,
};

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Build a registry holding every channel in `config`, in file order.
pub fn registry_from_config(config: &NetregConfig) -> Result<ChannelRegistry> {
    let registry = ChannelRegistry::new();
    for (i, channel) in config.channels.iter().enumerate() {
        register_channel(&registry, channel)
            .map_err(|e| e.context(format!("channels[{i}] ({})", channel.name)))?;
    }
    debug!(channels = registry.len(), "registry built from config");
    Ok(registry)
}

fn register_channel(registry: &ChannelRegistry, channel: &ChannelConfig) -> Result<()> {
    let name: ChannelName = channel.name.parse()?;
    let version = channel.version.clone();
    let client = predicate(&channel.client, &channel.version);
    let server = predicate(&channel.server, &channel.version);

    let mut builder = registry
        .channel(name)
        .protocol_version(move || version.clone())
        .client_accepted_versions(move |v| client(v))
        .server_accepted_versions(move |v| server(v));
    if !channel.login_payloads.is_empty() {
        builder = builder.login_payloads(static_payloads(channel.login_payloads.clone()));
    }
    builder.build()?;
    Ok(())
}

fn predicate(policy: &AcceptPolicy, local: &str) -> Predicate {
    if policy.any {
        return Box::new(versions::accept_any());
    }
    let listed = versions::accept_one_of(policy.accepted_versions(local));
    if policy.allow_absent {
        Box::new(move |v: &str| versions::is_absent(v) || listed(v))
    } else {
        Box::new(listed)
    }
}

fn static_payloads(
    payloads: Vec<LoginPayloadConfig>,
) -> impl Fn(&mut LoginPayloadSink<'_>) -> netreg_common::Result<()> + Send + Sync + 'static {
    move |sink| {
        for payload in &payloads {
            let data = payload
                .decode()
                .with_context(|| format!("login payload for {}", sink.channel()))?;
            let context = payload
                .context
                .clone()
                .unwrap_or_else(|| sink.channel().to_string());
            sink.push(data, context);
        }
        Ok(())
    }
}
