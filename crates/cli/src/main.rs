mod channel_setup;
mod config_commands;
mod handshake_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    netreg_channels::{NetworkDirection, Side},
    netreg_config::{ManifestFormat, NetregConfig},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "netreg", about = "netreg: channel registry and handshake tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./netreg.toml and friends).
    #[arg(long, global = true, env = "NETREG_CONFIG")]
    config: Option<PathBuf>,

    /// Print collected metrics in Prometheus text format on exit.
    #[cfg(feature = "prometheus")]
    #[arg(long, global = true, default_value_t = false)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured channels and their current versions.
    Channels,
    /// Print the local channel manifest.
    Manifest {
        /// Side whose frame to emit. Defaults to the configured side.
        #[arg(long = "as", value_name = "SIDE")]
        side: Option<Side>,
        /// Emit a bare list instead of a handshake frame.
        #[arg(long, default_value_t = false)]
        list: bool,
    },
    /// Validate a remote manifest (bare list or handshake frame).
    Validate {
        /// Side running the validation. Defaults to the configured side.
        #[arg(long = "as", value_name = "SIDE")]
        side: Option<Side>,
        /// Manifest file, or `-` for stdin.
        input: PathBuf,
    },
    /// Show the payloads gathered for a direction.
    LoginPayloads {
        #[arg(long, default_value = "login-to-client")]
        direction: NetworkDirection,
    },
    /// Validate the configuration file and report errors/warnings.
    CheckConfig {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<NetregConfig> {
    match cli.config {
        Some(ref path) => netreg_config::load_config(path),
        None => Ok(netreg_config::discover_and_load()),
    }
}

#[cfg(feature = "metrics")]
fn init_metrics(config: &NetregConfig) -> anyhow::Result<netreg_metrics::MetricsHandle> {
    netreg_metrics::init_metrics(netreg_metrics::MetricsRecorderConfig {
        enabled: config.metrics.enabled,
        global_labels: config
            .metrics
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "netreg starting");

    if let Commands::CheckConfig { verbose } = cli.command {
        if !config_commands::check(cli.config.as_deref(), verbose) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let config = load_config(&cli)?;

    #[cfg(feature = "metrics")]
    let metrics = init_metrics(&config)?;

    let registry = channel_setup::registry_from_config(&config)?;

    let accepted = match cli.command {
        Commands::Channels => {
            handshake_commands::list_channels(&registry);
            true
        },
        Commands::Manifest { side, list } => {
            let format = if list {
                ManifestFormat::List
            } else {
                config.handshake.format
            };
            handshake_commands::print_manifest(&registry, side.unwrap_or(config.side), format)?;
            true
        },
        Commands::Validate { side, ref input } => {
            handshake_commands::validate_manifest(&registry, side.unwrap_or(config.side), input)
                .await?
        },
        Commands::LoginPayloads { direction } => {
            if config.side == Side::Client && direction == NetworkDirection::LoginToClient {
                warn!("login payloads are sent by the server; config side is client");
            }
            handshake_commands::print_login_payloads(&registry, direction);
            true
        },
        Commands::CheckConfig { .. } => true,
    };

    #[cfg(feature = "prometheus")]
    if cli.print_metrics {
        print!("{}", metrics.render());
    }
    #[cfg(all(feature = "metrics", not(feature = "prometheus")))]
    let _ = metrics;

    if !accepted {
        std::process::exit(1);
    }
    Ok(())
}
