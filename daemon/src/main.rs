//! BSQ DAO daemon — entry point for running a node.

use bsq_node::{init_logging, BsqDaoNode, LogFormat, NodeConfig, NodeRole};
use bsq_types::NetworkId;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bsq-daemon", about = "BSQ DAO node daemon")]
struct Cli {
    /// Network: "mainnet", "testnet", or "regtest".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "BSQ_NETWORK")]
    network: Option<String>,

    /// Node role: "full" (local validator) or "lite" (peer-served blocks).
    #[arg(long, env = "BSQ_ROLE")]
    role: Option<String>,

    /// Take a state snapshot every this many blocks.
    #[arg(long, env = "BSQ_SNAPSHOT_INTERVAL")]
    snapshot_interval: Option<u32>,

    /// Maximum blocks per catch-up request.
    #[arg(long, env = "BSQ_CATCH_UP_BATCH_SIZE")]
    catch_up_batch_size: Option<usize>,

    /// Seconds between retries when no block source is available.
    #[arg(long, env = "BSQ_SOURCE_RETRY_SECS")]
    source_retry_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "BSQ_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "BSQ_LOG_FORMAT")]
    log_format: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the node.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
}

#[derive(clap::Subcommand)]
enum NodeAction {
    /// Run the node.
    Run,
}

fn parse_network(s: &str) -> NetworkId {
    match s.to_lowercase().as_str() {
        "mainnet" => NetworkId::Mainnet,
        "testnet" => NetworkId::Testnet,
        _ => NetworkId::Regtest,
    }
}

fn parse_role(s: &str) -> NodeRole {
    match s.to_lowercase().as_str() {
        "full" => NodeRole::Full,
        _ => NodeRole::Lite,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config: Option<NodeConfig> = if let Some(ref config_path) = cli.config {
        match NodeConfig::from_toml_file(&config_path.display().to_string()) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!(
                    "failed to load config file {}: {e}; using CLI defaults",
                    config_path.display()
                );
                None
            }
        }
    } else {
        None
    };

    let base = file_config.unwrap_or_default();
    let config = NodeConfig {
        network: cli
            .network
            .as_deref()
            .map(parse_network)
            .unwrap_or(base.network),
        role: cli.role.as_deref().map(parse_role).unwrap_or(base.role),
        snapshot_interval: cli.snapshot_interval.unwrap_or(base.snapshot_interval),
        catch_up_batch_size: cli.catch_up_batch_size.unwrap_or(base.catch_up_batch_size),
        source_retry_secs: cli.source_retry_secs.unwrap_or(base.source_retry_secs),
        log_level: cli.log_level,
        log_format: cli.log_format,
        ..base
    };

    init_logging(LogFormat::from_config(&config.log_format), &config.log_level);

    match cli.command {
        Command::Node { action } => match action {
            NodeAction::Run => {
                tracing::info!(
                    network = config.network.as_str(),
                    role = ?config.role,
                    snapshot_interval = config.snapshot_interval,
                    "starting BSQ DAO daemon"
                );

                let (node, handles) = BsqDaoNode::new(config);
                let shutdown = node.shutdown_handle();

                // The acquisition handles stay alive for the whole process;
                // the network layer (or local validator) attaches to them.
                let _handles = handles;

                let signal_task = {
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move { shutdown.wait_for_signal().await })
                };

                let store = node.start().await?;
                tracing::info!(tip = ?store.chain_height(), "BSQ DAO daemon exited cleanly");
                signal_task.abort();
            }
        },
    }

    Ok(())
}
