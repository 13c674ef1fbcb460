//! SSO sync node.
//!
//! Serves `POST /sso/sync` for configured peers, or runs a single outbound
//! sync from the command line.
//!
//! Usage:
//!   sso-node --config sso.json serve
//!   sso-node --config sso.json sync --username alice --password secret

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sso::{open_store, serve, IdentityField, NodeConfig, SsoNode};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sso-node")]
#[command(about = "On-demand user sync between SSO nodes")]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "sso.json")]
    config: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer sync requests from peers
    Serve {
        /// Override the configured listen address
        #[arg(long)]
        listen: Option<String>,
    },
    /// Pull one user from every peer into the local store
    Sync {
        #[arg(long, conflicts_with = "email", required_unless_present = "email")]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Plaintext password, used to upgrade legacy digests
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = NodeConfig::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    if config.sync.is_empty() {
        warn!("no sync peers configured; inbound requests will be refused");
    }

    let store = open_store(&config).context("opening user store")?;

    match args.command {
        Command::Serve { listen } => {
            let listen = listen.unwrap_or_else(|| config.listen.clone());
            let node = SsoNode::with_http(config, store).context("building HTTP client")?;

            let listener = tokio::net::TcpListener::bind(&listen)
                .await
                .with_context(|| format!("binding {}", listen))?;
            serve(&node, listener, shutdown_signal()).await?;
            info!("sso node stopped");
            Ok(())
        }
        Command::Sync {
            username,
            email,
            password,
        } => {
            let node = SsoNode::with_http(config, store).context("building HTTP client")?;
            let (identity, value) = match (username, email) {
                (Some(username), _) => (IdentityField::Username, username),
                (None, Some(email)) => (IdentityField::Email, email),
                (None, None) => anyhow::bail!("one of --username or --email is required"),
            };

            let report = node.sync_user(identity, &value, password.as_deref()).await;
            info!(
                peers_queried = report.peers_queried,
                peers_answered = report.peers_answered,
                created = report.merge.created,
                updated = report.merge.updated,
                skipped = report.merge.skipped,
                failed = report.merge.failed,
                "sync complete"
            );
            println!("synced: {}", report.synced());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
