use anyhow::Context;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use triunity_api::telemetry::ProfileKind;
use triunity_api::{router, AppState, ServerConfig};

/// Simulated TriUnity network telemetry API.
#[derive(Debug, Parser)]
#[command(name = "triunity-api", version)]
struct Cli {
    /// TOML config file; flags and env vars override its values
    #[arg(long, env = "TRIUNITY_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "TRIUNITY_BIND")]
    bind: Option<IpAddr>,

    #[arg(long, env = "TRIUNITY_PORT")]
    port: Option<u16>,

    /// Which handler draft to emulate
    #[arg(long, value_enum, env = "TRIUNITY_PROFILE")]
    profile: Option<ProfileKind>,

    /// Echo internal error messages to clients
    #[arg(long, env = "TRIUNITY_DEV")]
    dev: bool,

    /// Seed the RNG for reproducible responses
    #[arg(long, env = "TRIUNITY_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "TRIUNITY_REGION")]
    region: Option<String>,
}

impl Cli {
    fn resolve(self) -> anyhow::Result<ServerConfig> {
        let mut cfg = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServerConfig::default(),
        };
        if let Some(bind) = self.bind {
            cfg.bind = bind;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(profile) = self.profile {
            cfg.profile = profile;
        }
        if self.dev {
            cfg.dev_mode = true;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(region) = self.region {
            cfg.region = region;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // init tracing from env TRIUNITY_LOG or RUST_LOG
    let filter = std::env::var("TRIUNITY_LOG")
        .unwrap_or_else(|_| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cfg = Cli::parse().resolve()?;
    let addr = cfg.listen_addr();
    info!(
        profile = %cfg.profile,
        dev_mode = cfg.dev_mode,
        seeded = cfg.seed.is_some(),
        region = %cfg.region,
        "TriUnity API starting up"
    );

    let state = Arc::new(AppState::new(cfg));
    info!(node_id = %state.node.node_id, api_version = state.profile.api_version, "node identity");
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(listen = %addr, "TriUnity API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("server error")?;
    Ok(())
}
