//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the command.
//! No business logic here.

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use graph_swissknife::adapters::graph::{
    ClientCredentialsProvider, GraphClient, RecordingGraph, StaticTokenProvider,
};
use graph_swissknife::adapters::ui::{Cli, CliInputPort, prompt, render};
use graph_swissknife::ports::{GraphPort, InputPort, TokenProvider};
use graph_swissknife::shared::config::AppConfig;
use graph_swissknife::usecases::Services;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(_) => debug!(cwd = %cwd.display(), "no .env found"),
    }

    let cli = Cli::parse();
    prompt::apply_theme();

    if let Err(e) = run(cli).await {
        render::failure(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let global = cli.global;
    let cfg = AppConfig::load()
        .context("read GRAPH_* configuration")?
        .with_overrides(global.tenant_id, global.client_id, global.client_secret);

    let graph: Arc<dyn GraphPort> = if global.dry_run {
        info!("dry run: no token is acquired and no request is sent");
        Arc::new(RecordingGraph::dry_run())
    } else {
        let tokens = token_provider(&cfg)?;
        let base_url = cfg.base_url_or_default(global.beta);
        debug!(base_url = %base_url, "graph endpoint");
        Arc::new(GraphClient::new(base_url, tokens, cfg.timeout())?)
    };

    let input = CliInputPort::new(
        cli.command,
        Services::new(graph),
        global.output,
        global.yes,
        cfg.clone_tmp_dir_or_default(),
    );
    input.run().await?;
    Ok(())
}

/// Static token when GRAPH_ACCESS_TOKEN is set, client credentials otherwise.
fn token_provider(cfg: &AppConfig) -> anyhow::Result<Arc<dyn TokenProvider>> {
    if cfg.has_static_token() {
        let token = cfg.access_token.clone().unwrap_or_default();
        info!("using static access token from GRAPH_ACCESS_TOKEN");
        return Ok(Arc::new(StaticTokenProvider::new(token)));
    }

    cfg.require_ids()?;
    let secret = match cfg.client_secret.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => prompt::secret("Client secret:")?,
    };
    let provider = ClientCredentialsProvider::new(
        &cfg.authority_host_or_default(),
        cfg.credentials(secret)?,
        cfg.scope_or_default(),
        cfg.auth_timeout(),
    )?;
    Ok(Arc::new(provider))
}
