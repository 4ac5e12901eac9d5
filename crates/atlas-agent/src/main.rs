//! Trip planner agent server binary.
//!
//! Wires the flight domain, tool registry, generation client, and turn
//! engine together behind the HTTP router and serves it.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use atlas_llm::{OpenAiChatClient, OpenAiConfig};
use atlas_runtime::{SessionStore, TurnEngine};
use atlas_server::{AppState, Settings, metrics, router};
use atlas_tools::ToolRegistry;
use atlas_tools::flight::{FlightSearchTool, FlightService, MockFlightClient};

const SYSTEM_PROMPT: &str = "You are a helpful AI trip planning assistant. \
Help users plan their trips by searching for flights, answering questions, \
and providing recommendations. Use the available tools when needed to help users.";

/// Command-line overrides on top of environment-driven settings.
#[derive(Debug, Parser)]
#[command(name = "atlas", about = "Streaming trip planner agent server")]
struct Args {
    /// Bind host.
    #[arg(long)]
    host: Option<String>,

    /// Bind port.
    #[arg(long)]
    port: Option<u16>,

    /// Base URL of the OpenAI-compatible generation backend.
    #[arg(long)]
    base_url: Option<String>,

    /// Model name passed to the backend.
    #[arg(long)]
    model: Option<String>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(base_url) = self.base_url {
            settings.ollama_base_url = base_url;
        }
        if let Some(model) = self.model {
            settings.ollama_model = model;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut settings = Settings::from_env().context("loading settings from environment")?;
    Args::parse().apply(&mut settings);

    let metrics_handle = metrics::install_recorder().context("installing metrics recorder")?;

    let flights = Arc::new(FlightService::new(Arc::new(MockFlightClient::new())));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FlightSearchTool::new(Arc::clone(&flights))));

    let generation = OpenAiChatClient::new(OpenAiConfig {
        system_prompt: Some(SYSTEM_PROMPT.to_owned()),
        ..OpenAiConfig::local(&settings.ollama_base_url, &settings.ollama_model)
    });

    let engine = TurnEngine::new(
        Arc::new(SessionStore::new()),
        Arc::new(registry),
        Arc::new(generation),
        settings.engine_config(),
    );

    let state = AppState {
        engine: Arc::new(engine),
        flights,
        metrics: metrics_handle,
    };
    let app = router(state, &settings.frontend_origin);

    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .with_context(|| format!("binding {}:{}", settings.host, settings.port))?;
    info!(
        host = %settings.host,
        port = settings.port,
        backend = %settings.ollama_base_url,
        model = %settings.ollama_model,
        "atlas server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
