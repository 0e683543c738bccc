use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use voicebox::transcribe::{PlaceholderTranscriber, Transcriber, UpstreamClient, UpstreamConfig};
use voicebox::{create_router, AppState, AudioPanel, Config};

#[derive(Debug, Parser)]
#[command(name = "voicebox", about = "Voice capture and transcription service")]
struct Args {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/voicebox")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;
    let port = args.port.unwrap_or(cfg.service.http.port);

    info!("{} v{} starting", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let panel = Arc::new(AudioPanel::new(
        cfg.audio.capture_source()?,
        cfg.audio.capture_config(),
        cfg.audio.recorder_config(),
    ));

    let transcriber: Arc<dyn Transcriber> = match &cfg.transcription.api_key {
        Some(api_key) if !api_key.is_empty() => {
            info!("transcription upstream: {}", cfg.transcription.endpoint);
            Arc::new(UpstreamClient::new(UpstreamConfig {
                api_key: api_key.clone(),
                endpoint: cfg.transcription.endpoint.clone(),
                model: cfg.transcription.model.clone(),
                language: cfg.transcription.language.clone(),
            }))
        }
        _ => {
            info!("no transcription API key configured; returning placeholder transcripts");
            Arc::new(PlaceholderTranscriber)
        }
    };

    let app = create_router(AppState::new(Arc::clone(&panel), transcriber));

    let addr = format!("{}:{}", cfg.service.http.bind, port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(panel))
        .await?;

    Ok(())
}

/// Wait for ctrl-c, then release every held audio resource before the
/// server drains.
async fn shutdown_signal(panel: Arc<AudioPanel>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        return;
    }

    info!("shutting down; releasing audio resources");
    panel.shutdown().await;
}
