//! DebateArena server - AI debate scripts with synthesized audio
//!
//! Serves the HTTP API that turns a topic and two personas into a voiced
//! debate.

mod routes;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use debatearena_core::{DebateEvent, DebateOrchestrator, Settings};
use tracing_subscriber::EnvFilter;

use crate::routes::{AppState, create_router};

#[derive(Parser)]
#[command(
    name = "debatearena",
    version,
    about = "AI Debate Arena API - scripted debates with synthesized voices",
    long_about = "An HTTP service that asks an LLM for an alternating debate script and voices every turn with ElevenLabs."
)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "DEBATE_HOST", default_value = "127.0.0.1", value_name = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "DEBATE_PORT", default_value = "8000", value_name = "PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    if settings.llm_api_key().is_none() {
        eprintln!(
            "{}",
            format!(
                "Warning: {} not set. Debate generation will fail.",
                settings.llm_provider.key_var()
            )
            .yellow()
        );
    }
    if settings.elevenlabs_api_key.is_none() {
        eprintln!(
            "{}",
            "Warning: ELEVENLABS_API_KEY not set. Speech synthesis will fail.".yellow()
        );
    }

    let orchestrator =
        DebateOrchestrator::from_settings(&settings)?.with_callback(create_log_callback());
    let state = Arc::new(AppState { orchestrator });
    let app = create_router(state, &settings.allowed_origins);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", "  DebateArena API".bright_blue().bold());
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{} {} ({})",
        "LLM:".bold(),
        settings.llm_provider.display_name().bright_cyan(),
        settings.llm_model.dimmed()
    );
    println!("{} http://{}", "Listening on".bold(), addr.bright_white());
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Create a callback that logs debate progress.
fn create_log_callback() -> Box<dyn Fn(DebateEvent) + Send + Sync> {
    Box::new(move |event| match event {
        DebateEvent::ScriptAttempt { attempt } => {
            tracing::debug!(attempt, "requesting debate script");
        }
        DebateEvent::ScriptRejected { .. } => {
            // Already logged by the script generator.
        }
        DebateEvent::ScriptReady { turns } => {
            tracing::debug!(turns, "script ready");
        }
        DebateEvent::TurnSynthesized {
            index,
            speaker,
            voice_id,
            bytes,
        } => {
            tracing::debug!(index, speaker = speaker.as_str(), %voice_id, bytes, "turn voiced");
        }
        DebateEvent::DebateEnd => {
            tracing::debug!("debate complete");
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    println!("Received Ctrl+C, shutting down.");
}
