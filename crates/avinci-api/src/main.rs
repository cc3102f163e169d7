//! Avinci CLI and REST API entry point.
//!
//! Binary name: `avinci`
//!
//! Parses CLI arguments and dispatches to the command handler. Each command
//! wires the chat engine itself; only serve and chat need a model API key.

mod cli;
mod http;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::{AppState, ConcreteChatEngine, ModelAccess};

/// How often the server sweeps expired sessions.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,avinci=debug",
        _ => "trace",
    };
    let enable_otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    avinci_observe::tracing_setup::init_tracing(filter, enable_otel)
        .map_err(|e| anyhow::anyhow!(e))?;

    let result = run(cli).await;
    avinci_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "avinci", &mut std::io::stdout());
        }

        Commands::Serve { bind, .. } => {
            let state = AppState::init(ModelAccess::Required).await?;
            let addr = bind.unwrap_or_else(|| state.config.server.bind.clone());
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Avinci API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {}  {} sessions, model {}",
                console::style("•").dim(),
                state.chat_engine.sessions().backend_name(),
                state.config.llm.model
            );
            println!(
                "  {}  data in {}",
                console::style("•").dim(),
                state.data_dir.display()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let purger = tokio::spawn(purge_expired_sessions(state.chat_engine.clone()));
            let router = http::router::build_router(state);

            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;

            purger.abort();
            println!("\n  Server stopped.");
        }

        Commands::Chat {
            agent_id,
            text,
            image,
            caller,
        } => {
            let state = AppState::init(ModelAccess::Required).await?;
            cli::chat::send_message(
                &state,
                agent_id,
                text,
                image.as_deref(),
                &caller,
                cli.json,
                cli.quiet,
            )
            .await?;
        }

        Commands::History { agent_id, caller } => {
            let state = AppState::init(ModelAccess::Offline).await?;
            cli::history::show_history(&state, &agent_id, &caller, cli.json).await?;
        }

        Commands::Clear {
            agent_id,
            caller,
            force,
        } => {
            let state = AppState::init(ModelAccess::Offline).await?;
            cli::history::clear_history(&state, &agent_id, &caller, force, cli.json).await?;
        }
    }

    Ok(())
}

/// Periodically drop expired sessions so idle keys do not accumulate.
async fn purge_expired_sessions(engine: Arc<ConcreteChatEngine>) {
    let mut ticker = tokio::time::interval(PURGE_INTERVAL);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match engine.sessions().purge_expired().await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "expired sessions purged"),
            Err(e) => tracing::warn!(error = %e, "session purge failed"),
        }
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
