//! Star Cleaning quote engine CLI and REST API entry point.
//!
//! Binary name: `starq`
//!
//! Parses CLI arguments, loads configuration and wires the engine, then
//! dispatches to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use starclean_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use starclean_types::quote::{HomeProfile, LeadCapture};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "starq", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await;
    let result = run(cli, state).await;

    shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Quote {
            bedrooms,
            bathrooms,
            dog,
            cat,
            service,
            frequency,
        } => {
            let home = HomeProfile::new(bedrooms, bathrooms).with_pets(dog, cat);
            cli::quote::show_quote(&state, home, service, frequency, cli.json)?;
        }

        Commands::Slots { date } => {
            cli::slots::show_slots(&state, date, cli.json)?;
        }

        Commands::Zip { zip } => {
            cli::zip::lookup_zip(&state, &zip, cli.json).await?;
        }

        Commands::Capture {
            first_name,
            last_name,
            email,
            phone,
            zip,
            service,
            frequency,
            form_source,
        } => {
            let capture = LeadCapture {
                first_name,
                last_name,
                email,
                phone,
                zip_code: zip,
                service,
                frequency,
                form_source,
            };
            cli::capture::capture_lead(&state, capture, cli.json).await?;
        }

        Commands::Book => {
            cli::book::book(&state, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            println!(
                "  {} {} quote API listening on {}",
                console::style("⚡").bold(),
                state.config.business.name,
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {}",
                console::style(format!(
                    "config: {}",
                    starclean_infra::filesystem::config_path(&state.data_dir).display()
                ))
                .dim()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let sweeper = state.spawn_session_sweeper();
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            sweeper.abort();
            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// A signal handler that cannot be installed never fires; the other one
/// still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
