use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::Settings;
use database::sqlx::mysql::MySqlPool;
use database::{provision, MySqlItemRepository, ProvisionError};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The entry point for the item store service.
#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install the tracing subscriber: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to start server: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small CRUD service for items, backed by MySQL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the database, then serve the API and the landing page (default).
    Serve,
    /// Create the database and the `items` table if missing, then exit.
    Provision,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = configuration::load_settings().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await,
        Commands::Provision => {
            let pool = setup_database(&settings).await?;
            pool.close().await;
            Ok(())
        }
    }
}

// ==============================================================================
// Startup
// ==============================================================================

/// Provisions the database, logging the driver diagnostics on failure.
async fn setup_database(settings: &Settings) -> anyhow::Result<MySqlPool> {
    tracing::info!("Setting up database...");
    provision(&settings.database).await.map_err(|e: ProvisionError| {
        let diagnostics = e.diagnostics();
        tracing::error!(
            error = %e,
            code = ?diagnostics.code,
            errno = ?diagnostics.errno,
            sql_message = ?diagnostics.sql_message,
            "Error initializing database."
        );
        anyhow::Error::new(e)
    })
}

/// Routes are only mounted once provisioning has succeeded.
async fn serve(settings: Settings) -> anyhow::Result<()> {
    let pool = setup_database(&settings).await?;
    let store = Arc::new(MySqlItemRepository::new(pool.clone()));

    let app = web_server::app(store, &settings.server.public_dir);
    let addr = settings.server.socket_addr()?;
    web_server::run_server(addr, app, shutdown_signal()).await?;

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
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
    tracing::info!("Shutdown signal received.");
}
