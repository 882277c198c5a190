use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use asistencia_db::{Database, DatabaseConfig};
use asistencia_server::auth::{self, AuthConfig};
use asistencia_server::routes;
use asistencia_server::state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Workshop attendance backend service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        #[arg(long, env = "ASISTENCIA_ADDR", default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Create a user account for API access
    CreateUser { username: String, password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    match cli.command {
        Command::Serve { addr } => serve(db, addr).await,
        Command::CreateUser { username, password } => create_user(db, username, password).await,
    }
}

async fn serve(db: Database, addr: String) -> Result<()> {
    let state = Arc::new(AppState {
        db,
        auth: AuthConfig::from_env(),
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn create_user(db: Database, username: String, password: String) -> Result<()> {
    let hash = auth::hash_password(&password)?;
    let user = db.user_repo().create(&username, &hash).await?;
    println!("Created user '{}' (id {})", user.username, user.id);
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received");
}
