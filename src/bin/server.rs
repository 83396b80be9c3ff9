//! REST API server for the card registry.
//!
//! # Usage
//!
//! ```bash
//! # Start server on the default port (3001)
//! cardregistry-server
//!
//! # With custom port, data file and allowed origins
//! cardregistry-server --port 8080 --data /var/lib/cards.json \
//!     --allowed-origin http://localhost:3000
//! ```
//!
//! # Swagger UI
//!
//! Visit http://localhost:3001/swagger-ui/ for interactive API documentation.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_registry::api;
use card_registry::registry::CardRegistry;
use card_registry::store::JsonFileStore;

#[derive(Parser)]
#[command(name = "cardregistry-server")]
#[command(author, version, about = "Card registry REST API")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// JSON file holding the card records
    #[arg(short, long, env = "CARD_REGISTRY_DATA", default_value = "data/cards.json")]
    data: PathBuf,

    /// Origins allowed by CORS (comma separated); any origin if omitted
    #[arg(
        long = "allowed-origin",
        env = "CARD_REGISTRY_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let store = JsonFileStore::open(&args.data)
        .with_context(|| format!("opening card data file {}", args.data.display()))?;
    let registry = CardRegistry::new(store);

    let app = api::app(registry, &args.allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(data = %args.data.display(), "Starting server on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}:{}/swagger-ui/", "localhost", args.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
