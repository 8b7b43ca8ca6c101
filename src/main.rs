use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fangate::config::ServerConfig;
use fangate::payment::StubProcessor;
use fangate::server::{AppState, create_router};
use fangate::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "fangate")]
#[command(about = "A creator monetization server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to (falls back to FANGATE_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (falls back to FANGATE_PORT)
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database (falls back to FANGATE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fangate=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig::resolve(host, port, data_dir);

            fs::create_dir_all(&config.data_dir)?;

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;

            let state = Arc::new(AppState {
                store: Arc::new(store),
                payment: Arc::new(StubProcessor),
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
