use nutriscan::api::{self, AppState};
use nutriscan::commands::{CommandHandler, Flow};
use nutriscan::food::analysis::FoodAnalyzer;
use nutriscan::food::api::food_info::SYSTEM_MESSAGE;
use nutriscan::food::api::{ClarifaiClient, FoodInfoClient};
use nutriscan::food::capture::SnapshotCamera;
use nutriscan::food::config::FoodConfig;
use nutriscan::providers::create_provider;
use nutriscan::session::{SessionContext, SessionStore};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Snap a photo of your food and see what's in it", long_about = None)]
struct Args {
    /// Generative-text provider for nutrition data (gemini or deepseek)
    #[arg(long, default_value = "gemini")]
    provider: String,

    /// Serve the HTTP API instead of the interactive prompt
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,

    /// Directory holding the stored analysis (overrides NUTRISCAN_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Recognition client error: {0}")]
    RecognitionError(String),
}

struct Services {
    analyzer: FoodAnalyzer,
    state: AppState,
    model: String,
}

async fn build_services(args: &Args) -> Result<Services, AppError> {
    let mut config = FoodConfig::from_env().map_err(AppError::ConfigError)?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }

    let provider = create_provider(&args.provider, SYSTEM_MESSAGE.to_string())
        .await
        .map_err(|e| AppError::ProviderError(e.to_string()))?;
    let info_client = Arc::new(FoodInfoClient::new(provider));
    let model = info_client.model().await;

    let detector = ClarifaiClient::new(&config).map_err(|e| AppError::RecognitionError(e.to_string()))?;

    let store = SessionStore::open(&config.data_dir).map_err(|e| {
        AppError::ConfigError(format!("Cannot use data dir {}: {}", config.data_dir.display(), e))
    })?;
    let session = SessionContext::with_store(store);

    let state = AppState::new(detector, info_client, session);
    let analyzer = state.analyzer().clone();

    Ok(Services { analyzer, state, model })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nutriscan=info")),
        )
        .with_target(false)
        .init();

    // Parse command line arguments
    let args = Args::parse();
    let services = build_services(&args).await?;

    if args.api {
        run_api_server(&args, services).await
    } else {
        run_cli_mode(services).await
    }
}

async fn run_cli_mode(services: Services) -> anyhow::Result<()> {
    let camera = SnapshotCamera::from_env();
    if !camera.has_devices() {
        warn!("no camera snapshots configured; set CAMERA_FRONT_SNAPSHOT or CAMERA_BACK_SNAPSHOT to use the camera");
    }

    let mut command_handler = CommandHandler::new(services.analyzer, Arc::new(camera), services.model);

    // Show initial help menu
    if let Err(e) = command_handler.handle_command("help").await {
        println!("{}", e.red());
    }

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    // Main input loop
    loop {
        match rl.readline("🥗 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                match command_handler.handle_command(input).await {
                    Ok(Flow::Exit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => println!("{}", e.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    command_handler.shutdown();
    Ok(())
}

async fn run_api_server(args: &Args, services: Services) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let app = api::create_api(services.state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, model = %services.model, "API server ready to accept connections");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
