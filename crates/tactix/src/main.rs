//! Main application entry point for the Tactix session server.
//!
//! Provides CLI interface, configuration loading, logging setup, and server
//! startup with graceful shutdown on termination signals.

mod cli;
mod config;

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::CliArgs;
use config::{AppConfig, LoggingSettings};
use tactix_server::GameServer;

/// Initializes the logging system.
///
/// The level comes from `RUST_LOG` when set, otherwise from the
/// configuration. An optional log file receives a plain-text copy of
/// everything written to stdout.
fn setup_logging(settings: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let file_layer = match &settings.file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if settings.json_format {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_ansi(true)).init();
    }

    info!("🔧 Logging initialized with level: {}", settings.level);
    Ok(())
}

/// The assembled application: validated configuration plus a bound server.
struct Application {
    config: AppConfig,
    server: Arc<GameServer>,
}

impl Application {
    /// Loads configuration, applies CLI overrides, and binds the server.
    async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }
        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }

        setup_logging(&config.logging)?;

        info!("🚀 Tactix Server v{}", env!("CARGO_PKG_VERSION"));
        info!("📂 Config: {}", args.config_path.display());

        let server = Arc::new(GameServer::bind(config.to_server_config()?)?);
        Ok(Self { config, server })
    }

    /// Runs the server until a termination signal arrives.
    async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  👥 Max clients: {}", self.config.server.max_clients);
        info!("  🎮 Max games: {}", self.config.server.max_games);

        let server = Arc::clone(&self.server);
        let server_handle = tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("❌ Server error: {e}");
                std::process::exit(1);
            }
        });

        info!("✅ Tactix Server is now running!");
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        wait_for_shutdown().await?;

        info!("🛑 Shutdown signal received, stopping the server...");
        self.server.shutdown();
        let _ = server_handle.await;
        info!("👋 Tactix Server shutdown complete");

        Ok(())
    }
}

/// Blocks until the process is asked to stop: Ctrl+C everywhere, plus
/// SIGTERM on Unix so container runtimes get a graceful stop too.
async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => info!("📡 Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start application: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
