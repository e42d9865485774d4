//! Headless host for the essentials engine.
//!
//! Loads settings and messages, starts the runtime against an on-disk
//! location store and drives it from a line-oriented script on stdin.
mod config;
mod dirs;
mod repl;
mod script;

use std::path::Path;

use anyhow::Result;
use essentials_content::{ConfigLoader, ContentFactory, MessageLoader};
use essentials_runtime::{FileLocationStore, Runtime, RuntimeConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let _guard = setup_logging(&config.log_dir)?;

    let factory = ContentFactory::new(&config.config_dir);
    let settings_path = config
        .settings_path
        .clone()
        .unwrap_or_else(|| factory.settings_path());
    let engine = ConfigLoader::load_or_create(&settings_path)?;
    let catalog = match &config.messages_path {
        Some(path) => MessageLoader::load_or_create(path)?,
        None => factory.load_messages()?,
    };

    let store = FileLocationStore::new(&config.data_dir)?;
    tracing::info!(data_dir = %config.data_dir.display(), "location store ready");

    let runtime_config = if config.manual_clock {
        RuntimeConfig {
            engine,
            ..RuntimeConfig::default()
        }
    } else {
        RuntimeConfig::realtime(engine)
    };
    let runtime = Runtime::builder()
        .config(runtime_config)
        .store(store)
        .settings_source(move || {
            tracing::info!(path = %settings_path.display(), "reloading settings");
            ConfigLoader::load(&settings_path).map_err(Into::into)
        })
        .build()
        .await?;

    let printer = tokio::spawn(repl::print_notices(runtime.handle(), catalog));
    println!("essentials server ready, type 'help' for commands");

    let result = repl::run(runtime.handle()).await;

    printer.abort();
    let _ = printer.await;
    runtime.shutdown().await?;
    tracing::info!("server stopped");
    result
}

/// Setup logging to both stderr and a log file
fn setup_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "server.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Log file: {}/server.log", log_dir.display());
    Ok(guard)
}
