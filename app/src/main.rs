//! Main application entry point for the AI Guardian moderation dashboard.

use auth::AuthClient;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(
    name = "aiguardian",
    author,
    version,
    about = "AI Guardian Moderation Dashboard"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Override the moderation API base URL
    #[arg(long)]
    api_url: Option<String>,
    /// Override the identity provider API key
    #[arg(long)]
    identity_api_key: Option<String>,
    /// Override the number of parallel card image downloads
    #[arg(long)]
    image_fetch_parallel: Option<usize>,
    /// Persist the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = config::AppConfigOverrides {
        log_level: cli.log_level.clone(),
        api_base_url: cli.api_url.clone(),
        identity_api_key: cli.identity_api_key.clone(),
        image_fetch_parallel: cli.image_fetch_parallel,
    };
    let cfg = config::AppConfig::load_from(cli.config.clone()).apply_overrides(&overrides);

    let log_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aiguardian")
        .join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = rolling::daily(&log_dir, "aiguardian.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    println!("🚀 Starting AI Guardian - Moderation Dashboard");

    if cli.save_config {
        cfg.save_to(cli.config.clone())?;
        println!("💾 Configuration saved");
    }

    let api_key = cfg
        .identity_api_key
        .clone()
        .or_else(|| std::env::var("AIGUARDIAN_IDENTITY_API_KEY").ok());
    let api_key = match api_key {
        Some(key) => key,
        None => {
            eprintln!("❌ Error: no identity provider API key configured.");
            eprintln!("💡 Set one using:");
            eprintln!("   export AIGUARDIAN_IDENTITY_API_KEY=your_api_key");
            eprintln!("   or add identity_api_key to ~/.aiguardian/config");
            return Ok(());
        }
    };

    let auth = Arc::new(AuthClient::with_endpoints(
        api_key,
        cfg.identity_url.clone(),
        cfg.token_url.clone(),
    ));

    tracing::info!(api_base_url = %cfg.api_base_url, "starting dashboard");
    ui::run(auth, cfg.api_base_url.clone(), cfg.image_fetch_parallel)?;

    Ok(())
}
