//! SmartStudy server
//!
//! Study assistant backend: prompt generation over a rotating pool of Gemini
//! API keys, and text extraction from uploaded PDF, DOCX and PPTX files.

use anyhow::Result;
use clap::Parser;
use smartstudy::{
    config::{Environment, LogFormat, Settings},
    logging::init_tracing,
    server::App,
    services::sanitizer::SanitizerMode,
};

/// SmartStudy server
#[derive(Parser, Debug)]
#[command(name = "smartstudy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT env var)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides HOST env var)
    #[arg(long)]
    host: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (overrides LOG_FORMAT env var)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Environment: dev, staging, prod (overrides ENVIRONMENT env var)
    #[arg(short, long)]
    env: Option<Environment>,

    /// Sanitizer applied to generated text: full or minimal (overrides SANITIZER_MODE)
    #[arg(long)]
    sanitizer: Option<SanitizerMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logging, so we can use log_level)
    let mut settings = Settings::load()?;

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(log_format) = args.log_format {
        settings.log_format = log_format;
    }
    if let Some(env) = args.env {
        settings.environment = env;
    }
    if let Some(mode) = args.sanitizer {
        settings.sanitizer_mode = mode;
    }
    settings.validate()?;

    init_tracing(&settings.log_level, settings.log_format);

    tracing::info!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        environment = %settings.environment,
        host = %settings.host,
        port = %settings.port,
        model = %settings.gemini.model,
        credentials = settings.gemini.api_keys.len(),
        sanitizer = %settings.sanitizer_mode,
        "Starting application"
    );

    let app = App::new(settings).await?;

    app.run_with_graceful_shutdown().await?;

    tracing::info!("Application shutdown complete");

    Ok(())
}
