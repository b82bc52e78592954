//! ragsum: web search with per-result summaries
//!
//! This is the main entry point for the application.

use anyhow::{anyhow, Result};
use ragsum::{
    config,
    content::HttpContentFetcher,
    engines::{EngineLoader, EngineSearchProvider},
    metrics::Metrics,
    network::HttpClient,
    search::{Orchestrator, PipelineOptions},
    summarize::OpenAiSummarizer,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = match parse_args(std::env::args().skip(1))? {
        Some(Command::Run { config }) => config,
        Some(Command::Help) => {
            print_usage();
            return Ok(());
        }
        Some(Command::Version) => {
            println!("ragsum {}", ragsum::VERSION);
            return Ok(());
        }
        None => None,
    };

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting ragsum v{}", ragsum::VERSION);

    let settings = config::load(config_path.as_deref())?;

    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    let engine = EngineLoader::load(&settings.search)?;
    info!("Using search engine: {}", engine.name());

    let metrics = Arc::new(Metrics::new());
    let search = EngineSearchProvider::new(client.clone(), engine, settings.search.timeout());
    let fetcher = HttpContentFetcher::new(&settings.outgoing, settings.fetch.clone())?
        .with_metrics(metrics.clone());
    let summarizer = OpenAiSummarizer::new(client, &settings.summarizer)?;
    info!("Summarizing with model: {}", settings.summarizer.model);

    let orchestrator = Orchestrator::new(Arc::new(search), Arc::new(fetcher), Arc::new(summarizer))
        .with_options(PipelineOptions::from_settings(&settings))
        .with_metrics(metrics);

    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    let app = create_router(AppState::new(settings, orchestrator));

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, PartialEq)]
enum Command {
    Run { config: Option<PathBuf> },
    Help,
    Version,
}

/// Returns `None` when no arguments were given
fn parse_args(args: impl Iterator<Item = String>) -> Result<Option<Command>> {
    let mut args = args.peekable();
    if args.peek().is_none() {
        return Ok(None);
    }

    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Some(Command::Help)),
            "-V" | "--version" => return Ok(Some(Command::Version)),
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("{} requires a file argument", arg))?;
                config = Some(PathBuf::from(path));
            }
            other => return Err(anyhow!("unknown argument: {} (see --help)", other)),
        }
    }

    Ok(Some(Command::Run { config }))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
ragsum v{}
Search the web and summarize each result

USAGE:
    ragsum [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    RAGSUM_SETTINGS_PATH   Path to settings.yml
    RAGSUM_PORT            Server port
    RAGSUM_BIND_ADDRESS    Bind address
    RAGSUM_SEARCH_ENGINE   Search backend (google, brave)
    GOOGLE_API_KEY         Google Custom Search API key
    GOOGLE_CSE_ID          Google Custom Search engine id
    BRAVE_API_KEY          Brave Search API key
    OPENAI_API_KEY         Summarizer API key
    OPENAI_BASE_URL        Summarizer base URL
    OPENAI_MODEL           Summarizer model
    RUST_LOG               Log filter (default: info)
"#,
        ragsum::VERSION
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(args(&[])).unwrap(), None);
        assert_eq!(parse_args(args(&["-h"])).unwrap(), Some(Command::Help));
        assert_eq!(
            parse_args(args(&["--config", "conf.yml"])).unwrap(),
            Some(Command::Run {
                config: Some(PathBuf::from("conf.yml"))
            })
        );
        assert!(parse_args(args(&["-c"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
