use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use deepl_pipe::pipe::{self, PipeOptions, PipeSummary};
use deepl_pipe::{Config, DeepLClient};

/// Translate stdin line by line through the DeepL app endpoint.
#[derive(Parser, Debug)]
#[command(name = "deepl-pipe", version, about)]
struct Cli {
    /// Target language code (defaults to the configured one, ZH)
    target_lang: Option<String>,

    /// Source language code; detected per line when omitted
    #[arg(short, long, default_value = "")]
    source: String,

    /// Also print the original line after each translation
    #[arg(short, long)]
    print_original: bool,

    /// Config file (YAML or JSON); falls back to CONFIG_PATH, then ./deepl-pipe.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "deepl_pipe=debug" } else { "deepl_pipe=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(summary) if summary.all_succeeded() => ExitCode::SUCCESS,
        Ok(summary) => {
            error!("{} line(s) failed to translate", summary.failed);
            ExitCode::from(1)
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<PipeSummary> {
    let mut config = Config::resolve(cli.config.as_deref()).context("loading configuration")?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(timeout) = cli.timeout {
        anyhow::ensure!(timeout > 0, "--timeout must be positive");
        config.timeout_secs = timeout;
    }

    let target_lang = cli
        .target_lang
        .unwrap_or_else(|| config.default_target_lang.clone());
    info!(
        "Translating stdin to {} via {}",
        target_lang, config.endpoint
    );

    let client = DeepLClient::new(&config).context("building HTTP client")?;
    let options = PipeOptions {
        source_lang: cli.source.to_uppercase(),
        target_lang: target_lang.to_uppercase(),
        print_original: cli.print_original,
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let summary = pipe::run(&client, &options, stdin, stdout)
        .await
        .context("reading input or writing output")?;
    Ok(summary)
}
