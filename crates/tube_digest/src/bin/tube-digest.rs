use std::{process::ExitCode, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tube_digest::{
    anthropic::AnthropicClient,
    config::{ApiKey, DispatchConfig},
    tokenizer::{Encoding, TokenEstimator},
    tracing::init_tracing_subscriber,
    web::{run_server, DEFAULT_PORT},
    yt::loader::CaptionLoader,
    SummaryDispatcher, SummaryDispatcherBuilder,
};

#[derive(Parser)]
#[command(name = "tube-digest", about = "Summarize YouTube videos from their transcripts")]
struct Cli {
    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    /// Model used for summarization
    #[arg(long, env = "ANTHROPIC_MODEL", default_value = "claude-3-5-sonnet-20240620")]
    model: String,

    /// Tokenizer encoding used to measure transcripts
    #[arg(long, env = "TOKEN_ENCODING", default_value = "cl100k_base")]
    encoding: String,

    /// Seconds to wait for a transcript before giving up
    #[arg(long, env = "LOAD_TIMEOUT_SECS", default_value = "60")]
    load_timeout_secs: u64,

    /// Seconds to wait for a summary before giving up
    #[arg(long, env = "SUMMARIZE_TIMEOUT_SECS", default_value = "600")]
    summarize_timeout_secs: u64,

    /// Preferred caption languages, most preferred first
    #[arg(long, env = "TRANSCRIPT_LANGUAGES", value_delimiter = ',', default_value = "en")]
    languages: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the summary form
    Serve {
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Summarize a single video and print the result
    Summarize {
        /// https://www.youtube.com/watch?v=<id>
        url: String,
    },
}

type Dispatcher = SummaryDispatcher<CaptionLoader, AnthropicClient, TokenEstimator>;

/// Everything that can fail on misconfiguration happens here, before any request.
fn build_dispatcher(cli: &Cli) -> anyhow::Result<Dispatcher> {
    let api_key = ApiKey::resolve(cli.anthropic_api_key.clone())?;
    let counter = TokenEstimator::new(cli.encoding.parse::<Encoding>()?)?;

    let config = DispatchConfig::for_summarizer::<AnthropicClient>()
        .with_load_timeout(Duration::from_secs(cli.load_timeout_secs))
        .with_summarize_timeout(Duration::from_secs(cli.summarize_timeout_secs));

    tracing::info!(
        budget = config.context_budget,
        encoding = %counter.encoding(),
        model = %cli.model,
        "Configured summary dispatcher"
    );

    let summarizer = AnthropicClient::new(api_key).with_model(&cli.model);
    let loader = CaptionLoader::default().with_languages(cli.languages.clone());

    Ok(SummaryDispatcherBuilder::new(config)
        .loader(loader)
        .summarizer(summarizer)
        .token_counter(counter)
        .build())
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down...");
    token.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let dispatcher = build_dispatcher(&cli)
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    match cli.command {
        Command::Serve { port } => {
            let token = CancellationToken::new();
            tokio::spawn(shutdown_signal(token.clone()));

            tracing::info!(port, "Starting summary server...");
            run_server(Arc::new(dispatcher), port, token).await?;
        }
        Command::Summarize { url } => match dispatcher.summarize_input(&url).await {
            Ok(summary) => println!("{summary}"),
            Err(e) => {
                eprintln!("{}", e.advisory());
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
