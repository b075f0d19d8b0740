use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use clap::Parser;
use spike_pulse::{
    anthropic::AnthropicClient,
    api::{self, AppState},
    emotion::HttpEmotionClient,
    policy::InsightPolicy,
    tracing::init_tracing_subscriber,
    InsightServiceBuilder,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "spike-pulse", about = "Live stream insight relay", version)]
struct Cli {
    /// Address the HTTP server binds to
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8001")]
    listen_addr: SocketAddr,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_key: Option<String>,

    /// Override for the Anthropic API base URL
    #[arg(long, env = "ANTHROPIC_BASE_URL")]
    anthropic_base_url: Option<String>,

    /// Upper bound on a single model call, in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value = "10")]
    llm_timeout_secs: u64,

    /// Emotion classifier endpoint
    #[arg(long, env = "EMOTION_API_URL")]
    emotion_url: Option<String>,

    /// Emotion classifier API key
    #[arg(long, env = "EMOTION_API_KEY", hide_env_values = true)]
    emotion_key: Option<String>,

    /// Comma separated list of allowed origins, `*` for any
    #[arg(long, env = "CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Answer from the fallback instead of HTTP 500 when no API key is set
    #[arg(long, env = "DEGRADE_WITHOUT_CREDENTIALS", default_value_t = false)]
    degrade_without_credentials: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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

    let mut anthropic = AnthropicClient::new(
        cli.anthropic_key,
        Duration::from_secs(cli.llm_timeout_secs),
    )
    .context("Failed to build Anthropic client")?;
    if let Some(base_url) = cli.anthropic_base_url {
        anthropic = anthropic.with_base_url(base_url);
    }

    let emotion = HttpEmotionClient::new(
        cli.emotion_url,
        cli.emotion_key,
        HttpEmotionClient::DEFAULT_TIMEOUT,
    )
    .context("Failed to build emotion client")?;
    if !emotion.is_configured() {
        tracing::warn!("EMOTION_API_URL is not set, /analyze-emotion will always return neutral");
    }

    let insights = InsightServiceBuilder::new()
        .model(anthropic)
        .policy(InsightPolicy::default())
        .degrade_without_credentials(cli.degrade_without_credentials)
        .build();

    let router = api::create_router(
        AppState { insights, emotion },
        api::cors_layer(&cli.cors_origins),
    );

    let listener = TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen_addr))?;

    tracing::info!(addr = %cli.listen_addr, version = spike_pulse::VERSION, "Starting spike-pulse");
    api::serve(listener, router).await?;

    Ok(())
}
