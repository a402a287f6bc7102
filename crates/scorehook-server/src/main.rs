mod error;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use scorehook_core::{LongNamePolicy, ValidatorOptions};
use scorehook_notify::{NotifierConfig, WebhookClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::routes::AppState;

#[derive(Parser, Debug)]
#[command(name = "scorehook")]
#[command(version, about = "Validates quiz score submissions and forwards them to a webhook", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Webhook that receives each report
    #[arg(long, env = "URL", default_value = "")]
    webhook_url: String,

    /// Avatar image sent alongside each report
    #[arg(long, env = "PFP", default_value = "")]
    avatar_url: String,

    /// Report author is "<prefix> - <name>"
    #[arg(long, env = "TITLE_PREFIX", default_value = "PCBValues")]
    title_prefix: String,

    /// Allowed CORS origin (repeatable, or comma-separated)
    #[arg(
        long,
        env = "ALLOW_ORIGIN",
        value_delimiter = ',',
        default_value = "https://pcbvalues.github.io"
    )]
    allow_origin: Vec<String>,

    /// Number of scores each submission must carry
    #[arg(long, env = "SCORE_COUNT", default_value_t = scorehook_core::submission::DEFAULT_SCORE_COUNT)]
    score_count: usize,

    /// Over-length name handling: stride or truncate
    #[arg(long, env = "LONG_NAMES", default_value = "stride")]
    long_names: LongNamePolicy,

    /// Webhook request timeout
    #[arg(long, env = "NOTIFY_TIMEOUT_SECS", default_value_t = 10)]
    notify_timeout_secs: u64,

    /// HEAD the webhook at startup and exit if it is unreachable
    #[arg(long, env = "CHECK_WEBHOOK")]
    check_webhook: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);
    info!("scorehook v{}", env!("CARGO_PKG_VERSION"));

    let notifier_config = NotifierConfig {
        url: args.webhook_url.clone(),
        avatar_url: args.avatar_url.clone(),
        title_prefix: args.title_prefix.clone(),
    };
    if notifier_config.url.trim().is_empty() {
        warn!("no webhook URL configured; every submission will fail delivery");
    }

    let webhook = WebhookClient::new(
        &notifier_config,
        Duration::from_secs(args.notify_timeout_secs),
    )
    .context("building webhook client")?;
    if args.check_webhook {
        webhook.check().await.context("checking webhook")?;
        info!(url = %webhook.url(), "webhook reachable");
    }

    let origins = args
        .allow_origin
        .iter()
        .map(|o| HeaderValue::from_str(o.trim()))
        .collect::<Result<Vec<_>, _>>()
        .context("parsing --allow-origin")?;

    let options = ValidatorOptions {
        score_count: args.score_count,
        long_names: args.long_names,
    };
    info!(
        score_count = options.score_count,
        long_names = ?options.long_names,
        origins = ?args.allow_origin,
        "validator configured"
    );

    let state = Arc::new(AppState {
        options,
        notifier_config,
        notifier: Arc::new(webhook),
    });
    let app = routes::router(state, origins);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!(bind = %args.bind, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
