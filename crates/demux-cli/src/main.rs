use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{TimeDelta, Utc};
use clap::{Parser, ValueEnum};
use demux_core::{Context, RawEvent, new_demux_handler};
use tokio::io::AsyncReadExt;
use tokio::time::{Duration, timeout};
use tracing_subscriber::EnvFilter;

mod events;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "demux")]
#[command(about = "Route a JSON event payload to its typed handler", long_about = None)]
struct Args {
    /// Event JSON file (stdin when omitted)
    #[arg(short, long, env = "DEMUX_EVENT")]
    event: Option<PathBuf>,

    /// Invocation deadline in milliseconds
    #[arg(long, env = "DEMUX_TIMEOUT_MS", default_value_t = 3000)]
    timeout_ms: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

/// ログは stderr に出す（stdout は reply 専用）
fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn read_event(path: Option<&Path>) -> anyhow::Result<RawEvent> {
    let text = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read event file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read event from stdin")?;
            buf
        }
    };

    // 空入力は「ペイロードなし」として扱う
    if text.trim().is_empty() {
        return Ok(RawEvent::empty());
    }
    serde_json::from_str(&text).context("event is not valid JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);

    // (A) demux を構築（失敗しても呼び出し時にエラーとして返る）
    let entry = new_demux_handler(Some(events::config()));

    // (B) イベントを読み込む
    let raw = read_event(args.event.as_deref()).await?;

    // (C) deadline 付きの Context で 1 回だけ呼び出す
    let budget = i64::try_from(args.timeout_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .context("timeout is out of range")?;
    let ctx = Context::background().with_deadline(Utc::now() + budget);
    tracing::debug!(invocation_id = %ctx.invocation_id(), "invoking demux");

    let reply = timeout(Duration::from_millis(args.timeout_ms), entry.invoke(ctx, &raw))
        .await
        .context("invocation timed out")??;

    // (D) reply を JSON で出力
    let json = reply.to_json().context("failed to encode reply")?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
