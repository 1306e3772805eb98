use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use unifeed::config::Config;
use unifeed::fetch::{build_client, FetchOptions};
use unifeed::store::FeedStore;
use unifeed::timestamp::format_timestamp;
use unifeed::{Document, UnifiedFeed};

/// Exit code for documents that are neither RSS nor Atom.
const EXIT_UNRECOGNIZED: i32 = 2;

/// Get the config directory path (~/.config/unifeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("unifeed"))
}

#[derive(Parser, Debug)]
#[command(
    name = "unifeed",
    about = "Normalize an RSS or Atom feed into unified JSON"
)]
struct Args {
    /// Feed URL (http/https) or path to a local feed file
    source: String,

    /// Config file (defaults to ~/.config/unifeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Render timestamps in local time instead of verbatim
    #[arg(long)]
    format_timestamps: bool,
}

/// Where the feed document comes from.
enum Source {
    Remote(url::Url),
    File(PathBuf),
}

impl Source {
    fn classify(raw: &str) -> Self {
        match url::Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            Ok(url) if url.scheme() == "file" => Self::File(
                url.to_file_path()
                    .unwrap_or_else(|()| PathBuf::from(url.path())),
            ),
            _ => Self::File(PathBuf::from(raw)),
        }
    }
}

/// Replaces parseable raw timestamps with their local display form.
fn format_item_timestamps(feed: &mut UnifiedFeed) {
    for item in &mut feed.items {
        for slot in [&mut item.publish_timestamp, &mut item.last_updated_timestamp] {
            if let Some(formatted) = slot.as_deref().and_then(format_timestamp) {
                *slot = Some(formatted);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    let mut store = FeedStore::new();

    match Source::classify(&args.source) {
        Source::Remote(url) => {
            let options = FetchOptions::from(&config);
            let client = build_client(&options).context("Failed to build HTTP client")?;
            store.fetch_feed(&client, url.as_str(), &options).await;
            if let Some(error) = store.error.take() {
                anyhow::bail!("Failed to fetch feed from {}: {}", url, error);
            }
        }
        Source::File(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read feed file: {}", path.display()))?;
            let doc = Document::parse_bytes(&bytes)
                .with_context(|| format!("Failed to parse feed file: {}", path.display()))?;
            store.load_document(&doc);
        }
    }

    let Some(mut feed) = store.feed.take() else {
        eprintln!("Warning: {} is neither an RSS nor an Atom feed", args.source);
        std::process::exit(EXIT_UNRECOGNIZED);
    };

    if args.format_timestamps || config.format_timestamps {
        format_item_timestamps(&mut feed);
    }

    let json = if args.compact {
        serde_json::to_string(&feed)
    } else {
        serde_json::to_string_pretty(&feed)
    }
    .context("Failed to serialize feed")?;
    println!("{}", json);

    Ok(())
}
