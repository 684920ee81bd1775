use anyhow::{Context, Result};
use clap::Parser;
use reviewlens_core::{NewReview, Review};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

/// Load review JSON/JSONL files and post them to a running server.
#[derive(Parser)]
#[command(name = "ingest")]
struct Args {
    /// Input path (file or directory of .json/.jsonl files)
    #[arg(long)]
    input: PathBuf,
    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,
    /// Reviews per POST /ingest request
    #[arg(long, default_value_t = 100)]
    batch_size: usize,
}

fn collect_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.is_file()
                && matches!(
                    p.extension().and_then(|s| s.to_str()),
                    Some("json") | Some("jsonl")
                )
        })
        .collect()
}

fn read_reviews(path: &Path) -> Result<Vec<NewReview>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut reviews = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            reviews.push(
                serde_json::from_str(&line)
                    .with_context(|| format!("parse line in {}", path.display()))?,
            );
        }
        Ok(reviews)
    } else {
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse {}", path.display()))
    }
}

async fn post_batch(client: &reqwest::Client, server: &str, batch: &[NewReview]) -> Result<usize> {
    let resp = client
        .post(format!("{server}/ingest"))
        .json(batch)
        .send()
        .await?
        .error_for_status()?;
    let created: Vec<Review> = resp.json().await?;
    Ok(created.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let files = collect_files(&args.input);
    anyhow::ensure!(!files.is_empty(), "no .json/.jsonl files under {}", args.input.display());

    let client = reqwest::Client::new();
    let mut total = 0usize;
    for file in files {
        let reviews = read_reviews(&file)?;
        tracing::info!(file = %file.display(), count = reviews.len(), "loaded reviews");
        for batch in reviews.chunks(args.batch_size.max(1)) {
            total += post_batch(&client, &args.server, batch).await?;
        }
    }
    tracing::info!(total, "ingest complete");
    Ok(())
}
