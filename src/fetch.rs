use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::db;
use crate::extract::{self, Quad};

const USER_AGENT: &str = "wikiquad/0.1 (structured data extraction)";
const CONCURRENCY: usize = 4;

/// Reject non-Wikipedia URLs before any network I/O.
pub fn validate_url(url: &str) -> Result<()> {
    if !url.contains("wikipedia.org") {
        bail!("URL must be a Wikipedia page: {url}");
    }
    Ok(())
}

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

/// Fetch one page and return its raw HTML. Non-success status is an
/// error here; the extractor itself is never invoked without a page.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("{url} returned {status}");
    }
    resp.text()
        .await
        .with_context(|| format!("failed to read body of {url}"))
}

pub struct StoreStats {
    pub pages: usize,
    pub ok: usize,
    pub errors: usize,
    pub quads: usize,
}

struct PageResult {
    url: String,
    quads: Vec<Quad>,
    error: Option<String>,
}

/// Fetch and extract pages concurrently, persisting each page's quads
/// as its result arrives. A failed fetch is counted and logged, never
/// fatal for the batch.
pub async fn store_pages_streaming(conn: &Connection, urls: Vec<String>) -> Result<StoreStats> {
    let client = Arc::new(client()?);
    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));
    let total = urls.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Channel: workers send results, main loop saves to DB
    let (tx, mut rx) = tokio::sync::mpsc::channel::<PageResult>(CONCURRENCY * 2);

    for url in urls {
        let client = Arc::clone(&client);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let result = match fetch_page(&client, &url).await {
                Ok(html) => PageResult {
                    quads: extract::extract_quads(&html),
                    error: None,
                    url,
                },
                Err(e) => {
                    warn!("Fetch failed for {}: {}", url, e);
                    PageResult {
                        quads: Vec::new(),
                        error: Some(e.to_string()),
                        url,
                    }
                }
            };
            let _ = tx.send(result).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut ok = 0usize;
    let mut errors = 0usize;
    let mut quads = 0usize;

    while let Some(result) = rx.recv().await {
        if result.error.is_some() {
            errors += 1;
        } else {
            ok += 1;
            quads += result.quads.len();
            db::insert_quads(conn, &result.quads, &result.url, Utc::now())?;
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Stored {} quads from {} pages ({} ok, {} errors)",
        quads, total, ok, errors
    );

    Ok(StoreStats {
        pages: total,
        ok,
        errors,
        quads,
    })
}
