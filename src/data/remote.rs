//! Remote feed fetch.
//!
//! The original dashboard served `sku_data.csv` next to the page and fetched
//! it over HTTP; the equivalent here is `--url` or the `SKU_FEED_URL`
//! environment variable (read via `.env` when present).

use reqwest::blocking::Client;

use crate::error::AppError;

pub const FEED_URL_ENV: &str = "SKU_FEED_URL";

/// Resolve a feed URL from the environment, if configured.
pub fn feed_url_from_env() -> Option<String> {
    dotenvy::dotenv().ok();
    std::env::var(FEED_URL_ENV)
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Fetch the raw feed bytes from a URL.
///
/// Returns bytes, not text: decoding is the ingest layer's job since the feed
/// may be GBK.
pub fn fetch_feed_bytes(url: &str) -> Result<Vec<u8>, AppError> {
    let client = Client::new();
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::runtime(format!("Feed request to '{url}' failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::runtime(format!(
            "Feed request to '{url}' failed with status {}.",
            resp.status()
        )));
    }

    resp.bytes()
        .map(|b| b.to_vec())
        .map_err(|e| AppError::runtime(format!("Failed to read feed body from '{url}': {e}")))
}
