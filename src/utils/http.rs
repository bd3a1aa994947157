// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::ACCEPT;
use url::Url;

use crate::error::{AppError, Result};
use crate::ics;
use crate::models::FetchConfig;

const CALENDAR_ACCEPT: &str = "text/calendar, text/plain, */*";

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Normalize a calendar link and check it against the allow-list.
///
/// `webcal://` links are fetched over HTTPS.
pub fn calendar_url(config: &FetchConfig, raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url = Url::parse(raw)?;

    if url.scheme().eq_ignore_ascii_case("webcal") {
        let rewritten = format!("https{}", &raw[url.scheme().len()..]);
        url = Url::parse(&rewritten)?;
    }

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::fetch(raw, format!("unsupported scheme '{}'", url.scheme())));
    }

    let host = url
        .host_str()
        .ok_or_else(|| AppError::fetch(raw, "URL has no host"))?;
    if !config.is_allowed(host) {
        return Err(AppError::fetch(raw, format!("domain '{}' is not allowed", host)));
    }

    Ok(url)
}

/// Fetch a calendar body.
pub async fn fetch_calendar(
    client: &reqwest::Client,
    config: &FetchConfig,
    raw_url: &str,
) -> Result<String> {
    let url = calendar_url(config, raw_url)?;
    log::debug!("Fetching calendar from {}", url.host_str().unwrap_or_default());

    let response = client
        .get(url.clone())
        .header(ACCEPT, CALENDAR_ACCEPT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::fetch(
            url.host_str().unwrap_or_default(),
            format!("HTTP {}", status),
        ));
    }

    let body = response.text().await?;
    ensure_calendar(url.host_str().unwrap_or_default(), body)
}

/// Reject bodies with no `VCALENDAR` block, such as login or error pages.
fn ensure_calendar(host: &str, body: String) -> Result<String> {
    if !ics::contains_calendar(&body) {
        return Err(AppError::fetch(host, "response is not an iCalendar document"));
    }
    Ok(body)
}
