//! Generic HTTP fetching with typed failures

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::error::AppError;

/// Longest body excerpt kept in an upstream status error.
const ERROR_BODY_LIMIT: usize = 512;

/// Performs one GET and returns the response body as text.
///
/// No retries: a transport failure or a non-success status is reported to
/// the caller as is. Non-success statuses carry the status code and the
/// (truncated) body text.
#[instrument(skip(client))]
pub(super) async fn fetch_text(client: &Client, url: &str) -> Result<String, AppError> {
    info!("Fetching data from URL: {url}");

    let response = client.get(url).send().await.map_err(|e| {
        error!("Request failed for URL {url}: {e}");
        AppError::from_reqwest(url, &e)
    })?;

    let status = response.status();
    debug!("Response status: {status}");

    let body = response.text().await.map_err(|e| {
        error!("Failed to read response body from URL {url}: {e}");
        AppError::from_reqwest(url, &e)
    })?;

    if !status.is_success() {
        let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        let excerpt = if excerpt.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            excerpt
        };
        error!("HTTP {} - {} (URL: {})", status.as_u16(), excerpt, url);
        return Err(AppError::upstream_status(status.as_u16(), excerpt, url));
    }

    debug!("Response length: {} bytes", body.len());
    Ok(body)
}

/// Parses a body into JSON, classifying failures.
pub(super) fn parse_json_value(body: &str, url: &str) -> Result<Value, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::api_no_data("Response body is empty", url));
    }
    serde_json::from_str::<Value>(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        error!("Failed to parse API response: {e} (URL: {url})");
        debug!("Response text (first 200 chars): {preview}");
        AppError::api_malformed_json(e.to_string(), url)
    })
}

/// Fetches `url` and decodes the body as untyped JSON.
pub(super) async fn fetch_json(client: &Client, url: &str) -> Result<Value, AppError> {
    let body = fetch_text(client, url).await?;
    parse_json_value(&body, url)
}

/// Fetches `url` and decodes the body into `T`.
///
/// Invalid JSON is `ApiMalformedJson`; valid JSON of the wrong shape is
/// `ApiUnexpectedStructure`.
pub(super) async fn fetch<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, AppError> {
    let value = fetch_json(client, url).await?;
    serde_json::from_value::<T>(value).map_err(|e| {
        error!("Unexpected response structure: {e} (URL: {url})");
        AppError::api_unexpected_structure(e.to_string(), url)
    })
}
