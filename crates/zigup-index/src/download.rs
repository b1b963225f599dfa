//! HTTP downloads.
//!
//! One GET per call, keep-alive disabled, body streamed to the writer in
//! chunks. No retries; callers decide what a failure means.

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONNECTION, HeaderValue};
use std::io::Write;
use tracing::debug;
use zigup_core::{DownloadStage, Error};

fn client() -> Result<Client, Error> {
    // Proxy discovery is reqwest's default behavior.
    Client::builder()
        .build()
        .map_err(|e| download_error(DownloadStage::Connect, "", e))
}

fn download_error(stage: DownloadStage, url: &str, detail: impl ToString) -> Error {
    Error::DownloadFailed {
        stage,
        url: url.to_string(),
        detail: detail.to_string(),
    }
}

fn classify(url: &str, e: reqwest::Error) -> Error {
    let stage = if e.is_builder() {
        DownloadStage::Url
    } else if e.is_connect() {
        DownloadStage::Connect
    } else {
        DownloadStage::Transfer
    };
    download_error(stage, url, e)
}

/// Download `url` into `writer`, reporting progress as `(bytes, total)`.
///
/// Returns the number of bytes written.
pub async fn download_with<W, F>(url: &str, writer: &mut W, mut progress: F) -> Result<u64, Error>
where
    W: Write + ?Sized,
    F: FnMut(u64, Option<u64>),
{
    reqwest::Url::parse(url).map_err(|e| download_error(DownloadStage::Url, url, e))?;

    debug!("Downloading {}", url);
    let response = client()?
        .get(url)
        .header(CONNECTION, HeaderValue::from_static("close"))
        .send()
        .await
        .map_err(|e| classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(download_error(DownloadStage::Status, url, status));
    }

    let total = response.content_length();
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| download_error(DownloadStage::Transfer, url, e))?;
        writer
            .write_all(&chunk)
            .map_err(|e| download_error(DownloadStage::Write, url, e))?;
        written += chunk.len() as u64;
        progress(written, total);
    }

    debug!(bytes = written, "Download complete");
    Ok(written)
}

/// Download `url` into `writer` without progress reporting.
pub async fn download<W>(url: &str, writer: &mut W) -> Result<u64, Error>
where
    W: Write + ?Sized,
{
    download_with(url, writer, |_, _| {}).await
}

/// Download `url` into a string.
pub async fn download_to_string(url: &str) -> Result<String, Error> {
    let mut buf = Vec::new();
    download(url, &mut buf).await?;
    String::from_utf8(buf).map_err(|e| download_error(DownloadStage::Transfer, url, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_url_stage() {
        let mut sink = Vec::new();
        let err = download("not a url", &mut sink).await.unwrap_err();
        match err {
            Error::DownloadFailed { stage, .. } => assert_eq!(stage, DownloadStage::Url),
            other => panic!("unexpected error: {other}"),
        }
    }
}
