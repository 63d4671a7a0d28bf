//! Server update polling.
//!
//! The server exposes a "last update" endpoint answering with a unix
//! timestamp. When it moves past the instant our timer was loaded, the
//! display reloads its phases.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::RefreshConfig;
use crate::tui::event::AppEvent;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("response [{body}] is not a timestamp")]
    NotATimestamp { body: String },
}

/// Fetch the server's last update time.
pub async fn fetch_last_update(client: &reqwest::Client, url: &str) -> Result<i64, PollError> {
    let transport = |source: reqwest::Error| PollError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(PollError::Status {
            url: url.to_string(),
            status,
        });
    }
    let body = response.text().await.map_err(transport)?;
    parse_last_update(&body)
}

/// Parse an endpoint body. Surrounding whitespace is tolerated, and so is
/// any numeric spelling of an integral value (`12.0`, `1e9`).
pub fn parse_last_update(body: &str) -> Result<i64, PollError> {
    let body = body.trim();
    if let Ok(value) = body.parse::<i64>() {
        return Ok(value);
    }
    match body.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(PollError::NotATimestamp {
            body: body.to_string(),
        }),
    }
}

/// Whether the server content is strictly newer than our baseline.
pub fn is_newer(last_update: i64, baseline: i64) -> bool {
    last_update > baseline
}

/// Polls `url` every `interval` on a background thread.
///
/// Sends `AppEvent::Updated` with the server timestamp when it is newer
/// than the current baseline. The baseline is the latest timestamp the
/// display acknowledged, so one server change triggers one reload. The
/// thread stops when the receiving side of the channel goes away.
pub struct Poller {
    _handle: std::thread::JoinHandle<()>,
}

impl Poller {
    /// Start polling when `[refresh] url` is set.
    pub fn from_config(config: &RefreshConfig, baseline: i64, tx: Sender<AppEvent>) -> Result<Option<Self>> {
        let Some(url) = &config.url else {
            return Ok(None);
        };
        let interval = Duration::from_secs(config.interval_secs.max(1));
        tracing::info!(url = %url, interval_secs = interval.as_secs(), "polling for server updates");
        Self::spawn(url.clone(), interval, baseline, tx).map(Some)
    }

    pub fn spawn(url: String, interval: Duration, baseline: i64, tx: Sender<AppEvent>) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create async runtime")?;
        let client = reqwest::Client::builder()
            .timeout(interval)
            .build()
            .context("Failed to build HTTP client")?;

        let handle = std::thread::spawn(move || {
            let mut baseline = baseline;
            loop {
                match rt.block_on(fetch_last_update(&client, &url)) {
                    Ok(last_update) if is_newer(last_update, baseline) => {
                        tracing::info!(url = %url, last_update, baseline, "server content updated");
                        baseline = last_update;
                        if tx.send(AppEvent::Updated(last_update)).is_err() {
                            return;
                        }
                    }
                    Ok(last_update) => {
                        tracing::debug!(url = %url, last_update, baseline, "no update");
                    }
                    Err(e @ PollError::NotATimestamp { .. }) => {
                        tracing::debug!(url = %url, error = %e, "ignoring poll response");
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "update poll failed");
                    }
                }
                std::thread::sleep(interval);
            }
        });

        Ok(Self { _handle: handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_timestamp() {
        assert_eq!(parse_last_update("1760875200").unwrap(), 1760875200);
        assert_eq!(parse_last_update(" 42\n").unwrap(), 42);
    }

    #[test]
    fn parse_rejects_non_integers() {
        for body in ["", "12.5", "null", "<html>", "inf", "NaN", "1e30"] {
            let err = parse_last_update(body).unwrap_err();
            assert!(matches!(err, PollError::NotATimestamp { .. }), "{body}");
        }
    }

    #[test]
    fn parse_accepts_integral_numbers() {
        assert_eq!(parse_last_update("12.0").unwrap(), 12);
        assert_eq!(parse_last_update("1e9").unwrap(), 1_000_000_000);
        assert_eq!(parse_last_update("-3.00").unwrap(), -3);
    }

    #[test]
    fn newer_is_strict() {
        assert!(is_newer(101, 100));
        assert!(!is_newer(100, 100));
        assert!(!is_newer(99, 100));
    }

    #[test]
    fn not_a_timestamp_message_shows_body() {
        let err = parse_last_update("oops").unwrap_err();
        assert_eq!(err.to_string(), "response [oops] is not a timestamp");
    }
}
