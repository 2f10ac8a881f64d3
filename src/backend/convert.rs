//! Conversion endpoint wrapper.
//!
//! The request is split in two halves so the caller can observe the moment
//! the service accepts the job (`send`) before the body is read (`read_result`).

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::ServerCfg, model::Quality};

/// Request body for `POST /convert`.
#[derive(Debug, Serialize)]
struct ConvertReq<'a> {
    url: &'a str,
    quality: Quality,
}

/// Successful conversion result.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ConvertResponse {
    pub info: VideoInfo,
    /// Path of the artifact relative to the service origin.
    pub download_url: String,
    /// Server-side file name, doubles as the history id.
    pub filename: String,
}

/// Metadata of the source video.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
}

/// Error body of a rejected request. `detail` is not always a string
/// (validation failures send a list), so it is kept untyped.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Why a conversion request did not produce a result.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
    /// No usable `detail` in the body.
    #[error("Conversion failed. Please check the backend logs.")]
    RejectedWithoutDetail { status: StatusCode },
    #[error("The conversion service did not answer in time.")]
    TimedOut,
    #[error("Could not reach the conversion service at {origin}.")]
    Unreachable {
        origin: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected response from the conversion service.")]
    MalformedResponse(#[source] reqwest::Error),
}

impl RequestError {
    /// HTTP status of a rejection, if the service answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Rejected { status, .. } | RequestError::RejectedWithoutDetail { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Send the conversion request and return the accepted (2xx) response.
///
/// Transport failures are retried `server.retries` times; an answer from the
/// service, even a rejection, ends the attempt.
pub async fn send(
    http: &Client,
    server: &ServerCfg,
    url: &str,
    quality: Quality,
) -> Result<Response, RequestError> {
    let endpoint = format!("{}/convert", server.origin());
    let body = ConvertReq { url, quality };
    let mut attempt = 0;
    loop {
        match http.post(&endpoint).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(resp),
            Ok(resp) => return Err(rejection(resp).await),
            Err(e) if attempt < server.retries => {
                attempt += 1;
                tracing::warn!(
                    "convert attempt {attempt}/{} failed: {e}",
                    server.retries + 1
                );
                tokio::time::sleep(server.retry_delay()).await;
            }
            Err(e) if e.is_timeout() => return Err(RequestError::TimedOut),
            Err(e) => {
                return Err(RequestError::Unreachable {
                    origin: server.origin().to_string(),
                    source: e,
                });
            }
        }
    }
}

/// Read the body of an accepted response.
pub async fn read_result(resp: Response) -> Result<ConvertResponse, RequestError> {
    resp.json::<ConvertResponse>().await.map_err(|e| {
        if e.is_timeout() {
            RequestError::TimedOut
        } else {
            RequestError::MalformedResponse(e)
        }
    })
}

/// Map a non-2xx response into a user-facing error.
async fn rejection(resp: Response) -> RequestError {
    let status = resp.status();
    let body = resp.json::<ErrorBody>().await.unwrap_or_default();
    match body.detail {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => {
            tracing::warn!("convert rejected ({status}): {detail}");
            RequestError::Rejected { status, detail }
        }
        _ => {
            tracing::warn!("convert rejected ({status}) without detail");
            RequestError::RejectedWithoutDetail { status }
        }
    }
}
