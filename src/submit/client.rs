//! Core `SubmissionClient` trait and HTTP implementation.
//!
//! `HttpSubmissionClient` speaks the synthesis server's two-endpoint
//! protocol: a multipart upload of the encoded utterance, and a plain GET
//! for the synthesized reply resource.  All connection details come from
//! [`SubmissionConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SubmissionConfig;

// ---------------------------------------------------------------------------
// SubmitError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the synthesis server.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered the upload with a non-success status.
    #[error("upload rejected with HTTP status {status}")]
    Rejected { status: u16 },
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SubmitError::Timeout
        } else {
            SubmitError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// UploadRequest
// ---------------------------------------------------------------------------

/// One encoded utterance ready for submission.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Complete WAV file bytes (see [`crate::audio::encode_wav`]).
    pub wav: Vec<u8>,
    /// Utterance label: the start timestamp in Unix milliseconds, as a
    /// decimal string.  Truncated to [`LABEL_LEN`] characters it names both
    /// the uploaded file and the reply resource.
    pub label: String,
    /// Voice label forwarded as the `name` form field.
    pub voice: String,
    /// Whether to request the server's higher-quality model.
    pub advanced_model: bool,
}

/// Characters of the label used in file and resource names.
///
/// A millisecond timestamp truncated to 10 decimal digits is the epoch in
/// whole seconds, which is stable for the server's filename handling.
pub const LABEL_LEN: usize = 10;

/// Truncate an utterance label for use in file and resource names.
pub fn truncated_label(label: &str) -> &str {
    &label[..label.len().min(LABEL_LEN)]
}

// ---------------------------------------------------------------------------
// SubmissionClient trait
// ---------------------------------------------------------------------------

/// Async trait over the synthesis server protocol.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn SubmissionClient>`).
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Phase 1: upload one encoded utterance.
    ///
    /// A success only confirms receipt — synthesis continues server-side
    /// and the reply must be polled for separately.
    async fn submit(&self, upload: UploadRequest) -> Result<(), SubmitError>;

    /// Phase 2: try to fetch the reply resource once.
    ///
    /// Returns `Ok(Some(bytes))` when the reply is ready, `Ok(None)` when
    /// the server does not have it yet (any non-success status), and `Err`
    /// only for transport-level failures.
    async fn fetch_reply(&self, resource: &str) -> Result<Option<Vec<u8>>, SubmitError>;
}

// ---------------------------------------------------------------------------
// HttpSubmissionClient
// ---------------------------------------------------------------------------

/// Talks to the synthesis server over HTTP.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `upload_path`) come exclusively from
/// the [`SubmissionConfig`] passed to [`HttpSubmissionClient::from_config`].
pub struct HttpSubmissionClient {
    client: reqwest::Client,
    config: SubmissionConfig,
}

impl HttpSubmissionClient {
    /// Build a client from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &SubmissionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    /// Upload the utterance as a multipart form.
    ///
    /// Fields: `audio` (the WAV file, named `<truncated-label>.wav`),
    /// `name` (voice label), `advanced_model` (`"on"`/`"off"`).  The
    /// server's acknowledgement body is logged at debug level and otherwise
    /// ignored — receipt is all it confirms.
    async fn submit(&self, upload: UploadRequest) -> Result<(), SubmitError> {
        let filename = format!("{}.wav", truncated_label(&upload.label));
        let url = format!("{}{}", self.base_url(), self.config.upload_path);

        let part = reqwest::multipart::Part::bytes(upload.wav)
            .file_name(filename)
            .mime_str("audio/wav")?;
        let form = reqwest::multipart::Form::new()
            .part("audio", part)
            .text("name", upload.voice)
            .text(
                "advanced_model",
                if upload.advanced_model { "on" } else { "off" },
            );

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
            });
        }

        match response.json::<serde_json::Value>().await {
            Ok(ack) => log::debug!("upload acknowledged: {ack}"),
            Err(e) => log::debug!("upload acknowledged (unreadable body: {e})"),
        }
        Ok(())
    }

    async fn fetch_reply(&self, resource: &str) -> Result<Option<Vec<u8>>, SubmitError> {
        let url = format!("{}/{}", self.base_url(), resource);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
