//! Two-phase submission: upload, then timed reply polling.
//!
//! Phase 1 uploads the encoded utterance; the server acknowledges receipt
//! and synthesizes in the background.  Phase 2 waits a fixed initial delay,
//! then fetches the reply resource on a fixed interval until it appears or
//! the attempt budget runs out.  There is no backoff — synthesis latency is
//! roughly constant, so a steady cadence is the right shape.
//!
//! Every way the job can end is an explicit [`PollOutcome`] variant.  In
//! particular, running out of attempts produces [`PollOutcome::Exhausted`]
//! instead of the task just going quiet, so the pipeline can log it and
//! resume capture.

use std::sync::Arc;
use std::time::Duration;

use crate::config::PollConfig;
use crate::submit::client::{truncated_label, SubmissionClient, UploadRequest};

// ---------------------------------------------------------------------------
// PollOutcome
// ---------------------------------------------------------------------------

/// Terminal result of one submit-and-poll job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The reply resource was fetched.
    Success {
        /// Resource name that answered (`<truncated-label>.<ext>`).
        resource: String,
        /// Raw reply bytes, ready for the reply sink.
        payload: Vec<u8>,
    },
    /// Every fetch attempt came back empty; no reply will be delivered.
    Exhausted {
        /// Number of fetches actually issued (== the configured cap).
        attempts: u32,
    },
    /// The upload itself failed; polling never started.
    SubmitFailed {
        /// Display form of the submit error.
        error: String,
    },
}

// ---------------------------------------------------------------------------
// PollJob
// ---------------------------------------------------------------------------

/// One reply-polling session.  Created after a successful upload, consumed
/// by the first success or by attempt exhaustion.
struct PollJob {
    resource: String,
    attempts: u32,
    initial_delay: Duration,
    retry_interval: Duration,
    max_attempts: u32,
}

impl PollJob {
    fn new(resource: String, config: &PollConfig) -> Self {
        Self {
            resource,
            attempts: 0,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            retry_interval: Duration::from_millis(config.retry_interval_ms),
            max_attempts: config.max_attempts,
        }
    }

    /// Drive the schedule to completion.  At least one fetch is always
    /// attempted; transport errors on a fetch count as misses rather than
    /// aborting the job, since the reply may still appear later.
    async fn run(mut self, client: &dyn SubmissionClient) -> PollOutcome {
        tokio::time::sleep(self.initial_delay).await;

        loop {
            self.attempts += 1;
            match client.fetch_reply(&self.resource).await {
                Ok(Some(payload)) => {
                    log::info!(
                        "reply '{}' ready after {} attempt(s) ({} bytes)",
                        self.resource,
                        self.attempts,
                        payload.len()
                    );
                    return PollOutcome::Success {
                        resource: self.resource,
                        payload,
                    };
                }
                Ok(None) => log::debug!(
                    "reply '{}' not ready (attempt {}/{})",
                    self.resource,
                    self.attempts,
                    self.max_attempts
                ),
                Err(e) => log::warn!(
                    "reply fetch failed (attempt {}/{}): {e}",
                    self.attempts,
                    self.max_attempts
                ),
            }

            if self.attempts >= self.max_attempts {
                log::warn!(
                    "no reply '{}' after {} attempts; giving up",
                    self.resource,
                    self.attempts
                );
                return PollOutcome::Exhausted {
                    attempts: self.attempts,
                };
            }

            tokio::time::sleep(self.retry_interval).await;
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionPoller
// ---------------------------------------------------------------------------

/// Runs the full submit-and-poll protocol for one utterance.
///
/// The reply resource name is derived from the utterance label before the
/// upload is consumed: `<first 10 chars of label>.<reply_ext>`.
pub struct SubmissionPoller {
    client: Arc<dyn SubmissionClient>,
    config: PollConfig,
}

impl SubmissionPoller {
    pub fn new(client: Arc<dyn SubmissionClient>, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Upload `upload` and poll for its reply.
    ///
    /// Never returns early on fetch misses; the only fast exit is an upload
    /// failure, which yields [`PollOutcome::SubmitFailed`] without any
    /// polling.
    pub async fn run(&self, upload: UploadRequest) -> PollOutcome {
        let resource = format!(
            "{}.{}",
            truncated_label(&upload.label),
            self.config.reply_ext
        );

        log::info!(
            "uploading utterance '{}' ({} bytes)",
            upload.label,
            upload.wav.len()
        );
        if let Err(e) = self.client.submit(upload).await {
            log::warn!("upload failed: {e}");
            return PollOutcome::SubmitFailed {
                error: e.to_string(),
            };
        }

        log::debug!("upload accepted; polling for '{resource}'");
        PollJob::new(resource, &self.config).run(self.client.as_ref()).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
