//! Upload and reply-polling module.
//!
//! This module provides:
//! * [`SubmissionClient`] — async trait over the synthesis server protocol.
//! * [`HttpSubmissionClient`] — reqwest-based implementation.
//! * [`UploadRequest`] — one encoded utterance plus its metadata.
//! * [`SubmissionPoller`] / [`PollOutcome`] — the submit-then-poll schedule
//!   and its explicit terminal results.
//! * [`SubmitError`] — error variants for server communication.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voiceloop::config::AppConfig;
//! use voiceloop::submit::{HttpSubmissionClient, SubmissionPoller, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = Arc::new(HttpSubmissionClient::from_config(&config.submission));
//!     let poller = SubmissionPoller::new(client, config.polling.clone());
//!
//!     let outcome = poller
//!         .run(UploadRequest {
//!             wav: vec![],
//!             label: "1700000000123".into(),
//!             voice: config.submission.voice.clone(),
//!             advanced_model: config.submission.advanced_model,
//!         })
//!         .await;
//!     println!("{outcome:?}");
//! }
//! ```

pub mod client;
pub mod poller;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{
    truncated_label, HttpSubmissionClient, SubmissionClient, SubmitError, UploadRequest, LABEL_LEN,
};
pub use poller::{PollOutcome, SubmissionPoller};
