//! Pipeline module — wires capture, detection, submission and reply delivery.
//!
//! # Architecture
//!
//! ```text
//! audio chunks (tokio mpsc, mono @ configured rate)
//!        │
//!        ▼
//! PipelineOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ CaptureController          (ring buffer + detector, sync)
//!        │     └─ UtteranceReady(wav)
//!        │           └─ tokio::spawn(SubmissionPoller::run)
//!        │                 └─ PollOutcome ──▶ ReplySink::deliver
//!        │
//!        └─ SharedState (Arc<Mutex<AppState>>) ← read by observers
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use voiceloop::config::AppConfig;
//! use voiceloop::pipeline::{new_shared_state, CaptureController, PipelineOrchestrator};
//! use voiceloop::reply::FileReplySink;
//! use voiceloop::submit::{HttpSubmissionClient, SubmissionPoller};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let shared_state = new_shared_state(config.clone());
//!     let controller = CaptureController::new(&config);
//!
//!     let client = Arc::new(HttpSubmissionClient::from_config(&config.submission));
//!     let poller = Arc::new(SubmissionPoller::new(client, config.polling.clone()));
//!     let sink = Arc::new(FileReplySink::new("replies"));
//!
//!     let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<f32>>(64);
//!     let orchestrator =
//!         PipelineOrchestrator::new(shared_state.clone(), controller, poller, sink);
//!
//!     tokio::spawn(async move { orchestrator.run(chunk_rx).await });
//!
//!     // chunk_tx is fed from the capture thread (see main.rs)
//!     # drop(chunk_tx);
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{CaptureController, CaptureEvent, PipelineOrchestrator};
pub use state::{new_shared_state, AppState, CapturePhase, SharedState};
