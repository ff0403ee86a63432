//! Capture phase machine and shared application state.
//!
//! [`CapturePhase`] tracks where the pipeline currently is, from waiting
//! for speech through playing back a synthesized reply.  [`AppState`] is
//! the single source of truth for observers: current phase, last reply,
//! config snapshot, and any error message.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AppState>>` — cheap to
//! clone and safe to share across threads.

use std::sync::{Arc, Mutex};

use crate::config::AppConfig;

// ---------------------------------------------------------------------------
// CapturePhase
// ---------------------------------------------------------------------------

/// Phases of the capture-and-reply loop.
///
/// The phase transitions are:
///
/// ```text
/// Idle ──capture starts──▶ Listening
///      Listening ──loudness crossing──▶ Speaking
///      Speaking  ──persistence silence─▶ Processing   (encode + upload + poll)
///      Processing ──reply fetched──▶ Playing
///      Playing ──delivery done──▶ Listening
/// any phase ──failure──▶ Error
/// Error ──next crossing──▶ Speaking
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CapturePhase {
    /// Pipeline constructed but capture not yet running.
    Idle,

    /// Capture active; waiting for loudness to cross the threshold.
    Listening,

    /// An utterance is in progress; the detector is inside a Speaking
    /// episode.
    Speaking,

    /// A segment was finalized; upload and reply polling are in flight.
    /// Incoming audio is dropped during this phase.
    Processing,

    /// A reply arrived and is being handed to the reply sink.
    Playing,

    /// A recoverable error occurred (failed upload, exhausted polling).
    /// Capture keeps running; the next crossing moves to `Speaking`.
    Error,
}

impl CapturePhase {
    /// Returns `true` while an utterance is being processed end-to-end and
    /// new audio is therefore being dropped.
    ///
    /// ```
    /// use voiceloop::pipeline::CapturePhase;
    ///
    /// assert!(!CapturePhase::Idle.is_busy());
    /// assert!(!CapturePhase::Listening.is_busy());
    /// assert!(!CapturePhase::Speaking.is_busy());
    /// assert!(CapturePhase::Processing.is_busy());
    /// assert!(CapturePhase::Playing.is_busy());
    /// assert!(!CapturePhase::Error.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, CapturePhase::Processing | CapturePhase::Playing)
    }

    /// A short human-readable label suitable for status output.
    pub fn label(&self) -> &'static str {
        match self {
            CapturePhase::Idle => "Idle",
            CapturePhase::Listening => "Listening...",
            CapturePhase::Speaking => "Sound detected...",
            CapturePhase::Processing => "Silence detected, processing...",
            CapturePhase::Playing => "Playing reply...",
            CapturePhase::Error => "Error",
        }
    }
}

impl Default for CapturePhase {
    fn default() -> Self {
        CapturePhase::Idle
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state — the single source of truth for observers.
///
/// Held behind [`SharedState`] (`Arc<Mutex<AppState>>`).  The pipeline
/// orchestrator mutates it; status displays read it.
pub struct AppState {
    /// Current phase of the capture loop.
    pub phase: CapturePhase,

    /// Resource name of the most recently delivered reply.
    ///
    /// `None` until at least one reply has been fetched and delivered.
    pub last_reply: Option<String>,

    /// Current application configuration.
    pub config: AppConfig,

    /// Error message to display when `phase == CapturePhase::Error`.
    pub error_message: Option<String>,
}

impl AppState {
    /// Create a new `AppState` with sensible defaults.
    pub fn new(config: AppConfig) -> Self {
        Self {
            phase: CapturePhase::Idle,
            last_reply: None,
            config,
            error_message: None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Cheap to clone (`Arc` clone).  Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] wrapping a default [`AppState`].
pub fn new_shared_state(config: AppConfig) -> SharedState {
    Arc::new(Mutex::new(AppState::new(config)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
