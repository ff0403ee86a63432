//! Pipeline orchestrator — drives the capture → detect → submit → reply loop.
//!
//! [`CaptureController`] is the synchronous half: it feeds normalized audio
//! chunks through the ring buffer and segment detector and hands out
//! [`CaptureEvent`]s. [`PipelineOrchestrator`] owns the [`SharedState`] and
//! runs the async half on top of a `tokio::sync::mpsc` chunk stream.
//!
//! # Pipeline flow
//!
//! ```text
//! audio chunk (tokio mpsc)
//!   └─▶ CaptureController::handle_chunk
//!         ├─ SpeechStarted          → [Speaking]
//!         ├─ EmptySegmentDiscarded  → [Listening]
//!         └─ UtteranceReady(wav)    → [Processing]
//!               └─▶ tokio::spawn(SubmissionPoller::run)
//!                     ├─ Success              → ReplySink::deliver  [Playing]
//!                     └─ Exhausted / SubmitFailed                   [Error]
//! ```
//!
//! Upload and polling run on a spawned task so the chunk stream is never
//! blocked; the controller drops incoming audio until the outcome lands, then
//! capture resumes — after an error as well as after a delivered reply.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;

use crate::audio::{encode_wav, extract, rms, DetectorEvent, RingBuffer, SegmentDetector};
use crate::config::AppConfig;
use crate::reply::ReplySink;
use crate::submit::{PollOutcome, SubmissionPoller, UploadRequest};

use super::state::{CapturePhase, SharedState};

// ---------------------------------------------------------------------------
// CaptureEvent
// ---------------------------------------------------------------------------

/// Outcome of feeding one audio chunk to the [`CaptureController`].
#[derive(Debug)]
pub enum CaptureEvent {
    /// Loudness crossed the threshold; an utterance is now being tracked.
    SpeechStarted,
    /// A finished utterance, WAV-encoded and ready to upload.
    UtteranceReady(UploadRequest),
    /// The finalized segment collapsed to zero samples (the hangover ran a
    /// full ring revolution past the start index). Capture continues.
    EmptySegmentDiscarded,
}

// ---------------------------------------------------------------------------
// CaptureController
// ---------------------------------------------------------------------------

/// Synchronous capture engine: ring buffer + segment detector + WAV encoder.
///
/// The controller consumes fixed-size chunks of mono audio at the configured
/// sample rate and owns the two capture gates:
///
/// * `recording` — whether incoming audio is written at all. [`stop`](Self::stop)
///   clears it and aborts any utterance in progress.
/// * `processing` — set while an utterance is in flight to the server.
///   Chunks arriving in that window are dropped, not buffered; the ring
///   would otherwise overwrite the segment being read.
///
/// [`resume`](Self::resume) clears `processing` and re-arms `recording` once
/// the in-flight utterance has been resolved.
pub struct CaptureController {
    ring: RingBuffer<f32>,
    detector: SegmentDetector,
    sample_rate: u32,
    gain: f32,
    voice: String,
    advanced_model: bool,
    recording: bool,
    processing: bool,
}

impl CaptureController {
    /// Build a controller from the application config.
    ///
    /// The ring holds `audio.buffer_secs` seconds at `audio.sample_rate`;
    /// the detector shares the same capacity for its index arithmetic.
    pub fn new(config: &AppConfig) -> Self {
        let capacity = config.audio.ring_capacity();
        Self {
            ring: RingBuffer::new(capacity),
            detector: SegmentDetector::new(&config.detection, capacity),
            sample_rate: config.audio.sample_rate,
            gain: config.audio.gain,
            voice: config.submission.voice.clone(),
            advanced_model: config.submission.advanced_model,
            recording: false,
            processing: false,
        }
    }

    /// Begin writing incoming audio to the ring.
    pub fn start(&mut self) {
        self.recording = true;
    }

    /// Stop capture and abort any utterance in progress.
    pub fn stop(&mut self) {
        self.recording = false;
        self.detector.reset();
    }

    /// Re-arm capture after an in-flight utterance has been resolved.
    pub fn resume(&mut self) {
        self.processing = false;
        self.recording = true;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Feed one chunk of mono audio.
    ///
    /// Chunks are dropped while stopped or while an utterance is in flight.
    /// Otherwise the chunk is appended to the ring (silence included — the
    /// pre-roll window backdates into it) and its RMS loudness drives the
    /// detector. `now_ms` stamps the utterance when this chunk is the one
    /// that crosses the threshold.
    pub fn handle_chunk(&mut self, samples: &[f32], now_ms: u64) -> Option<CaptureEvent> {
        if !self.recording || self.processing {
            return None;
        }

        self.ring.push_slice(samples);
        let loudness = rms(samples);

        match self.detector.on_chunk(loudness, self.ring.head(), now_ms)? {
            DetectorEvent::SpeechStarted => Some(CaptureEvent::SpeechStarted),
            DetectorEvent::SegmentFinalized(bounds) => {
                let segment = extract(&self.ring, &bounds);
                if segment.is_empty() {
                    log::warn!("capture: finalized segment is empty, discarding");
                    return Some(CaptureEvent::EmptySegmentDiscarded);
                }

                log::debug!(
                    "capture: utterance {} complete ({} samples, {:.2}s)",
                    segment.started_at_ms,
                    segment.len(),
                    segment.duration_secs(self.sample_rate)
                );

                // Gate further capture until the orchestrator resumes us.
                self.processing = true;
                self.recording = false;

                let wav = encode_wav(&segment.samples, self.sample_rate, self.gain);
                Some(CaptureEvent::UtteranceReady(UploadRequest {
                    wav,
                    label: segment.started_at_ms.to_string(),
                    voice: self.voice.clone(),
                    advanced_model: self.advanced_model,
                }))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives the complete capture-and-reply loop.
///
/// Create with [`PipelineOrchestrator::new`], then call [`run`](Self::run)
/// inside a tokio task.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use voiceloop::config::AppConfig;
/// use voiceloop::pipeline::{new_shared_state, CaptureController, PipelineOrchestrator};
/// use voiceloop::reply::FileReplySink;
/// use voiceloop::submit::{HttpSubmissionClient, SubmissionPoller};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let state = new_shared_state(config.clone());
/// let controller = CaptureController::new(&config);
///
/// let client = Arc::new(HttpSubmissionClient::from_config(&config.submission));
/// let poller = Arc::new(SubmissionPoller::new(client, config.polling.clone()));
/// let sink = Arc::new(FileReplySink::new("replies"));
///
/// let (_chunk_tx, chunk_rx) = tokio::sync::mpsc::channel(64);
/// PipelineOrchestrator::new(state, controller, poller, sink)
///     .run(chunk_rx)
///     .await;
/// # }
/// ```
pub struct PipelineOrchestrator {
    state: SharedState,
    controller: CaptureController,
    poller: Arc<SubmissionPoller>,
    sink: Arc<dyn ReplySink>,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `state`      — shared application state (also read by observers).
    /// * `controller` — capture engine fed from the audio chunk channel.
    /// * `poller`     — submit-then-poll driver for finished utterances.
    /// * `sink`       — where delivered replies go (e.g. `FileReplySink`).
    pub fn new(
        state: SharedState,
        controller: CaptureController,
        poller: Arc<SubmissionPoller>,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            state,
            controller,
            poller,
            sink,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the orchestrator until `chunk_rx` is closed.
    ///
    /// This is an `async fn` and should be spawned as a tokio task from
    /// `main()`. Capture starts immediately; it never returns while the
    /// chunk channel is open.
    pub async fn run(mut self, mut chunk_rx: mpsc::Receiver<Vec<f32>>) {
        // Capacity 1 is enough: the controller admits one utterance at a time.
        let (done_tx, mut done_rx) = mpsc::channel::<PollOutcome>(1);

        self.controller.start();
        self.set_phase(CapturePhase::Listening);
        log::info!("pipeline: listening for speech");

        loop {
            tokio::select! {
                chunk = chunk_rx.recv() => match chunk {
                    Some(samples) => self.handle_chunk(&samples, &done_tx),
                    None => break,
                },
                Some(outcome) = done_rx.recv() => {
                    self.handle_outcome(outcome).await;
                }
            }
        }

        log::info!("pipeline: audio channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Feed one chunk to the controller and react to what it reports.
    fn handle_chunk(&mut self, samples: &[f32], done_tx: &mpsc::Sender<PollOutcome>) {
        let event = match self.controller.handle_chunk(samples, epoch_ms()) {
            Some(event) => event,
            None => return,
        };

        match event {
            CaptureEvent::SpeechStarted => {
                log::debug!("pipeline: speech onset detected");
                let mut st = self.state.lock().unwrap();
                st.phase = CapturePhase::Speaking;
                st.error_message = None;
            }
            CaptureEvent::UtteranceReady(upload) => {
                log::info!(
                    "pipeline: submitting utterance {} ({} bytes)",
                    upload.label,
                    upload.wav.len()
                );
                self.set_phase(CapturePhase::Processing);

                let poller = Arc::clone(&self.poller);
                let done = done_tx.clone();
                tokio::spawn(async move {
                    let outcome = poller.run(upload).await;
                    // Send only fails when the orchestrator is shutting down.
                    let _ = done.send(outcome).await;
                });
            }
            CaptureEvent::EmptySegmentDiscarded => {
                log::debug!("pipeline: empty segment discarded, still listening");
                self.set_phase(CapturePhase::Listening);
            }
        }
    }

    /// React to the outcome of a submit-and-poll job.
    ///
    /// Capture resumes whatever happened; an error phase sticks around only
    /// until the next utterance begins.
    async fn handle_outcome(&mut self, outcome: PollOutcome) {
        match outcome {
            PollOutcome::Success { resource, payload } => {
                log::info!(
                    "pipeline: reply {} ready ({} bytes)",
                    resource,
                    payload.len()
                );
                self.set_phase(CapturePhase::Playing);

                match self.sink.deliver(&resource, &payload).await {
                    Ok(()) => {
                        let mut st = self.state.lock().unwrap();
                        st.last_reply = Some(resource);
                    }
                    Err(e) => {
                        // Delivery failure does not stop the capture loop.
                        log::warn!("pipeline: reply delivery failed: {e}");
                    }
                }
                self.set_phase(CapturePhase::Listening);
            }
            PollOutcome::Exhausted { attempts } => {
                self.set_error(format!("no reply after {attempts} polls"));
            }
            PollOutcome::SubmitFailed { error } => {
                self.set_error(format!("upload failed: {error}"));
            }
        }

        self.controller.resume();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_phase(&self, phase: CapturePhase) {
        let mut st = self.state.lock().unwrap();
        st.phase = phase;
    }

    fn set_error(&self, message: String) {
        let mut st = self.state.lock().unwrap();
        st.phase = CapturePhase::Error;
        st.error_message = Some(message.clone());
        log::error!("pipeline error: {message}");
    }
}

/// Milliseconds since the Unix epoch; a clock before 1970 collapses to 0.
fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
