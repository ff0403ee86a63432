//! Threshold/hysteresis state machine for utterance boundary detection.
//!
//! [`SegmentDetector`] consumes one loudness value per fixed-size chunk
//! (see [`crate::audio::rms`]) together with the ring buffer's write head,
//! and decides where an utterance starts and ends.  It never touches the
//! samples itself — it only records *positions* into the ring, which the
//! extractor later reads back.
//!
//! ## State machine
//!
//! | State      | Chunk        | Effect                                           |
//! |------------|--------------|--------------------------------------------------|
//! | Idle       | loud         | backdate start by pre-roll, note wall clock → Speaking |
//! | Idle       | quiet        | stay Idle                                        |
//! | Speaking   | loud         | stay Speaking                                    |
//! | Speaking   | quiet        | silence run = 1 → EndPending (or finalize)       |
//! | EndPending | loud         | silence run = 0 → Speaking (pending end cancelled) |
//! | EndPending | quiet        | silence run += 1; finalize at the persistence limit |
//!
//! Finalizing emits [`DetectorEvent::SegmentFinalized`] exactly once per
//! Speaking episode and returns the machine to Idle.  The recorded end
//! position is the head *after* the finalizing chunk, so the trailing
//! hangover silence is part of the segment.
//!
//! ## Pre-roll
//!
//! The start position is backdated by a fixed sample count so soft onsets
//! just before the threshold crossing are not clipped.  This is why the
//! ring keeps being written even while the detector sits in Idle.

use crate::config::DetectionConfig;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Detection phase of the current capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    /// No utterance in progress; waiting for a loudness crossing.
    Idle,
    /// Inside an utterance; loudness was above threshold recently.
    Speaking,
    /// Inside an utterance, but a silence run is accumulating towards the
    /// persistence limit.  A loud chunk cancels back to [`Speaking`](Self::Speaking).
    EndPending,
}

/// Ring positions delimiting one finalized utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentBounds {
    /// Ring index where the pre-roll begins (inclusive).
    pub start: usize,
    /// Ring index one past the last sample (the head after the finalizing
    /// chunk), so the trailing persistence silence is included.
    pub end: usize,
    /// Wall-clock milliseconds (Unix epoch) when the crossing chunk arrived.
    /// Labels the utterance for upload and reply lookup.
    pub started_at_ms: u64,
}

/// Events reported by [`SegmentDetector::on_chunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorEvent {
    /// Loudness crossed the threshold; an utterance has begun.
    SpeechStarted,
    /// The persistence limit was reached; the utterance is complete.
    SegmentFinalized(SegmentBounds),
}

// ---------------------------------------------------------------------------
// SegmentDetector
// ---------------------------------------------------------------------------

/// Per-chunk utterance boundary detector.
///
/// # Example
///
/// ```rust
/// use voiceloop::audio::{DetectorEvent, SegmentDetector};
/// use voiceloop::config::DetectionConfig;
///
/// let cfg = DetectionConfig {
///     threshold: 0.04,
///     pre_roll_samples: 256,
///     persistence_chunks: 2,
/// };
/// let mut det = SegmentDetector::new(&cfg, 4096);
///
/// assert_eq!(det.on_chunk(0.5, 128, 1_000), Some(DetectorEvent::SpeechStarted));
/// assert_eq!(det.on_chunk(0.0, 256, 1_100), None); // silence run 1 of 2
/// let event = det.on_chunk(0.0, 384, 1_200);       // run 2 → finalize
/// assert!(matches!(event, Some(DetectorEvent::SegmentFinalized(_))));
/// ```
pub struct SegmentDetector {
    /// Loudness strictly above this value counts as speech.
    threshold: f32,
    /// Samples of audio to include before the crossing chunk's end.
    pre_roll_samples: usize,
    /// Consecutive quiet chunks required to declare end-of-speech.
    persistence_chunks: usize,
    /// Ring capacity, for modular position arithmetic.
    capacity: usize,

    state: DetectionState,
    start_index: usize,
    started_at_ms: u64,
    silence_run: usize,
}

impl SegmentDetector {
    /// Create a detector for a ring of `capacity` samples.
    ///
    /// A `persistence_chunks` of 0 is treated as 1 (end-of-speech after the
    /// first quiet chunk).
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(config: &DetectionConfig, capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be > 0");
        Self {
            threshold: config.threshold,
            pre_roll_samples: config.pre_roll_samples,
            persistence_chunks: config.persistence_chunks.max(1),
            capacity,
            state: DetectionState::Idle,
            start_index: 0,
            started_at_ms: 0,
            silence_run: 0,
        }
    }

    /// Current detection state.
    pub fn state(&self) -> DetectionState {
        self.state
    }

    /// Advance the machine by one chunk.
    ///
    /// * `loudness` — RMS of the chunk just written into the ring.
    /// * `head` — ring write head *after* that chunk was written.
    /// * `now_ms` — wall-clock milliseconds used to label a new utterance.
    ///
    /// Returns an event on a crossing or a finalize, `None` otherwise.
    pub fn on_chunk(&mut self, loudness: f32, head: usize, now_ms: u64) -> Option<DetectorEvent> {
        let loud = loudness > self.threshold;

        match self.state {
            DetectionState::Idle => {
                if !loud {
                    return None;
                }
                let pre_roll = self.pre_roll_samples % self.capacity;
                self.start_index = (head + self.capacity - pre_roll) % self.capacity;
                self.started_at_ms = now_ms;
                self.silence_run = 0;
                self.state = DetectionState::Speaking;
                Some(DetectorEvent::SpeechStarted)
            }
            DetectionState::Speaking | DetectionState::EndPending => {
                if loud {
                    // A rise mid-run cancels the pending end; the run must
                    // restart from zero at the next quiet chunk.
                    self.silence_run = 0;
                    self.state = DetectionState::Speaking;
                    return None;
                }

                self.silence_run += 1;
                if self.silence_run >= self.persistence_chunks {
                    let bounds = SegmentBounds {
                        start: self.start_index,
                        end: head,
                        started_at_ms: self.started_at_ms,
                    };
                    self.reset();
                    return Some(DetectorEvent::SegmentFinalized(bounds));
                }

                self.state = DetectionState::EndPending;
                None
            }
        }
    }

    /// Abort any in-progress utterance and return to Idle.
    ///
    /// Used when capture stops mid-utterance; the partial segment is
    /// discarded without being emitted.
    pub fn reset(&mut self) {
        self.state = DetectionState::Idle;
        self.silence_run = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: f32 = 0.01;
    const LOUD: f32 = 0.5;

    fn config(persistence_chunks: usize) -> DetectionConfig {
        DetectionConfig {
            threshold: 0.04,
            pre_roll_samples: 300,
            persistence_chunks,
        }
    }

    /// Feed `loudness` for `chunks` chunks of `chunk_size` samples,
    /// starting with the head at `head`.  Returns the events and the head
    /// after the last chunk.
    fn feed(
        det: &mut SegmentDetector,
        loudness: f32,
        chunks: usize,
        chunk_size: usize,
        head: &mut usize,
    ) -> Vec<DetectorEvent> {
        let mut events = Vec::new();
        for i in 0..chunks {
            *head = (*head + chunk_size) % det.capacity;
            if let Some(ev) = det.on_chunk(loudness, *head, 1_000 + i as u64) {
                events.push(ev);
            }
        }
        events
    }

    // ---- Idle behaviour ----------------------------------------------------

    #[test]
    fn silence_never_leaves_idle() {
        let mut det = SegmentDetector::new(&config(3), 48_000);
        let mut head = 0;
        let events = feed(&mut det, QUIET, 100, 100, &mut head);
        assert!(events.is_empty());
        assert_eq!(det.state(), DetectionState::Idle);
    }

    #[test]
    fn loudness_exactly_at_threshold_is_quiet() {
        let cfg = config(3);
        let mut det = SegmentDetector::new(&cfg, 48_000);
        assert_eq!(det.on_chunk(cfg.threshold, 100, 0), None);
        assert_eq!(det.state(), DetectionState::Idle);
    }

    // ---- Crossing and pre-roll ---------------------------------------------

    #[test]
    fn crossing_emits_speech_started_once() {
        let mut det = SegmentDetector::new(&config(3), 48_000);
        let mut head = 0;
        let events = feed(&mut det, LOUD, 5, 100, &mut head);
        assert_eq!(events, vec![DetectorEvent::SpeechStarted]);
        assert_eq!(det.state(), DetectionState::Speaking);
    }

    #[test]
    fn start_is_backdated_by_pre_roll() {
        // Crossing with head at 500 and pre-roll 300 → start at 200.
        let mut det = SegmentDetector::new(&config(2), 48_000);
        det.on_chunk(LOUD, 500, 42);
        let ev = det.on_chunk(QUIET, 600, 43);
        assert_eq!(ev, None);
        match det.on_chunk(QUIET, 700, 44) {
            Some(DetectorEvent::SegmentFinalized(bounds)) => {
                assert_eq!(bounds.start, 200);
                assert_eq!(bounds.end, 700);
                assert_eq!(bounds.started_at_ms, 42);
            }
            other => panic!("expected finalize, got {other:?}"),
        }
    }

    #[test]
    fn pre_roll_wraps_below_zero() {
        // Head 100, pre-roll 300, capacity 1000 → start at 800.
        let mut det = SegmentDetector::new(&config(2), 1_000);
        det.on_chunk(LOUD, 100, 0);
        det.on_chunk(QUIET, 200, 1);
        match det.on_chunk(QUIET, 300, 2) {
            Some(DetectorEvent::SegmentFinalized(bounds)) => {
                assert_eq!(bounds.start, 800);
                assert_eq!(bounds.end, 300);
            }
            other => panic!("expected finalize, got {other:?}"),
        }
    }

    // ---- End-of-speech persistence -----------------------------------------

    #[test]
    fn finalizes_after_exactly_persistence_limit_quiet_chunks() {
        let mut det = SegmentDetector::new(&config(4), 48_000);
        let mut head = 0;
        feed(&mut det, LOUD, 3, 100, &mut head);

        // Three quiet chunks: still pending.
        let events = feed(&mut det, QUIET, 3, 100, &mut head);
        assert!(events.is_empty());
        assert_eq!(det.state(), DetectionState::EndPending);

        // Fourth quiet chunk finalizes; end is the head after it.
        let events = feed(&mut det, QUIET, 1, 100, &mut head);
        match events.as_slice() {
            [DetectorEvent::SegmentFinalized(bounds)] => assert_eq!(bounds.end, head),
            other => panic!("expected finalize, got {other:?}"),
        }
        assert_eq!(det.state(), DetectionState::Idle);
    }

    #[test]
    fn persistence_limit_of_one_finalizes_on_first_quiet_chunk() {
        let mut det = SegmentDetector::new(&config(1), 48_000);
        det.on_chunk(LOUD, 100, 0);
        let ev = det.on_chunk(QUIET, 200, 1);
        assert!(matches!(ev, Some(DetectorEvent::SegmentFinalized(_))));
    }

    #[test]
    fn persistence_limit_of_zero_behaves_like_one() {
        let mut det = SegmentDetector::new(&config(0), 48_000);
        det.on_chunk(LOUD, 100, 0);
        let ev = det.on_chunk(QUIET, 200, 1);
        assert!(matches!(ev, Some(DetectorEvent::SegmentFinalized(_))));
    }

    // ---- Reset on rise (regression) ----------------------------------------

    #[test]
    fn rise_during_partial_silence_run_cancels_pending_end() {
        let limit = 5;
        let mut det = SegmentDetector::new(&config(limit), 48_000);
        let mut head = 0;
        feed(&mut det, LOUD, 2, 100, &mut head);

        // limit - 1 quiet chunks, then a loud one: no segment, back to Speaking.
        let events = feed(&mut det, QUIET, limit - 1, 100, &mut head);
        assert!(events.is_empty());
        let events = feed(&mut det, LOUD, 1, 100, &mut head);
        assert!(events.is_empty());
        assert_eq!(det.state(), DetectionState::Speaking);

        // The silence run restarted from zero: another limit - 1 quiet
        // chunks still must not finalize.
        let events = feed(&mut det, QUIET, limit - 1, 100, &mut head);
        assert!(events.is_empty());
        assert_eq!(det.state(), DetectionState::EndPending);

        // One more quiet chunk completes a full uninterrupted run.
        let events = feed(&mut det, QUIET, 1, 100, &mut head);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DetectorEvent::SegmentFinalized(_)));
    }

    // ---- Episode lifecycle -------------------------------------------------

    #[test]
    fn emits_at_most_once_per_episode_and_restarts_cleanly() {
        let mut det = SegmentDetector::new(&config(2), 48_000);
        let mut head = 0;

        feed(&mut det, LOUD, 2, 100, &mut head);
        let first = feed(&mut det, QUIET, 10, 100, &mut head);
        // Only one finalize despite 10 quiet chunks; the rest land in Idle.
        assert_eq!(first.len(), 1);
        assert_eq!(det.state(), DetectionState::Idle);

        // A fresh crossing starts a second, independent episode.
        let second = feed(&mut det, LOUD, 1, 100, &mut head);
        assert_eq!(second, vec![DetectorEvent::SpeechStarted]);
    }

    #[test]
    fn reset_aborts_in_progress_utterance() {
        let mut det = SegmentDetector::new(&config(3), 48_000);
        let mut head = 0;
        feed(&mut det, LOUD, 2, 100, &mut head);
        assert_eq!(det.state(), DetectionState::Speaking);

        det.reset();
        assert_eq!(det.state(), DetectionState::Idle);

        // No stale finalize from the aborted episode.
        let events = feed(&mut det, QUIET, 10, 100, &mut head);
        assert!(events.is_empty());
    }

    #[test]
    #[should_panic(expected = "ring capacity must be > 0")]
    fn zero_capacity_panics() {
        SegmentDetector::new(&config(3), 0);
    }
}
