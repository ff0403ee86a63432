//! Audio pipeline — microphone capture → normalization → ring buffer → segment detection → WAV.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → first_channel
//!           → resample_linear → Chunker → RingBuffer + rms
//!           → SegmentDetector → extract → encode_wav
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::mpsc;
//! use voiceloop::audio::{AudioCapture, AudioChunk};
//!
//! let (tx, rx) = mpsc::channel::<AudioChunk>();
//! let capture = AudioCapture::new(None, 48_000).unwrap();
//! let _handle = capture.start(tx).unwrap(); // drop handle → stop stream
//!
//! while let Ok(chunk) = rx.recv() {
//!     println!("received {} samples @ {}Hz", chunk.samples.len(), chunk.sample_rate);
//! }
//! ```

pub mod buffer;
pub mod capture;
pub mod chunker;
pub mod detector;
pub mod energy;
pub mod resample;
pub mod segment;
pub mod wav;

pub use buffer::RingBuffer;
pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use chunker::Chunker;
pub use detector::{DetectionState, DetectorEvent, SegmentBounds, SegmentDetector};
pub use energy::rms;
pub use resample::{first_channel, resample_linear};
pub use segment::{extract, AudioSegment};
pub use wav::{encode_wav, WAV_HEADER_LEN};
