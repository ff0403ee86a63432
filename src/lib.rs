//! voiceloop — hands-free voice capture with a submit-and-poll reply loop.
//!
//! The crate listens to a microphone, detects utterances by RMS loudness
//! (with pre-roll and a silence hangover), encodes each one as 16-bit mono
//! WAV and uploads it to a remote speech service, then polls until the
//! rendered reply is ready and hands it to a reply sink.
//!
//! Module map:
//! * [`audio`] — cpal capture, ring buffer, RMS, segment detection, WAV.
//! * [`config`] — TOML settings and platform paths.
//! * [`pipeline`] — capture controller, orchestrator and shared state.
//! * [`submit`] — multipart upload and reply polling over HTTP.
//! * [`reply`] — delivery of fetched replies (filesystem sink).
//!
//! See [`pipeline`] for the quick-start wiring; `main.rs` is a thin shell
//! around it.

pub mod audio;
pub mod config;
pub mod pipeline;
pub mod reply;
pub mod submit;
