//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] wraps the cpal host/device/stream lifecycle.  Call
//! [`AudioCapture::start`] to begin streaming [`AudioChunk`]s over an mpsc
//! channel.  The returned [`StreamHandle`] is a RAII guard — dropping it
//! stops the underlying cpal stream.
//!
//! Capture prefers to open the device directly at the pipeline's sample
//! rate.  When the device cannot run at that rate, its default
//! configuration is used instead and the ingest side resamples (see
//! [`crate::audio::resample_linear`]).

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`.  Use
/// [`crate::audio::first_channel`] to strip extra channels and
/// [`crate::audio::resample_linear`] to convert the rate before the audio
/// enters the ring buffer.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value calls `cpal::Stream::drop` which pauses/stops the
/// underlying hardware stream.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("input device '{0}' not found")]
    DeviceNotFound(String),

    #[error("failed to enumerate input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// Microphone capture device wrapper built on top of `cpal`.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use voiceloop::audio::{AudioCapture, AudioChunk};
///
/// let (tx, rx) = mpsc::channel::<AudioChunk>();
/// let capture = AudioCapture::new(None, 48_000).unwrap();
/// let _handle = capture.start(tx).unwrap();
/// // `_handle` keeps the stream alive; drop it to stop recording.
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    /// Actual sample rate the stream will run at (Hz).
    sample_rate: u32,
    /// Number of interleaved channels per [`AudioChunk`].
    channels: u16,
}

impl AudioCapture {
    /// Open an input device, preferring `preferred_rate` Hz.
    ///
    /// `device_name` selects a specific input device by its cpal name;
    /// `None` uses the system default.  When the device supports
    /// `preferred_rate` the stream is opened at that rate directly;
    /// otherwise the device's default configuration is used and
    /// [`AudioCapture::sample_rate`] reports the rate the caller must
    /// resample from.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NoDevice`] / [`CaptureError::DeviceNotFound`]
    /// when no usable device exists, or [`CaptureError::DefaultConfig`] when
    /// the device cannot report a stream configuration.
    pub fn new(device_name: Option<&str>, preferred_rate: u32) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => host
                .input_devices()?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| CaptureError::DeviceNotFound(name.to_string()))?,
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
        };

        let supported = match Self::config_at_rate(&device, preferred_rate) {
            Some(cfg) => cfg,
            None => device.default_input_config()?,
        };

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        if sample_rate != preferred_rate {
            log::warn!(
                "device does not support {preferred_rate} Hz; capturing at {sample_rate} Hz"
            );
        }

        Ok(Self {
            device,
            config,
            sample_format,
            sample_rate,
            channels,
        })
    }

    /// Find a supported input config range containing `rate`.
    fn config_at_rate(device: &cpal::Device, rate: u32) -> Option<cpal::SupportedStreamConfig> {
        let ranges = device.supported_input_configs().ok()?;
        for range in ranges {
            if range.min_sample_rate().0 <= rate && rate <= range.max_sample_rate().0 {
                return Some(range.with_sample_rate(cpal::SampleRate(rate)));
            }
        }
        None
    }

    /// Start recording and send [`AudioChunk`]s to `tx`.
    ///
    /// The cpal callback runs on a dedicated audio thread; each time the
    /// hardware delivers a buffer the samples are converted to `f32` (if
    /// needed), wrapped in an [`AudioChunk`] and forwarded over the
    /// channel.  Send errors (receiver dropped) are silently ignored so
    /// the audio thread never panics.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::UnsupportedFormat`] for devices that produce
    /// neither `f32` nor `i16` samples, or [`CaptureError::BuildStream`] /
    /// [`CaptureError::PlayStream`] if the platform rejects the stream
    /// configuration.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = match self.sample_format {
            cpal::SampleFormat::F32 => {
                let tx = tx.clone();
                self.device.build_input_stream(
                    &self.config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let chunk = AudioChunk {
                            samples: data.to_vec(),
                            sample_rate,
                            channels,
                        };
                        // Ignore send errors; the receiver may have been dropped.
                        let _ = tx.send(chunk);
                    },
                    log_stream_error,
                    None, // no timeout
                )?
            }
            cpal::SampleFormat::I16 => self.device.build_input_stream(
                &self.config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let chunk = AudioChunk {
                        samples: data.iter().map(|&s| s as f32 / 32_768.0).collect(),
                        sample_rate,
                        channels,
                    };
                    let _ = tx.send(chunk);
                },
                log_stream_error,
                None,
            )?,
            other => return Err(CaptureError::UnsupportedFormat(other)),
        };

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    /// Actual sample rate of the capture stream in Hz.
    ///
    /// When this differs from the pipeline rate, chunks must be resampled
    /// with [`crate::audio::resample_linear`] before use.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels in each [`AudioChunk`].
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

fn log_stream_error(err: cpal::StreamError) {
    log::error!("cpal stream error: {err}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
