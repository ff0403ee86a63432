//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::AppPaths;

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for audio capture and the ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Pipeline sample rate in Hz.  Capture is opened at this rate when the
    /// device supports it, otherwise incoming audio is resampled.
    pub sample_rate: u32,
    /// Samples per detection chunk.  One RMS measurement and one detector
    /// step happen per chunk.
    pub chunk_size: usize,
    /// Ring buffer length in seconds.  Must comfortably exceed the longest
    /// expected utterance including pre-roll; samples older than this are
    /// overwritten.
    pub buffer_secs: u32,
    /// Gain applied when encoding a segment to 16-bit PCM.  Values above
    /// 1.0 saturate rather than wrap.
    pub gain: f32,
    /// Audio input device name — `None` means the system default.
    pub device: Option<String>,
}

impl AudioConfig {
    /// Ring buffer capacity in samples (`sample_rate × buffer_secs`).
    pub fn ring_capacity(&self) -> usize {
        self.sample_rate as usize * self.buffer_secs as usize
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            chunk_size: 4_096,
            buffer_secs: 60,
            gain: 1.0,
            device: None,
        }
    }
}

// ---------------------------------------------------------------------------
// DetectionConfig
// ---------------------------------------------------------------------------

/// Settings for the utterance detection state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// RMS loudness above which a chunk counts as speech (0.0 – 1.0).
    /// Raise in noisy rooms; 0.04 suits a quiet desk microphone.
    pub threshold: f32,
    /// Samples included before the threshold crossing so soft utterance
    /// onsets are not clipped.  12 288 samples = 3 chunks = 256 ms at the
    /// default rate.
    pub pre_roll_samples: usize,
    /// Consecutive quiet chunks required to declare end-of-speech.
    /// 20 chunks ≈ 1.7 s at the defaults — long enough to ride out
    /// mid-sentence pauses.
    pub persistence_chunks: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.04,
            pre_roll_samples: 12_288,
            persistence_chunks: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionConfig
// ---------------------------------------------------------------------------

/// Settings for uploading utterances to the synthesis server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Base URL of the server (no trailing slash needed).
    pub base_url: String,
    /// Upload endpoint path appended to `base_url`.
    pub upload_path: String,
    /// Voice label sent as the `name` form field.  Empty lets the server
    /// pick its default voice.
    pub voice: String,
    /// Request the server's higher-quality model (`advanced_model` flag).
    pub advanced_model: bool,
    /// Per-request HTTP timeout in seconds (covers upload and each poll).
    pub timeout_secs: u64,
    /// Directory where fetched replies are written — `None` uses the
    /// platform data directory.
    pub reply_dir: Option<PathBuf>,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            upload_path: "/upload".into(),
            voice: String::new(),
            advanced_model: false,
            timeout_secs: 30,
            reply_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PollConfig
// ---------------------------------------------------------------------------

/// Settings for the reply polling schedule.
///
/// Synthesis takes a few seconds server-side, so polling waits
/// `initial_delay_ms` before the first fetch, then retries every
/// `retry_interval_ms` until the reply appears or `max_attempts` fetches
/// have failed.  With the defaults that is a 5 s head start and up to two
/// minutes of once-per-second retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Milliseconds to wait after a successful upload before the first
    /// reply fetch.
    pub initial_delay_ms: u64,
    /// Milliseconds between consecutive reply fetches.
    pub retry_interval_ms: u64,
    /// Total fetch attempts before giving up on a reply.
    pub max_attempts: u32,
    /// File extension of the reply resource (`<label>.<ext>`).
    pub reply_ext: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5_000,
            retry_interval_ms: 1_000,
            max_attempts: 120,
            reply_ext: "mp3".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voiceloop::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Capture and ring buffer settings.
    pub audio: AudioConfig,
    /// Utterance detection settings.
    pub detection: DetectionConfig,
    /// Upload settings.
    pub submission: SubmissionConfig,
    /// Reply polling schedule.
    pub polling: PollConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        // AudioConfig
        assert_eq!(original.audio.sample_rate, loaded.audio.sample_rate);
        assert_eq!(original.audio.chunk_size, loaded.audio.chunk_size);
        assert_eq!(original.audio.buffer_secs, loaded.audio.buffer_secs);
        assert_eq!(original.audio.gain, loaded.audio.gain);
        assert_eq!(original.audio.device, loaded.audio.device);

        // DetectionConfig
        assert_eq!(original.detection.threshold, loaded.detection.threshold);
        assert_eq!(
            original.detection.pre_roll_samples,
            loaded.detection.pre_roll_samples
        );
        assert_eq!(
            original.detection.persistence_chunks,
            loaded.detection.persistence_chunks
        );

        // SubmissionConfig
        assert_eq!(original.submission.base_url, loaded.submission.base_url);
        assert_eq!(original.submission.upload_path, loaded.submission.upload_path);
        assert_eq!(original.submission.voice, loaded.submission.voice);
        assert_eq!(
            original.submission.advanced_model,
            loaded.submission.advanced_model
        );
        assert_eq!(original.submission.timeout_secs, loaded.submission.timeout_secs);

        // PollConfig
        assert_eq!(original.polling.initial_delay_ms, loaded.polling.initial_delay_ms);
        assert_eq!(
            original.polling.retry_interval_ms,
            loaded.polling.retry_interval_ms
        );
        assert_eq!(original.polling.max_attempts, loaded.polling.max_attempts);
        assert_eq!(original.polling.reply_ext, loaded.polling.reply_ext);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.audio.sample_rate, default.audio.sample_rate);
        assert_eq!(config.detection.threshold, default.detection.threshold);
        assert_eq!(config.submission.base_url, default.submission.base_url);
        assert_eq!(config.polling.max_attempts, default.polling.max_attempts);
    }

    /// Verify the documented default values stay stable.
    #[test]
    fn default_values_are_stable() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.audio.sample_rate, 48_000);
        assert_eq!(cfg.audio.chunk_size, 4_096);
        assert_eq!(cfg.audio.buffer_secs, 60);
        assert_eq!(cfg.audio.gain, 1.0);
        assert!(cfg.audio.device.is_none());
        assert_eq!(cfg.audio.ring_capacity(), 48_000 * 60);

        assert_eq!(cfg.detection.threshold, 0.04);
        assert_eq!(cfg.detection.pre_roll_samples, 12_288);
        assert_eq!(cfg.detection.persistence_chunks, 20);

        assert_eq!(cfg.submission.base_url, "http://localhost:5000");
        assert_eq!(cfg.submission.upload_path, "/upload");
        assert!(cfg.submission.voice.is_empty());
        assert!(!cfg.submission.advanced_model);
        assert_eq!(cfg.submission.timeout_secs, 30);
        assert!(cfg.submission.reply_dir.is_none());

        assert_eq!(cfg.polling.initial_delay_ms, 5_000);
        assert_eq!(cfg.polling.retry_interval_ms, 1_000);
        assert_eq!(cfg.polling.max_attempts, 120);
        assert_eq!(cfg.polling.reply_ext, "mp3");
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.audio.sample_rate = 44_100;
        cfg.audio.device = Some("USB Microphone".into());
        cfg.detection.threshold = 0.08;
        cfg.detection.persistence_chunks = 10;
        cfg.submission.base_url = "https://tts.example.net".into();
        cfg.submission.voice = "aria".into();
        cfg.submission.advanced_model = true;
        cfg.submission.reply_dir = Some(PathBuf::from("/tmp/replies"));
        cfg.polling.max_attempts = 30;
        cfg.polling.reply_ext = "wav".into();

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.audio.sample_rate, 44_100);
        assert_eq!(loaded.audio.device, Some("USB Microphone".into()));
        assert_eq!(loaded.detection.threshold, 0.08);
        assert_eq!(loaded.detection.persistence_chunks, 10);
        assert_eq!(loaded.submission.base_url, "https://tts.example.net");
        assert_eq!(loaded.submission.voice, "aria");
        assert!(loaded.submission.advanced_model);
        assert_eq!(loaded.submission.reply_dir, Some(PathBuf::from("/tmp/replies")));
        assert_eq!(loaded.polling.max_attempts, 30);
        assert_eq!(loaded.polling.reply_ext, "wav");
    }
}
