//! Chunk loudness measurement for segment detection.
//!
//! The capture pipeline classifies each fixed-size chunk as loud or quiet
//! using a single scalar: the root-mean-square amplitude of its samples.
//! RMS is deliberately the *only* gate — no spectral analysis, no model.
//! It is cheap enough to run on every chunk of a continuous stream and
//! behaves predictably when tuning the detection threshold.

/// Root-mean-square amplitude of `samples`.
///
/// Returns a value in `[0.0, 1.0]` for normalized audio.  An empty slice
/// measures `0.0` (silent), so degenerate chunks never trigger detection.
///
/// # Example
///
/// ```rust
/// use voiceloop::audio::rms;
///
/// assert_eq!(rms(&[]), 0.0);
/// assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
/// ```
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chunk_is_silent() {
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn all_zero_chunk_is_silent() {
        assert_eq!(rms(&[0.0; 1024]), 0.0);
    }

    #[test]
    fn constant_amplitude_measures_that_amplitude() {
        // Sign does not matter; RMS of ±a is a.
        let chunk = vec![-0.25_f32; 512];
        assert!((rms(&chunk) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn sine_wave_measures_peak_over_sqrt_two() {
        let chunk: Vec<f32> = (0..4800)
            .map(|i| 0.2 * (i as f32 * 2.0 * std::f32::consts::PI / 480.0).sin())
            .collect();
        let expected = 0.2 / 2.0_f32.sqrt();
        assert!((rms(&chunk) - expected).abs() < 1e-3);
    }

    #[test]
    fn quiet_room_noise_stays_under_default_threshold() {
        // Low-level noise well below the 0.04 default gate.
        let chunk: Vec<f32> = (0..4096)
            .map(|i| if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect();
        assert!(rms(&chunk) < 0.04);
    }

    #[test]
    fn speech_level_signal_exceeds_default_threshold() {
        let chunk = vec![0.1_f32; 4096];
        assert!(rms(&chunk) > 0.04);
    }
}
