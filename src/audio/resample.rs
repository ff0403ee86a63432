//! Channel and sample-rate conversions for captured audio.
//!
//! The pipeline is strictly mono at one configured rate.  Devices do not
//! always cooperate: capture may open at a different rate or deliver
//! interleaved multi-channel frames.  These helpers normalize the raw
//! callback data before it enters the ring buffer:
//!
//! 1. [`first_channel`] — keep channel 0 of an interleaved frame.
//! 2. [`resample_linear`] — convert between arbitrary sample rates.
//!
//! Multi-channel audio is not mixed down; the pipeline takes channel 0 and
//! discards the rest, which is what a single microphone produces anyway.
//! Resampling is plain linear interpolation — the samples feed an RMS gate
//! and a speech upload, so interpolation artifacts are negligible next to
//! a format mismatch.

// ---------------------------------------------------------------------------
// first_channel
// ---------------------------------------------------------------------------

/// Extract channel 0 from interleaved multi-channel samples.
///
/// The output length is `samples.len() / channels` (rounded up for a
/// trailing partial frame).
///
/// * If `channels == 1` the input is returned as an owned `Vec` unchanged.
/// * If `channels == 0` an empty vector is returned.
///
/// # Example
///
/// ```rust
/// use voiceloop::audio::first_channel;
///
/// let stereo = vec![0.1_f32, 0.9, 0.2, 0.8]; // L R L R
/// assert_eq!(first_channel(&stereo, 2), vec![0.1, 0.2]);
/// ```
pub fn first_channel(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => samples.iter().step_by(n as usize).copied().collect(),
    }
}

// ---------------------------------------------------------------------------
// resample_linear
// ---------------------------------------------------------------------------

/// Resample from `source_rate` to `target_rate` by linear interpolation.
///
/// Equal rates return a copy unchanged.  Empty input, or a zero rate on
/// either side, yields an empty vector.
///
/// # Example
///
/// ```rust
/// use voiceloop::audio::resample_linear;
///
/// let hi = vec![0.5_f32; 480]; // 10 ms @ 48 kHz
/// let lo = resample_linear(&hi, 48_000, 16_000);
/// assert_eq!(lo.len(), 160); // 10 ms @ 16 kHz
/// ```
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    if samples.is_empty() || source_rate == 0 || target_rate == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            // Linear interpolation between adjacent samples
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
