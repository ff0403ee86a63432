//! Canonical WAV (RIFF/WAVE) container encoding.
//!
//! One pure function turns an extracted utterance into a complete,
//! uploadable WAV byte sequence: 44-byte header plus 16-bit mono
//! little-endian PCM.  The layout is fixed:
//!
//! ```text
//! [0..4]    "RIFF"
//! [4..8]    chunk size = 36 + data bytes   (u32 LE)
//! [8..12]   "WAVE"
//! [12..16]  "fmt "
//! [16..20]  fmt subchunk size = 16         (u32 LE)
//! [20..22]  audio format = 1 (PCM)         (u16 LE)
//! [22..24]  channels = 1                   (u16 LE)
//! [24..28]  sample rate                    (u32 LE)
//! [28..32]  byte rate = rate × 2           (u32 LE)
//! [32..34]  block align = 2                (u16 LE)
//! [34..36]  bits per sample = 16           (u16 LE)
//! [36..40]  "data"
//! [40..44]  data bytes                     (u32 LE)
//! ```
//!
//! Samples are converted from `[-1.0, 1.0]` floats with
//! `round(sample × gain × 32767)` and clamped to the signed 16-bit range,
//! so a gain above 1.0 saturates instead of wrapping around.

/// Size of the RIFF/WAVE header in bytes.
pub const WAV_HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = 2;

/// Encode mono `f32` samples as a complete 16-bit PCM WAV file.
///
/// `gain` scales each sample before quantization; the result is clamped to
/// `i16` range.  The default pipeline gain is 1.0, which full-scale input
/// maps to ±32767.
///
/// # Example
///
/// ```rust
/// use voiceloop::audio::{encode_wav, WAV_HEADER_LEN};
///
/// let wav = encode_wav(&[0.0, 0.5, -0.5], 48_000, 1.0);
/// assert_eq!(wav.len(), WAV_HEADER_LEN + 3 * 2);
/// assert_eq!(&wav[0..4], b"RIFF");
/// ```
pub fn encode_wav(samples: &[f32], sample_rate: u32, gain: f32) -> Vec<u8> {
    let data_len = samples.len() as u32 * BYTES_PER_SAMPLE;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    out.extend_from_slice(&header(sample_rate, data_len));
    for &sample in samples {
        out.extend_from_slice(&quantize(sample, gain).to_le_bytes());
    }
    out
}

/// Build the 44-byte header for `data_len` bytes of mono 16-bit PCM.
fn header(sample_rate: u32, data_len: u32) -> [u8; WAV_HEADER_LEN] {
    let byte_rate = sample_rate * CHANNELS as u32 * BYTES_PER_SAMPLE;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;

    let mut header = [0u8; WAV_HEADER_LEN];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_len).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt subchunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data subchunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());

    header
}

/// Convert one float sample to a signed 16-bit value, saturating.
fn quantize(sample: f32, gain: f32) -> i16 {
    (sample * gain * 32767.0)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
