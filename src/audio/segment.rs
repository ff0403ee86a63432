//! Extraction of finalized utterances from the ring buffer.
//!
//! Once the detector reports [`SegmentFinalized`](crate::audio::DetectorEvent::SegmentFinalized),
//! the bounded circular region is copied out into a linear [`AudioSegment`]
//! for encoding.  The copy happens immediately, within the same chunk
//! handler, so later ring writes cannot overtake the region.

use crate::audio::buffer::RingBuffer;
use crate::audio::detector::SegmentBounds;

// ---------------------------------------------------------------------------
// AudioSegment
// ---------------------------------------------------------------------------

/// One extracted utterance: a linear run of samples plus its label source.
///
/// Immutable after extraction; consumed by the container encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    /// Samples in temporal order, pre-roll first.
    pub samples: Vec<f32>,
    /// Wall-clock milliseconds when the utterance began; used to derive the
    /// upload filename and the reply resource name.
    pub started_at_ms: u64,
}

impl AudioSegment {
    /// Number of samples in the segment.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` for a degenerate (zero-length) segment.
    ///
    /// Degenerate segments must be discarded rather than submitted.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Segment duration in seconds, assuming `sample_rate` Hz mono.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / sample_rate as f32
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Copy the region described by `bounds` out of the ring.
///
/// The segment length is the circular distance from `bounds.start` to
/// `bounds.end`; temporal order is preserved across the wrap seam.  Equal
/// positions produce an empty segment, which callers treat as "no
/// utterance".
pub fn extract(ring: &RingBuffer<f32>, bounds: &SegmentBounds) -> AudioSegment {
    let len = ring.distance(bounds.start, bounds.end);
    AudioSegment {
        samples: ring.read_slice(bounds.start, len),
        started_at_ms: bounds.started_at_ms,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(start: usize, end: usize) -> SegmentBounds {
        SegmentBounds {
            start,
            end,
            started_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn extracts_contiguous_region_in_order() {
        let mut ring = RingBuffer::new(16);
        ring.push_slice(&(0..10).map(|i| i as f32).collect::<Vec<_>>());

        let seg = extract(&ring, &bounds(2, 7));
        assert_eq!(seg.samples, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(seg.started_at_ms, 1_700_000_000_000);
    }

    #[test]
    fn extracts_across_the_wrap_seam() {
        let mut ring = RingBuffer::new(8);
        ring.push_slice(&(0..12).map(|i| i as f32).collect::<Vec<_>>()); // head at 4

        // Positions 6,7 hold samples 6,7; positions 0..4 hold 8..11.
        let seg = extract(&ring, &bounds(6, 2));
        assert_eq!(seg.samples, vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn equal_bounds_yield_degenerate_segment() {
        let mut ring = RingBuffer::new(8);
        ring.push_slice(&[1.0_f32; 8]);

        let seg = extract(&ring, &bounds(3, 3));
        assert!(seg.is_empty());
        assert_eq!(seg.len(), 0);
    }

    #[test]
    fn duration_reflects_sample_rate() {
        let seg = AudioSegment {
            samples: vec![0.0; 24_000],
            started_at_ms: 0,
        };
        assert!((seg.duration_secs(48_000) - 0.5).abs() < 1e-6);
        assert_eq!(seg.duration_secs(0), 0.0);
    }
}
