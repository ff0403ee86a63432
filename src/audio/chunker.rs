//! Re-framing of variable-size device buffers into fixed-size chunks.
//!
//! The detection state machine counts time in *chunks*: one RMS value per
//! chunk, one persistence tick per chunk.  Capture devices deliver buffers
//! of whatever size the driver likes, so [`Chunker`] accumulates incoming
//! samples and hands back complete chunks of exactly the configured size.
//! Leftover samples stay pending until the next push.

/// Accumulates samples and emits fixed-size chunks.
///
/// # Example
///
/// ```rust
/// use voiceloop::audio::Chunker;
///
/// let mut chunker = Chunker::new(4);
/// assert!(chunker.push(&[1.0, 2.0, 3.0]).is_empty()); // not enough yet
/// let chunks = chunker.push(&[4.0, 5.0]);
/// assert_eq!(chunks, vec![vec![1.0, 2.0, 3.0, 4.0]]); // 5.0 stays pending
/// ```
pub struct Chunker {
    chunk_size: usize,
    pending: Vec<f32>,
}

impl Chunker {
    /// Create a chunker emitting chunks of `chunk_size` samples.
    ///
    /// A `chunk_size` of 0 is treated as 1.
    pub fn new(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            pending: Vec::with_capacity(chunk_size),
        }
    }

    /// Append `samples` and drain every complete chunk now available.
    ///
    /// Returns zero or more chunks of exactly `chunk_size` samples, in
    /// arrival order.  Remaining samples are carried over.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        self.pending.extend_from_slice(samples);

        let mut chunks = Vec::new();
        while self.pending.len() >= self.chunk_size {
            chunks.push(self.pending.drain(..self.chunk_size).collect());
        }
        chunks
    }

    /// Number of samples waiting for the next complete chunk.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_until_a_full_chunk() {
        let mut chunker = Chunker::new(8);
        assert!(chunker.push(&[0.0; 5]).is_empty());
        assert_eq!(chunker.pending_len(), 5);

        let chunks = chunker.push(&[0.0; 3]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 8);
        assert_eq!(chunker.pending_len(), 0);
    }

    #[test]
    fn large_push_emits_multiple_chunks() {
        let mut chunker = Chunker::new(4);
        let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let chunks = chunker.push(&input);

        assert_eq!(chunks, vec![vec![0.0, 1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0, 7.0]]);
        assert_eq!(chunker.pending_len(), 2);
    }

    #[test]
    fn order_preserved_across_pushes() {
        let mut chunker = Chunker::new(4);
        chunker.push(&[1.0, 2.0]);
        let chunks = chunker.push(&[3.0, 4.0, 5.0]);
        assert_eq!(chunks, vec![vec![1.0, 2.0, 3.0, 4.0]]);

        let chunks = chunker.push(&[6.0, 7.0, 8.0]);
        assert_eq!(chunks, vec![vec![5.0, 6.0, 7.0, 8.0]]);
    }

    #[test]
    fn exact_multiple_leaves_nothing_pending() {
        let mut chunker = Chunker::new(4);
        let chunks = chunker.push(&[0.5; 8]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunker.pending_len(), 0);
    }

    #[test]
    fn zero_chunk_size_treated_as_one() {
        let mut chunker = Chunker::new(0);
        let chunks = chunker.push(&[1.0, 2.0]);
        assert_eq!(chunks, vec![vec![1.0], vec![2.0]]);
    }
}
