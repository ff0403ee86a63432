//! Fixed-capacity circular (ring) buffer for `f32` audio samples.
//!
//! The capture pipeline writes into the ring continuously; once full, new
//! samples **overwrite** the oldest data so the most-recent `capacity`
//! samples are always available.  Unlike a queue, reads are *positional*
//! and non-destructive: the segment detector remembers where an utterance
//! started and copies that region back out later, while writes keep
//! advancing underneath it.
//!
//! # Example
//!
//! ```rust
//! use voiceloop::audio::RingBuffer;
//!
//! let mut buf = RingBuffer::new(4);
//! buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]); // 5 items → capacity 4 → oldest dropped
//! assert_eq!(buf.head(), 1);
//! // Reading a full revolution from the head returns oldest → newest.
//! assert_eq!(buf.read_slice(buf.head(), 4), vec![2.0, 3.0, 4.0, 5.0]);
//! ```

// ---------------------------------------------------------------------------
// RingBuffer
// ---------------------------------------------------------------------------

/// A fixed-capacity circular buffer with positional reads.
///
/// Generic over `T: Copy + Default` so it can store any `Copy` scalar, though
/// the audio pipeline uses `RingBuffer<f32>` exclusively.
///
/// ## Overflow behaviour
///
/// When a write would exceed `capacity`, the oldest samples are silently
/// overwritten.  The buffer never allocates beyond its initial capacity.
/// Callers that hold on to a start position for longer than one full
/// revolution will read back newer data in its place; the segment detector
/// sizes the ring so that bounded utterances always fit.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    /// Index of the *next* write position (wraps around `capacity`).
    write_pos: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer with the given `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            write_pos: 0,
        }
    }

    /// Write a single sample at the head and advance it by one.
    pub fn push(&mut self, value: T) {
        self.buf[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Append `data` at the head, overwriting the oldest samples once the
    /// buffer has wrapped (circular behaviour).
    pub fn push_slice(&mut self, data: &[T]) {
        for &item in data {
            self.push(item);
        }
    }

    /// Copy `len` samples starting at position `start`, wrapping as needed.
    ///
    /// The read does not consume anything: repeated calls with the same
    /// arguments return the same data until a write overtakes the region.
    /// `start` is taken modulo `capacity`, so any index is valid; a `len`
    /// greater than `capacity` revisits the same cells.
    pub fn read_slice(&self, start: usize, len: usize) -> Vec<T> {
        let mut result = Vec::with_capacity(len);
        for i in 0..len {
            result.push(self.buf[(start + i) % self.capacity]);
        }
        result
    }

    /// Index of the next write position.
    ///
    /// Everything *before* the head (looking backwards, circularly) is the
    /// most recently written audio.
    pub fn head(&self) -> usize {
        self.write_pos
    }

    /// Maximum number of samples the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Circular distance from `start` forward to `end`.
    ///
    /// This is the length of the region a writer covered while moving the
    /// head from `start` to `end`.  Both indices are taken modulo
    /// `capacity`; equal positions yield 0.
    pub fn distance(&self, start: usize, end: usize) -> usize {
        let start = start % self.capacity;
        let end = end % self.capacity;
        (end + self.capacity - start) % self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Basic writes ------------------------------------------------------

    #[test]
    fn push_advances_head() {
        let mut buf = RingBuffer::new(8);
        buf.push(1.0_f32);
        buf.push(2.0);
        assert_eq!(buf.head(), 2);
        assert_eq!(buf.read_slice(0, 2), vec![1.0, 2.0]);
    }

    #[test]
    fn push_slice_preserves_order_within_capacity() {
        let mut buf = RingBuffer::new(8);
        buf.push_slice(&[1.0_f32, 2.0, 3.0]);
        assert_eq!(buf.head(), 3);
        assert_eq!(buf.read_slice(0, 3), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn head_wraps_at_capacity() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0_f32, 2.0, 3.0, 4.0]);
        assert_eq!(buf.head(), 0);
        buf.push(5.0);
        assert_eq!(buf.head(), 1);
    }

    // ---- Wraparound recovery -----------------------------------------------

    #[test]
    fn full_revolution_read_recovers_newest_in_order() {
        // Write 24 sequential samples into capacity 16, then read one full
        // revolution from the head: samples 8..24 must come back in order.
        let mut buf = RingBuffer::new(16);
        let input: Vec<f32> = (0..24).map(|i| i as f32).collect();
        buf.push_slice(&input);

        assert_eq!(buf.head(), 8);
        let expected: Vec<f32> = (8..24).map(|i| i as f32).collect();
        assert_eq!(buf.read_slice(buf.head(), 16), expected);
    }

    #[test]
    fn read_wraps_across_the_seam() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0]); // head ends at 2
        // Positions 2,3 hold the oldest surviving samples (3.0, 4.0).
        assert_eq!(buf.read_slice(2, 4), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn read_is_non_destructive() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0_f32, 2.0, 3.0]);
        let first = buf.read_slice(0, 3);
        let second = buf.read_slice(0, 3);
        assert_eq!(first, second);
        assert_eq!(buf.head(), 3);
    }

    // ---- Modular indexing --------------------------------------------------

    #[test]
    fn read_start_taken_modulo_capacity() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0_f32, 2.0, 3.0, 4.0]);
        assert_eq!(buf.read_slice(5, 2), buf.read_slice(1, 2));
    }

    #[test]
    fn read_zero_len_is_empty() {
        let buf: RingBuffer<f32> = RingBuffer::new(4);
        assert!(buf.read_slice(0, 0).is_empty());
    }

    // ---- Distance ----------------------------------------------------------

    #[test]
    fn distance_without_wrap() {
        let buf: RingBuffer<f32> = RingBuffer::new(16);
        assert_eq!(buf.distance(3, 11), 8);
    }

    #[test]
    fn distance_across_the_seam() {
        let buf: RingBuffer<f32> = RingBuffer::new(16);
        assert_eq!(buf.distance(12, 4), 8);
    }

    #[test]
    fn distance_equal_positions_is_zero() {
        let buf: RingBuffer<f32> = RingBuffer::new(16);
        assert_eq!(buf.distance(5, 5), 0);
    }

    #[test]
    fn distance_reduces_arguments_modulo_capacity() {
        let buf: RingBuffer<f32> = RingBuffer::new(16);
        assert_eq!(buf.distance(19, 36), buf.distance(3, 4));
    }

    // ---- Panic guard -------------------------------------------------------

    #[test]
    #[should_panic(expected = "RingBuffer capacity must be > 0")]
    fn zero_capacity_panics() {
        let _buf: RingBuffer<f32> = RingBuffer::new(0);
    }
}
