//! Streaming buffers shared between an effect and its host.
//!
//! An effect never owns the audio it processes. Each block it asks its input
//! buffers for a readable run and its output buffers for a writable run,
//! works on the common length, then commits how many samples it consumed and
//! produced. [`StreamBuffer`] is that contract; [`RingBuffer`] is the
//! fixed-capacity implementation used by the CLI and the tests.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A buffer that hands out contiguous runs of samples.
///
/// Requests never block and never allocate. A run may be shorter than asked
/// for (including empty) when the buffer wraps or runs dry.
pub trait StreamBuffer {
    /// Returns the next readable run, at most `max` samples long.
    fn request_read(&mut self, max: usize) -> &[f32];

    /// Marks `count` samples from the last readable run as consumed.
    fn finish_read(&mut self, count: usize);

    /// Returns the next writable run, at most `max` samples long.
    fn request_write(&mut self, max: usize) -> &mut [f32];

    /// Marks `count` samples of the last writable run as produced.
    fn finish_write(&mut self, count: usize);
}

/// Fixed-capacity single-producer/single-consumer ring of samples.
///
/// The storage is allocated once in [`with_capacity`](Self::with_capacity)
/// and never grows.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<f32>,
    read: usize,
    len: usize,
}

impl RingBuffer {
    /// Creates an empty ring holding up to `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity],
            read: 0,
            len: 0,
        }
    }

    /// Total number of samples the ring can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Samples waiting to be read (may span the wrap point).
    #[inline]
    pub fn available_read(&self) -> usize {
        self.len
    }

    /// Free slots (may span the wrap point).
    #[inline]
    pub fn available_write(&self) -> usize {
        self.capacity() - self.len
    }

    /// Drops all buffered samples.
    pub fn clear(&mut self) {
        self.read = 0;
        self.len = 0;
    }

    /// Appends as much of `samples` as fits; returns the number written.
    pub fn push_slice(&mut self, samples: &[f32]) -> usize {
        let mut written = 0;
        while written < samples.len() {
            let run = self.request_write(samples.len() - written);
            let n = run.len();
            if n == 0 {
                break;
            }
            run.copy_from_slice(&samples[written..written + n]);
            self.finish_write(n);
            written += n;
        }
        written
    }

    /// Moves up to `out.len()` buffered samples into `out`; returns the count.
    pub fn pop_into(&mut self, out: &mut [f32]) -> usize {
        let mut read = 0;
        while read < out.len() {
            let run = self.request_read(out.len() - read);
            let n = run.len();
            if n == 0 {
                break;
            }
            out[read..read + n].copy_from_slice(run);
            self.finish_read(n);
            read += n;
        }
        read
    }

    fn write_start(&self) -> usize {
        (self.read + self.len) % self.capacity()
    }
}

impl StreamBuffer for RingBuffer {
    fn request_read(&mut self, max: usize) -> &[f32] {
        let capacity = self.capacity();
        if capacity == 0 {
            return &[];
        }
        let run = self.len.min(capacity - self.read).min(max);
        &self.data[self.read..self.read + run]
    }

    fn finish_read(&mut self, count: usize) {
        if count > self.len {
            #[cfg(feature = "tracing")]
            tracing::warn!("ring_buffer: finish_read({count}) with only {} readable", self.len);
        }
        let count = count.min(self.len);
        if count == 0 {
            return;
        }
        self.read = (self.read + count) % self.capacity();
        self.len -= count;
    }

    fn request_write(&mut self, max: usize) -> &mut [f32] {
        let capacity = self.capacity();
        if capacity == 0 {
            return &mut [];
        }
        let start = self.write_start();
        let run = (capacity - self.len).min(capacity - start).min(max);
        &mut self.data[start..start + run]
    }

    fn finish_write(&mut self, count: usize) {
        let free = self.available_write();
        if count > free {
            #[cfg(feature = "tracing")]
            tracing::warn!("ring_buffer: finish_write({count}) with only {free} free");
        }
        self.len += count.min(free);
    }
}

/// Copies up to `max` samples from `from` to `to` and commits them on both.
///
/// Only one contiguous run is moved per call; returns the number of samples
/// transferred. Meant for hosts shuttling audio between their own buffers.
pub fn transfer<A, B>(from: &mut A, to: &mut B, max: usize) -> usize
where
    A: StreamBuffer + ?Sized,
    B: StreamBuffer + ?Sized,
{
    let count = {
        let src = from.request_read(max);
        let dst = to.request_write(src.len());
        let n = dst.len();
        dst.copy_from_slice(&src[..n]);
        n
    };
    from.finish_read(count);
    to.finish_write(count);
    count
}
