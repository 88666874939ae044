//! Round-robin chunk scheduling.
//!
//! Evaluating every particle every frame is the dominant cost at high counts.
//! The scheduler splits `0..len` into `ceil(len / chunk_size)` chunks and hands
//! out one per tick, so per-frame work is bounded by `chunk_size` and each
//! particle is revisited every `chunk_count` ticks.

use std::ops::Range;

use crate::error::ConfigError;

/// Rotating cursor over fixed-size index chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkScheduler {
    len: usize,
    chunk_size: usize,
    chunk_count: usize,
    cursor: usize,
}

impl ChunkScheduler {
    /// Partition `len` particles into chunks of `chunk_size`.
    ///
    /// The last chunk is shorter when `len` is not a multiple of `chunk_size`.
    /// When `len <= chunk_size` there is a single chunk covering everything.
    pub fn new(len: usize, chunk_size: usize) -> Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::NoParticles);
        }
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }

        Ok(Self {
            len,
            chunk_size,
            chunk_count: len.div_ceil(chunk_size),
            cursor: 0,
        })
    }

    /// Number of particles covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a scheduler covers at least one particle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Configured chunk size.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks in a full pass.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Index of the chunk the next [`advance`](ChunkScheduler::advance) returns.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index range of chunk `k`.
    pub fn chunk_range(&self, k: usize) -> Range<usize> {
        let start = (k * self.chunk_size).min(self.len);
        let end = (start + self.chunk_size).min(self.len);
        start..end
    }

    /// Range the next tick will process, without moving the cursor.
    pub fn peek(&self) -> Range<usize> {
        self.chunk_range(self.cursor)
    }

    /// Take the current chunk and rotate the cursor.
    pub fn advance(&mut self) -> Range<usize> {
        let range = self.peek();
        self.cursor = (self.cursor + 1) % self.chunk_count;
        range
    }

    /// `cursor / chunk_count`, a diagnostic of where the pass stands.
    pub fn progress(&self) -> f32 {
        self.cursor as f32 / self.chunk_count as f32
    }
}
