//! Chunked byte-pattern comparison
//!
//! A [`BytePattern`] is split into 16-byte chunks once at compile time;
//! probing a candidate offset then walks whole chunks instead of
//! re-interpreting the pattern per byte. The final partial chunk's mask is
//! zero-padded so padding bytes are auto-true under equality.

use crate::core::types::BytePattern;
use crate::core::VECTOR_WIDTH;

/// One 16-byte slice of a pattern with its significance mask
#[derive(Debug, Clone, Copy)]
struct PatternChunk {
    bytes: [u8; VECTOR_WIDTH],
    mask: [u8; VECTOR_WIDTH],
}

/// A byte pattern pre-chunked for vector-width probing
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    chunks: Vec<PatternChunk>,
    len: usize,
    first_significant: Option<(usize, u8)>,
}

impl CompiledPattern {
    /// Chunks a pattern once; probes reuse the chunks for every candidate
    pub fn compile(pattern: &BytePattern) -> Self {
        let len = pattern.len();
        let mut chunks = Vec::with_capacity(len.div_ceil(VECTOR_WIDTH));
        for start in (0..len).step_by(VECTOR_WIDTH) {
            let end = (start + VECTOR_WIDTH).min(len);
            let mut chunk = PatternChunk {
                bytes: [0u8; VECTOR_WIDTH],
                mask: [0u8; VECTOR_WIDTH],
            };
            chunk.bytes[..end - start].copy_from_slice(&pattern.bytes()[start..end]);
            chunk.mask[..end - start].copy_from_slice(&pattern.mask()[start..end]);
            chunks.push(chunk);
        }
        CompiledPattern {
            chunks,
            len,
            first_significant: pattern.first_significant(),
        }
    }

    /// The pattern length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks if the pattern is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First significant byte and its offset, for candidate skipping
    pub fn first_significant(&self) -> Option<(usize, u8)> {
        self.first_significant
    }

    /// Equality probe: every significant byte of every chunk matches
    ///
    /// Chunks AND-reduce with an early exit on the first failing chunk.
    pub fn matches_equal(&self, data: &[u8]) -> bool {
        if data.len() < self.len {
            return false;
        }
        for (index, chunk) in self.chunks.iter().enumerate() {
            let window = &data[index * VECTOR_WIDTH..];
            let compared = window.len().min(VECTOR_WIDTH);
            for i in 0..compared {
                if (window[i] ^ chunk.bytes[i]) & chunk.mask[i] != 0 {
                    return false;
                }
            }
            // Pattern bytes past the window end are padding (mask zero), so
            // nothing further to check for this chunk.
        }
        true
    }

    /// Inequality probe: every significant byte differs
    ///
    /// Per-chunk comparisons are inverted then AND-reduced, with the same
    /// early exit once the accumulated result cannot recover.
    pub fn matches_not_equal(&self, data: &[u8]) -> bool {
        if data.len() < self.len {
            return false;
        }
        for (index, chunk) in self.chunks.iter().enumerate() {
            let window = &data[index * VECTOR_WIDTH..];
            let compared = window.len().min(VECTOR_WIDTH);
            for i in 0..compared {
                if chunk.mask[i] != 0 && window[i] == chunk.bytes[i] {
                    return false;
                }
            }
        }
        true
    }

    /// Whole-window current-vs-previous equality under the pattern's mask
    ///
    /// `Changed`/`Unchanged` byte-array scans compare the full window, not
    /// per-byte run-length granularity.
    pub fn window_unchanged(&self, current: &[u8], previous: &[u8]) -> bool {
        if current.len() < self.len || previous.len() < self.len {
            return false;
        }
        for (index, chunk) in self.chunks.iter().enumerate() {
            let start = index * VECTOR_WIDTH;
            let end = (start + VECTOR_WIDTH).min(self.len);
            for i in start..end {
                if chunk.mask[i - start] != 0 && current[i] != previous[i] {
                    return false;
                }
            }
        }
        true
    }
}
