//! Run-length encoding of per-element match results into byte ranges
//!
//! The encoder is a stateful accumulator bound to one scan invocation. It
//! coalesces consecutive matching byte positions into group-relative
//! ranges; it partitions the input range and never copies bytes. Callers
//! must [`close`](RunLengthEncoder::close) the encoder at the end of a
//! scan or a trailing match run is lost.

use serde::{Deserialize, Serialize};

/// A contiguous byte range, relative to a read group's buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub offset: usize,
    pub size: usize,
}

impl ByteRange {
    /// Creates a range covering `[offset, offset + size)`
    pub const fn new(offset: usize, size: usize) -> Self {
        ByteRange { offset, size }
    }

    /// End offset (exclusive)
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Stateful run-length accumulator for one scan invocation
///
/// The cursor tracks the group-relative offset of the next undecided byte;
/// an active run grows from the cursor. The `limit` is the encodable end
/// of the element range: the checked finalize clamps emitted runs against
/// it so boundary fast paths can feed whole vector chunks without emitting
/// bytes past the range.
#[derive(Debug)]
pub struct RunLengthEncoder {
    ranges: Vec<ByteRange>,
    cursor: usize,
    run_length: usize,
    limit: usize,
}

impl RunLengthEncoder {
    /// Creates an encoder starting at `start_offset` with encodable end `limit`
    pub fn new(start_offset: usize, limit: usize) -> Self {
        RunLengthEncoder {
            ranges: Vec::new(),
            cursor: start_offset,
            run_length: 0,
            limit,
        }
    }

    /// Extends the active match run by `n` bytes, starting one if needed
    pub fn encode_range(&mut self, n: usize) {
        self.run_length += n;
    }

    /// Closes the active run (emitting it if non-empty), then skips `n` bytes
    pub fn finalize_current_encode(&mut self, n: usize) {
        if self.run_length > 0 {
            self.ranges
                .push(ByteRange::new(self.cursor, self.run_length));
            self.cursor += self.run_length;
            self.run_length = 0;
        }
        self.cursor += n;
    }

    /// Closing variant that clamps the emitted run to the encodable limit
    ///
    /// The checked invariant: no emitted range extends past `limit`. Used
    /// wherever a vector fast path may have fed overread bytes into the
    /// run.
    pub fn finalize_current_encode_checked(&mut self, n: usize) {
        if self.run_length > 0 {
            let available = self.limit.saturating_sub(self.cursor);
            let emitted = self.run_length.min(available);
            if emitted > 0 {
                self.ranges.push(ByteRange::new(self.cursor, emitted));
            }
            self.cursor += self.run_length;
            self.run_length = 0;
        }
        self.cursor += n;
    }

    /// Shifts the coordinate origin back by `k` bytes
    ///
    /// Compensates for a vector scan whose read base was pulled back `k`
    /// bytes before the true range start: the masked-out leading bytes
    /// pass through the encoder as non-matches and land the cursor on the
    /// true start.
    pub fn adjust_for_misalignment(&mut self, k: usize) {
        debug_assert!(k <= self.cursor);
        self.cursor -= k;
    }

    /// Closes any trailing run; must be called once at scan end
    pub fn close(&mut self) {
        self.finalize_current_encode_checked(0);
    }

    /// Number of ranges collected so far
    pub fn result_count(&self) -> usize {
        self.ranges.len()
    }

    /// Consumes the encoder, returning the ascending non-overlapping ranges
    ///
    /// Call only after [`close`](Self::close); an unfinalized trailing run
    /// is discarded.
    pub fn into_ranges(self) -> Vec<ByteRange> {
        self.ranges
    }
}
