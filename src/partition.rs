//! # Partition — Splitting `[√n + 1, n]` Across Workers
//!
//! The coordinator sieves `[2, √n]` once and hands the rest of the range to
//! worker segments. [`PartitionPlan::new`] cuts `[√n + 1, n]` into contiguous,
//! non-overlapping [`SegmentRange`]s:
//!
//! ```text
//! per = (n - √n) / segments
//! segment i = [√n + i·per + 1, √n + (i + 1)·per]     (last: hi = n)
//! ```
//!
//! The last segment absorbs the remainder of the integer division.
//!
//! ## Degenerate Plans
//!
//! A segment needs `lo < hi`, so a span of `s` integers supports at most
//! `s / 2` segments. Asking for more threads than that clamps the segment
//! count rather than producing empty or single-element ranges. A span of fewer
//! than two integers (only `n ≤ 2`) yields no segments at all; the pre-sieve
//! bound is raised to `n` so the pre-sieve alone covers the whole range.

use tracing::debug;

use crate::error::SieveError;
use crate::segment::Segment;

/// A `[lo, hi]` slice of the partitioned span, not yet bound to a pre-sieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    pub lo: u32,
    pub hi: u32,
}

impl SegmentRange {
    /// Number of integers in `[lo, hi]`; 0 when `hi < lo`.
    pub fn len(&self) -> u64 {
        (self.hi as u64 + 1).saturating_sub(self.lo as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.hi < self.lo
    }

    /// Attach the shared pre-sieve, producing a runnable segment.
    pub fn bind<'a>(&self, pre_sieved: &'a [u32]) -> Result<Segment<'a>, SieveError> {
        Segment::new(self.lo, self.hi, pre_sieved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    bound: u32,
    sqrt_n: u32,
    pre_sieve_bound: u32,
    requested_threads: usize,
    ranges: Vec<SegmentRange>,
}

impl PartitionPlan {
    /// Upper bound of the pre-sieve for a run to `n`: `⌊√n⌋`, or `n` itself
    /// when the span above `√n` is too short to hold a segment.
    pub fn pre_sieve_bound_for(n: u32) -> u32 {
        let sqrt_n = (n as u64).isqrt();
        if n as u64 - sqrt_n < 2 {
            n
        } else {
            sqrt_n as u32
        }
    }

    /// Number of segments a plan for `n` on `threads` workers holds:
    /// `min(threads, span / 2)` where the span is `[√n + 1, n]`.
    pub fn segment_count(n: u32, threads: usize) -> usize {
        let span = n as u64 - (n as u64).isqrt();
        (threads as u64).min(span / 2) as usize
    }

    pub fn new(n: u32, threads: usize) -> Result<Self, SieveError> {
        let n = crate::check_bound(n as u64)?;
        if threads == 0 {
            return Err(SieveError::InvalidThreadCount { threads });
        }
        let sqrt_n = (n as u64).isqrt();
        let span = n as u64 - sqrt_n;
        let segments = Self::segment_count(n, threads) as u64;

        if segments == 0 {
            return Ok(PartitionPlan {
                bound: n,
                sqrt_n: sqrt_n as u32,
                pre_sieve_bound: n,
                requested_threads: threads,
                ranges: Vec::new(),
            });
        }

        if segments < threads as u64 {
            debug!(
                bound = n,
                requested = threads,
                segments,
                "range too small for requested threads, clamping segment count"
            );
        }
        let per_thread = span / segments;
        let ranges = (0..segments)
            .map(|i| {
                let lo = sqrt_n + i * per_thread + 1;
                let hi = if i == segments - 1 {
                    n as u64
                } else {
                    sqrt_n + (i + 1) * per_thread
                };
                SegmentRange {
                    lo: lo as u32,
                    hi: hi as u32,
                }
            })
            .collect();

        Ok(PartitionPlan {
            bound: n,
            sqrt_n: sqrt_n as u32,
            pre_sieve_bound: sqrt_n as u32,
            requested_threads: threads,
            ranges,
        })
    }

    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// `⌊√n⌋`.
    pub fn sqrt_n(&self) -> u32 {
        self.sqrt_n
    }

    /// Upper bound of the synchronous pre-sieve `[2, pre_sieve_bound]`.
    pub fn pre_sieve_bound(&self) -> u32 {
        self.pre_sieve_bound
    }

    pub fn requested_threads(&self) -> usize {
        self.requested_threads
    }

    pub fn ranges(&self) -> &[SegmentRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
