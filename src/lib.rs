//! # findprimes — Parallel Prime Enumeration
//!
//! Enumerates every prime in `[2, n]` with one of five interchangeable
//! algorithms (see [`Algorithm`]). Each algorithm has a full-range kernel
//! ([`sieve`]) and a segmented kernel ([`sieve_segment`]) that sieves a window
//! `[lo, hi]` given the primes up to `√hi`.
//!
//! A [`Job`] runs a kernel over several threads: `[2, √n]` is sieved once,
//! `[√n + 1, n]` is cut into contiguous segments by a [`PartitionPlan`], the
//! segments run concurrently on a local rayon pool, and the results are merged
//! in range order. Output for any thread count is identical to the
//! single-threaded run of the same algorithm.
//!
//! ```no_run
//! use findprimes::{run, Algorithm};
//!
//! let primes = run(1_000, Algorithm::Eratosthenes, 4)?;
//! assert_eq!(primes.len(), 168);
//! # Ok::<(), findprimes::SieveError>(())
//! ```

pub mod algorithm;
pub mod coordinator;
pub mod error;
pub mod output;
pub mod partition;
pub mod progress;
pub mod segment;
pub mod sieve;

pub use algorithm::Algorithm;
pub use coordinator::{run, Job, OutputMode, RunSummary};
pub use error::{ErrorKind, SieveError};
pub use output::{BufferedSink, CountSink, OutputSink, Tally, TextSink};
pub use partition::{PartitionPlan, SegmentRange};
pub use progress::Progress;
pub use segment::{sieve_segment, sieve_segment_into, Segment};
pub use sieve::{sieve, sieve_into};

/// Largest accepted upper bound: the signed 32-bit maximum.
pub const MAX_BOUND: u32 = i32::MAX as u32;

/// Reject bounds above [`MAX_BOUND`].
pub(crate) fn check_bound(bound: u64) -> Result<u32, SieveError> {
    if bound > MAX_BOUND as u64 {
        return Err(SieveError::BoundTooLarge { bound });
    }
    Ok(bound as u32)
}
