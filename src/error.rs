//! # Error — Run-Level Failure Taxonomy
//!
//! Every fallible operation in the library returns [`SieveError`]. Errors fall
//! into two coarse kinds (see [`ErrorKind`]):
//!
//! - **Invalid configuration**: an unknown algorithm id, a streaming request for
//!   a vector-only algorithm, a zero thread count, an inverted segment range or
//!   a bound above [`MAX_BOUND`](crate::MAX_BOUND). Rejected before any sieve
//!   work begins.
//! - **Resource failure**: a marking buffer that cannot be allocated, or an
//!   output sink that cannot be written. Propagated as a failure of the whole
//!   run; partial output is never treated as valid.
//!
//! Nothing is retried: sieving is deterministic, so a retry cannot change the
//! outcome.

use crate::algorithm::Algorithm;

/// Coarse classification of a [`SieveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidConfiguration,
    ResourceFailure,
}

/// Errors from sieve kernels, partitioning, the coordinator and output sinks.
#[derive(Debug)]
pub enum SieveError {
    /// Algorithm id outside 0..=4.
    InvalidAlgorithm { id: u8 },
    /// Direct-to-stream execution requested for a vector-only algorithm.
    UnsupportedMode { algorithm: Algorithm },
    /// Thread count of zero.
    InvalidThreadCount { threads: usize },
    /// Segment with `lo >= hi` or `lo == 0`.
    InvalidRange { lo: u32, hi: u32 },
    /// Upper bound outside the signed 32-bit domain.
    BoundTooLarge { bound: u64 },
    /// A marking buffer of `bits` entries could not be allocated.
    Allocation { bits: usize },
    /// The worker thread pool could not be started.
    ThreadPool { reason: String },
    /// The output sink rejected a write.
    Io(std::io::Error),
    /// A segment task failed; the whole run is void.
    SegmentFailed {
        lo: u32,
        hi: u32,
        source: Box<SieveError>,
    },
}

impl SieveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SieveError::InvalidAlgorithm { .. }
            | SieveError::UnsupportedMode { .. }
            | SieveError::InvalidThreadCount { .. }
            | SieveError::InvalidRange { .. }
            | SieveError::BoundTooLarge { .. } => ErrorKind::InvalidConfiguration,
            SieveError::Allocation { .. }
            | SieveError::ThreadPool { .. }
            | SieveError::Io(_) => ErrorKind::ResourceFailure,
            SieveError::SegmentFailed { source, .. } => source.kind(),
        }
    }
}

impl std::fmt::Display for SieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SieveError::InvalidAlgorithm { id } => {
                write!(f, "invalid algorithm id {} (expected 0-4)", id)
            }
            SieveError::UnsupportedMode { algorithm } => write!(
                f,
                "{} does not support direct-to-stream output",
                algorithm
            ),
            SieveError::InvalidThreadCount { threads } => {
                write!(f, "thread count must be at least 1, got {}", threads)
            }
            SieveError::InvalidRange { lo, hi } => {
                write!(f, "invalid segment [{}, {}]: need 1 <= lo < hi", lo, hi)
            }
            SieveError::BoundTooLarge { bound } => write!(
                f,
                "bound {} exceeds the maximum of {}",
                bound,
                crate::MAX_BOUND
            ),
            SieveError::Allocation { bits } => {
                write!(f, "unable to allocate a sieve buffer of {} bits", bits)
            }
            SieveError::ThreadPool { reason } => {
                write!(f, "unable to start worker threads: {}", reason)
            }
            SieveError::Io(e) => write!(f, "output error: {}", e),
            SieveError::SegmentFailed { lo, hi, source } => {
                write!(f, "segment [{}, {}] failed: {}", lo, hi, source)
            }
        }
    }
}

impl std::error::Error for SieveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SieveError::Io(e) => Some(e),
            SieveError::SegmentFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SieveError {
    fn from(e: std::io::Error) -> Self {
        SieveError::Io(e)
    }
}
