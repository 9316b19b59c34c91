//! # Coordinator — Parallel Segmented Sieve Runs
//!
//! A [`Job`] fixes the bound, algorithm, thread count and output mode, all
//! validated at construction. Running it produces every prime in `[2, n]`, in
//! ascending order, into a [`BufferedSink`].
//!
//! ## Protocol (threads > 1)
//!
//! 1. A local rayon pool is built for the run, sized to the number of segments
//!    the plan will hold. That is the requested thread count, clamped when the
//!    range is too small to give every thread a segment.
//! 2. The pre-sieve of `[2, √n]` and the [`PartitionPlan`] over `[√n + 1, n]`
//!    are computed concurrently with `rayon::join`. Both must finish before any
//!    segment starts.
//! 3. Every segment borrows the pre-sieved primes immutably and writes into a
//!    buffer it owns. Segments run through an order-preserving `par_iter`.
//! 4. Collecting into `Result<Vec<_>, _>` is the join barrier: the first failed
//!    segment fails the run and nothing reaches the sink.
//! 5. The merge runs on the calling thread: pre-sieve primes first, then each
//!    segment buffer in range order. Segments are contiguous and disjoint, so
//!    concatenation is globally ascending.
//!
//! With one thread the full-range kernel writes straight into the sink.
//!
//! ## Output Modes
//!
//! [`OutputMode::Vector`] runs the kernels that return owned vectors.
//! [`OutputMode::Streaming`] runs the direct-to-sink kernels: in parallel runs
//! each segment streams into a private buffer from [`BufferedSink::buffer`]
//! (for a text sink, an in-memory byte buffer) which the merge splices in
//! order. Only Eratosthenes and Sundaram support streaming; the pre-sieve is
//! always a vector because segments need it as input.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, info};

use crate::algorithm::Algorithm;
use crate::error::SieveError;
use crate::output::{BufferedSink, OutputSink, Tally};
use crate::partition::PartitionPlan;
use crate::progress::Progress;
use crate::segment::{self, Segment};
use crate::sieve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Vector,
    Streaming,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub bound: u32,
    pub algorithm: Algorithm,
    pub mode: OutputMode,
    /// Requested thread count.
    pub threads: usize,
    /// Worker threads actually started (1 for single-threaded runs).
    pub workers: usize,
    /// Number of segments dispatched (0 for single-threaded runs).
    pub segments: usize,
    /// Number of primes produced by the pre-sieve.
    pub pre_sieved: usize,
    pub primes: u64,
    pub largest: Option<u32>,
    pub elapsed_ms: f64,
}

/// A validated sieve run.
#[derive(Clone)]
pub struct Job {
    bound: u32,
    algorithm: Algorithm,
    threads: usize,
    mode: OutputMode,
    progress: Option<Arc<Progress>>,
}

impl Job {
    pub fn new(
        bound: u32,
        algorithm: Algorithm,
        threads: usize,
        mode: OutputMode,
    ) -> Result<Self, SieveError> {
        let bound = crate::check_bound(bound as u64)?;
        if threads == 0 {
            return Err(SieveError::InvalidThreadCount { threads });
        }
        if mode == OutputMode::Streaming && !algorithm.supports_streaming() {
            return Err(SieveError::UnsupportedMode { algorithm });
        }
        Ok(Job {
            bound,
            algorithm,
            threads,
            mode,
            progress: None,
        })
    }

    /// Report segment completion to `progress` while running.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn bound(&self) -> u32 {
        self.bound
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Run into a fresh vector.
    pub fn run(&self) -> Result<Vec<u32>, SieveError> {
        let mut primes = Vec::new();
        self.run_into(&mut primes)?;
        Ok(primes)
    }

    /// Run and deliver every prime, in order, to `sink`.
    pub fn run_into<S: BufferedSink>(&self, sink: &mut S) -> Result<RunSummary, SieveError> {
        let start = Instant::now();
        info!(
            bound = self.bound,
            algorithm = %self.algorithm,
            threads = self.threads,
            mode = ?self.mode,
            "sieve run starting"
        );

        let outcome = if self.threads == 1 {
            let mut tally = Tally::new(&mut *sink);
            self.run_single(&mut tally)?;
            Outcome {
                workers: 1,
                segments: 0,
                pre_sieved: 0,
                primes: tally.count(),
                largest: tally.largest(),
            }
        } else {
            self.run_parallel(sink)?
        };
        sink.finish()?;

        let summary = RunSummary {
            bound: self.bound,
            algorithm: self.algorithm,
            mode: self.mode,
            threads: self.threads,
            workers: outcome.workers,
            segments: outcome.segments,
            pre_sieved: outcome.pre_sieved,
            primes: outcome.primes,
            largest: outcome.largest,
            elapsed_ms: start.elapsed().as_secs_f64() * 1_000.0,
        };
        info!(
            primes = summary.primes,
            largest = ?summary.largest,
            segments = summary.segments,
            elapsed_ms = format_args!("{:.1}", summary.elapsed_ms),
            "sieve run complete"
        );
        Ok(summary)
    }

    fn run_single<S: OutputSink>(&self, sink: &mut S) -> Result<(), SieveError> {
        match self.mode {
            OutputMode::Vector => {
                let primes = sieve::sieve(self.bound, self.algorithm)?;
                sink.emit(&primes)
            }
            OutputMode::Streaming => sieve::sieve_into(self.bound, self.algorithm, sink),
        }
    }

    fn run_parallel<S: BufferedSink>(&self, sink: &mut S) -> Result<Outcome, SieveError> {
        // Never start more workers than there are segments to run.
        let workers = PartitionPlan::segment_count(self.bound, self.threads).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sieve-{}", i))
            .build()
            .map_err(|e| SieveError::ThreadPool {
                reason: e.to_string(),
            })?;

        let pre_sieve_bound = PartitionPlan::pre_sieve_bound_for(self.bound);
        let (pre_sieved, plan) = pool.install(|| {
            rayon::join(
                || sieve::sieve(pre_sieve_bound, self.algorithm),
                || PartitionPlan::new(self.bound, self.threads),
            )
        });
        let pre_sieved = pre_sieved?;
        let plan = plan?;
        debug!(
            sqrt_n = plan.sqrt_n(),
            pre_sieve_bound = plan.pre_sieve_bound(),
            pre_sieved = pre_sieved.len(),
            requested = plan.requested_threads(),
            segments = plan.len(),
            workers,
            "pre-sieve complete"
        );
        if let Some(progress) = &self.progress {
            progress
                .segments_total
                .store(plan.len() as u64, Ordering::Relaxed);
        }

        let segments = plan
            .ranges()
            .iter()
            .map(|r| r.bind(&pre_sieved))
            .collect::<Result<Vec<_>, _>>()?;

        let mut outcome = Outcome {
            workers,
            segments: segments.len(),
            pre_sieved: pre_sieved.len(),
            primes: pre_sieved.len() as u64,
            largest: pre_sieved.last().copied(),
        };

        match self.mode {
            OutputMode::Vector => {
                let parts: Vec<Vec<u32>> = pool.install(|| {
                    segments
                        .par_iter()
                        .map(|seg| {
                            self.run_segment(seg, |seg| segment::sieve_segment(seg, self.algorithm))
                        })
                        .collect::<Result<_, _>>()
                })?;
                sink.emit(&pre_sieved)?;
                for part in &parts {
                    outcome.record(part.len() as u64, part.last().copied());
                    sink.emit(part)?;
                }
            }
            OutputMode::Streaming => {
                let buffers: Vec<S::Buffer> = segments.iter().map(|_| sink.buffer()).collect();
                let parts: Vec<Tally<S::Buffer>> = pool.install(|| {
                    segments
                        .par_iter()
                        .zip(buffers)
                        .map(|(seg, buffer)| {
                            self.run_segment(seg, |seg| {
                                let mut buffer = Tally::new(buffer);
                                segment::sieve_segment_into(seg, self.algorithm, &mut buffer)?;
                                Ok(buffer)
                            })
                        })
                        .collect::<Result<_, _>>()
                })?;
                sink.emit(&pre_sieved)?;
                for part in parts {
                    outcome.record(part.count(), part.largest());
                    sink.append(part.into_inner())?;
                }
            }
        }
        Ok(outcome)
    }

    /// Run one segment task, tagging failures with the segment's range and
    /// reporting completion.
    fn run_segment<T: SegmentOutput>(
        &self,
        seg: &Segment<'_>,
        task: impl FnOnce(&Segment<'_>) -> Result<T, SieveError>,
    ) -> Result<T, SieveError> {
        let _span = debug_span!("segment", lo = seg.lo(), hi = seg.hi()).entered();
        let output = task(seg).map_err(|e| SieveError::SegmentFailed {
            lo: seg.lo(),
            hi: seg.hi(),
            source: Box::new(e),
        })?;
        debug!(primes = output.primes(), "segment complete");
        if let Some(progress) = &self.progress {
            progress.segment_done(seg.hi(), output.primes());
        }
        Ok(output)
    }
}

/// Anything a segment task hands back to the merge step.
trait SegmentOutput {
    fn primes(&self) -> u64;
}

impl SegmentOutput for Vec<u32> {
    fn primes(&self) -> u64 {
        self.len() as u64
    }
}

impl<B> SegmentOutput for Tally<B> {
    fn primes(&self) -> u64 {
        self.count()
    }
}

struct Outcome {
    workers: usize,
    segments: usize,
    pre_sieved: usize,
    primes: u64,
    largest: Option<u32>,
}

impl Outcome {
    fn record(&mut self, primes: u64, largest: Option<u32>) {
        self.primes += primes;
        if largest.is_some() {
            self.largest = largest;
        }
    }
}

/// Run the vector path: all primes in `[2, bound]` using `threads` workers.
pub fn run(bound: u32, algorithm: Algorithm, threads: usize) -> Result<Vec<u32>, SieveError> {
    Job::new(bound, algorithm, threads, OutputMode::Vector)?.run()
}
