//! # Progress — Atomic Run Progress Counters
//!
//! Thread-safe progress tracking shared between segment tasks and an optional
//! background reporter. Segment tasks bump lock-free counters once per
//! completed segment; the reporter thread logs a status line on a fixed
//! interval until it is stopped.
//!
//! ## Background Reporter
//!
//! [`Progress::start_reporter`] spawns a thread that parks for the interval,
//! then logs segments completed, primes found and the highest bound finished.
//! [`Reporter::stop`] raises the shutdown flag and unparks the thread so a
//! finished run never waits out a full interval.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

pub struct Progress {
    pub segments_total: AtomicU64,
    pub segments_done: AtomicU64,
    pub found: AtomicU64,
    /// Largest `hi` of any completed segment. Segments finish out of order,
    /// so this is a high-water mark, not a contiguous frontier.
    pub highest: AtomicU64,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            segments_total: AtomicU64::new(0),
            segments_done: AtomicU64::new(0),
            found: AtomicU64::new(0),
            highest: AtomicU64::new(0),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Record one finished segment.
    pub fn segment_done(&self, hi: u32, primes: u64) {
        self.segments_done.fetch_add(1, Ordering::Relaxed);
        self.found.fetch_add(primes, Ordering::Relaxed);
        self.highest.fetch_max(hi as u64, Ordering::Relaxed);
    }

    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> Reporter {
        let progress = Arc::clone(self);
        let handle = thread::spawn(move || loop {
            thread::park_timeout(interval);
            if progress.is_stopped() {
                break;
            }
            progress.print_status();
        });
        Reporter {
            progress: Arc::clone(self),
            handle,
        }
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let done = self.segments_done.load(Ordering::Relaxed);
        let total = self.segments_total.load(Ordering::Relaxed);
        let found = self.found.load(Ordering::Relaxed);
        let highest = self.highest.load(Ordering::Relaxed);
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            segments = format_args!("{}/{}", done, total),
            found,
            highest,
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "sieve progress"
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Handle to a running background reporter.
pub struct Reporter {
    progress: Arc<Progress>,
    handle: thread::JoinHandle<()>,
}

impl Reporter {
    /// Stop the reporter and wait for its thread to exit.
    pub fn stop(self) {
        self.progress.stop();
        self.handle.thread().unpark();
        let _ = self.handle.join();
    }
}

#[cfg(test)]
mod tests {
    //! Tests for the atomic progress counters and the background reporter.
    //!
    //! Segment tasks update counters from rayon workers, so the concurrent
    //! test checks that 8 threads recording 100 segments each always add up
    //! to exactly 800 segments, and that the high-water mark ends at the
    //! largest `hi` any thread reported.

    use super::*;

    // ── Initialization ──────────────────────────────────────────────

    #[test]
    fn counters_start_at_zero() {
        let p = Progress::new();
        assert_eq!(p.segments_done.load(Ordering::Relaxed), 0);
        assert_eq!(p.segments_total.load(Ordering::Relaxed), 0);
        assert_eq!(p.found.load(Ordering::Relaxed), 0);
        assert_eq!(p.highest.load(Ordering::Relaxed), 0);
        assert!(!p.is_stopped());
    }

    // ── Updates ─────────────────────────────────────────────────────

    #[test]
    fn segment_done_accumulates() {
        let p = Progress::new();
        p.segment_done(500, 10);
        p.segment_done(300, 5);
        assert_eq!(p.segments_done.load(Ordering::Relaxed), 2);
        assert_eq!(p.found.load(Ordering::Relaxed), 15);
        assert_eq!(p.highest.load(Ordering::Relaxed), 500);
    }

    #[test]
    fn concurrent_updates_are_exact() {
        let p = Progress::new();
        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    for i in 0..100u32 {
                        p.segment_done(t * 1_000 + i, 2);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(p.segments_done.load(Ordering::Relaxed), 800);
        assert_eq!(p.found.load(Ordering::Relaxed), 1_600);
        assert_eq!(p.highest.load(Ordering::Relaxed), 7_099);
    }

    // ── Reporter ────────────────────────────────────────────────────

    #[test]
    fn reporter_stops_promptly() {
        let p = Progress::new();
        let reporter = p.start_reporter(Duration::from_secs(3600));
        let started = Instant::now();
        reporter.stop();
        assert!(p.is_stopped());
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn print_status_with_zero_elapsed() {
        let p = Progress::new();
        p.print_status();
    }
}
