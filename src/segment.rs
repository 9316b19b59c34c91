//! # Segment — Range-Restricted Prime Enumeration
//!
//! Segmented forms of the five kernels in [`sieve`](crate::sieve): instead of
//! `[2, n]` they enumerate exactly the primes in `[lo, hi]`, using a borrowed
//! list of small primes (the pre-sieve) as the marking basis. Every segmented
//! kernel returns the same set its full-range counterpart would produce on that
//! range, so concatenating a pre-sieve with contiguous segments reproduces the
//! full-range output.
//!
//! ## Precondition
//!
//! `pre_sieved` must be an ascending, complete prefix of the primes that
//! includes every prime `≤ √hi`. A list that stops short silently lets
//! composites through; this is not checked at runtime.
//!
//! ## Boundary Arithmetic
//!
//! - The first multiple of `p` worth clearing is `max(p², ⌈lo/p⌉·p)`. Anything
//!   below `p²` has a smaller prime factor, and `p` itself must survive when a
//!   segment overlaps the pre-sieve.
//! - Odd-stepping kernels start at the first odd candidate `≥ max(lo, 3)`, so
//!   an even `lo` shifts up by one and `lo = 1` never yields 1.
//! - 2 is emitted separately whenever `lo ≤ 2 ≤ hi`.
//! - Sundaram maps `[lo, hi]` to the reduced window
//!   `[⌈(lo - 1)/2⌉, ⌊(hi - 1)/2⌋]` (clamped to start at 1) and marks
//!   `2i + 2i² + t(2i + 1)` only where it falls inside the window.

use crate::algorithm::Algorithm;
use crate::error::SieveError;
use crate::output::OutputSink;
use crate::sieve::{advance_multiples, prime_vec, sundaram_height, BitSieve};

/// A contiguous range `[lo, hi]` together with the shared pre-sieve it is
/// marked against. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    lo: u32,
    hi: u32,
    pre_sieved: &'a [u32],
}

impl<'a> Segment<'a> {
    /// Build a segment. Fails when `lo == 0`, `lo >= hi`, or `hi` exceeds
    /// [`MAX_BOUND`](crate::MAX_BOUND).
    pub fn new(lo: u32, hi: u32, pre_sieved: &'a [u32]) -> Result<Self, SieveError> {
        crate::check_bound(hi as u64)?;
        if lo == 0 || lo >= hi {
            return Err(SieveError::InvalidRange { lo, hi });
        }
        debug_assert!(
            pre_sieved.windows(2).all(|w| w[0] < w[1]),
            "pre-sieved primes must be strictly ascending"
        );
        Ok(Segment { lo, hi, pre_sieved })
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn pre_sieved(&self) -> &'a [u32] {
        self.pre_sieved
    }

    /// Number of integers in `[lo, hi]`.
    pub fn len(&self) -> u64 {
        (self.hi - self.lo) as u64 + 1
    }

    /// Always false: construction rejects empty ranges.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn contains_two(&self) -> bool {
        self.lo <= 2 && 2 <= self.hi
    }

    /// First odd candidate `≥ max(lo, 3)`.
    fn first_odd(&self) -> u64 {
        let start = self.lo.max(3) as u64;
        start | 1
    }

    /// Pre-sieved primes that can have a multiple `p² ≤ hi`.
    fn marking_primes(&self) -> impl Iterator<Item = u64> + 'a {
        let hi = self.hi as u64;
        self.pre_sieved
            .iter()
            .map(|&p| p as u64)
            .take_while(move |&p| p * p <= hi)
    }

    /// First multiple of `p` in the segment that is at least `p²`.
    #[inline]
    fn first_multiple(&self, p: u64) -> u64 {
        (p * p).max((self.lo as u64).div_ceil(p) * p)
    }
}

/// Enumerate the primes in `segment` into an owned vector.
pub fn sieve_segment(segment: &Segment<'_>, algorithm: Algorithm) -> Result<Vec<u32>, SieveError> {
    match algorithm {
        Algorithm::TrialDivision => trial_division(segment),
        Algorithm::Eratosthenes => {
            let mut primes = prime_vec(segment.len())?;
            eratosthenes_into(segment, &mut primes)?;
            Ok(primes)
        }
        Algorithm::Euler => euler(segment),
        Algorithm::Sundaram => {
            let mut primes = prime_vec(segment.len())?;
            sundaram_into(segment, &mut primes)?;
            Ok(primes)
        }
        Algorithm::Incremental => incremental(segment),
    }
}

/// Push the primes in `segment` straight into `sink`.
///
/// Only algorithms with [`Algorithm::supports_streaming`] are accepted.
pub fn sieve_segment_into<S: OutputSink + ?Sized>(
    segment: &Segment<'_>,
    algorithm: Algorithm,
    sink: &mut S,
) -> Result<(), SieveError> {
    match algorithm {
        Algorithm::Eratosthenes => eratosthenes_into(segment, sink),
        Algorithm::Sundaram => sundaram_into(segment, sink),
        other => Err(SieveError::UnsupportedMode { algorithm: other }),
    }
}

fn trial_division(seg: &Segment<'_>) -> Result<Vec<u32>, SieveError> {
    let mut primes = prime_vec(seg.len())?;
    if seg.contains_two() {
        primes.push(2);
    }
    let mut i = seg.first_odd();
    while i <= seg.hi as u64 {
        let mut is_prime = true;
        for &p in seg.pre_sieved {
            let p = p as u64;
            if p * p > i {
                break;
            }
            if i % p == 0 {
                is_prime = false;
                break;
            }
        }
        if is_prime {
            primes.push(i as u32);
        }
        i += 2;
    }
    Ok(primes)
}

fn eratosthenes_into<S: OutputSink + ?Sized>(
    seg: &Segment<'_>,
    sink: &mut S,
) -> Result<(), SieveError> {
    let (lo, hi) = (seg.lo as u64, seg.hi as u64);
    let mut sieve = BitSieve::try_new_all_set(seg.len() as usize)?;
    // Even multiples are never scanned, so 2 is not a marking prime here.
    for p in seg.marking_primes().filter(|&p| p != 2) {
        let mut m = seg.first_multiple(p);
        if m % 2 == 0 {
            m += p;
        }
        while m <= hi {
            sieve.clear((m - lo) as usize);
            m += 2 * p;
        }
    }
    if seg.contains_two() {
        sink.push(2)?;
    }
    let mut i = seg.first_odd();
    while i <= hi {
        if sieve.get((i - lo) as usize) {
            sink.push(i as u32)?;
        }
        i += 2;
    }
    Ok(())
}

fn euler(seg: &Segment<'_>) -> Result<Vec<u32>, SieveError> {
    let (lo, hi) = (seg.lo as u64, seg.hi as u64);
    let mut sieve = BitSieve::try_new_all_set(seg.len() as usize)?;
    for p in seg.marking_primes() {
        let mut m = seg.first_multiple(p);
        while m <= hi {
            sieve.clear((m - lo) as usize);
            m += p;
        }
    }
    if lo == 1 {
        sieve.clear(0);
    }
    let mut primes = prime_vec(seg.len())?;
    if seg.contains_two() {
        primes.push(2);
    }
    let mut i = seg.first_odd();
    while i <= hi {
        if sieve.get((i - lo) as usize) {
            primes.push(i as u32);
        }
        i += 2;
    }
    Ok(primes)
}

fn sundaram_into<S: OutputSink + ?Sized>(
    seg: &Segment<'_>,
    sink: &mut S,
) -> Result<(), SieveError> {
    if seg.contains_two() {
        sink.push(2)?;
    }
    // Index j stands for the odd number 2j + 1; index 0 (the number 1) is
    // never part of the window.
    let w_lo = ((seg.lo as u64 - 1).div_ceil(2)).max(1);
    let w_hi = (seg.hi as u64 - 1) / 2;
    if w_lo > w_hi {
        return Ok(());
    }
    let mut sieve = BitSieve::try_new_all_set((w_hi - w_lo + 1) as usize)?;
    for i in 1..=sundaram_height(w_hi) {
        let step = 2 * i + 1;
        let first = 2 * i + 2 * i * i;
        if first > w_hi {
            break;
        }
        let mut j = if first >= w_lo {
            first
        } else {
            first + (w_lo - first).div_ceil(step) * step
        };
        while j <= w_hi {
            sieve.clear((j - w_lo) as usize);
            j += step;
        }
    }
    for idx in sieve.iter_set_bits() {
        sink.push((2 * (w_lo + idx as u64) + 1) as u32)?;
    }
    Ok(())
}

fn incremental(seg: &Segment<'_>) -> Result<Vec<u32>, SieveError> {
    let hi = seg.hi as u64;
    // Seeded pointers sit at max(p², first multiple >= lo), so a pre-sieved
    // prime inside the segment is never marked by itself.
    let mut next: Vec<u64> = seg
        .marking_primes()
        .map(|p| seg.first_multiple(p))
        .collect();
    let seeded = &seg.pre_sieved[..next.len()];
    let last_pre_sieved = seg.pre_sieved.last().map_or(0, |&p| p as u64);
    // Primes found here that are still needed to mark up to hi. Empty whenever
    // the pre-sieve reaches √hi.
    let mut tail: Vec<u32> = Vec::new();
    let mut tail_next: Vec<u64> = Vec::new();

    let mut primes = prime_vec(seg.len())?;
    for i in (seg.lo as u64).max(2)..=hi {
        if advance_multiples(i, seeded, &mut next) && advance_multiples(i, &tail, &mut tail_next) {
            primes.push(i as u32);
            if i > last_pre_sieved && i * i <= hi {
                tail.push(i as u32);
                tail_next.push(i * i);
            }
        }
    }
    Ok(primes)
}

#[cfg(test)]
mod tests {
    //! # Segmented Kernel Tests
    //!
    //! Each segmented kernel is compared with the full-range output restricted
    //! to the same window. Windows are chosen to stress the boundary rules: even
    //! and odd `lo`, `lo = 1`, `lo = 2`, windows that overlap the pre-sieve,
    //! windows starting or ending on a prime square, and two-element windows.

    use super::*;
    use crate::sieve::sieve;

    const SMALL: [u32; 4] = [2, 3, 5, 7];

    fn expected(lo: u32, hi: u32) -> Vec<u32> {
        sieve(hi, Algorithm::Eratosthenes)
            .unwrap()
            .into_iter()
            .filter(|&p| p >= lo)
            .collect()
    }

    fn pre_sieve_for(hi: u32) -> Vec<u32> {
        sieve((hi as u64).isqrt() as u32, Algorithm::Eratosthenes).unwrap()
    }

    // ── Construction ────────────────────────────────────────────────

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        assert!(matches!(
            Segment::new(10, 10, &SMALL),
            Err(SieveError::InvalidRange { lo: 10, hi: 10 })
        ));
        assert!(Segment::new(20, 10, &SMALL).is_err());
        assert!(Segment::new(0, 10, &SMALL).is_err());
    }

    #[test]
    fn rejects_bound_above_domain() {
        assert!(matches!(
            Segment::new(10, u32::MAX, &SMALL),
            Err(SieveError::BoundTooLarge { .. })
        ));
    }

    #[test]
    fn accessors() {
        let seg = Segment::new(50, 100, &SMALL).unwrap();
        assert_eq!((seg.lo(), seg.hi(), seg.len()), (50, 100, 51));
        assert_eq!(seg.pre_sieved(), &SMALL);
        assert!(!seg.is_empty());
    }

    // ── Known Values ────────────────────────────────────────────────

    #[test]
    fn eratosthenes_50_to_100() {
        let seg = Segment::new(50, 100, &SMALL).unwrap();
        assert_eq!(
            sieve_segment(&seg, Algorithm::Eratosthenes).unwrap(),
            vec![53, 59, 61, 67, 71, 73, 79, 83, 89, 97]
        );
    }

    #[test]
    fn every_algorithm_50_to_100() {
        let seg = Segment::new(50, 100, &SMALL).unwrap();
        for a in Algorithm::ALL {
            assert_eq!(sieve_segment(&seg, a).unwrap(), expected(50, 100), "{}", a);
        }
    }

    // ── Boundaries ──────────────────────────────────────────────────

    #[test]
    fn lo_one_never_yields_one() {
        let pre = pre_sieve_for(30);
        let seg = Segment::new(1, 30, &pre).unwrap();
        for a in Algorithm::ALL {
            let primes = sieve_segment(&seg, a).unwrap();
            assert_eq!(primes.first(), Some(&2), "{}", a);
            assert_eq!(primes, expected(1, 30), "{}", a);
        }
    }

    #[test]
    fn tiny_windows_at_the_start() {
        for (lo, hi) in [(1, 2), (1, 3), (2, 3), (2, 4), (3, 4), (4, 5)] {
            let pre = pre_sieve_for(hi);
            let seg = Segment::new(lo, hi, &pre).unwrap();
            for a in Algorithm::ALL {
                assert_eq!(
                    sieve_segment(&seg, a).unwrap(),
                    expected(lo, hi),
                    "{} on [{}, {}]",
                    a,
                    lo,
                    hi
                );
            }
        }
    }

    #[test]
    fn even_and_odd_lower_bounds() {
        let pre = pre_sieve_for(1_000);
        for lo in 900..=920 {
            let seg = Segment::new(lo, 1_000, &pre).unwrap();
            for a in Algorithm::ALL {
                assert_eq!(sieve_segment(&seg, a).unwrap(), expected(lo, 1_000), "{} lo={}", a, lo);
            }
        }
    }

    #[test]
    fn windows_on_prime_squares() {
        let pre = pre_sieve_for(2_000);
        for (lo, hi) in [(121, 169), (120, 121), (169, 170), (961, 1_369), (1_368, 1_370)] {
            let seg = Segment::new(lo, hi, &pre).unwrap();
            for a in Algorithm::ALL {
                assert_eq!(sieve_segment(&seg, a).unwrap(), expected(lo, hi), "{} [{}, {}]", a, lo, hi);
            }
        }
    }

    #[test]
    fn window_overlapping_pre_sieve_keeps_its_primes() {
        // The pre-sieve primes 2..=31 lie inside [2, 1000] and must be reported.
        let pre = pre_sieve_for(1_000);
        let seg = Segment::new(2, 1_000, &pre).unwrap();
        for a in Algorithm::ALL {
            assert_eq!(sieve_segment(&seg, a).unwrap(), expected(2, 1_000), "{}", a);
        }
    }

    #[test]
    fn large_window_near_top_of_domain() {
        let hi = crate::MAX_BOUND;
        let lo = hi - 2_000;
        let pre = pre_sieve_for(hi);
        let seg = Segment::new(lo, hi, &pre).unwrap();
        let reference = sieve_segment(&seg, Algorithm::TrialDivision).unwrap();
        // 2^31 - 1 is a Mersenne prime.
        assert_eq!(reference.last(), Some(&hi));
        for a in Algorithm::ALL {
            assert_eq!(sieve_segment(&seg, a).unwrap(), reference, "{}", a);
        }
    }

    #[test]
    fn incremental_with_short_pre_sieve_extends_its_basis() {
        // Only [2, 3] is supplied for [4, 200]; 5, 7, 11 and 13 are found in
        // the window and must then mark their own multiples.
        let pre = [2u32, 3];
        let seg = Segment::new(4, 200, &pre).unwrap();
        assert_eq!(sieve_segment(&seg, Algorithm::Incremental).unwrap(), expected(4, 200));
    }

    #[test]
    fn incremental_with_full_pre_sieve_matches_reference() {
        let pre = pre_sieve_for(1_000_000);
        let seg = Segment::new(900_001, 1_000_000, &pre).unwrap();
        assert_eq!(
            sieve_segment(&seg, Algorithm::Incremental).unwrap(),
            expected(900_001, 1_000_000)
        );
    }

    // ── Streaming ───────────────────────────────────────────────────

    #[test]
    fn streaming_matches_vector_output() {
        let pre = pre_sieve_for(10_000);
        let seg = Segment::new(5_001, 10_000, &pre).unwrap();
        for a in [Algorithm::Eratosthenes, Algorithm::Sundaram] {
            let mut streamed = Vec::new();
            sieve_segment_into(&seg, a, &mut streamed).unwrap();
            assert_eq!(streamed, sieve_segment(&seg, a).unwrap(), "{}", a);
        }
    }

    #[test]
    fn streaming_rejects_vector_only_algorithms() {
        let seg = Segment::new(50, 100, &SMALL).unwrap();
        let mut sink = Vec::new();
        assert!(matches!(
            sieve_segment_into(&seg, Algorithm::Incremental, &mut sink),
            Err(SieveError::UnsupportedMode { .. })
        ));
    }
}
