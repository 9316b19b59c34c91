//! Property-based tests for the sieve kernels, the segmented kernels and the
//! range partitioner.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//!
//! # Increase case count for thorough testing (default is 256):
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```
//!
//! # Testing strategy
//!
//! - **Kernels**: every algorithm agrees with an independent reference sieve.
//! - **Segments**: splitting `[√n + 1, n]` into any k = 1..8 segments and
//!   concatenating the pre-sieve with each segment's output reproduces the
//!   full-range output, for every algorithm.
//! - **Partition**: plans tile the span exactly with non-degenerate ranges.
//! - **Coordinator**: the parallel run equals the single-threaded run.
//!
//! Each property is named `prop_<subject>_<invariant>`.

mod common;

use findprimes::{
    run, sieve, sieve_segment, sieve_segment_into, Algorithm, PartitionPlan, Segment,
};
use proptest::prelude::*;

fn any_algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}

fn streaming_algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(vec![Algorithm::Eratosthenes, Algorithm::Sundaram])
}

// == Kernel Properties =========================================================

proptest! {
    /// Every full-range kernel returns exactly the primes in [2, n].
    #[test]
    fn prop_sieve_matches_reference(n in 0u32..20_000, alg in any_algorithm()) {
        prop_assert_eq!(sieve(n, alg).unwrap(), common::reference_primes(n));
    }

    /// Output is strictly ascending.
    #[test]
    fn prop_sieve_strictly_ascending(n in 0u32..20_000, alg in any_algorithm()) {
        let primes = sieve(n, alg).unwrap();
        prop_assert!(primes.windows(2).all(|w| w[0] < w[1]));
    }
}

// == Segment Properties ========================================================

proptest! {
    /// Pre-sieve plus k segments reproduces the full range.
    #[test]
    fn prop_segments_concatenate_to_full_range(
        n in 4u32..30_000,
        k in 1u64..=8,
        alg in any_algorithm(),
    ) {
        let sqrt_n = (n as u64).isqrt();
        let span = n as u64 - sqrt_n;
        prop_assume!(span / k >= 2);
        let pre = sieve(sqrt_n as u32, alg).unwrap();
        let per = span / k;

        let mut joined = pre.clone();
        for i in 0..k {
            let lo = (sqrt_n + i * per + 1) as u32;
            let hi = if i == k - 1 { n } else { (sqrt_n + (i + 1) * per) as u32 };
            let seg = Segment::new(lo, hi, &pre).unwrap();
            joined.extend(sieve_segment(&seg, alg).unwrap());
        }
        prop_assert_eq!(joined, sieve(n, alg).unwrap());
    }

    /// Any window [lo, hi] yields exactly the primes it contains.
    #[test]
    fn prop_segment_window_matches_reference(
        lo in 1u32..50_000,
        width in 1u32..5_000,
        alg in any_algorithm(),
    ) {
        let hi = lo + width;
        let pre = sieve((hi as u64).isqrt() as u32, alg).unwrap();
        let seg = Segment::new(lo, hi, &pre).unwrap();
        let expected: Vec<u32> = common::reference_primes(hi)
            .into_iter()
            .filter(|&p| p >= lo)
            .collect();
        prop_assert_eq!(sieve_segment(&seg, alg).unwrap(), expected);
    }

    /// Streaming and vector segmented kernels agree.
    #[test]
    fn prop_segment_streaming_matches_vector(
        lo in 1u32..50_000,
        width in 1u32..5_000,
        alg in streaming_algorithm(),
    ) {
        let hi = lo + width;
        let pre = sieve((hi as u64).isqrt() as u32, alg).unwrap();
        let seg = Segment::new(lo, hi, &pre).unwrap();
        let mut streamed = Vec::new();
        sieve_segment_into(&seg, alg, &mut streamed).unwrap();
        prop_assert_eq!(streamed, sieve_segment(&seg, alg).unwrap());
    }
}

// == Partition and Coordinator Properties ======================================

proptest! {
    /// Ranges are contiguous, non-degenerate and end at n.
    #[test]
    fn prop_partition_tiles_span(n in 0u32..10_000_000, threads in 1usize..=64) {
        let plan = PartitionPlan::new(n, threads).unwrap();
        prop_assert!(plan.len() <= threads);
        let mut next = plan.pre_sieve_bound() as u64 + 1;
        for r in plan.ranges() {
            prop_assert!(r.lo < r.hi);
            prop_assert_eq!(r.lo as u64, next);
            next = r.hi as u64 + 1;
        }
        prop_assert_eq!(next, n as u64 + 1);
    }

    /// Thread count never changes the result.
    #[test]
    fn prop_parallel_matches_single_thread(
        n in 0u32..50_000,
        threads in 2usize..=8,
        alg in any_algorithm(),
    ) {
        prop_assert_eq!(run(n, alg, threads).unwrap(), run(n, alg, 1).unwrap());
    }
}

// == Fixed Large Case ==========================================================
// One full comparison at n = 10^6 per algorithm, sequential and parallel.
// ==============================================================================

#[test]
fn every_algorithm_matches_reference_to_one_million() {
    let expected = common::reference_primes(1_000_000);
    assert_eq!(expected.len(), 78_498);
    for alg in Algorithm::ALL {
        assert_eq!(sieve(1_000_000, alg).unwrap(), expected, "{}", alg);
        for threads in [2, 3, 8] {
            assert_eq!(
                run(1_000_000, alg, threads).unwrap(),
                expected,
                "{} on {} threads",
                alg,
                threads
            );
        }
    }
}
