//! # Sieve — Full-Range Prime Enumeration
//!
//! The five kernels that enumerate every prime in `[2, n]`, plus the packed
//! [`BitSieve`] they mark composites in. Output is always ascending, duplicate
//! free and deterministic; `n < 2` yields nothing.
//!
//! ## Algorithm: Trial Division
//!
//! Each odd candidate is divided by the primes found so far, stopping once
//! `p² > i`. O(n √n / ln n) time, O(π(n)) space.
//!
//! ## Algorithm: Sieve of Eratosthenes
//!
//! Odd-only marking: for each surviving odd `i`, clear `i², i² + 2i, …`.
//! Even multiples are never visited because only odd positions are scanned.
//! O(n log log n) time, n bits of space.
//!
//! ## Algorithm: Euler's Linear Sieve
//!
//! For every `i`, clear `i·p` for each known prime `p ≤ spf(i)`; the inner loop
//! stops as soon as `p | i`. Every composite is cleared exactly once, by its
//! smallest prime factor. O(n) time.
//!
//! ## Algorithm: Sieve of Sundaram
//!
//! Works on the reduced index space `k = (n - 1) / 2`, where index `j` stands
//! for the odd number `2j + 1`. Index `j` is composite iff
//! `j = i + j' + 2ij'` for some `1 ≤ i ≤ j'`, i.e. `2j + 1 = (2i + 1)(2j' + 1)`.
//! For fixed `i` those indices start at `2i + 2i²` and step by `2i + 1`.
//!
//! ## Algorithm: Incremental Sieve
//!
//! Keeps a "next multiple" pointer beside every known prime. A candidate `i`
//! advances each pointer for primes `p ≤ √i` to the first multiple `≥ i`; it is
//! prime iff no pointer lands exactly on `i`. New primes start at `i²`.
//! Invariant: after candidate `i` is processed, every consulted pointer is
//! `≥ i`.
//!
//! All products (`i²`, `i·p`, `2i²`) are formed in `u64`, so bounds up to
//! [`MAX_BOUND`](crate::MAX_BOUND) cannot overflow.

use crate::algorithm::Algorithm;
use crate::error::SieveError;
use crate::output::OutputSink;

/// Enumerate all primes in `[2, n]` into an owned vector.
pub fn sieve(n: u32, algorithm: Algorithm) -> Result<Vec<u32>, SieveError> {
    let n = crate::check_bound(n as u64)?;
    match algorithm {
        Algorithm::TrialDivision => trial_division(n),
        Algorithm::Eratosthenes => {
            let mut primes = prime_vec(n as u64)?;
            eratosthenes_into(n, &mut primes)?;
            Ok(primes)
        }
        Algorithm::Euler => euler(n),
        Algorithm::Sundaram => {
            let mut primes = prime_vec(n as u64)?;
            sundaram_into(n, &mut primes)?;
            Ok(primes)
        }
        Algorithm::Incremental => incremental(n),
    }
}

/// Push all primes in `[2, n]` straight into `sink` without collecting them.
///
/// Only algorithms with [`Algorithm::supports_streaming`] are accepted.
pub fn sieve_into<S: OutputSink + ?Sized>(
    n: u32,
    algorithm: Algorithm,
    sink: &mut S,
) -> Result<(), SieveError> {
    let n = crate::check_bound(n as u64)?;
    match algorithm {
        Algorithm::Eratosthenes => eratosthenes_into(n, sink),
        Algorithm::Sundaram => sundaram_into(n, sink),
        other => Err(SieveError::UnsupportedMode { algorithm: other }),
    }
}

fn trial_division(n: u32) -> Result<Vec<u32>, SieveError> {
    let mut primes = prime_vec(n as u64)?;
    if n < 2 {
        return Ok(primes);
    }
    primes.push(2);
    for i in (3..=n).step_by(2) {
        let mut is_prime = true;
        // Skip 2: odd candidates are never even.
        for &p in &primes[1..] {
            if (p as u64) * (p as u64) > i as u64 {
                break;
            }
            if i % p == 0 {
                is_prime = false;
                break;
            }
        }
        if is_prime {
            primes.push(i);
        }
    }
    Ok(primes)
}

fn eratosthenes_into<S: OutputSink + ?Sized>(n: u32, sink: &mut S) -> Result<(), SieveError> {
    if n < 2 {
        return Ok(());
    }
    sink.push(2)?;
    let n = n as u64;
    let mut sieve = BitSieve::try_new_all_set(n as usize + 1)?;
    let mut i = 3u64;
    while i <= n {
        if sieve.get(i as usize) {
            sink.push(i as u32)?;
            let mut j = i * i;
            while j <= n {
                sieve.clear(j as usize);
                j += 2 * i;
            }
        }
        i += 2;
    }
    Ok(())
}

fn euler(n: u32) -> Result<Vec<u32>, SieveError> {
    let mut primes = prime_vec(n as u64)?;
    if n < 2 {
        return Ok(primes);
    }
    let n = n as u64;
    let mut sieve = BitSieve::try_new_all_set(n as usize + 1)?;
    for i in 2..=n {
        if sieve.get(i as usize) {
            primes.push(i as u32);
        }
        for &p in &primes {
            let m = i * p as u64;
            if m > n {
                break;
            }
            sieve.clear(m as usize);
            if i % p as u64 == 0 {
                break;
            }
        }
    }
    Ok(primes)
}

/// Largest Sundaram `i` whose first marked index `2i + 2i²` can still be `≤ k`.
pub(crate) fn sundaram_height(k: u64) -> u64 {
    ((1 + 2 * k).isqrt() - 1) / 2 + 1
}

fn sundaram_into<S: OutputSink + ?Sized>(n: u32, sink: &mut S) -> Result<(), SieveError> {
    if n < 2 {
        return Ok(());
    }
    let k = (n as u64 - 1) / 2;
    let mut sieve = BitSieve::try_new_all_set(k as usize + 1)?;
    // Index 0 stands for 1.
    sieve.clear(0);
    for i in 1..=sundaram_height(k) {
        let step = 2 * i + 1;
        let mut j = 2 * i + 2 * i * i;
        while j <= k {
            sieve.clear(j as usize);
            j += step;
        }
    }
    sink.push(2)?;
    for j in sieve.iter_set_bits() {
        sink.push(2 * j as u32 + 1)?;
    }
    Ok(())
}

fn incremental(n: u32) -> Result<Vec<u32>, SieveError> {
    let mut primes = prime_vec(n as u64)?;
    let mut next: Vec<u64> = Vec::new();
    for i in 2..=n as u64 {
        if advance_multiples(i, &primes, &mut next) {
            primes.push(i as u32);
            // Pointers for primes above √n are never consulted.
            if i * i <= n as u64 {
                next.push(i * i);
            }
        }
    }
    Ok(primes)
}

/// One step of the incremental sieve: move each pointer for `p ≤ √i` up to the
/// first multiple `≥ i`. Returns true when no pointer lands on `i`.
///
/// `primes` must be ascending and `next[k]` must be a multiple of `primes[k]`.
#[inline]
pub(crate) fn advance_multiples(i: u64, primes: &[u32], next: &mut [u64]) -> bool {
    let limit = i.isqrt();
    for (&p, multiple) in primes.iter().zip(next.iter_mut()) {
        let p = p as u64;
        if p > limit {
            break;
        }
        while *multiple < i {
            *multiple += p;
        }
        if *multiple == i {
            return false;
        }
    }
    true
}

/// Allocate a prime list sized for `π(n)`, reporting allocation failure
/// instead of aborting.
pub(crate) fn prime_vec(n: u64) -> Result<Vec<u32>, SieveError> {
    let capacity = estimate_prime_count(n);
    let mut primes = Vec::new();
    primes
        .try_reserve_exact(capacity)
        .map_err(|_| SieveError::Allocation { bits: capacity * 32 })?;
    Ok(primes)
}

/// Estimate prime count up to n using the prime counting function approximation.
pub(crate) fn estimate_prime_count(n: u64) -> usize {
    if n < 10 {
        return 4;
    }
    let nf = n as f64;
    (1.3 * nf / nf.ln()) as usize
}

/// Packed bit array for sieve results.
///
/// 8× memory reduction over `Vec<bool>`: a sieve over the full 31-bit domain
/// needs 256 MiB instead of 2 GiB.
///
/// Bit layout: bit `i` is stored in word `i / 64`, bit position `i % 64`.
/// A set bit (1) means the candidate **survives** the sieve; a clear bit (0)
/// means it was eliminated.
#[derive(Debug)]
pub struct BitSieve {
    words: Vec<u64>,
    len: usize,
}

impl BitSieve {
    /// Create a sieve of `len` bits, all set to 1 (all candidates survive).
    ///
    /// Fails with [`SieveError::Allocation`] if the buffer cannot be reserved.
    pub fn try_new_all_set(len: usize) -> Result<Self, SieveError> {
        let num_words = len.div_ceil(64);
        let mut words = Vec::new();
        words
            .try_reserve_exact(num_words)
            .map_err(|_| SieveError::Allocation { bits: len })?;
        words.resize(num_words, u64::MAX);
        // Clear unused high bits in the last word
        let extra = num_words * 64 - len;
        if extra > 0 {
            words[num_words - 1] >>= extra;
        }
        Ok(BitSieve { words, len })
    }

    /// Number of bits in this sieve.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if sieve has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get bit `index`. Returns `true` if the bit is set (candidate survives).
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "BitSieve index out of bounds: {} >= {}",
            index,
            self.len
        );
        let word = self.words[index / 64];
        word & (1u64 << (index % 64)) != 0
    }

    /// Clear bit `index` to 0 (candidate eliminated).
    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Iterate over the indices of all set bits in ascending order.
    pub fn iter_set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let base = wi * 64;
            BitIter { word, base }
        })
    }
}

/// Iterator over set bits within a single u64 word.
struct BitIter {
    word: u64,
    base: usize,
}

impl Iterator for BitIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1; // clear lowest set bit
        Some(self.base + tz)
    }
}
