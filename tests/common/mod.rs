//! Shared helpers for integration tests.
//!
//! The reference sieve is deliberately the plainest possible implementation
//! (a `Vec<bool>` Eratosthenes) so it shares no code with the kernels under
//! test.

#![allow(dead_code)]

/// All primes in `[2, n]`.
pub fn reference_primes(n: u32) -> Vec<u32> {
    let n = n as usize;
    if n < 2 {
        return Vec::new();
    }
    let mut is_prime = vec![true; n + 1];
    is_prime[0] = false;
    is_prime[1] = false;
    let mut i = 2;
    while i * i <= n {
        if is_prime[i] {
            let mut j = i * i;
            while j <= n {
                is_prime[j] = false;
                j += i;
            }
        }
        i += 1;
    }
    (2..=n).filter(|&k| is_prime[k]).map(|k| k as u32).collect()
}

/// Render primes the way the binary writes them.
pub fn rendered(primes: &[u32]) -> String {
    primes.iter().map(|p| format!("{} ", p)).collect()
}
