//! Chaotic blob storage wrapper for fault injection testing
//!
//! Wraps another backend and injects the two faults the record store has to
//! survive: writes that fail outright, and media corruption that flips bytes
//! in what was persisted. Used by chaos tests to check that the store fails
//! closed and never loses previously recorded votes.

use std::cell::Cell;

use super::{BlobError, BlobStore};

/// Chaotic storage wrapper that randomly fails writes and corrupts records
///
/// Delegates to an underlying store. A failed write never reaches the inner
/// store, matching the atomic-replace contract of real backends. Corruption
/// is applied after a successful write, like bit rot on disk.
pub struct ChaoticStore<S: BlobStore> {
    inner: S,
    /// Write failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// Bytes flipped in every successfully written record
    corrupt_bytes: usize,
    /// RNG state for deterministic chaos
    rng: Cell<ChaoticRng>,
    /// Number of writes attempted
    write_count: Cell<usize>,
}

/// Simple deterministic RNG for chaos injection
///
/// Uses linear congruential generator (LCG) for fast, deterministic randomness.
/// This ensures chaos tests are reproducible with the same seed.
#[derive(Clone, Copy)]
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 32-bit value
    fn next_u32(&mut self) -> u32 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        self.state as u32
    }

    /// Next value in [0.0, 1.0)
    fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / (1u64 << 32) as f64
    }

    /// Next value in [0, bound)
    fn next_below(&mut self, bound: usize) -> usize {
        (self.next_u32() as usize) % bound
    }
}

impl<S: BlobStore> ChaoticStore<S> {
    /// Create a wrapper that fails writes with probability `failure_rate`.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            corrupt_bytes: 0,
            rng: Cell::new(ChaoticRng::new(seed)),
            write_count: Cell::new(0),
        }
    }

    /// Flip `corrupt_bytes` randomly chosen bytes of every written record.
    #[must_use]
    pub fn with_corruption(mut self, corrupt_bytes: usize) -> Self {
        self.corrupt_bytes = corrupt_bytes;
        self
    }

    /// Underlying storage (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of writes attempted.
    pub fn write_count(&self) -> usize {
        self.write_count.get()
    }

    /// Run `f` against the RNG state
    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaoticRng) -> T) -> T {
        let mut rng = self.rng.get();
        let value = f(&mut rng);
        self.rng.set(rng);
        value
    }

    /// Damage `bytes` the way failing media would
    fn corrupt(&self, bytes: &mut [u8]) {
        if bytes.is_empty() {
            return;
        }
        self.with_rng(|rng| {
            for _ in 0..self.corrupt_bytes {
                let index = rng.next_below(bytes.len());
                // Never XOR with zero, or the "corruption" would be a no-op
                let mask = (rng.next_u32() % 255 + 1) as u8;
                bytes[index] ^= mask;
            }
        });
    }
}

impl<S: BlobStore> BlobStore for ChaoticStore<S> {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, BlobError> {
        self.inner.read(name)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), BlobError> {
        self.write_count.set(self.write_count.get() + 1);

        if self.with_rng(|rng| rng.next_unit() < self.failure_rate) {
            return Err(BlobError::Io("chaotic failure injection".to_string()));
        }

        if self.corrupt_bytes == 0 {
            return self.inner.write(name, bytes);
        }

        let mut damaged = bytes.to_vec();
        self.corrupt(&mut damaged);
        self.inner.write(name, &damaged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryStore;

    #[test]
    fn zero_rate_never_fails() {
        let store = ChaoticStore::new(MemoryStore::new(), 0.0);

        for i in 0..100u8 {
            store.write("town", &[i]).unwrap();
        }

        assert_eq!(store.write_count(), 100);
        assert_eq!(store.read("town").unwrap(), Some(vec![99]));
    }

    #[test]
    fn full_rate_always_fails_and_preserves_previous() {
        let inner = MemoryStore::new();
        inner.write("town", b"previous").unwrap();
        let store = ChaoticStore::new(inner.clone(), 1.0);

        assert!(matches!(store.write("town", b"next"), Err(BlobError::Io(_))));
        assert_eq!(inner.read("town").unwrap(), Some(b"previous".to_vec()));
    }

    #[test]
    fn corruption_changes_persisted_bytes() {
        let store = ChaoticStore::new(MemoryStore::new(), 0.0).with_corruption(3);
        let original = vec![0u8; 64];

        store.write("town", &original).unwrap();

        let stored = store.inner().read("town").unwrap().unwrap();
        let flipped = stored.iter().zip(&original).filter(|(a, b)| a != b).count();
        assert!((1..=3).contains(&flipped));
    }

    #[test]
    fn same_seed_same_chaos() {
        let a = ChaoticStore::with_seed(MemoryStore::new(), 0.5, 42);
        let b = ChaoticStore::with_seed(MemoryStore::new(), 0.5, 42);

        let outcomes_a: Vec<_> = (0..50).map(|_| a.write("x", b"y").is_ok()).collect();
        let outcomes_b: Vec<_> = (0..50).map(|_| b.write("x", b"y").is_ok()).collect();

        assert_eq!(outcomes_a, outcomes_b);
    }
}
