//! Random draws used by the synthesizer and generators.

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Uniform draws plus the handful of derived helpers the generators need.
///
/// Implemented for every [`RngCore`], so production code passes
/// `thread_rng()` and tests pass a seeded `StdRng` or a `StepRng`.
pub trait RandomSource {
    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// `count` random bytes, lowercase hex encoded.
    fn hex(&mut self, count: usize) -> String;

    /// Uniform in `[lo, hi)`.
    fn between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.uniform()
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.uniform() < probability
    }

    /// `0x`-prefixed 20 byte address.
    fn address(&mut self) -> String {
        format!("0x{}", self.hex(20))
    }

    /// `0x`-prefixed 32 byte hash.
    fn hash(&mut self) -> String {
        format!("0x{}", self.hex(32))
    }
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn hex(&mut self, count: usize) -> String {
        let mut buf = vec![0u8; count];
        self.fill_bytes(&mut buf);
        hex::encode(buf)
    }
}

/// Where a request's randomness comes from.
pub enum EntropySource {
    /// Thread-local OS-seeded generator; every request differs.
    Os,
    /// One shared generator seeded at startup; output is reproducible for a
    /// given seed and request order.
    Seeded(Mutex<StdRng>),
}

impl EntropySource {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
            None => Self::Os,
        }
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }

    /// Runs `f` with exclusive access to a generator. Do not call across an
    /// `.await`; the seeded variant holds a lock for the duration.
    pub fn with<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match self {
            Self::Os => {
                let mut rng = rand::thread_rng();
                f(&mut rng)
            }
            Self::Seeded(rng) => {
                let mut guard = rng.lock();
                f(&mut *guard)
            }
        }
    }
}
