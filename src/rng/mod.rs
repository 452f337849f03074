//! Random number generation for stop selection
//!
//! Two generators live behind the [`StopSource`] seam:
//!
//! - [`CyclingRng`]: the production source. Every draw is a fresh sample
//!   from the operating system's secure RNG. A background task cycles the
//!   generator at a fixed rate to satisfy jurisdictions that require the
//!   RNG to run continuously; the cycled value is observable but never
//!   served to a draw, so a spin cannot be predicted from the cycle
//!   cadence and never blocks on it. The task supports graceful,
//!   join-able cancellation, and the chi-square self-test suspends it for
//!   the test's duration and always resumes it.
//! - [`DeterministicRng`]: a ChaCha20 generator that produces identical
//!   sequences from the same seed, used for simulation and certification
//!   runs that must be reproducible.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::{Error as RandError, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default background cycling rate, samples per second.
pub const DEFAULT_CYCLE_HZ: u32 = 100;
/// Default chi-square sample count.
pub const DEFAULT_CHI_SQUARE_SAMPLES: usize = 1_000_000;
/// Default chi-square bucket count.
pub const DEFAULT_CHI_SQUARE_BUCKETS: usize = 1_000;

/// Source of uniformly-distributed stop indices.
pub trait StopSource {
    /// A uniform integer in `[low, high)`. Returns `low` when the range is
    /// empty.
    fn draw_uniform_int(&mut self, low: u64, high: u64) -> u64;

    /// A uniformly-chosen element of `items`, or `None` if it is empty.
    fn draw_choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            None
        } else {
            items.get(self.draw_uniform_int(0, items.len() as u64) as usize)
        }
    }
}

/// Uniform draw from the OS secure RNG, rejection-sampled to avoid modulo
/// bias.
fn secure_uniform(low: u64, high: u64) -> u64 {
    if low >= high {
        return low;
    }
    let range = high - low;
    let mut value = OsRng.next_u64();
    let threshold = u64::MAX - (u64::MAX % range);
    while value >= threshold {
        value = OsRng.next_u64();
    }
    low + (value % range)
}

/// Uniform f64 in `[0, 1)` from the OS secure RNG.
fn secure_unit() -> f64 {
    (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Continuously-cycling secure RNG for regulated stop selection.
pub struct CyclingRng {
    hz: u32,
    cycling: Arc<AtomicBool>,
    latest: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl CyclingRng {
    pub fn new(hz: u32) -> Self {
        Self {
            hz: hz.max(1),
            cycling: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    /// Start the background cycling task. Must be called within a tokio
    /// runtime. A second call while cycling is a no-op.
    pub fn start_cycle(&mut self) {
        if self.task.is_some() {
            return;
        }
        self.cycling.store(true, Ordering::SeqCst);
        let cycling = Arc::clone(&self.cycling);
        let latest = Arc::clone(&self.latest);
        let period = Duration::from_secs_f64(1.0 / self.hz as f64);
        self.task = Some(tokio::spawn(async move {
            while cycling.load(Ordering::SeqCst) {
                latest.store(OsRng.next_u64(), Ordering::SeqCst);
                tokio::time::sleep(period).await;
            }
        }));
        info!(hz = self.hz, "rng cycling started");
    }

    /// Stop the background cycling task and wait for it to finish.
    pub async fn stop_cycle(&mut self) {
        self.cycling.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("rng cycling stopped");
    }

    pub fn is_cycling(&self) -> bool {
        self.task.is_some()
    }

    /// The most recent background sample. Observability only: draws never
    /// read this value.
    pub fn latest_sample(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Pearson's chi-square goodness-of-fit statistic over `samples` fresh
    /// draws categorized into `buckets` evenly-spaced ranges. Compare
    /// against a chi-square table at `buckets - 1` degrees of freedom; the
    /// 95%-confidence critical value at the default 1000 buckets is about
    /// 1074.
    ///
    /// Cycling is suspended while the test runs and resumed afterwards.
    pub async fn chi_square(&mut self, samples: usize, buckets: usize) -> f64 {
        let was_cycling = self.is_cycling();
        if was_cycling {
            self.stop_cycle().await;
        }

        let buckets = buckets.max(1);
        let mut observed = vec![0u64; buckets];
        for _ in 0..samples {
            let unit = secure_unit();
            let mut index = (unit * buckets as f64) as usize;
            if index >= buckets {
                index = buckets - 1;
            }
            observed[index] += 1;
        }
        let expected = samples as f64 / buckets as f64;
        let statistic = observed
            .iter()
            .map(|&count| {
                let delta = count as f64 - expected;
                delta * delta / expected
            })
            .sum();
        debug!(samples, buckets, statistic, "chi-square self-test");

        if was_cycling {
            self.start_cycle();
        }
        statistic
    }
}

impl Default for CyclingRng {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_HZ)
    }
}

impl Drop for CyclingRng {
    fn drop(&mut self) {
        self.cycling.store(false, Ordering::SeqCst);
    }
}

impl StopSource for CyclingRng {
    fn draw_uniform_int(&mut self, low: u64, high: u64) -> u64 {
        secure_uniform(low, high)
    }
}

/// Deterministic random number generator for reproducible runs
///
/// Uses the ChaCha20 algorithm to ensure cryptographic quality while
/// maintaining determinism across platforms.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    seed: [u8; 32],
    inner: ChaCha20Rng,
}

impl DeterministicRng {
    /// Create a new deterministic RNG from a seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            seed,
            inner: ChaCha20Rng::from_seed(seed),
        }
    }

    /// Create from a context label, e.g. a certification run identifier
    pub fn from_label(label: &str) -> Self {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&hash);

        Self::from_seed(seed)
    }

    pub fn seed(&self) -> [u8; 32] {
        self.seed
    }

    /// Generate a random value in range [min, max)
    pub fn gen_range(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }

        let range = max - min;
        let mut value = self.inner.next_u64();

        // Avoid modulo bias
        let threshold = u64::MAX - (u64::MAX % range);
        while value >= threshold {
            value = self.inner.next_u64();
        }

        min + (value % range)
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        self.inner.try_fill_bytes(dest)
    }
}

impl StopSource for DeterministicRng {
    fn draw_uniform_int(&mut self, low: u64, high: u64) -> u64 {
        self.gen_range(low, high)
    }
}
