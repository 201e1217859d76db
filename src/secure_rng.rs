//! Seedable, cryptographically secure random number generation.
//!
//! Every randomized operation in this crate (oversampling, train/test
//! splitting, demo data generation) takes an explicit `&mut SecureRng`.
//! There is no process-wide generator: reproducibility is controlled per
//! call by constructing the generator with [`SecureRng::with_seed`].

use crate::errors::{ForensicError, ForensicResult};
use rand::distributions::Distribution;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of retained audit entries.
const MAX_AUDIT_ENTRIES: usize = 10_000;

/// Secure RNG wrapper for forensic workloads.
///
/// Uses the ChaCha20 stream cipher as a CSPRNG. Two instances built with
/// the same seed yield bit-identical streams on every platform, which is
/// what the oversampler's determinism contract relies on.
#[derive(Clone)]
pub struct SecureRng {
    rng: ChaCha20Rng,
    seed: Option<u64>,
    /// Audit trail of drawn values (shared between clones)
    audit_log: Arc<Mutex<VecDeque<RngAuditEntry>>>,
    enable_audit: bool,
    next_operation_id: u64,
}

/// Audit entry for RNG operations
#[derive(Debug, Clone, PartialEq)]
pub struct RngAuditEntry {
    /// Sequential operation ID within this generator
    pub operation_id: u64,
    /// Timestamp of operation (nanoseconds since UNIX epoch)
    pub timestamp: u128,
    /// Type of operation
    pub operation: String,
    /// Number of random values generated
    pub count: usize,
    /// Seed used (if deterministic)
    pub seed: Option<u64>,
}

impl std::fmt::Debug for SecureRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureRng")
            .field("seed", &self.seed)
            .field("enable_audit", &self.enable_audit)
            .finish()
    }
}

impl SecureRng {
    /// Create a new secure RNG with entropy from the OS.
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
            seed: None,
            audit_log: Arc::new(Mutex::new(VecDeque::new())),
            enable_audit: false,
            next_operation_id: 0,
        }
    }

    /// Create a new secure RNG with a specific seed for reproducibility.
    ///
    /// The u64 is expanded to the full 256-bit ChaCha key by `seed_from_u64`.
    pub fn with_seed(seed: u64) -> Self {
        let mut instance = Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed: Some(seed),
            audit_log: Arc::new(Mutex::new(VecDeque::new())),
            enable_audit: false,
            next_operation_id: 0,
        };
        instance.log_operation_internal("init_with_seed", 0, true);
        instance
    }

    /// Seed this generator was built from, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Enable audit logging of every draw.
    pub fn enable_audit(&mut self) {
        self.enable_audit = true;
    }

    /// Generate a random f64 in [0, 1).
    pub fn f64(&mut self) -> f64 {
        self.log_operation("f64", 1);
        self.rng.gen::<f64>()
    }

    /// Generate a random usize in the given half-open range.
    ///
    /// The range must be non-empty.
    pub fn usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.log_operation("usize", 1);
        self.rng.gen_range(range)
    }

    /// Draw one value from a distribution.
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        self.log_operation("sample", 1);
        distribution.sample(&mut self.rng)
    }

    /// Draw `count` values from a distribution.
    pub fn sample_n<T, D: Distribution<T>>(&mut self, distribution: &D, count: usize) -> Vec<T> {
        self.log_operation("sample_n", count);
        (0..count).map(|_| distribution.sample(&mut self.rng)).collect()
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        self.log_operation("shuffle", values.len());
        values.shuffle(&mut self.rng);
    }

    fn log_operation(&mut self, operation: &str, count: usize) {
        self.log_operation_internal(operation, count, false);
    }

    fn log_operation_internal(&mut self, operation: &str, count: usize, force: bool) {
        if !self.enable_audit && !force {
            return;
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let operation_id = self.next_operation_id;
        self.next_operation_id += 1;

        let Ok(mut log) = self.audit_log.lock() else {
            log::warn!("RNG audit log mutex poisoned; dropping entry for {}", operation);
            return;
        };

        log.push_back(RngAuditEntry {
            operation_id,
            timestamp,
            operation: operation.to_string(),
            count,
            seed: self.seed,
        });

        while log.len() > MAX_AUDIT_ENTRIES {
            log.pop_front();
        }
    }

    /// Get a copy of the audit log.
    pub fn get_audit_log(&self) -> ForensicResult<Vec<RngAuditEntry>> {
        self.audit_log
            .lock()
            .map(|log| log.iter().cloned().collect())
            .map_err(|_| ForensicError::NumericalError {
                reason: "RNG audit log is unavailable (poisoned lock)".to_string(),
            })
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}
