//! This module contains the configuration options of the crate. They impact
//! performance only; no setting changes what verifies and what does not. The
//! default configuration is sane and should provide good performance for most
//! users.
//!
//! Every configuration option can also be set via an environment variable.
//! The environment variables take precedence over the options set in this
//! module.

use std::cell::RefCell;

use arbitrary::Arbitrary;

thread_local! {
    static CONFIG: RefCell<Config> = RefCell::new(Config::new());
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
struct Config {
    pub batch_verification_parallelization_cutoff: BatchVerificationParallelizationCutoff,
}

impl Config {
    fn new() -> Self {
        let batch_verification_parallelization_cutoff =
            BatchVerificationParallelizationCutoff::new(None);

        Self {
            batch_verification_parallelization_cutoff,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
struct BatchVerificationParallelizationCutoff(usize);

impl BatchVerificationParallelizationCutoff {
    const ENV_VAR: &'static str = "MMRIVER_BATCH_VERIFICATION_PARALLELIZATION_CUTOFF";
    const DEFAULT: usize = 64;
    const MINIMUM: usize = 2;

    /// Creates a new `BatchVerificationParallelizationCutoff` with the given
    /// value. Respects the precedence of the environment variable if set. Uses
    /// the default if no value is provided.
    fn new(config_value: Option<usize>) -> Self {
        let cutoff = std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .or(config_value)
            .unwrap_or(Self::DEFAULT)
            .max(Self::MINIMUM);

        Self(cutoff)
    }
}

/// Sets the cutoff for verifying batches of inclusion proofs in parallel.
///
/// For example, if the cutoff is set to 64, then a batch of fewer than 64
/// proofs is verified sequentially on the calling thread. Batches of 64 or
/// more proofs are distributed over rayon's global thread pool.
///
/// Can also be set via the environment variable
/// `MMRIVER_BATCH_VERIFICATION_PARALLELIZATION_CUTOFF`. The environment
/// variable has higher precedence than this function.
///
/// The default is 64. The minimum is always 2.
pub fn set_batch_verification_parallelization_cutoff(cutoff: usize) {
    let cutoff = BatchVerificationParallelizationCutoff::new(Some(cutoff));
    CONFIG.with(|c| c.borrow_mut().batch_verification_parallelization_cutoff = cutoff);
}

pub(crate) fn batch_verification_parallelization_cutoff() -> usize {
    CONFIG
        .with(|c| c.borrow().batch_verification_parallelization_cutoff)
        .0
}
