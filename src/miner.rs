//! # Identity Miner
//!
//! The proof-of-work search loop: draw a fresh dual keypair, hash its public
//! key with the memory-hard digest, and keep the candidate only if the
//! digest clears the difficulty predicate and yields a non-zero address.
//! Everything else about a rejected candidate is discarded — attempts are
//! independent except for consuming fresh randomness.
//!
//! The loop is probabilistic with no inherent upper bound. That is correct
//! behavior at the reference difficulty (expected ~15 attempts, hundreds of
//! milliseconds), and a real availability hazard if the constants were ever
//! wrong — so the miner also accepts an explicit attempt ceiling and a
//! cancellation flag, both checked *between* attempts. A single hash
//! evaluation is treated as atomic and is never interrupted mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::OsRng;
use rand_core::CryptoRngCore;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ADDRESS_OFFSET, HASHCASH_FIRST_BYTE_MAX};
use crate::hash::memory_hard_hash;
use crate::identity::{Address, OrbitIdentity};
use crate::keys::{DualKeypair, EntropyError};

/// Errors from a mining run.
#[derive(Debug, Error)]
pub enum MiningError {
    /// The secure random source failed. Fatal — never retried.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// The caller's cancellation flag was raised between attempts.
    #[error("identity mining cancelled after {attempts} attempts")]
    Cancelled {
        /// Attempts completed before the flag was observed.
        attempts: u64,
    },

    /// The configured attempt ceiling was reached without a qualifying
    /// candidate. Only possible with [`IdentityMiner::max_attempts`] set;
    /// the reference algorithm itself never gives up.
    #[error("no qualifying identity within {attempts} attempts")]
    AttemptsExhausted {
        /// The configured ceiling.
        attempts: u64,
    },
}

/// Configurable proof-of-work search.
///
/// The default configuration matches the reference algorithm exactly:
/// unbounded, uncancellable, OS randomness. The two knobs bound *when the
/// search stops*, never *what qualifies* — difficulty is a fixed constant.
///
/// # Examples
///
/// ```no_run
/// use orbit_identity::IdentityMiner;
///
/// let identity = IdentityMiner::new()
///     .max_attempts(10_000)
///     .mine()
///     .expect("mining failed");
/// println!("{}", identity.public_string());
/// ```
#[derive(Clone, Debug, Default)]
pub struct IdentityMiner {
    max_attempts: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
}

impl IdentityMiner {
    /// A miner with reference semantics: search until success.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop with [`MiningError::AttemptsExhausted`] after `limit` attempts.
    ///
    /// The reference algorithm has no ceiling; this is a documented safety
    /// deviation for callers that would rather fail than hang if the
    /// difficulty constants were ever misconfigured.
    pub fn max_attempts(mut self, limit: u64) -> Self {
        self.max_attempts = Some(limit);
        self
    }

    /// Abort with [`MiningError::Cancelled`] once `flag` is raised.
    ///
    /// The flag is observed between attempts only; a hash evaluation in
    /// flight (tens of milliseconds) always runs to completion.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run the search against the OS CSPRNG.
    pub fn mine(&self) -> Result<OrbitIdentity, MiningError> {
        self.mine_with_rng(&mut OsRng)
    }

    /// Run the search against a caller-supplied CSPRNG.
    ///
    /// With a deterministic generator the entire run is reproducible:
    /// same byte stream, same attempts, same identity.
    pub fn mine_with_rng<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<OrbitIdentity, MiningError> {
        let started = Instant::now();
        let mut attempts: u64 = 0;

        loop {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(MiningError::Cancelled { attempts });
                }
            }
            if let Some(limit) = self.max_attempts {
                if attempts >= limit {
                    return Err(MiningError::AttemptsExhausted { attempts: limit });
                }
            }
            attempts += 1;

            // Generate → Hash → Evaluate. A fresh keypair and a fresh 2 MiB
            // working buffer every attempt; nothing from a rejected
            // candidate may bias the next one.
            let keypair = DualKeypair::generate_with_rng(rng)?;
            let public_key = keypair.public_key_bytes();
            let digest = memory_hard_hash(&public_key);

            if digest[0] >= HASHCASH_FIRST_BYTE_MAX || digest[ADDRESS_OFFSET] == 0xFF {
                trace!(attempt = attempts, "candidate digest missed difficulty");
                continue;
            }

            let address = Address::from_digest(&digest);
            if address.as_u64() == 0 {
                // Qualifying digest, reserved address. Rare but specified.
                trace!(attempt = attempts, "candidate yielded reserved address zero");
                continue;
            }

            debug!(
                attempts,
                elapsed_ms = started.elapsed().as_millis() as u64,
                address = %address,
                "mined identity"
            );
            return Ok(OrbitIdentity::mined(
                address,
                public_key,
                keypair.secret_key_bytes(),
            ));
        }
    }
}

/// Mine a fresh identity: the blocking, unbounded reference operation.
///
/// Runs Generate → Hash → Evaluate until a candidate qualifies, then returns
/// the fully populated identity (address, public key, secret key). Expect
/// hundreds of milliseconds on typical hardware; there is no timeout. Use
/// [`IdentityMiner`] directly if you need a ceiling or cancellation.
pub fn generate_identity() -> Result<OrbitIdentity, MiningError> {
    IdentityMiner::new().mine()
}
