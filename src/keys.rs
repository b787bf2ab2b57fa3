//! # Dual Keypair Generation
//!
//! Every Orbit identity carries two independent curve25519-family keypairs:
//! an x25519 pair for key agreement and an ed25519 pair for signatures. They
//! are drawn from separate randomness and concatenated into single 64-byte
//! public and secret encodings, so one wire field carries everything a peer
//! needs to both authenticate us and derive a session secret with us.
//!
//! ## Layout
//!
//! ```text
//! public key (64) = x25519 public (32) || ed25519 public (32)
//! secret key (64) = x25519 secret (32) || ed25519 seed   (32)
//! ```
//!
//! ## Entropy failures are fatal
//!
//! If the OS CSPRNG cannot supply bytes, generation returns
//! [`EntropyError`] and the caller must abort. There is no retry and no
//! fallback generator — an identity minted from weak randomness is worse
//! than no identity, because it looks exactly like a good one.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand_core::CryptoRngCore;
use thiserror::Error;
use x25519_dalek::{PublicKey as AgreementPublic, StaticSecret};

use crate::config::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};

/// The secure random source could not supply the requested bytes.
///
/// Fatal and unrecoverable by design: propagate it and abort identity
/// generation. Never substitute a weaker randomness source.
#[derive(Debug, Error)]
#[error("secure random source could not supply key material: {0}")]
pub struct EntropyError(#[from] rand_core::Error);

/// A combined x25519 + ed25519 keypair backing one Orbit identity.
///
/// `DualKeypair` intentionally does NOT implement `Serialize`/`Deserialize`.
/// Exporting secret material is a deliberate act — go through
/// [`secret_key_bytes`](Self::secret_key_bytes) and own the consequences.
pub struct DualKeypair {
    signing: SigningKey,
    agreement: StaticSecret,
}

impl DualKeypair {
    /// Draw a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Result<Self, EntropyError> {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Draw a fresh keypair from a caller-supplied CSPRNG.
    ///
    /// Consumes exactly 64 bytes of randomness in a fixed order: the
    /// 32-byte ed25519 seed first, then the 32-byte x25519 secret. The
    /// order is part of the reproducibility contract for deterministic
    /// fixtures — changing it changes which identity a given byte stream
    /// produces.
    pub fn generate_with_rng<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self, EntropyError> {
        let mut seed = [0u8; 32];
        rng.try_fill_bytes(&mut seed)?;
        let signing = SigningKey::from_bytes(&seed);

        let mut secret = [0u8; 32];
        rng.try_fill_bytes(&mut secret)?;
        let agreement = StaticSecret::from(secret);

        Ok(Self { signing, agreement })
    }

    /// Reconstruct a keypair from a 64-byte combined secret key.
    ///
    /// Both public halves are re-derived from the secret material, so the
    /// result is internally consistent by construction.
    pub fn from_secret_key_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        let mut agreement_secret = [0u8; 32];
        agreement_secret.copy_from_slice(&bytes[..32]);
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[32..]);
        Self {
            signing: SigningKey::from_bytes(&seed),
            agreement: StaticSecret::from(agreement_secret),
        }
    }

    /// The combined 64-byte public key: x25519 public || ed25519 public.
    ///
    /// This is the input to the memory-hard hash and the value that appears
    /// in canonical identity strings. Safe to share anywhere.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out[..32].copy_from_slice(AgreementPublic::from(&self.agreement).as_bytes());
        out[32..].copy_from_slice(&self.signing.verifying_key().to_bytes());
        out
    }

    /// The combined 64-byte secret key: x25519 secret || ed25519 seed.
    ///
    /// Handle with the care this deserves. Don't log it, don't serialize it
    /// by accident, don't keep copies you don't need.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        let mut out = [0u8; SECRET_KEY_LENGTH];
        out[..32].copy_from_slice(&self.agreement.to_bytes());
        out[32..].copy_from_slice(&self.signing.to_bytes());
        out
    }

    /// Sign a message with the ed25519 half.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing.sign(message)
    }

    /// Verify a signature against this keypair's own ed25519 public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing
            .verifying_key()
            .verify(message, signature)
            .is_ok()
    }

    /// Derive the x25519 shared secret with a peer's key-agreement public
    /// key (the first 32 bytes of their combined public key).
    pub fn shared_secret(&self, peer_agreement_public: &[u8; 32]) -> [u8; 32] {
        self.agreement
            .diffie_hellman(&AgreementPublic::from(*peer_agreement_public))
            .to_bytes()
    }

    /// The ed25519 verifying key, for callers talking to dalek directly.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }
}

impl Clone for DualKeypair {
    fn clone(&self) -> Self {
        Self::from_secret_key_bytes(&self.secret_key_bytes())
    }
}

impl std::fmt::Debug for DualKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret material never reaches Debug output, not even truncated.
        write!(
            f,
            "DualKeypair(pub={})",
            hex::encode(self.public_key_bytes())
        )
    }
}
