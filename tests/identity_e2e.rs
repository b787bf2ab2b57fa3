//! End-to-end integration tests for Orbit identity mining.
//!
//! These tests exercise the full pipeline: keypair generation, the
//! memory-hard digest, the proof-of-work search, canonical string
//! interchange, revalidation of parsed identities, and serde encodings.
//! The mined-identity constants were produced by an independent
//! implementation of the same procedure driven by the same deterministic
//! byte stream, so a pass here pins the exact address space, not just
//! internal self-consistency.
//!
//! Each test stands alone. No shared state, no test ordering dependencies.

use std::str::FromStr;

use sha2::{Digest, Sha512};

use orbit_identity::config::{ADDRESS_OFFSET, HASHCASH_FIRST_BYTE_MAX};
use orbit_identity::hash::memory_hard_hash;
use orbit_identity::{IdentityMiner, MiningError, OrbitIdentity};

// ---------------------------------------------------------------------------
// Deterministic entropy
// ---------------------------------------------------------------------------

/// A SHA-512 chain used as a reproducible CSPRNG stand-in: each draw
/// advances `state = SHA-512(state)` and hands out a prefix. The identity a
/// given label produces is a fixed constant of this scheme plus the miner's
/// documented draw order.
struct ChainRng {
    state: [u8; 64],
}

impl ChainRng {
    fn new(label: &[u8]) -> Self {
        Self {
            state: Sha512::digest(label).into(),
        }
    }
}

impl rand_core::RngCore for ChainRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.state = Sha512::digest(self.state).into();
        dest.copy_from_slice(&self.state[..dest.len()]);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl rand_core::CryptoRng for ChainRng {}

// ---------------------------------------------------------------------------
// Golden constants
// ---------------------------------------------------------------------------

// Label whose first candidate already clears the difficulty predicate.
const FIRST_LABEL: &[u8] = b"orbit-fixture-6";
const FIRST_ADDRESS: &str = "14dd193860";
const FIRST_PUBLIC: &str = "a0586dfb21ae14be9c06055a88a5168235f031dcfb6d108202a05d50c600760337374137992c5afa0a779dc51ef60306040a589fc256fe689fdea80fa0b4f038";
const FIRST_SECRET: &str = "10a060100e8c71ccff1f8084728352a3941dec2eeaee6bb164b90c391a35ee331f7fa7a445325ea081b7262bef80525618218bd008298e52c93d0d40e31fa0a9";

// Label that rejects 34 candidates before qualifying on attempt 35.
const RETRY_LABEL: &[u8] = b"orbit-fixture-0";
const RETRY_ATTEMPTS: u64 = 35;
const RETRY_ADDRESS: &str = "f10ed51a15";
const RETRY_PUBLIC: &str = "5c3dc24fa0729f5d19cf3ad6f03d224d44ea1e6d9259244928691bc275fe503d180c6041fbbe9dd7a9acec7a80ee6f8b23273f5c6c82ae56f6cd69e2dc676a53";

fn mine_fixture(label: &[u8]) -> OrbitIdentity {
    let mut rng = ChainRng::new(label);
    IdentityMiner::new()
        .mine_with_rng(&mut rng)
        .expect("fixture labels are known to qualify")
}

// ---------------------------------------------------------------------------
// 1. Golden Mined Identities
// ---------------------------------------------------------------------------

#[test]
fn golden_identity_first_attempt() {
    let identity = mine_fixture(FIRST_LABEL);

    assert_eq!(identity.address_string(), FIRST_ADDRESS);
    assert_eq!(hex::encode(identity.public_key_bytes()), FIRST_PUBLIC);
    assert_eq!(
        hex::encode(identity.secret_key_bytes().expect("mined identities hold the secret")),
        FIRST_SECRET
    );

    assert_eq!(
        identity.public_string(),
        format!("{FIRST_ADDRESS}:0:{FIRST_PUBLIC}")
    );
    assert_eq!(
        identity.secret_string().as_deref(),
        Some(format!("{FIRST_ADDRESS}:0:{FIRST_PUBLIC}:{FIRST_SECRET}").as_str())
    );
}

#[test]
fn golden_identity_after_rejected_candidates() {
    // The first 34 candidates from this byte stream miss the difficulty
    // predicate; the identity below only comes out if every rejection
    // consumed its randomness and nothing else.
    let identity = mine_fixture(RETRY_LABEL);

    assert_eq!(identity.address_string(), RETRY_ADDRESS);
    assert_eq!(hex::encode(identity.public_key_bytes()), RETRY_PUBLIC);
}

#[test]
fn attempt_ceiling_brackets_the_retry_fixture() {
    // One attempt short: exhausted. Exactly enough: success. Together these
    // pin the miner's attempt accounting against the reference stream.
    let mut rng = ChainRng::new(RETRY_LABEL);
    let err = IdentityMiner::new()
        .max_attempts(RETRY_ATTEMPTS - 1)
        .mine_with_rng(&mut rng)
        .expect_err("ceiling below the known attempt count must exhaust");
    assert!(matches!(err, MiningError::AttemptsExhausted { .. }));

    let mut rng = ChainRng::new(RETRY_LABEL);
    let identity = IdentityMiner::new()
        .max_attempts(RETRY_ATTEMPTS)
        .mine_with_rng(&mut rng)
        .expect("ceiling at the known attempt count must succeed");
    assert_eq!(identity.address_string(), RETRY_ADDRESS);
}

// ---------------------------------------------------------------------------
// 2. Proof-of-Work Properties
// ---------------------------------------------------------------------------

#[test]
fn mined_digest_satisfies_difficulty_and_address_binding() {
    let identity = mine_fixture(FIRST_LABEL);
    let digest = memory_hard_hash(identity.public_key_bytes());

    assert!(digest[0] < HASHCASH_FIRST_BYTE_MAX);
    assert_ne!(digest[ADDRESS_OFFSET], 0xFF);

    let mut bound = 0u64;
    for &byte in &digest[ADDRESS_OFFSET..] {
        bound = (bound << 8) | u64::from(byte);
    }
    assert_eq!(bound, identity.address().as_u64());
    assert_ne!(bound, 0);
}

#[test]
fn mined_identity_validates() {
    let identity = mine_fixture(FIRST_LABEL);
    assert!(identity.validate());
}

#[test]
fn distinct_entropy_yields_distinct_identities() {
    let a = mine_fixture(FIRST_LABEL);
    let b = mine_fixture(RETRY_LABEL);
    assert_ne!(a, b);
    assert_ne!(a.address(), b.address());
    assert_ne!(a.public_key_bytes(), b.public_key_bytes());
}

// ---------------------------------------------------------------------------
// 3. String Interchange
// ---------------------------------------------------------------------------

#[test]
fn public_string_roundtrip_revalidates() {
    let minted = mine_fixture(FIRST_LABEL);

    let parsed = OrbitIdentity::from_str(&minted.public_string()).expect("canonical string");
    assert_eq!(parsed, minted);
    assert!(!parsed.has_secret_key());
    assert_eq!(parsed.secret_string(), None);

    // A peer receiving the string can re-prove the work from scratch.
    assert!(parsed.validate());
}

#[test]
fn secret_string_roundtrip_restores_working_keypair() {
    let minted = mine_fixture(FIRST_LABEL);
    let secret = minted.secret_string().expect("mined identity holds secret");

    let restored = OrbitIdentity::from_str(&secret).expect("canonical string");
    assert_eq!(restored, minted);
    assert_eq!(restored.secret_key_bytes(), minted.secret_key_bytes());
    assert!(restored.validate());

    // The restored keypair signs; the original copy verifies.
    let keypair = restored.keypair().expect("secret held");
    let original = minted.keypair().expect("secret held");
    let message = b"orbit hello frame";
    let signature = keypair.sign(message);
    assert!(original.verify(message, &signature));
}

#[test]
fn key_agreement_between_two_mined_identities() {
    let alice = mine_fixture(FIRST_LABEL);
    let bob = mine_fixture(RETRY_LABEL);

    let alice_kp = alice.keypair().expect("secret held");
    let bob_kp = bob.keypair().expect("secret held");

    let mut alice_agreement = [0u8; 32];
    alice_agreement.copy_from_slice(&alice.public_key_bytes()[..32]);
    let mut bob_agreement = [0u8; 32];
    bob_agreement.copy_from_slice(&bob.public_key_bytes()[..32]);

    assert_eq!(
        alice_kp.shared_secret(&bob_agreement),
        bob_kp.shared_secret(&alice_agreement)
    );
}

#[test]
fn tampered_strings_parse_but_fail_validation() {
    // Wrong address for a real public key: shape-valid, proof-invalid.
    let wrong_address = format!("24dd193860:0:{FIRST_PUBLIC}");
    let parsed = OrbitIdentity::from_str(&wrong_address).expect("shape is canonical");
    assert!(!parsed.validate());

    // One corrupted public-key nibble: the digest no longer matches, and
    // almost surely no longer qualifies at all.
    let mut corrupted = FIRST_PUBLIC.to_string();
    corrupted.replace_range(0..1, "b");
    let parsed = OrbitIdentity::from_str(&format!("{FIRST_ADDRESS}:0:{corrupted}"))
        .expect("shape is canonical");
    assert!(!parsed.validate());

    // Secret key belonging to a different identity: address and public key
    // still check out, the secret consistency check does not.
    let foreign_secret = format!("{FIRST_ADDRESS}:0:{FIRST_PUBLIC}:{}", "ab".repeat(64));
    let parsed = OrbitIdentity::from_str(&foreign_secret).expect("shape is canonical");
    assert!(!parsed.validate());
}

// ---------------------------------------------------------------------------
// 4. Serde Interchange
// ---------------------------------------------------------------------------

#[test]
fn json_carries_the_canonical_public_string() {
    let minted = mine_fixture(FIRST_LABEL);

    let json = serde_json::to_string(&minted).expect("serialize");
    assert_eq!(json, format!("\"{FIRST_ADDRESS}:0:{FIRST_PUBLIC}\""));

    let parsed: OrbitIdentity = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, minted);
    assert!(!parsed.has_secret_key(), "serde must never move the secret");
    assert!(parsed.validate());
}

#[test]
fn binary_encoding_roundtrip() {
    let minted = mine_fixture(FIRST_LABEL);

    let raw = bincode::serialize(&minted).expect("serialize");
    let parsed: OrbitIdentity = bincode::deserialize(&raw).expect("deserialize");
    assert_eq!(parsed, minted);
    assert!(!parsed.has_secret_key());
    assert!(
        !raw.windows(32).any(|w| w == &minted.secret_key_bytes().unwrap()[..32]),
        "binary encoding must not contain secret material"
    );
}

// ---------------------------------------------------------------------------
// 5. Live Mining Against OS Randomness
// ---------------------------------------------------------------------------

#[test]
fn live_mining_produces_a_valid_identity() {
    // Probabilistic runtime (expected ~15 attempts); the generous ceiling
    // exists so a broken predicate fails loudly instead of hanging CI.
    let identity = IdentityMiner::new()
        .max_attempts(10_000)
        .mine()
        .expect("mining at reference difficulty");

    assert!(identity.has_secret_key());
    assert!(identity.validate());
    assert_ne!(identity.address().as_u64(), 0);
    assert!(identity.address().as_u64() <= 0xFF_FFFF_FFFF);

    // Full interchange loop on a freshly mined identity.
    let reparsed: OrbitIdentity = identity
        .secret_string()
        .expect("secret held")
        .parse()
        .expect("own output must parse");
    assert_eq!(reparsed, identity);
    assert!(reparsed.validate());
}
