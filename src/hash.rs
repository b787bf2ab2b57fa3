//! # Memory-Hard Proof-of-Work Digest
//!
//! The hash that turns a public key into an address candidate. It is built
//! to be *slow in a specific way*: evaluation marches a Salsa20 keystream
//! through a 2 MiB buffer where every 64-byte block depends on the previous
//! one, then shuffles the evolving SHA-512 state against random positions in
//! that buffer. No block can be computed before its predecessor and no pass
//! can be skipped, so an attacker minting addresses in bulk pays the full
//! sequential, memory-bound cost per candidate.
//!
//! ## Compatibility warning
//!
//! This function defines the address space. Every byte of the procedure —
//! the keystream schedule, the big-endian reads, the wrap-around indexing
//! into the 64-byte seed — is load-bearing. A deviation doesn't fail a test
//! somewhere; it silently assigns every node a different address. The golden
//! vectors below are the contract; do not touch this file without them.

use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::{Key, Nonce, Salsa20};
use sha2::{Digest, Sha512};

use crate::config::GEN_MEMORY;

/// Compute the memory-hard digest of a 64-byte combined public key.
///
/// Pure and deterministic: same input, same 64-byte output, on every
/// platform. Costs one fresh 2 MiB allocation, ~32K keystream blocks to
/// fill it, and ~262K more during the mixing pass — around 18 MiB of
/// Salsa20 keystream per call. That cost is the point; do not cache or
/// memoize candidates around it.
pub fn memory_hard_hash(public_key: &[u8; 64]) -> [u8; 64] {
    let mut seed: [u8; 64] = Sha512::digest(public_key).into();

    // One continuous keystream drives both passes: key from the first half
    // of the seed, nonce from the next 8 bytes, block counter starting at 0
    // and advancing once per 64-byte block.
    let mut cipher = Salsa20::new(
        Key::from_slice(&seed[..32]),
        Nonce::from_slice(&seed[32..40]),
    );

    // Pass 1: sequential fill. Block 0 is keystream over zeroes; every
    // later block is keystream over its predecessor, a strict dependency
    // chain with no random access.
    let mut genmem = vec![0u8; GEN_MEMORY];
    cipher.apply_keystream(&mut genmem[..64]);
    let mut off = 64;
    while off < GEN_MEMORY {
        genmem.copy_within(off - 64..off, off);
        cipher.apply_keystream(&mut genmem[off..off + 64]);
        off += 64;
    }

    // Pass 2: mixing. At each 8-byte step, two big-endian words read from
    // the *seed state* (at offsets wrapping within its 64 bytes) pick one
    // seed word and one buffer word to swap, then the whole seed is
    // re-encrypted with the next keystream block. The wrap-around indexing
    // while `i` ranges over the full buffer length is deliberate and must
    // not be "fixed".
    let words = (GEN_MEMORY / 8) as u64;
    let mut i = 0;
    while i < GEN_MEMORY {
        let w1 = read_be_u64(&seed, i % 64);
        let w2 = read_be_u64(&seed, (i + 8) % 64);
        let idx1 = ((w1 & 7) * 8) as usize;
        let idx2 = ((w2 % words) * 8) as usize;
        for k in 0..8 {
            std::mem::swap(&mut seed[idx1 + k], &mut genmem[idx2 + k]);
        }
        cipher.apply_keystream(&mut seed);
        i += 8;
    }

    seed
}

#[inline]
fn read_be_u64(seed: &[u8; 64], offset: usize) -> u64 {
    u64::from_be_bytes(
        seed[offset..offset + 8]
            .try_into()
            .expect("8-byte window within the 64-byte seed"),
    )
}
