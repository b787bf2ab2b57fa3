//! # Algorithm Constants
//!
//! Every magic number in orbit-identity lives here. These values are the
//! identity format itself: two nodes disagreeing on any of them derive
//! different addresses from the same keys and can never recognize each
//! other. They are compile-time constants on purpose — there is no knob to
//! turn, no config file to misread, no runtime difficulty parameter.

/// Size in bytes of the working buffer filled during the memory-hard hash.
/// 2 MiB, touched sequentially twice per candidate. This is what makes bulk
/// identity generation expensive on GPUs and ASICs: the buffer fill is a
/// strict dependency chain, so the work cannot be parallelized away.
pub const GEN_MEMORY: usize = 2_097_152;

/// A candidate digest qualifies only if its first byte is strictly below
/// this threshold. 17/256 ≈ 6.6% of candidates pass, putting expected
/// mining time in the hundreds of milliseconds on typical hardware.
pub const HASHCASH_FIRST_BYTE_MAX: u8 = 17;

/// Byte offset within the 64-byte digest where the address begins.
/// The digest byte at this offset must additionally differ from 0xFF for
/// the candidate to qualify.
pub const ADDRESS_OFFSET: usize = 59;

/// Number of digest bytes forming the address: a big-endian 40-bit value
/// from `digest[ADDRESS_OFFSET..ADDRESS_OFFSET + ADDRESS_LENGTH]`.
pub const ADDRESS_LENGTH: usize = 5;

/// Combined public key length: x25519 public (32) || ed25519 public (32).
pub const PUBLIC_KEY_LENGTH: usize = 64;

/// Combined secret key length: x25519 secret (32) || ed25519 seed (32).
pub const SECRET_KEY_LENGTH: usize = 64;

/// Width of the address field in canonical strings: 10 lowercase hex
/// digits, zero-padded, never truncated.
pub const ADDRESS_HEX_WIDTH: usize = 10;

/// Width of each key field in canonical strings: 128 lowercase hex digits.
pub const KEY_HEX_WIDTH: usize = 2 * PUBLIC_KEY_LENGTH;

/// The reserved key-type/version field carried between the address and the
/// public key in canonical strings. Only type 0 identities exist today;
/// the field is parsed strictly so a future type 1 fails loudly instead of
/// being misread as key material.
pub const KEY_TYPE_FIELD: &str = "0";
