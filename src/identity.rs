//! # Orbit Identity — Self-Certifying Node Addresses
//!
//! An [`OrbitIdentity`] binds a short 40-bit address to a 64-byte combined
//! public key. Nobody assigns the address: it is read out of the memory-hard
//! digest of the public key itself, so holding an address *is* proof that
//! someone burned the proof-of-work to mint it. Forging a specific address
//! means grinding keypairs until the digest cooperates — that's the whole
//! anti-Sybil story.
//!
//! ## Canonical strings
//!
//! ```text
//! address (10 hex) : key type (0) : public key (128 hex) [: secret key (128 hex)]
//! ```
//!
//! These strings are the interchange format. Field widths are fixed, hex is
//! lowercase, and nothing is ever truncated or padded beyond the spec'd
//! widths. If you print an identity any other way, peers will not parse it.
//!
//! ## Public-only identities
//!
//! Parsing a public string yields an identity with no secret key. That is a
//! normal state, not an error — it's how every peer holds everyone else's
//! identity. [`secret_string`](OrbitIdentity::secret_string) returns `None`
//! rather than fabricating key material.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{
    ADDRESS_HEX_WIDTH, ADDRESS_LENGTH, ADDRESS_OFFSET, HASHCASH_FIRST_BYTE_MAX, KEY_HEX_WIDTH,
    KEY_TYPE_FIELD, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH,
};
use crate::hash::memory_hard_hash;
use crate::keys::DualKeypair;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from decoding a canonical identity string.
///
/// Malformed input fails loudly and specifically. Silent truncation or
/// zero-padding of a field would let two peers "successfully" parse the
/// same string into different identities, which is the one outcome an
/// identity format must never allow.
// No `Eq`: `hex::FromHexError` only implements `PartialEq`.
#[derive(Debug, Error, PartialEq)]
pub enum ParseIdentityError {
    /// Wrong number of colon-separated fields (3 for public, 4 with secret).
    #[error("expected 3 or 4 colon-separated fields, got {0}")]
    FieldCount(usize),

    /// The address field is not exactly 10 hex digits.
    #[error("address field must be exactly {ADDRESS_HEX_WIDTH} hex digits")]
    AddressWidth,

    /// The address decodes to zero, which is reserved and never minted.
    #[error("address zero is reserved")]
    ZeroAddress,

    /// The key-type field is not the reserved type 0.
    #[error("unsupported key type '{0}': only type 0 identities exist")]
    UnsupportedKeyType(String),

    /// A key field is not exactly 128 hex digits.
    #[error("key field must be exactly {KEY_HEX_WIDTH} hex digits")]
    KeyWidth,

    /// A field contains non-hexadecimal characters.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 40-bit Orbit address, carried in a `u64`.
///
/// Always non-zero and always ≤ 2^40 - 1 by construction: the only ways to
/// obtain one are mining (which rejects zero) and parsing (which enforces
/// the 10-hex-digit width and rejects zero).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    /// Extract the address from a qualifying digest: the big-endian 40-bit
    /// integer at bytes 59..64. May be zero — the miner must reject that
    /// candidate, which is why this constructor stays crate-private.
    pub(crate) fn from_digest(digest: &[u8; 64]) -> Self {
        let mut value = 0u64;
        for &byte in &digest[ADDRESS_OFFSET..ADDRESS_OFFSET + ADDRESS_LENGTH] {
            value = (value << 8) | u64::from(byte);
        }
        Self(value)
    }

    /// The address as the 40-bit value it is, carried in a `u64`.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:010x})", self.0)
    }
}

impl FromStr for Address {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_HEX_WIDTH {
            return Err(ParseIdentityError::AddressWidth);
        }
        let raw = hex::decode(s)?;
        let mut value = 0u64;
        for byte in raw {
            value = (value << 8) | u64::from(byte);
        }
        if value == 0 {
            return Err(ParseIdentityError::ZeroAddress);
        }
        Ok(Self(value))
    }
}

// ---------------------------------------------------------------------------
// OrbitIdentity
// ---------------------------------------------------------------------------

/// A self-certifying node identity: 40-bit address, combined public key,
/// and — when we minted it ourselves — the combined secret key.
///
/// Immutable after construction. There are exactly two ways to make one:
/// mining (full, with secret key) and parsing a canonical string (with or
/// without the secret field).
#[derive(Clone)]
pub struct OrbitIdentity {
    address: Address,
    public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Present only for mined identities or strings carrying the secret
    /// field. Owned exclusively here; never implicitly serialized.
    secret_key: Option<[u8; SECRET_KEY_LENGTH]>,
}

impl OrbitIdentity {
    pub(crate) fn mined(
        address: Address,
        public_key: [u8; PUBLIC_KEY_LENGTH],
        secret_key: [u8; SECRET_KEY_LENGTH],
    ) -> Self {
        Self {
            address,
            public_key,
            secret_key: Some(secret_key),
        }
    }

    /// The 40-bit address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The combined 64-byte public key (x25519 || ed25519).
    pub fn public_key_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    /// The combined 64-byte secret key, if held.
    pub fn secret_key_bytes(&self) -> Option<&[u8; SECRET_KEY_LENGTH]> {
        self.secret_key.as_ref()
    }

    /// Whether this identity carries its secret half.
    pub fn has_secret_key(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Reconstruct the working keypair, if the secret key is held.
    pub fn keypair(&self) -> Option<DualKeypair> {
        self.secret_key
            .as_ref()
            .map(DualKeypair::from_secret_key_bytes)
    }

    /// The canonical public string: `aabbccddee:0:<128 hex public key>`.
    pub fn public_string(&self) -> String {
        format!(
            "{}:{}:{}",
            self.address,
            KEY_TYPE_FIELD,
            hex::encode(self.public_key)
        )
    }

    /// The canonical secret string — the public string with the 128-hex-digit
    /// secret key appended — or `None` when no secret key is held. Absence
    /// is the normal state for parsed public identities, not an error.
    pub fn secret_string(&self) -> Option<String> {
        self.secret_key
            .as_ref()
            .map(|sk| format!("{}:{}", self.public_string(), hex::encode(sk)))
    }

    /// The address alone, as its fixed 10-hex-digit form.
    pub fn address_string(&self) -> String {
        self.address.to_string()
    }

    /// Re-run the proof-of-work check on this identity.
    ///
    /// Recomputes the memory-hard digest of the public key and verifies the
    /// difficulty predicate and the address binding; if a secret key is
    /// held, also verifies it actually derives this public key. Costs a
    /// full 2 MiB hash evaluation — call it on untrusted parsed strings,
    /// not in hot paths.
    pub fn validate(&self) -> bool {
        let digest = memory_hard_hash(&self.public_key);
        if digest[0] >= HASHCASH_FIRST_BYTE_MAX || digest[ADDRESS_OFFSET] == 0xFF {
            return false;
        }
        if Address::from_digest(&digest) != self.address {
            return false;
        }
        match &self.secret_key {
            Some(sk) => {
                DualKeypair::from_secret_key_bytes(sk).public_key_bytes() == self.public_key
            }
            None => true,
        }
    }
}

/// Equality and hashing cover the public identity (address + public key).
/// Whether a secret key happens to be attached is a property of this copy,
/// not of the identity itself.
impl PartialEq for OrbitIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.public_key == other.public_key
    }
}

impl Eq for OrbitIdentity {}

impl std::hash::Hash for OrbitIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.public_key.hash(state);
    }
}

impl fmt::Display for OrbitIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.public_string())
    }
}

impl fmt::Debug for OrbitIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret material never reaches Debug output, held or not.
        write!(
            f,
            "OrbitIdentity({}, secret={})",
            self.address,
            if self.secret_key.is_some() {
                "held"
            } else {
                "absent"
            }
        )
    }
}

impl FromStr for OrbitIdentity {
    type Err = ParseIdentityError;

    /// Parse a canonical public or secret identity string.
    ///
    /// Accepts exactly the formats [`public_string`](Self::public_string)
    /// and [`secret_string`](Self::secret_string) emit. This checks shape
    /// only; run [`validate`](Self::validate) before trusting a parsed
    /// identity's proof-of-work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 3 && fields.len() != 4 {
            return Err(ParseIdentityError::FieldCount(fields.len()));
        }

        let address = Address::from_str(fields[0])?;

        if fields[1] != KEY_TYPE_FIELD {
            return Err(ParseIdentityError::UnsupportedKeyType(
                fields[1].to_string(),
            ));
        }

        let public_key = decode_key_field(fields[2])?;
        let secret_key = match fields.get(3) {
            Some(field) => Some(decode_key_field(field)?),
            None => None,
        };

        Ok(Self {
            address,
            public_key,
            secret_key,
        })
    }
}

fn decode_key_field(field: &str) -> Result<[u8; 64], ParseIdentityError> {
    if field.len() != KEY_HEX_WIDTH {
        return Err(ParseIdentityError::KeyWidth);
    }
    let raw = hex::decode(field)?;
    let mut out = [0u8; 64];
    out.copy_from_slice(&raw);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

/// Human-readable formats carry the canonical public string; binary formats
/// carry `address (5 bytes BE) || public key (64 bytes)`. The secret key is
/// never serialized — exporting it is an explicit act via
/// [`secret_string`](OrbitIdentity::secret_string), not a serde side effect.
impl Serialize for OrbitIdentity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.public_string())
        } else {
            let mut raw = [0u8; ADDRESS_LENGTH + PUBLIC_KEY_LENGTH];
            raw[..ADDRESS_LENGTH].copy_from_slice(&self.address.0.to_be_bytes()[3..]);
            raw[ADDRESS_LENGTH..].copy_from_slice(&self.public_key);
            serializer.serialize_bytes(&raw)
        }
    }
}

impl<'de> Deserialize<'de> for OrbitIdentity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            OrbitIdentity::from_str(&s).map_err(serde::de::Error::custom)
        } else {
            let raw = <Vec<u8>>::deserialize(deserializer)?;
            if raw.len() != ADDRESS_LENGTH + PUBLIC_KEY_LENGTH {
                return Err(serde::de::Error::custom(format!(
                    "expected {} identity bytes, got {}",
                    ADDRESS_LENGTH + PUBLIC_KEY_LENGTH,
                    raw.len()
                )));
            }
            let mut value = 0u64;
            for &byte in &raw[..ADDRESS_LENGTH] {
                value = (value << 8) | u64::from(byte);
            }
            if value == 0 {
                return Err(serde::de::Error::custom("address zero is reserved"));
            }
            let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
            public_key.copy_from_slice(&raw[ADDRESS_LENGTH..]);
            Ok(Self {
                address: Address(value),
                public_key,
                secret_key: None,
            })
        }
    }
}
