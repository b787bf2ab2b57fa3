// Copyright (c) 2026 Orbit Mesh. MIT License.
// See LICENSE for details.

//! # Orbit Identity — Self-Certifying Proof-of-Work Node Identities
//!
//! This crate mints the cryptographic identities that Orbit overlay nodes
//! are known by. No registrar, no certificate authority, no sequence
//! numbers: a node's short 40-bit address is read directly out of a
//! memory-hard hash of its own public key. Whoever holds an address paid
//! for it in CPU time and memory bandwidth, which is what keeps mass
//! identity generation (Sybil attacks, address squatting) expensive.
//!
//! ## The pipeline
//!
//! Four pieces, composed linearly by the miner:
//!
//! - **[`keys`]** — one x25519 key-agreement pair plus one ed25519 signature
//!   pair, combined into 64-byte public/secret encodings.
//! - **[`hash`]** — a deterministic, sequentially memory-bound digest over
//!   the public key: 2 MiB working set, no shortcuts, no parallelism.
//! - **[`miner`]** — draws candidates until a digest clears the difficulty
//!   predicate, then extracts the address.
//! - **[`identity`]** — the immutable result, with its canonical string
//!   encodings and parsing.
//!
//! ## Quick start
//!
//! ```no_run
//! use orbit_identity::generate_identity;
//!
//! let identity = generate_identity().expect("entropy source available");
//! println!("address:  {}", identity.address_string());
//! println!("public:   {}", identity.public_string());
//! // Secret string exists because we mined this identity ourselves.
//! println!("secret:   {}", identity.secret_string().unwrap());
//! ```
//!
//! Expect a call to [`generate_identity`] to block for a few hundred
//! milliseconds — that delay *is* the feature. The crate is synchronous and
//! single-threaded throughout; to mine several identities concurrently, run
//! independent miners on separate threads.
//!
//! ## What this crate is not
//!
//! Not a general-purpose KDF (memory size and difficulty are fixed
//! constants of the identity format), not the overlay's wire protocol, and
//! not a key store. It produces identities and their interchange strings;
//! everything around them lives elsewhere.

pub mod config;
pub mod hash;
pub mod identity;
pub mod keys;
pub mod miner;

pub use identity::{Address, OrbitIdentity, ParseIdentityError};
pub use keys::{DualKeypair, EntropyError};
pub use miner::{generate_identity, IdentityMiner, MiningError};
