//! credvault - core library for a local, single-user encrypted credential
//! vault.
//!
//! - [`secret`] - zeroizing, constant-time-comparable secret buffers
//! - [`csprng`] - uniform random bytes and unbiased bounded integers
//! - [`kdf`] - Argon2id key derivation and parameter persistence
//! - [`aead`] - XChaCha20-Poly1305 field encryption
//! - [`record`] - credential entry types and validation
//! - [`store`] - the SQLCipher-backed encrypted record store
//! - [`migrate`] - schema and legacy-format migration
//! - [`generator`] - password generation
//! - [`totp`] - RFC 6238 time-based one-time codes
//! - [`health`] - password health auditing, including HIBP breach checks
//! - [`facade`] - the stable [`facade::Session`] API surface
//!
//! # Architecture
//!
//! ```text
//! facade::Session
//!     │
//!     ├── store::VaultStore ── kdf, aead, record
//!     ├── migrate
//!     ├── generator
//!     ├── totp
//!     └── health
//! ```
//!
//! This crate does not implement a CLI, GUI, or shell integration; it is
//! the core a caller builds one of those on top of.

pub mod aead;
pub mod csprng;
pub mod error;
pub mod facade;
pub mod generator;
pub mod health;
pub mod kdf;
pub mod migrate;
pub mod record;
pub mod secret;
pub mod store;
pub mod totp;

pub use error::VaultError;
pub use facade::{Session, VaultConfig};
