//! etar-crypto: password-based streaming file encryption for encrypt-tar
//!
//! Architecture: PBKDF2-HMAC-SHA256 → AES-256-GCM, one tag for the whole file
//!
//! Pipeline: password + random salt → 256-bit key → CTR keystream + GHASH over
//! fixed-size chunks → ciphertext streamed out as produced, tag appended last.
//!
//! Container layout:
//! ```text
//! [16 bytes: salt][12 bytes: nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! The ciphertext and tag are byte-identical to one-shot AES-256-GCM over the
//! whole plaintext with no associated data.

pub mod error;
pub mod gcm;
pub mod header;
pub mod holdback;
pub mod kdf;
pub mod stream;

pub use error::CryptoError;
pub use header::{container_len, Header};
pub use kdf::{derive_key, DerivedKey, KdfParams};
pub use stream::{decrypt, encrypt, FileCipher};

/// Size of the derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the PBKDF2 salt stored at the start of a container
pub const SALT_SIZE: usize = 16;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Salt plus nonce
pub const HEADER_SIZE: usize = SALT_SIZE + NONCE_SIZE;

/// Smallest valid container: header plus tag around an empty ciphertext
pub const MIN_CONTAINER_SIZE: usize = HEADER_SIZE + TAG_SIZE;

/// Default streaming chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted streaming chunk size (64 MiB)
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// PBKDF2 iteration count used for every container written by encrypt-tar
pub const PBKDF2_ITERATIONS: u32 = 100_000;
