use thiserror::Error;

use crate::MIN_CONTAINER_SIZE;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed container: {len} bytes, need at least {min}", min = MIN_CONTAINER_SIZE)]
    Truncated { len: u64 },

    /// Tag mismatch: wrong password, truncated ciphertext or tampering.
    #[error("authentication failed: wrong password or corrupted container")]
    Authentication,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("input exceeds the AES-GCM keystream limit")]
    StreamTooLong,
}

impl CryptoError {
    /// True for a failed tag check, false for every I/O-class failure.
    pub fn is_authentication(&self) -> bool {
        matches!(self, CryptoError::Authentication)
    }
}
