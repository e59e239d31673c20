//! Container header: `[16 bytes: salt][12 bytes: nonce]`
//!
//! Neither field is secret. Both are generated fresh for every encryption and
//! written once at the start of the container.

use rand::RngCore;
use std::io::{Read, Write};

use crate::error::{CryptoError, CryptoResult};
use crate::holdback::read_full;
use crate::{HEADER_SIZE, MIN_CONTAINER_SIZE, NONCE_SIZE, SALT_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; NONCE_SIZE],
}

impl Header {
    pub fn new(salt: [u8; SALT_SIZE], nonce: [u8; NONCE_SIZE]) -> Self {
        Self { salt, nonce }
    }

    /// Fresh random salt and an independent random nonce.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut nonce);
        Self { salt, nonce }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..SALT_SIZE].copy_from_slice(&self.salt);
        out[SALT_SIZE..].copy_from_slice(&self.nonce);
        out
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        salt.copy_from_slice(&bytes[..SALT_SIZE]);
        nonce.copy_from_slice(&bytes[SALT_SIZE..]);
        Self { salt, nonce }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> CryptoResult<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read salt then nonce. A stream that ends early is a malformed
    /// container, reported with the number of bytes that were available.
    pub fn read_from<R: Read>(reader: &mut R) -> CryptoResult<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        let got = read_full(reader, &mut bytes)?;
        if got < HEADER_SIZE {
            return Err(CryptoError::Truncated { len: got as u64 });
        }
        Ok(Self::from_bytes(&bytes))
    }
}

/// Total container size for a plaintext of `plaintext_len` bytes.
pub fn container_len(plaintext_len: u64) -> u64 {
    plaintext_len + MIN_CONTAINER_SIZE as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_layout() {
        let header = Header::new([0xAA; SALT_SIZE], [0xBB; NONCE_SIZE]);
        let bytes = header.to_bytes();

        assert_eq!(&bytes[..16], &[0xAA; 16]);
        assert_eq!(&bytes[16..28], &[0xBB; 12]);
        assert_eq!(Header::from_bytes(&bytes), header);
    }

    #[test]
    fn test_generate_is_fresh() {
        let a = Header::generate();
        let b = Header::generate();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(&a.salt[..NONCE_SIZE], &a.nonce[..], "salt and nonce are independent");
    }

    #[test]
    fn test_read_from_short_stream() {
        let data = [0u8; 20];
        let err = Header::read_from(&mut &data[..]).unwrap_err();
        assert!(matches!(err, CryptoError::Truncated { len: 20 }));
    }

    #[test]
    fn test_read_from_leaves_rest_of_stream() {
        let mut data = Header::new([1; SALT_SIZE], [2; NONCE_SIZE]).to_bytes().to_vec();
        data.extend_from_slice(b"rest");
        let mut reader = &data[..];

        let header = Header::read_from(&mut reader).unwrap();
        assert_eq!(header.salt, [1; SALT_SIZE]);
        assert_eq!(header.nonce, [2; NONCE_SIZE]);
        assert_eq!(reader, b"rest");
    }

    #[test]
    fn test_container_len() {
        assert_eq!(container_len(0), 44);
        assert_eq!(container_len(150_000), 150_044);
    }
}
