//! Streaming container encryption and decryption
//!
//! Both directions hold at most one chunk plus one tag in memory. Ciphertext is
//! written as soon as it is produced. On decryption, plaintext is written to the
//! caller's writer as chunks arrive and the tag is checked once the stream is
//! exhausted. That plaintext is unverified until `decrypt` returns `Ok`: the
//! writer must be a staging sink that the caller discards on any error and only
//! publishes afterwards, as the `encrypt-tar` binary does with its temp-file
//! output.

use secrecy::SecretString;
use std::io::{Read, Write};
use tracing::{debug, warn};

use crate::error::{CryptoError, CryptoResult};
use crate::gcm::GcmStream;
use crate::header::Header;
use crate::holdback::{read_full, HoldbackReader};
use crate::kdf::{derive_key, KdfParams};
use crate::{DEFAULT_CHUNK_SIZE, HEADER_SIZE, MAX_CHUNK_SIZE};

/// Encrypt `input` into a new container on `output` with default parameters.
///
/// Returns the number of plaintext bytes consumed.
pub fn encrypt<R: Read, W: Write>(
    input: R,
    output: W,
    password: &SecretString,
) -> CryptoResult<u64> {
    FileCipher::default().encrypt(input, output, password)
}

/// Decrypt and verify a container from `input`, writing plaintext to `output`.
///
/// Returns the number of plaintext bytes written.
pub fn decrypt<R: Read, W: Write>(
    input: R,
    output: W,
    password: &SecretString,
) -> CryptoResult<u64> {
    FileCipher::default().decrypt(input, output, password)
}

/// Container cipher with explicit KDF and chunking parameters.
///
/// Holds no per-operation state: every call derives its own key and owns its
/// own buffers, so one `FileCipher` can serve concurrent calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileCipher {
    kdf: KdfParams,
    chunk_size: usize,
}

impl Default for FileCipher {
    fn default() -> Self {
        Self::new(KdfParams::default())
    }
}

impl FileCipher {
    pub fn new(kdf: KdfParams) -> Self {
        Self {
            kdf,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Read granularity in bytes. Output is identical for every chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn kdf_params(&self) -> &KdfParams {
        &self.kdf
    }

    /// Encrypt under a freshly generated salt and nonce.
    pub fn encrypt<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
        password: &SecretString,
    ) -> CryptoResult<u64> {
        self.encrypt_with_header(&Header::generate(), input, output, password)
    }

    /// Encrypt under a caller-chosen salt and nonce.
    ///
    /// Reusing a header with the same password reuses the GCM nonce under the
    /// same key. Only use this for reproducible test vectors.
    pub fn encrypt_with_header<R: Read, W: Write>(
        &self,
        header: &Header,
        mut input: R,
        mut output: W,
        password: &SecretString,
    ) -> CryptoResult<u64> {
        self.check_chunk_size()?;
        debug!(chunk_size = self.chunk_size, "encrypting stream");

        let key = derive_key(password, &header.salt, &self.kdf)?;
        header.write_to(&mut output)?;

        let mut gcm = GcmStream::new(&key, &header.nonce);
        let mut buf = vec![0u8; self.chunk_size];
        let mut total: u64 = 0;

        loop {
            let n = read_full(&mut input, &mut buf)?;
            if n == 0 {
                break;
            }
            gcm.encrypt_in_place(&mut buf[..n])?;
            output.write_all(&buf[..n])?;
            total += n as u64;
        }

        output.write_all(&gcm.finalize())?;
        output.flush()?;

        debug!(plaintext_bytes = total, "stream sealed");
        Ok(total)
    }

    /// Decrypt and verify a container.
    ///
    /// A container shorter than header plus tag is rejected as
    /// [`CryptoError::Truncated`] before any key derivation. A tag mismatch
    /// is [`CryptoError::Authentication`].
    pub fn decrypt<R: Read, W: Write>(
        &self,
        mut input: R,
        mut output: W,
        password: &SecretString,
    ) -> CryptoResult<u64> {
        self.check_chunk_size()?;
        debug!(chunk_size = self.chunk_size, "decrypting stream");

        let header = Header::read_from(&mut input)?;
        let mut holdback = HoldbackReader::new(input, self.chunk_size)?;
        if !holdback.has_tag() {
            return Err(CryptoError::Truncated {
                len: HEADER_SIZE as u64 + holdback.consumed(),
            });
        }

        let key = derive_key(password, &header.salt, &self.kdf)?;
        let mut gcm = GcmStream::new(&key, &header.nonce);
        let mut total: u64 = 0;

        while let Some(chunk) = holdback.next_chunk()? {
            gcm.decrypt_in_place(chunk)?;
            output.write_all(chunk)?;
            total += chunk.len() as u64;
        }

        let tag = holdback.into_tag();
        if let Err(e) = gcm.verify(&tag) {
            warn!(ciphertext_bytes = total, "container failed authentication");
            return Err(e);
        }
        output.flush()?;

        debug!(plaintext_bytes = total, "stream opened");
        Ok(total)
    }

    fn check_chunk_size(&self) -> CryptoResult<()> {
        if self.chunk_size == 0 {
            return Err(CryptoError::InvalidParams(
                "chunk size must be at least 1 byte".into(),
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(CryptoError::InvalidParams(format!(
                "chunk size {} exceeds the {MAX_CHUNK_SIZE}-byte limit",
                self.chunk_size
            )));
        }
        Ok(())
    }
}
