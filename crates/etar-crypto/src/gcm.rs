//! Incremental AES-256-GCM
//!
//! The one-shot `aes-gcm` API needs the whole message in memory. Here the two
//! halves of GCM are driven separately so a file can stream through in chunks:
//!
//! - CTR mode (`ctr::Ctr32BE<Aes256>`) starting at counter block `J0 + 1`
//! - GHASH over the ciphertext, with a 16-byte carry for partial blocks
//!
//! `tag = GHASH(H, C || len(A) || len(C)) XOR E(K, J0)` where `H = E(K, 0^128)`
//! and `J0 = nonce || 0x00000001`. No associated data is authenticated.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use aes::{Aes256, Block};
use ghash::universal_hash::UniversalHash;
use ghash::GHash;
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::DerivedKey;
use crate::{NONCE_SIZE, TAG_SIZE};

type Aes256Ctr = ctr::Ctr32BE<Aes256>;

const BLOCK_SIZE: usize = 16;

/// Streaming GCM state for one message.
pub struct GcmStream {
    ctr: Aes256Ctr,
    ghash: GHash,
    tag_mask: Block,
    carry: [u8; BLOCK_SIZE],
    carry_len: usize,
    ciphertext_len: u64,
}

impl GcmStream {
    pub fn new(key: &DerivedKey, nonce: &[u8; NONCE_SIZE]) -> Self {
        let key = GenericArray::from_slice(key.as_bytes());
        let cipher = Aes256::new(key);

        let mut hash_key = Block::default();
        cipher.encrypt_block(&mut hash_key);
        let ghash = <GHash as KeyInit>::new(&hash_key);

        let mut j0 = Block::default();
        j0[..NONCE_SIZE].copy_from_slice(nonce);
        j0[BLOCK_SIZE - 1] = 1;

        let mut tag_mask = j0;
        cipher.encrypt_block(&mut tag_mask);

        let mut counter = j0;
        counter[BLOCK_SIZE - 1] = 2;
        let ctr = Aes256Ctr::new(key, &counter);

        Self {
            ctr,
            ghash,
            tag_mask,
            carry: [0u8; BLOCK_SIZE],
            carry_len: 0,
            ciphertext_len: 0,
        }
    }

    /// Encrypt `buf` in place and fold the resulting ciphertext into the tag.
    pub fn encrypt_in_place(&mut self, buf: &mut [u8]) -> CryptoResult<()> {
        self.ctr
            .try_apply_keystream(buf)
            .map_err(|_| CryptoError::StreamTooLong)?;
        self.absorb(buf);
        Ok(())
    }

    /// Fold ciphertext `buf` into the tag, then decrypt it in place.
    pub fn decrypt_in_place(&mut self, buf: &mut [u8]) -> CryptoResult<()> {
        self.absorb(buf);
        self.ctr
            .try_apply_keystream(buf)
            .map_err(|_| CryptoError::StreamTooLong)
    }

    /// Finish the message and produce its tag.
    pub fn finalize(self) -> [u8; TAG_SIZE] {
        let s = self.finish_ghash();
        let mut tag = [0u8; TAG_SIZE];
        for (i, byte) in tag.iter_mut().enumerate() {
            *byte = s[i] ^ self.tag_mask[i];
        }
        tag
    }

    /// Finish the message and compare against `expected` in constant time.
    pub fn verify(self, expected: &[u8; TAG_SIZE]) -> CryptoResult<()> {
        let tag = self.finalize();
        if bool::from(tag[..].ct_eq(&expected[..])) {
            Ok(())
        } else {
            Err(CryptoError::Authentication)
        }
    }

    fn finish_ghash(&self) -> Block {
        let mut ghash = self.ghash.clone();
        if self.carry_len > 0 {
            ghash.update_padded(&self.carry[..self.carry_len]);
        }

        // 64-bit AAD bit length (always zero) followed by ciphertext bit length
        let mut lengths = Block::default();
        lengths[8..].copy_from_slice(&(self.ciphertext_len * 8).to_be_bytes());
        ghash.update(&[lengths]);
        ghash.finalize()
    }

    fn absorb(&mut self, mut data: &[u8]) {
        self.ciphertext_len += data.len() as u64;

        if self.carry_len > 0 {
            let take = (BLOCK_SIZE - self.carry_len).min(data.len());
            self.carry[self.carry_len..self.carry_len + take].copy_from_slice(&data[..take]);
            self.carry_len += take;
            data = &data[take..];
            if self.carry_len < BLOCK_SIZE {
                return;
            }
            self.ghash.update(&[Block::from(self.carry)]);
            self.carry_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            self.ghash.update(&[*Block::from_slice(block)]);
        }

        let rest = blocks.remainder();
        self.carry[..rest.len()].copy_from_slice(rest);
        self.carry_len = rest.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes_gcm::aead::{Aead, KeyInit};
    use aes_gcm::{Aes256Gcm, Nonce};

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn seal(key: &DerivedKey, nonce: &[u8; NONCE_SIZE], plaintext: &[u8], step: usize) -> Vec<u8> {
        let mut gcm = GcmStream::new(key, nonce);
        let mut out = plaintext.to_vec();
        for chunk in out.chunks_mut(step) {
            gcm.encrypt_in_place(chunk).unwrap();
        }
        out.extend_from_slice(&gcm.finalize());
        out
    }

    fn one_shot(key: &DerivedKey, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Vec<u8> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        cipher.encrypt(Nonce::from_slice(nonce), plaintext).unwrap()
    }

    #[test]
    fn test_nist_empty_plaintext() {
        // AES-256 zero key, zero 96-bit IV, empty plaintext
        let key = DerivedKey::from_bytes([0u8; 32]);
        let sealed = seal(&key, &[0u8; NONCE_SIZE], b"", 16);
        assert_eq!(sealed, hex("530f8afbc74536b9a963b4f1c4cb738b"));
    }

    #[test]
    fn test_nist_single_zero_block() {
        let key = DerivedKey::from_bytes([0u8; 32]);
        let sealed = seal(&key, &[0u8; NONCE_SIZE], &[0u8; 16], 16);
        assert_eq!(
            sealed,
            hex("cea7403d4d606b6e074ec5d3baf39d18d0d1c8a799996bf0265b98b5d48ab919")
        );
    }

    #[test]
    fn test_matches_one_shot_for_every_split() {
        let key = DerivedKey::from_bytes([0x42u8; 32]);
        let nonce = [0x24u8; NONCE_SIZE];
        let plaintext: Vec<u8> = (0..200u32).map(|i| (i * 13) as u8).collect();

        for len in [0, 1, 15, 16, 17, 31, 32, 33, 100, 200] {
            let expected = one_shot(&key, &nonce, &plaintext[..len]);
            for step in [1, 3, 5, 16, 17, 64, 256] {
                assert_eq!(
                    seal(&key, &nonce, &plaintext[..len], step),
                    expected,
                    "len={len} step={step}"
                );
            }
        }
    }

    #[test]
    fn test_decrypt_roundtrip_and_verify() {
        let key = DerivedKey::from_bytes([9u8; 32]);
        let nonce = [3u8; NONCE_SIZE];
        let plaintext = b"stream me through gcm in odd-sized pieces";

        let sealed = seal(&key, &nonce, plaintext, 7);
        let (ciphertext, tag) = sealed.split_at(plaintext.len());
        let tag: [u8; TAG_SIZE] = tag.try_into().unwrap();

        let mut gcm = GcmStream::new(&key, &nonce);
        let mut buf = ciphertext.to_vec();
        for chunk in buf.chunks_mut(5) {
            gcm.decrypt_in_place(chunk).unwrap();
        }
        gcm.verify(&tag).unwrap();
        assert_eq!(&buf[..], &plaintext[..]);
    }

    #[test]
    fn test_verify_rejects_wrong_tag() {
        let key = DerivedKey::from_bytes([9u8; 32]);
        let nonce = [3u8; NONCE_SIZE];
        let sealed = seal(&key, &nonce, b"abc", 16);
        let mut tag: [u8; TAG_SIZE] = sealed[3..].try_into().unwrap();
        tag[0] ^= 1;

        let mut gcm = GcmStream::new(&key, &nonce);
        let mut buf = sealed[..3].to_vec();
        gcm.decrypt_in_place(&mut buf).unwrap();
        assert!(matches!(gcm.verify(&tag), Err(CryptoError::Authentication)));
    }
}
