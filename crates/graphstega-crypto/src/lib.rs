//! # graphstega-crypto
//!
//! Payload sealing for the embedding engine. The engine treats sealed bytes
//! as opaque; this crate decides what "sealed" means. Two implementations:
//! [`XChaChaPayloadCipher`] (XChaCha20-Poly1305 under an Argon2id-derived
//! key) and [`PlainPayload`] (passthrough for unencrypted embeds).
//!
//! Sealed layout: `salt(16) || nonce(24) || aead ciphertext`. Salt and
//! nonce are fresh per seal, so sealing is not deterministic; only the
//! engine below it is.

#![deny(unsafe_code)]

use argon2::Argon2;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;
/// Poly1305 authentication tag.
const TAG_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,

    #[error("sealed payload is shorter than its header")]
    Truncated,

    /// Authentication failed: wrong passphrase or corrupted ciphertext.
    #[error("could not open sealed payload (wrong key or corrupt data)")]
    Opening,

    #[error("encryption failed")]
    Sealing,
}

/// Seals plaintext into opaque bytes and back.
pub trait PayloadCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;
    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Sealed size for a given plaintext size, for capacity planning.
    fn sealed_len(&self, plaintext_len: usize) -> usize;
}

/// No encryption; the payload is embedded as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPayload;

impl PayloadCipher for PlainPayload {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(plaintext.to_vec())
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(sealed.to_vec())
    }

    fn sealed_len(&self, plaintext_len: usize) -> usize {
        plaintext_len
    }
}

/// XChaCha20-Poly1305 under a key derived from a passphrase with Argon2id.
#[derive(Clone)]
pub struct XChaChaPayloadCipher {
    passphrase: Vec<u8>,
}

impl XChaChaPayloadCipher {
    #[must_use]
    pub fn new(passphrase: &str) -> Self {
        Self {
            passphrase: passphrase.as_bytes().to_vec(),
        }
    }

    fn derive_key(&self, salt: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
        let mut key = [0u8; KEY_LEN];
        Argon2::default()
            .hash_password_into(&self.passphrase, salt, &mut key)
            .map_err(|_| CryptoError::KeyDerivation)?;
        Ok(key)
    }
}

impl PayloadCipher for XChaChaPayloadCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = self.derive_key(&salt)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::Sealing)?;

        let mut sealed = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&salt);
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Truncated);
        }
        let (salt, rest) = sealed.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let key = self.derive_key(salt)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Opening)
    }

    fn sealed_len(&self, plaintext_len: usize) -> usize {
        SALT_LEN + NONCE_LEN + plaintext_len + TAG_LEN
    }
}
