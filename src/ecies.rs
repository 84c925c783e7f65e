//! ECDH message encryption.
//!
//! Authenticated encryption between two key holders: the ECDH shared secret
//! is expanded with HKDF-SHA256 into a conversation key, and each message
//! is sealed with ChaCha20-Poly1305 under a fresh random nonce.
//!
//! Payload layout, base64 without padding:
//! `version (1) || nonce (12) || ciphertext + tag (16)`.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::encoding;
use crate::error::{Error, Result};

const VERSION: u8 = 1;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// HKDF salt, fixed per payload version.
const HKDF_SALT: &[u8] = b"secpgate-ecdh-v1";

/// Derive the symmetric conversation key from an ECDH shared secret.
fn derive_conversation_key(shared_secret: &[u8; 32]) -> Zeroizing<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), shared_secret);
    let mut key = Zeroizing::new([0u8; 32]);
    hk.expand(b"conversation", &mut *key)
        .expect("HKDF expand with 32-byte output");
    key
}

/// Seal `plaintext` under the shared secret. Nonces are random, so two
/// encryptions of the same message differ.
pub fn encrypt(plaintext: &[u8], shared_secret: &[u8; 32]) -> Result<String> {
    let key = derive_conversation_key(shared_secret);
    let cipher = ChaCha20Poly1305::new_from_slice(&*key).expect("32-byte ChaCha20-Poly1305 key");

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| Error::Internal("encryption failure".into()))?;

    let mut payload = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
    payload.push(VERSION);
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    Ok(encoding::encode(&payload))
}

/// Open a payload produced by [`encrypt`] with the same shared secret.
pub fn decrypt(ciphertext_b64: &str, shared_secret: &[u8; 32]) -> Result<Vec<u8>> {
    let payload = encoding::decode(ciphertext_b64)?;
    if payload.len() < 1 + NONCE_LEN + TAG_LEN {
        return Err(Error::Decode("ciphertext too short".into()));
    }
    if payload[0] != VERSION {
        return Err(Error::InvalidInput(format!(
            "unsupported ciphertext version: {}",
            payload[0]
        )));
    }

    let (nonce, ciphertext) = payload[1..].split_at(NONCE_LEN);
    let key = derive_conversation_key(shared_secret);
    let cipher = ChaCha20Poly1305::new_from_slice(&*key).expect("32-byte ChaCha20-Poly1305 key");
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::InvalidInput("ciphertext authentication failed".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn roundtrip() {
        let ciphertext = encrypt(b"attack at dawn", &SECRET).unwrap();
        let plaintext = decrypt(&ciphertext, &SECRET).unwrap();
        assert_eq!(plaintext, b"attack at dawn");
    }

    #[test]
    fn empty_message_roundtrips() {
        let ciphertext = encrypt(b"", &SECRET).unwrap();
        assert_eq!(decrypt(&ciphertext, &SECRET).unwrap(), b"");
    }

    #[test]
    fn nonces_randomize_the_ciphertext() {
        let a = encrypt(b"same message", &SECRET).unwrap();
        let b = encrypt(b"same message", &SECRET).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampering_is_rejected() {
        let ciphertext = encrypt(b"integrity matters", &SECRET).unwrap();
        let mut payload = encoding::decode(&ciphertext).unwrap();
        let last = payload.len() - 1;
        payload[last] ^= 0x01;
        let err = decrypt(&encoding::encode(&payload), &SECRET).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let ciphertext = encrypt(b"for your eyes only", &SECRET).unwrap();
        let err = decrypt(&ciphertext, &[8u8; 32]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn truncated_payload_is_a_decode_error() {
        let err = decrypt(&encoding::encode(&[VERSION; 8]), &SECRET).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let ciphertext = encrypt(b"hello", &SECRET).unwrap();
        let mut payload = encoding::decode(&ciphertext).unwrap();
        payload[0] = 9;
        let err = decrypt(&encoding::encode(&payload), &SECRET).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
