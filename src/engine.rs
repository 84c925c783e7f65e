//! Raw-bytes adapter over libsecp256k1.
//!
//! Owns the library context and translates fixed-length byte buffers into
//! the `secp256k1` crate's calling convention. No curve math happens here.
//!
//! The context is randomized exactly once, at construction, from the OS
//! secure RNG. [`Engine::global`] exposes it as a process-wide init-once
//! singleton; the context is immutable afterwards and safe to share across
//! threads.

use std::sync::OnceLock;

use rand::rngs::OsRng;
use secp256k1::ecdh::SharedSecret;
use secp256k1::ecdsa::Signature;
use secp256k1::{All, Message, PublicKey, Scalar, Secp256k1, SecretKey};

use crate::encoding::{PUBKEY_COMPRESSED_LEN, SECRET_KEY_LEN, SIGNATURE_LEN};
use crate::error::Result;

static GLOBAL: OnceLock<Engine> = OnceLock::new();

pub struct Engine {
    secp: Secp256k1<All>,
}

impl Engine {
    /// Create a context and seed its randomization state from the OS RNG.
    pub fn new() -> Self {
        let mut secp = Secp256k1::new();
        secp.randomize(&mut OsRng);
        Self { secp }
    }

    /// Process-wide singleton, initialized on first use.
    pub fn global() -> &'static Engine {
        GLOBAL.get_or_init(|| {
            tracing::debug!("initializing randomized secp256k1 context");
            Engine::new()
        })
    }

    /// ECDSA verification of a compact signature over a 32-byte digest.
    ///
    /// `Ok(false)` means well-formed inputs and a signature that does not
    /// match; malformed keys or signatures are errors.
    pub fn verify(
        &self,
        digest: &[u8; 32],
        signature: &[u8; SIGNATURE_LEN],
        pubkey: &[u8],
    ) -> Result<bool> {
        let message = Message::from_digest(*digest);
        let signature = Signature::from_compact(signature)?;
        let pubkey = PublicKey::from_slice(pubkey)?;
        Ok(self.secp.verify_ecdsa(&message, &signature, &pubkey).is_ok())
    }

    /// Deterministic (RFC 6979) ECDSA signature, compact `r || s`.
    pub fn sign(
        &self,
        digest: &[u8; 32],
        seckey: &[u8; SECRET_KEY_LEN],
    ) -> Result<[u8; SIGNATURE_LEN]> {
        let message = Message::from_digest(*digest);
        let seckey = SecretKey::from_slice(seckey)?;
        Ok(self.secp.sign_ecdsa(&message, &seckey).serialize_compact())
    }

    /// Whether the bytes are a valid private key (nonzero, below the group
    /// order).
    pub fn sec_key_verify(&self, seckey: &[u8; SECRET_KEY_LEN]) -> bool {
        SecretKey::from_slice(seckey).is_ok()
    }

    /// Derive the public key of a private key.
    pub fn compute_pubkey(
        &self,
        seckey: &[u8; SECRET_KEY_LEN],
        compressed: bool,
    ) -> Result<Vec<u8>> {
        let seckey = SecretKey::from_slice(seckey)?;
        let pubkey = PublicKey::from_secret_key(&self.secp, &seckey);
        Ok(serialize_pubkey(&pubkey, compressed))
    }

    /// ECDH shared secret: SHA-256 of the compressed shared point (the
    /// library's default hashing).
    pub fn create_ecdh_secret(
        &self,
        seckey: &[u8; SECRET_KEY_LEN],
        pubkey: &[u8],
    ) -> Result<[u8; 32]> {
        let seckey = SecretKey::from_slice(seckey)?;
        let pubkey = PublicKey::from_slice(pubkey)?;
        Ok(SharedSecret::new(&pubkey, &seckey).secret_bytes())
    }

    /// `(seckey + tweak) mod n`.
    pub fn priv_key_tweak_add(
        &self,
        seckey: &[u8; SECRET_KEY_LEN],
        tweak: &[u8; 32],
    ) -> Result<[u8; SECRET_KEY_LEN]> {
        let seckey = SecretKey::from_slice(seckey)?;
        let tweak = Scalar::from_be_bytes(*tweak)?;
        Ok(seckey.add_tweak(&tweak)?.secret_bytes())
    }

    /// `(seckey * tweak) mod n`.
    pub fn priv_key_tweak_mul(
        &self,
        seckey: &[u8; SECRET_KEY_LEN],
        tweak: &[u8; 32],
    ) -> Result<[u8; SECRET_KEY_LEN]> {
        let seckey = SecretKey::from_slice(seckey)?;
        let tweak = Scalar::from_be_bytes(*tweak)?;
        Ok(seckey.mul_tweak(&tweak)?.secret_bytes())
    }

    /// `pubkey + tweak*G`. The result keeps the serialized form of the
    /// input key.
    pub fn pub_key_tweak_add(&self, pubkey: &[u8], tweak: &[u8; 32]) -> Result<Vec<u8>> {
        let compressed = pubkey.len() == PUBKEY_COMPRESSED_LEN;
        let pubkey = PublicKey::from_slice(pubkey)?;
        let tweak = Scalar::from_be_bytes(*tweak)?;
        let tweaked = pubkey.add_exp_tweak(&self.secp, &tweak)?;
        Ok(serialize_pubkey(&tweaked, compressed))
    }

    /// `pubkey * tweak`, serialized per the `compressed` flag.
    pub fn pub_key_tweak_mul(
        &self,
        pubkey: &[u8],
        tweak: &[u8; 32],
        compressed: bool,
    ) -> Result<Vec<u8>> {
        let pubkey = PublicKey::from_slice(pubkey)?;
        let tweak = Scalar::from_be_bytes(*tweak)?;
        let tweaked = pubkey.mul_tweak(&self.secp, &tweak)?;
        Ok(serialize_pubkey(&tweaked, compressed))
    }

    /// New random private key from the OS RNG. Always valid.
    pub fn generate_key(&self) -> [u8; SECRET_KEY_LEN] {
        SecretKey::new(&mut OsRng).secret_bytes()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_pubkey(pubkey: &PublicKey, compressed: bool) -> Vec<u8> {
    if compressed {
        pubkey.serialize().to_vec()
    } else {
        pubkey.serialize_uncompressed().to_vec()
    }
}
