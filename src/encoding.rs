//! Boundary encoding for gateway values.
//!
//! Every value crossing the gateway is base64 with the standard alphabet,
//! without padding and without line wrapping. Hex helpers cover the CLI's
//! alternate input form. Decoders check the exact byte length up front so
//! the cryptographic library only ever sees well-sized buffers.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

use crate::error::{Error, Result};

/// Private keys, tweaks, message digests and ECDH secrets.
pub const SECRET_KEY_LEN: usize = 32;
pub const DIGEST_LEN: usize = 32;
pub const TWEAK_LEN: usize = 32;

/// ECDSA compact form, `r || s`.
pub const SIGNATURE_LEN: usize = 64;

pub const PUBKEY_COMPRESSED_LEN: usize = 33;
pub const PUBKEY_UNCOMPRESSED_LEN: usize = 65;

/// Encode bytes as base64 without padding.
pub fn encode(data: &[u8]) -> String {
    STANDARD_NO_PAD.encode(data)
}

/// Decode base64 without padding. Padded or wrapped input is rejected.
pub fn decode(value: &str) -> Result<Vec<u8>> {
    STANDARD_NO_PAD
        .decode(value)
        .map_err(|err| Error::Decode(format!("invalid base64: {err}")))
}

/// Decode a value that must be exactly `N` bytes long.
///
/// `name` identifies the argument in the error message.
pub fn decode_array<const N: usize>(name: &str, value: &str) -> Result<[u8; N]> {
    let bytes = decode(value)?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        Error::Decode(format!(
            "expected {name} to be {N} bytes, got {}",
            bytes.len()
        ))
    })
}

/// Decode a public key: 33 bytes compressed or 65 bytes uncompressed.
pub fn decode_pubkey(value: &str) -> Result<Vec<u8>> {
    let bytes = decode(value)?;
    if bytes.len() != PUBKEY_COMPRESSED_LEN && bytes.len() != PUBKEY_UNCOMPRESSED_LEN {
        return Err(Error::Decode(format!(
            "expected public key to be {PUBKEY_COMPRESSED_LEN} or {PUBKEY_UNCOMPRESSED_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Encode bytes as lowercase hex.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex, either case.
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|err| Error::Decode(format!("invalid hex: {err}")))
}
