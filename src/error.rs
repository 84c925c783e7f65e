//! Gateway error taxonomy.
//!
//! Three categories, all recoverable: `Decode` for malformed encoded input,
//! `InvalidInput` for bytes the cryptographic library rejects, `Internal`
//! for dispatch defects. A failed operation resolves its future with one of
//! these; it never takes the host process down.

use thiserror::Error;

/// Errors surfaced by the gateway and the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input string was not valid base64 without padding, or decoded
    /// to the wrong byte length.
    #[error("decode error: {0}")]
    Decode(String),

    /// The bytes decoded cleanly but the library rejected them (key out of
    /// range, point not on the curve, tweak overflow, failed
    /// authentication). Carries the library's diagnostic message.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Queue or worker failure. Logged at the dispatch site.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable category name, for structured output.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Decode(_) => "decode",
            Error::InvalidInput(_) => "invalid_input",
            Error::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<secp256k1::Error> for Error {
    fn from(err: secp256k1::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl From<secp256k1::scalar::OutOfRangeError> for Error {
    fn from(err: secp256k1::scalar::OutOfRangeError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}
