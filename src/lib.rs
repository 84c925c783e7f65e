//! Asynchronous secp256k1 key-operation gateway.
//!
//! Marshals base64-encoded keys, digests, signatures and tweaks across an
//! async boundary and delegates every curve operation to libsecp256k1 (via
//! the [`secp256k1`] crate). Nothing in this crate does its own curve math.
//!
//! Every encoded value uses base64 with the standard alphabet, **without
//! padding and without line wrapping**; decoders reject anything else —
//! including wrong byte lengths — before the library sees the bytes.
//!
//! ```no_run
//! use secpgate::Gateway;
//!
//! # async fn demo() -> secpgate::Result<()> {
//! let gateway = Gateway::new();
//! let seckey = gateway.generate_key().await?;
//! let pubkey = gateway.compute_pubkey(&seckey, true).await?;
//! assert!(gateway.sec_key_verify(&seckey).await?);
//! # Ok(())
//! # }
//! ```

pub mod ecies;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod gateway;

pub use engine::Engine;
pub use error::{Error, Result};
pub use gateway::{Gateway, GatewayConfig};
