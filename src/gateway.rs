//! Asynchronous dispatch of key operations.
//!
//! The gateway owns a pool of worker threads draining a job queue. A call
//! enqueues its job and immediately returns a future; decoding, delegation
//! and encoding all happen on a worker, so the caller's thread is never
//! blocked by cryptographic work. Failures resolve the same future with a
//! structured [`Error`] — they are logged, never panicked.
//!
//! The default configuration runs a single worker, which serializes
//! operations. The underlying context is immutable after its one-time
//! randomization and safe to share, so more workers only add parallelism;
//! no ordering is guaranteed between independent calls either way.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tokio::sync::{mpsc, oneshot};
use zeroize::Zeroizing;

use crate::ecies;
use crate::encoding::{self, DIGEST_LEN, SECRET_KEY_LEN, SIGNATURE_LEN, TWEAK_LEN};
use crate::engine::Engine;
use crate::error::{Error, Result};

type Job = Box<dyn FnOnce(&Engine) + Send>;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Number of worker threads draining the queue. Zero is treated as one.
    pub workers: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// The caller-facing surface. All inputs and outputs are base64 without
/// padding; see [`crate::encoding`].
///
/// Dropping the gateway closes the queues; workers finish the jobs already
/// enqueued and exit. There is no cancellation — a dispatched job runs to
/// completion, and dropping a result future only discards the reply.
pub struct Gateway {
    senders: Vec<mpsc::UnboundedSender<Job>>,
    next: AtomicUsize,
}

impl Gateway {
    /// Gateway over the process-wide engine with a single worker.
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    /// Gateway over the process-wide engine with an explicit pool size.
    pub fn with_config(config: GatewayConfig) -> Self {
        let engine = Engine::global();
        let workers = config.workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        for id in 0..workers {
            let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
            thread::Builder::new()
                .name(format!("secpgate-worker-{id}"))
                .spawn(move || {
                    tracing::debug!(worker = id, "worker started");
                    while let Some(job) = rx.blocking_recv() {
                        job(engine);
                    }
                    tracing::debug!(worker = id, "worker stopped");
                })
                .expect("spawning a gateway worker thread");
            senders.push(tx);
        }
        Self {
            senders,
            next: AtomicUsize::new(0),
        }
    }

    async fn dispatch<T, F>(&self, op: &'static str, work: F) -> Result<T>
    where
        F: FnOnce(&Engine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |engine| {
            let _ = reply_tx.send(work(engine));
        });
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        self.senders[slot]
            .send(job)
            .map_err(|_| Error::Internal(format!("{op}: worker queue closed")))?;
        let result = reply_rx
            .await
            .map_err(|_| Error::Internal(format!("{op}: worker dropped the reply")))?;
        if let Err(err) = &result {
            tracing::warn!(op, category = err.category(), %err, "operation failed");
        }
        result
    }

    /// ECDSA verification: `true` only for a valid compact signature over
    /// `digest` by `pubkey`.
    pub async fn verify(&self, digest: &str, signature: &str, pubkey: &str) -> Result<bool> {
        let digest = digest.to_owned();
        let signature = signature.to_owned();
        let pubkey = pubkey.to_owned();
        self.dispatch("verify", move |engine| {
            let digest = encoding::decode_array::<DIGEST_LEN>("digest", &digest)?;
            let signature = encoding::decode_array::<SIGNATURE_LEN>("signature", &signature)?;
            let pubkey = encoding::decode_pubkey(&pubkey)?;
            engine.verify(&digest, &signature, &pubkey)
        })
        .await
    }

    /// Sign a 32-byte digest; returns the compact signature.
    pub async fn sign(&self, digest: &str, seckey: &str) -> Result<String> {
        let digest = digest.to_owned();
        let seckey = seckey.to_owned();
        self.dispatch("sign", move |engine| {
            let digest = encoding::decode_array::<DIGEST_LEN>("digest", &digest)?;
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            let signature = engine.sign(&digest, &seckey)?;
            Ok(encoding::encode(&signature))
        })
        .await
    }

    /// Whether the bytes are a valid private key.
    pub async fn sec_key_verify(&self, seckey: &str) -> Result<bool> {
        let seckey = seckey.to_owned();
        self.dispatch("sec_key_verify", move |engine| {
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            Ok(engine.sec_key_verify(&seckey))
        })
        .await
    }

    /// Derive the public key of a private key.
    pub async fn compute_pubkey(&self, seckey: &str, compressed: bool) -> Result<String> {
        let seckey = seckey.to_owned();
        self.dispatch("compute_pubkey", move |engine| {
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            let pubkey = engine.compute_pubkey(&seckey, compressed)?;
            Ok(encoding::encode(&pubkey))
        })
        .await
    }

    /// ECDH shared secret between a private and a public key.
    pub async fn create_ecdh_secret(&self, seckey: &str, pubkey: &str) -> Result<String> {
        let seckey = seckey.to_owned();
        let pubkey = pubkey.to_owned();
        self.dispatch("create_ecdh_secret", move |engine| {
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            let pubkey = encoding::decode_pubkey(&pubkey)?;
            let secret = Zeroizing::new(engine.create_ecdh_secret(&seckey, &pubkey)?);
            Ok(encoding::encode(&*secret))
        })
        .await
    }

    /// Tweak a private key by addition.
    pub async fn priv_key_tweak_add(&self, seckey: &str, tweak: &str) -> Result<String> {
        let seckey = seckey.to_owned();
        let tweak = tweak.to_owned();
        self.dispatch("priv_key_tweak_add", move |engine| {
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            let tweak = Zeroizing::new(encoding::decode_array::<TWEAK_LEN>("tweak", &tweak)?);
            let tweaked = Zeroizing::new(engine.priv_key_tweak_add(&seckey, &tweak)?);
            Ok(encoding::encode(&*tweaked))
        })
        .await
    }

    /// Tweak a private key by multiplication.
    pub async fn priv_key_tweak_mul(&self, seckey: &str, tweak: &str) -> Result<String> {
        let seckey = seckey.to_owned();
        let tweak = tweak.to_owned();
        self.dispatch("priv_key_tweak_mul", move |engine| {
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            let tweak = Zeroizing::new(encoding::decode_array::<TWEAK_LEN>("tweak", &tweak)?);
            let tweaked = Zeroizing::new(engine.priv_key_tweak_mul(&seckey, &tweak)?);
            Ok(encoding::encode(&*tweaked))
        })
        .await
    }

    /// Tweak a public key by addition. The result keeps the serialized
    /// form of the input key.
    pub async fn pub_key_tweak_add(&self, pubkey: &str, tweak: &str) -> Result<String> {
        let pubkey = pubkey.to_owned();
        let tweak = tweak.to_owned();
        self.dispatch("pub_key_tweak_add", move |engine| {
            let pubkey = encoding::decode_pubkey(&pubkey)?;
            let tweak = encoding::decode_array::<TWEAK_LEN>("tweak", &tweak)?;
            let tweaked = engine.pub_key_tweak_add(&pubkey, &tweak)?;
            Ok(encoding::encode(&tweaked))
        })
        .await
    }

    /// Tweak a public key by multiplication, serialized per `compressed`.
    pub async fn pub_key_tweak_mul(
        &self,
        pubkey: &str,
        tweak: &str,
        compressed: bool,
    ) -> Result<String> {
        let pubkey = pubkey.to_owned();
        let tweak = tweak.to_owned();
        self.dispatch("pub_key_tweak_mul", move |engine| {
            let pubkey = encoding::decode_pubkey(&pubkey)?;
            let tweak = encoding::decode_array::<TWEAK_LEN>("tweak", &tweak)?;
            let tweaked = engine.pub_key_tweak_mul(&pubkey, &tweak, compressed)?;
            Ok(encoding::encode(&tweaked))
        })
        .await
    }

    /// Generate a new random private key.
    pub async fn generate_key(&self) -> Result<String> {
        self.dispatch("generate_key", move |engine| {
            let key = Zeroizing::new(engine.generate_key());
            Ok(encoding::encode(&*key))
        })
        .await
    }

    /// Encrypt a UTF-8 message for the holder of `pubkey`'s private key.
    pub async fn encrypt_ecdh(
        &self,
        seckey: &str,
        pubkey: &str,
        plaintext: &str,
    ) -> Result<String> {
        let seckey = seckey.to_owned();
        let pubkey = pubkey.to_owned();
        let plaintext = plaintext.to_owned();
        self.dispatch("encrypt_ecdh", move |engine| {
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            let pubkey = encoding::decode_pubkey(&pubkey)?;
            let secret = Zeroizing::new(engine.create_ecdh_secret(&seckey, &pubkey)?);
            ecies::encrypt(plaintext.as_bytes(), &secret)
        })
        .await
    }

    /// Decrypt a message produced by [`Gateway::encrypt_ecdh`] with the
    /// counterpart key pair.
    pub async fn decrypt_ecdh(
        &self,
        seckey: &str,
        pubkey: &str,
        ciphertext: &str,
    ) -> Result<String> {
        let seckey = seckey.to_owned();
        let pubkey = pubkey.to_owned();
        let ciphertext = ciphertext.to_owned();
        self.dispatch("decrypt_ecdh", move |engine| {
            let seckey =
                Zeroizing::new(encoding::decode_array::<SECRET_KEY_LEN>("private key", &seckey)?);
            let pubkey = encoding::decode_pubkey(&pubkey)?;
            let secret = Zeroizing::new(engine.create_ecdh_secret(&seckey, &pubkey)?);
            let plaintext = ecies::decrypt(&ciphertext, &secret)?;
            String::from_utf8(plaintext)
                .map_err(|_| Error::InvalidInput("decrypted payload is not UTF-8".into()))
        })
        .await
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}
