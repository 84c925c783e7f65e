use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use secpgate::{encoding, Gateway, GatewayConfig};

#[derive(Parser)]
#[command(name = "secpgate")]
#[command(about = "secp256k1 key-operation gateway", long_about = None)]
struct Cli {
    /// Accept and print values as hex instead of base64 without padding
    #[arg(long, global = true)]
    hex: bool,

    /// Number of gateway worker threads
    #[arg(long, global = true, default_value_t = 1)]
    workers: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a compact ECDSA signature over a 32-byte digest
    Verify {
        /// Message digest (32 bytes)
        #[arg(long)]
        digest: String,

        /// Signature, compact r || s (64 bytes)
        #[arg(long)]
        signature: String,

        /// Public key (33 or 65 bytes)
        #[arg(long)]
        public_key: String,
    },

    /// Sign a 32-byte digest
    Sign {
        /// Message digest (32 bytes)
        #[arg(long)]
        digest: String,

        /// Private key (32 bytes)
        #[arg(long)]
        private_key: String,
    },

    /// Check that a private key is valid
    SecKeyVerify {
        /// Private key (32 bytes)
        #[arg(long)]
        private_key: String,
    },

    /// Derive the public key of a private key
    ComputePubkey {
        /// Private key (32 bytes)
        #[arg(long)]
        private_key: String,

        /// Emit the 65-byte uncompressed form
        #[arg(long)]
        uncompressed: bool,
    },

    /// Compute an ECDH shared secret
    Ecdh {
        /// Private key (32 bytes)
        #[arg(long)]
        private_key: String,

        /// Counterparty public key (33 or 65 bytes)
        #[arg(long)]
        public_key: String,
    },

    /// Tweak a private key by addition
    PrivTweakAdd {
        /// Private key (32 bytes)
        #[arg(long)]
        private_key: String,

        /// Tweak scalar (32 bytes)
        #[arg(long)]
        tweak: String,
    },

    /// Tweak a private key by multiplication
    PrivTweakMul {
        /// Private key (32 bytes)
        #[arg(long)]
        private_key: String,

        /// Tweak scalar (32 bytes)
        #[arg(long)]
        tweak: String,
    },

    /// Tweak a public key by addition
    PubTweakAdd {
        /// Public key (33 or 65 bytes)
        #[arg(long)]
        public_key: String,

        /// Tweak scalar (32 bytes)
        #[arg(long)]
        tweak: String,
    },

    /// Tweak a public key by multiplication
    PubTweakMul {
        /// Public key (33 or 65 bytes)
        #[arg(long)]
        public_key: String,

        /// Tweak scalar (32 bytes)
        #[arg(long)]
        tweak: String,

        /// Emit the 65-byte uncompressed form
        #[arg(long)]
        uncompressed: bool,
    },

    /// Generate a new random private key
    GenerateKey,

    /// Encrypt a message for a recipient (ECDH + ChaCha20-Poly1305)
    Encrypt {
        /// Sender private key (32 bytes)
        #[arg(long)]
        private_key: String,

        /// Recipient public key (33 or 65 bytes)
        #[arg(long)]
        public_key: String,

        /// Plaintext message (UTF-8)
        #[arg(long)]
        message: String,
    },

    /// Decrypt a message from a sender
    Decrypt {
        /// Recipient private key (32 bytes)
        #[arg(long)]
        private_key: String,

        /// Sender public key (33 or 65 bytes)
        #[arg(long)]
        public_key: String,

        /// Ciphertext payload (base64 without padding)
        #[arg(long)]
        ciphertext: String,
    },
}

#[derive(Serialize)]
struct OkOutput {
    result: serde_json::Value,
}

#[derive(Serialize)]
struct ErrOutput {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    category: &'static str,
    message: String,
}

/// Re-encode a CLI value into the gateway's base64 form when `--hex` is on.
fn input(value: &str, hex: bool) -> secpgate::Result<String> {
    if hex {
        Ok(encoding::encode(&encoding::decode_hex(value)?))
    } else {
        Ok(value.to_owned())
    }
}

/// Re-encode a gateway result for printing when `--hex` is on.
fn output(value: String, hex: bool) -> secpgate::Result<String> {
    if hex {
        Ok(encoding::encode_hex(&encoding::decode(&value)?))
    } else {
        Ok(value)
    }
}

async fn run(
    gateway: &Gateway,
    command: Commands,
    hex: bool,
) -> secpgate::Result<serde_json::Value> {
    match command {
        Commands::Verify {
            digest,
            signature,
            public_key,
        } => {
            let ok = gateway
                .verify(
                    &input(&digest, hex)?,
                    &input(&signature, hex)?,
                    &input(&public_key, hex)?,
                )
                .await?;
            Ok(json!(ok))
        }
        Commands::Sign {
            digest,
            private_key,
        } => {
            let signature = gateway
                .sign(&input(&digest, hex)?, &input(&private_key, hex)?)
                .await?;
            Ok(json!(output(signature, hex)?))
        }
        Commands::SecKeyVerify { private_key } => {
            let ok = gateway.sec_key_verify(&input(&private_key, hex)?).await?;
            Ok(json!(ok))
        }
        Commands::ComputePubkey {
            private_key,
            uncompressed,
        } => {
            let pubkey = gateway
                .compute_pubkey(&input(&private_key, hex)?, !uncompressed)
                .await?;
            Ok(json!(output(pubkey, hex)?))
        }
        Commands::Ecdh {
            private_key,
            public_key,
        } => {
            let secret = gateway
                .create_ecdh_secret(&input(&private_key, hex)?, &input(&public_key, hex)?)
                .await?;
            Ok(json!(output(secret, hex)?))
        }
        Commands::PrivTweakAdd { private_key, tweak } => {
            let tweaked = gateway
                .priv_key_tweak_add(&input(&private_key, hex)?, &input(&tweak, hex)?)
                .await?;
            Ok(json!(output(tweaked, hex)?))
        }
        Commands::PrivTweakMul { private_key, tweak } => {
            let tweaked = gateway
                .priv_key_tweak_mul(&input(&private_key, hex)?, &input(&tweak, hex)?)
                .await?;
            Ok(json!(output(tweaked, hex)?))
        }
        Commands::PubTweakAdd { public_key, tweak } => {
            let tweaked = gateway
                .pub_key_tweak_add(&input(&public_key, hex)?, &input(&tweak, hex)?)
                .await?;
            Ok(json!(output(tweaked, hex)?))
        }
        Commands::PubTweakMul {
            public_key,
            tweak,
            uncompressed,
        } => {
            let tweaked = gateway
                .pub_key_tweak_mul(
                    &input(&public_key, hex)?,
                    &input(&tweak, hex)?,
                    !uncompressed,
                )
                .await?;
            Ok(json!(output(tweaked, hex)?))
        }
        Commands::GenerateKey => {
            let key = gateway.generate_key().await?;
            Ok(json!(output(key, hex)?))
        }
        Commands::Encrypt {
            private_key,
            public_key,
            message,
        } => {
            let ciphertext = gateway
                .encrypt_ecdh(
                    &input(&private_key, hex)?,
                    &input(&public_key, hex)?,
                    &message,
                )
                .await?;
            Ok(json!(ciphertext))
        }
        Commands::Decrypt {
            private_key,
            public_key,
            ciphertext,
        } => {
            let plaintext = gateway
                .decrypt_ecdh(
                    &input(&private_key, hex)?,
                    &input(&public_key, hex)?,
                    &ciphertext,
                )
                .await?;
            Ok(json!(plaintext))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let gateway = Gateway::with_config(GatewayConfig {
        workers: cli.workers,
    });

    match run(&gateway, cli.command, cli.hex).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&OkOutput { result })?);
            Ok(())
        }
        Err(err) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&ErrOutput {
                    error: ErrorBody {
                        category: err.category(),
                        message: err.to_string(),
                    }
                })?
            );
            std::process::exit(1);
        }
    }
}
