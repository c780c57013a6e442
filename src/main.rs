//! Shitposter - encrypted messages that look like tech chatter
//!
//! A CLI for posting end-to-end encrypted messages on public forums,
//! rendered as jargon words and optionally wrapped in filler prose.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use shitposter::{CipherConfig, CipherSuite, Pipeline, ProtocolVersion};

use commands::{
    AutoReplyCommand, ChannelKeyCommand, CommandExecutor, DecryptCommand, DeriveCommand,
    EncryptCommand, FingerprintCommand, KeygenCommand, ScanCommand, WordsToBytesCommand,
};

/// Shitposter - encrypted messages that look like tech chatter
///
/// Keys and ciphertext are rendered as words from a 256-word tech vocabulary.
/// Messages can be wrapped in filler sentences so a thread reads as ordinary
/// complaining about infrastructure.
#[derive(Parser)]
#[command(name = "shitposter")]
#[command(version)]
#[command(about = "Encrypted messages disguised as tech chatter")]
#[command(long_about = None)]
struct Cli {
    /// Config file (default: ~/.shitposter/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the session protocol: v1-shared or v2-directional
    #[arg(long, global = true)]
    protocol: Option<ProtocolVersion>,

    /// Override the payload cipher: aes-256-gcm or chacha20-poly1305
    #[arg(long, global = true)]
    suite: Option<CipherSuite>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new identity key pair
    Keygen(KeygenCommand),

    /// Derive session keys from a peer's posted public key
    Derive(DeriveCommand),

    /// Encrypt a message for posting
    Encrypt(EncryptCommand),

    /// Decrypt a posted message
    Decrypt(DecryptCommand),

    /// Find public keys and messages in a thread
    Scan(ScanCommand),

    /// Reply with an encrypted welcome to every public key in a thread
    AutoReply(AutoReplyCommand),

    /// Show a session fingerprint for out-of-band verification
    Fingerprint(FingerprintCommand),

    /// Generate a random channel key
    ChannelKey(ChannelKeyCommand),

    /// Convert codewords to bytes
    WordsToBytes(WordsToBytesCommand),
}

impl Commands {
    fn executor(&self) -> &dyn CommandExecutor {
        match self {
            Commands::Keygen(cmd) => cmd,
            Commands::Derive(cmd) => cmd,
            Commands::Encrypt(cmd) => cmd,
            Commands::Decrypt(cmd) => cmd,
            Commands::Scan(cmd) => cmd,
            Commands::AutoReply(cmd) => cmd,
            Commands::Fingerprint(cmd) => cmd,
            Commands::ChannelKey(cmd) => cmd,
            Commands::WordsToBytes(cmd) => cmd,
        }
    }
}

fn load_config(cli: &Cli) -> Result<CipherConfig> {
    let path = match cli.config {
        Some(ref path) => path.clone(),
        None => CipherConfig::config_path().context("Failed to locate config")?,
    };
    let mut config = CipherConfig::load_from(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;

    match cli.protocol {
        Some(protocol) => config.protocol = protocol,
        None if !CipherConfig::declares_protocol(&path)? => warn!(
            protocol = %config.protocol,
            "No protocol set in config or via --protocol, using the default"
        ),
        None => {}
    }
    if let Some(suite) = cli.suite {
        config.suite = suite;
    }

    debug!(protocol = %config.protocol, suite = ?config.suite, "Effective config");
    Ok(config)
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for piping
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "shitposter=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    cli.command.executor().execute(&pipeline)
}
