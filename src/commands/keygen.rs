//! Key generation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use shitposter::{IdentityKeyPair, Pipeline};

use super::{write_secret, CommandExecutor};

/// Generate a new identity key pair.
///
/// The private key is written as 32 raw bytes with owner-only permissions.
/// The public key is printed as 32 codewords, ready to post.
#[derive(Args, Debug)]
pub struct KeygenCommand {
    /// Output path for the private key
    #[arg(short, long, default_value = "identity.key")]
    pub output: PathBuf,

    /// Overwrite an existing key file
    #[arg(long)]
    pub force: bool,
}

impl CommandExecutor for KeygenCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let identity = IdentityKeyPair::generate();
        write_secret(&self.output, &identity.private_bytes(), self.force)
            .context("Failed to save private key")?;
        info!(path = %self.output.display(), "Wrote private key");

        eprintln!("Private key: {}", self.output.display());
        eprintln!("Keep it secret. Post the words below as your public key:");
        eprintln!();
        println!("{}", pipeline.codec().encode(&identity.public_bytes()));

        Ok(())
    }
}
