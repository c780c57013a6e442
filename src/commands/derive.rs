//! Session derivation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use shitposter::{fingerprint, Pipeline};

use super::{load_identity, write_secret, CommandExecutor, TextInput};

/// Derive session keys with a peer from their posted public key.
///
/// The peer's key is read as codewords; surrounding chatter is ignored.
/// Compare the printed fingerprint with your peer over another channel.
#[derive(Args, Debug)]
pub struct DeriveCommand {
    /// Path to your private key
    #[arg(short, long)]
    pub key: PathBuf,

    #[command(flatten)]
    pub peer: TextInput,

    /// Output path for the session file
    #[arg(short, long, default_value = "session.json")]
    pub output: PathBuf,

    /// Overwrite an existing session file
    #[arg(long)]
    pub force: bool,
}

impl CommandExecutor for DeriveCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let identity = load_identity(&self.key)?;
        let peer_text = self.peer.read()?;
        let peer_public = pipeline
            .codec()
            .decode_public_key(&peer_text)
            .context("Peer public key must be exactly 32 codewords")?;

        let keys = pipeline.derive(&identity, &peer_public)?;
        write_secret(&self.output, &keys.export(), self.force)
            .context("Failed to save session")?;
        info!(protocol = %keys.protocol(), path = %self.output.display(), "Wrote session");

        eprintln!("Session ({}) saved to {}", keys.protocol(), self.output.display());
        println!("Fingerprint: {}", fingerprint(&keys));

        Ok(())
    }
}
