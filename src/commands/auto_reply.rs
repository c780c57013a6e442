//! Auto-reply command - answer every public key in a thread.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use shitposter::{Pipeline, Rendering, DEFAULT_WELCOME};

use super::{load_identity, CommandExecutor, TextInput};

/// Prepare an encrypted welcome for every public key posted in a thread.
#[derive(Args, Debug)]
pub struct AutoReplyCommand {
    /// Path to your private key
    #[arg(short, long)]
    pub key: PathBuf,

    #[command(flatten)]
    pub input: TextInput,

    /// Message to send to each peer
    #[arg(short, long, default_value = DEFAULT_WELCOME)]
    pub welcome: String,

    /// Emit bare codewords instead of stealth prose
    #[arg(long)]
    pub plain: bool,
}

impl CommandExecutor for AutoReplyCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let identity = load_identity(&self.key)?;
        let text = self.input.read()?;
        let rendering = if self.plain {
            Rendering::Words
        } else {
            Rendering::Stealth
        };

        let replies = pipeline.auto_reply(&identity, &text, &self.welcome, rendering)?;
        if replies.is_empty() {
            eprintln!("No public keys found.");
            return Ok(());
        }

        for reply in &replies {
            println!("--- Reply to {} ---", reply.peer_prefix);
            println!("{}", reply.text);
            println!();
        }

        Ok(())
    }
}
