//! Encrypt command - seal a message for posting.

use anyhow::Result;
use clap::Args;

use shitposter::{Pipeline, Rendering};

use super::{CommandExecutor, KeySource, TextInput};

/// Encrypt a message and render it as codewords or stealth prose.
#[derive(Args, Debug)]
pub struct EncryptCommand {
    #[command(flatten)]
    pub keys: KeySource,

    #[command(flatten)]
    pub message: TextInput,

    /// Wrap the codewords in filler sentences
    #[arg(long)]
    pub stealth: bool,
}

impl CommandExecutor for EncryptCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let keys = self.keys.load()?;
        let message = self.message.read()?;
        let rendering = if self.stealth {
            Rendering::Stealth
        } else {
            Rendering::Words
        };

        let text = pipeline.seal_with_keys(&keys, &message, rendering, &mut rand::thread_rng())?;
        println!("{}", text);
        Ok(())
    }
}
