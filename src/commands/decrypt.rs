//! Decrypt command.

use anyhow::{Context, Result};
use clap::Args;

use shitposter::Pipeline;

use super::{CommandExecutor, KeySource, TextInput};

/// Decrypt a posted message. Filler prose around the codewords is ignored.
#[derive(Args, Debug)]
pub struct DecryptCommand {
    #[command(flatten)]
    pub keys: KeySource,

    #[command(flatten)]
    pub input: TextInput,
}

impl CommandExecutor for DecryptCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let keys = self.keys.load()?;
        let text = self.input.read()?;
        let plaintext = pipeline
            .open_with_keys(&keys, &text)
            .context("Could not decrypt (wrong session or not a message for you)")?;
        println!("{}", plaintext);
        Ok(())
    }
}
