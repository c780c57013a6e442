//! Channel key command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use shitposter::{generate_channel_key, Pipeline};

use super::{write_secret, CommandExecutor};

/// Generate a random symmetric key for a one-to-many channel.
///
/// Anyone holding the key file can post and read on the channel.
#[derive(Args, Debug)]
pub struct ChannelKeyCommand {
    /// Output path for the raw key
    #[arg(short, long, default_value = "channel.key")]
    pub output: PathBuf,

    /// Overwrite an existing key file
    #[arg(long)]
    pub force: bool,

    /// Also print the key as codewords (for sharing over a private channel)
    #[arg(long)]
    pub show: bool,
}

impl CommandExecutor for ChannelKeyCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let key = generate_channel_key();
        write_secret(&self.output, &key, self.force).context("Failed to save channel key")?;

        eprintln!("Channel key saved to {}", self.output.display());
        if self.show {
            println!("{}", pipeline.codec().encode(&key));
        }

        Ok(())
    }
}
