//! Words-to-bytes utility command.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::Args;

use shitposter::Pipeline;

use super::{CommandExecutor, TextInput};

/// Convert codewords back to bytes. Non-codewords are skipped.
#[derive(Args, Debug)]
pub struct WordsToBytesCommand {
    #[command(flatten)]
    pub input: TextInput,

    /// Print base64 instead of hex
    #[arg(long, conflicts_with = "output")]
    pub base64: bool,

    /// Write raw bytes to this file instead of printing
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for WordsToBytesCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let text = self.input.read()?;
        let bytes = pipeline.codec().decode_strict(&text)?;

        if let Some(ref path) = self.output {
            fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
        } else if self.base64 {
            println!("{}", BASE64.encode(&bytes));
        } else {
            println!("{}", hex::encode(&bytes));
        }

        Ok(())
    }
}
