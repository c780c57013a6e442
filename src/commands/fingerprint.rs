//! Fingerprint command - display a session fingerprint for verification.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use shitposter::crypto::fingerprint::fingerprint_symbols;
use shitposter::Pipeline;

use super::{load_session, CommandExecutor};

/// Display a session's fingerprint for out-of-band verification.
///
/// Read the symbols to your peer over a separate channel (phone call,
/// in person). Both sides must see the same four symbols; a mismatch
/// means someone swapped a public key.
#[derive(Args, Debug)]
pub struct FingerprintCommand {
    /// Path to the session file
    #[arg(required = true)]
    pub session: PathBuf,

    /// Print the symbols one per line
    #[arg(long)]
    pub vertical: bool,
}

impl CommandExecutor for FingerprintCommand {
    fn execute(&self, _pipeline: &Pipeline) -> Result<()> {
        let keys = load_session(&self.session)?;
        let symbols = fingerprint_symbols(&keys);

        if self.vertical {
            for symbol in symbols {
                println!("{}", symbol);
            }
        } else {
            println!("{}", symbols.join(" "));
        }

        Ok(())
    }
}
