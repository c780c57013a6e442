//! Scan command - find codeword sequences in a thread.

use anyhow::Result;
use clap::Args;

use shitposter::text::scanner::{CandidateOrigin, TrialDecryption};
use shitposter::Pipeline;

use super::{CommandExecutor, KeySource, TextInput};

/// Scan text for public keys and messages.
///
/// With --session or --channel, every message candidate is trial-decrypted.
#[derive(Args, Debug)]
pub struct ScanCommand {
    #[command(flatten)]
    pub keys: KeySource,

    #[command(flatten)]
    pub input: TextInput,

    /// Number of words to show per candidate
    #[arg(long, default_value = "6")]
    pub preview: usize,
}

impl CommandExecutor for ScanCommand {
    fn execute(&self, pipeline: &Pipeline) -> Result<()> {
        let text = self.input.read()?;
        let scanner = pipeline.scanner();
        let report = match self.keys.load_optional()? {
            Some(keys) => scanner.scan_with_key(&text, &keys.rx, &pipeline.cipher()),
            None => scanner.scan(&text),
        };

        println!(
            "Scanned {} tokens, {} candidate(s)",
            report.tokens_scanned,
            report.candidates.len()
        );

        for (i, candidate) in report.candidates.iter().enumerate() {
            let origin = match candidate.origin {
                CandidateOrigin::Contiguous => "contiguous",
                CandidateOrigin::Sparse => "sparse",
            };
            println!();
            println!(
                "[{}] {} ({} words, {})",
                i + 1,
                candidate.kind,
                candidate.len(),
                origin
            );
            println!("    {}", candidate.preview(self.preview));

            match &candidate.decryption {
                Some(TrialDecryption::Decrypted(plaintext)) => {
                    println!("    DECRYPTED: {}", plaintext)
                }
                Some(TrialDecryption::Failed) => println!("    (not for this key)"),
                None => {}
            }
        }

        Ok(())
    }
}
