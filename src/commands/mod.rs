//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! Shared file and input handling lives here.

mod auto_reply;
mod channel_key;
mod decrypt;
mod derive;
mod encrypt;
mod fingerprint;
mod keygen;
mod scan;
mod words_to_bytes;

pub use auto_reply::AutoReplyCommand;
pub use channel_key::ChannelKeyCommand;
pub use decrypt::DecryptCommand;
pub use derive::DeriveCommand;
pub use encrypt::EncryptCommand;
pub use fingerprint::FingerprintCommand;
pub use keygen::KeygenCommand;
pub use scan::ScanCommand;
pub use words_to_bytes::WordsToBytesCommand;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use shitposter::crypto::keys::KEY_SIZE;
use shitposter::{IdentityKeyPair, Pipeline, SessionKeys};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic against a configured pipeline.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self, pipeline: &Pipeline) -> Result<()>;
}

/// Text input: positional argument, `--file`, or stdin.
#[derive(Args, Debug)]
pub struct TextInput {
    /// Text to process (reads stdin when neither this nor --file is given)
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl TextInput {
    pub fn read(&self) -> Result<String> {
        if let Some(ref text) = self.text {
            return Ok(text.clone());
        }
        if let Some(ref path) = self.file {
            return fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }

        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    }
}

/// Which symmetric keys to use: a derived session or a broadcast channel key.
#[derive(Args, Debug)]
pub struct KeySource {
    /// Session file written by `derive`
    #[arg(short, long, conflicts_with = "channel")]
    pub session: Option<PathBuf>,

    /// Channel key file written by `channel-key`
    #[arg(short, long)]
    pub channel: Option<PathBuf>,
}

impl KeySource {
    /// Loads the keys, or `None` if neither option was given.
    pub fn load_optional(&self) -> Result<Option<SessionKeys>> {
        if let Some(ref path) = self.session {
            return load_session(path).map(Some);
        }
        if let Some(ref path) = self.channel {
            let key = read_key_file(path)?;
            return Ok(Some(SessionKeys::shared(key)));
        }
        Ok(None)
    }

    pub fn load(&self) -> Result<SessionKeys> {
        match self.load_optional()? {
            Some(keys) => Ok(keys),
            None => bail!("Either --session or --channel is required"),
        }
    }
}

/// Reads a raw 32-byte key file.
pub fn read_key_file(path: &Path) -> Result<[u8; KEY_SIZE]> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read key file {}", path.display()))?;
    if bytes.len() != KEY_SIZE {
        bail!(
            "Key file {} must be exactly {} bytes, got {}",
            path.display(),
            KEY_SIZE,
            bytes.len()
        );
    }
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Loads an identity from a raw private key file.
pub fn load_identity(path: &Path) -> Result<IdentityKeyPair> {
    let bytes = read_key_file(path)?;
    IdentityKeyPair::load(&bytes).context("Invalid private key")
}

/// Loads a session file written by `derive`.
pub fn load_session(path: &Path) -> Result<SessionKeys> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read session file {}", path.display()))?;
    SessionKeys::import(&bytes).context("Invalid session file")
}

/// Writes secret material with owner-only permissions.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_secret(path: &Path, bytes: &[u8], force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    // Set restrictive permissions on secret files (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
