//! Crate-wide error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::crypto::cipher::CipherError;
use crate::crypto::keys::KeyError;
use crate::crypto::session::SessionError;
use crate::text::codec::CodecError;
use crate::text::stealth::StealthError;

/// Any failure from the library, wrapping the per-module errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Stealth(#[from] StealthError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
