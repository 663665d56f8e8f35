use std::sync::PoisonError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
    #[error("file name too long: {0}")]
    NameTooLong(String),
    #[error("I/O operation error: {0}")]
    IO(#[from] std::io::Error),
    #[error("bloom filter in file mismatches the current setup: {0}")]
    Mismatch(String),
    #[error("corrupted bloom files: {0}")]
    Corruption(String),
    #[error("bloom files already in use: {0}")]
    Locked(String),
    #[error("bloom filter not initialized.")]
    NotReady,
    #[error("{0}")]
    Poisoned(String),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(e: PoisonError<T>) -> Self {
        Self::Poisoned(e.to_string())
    }
}

pub type IResult<T> = std::result::Result<T, Error>;
