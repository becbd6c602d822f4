use std::path::PathBuf;

use thiserror::Error;

use super::symbols::{Bank, Offset};

pub type NlResult<T> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown error")]
    Unknown,
    #[error("A symbol already exists at offset ${0:04X}")]
    DuplicateOffset(Offset),
    #[error("A symbol named '{0}' already exists")]
    DuplicateName(String),
    #[error("No symbol at offset ${0:04X}")]
    SymbolNotFound(Offset),
    #[error("No symbol page for bank {0}")]
    PageNotFound(Bank),
    #[error("No program image is loaded")]
    NoImage,
    #[error("NL file {0:?} not found")]
    NlFileNotFound(PathBuf),
    #[error("Invalid offset")]
    InvalidOffset,
    #[error("Missing field delimiter following offset ${0:X}")]
    MissingOffsetDelimiter(Offset),
    #[error("Missing field delimiter following name '{0}'")]
    MissingNameDelimiter(String),
    #[error("Element {1} of the array at offset ${0:04X} overflows the offset range")]
    OffsetOverflow(Offset, u32),
    #[error("No symbol named '{0}'")]
    SymbolNameNotFound(String),
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Insufficient arguments")]
    InsufficientArguments,
    #[error("Too many arguments")]
    TooManyArguments,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Ron(#[from] ron::Error),
}
