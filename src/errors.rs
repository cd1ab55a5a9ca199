use thiserror::Error;

use crate::{apk::ContainerError, dex::DexError};

/// Why a package load was aborted. No partial index is ever published.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read package: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("Failed to parse DEX file: {0}")]
    Decode(#[from] DexError),
}
