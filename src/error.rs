use std::path::PathBuf;

use thiserror::Error;

/// Error type for codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid symbol {symbol:?} at line {line}, column {column}")]
    InvalidSymbol {
        symbol: char,
        line: usize,
        column: usize,
    },
    #[error("byte {byte} at offset {offset} is not a packed codon")]
    InvalidByte { offset: usize, byte: u8 },
    #[error("symbol stream of length {0} is not a multiple of 3")]
    Unaligned(usize),
}

/// Error type for the batch pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Raw input directory does not exist; nothing is processed.
    #[error("input directory {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error("output directory {} is not empty (pass overwrite to replace it)", .0.display())]
    DestinationNotEmpty(PathBuf),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot extract archive {}: {source}", path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
