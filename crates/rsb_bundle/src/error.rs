//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
///
/// Every variant is fatal to an unpack run. The only recoverable anomaly, a packet whose
/// internal file list guard is not recognised, is logged and skipped by
/// [`crate::unpack::RsbUnpacker`] and never surfaces as an [`Error`].
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent warpper for [`flate2::DecompressError`]
    #[error(transparent)]
    DecompressError(#[from] flate2::DecompressError),

    /// Transparent warpper for [`serde_json::Error`]
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// read of {length} bytes at {offset:#x} exceeds buffer of {size:#x} bytes
    #[error("read of {length} bytes at {offset:#x} exceeds buffer of {size:#x} bytes")]
    OutOfRange {
        /// Absolute offset of the attempted read
        offset: u64,
        /// Number of bytes requested
        length: u64,
        /// Size of the underlying buffer
        size: u64,
    },

    /// header field {field} has stride {value:#x}, at least {minimum:#x} is required
    #[error("header field {field} has stride {value:#x}, at least {minimum:#x} is required")]
    InvalidStride {
        /// Name of the header field
        field: &'static str,
        /// Value found in the header
        value: u32,
        /// Smallest stride the reader can work with
        minimum: u32,
    },

    /// {0}
    #[error("{0}")]
    InvalidOffset(String),

    /// packet index {0} has no name in the packet name pool
    #[error("packet index {0} has no name in the packet name pool")]
    UnknownPacket(u32),

    /// zlib stream is incomplete after consuming {consumed} of {length} bytes
    #[error("zlib stream is incomplete after consuming {consumed} of {length} bytes")]
    TruncatedStream {
        /// Bytes handed to the inflater before it stalled
        consumed: u64,
        /// Size of the compressed region
        length: u64,
    },

    /// string pool entry at {offset:#x} is not terminated before the pool end at {end:#x}
    #[error("string pool entry at {offset:#x} is not terminated before the pool end at {end:#x}")]
    UnterminatedString {
        /// Offset where the unterminated string started
        offset: u64,
        /// Declared end of the pool
        end: u64,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
