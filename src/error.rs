//! Error types for HZIP compression and decompression.

use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a compression or decompression run.
#[derive(Debug, Error)]
pub enum Error {
    /// The container header is structurally invalid (bad magic, unsupported
    /// version, truncated field, out-of-range value).
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The code length table cannot describe a valid prefix code.
    #[error("invalid canonical table: {0}")]
    InvalidCanonicalTable(String),

    /// The payload ran out of bits before the declared size was reached.
    #[error("truncated bitstream: decoded {decoded} of {expected} bytes")]
    TruncatedBitstream { decoded: u64, expected: u64 },

    /// A byte with no assigned code was seen while encoding.
    #[error("byte 0x{0:02x} has no canonical code")]
    UnencodableByte(u8),

    /// A caller-supplied argument or configuration value was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Failure of the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedHeader(message.into())
    }

    pub(crate) fn invalid_table(message: impl Into<String>) -> Self {
        Error::InvalidCanonicalTable(message.into())
    }
}
