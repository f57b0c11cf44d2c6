use core::fmt::Display;

/// Errors reported by fallible table construction and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The input sequence had no entry at `index`.
    MissingEntry {
        /// Position of the first absent entry in the input.
        index: usize,
    },
    /// The destination buffer cannot hold `len` entries starting at `offset`.
    FillOutOfBounds {
        /// Requested start position in the destination.
        offset: usize,
        /// Number of entries that needed to be written.
        len: usize,
        /// Length of the destination buffer.
        buffer_len: usize,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MissingEntry { index } => {
                write!(f, "missing entry at input position {}", index)
            }
            Error::FillOutOfBounds {
                offset,
                len,
                buffer_len,
            } => write!(
                f,
                "cannot fill {} entries at offset {} into a buffer of length {}",
                len, offset, buffer_len
            ),
        }
    }
}

impl core::error::Error for Error {}
