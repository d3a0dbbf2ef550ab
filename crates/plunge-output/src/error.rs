//! Error types for snapshot and log output.

use std::fmt;
use std::io;

/// Errors that can occur while writing or reading output artifacts.
#[derive(Debug)]
pub enum OutputError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file does not start with the expected `b"PLNG"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// A snapshot or log row could not be decoded.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The marker checksum does not match the decoded markers.
    ChecksumMismatch {
        /// Frame index from the snapshot header.
        frame: u64,
        /// Checksum stored in the file.
        recorded: u64,
        /// Checksum recomputed from the decoded markers.
        computed: u64,
    },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"PLNG\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed output: {detail}"),
            Self::ChecksumMismatch {
                frame,
                recorded,
                computed,
            } => write!(
                f,
                "checksum mismatch in frame {frame}: \
                 recorded={recorded:#018x}, computed={computed:#018x}"
            ),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
