//! Error types for the DHCP responder.
//!
//! All fallible operations in this crate return [`Result<T>`], which uses
//! the [`Error`] enum for error variants.
//!
//! Protocol-level failures (malformed options, exhausted lease table, a
//! REQUEST aimed at another server) never escape the message engine: per the
//! wire protocol the server stays silent and the client retransmits. The
//! variants below still distinguish them so tests and logs can tell the
//! cases apart.

use crate::options::OptionTag;

/// Errors that can occur during server operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File system or network I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config file).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid server configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Socket creation or configuration error.
    ///
    /// Typically occurs when binding to port 67 without sufficient
    /// privileges.
    #[error("Socket error: {0}")]
    Socket(String),

    /// Malformed DHCP message header.
    ///
    /// Covers datagrams outside the accepted size range and bad magic
    /// cookies.
    #[error("Invalid DHCP message: {0}")]
    InvalidMessage(String),

    /// A searched-for option was not present in the options area.
    #[error("Option {0:?} not found")]
    OptionNotFound(OptionTag),

    /// The searched-for option declares more data bytes than remain in the
    /// buffer.
    #[error("Option {tag:?} declares {declared} bytes but only {remaining} remain")]
    MalformedOption {
        tag: OptionTag,
        declared: usize,
        remaining: usize,
    },

    /// An option value slice has the wrong width for the requested type.
    #[error("Option value is {actual} bytes, expected {expected}")]
    ValueWidth { expected: usize, actual: usize },
}

/// A specialized Result type for DHCP operations.
pub type Result<T> = std::result::Result<T, Error>;
