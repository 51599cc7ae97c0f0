use common::connection::ConnectionState;
use std::io;
use thiserror::Error;

/// Failure to establish the stream connection.
///
/// Connect errors are logged and followed by a delayed retry, they are never
/// reported to API callers.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("unknown service \"{0}\"")]
    UnknownService(String),

    #[error("can't resolve {target}: {source}")]
    Resolve {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("can't connect to {target}: no address accepted the connection")]
    Unreachable { target: String },

    #[error("can't send the watch command to {target}: {source}")]
    Handshake {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("connection attempt refused while {0}")]
    Busy(ConnectionState),
}

/// Failure of an established stream connection.
///
/// The connection is torn down and reconnected after a delay. Subscribers
/// stay registered.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("peer hung up")]
    Hangup,
}
