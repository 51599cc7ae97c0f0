use std::fmt;

/// Lifecycle state of the stream connection to the position source.
///
/// The states are traversed cyclically while the process runs:
/// `Disconnected → Connecting → Connected → Closing → Disconnected`.
/// A failed connection attempt goes straight back from `Connecting`
/// to `Disconnected`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Closing => "closing",
        };
        f.write_str(name)
    }
}
