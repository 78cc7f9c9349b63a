use std::io;

use thiserror::Error;

/// Errors returned by the transmission engine.
///
/// Ordinary backpressure is never an error: a would-block outcome comes
/// back as a remaining chain with readiness cleared, and interrupted
/// transfers are retried within the same call. Every variant here means
/// the connection is unusable and should be torn down by the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The transfer syscall failed with an unexpected errno.
    #[error("transfer failed: {0}")]
    Transfer(io::Error),
    /// Enabling the packet-coalescing socket mode failed with a
    /// non-transient error. The mode is guaranteed to be supported
    /// whenever it is attempted, so this indicates a broken socket.
    #[error("packet coalescing setup failed: {0}")]
    Coalesce(io::Error),
    /// The event subsystem reported that the peer closed the connection.
    #[error("peer closed connection (errno {errno})")]
    PeerClosed {
        /// Errno delivered with the closure event (0 if none was given).
        errno: i32,
    },
    /// The kernel reported more bytes sent than the chain held. The
    /// chain state can no longer be trusted and is left as-is.
    #[error("kernel reported {sent} bytes sent but only {remaining} were pending")]
    ChainOverrun {
        /// Byte count reported by the transfer syscall.
        sent: u64,
        /// Bytes the chain actually held.
        remaining: u64,
    },
}
