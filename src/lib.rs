//! drainline — zero-copy output transmission for non-blocking sockets.
//!
//! drainline is the output half of a connection I/O layer: it takes a
//! chain of pending output segments (in-memory buffers and byte ranges
//! of open files) and pushes as much as the kernel will currently
//! accept onto a non-blocking socket, using the combined
//! header/file/trailer zero-copy primitive where the platform has one
//! and scatter-gather writes otherwise.
//!
//! The engine never decides *what* to send and never blocks: callers
//! assemble the chain, an external event mechanism reports when the
//! socket is writable, and [`send_chain`] absorbs partial transfers,
//! interrupted syscalls, and backpressure in between. Backpressure is
//! a normal outcome — the remaining chain comes back with readiness
//! cleared, and the caller re-invokes after the next writability
//! event.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::os::fd::AsRawFd;
//!
//! use drainline::{ChainBuilder, Connection, Platform, SegmentArena, SocketTransport, send_chain};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = std::net::TcpStream::connect("127.0.0.1:8080")?;
//!     stream.set_nonblocking(true)?;
//!
//!     let mut arena = SegmentArena::new();
//!     let head = ChainBuilder::new(&mut arena)
//!         .memory(bytes::Bytes::from_static(b"HTTP/1.1 200 OK\r\n\r\n"))
//!         .finish();
//!
//!     let mut conn = Connection::new(stream.as_raw_fd());
//!     conn.write_ready = true; // normally set by the event loop
//!     let mut transport = SocketTransport::new(conn.fd());
//!
//!     let remaining = send_chain(
//!         &mut conn,
//!         &mut transport,
//!         &mut arena,
//!         head,
//!         &Platform::default(),
//!     )?;
//!     assert!(remaining.is_none() || !conn.write_ready);
//!     Ok(())
//! }
//! ```
//!
//! # Platform
//!
//! Unix only. FreeBSD, DragonFly, and macOS use the combined
//! header/file/trailer `sendfile(2)`; Linux alternates `writev(2)` and
//! plain `sendfile(2)`, one syscall per attempt.

// ── Internal modules ────────────────────────────────────────────────────
pub(crate) mod gather;

// ── Public modules ──────────────────────────────────────────────────────
pub mod chain;
pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod segment;
pub mod send;
pub mod transfer;

// ── Re-exports ──────────────────────────────────────────────────────────

/// Fluent chain assembly on a [`SegmentArena`].
pub use chain::ChainBuilder;
/// Slot arena holding chain segments.
pub use chain::SegmentArena;
/// Stable handle to a chain segment.
pub use chain::SegmentId;
/// Platform capability flags.
pub use config::Platform;
/// Per-connection transmission state.
pub use connection::Connection;
/// Engine errors. Fatal only — backpressure is not an error.
pub use error::Error;
/// One node of an output chain.
pub use segment::Segment;
/// Drain a chain onto a connection's socket.
pub use send::send_chain;
/// Production transport over a socket fd.
pub use transfer::SocketTransport;
/// Raw outcome of one transfer syscall.
pub use transfer::Transfer;
/// Classification of a transfer syscall result.
pub use transfer::TransferStatus;
/// The transfer primitives the engine drives.
pub use transfer::Transport;
