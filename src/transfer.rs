//! The transfer syscall seam.
//!
//! [`Transport`] abstracts the two kernel primitives the engine
//! dispatches to: the combined header/file/trailer zero-copy transfer
//! and the scatter-gather write. [`SocketTransport`] is the production
//! implementation over a non-blocking socket fd; tests substitute
//! scripted implementations.

use std::io;
use std::os::fd::RawFd;

/// Raw outcome of one transfer syscall.
#[derive(Debug)]
pub struct Transfer {
    /// Bytes the kernel reports as actually sent. A partial count
    /// accompanies [`TransferStatus::Interrupted`] and
    /// [`TransferStatus::WouldBlock`] as well as success.
    pub sent: u64,
    pub status: TransferStatus,
}

impl Transfer {
    /// A successful call that moved `sent` bytes.
    pub fn complete(sent: u64) -> Self {
        Transfer {
            sent,
            status: TransferStatus::Complete,
        }
    }
}

/// Classification of a transfer syscall result.
#[derive(Debug)]
pub enum TransferStatus {
    /// The call returned without error, whatever the byte count.
    Complete,
    /// The call was interrupted by a signal; retry immediately.
    Interrupted,
    /// The socket cannot accept more data right now; wait for the next
    /// writability event. Not an error.
    WouldBlock,
    /// Any other failure. The connection is unusable.
    Failed(io::Error),
}

/// Classify an errno from a transfer syscall.
pub(crate) fn classify(err: io::Error) -> TransferStatus {
    match err.kind() {
        io::ErrorKind::Interrupted => TransferStatus::Interrupted,
        io::ErrorKind::WouldBlock => TransferStatus::WouldBlock,
        _ => TransferStatus::Failed(err),
    }
}

/// The transfer primitives the engine drives.
///
/// Exactly one syscall is issued per method call. Implementations must
/// report partial byte counts alongside interrupted and would-block
/// outcomes; the engine's accounting consumes whatever is reported.
pub trait Transport {
    /// Combined zero-copy transfer: `headers`, then `nbytes` file bytes
    /// starting at `offset`, then `trailers`.
    ///
    /// Whether `nbytes` includes the header length is the caller's
    /// concern (see `Platform::sendfile_counts_headers`); the sent
    /// count always covers every header, file, and trailer byte the
    /// kernel accepted.
    fn send_file(
        &mut self,
        fd: RawFd,
        offset: u64,
        nbytes: u64,
        headers: &[libc::iovec],
        trailers: &[libc::iovec],
    ) -> Transfer;

    /// Scatter-gather write of in-memory data only. "No bytes, would
    /// block" is reported as zero bytes sent with
    /// [`TransferStatus::WouldBlock`], never as an error value.
    fn writev(&mut self, iovecs: &[libc::iovec]) -> Transfer;

    /// Enable the packet-coalescing socket mode (delay transmission to
    /// fill network frames). Called at most once per connection.
    fn enable_packet_coalescing(&mut self) -> io::Result<()>;
}

#[cfg(any(
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "macos",
    target_os = "ios"
))]
const COALESCE_OPT: libc::c_int = libc::TCP_NOPUSH;
#[cfg(target_os = "linux")]
const COALESCE_OPT: libc::c_int = libc::TCP_CORK;

/// Production [`Transport`] over a non-blocking socket.
///
/// Borrows the fd: the caller keeps the socket open for the
/// transport's lifetime.
pub struct SocketTransport {
    fd: RawFd,
}

impl SocketTransport {
    pub fn new(fd: RawFd) -> Self {
        SocketTransport { fd }
    }

    fn writev_impl(&mut self, iovecs: &[libc::iovec]) -> Transfer {
        debug_assert!(!iovecs.is_empty(), "zero-length writev");
        let rc = unsafe { libc::writev(self.fd, iovecs.as_ptr(), iovecs.len() as libc::c_int) };
        if rc < 0 {
            // Nothing was written; normalize the count to zero.
            Transfer {
                sent: 0,
                status: classify(io::Error::last_os_error()),
            }
        } else {
            Transfer::complete(rc as u64)
        }
    }
}

#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
impl SocketTransport {
    fn send_file_impl(
        &mut self,
        fd: RawFd,
        offset: u64,
        nbytes: u64,
        headers: &[libc::iovec],
        trailers: &[libc::iovec],
    ) -> Transfer {
        let mut hdtr = libc::sf_hdtr {
            headers: headers.as_ptr() as *mut libc::iovec,
            hdr_cnt: headers.len() as libc::c_int,
            trailers: trailers.as_ptr() as *mut libc::iovec,
            trl_cnt: trailers.len() as libc::c_int,
        };
        // sbytes carries the partial count even when the call fails.
        let mut sbytes: libc::off_t = 0;
        let rc = unsafe {
            libc::sendfile(
                fd,
                self.fd,
                offset as libc::off_t,
                nbytes as libc::size_t,
                &mut hdtr,
                &mut sbytes,
                0,
            )
        };
        let sent = sbytes as u64;
        if rc == -1 {
            Transfer {
                sent,
                status: classify(io::Error::last_os_error()),
            }
        } else {
            Transfer::complete(sent)
        }
    }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
impl SocketTransport {
    fn send_file_impl(
        &mut self,
        fd: RawFd,
        offset: u64,
        nbytes: u64,
        headers: &[libc::iovec],
        trailers: &[libc::iovec],
    ) -> Transfer {
        let mut hdtr = libc::sf_hdtr {
            headers: headers.as_ptr() as *mut libc::iovec,
            hdr_cnt: headers.len() as libc::c_int,
            trailers: trailers.as_ptr() as *mut libc::iovec,
            trl_cnt: trailers.len() as libc::c_int,
        };
        // In/out parameter: requested count in, actual count out (the
        // partial count survives an error return).
        let mut len: libc::off_t = nbytes as libc::off_t;
        let rc = unsafe {
            libc::sendfile(fd, self.fd, offset as libc::off_t, &mut len, &mut hdtr, 0)
        };
        let sent = len as u64;
        if rc == -1 {
            Transfer {
                sent,
                status: classify(io::Error::last_os_error()),
            }
        } else {
            Transfer::complete(sent)
        }
    }
}

#[cfg(target_os = "linux")]
impl SocketTransport {
    /// Linux has no combined header/file/trailer primitive: pending
    /// headers drain with one writev() call, then the file region with
    /// one sendfile() call, trailers again with writev() — one syscall
    /// per attempt, with the advancer retiring whatever each call
    /// reported in between.
    fn send_file_impl(
        &mut self,
        fd: RawFd,
        offset: u64,
        nbytes: u64,
        headers: &[libc::iovec],
        _trailers: &[libc::iovec],
    ) -> Transfer {
        if !headers.is_empty() {
            return self.writev_impl(headers);
        }
        let mut off = offset as libc::off_t;
        let rc = unsafe { libc::sendfile(self.fd, fd, &mut off, nbytes as libc::size_t) };
        if rc < 0 {
            Transfer {
                sent: 0,
                status: classify(io::Error::last_os_error()),
            }
        } else {
            Transfer::complete(rc as u64)
        }
    }
}

impl Transport for SocketTransport {
    fn send_file(
        &mut self,
        fd: RawFd,
        offset: u64,
        nbytes: u64,
        headers: &[libc::iovec],
        trailers: &[libc::iovec],
    ) -> Transfer {
        self.send_file_impl(fd, offset, nbytes, headers, trailers)
    }

    fn writev(&mut self, iovecs: &[libc::iovec]) -> Transfer {
        self.writev_impl(iovecs)
    }

    fn enable_packet_coalescing(&mut self) -> io::Result<()> {
        let optval: libc::c_int = 1;
        let rc = unsafe {
            libc::setsockopt(
                self.fd,
                libc::IPPROTO_TCP,
                COALESCE_OPT,
                &optval as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
