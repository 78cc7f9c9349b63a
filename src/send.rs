//! The transmission engine.
//!
//! One [`send_chain`] call drains as much of a chain as the kernel will
//! currently accept: classify the head of the chain into header
//! iovecs, an optional file region, and trailer iovecs; hand them to
//! the most efficient transfer primitive; consume whatever byte count
//! the kernel reports; repeat while an attempt was exactly saturated or
//! interrupted.

use std::io;

use crate::chain::{SegmentArena, SegmentId};
use crate::config::Platform;
use crate::connection::Connection;
use crate::error::Error;
use crate::gather::gather;
use crate::metrics;
use crate::transfer::{Transfer, TransferStatus, Transport};

/// Drain the chain starting at `head` onto the connection's socket.
///
/// Returns the new chain head: `Ok(None)` means the chain fully
/// drained and the caller may reclaim its segments; `Ok(Some(..))`
/// means data remains — if `write_ready` was cleared, the caller must
/// wait for the next writability event before invoking again. An `Err`
/// marks the connection faulted; the caller is expected to tear it
/// down. Segments are only ever mutated by cursor advancement; their
/// disposal stays with the caller.
///
/// The call never blocks: the socket is non-blocking and backpressure
/// is a normal outcome, not an error. Interrupted syscalls are retried
/// internally against the already-advanced chain.
pub fn send_chain<T: Transport>(
    conn: &mut Connection,
    transport: &mut T,
    arena: &mut SegmentArena,
    head: Option<SegmentId>,
    platform: &Platform,
) -> Result<Option<SegmentId>, Error> {
    if !conn.write_ready {
        return Ok(head);
    }

    if platform.closure_events && conn.peer_closed {
        // The event subsystem saw the peer go away; fail before
        // touching the socket.
        conn.fault();
        metrics::CONNECTIONS_FAULTED.increment();
        return Err(Error::PeerClosed {
            errno: conn.closure_errno,
        });
    }

    let mut head = head;
    loop {
        let plan = gather(arena, head, platform.max_gather_entries);
        if plan.is_empty() {
            // Nothing transferable (markers only, or no chain): no
            // syscall, readiness untouched.
            return Ok(head);
        }

        let transfer = if let Some(region) = plan.file {
            if platform.packet_coalescing && !conn.coalesced() {
                match transport.enable_packet_coalescing() {
                    Ok(()) => {
                        conn.set_coalesced();
                        metrics::COALESCE_ENABLED.increment();
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                        // Tiny chance of interruption; carry on without
                        // the mode and try again on the next file
                        // transfer.
                    }
                    Err(e) => {
                        conn.fault();
                        metrics::CONNECTIONS_FAULTED.increment();
                        return Err(Error::Coalesce(e));
                    }
                }
            }

            // Legacy kernels count header bytes against the requested
            // total; compensate so the whole file region is requested.
            let requested = if platform.sendfile_counts_headers {
                region.len + plan.header_len
            } else {
                region.len
            };

            metrics::SENDFILE_CALLS.increment();
            transport.send_file(
                region.fd,
                region.offset,
                requested,
                &plan.headers,
                &plan.trailers,
            )
        } else {
            metrics::WRITEV_CALLS.increment();
            transport.writev(&plan.headers)
        };

        let Transfer { sent, status } = transfer;
        let (retry, stop) = match status {
            TransferStatus::Complete => (false, false),
            TransferStatus::Interrupted => {
                metrics::TRANSFERS_INTERRUPTED.increment();
                (true, false)
            }
            TransferStatus::WouldBlock => {
                metrics::TRANSFERS_BLOCKED.increment();
                (false, true)
            }
            TransferStatus::Failed(e) => {
                // No byte accounting on a fatal outcome: the reported
                // count cannot be trusted.
                conn.fault();
                metrics::CONNECTIONS_FAULTED.increment();
                return Err(Error::Transfer(e));
            }
        };

        conn.sent += sent;
        metrics::BYTES_SENT.add(sent);

        head = match arena.advance(head, sent) {
            Ok(h) => h,
            Err(e) => {
                conn.fault();
                metrics::CONNECTIONS_FAULTED.increment();
                return Err(e);
            }
        };

        if stop {
            // The socket is full; wait for the next writability event.
            conn.write_ready = false;
            return Ok(head);
        }
        if retry {
            continue;
        }
        // Keep going only when this attempt was exactly saturated and
        // unclassified segments remain past it.
        if plan.tail.is_some() && head == plan.tail {
            continue;
        }
        break;
    }

    if head.is_some() {
        // The kernel took less than one attempt's worth; treat that as
        // a backpressure hint and wait for the next writability event.
        conn.write_ready = false;
    }
    Ok(head)
}
