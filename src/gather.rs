//! Chain classification into scatter-gather vectors and a file region.
//!
//! One gather pass splits the head of a chain into a leading in-memory
//! iovec run, an optional coalesced same-file region, and a trailing
//! in-memory iovec run, bounded by the platform vector cap. Memory
//! segments that are physically adjacent merge into single entries;
//! consecutive file segments on the same fd with contiguous offsets
//! merge into one region.

use std::os::fd::{AsRawFd, RawFd};
use std::ptr;

use crate::chain::{SegmentArena, SegmentId};
use crate::segment::Segment;

/// Coalesced byte range of a single file.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileRegion {
    pub fd: RawFd,
    pub offset: u64,
    pub len: u64,
}

/// One attempt's worth of transferable data.
///
/// The iovecs point into memory owned by the arena's segments and stay
/// valid until a cursor is advanced or a segment is released: issue the
/// transfer before touching the chain.
pub(crate) struct GatherPlan {
    /// Leading in-memory run.
    pub headers: Vec<libc::iovec>,
    /// Total header bytes.
    pub header_len: u64,
    /// Coalesced file region following the headers.
    pub file: Option<FileRegion>,
    /// In-memory run following the file region.
    pub trailers: Vec<libc::iovec>,
    /// First segment not consumed by this plan.
    pub tail: Option<SegmentId>,
}

impl GatherPlan {
    /// True when there is nothing to hand to the kernel. The dispatcher
    /// must not issue a zero-length syscall for an empty plan.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.file.is_none()
    }
}

/// Classify the chain starting at `head` into one attempt's plan.
pub(crate) fn gather(
    arena: &SegmentArena,
    head: Option<SegmentId>,
    max_entries: usize,
) -> GatherPlan {
    let mut headers = Vec::new();
    let (mut cur, header_len) = memory_run(arena, head, max_entries, &mut headers);

    // Coalesce a consecutive same-file run.
    let mut file = None;
    if let Some(seed) = cur {
        if let Segment::File { file: f, pos, last } = arena.get(seed) {
            if last > pos {
                let mut region = FileRegion {
                    fd: f.as_raw_fd(),
                    offset: *pos,
                    len: last - pos,
                };
                cur = arena.next(seed);
                while let Some(id) = cur {
                    match arena.get(id) {
                        Segment::File { file: f, pos, last } => {
                            if last == pos {
                                // Exhausted: walked over, no bytes.
                            } else if f.as_raw_fd() == region.fd
                                && *pos == region.offset + region.len
                            {
                                region.len += last - pos;
                            } else {
                                // Different file, or a gap in offsets.
                                break;
                            }
                        }
                        // Anything that is not a file segment ends the run.
                        _ => break,
                    }
                    cur = arena.next(id);
                }
                file = Some(region);
            }
        }
    }

    let mut trailers = Vec::new();
    if file.is_some() {
        let (next, _) = memory_run(arena, cur, max_entries, &mut trailers);
        cur = next;
    }

    GatherPlan {
        headers,
        header_len,
        file,
        trailers,
        tail: cur,
    }
}

/// Walk a run of in-memory segments into `out`, coalescing physically
/// adjacent ranges, until a file segment, the entry cap, or the end of
/// the chain. Returns the first unconsumed segment and the run's byte
/// count.
fn memory_run(
    arena: &SegmentArena,
    mut cur: Option<SegmentId>,
    max_entries: usize,
    out: &mut Vec<libc::iovec>,
) -> (Option<SegmentId>, u64) {
    let mut total: u64 = 0;
    let mut prev_end: *const u8 = ptr::null();

    while let Some(id) = cur {
        if out.len() >= max_entries {
            break;
        }
        match arena.get(id) {
            // Markers and exhausted segments contribute nothing but are
            // still walked over.
            Segment::Marker => {}
            seg if seg.is_exhausted() => {}
            Segment::Memory { data, pos } => {
                let base = unsafe { data.as_ptr().add(*pos) };
                let len = data.len() - pos;
                if base == prev_end {
                    // Physically adjacent to the previous contribution:
                    // extend that entry instead of spending a new one.
                    let last = out.len() - 1;
                    out[last].iov_len += len;
                } else {
                    out.push(libc::iovec {
                        iov_base: base as *mut libc::c_void,
                        iov_len: len,
                    });
                }
                prev_end = unsafe { base.add(len) };
                total += len as u64;
            }
            Segment::File { .. } => break,
        }
        cur = arena.next(id);
    }

    (cur, total)
}
