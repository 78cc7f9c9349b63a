/// Platform capabilities for the transmission engine.
///
/// These are capability constants, not per-call decisions: the caller
/// determines them once (at startup, or per target platform) and passes
/// the same value for the lifetime of a connection.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Maximum scatter-gather vector entries per transfer call. Chain
    /// classification stops once a run reaches this many entries; the
    /// rest of the chain waits for the next attempt.
    /// Default: 64.
    pub max_gather_entries: usize,
    /// Whether the combined transfer primitive counts header bytes
    /// against its requested total. Legacy kernels with the nbytes
    /// accounting quirk consume part of the requested count on the
    /// header, so the engine compensates by requesting
    /// `file_len + header_len`; on kernels without the quirk it
    /// requests the file length alone. Reported sent-byte semantics
    /// are unaffected either way.
    pub sendfile_counts_headers: bool,
    /// Enable the packet-coalescing socket mode (delay transmission to
    /// fill network frames) before the first combined transfer on each
    /// connection.
    pub packet_coalescing: bool,
    /// Whether the event-notification subsystem can report abnormal
    /// closure for a writable connection at all. When false the
    /// readiness gate skips the closure check entirely; its absence
    /// never means "definitely healthy".
    pub closure_events: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Platform {
            max_gather_entries: 64,
            sendfile_counts_headers: cfg!(any(target_os = "macos", target_os = "ios")),
            packet_coalescing: true,
            closure_events: cfg!(any(
                target_os = "freebsd",
                target_os = "dragonfly",
                target_os = "netbsd",
                target_os = "openbsd",
                target_os = "macos",
                target_os = "ios",
            )),
        }
    }
}
