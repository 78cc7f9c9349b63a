//! Engine metrics.
//!
//! Transfer-activity counters registered with metriken for Prometheus
//! exposition. Connection state is single-owner, so plain counters
//! suffice here.

use metriken::{metric, Counter};

#[metric(
    name = "drainline/bytes/sent",
    description = "Total bytes the kernel accepted"
)]
pub static BYTES_SENT: Counter = Counter::new();

#[metric(
    name = "drainline/transfers/sendfile",
    description = "Combined zero-copy transfer calls"
)]
pub static SENDFILE_CALLS: Counter = Counter::new();

#[metric(
    name = "drainline/transfers/writev",
    description = "Scatter-gather write calls"
)]
pub static WRITEV_CALLS: Counter = Counter::new();

#[metric(
    name = "drainline/transfers/interrupted",
    description = "Transfers interrupted by a signal and retried"
)]
pub static TRANSFERS_INTERRUPTED: Counter = Counter::new();

#[metric(
    name = "drainline/transfers/blocked",
    description = "Transfers that hit socket backpressure"
)]
pub static TRANSFERS_BLOCKED: Counter = Counter::new();

#[metric(
    name = "drainline/connections/faulted",
    description = "Connections marked faulted"
)]
pub static CONNECTIONS_FAULTED: Counter = Counter::new();

#[metric(
    name = "drainline/coalesce/enabled",
    description = "Packet-coalescing mode enables"
)]
pub static COALESCE_ENABLED: Counter = Counter::new();
