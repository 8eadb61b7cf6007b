//! Connectivity probe
//!
//! A probe is a bounded TCP connect with no data transfer. Failures are
//! never errors here, only "not reachable".

use std::time::Duration;

use async_trait::async_trait;

use crate::address::PrinterAddress;
use crate::printer;

/// Timeout for an interactive single-host check
pub const SINGLE_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Per-host timeout during a range scan
pub const SCAN_PROBE_TIMEOUT: Duration = Duration::from_millis(300);

/// Check whether `host:port` accepts a TCP connection within `timeout`
pub async fn is_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    printer::probe(&PrinterAddress::new(host, port), timeout).await
}

/// Reachability check used by the scanner
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, address: &PrinterAddress, timeout: Duration) -> bool;
}

/// Plain TCP handshake prober
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &PrinterAddress, timeout: Duration) -> bool {
        printer::probe(address, timeout).await
    }
}
