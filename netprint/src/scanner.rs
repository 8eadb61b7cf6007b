//! Network scanner
//!
//! Probes every host of a [`ScanRange`] with a fixed number of workers.
//! Workers pull hosts from a shared cursor, so each host is probed exactly
//! once and at most `concurrency` sockets are open at any time.
//!
//! All accounting lives in a per-call [`ScanContext`]; two concurrent scans
//! share nothing.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::address::{DEFAULT_PORT, PrinterAddress};
use crate::probe::{Prober, SCAN_PROBE_TIMEOUT, TcpProber};
use crate::range::ScanRange;

/// Worker count used when the caller does not pick one
pub const DEFAULT_SCAN_CONCURRENCY: usize = 50;

/// Scan tuning
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub port: u16,
    /// Number of workers; 0 is treated as 1
    pub concurrency: usize,
    /// Per-host probe timeout
    pub timeout: Duration,
    /// Stops workers from taking new hosts once fired
    pub cancel: Option<CancellationToken>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            concurrency: DEFAULT_SCAN_CONCURRENCY,
            timeout: SCAN_PROBE_TIMEOUT,
            cancel: None,
        }
    }
}

impl ScanOptions {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Outcome of probing one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub address: PrinterAddress,
    pub reachable: bool,
}

/// Final counts of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total_probed: usize,
    pub total_found: usize,
    /// Cancelled before every host was probed
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

/// Scan-scoped work queue and counters
struct ScanContext {
    hosts: Vec<Ipv4Addr>,
    cursor: AtomicUsize,
    probed: AtomicUsize,
    found: AtomicUsize,
}

impl ScanContext {
    fn new(range: &ScanRange) -> Self {
        Self {
            hosts: range.hosts().collect(),
            cursor: AtomicUsize::new(0),
            probed: AtomicUsize::new(0),
            found: AtomicUsize::new(0),
        }
    }

    fn next_host(&self) -> Option<Ipv4Addr> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.hosts.get(i).copied()
    }
}

fn is_cancelled(cancel: &Option<CancellationToken>) -> bool {
    cancel.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Scan `range` over plain TCP, calling `on_found` for each reachable host
///
/// `on_found` runs on worker tasks and may be called concurrently. Hosts
/// are reported in completion order, not address order.
pub async fn scan<F>(range: &ScanRange, options: &ScanOptions, on_found: F) -> ScanSummary
where
    F: Fn(ScanResult) + Send + Sync + 'static,
{
    scan_with(range, options, Arc::new(TcpProber), on_found).await
}

/// Scan with a custom [`Prober`]
#[instrument(skip_all, fields(range = %range, port = options.port))]
pub async fn scan_with<P, F>(
    range: &ScanRange,
    options: &ScanOptions,
    prober: Arc<P>,
    on_found: F,
) -> ScanSummary
where
    P: Prober + 'static,
    F: Fn(ScanResult) + Send + Sync + 'static,
{
    let started = Instant::now();
    let ctx = Arc::new(ScanContext::new(range));
    let on_found = Arc::new(on_found);
    let workers = options.concurrency.clamp(1, ctx.hosts.len());

    info!(hosts = ctx.hosts.len(), workers, "Scan started");

    let mut set = JoinSet::new();
    for _ in 0..workers {
        let ctx = ctx.clone();
        let prober = prober.clone();
        let on_found = on_found.clone();
        let cancel = options.cancel.clone();
        let port = options.port;
        let timeout = options.timeout;

        set.spawn(async move {
            loop {
                if is_cancelled(&cancel) {
                    break;
                }
                let Some(ip) = ctx.next_host() else {
                    break;
                };
                let address = PrinterAddress::from((ip, port));

                let reachable = match &cancel {
                    Some(token) => tokio::select! {
                        _ = token.cancelled() => break,
                        r = prober.probe(&address, timeout) => r,
                    },
                    None => prober.probe(&address, timeout).await,
                };

                ctx.probed.fetch_add(1, Ordering::Relaxed);
                if reachable {
                    ctx.found.fetch_add(1, Ordering::Relaxed);
                    debug!(addr = %address, "Printer found");
                    on_found(ScanResult {
                        address,
                        reachable: true,
                    });
                }
            }
        });
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            error!(error = %e, "Scan worker failed");
        }
    }

    let total_probed = ctx.probed.load(Ordering::Relaxed);
    let summary = ScanSummary {
        total_probed,
        total_found: ctx.found.load(Ordering::Relaxed),
        cancelled: is_cancelled(&options.cancel) && total_probed < ctx.hosts.len(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        probed = summary.total_probed,
        found = summary.total_found,
        cancelled = summary.cancelled,
        elapsed_ms = summary.elapsed_ms,
        "Scan complete"
    );
    summary
}

/// Run a TCP scan in the background, streaming discoveries over a channel
///
/// The channel holds one slot per host, so workers never wait on the
/// receiver. It closes once the scan finishes; the handle yields the summary.
pub fn scan_stream(
    range: ScanRange,
    options: ScanOptions,
) -> (mpsc::Receiver<ScanResult>, JoinHandle<ScanSummary>) {
    let (tx, rx) = mpsc::channel(range.len());
    let handle = tokio::spawn(async move {
        scan(&range, &options, move |result| {
            // Receiver gone: keep scanning, the summary is still wanted
            let _ = tx.try_send(result);
        })
        .await
    });
    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tokio::net::TcpListener;

    /// Deterministic prober: reachable iff the host is in `open`
    #[derive(Default)]
    struct FakeProber {
        open: HashSet<String>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
    }

    impl FakeProber {
        fn with_open(hosts: &[&str]) -> Self {
            Self {
                open: hosts.iter().map(|h| h.to_string()).collect(),
                delay: Duration::from_millis(5),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, address: &PrinterAddress, _timeout: Duration) -> bool {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(address.host().to_string());
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.open.contains(address.host())
        }
    }

    type Found = Arc<Mutex<Vec<ScanResult>>>;

    fn collector() -> (Found, impl Fn(ScanResult) + Send + Sync + 'static) {
        let found = Arc::new(Mutex::new(Vec::new()));
        let sink = found.clone();
        (found, move |r| sink.lock().unwrap().push(r))
    }

    #[tokio::test]
    async fn test_scan_reports_only_reachable() {
        let range = ScanRange::new([192, 168, 1], 1, 3).unwrap();
        let prober = Arc::new(FakeProber::with_open(&["192.168.1.2"]));
        let (found, on_found) = collector();

        let options = ScanOptions::default().with_concurrency(2);
        let summary = scan_with(&range, &options, prober, on_found).await;

        assert_eq!(summary.total_probed, 3);
        assert_eq!(summary.total_found, 1);
        assert!(!summary.cancelled);
        assert_eq!(
            *found.lock().unwrap(),
            vec![ScanResult {
                address: PrinterAddress::new("192.168.1.2", 9100),
                reachable: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_scan_probes_each_host_once() {
        let range = ScanRange::subnet([10, 0, 0]);
        let prober = Arc::new(FakeProber::with_open(&["10.0.0.1", "10.0.0.200"]));
        let (found, on_found) = collector();

        let options = ScanOptions::default().with_concurrency(7);
        let summary = scan_with(&range, &options, prober.clone(), on_found).await;

        assert_eq!(summary.total_probed, 255);
        assert_eq!(summary.total_found, 2);
        assert_eq!(found.lock().unwrap().len(), 2);

        let calls = prober.calls.lock().unwrap();
        let unique: HashSet<_> = calls.iter().collect();
        assert_eq!(calls.len(), 255);
        assert_eq!(unique.len(), 255);
        assert!(prober.max_in_flight.load(Ordering::SeqCst) <= 7);
    }

    #[tokio::test]
    async fn test_scan_nothing_reachable() {
        let range = ScanRange::new([172, 16, 0], 1, 40).unwrap();
        let prober = Arc::new(FakeProber::with_open(&[]));
        let (found, on_found) = collector();

        let summary = scan_with(&range, &ScanOptions::default(), prober, on_found).await;

        assert_eq!(summary.total_probed, 40);
        assert_eq!(summary.total_found, 0);
        assert!(found.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_scans() {
        let range = ScanRange::new([192, 168, 0], 1, 4).unwrap();
        let prober = Arc::new(FakeProber::with_open(&["192.168.0.4"]));
        let (_found, on_found) = collector();

        let options = ScanOptions::default().with_concurrency(0);
        let summary = scan_with(&range, &options, prober.clone(), on_found).await;

        assert_eq!(summary.total_probed, 4);
        assert_eq!(summary.total_found, 1);
        assert_eq!(prober.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_precancelled_scan_probes_nothing() {
        let range = ScanRange::subnet([192, 168, 1]);
        let prober = Arc::new(FakeProber::with_open(&["192.168.1.1"]));
        let (found, on_found) = collector();

        let token = CancellationToken::new();
        token.cancel();
        let options = ScanOptions::default().with_cancel(token);
        let summary = scan_with(&range, &options, prober, on_found).await;

        assert_eq!(summary.total_probed, 0);
        assert_eq!(summary.total_found, 0);
        assert!(summary.cancelled);
        assert!(found.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_scan() {
        let range = ScanRange::subnet([192, 168, 1]);
        let prober = Arc::new(FakeProber {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        let (_found, on_found) = collector();

        let token = CancellationToken::new();
        let options = ScanOptions::default()
            .with_concurrency(2)
            .with_cancel(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            token.cancel();
        });
        let summary = scan_with(&range, &options, prober, on_found).await;
        canceller.await.unwrap();

        assert!(summary.cancelled);
        assert!(summary.total_probed < 255);
    }

    #[tokio::test]
    async fn test_scan_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let range = ScanRange::new([127, 0, 0], 1, 3).unwrap();
        let options = ScanOptions::default()
            .with_port(port)
            .with_concurrency(2);
        let (found, on_found) = collector();

        let summary = scan(&range, &options, on_found).await;

        assert_eq!(summary.total_probed, 3);
        assert_eq!(summary.total_found, 1);
        let found = found.lock().unwrap();
        assert_eq!(found[0].address, PrinterAddress::new("127.0.0.1", port));
    }

    #[tokio::test]
    async fn test_scan_stream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let range = ScanRange::new([127, 0, 0], 1, 2).unwrap();
        let (mut rx, handle) = scan_stream(range, ScanOptions::default().with_port(port));
        assert_eq!(rx.max_capacity(), 2);

        let mut results = Vec::new();
        while let Some(r) = rx.recv().await {
            results.push(r);
        }
        let summary = handle.await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].reachable);
        assert_eq!(summary.total_probed, 2);
        assert_eq!(summary.total_found, 1);
    }

    #[tokio::test]
    async fn test_scan_stream_finishes_without_reader() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let range = ScanRange::new([127, 0, 0], 1, 1).unwrap();
        let (mut rx, handle) = scan_stream(range, ScanOptions::default().with_port(port));

        let summary = handle.await.unwrap();
        assert_eq!(summary.total_found, 1);

        let mut buffered = 0;
        while rx.recv().await.is_some() {
            buffered += 1;
        }
        assert_eq!(buffered, summary.total_found);
    }
}
