//! # netprint
//!
//! Find ESC/POS thermal printers on a local network and print to them over
//! raw TCP (port 9100).
//!
//! ## Scope
//!
//! - ESC/POS frame encoding (text and QR codes)
//! - One-shot TCP transport with bounded timeouts
//! - Reachability probes and concurrent subnet scans
//!
//! Prompts, dialogs and result rendering stay in the front end.
//!
//! ## Example
//!
//! ```ignore
//! use netprint::{PrintRequest, PrinterAddress, ScanOptions, ScanRange, encode, scan, send};
//!
//! // Print a QR code
//! let printer: PrinterAddress = "192.168.1.100".parse()?;
//! let frame = encode(&PrintRequest::qr("https://example.com"))?;
//! send(&printer, &frame, netprint::QR_PRINT_TIMEOUT).await?;
//!
//! // Scan the subnet
//! let summary = scan(&ScanRange::subnet([192, 168, 1]), &ScanOptions::default(), |r| {
//!     println!("found {}", r.address);
//! })
//! .await;
//! ```

mod address;
mod error;
mod escpos;
mod printer;
mod probe;
mod range;
mod scanner;

// Re-exports
pub use address::{DEFAULT_PORT, PrinterAddress};
pub use error::{
    AddressError, EncodingError, EncodingResult, PrintError, PrintResult, RangeError,
    TransportError, TransportErrorKind, TransportResult,
};
pub use escpos::{
    DEFAULT_QR_MODULE_SIZE, EncodedFrame, EscPosBuilder, FEED_CUT, INIT, MAX_QR_PAYLOAD,
    PrintRequest, QrErrorCorrection, encode,
};
pub use printer::{
    NetworkPrinter, Printer, QR_PRINT_TIMEOUT, TEXT_PRINT_TIMEOUT, print, probe, send,
};
pub use probe::{Prober, SCAN_PROBE_TIMEOUT, SINGLE_CHECK_TIMEOUT, TcpProber, is_reachable};
pub use range::ScanRange;
pub use scanner::{
    DEFAULT_SCAN_CONCURRENCY, ScanOptions, ScanResult, ScanSummary, scan, scan_stream, scan_with,
};

pub use tokio_util::sync::CancellationToken;
