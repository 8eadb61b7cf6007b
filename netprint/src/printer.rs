//! Printer transport for sending ESC/POS frames
//!
//! One TCP session per call: connect, write the whole frame, close. No
//! pooling and no retries; callers decide whether to try again.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::address::PrinterAddress;
use crate::error::{PrintResult, TransportError, TransportResult};
use crate::escpos::{EncodedFrame, PrintRequest, encode};
use crate::probe::SINGLE_CHECK_TIMEOUT;

/// Deadline for a text print job
pub const TEXT_PRINT_TIMEOUT: Duration = Duration::from_secs(2);

/// Deadline for a QR print job
pub const QR_PRINT_TIMEOUT: Duration = Duration::from_secs(3);

/// Send one encoded frame to a printer
///
/// `timeout` bounds the whole session (connect + write + close). The socket
/// is closed before returning on every path.
#[instrument(skip(address, frame), fields(addr = %address, data_len = frame.len()))]
pub async fn send(
    address: &PrinterAddress,
    frame: &EncodedFrame,
    timeout: Duration,
) -> TransportResult<()> {
    let deadline = Instant::now() + timeout;
    let addr = address.to_string();
    let timed_out = || TransportError::Timeout {
        addr: addr.clone(),
        timeout,
    };

    let mut stream = tokio::time::timeout_at(
        deadline,
        TcpStream::connect((address.host(), address.port())),
    )
    .await
    .map_err(|_| timed_out())?
    .map_err(|source| TransportError::ConnectionFailed {
        addr: addr.clone(),
        source,
    })?;

    debug!("Connected, sending {} bytes", frame.len());

    tokio::time::timeout_at(deadline, async {
        stream.write_all(frame.as_bytes()).await?;
        stream.flush().await?;
        stream.shutdown().await
    })
    .await
    .map_err(|_| timed_out())?
    .map_err(|source| TransportError::IoFault {
        addr: addr.clone(),
        source,
    })?;

    info!("Print job sent successfully");
    Ok(())
}

/// Check whether a TCP handshake with `address` completes within `timeout`
///
/// Every failure (timeout, refusal, name resolution) is reported as `false`.
#[instrument(skip(address), fields(addr = %address))]
pub async fn probe(address: &PrinterAddress, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((address.host(), address.port())))
        .await
    {
        Ok(Ok(_)) => {
            debug!("Printer online");
            true
        }
        Ok(Err(e)) => {
            debug!(error = %e, "Printer offline");
            false
        }
        Err(_) => {
            debug!("Printer check timeout");
            false
        }
    }
}

/// Encode a request and send it in one session
pub async fn print(
    address: &PrinterAddress,
    request: &PrintRequest,
    timeout: Duration,
) -> PrintResult<()> {
    let frame = encode(request)?;
    send(address, &frame, timeout).await?;
    Ok(())
}

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send an encoded frame to the printer
    async fn print(&self, frame: &EncodedFrame) -> TransportResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network printer (TCP port 9100)
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    address: PrinterAddress,
    timeout: Duration,
}

impl NetworkPrinter {
    pub fn new(address: PrinterAddress) -> Self {
        Self {
            address,
            timeout: TEXT_PRINT_TIMEOUT,
        }
    }

    /// Set session timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &PrinterAddress {
        &self.address
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Encode and print a request
    pub async fn submit(&self, request: &PrintRequest) -> PrintResult<()> {
        print(&self.address, request, self.timeout).await
    }
}

impl Printer for NetworkPrinter {
    async fn print(&self, frame: &EncodedFrame) -> TransportResult<()> {
        send(&self.address, frame, self.timeout).await
    }

    async fn is_online(&self) -> bool {
        probe(&self.address, SINGLE_CHECK_TIMEOUT).await
    }
}
