//! Command handlers
//!
//! Each handler turns parsed arguments into core calls and renders the result.

use std::io::Read;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use netprint::{
    CancellationToken, PrintError, PrintRequest, PrinterAddress, QR_PRINT_TIMEOUT, ScanOptions,
    ScanRange, TEXT_PRINT_TIMEOUT, TransportErrorKind, encode, is_reachable, print, scan_stream,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{DumpJob, QrArgs, ScanArgs, TextArgs};
use crate::config::Config;

/// Parse `host[:port]`, using the configured port when none is given
fn resolve_target(target: &str, config: &Config) -> anyhow::Result<PrinterAddress> {
    let addr: PrinterAddress = target
        .parse()
        .with_context(|| format!("invalid printer address: {target}"))?;
    if target.contains(':') {
        Ok(addr)
    } else {
        Ok(PrinterAddress::new(addr.host(), config.port))
    }
}

fn text_request(args: &TextArgs) -> anyhow::Result<PrintRequest> {
    let body = if args.stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read text from stdin")?;
        buf.trim().to_string()
    } else {
        args.text.join(" ")
    };
    Ok(PrintRequest::text(body))
}

fn qr_request(args: &QrArgs) -> PrintRequest {
    PrintRequest::qr_with(args.payload.clone(), args.size, args.ec)
}

/// Human-readable message per failure kind
fn describe(err: &PrintError) -> String {
    match err {
        PrintError::Encoding(e) => format!("Cannot encode print job: {e}"),
        PrintError::Transport(e) => match e.kind() {
            TransportErrorKind::Timeout => {
                format!("Printer at {} did not respond in time", e.addr())
            }
            TransportErrorKind::ConnectionFailed => {
                format!("Cannot connect to printer at {}", e.addr())
            }
            TransportErrorKind::IoFault => {
                format!("Connection to {} broke while sending", e.addr())
            }
        },
    }
}

pub async fn check(
    target: &str,
    timeout_ms: Option<u64>,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let addr = resolve_target(target, config)?;
    let timeout = Duration::from_millis(timeout_ms.unwrap_or(config.check_timeout_ms));

    if is_reachable(addr.host(), addr.port(), timeout).await {
        println!("✔ Printer at {addr} is reachable.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("✖ Cannot connect to {addr}");
        Ok(ExitCode::FAILURE)
    }
}

async fn submit(
    addr: &PrinterAddress,
    request: &PrintRequest,
    timeout: Duration,
) -> anyhow::Result<ExitCode> {
    match print(addr, request, timeout).await {
        Ok(()) => {
            info!(addr = %addr, "Printed");
            println!("✔ Printed successfully");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let msg = describe(&e);
            Err(anyhow::Error::new(e).context(msg))
        }
    }
}

pub async fn print_text(
    target: &str,
    args: &TextArgs,
    timeout_ms: Option<u64>,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let addr = resolve_target(target, config)?;
    let request = text_request(args)?;
    let timeout = timeout_ms
        .or(config.print_timeout_ms)
        .map(Duration::from_millis)
        .unwrap_or(TEXT_PRINT_TIMEOUT);
    submit(&addr, &request, timeout).await
}

pub async fn print_qr(
    target: &str,
    args: &QrArgs,
    timeout_ms: Option<u64>,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let addr = resolve_target(target, config)?;
    if !(1..=16).contains(&args.size) {
        warn!(size = args.size, "Module size outside 1-16, sending as-is");
    }
    let timeout = timeout_ms
        .or(config.print_timeout_ms)
        .map(Duration::from_millis)
        .unwrap_or(QR_PRINT_TIMEOUT);
    submit(&addr, &qr_request(args), timeout).await
}

pub fn dump(job: &DumpJob) -> anyhow::Result<ExitCode> {
    let request = match job {
        DumpJob::Text(args) => text_request(args)?,
        DumpJob::Qr(args) => qr_request(args),
    };
    let frame = encode(&request).context("cannot encode print job")?;
    println!("{}", frame.to_hex());
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScanEvent<'a> {
    Found { address: &'a PrinterAddress },
    Complete { summary: &'a netprint::ScanSummary },
}

fn scan_range(args: &ScanArgs, config: &Config) -> anyhow::Result<ScanRange> {
    let network = args.network.as_deref().unwrap_or(&config.network);
    let range: ScanRange = network
        .parse()
        .with_context(|| format!("invalid network: {network}"))?;
    if args.start.is_none() && args.end.is_none() {
        return Ok(range);
    }
    ScanRange::new(
        range.base(),
        args.start.unwrap_or(range.start()),
        args.end.unwrap_or(range.end()),
    )
    .context("invalid host range")
}

pub async fn scan(args: &ScanArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let range = scan_range(args, config)?;
    let cancel = CancellationToken::new();
    let options = ScanOptions::default()
        .with_port(args.port.unwrap_or(config.port))
        .with_concurrency(args.concurrency.unwrap_or(config.scan_concurrency))
        .with_timeout(Duration::from_millis(
            args.timeout_ms.unwrap_or(config.scan_timeout_ms),
        ))
        .with_cancel(cancel.clone());

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping scan");
            cancel.cancel();
        }
    });

    if !args.json {
        println!("Scanning {range} on port {} ...", options.port);
    }

    let (mut found, handle) = scan_stream(range, options);
    while let Some(result) = found.recv().await {
        if args.json {
            let line = serde_json::to_string(&ScanEvent::Found {
                address: &result.address,
            })?;
            println!("{line}");
        } else {
            println!("✔ Printer found: {}", result.address);
        }
    }

    let summary = handle.await.context("scan task failed")?;
    ctrl_c.abort();

    if args.json {
        println!(
            "{}",
            serde_json::to_string(&ScanEvent::Complete { summary: &summary })?
        );
    } else if summary.cancelled {
        println!(
            "Scan cancelled after {} of {} hosts. Printers found: {}",
            summary.total_probed,
            range.len(),
            summary.total_found
        );
    } else {
        println!(
            "Scan complete. Printers found: {} ({} hosts probed in {} ms)",
            summary.total_found, summary.total_probed, summary.elapsed_ms
        );
    }

    Ok(ExitCode::SUCCESS)
}
