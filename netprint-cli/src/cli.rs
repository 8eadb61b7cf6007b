use clap::{Args, Parser, Subcommand};
use netprint::{DEFAULT_QR_MODULE_SIZE, QrErrorCorrection};

#[derive(Parser, Debug)]
#[command(name = "netprint", version, about = "Find and print to ESC/POS network printers")]
pub struct Cli {
    /// Log level (overrides NETPRINT_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether a printer accepts connections
    Check {
        /// Printer as host or host:port
        target: String,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Print text
    Print {
        target: String,
        #[command(flatten)]
        text: TextArgs,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Print a QR code
    Qr {
        target: String,
        #[command(flatten)]
        qr: QrArgs,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Scan a /24 network for printers
    Scan(ScanArgs),
    /// Show the encoded frame as hex without sending it
    Dump {
        #[command(subcommand)]
        job: DumpJob,
    },
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text to print (joined with spaces)
    pub text: Vec<String>,
    /// Read the text from stdin instead
    #[arg(long, conflicts_with = "text")]
    pub stdin: bool,
}

#[derive(Args, Debug)]
pub struct QrArgs {
    /// Data encoded in the symbol
    pub payload: String,
    /// Module size in dots (printers accept 1-16)
    #[arg(long, default_value_t = DEFAULT_QR_MODULE_SIZE)]
    pub size: u8,
    /// Error correction level: L, M, Q or H
    #[arg(long, default_value_t = QrErrorCorrection::L)]
    pub ec: QrErrorCorrection,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Network as a.b.c, a.b.c.0/24 or a.b.c.x-y (overrides NETPRINT_NETWORK)
    #[arg(long)]
    pub network: Option<String>,
    /// First host number
    #[arg(long)]
    pub start: Option<u8>,
    /// Last host number
    #[arg(long)]
    pub end: Option<u8>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Per-host timeout
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// One JSON object per line
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum DumpJob {
    Text(TextArgs),
    Qr(QrArgs),
}
