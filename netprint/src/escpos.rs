//! ESC/POS command builder
//!
//! Builds the exact byte frames sent to thermal printers. Every frame is
//! `ESC @` + body + `LF LF` + `GS V A`; a QR body is the four-step
//! `GS ( k` sequence (module size, error correction, store, print).

use std::fmt;
use std::str::FromStr;

use crate::error::{EncodingError, EncodingResult};

/// ESC @ - Initialize printer
pub const INIT: [u8; 2] = [0x1B, 0x40];

/// LF LF GS V A - Feed two lines, then full cut
pub const FEED_CUT: [u8; 5] = [0x0A, 0x0A, 0x1D, 0x56, 0x41];

/// GS ( k - 2D symbol function prefix
const QR_PREFIX: [u8; 3] = [0x1D, 0x28, 0x6B];

/// Largest QR payload whose `len + 3` still fits the 16-bit length field
pub const MAX_QR_PAYLOAD: usize = u16::MAX as usize - 3;

/// Module size used when the caller does not pick one
pub const DEFAULT_QR_MODULE_SIZE: u8 = 6;

/// QR error correction level (function 169)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QrErrorCorrection {
    /// ~7% recovery
    #[default]
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl QrErrorCorrection {
    /// Wire code: 48..=51
    pub fn code(self) -> u8 {
        match self {
            Self::L => 48,
            Self::M => 49,
            Self::Q => 50,
            Self::H => 51,
        }
    }
}

impl FromStr for QrErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            other => Err(format!("unknown error correction level: {other}")),
        }
    }
}

impl fmt::Display for QrErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(s)
    }
}

/// A print job, before encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintRequest {
    /// UTF-8 text, written verbatim (no escaping of control bytes)
    Text { body: String },
    /// QR code symbol
    Qr {
        payload: String,
        /// Dots per module. Printers accept 1-16; other values are passed through as-is.
        module_size: u8,
        error_correction: QrErrorCorrection,
    },
}

impl PrintRequest {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    /// QR request with the default module size (6) and level L
    pub fn qr(payload: impl Into<String>) -> Self {
        Self::Qr {
            payload: payload.into(),
            module_size: DEFAULT_QR_MODULE_SIZE,
            error_correction: QrErrorCorrection::default(),
        }
    }

    pub fn qr_with(
        payload: impl Into<String>,
        module_size: u8,
        error_correction: QrErrorCorrection,
    ) -> Self {
        Self::Qr {
            payload: payload.into(),
            module_size,
            error_correction,
        }
    }
}

/// Encoded ESC/POS bytes, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedFrame(Vec<u8>);

impl EncodedFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Space separated uppercase hex, e.g. `1B 40 0A`
    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl AsRef<[u8]> for EncodedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// ESC/POS command builder
///
/// Starts with the initialize command; `build` hands back the frame.
pub struct EscPosBuilder {
    buf: Vec<u8>,
}

impl EscPosBuilder {
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&INIT);
        Self { buf }
    }

    // === Text Output ===

    /// Write raw UTF-8 text
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    // === QR Code ===

    /// Print a QR code
    ///
    /// Nothing is written when the payload is too large for the length field.
    pub fn qr_code(
        &mut self,
        data: &str,
        module_size: u8,
        level: QrErrorCorrection,
    ) -> EncodingResult<&mut Self> {
        let data_bytes = data.as_bytes();
        if data_bytes.len() > MAX_QR_PAYLOAD {
            return Err(EncodingError::PayloadTooLarge {
                len: data_bytes.len(),
                max: MAX_QR_PAYLOAD,
            });
        }

        // Function 167: Set module size
        self.buf.extend_from_slice(&QR_PREFIX);
        self.buf.extend_from_slice(&[0x03, 0x00, 0x31, 0x43, module_size]);

        // Function 169: Set error correction
        self.buf.extend_from_slice(&QR_PREFIX);
        self.buf.extend_from_slice(&[0x03, 0x00, 0x31, 0x45, level.code()]);

        // Function 180: Store data
        let [p_l, p_h] = ((data_bytes.len() + 3) as u16).to_le_bytes();
        self.buf.extend_from_slice(&QR_PREFIX);
        self.buf.extend_from_slice(&[p_l, p_h, 0x31, 0x50, 0x30]);
        self.buf.extend_from_slice(data_bytes);

        // Function 181: Print
        self.buf.extend_from_slice(&QR_PREFIX);
        self.buf.extend_from_slice(&[0x03, 0x00, 0x31, 0x51, 0x30]);

        Ok(self)
    }

    // === Paper Control ===

    /// Feed two lines, then full cut (GS V A)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&FEED_CUT);
        self
    }

    // === Raw Commands ===

    /// Write raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    // === Build ===

    pub fn build(self) -> EncodedFrame {
        EncodedFrame(self.buf)
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a print request into a complete frame
pub fn encode(request: &PrintRequest) -> EncodingResult<EncodedFrame> {
    let mut b = EscPosBuilder::new();
    match request {
        PrintRequest::Text { body } => {
            b.text(body);
        }
        PrintRequest::Qr {
            payload,
            module_size,
            error_correction,
        } => {
            b.qr_code(payload, *module_size, *error_correction)?;
        }
    }
    b.cut();
    Ok(b.build())
}
