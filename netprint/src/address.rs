//! Printer network address

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AddressError;

/// Raw TCP printing port used by most thermal printers
pub const DEFAULT_PORT: u16 = 9100;

/// Host (IPv4 literal or hostname) and TCP port of a printer
///
/// Hostnames are resolved when a connection is opened, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PrinterAddress {
    host: String,
    port: u16,
}

impl PrinterAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Address on the default port (9100)
    pub fn with_default_port(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl From<(Ipv4Addr, u16)> for PrinterAddress {
    fn from((ip, port): (Ipv4Addr, u16)) -> Self {
        Self::new(ip.to_string(), port)
    }
}

impl fmt::Display for PrinterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parse `host` or `host:port`
impl FromStr for PrinterAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| AddressError::InvalidPort(port.to_string()))?;
                (host, port)
            }
            None => (s, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(AddressError::Empty);
        }

        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_port() {
        let addr: PrinterAddress = "192.168.1.100".parse().unwrap();
        assert_eq!(addr.host(), "192.168.1.100");
        assert_eq!(addr.port(), 9100);
        assert_eq!(addr.to_string(), "192.168.1.100:9100");
    }

    #[test]
    fn test_parse_explicit_port() {
        let addr: PrinterAddress = " printer.local:9101 ".parse().unwrap();
        assert_eq!(addr.host(), "printer.local");
        assert_eq!(addr.port(), 9101);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!("".parse::<PrinterAddress>(), Err(AddressError::Empty));
        assert_eq!(":9100".parse::<PrinterAddress>(), Err(AddressError::Empty));
        assert_eq!(
            "10.0.0.1:abc".parse::<PrinterAddress>(),
            Err(AddressError::InvalidPort("abc".to_string()))
        );
        assert!("10.0.0.1:0".parse::<PrinterAddress>().is_err());
        assert!("10.0.0.1:70000".parse::<PrinterAddress>().is_err());
    }

    #[test]
    fn test_from_ipv4() {
        let addr = PrinterAddress::from((Ipv4Addr::new(10, 0, 0, 7), 9100));
        assert_eq!(addr, PrinterAddress::with_default_port("10.0.0.7"));
    }
}
