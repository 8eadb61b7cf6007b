//! IPv4 scan range within a /24 network

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::RangeError;

/// Hosts `start..=end` of the network `a.b.c`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanRange {
    base: [u8; 3],
    start: u8,
    end: u8,
}

impl ScanRange {
    pub fn new(base: [u8; 3], start: u8, end: u8) -> Result<Self, RangeError> {
        if start == 0 || end == 0 {
            return Err(RangeError::ZeroHost);
        }
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { base, start, end })
    }

    /// Whole host portion of a /24: `.1` to `.255`
    pub fn subnet(base: [u8; 3]) -> Self {
        Self {
            base,
            start: 1,
            end: 255,
        }
    }

    pub fn base(&self) -> [u8; 3] {
        self.base
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    /// Number of hosts in the range (never zero)
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let [a, b, c, d] = ip.octets();
        [a, b, c] == self.base && (self.start..=self.end).contains(&d)
    }

    /// Host addresses in ascending order
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let [a, b, c] = self.base;
        (self.start..=self.end).map(move |d| Ipv4Addr::new(a, b, c, d))
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.base;
        write!(f, "{a}.{b}.{c}.{}-{}", self.start, self.end)
    }
}

fn parse_octets<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut out = [0u8; N];
    let mut parts = s.trim().split('.');
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    parts.next().is_none().then_some(out)
}

/// Accepts `a.b.c`, `a.b.c.0/24`, `a.b.c.d`, `a.b.c.x-y` and `a.b.c.x-a.b.c.y`
impl FromStr for ScanRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || RangeError::InvalidPrefix(s.to_string());

        if let Some(net) = s.strip_suffix("/24") {
            let [a, b, c, _] = parse_octets::<4>(net).ok_or_else(invalid)?;
            return Ok(Self::subnet([a, b, c]));
        }

        if let Some((lhs, rhs)) = s.split_once('-') {
            let [a, b, c, start] = parse_octets::<4>(lhs).ok_or_else(invalid)?;
            let end = match parse_octets::<4>(rhs) {
                Some([ra, rb, rc, end]) if [ra, rb, rc] == [a, b, c] => end,
                Some(_) => return Err(invalid()),
                None => rhs.trim().parse().map_err(|_| invalid())?,
            };
            return Self::new([a, b, c], start, end);
        }

        if let Some(base) = parse_octets::<3>(s) {
            return Ok(Self::subnet(base));
        }

        let [a, b, c, d] = parse_octets::<4>(s).ok_or_else(invalid)?;
        Self::new([a, b, c], d, d)
    }
}
