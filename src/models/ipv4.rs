//! IPv4 address and CIDR arithmetic.
//!
//! Addresses are plain `u32` values in host order. Counts are `u64` so a /0
//! (2^32 addresses) is representable. [`Ipv4`] pairs an address with a mask
//! length for display, ordering and (de)serialization.

use crate::error::{Result, SubnetError};
use itertools::Itertools;
use regex::Regex;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::OnceLock;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

static ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_address_regex() -> &'static Regex {
    ADDRESS_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})$")
            .expect("Invalid Regex")
    })
}

fn check_mask(mask: u8) -> Result<()> {
    if mask > MAX_LENGTH {
        Err(SubnetError::Range(format!("mask /{mask} is longer than /32")))
    } else {
        Ok(())
    }
}

/// Parse a dotted-quad address such as `192.168.1.1` into its `u32` value.
///
/// Exactly four groups of one to three decimal digits, nothing else.
///
/// # Examples
/// ```
/// use subnet_calc::models::parse_address;
/// assert_eq!(parse_address("192.168.1.1").unwrap(), 3232235777);
/// ```
pub fn parse_address(text: &str) -> Result<u32> {
    let caps = get_address_regex()
        .captures(text)
        .ok_or_else(|| SubnetError::Parse(format!("invalid address '{text}'")))?;

    let mut addr = 0u32;
    for i in 1..=4 {
        // at most three digits, always fits
        let octet: u16 = caps[i]
            .parse()
            .map_err(|_| SubnetError::Parse(format!("invalid octet in '{text}'")))?;
        if octet > 255 {
            return Err(SubnetError::Range(format!("octet {octet} in '{text}' is above 255")));
        }
        addr = (addr << 8) | u32::from(octet);
    }
    Ok(addr)
}

/// Parse a mask length, accepting an optional leading `/`.
pub fn parse_mask(text: &str) -> Result<u8> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let value: i64 = trimmed
        .parse()
        .map_err(|_| SubnetError::Parse(format!("invalid mask '{text}'")))?;
    if !(0..=i64::from(MAX_LENGTH)).contains(&value) {
        return Err(SubnetError::Range(format!("mask {value} is outside 0..=32")));
    }
    Ok(value as u8)
}

/// Render an address as `a.b.c.d`.
pub fn format_address(addr: u32) -> String {
    octets(addr).iter().join(".")
}

/// Render an address as four dot-separated, zero padded 8 bit groups.
pub fn format_binary(addr: u32) -> String {
    octets(addr)
        .iter()
        .map(|octet| format!("{octet:08b}"))
        .join(".")
}

fn octets(addr: u32) -> [u32; 4] {
    [24, 16, 8, 0].map(|shift| (addr >> shift) & 0xFF)
}

/// Clear the host bits of `addr` for the given mask length.
pub fn network_address(addr: u32, mask: u8) -> Result<u32> {
    check_mask(mask)?;
    let right_len = MAX_LENGTH - mask;
    let bits = u64::from(addr);
    Ok(((bits >> right_len) << right_len) as u32)
}

/// Number of addresses in a block of the given mask length.
///
/// # Examples
/// ```
/// use subnet_calc::models::address_count;
/// assert_eq!(address_count(0).unwrap(), 1u64 << 32);
/// assert_eq!(address_count(32).unwrap(), 1);
/// ```
pub fn address_count(mask: u8) -> Result<u64> {
    check_mask(mask)?;
    Ok(1u64 << (MAX_LENGTH - mask))
}

/// Last address of the block starting at `network_addr`.
pub fn last_address(network_addr: u32, mask: u8) -> Result<u32> {
    let last = u64::from(network_addr) + address_count(mask)? - 1;
    u32::try_from(last).map_err(|_| {
        SubnetError::Range(format!(
            "{}/{mask} runs past 255.255.255.255",
            format_address(network_addr)
        ))
    })
}

/// Netmask for a mask length, e.g. 24 -> 255.255.255.0.
pub fn netmask(mask: u8) -> Result<u32> {
    network_address(u32::MAX, mask)
}

/// Usable host range of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsableRange {
    pub first: u32,
    pub last: u32,
    pub hosts: u64,
}

/// Usable host range, honouring /31 point-to-point links (RFC 3021) and /32
/// single hosts.
pub fn usable_range(network_addr: u32, mask: u8) -> Result<UsableRange> {
    let last = last_address(network_addr, mask)?;
    let range = match mask {
        32 => UsableRange {
            first: network_addr,
            last: network_addr,
            hosts: 1,
        },
        31 => UsableRange {
            first: network_addr,
            last,
            hosts: 2,
        },
        _ => UsableRange {
            first: network_addr + 1,
            last: last - 1,
            hosts: address_count(mask)? - 2,
        },
    };
    Ok(range)
}

/// IPv4 network with CIDR mask length.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The subnet mask length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(|e| de::Error::custom(format!("invalid CIDR '{s}': {e}")))
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| SubnetError::Parse(format!("invalid address/mask '{addr_cidr}'")))?;
        Ok(Ipv4::from_parts(parse_address(addr)?, parse_mask(mask)?))
    }

    /// Build from a `u32` address and mask length, without alignment.
    pub fn from_parts(addr: u32, mask: u8) -> Ipv4 {
        Ipv4 {
            addr: Ipv4Addr::from(addr),
            mask,
        }
    }

    /// The address as `u32`.
    pub fn bits(&self) -> u32 {
        u32::from(self.addr)
    }

    /// Lowest (network) address.
    pub fn lo(&self) -> Result<u32> {
        network_address(self.bits(), self.mask)
    }

    /// Highest (broadcast) address.
    pub fn hi(&self) -> Result<u32> {
        last_address(self.lo()?, self.mask)
    }

    /// True when the address has no host bits set for its mask.
    pub fn is_aligned(&self) -> bool {
        self.lo().is_ok_and(|lo| lo == self.bits())
    }

    /// Copy with the host bits cleared.
    pub fn aligned(&self) -> Result<Ipv4> {
        Ok(Ipv4::from_parts(self.lo()?, self.mask))
    }

    /// True when `other` lies completely inside this block.
    pub fn contains(&self, other: &Ipv4) -> bool {
        match (self.lo(), self.hi(), other.lo(), other.hi()) {
            (Ok(lo), Ok(hi), Ok(other_lo), Ok(other_hi)) => {
                other.mask >= self.mask && other_lo >= lo && other_hi <= hi
            }
            _ => false,
        }
    }

    /// The two halves of this block, or `None` for a /32.
    pub fn halves(&self) -> Option<(Ipv4, Ipv4)> {
        if self.mask >= MAX_LENGTH {
            return None;
        }
        let lo = self.lo().ok()?;
        let child_mask = self.mask + 1;
        let step = address_count(child_mask).ok()?;
        Some((
            Ipv4::from_parts(lo, child_mask),
            Ipv4::from_parts((u64::from(lo) + step) as u32, child_mask),
        ))
    }

    /// Label key, `"<decimal address>/<mask>"`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.bits(), self.mask)
    }
}

impl FromStr for Ipv4 {
    type Err = SubnetError;

    fn from_str(s: &str) -> Result<Self> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("192.168.1.1").unwrap(), 3232235777);
        assert_eq!(parse_address("0.0.0.0").unwrap(), 0);
        assert_eq!(parse_address("255.255.255.255").unwrap(), u32::MAX);
        assert!(matches!(
            parse_address("192.168.1"),
            Err(SubnetError::Parse(_))
        ));
        assert!(matches!(
            parse_address(" 10.0.0.1"),
            Err(SubnetError::Parse(_))
        ));
        assert!(matches!(
            parse_address("10.0.0.1x"),
            Err(SubnetError::Parse(_))
        ));
        assert!(matches!(
            parse_address("10.0.0.1234"),
            Err(SubnetError::Parse(_))
        ));
        assert!(matches!(
            parse_address("10.256.0.1"),
            Err(SubnetError::Range(_))
        ));
    }

    #[test]
    fn test_parse_mask() {
        assert_eq!(parse_mask("24").unwrap(), 24);
        assert_eq!(parse_mask("/0").unwrap(), 0);
        assert_eq!(parse_mask(" 32 ").unwrap(), 32);
        assert!(matches!(parse_mask("33"), Err(SubnetError::Range(_))));
        assert!(matches!(parse_mask("-1"), Err(SubnetError::Range(_))));
        assert!(matches!(parse_mask("abc"), Err(SubnetError::Parse(_))));
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address(3232235776), "192.168.1.0");
        assert_eq!(format_address(u32::MAX), "255.255.255.255");
        assert_eq!(
            format_binary(3232235777),
            "11000000.10101000.00000001.00000001"
        );
    }

    #[test]
    fn test_network_address() {
        assert_eq!(network_address(3232235777, 24).unwrap(), 3232235776);
        assert_eq!(network_address(3232235777, 32).unwrap(), 3232235777);
        assert_eq!(network_address(3232235777, 0).unwrap(), 0);
        assert!(network_address(1, 33).is_err());
    }

    #[test]
    fn test_netmask() {
        assert_eq!(netmask(0).unwrap(), 0x00000000);
        assert_eq!(netmask(8).unwrap(), 0xFF000000);
        assert_eq!(netmask(24).unwrap(), 0xFFFFFF00);
        assert_eq!(netmask(32).unwrap(), 0xFFFFFFFF);
        assert!(netmask(33).is_err());
    }

    #[test]
    fn test_address_count_and_last() {
        assert_eq!(address_count(0).unwrap(), 4294967296);
        assert_eq!(address_count(24).unwrap(), 256);
        assert_eq!(address_count(32).unwrap(), 1);
        assert_eq!(last_address(0, 0).unwrap(), u32::MAX);
        assert_eq!(
            last_address(parse_address("10.0.0.0").unwrap(), 8).unwrap(),
            parse_address("10.255.255.255").unwrap()
        );
        assert!(last_address(u32::MAX, 24).is_err());
    }

    #[test]
    fn test_usable_range() {
        let net = parse_address("192.168.1.0").unwrap();
        let r = usable_range(net, 24).unwrap();
        assert_eq!(format_address(r.first), "192.168.1.1");
        assert_eq!(format_address(r.last), "192.168.1.254");
        assert_eq!(r.hosts, 254);

        let r = usable_range(net, 31).unwrap();
        assert_eq!((r.first, r.last, r.hosts), (net, net + 1, 2));

        let r = usable_range(net, 32).unwrap();
        assert_eq!((r.first, r.last, r.hosts), (net, net, 1));

        let r = usable_range(0, 0).unwrap();
        assert_eq!(r.hosts, 4294967294);
    }

    #[test]
    fn test_ipv4_new() {
        let ip = Ipv4::new("10.0.0.5/24").unwrap();
        assert_eq!(ip.addr, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(ip.mask, 24);
        assert!(!ip.is_aligned());
        assert_eq!(ip.aligned().unwrap().to_string(), "10.0.0.0/24");
        assert!(Ipv4::new("10.0.0.0").is_err());
        assert!(Ipv4::new("10.0.0.0/40").is_err());
        assert_eq!("10.0.0.0/8".parse::<Ipv4>().unwrap().mask, 8);
    }

    #[test]
    fn test_ipv4_halves_and_contains() {
        let ip = Ipv4::new("10.0.0.0/24").unwrap();
        let (left, right) = ip.halves().unwrap();
        assert_eq!(left.to_string(), "10.0.0.0/25");
        assert_eq!(right.to_string(), "10.0.0.128/25");
        assert!(ip.contains(&right));
        assert!(!right.contains(&ip));
        assert!(Ipv4::new("1.2.3.4/32").unwrap().halves().is_none());

        let all = Ipv4::new("0.0.0.0/0").unwrap();
        let (_, upper) = all.halves().unwrap();
        assert_eq!(upper.to_string(), "128.0.0.0/1");
    }

    #[test]
    fn test_ipv4_key_and_serde() {
        let ip = Ipv4::new("192.168.1.0/24").unwrap();
        assert_eq!(ip.key(), "3232235776/24");
        let json = serde_json::to_string(&ip).unwrap();
        assert_eq!(json, "\"192.168.1.0/24\"");
        let back: Ipv4 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ip);
    }

    #[test]
    fn test_ip4_cmp() {
        let ip1 = Ipv4::new("10.0.0.1/24").unwrap();
        let ip2 = Ipv4::new("10.0.0.2/24").unwrap();
        let ip3 = Ipv4::new("10.0.0.0/8").unwrap();
        assert!(ip1 < ip2);
        assert!(ip3 < ip1);
    }
}
