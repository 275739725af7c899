//! Share token codec.
//!
//! Packs a preorder shape string into `"<bit length>.<hex nibbles>"`. Within
//! each nibble the first character of the 4 bit chunk is the least
//! significant bit. Existing share links depend on this exact layout.

use crate::error::{Result, SubnetError};
use regex::Regex;
use std::sync::OnceLock;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| Regex::new(r"^([0-9]+)\.([0-9a-f]+)$").expect("Invalid Regex"))
}

/// Pack a shape string into a share token.
///
/// # Examples
/// ```
/// use subnet_calc::processing::pack;
/// assert_eq!(pack("100"), "3.1");
/// ```
pub fn pack(bits: &str) -> String {
    let hex: String = bits
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            let nibble = chunk
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == b'1')
                .fold(0u32, |acc, (i, _)| acc | (1 << i));
            // nibble < 16
            char::from_digit(nibble, 16).unwrap_or('0')
        })
        .collect();
    format!("{}.{hex}", bits.len())
}

/// Unpack a share token back into its shape string.
pub fn unpack(token: &str) -> Result<String> {
    let caps = get_token_regex()
        .captures(token)
        .ok_or_else(|| SubnetError::Codec(format!("malformed token '{token}'")))?;

    let bit_len: usize = caps[1]
        .parse()
        .map_err(|_| SubnetError::Codec(format!("bit length too large in '{token}'")))?;
    let nibbles: Vec<u32> = caps[2].chars().filter_map(|c| c.to_digit(16)).collect();

    if bit_len.div_ceil(4) > nibbles.len() {
        return Err(SubnetError::Codec(format!(
            "token '{token}' claims {bit_len} bits but holds {}",
            nibbles.len() * 4
        )));
    }

    let bits = (0..bit_len)
        .map(|i| {
            if nibbles[i / 4] & (1 << (i % 4)) != 0 {
                '1'
            } else {
                '0'
            }
        })
        .collect();
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_single_divide() {
        assert_eq!(pack("100"), "3.1");
        assert_eq!(unpack("3.1").unwrap(), "100");
    }

    #[test]
    fn test_pack_multi_nibble() {
        // 1101 -> bits 0,1,3 -> 0xb ; 000 -> 0
        assert_eq!(pack("1101000"), "7.b0");
        assert_eq!(unpack("7.b0").unwrap(), "1101000");
        assert_eq!(pack("0"), "1.0");
        assert_eq!(pack("1111"), "4.f");
    }

    #[test]
    fn test_unpack_malformed() {
        assert!(matches!(unpack("abc"), Err(SubnetError::Codec(_))));
        assert!(matches!(unpack("3.1x"), Err(SubnetError::Codec(_))));
        assert!(matches!(unpack("3.F"), Err(SubnetError::Codec(_))));
        assert!(matches!(unpack(".1"), Err(SubnetError::Codec(_))));
        assert!(matches!(
            unpack("99999999999999999999999.1"),
            Err(SubnetError::Codec(_))
        ));
    }

    #[test]
    fn test_unpack_missing_nibbles() {
        assert!(matches!(unpack("5.1"), Err(SubnetError::Codec(_))));
        assert_eq!(unpack("4.1").unwrap(), "1000");
        // extra nibbles are ignored
        assert_eq!(unpack("2.3f").unwrap(), "11");
    }
}
