//! # Account Id Normalization
//!
//! Two id families are accepted:
//!
//! | Form | Example | Canonical form |
//! |------|---------|----------------|
//! | Native (43 chars, base64url) | `FyINHRSrHW0teUhvJzd6R33Tl50qxLnSj8LJCP5puiI` | unchanged |
//! | EVM (40 hex digits, optional `0x`) | `0x5aaeb605...` | `0x` + EIP-55 checksum |
//!
//! Everything else is rejected.

use super::errors::AddressError;
use super::value_objects::AccountId;
use sha3::{Digest, Keccak256};

/// Length of a native (base64url, unpadded 32-byte) id.
pub const NATIVE_ID_LEN: usize = 43;

/// Hex digits in an EVM address.
pub const EVM_HEX_LEN: usize = 40;

/// Validate and canonicalize an account id.
pub fn normalize(raw: &str) -> Result<AccountId, AddressError> {
    if raw.is_empty() {
        return Err(AddressError::Empty);
    }

    if raw.len() == NATIVE_ID_LEN {
        check_alphabet(raw, 0, is_base64url)?;
        check_trailing_bits(raw)?;
        return Ok(AccountId::from_canonical(raw));
    }

    let (hex_part, offset) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(rest) => (rest, 2),
        None => (raw, 0),
    };
    if hex_part.len() != EVM_HEX_LEN {
        return Err(AddressError::InvalidLength(raw.len()));
    }
    check_alphabet(hex_part, offset, |b| b.is_ascii_hexdigit())?;

    Ok(AccountId::from_canonical(to_checksum(hex_part)))
}

/// Whether `raw` normalizes.
pub fn is_valid(raw: &str) -> bool {
    normalize(raw).is_ok()
}

fn is_base64url(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn base64url_value(b: u8) -> u8 {
    match b {
        b'A'..=b'Z' => b - b'A',
        b'a'..=b'z' => b - b'a' + 26,
        b'0'..=b'9' => b - b'0' + 52,
        b'-' => 62,
        _ => 63,
    }
}

/// 43 chars carry 258 bits; the two spare bits of the last one must be zero.
fn check_trailing_bits(s: &str) -> Result<(), AddressError> {
    match s.bytes().last() {
        Some(last) if base64url_value(last) & 0b11 != 0 => {
            Err(AddressError::TrailingBits(char::from(last)))
        }
        _ => Ok(()),
    }
}

fn check_alphabet(s: &str, offset: usize, allowed: impl Fn(u8) -> bool) -> Result<(), AddressError> {
    match s.char_indices().find(|(_, c)| !c.is_ascii() || !allowed(*c as u8)) {
        Some((position, ch)) => Err(AddressError::InvalidCharacter {
            ch,
            position: position + offset,
        }),
        None => Ok(()),
    }
}

/// EIP-55 mixed-case checksum of 40 hex digits.
fn to_checksum(hex_digits: &str) -> String {
    let lower = hex_digits.to_ascii_lowercase();
    let hash = Keccak256::digest(lower.as_bytes());
    let hash_hex = hex::encode(hash);

    let mut out = String::with_capacity(2 + EVM_HEX_LEN);
    out.push_str("0x");
    for (c, h) in lower.chars().zip(hash_hex.bytes()) {
        // nibble >= 8 means uppercase
        if c.is_ascii_alphabetic() && h >= b'8' {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
