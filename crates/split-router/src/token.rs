use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::SwapError;

/// ERC-20 style token description supplied by the caller
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub decimals: u8,
    pub chain_id: u64,
}

impl Token {
    pub fn new(
        address: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
        chain_id: u64,
    ) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            name: name.into(),
            decimals,
            chain_id,
        }
    }

    /// Parse the token address, rejecting anything that is not a 0x-prefixed 20 byte hex string
    pub fn parse_address(&self) -> Result<Address, SwapError> {
        parse_token_address(&self.address)
    }
}

/// Tokens are equal when their addresses match, ignoring case
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address.trim().eq_ignore_ascii_case(other.address.trim())
    }
}

impl Eq for Token {}

pub fn parse_token_address(raw: &str) -> Result<Address, SwapError> {
    let trimmed = raw.trim();
    let has_prefix = trimmed.starts_with("0x") || trimmed.starts_with("0X");
    if !has_prefix || trimmed.len() != 42 {
        return Err(SwapError::InvalidTokens(format!("malformed token address {raw:?}")));
    }
    trimmed[2..]
        .parse::<Address>()
        .map_err(|e| SwapError::InvalidTokens(format!("malformed token address {raw:?}: {e}")))
}

/// Validate a source/destination pair and return the parsed addresses
pub fn validate_pair(src: &Token, dst: &Token) -> Result<(Address, Address), SwapError> {
    let src_address = src.parse_address()?;
    let dst_address = dst.parse_address()?;
    if src_address == dst_address {
        return Err(SwapError::InvalidTokens(format!(
            "source and destination are the same token {src_address}"
        )));
    }
    Ok((src_address, dst_address))
}

/// Convert a human readable decimal amount into base units.
///
/// Accepts `123`, `1.5`, `.5` and `5.`; zero, signs, exponents, and more
/// fractional digits than `decimals` are rejected.
pub fn from_token_amount(amount: &str, decimals: u8) -> Result<U256, SwapError> {
    let trimmed = amount.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(SwapError::InvalidAmount(format!("{amount:?} is not a number")));
    }
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(frac) {
        return Err(SwapError::InvalidAmount(format!("{amount:?} is not a number")));
    }
    if frac.len() > decimals as usize {
        return Err(SwapError::InvalidAmount(format!(
            "{amount:?} has more than {decimals} fractional digits"
        )));
    }

    let digits = format!("{whole}{frac:0<width$}", width = decimals as usize);
    let value = U256::from_str_radix(&digits, 10)
        .map_err(|e| SwapError::InvalidAmount(format!("{amount:?} is out of range: {e}")))?;

    if value.is_zero() {
        return Err(SwapError::InvalidAmount("amount must be greater than zero".to_string()));
    }
    Ok(value)
}

/// Format a base unit amount back into a decimal string, trimming trailing zeros
pub fn to_token_amount(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: &str = "0x29ee6138dd4c9815f46d34a4a1ed48f46758a402";

    #[test]
    fn test_from_token_amount() {
        assert_eq!(
            from_token_amount("1.5", 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u128)
        );
        assert_eq!(from_token_amount("250", 6).unwrap(), U256::from(250_000_000u64));
        assert_eq!(from_token_amount(".5", 2).unwrap(), U256::from(50));
        assert_eq!(from_token_amount("7.", 0).unwrap(), U256::from(7));
        assert_eq!(from_token_amount(" 0.000001 ", 6).unwrap(), U256::from(1));
    }

    #[test]
    fn test_invalid_amounts() {
        for bad in ["", ".", "0", "0.000", "-1", "+1", "abc", "1e18", "1.2.3", "1,5"] {
            let err = from_token_amount(bad, 18).unwrap_err();
            assert_eq!(err.code(), "INVALID_AMOUNT", "{bad:?} should be rejected");
        }
        // More precision than the token supports
        assert!(from_token_amount("0.0000001", 6).is_err());
        // Does not fit in 256 bits
        assert!(from_token_amount(&"9".repeat(80), 18).is_err());
    }

    #[test]
    fn test_to_token_amount() {
        assert_eq!(to_token_amount(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(to_token_amount(U256::from(1u64), 6), "0.000001");
        assert_eq!(to_token_amount(U256::from(42_000_000u64), 6), "42");
        assert_eq!(to_token_amount(U256::ZERO, 18), "0");
        assert_eq!(to_token_amount(U256::from(12u64), 0), "12");
    }

    #[test]
    fn test_token_equality_ignores_case() {
        let lower = Token::new(USDC, "USDC.e", "Bridged USDC", 6, 3637);
        let upper = Token::new(USDC.to_uppercase().replace("0X", "0x"), "USDC", "", 6, 3637);
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_validate_pair() {
        let usdc = Token::new(USDC, "USDC.e", "", 6, 3637);
        let same = Token::new(USDC.to_uppercase().replace("0X", "0x"), "USDC.e", "", 6, 3637);
        assert_eq!(validate_pair(&usdc, &same).unwrap_err().code(), "INVALID_TOKENS");

        let malformed = Token::new("0x1234", "BAD", "", 18, 3637);
        assert_eq!(validate_pair(&usdc, &malformed).unwrap_err().code(), "INVALID_TOKENS");

        let no_prefix = Token::new(&USDC[2..], "BAD", "", 6, 3637);
        assert_eq!(no_prefix.parse_address().unwrap_err().code(), "INVALID_TOKENS");
    }
}
