//! Core types for TaskFi.
//!
//! Note: `UiStatus` (the derived classification) lives in `state.rs`.
//! `CoarseStatus` here is the tri-state reported by the contract.

use super::record::RecordError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Smallest-denomination units per whole token (18 decimals).
pub const WEI_PER_TOKEN: u128 = 1_000_000_000_000_000_000;
const DECIMALS: usize = 18;

/// A wallet address, compared case-insensitively.
///
/// The original casing is preserved for display. Every creator/viewer
/// comparison in the crate goes through [`Identity::matches`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive address equality.
    #[must_use]
    pub fn matches(&self, other: &Identity) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Shortened `0x1234…abcd` form for terminal output.
    #[must_use]
    pub fn short(&self) -> String {
        let s = self.0.as_str();
        if s.len() <= 12 || !s.is_ascii() {
            return s.to_string();
        }
        format!("{}…{}", &s[..6], &s[s.len() - 4..])
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for Identity {}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

/// A non-negative token quantity held as an integer count of wei.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    #[must_use]
    pub const fn wei(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses a decimal token string such as `"0.05"` or `"12"`.
    ///
    /// Returns `None` for signs, exponents, more than 18 fractional
    /// digits, or values that overflow.
    #[must_use]
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if frac.len() > DECIMALS {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole_wei = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().ok()?.checked_mul(WEI_PER_TOKEN)?
        };
        let frac_wei = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = DECIMALS);
            padded.parse::<u128>().ok()?
        };

        whole_wei.checked_add(frac_wei).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WEI_PER_TOKEN;
        let frac = self.0 % WEI_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0>width$}", width = DECIMALS);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Status as reported by the contract.
///
/// Does not distinguish "awaiting proof" from "awaiting review";
/// see `state::classify()` for the refined view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CoarseStatus {
    InProgress,
    Complete,
    Failed,
}

impl CoarseStatus {
    /// Decodes the contract's enum ordinal.
    #[must_use]
    pub fn from_ordinal(n: i64) -> Option<Self> {
        match n {
            0 => Some(Self::InProgress),
            1 => Some(Self::Complete),
            2 => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for CoarseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "InProgress"),
            Self::Complete => write!(f, "Complete"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for CoarseStatus {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "inprogress" => Ok(Self::InProgress),
            "complete" | "completed" => Ok(Self::Complete),
            "failed" => Ok(Self::Failed),
            _ => Err(RecordError::UnknownStatus(s.to_string())),
        }
    }
}

/// A task snapshot as read from the contract.
///
/// Built only through `record::RawTaskSnapshot::normalize()` or directly
/// in trusted code; the resolver performs no validation of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTaskRecord {
    pub id: u64,
    pub creator: Identity,
    pub description: String,
    pub deposit: Amount,
    /// Unix seconds.
    pub deadline: i64,
    pub coarse_status: CoarseStatus,
    /// Empty until the creator submits proof.
    pub proof_reference: String,
    pub already_claimed: bool,
}

impl RawTaskRecord {
    #[must_use]
    pub fn has_proof(&self) -> bool {
        !self.proof_reference.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_case_insensitive() {
        let a = Identity::new("0xAbCdEf0123456789abcdef0123456789ABCDEF01");
        let b = Identity::new("0xabcdef0123456789abcdef0123456789abcdef01");
        assert!(a.matches(&b));
        assert_eq!(a, b);
        assert_ne!(a, Identity::new("0xabcdef0123456789abcdef0123456789abcdef02"));
    }

    #[test]
    fn test_identity_trims_and_shortens() {
        let id = Identity::new("  0xabcdef0123456789abcdef0123456789abcdef01 ");
        assert_eq!(id.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(id.short(), "0xabcd…ef01");
        assert_eq!(Identity::new("alice").short(), "alice");
    }

    #[test]
    fn test_identity_deserialize_trims() {
        let id: Identity = serde_json::from_str(r#"" 0xAbC ""#).expect("string");
        assert_eq!(id.as_str(), "0xAbC");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), r#""0xAbC""#);
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!(Amount::from_decimal_str("1"), Some(Amount::from_wei(WEI_PER_TOKEN)));
        assert_eq!(
            Amount::from_decimal_str("0.05"),
            Some(Amount::from_wei(50_000_000_000_000_000))
        );
        assert_eq!(Amount::from_decimal_str(".5"), Some(Amount::from_wei(WEI_PER_TOKEN / 2)));
        assert_eq!(Amount::from_decimal_str("0"), Some(Amount::ZERO));
        assert_eq!(Amount::from_decimal_str("-1"), None);
        assert_eq!(Amount::from_decimal_str("1e18"), None);
        assert_eq!(Amount::from_decimal_str("."), None);
        assert_eq!(Amount::from_decimal_str("0.0000000000000000001"), None);
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_wei(WEI_PER_TOKEN * 3).to_string(), "3");
        assert_eq!(Amount::from_wei(1_500_000_000_000_000_000).to_string(), "1.5");
        assert_eq!(Amount::from_wei(1).to_string(), "0.000000000000000001");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn test_coarse_status_parse() {
        assert_eq!("InProgress".parse::<CoarseStatus>().ok(), Some(CoarseStatus::InProgress));
        assert_eq!("in_progress".parse::<CoarseStatus>().ok(), Some(CoarseStatus::InProgress));
        assert_eq!("COMPLETE".parse::<CoarseStatus>().ok(), Some(CoarseStatus::Complete));
        assert_eq!("failed".parse::<CoarseStatus>().ok(), Some(CoarseStatus::Failed));
        assert!("approved".parse::<CoarseStatus>().is_err());
        assert_eq!(CoarseStatus::from_ordinal(1), Some(CoarseStatus::Complete));
        assert_eq!(CoarseStatus::from_ordinal(3), None);
    }
}
