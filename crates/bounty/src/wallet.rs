use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed-point currency amount in hundredths.
///
/// Unsigned on purpose: the only operation on a wallet is a credit, so the
/// balance can never go down.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "CreditsRepr", into = "String")]
pub struct Credits(u64);

impl Credits {
    pub const ZERO: Credits = Credits(0);

    pub const fn from_cents(cents: u64) -> Self {
        Credits(cents)
    }

    pub const fn whole(units: u64) -> Self {
        Credits(units * 100)
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    /// Converts a decimal amount, rounding to the nearest hundredth.
    pub fn from_decimal(value: f64) -> Result<Self, CreditsError> {
        if !value.is_finite() {
            return Err(CreditsError::NotFinite);
        }
        if value < 0.0 {
            return Err(CreditsError::Negative);
        }
        let cents = (value * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(CreditsError::Overflow);
        }
        Ok(Credits(cents as u64))
    }

    pub fn saturating_add(self, other: Credits) -> Credits {
        Credits(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditsError {
    Negative,
    NotFinite,
    Overflow,
    Malformed(String),
}

impl fmt::Display for CreditsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditsError::Negative => write!(f, "credit amounts cannot be negative"),
            CreditsError::NotFinite => write!(f, "credit amount is not a finite number"),
            CreditsError::Overflow => write!(f, "credit amount is too large"),
            CreditsError::Malformed(s) => write!(f, "malformed credit amount '{s}'"),
        }
    }
}

impl std::error::Error for CreditsError {}

impl FromStr for Credits {
    type Err = CreditsError;

    /// Accepts `"15"`, `"15.5"` and `"15.05"`; at most two decimal places.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || CreditsError::Malformed(s.to_string());
        if s.starts_with('-') {
            return Err(CreditsError::Negative);
        }
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() || frac.len() > 2 {
            return Err(malformed());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        let whole: u64 = whole.parse().map_err(|_| CreditsError::Overflow)?;
        let frac: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| malformed())? * 10,
            _ => frac.parse().map_err(|_| malformed())?,
        };
        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Credits)
            .ok_or(CreditsError::Overflow)
    }
}

/// Config files may spell amounts as numbers (`15.0`) or strings (`"15.00"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum CreditsRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<CreditsRepr> for Credits {
    type Error = CreditsError;

    fn try_from(value: CreditsRepr) -> Result<Self, Self::Error> {
        match value {
            CreditsRepr::Number(n) => Credits::from_decimal(n),
            CreditsRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Credits> for String {
    fn from(value: Credits) -> Self {
        value.to_string()
    }
}

/// The user's reward balance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallet {
    balance: Credits,
}

impl Wallet {
    pub fn new(starting_balance: Credits) -> Self {
        Self {
            balance: starting_balance,
        }
    }

    pub fn balance(&self) -> Credits {
        self.balance
    }

    /// Adds `amount` and returns the new balance.
    pub fn credit(&mut self, amount: Credits) -> Credits {
        self.balance = self.balance.saturating_add(amount);
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::{Credits, CreditsError, Wallet};

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Credits::from_cents(11_500).to_string(), "115.00");
        assert_eq!(Credits::from_cents(5).to_string(), "0.05");
        assert_eq!(Credits::whole(15).to_string(), "15.00");
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!("15".parse(), Ok(Credits::whole(15)));
        assert_eq!("15.5".parse(), Ok(Credits::from_cents(1550)));
        assert_eq!("0.05".parse(), Ok(Credits::from_cents(5)));
        assert_eq!("-1".parse::<Credits>(), Err(CreditsError::Negative));
        assert!("1.005".parse::<Credits>().is_err());
        assert!("abc".parse::<Credits>().is_err());
        assert!(".5".parse::<Credits>().is_err());
    }

    #[test]
    fn from_decimal_rounds_to_cents() {
        assert_eq!(Credits::from_decimal(0.125), Ok(Credits::from_cents(13)));
        assert_eq!(Credits::from_decimal(15.004), Ok(Credits::from_cents(1500)));
        assert_eq!(Credits::from_decimal(-0.01), Err(CreditsError::Negative));
        assert_eq!(Credits::from_decimal(f64::NAN), Err(CreditsError::NotFinite));
    }

    #[test]
    fn serde_accepts_numbers_and_strings() {
        let a: Credits = serde_json::from_str("15.0").unwrap();
        let b: Credits = serde_json::from_str("\"15.00\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"15.00\"");
        assert!(serde_json::from_str::<Credits>("-3").is_err());
    }

    #[test]
    fn credit_only_increases_balance() {
        let mut w = Wallet::new(Credits::whole(100));
        assert_eq!(w.credit(Credits::whole(15)), Credits::whole(115));
        assert_eq!(w.credit(Credits::ZERO), Credits::whole(115));
        assert_eq!(w.balance().to_string(), "115.00");
    }
}
