//! Value Objects for the catalog

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name carried by a part color that has not been chosen yet.
pub const PLACEHOLDER_COLOR_NAME: &str = "Unconfigured";
const LEGACY_PLACEHOLDER_NAMES: [&str; 1] = ["未配置"];

/// Canonical color: a display name plus `#RRGGBB` uppercase hex.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawColor")]
pub struct ColorValue {
    name: String,
    hex: String,
}

#[derive(Deserialize)]
struct RawColor {
    name: String,
    hex: String,
}

impl TryFrom<RawColor> for ColorValue {
    type Error = ColorValueError;
    fn try_from(raw: RawColor) -> Result<Self, Self::Error> { ColorValue::new(raw.name, &raw.hex) }
}

impl ColorValue {
    /// Builds a color from any 6-digit hex spelling (`#abc123`, `ABC123`).
    pub fn new(name: impl Into<String>, hex: &str) -> Result<Self, ColorValueError> {
        let hex = normalize_hex(hex).ok_or_else(|| ColorValueError::InvalidHex(hex.to_string()))?;
        Ok(Self { name: name.into(), hex })
    }

    pub(crate) fn from_static(name: &str, hex: &'static str) -> Self {
        debug_assert!(normalize_hex(hex).as_deref() == Some(hex));
        Self { name: name.to_string(), hex: hex.to_string() }
    }

    /// Stand-in assigned to parts nobody has colored yet.
    pub fn placeholder() -> Self { Self::from_static(PLACEHOLDER_COLOR_NAME, "#FFFFFF") }

    /// Neutral gray used when a label cannot be resolved.
    pub fn neutral_gray() -> Self { Self::from_static("Neutral Gray", "#CCCCCC") }

    pub fn name(&self) -> &str { &self.name }
    pub fn hex(&self) -> &str { &self.hex }

    pub fn is_placeholder(&self) -> bool {
        let name = self.name.trim();
        name.is_empty() || name == PLACEHOLDER_COLOR_NAME || LEGACY_PLACEHOLDER_NAMES.contains(&name)
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} ({})", self.name, self.hex) }
}

/// Normalizes `#?[0-9a-fA-F]{6}` to `#RRGGBB`.
pub fn normalize_hex(input: &str) -> Option<String> {
    let digits = input.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) { return None; }
    Some(format!("#{}", digits.to_ascii_uppercase()))
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String { format!("#{:02X}{:02X}{:02X}", r, g, b) }

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ColorValueError { InvalidHex(String) }
impl std::error::Error for ColorValueError {}
impl fmt::Display for ColorValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::InvalidHex(s) => write!(f, "invalid hex color '{}'", s) }
    }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn cny(amount: Decimal) -> Self { Self::new(amount, "CNY") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_negative(&self) -> bool { self.amount.is_sign_negative() && !self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl Default for Money { fn default() -> Self { Self::zero("CNY") } }

#[derive(Debug, Clone)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}
