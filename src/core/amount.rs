//! Ledger amounts
//!
//! Native XRP is counted in drops and encoded as a 64-bit word. Issued
//! currency amounts carry a normalized decimal (mantissa in
//! [10^15, 10^16), exponent in [-96, 80]), a currency code and an issuer.

use super::address::AccountId;
use super::codec::{BinaryReader, BinaryWriter, CodecError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest native amount: 100 billion XRP in drops
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;

/// Drops per XRP
pub const DROPS_PER_XRP: u64 = 1_000_000;

const NOT_NATIVE_BIT: u64 = 0x8000_0000_0000_0000;
const POSITIVE_BIT: u64 = 0x4000_0000_0000_0000;
const MANTISSA_MASK: u64 = (1 << 54) - 1;

const MIN_MANTISSA: u64 = 1_000_000_000_000_000;
const MAX_MANTISSA: u64 = 9_999_999_999_999_999;
const MIN_EXPONENT: i64 = -96;
const MAX_EXPONENT: i64 = 80;
const EXPONENT_BIAS: i64 = 97;

/// Errors produced while parsing or decoding amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid drops amount: {0}")]
    InvalidDrops(String),
    #[error("Native amount {0} exceeds the maximum of {MAX_DROPS} drops")]
    DropsOutOfRange(u64),
    #[error("Invalid issued value: {0}")]
    InvalidValue(String),
    #[error("Issued value {0} has more than 16 significant digits")]
    PrecisionLoss(String),
    #[error("Issued value exponent {0} out of range")]
    ExponentOutOfRange(i64),
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("Invalid issuer: {0}")]
    InvalidIssuer(String),
}

// =============================================================================
// Issued value
// =============================================================================

/// Normalized decimal used by issued-currency amounts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssuedValue {
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

impl IssuedValue {
    pub const ZERO: IssuedValue = IssuedValue {
        negative: false,
        mantissa: 0,
        exponent: 0,
    };

    /// Build a value from `(-1)^negative * mantissa * 10^exponent`, normalizing it
    pub fn new(negative: bool, mantissa: u64, exponent: i64) -> Result<Self, AmountError> {
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }

        // Normalizing moves the exponent by at most 19 places
        if !(MIN_EXPONENT - 32..=MAX_EXPONENT + 32).contains(&exponent) {
            return Err(AmountError::ExponentOutOfRange(exponent));
        }

        let mut mantissa = mantissa;
        let mut exponent = exponent;
        while mantissa < MIN_MANTISSA {
            mantissa *= 10;
            exponent -= 1;
        }
        while mantissa > MAX_MANTISSA {
            if mantissa % 10 != 0 {
                return Err(AmountError::PrecisionLoss(mantissa.to_string()));
            }
            mantissa /= 10;
            exponent += 1;
        }

        if exponent < MIN_EXPONENT {
            // Too small to represent
            return Ok(Self::ZERO);
        }
        if exponent > MAX_EXPONENT {
            return Err(AmountError::ExponentOutOfRange(exponent));
        }

        Ok(Self {
            negative,
            mantissa,
            exponent: exponent as i32,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    fn to_bits(self) -> u64 {
        if self.is_zero() {
            return NOT_NATIVE_BIT;
        }
        let sign = if self.negative { 0 } else { POSITIVE_BIT };
        let exponent = (self.exponent as i64 + EXPONENT_BIAS) as u64;
        NOT_NATIVE_BIT | sign | (exponent << 54) | self.mantissa
    }

    fn from_bits(bits: u64) -> Result<Self, AmountError> {
        let mantissa = bits & MANTISSA_MASK;
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }
        if !(MIN_MANTISSA..=MAX_MANTISSA).contains(&mantissa) {
            return Err(AmountError::InvalidValue(format!(
                "non-canonical mantissa {}",
                mantissa
            )));
        }

        let exponent = ((bits >> 54) & 0xFF) as i64 - EXPONENT_BIAS;
        if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return Err(AmountError::ExponentOutOfRange(exponent));
        }

        Ok(Self {
            negative: bits & POSITIVE_BIT == 0,
            mantissa,
            exponent: exponent as i32,
        })
    }
}

impl FromStr for IssuedValue {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AmountError::InvalidValue(s.to_string());

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (number, exponent) = match body.find(|c| c == 'e' || c == 'E') {
            Some(i) => (
                &body[..i],
                body[i + 1..].parse::<i64>().map_err(|_| invalid())?,
            ),
            None => (body, 0),
        };

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part
            .chars()
            .chain(frac_part.chars())
            .all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let digits = format!("{}{}", int_part, frac_part);
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self::ZERO);
        }

        let significant = digits.trim_end_matches('0');
        if significant.len() > 16 {
            return Err(AmountError::PrecisionLoss(s.to_string()));
        }

        let exponent = exponent
            .checked_sub(frac_part.len() as i64)
            .and_then(|e| e.checked_add((digits.len() - significant.len()) as i64))
            .ok_or_else(invalid)?;
        let mantissa = significant.parse::<u64>().map_err(|_| invalid())?;

        Self::new(negative, mantissa, exponent)
    }
}

impl fmt::Display for IssuedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let mut mantissa = self.mantissa;
        let mut exponent = self.exponent as i64;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }

        if self.negative {
            f.write_str("-")?;
        }

        let digits = mantissa.to_string();
        if exponent >= 0 {
            return write!(f, "{}{}", digits, "0".repeat(exponent as usize));
        }

        let point = digits.len() as i64 + exponent;
        if point > 0 {
            let (int_part, frac_part) = digits.split_at(point as usize);
            write!(f, "{}.{}", int_part, frac_part)
        } else {
            write!(f, "0.{}{}", "0".repeat((-point) as usize), digits)
        }
    }
}

// =============================================================================
// Currency
// =============================================================================

/// 160-bit currency code
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency([u8; 20]);

impl Currency {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Three-character ISO-style code, if this is a standard currency
    pub fn standard_code(&self) -> Option<&str> {
        let is_standard = self.0[..12].iter().all(|b| *b == 0)
            && self.0[15..].iter().all(|b| *b == 0)
            && self.0[12..15].iter().all(|b| b.is_ascii_graphic());
        if is_standard {
            std::str::from_utf8(&self.0[12..15]).ok()
        } else {
            None
        }
    }
}

impl FromStr for Currency {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 3 && s.chars().all(|c| c.is_ascii_graphic()) {
            if s == "XRP" {
                return Err(AmountError::InvalidCurrency(
                    "XRP cannot be an issued currency".to_string(),
                ));
            }
            let mut bytes = [0u8; 20];
            bytes[12..15].copy_from_slice(s.as_bytes());
            return Ok(Self(bytes));
        }

        let decoded = hex::decode(s).map_err(|_| AmountError::InvalidCurrency(s.to_string()))?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|_| AmountError::InvalidCurrency(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standard_code() {
            Some(code) => f.write_str(code),
            None => f.write_str(&hex::encode_upper(self.0)),
        }
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self)
    }
}

// =============================================================================
// Amount
// =============================================================================

/// Issued-currency amount
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedAmount {
    pub value: IssuedValue,
    pub currency: Currency,
    pub issuer: AccountId,
}

/// A native or issued amount
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Amount {
    /// XRP in drops
    Native(u64),
    Issued(IssuedAmount),
}

impl Amount {
    /// Native amount, checked against the supply ceiling
    pub fn from_drops(drops: u64) -> Result<Self, AmountError> {
        if drops > MAX_DROPS {
            return Err(AmountError::DropsOutOfRange(drops));
        }
        Ok(Amount::Native(drops))
    }

    pub fn issued(value: &str, currency: &str, issuer: &str) -> Result<Self, AmountError> {
        Ok(Amount::Issued(IssuedAmount {
            value: value.parse()?,
            currency: currency.parse()?,
            issuer: issuer
                .parse()
                .map_err(|_| AmountError::InvalidIssuer(issuer.to_string()))?,
        }))
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Amount::Native(_))
    }

    /// Drops of a native amount
    pub fn drops(&self) -> Option<u64> {
        match self {
            Amount::Native(drops) => Some(*drops),
            Amount::Issued(_) => None,
        }
    }

    /// Append the canonical binary encoding
    ///
    /// Native amounts above `MAX_DROPS` would spill into the type bits and
    /// are refused.
    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<(), CodecError> {
        match self {
            Amount::Native(drops) => {
                if *drops > MAX_DROPS {
                    return Err(AmountError::DropsOutOfRange(*drops).into());
                }
                writer.write_u64(POSITIVE_BIT | drops);
            }
            Amount::Issued(issued) => {
                writer.write_u64(issued.value.to_bits());
                writer.write_bytes(issued.currency.as_bytes());
                writer.write_bytes(issued.issuer.as_bytes());
            }
        }
        Ok(())
    }

    /// Read one amount from the canonical binary encoding
    pub fn read_from(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let bits = reader.read_u64()?;

        if bits & NOT_NATIVE_BIT == 0 {
            let drops = bits & !POSITIVE_BIT;
            if bits & POSITIVE_BIT == 0 && drops != 0 {
                return Err(AmountError::InvalidDrops("negative native amount".to_string()).into());
            }
            return Ok(Amount::from_drops(drops)?);
        }

        let value = IssuedValue::from_bits(bits)?;
        let currency = Currency::from_bytes(reader.read_array::<20>()?);
        let issuer = AccountId::from_bytes(reader.read_array::<20>()?);
        Ok(Amount::Issued(IssuedAmount {
            value,
            currency,
            issuer,
        }))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// `"13000000"` is drops; `"1.5/USD/r..."` is an issued amount
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [drops] => {
                let drops = drops
                    .parse::<u64>()
                    .map_err(|_| AmountError::InvalidDrops(s.to_string()))?;
                Amount::from_drops(drops)
            }
            [value, currency, issuer] => Amount::issued(value, currency, issuer),
            _ => Err(AmountError::InvalidValue(s.to_string())),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Native(drops) => write!(f, "{}", drops),
            Amount::Issued(issued) => {
                write!(f, "{}/{}/{}", issued.value, issued.currency, issued.issuer)
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
struct IssuedAmountJson {
    currency: String,
    issuer: String,
    value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountJson {
    Drops(String),
    Issued(IssuedAmountJson),
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Amount::Native(drops) => serializer.serialize_str(&drops.to_string()),
            Amount::Issued(issued) => IssuedAmountJson {
                currency: issued.currency.to_string(),
                issuer: issued.issuer.to_address(),
                value: issued.value.to_string(),
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AmountJson::deserialize(deserializer)? {
            AmountJson::Drops(drops) => drops
                .parse::<u64>()
                .map_err(|_| AmountError::InvalidDrops(drops.clone()))
                .and_then(Amount::from_drops)
                .map_err(serde::de::Error::custom),
            AmountJson::Issued(json) => Amount::issued(&json.value, &json.currency, &json.issuer)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "rsHYGX2AoQ4tXqFywzEeeTDgXFTUfL1Fw9";

    fn encode(amount: &Amount) -> String {
        let mut writer = BinaryWriter::new();
        amount.write_to(&mut writer).unwrap();
        hex::encode(writer.into_bytes())
    }

    #[test]
    fn test_native_encoding() {
        let amount: Amount = "13000000".parse().unwrap();
        assert_eq!(amount.drops(), Some(13_000_000));
        assert_eq!(encode(&amount), "4000000000c65d40");
        assert_eq!(encode(&Amount::Native(0)), "4000000000000000");
    }

    #[test]
    fn test_native_ceiling() {
        assert!(Amount::from_drops(MAX_DROPS).is_ok());
        assert_eq!(
            Amount::from_drops(MAX_DROPS + 1),
            Err(AmountError::DropsOutOfRange(MAX_DROPS + 1))
        );
    }

    #[test]
    fn test_native_encoding_refuses_overflow() {
        let mut writer = BinaryWriter::new();
        assert_eq!(
            Amount::Native(u64::MAX).write_to(&mut writer),
            Err(CodecError::Amount(AmountError::DropsOutOfRange(u64::MAX)))
        );
        assert!(Amount::Native(MAX_DROPS).write_to(&mut writer).is_ok());
    }

    #[test]
    fn test_issued_value_extreme_exponent() {
        assert!(matches!(
            "1e-9223372036854775808".parse::<IssuedValue>(),
            Err(AmountError::ExponentOutOfRange(_))
        ));
        assert!(matches!(
            "1e9223372036854775807".parse::<IssuedValue>(),
            Err(AmountError::ExponentOutOfRange(_))
        ));
        assert!(matches!(
            IssuedValue::new(false, 1, i64::MIN),
            Err(AmountError::ExponentOutOfRange(_))
        ));
        // Still within the normalizing window
        assert!("1e-100".parse::<IssuedValue>().unwrap().is_zero());
        assert_eq!("1e80".parse::<IssuedValue>().unwrap().exponent(), 65);
    }

    #[test]
    fn test_issued_value_parsing() {
        let value: IssuedValue = "1".parse().unwrap();
        assert_eq!(value.mantissa(), 1_000_000_000_000_000);
        assert_eq!(value.exponent(), -15);

        let value: IssuedValue = "-0.0025".parse().unwrap();
        assert!(value.is_negative());
        assert_eq!(value.to_string(), "-0.0025");

        let value: IssuedValue = "1.5e3".parse().unwrap();
        assert_eq!(value.to_string(), "1500");

        assert!("0.000".parse::<IssuedValue>().unwrap().is_zero());
        assert!("abc".parse::<IssuedValue>().is_err());
        assert!(".".parse::<IssuedValue>().is_err());
        assert!(matches!(
            "12345678901234567".parse::<IssuedValue>(),
            Err(AmountError::PrecisionLoss(_))
        ));
    }

    #[test]
    fn test_issued_value_bits() {
        // 1 USD: positive, exponent -15, mantissa 10^15
        let value: IssuedValue = "1".parse().unwrap();
        assert_eq!(value.to_bits(), 0xD4838D7EA4C68000);
        assert_eq!(IssuedValue::from_bits(0xD4838D7EA4C68000).unwrap(), value);
        assert_eq!(IssuedValue::ZERO.to_bits(), 0x8000000000000000);
    }

    #[test]
    fn test_issued_amount_binary() {
        let amount = Amount::issued("1", "USD", ISSUER).unwrap();
        let mut writer = BinaryWriter::new();
        amount.write_to(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 48);

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(Amount::read_from(&mut reader).unwrap(), amount);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_currency_codes() {
        let usd: Currency = "USD".parse().unwrap();
        assert_eq!(usd.standard_code(), Some("USD"));
        assert_eq!(usd.to_string(), "USD");
        assert!("XRP".parse::<Currency>().is_err());

        let custom: Currency = "0158415500000000C1F76FF6ECB0BAC600000000".parse().unwrap();
        assert_eq!(custom.standard_code(), None);
        assert_eq!(custom.to_string(), "0158415500000000C1F76FF6ECB0BAC600000000");
    }

    #[test]
    fn test_amount_json() {
        let native: Amount = "50".parse().unwrap();
        assert_eq!(serde_json::to_string(&native).unwrap(), "\"50\"");

        let issued = Amount::issued("12.5", "USD", ISSUER).unwrap();
        let json = serde_json::to_value(&issued).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["issuer"], ISSUER);
        assert_eq!(json["value"], "12.5");

        let back: Amount = serde_json::from_value(json).unwrap();
        assert_eq!(back, issued);
    }

    #[test]
    fn test_amount_display_roundtrip() {
        let text = format!("12.5/USD/{}", ISSUER);
        let amount: Amount = text.parse().unwrap();
        assert_eq!(amount.to_string(), text);
        assert!("1/2".parse::<Amount>().is_err());
        assert!("-5".parse::<Amount>().is_err());
    }
}
