use std::{fmt, str::FromStr};

use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal,
};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// Longest suffixes first so "Ohms" is not read as "Ohm" + "s"
const UNIT_SUFFIXES: [&str; 6] = ["Ohms", "ohms", "Ohm", "ohm", "\u{3a9}", "\u{2126}"];

const SI_PREFIXES: [(i32, &str); 8] = [
    (9, "G"),
    (6, "M"),
    (3, "k"),
    (0, ""),
    (-3, "m"),
    (-6, "u"),
    (-9, "n"),
    (-12, "p"),
];

/// Displayed values are rounded to this many decimal places after scaling
const DISPLAY_DP: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid resistance format")]
    InvalidFormat,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unknown multiplier '{0}'")]
    InvalidMultiplier(String),
    #[error("Value out of range")]
    OutOfRange,
}

/// A resistance in ohms.
///
/// Parsing accepts the notations found on schematics and BOMs:
/// plain numbers (`470`, `1e3`), SI prefixes (`4.7k`, `1M`), an optional
/// unit suffix (`10kOhm`, `220Ω`) and RKM codes (`4k7`, `4R7`, `1M5`).
///
/// Values are exact decimals: magnitudes above roughly 7.9e28 Ω, or needing
/// more than 28 decimal places, are rejected with [`ParseError::OutOfRange`].
/// Below 1 pΩ the display keeps six decimal places of picohms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resistance {
    #[serde(with = "rust_decimal::serde::str")]
    ohms: Decimal,
}

impl Resistance {
    pub fn from_decimal(ohms: Decimal) -> Self {
        Self { ohms }
    }

    /// Returns `None` for non-finite input.
    pub fn from_f64(ohms: f64) -> Option<Self> {
        Decimal::from_f64(ohms).map(Self::from_decimal)
    }

    pub fn ohms(&self) -> Decimal {
        self.ohms
    }

    pub fn to_f64(&self) -> f64 {
        self.ohms.to_f64().unwrap_or(f64::NAN)
    }

    pub fn is_positive(&self) -> bool {
        self.ohms > Decimal::ZERO
    }
}

#[inline]
fn pow10(exp: i32) -> Decimal {
    if exp >= 0 {
        Decimal::from_i128_with_scale(10i128.pow(exp as u32), 0)
    } else {
        Decimal::new(1, (-exp) as u32)
    }
}

fn multiplier(code: &str) -> Result<Decimal, ParseError> {
    match code {
        "" | "R" | "r" => Ok(Decimal::ONE),
        "k" | "K" => Ok(dec!(1000)),
        "M" => Ok(pow10(6)),
        "G" => Ok(pow10(9)),
        "m" => Ok(pow10(-3)),
        "u" | "µ" => Ok(pow10(-6)),
        "n" => Ok(pow10(-9)),
        "p" => Ok(pow10(-12)),
        other => Err(ParseError::InvalidMultiplier(other.to_string())),
    }
}

fn parse_number(s: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| match s.parse::<f64>() {
            Ok(value) if value.is_finite() => ParseError::OutOfRange,
            _ => ParseError::InvalidNumber,
        })
}

fn scaled(number: Decimal, mult: Decimal) -> Result<Resistance, ParseError> {
    number
        .checked_mul(mult)
        .map(Resistance::from_decimal)
        .ok_or(ParseError::OutOfRange)
}

/// RKM code: the multiplier letter doubles as the decimal point ("4k7" -> 4.7k)
fn parse_rkm_notation(s: &str) -> Option<Result<Resistance, ParseError>> {
    let pos = s.find(|c: char| c.is_ascii_alphabetic())?;
    let (before, rest) = s.split_at(pos);
    let code_len = rest.chars().next()?.len_utf8();
    let (code, after) = rest.split_at(code_len);

    if before.is_empty()
        || after.is_empty()
        || !before.chars().all(|c| c.is_ascii_digit())
        || !after.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let mult = multiplier(code).ok()?;
    Some(parse_number(&format!("{before}.{after}")).and_then(|number| scaled(number, mult)))
}

fn strip_unit_suffix(s: &str) -> &str {
    UNIT_SUFFIXES
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .unwrap_or(s)
}

impl FromStr for Resistance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.split_whitespace().collect();
        let value_str = strip_unit_suffix(&compact);
        if value_str.is_empty() {
            return Err(ParseError::InvalidFormat);
        }

        if let Some(result) = parse_rkm_notation(value_str) {
            return result;
        }

        // Plain or scientific number, optionally followed by a multiplier
        match parse_number(value_str) {
            Ok(number) => return Ok(Resistance::from_decimal(number)),
            Err(ParseError::OutOfRange) => return Err(ParseError::OutOfRange),
            Err(_) => {}
        }

        let split_pos = value_str
            .find(|ch: char| !ch.is_ascii_digit() && !matches!(ch, '.' | '-' | '+'))
            .unwrap_or(value_str.len());

        if split_pos == 0 {
            return Err(ParseError::InvalidFormat);
        }

        let (number_str, code) = value_str.split_at(split_pos);
        let number = parse_number(number_str)?;
        scaled(number, multiplier(code)?)
    }
}

fn scale_to_si(raw: Decimal) -> (Decimal, &'static str) {
    for &(exp, sym) in &SI_PREFIXES {
        let factor = pow10(exp);
        if raw.abs() >= factor {
            return (raw / factor, sym);
        }
    }
    (raw / pow10(-12), "p")
}

fn fmt_significant(x: Decimal) -> String {
    let formatted = format!("{}", x.round_dp(DISPLAY_DP));

    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

impl fmt::Display for Resistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ohms.is_zero() {
            return write!(f, "0");
        }
        let (scaled, prefix) = scale_to_si(self.ohms);
        write!(f, "{}{}", fmt_significant(scaled), prefix)
    }
}

/// Format a raw ohm value the same way `Resistance` displays.
pub fn format_ohms(ohms: f64) -> String {
    match Resistance::from_f64(ohms) {
        Some(r) => r.to_string(),
        None => ohms.to_string(),
    }
}
