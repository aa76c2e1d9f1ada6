//! Exact rational number arithmetic
//!
//! Provides a `Rational` type backed by arbitrary-precision integers, so
//! repeated multiplication during cofactor expansion or elimination can
//! never overflow. Every value is kept normalized: the denominator is
//! strictly positive, numerator and denominator are coprime, and zero is
//! always `0/1`.

use crate::config::ConversionConfig;
use crate::error::{MatrixError, ParseError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Exact fraction
///
/// Wraps num-rational's BigRational; normalization and arithmetic are done
/// on the numerator/denominator pair directly.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "RationalRepr", try_from = "RationalInput")]
pub struct Rational {
    inner: BigRational,
}

/// Wire representation: decimal strings so big values survive JSON
#[derive(Serialize, Deserialize)]
struct RationalRepr {
    n: String, // signed numerator
    d: String, // positive denominator
}

/// Accepted on input: the wire form, a bare integer, or a text token
#[derive(Deserialize)]
#[serde(untagged)]
enum RationalInput {
    Parts(RationalRepr),
    Integer(i64),
    Text(String),
}

impl Rational {
    /// Create a fraction from a numerator and denominator, normalizing it
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Result<Rational> {
        Rational::normalize(numer.into(), denom.into())
    }

    /// Create a whole number
    pub fn from_integer(n: impl Into<BigInt>) -> Rational {
        Rational {
            inner: BigRational::from_integer(n.into()),
        }
    }

    /// Reduce `numer/denom` to lowest terms with the sign on the numerator.
    ///
    /// Fails with `DivisionByZero` when `denom` is zero.
    pub fn normalize(numer: BigInt, denom: BigInt) -> Result<Rational> {
        if denom.is_zero() {
            return Err(MatrixError::DivisionByZero);
        }
        Ok(Rational::reduced(numer, denom))
    }

    /// Normalize a pair whose denominator is known to be non-zero
    fn reduced(numer: BigInt, denom: BigInt) -> Rational {
        debug_assert!(!denom.is_zero());
        if numer.is_zero() {
            return Rational::zero();
        }

        let g = numer.gcd(&denom);
        let mut numer = numer / &g;
        let mut denom = denom / &g;
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }

        Rational {
            inner: BigRational::new_raw(numer, denom),
        }
    }

    /// Convert a float with the default conversion settings
    pub fn from_f64(value: f64) -> Result<Rational> {
        Rational::from_f64_with(value, &ConversionConfig::default())
    }

    /// Convert a float by scaling it with increasing powers of ten until the
    /// scaled value is within `tolerance` of an integer, then rounding.
    ///
    /// The search stops at `max_scale` or after `max_iterations` steps, in
    /// which case the last scaled value is rounded as-is.
    pub fn from_f64_with(value: f64, config: &ConversionConfig) -> Result<Rational> {
        if !value.is_finite() {
            return Err(ParseError::new(format!("{} is not a finite number", value)).into());
        }
        if value.abs() < config.tolerance {
            return Ok(Rational::zero());
        }

        let mut scale = 1.0f64;
        let mut iterations = 0;
        while iterations < config.max_iterations && scale < config.max_scale {
            let scaled = value * scale;
            if (scaled - scaled.round()).abs() <= config.tolerance {
                break;
            }
            scale *= 10.0;
            iterations += 1;
        }

        let numer = BigInt::from_f64((value * scale).round())
            .ok_or_else(|| ParseError::new(format!("{} cannot be scaled to an integer", value)))?;
        let denom = BigInt::from_f64(scale.round())
            .ok_or_else(|| ParseError::new(format!("scale {} is not representable", scale)))?;
        Rational::normalize(numer, denom)
    }

    /// Parse a number token with the default conversion settings
    pub fn parse(text: &str) -> Result<Rational> {
        Rational::parse_with(text, &ConversionConfig::default())
    }

    /// Parse `"n/d"`, a plain integer, or a decimal literal
    pub fn parse_with(text: &str, config: &ConversionConfig) -> Result<Rational> {
        let s = text.trim();
        if s.is_empty() {
            return Err(ParseError::new("empty number").into());
        }

        if let Some((num_str, den_str)) = s.split_once('/') {
            if den_str.contains('/') {
                return Err(ParseError::token(s, "invalid fraction format").into());
            }
            let numer = parse_integer(num_str)
                .ok_or_else(|| ParseError::token(s, "numerator is not an integer"))?;
            let denom = parse_integer(den_str)
                .ok_or_else(|| ParseError::token(s, "denominator is not an integer"))?;
            if denom.is_zero() {
                return Err(ParseError::token(s, "denominator cannot be zero").into());
            }
            return Ok(Rational::reduced(numer, denom));
        }

        // Integers are parsed exactly before falling back to decimals
        if let Some(n) = parse_integer(s) {
            return Ok(Rational::from_integer(n));
        }

        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Rational::from_f64_with(f, config),
            _ => Err(ParseError::token(s, "expected an integer, a decimal or a fraction like 1/2").into()),
        }
    }

    pub fn zero() -> Rational {
        Rational {
            inner: BigRational::zero(),
        }
    }

    pub fn one() -> Rational {
        Rational {
            inner: BigRational::one(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numer().is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.inner.is_one()
    }

    pub fn numer(&self) -> &BigInt {
        self.inner.numer()
    }

    /// Always strictly positive
    pub fn denom(&self) -> &BigInt {
        self.inner.denom()
    }

    /// Get the underlying BigRational
    pub fn as_big_rational(&self) -> &BigRational {
        &self.inner
    }

    pub fn is_integer(&self) -> bool {
        self.denom().is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.numer().is_negative()
    }

    /// Divide, failing when `rhs` is the zero fraction
    pub fn checked_div(&self, rhs: &Rational) -> Result<Rational> {
        if rhs.is_zero() {
            return Err(MatrixError::DivisionByZero);
        }
        Ok(Rational::reduced(
            self.numer() * rhs.denom(),
            self.denom() * rhs.numer(),
        ))
    }

    /// Get the reciprocal (1/x)
    pub fn recip(&self) -> Result<Rational> {
        Rational::one().checked_div(self)
    }

    pub fn abs(&self) -> Rational {
        Rational {
            inner: self.inner.abs(),
        }
    }

    /// Convert to f64 (lossy, for display and interop only)
    pub fn to_f64(&self) -> f64 {
        self.inner.to_f64().unwrap_or(f64::NAN)
    }
}

/// Strict `[+-]?[0-9]+`. BigInt's own `FromStr` also skips `_` separators.
fn parse_integer(text: &str) -> Option<BigInt> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl Zero for Rational {
    fn zero() -> Self {
        Rational::zero()
    }

    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }
}

impl One for Rational {
    fn one() -> Self {
        Rational::one()
    }
}

impl Default for Rational {
    fn default() -> Self {
        Rational::zero()
    }
}

impl Ord for Rational {
    /// Cross-multiplication; denominators are positive so the order is preserved
    fn cmp(&self, other: &Self) -> Ordering {
        (self.numer() * other.denom()).cmp(&(other.numer() * self.denom()))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({})", self)
    }
}

/// Integers render bare, everything else as `n/d`
impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numer())
        } else {
            write!(f, "{}/{}", self.numer(), self.denom())
        }
    }
}

impl Add<&Rational> for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        Rational::reduced(
            self.numer() * rhs.denom() + rhs.numer() * self.denom(),
            self.denom() * rhs.denom(),
        )
    }
}

impl Sub<&Rational> for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        Rational::reduced(
            self.numer() * rhs.denom() - rhs.numer() * self.denom(),
            self.denom() * rhs.denom(),
        )
    }
}

impl Mul<&Rational> for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        Rational::reduced(self.numer() * rhs.numer(), self.denom() * rhs.denom())
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            inner: -&self.inner,
        }
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        &self + &rhs
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        &self - &rhs
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        &self * &rhs
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational { inner: -self.inner }
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Rational::from_integer(n)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::from_integer(n)
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Rational::from_integer(n)
    }
}

impl FromStr for Rational {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self> {
        Rational::parse(s)
    }
}

impl From<Rational> for RationalRepr {
    fn from(r: Rational) -> Self {
        RationalRepr {
            n: r.numer().to_string(),
            d: r.denom().to_string(),
        }
    }
}

impl TryFrom<RationalInput> for Rational {
    type Error = ParseError;

    fn try_from(input: RationalInput) -> std::result::Result<Self, Self::Error> {
        let repr = match input {
            RationalInput::Parts(repr) => repr,
            RationalInput::Integer(n) => return Ok(Rational::from_integer(n)),
            RationalInput::Text(text) => {
                return Rational::parse(&text).map_err(|e| match e {
                    MatrixError::Parse(err) => err,
                    other => ParseError::token(&text, other.to_string()),
                })
            }
        };
        let numer = parse_integer(&repr.n)
            .ok_or_else(|| ParseError::token(&repr.n, "numerator is not an integer"))?;
        let denom = parse_integer(&repr.d)
            .ok_or_else(|| ParseError::token(&repr.d, "denominator is not an integer"))?;
        if denom.is_zero() {
            return Err(ParseError::token(&repr.d, "denominator cannot be zero"));
        }
        Ok(Rational::reduced(numer, denom))
    }
}
