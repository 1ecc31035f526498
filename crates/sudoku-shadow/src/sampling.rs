use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum SampleRateError {
    #[error("'{0}' is not a valid decimal sample rate")]
    Invalid(String),
}

/// A `[0,1]` sampling rate carried as an exact decimal with at most six
/// fractional digits (spec.md §4.7.1) — never converted to a binary float
/// before comparison. `decimal` is kept only for round-trip string display;
/// `millionths` is the exact fixed-point value the sampler computes from.
#[derive(Debug, Clone)]
pub struct SampleRate {
    text: String,
    decimal: BigDecimal,
    millionths: u32,
}

impl SampleRate {
    pub fn parse(input: &str) -> Result<Self, SampleRateError> {
        let trimmed = input.trim();
        let decimal = BigDecimal::from_str(trimmed)
            .map_err(|_| SampleRateError::Invalid(input.to_string()))?;
        let millionths = parse_millionths(trimmed)?;
        Ok(Self {
            text: trimmed.to_string(),
            decimal,
            millionths,
        })
    }

    pub fn zero() -> Self {
        Self::parse("0").expect("'0' is always a valid sample rate")
    }

    pub fn one() -> Self {
        Self::parse("1").expect("'1' is always a valid sample rate")
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn decimal(&self) -> &BigDecimal {
        &self.decimal
    }

    pub fn millionths(&self) -> u32 {
        self.millionths
    }

    pub fn is_never(&self) -> bool {
        self.millionths == 0
    }

    pub fn is_always(&self) -> bool {
        self.millionths >= 1_000_000
    }
}

/// Parse a non-negative decimal string into millionths (`rate * 1_000_000`,
/// clamped to `[0, 1_000_000]`), via string splitting only — no float
/// arithmetic anywhere in this path.
fn parse_millionths(input: &str) -> Result<u32, SampleRateError> {
    if input.starts_with('-') {
        return Err(SampleRateError::Invalid(input.to_string()));
    }
    let (int_part, frac_part) = match input.split_once('.') {
        Some((i, f)) => (i, f),
        None => (input, ""),
    };
    let int_part = if int_part.is_empty() { "0" } else { int_part };

    if frac_part.len() > 6 {
        tracing::warn!(
            rate = input,
            "sample_rate carries more than 6 fractional digits; truncating per the deprecated numeric-override path"
        );
    }

    let int_val: u64 = int_part
        .parse()
        .map_err(|_| SampleRateError::Invalid(input.to_string()))?;

    let mut frac_digits: String = frac_part.chars().take(6).collect();
    if frac_digits.is_empty() {
        frac_digits.push('0');
    }
    while frac_digits.len() < 6 {
        frac_digits.push('0');
    }
    let frac_val: u64 = frac_digits
        .parse()
        .map_err(|_| SampleRateError::Invalid(input.to_string()))?;

    let millionths = int_val.saturating_mul(1_000_000).saturating_add(frac_val);
    Ok(millionths.min(1_000_000) as u32)
}

/// `floor(rate * 2^64)` computed with arbitrary-precision integers.
fn threshold(millionths: u32) -> BigUint {
    (BigUint::from(millionths) << 64u32) / BigUint::from(1_000_000u32)
}

/// The C9 sampling primitive (spec.md §4.7.2): a SHA-256-backed Bernoulli
/// trial. `sticky` sampling omits `run_id` from the hashed material so the
/// decision depends only on `(hash_salt, puzzle_digest)`.
pub fn sample_hit(rate: &SampleRate, hash_salt: &str, sticky: bool, run_id: &str, puzzle_digest: &str) -> bool {
    if rate.is_never() {
        return false;
    }
    if rate.is_always() {
        return true;
    }

    let mut material = String::new();
    material.push_str(hash_salt);
    if !sticky {
        material.push_str(run_id);
    }
    material.push_str("sudoku");
    material.push_str("shadow");
    material.push_str(puzzle_digest);

    let digest = Sha256::digest(material.as_bytes());
    let value = u64::from_be_bytes(digest[0..8].try_into().expect("sha256 digest is at least 8 bytes"));

    BigUint::from(value) < threshold(rate.millionths())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_hits() {
        let rate = SampleRate::zero();
        for i in 0..100 {
            assert!(!sample_hit(&rate, "salt", true, "run", &format!("digest-{i}")));
        }
    }

    #[test]
    fn one_rate_always_hits() {
        let rate = SampleRate::one();
        for i in 0..100 {
            assert!(sample_hit(&rate, "salt", true, "run", &format!("digest-{i}")));
        }
    }

    #[test]
    fn sticky_decision_ignores_run_id() {
        let rate = SampleRate::parse("0.5").unwrap();
        for i in 0..50 {
            let digest = format!("digest-{i}");
            let a = sample_hit(&rate, "salt", true, "run-a", &digest);
            let b = sample_hit(&rate, "salt", true, "run-b", &digest);
            assert_eq!(a, b, "sticky sampling must not depend on run_id");
        }
    }

    #[test]
    fn non_sticky_rate_can_depend_on_run_id() {
        let rate = SampleRate::parse("0.5").unwrap();
        let digest = "fixed-digest";
        let results: Vec<bool> = (0..50)
            .map(|i| sample_hit(&rate, "salt", false, &format!("run-{i}"), digest))
            .collect();
        assert!(results.iter().any(|&b| b) && results.iter().any(|&b| !b));
    }

    #[test]
    fn empirical_rate_approaches_nominal() {
        let rate = SampleRate::parse("0.3").unwrap();
        let hits = (0..5000)
            .filter(|i| sample_hit(&rate, "salt", true, "run", &format!("digest-{i}")))
            .count();
        let empirical = hits as f64 / 5000.0;
        assert!((empirical - 0.3).abs() < 0.05, "empirical rate {empirical} too far from 0.3");
    }

    #[test]
    fn rejects_negative_rate() {
        assert!(SampleRate::parse("-0.1").is_err());
    }
}
