//! Swedish organization numbers.
//!
//! Accepted forms: `NNNNNN-NNNN`, `NNNNNNNNNN`, and the twelve-digit form
//! with a `16`, `18`, `19` or `20` century prefix. The last of the ten
//! significant digits is a Luhn check digit over the first nine.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static ORG_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:16|18|19|20)?([0-9]{6})[-+]?([0-9]{4})$")
        .expect("organization number pattern is valid")
});

/// Errors that can occur when parsing an organization number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrgNumberError {
    /// The input was empty.
    #[error("Organization number is missing")]
    Empty,

    /// The input does not look like an organization number.
    #[error("Organization number '{0}' must have the form NNNNNN-NNNN")]
    Format(String),

    /// The check digit does not match.
    #[error("Organization number '{0}' has an invalid check digit")]
    Checksum(String),
}

/// A validated organization number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrgNumber {
    digits: [u8; 10],
}

impl OrgNumber {
    /// Parses and checksum-validates an organization number.
    ///
    /// # Errors
    ///
    /// Returns an error if the format or the check digit is wrong.
    pub fn parse(input: &str) -> Result<Self, OrgNumberError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(OrgNumberError::Empty);
        }

        let captures = ORG_NUMBER
            .captures(trimmed)
            .ok_or_else(|| OrgNumberError::Format(trimmed.to_string()))?;

        let mut digits = [0u8; 10];
        let significant = captures[1].bytes().chain(captures[2].bytes());
        for (slot, byte) in digits.iter_mut().zip(significant) {
            *slot = byte - b'0';
        }

        if luhn_check_digit(&digits[..9]) != digits[9] {
            return Err(OrgNumberError::Checksum(trimmed.to_string()));
        }

        Ok(Self { digits })
    }

    /// Returns the ten significant digits.
    #[must_use]
    pub const fn digits(&self) -> &[u8; 10] {
        &self.digits
    }
}

impl std::fmt::Display for OrgNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, d) in self.digits.iter().enumerate() {
            if i == 6 {
                f.write_str("-")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for OrgNumber {
    type Err = OrgNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Luhn (mod 10) check digit, weights 2,1,2,1,... from the left.
fn luhn_check_digit(digits: &[u8]) -> u8 {
    let sum: u8 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let weighted = if i % 2 == 0 { d * 2 } else { d };
            weighted / 10 + weighted % 10
        })
        .sum();
    (10 - sum % 10) % 10
}
