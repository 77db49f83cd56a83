use std::sync::LazyLock;

use chrono::NaiveDate;
use gift_tax_core::{Contributor, GiftRecord, MarriageContribution, Relationship};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());

/// Error returned when a string cannot be read as a won amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("no digits in amount '{input}'")]
    NoDigits { input: String },

    #[error("amount '{input}' is out of range")]
    OutOfRange { input: String },
}

/// Keeps only the ASCII digits of `s`.
fn digits_only(s: &str) -> String {
    NON_DIGITS.replace_all(s, "").into_owned()
}

/// Parses a won amount, ignoring every character that is not a digit.
///
/// Handles thousands separators and unit suffixes (e.g. `"1,000,000원"`).
/// Empty or whitespace-only input is treated as 0.
pub fn try_parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let digits = digits_only(s);
    if digits.is_empty() {
        if s.trim().is_empty() {
            return Ok(Decimal::ZERO);
        }
        return Err(ParseAmountError::NoDigits {
            input: s.to_string(),
        });
    }
    digits
        .parse()
        .map_err(|_| ParseAmountError::OutOfRange {
            input: s.to_string(),
        })
}

/// Like [`try_parse_amount`], but malformed input becomes 0 with a warning.
pub fn parse_amount(s: &str) -> Decimal {
    try_parse_amount(s).unwrap_or_else(|e| {
        tracing::warn!(input = %s, "{e}; using 0");
        Decimal::ZERO
    })
}

/// Parses a share count the same lenient way as [`parse_amount`].
pub fn parse_quantity(s: &str) -> u64 {
    let digits = digits_only(s);
    if digits.is_empty() {
        if !s.trim().is_empty() {
            tracing::warn!(input = %s, "no digits in quantity; using 0");
        }
        return 0;
    }
    digits.parse().unwrap_or_else(|e| {
        tracing::warn!(input = %s, "invalid quantity: {}; using 0", e);
        0
    })
}

/// Parses an ISO `YYYY-MM-DD` date.
///
/// Returns `None` for empty input, or when parsing fails (logs a warning on
/// parse failure).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_or_else(
        |e| {
            tracing::warn!(input = %s, "invalid date: {}", e);
            None
        },
        Some,
    )
}

/// Parses a relationship code; unknown codes give `None` with a warning.
pub fn parse_relationship(s: &str) -> Option<Relationship> {
    let relationship = Relationship::parse(s);
    if relationship.is_none() && !s.trim().is_empty() {
        tracing::warn!(input = %s, "unknown relationship; no relationship exemption applies");
    }
    relationship
}

/// Parses a prior gift written as `AMOUNT@YYYY-MM-DD`.
///
/// Entries without a valid date or with a zero amount are skipped, since
/// they can never fall in a look-back window.
pub fn parse_prior_gift(s: &str) -> Option<GiftRecord> {
    let Some((amount, date)) = s.split_once('@') else {
        tracing::warn!(input = %s, "prior gift must be AMOUNT@YYYY-MM-DD; skipped");
        return None;
    };
    let amount = parse_amount(amount);
    let date = parse_date(date)?;
    if amount.is_zero() {
        tracing::warn!(input = %s, "prior gift amount is zero; skipped");
        return None;
    }
    Some(GiftRecord::new(amount, date))
}

/// Parses a marriage contribution written as `CONTRIBUTOR=AMOUNT`.
pub fn parse_marriage(s: &str) -> Option<MarriageContribution> {
    let Some((contributor, amount)) = s.split_once('=') else {
        tracing::warn!(input = %s, "marriage contribution must be CONTRIBUTOR=AMOUNT; skipped");
        return None;
    };
    let Some(contributor) = Contributor::parse(contributor) else {
        tracing::warn!(input = %s, "unknown marriage contributor; skipped");
        return None;
    };
    Some(MarriageContribution {
        contributor,
        amount: parse_amount(amount),
    })
}

/// Reads a yes/no cell: `true`, `yes`, `y`, `1` (any case) are yes.
pub fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}
