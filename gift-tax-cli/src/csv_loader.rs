//! CSV loader for batch gift-tax input.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive and must match exactly. Every cell is read with
//! the same lenient rules as the command-line flags.
//!
//! | Column | Required | Notes |
//! |-------------------|----------|---------------------------------------------------------|
//! | `relationship` | yes | `adultChild`, `minorChild`, `spouse`, `sonInLawDaughterInLaw`, `other` |
//! | `asset` | yes | `cash`, `real-estate` (or `realEstate`), `stock` |
//! | `amount` | no | Cash amount or appraised value, e.g. `80,000,000` |
//! | `quantity` | no | Share count for `stock` |
//! | `unit_price` | no | Price per share for `stock` |
//! | `prior_gifts` | no | `;`-separated `AMOUNT@YYYY-MM-DD` entries |
//! | `marriage` | no | `;`-separated `CONTRIBUTOR=AMOUNT` entries |
//! | `youth` | no | `true`/`yes`/`y`/`1` |
//! | `gift_date` | no | `YYYY-MM-DD` |
//! | `submission_date` | no | `YYYY-MM-DD` |
//! | `as_of` | no | `YYYY-MM-DD` |
//!
//! ### Minimal example
//!
//! ```csv
//! relationship,asset,amount
//! adultChild,cash,"80,000,000"
//! ```
//!
//! ### Full example
//!
//! ```csv
//! relationship,asset,amount,quantity,unit_price,prior_gifts,marriage,youth,gift_date,submission_date
//! adultChild,cash,200000000,,,20000000@2023-03-01,father=60000000;mother=60000000,yes,2025-03-01,2025-09-01
//! minorChild,stock,,120,71500,,,,2025-01-10,2025-04-10
//! ```
use gift_tax_core::GiftTaxInput;
use serde::Deserialize;

use crate::app::{AssetKind, GiftForm};
use crate::utils::parse_flag;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    relationship: String,
    asset: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    unit_price: String,
    #[serde(default)]
    prior_gifts: String,
    #[serde(default)]
    marriage: String,
    #[serde(default)]
    youth: String,
    #[serde(default)]
    gift_date: String,
    #[serde(default)]
    submission_date: String,
    #[serde(default)]
    as_of: String,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// An `asset` cell contained a value that is not one of the recognised
    /// kinds. `row` is 1-based (header = row 0).
    #[error("unrecognised asset type '{asset}' on row {row}")]
    InvalidAsset { asset: String, row: usize },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn split_entries(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a single CSV row into a GiftTaxInput.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<GiftTaxInput, CsvLoadError> {
    let asset = AssetKind::parse(&row.asset).ok_or_else(|| CsvLoadError::InvalidAsset {
        asset: row.asset.clone(),
        row: row_number,
    })?;

    let form = GiftForm {
        relationship: row.relationship,
        asset,
        amount: row.amount,
        quantity: row.quantity,
        unit_price: row.unit_price,
        prior_gifts: split_entries(&row.prior_gifts),
        marriage: split_entries(&row.marriage),
        youth: parse_flag(&row.youth),
        gift_date: row.gift_date,
        submission_date: row.submission_date,
        as_of: row.as_of,
    };

    Ok(form.to_input())
}

/// Parse CSV text (the full file contents as a &str) and return one
/// GiftTaxInput per row, in file order.
///
/// # Errors
///
/// * [CsvLoadError::Parse] – if the CSV is structurally invalid or a
///   required column is missing.
/// * [CsvLoadError::InvalidAsset] – if any row names an unknown asset type.
pub fn load_from_str(input: &str) -> Result<Vec<GiftTaxInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            let row_number = idx + 1; // 1-based for user-facing messages
            convert_row(row, row_number)
        })
        .collect()
}

/// Convenience wrapper: read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &std::path::Path) -> Result<Vec<GiftTaxInput>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
