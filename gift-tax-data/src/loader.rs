use std::fs;
use std::io::Read;
use std::path::Path;

use gift_tax_core::{RulesetError, TaxBracket, TaxRuleset};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading ruleset or bracket data.
#[derive(Debug, Error)]
pub enum RulesetLoaderError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("unknown ruleset '{name}'; available: {available:?}")]
    UnknownRuleset {
        name: String,
        available: Vec<String>,
    },

    #[error("bracket table has no rows for ruleset '{0}'")]
    NoBracketsFor(String),

    #[error("invalid ruleset '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: RulesetError,
    },
}

impl From<csv::Error> for RulesetLoaderError {
    fn from(err: csv::Error) -> Self {
        RulesetLoaderError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for RulesetLoaderError {
    fn from(err: toml::de::Error) -> Self {
        RulesetLoaderError::TomlParse(err.to_string())
    }
}

fn read_file(path: &Path) -> Result<String, RulesetLoaderError> {
    fs::read_to_string(path).map_err(|e| RulesetLoaderError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn validated(ruleset: TaxRuleset) -> Result<TaxRuleset, RulesetLoaderError> {
    ruleset
        .validate()
        .map_err(|source| RulesetLoaderError::Invalid {
            name: ruleset.name.clone(),
            source,
        })?;
    Ok(ruleset)
}

/// Loader for ruleset TOML documents.
///
/// Decimal values are written as strings (`rate = "0.10"`) so they are never
/// routed through a float. Every loaded ruleset is validated before it is
/// returned.
pub struct RulesetLoader;

impl RulesetLoader {
    /// Parse and validate a ruleset from TOML text.
    pub fn parse(toml_str: &str) -> Result<TaxRuleset, RulesetLoaderError> {
        let ruleset: TaxRuleset = toml::from_str(toml_str)?;
        debug!(name = %ruleset.name, brackets = ruleset.brackets.len(), "parsed ruleset");
        validated(ruleset)
    }

    /// Read, parse and validate a ruleset file.
    pub fn load_file(path: &Path) -> Result<TaxRuleset, RulesetLoaderError> {
        let content = read_file(path)?;
        let ruleset = Self::parse(&content)?;
        info!(name = %ruleset.name, path = %path.display(), "loaded ruleset file");
        Ok(ruleset)
    }
}

/// A single record from a bracket-table CSV file.
///
/// - `ruleset`: name of the ruleset the row belongs to
/// - `upper_limit`: inclusive upper bound of the bracket (empty for unbounded)
/// - `rate`: marginal rate as a decimal (e.g. 0.10 for 10%)
/// - `cumulative_deduction`: quick-deduction offset (empty for 0)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub ruleset: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_limit: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub cumulative_deduction: Option<Decimal>,
}

impl From<&BracketRecord> for TaxBracket {
    fn from(record: &BracketRecord) -> Self {
        TaxBracket::new(
            record.upper_limit,
            record.rate,
            record.cumulative_deduction.unwrap_or(Decimal::ZERO),
        )
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket tables from CSV files.
///
/// One file may carry tables for several rulesets; rows are grouped by the
/// `ruleset` column and kept in file order.
pub struct BracketLoader;

impl BracketLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, RulesetLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Read and parse a bracket CSV file.
    pub fn load_file(path: &Path) -> Result<Vec<BracketRecord>, RulesetLoaderError> {
        let content = read_file(path)?;
        Self::parse(content.as_bytes())
    }

    /// The bracket table for one ruleset, in file order.
    pub fn brackets_for(
        records: &[BracketRecord],
        ruleset: &str,
    ) -> Result<Vec<TaxBracket>, RulesetLoaderError> {
        let brackets: Vec<TaxBracket> = records
            .iter()
            .filter(|r| r.ruleset == ruleset)
            .map(TaxBracket::from)
            .collect();

        if brackets.is_empty() {
            return Err(RulesetLoaderError::NoBracketsFor(ruleset.to_string()));
        }
        Ok(brackets)
    }

    /// Replaces a ruleset's bracket table with the rows named after it and
    /// re-validates the result.
    pub fn apply(
        ruleset: TaxRuleset,
        records: &[BracketRecord],
    ) -> Result<TaxRuleset, RulesetLoaderError> {
        let brackets = Self::brackets_for(records, &ruleset.name)?;
        info!(
            name = %ruleset.name,
            brackets = brackets.len(),
            "replacing bracket table"
        );
        validated(TaxRuleset {
            brackets,
            ..ruleset
        })
    }
}
