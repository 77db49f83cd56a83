use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use gift_tax_core::{GiftAsset, GiftTaxInput, TaxRuleset};
use gift_tax_data::{BracketLoader, RulesetLoader, RulesetRegistry};
use tracing::{debug, info};

use crate::utils::{
    parse_amount, parse_date, parse_marriage, parse_prior_gift, parse_quantity,
    parse_relationship,
};

/// Which kind of property is being given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AssetKind {
    #[default]
    Cash,
    RealEstate,
    Stock,
}

impl AssetKind {
    /// Accepts both the command-line spelling and the form's camelCase code.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "cash" => Some(Self::Cash),
            "real-estate" | "realEstate" => Some(Self::RealEstate),
            "stock" => Some(Self::Stock),
            _ => None,
        }
    }
}

/// Raw text of one gift, as typed on the command line or read from a CSV row.
///
/// Every field is parsed leniently by [`GiftForm::to_input`]: malformed
/// amounts become 0, malformed dates become absent and unknown codes are
/// dropped, each with a warning.
#[derive(Debug, Clone, Default)]
pub struct GiftForm {
    pub relationship: String,
    pub asset: AssetKind,
    /// Cash amount, or appraised value for real estate.
    pub amount: String,
    pub quantity: String,
    pub unit_price: String,
    /// `AMOUNT@YYYY-MM-DD` entries.
    pub prior_gifts: Vec<String>,
    /// `CONTRIBUTOR=AMOUNT` entries.
    pub marriage: Vec<String>,
    pub youth: bool,
    pub gift_date: String,
    pub submission_date: String,
    pub as_of: String,
}

impl GiftForm {
    pub fn to_input(&self) -> GiftTaxInput {
        let asset = match self.asset {
            AssetKind::Cash => GiftAsset::Cash {
                amount: parse_amount(&self.amount),
            },
            AssetKind::RealEstate => GiftAsset::RealEstate {
                appraised_value: parse_amount(&self.amount),
            },
            AssetKind::Stock => GiftAsset::Stock {
                quantity: parse_quantity(&self.quantity),
                unit_price: parse_amount(&self.unit_price),
            },
        };

        GiftTaxInput {
            relationship: parse_relationship(&self.relationship),
            asset,
            prior_gifts: self
                .prior_gifts
                .iter()
                .filter_map(|s| parse_prior_gift(s))
                .collect(),
            marriage_contributions: self
                .marriage
                .iter()
                .filter_map(|s| parse_marriage(s))
                .collect(),
            youth: self.youth,
            gift_date: parse_date(&self.gift_date),
            submission_date: parse_date(&self.submission_date),
            as_of: parse_date(&self.as_of),
        }
    }
}

/// Fills in the reference date for inputs that carry none, so that prior
/// gifts entered without a gift date are judged against `today`.
pub fn with_default_as_of(
    mut input: GiftTaxInput,
    today: NaiveDate,
) -> GiftTaxInput {
    if input.as_of.is_none() {
        input.as_of = Some(today);
    }
    input
}

/// Resolves the ruleset to calculate with.
///
/// A ruleset file, when given, is registered alongside the built-ins and
/// selected by its own name. A bracket CSV then replaces the selected
/// ruleset's bracket table.
pub fn select_ruleset(
    name: &str,
    ruleset_file: Option<&Path>,
    brackets: Option<&Path>,
) -> Result<TaxRuleset> {
    let mut registry =
        RulesetRegistry::with_builtins().context("Failed to load built-in rulesets")?;

    let name = match ruleset_file {
        Some(path) => {
            let ruleset = RulesetLoader::load_file(path)
                .with_context(|| format!("Failed to load ruleset: {}", path.display()))?;
            let name = ruleset.name.clone();
            registry.register(ruleset);
            name
        }
        None => name.to_string(),
    };

    let ruleset = registry.get(&name)?.clone();
    debug!(ruleset = %ruleset.name, "ruleset selected");

    match brackets {
        Some(path) => {
            let records = BracketLoader::load_file(path)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            info!(records = records.len(), path = %path.display(), "loaded bracket table");
            Ok(BracketLoader::apply(ruleset, &records)
                .with_context(|| format!("Failed to apply brackets from: {}", path.display()))?)
        }
        None => Ok(ruleset),
    }
}
