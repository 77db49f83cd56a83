use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One progressive bracket. `upper_limit` of `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    #[serde(default)]
    pub upper_limit: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default)]
    pub cumulative_deduction: Decimal,
}

impl TaxBracket {
    pub fn new(
        upper_limit: Option<Decimal>,
        rate: Decimal,
        cumulative_deduction: Decimal,
    ) -> Self {
        Self {
            upper_limit,
            rate,
            cumulative_deduction,
        }
    }
}

/// How the bracket table is turned into tax.
///
/// Published calculators disagree on whether the cumulative deduction is
/// applied, so the choice travels with the ruleset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BracketMethod {
    /// Sum each segment at its marginal rate; the deduction column is ignored.
    #[default]
    Marginal,
    /// `amount × rate − cumulative_deduction` of the bracket the amount falls in.
    QuickDeduction,
    /// Segment sum minus the terminal bracket's deduction. Double-counts the
    /// progressive offset; only kept to reproduce figures from calculators
    /// that compute it this way.
    SegmentedWithDeduction,
}

impl BracketMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marginal => "marginal",
            Self::QuickDeduction => "quick-deduction",
            Self::SegmentedWithDeduction => "segmented-with-deduction",
        }
    }
}
