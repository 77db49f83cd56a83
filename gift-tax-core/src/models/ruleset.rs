//! Tax-year rulesets.
//!
//! Every table and policy switch that differs between published variants of
//! the gift-tax rules lives here, so the engine is parametrised over a single
//! [`TaxRuleset`] value instead of hardcoding one interpretation.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::BracketSchedule;
use crate::models::{BracketMethod, Relationship, TaxBracket};

/// Errors raised when a ruleset is internally inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesetError {
    #[error("ruleset name must not be empty")]
    EmptyName,

    #[error("ruleset has no tax brackets")]
    NoBrackets,

    #[error("bracket {index}: rate must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("bracket {index}: rate is lower than the previous bracket's rate")]
    DecreasingRate { index: usize },

    #[error("bracket {index}: cumulative deduction must be non-negative, got {deduction}")]
    NegativeDeduction { index: usize, deduction: Decimal },

    #[error("bracket {index}: upper limit must be greater than the previous limit")]
    UnorderedLimit { index: usize },

    #[error("bracket {index}: only the last bracket may be unbounded")]
    UnboundedBeforeLast { index: usize },

    #[error("the last bracket must be unbounded")]
    BoundedLastBracket,

    #[error("bracket {index}: cumulative deduction {actual} does not match the rate table (expected {expected})")]
    InconsistentDeduction {
        index: usize,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("exemption for {relationship} must be non-negative, got {amount}")]
    NegativeExemption {
        relationship: &'static str,
        amount: Decimal,
    },

    #[error("marriage exemption caps must be non-negative")]
    NegativeMarriageCap,

    #[error("youth reduction {field} must be between 0 and 1, got {value}")]
    InvalidYouthReduction { field: &'static str, value: Decimal },

    #[error("penalty {field} must be between 0 and 1, got {rate}")]
    InvalidPenaltyRate { field: &'static str, rate: Decimal },

    #[error("penalty filing window ({filing} months) must be positive and shorter than the extension ({extended} months)")]
    InvalidPenaltyMonths { filing: u32, extended: u32 },

    #[error("rolling look-back window must cover at least one year")]
    EmptyLookbackWindow,
}

/// Statutory exemption ceiling per relationship category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionTable {
    pub adult_child: Decimal,
    pub minor_child: Decimal,
    pub spouse: Decimal,
    pub son_in_law_or_daughter_in_law: Decimal,
    pub other: Decimal,
}

impl ExemptionTable {
    /// Exemption ceiling for a relationship. Unknown categories get nothing.
    pub fn exemption_for(
        &self,
        relationship: Option<Relationship>,
    ) -> Decimal {
        match relationship {
            Some(Relationship::AdultChild) => self.adult_child,
            Some(Relationship::MinorChild) => self.minor_child,
            Some(Relationship::Spouse) => self.spouse,
            Some(Relationship::SonInLawOrDaughterInLaw) => self.son_in_law_or_daughter_in_law,
            Some(Relationship::Other) => self.other,
            None => Decimal::ZERO,
        }
    }

    /// Same lookup keyed by the raw form code.
    pub fn exemption_for_code(
        &self,
        code: &str,
    ) -> Decimal {
        self.exemption_for(Relationship::parse(code))
    }

    fn validate(&self) -> Result<(), RulesetError> {
        for relationship in Relationship::ALL {
            let amount = self.exemption_for(Some(relationship));
            if amount < Decimal::ZERO {
                return Err(RulesetError::NegativeExemption {
                    relationship: relationship.as_str(),
                    amount,
                });
            }
        }
        Ok(())
    }
}

/// Which earlier gifts reduce the relationship exemption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LookbackWindow {
    /// Gifts in the same calendar year as the reference date.
    #[default]
    CalendarYear,
    /// Gifts within the `years` before the reference date.
    RollingYears { years: u32 },
}

impl LookbackWindow {
    /// Whether a gift made on `date` falls inside the window ending at `reference`.
    /// Gifts dated after the reference never count.
    pub fn contains(
        &self,
        reference: NaiveDate,
        date: NaiveDate,
    ) -> bool {
        if date > reference {
            return false;
        }
        match self {
            Self::CalendarYear => date.year() == reference.year(),
            Self::RollingYears { years } => {
                match reference.checked_sub_months(Months::new(years.saturating_mul(12))) {
                    Some(start) => date > start,
                    None => true,
                }
            }
        }
    }
}

/// Whether the marriage exemption stacks on top of the relationship exemption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarriageStacking {
    #[default]
    Additive,
    /// Using the marriage exemption forfeits the relationship exemption.
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriagePolicy {
    /// Ceiling applied to each contributor separately.
    pub per_contributor_cap: Decimal,
    /// Ceiling on the combined marriage exemption.
    pub aggregate_cap: Decimal,
    #[serde(default)]
    pub stacking: MarriageStacking,
}

/// How the youth reduction discounts the computed tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum YouthReductionPolicy {
    /// Recompute with every bracket rate lowered by `delta`, never below the lowest rate.
    BracketRateDelta { delta: Decimal },
    /// Discount the computed tax by `rate`.
    FlatRate { rate: Decimal },
}

/// Late-filing penalty parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyPolicy {
    /// Months after the gift date until the statutory filing deadline.
    pub filing_months: u32,
    /// Months after the gift date until the extended deadline.
    pub extended_months: u32,
    /// Flat penalty rate for filings between the two deadlines.
    pub moderate_rate: Decimal,
    /// Flat penalty rate for filings after the extended deadline.
    pub severe_rate: Decimal,
    /// Delinquency surcharge accrued per overdue day.
    pub daily_rate: Decimal,
    /// Ceiling on the delinquency surcharge, as a fraction of the tax.
    pub surcharge_cap_rate: Decimal,
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self {
            filing_months: 3,
            extended_months: 6,
            moderate_rate: Decimal::new(10, 2),
            severe_rate: Decimal::new(20, 2),
            daily_rate: Decimal::new(25, 4),
            surcharge_cap_rate: Decimal::new(10, 2),
        }
    }
}

impl PenaltyPolicy {
    fn validate(&self) -> Result<(), RulesetError> {
        if self.filing_months == 0 || self.filing_months >= self.extended_months {
            return Err(RulesetError::InvalidPenaltyMonths {
                filing: self.filing_months,
                extended: self.extended_months,
            });
        }
        for (field, rate) in [
            ("moderate_rate", self.moderate_rate),
            ("severe_rate", self.severe_rate),
            ("daily_rate", self.daily_rate),
            ("surcharge_cap_rate", self.surcharge_cap_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(RulesetError::InvalidPenaltyRate { field, rate });
            }
        }
        Ok(())
    }
}

/// A named tax-year variant: tables plus every policy switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRuleset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub exemptions: ExemptionTable,
    pub brackets: Vec<TaxBracket>,
    #[serde(default)]
    pub bracket_method: BracketMethod,
    #[serde(default)]
    pub prior_gift_window: LookbackWindow,
    #[serde(default)]
    pub marriage: Option<MarriagePolicy>,
    #[serde(default)]
    pub youth: Option<YouthReductionPolicy>,
    #[serde(default)]
    pub penalty: PenaltyPolicy,
}

impl TaxRuleset {
    /// Checks every table and policy for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`RulesetError`] found. Bracket structure is checked
    /// by [`BracketSchedule::validate`]; the deduction column is only held to
    /// the rate table when the method actually reads it as an exact offset.
    pub fn validate(&self) -> Result<(), RulesetError> {
        if self.name.trim().is_empty() {
            return Err(RulesetError::EmptyName);
        }
        self.exemptions.validate()?;
        BracketSchedule::new(&self.brackets, self.bracket_method).validate()?;

        if let Some(marriage) = &self.marriage {
            if marriage.per_contributor_cap < Decimal::ZERO || marriage.aggregate_cap < Decimal::ZERO
            {
                return Err(RulesetError::NegativeMarriageCap);
            }
        }

        match self.youth {
            Some(YouthReductionPolicy::BracketRateDelta { delta }) => {
                if delta < Decimal::ZERO || delta > Decimal::ONE {
                    return Err(RulesetError::InvalidYouthReduction {
                        field: "delta",
                        value: delta,
                    });
                }
            }
            Some(YouthReductionPolicy::FlatRate { rate }) => {
                if rate < Decimal::ZERO || rate > Decimal::ONE {
                    return Err(RulesetError::InvalidYouthReduction {
                        field: "rate",
                        value: rate,
                    });
                }
            }
            None => {}
        }

        if let LookbackWindow::RollingYears { years: 0 } = self.prior_gift_window {
            return Err(RulesetError::EmptyLookbackWindow);
        }

        self.penalty.validate()
    }
}
