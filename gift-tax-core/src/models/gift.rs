use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::non_negative;
use crate::models::Relationship;

/// A single taxable transfer, current or historical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftRecord {
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl GiftRecord {
    pub fn new(
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self { amount, date }
    }
}

/// The asset being given, with the rule that turns it into a gift amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GiftAsset {
    Cash {
        amount: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    RealEstate {
        appraised_value: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    Stock {
        quantity: u64,
        unit_price: Decimal,
    },
}

impl GiftAsset {
    /// Resolves the asset to a non-negative gift amount.
    ///
    /// Negative literals count as zero. Stock value is quantity × unit price
    /// and saturates instead of overflowing.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use gift_tax_core::GiftAsset;
    ///
    /// let stock = GiftAsset::Stock { quantity: 120, unit_price: dec!(71500) };
    /// assert_eq!(stock.gift_amount(), dec!(8580000));
    /// ```
    pub fn gift_amount(&self) -> Decimal {
        match self {
            Self::Cash { amount } => non_negative(*amount),
            Self::RealEstate { appraised_value } => non_negative(*appraised_value),
            Self::Stock {
                quantity,
                unit_price,
            } => Decimal::from(*quantity).saturating_mul(non_negative(*unit_price)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cash { .. } => "cash",
            Self::RealEstate { .. } => "realEstate",
            Self::Stock { .. } => "stock",
        }
    }
}

impl Default for GiftAsset {
    fn default() -> Self {
        Self::Cash {
            amount: Decimal::ZERO,
        }
    }
}

/// Who contributed a marriage-related gift.
///
/// Rulesets split contributions either by family side or by parent; the
/// engine caps each contribution individually regardless of the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Contributor {
    Father,
    Mother,
    OwnParents,
    InLawParents,
}

impl Contributor {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "father" => Some(Self::Father),
            "mother" => Some(Self::Mother),
            "ownParents" | "own" => Some(Self::OwnParents),
            "inLawParents" | "inLaw" => Some(Self::InLawParents),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageContribution {
    pub contributor: Contributor,
    pub amount: Decimal,
}

/// Snapshot of everything a single calculation needs.
///
/// Fields the form may leave empty are optional; the engine degrades to
/// zero exemptions or a zero penalty rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftTaxInput {
    /// `None` when the form supplied an unrecognised category.
    pub relationship: Option<Relationship>,
    pub asset: GiftAsset,
    #[serde(default)]
    pub prior_gifts: Vec<GiftRecord>,
    #[serde(default)]
    pub marriage_contributions: Vec<MarriageContribution>,
    #[serde(default)]
    pub youth: bool,
    pub gift_date: Option<NaiveDate>,
    pub submission_date: Option<NaiveDate>,
    /// Fallback reference date for the prior-gift window when no gift date is known.
    pub as_of: Option<NaiveDate>,
}

impl GiftTaxInput {
    pub fn new(
        relationship: Relationship,
        asset: GiftAsset,
    ) -> Self {
        Self {
            relationship: Some(relationship),
            asset,
            ..Default::default()
        }
    }

    /// Date the prior-gift look-back window is anchored to.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.gift_date.or(self.as_of)
    }
}
