//! Gift-tax calculation for a single gift.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Gift amount from the asset (cash, appraised real estate, quantity × unit price) |
//! | 2    | Exemptions: relationship ceiling less prior gifts in the window, plus marriage exemption, capped at step 1 |
//! | 3    | Taxable amount (step 1 − step 2, minimum 0) |
//! | 4    | Base tax from the bracket table |
//! | 5    | Youth reduction, when flagged |
//! | 6    | Final tax (step 5 if flagged, otherwise step 4) |
//! | 7    | Late-filing penalty on step 6 |
//! | 8    | Total due (step 6 + step 7) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use gift_tax_core::*;
//!
//! let ruleset = TaxRuleset {
//!     name: "statutory".into(),
//!     description: String::new(),
//!     exemptions: ExemptionTable {
//!         adult_child: dec!(50000000),
//!         minor_child: dec!(20000000),
//!         spouse: dec!(600000000),
//!         son_in_law_or_daughter_in_law: dec!(50000000),
//!         other: dec!(10000000),
//!     },
//!     brackets: vec![
//!         TaxBracket::new(Some(dec!(100000000)), dec!(0.10), dec!(0)),
//!         TaxBracket::new(Some(dec!(500000000)), dec!(0.20), dec!(10000000)),
//!         TaxBracket::new(None, dec!(0.30), dec!(60000000)),
//!     ],
//!     bracket_method: BracketMethod::QuickDeduction,
//!     prior_gift_window: LookbackWindow::RollingYears { years: 10 },
//!     marriage: None,
//!     youth: None,
//!     penalty: PenaltyPolicy::default(),
//! };
//!
//! let calculator = GiftTaxCalculator::new(ruleset).unwrap();
//! let input = GiftTaxInput::new(
//!     Relationship::AdultChild,
//!     GiftAsset::Cash { amount: dec!(80000000) },
//! );
//!
//! let result = calculator.calculate(&input);
//! assert_eq!(result.taxable_amount, dec!(30000000));
//! assert_eq!(result.final_tax, dec!(3000000));
//! ```

use tracing::debug;

use crate::calculations::common::non_negative;
use crate::calculations::{BracketSchedule, ExemptionAggregator, PenaltyCalculator, YouthReducer};
use crate::models::{GiftTaxInput, RulesetError, TaxResult, TaxRuleset};

/// Runs every step against one validated ruleset.
///
/// Holds no state besides the ruleset; identical inputs always give
/// identical results.
#[derive(Debug, Clone)]
pub struct GiftTaxCalculator {
    ruleset: TaxRuleset,
}

impl GiftTaxCalculator {
    /// # Errors
    ///
    /// Returns [`RulesetError`] if the ruleset fails [`TaxRuleset::validate`].
    pub fn new(ruleset: TaxRuleset) -> Result<Self, RulesetError> {
        ruleset.validate()?;
        Ok(Self { ruleset })
    }

    pub fn ruleset(&self) -> &TaxRuleset {
        &self.ruleset
    }

    /// Calculates the tax for one gift. Never fails: malformed parts of the
    /// input degrade to zero amounts or an [`InvalidDates`] penalty status.
    ///
    /// [`InvalidDates`]: crate::PenaltyStatus::InvalidDates
    pub fn calculate(
        &self,
        input: &GiftTaxInput,
    ) -> TaxResult {
        let ruleset = &self.ruleset;

        // Step 1
        let gift_amount = input.asset.gift_amount();

        // Step 2
        let exemptions = ExemptionAggregator::new(ruleset).compute(
            input.relationship,
            gift_amount,
            &input.prior_gifts,
            &input.marriage_contributions,
            input.reference_date(),
        );

        // Steps 3-4
        let taxable_amount = non_negative(gift_amount - exemptions.total_exemption);
        let base_tax =
            BracketSchedule::new(&ruleset.brackets, ruleset.bracket_method).gift_tax(taxable_amount);

        // Steps 5-6
        let youth_reduction = input
            .youth
            .then(|| YouthReducer::new(ruleset).apply(taxable_amount, base_tax));
        let final_tax = youth_reduction
            .as_ref()
            .map_or(base_tax, |reduction| reduction.reduced_tax);

        // Steps 7-8
        let penalty = PenaltyCalculator::new(&ruleset.penalty).late_penalty(
            input.submission_date,
            input.gift_date,
            final_tax,
        );
        let total_due = final_tax.saturating_add(penalty.penalty_amount);

        debug!(
            ruleset = %ruleset.name,
            asset = input.asset.kind(),
            %gift_amount,
            %taxable_amount,
            %base_tax,
            %final_tax,
            %total_due,
            "gift tax calculated"
        );

        TaxResult {
            ruleset: ruleset.name.clone(),
            gift_amount,
            exemptions,
            taxable_amount,
            base_tax,
            youth_reduction,
            final_tax,
            penalty,
            total_due,
        }
    }
}
