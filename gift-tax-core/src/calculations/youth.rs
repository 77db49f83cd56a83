//! Youth reduction.
//!
//! Only applied when the input sets the youth flag. The strategy comes from
//! the ruleset's [`YouthReductionPolicy`]:
//!
//! - `bracket-rate-delta` recomputes the tax on a table with every rate
//!   lowered by `delta` (floored at the lowest rate) using the same method.
//! - `flat-rate` discounts the computed tax by a fixed fraction.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::BracketSchedule;
use crate::calculations::common::non_negative;
use crate::models::{TaxRuleset, YouthReduction, YouthReductionPolicy};

#[derive(Debug, Clone, Copy)]
pub struct YouthReducer<'a> {
    ruleset: &'a TaxRuleset,
}

impl<'a> YouthReducer<'a> {
    pub fn new(ruleset: &'a TaxRuleset) -> Self {
        Self { ruleset }
    }

    /// Reduces `base_tax`, the tax already computed on `taxable_amount`.
    ///
    /// The reduced tax is clamped to `[0, base_tax]`, so the reduction is
    /// never negative and never exceeds the base tax.
    pub fn apply(
        &self,
        taxable_amount: Decimal,
        base_tax: Decimal,
    ) -> YouthReduction {
        let base_tax = non_negative(base_tax);

        let reduced_tax = match self.ruleset.youth {
            Some(YouthReductionPolicy::BracketRateDelta { delta }) => {
                let schedule =
                    BracketSchedule::new(&self.ruleset.brackets, self.ruleset.bracket_method);
                let reduced = schedule.with_rate_delta(delta);
                BracketSchedule::new(&reduced, schedule.method()).gift_tax(taxable_amount)
            }
            Some(YouthReductionPolicy::FlatRate { rate }) => base_tax * (Decimal::ONE - rate),
            None => {
                warn!(
                    ruleset = %self.ruleset.name,
                    "ruleset has no youth reduction; tax left unchanged"
                );
                base_tax
            }
        };

        let reduced_tax = non_negative(reduced_tax).min(base_tax);
        let reduction_amount = base_tax - reduced_tax;

        debug!(%base_tax, %reduced_tax, %reduction_amount, "youth reduction applied");

        YouthReduction {
            reduced_tax,
            reduction_amount,
        }
    }
}
