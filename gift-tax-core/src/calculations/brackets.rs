//! Progressive bracket engine.
//!
//! # Bracket Table
//!
//! The statutory gift-tax table (상속세 및 증여세법 제26조):
//!
//! | Taxable amount        | Rate | Cumulative deduction |
//! |-----------------------|------|----------------------|
//! | ≤ 100,000,000         | 10%  | 0                    |
//! | ≤ 500,000,000         | 20%  | 10,000,000           |
//! | ≤ 1,000,000,000       | 30%  | 60,000,000           |
//! | ≤ 3,000,000,000       | 40%  | 160,000,000          |
//! | > 3,000,000,000       | 50%  | 460,000,000          |
//!
//! The deduction column lets the tax be written as `amount × rate − deduction`
//! for the bracket the amount falls in; this equals summing every segment at
//! its own marginal rate as long as the column matches the rates. Which of the
//! two forms a ruleset uses is selected by [`BracketMethod`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use gift_tax_core::{BracketMethod, BracketSchedule, TaxBracket};
//!
//! let brackets = vec![
//!     TaxBracket::new(Some(dec!(100000000)), dec!(0.10), dec!(0)),
//!     TaxBracket::new(Some(dec!(500000000)), dec!(0.20), dec!(10000000)),
//!     TaxBracket::new(Some(dec!(1000000000)), dec!(0.30), dec!(60000000)),
//!     TaxBracket::new(None, dec!(0.40), dec!(160000000)),
//! ];
//!
//! let schedule = BracketSchedule::new(&brackets, BracketMethod::Marginal);
//! assert_eq!(schedule.gift_tax(dec!(600000000)), dec!(120000000));
//! ```

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::{max, non_negative};
use crate::models::{BracketMethod, RulesetError, TaxBracket};

/// Deduction column that makes `amount × rate − deduction` agree with the
/// segment-by-segment marginal tax for the given limits and rates.
///
/// The first bracket's deduction is always zero; each later one adds the
/// previous limit times the rate step.
pub fn consistent_deductions(brackets: &[TaxBracket]) -> Vec<Decimal> {
    let mut deductions = Vec::with_capacity(brackets.len());
    let mut deduction = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if index > 0 {
            let previous = &brackets[index - 1];
            let previous_limit = previous.upper_limit.unwrap_or(Decimal::ZERO);
            deduction += previous_limit * (bracket.rate - previous.rate);
        }
        deductions.push(deduction);
    }

    deductions
}

/// A bracket table bound to the method used to apply it.
#[derive(Debug, Clone, Copy)]
pub struct BracketSchedule<'a> {
    brackets: &'a [TaxBracket],
    method: BracketMethod,
}

impl<'a> BracketSchedule<'a> {
    /// Brackets must be sorted by `upper_limit` with an unbounded last entry;
    /// [`validate`](Self::validate) checks this.
    pub fn new(
        brackets: &'a [TaxBracket],
        method: BracketMethod,
    ) -> Self {
        Self { brackets, method }
    }

    pub fn method(&self) -> BracketMethod {
        self.method
    }

    /// Checks that the table partitions `[0, ∞)` with non-decreasing rates.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError`] if:
    /// - the table is empty
    /// - a rate is outside `[0, 1]` or lower than the one before it
    /// - a deduction is negative
    /// - limits are not strictly increasing, or a bracket other than the last is unbounded
    /// - the last bracket is bounded
    /// - the method is [`BracketMethod::QuickDeduction`] and the deduction
    ///   column disagrees with [`consistent_deductions`]
    pub fn validate(&self) -> Result<(), RulesetError> {
        let Some(last_index) = self.brackets.len().checked_sub(1) else {
            return Err(RulesetError::NoBrackets);
        };

        let mut previous_limit = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;

        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(RulesetError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }
            if index > 0 && bracket.rate < previous_rate {
                return Err(RulesetError::DecreasingRate { index });
            }
            if bracket.cumulative_deduction < Decimal::ZERO {
                return Err(RulesetError::NegativeDeduction {
                    index,
                    deduction: bracket.cumulative_deduction,
                });
            }
            match bracket.upper_limit {
                Some(limit) if limit <= previous_limit => {
                    return Err(RulesetError::UnorderedLimit { index });
                }
                Some(limit) => previous_limit = limit,
                None if index != last_index => {
                    return Err(RulesetError::UnboundedBeforeLast { index });
                }
                None => {}
            }
            previous_rate = bracket.rate;
        }

        if self.brackets[last_index].upper_limit.is_some() {
            return Err(RulesetError::BoundedLastBracket);
        }

        match self.method {
            BracketMethod::QuickDeduction => {
                let expected = consistent_deductions(self.brackets);
                for (index, (bracket, expected)) in self.brackets.iter().zip(expected).enumerate()
                {
                    if bracket.cumulative_deduction != expected {
                        return Err(RulesetError::InconsistentDeduction {
                            index,
                            expected,
                            actual: bracket.cumulative_deduction,
                        });
                    }
                }
            }
            BracketMethod::SegmentedWithDeduction => {
                warn!(
                    method = self.method.as_str(),
                    "bracket method subtracts the cumulative deduction after summing segments; \
                     results will be lower than marginal-rate tax"
                );
            }
            BracketMethod::Marginal => {}
        }

        Ok(())
    }

    /// Computes gift tax on a taxable amount. Never negative; zero for zero.
    pub fn gift_tax(
        &self,
        taxable_amount: Decimal,
    ) -> Decimal {
        let taxable_amount = non_negative(taxable_amount);
        if taxable_amount.is_zero() || self.brackets.is_empty() {
            return Decimal::ZERO;
        }

        let tax = match self.method {
            BracketMethod::QuickDeduction => self.quick_deduction_tax(taxable_amount),
            BracketMethod::Marginal => self.segmented_tax(taxable_amount, false),
            BracketMethod::SegmentedWithDeduction => self.segmented_tax(taxable_amount, true),
        };

        max(tax, Decimal::ZERO)
    }

    /// The bracket a taxable amount falls in.
    pub fn bracket_for(
        &self,
        taxable_amount: Decimal,
    ) -> Option<&'a TaxBracket> {
        self.brackets
            .iter()
            .find(|b| b.upper_limit.is_none_or(|limit| taxable_amount <= limit))
            .or_else(|| self.brackets.last())
    }

    /// Derives the table used for reduced-rate taxation: each rate lowered by
    /// `delta` but never below the table's lowest rate, with the deduction
    /// column recomputed for the new rates.
    pub fn with_rate_delta(
        &self,
        delta: Decimal,
    ) -> Vec<TaxBracket> {
        let floor = self
            .brackets
            .iter()
            .map(|b| b.rate)
            .min()
            .unwrap_or(Decimal::ZERO);

        let mut reduced: Vec<TaxBracket> = self
            .brackets
            .iter()
            .map(|b| TaxBracket {
                upper_limit: b.upper_limit,
                rate: max(b.rate - delta, floor),
                cumulative_deduction: Decimal::ZERO,
            })
            .collect();

        let deductions = consistent_deductions(&reduced);
        for (bracket, deduction) in reduced.iter_mut().zip(deductions) {
            bracket.cumulative_deduction = deduction;
        }

        reduced
    }

    fn quick_deduction_tax(
        &self,
        taxable_amount: Decimal,
    ) -> Decimal {
        match self.bracket_for(taxable_amount) {
            Some(bracket) => taxable_amount * bracket.rate - bracket.cumulative_deduction,
            None => Decimal::ZERO,
        }
    }

    fn segmented_tax(
        &self,
        taxable_amount: Decimal,
        subtract_deduction: bool,
    ) -> Decimal {
        let mut tax = Decimal::ZERO;
        let mut previous_limit = Decimal::ZERO;

        for bracket in self.brackets {
            match bracket.upper_limit {
                Some(limit) if taxable_amount > limit => {
                    tax += (limit - previous_limit) * bracket.rate;
                    previous_limit = limit;
                }
                _ => {
                    tax += (taxable_amount - previous_limit) * bracket.rate;
                    if subtract_deduction {
                        tax -= bracket.cumulative_deduction;
                    }
                    break;
                }
            }
        }

        tax
    }
}
