//! Late-filing penalty.
//!
//! The return is due `filing_months` after the gift date. Filing after that
//! incurs a flat late-filing penalty (moderate within the extension, severe
//! beyond it) plus a per-day delinquency surcharge counted from the
//! statutory deadline and capped at a fraction of the tax.
//!
//! Month arithmetic clamps to the end of the target month, so a gift on
//! November 30 is due on the last day of February.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{non_negative, truncate_won};
use crate::models::{PenaltyPolicy, PenaltyResult, PenaltyStatus};

#[derive(Debug, Clone, Copy)]
pub struct PenaltyCalculator<'a> {
    policy: &'a PenaltyPolicy,
}

impl<'a> PenaltyCalculator<'a> {
    pub fn new(policy: &'a PenaltyPolicy) -> Self {
        Self { policy }
    }

    /// Statutory filing deadline for a gift made on `gift_date`.
    pub fn filing_deadline(
        &self,
        gift_date: NaiveDate,
    ) -> Option<NaiveDate> {
        gift_date.checked_add_months(Months::new(self.policy.filing_months))
    }

    /// Computes the penalty for filing on `submission_date` a return whose
    /// tax after reductions is `final_tax`.
    ///
    /// A missing date short-circuits to a zero penalty with
    /// [`PenaltyStatus::InvalidDates`].
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    /// use gift_tax_core::{PenaltyCalculator, PenaltyPolicy, PenaltyStatus};
    ///
    /// let policy = PenaltyPolicy::default();
    /// let calculator = PenaltyCalculator::new(&policy);
    ///
    /// let result = calculator.late_penalty(
    ///     NaiveDate::from_ymd_opt(2024, 5, 1),
    ///     NaiveDate::from_ymd_opt(2024, 1, 1),
    ///     dec!(1000000),
    /// );
    ///
    /// // 10% flat plus 30 overdue days at 0.25%
    /// assert_eq!(result.status, PenaltyStatus::LateWithinExtension);
    /// assert_eq!(result.penalty_amount, dec!(175000));
    /// ```
    pub fn late_penalty(
        &self,
        submission_date: Option<NaiveDate>,
        gift_date: Option<NaiveDate>,
        final_tax: Decimal,
    ) -> PenaltyResult {
        let (Some(submission), Some(gift)) = (submission_date, gift_date) else {
            warn!(
                ?submission_date,
                ?gift_date,
                "gift or submission date missing; no penalty computed"
            );
            return PenaltyResult::zero(PenaltyStatus::InvalidDates, None);
        };

        let months = |n: u32| gift.checked_add_months(Months::new(n));
        let (Some(deadline), Some(extended_deadline)) = (
            months(self.policy.filing_months),
            months(self.policy.extended_months),
        ) else {
            warn!(%gift, "filing deadline out of calendar range; no penalty computed");
            return PenaltyResult::zero(PenaltyStatus::InvalidDates, None);
        };

        if submission <= deadline {
            debug!(%submission, %deadline, "filed on time");
            return PenaltyResult::zero(PenaltyStatus::OnTime, Some(deadline));
        }

        let tax = non_negative(final_tax);
        let (status, flat_rate) = if submission <= extended_deadline {
            (PenaltyStatus::LateWithinExtension, self.policy.moderate_rate)
        } else {
            (PenaltyStatus::LateBeyondExtension, self.policy.severe_rate)
        };

        let overdue_days = (submission - deadline).num_days();
        // Rates are capped before touching the tax; every product is at most `tax`.
        let surcharge_rate = (self.policy.daily_rate * Decimal::from(overdue_days))
            .min(self.policy.surcharge_cap_rate);
        let late_filing_penalty = tax * flat_rate;
        let delinquency_surcharge = tax * surcharge_rate;
        let penalty_amount =
            truncate_won(late_filing_penalty.saturating_add(delinquency_surcharge));

        debug!(
            ?status,
            overdue_days,
            %late_filing_penalty,
            %delinquency_surcharge,
            %penalty_amount,
            "late filing penalty"
        );

        PenaltyResult {
            status,
            penalty_amount,
            late_filing_penalty,
            delinquency_surcharge,
            overdue_days,
            filing_deadline: Some(deadline),
        }
    }
}
