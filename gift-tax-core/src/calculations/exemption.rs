//! Exemption aggregation.
//!
//! Combines, in order:
//!
//! 1. the relationship ceiling from the [`ExemptionTable`](crate::ExemptionTable),
//! 2. the offset for prior gifts inside the ruleset's look-back window (floor 0),
//! 3. the marriage-gift exemption, stacked or exclusive per [`MarriageStacking`],
//! 4. the cap at the current gift amount.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::non_negative;
use crate::models::{
    ExemptionResult, GiftRecord, MarriageContribution, MarriageStacking, Relationship, TaxRuleset,
};

#[derive(Debug, Clone, Copy)]
pub struct ExemptionAggregator<'a> {
    ruleset: &'a TaxRuleset,
}

impl<'a> ExemptionAggregator<'a> {
    pub fn new(ruleset: &'a TaxRuleset) -> Self {
        Self { ruleset }
    }

    /// Computes the exemption applied to the current gift.
    ///
    /// `reference_date` anchors the prior-gift window; without one no prior
    /// gift can be placed in the window and none is offset.
    ///
    /// # Example
    ///
    /// ```
    /// # use rust_decimal_macros::dec;
    /// # use gift_tax_core::*;
    /// # let ruleset = TaxRuleset {
    /// #     name: "doc".into(),
    /// #     description: String::new(),
    /// #     exemptions: ExemptionTable {
    /// #         adult_child: dec!(50000000),
    /// #         minor_child: dec!(20000000),
    /// #         spouse: dec!(600000000),
    /// #         son_in_law_or_daughter_in_law: dec!(50000000),
    /// #         other: dec!(10000000),
    /// #     },
    /// #     brackets: vec![TaxBracket::new(None, dec!(0.10), dec!(0))],
    /// #     bracket_method: BracketMethod::Marginal,
    /// #     prior_gift_window: LookbackWindow::CalendarYear,
    /// #     marriage: None,
    /// #     youth: None,
    /// #     penalty: PenaltyPolicy::default(),
    /// # };
    /// let aggregator = ExemptionAggregator::new(&ruleset);
    /// let result = aggregator.compute(Some(Relationship::AdultChild), dec!(30000000), &[], &[], None);
    ///
    /// // The exemption never exceeds the gift itself
    /// assert_eq!(result.relationship_exemption, dec!(50000000));
    /// assert_eq!(result.total_exemption, dec!(30000000));
    /// ```
    pub fn compute(
        &self,
        relationship: Option<Relationship>,
        gift_amount: Decimal,
        prior_gifts: &[GiftRecord],
        marriage_contributions: &[MarriageContribution],
        reference_date: Option<NaiveDate>,
    ) -> ExemptionResult {
        let gift_amount = non_negative(gift_amount);

        let base_relationship_exemption = self.ruleset.exemptions.exemption_for(relationship);
        if relationship.is_none() {
            debug!("unrecognised relationship; no relationship exemption");
        }

        let prior_gifts_offset = self.prior_gifts_offset(prior_gifts, reference_date);
        let mut relationship_exemption =
            non_negative(base_relationship_exemption - prior_gifts_offset);

        let marriage_exemption = self.marriage_exemption(marriage_contributions);
        if marriage_exemption > Decimal::ZERO
            && self
                .ruleset
                .marriage
                .as_ref()
                .is_some_and(|m| m.stacking == MarriageStacking::Exclusive)
        {
            debug!("marriage exemption used; relationship exemption forfeited");
            relationship_exemption = Decimal::ZERO;
        }

        let total_exemption = relationship_exemption
            .saturating_add(marriage_exemption)
            .min(gift_amount);

        debug!(
            %base_relationship_exemption,
            %prior_gifts_offset,
            %relationship_exemption,
            %marriage_exemption,
            %total_exemption,
            "exemptions aggregated"
        );

        ExemptionResult {
            base_relationship_exemption,
            prior_gifts_offset,
            relationship_exemption,
            marriage_exemption,
            total_exemption,
        }
    }

    /// Sum of prior gifts inside the look-back window.
    fn prior_gifts_offset(
        &self,
        prior_gifts: &[GiftRecord],
        reference_date: Option<NaiveDate>,
    ) -> Decimal {
        let Some(reference) = reference_date else {
            if !prior_gifts.is_empty() {
                warn!(
                    count = prior_gifts.len(),
                    "no gift date or reference date; prior gifts not offset"
                );
            }
            return Decimal::ZERO;
        };

        let window = self.ruleset.prior_gift_window;
        prior_gifts
            .iter()
            .filter(|gift| window.contains(reference, gift.date))
            .fold(Decimal::ZERO, |sum, gift| {
                sum.saturating_add(non_negative(gift.amount))
            })
    }

    /// Marriage exemption after per-contributor and aggregate caps.
    fn marriage_exemption(
        &self,
        contributions: &[MarriageContribution],
    ) -> Decimal {
        if contributions.is_empty() {
            return Decimal::ZERO;
        }
        let Some(policy) = &self.ruleset.marriage else {
            warn!(
                ruleset = %self.ruleset.name,
                "ruleset has no marriage exemption; contributions ignored"
            );
            return Decimal::ZERO;
        };

        contributions
            .iter()
            .map(|c| non_negative(c.amount).min(policy.per_contributor_cap))
            .fold(Decimal::ZERO, Decimal::saturating_add)
            .min(policy.aggregate_cap)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        BracketMethod, Contributor, ExemptionTable, LookbackWindow, MarriagePolicy, PenaltyPolicy,
        TaxBracket,
    };

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_ruleset(stacking: MarriageStacking) -> TaxRuleset {
        TaxRuleset {
            name: "test".to_string(),
            description: String::new(),
            exemptions: ExemptionTable {
                adult_child: dec!(50000000),
                minor_child: dec!(20000000),
                spouse: dec!(600000000),
                son_in_law_or_daughter_in_law: dec!(50000000),
                other: dec!(10000000),
            },
            brackets: vec![TaxBracket::new(None, dec!(0.10), dec!(0))],
            bracket_method: BracketMethod::Marginal,
            prior_gift_window: LookbackWindow::RollingYears { years: 10 },
            marriage: Some(MarriagePolicy {
                per_contributor_cap: dec!(60000000),
                aggregate_cap: dec!(100000000),
                stacking,
            }),
            youth: None,
            penalty: PenaltyPolicy::default(),
        }
    }

    fn contribution(
        contributor: Contributor,
        amount: Decimal,
    ) -> MarriageContribution {
        MarriageContribution {
            contributor,
            amount,
        }
    }

    // =========================================================================
    // relationship exemption tests
    // =========================================================================

    #[test]
    fn adult_child_without_history() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(80000000),
            &[],
            &[],
            Some(date(2025, 3, 1)),
        );

        assert_eq!(
            result,
            ExemptionResult {
                base_relationship_exemption: dec!(50000000),
                prior_gifts_offset: dec!(0),
                relationship_exemption: dec!(50000000),
                marriage_exemption: dec!(0),
                total_exemption: dec!(50000000),
            }
        );
    }

    #[test]
    fn unknown_relationship_gets_no_exemption() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);

        let result = aggregator.compute(None, dec!(80000000), &[], &[], None);

        assert_eq!(result.total_exemption, Decimal::ZERO);
    }

    #[test]
    fn total_is_capped_at_gift_amount() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);

        let result =
            aggregator.compute(Some(Relationship::Spouse), dec!(200000000), &[], &[], None);

        assert_eq!(result.relationship_exemption, dec!(600000000));
        assert_eq!(result.total_exemption, dec!(200000000));
    }

    #[test]
    fn zero_gift_yields_zero_exemption() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);

        let result = aggregator.compute(Some(Relationship::AdultChild), dec!(0), &[], &[], None);

        assert_eq!(result.total_exemption, Decimal::ZERO);
    }

    // =========================================================================
    // prior gift offset tests
    // =========================================================================

    #[test]
    fn prior_gifts_in_window_reduce_exemption() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let prior = vec![
            GiftRecord::new(dec!(20000000), date(2020, 5, 1)),
            GiftRecord::new(dec!(10000000), date(2023, 1, 15)),
        ];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(80000000),
            &prior,
            &[],
            Some(date(2025, 3, 1)),
        );

        assert_eq!(result.prior_gifts_offset, dec!(30000000));
        assert_eq!(result.relationship_exemption, dec!(20000000));
        assert_eq!(result.total_exemption, dec!(20000000));
    }

    #[test]
    fn prior_gifts_outside_window_are_ignored() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let prior = vec![GiftRecord::new(dec!(40000000), date(2014, 5, 1))];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(80000000),
            &prior,
            &[],
            Some(date(2025, 3, 1)),
        );

        assert_eq!(result.prior_gifts_offset, Decimal::ZERO);
        assert_eq!(result.relationship_exemption, dec!(50000000));
    }

    #[test]
    fn calendar_year_window_only_counts_same_year() {
        let mut ruleset = test_ruleset(MarriageStacking::Additive);
        ruleset.prior_gift_window = LookbackWindow::CalendarYear;
        let aggregator = ExemptionAggregator::new(&ruleset);
        let prior = vec![
            GiftRecord::new(dec!(15000000), date(2024, 12, 31)),
            GiftRecord::new(dec!(5000000), date(2025, 1, 2)),
        ];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(80000000),
            &prior,
            &[],
            Some(date(2025, 3, 1)),
        );

        assert_eq!(result.prior_gifts_offset, dec!(5000000));
        assert_eq!(result.relationship_exemption, dec!(45000000));
    }

    #[test]
    fn exhausted_exemption_floors_at_zero() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let prior = vec![GiftRecord::new(dec!(70000000), date(2024, 6, 1))];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(80000000),
            &prior,
            &[],
            Some(date(2025, 3, 1)),
        );

        assert_eq!(result.relationship_exemption, Decimal::ZERO);
        assert_eq!(result.total_exemption, Decimal::ZERO);
    }

    #[test]
    fn prior_gifts_ignored_without_reference_date() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let prior = vec![GiftRecord::new(dec!(10000000), date(2024, 6, 1))];

        let result =
            aggregator.compute(Some(Relationship::AdultChild), dec!(80000000), &prior, &[], None);

        assert_eq!(result.prior_gifts_offset, Decimal::ZERO);
        assert_eq!(result.relationship_exemption, dec!(50000000));
    }

    // =========================================================================
    // marriage exemption tests
    // =========================================================================

    #[test]
    fn marriage_exemption_stacks_when_additive() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let contributions = vec![
            contribution(Contributor::Father, dec!(40000000)),
            contribution(Contributor::Mother, dec!(30000000)),
        ];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(300000000),
            &[],
            &contributions,
            None,
        );

        assert_eq!(result.marriage_exemption, dec!(70000000));
        assert_eq!(result.relationship_exemption, dec!(50000000));
        assert_eq!(result.total_exemption, dec!(120000000));
    }

    #[test]
    fn marriage_exemption_forfeits_relationship_when_exclusive() {
        let ruleset = test_ruleset(MarriageStacking::Exclusive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let contributions = vec![contribution(Contributor::OwnParents, dec!(40000000))];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(300000000),
            &[],
            &contributions,
            None,
        );

        assert_eq!(result.base_relationship_exemption, dec!(50000000));
        assert_eq!(result.relationship_exemption, Decimal::ZERO);
        assert_eq!(result.total_exemption, dec!(40000000));
    }

    #[test]
    fn exclusive_policy_keeps_relationship_when_no_marriage_gift() {
        let ruleset = test_ruleset(MarriageStacking::Exclusive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let contributions = vec![contribution(Contributor::Father, dec!(0))];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(300000000),
            &[],
            &contributions,
            None,
        );

        assert_eq!(result.relationship_exemption, dec!(50000000));
    }

    #[test]
    fn marriage_contributions_are_capped_individually() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let contributions = vec![
            contribution(Contributor::OwnParents, dec!(90000000)),
            contribution(Contributor::InLawParents, dec!(10000000)),
        ];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(500000000),
            &[],
            &contributions,
            None,
        );

        // 60,000,000 (capped) + 10,000,000
        assert_eq!(result.marriage_exemption, dec!(70000000));
    }

    #[test]
    fn marriage_contributions_are_capped_in_aggregate() {
        let ruleset = test_ruleset(MarriageStacking::Additive);
        let aggregator = ExemptionAggregator::new(&ruleset);
        let contributions = vec![
            contribution(Contributor::Father, dec!(60000000)),
            contribution(Contributor::Mother, dec!(60000000)),
        ];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(500000000),
            &[],
            &contributions,
            None,
        );

        assert_eq!(result.marriage_exemption, dec!(100000000));
    }

    #[test]
    fn marriage_contributions_ignored_without_policy() {
        let mut ruleset = test_ruleset(MarriageStacking::Additive);
        ruleset.marriage = None;
        let aggregator = ExemptionAggregator::new(&ruleset);
        let contributions = vec![contribution(Contributor::Father, dec!(50000000))];

        let result = aggregator.compute(
            Some(Relationship::AdultChild),
            dec!(500000000),
            &[],
            &contributions,
            None,
        );

        assert_eq!(result.marriage_exemption, Decimal::ZERO);
        assert_eq!(result.total_exemption, dec!(50000000));
    }

    #[test]
    fn total_never_exceeds_gift_for_any_combination() {
        let prior = vec![GiftRecord::new(dec!(15000000), date(2025, 1, 10))];
        let contributions = vec![
            contribution(Contributor::Father, dec!(80000000)),
            contribution(Contributor::Mother, dec!(20000000)),
        ];

        for stacking in [MarriageStacking::Additive, MarriageStacking::Exclusive] {
            let ruleset = test_ruleset(stacking);
            let aggregator = ExemptionAggregator::new(&ruleset);
            for relationship in Relationship::ALL.map(Some).into_iter().chain([None]) {
                for gift in [dec!(0), dec!(1), dec!(9000000), dec!(75000000), dec!(900000000)] {
                    for (p, c) in [(&prior[..], &contributions[..]), (&[][..], &[][..])] {
                        let result =
                            aggregator.compute(relationship, gift, p, c, Some(date(2025, 6, 1)));

                        assert!(
                            result.total_exemption <= gift,
                            "{relationship:?} {stacking:?} {gift}: {result:?}"
                        );
                        assert!(result.total_exemption >= Decimal::ZERO);
                    }
                }
            }
        }
    }
}
