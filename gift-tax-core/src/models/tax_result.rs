use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Breakdown of the exemption applied to the current gift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionResult {
    /// Ceiling from the exemption table before any offset.
    pub base_relationship_exemption: Decimal,
    /// Prior gifts inside the look-back window that used up the ceiling.
    pub prior_gifts_offset: Decimal,
    /// Relationship exemption after the prior-gift offset and the stacking policy.
    pub relationship_exemption: Decimal,
    pub marriage_exemption: Decimal,
    /// Exemption actually subtracted from the gift; never more than the gift itself.
    pub total_exemption: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouthReduction {
    pub reduced_tax: Decimal,
    pub reduction_amount: Decimal,
}

/// Outcome of the filing-date check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PenaltyStatus {
    /// A date was missing or unparseable; no penalty was computed.
    InvalidDates,
    OnTime,
    /// Filed after the statutory deadline but within the extension.
    LateWithinExtension,
    LateBeyondExtension,
}

impl PenaltyStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidDates => "날짜가 잘못 입력되었습니다.",
            Self::OnTime => "신고 기한 내 신고 완료",
            Self::LateWithinExtension => "신고 기한 초과 (3~6개월)",
            Self::LateBeyondExtension => "신고 기한 초과 (6개월 초과)",
        }
    }

    pub fn is_late(&self) -> bool {
        matches!(self, Self::LateWithinExtension | Self::LateBeyondExtension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyResult {
    pub status: PenaltyStatus,
    /// Late-filing plus delinquency surcharge, truncated to whole won.
    pub penalty_amount: Decimal,
    pub late_filing_penalty: Decimal,
    pub delinquency_surcharge: Decimal,
    pub overdue_days: i64,
    pub filing_deadline: Option<NaiveDate>,
}

impl PenaltyResult {
    pub(crate) fn zero(
        status: PenaltyStatus,
        filing_deadline: Option<NaiveDate>,
    ) -> Self {
        Self {
            status,
            penalty_amount: Decimal::ZERO,
            late_filing_penalty: Decimal::ZERO,
            delinquency_surcharge: Decimal::ZERO,
            overdue_days: 0,
            filing_deadline,
        }
    }

    pub fn message(&self) -> &'static str {
        self.status.message()
    }
}

/// Everything one calculation produced, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub ruleset: String,
    pub gift_amount: Decimal,
    pub exemptions: ExemptionResult,
    pub taxable_amount: Decimal,
    pub base_tax: Decimal,
    /// Present only when the youth flag was set.
    pub youth_reduction: Option<YouthReduction>,
    pub final_tax: Decimal,
    pub penalty: PenaltyResult,
    pub total_due: Decimal,
}
