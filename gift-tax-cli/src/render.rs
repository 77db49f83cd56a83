//! Text and JSON rendering of calculation results.

use std::fmt;

use clap::ValueEnum;
use gift_tax_core::{Relationship, TaxResult, TaxRuleset};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Groups the integer digits of `value` in thousands (`1234567.5` → `1,234,567.5`).
pub fn group_digits(value: Decimal) -> String {
    let text = value.abs().normalize().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// A won amount with digit grouping and the `원` suffix.
pub fn won(value: Decimal) -> String {
    format!("{}원", group_digits(value))
}

/// Korean calculation breakdown of one result.
pub struct TextReport<'a>(pub &'a TaxResult);

impl fmt::Display for TextReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let result = self.0;
        let ex = &result.exemptions;

        writeln!(f, "[{}]", result.ruleset)?;
        writeln!(f, "계산 과정")?;
        writeln!(f, "  입력된 증여 금액: {}", won(result.gift_amount))?;
        writeln!(
            f,
            "  공제 금액: {} (관계 공제 {}, 혼인 공제 {})",
            won(ex.total_exemption),
            won(ex.relationship_exemption),
            won(ex.marriage_exemption)
        )?;
        if !ex.prior_gifts_offset.is_zero() {
            writeln!(
                f,
                "    기본 공제 {} 중 과거 증여 {} 차감",
                won(ex.base_relationship_exemption),
                won(ex.prior_gifts_offset)
            )?;
        }
        writeln!(f, "  과세 금액: {}", won(result.taxable_amount))?;
        writeln!(f, "  증여세 계산: {}", won(result.base_tax))?;
        if let Some(youth) = &result.youth_reduction {
            writeln!(
                f,
                "  청년 감면: -{} (감면 후 {})",
                won(youth.reduction_amount),
                won(youth.reduced_tax)
            )?;
        }
        writeln!(
            f,
            "  가산세 계산: {} ({})",
            won(result.penalty.penalty_amount),
            result.penalty.message()
        )?;
        if result.penalty.status.is_late() {
            writeln!(
                f,
                "    신고불성실 {} + 납부지연 {} ({}일 경과)",
                won(result.penalty.late_filing_penalty),
                won(result.penalty.delinquency_surcharge),
                result.penalty.overdue_days
            )?;
        }
        writeln!(f, "최종 결과")?;
        writeln!(f, "  최종 납부세액: {}", won(result.total_due))
    }
}

/// Renders one result as the Korean calculation breakdown.
pub fn render_text(result: &TaxResult) -> String {
    TextReport(result).to_string()
}

/// Renders any serializable value as pretty-printed JSON.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// One line per ruleset plus its exemption table.
pub struct RulesetList<'a> {
    pub rulesets: &'a [&'a TaxRuleset],
    pub default: &'a str,
}

impl fmt::Display for RulesetList<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for ruleset in self.rulesets {
            let marker = if ruleset.name == self.default { " (default)" } else { "" };
            writeln!(f, "{}{}", ruleset.name, marker)?;
            if !ruleset.description.is_empty() {
                writeln!(f, "  {}", ruleset.description)?;
            }
            for relationship in Relationship::ALL {
                writeln!(
                    f,
                    "  {}: {}",
                    relationship.label(),
                    won(ruleset.exemptions.exemption_for(Some(relationship)))
                )?;
            }
        }
        Ok(())
    }
}

pub fn render_ruleset_list(
    rulesets: &[&TaxRuleset],
    default: &str,
) -> String {
    RulesetList { rulesets, default }.to_string()
}
