//! Gift-tax calculation modules.
//!
//! Each component is a small calculator borrowing the parts of a
//! [`TaxRuleset`](crate::TaxRuleset) it needs; [`GiftTaxCalculator`] sequences
//! them into a single [`TaxResult`](crate::TaxResult).

pub mod brackets;
pub mod common;
pub mod exemption;
pub mod gift_tax;
pub mod penalty;
pub mod youth;

pub use brackets::BracketSchedule;
pub use exemption::ExemptionAggregator;
pub use gift_tax::GiftTaxCalculator;
pub use penalty::PenaltyCalculator;
pub use youth::YouthReducer;
