mod gift;
mod relationship;
mod ruleset;
mod tax_bracket;
mod tax_result;

pub use gift::{Contributor, GiftAsset, GiftRecord, GiftTaxInput, MarriageContribution};
pub use relationship::Relationship;
pub use ruleset::{
    ExemptionTable, LookbackWindow, MarriagePolicy, MarriageStacking, PenaltyPolicy, RulesetError,
    TaxRuleset, YouthReductionPolicy,
};
pub use tax_bracket::{BracketMethod, TaxBracket};
pub use tax_result::{ExemptionResult, PenaltyResult, PenaltyStatus, TaxResult, YouthReduction};
