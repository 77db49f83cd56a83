pub mod calculations;
pub mod models;

pub use calculations::{
    BracketSchedule, ExemptionAggregator, GiftTaxCalculator, PenaltyCalculator, YouthReducer,
};
pub use models::*;
