//! Ruleset configuration: TOML ruleset files, CSV bracket tables and the
//! registry of named rulesets compiled into the binaries.

mod loader;
mod registry;

pub use loader::{BracketLoader, BracketRecord, RulesetLoader, RulesetLoaderError};
pub use registry::{DEFAULT_RULESET, RulesetRegistry};
