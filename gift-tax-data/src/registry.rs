use std::collections::HashMap;

use gift_tax_core::TaxRuleset;

use crate::loader::{RulesetLoader, RulesetLoaderError};

/// Ruleset selected when none is named.
pub const DEFAULT_RULESET: &str = "marriage-reform";

const BUILTIN_RULESETS: &[(&str, &str)] = &[
    (
        "marriage-reform",
        include_str!("../rulesets/marriage-reform.toml"),
    ),
    (
        "calendar-year",
        include_str!("../rulesets/calendar-year.toml"),
    ),
];

/// Registry of named [`TaxRuleset`]s.
///
/// Typical lifetime:
/// 1. Create with `RulesetRegistry::with_builtins()` (or `new()` for an empty one).
/// 2. Call `register` for any ruleset loaded from a file.
/// 3. Call `get` with the name the user selected.
#[derive(Debug, Clone)]
pub struct RulesetRegistry {
    rulesets: HashMap<String, TaxRuleset>,
}

impl RulesetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rulesets: HashMap::new(),
        }
    }

    /// A registry holding the rulesets compiled into the crate.
    ///
    /// # Errors
    /// Fails only if a built-in ruleset file is malformed.
    pub fn with_builtins() -> Result<Self, RulesetLoaderError> {
        let mut registry = Self::new();
        for (_, toml_str) in BUILTIN_RULESETS {
            registry.register(RulesetLoader::parse(toml_str)?);
        }
        Ok(registry)
    }

    /// Register a ruleset under its own name.
    ///
    /// A ruleset with the same name already present is silently replaced.
    pub fn register(
        &mut self,
        ruleset: TaxRuleset,
    ) {
        self.rulesets.insert(ruleset.name.clone(), ruleset);
    }

    /// Names of every registered ruleset, sorted alphabetically.
    pub fn available_rulesets(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.rulesets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every registered ruleset, sorted by name.
    pub fn rulesets(&self) -> Vec<&TaxRuleset> {
        let mut rulesets: Vec<_> = self.rulesets.values().collect();
        rulesets.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        rulesets
    }

    /// Look up a ruleset by name.
    ///
    /// # Errors
    /// * [`RulesetLoaderError::UnknownRuleset`] naming the requested ruleset
    ///   and every available one.
    pub fn get(
        &self,
        name: &str,
    ) -> Result<&TaxRuleset, RulesetLoaderError> {
        self.rulesets
            .get(name)
            .ok_or_else(|| RulesetLoaderError::UnknownRuleset {
                name: name.to_string(),
                available: self
                    .available_rulesets()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
    }
}

impl Default for RulesetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use gift_tax_core::{BracketMethod, LookbackWindow, MarriageStacking, YouthReductionPolicy};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn named(
        registry: &RulesetRegistry,
        name: &str,
    ) -> TaxRuleset {
        let mut ruleset = registry.get(DEFAULT_RULESET).unwrap().clone();
        ruleset.name = name.to_string();
        ruleset
    }

    // ── registry construction ────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_rulesets() {
        assert!(RulesetRegistry::new().available_rulesets().is_empty());
    }

    #[test]
    fn default_registry_is_empty() {
        assert!(RulesetRegistry::default().available_rulesets().is_empty());
    }

    #[test]
    fn builtins_are_registered() {
        let reg = RulesetRegistry::with_builtins().unwrap();
        assert_eq!(
            reg.available_rulesets(),
            vec!["calendar-year", "marriage-reform"]
        );
    }

    #[test]
    fn builtin_names_match_file_names() {
        let reg = RulesetRegistry::with_builtins().unwrap();
        for (name, _) in BUILTIN_RULESETS {
            assert_eq!(reg.get(name).unwrap().name, *name);
        }
    }

    #[test]
    fn default_ruleset_is_builtin() {
        let reg = RulesetRegistry::with_builtins().unwrap();
        assert!(reg.get(DEFAULT_RULESET).is_ok());
    }

    // ── built-in contents ────────────────────────────────────────────────
    #[test]
    fn marriage_reform_policies() {
        let reg = RulesetRegistry::with_builtins().unwrap();
        let ruleset = reg.get("marriage-reform").unwrap();

        assert_eq!(ruleset.bracket_method, BracketMethod::QuickDeduction);
        assert_eq!(
            ruleset.prior_gift_window,
            LookbackWindow::RollingYears { years: 10 }
        );
        assert_eq!(ruleset.exemptions.adult_child, dec!(50000000));
        assert_eq!(
            ruleset.youth,
            Some(YouthReductionPolicy::BracketRateDelta { delta: dec!(0.10) })
        );
        let marriage = ruleset.marriage.as_ref().unwrap();
        assert_eq!(marriage.aggregate_cap, dec!(100000000));
        assert_eq!(marriage.stacking, MarriageStacking::Additive);
    }

    #[test]
    fn calendar_year_policies() {
        let reg = RulesetRegistry::with_builtins().unwrap();
        let ruleset = reg.get("calendar-year").unwrap();

        assert_eq!(ruleset.bracket_method, BracketMethod::Marginal);
        assert_eq!(ruleset.prior_gift_window, LookbackWindow::CalendarYear);
        assert_eq!(
            ruleset.marriage.as_ref().map(|m| m.stacking),
            Some(MarriageStacking::Exclusive)
        );
        assert_eq!(
            ruleset.youth,
            Some(YouthReductionPolicy::FlatRate { rate: dec!(0.30) })
        );
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn register_adds_ruleset() {
        let mut reg = RulesetRegistry::with_builtins().unwrap();
        let custom = named(&reg, "custom");
        reg.register(custom);
        assert_eq!(
            reg.available_rulesets(),
            vec!["calendar-year", "custom", "marriage-reform"]
        );
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = RulesetRegistry::with_builtins().unwrap();
        let mut replacement = named(&reg, DEFAULT_RULESET);
        replacement.description = "replaced".to_string();
        reg.register(replacement);

        assert_eq!(reg.available_rulesets().len(), 2);
        assert_eq!(reg.get(DEFAULT_RULESET).unwrap().description, "replaced");
    }

    #[test]
    fn rulesets_are_sorted_by_name() {
        let reg = RulesetRegistry::with_builtins().unwrap();
        let names: Vec<_> = reg.rulesets().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["calendar-year", "marriage-reform"]);
    }

    // ── unknown ruleset ──────────────────────────────────────────────────
    #[test]
    fn unknown_ruleset_names_requested_and_available() {
        let reg = RulesetRegistry::with_builtins().unwrap();

        match reg.get("2019") {
            Err(RulesetLoaderError::UnknownRuleset { name, available }) => {
                assert_eq!(name, "2019");
                assert_eq!(available, vec!["calendar-year", "marriage-reform"]);
            }
            other => panic!("expected UnknownRuleset error, got {other:#?}"),
        }
    }
}
