//! Integration tests for ruleset loading driving the calculator end to end.

use std::path::Path;

use gift_tax_core::{
    Contributor, GiftAsset, GiftTaxCalculator, GiftTaxInput, MarriageContribution, Relationship,
    TaxRuleset,
};
use gift_tax_data::{BracketLoader, DEFAULT_RULESET, RulesetLoader, RulesetRegistry};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TEST_BRACKETS_CSV: &str = include_str!("../test-data/brackets.csv");

fn builtin(name: &str) -> TaxRuleset {
    RulesetRegistry::with_builtins()
        .expect("Failed to load built-in rulesets")
        .get(name)
        .expect("Built-in ruleset missing")
        .clone()
}

fn marriage_gift(amount: Decimal) -> GiftTaxInput {
    GiftTaxInput {
        relationship: Some(Relationship::AdultChild),
        asset: GiftAsset::Cash {
            amount: dec!(300000000),
        },
        marriage_contributions: vec![
            MarriageContribution {
                contributor: Contributor::Father,
                amount,
            },
            MarriageContribution {
                contributor: Contributor::Mother,
                amount,
            },
        ],
        ..Default::default()
    }
}

#[test]
fn test_ruleset_files_load_from_disk() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("rulesets");

    for name in ["marriage-reform", "calendar-year"] {
        let ruleset = RulesetLoader::load_file(&dir.join(format!("{name}.toml")))
            .expect("Failed to load ruleset file");

        assert_eq!(ruleset, builtin(name));
    }
}

#[test]
fn test_default_ruleset_basic_gift() {
    let calculator = GiftTaxCalculator::new(builtin(DEFAULT_RULESET)).expect("Invalid ruleset");
    let input = GiftTaxInput::new(
        Relationship::AdultChild,
        GiftAsset::Cash {
            amount: dec!(80000000),
        },
    );

    let result = calculator.calculate(&input);

    assert_eq!(result.ruleset, "marriage-reform");
    assert_eq!(result.taxable_amount, dec!(30000000));
    assert_eq!(result.final_tax, dec!(3000000));
}

#[test]
fn test_marriage_reform_stacks_marriage_exemption() {
    let calculator = GiftTaxCalculator::new(builtin("marriage-reform")).expect("Invalid ruleset");

    let result = calculator.calculate(&marriage_gift(dec!(60000000)));

    // 50,000,000 relationship + 100,000,000 aggregate marriage cap
    assert_eq!(result.exemptions.marriage_exemption, dec!(100000000));
    assert_eq!(result.exemptions.total_exemption, dec!(150000000));
    assert_eq!(result.taxable_amount, dec!(150000000));
    assert_eq!(result.base_tax, dec!(20000000));
}

#[test]
fn test_marriage_reform_youth_uses_reduced_rates() {
    let calculator = GiftTaxCalculator::new(builtin("marriage-reform")).expect("Invalid ruleset");
    let mut input = marriage_gift(dec!(60000000));
    input.youth = true;

    let result = calculator.calculate(&input);

    // 150,000,000 falls in the second bracket, reduced from 20% to 10%
    assert_eq!(result.final_tax, dec!(15000000));
    assert_eq!(
        result.youth_reduction.map(|r| r.reduction_amount),
        Some(dec!(5000000))
    );
}

#[test]
fn test_calendar_year_marriage_exemption_is_exclusive() {
    let calculator = GiftTaxCalculator::new(builtin("calendar-year")).expect("Invalid ruleset");

    let result = calculator.calculate(&marriage_gift(dec!(30000000)));

    assert_eq!(result.exemptions.relationship_exemption, Decimal::ZERO);
    assert_eq!(result.exemptions.marriage_exemption, dec!(50000000));
    assert_eq!(result.taxable_amount, dec!(250000000));
    // 10,000,000 on the first 100,000,000 plus 20% of the next 150,000,000
    assert_eq!(result.base_tax, dec!(40000000));
}

#[test]
fn test_rulesets_differ_for_same_input() {
    let input = GiftTaxInput::new(
        Relationship::AdultChild,
        GiftAsset::Cash {
            amount: dec!(90000000),
        },
    );

    let reform = GiftTaxCalculator::new(builtin("marriage-reform"))
        .expect("Invalid ruleset")
        .calculate(&input);
    let calendar = GiftTaxCalculator::new(builtin("calendar-year"))
        .expect("Invalid ruleset")
        .calculate(&input);

    assert_eq!(reform.final_tax, dec!(4000000));
    assert_eq!(calendar.final_tax, Decimal::ZERO);
}

#[test]
fn test_bracket_csv_matches_builtin_table() {
    let records = BracketLoader::parse(TEST_BRACKETS_CSV.as_bytes()).expect("Failed to parse CSV");
    let ruleset = builtin("marriage-reform");
    let expected = ruleset.brackets.clone();

    let ruleset = BracketLoader::apply(ruleset, &records).expect("Failed to apply brackets");

    assert_eq!(ruleset.brackets, expected);
}

#[test]
fn test_bracket_csv_replaces_table_for_renamed_ruleset() {
    let records = BracketLoader::parse(TEST_BRACKETS_CSV.as_bytes()).expect("Failed to parse CSV");
    let mut ruleset = builtin("marriage-reform");
    ruleset.name = "flat-2023".to_string();

    let ruleset = BracketLoader::apply(ruleset, &records).expect("Failed to apply brackets");
    let calculator = GiftTaxCalculator::new(ruleset).expect("Invalid ruleset");
    let input = GiftTaxInput {
        relationship: None,
        asset: GiftAsset::Cash {
            amount: dec!(300000000),
        },
        ..Default::default()
    };

    let result = calculator.calculate(&input);

    assert_eq!(result.base_tax, dec!(40000000));
}
