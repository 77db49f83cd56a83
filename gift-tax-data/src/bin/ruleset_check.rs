use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gift_tax_core::TaxRuleset;
use gift_tax_data::{BracketLoader, DEFAULT_RULESET, RulesetLoader, RulesetRegistry};

/// Validate a gift-tax ruleset and print its bracket table.
///
/// The ruleset TOML file should define:
/// - name, description, bracket_method
/// - an [exemptions] table with one ceiling per relationship
/// - one [[brackets]] entry per bracket (omit upper_limit on the last)
/// - optional [prior_gift_window], [marriage], [youth] and [penalty] tables
///
/// A bracket CSV (columns: ruleset, upper_limit, rate, cumulative_deduction)
/// replaces the table of the ruleset it names.
#[derive(Parser, Debug)]
#[command(name = "ruleset-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a ruleset TOML file; checks a built-in ruleset when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Built-in ruleset to check when no file is given
    #[arg(short, long, default_value = DEFAULT_RULESET)]
    ruleset: String,

    /// Path to a bracket CSV file replacing the ruleset's bracket table
    #[arg(short, long)]
    brackets: Option<PathBuf>,
}

fn print_ruleset(ruleset: &TaxRuleset) {
    println!("Ruleset: {}", ruleset.name);
    if !ruleset.description.is_empty() {
        println!("  {}", ruleset.description);
    }
    println!("Bracket method: {}", ruleset.bracket_method.as_str());
    println!("{:>16}  {:>6}  {:>14}", "upper limit", "rate", "deduction");
    for bracket in &ruleset.brackets {
        let limit = bracket
            .upper_limit
            .map_or_else(|| "-".to_string(), |l| l.to_string());
        println!(
            "{:>16}  {:>6}  {:>14}",
            limit, bracket.rate, bracket.cumulative_deduction
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let ruleset = match &args.file {
        Some(path) => RulesetLoader::load_file(path)
            .with_context(|| format!("Failed to load ruleset: {}", path.display()))?,
        None => RulesetRegistry::with_builtins()
            .context("Failed to load built-in rulesets")?
            .get(&args.ruleset)?
            .clone(),
    };

    let ruleset = match &args.brackets {
        Some(path) => {
            let records = BracketLoader::load_file(path)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            println!("Parsed {} bracket records from CSV", records.len());
            BracketLoader::apply(ruleset, &records)
                .with_context(|| format!("Failed to apply brackets from: {}", path.display()))?
        }
        None => ruleset,
    };

    print_ruleset(&ruleset);
    println!("Ruleset '{}' is valid.", ruleset.name);

    Ok(())
}
