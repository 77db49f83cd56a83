use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info};

use gift_tax_cli::{
    app::{self, AssetKind, GiftForm},
    csv_loader, logging,
    render::{self, OutputFormat},
};
use gift_tax_core::{GiftTaxCalculator, TaxResult};
use gift_tax_data::{DEFAULT_RULESET, RulesetRegistry};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Korean gift tax (증여세) calculator.
///
/// Computes exemptions, bracket tax, the youth reduction and late-filing
/// penalties for one gift given on the command line, or for every row of a
/// CSV file passed with `--input`.
#[derive(Debug, Parser)]
#[command(name = "gift-tax", version, about)]
struct Cli {
    /// Built-in ruleset to calculate with.
    #[arg(long, default_value = DEFAULT_RULESET)]
    ruleset: String,

    /// Ruleset TOML file; overrides `--ruleset`.
    #[arg(long)]
    ruleset_file: Option<PathBuf>,

    /// Bracket CSV replacing the selected ruleset's bracket table.
    #[arg(long)]
    brackets: Option<PathBuf>,

    /// Donor relationship: adultChild, minorChild, spouse,
    /// sonInLawDaughterInLaw or other.
    #[arg(long, default_value = "")]
    relationship: String,

    /// Kind of property given.
    #[arg(long, value_enum, default_value_t = AssetKind::Cash)]
    asset: AssetKind,

    /// Cash amount or appraised real-estate value (e.g. `80,000,000`).
    #[arg(long, default_value = "")]
    amount: String,

    /// Number of shares, for `--asset stock`.
    #[arg(long, default_value = "")]
    quantity: String,

    /// Price per share, for `--asset stock`.
    #[arg(long, default_value = "")]
    unit_price: String,

    /// Earlier gift from the same donor group, as `AMOUNT@YYYY-MM-DD`.
    /// Repeatable.
    #[arg(long = "prior-gift")]
    prior_gifts: Vec<String>,

    /// Marriage gift contribution, as `CONTRIBUTOR=AMOUNT`. Repeatable.
    #[arg(long)]
    marriage: Vec<String>,

    /// Apply the youth reduction.
    #[arg(long)]
    youth: bool,

    /// Date of the gift (`YYYY-MM-DD`).
    #[arg(long, default_value = "")]
    gift_date: String,

    /// Date the return was filed (`YYYY-MM-DD`).
    #[arg(long, default_value = "")]
    submission_date: String,

    /// Reference date for the prior-gift window when no gift date is
    /// given. Defaults to today.
    #[arg(long, default_value = "")]
    as_of: String,

    /// CSV file with one gift per row; replaces the single-gift flags.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log filter (e.g. `debug`); falls back to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log lines to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// List the built-in rulesets and exit.
    #[arg(long)]
    list_rulesets: bool,
}

impl Cli {
    fn gift_form(&self) -> GiftForm {
        GiftForm {
            relationship: self.relationship.clone(),
            asset: self.asset,
            amount: self.amount.clone(),
            quantity: self.quantity.clone(),
            unit_price: self.unit_price.clone(),
            prior_gifts: self.prior_gifts.clone(),
            marriage: self.marriage.clone(),
            youth: self.youth,
            gift_date: self.gift_date.clone(),
            submission_date: self.submission_date.clone(),
            as_of: self.as_of.clone(),
        }
    }
}

// ─── output ──────────────────────────────────────────────────────────────────

fn print_results(
    results: &[TaxResult],
    format: OutputFormat,
    batch: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for (i, result) in results.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", render::render_text(result));
            }
        }
        OutputFormat::Json if batch => {
            println!("{}", render::render_json(results).context("Failed to encode results")?);
        }
        OutputFormat::Json => {
            for result in results {
                println!("{}", render::render_json(result).context("Failed to encode result")?);
            }
        }
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    if cli.list_rulesets {
        let registry = RulesetRegistry::with_builtins().context("Failed to load built-in rulesets")?;
        print!("{}", render::render_ruleset_list(&registry.rulesets(), DEFAULT_RULESET));
        return Ok(());
    }

    let ruleset = app::select_ruleset(
        &cli.ruleset,
        cli.ruleset_file.as_deref(),
        cli.brackets.as_deref(),
    )?;
    let calculator = GiftTaxCalculator::new(ruleset).context("Ruleset failed validation")?;

    let (inputs, batch) = match &cli.input {
        Some(path) => {
            let inputs = csv_loader::load_from_file(path)
                .with_context(|| format!("Failed to load gifts: {}", path.display()))?;
            info!(rows = inputs.len(), path = %path.display(), "loaded gift batch");
            (inputs, true)
        }
        None => (vec![cli.gift_form().to_input()], false),
    };

    let today = Local::now().date_naive();
    let results: Vec<TaxResult> = inputs
        .into_iter()
        .map(|input| calculator.calculate(&app::with_default_as_of(input, today)))
        .collect();
    debug!(count = results.len(), ruleset = %calculator.ruleset().name, "calculated");

    print_results(&results, cli.format, batch)
}
