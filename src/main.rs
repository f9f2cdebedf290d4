// Entry point: load the two configuration files, run the compiler once and
// print the numbered recommendation table, the portfolio figures and the
// manual follow-ups.
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use iac_compiler::output::{preview_table, print_caveats};
use iac_compiler::util::{format_currency, format_int, format_rounded};
use iac_compiler::{compile, Config};
use tracing_subscriber::EnvFilter;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CliArgs {
    /// Compiler settings (site, report conventions, folders).
    #[arg(long, default_value = "Compiler.toml")]
    config: PathBuf,
    /// Utility rates and bill totals.
    #[arg(long, default_value = "Utility.toml")]
    utility: PathBuf,
    /// Folder holding ARs/, Report/ and Energy Charts/.
    #[arg(long, default_value = ".")]
    workdir: PathBuf,
    /// Date the report as of this day (YYYY-MM-DD) instead of today.
    #[arg(long)]
    today: Option<NaiveDate>,
}

fn progress(message: &str) {
    print!("{}...", message);
    let _ = io::stdout().flush();
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("iac_compiler=info")),
        )
        .init();

    let args = CliArgs::parse();
    let compiler_path = args.workdir.join(&args.config);
    let utility_path = args.workdir.join(&args.utility);

    progress("Reading configuration");
    let config = Config::load(&compiler_path, &utility_path).with_context(|| {
        format!(
            "loading {} and {}",
            compiler_path.display(),
            utility_path.display()
        )
    })?;
    println!("done");

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    println!("Compiling report {}...", config.compiler.site.le);
    let outcome = compile(&config, &args.workdir, today).context("compiling report")?;

    println!(
        "Processed {} recommendations ({} primary, {} supplemental)\n",
        format_int(outcome.load.documents),
        format_int(outcome.load.primary),
        format_int(outcome.load.supplemental)
    );
    preview_table(
        "Recommendation Summary",
        Some("sorted by payback period"),
        &outcome.rows,
        outcome.rows.len(),
    );
    println!("(Full table exported to {})\n", outcome.csv_path.display());

    let primary = &outcome.portfolio.primary;
    println!("Summary Stats ({}):", outcome.summary_path.display());
    println!(
        "  Energy savings: {} MMBtu, CO2: {} t, cost savings: {}, implementation cost: {}, payback: {}",
        format_rounded(primary.combined_mmbtu),
        format_rounded(primary.co2_tonnes.unwrap_or_default()),
        format_currency(primary.annual_cost_savings, 0),
        format_currency(primary.implementation_cost, 0),
        primary.payback
    );
    if let Some(supplemental) = &outcome.portfolio.supplemental {
        println!(
            "  Additional: {} MMBtu, cost savings: {}, implementation cost: {}, payback: {}",
            format_rounded(supplemental.combined_mmbtu),
            format_currency(supplemental.annual_cost_savings, 0),
            format_currency(supplemental.implementation_cost, 0),
            supplemental.payback
        );
    }
    println!();
    println!("{} is finished.", outcome.report_path.display());
    println!("(Preview written to {})\n", outcome.markdown_path.display());
    print_caveats();
    Ok(())
}
