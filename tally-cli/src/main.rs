use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use tally_finance::{ClassifiedStatement, LedgerEmitter, SolverBudget, parse_statement};
use tally_ingest::PlainTextPages;

mod config;
mod output;
mod state;

use output::Format;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Bank statement text to classified ledger"
)]
struct Cli {
    /// Log level or flexi_logger spec, e.g. `info` or `tally_finance=debug`
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Input {
    /// Statement text dump (pages separated by form feeds)
    #[arg(long)]
    text: Option<PathBuf>,

    /// Statement PDF (requires the `pdf` feature)
    #[arg(long)]
    pdf: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement and classify every movement as credit or debit
    Parse {
        #[command(flatten)]
        input: Input,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write output here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Parse a statement and emit normalized ledger records with content hashes
    Ledger {
        #[command(flatten)]
        input: Input,

        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        #[arg(long)]
        out: Option<PathBuf>,

        /// Override the configured home account
        #[arg(long)]
        account: Option<String>,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = flexi_logger::Logger::try_with_env_or_str(&cli.log_level)
        .with_context(|| format!("invalid log level '{}'", cli.log_level))?
        .log_to_stderr()
        .start()
        .context("start logger")?;

    match cli.command {
        Command::Parse { input, format, out } => {
            let cfg = config::load_config()?;
            let statement = load_statement(&input, &cfg.solver)?;
            let rendered = output::render_statement(&statement, format)?;
            output::emit(&rendered, out.as_deref())?;
        }

        Command::Ledger {
            input,
            format,
            out,
            account,
        } => {
            let cfg = config::load_config()?;
            let mut mapping = cfg.ledger;
            if let Some(account) = account {
                mapping.home_account = account;
            }

            let statement = load_statement(&input, &cfg.solver)?;
            if !statement.reconciliation.is_exact() {
                eprintln!(
                    "warning: credits not reconciled exactly ({:?}); review before importing",
                    statement.reconciliation
                );
            }

            let records = LedgerEmitter::to_records(&statement.transactions, &mapping);
            let inflows = records
                .iter()
                .filter(|r| r.is_inflow_to(&mapping.home_account))
                .count();
            info!(
                "ledger: {} record(s) for {} ({} inflow, {} outflow)",
                records.len(),
                mapping.home_account,
                inflows,
                records.len() - inflows
            );
            let rendered = output::render_ledger(&records, format)?;
            output::emit(&rendered, out.as_deref())?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn load_statement(input: &Input, budget: &SolverBudget) -> Result<ClassifiedStatement> {
    match (&input.text, &input.pdf) {
        (Some(path), _) => {
            let source = PlainTextPages::from_path(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_statement(&source, budget).with_context(|| format!("parsing {}", path.display()))
        }
        (None, Some(path)) => load_pdf_statement(path, budget),
        (None, None) => bail!("pass --text <file> or --pdf <file>"),
    }
}

#[cfg(feature = "pdf")]
fn load_pdf_statement(path: &Path, budget: &SolverBudget) -> Result<ClassifiedStatement> {
    let source = tally_ingest::PdfPages::from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_statement(&source, budget).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(not(feature = "pdf"))]
fn load_pdf_statement(path: &Path, _budget: &SolverBudget) -> Result<ClassifiedStatement> {
    bail!(
        "cannot read {}: built without PDF support (rebuild with --features pdf, or pass --text)",
        path.display()
    )
}
