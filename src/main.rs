use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use presale_mapper::config::{GeminiConfig, LedgerConfig};
use presale_mapper::export::{export_json, CsvDirWriter, TabularWriter};
use presale_mapper::extract::{GeminiExtractor, Instructions, NoticeProcessor};
use presale_mapper::ledger::LedgerService;
use presale_mapper::model::ResolvedUnit;
use presale_mapper::parser::{
    detect_layout_kind, read_layout_rules, read_price_tiers, read_unit_list, LayoutKind,
};
use presale_mapper::resolver::{expand_layout, join_prices, PriceTierIndex};
use presale_mapper::ui::App;

#[derive(Parser, Debug)]
#[command(name = "presale-mapper")]
#[command(about = "Presale Mapper - map pre-sale notice prices onto units")]
#[command(version)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price every unit of a layout from a price tier table
    Resolve {
        /// Layout rules (`*단지입력*.csv`) or a unit list CSV
        layout: PathBuf,

        /// Price tiers: an extraction reply (.json) or a `_분양가표.csv`
        prices: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Name used for output files (defaults to the price file's stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// Extract tables from pre-sale notice PDFs
    Extract {
        /// Notice documents
        #[arg(required = true)]
        documents: Vec<PathBuf>,

        /// Layout file to use instead of searching next to each document
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        gemini: GeminiConfig,
    },

    /// Look up building ledger title info for an address
    Ledger {
        address: String,

        /// Ignore cached results
        #[arg(long)]
        refresh: bool,

        #[command(flatten)]
        config: LedgerConfig,
    },

    /// Browse resolved units in the terminal
    Browse {
        /// `*_분양가_완료.json` written by `resolve` or `extract`
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool, browsing: bool) {
    let default = match (browsing, verbose) {
        (true, _) => "warn",
        (false, true) => "debug",
        (false, false) => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose, matches!(cli.command, Command::Browse { .. }));

    match cli.command {
        Command::Resolve {
            layout,
            prices,
            output,
            name,
        } => {
            let name = name.unwrap_or_else(|| file_stem(&prices));
            run_resolve(&layout, &prices, &output, &name)
        }
        Command::Extract {
            documents,
            layout,
            output,
            gemini,
        } => run_extract(&documents, layout, &output, gemini),
        Command::Ledger {
            address,
            refresh,
            config,
        } => {
            let service = LedgerService::from_config(&config)?;
            let result = service.lookup(&address, refresh)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Browse { file } => run_browse(&file),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map_or_else(
        || "resolved".to_string(),
        |s| s.to_string_lossy().into_owned(),
    )
}

fn run_resolve(layout: &Path, prices: &Path, output: &Path, name: &str) -> Result<()> {
    let tiers = read_price_tiers(prices)?;
    if tiers.is_empty() {
        bail!("no price tiers in {}", prices.display());
    }

    let units = match detect_layout_kind(layout)? {
        LayoutKind::Rules => expand_layout(&read_layout_rules(layout)?.records),
        LayoutKind::UnitList => read_unit_list(layout)?.records,
    };

    let index = PriceTierIndex::build(tiers);
    let (resolved, summary) = join_prices(units, &index);

    let target = format!("{name}_분양가_완료");
    let writer = CsvDirWriter::new(output);
    let csv_path = writer.write_table(&target, &resolved)?;
    let json_path = output.join(format!("{target}.json"));
    export_json(&resolved, &json_path)?;

    println!(
        "{} units ({} priced, {} without price)",
        summary.total(),
        summary.priced,
        summary.unpriced
    );
    let collisions = index.report().collisions.len();
    if collisions > 0 {
        warn!(collisions, "overlapping price tiers, later tiers were kept");
    }
    println!("Exported to CSV: {}", csv_path.display());
    println!("Exported to JSON: {}", json_path.display());
    Ok(())
}

fn run_extract(
    documents: &[PathBuf],
    layout: Option<PathBuf>,
    output: &Path,
    gemini: GeminiConfig,
) -> Result<()> {
    let instructions = Instructions::with_overrides(&gemini.prompts_dir);
    let extractor = GeminiExtractor::new(gemini)?;
    let mut processor = NoticeProcessor::new(extractor, CsvDirWriter::new(output))
        .with_instructions(instructions)
        .with_json_dir(output);
    if let Some(layout) = layout {
        processor = processor.with_layout_file(layout);
    }

    let mut failed = 0;
    for document in documents {
        match processor.process_path(document) {
            Ok(report) if report.all_sections_failed() => {
                error!(document = %document.display(), "every section failed");
                failed += 1;
            }
            Ok(report) => {
                println!(
                    "{}: {} files written, {} sections failed",
                    report.name,
                    report.written.len(),
                    report.failures.len()
                );
                if let Some(join) = report.join {
                    println!("  {} units, {} priced", join.total(), join.priced);
                }
            }
            Err(e) => {
                error!(document = %document.display(), error = %e, "document failed");
                failed += 1;
            }
        }
    }

    info!(documents = documents.len(), failed, "extraction finished");
    if failed == documents.len() {
        bail!("all {failed} documents failed");
    }
    Ok(())
}

fn run_browse(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;
    let units: Vec<ResolvedUnit> = serde_json::from_str(&text)
        .wrap_err_with(|| format!("{} is not a resolved unit list", file.display()))?;
    if units.is_empty() {
        bail!("no units in {}", file.display());
    }

    let title = file_stem(file);
    let terminal = ratatui::init();
    let result = App::new(title, &units).run(terminal);
    ratatui::restore();
    result
}
