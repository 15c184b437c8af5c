// stockdiff CLI - headless inventory snapshot comparison
// See DESIGN.md for the engine/io/cli split

mod exit_codes;
mod export;
mod session;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use stockdiff_io::WorkbookFile;
use stockdiff_recon::columns::suggest_master_sheet;
use stockdiff_recon::engine::{export_table, run, SnapshotInput, SnapshotSheets};
use stockdiff_recon::error::ReconError;
use stockdiff_recon::filter::{DecreaseFilter, FilterSpec, StockFilter};
use stockdiff_recon::model::{AggregatedRow, ReconMeta, ReconSummary, SkippedFile};
use stockdiff_recon::ReconConfig;

use exit_codes::{
    EXIT_ALL_FILES_FAILED, EXIT_ERROR, EXIT_INSUFFICIENT_SNAPSHOTS, EXIT_PARTIAL, EXIT_SUCCESS,
    EXIT_USAGE,
};
use session::AppState;

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn new(code: u8, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), hint: None }
    }
}

#[derive(Parser)]
#[command(name = "stockdiff")]
#[command(about = "Inventory delta reporting across spreadsheet snapshots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare snapshot workbooks, oldest first
    #[command(after_help = "\
Examples:
  stockdiff compare jan.xlsx feb.xlsx
  stockdiff compare jan.xlsx feb.xlsx mar.xlsx --stock out-of-stock
  stockdiff compare jan.xlsx feb.xlsx --decrease 50 --export report.csv
  stockdiff compare jan.xlsx feb.xlsx --master 2=商品マスター --json")]
    Compare {
        /// Snapshot workbooks in chronological order (oldest first)
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,

        /// Quantity-sheet override per file position, repeatable: N=SHEET
        #[arg(long, value_name = "N=SHEET")]
        sheet: Vec<String>,

        /// Master-sheet override per file position, repeatable: N=SHEET
        #[arg(long, value_name = "N=SHEET")]
        master: Vec<String>,

        /// Column-candidate config TOML (defaults are built in)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Substring filter on product name or location
        #[arg(long)]
        query: Option<String>,

        /// Stock-level filter: any, restocked, new, out-of-stock,
        /// 1-9, 10-19, 20-29, 30-39, 40-plus
        #[arg(long, default_value = "any")]
        stock: StockFilter,

        /// Minimum decrease rate in percent: any, 10, 20, 30, 40, 50, 75
        #[arg(long, default_value = "any")]
        decrease: DecreaseFilter,

        /// Print the JSON report to stdout instead of a plain table
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the relabeled comparison table as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List a workbook's sheet names and the suggested master sheet
    #[command(after_help = "\
Examples:
  stockdiff sheets stock_0215.xlsx")]
    Sheets {
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            files,
            sheet,
            master,
            config,
            query,
            stock,
            decrease,
            json,
            output,
            export,
        } => cmd_compare(CompareOpts {
            files,
            sheet,
            master,
            config,
            filter: FilterSpec { query, stock, decrease },
            json,
            output,
            export,
        }),
        Commands::Sheets { file } => cmd_sheets(&file),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = &e.hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

struct CompareOpts {
    files: Vec<PathBuf>,
    sheet: Vec<String>,
    master: Vec<String>,
    config: Option<PathBuf>,
    filter: FilterSpec,
    json: bool,
    output: Option<PathBuf>,
    export: Option<PathBuf>,
}

/// JSON report: run meta and full-table summary, rows post-filter.
#[derive(Serialize)]
struct CompareReport<'a> {
    meta: &'a ReconMeta,
    summary: &'a ReconSummary,
    filter: FilterEcho<'a>,
    matched: usize,
    rows: &'a [AggregatedRow],
    skipped: &'a [SkippedFile],
}

#[derive(Serialize)]
struct FilterEcho<'a> {
    query: Option<&'a str>,
    stock: StockFilter,
    decrease: DecreaseFilter,
}

fn cmd_compare(opts: CompareOpts) -> Result<(), CliError> {
    let config = load_config(opts.config.as_deref())?;
    let sheet_overrides = parse_overrides(&opts.sheet, opts.files.len())?;
    let master_overrides = parse_overrides(&opts.master, opts.files.len())?;

    let mut state = AppState::new(opts.files.len());

    let inputs: Vec<SnapshotInput> = opts
        .files
        .iter()
        .enumerate()
        .map(|(pos, path)| load_snapshot(path, pos, &sheet_overrides, &master_overrides, &config))
        .collect();

    let result = run(&config, inputs).map_err(|e| match e {
        ReconError::InsufficientSnapshots { found: 0 } => CliError {
            code: EXIT_ALL_FILES_FAILED,
            message: "no input file could be read and joined".into(),
            hint: Some("run `stockdiff sheets <file>` to check sheet names and headers".into()),
        },
        ReconError::InsufficientSnapshots { .. } => CliError {
            code: EXIT_INSUFFICIENT_SNAPSHOTS,
            message: e.to_string(),
            hint: Some("at least 2 files must parse and join to compare".into()),
        },
        other => CliError::new(EXIT_ERROR, other.to_string()),
    })?;

    for skip in &result.skipped {
        eprintln!("warning: skipped {}: {}", skip.origin, skip.reason);
    }

    let filtered = opts.filter.apply(&result.rows);
    let snapshot_count = result.meta.snapshot_labels.len();

    state
        .ledger
        .record(result.meta.snapshot_origins.clone(), snapshot_count, &result.rows);

    let report = CompareReport {
        meta: &result.meta,
        summary: &result.summary,
        filter: FilterEcho {
            query: opts.filter.query.as_deref(),
            stock: opts.filter.stock,
            decrease: opts.filter.decrease,
        },
        matched: filtered.len(),
        rows: &filtered,
        skipped: &result.skipped,
    };

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(path) = &opts.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(path) = &opts.export {
        export::write_export_csv(&export_table(&filtered, snapshot_count), path)
            .map_err(|e| CliError::new(EXIT_ERROR, e))?;
        eprintln!("wrote {}", path.display());
    }

    if opts.json {
        println!("{json_str}");
    } else {
        print_table(&filtered, snapshot_count);
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{} snapshots: {} products ({} increased, {} decreased, {} unchanged, {} unregistered)",
        snapshot_count,
        s.total_products,
        s.increased,
        s.decreased,
        s.unchanged,
        s.unregistered,
    );
    if !opts.filter.is_empty() {
        eprintln!("{} of {} products match the filters", filtered.len(), result.rows.len());
    }

    if !result.skipped.is_empty() {
        return Err(CliError::new(
            EXIT_PARTIAL,
            format!(
                "{} of {} files skipped; results cover the remaining files only",
                result.skipped.len(),
                opts.files.len()
            ),
        ));
    }

    Ok(())
}

fn cmd_sheets(path: &Path) -> Result<(), CliError> {
    let config = ReconConfig::default();
    let workbook = WorkbookFile::open(path).map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;

    let names = workbook.sheet_names();
    let suggested = default_master_sheet(names, &config);
    for name in names {
        if suggested == Some(name.as_str()) {
            println!("{name}\t(master)");
        } else {
            println!("{name}");
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    match path {
        None => Ok(ReconConfig::default()),
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                CliError::new(EXIT_USAGE, format!("cannot read config {}: {e}", path.display()))
            })?;
            ReconConfig::from_toml(&raw).map_err(|e| CliError::new(EXIT_USAGE, e.to_string()))
        }
    }
}

/// Parse repeatable "N=SHEET" overrides, 1-based file positions.
fn parse_overrides(specs: &[String], file_count: usize) -> Result<HashMap<usize, String>, CliError> {
    let mut overrides = HashMap::new();
    for spec in specs {
        let (pos, name) = spec.split_once('=').ok_or_else(|| {
            CliError::new(EXIT_USAGE, format!("bad override '{spec}' (expected N=SHEET)"))
        })?;
        let pos: usize = pos.trim().parse().map_err(|_| {
            CliError::new(EXIT_USAGE, format!("bad file position in '{spec}' (expected N=SHEET)"))
        })?;
        if pos == 0 || pos > file_count {
            return Err(CliError::new(
                EXIT_USAGE,
                format!("file position {pos} out of range (have {file_count} files)"),
            ));
        }
        overrides.insert(pos, name.to_string());
    }
    Ok(overrides)
}

/// Master-sheet default: keyword suggestion, else the second sheet when one
/// exists, else the first.
fn default_master_sheet<'a>(names: &'a [String], config: &ReconConfig) -> Option<&'a str> {
    suggest_master_sheet(names, &config.master_keywords)
        .or_else(|| names.get(1).or_else(|| names.first()).map(String::as_str))
}

fn load_snapshot(
    path: &Path,
    pos: usize,
    sheet_overrides: &HashMap<usize, String>,
    master_overrides: &HashMap<usize, String>,
    config: &ReconConfig,
) -> SnapshotInput {
    let origin = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let sheets = (|| -> Result<SnapshotSheets, ReconError> {
        let mut workbook = WorkbookFile::open(path).map_err(|e| ReconError::SheetRead {
            sheet: origin.clone(),
            message: e.to_string(),
        })?;
        let names = workbook.sheet_names().to_vec();

        let quantity_name = sheet_overrides
            .get(&(pos + 1))
            .cloned()
            .unwrap_or_else(|| names[0].clone());
        let master_name = master_overrides
            .get(&(pos + 1))
            .cloned()
            .or_else(|| default_master_sheet(&names, config).map(String::from))
            .unwrap_or_else(|| names[0].clone());

        let quantity = workbook.read_sheet(&quantity_name).map_err(|e| ReconError::SheetRead {
            sheet: quantity_name.clone(),
            message: e.to_string(),
        })?;
        let master = workbook.read_sheet(&master_name).map_err(|e| ReconError::SheetRead {
            sheet: master_name.clone(),
            message: e.to_string(),
        })?;
        Ok(SnapshotSheets { quantity, master })
    })();

    SnapshotInput { origin, sheets }
}

/// Plain tab-separated table on stdout for interactive use.
fn print_table(rows: &[AggregatedRow], snapshot_count: usize) {
    if rows.is_empty() {
        eprintln!("no products match the filters");
        return;
    }
    let table = export_table(rows, snapshot_count);
    println!("{}", table.headers.join("\t"));
    for row in &table.rows {
        println!("{}", row.join("\t"));
    }
}
