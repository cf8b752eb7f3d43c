use log::{debug, info, warn};

use ads_factors::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::args::Args;
use crate::ads::config_reader::*;
use crate::ads::io_common::*;
use crate::ads::packager::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod packager;

use crate::ads::io_excel::FactorWorkbook;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AdsError {
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV file {path}"))]
    ParsingCsv { source: csv::Error, path: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Sheet {sheet:?} not found in {path}, available sheets: {available:?}"))]
    MissingSheet {
        path: String,
        sheet: String,
        available: Vec<String>,
    },
    #[snafu(display(
        "{path} contains several sheets ({available:?}), a sheet name must be provided"
    ))]
    AmbiguousSheet {
        path: String,
        available: Vec<String>,
    },
    #[snafu(display("{path} does not contain any sheet"))]
    NoSheet { path: String },
    #[snafu(display("Sheet {sheet:?} is empty, expected a header row"))]
    EmptySheet { sheet: String },
    #[snafu(display("Sheet {sheet:?}: cannot read the cell at row {row}, column {col}: {content}"))]
    ExcelCell {
        sheet: String,
        row: usize,
        col: usize,
        content: String,
    },
    #[snafu(display("Invalid table in {path}"))]
    BuildingTable { source: FactorErrors, path: String },
    #[snafu(display("Error applying factors to {file_name}"))]
    ApplyingFactors {
        source: FactorErrors,
        file_name: String,
    },
    #[snafu(display("Error writing the CSV output of {file_name}"))]
    WritingCsv {
        source: csv::Error,
        file_name: String,
    },
    #[snafu(display("Error flushing the CSV output of {file_name}"))]
    FlushingCsv {
        source: std::io::Error,
        file_name: String,
    },
    #[snafu(display("Error writing archive entry {entry}"))]
    WritingArchive {
        source: zip::result::ZipError,
        entry: String,
    },
    #[snafu(display("Error writing the content of archive entry {entry}"))]
    WritingArchiveData {
        source: std::io::Error,
        entry: String,
    },
    #[snafu(display("Two ADS files would be written to the same archive entry {entry}"))]
    DuplicateEntry { entry: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON configuration {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the archive to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot find a file name in {path}"))]
    MissingFileName { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AdsResult<T> = Result<T, AdsError>;

/// One ADS file to process, with the sheet that provides its factors.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DatasetSource {
    pub path: String,
    pub sheet: Option<String>,
}

/// Everything needed to run a batch, once the configuration file and the
/// command line options have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BatchPlan {
    pub factor_file: String,
    pub datasets: Vec<DatasetSource>,
    pub output_path: Option<String>,
    pub rules: FactorRules,
}

/// Matches the `--sheet` options with the `--input` options.
fn pair_sheets(inputs: &[String], sheets: &[String]) -> AdsResult<Vec<DatasetSource>> {
    let paired: Vec<Option<String>> = match sheets {
        [] => vec![None; inputs.len()],
        [s] => vec![Some(s.clone()); inputs.len()],
        _ if sheets.len() == inputs.len() => sheets.iter().cloned().map(Some).collect(),
        _ => {
            whatever!(
                "{} sheets given for {} input files: pass a single sheet or one sheet per input",
                sheets.len(),
                inputs.len()
            )
        }
    };
    Ok(inputs
        .iter()
        .zip(paired)
        .map(|(path, sheet)| DatasetSource {
            path: path.clone(),
            sheet,
        })
        .collect())
}

/// Builds the batch from the command line, reading the configuration file if one is given.
///
/// The command line takes precedence: `--input` replaces the datasets of the configuration,
/// `--factors` and `--out` replace their counterparts. A single `--sheet` also serves as the
/// default sheet for the datasets of the configuration that do not name one.
pub fn plan_from_args(args: &Args) -> AdsResult<BatchPlan> {
    let config: Option<(BatchConfig, Option<PathBuf>)> = match &args.config {
        Some(config_path) => {
            let config = read_batch_config(config_path)?;
            let root = Path::new(config_path).parent().map(|p| p.to_path_buf());
            Some((config, root))
        }
        None => None,
    };
    debug!("plan_from_args: config: {:?}", config);

    let datasets: Vec<DatasetSource> = if !args.input.is_empty() {
        pair_sheets(&args.input, &args.sheet)?
    } else if let Some((config, root)) = &config {
        let default_sheet = match args.sheet.as_slice() {
            [] => None,
            [s] => Some(s.clone()),
            _ => whatever!("Several --sheet options given without --input"),
        };
        config
            .datasets
            .iter()
            .map(|d| DatasetSource {
                path: resolve_path(root.as_deref(), &d.file_path),
                sheet: d.sheet_name.clone().or_else(|| default_sheet.clone()),
            })
            .collect()
    } else {
        vec![]
    };

    let factor_file = match (&args.factors, &config) {
        (Some(f), _) => f.clone(),
        (None, Some((c, root))) => match &c.factor_file {
            Some(f) => resolve_path(root.as_deref(), f),
            None => whatever!("No factor file given, use --factors or the factorFile field"),
        },
        (None, None) => whatever!("No factor file given, use --factors"),
    };

    let output_path = match (&args.out, &config) {
        (Some(o), _) => Some(o.clone()),
        (None, Some((c, root))) => c
            .output_path
            .as_ref()
            .map(|o| resolve_path(root.as_deref(), o)),
        (None, None) => None,
    };

    let reject = args.reject_duplicate_years
        || config
            .as_ref()
            .and_then(|(c, _)| c.reject_duplicate_years)
            .unwrap_or(false);
    let rules = FactorRules {
        duplicate_year_mode: if reject {
            DuplicateYearMode::Reject
        } else {
            DuplicateYearMode::LastWins
        },
    };

    Ok(BatchPlan {
        factor_file,
        datasets,
        output_path,
        rules,
    })
}

/// Reads all the inputs of the plan into jobs.
///
/// Every file is read before anything is processed, so that a malformed input stops the
/// batch before any archive is produced. Each sheet is read at most once.
pub fn load_jobs(plan: &BatchPlan) -> AdsResult<Vec<BatchJob>> {
    if plan.datasets.is_empty() {
        whatever!("No ADS file to process, use --input or the datasets field");
    }
    let mut workbook = FactorWorkbook::open(&plan.factor_file)?;
    info!(
        "Factor file {:?}: available sheets {:?}",
        plan.factor_file,
        workbook.sheet_names()
    );

    let mut sheet_tables: HashMap<String, Table> = HashMap::new();
    let mut jobs: Vec<BatchJob> = Vec::new();
    for source in plan.datasets.iter() {
        info!("Attempting to read ADS file {:?}", source.path);
        let file_name = simplify_file_name(&source.path)?;
        let dataset = io_csv::read_dataset(&source.path)?;
        let sheet = workbook.resolve_sheet(source.sheet.as_deref())?;
        debug!("load_jobs: {:?} uses sheet {:?}", file_name, sheet);
        let factors = match sheet_tables.get(&sheet) {
            Some(t) => t.clone(),
            None => {
                let t = workbook.factor_table(&sheet)?;
                sheet_tables.insert(sheet.clone(), t.clone());
                t
            }
        };
        jobs.push(BatchJob {
            file_name,
            dataset,
            factors,
        });
    }
    Ok(jobs)
}

/// Runs the whole batch and writes the archive. Returns the path of the archive.
pub fn run_batch(plan: &BatchPlan) -> AdsResult<PathBuf> {
    let start = Instant::now();
    let jobs = load_jobs(plan)?;

    let packaged = package(&jobs, &plan.rules, |p| {
        info!(
            "Processed {}/{}: {} -> {}",
            p.index + 1,
            p.total,
            p.file_name,
            p.entry
        );
    })?;

    for e in packaged.entries.iter() {
        if e.applied == 0 {
            warn!(
                "{}: no factor matched, the file is unchanged ({} skipped)",
                e.source, e.skipped
            );
        } else {
            info!(
                "{} ({}): {} factors applied, {} skipped",
                e.source, e.tag, e.applied, e.skipped
            );
        }
    }

    let today = chrono::Local::now().date_naive();
    let out_path = output_archive_path(plan.output_path.as_deref(), today);
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingOutputSnafu {
                path: parent.display().to_string(),
            })?;
        }
    }
    fs::write(&out_path, &packaged.bytes).context(WritingOutputSnafu {
        path: out_path.display().to_string(),
    })?;

    info!(
        "Wrote {} files to {:?}. Process took {:.2} seconds",
        packaged.entries.len(),
        out_path,
        start.elapsed().as_secs_f64()
    );
    Ok(out_path)
}

pub fn list_sheets(path: &str) -> AdsResult<Vec<String>> {
    let workbook = FactorWorkbook::open(path)?;
    Ok(workbook.sheet_names())
}
