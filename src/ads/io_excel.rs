use std::fs::File;
use std::io::BufReader;

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use snafu::OptionExt;

use crate::ads::*;

/// The factor workbook, opened once for the whole batch.
pub struct FactorWorkbook {
    path: String,
    workbook: Xlsx<BufReader<File>>,
}

impl FactorWorkbook {
    pub fn open(path: &str) -> AdsResult<FactorWorkbook> {
        debug!("FactorWorkbook::open: path: {:?}", path);
        let workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
        Ok(FactorWorkbook {
            path: path.to_string(),
            workbook,
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// The sheet to use for a dataset: the requested one if it exists, or the only sheet of
    /// the workbook when none is requested.
    pub fn resolve_sheet(&self, requested: Option<&str>) -> AdsResult<String> {
        choose_sheet(&self.path, &self.sheet_names(), requested)
    }

    pub fn factor_table(&mut self, sheet: &str) -> AdsResult<Table> {
        let path = self.path.clone();
        let available = self.sheet_names();
        let wrange = self
            .workbook
            .worksheet_range(sheet)
            .context(MissingSheetSnafu {
                path: path.clone(),
                sheet,
                available,
            })?
            .context(OpeningExcelSnafu { path })?;
        range_to_table(&wrange, sheet)
    }
}

fn choose_sheet(path: &str, available: &[String], requested: Option<&str>) -> AdsResult<String> {
    match (requested, available) {
        (Some(s), _) if available.iter().any(|a| a == s) => Ok(s.to_string()),
        (Some(s), _) => MissingSheetSnafu {
            path,
            sheet: s,
            available: available.to_vec(),
        }
        .fail(),
        (None, []) => NoSheetSnafu { path }.fail(),
        (None, [only]) => Ok(only.clone()),
        (None, _) => AmbiguousSheetSnafu {
            path,
            available: available.to_vec(),
        }
        .fail(),
    }
}

/// Converts a worksheet into a table. The first row is the header.
///
/// Rows where every cell is empty are dropped. Header cells that are empty are named
/// `Unnamed: <index>`.
pub fn range_to_table(wrange: &Range<DataType>, sheet: &str) -> AdsResult<Table> {
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptySheetSnafu { sheet })?;
    debug!("range_to_table: sheet: {:?} header: {:?}", sheet, header);
    let mut columns: Vec<String> = Vec::new();
    for (col, cell) in header.iter().enumerate() {
        let name = match read_cell(cell, sheet, 0, col)? {
            Value::Empty => format!("Unnamed: {}", col),
            v => v.to_string(),
        };
        columns.push(name);
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let values: Vec<Value> = row
            .iter()
            .enumerate()
            .map(|(col, cell)| read_cell(cell, sheet, idx + 1, col))
            .collect::<AdsResult<Vec<Value>>>()?;
        if values.iter().all(|v| *v == Value::Empty) {
            debug!("range_to_table: sheet: {:?} skipping empty row {}", sheet, idx + 1);
            continue;
        }
        rows.push(values);
    }
    debug!("range_to_table: sheet: {:?}: {} rows", sheet, rows.len());
    Table::new(columns, rows).context(BuildingTableSnafu { path: sheet })
}

fn read_cell(cell: &DataType, sheet: &str, row: usize, col: usize) -> AdsResult<Value> {
    match cell {
        DataType::Int(i) => Ok(Value::Int(*i)),
        DataType::Float(f) => Ok(Value::Float(*f)),
        DataType::String(s) => Ok(Value::Text(s.clone())),
        DataType::Bool(b) => Ok(Value::Text(b.to_string())),
        DataType::Empty => Ok(Value::Empty),
        _ => ExcelCellSnafu {
            sheet,
            row,
            col,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}
