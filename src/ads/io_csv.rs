// Primitives for reading and writing CSV files.

use std::io::Read;

use crate::ads::*;

/// Reads an ADS file. The first row is the header.
pub fn read_dataset(path: &str) -> AdsResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;
    read_records(rdr, path)
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>, path: &str) -> AdsResult<Table> {
    let columns: Vec<String> = rdr
        .headers()
        .context(ParsingCsvSnafu { path })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_dataset: {:?} header: {:?}", path, columns);

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for line_r in rdr.records() {
        let line = line_r.context(ParsingCsvSnafu { path })?;
        rows.push(line.iter().map(Value::parse).collect());
    }
    debug!("read_dataset: {:?}: {} rows", path, rows.len());
    Table::new(columns, rows).context(BuildingTableSnafu { path })
}

/// Serializes a table, header first. Numbers are written so that they read back exactly.
pub fn write_table(table: &Table, file_name: &str) -> AdsResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(table.columns())
        .context(WritingCsvSnafu { file_name })?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .context(WritingCsvSnafu { file_name })?;
    }
    wtr.into_inner()
        .map_err(|e| e.into_error())
        .context(FlushingCsvSnafu { file_name })
}
