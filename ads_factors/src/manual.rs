/*!

This is the long-form manual for `ads_factors` and `adsmult`.

## Input formats

### ADS files

Comma separated values with a header row. One of the columns must be named `Mapping`:
its values are compared with the `Year` column of the factor sheet. All the other
columns are copied as is, unless a factor sheet names them.

Cells are typed when read: empty cells stay empty, integers and decimal numbers become
numbers, anything else is kept as text.

### Factor workbook

An Excel workbook (`.xlsx`) with one or more sheets. Each sheet has a `Year` column and
one column per factor, named after the ADS column it multiplies:

| Year | Revenue | Support |
|------|---------|---------|
| 2023 | 1.1     | 0.95    |
| 2024 | 0.9     |         |

`Year` does not need to be a calendar year, any label works as long as it is written
the same way in the `Mapping` column of the ADS file. An empty factor cell leaves the
column alone for that year.

If a year is listed twice, the last row is the one used. Pass
`--reject-duplicate-years` to refuse such sheets instead.

## Output

A zip archive named `ADS_Multiplied_Output_<MM-DD-YYYY>.zip`. Each processed ADS file is
renamed with a version suffix (`report.csv` becomes `report_V1.csv`, `report_V3.csv`
becomes `report_V4.csv`) and stored in a directory named after its version (`V1/`, `V4/`).

## Command line

```bash
adsmult -f factors.xlsx -i ads_north.csv -i ads_south.csv --sheet PMF -o out/
```

* `--sheet` given once applies to every input. Given once per input, the n-th sheet goes
  with the n-th input. If it is omitted, the workbook must contain a single sheet.
* `--list-sheets` prints the sheets of the workbook and exits.
* `--config` reads the same options from a JSON file:

```json
{
  "factorFile": "factors.xlsx",
  "datasets": [
    { "filePath": "ads_north.csv", "sheetName": "PMF" },
    { "filePath": "ads_south.csv", "sheetName": "Support" }
  ],
  "outputPath": "out/",
  "rejectDuplicateYears": false
}
```

Paths in the configuration file are relative to the file itself.

*/
