use clap::Parser;

/// Multiplies ADS files by the factors of an Excel sheet and packages the versioned results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the batch: factor file, ADS files and
    /// their sheets. The other options override what it contains.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, repeatable) An ADS file in CSV format. It must have a 'Mapping' column.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (file path) The Excel workbook (.xlsx) containing the factor sheets.
    #[clap(short, long, value_parser)]
    pub factors: Option<String>,

    /// (sheet name, repeatable) The sheet of the factor workbook to use. Given once, it applies
    /// to all the inputs. Given once per input, each sheet goes with the input at the same
    /// position. If not provided, the workbook must contain a single sheet.
    #[clap(short, long, value_parser)]
    pub sheet: Vec<String>,

    /// (file or directory path) Where to write the zip archive. If a directory is given, the
    /// archive is named ADS_Multiplied_Output_<MM-DD-YYYY>.zip inside it.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// Prints the names of the sheets in the factor workbook and exits.
    #[clap(long, takes_value = false)]
    pub list_sheets: bool,

    /// Refuses factor sheets that list the same year more than once, instead of using the
    /// last row.
    #[clap(long, takes_value = false)]
    pub reject_duplicate_years: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
