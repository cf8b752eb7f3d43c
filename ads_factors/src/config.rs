// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The name of the join column in the dataset table.
pub const MAPPING_COLUMN: &str = "Mapping";
/// The name of the join column in the factor table.
pub const YEAR_COLUMN: &str = "Year";

/// The content of a single cell.
///
/// Readers decide the variant when the table is loaded, so that the transform
/// never has to guess whether a column is numeric.
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    /// A missing cell (empty CSV field, empty spreadsheet cell).
    Empty,
}

impl Value {
    /// Infers the type of a raw text cell: integers first, then floats, then text.
    pub fn parse(raw: &str) -> Value {
        if raw.is_empty() {
            Value::Empty
        } else if let Ok(i) = raw.parse::<i64>() {
            Value::Int(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            Value::Float(f)
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Equality used for the Mapping/Year join.
    ///
    /// Numbers compare by value regardless of their representation, texts compare
    /// exactly, and an empty cell never matches anything.
    pub fn same_key(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Empty, _) | (_, Value::Empty) => false,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // The debug form always keeps a decimal part and round-trips exactly.
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Empty => Ok(()),
        }
    }
}

/// A table with a fixed, ordered header.
///
/// Every row has exactly one value per column.
#[derive(PartialEq, Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Table, FactorErrors> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(FactorErrors::RaggedRow {
                    row: idx,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Table { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The value at the given row for the named column, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Value> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ********* Configuration **********

/// What to do when the factor table holds the same Year more than once.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DuplicateYearMode {
    /// The last row with a given Year provides the multiplier.
    LastWins,
    /// The factor table is refused.
    Reject,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FactorRules {
    pub duplicate_year_mode: DuplicateYearMode,
}

impl FactorRules {
    pub const DEFAULT_RULES: FactorRules = FactorRules {
        duplicate_year_mode: DuplicateYearMode::LastWins,
    };
}

impl Default for FactorRules {
    fn default() -> Self {
        FactorRules::DEFAULT_RULES
    }
}

// ******** Output data structures *********

/// How a single (Year, factor column) pair was handled.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FactorOutcome {
    /// The multiplier was applied to this many rows.
    Applied { rows: usize },
    /// The factor column does not exist in the dataset.
    MissingColumn,
    /// The Year does not appear in the Mapping column.
    MissingYear,
    /// The factor cell was empty.
    NoMultiplier,
}

impl FactorOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FactorOutcome::Applied { .. })
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct FactorStat {
    pub year: Value,
    pub column: String,
    pub multiplier: Option<f64>,
    pub outcome: FactorOutcome,
}

#[derive(PartialEq, Debug, Clone)]
pub struct FactorResult {
    pub table: Table,
    pub stats: Vec<FactorStat>,
}

impl FactorResult {
    pub fn applied_count(&self) -> usize {
        self.stats.iter().filter(|s| s.outcome.is_applied()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.stats.len() - self.applied_count()
    }
}

/// Errors that prevent the factors from being applied.
#[derive(PartialEq, Debug, Clone)]
pub enum FactorErrors {
    MissingMappingColumn,
    MissingYearColumn,
    NoFactorColumns,
    DuplicateYear { year: String },
    NonNumericFactor { year: String, column: String },
    NonNumericCell { row: usize, column: String },
    RaggedRow { row: usize, expected: usize, found: usize },
}

impl Error for FactorErrors {}

impl Display for FactorErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactorErrors::MissingMappingColumn => {
                write!(f, "the dataset has no '{}' column", MAPPING_COLUMN)
            }
            FactorErrors::MissingYearColumn => {
                write!(f, "the factor table has no '{}' column", YEAR_COLUMN)
            }
            FactorErrors::NoFactorColumns => {
                write!(f, "the factor table has no factor column besides '{}'", YEAR_COLUMN)
            }
            FactorErrors::DuplicateYear { year } => {
                write!(f, "the factor table lists year {} more than once", year)
            }
            FactorErrors::NonNumericFactor { year, column } => write!(
                f,
                "the factor for year {} in column '{}' is not a number",
                year, column
            ),
            FactorErrors::NonNumericCell { row, column } => write!(
                f,
                "row {} of column '{}' is not a number and cannot be multiplied",
                row, column
            ),
            FactorErrors::RaggedRow { row, expected, found } => write!(
                f,
                "row {} has {} values, expected {}",
                row, found, expected
            ),
        }
    }
}
