mod config;
pub mod manual;
pub mod naming;
use log::{debug, info};

pub use crate::config::*;
pub use crate::naming::{rename_file, VersionedName};

// **** Private structures ****

// A factor column with one multiplier per distinct Year, in order of first appearance.
#[derive(PartialEq, Debug, Clone)]
struct FactorColumn {
    name: String,
    entries: Vec<(Value, Option<f64>)>,
}

/// Applies the factors with the default rules and returns the scaled copy of the dataset.
pub fn apply(dataset: &Table, factors: &Table) -> Result<Table, FactorErrors> {
    apply_factors(dataset, factors, &FactorRules::DEFAULT_RULES).map(|r| r.table)
}

/// Multiplies the cells of the dataset by the year-keyed factors.
///
/// Arguments:
/// * `dataset` the table to scale. It must have a `Mapping` column.
/// * `factors` the factor table. It must have a `Year` column and at least one other
/// column, each of which names a dataset column to scale.
/// * `rules` the policy for duplicated years
///
/// For each factor column and each year, the rows of the dataset whose `Mapping`
/// equals the year get the cell of that column multiplied. A factor column that
/// the dataset does not have, or a year that never shows up in `Mapping`, is skipped
/// and recorded as such in the returned statistics. The input tables are not modified.
pub fn apply_factors(
    dataset: &Table,
    factors: &Table,
    rules: &FactorRules,
) -> Result<FactorResult, FactorErrors> {
    let mapping_idx = dataset
        .column_index(MAPPING_COLUMN)
        .ok_or(FactorErrors::MissingMappingColumn)?;
    let factor_columns = read_factor_columns(factors, rules)?;
    info!(
        "apply_factors: {} dataset rows, {} factor columns, rules: {:?}",
        dataset.len(),
        factor_columns.len(),
        rules
    );

    let mut table = dataset.clone();
    let mut stats: Vec<FactorStat> = Vec::new();

    for fc in factor_columns.iter() {
        let target_idx = dataset.column_index(&fc.name);
        for (year, multiplier) in fc.entries.iter() {
            let outcome = match (target_idx, multiplier) {
                (None, _) => FactorOutcome::MissingColumn,
                (Some(_), None) => FactorOutcome::NoMultiplier,
                (Some(col_idx), Some(m)) => {
                    let matching_rows: Vec<usize> = dataset
                        .rows()
                        .iter()
                        .enumerate()
                        .filter(|(_, row)| row[mapping_idx].same_key(year))
                        .map(|(idx, _)| idx)
                        .collect();
                    if matching_rows.is_empty() {
                        FactorOutcome::MissingYear
                    } else {
                        for row_idx in matching_rows.iter() {
                            scale_cell(&mut table, *row_idx, col_idx, &fc.name, *m)?;
                        }
                        FactorOutcome::Applied {
                            rows: matching_rows.len(),
                        }
                    }
                }
            };
            debug!(
                "apply_factors: year {} column {:?} multiplier {:?}: {:?}",
                year, fc.name, multiplier, outcome
            );
            stats.push(FactorStat {
                year: year.clone(),
                column: fc.name.clone(),
                multiplier: *multiplier,
                outcome,
            });
        }
    }

    let res = FactorResult { table, stats };
    info!(
        "apply_factors: {} factors applied, {} skipped",
        res.applied_count(),
        res.skipped_count()
    );
    Ok(res)
}

fn scale_cell(
    table: &mut Table,
    row: usize,
    col: usize,
    column: &str,
    multiplier: f64,
) -> Result<(), FactorErrors> {
    let non_numeric = || FactorErrors::NonNumericCell {
        row,
        column: column.to_string(),
    };
    let cell = table.cell_mut(row, col).ok_or_else(non_numeric)?;
    let scaled = match cell {
        Value::Int(i) => Value::Float(*i as f64 * multiplier),
        Value::Float(f) => Value::Float(*f * multiplier),
        // Nothing to scale.
        Value::Empty => Value::Empty,
        Value::Text(_) => return Err(non_numeric()),
    };
    *cell = scaled;
    Ok(())
}

/// Reads the factor table into one entry per factor column.
///
/// Years are kept in order of first appearance. When a year appears again, its
/// multiplier is replaced (or the table is refused, depending on the rules).
fn read_factor_columns(
    factors: &Table,
    rules: &FactorRules,
) -> Result<Vec<FactorColumn>, FactorErrors> {
    let year_idx = factors
        .column_index(YEAR_COLUMN)
        .ok_or(FactorErrors::MissingYearColumn)?;
    if factors.columns().len() < 2 {
        return Err(FactorErrors::NoFactorColumns);
    }

    let mut res: Vec<FactorColumn> = Vec::new();
    for (col_idx, name) in factors.columns().iter().enumerate() {
        if col_idx == year_idx {
            continue;
        }
        let mut entries: Vec<(Value, Option<f64>)> = Vec::new();
        for row in factors.rows().iter() {
            let year = &row[year_idx];
            let multiplier = match &row[col_idx] {
                Value::Empty => None,
                v => Some(v.as_f64().ok_or_else(|| FactorErrors::NonNumericFactor {
                    year: year.to_string(),
                    column: name.clone(),
                })?),
            };
            if let Some(existing) = entries.iter_mut().find(|(y, _)| y.same_key(year)) {
                if rules.duplicate_year_mode == DuplicateYearMode::Reject {
                    return Err(FactorErrors::DuplicateYear {
                        year: year.to_string(),
                    });
                }
                debug!(
                    "read_factor_columns: year {} repeated in column {:?}, keeping the last value",
                    year, name
                );
                existing.1 = multiplier;
            } else {
                entries.push((year.clone(), multiplier));
            }
        }
        res.push(FactorColumn {
            name: name.clone(),
            entries,
        });
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn revenue_dataset() -> Table {
        table(
            &["Mapping", "Revenue"],
            vec![
                vec![Value::Int(2023), Value::Int(100)],
                vec![Value::Int(2024), Value::Int(200)],
            ],
        )
    }

    #[test]
    fn scales_matching_years() {
        init_logger();
        let factors = table(
            &["Year", "Revenue"],
            vec![
                vec![Value::Int(2023), Value::Float(1.1)],
                vec![Value::Int(2024), Value::Float(0.9)],
            ],
        );
        let out = apply(&revenue_dataset(), &factors).unwrap();
        assert_eq!(out.columns(), &["Mapping".to_string(), "Revenue".to_string()]);
        assert_eq!(out.get(0, "Mapping"), Some(&Value::Int(2023)));
        assert_eq!(out.get(1, "Mapping"), Some(&Value::Int(2024)));
        let r0 = out.get(0, "Revenue").and_then(|v| v.as_f64()).unwrap();
        let r1 = out.get(1, "Revenue").and_then(|v| v.as_f64()).unwrap();
        assert!((r0 - 110.0).abs() < 1e-9);
        assert!((r1 - 180.0).abs() < 1e-9);
        // Exact floating point product, no rounding.
        assert_eq!(out.get(0, "Revenue"), Some(&Value::Float(100.0 * 1.1)));
        assert_eq!(out.get(1, "Revenue"), Some(&Value::Float(200.0 * 0.9)));
    }

    #[test]
    fn year_absent_from_dataset_is_ignored() {
        let factors = table(
            &["Year", "Revenue"],
            vec![vec![Value::Int(2025), Value::Float(3.0)]],
        );
        let res = apply_factors(&revenue_dataset(), &factors, &FactorRules::DEFAULT_RULES)
            .unwrap();
        assert_eq!(res.table, revenue_dataset());
        assert_eq!(res.stats.len(), 1);
        assert_eq!(res.stats[0].outcome, FactorOutcome::MissingYear);
        assert_eq!(res.applied_count(), 0);
    }

    #[test]
    fn factor_column_absent_from_dataset_is_ignored() {
        let factors = table(
            &["Year", "Cost", "Revenue"],
            vec![vec![Value::Int(2024), Value::Float(5.0), Value::Float(2.0)]],
        );
        let res = apply_factors(&revenue_dataset(), &factors, &FactorRules::DEFAULT_RULES)
            .unwrap();
        assert_eq!(res.stats[0].column, "Cost");
        assert_eq!(res.stats[0].outcome, FactorOutcome::MissingColumn);
        assert_eq!(res.stats[1].outcome, FactorOutcome::Applied { rows: 1 });
        assert_eq!(res.table.get(0, "Revenue"), Some(&Value::Int(100)));
        assert_eq!(res.table.get(1, "Revenue"), Some(&Value::Float(400.0)));
    }

    #[test]
    fn unmatched_cells_are_untouched() {
        let dataset = table(
            &["Region", "Mapping", "Revenue", "Units"],
            vec![
                vec![
                    Value::Text("North".to_string()),
                    Value::Int(2023),
                    Value::Int(10),
                    Value::Int(7),
                ],
                vec![
                    Value::Text("South".to_string()),
                    Value::Int(2030),
                    Value::Float(2.5),
                    Value::Empty,
                ],
            ],
        );
        let factors = table(
            &["Year", "Revenue"],
            vec![vec![Value::Int(2023), Value::Float(2.0)]],
        );
        let out = apply(&dataset, &factors).unwrap();
        assert_eq!(out.get(0, "Region"), dataset.get(0, "Region"));
        assert_eq!(out.get(0, "Units"), Some(&Value::Int(7)));
        assert_eq!(out.get(0, "Revenue"), Some(&Value::Float(20.0)));
        assert_eq!(out.rows()[1], dataset.rows()[1]);
    }

    #[test]
    fn input_is_not_mutated() {
        let dataset = revenue_dataset();
        let factors = table(
            &["Year", "Revenue"],
            vec![vec![Value::Int(2023), Value::Float(4.0)]],
        );
        let before = dataset.clone();
        let out = apply(&dataset, &factors).unwrap();
        assert_eq!(dataset, before);
        assert_ne!(out, before);
    }

    #[test]
    fn duplicate_year_last_wins() {
        let factors = table(
            &["Year", "Revenue"],
            vec![
                vec![Value::Int(2023), Value::Float(2.0)],
                vec![Value::Int(2023), Value::Float(3.0)],
            ],
        );
        let res = apply_factors(&revenue_dataset(), &factors, &FactorRules::DEFAULT_RULES)
            .unwrap();
        // Overwrite, not accumulation.
        assert_eq!(res.table.get(0, "Revenue"), Some(&Value::Float(300.0)));
        assert_eq!(res.stats.len(), 1);
        assert_eq!(res.stats[0].multiplier, Some(3.0));
    }

    #[test]
    fn duplicate_year_rejected_when_configured() {
        let factors = table(
            &["Year", "Revenue"],
            vec![
                vec![Value::Int(2023), Value::Float(2.0)],
                vec![Value::Float(2023.0), Value::Float(3.0)],
            ],
        );
        let rules = FactorRules {
            duplicate_year_mode: DuplicateYearMode::Reject,
        };
        let err = apply_factors(&revenue_dataset(), &factors, &rules).unwrap_err();
        assert_eq!(
            err,
            FactorErrors::DuplicateYear {
                year: "2023.0".to_string()
            }
        );
    }

    #[test]
    fn missing_join_columns_are_errors() {
        let no_mapping = table(&["Revenue"], vec![vec![Value::Int(1)]]);
        let factors = table(
            &["Year", "Revenue"],
            vec![vec![Value::Int(2023), Value::Float(2.0)]],
        );
        assert_eq!(
            apply(&no_mapping, &factors),
            Err(FactorErrors::MissingMappingColumn)
        );

        let no_year = table(
            &["Period", "Revenue"],
            vec![vec![Value::Int(2023), Value::Float(2.0)]],
        );
        assert_eq!(
            apply(&revenue_dataset(), &no_year),
            Err(FactorErrors::MissingYearColumn)
        );

        let only_year = table(&["Year"], vec![vec![Value::Int(2023)]]);
        assert_eq!(
            apply(&revenue_dataset(), &only_year),
            Err(FactorErrors::NoFactorColumns)
        );
    }

    #[test]
    fn spreadsheet_years_match_csv_integers() {
        let factors = table(
            &["Year", "Revenue"],
            vec![vec![Value::Float(2024.0), Value::Float(0.5)]],
        );
        let out = apply(&revenue_dataset(), &factors).unwrap();
        assert_eq!(out.get(1, "Revenue"), Some(&Value::Float(100.0)));
    }

    #[test]
    fn category_labels_join_as_text() {
        let dataset = table(
            &["Mapping", "Support"],
            vec![
                vec![Value::Text("Q1".to_string()), Value::Float(4.0)],
                vec![Value::Text("Q2".to_string()), Value::Float(8.0)],
                vec![Value::Text("Q1".to_string()), Value::Float(6.0)],
            ],
        );
        let factors = table(
            &["Year", "Support"],
            vec![vec![Value::Text("Q1".to_string()), Value::Float(0.5)]],
        );
        let res = apply_factors(&dataset, &factors, &FactorRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.stats[0].outcome, FactorOutcome::Applied { rows: 2 });
        assert_eq!(res.table.get(0, "Support"), Some(&Value::Float(2.0)));
        assert_eq!(res.table.get(1, "Support"), Some(&Value::Float(8.0)));
        assert_eq!(res.table.get(2, "Support"), Some(&Value::Float(3.0)));
    }

    #[test]
    fn text_in_matched_cell_is_an_error() {
        let dataset = table(
            &["Mapping", "Revenue"],
            vec![vec![Value::Int(2023), Value::Text("n/a".to_string())]],
        );
        let factors = table(
            &["Year", "Revenue"],
            vec![vec![Value::Int(2023), Value::Float(2.0)]],
        );
        assert_eq!(
            apply(&dataset, &factors),
            Err(FactorErrors::NonNumericCell {
                row: 0,
                column: "Revenue".to_string()
            })
        );
    }

    #[test]
    fn empty_factor_cells_are_skipped() {
        let factors = table(
            &["Year", "Revenue"],
            vec![vec![Value::Int(2023), Value::Empty]],
        );
        let res = apply_factors(&revenue_dataset(), &factors, &FactorRules::DEFAULT_RULES)
            .unwrap();
        assert_eq!(res.stats[0].outcome, FactorOutcome::NoMultiplier);
        assert_eq!(res.table, revenue_dataset());

        let bad = table(
            &["Year", "Revenue"],
            vec![vec![Value::Int(2023), Value::Text("x".to_string())]],
        );
        assert!(matches!(
            apply(&revenue_dataset(), &bad),
            Err(FactorErrors::NonNumericFactor { .. })
        ));
    }

    #[test]
    fn ragged_rows_are_refused() {
        let res = Table::new(
            vec!["Mapping".to_string(), "Revenue".to_string()],
            vec![vec![Value::Int(1)]],
        );
        assert_eq!(
            res,
            Err(FactorErrors::RaggedRow {
                row: 0,
                expected: 2,
                found: 1
            })
        );
    }
}
