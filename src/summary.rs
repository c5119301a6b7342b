//! Descriptive statistics for the uploaded dataset, rendered as text for the
//! prompt and the report.

use std::collections::HashMap;
use std::fmt::Write;

use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};

use crate::dataset::Dataset;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric {
        name: String,
        count: usize,
        mean: f64,
        std: f64,
        min: f64,
        q25: f64,
        median: f64,
        q75: f64,
        max: f64,
    },
    Categorical {
        name: String,
        count: usize,
        unique: usize,
        top: String,
        freq: usize,
    },
}

pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .headers()
        .iter()
        .filter_map(|name| {
            let cells: Vec<&str> = dataset
                .column(name)?
                .into_iter()
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect();
            Some(summarize_column(name, &cells))
        })
        .collect()
}

fn summarize_column(name: &str, cells: &[&str]) -> ColumnSummary {
    let parsed: Option<Vec<f64>> = cells.iter().map(|cell| cell.parse::<f64>().ok()).collect();

    match parsed {
        Some(values) if !values.is_empty() => {
            let count = values.len();
            let mut data = Data::new(values);
            ColumnSummary::Numeric {
                name: name.to_string(),
                count,
                mean: data.mean().unwrap_or(f64::NAN),
                std: data.std_dev().unwrap_or(f64::NAN),
                min: data.min(),
                q25: data.quantile(0.25),
                median: data.quantile(0.5),
                q75: data.quantile(0.75),
                max: data.max(),
            }
        }
        _ => {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for cell in cells {
                *counts.entry(*cell).or_insert(0) += 1;
            }
            // Ties resolve to the value seen first.
            let (top, freq) = cells.iter().fold(("", 0usize), |best, cell| {
                let count = counts[cell];
                if count > best.1 {
                    (*cell, count)
                } else {
                    best
                }
            });

            ColumnSummary::Categorical {
                name: name.to_string(),
                count: cells.len(),
                unique: counts.len(),
                top: top.to_string(),
                freq,
            }
        }
    }
}

pub fn render(summaries: &[ColumnSummary]) -> String {
    let mut output = String::new();

    if summaries.is_empty() {
        let _ = writeln!(output, "(no columns)");
        return output;
    }

    for summary in summaries {
        match summary {
            ColumnSummary::Numeric {
                name,
                count,
                mean,
                std,
                min,
                q25,
                median,
                q75,
                max,
            } => {
                let _ = writeln!(
                    output,
                    "{name}: count {count}, mean {mean:.2}, std {std:.2}, min {min:.2}, \
                     25% {q25:.2}, 50% {median:.2}, 75% {q75:.2}, max {max:.2}"
                );
            }
            ColumnSummary::Categorical {
                name,
                count,
                unique,
                top,
                freq,
            } => {
                let _ = writeln!(
                    output,
                    "{name}: count {count}, unique {unique}, top {top}, freq {freq}"
                );
            }
        }
    }

    output
}
