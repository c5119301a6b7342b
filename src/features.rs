use crate::config::ColumnNames;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::Observation;

pub fn extract(dataset: &Dataset, columns: &ColumnNames) -> Result<Observation> {
    Ok(Observation {
        total_revenue: column_sum(dataset, &columns.revenue)?,
        total_quantity: column_sum(dataset, &columns.quantity)?,
        row_count: dataset.row_count() as u64,
    })
}

fn column_sum(dataset: &Dataset, name: &str) -> Result<f64> {
    Ok(dataset
        .numeric_column(name)?
        .map(|values| values.iter().sum::<f64>())
        .unwrap_or(0.0))
}
