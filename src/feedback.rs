use log::info;

use crate::error::Result;
use crate::history::HistoryStore;
use crate::models::{HistoryTable, Observation};

/// Records a human judgment for `observation`. The grown table is only seen by
/// later analyses.
pub fn submit(
    store: &HistoryStore,
    table: &HistoryTable,
    observation: Observation,
    is_risky: bool,
) -> Result<HistoryTable> {
    let updated = store.append(table, observation.labeled(is_risky))?;
    info!(
        "recorded label {} for {:?} ({} rows in history)",
        if is_risky { "risky" } else { "not risky" },
        observation,
        updated.len()
    );
    Ok(updated)
}

/// Accepts the French answers shown in the prompt ("Oui"/"Non") and the usual
/// English and numeric spellings.
pub fn parse_label(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "oui" | "yes" | "y" | "true" | "1" => Ok(true),
        "non" | "no" | "n" | "false" | "0" => Ok(false),
        other => Err(format!("`{other}` is not a label, expected oui or non")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_french_and_english_labels() {
        assert_eq!(parse_label("Oui"), Ok(true));
        assert_eq!(parse_label(" NON "), Ok(false));
        assert_eq!(parse_label("yes"), Ok(true));
        assert_eq!(parse_label("0"), Ok(false));
        assert!(parse_label("peut-être").is_err());
    }

    #[test]
    fn submit_appends_labeled_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let observation = Observation {
            total_revenue: 42.0,
            total_quantity: 2.0,
            row_count: 1,
        };

        let table = submit(&store, &HistoryTable::new(), observation, false).unwrap();

        assert_eq!(table, vec![observation.labeled(false)]);
        assert_eq!(store.load().unwrap(), table);
    }
}
