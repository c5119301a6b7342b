use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{CopilotError, Result};
use crate::models::{HistoryTable, LabeledObservation};

pub const COLUMNS: [&str; 4] = ["total_revenue", "total_quantity", "row_count", "is_risky"];

/// Labeled observations persisted as a four-column CSV file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole table. A missing file is an empty history.
    pub fn load(&self) -> Result<HistoryTable> {
        if !self.path.try_exists()? {
            debug!("no history at {}, starting empty", self.path.display());
            return Ok(HistoryTable::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|err| self.corrupt(err))?;
        let headers = reader.headers().map_err(|err| self.corrupt(err))?.clone();
        if headers.iter().map(str::trim).ne(COLUMNS) {
            return Err(CopilotError::HistoryCorrupt {
                path: self.path.clone(),
                reason: format!("unexpected header `{}`", headers.iter().collect::<Vec<_>>().join(",")),
            });
        }

        let mut table = HistoryTable::new();
        for result in reader.deserialize::<LabeledObservation>() {
            table.push(result.map_err(|err| self.corrupt(err))?);
        }

        debug!("loaded {} history rows from {}", table.len(), self.path.display());
        Ok(table)
    }

    /// Returns `table` with `row` appended and rewrites the backing file to match.
    ///
    /// The file is written to a temporary sibling and renamed into place, so on
    /// error the previous contents are untouched. There is no lock: two callers
    /// that load and then append concurrently race, and the last rename wins.
    pub fn append(&self, table: &HistoryTable, row: LabeledObservation) -> Result<HistoryTable> {
        let mut updated = table.clone();
        updated.push(row);
        self.write_all(&updated)?;
        debug!("history now holds {} rows", updated.len());
        Ok(updated)
    }

    fn write_all(&self, table: &HistoryTable) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(staged.as_file_mut());
            writer.write_record(COLUMNS).map_err(std::io::Error::from)?;
            for row in table {
                writer.serialize(row).map_err(std::io::Error::from)?;
            }
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn corrupt(&self, err: csv::Error) -> CopilotError {
        CopilotError::HistoryCorrupt {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;

    fn sample_row(is_risky: bool) -> LabeledObservation {
        Observation {
            total_revenue: 300.0,
            total_quantity: 15.0,
            row_count: 2,
        }
        .labeled(is_risky)
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn append_then_load_round_trips_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));

        let table = store.load().unwrap();
        let updated = store.append(&table, sample_row(true)).unwrap();
        let reloaded = store.load().unwrap();

        assert_eq!(updated, vec![sample_row(true)]);
        assert_eq!(reloaded, updated);
    }

    #[test]
    fn file_uses_fixed_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let store = HistoryStore::new(&path);

        store.append(&HistoryTable::new(), sample_row(true)).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert_eq!(lines.next(), Some("total_revenue,total_quantity,row_count,is_risky"));
        assert_eq!(lines.next(), Some("300.0,15.0,2,1"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn duplicate_appends_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));

        let once = store.append(&store.load().unwrap(), sample_row(false)).unwrap();
        let twice = store.append(&once, sample_row(false)).unwrap();

        assert_eq!(twice.len(), 2);
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn append_does_not_mutate_the_input_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));

        let table = HistoryTable::new();
        let updated = store.append(&table, sample_row(true)).unwrap();
        assert!(table.is_empty());
        assert_eq!(updated.len(), 1);
    }

    #[test]
    fn unreadable_location_is_an_error_not_an_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("plain.csv");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = HistoryStore::new(blocker.join("history.csv")).load();
        assert!(matches!(result, Err(CopilotError::Io(_))));
    }

    #[test]
    fn failed_append_leaves_previous_file_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let store = HistoryStore::new(&path);
        let original = store.append(&HistoryTable::new(), sample_row(true)).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // The parent of this path is a regular file, so staging fails.
        let misplaced = HistoryStore::new(path.join("nested.csv"));
        assert!(misplaced.append(&original, sample_row(false)).is_err());

        // A directory in the way makes the final rename fail after staging.
        let blocked_path = dir.path().join("blocked");
        std::fs::create_dir(&blocked_path).unwrap();
        std::fs::write(blocked_path.join("keep"), "x").unwrap();
        let blocked = HistoryStore::new(&blocked_path);
        assert!(blocked.append(&original, sample_row(false)).is_err());

        assert_eq!(store.load().unwrap(), original);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        let mut entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["blocked".to_string(), "history.csv".to_string()]);
    }

    #[test]
    fn wrong_header_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "revenue,qty,rows,label\n1,2,3,0\n").unwrap();

        let result = HistoryStore::new(&path).load();
        assert!(matches!(result, Err(CopilotError::HistoryCorrupt { .. })));
    }

    #[test]
    fn bad_label_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "total_revenue,total_quantity,row_count,is_risky\n1,2,3,7\n").unwrap();

        let result = HistoryStore::new(&path).load();
        assert!(matches!(result, Err(CopilotError::HistoryCorrupt { .. })));
    }

    #[test]
    fn reads_files_written_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(
            &path,
            "total_revenue,total_quantity,row_count,is_risky\n1200,40,12,0\n80,3,1,1\n",
        )
        .unwrap();

        let table = HistoryStore::new(&path).load().unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table[0].is_risky);
        assert_eq!(table[1].total_revenue, 80.0);
    }
}
