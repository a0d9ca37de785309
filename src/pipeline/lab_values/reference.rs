use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::models::{ComparisonResult, ExtractedValue, ReferenceRow, TestStatus};

/// Copy of `resources/reference_data.csv` compiled into the binary.
const BUNDLED_CSV: &str = include_str!("../../../resources/reference_data.csv");

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Reference table not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read reference table {origin}: {source}")]
    CsvRead {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("Reference table {origin} has no rows")]
    Empty { origin: String },
}

/// Normal ranges keyed by test name. Loaded once at start-up, read-only after.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
    index: HashMap<String, usize>,
}

impl ReferenceTable {
    /// Load the table from a CSV file with the
    /// `Test_Name,Min_Value,Max_Value,Unit,Description` header.
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        if !path.exists() {
            return Err(ReferenceError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path).map_err(|e| ReferenceError::CsvRead {
            origin: path.display().to_string(),
            source: csv::Error::from(e),
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self, ReferenceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        let mut index = HashMap::new();
        for record in reader.deserialize::<ReferenceRow>() {
            let row = record.map_err(|e| ReferenceError::CsvRead {
                origin: origin.to_string(),
                source: e,
            })?;
            if row.test_name.is_empty() {
                continue;
            }
            // First row wins on duplicate names.
            index.entry(row.test_name.clone()).or_insert(rows.len());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ReferenceError::Empty {
                origin: origin.to_string(),
            });
        }
        tracing::info!(origin, rows = rows.len(), "Reference table loaded");
        Ok(Self { rows, index })
    }

    /// The table shipped with the binary.
    pub fn bundled() -> Result<Self, ReferenceError> {
        Self::from_reader(BUNDLED_CSV.as_bytes(), "bundled")
    }

    /// Prefer the file on disk, fall back to the bundled copy.
    pub fn load_or_bundled(path: &Path) -> Result<Self, ReferenceError> {
        match Self::load(path) {
            Ok(table) => Ok(table),
            Err(e) => {
                tracing::warn!(error = %e, "Using bundled reference table");
                Self::bundled()
            }
        }
    }

    pub fn get(&self, test_name: &str) -> Option<&ReferenceRow> {
        self.index.get(test_name).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Join extracted values against the table. Values with no row are dropped.
    pub fn compare(&self, values: &[ExtractedValue]) -> Vec<ComparisonResult> {
        values
            .iter()
            .filter_map(|v| {
                let row = self.get(&v.test)?;
                let status = classify(v.value, row);
                Some(ComparisonResult {
                    test: v.test.clone(),
                    value: v.value,
                    min: row.min,
                    max: row.max,
                    unit: row.unit.clone(),
                    status,
                    color: status.color().to_string(),
                    description: row.description.clone(),
                })
            })
            .collect()
    }
}

/// Strict comparison, no tolerance band.
pub fn classify(value: f64, row: &ReferenceRow) -> TestStatus {
    if value < row.min {
        TestStatus::Low
    } else if value > row.max {
        TestStatus::High
    } else {
        TestStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReferenceTable {
        ReferenceTable::bundled().unwrap()
    }

    fn value(test: &str, value: f64) -> ExtractedValue {
        ExtractedValue {
            test: test.into(),
            value,
        }
    }

    #[test]
    fn hemoglobin_classification() {
        let results = table().compare(&[
            value("Hemoglobin", 10.0),
            value("Hemoglobin", 14.0),
            value("Hemoglobin", 18.0),
        ]);
        let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![TestStatus::Low, TestStatus::Normal, TestStatus::High]
        );
        assert_eq!(results[0].color, "#3498db");
        assert_eq!(results[0].unit, "g/dL");
    }

    #[test]
    fn boundaries_are_normal() {
        let table = table();
        let row = table.get("Hemoglobin").unwrap();
        assert_eq!(classify(12.0, row), TestStatus::Normal);
        assert_eq!(classify(16.0, row), TestStatus::Normal);
    }

    #[test]
    fn unknown_tests_are_dropped() {
        let results = table().compare(&[value("Lipase", 40.0), value("Glucose", 90.0)]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].test, "Glucose");
    }

    #[test]
    fn classification_is_idempotent() {
        let table = table();
        let first = table.compare(&[value("Potassium", 6.2), value("Urine_Protein", 0.0)]);
        let again: Vec<_> = first
            .iter()
            .map(|r| value(&r.test, r.value))
            .collect();
        assert_eq!(table.compare(&again), first);
    }

    #[test]
    fn load_from_file_and_first_row_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.csv");
        std::fs::write(
            &path,
            "Test_Name,Min_Value,Max_Value,Unit,Description\n\
             Hemoglobin, 13, 17 ,g/dL,\"Oxygen, carried\"\n\
             Hemoglobin,1,2,g/dL,duplicate\n",
        )
        .unwrap();
        let table = ReferenceTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        let row = table.get("Hemoglobin").unwrap();
        assert_eq!(row.min, 13.0);
        assert_eq!(row.description, "Oxygen, carried");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ReferenceTable::load(Path::new("/nonexistent/ref.csv")).unwrap_err();
        assert!(matches!(err, ReferenceError::FileNotFound { .. }));
        let fallback = ReferenceTable::load_or_bundled(Path::new("/nonexistent/ref.csv"));
        assert!(fallback.is_ok());
    }

    #[test]
    fn bad_number_is_a_csv_error() {
        let csv = "Test_Name,Min_Value,Max_Value,Unit,Description\nGlucose,low,100,mg/dL,x\n";
        let err = ReferenceTable::from_reader(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, ReferenceError::CsvRead { .. }));
    }

    #[test]
    fn header_only_is_empty_error() {
        let csv = "Test_Name,Min_Value,Max_Value,Unit,Description\n";
        let err = ReferenceTable::from_reader(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, ReferenceError::Empty { .. }));
    }
}
