use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use backend_domain::DatasetRecord;

/// Reads a training dataset. Rows that fail to parse are skipped with a
/// warning; an unreadable file or header is an error.
pub fn read_dataset(path: &Path) -> Result<Vec<DatasetRecord>> {
    let file = File::open(path).with_context(|| format!("open dataset {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in reader.deserialize::<DatasetRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                warn!(row = index + 2, error = %err, "skipping malformed dataset row");
            }
        }
    }
    info!(path = %path.display(), rows = records.len(), skipped, "dataset loaded");
    Ok(records)
}

pub fn write_dataset(path: &Path, records: &[DatasetRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create dataset {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(is_fraud: bool) -> DatasetRecord {
        DatasetRecord {
            merchant: "OK Zimbabwe".to_string(),
            category: "Groceries".to_string(),
            amt: 42.75,
            gender: "M".to_string(),
            city: "Gweru".to_string(),
            province: "Midlands".to_string(),
            latitude: -19.45,
            longitude: 29.816667,
            city_pop: 158_000,
            job: "Teacher".to_string(),
            unix_time: 1_709_989_200,
            merch_latitude: -19.46,
            merch_longitude: 29.82,
            processed_at: "2024-03-09T15:00:00".to_string(),
            is_fraud,
        }
    }

    #[test]
    fn writes_header_and_python_booleans() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("transactions.csv");
        write_dataset(&path, &[record(true), record(false)]).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "merchant,category,amt,gender,city,province,latitude,longitude,city_pop,job,\
                 unix_time,merch_latitude,merch_longitude,processed_at,is_fraud"
            )
        );
        assert!(lines.next().expect("row").ends_with(",True"));
        assert!(lines.next().expect("row").ends_with(",False"));

        let records = read_dataset(&path).expect("read back");
        assert_eq!(records, vec![record(true), record(false)]);
    }

    #[test]
    fn skips_malformed_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("transactions.csv");
        std::fs::write(
            &path,
            "merchant,category,amt,gender,city,province,latitude,longitude,city_pop,job,unix_time,merch_latitude,merch_longitude,processed_at,is_fraud\n\
             Econet,Airtime,5.0,F,Harare,Harare,-17.8,31.0,1500000,Nurse,1709989200,-17.8,31.0,2024-03-09 15:00:00,1\n\
             Econet,Airtime,not-a-number,F,Harare,Harare,-17.8,31.0,1500000,Nurse,1709989200,-17.8,31.0,2024-03-09 15:00:00,0\n",
        )
        .expect("write");
        let records = read_dataset(&path).expect("read");
        assert_eq!(records.len(), 1);
        assert!(records[0].is_fraud);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_dataset(Path::new("/nonexistent/transactions.csv")).is_err());
    }
}
