//! Filesystem-backed CSV reader for training data.

use std::fs;
use std::path::Path;

use crate::common::error::{ChurnError, ChurnResult};
use crate::common::{ids, time};

use super::domain::{DatasetInfo, Table, Value};

/// Read a headered CSV file into a table, typing every cell with
/// [`Value::infer`]. The raw bytes are fingerprinted for lineage.
pub fn read_csv(path: &Path) -> ChurnResult<(Table, DatasetInfo)> {
    let bytes = fs::read(path).map_err(|source| ChurnError::io(path, source))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes.as_slice());

    let columns = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(Value::infer).collect())?;
    }

    let info = DatasetInfo {
        path: path.display().to_string(),
        rows: table.n_rows(),
        fingerprint: ids::fingerprint(&bytes),
        created_ms: time::now_ms(),
    };
    Ok((table, info))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_header_and_typed_cells() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "customerID,tenure,TotalCharges").unwrap();
        writeln!(file, "7590-VHVEG,1,29.85").unwrap();
        writeln!(file, "5575-GNVDE,34, ").unwrap();
        file.flush().unwrap();

        let (table, info) = read_csv(file.path()).unwrap();
        assert_eq!(table.columns(), ["customerID", "tenure", "TotalCharges"]);
        assert_eq!(table.rows()[0][1], Value::Number(1.0));
        assert_eq!(table.rows()[1][2], Value::Text(" ".into()));
        assert_eq!(info.rows, 2);
        assert_eq!(info.fingerprint.len(), 64);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(&err, ChurnError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound));
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a,b").unwrap();
        writeln!(file, "1,2,3").unwrap();
        file.flush().unwrap();
        assert!(matches!(read_csv(file.path()), Err(ChurnError::Csv(_))));
    }
}
