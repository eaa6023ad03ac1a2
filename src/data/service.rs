//! Service layer responsible for ingesting, cleaning and splitting tables.

use std::path::Path;
use std::time::Instant;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::common::error::{ChurnError, ChurnResult};
use crate::common::time;

use super::domain::{DatasetInfo, Split, Table, Value};
use super::repo_fs;

/// Read a CSV file and coerce `lenient_column` to numbers.
pub fn read_data(path: &Path, lenient_column: &str) -> ChurnResult<(Table, DatasetInfo)> {
    let start = Instant::now();
    let (table, info) = repo_fs::read_csv(path)?;
    let table = coerce_numeric(&table, lenient_column)?;
    tracing::info!(
        ev = "data.read",
        path = %info.path,
        rows = info.rows,
        fingerprint = %info.fingerprint,
        dur_ms = time::elapsed_ms(start),
    );
    Ok((table, info))
}

/// Parse `column` leniently: cells that are not numbers (or are NaN) become 0.
pub fn coerce_numeric(table: &Table, column: &str) -> ChurnResult<Table> {
    table.map_column(column, |value| match value.as_f64(column) {
        Ok(n) if !n.is_nan() => Value::Number(n),
        _ => Value::Number(0.0),
    })
}

/// Drop the identifier column.
pub fn preprocess(table: &Table, id_column: &str) -> ChurnResult<Table> {
    table.without_column(id_column)
}

/// Map a churn flag onto class 0/1.
pub fn parse_label(value: &Value) -> ChurnResult<usize> {
    let key = value.category_key();
    match key.trim().to_ascii_lowercase().as_str() {
        "yes" | "1" | "true" => Ok(1),
        "no" | "0" | "false" => Ok(0),
        _ => Err(ChurnError::InvalidLabel(key)),
    }
}

/// Shuffle rows with a seeded RNG and cut off `ceil(n * test_size)` test rows.
pub fn split_data(table: &Table, target: &str, test_size: f64, seed: u64) -> ChurnResult<Split> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ChurnError::InvalidSplit(format!(
            "test_size {test_size} must lie strictly between 0 and 1"
        )));
    }

    let labels = table
        .column(target)?
        .into_iter()
        .map(parse_label)
        .collect::<ChurnResult<Vec<_>>>()?;
    let features = table.without_column(target)?;

    let n = table.n_rows();
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ChurnError::InvalidSplit(format!(
            "{n} rows cannot fill both partitions at test_size {test_size}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let (test_rows, train_rows) = indices.split_at(n_test);

    let pick = |rows: &[usize]| rows.iter().map(|&i| labels[i]).collect::<Array1<usize>>();

    Ok(Split {
        x_train: features.select_rows(train_rows),
        x_test: features.select_rows(test_rows),
        y_train: pick(train_rows),
        y_test: pick(test_rows),
        train_rows: train_rows.to_vec(),
        test_rows: test_rows.to_vec(),
    })
}

/// Turn one request body into a single-row table, keeping field order.
/// Fields outside `declared` are dropped unread.
pub fn record_to_table(body: &serde_json::Value, declared: &[&str]) -> ChurnResult<Table> {
    let record = body
        .as_object()
        .ok_or_else(|| ChurnError::InvalidRequest("body must be a JSON object".into()))?;

    let mut columns = Vec::with_capacity(record.len());
    let mut row = Vec::with_capacity(record.len());
    for (key, value) in record.iter().filter(|(key, _)| declared.contains(&key.as_str())) {
        columns.push(key.clone());
        row.push(Value::from_json(key, value)?);
    }

    let mut table = Table::new(columns);
    table.push_row(row)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn charges_table() -> Table {
        Table::from_rows(
            vec!["customerID".into(), "TotalCharges".into(), "Churn".into()],
            vec![
                vec![Value::infer("a"), Value::infer("29.85"), Value::infer("No")],
                vec![Value::infer("b"), Value::infer(" "), Value::infer("Yes")],
                vec![Value::infer("c"), Value::infer("n/a"), Value::infer("No")],
                vec![Value::infer("d"), Value::infer("1889.5"), Value::infer("Yes")],
                vec![Value::infer("e"), Value::infer("NaN"), Value::infer("No")],
            ],
        )
        .unwrap()
    }

    fn labelled(n: usize) -> Table {
        let rows = (0..n)
            .map(|i| {
                vec![
                    Value::Number(i as f64),
                    Value::Text(if i % 3 == 0 { "Yes" } else { "No" }.into()),
                ]
            })
            .collect();
        Table::from_rows(vec!["tenure".into(), "Churn".into()], rows).unwrap()
    }

    #[test]
    fn non_numeric_charges_become_zero() {
        let cleaned = coerce_numeric(&charges_table(), "TotalCharges").unwrap();
        let values: Vec<_> = cleaned.column("TotalCharges").unwrap().into_iter().cloned().collect();
        assert_eq!(
            values,
            vec![
                Value::Number(29.85),
                Value::Number(0.0),
                Value::Number(0.0),
                Value::Number(1889.5),
                Value::Number(0.0),
            ]
        );
    }

    #[test]
    fn missing_lenient_column_is_an_error() {
        let table = charges_table().without_column("TotalCharges").unwrap();
        assert!(matches!(
            coerce_numeric(&table, "TotalCharges"),
            Err(ChurnError::MissingColumn(_))
        ));
    }

    #[test]
    fn preprocess_drops_identifier_only() {
        let table = charges_table();
        let out = preprocess(&table, "customerID").unwrap();
        assert_eq!(out.columns(), ["TotalCharges", "Churn"]);
        assert_eq!(out.n_rows(), 5);
        assert!(preprocess(&out, "customerID").is_err());
    }

    #[test]
    fn split_is_75_25_and_disjoint() {
        let split = split_data(&labelled(100), "Churn", 0.25, 42).unwrap();
        assert_eq!(split.test_rows.len(), 25);
        assert_eq!(split.train_rows.len(), 75);
        assert_eq!(split.x_train.columns(), ["tenure"]);

        let mut all: Vec<_> = split.train_rows.iter().chain(&split.test_rows).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());

        for (pos, &row) in split.test_rows.iter().enumerate() {
            let expected = usize::from(row % 3 == 0);
            assert_eq!(split.y_test[pos], expected);
            assert_eq!(split.x_test.rows()[pos][0], Value::Number(row as f64));
        }
    }

    #[test]
    fn split_rounds_test_share_up() {
        let split = split_data(&labelled(10), "Churn", 0.25, 42).unwrap();
        assert_eq!(split.test_rows.len(), 3);
        assert_eq!(split.train_rows.len(), 7);
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let table = labelled(60);
        let a = split_data(&table, "Churn", 0.25, 42).unwrap();
        let b = split_data(&table, "Churn", 0.25, 42).unwrap();
        assert_eq!(a.train_rows, b.train_rows);
        assert_eq!(a.test_rows, b.test_rows);
        assert_eq!(a.x_train, b.x_train);

        let c = split_data(&table, "Churn", 0.25, 7).unwrap();
        assert_ne!(a.test_rows, c.test_rows);
    }

    #[test]
    fn split_rejects_bad_inputs() {
        assert!(matches!(
            split_data(&labelled(10), "Churn", 1.0, 42),
            Err(ChurnError::InvalidSplit(_))
        ));
        assert!(matches!(
            split_data(&labelled(1), "Churn", 0.25, 42),
            Err(ChurnError::InvalidSplit(_))
        ));
        assert!(matches!(
            split_data(&labelled(10), "Exited", 0.25, 42),
            Err(ChurnError::MissingColumn(_))
        ));
        let bad = Table::from_rows(
            vec!["Churn".into()],
            vec![vec![Value::infer("Maybe")], vec![Value::infer("No")]],
        )
        .unwrap();
        assert!(matches!(
            split_data(&bad, "Churn", 0.5, 42),
            Err(ChurnError::InvalidLabel(l)) if l == "Maybe"
        ));
    }

    #[test]
    fn labels_accept_common_spellings() {
        assert_eq!(parse_label(&Value::infer("Yes")).unwrap(), 1);
        assert_eq!(parse_label(&Value::infer("no")).unwrap(), 0);
        assert_eq!(parse_label(&Value::Number(1.0)).unwrap(), 1);
    }

    #[test]
    fn record_keeps_field_order() {
        let body = json!({"tenure": 41, "gender": "Female", "MonthlyCharges": 79.85});
        let declared = ["gender", "MonthlyCharges", "tenure"];
        let table = record_to_table(&body, &declared).unwrap();
        assert_eq!(table.columns(), ["tenure", "gender", "MonthlyCharges"]);
        assert_eq!(table.n_rows(), 1);
        assert_eq!(table.rows()[0][1], Value::Text("Female".into()));
    }

    #[test]
    fn record_must_be_an_object() {
        assert!(matches!(
            record_to_table(&json!([1, 2]), &["tenure"]),
            Err(ChurnError::InvalidRequest(_))
        ));
        assert!(matches!(
            record_to_table(&json!({"tenure": null}), &["tenure"]),
            Err(ChurnError::InvalidValue { .. })
        ));
    }

    #[test]
    fn undeclared_fields_are_ignored() {
        let body = json!({"tenure": 41, "notes": null, "tags": ["a"], "meta": {"k": 1}});
        let table = record_to_table(&body, &["tenure"]).unwrap();
        assert_eq!(table.columns(), ["tenure"]);
        assert_eq!(table.rows()[0][0], Value::Number(41.0));
    }
}
