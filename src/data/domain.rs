//! Core table definitions shared by training and inference.
//!
//! A [`Table`] is an ordered set of named columns over rows of [`Value`]
//! cells. Every operation returns a new table; nothing is mutated in place.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::common::error::{ChurnError, ChurnResult};

/// Identifier column dropped before training.
pub const ID_COLUMN: &str = "customerID";
/// Label column holding the churn flag.
pub const TARGET_COLUMN: &str = "Churn";
/// Numeric column that may hold placeholder strings in the raw export.
pub const LENIENT_COLUMN: &str = "TotalCharges";

pub const NUMERIC_FEATURES: [&str; 3] = ["tenure", "MonthlyCharges", "TotalCharges"];

pub const CATEGORICAL_FEATURES: [&str; 16] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
];

/// A single scalar cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Type a raw CSV cell: anything that parses as `f64` is a number.
    pub fn infer(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(raw.to_string()),
        }
    }

    /// Convert one JSON field of a request body.
    pub fn from_json(column: &str, value: &serde_json::Value) -> ChurnResult<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| ChurnError::invalid_value(column, format!("{n} is not representable"))),
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Bool(b) => Ok(Value::Text(if *b { "True" } else { "False" }.into())),
            serde_json::Value::Null => Err(ChurnError::invalid_value(column, "null")),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                ChurnError::invalid_value(column, "expected a string or a number"),
            ),
        }
    }

    /// Numeric reading of the cell; text must parse as `f64`.
    pub fn as_f64(&self, column: &str) -> ChurnResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ChurnError::invalid_value(column, format!("'{s}' is not numeric"))),
        }
    }

    /// Key used by the one-hot encoder. Integral numbers drop their fraction
    /// so `0` read from CSV and `0` sent as JSON land in the same category.
    pub fn category_key(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Value::Number(n) => n.to_string(),
        }
    }
}

/// Column-named rows of cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table, rejecting rows whose width differs from the header.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> ChurnResult<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> ChurnResult<()> {
        if row.len() != self.columns.len() {
            return Err(ChurnError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> ChurnResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ChurnError::MissingColumn(name.to_string()))
    }

    /// Cells of one column in row order.
    pub fn column(&self, name: &str) -> ChurnResult<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Copy of the table without `name`.
    pub fn without_column(&self, name: &str) -> ChurnResult<Table> {
        let idx = self.column_index(name)?;
        let mut columns = self.columns.clone();
        columns.remove(idx);
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.remove(idx);
                row
            })
            .collect();
        Ok(Table { columns, rows })
    }

    /// Copy of the table with `f` applied to every cell of `name`.
    pub fn map_column<F>(&self, name: &str, f: F) -> ChurnResult<Table>
    where
        F: Fn(&Value) -> Value,
    {
        let idx = self.column_index(name)?;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row[idx] = f(&row[idx]);
                row
            })
            .collect();
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Rows at `indices`, in the order given.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Lineage information for an ingested file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub path: String,
    pub rows: usize,
    pub fingerprint: String,
    pub created_ms: u64,
}

/// Train/test partition with labels separated from features.
#[derive(Clone, Debug)]
pub struct Split {
    pub x_train: Table,
    pub x_test: Table,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
    /// Source row indices of each partition, in partition order.
    pub train_rows: Vec<usize>,
    pub test_rows: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["customerID".into(), "tenure".into(), "Contract".into()],
            vec![
                vec![Value::Text("a".into()), Value::Number(1.0), Value::Text("One year".into())],
                vec![Value::Text("b".into()), Value::Number(7.0), Value::Text("Two year".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::from_rows(vec!["a".into(), "b".into()], vec![vec![Value::Number(1.0)]])
            .unwrap_err();
        assert!(matches!(err, ChurnError::RaggedRow { expected: 2, found: 1, .. }));
    }

    #[test]
    fn without_column_leaves_source_untouched() {
        let table = sample();
        let dropped = table.without_column("customerID").unwrap();
        assert_eq!(dropped.columns(), ["tenure", "Contract"]);
        assert_eq!(dropped.rows()[1], vec![Value::Number(7.0), Value::Text("Two year".into())]);
        assert_eq!(table.n_cols(), 3);
        assert!(matches!(
            table.without_column("gender"),
            Err(ChurnError::MissingColumn(c)) if c == "gender"
        ));
    }

    #[test]
    fn category_keys_align_csv_and_json() {
        let from_csv = Value::infer("0");
        let from_json = Value::from_json("SeniorCitizen", &json!(0)).unwrap();
        assert_eq!(from_csv.category_key(), "0");
        assert_eq!(from_json.category_key(), "0");
        assert_eq!(Value::Number(2.5).category_key(), "2.5");
    }

    #[test]
    fn json_cells_reject_nested_values() {
        assert!(Value::from_json("tenure", &json!(null)).is_err());
        assert!(Value::from_json("tenure", &json!([1])).is_err());
        assert_eq!(
            Value::from_json("Partner", &json!(true)).unwrap(),
            Value::Text("True".into())
        );
    }

    #[test]
    fn numeric_text_is_readable() {
        assert_eq!(Value::Text(" 41 ".into()).as_f64("tenure").unwrap(), 41.0);
        assert!(Value::Text("forty".into()).as_f64("tenure").is_err());
    }
}
