//! Column-wise feature transform fitted on the training partition.
//!
//! Numeric columns are min-max scaled, categorical columns one-hot encoded
//! with the first (lexicographically smallest) category dropped, and every
//! other column seen at fit time passes through. Columns are looked up by
//! name, so callers may present them in any order.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::common::error::{ChurnError, ChurnResult};
use crate::data::domain::{Table, Value};

/// Scales one column to `[0, 1]` over the range seen while fitting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    pub fn fit(column: &str, cells: &[&Value]) -> ChurnResult<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for cell in cells {
            let v = cell.as_f64(column)?;
            min = min.min(v);
            max = max.max(v);
        }
        if cells.is_empty() {
            return Err(ChurnError::invalid_value(column, "no rows to fit a scaler on"));
        }
        Ok(Self {
            column: column.to_string(),
            min,
            max,
        })
    }

    /// A zero range leaves the shifted value unscaled.
    pub fn transform(&self, cell: &Value) -> ChurnResult<f64> {
        let v = cell.as_f64(&self.column)?;
        let range = self.max - self.min;
        let scale = if range == 0.0 { 1.0 } else { range };
        Ok((v - self.min) / scale)
    }
}

/// One-hot encoder dropping the first category of its column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    /// Observed categories, sorted; `categories[0]` is the dropped reference.
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit(column: &str, cells: &[&Value]) -> ChurnResult<Self> {
        let categories: BTreeSet<String> = cells.iter().map(|c| c.category_key()).collect();
        if categories.is_empty() {
            return Err(ChurnError::invalid_value(column, "no rows to fit an encoder on"));
        }
        Ok(Self {
            column: column.to_string(),
            categories: categories.into_iter().collect(),
        })
    }

    /// Number of indicator columns produced.
    pub fn width(&self) -> usize {
        self.categories.len().saturating_sub(1)
    }

    pub fn feature_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .skip(1)
            .map(move |cat| format!("{}_{}", self.column, cat))
    }

    /// Write the indicators for `cell` into `out` (length [`Self::width`]).
    pub fn encode_into(&self, cell: &Value, out: &mut [f64]) -> ChurnResult<()> {
        let key = cell.category_key();
        let pos = self
            .categories
            .binary_search(&key)
            .map_err(|_| ChurnError::UnknownCategory {
                column: self.column.clone(),
                value: key,
            })?;
        out.fill(0.0);
        if pos > 0 {
            out[pos - 1] = 1.0;
        }
        Ok(())
    }
}

/// Fitted numeric + categorical + passthrough transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub scalers: Vec<MinMaxScaler>,
    pub encoders: Vec<OneHotEncoder>,
    pub passthrough: Vec<String>,
}

impl ColumnTransformer {
    pub fn fit(table: &Table, numeric: &[String], categorical: &[String]) -> ChurnResult<Self> {
        let scalers = numeric
            .iter()
            .map(|name| MinMaxScaler::fit(name, &table.column(name)?))
            .collect::<ChurnResult<Vec<_>>>()?;
        let encoders = categorical
            .iter()
            .map(|name| OneHotEncoder::fit(name, &table.column(name)?))
            .collect::<ChurnResult<Vec<_>>>()?;
        let passthrough: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| !numeric.contains(*c) && !categorical.contains(*c))
            .cloned()
            .collect();

        // passthrough columns feed the classifier as-is, so they must be numeric
        for name in &passthrough {
            for cell in table.column(name)? {
                cell.as_f64(name)?;
            }
        }

        Ok(Self {
            scalers,
            encoders,
            passthrough,
        })
    }

    /// Width of the transformed feature matrix.
    pub fn n_features(&self) -> usize {
        self.scalers.len()
            + self.encoders.iter().map(OneHotEncoder::width).sum::<usize>()
            + self.passthrough.len()
    }

    /// Source columns read by [`ColumnTransformer::transform`].
    pub fn input_columns(&self) -> Vec<&str> {
        self.scalers
            .iter()
            .map(|s| s.column.as_str())
            .chain(self.encoders.iter().map(|e| e.column.as_str()))
            .chain(self.passthrough.iter().map(String::as_str))
            .collect()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scalers.iter().map(|s| s.column.clone()).collect();
        for enc in &self.encoders {
            names.extend(enc.feature_names());
        }
        names.extend(self.passthrough.iter().cloned());
        names
    }

    pub fn transform(&self, table: &Table) -> ChurnResult<Array2<f64>> {
        let scaler_idx = column_indices(table, self.scalers.iter().map(|s| s.column.as_str()))?;
        let encoder_idx = column_indices(table, self.encoders.iter().map(|e| e.column.as_str()))?;
        let passthrough_idx = column_indices(table, self.passthrough.iter().map(String::as_str))?;

        let mut out = Array2::<f64>::zeros((table.n_rows(), self.n_features()));
        for (r, row) in table.rows().iter().enumerate() {
            let mut dst = out.row_mut(r);
            let dst = dst
                .as_slice_mut()
                .ok_or_else(|| ChurnError::Fit("feature matrix is not contiguous".into()))?;
            let mut at = 0;
            for (scaler, &idx) in self.scalers.iter().zip(&scaler_idx) {
                dst[at] = scaler.transform(&row[idx])?;
                at += 1;
            }
            for (encoder, &idx) in self.encoders.iter().zip(&encoder_idx) {
                let width = encoder.width();
                encoder.encode_into(&row[idx], &mut dst[at..at + width])?;
                at += width;
            }
            for (name, &idx) in self.passthrough.iter().zip(&passthrough_idx) {
                dst[at] = row[idx].as_f64(name)?;
                at += 1;
            }
        }
        Ok(out)
    }
}

fn column_indices<'a>(table: &Table, names: impl Iterator<Item = &'a str>) -> ChurnResult<Vec<usize>> {
    names.map(|name| table.column_index(name)).collect()
}
