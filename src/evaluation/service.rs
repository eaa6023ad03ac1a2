//! Metric computation over predictions and ground truth.

use ndarray::{ArrayView1, Zip};

use crate::common::error::{ChurnError, ChurnResult};
use crate::data::domain::Table;
use crate::training::domain::ChurnPipeline;

use super::domain::{Confusion, EvalSuite};

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Score predicted labels against the truth. Lengths must match.
pub fn score(predicted: ArrayView1<usize>, truth: ArrayView1<usize>) -> ChurnResult<EvalSuite> {
    if predicted.len() != truth.len() {
        return Err(ChurnError::InvalidSplit(format!(
            "{} predictions for {} labels",
            predicted.len(),
            truth.len()
        )));
    }

    let mut c = Confusion::default();
    Zip::from(&predicted).and(&truth).for_each(|&p, &t| match (p == 1, t == 1) {
        (true, true) => c.true_pos += 1,
        (true, false) => c.false_pos += 1,
        (false, false) => c.true_neg += 1,
        (false, true) => c.false_neg += 1,
    });

    let precision = ratio(c.true_pos, c.true_pos + c.false_pos);
    let recall = ratio(c.true_pos, c.true_pos + c.false_neg);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    Ok(EvalSuite {
        confusion: c,
        accuracy: ratio(c.true_pos + c.true_neg, c.total()),
        precision,
        recall,
        f1,
        support: c.total(),
    })
}

/// Evaluate a fitted pipeline on a held-out partition.
pub fn evaluate(
    pipeline: &ChurnPipeline,
    x_test: &Table,
    y_test: ArrayView1<usize>,
) -> ChurnResult<EvalSuite> {
    let predicted = pipeline.predict(x_test)?;
    let suite = score(predicted.view(), y_test)?;
    tracing::info!(
        ev = "eval.done",
        support = suite.support,
        accuracy = suite.accuracy,
        precision = suite.precision,
        recall = suite.recall,
        f1 = suite.f1,
    );
    Ok(suite)
}
