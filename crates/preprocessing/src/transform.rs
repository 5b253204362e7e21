//! Fitted imputation, encoding and scaling transformer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::PreprocessError;
use crate::frame::Frame;
use crate::matrix::Matrix;

/// Frozen statistics for one numeric column.
///
/// Mean imputation preserves the column mean, so a single `mean` serves both
/// the imputation and the centering step; `std` is the population standard
/// deviation of the imputed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NumericStats {
    name: String,
    mean: f64,
    std: f64,
}

/// Frozen vocabulary for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CategoryVocab {
    name: String,
    /// Most frequent training value, used to impute missing cells.
    mode: String,
    /// Sorted one-hot vocabulary observed during fitting.
    categories: Vec<String>,
}

/// A stateful transformer combining a numeric branch (mean imputation +
/// standardization) and a categorical branch (mode imputation + one-hot
/// encoding) into one numeric feature matrix.
///
/// `fit` computes and freezes all statistics and vocabularies from a given
/// dataset; `transform` applies the frozen state without recomputation, so it
/// must be applied with the statistics learned from the training set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    numeric: Vec<NumericStats>,
    categorical: Vec<CategoryVocab>,
}

impl FittedTransformer {
    /// Learns imputation statistics, scaling parameters and one-hot
    /// vocabularies from `frame`.
    ///
    /// Columns from the candidate lists that are absent, of the wrong kind,
    /// or entirely missing are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame has no rows.
    pub fn fit(
        frame: &Frame,
        numeric_columns: &[&str],
        categorical_columns: &[&str],
    ) -> Result<Self, PreprocessError> {
        if frame.is_empty() {
            return Err(PreprocessError::EmptyDataset);
        }

        let mut numeric = Vec::new();
        for &name in numeric_columns {
            let Some(values) = frame.numeric(name) else {
                continue;
            };

            let present: Vec<f64> = values.iter().copied().flatten().collect();
            if present.is_empty() {
                continue;
            }

            let mean = present.iter().sum::<f64>() / present.len() as f64;

            // Scaling statistics are computed after imputation, matching a
            // mean-impute-then-standardize pipeline.
            let variance = values
                .iter()
                .map(|v| {
                    let x = v.unwrap_or(mean);
                    (x - mean).powi(2)
                })
                .sum::<f64>()
                / values.len() as f64;
            let std = variance.sqrt();

            numeric.push(NumericStats {
                name: name.to_string(),
                mean,
                // Zero-variance guard: a constant column maps to all zeros.
                std: if std == 0.0 { 1.0 } else { std },
            });
        }

        let mut categorical = Vec::new();
        for &name in categorical_columns {
            let Some(values) = frame.categorical(name) else {
                continue;
            };

            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for value in values.iter().flatten() {
                *counts.entry(value.as_str()).or_insert(0) += 1;
            }
            if counts.is_empty() {
                continue;
            }

            // Ascending iteration means the first maximum is the
            // lexicographically smallest value among ties.
            let mut mode = "";
            let mut mode_count = 0;
            for (value, &count) in &counts {
                if count > mode_count {
                    mode = value;
                    mode_count = count;
                }
            }

            categorical.push(CategoryVocab {
                name: name.to_string(),
                mode: mode.to_string(),
                categories: counts.keys().map(|v| (*v).to_string()).collect(),
            });
        }

        Ok(Self {
            numeric,
            categorical,
        })
    }

    /// Number of columns in the output matrix.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|vocab| vocab.categories.len())
                .sum::<usize>()
    }

    /// Names of the output matrix columns, in output order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|s| s.name.clone()).collect();
        for vocab in &self.categorical {
            for category in &vocab.categories {
                names.push(format!("{}_{}", vocab.name, category));
            }
        }
        names
    }

    /// Applies the frozen statistics to `frame`, producing standardized
    /// numeric columns followed by one-hot indicators, with row order
    /// preserved.
    ///
    /// A fitted column that is absent from `frame` is treated as entirely
    /// missing and imputed, keeping the output width and column order frozen.
    /// Categories never seen during fitting encode as all-zero indicators.
    #[must_use]
    pub fn transform(&self, frame: &Frame) -> Matrix {
        let n_rows = frame.n_rows();
        let width = self.output_width();
        let mut data = Vec::with_capacity(n_rows * width);

        for row in 0..n_rows {
            for stats in &self.numeric {
                let value = frame
                    .numeric(&stats.name)
                    .and_then(|values| values[row])
                    .unwrap_or(stats.mean);
                data.push((value - stats.mean) / stats.std);
            }

            for vocab in &self.categorical {
                let value = frame
                    .categorical(&vocab.name)
                    .and_then(|values| values[row].as_deref())
                    .unwrap_or(&vocab.mode);
                for category in &vocab.categories {
                    data.push(if category == value { 1.0 } else { 0.0 });
                }
            }
        }

        Matrix::from_flat(data, n_rows, width)
    }
}
