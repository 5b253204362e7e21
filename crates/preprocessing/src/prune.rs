//! Target-row filtering and sparse-column pruning.

use crate::PreprocessError;
use crate::frame::Frame;

/// Drops rows without a target value, then removes the target column and
/// returns it as the target vector.
///
/// Rows with no usable label are unusable for training; the target cannot be
/// legitimately imputed, so they are removed entirely.
///
/// # Errors
///
/// Returns an error if the target column is absent or not numeric.
pub fn extract_target(frame: &mut Frame, target: &str) -> Result<Vec<f64>, PreprocessError> {
    let Some(values) = frame.numeric(target) else {
        return Err(PreprocessError::MissingTargetColumn(target.to_string()));
    };

    let keep: Vec<bool> = values.iter().map(Option::is_some).collect();
    frame.retain_rows(&keep);

    let y: Vec<f64> = frame
        .numeric(target)
        .map(|values| values.iter().copied().flatten().collect())
        .unwrap_or_default();

    frame.drop_column(target);

    Ok(y)
}

/// Drops every column whose fraction of missing cells strictly exceeds
/// `threshold`. Returns the names of the dropped columns.
///
/// A column that is mostly absent provides near-zero signal and destabilizes
/// imputation; dropping it is safer than imputing it wholesale.
pub fn drop_sparse_columns(frame: &mut Frame, threshold: f64) -> Vec<String> {
    let to_drop: Vec<String> = frame
        .column_names()
        .filter(|name| frame.missing_ratio(name).is_some_and(|ratio| ratio > threshold))
        .map(str::to_string)
        .collect();

    for name in &to_drop {
        frame.drop_column(name);
    }

    to_drop
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_target_drops_unlabeled_rows() {
        let mut frame = Frame::new();
        frame.push_numeric(
            "montant_pret",
            vec![Some(10_000.0), None, Some(8_000.0), Some(15_000.0), None],
        );
        frame.push_numeric(
            "age",
            vec![Some(30.0), Some(40.0), Some(50.0), Some(60.0), Some(70.0)],
        );

        let y = extract_target(&mut frame, "montant_pret").unwrap();

        assert_eq!(y, vec![10_000.0, 8_000.0, 15_000.0]);
        assert_eq!(frame.n_rows(), 3);
        assert!(!frame.contains("montant_pret"));
        // Feature rows follow the target filter.
        assert_eq!(
            frame.numeric("age"),
            Some(&[Some(30.0), Some(50.0), Some(60.0)][..])
        );
    }

    #[test]
    fn extract_target_requires_numeric_target() {
        let mut frame = Frame::new();
        frame.push_categorical("montant_pret", vec![Some("oui".to_string())]);

        let err = extract_target(&mut frame, "montant_pret").unwrap_err();
        assert!(matches!(err, PreprocessError::MissingTargetColumn(_)));
    }

    #[test]
    fn column_above_threshold_is_dropped() {
        let mut frame = Frame::new();
        // 5 of 10 cells missing: ratio 0.50 > 0.40.
        let half_missing: Vec<Option<f64>> = (0..10)
            .map(|i| if i % 2 == 0 { Some(1.0) } else { None })
            .collect();
        // 3 of 10 cells missing: ratio 0.30 <= 0.40.
        let mostly_present: Vec<Option<f64>> = (0..10)
            .map(|i| if i < 3 { None } else { Some(2.0) })
            .collect();

        frame.push_numeric("sparse", half_missing);
        frame.push_numeric("dense", mostly_present);

        let dropped = drop_sparse_columns(&mut frame, 0.40);

        assert_eq!(dropped, vec!["sparse".to_string()]);
        assert!(!frame.contains("sparse"));
        assert!(frame.contains("dense"));
    }

    #[test]
    fn ratio_exactly_at_threshold_is_kept() {
        let mut frame = Frame::new();
        // 4 of 10 missing: ratio 0.40, not strictly above the threshold.
        let at_threshold: Vec<Option<f64>> =
            (0..10).map(|i| if i < 4 { None } else { Some(1.0) }).collect();
        frame.push_numeric("edge", at_threshold);

        let dropped = drop_sparse_columns(&mut frame, 0.40);

        assert!(dropped.is_empty());
        assert!(frame.contains("edge"));
    }
}
