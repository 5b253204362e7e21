//! Domain business rules applied to raw feature values.

use crate::frame::Frame;

/// Columns whose values can never be negative.
const NON_NEGATIVE_COLUMNS: [&str; 2] = ["nb_enfants", "quotient_caf"];

/// Clamps domain-constrained columns to their valid range.
///
/// Values below zero are raised to zero; missing values pass through
/// unchanged. Columns absent from the frame are skipped so the corrector
/// stays compatible across schema versions.
pub fn correct_business_rules(frame: &mut Frame) {
    for name in NON_NEGATIVE_COLUMNS {
        let Some(values) = frame.numeric_mut(name) else {
            continue;
        };

        for value in values.iter_mut() {
            if let Some(x) = value {
                if *x < 0.0 {
                    *x = 0.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_are_clamped_to_zero() {
        let mut frame = Frame::new();
        frame.push_numeric("nb_enfants", vec![Some(-1.0), Some(2.0), None]);
        frame.push_numeric("quotient_caf", vec![Some(-350.5), Some(0.0), Some(800.0)]);

        correct_business_rules(&mut frame);

        for value in frame.numeric("nb_enfants").unwrap().iter().flatten() {
            assert!(*value >= 0.0);
        }
        for value in frame.numeric("quotient_caf").unwrap().iter().flatten() {
            assert!(*value >= 0.0);
        }

        // Valid values and missing cells are untouched.
        assert_eq!(
            frame.numeric("nb_enfants"),
            Some(&[Some(0.0), Some(2.0), None][..])
        );
    }

    #[test]
    fn absent_columns_are_skipped() {
        let mut frame = Frame::new();
        frame.push_numeric("age", vec![Some(-5.0)]);

        correct_business_rules(&mut frame);

        // Unrelated columns are not clamped.
        assert_eq!(frame.numeric("age"), Some(&[Some(-5.0)][..]));
    }
}
