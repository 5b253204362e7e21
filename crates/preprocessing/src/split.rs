//! Deterministic shuffle-then-split partitioning.

use crate::PreprocessError;
use crate::matrix::Matrix;

/// Default held-out fraction.
pub const DEFAULT_TEST_SIZE: f64 = 0.20;

/// Default reproducibility seed.
pub const DEFAULT_SEED: u64 = 42;

/// Partitions a feature matrix and target vector into train and test sets.
///
/// Row indices are shuffled with a seeded Fisher-Yates pass; the first
/// `ceil(n * test_size)` shuffled rows form the test partition and the rest
/// the train partition. Identical seed and input ordering always yield
/// identical partitions.
///
/// Returns `(x_train, x_test, y_train, y_test)`.
///
/// # Errors
///
/// Returns an error if the matrix and target vector disagree on row count,
/// or if the fraction would leave the train or test partition empty.
pub fn train_test_split(
    x: &Matrix,
    y: &[f64],
    test_size: f64,
    seed: u64,
) -> Result<(Matrix, Matrix, Vec<f64>, Vec<f64>), PreprocessError> {
    if x.n_rows() != y.len() {
        return Err(PreprocessError::ShapeMismatch {
            x_rows: x.n_rows(),
            y_len: y.len(),
        });
    }

    let n = x.n_rows();
    let n_test = ((n as f64) * test_size).ceil() as usize;

    // Both partitions must be usable downstream: training needs rows and
    // evaluation needs a non-empty held-out set.
    if n_test == 0 || n_test >= n {
        return Err(PreprocessError::InvalidTestSize {
            test_size,
            n_rows: n,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    shuffle_indices(&mut indices, seed);

    let (test_indices, train_indices) = indices.split_at(n_test);

    let x_train = x.select_rows(train_indices);
    let x_test = x.select_rows(test_indices);
    let y_train = train_indices.iter().map(|&i| y[i]).collect();
    let y_test = test_indices.iter().map(|&i| y[i]).collect();

    Ok((x_train, x_test, y_train, y_test))
}

/// Shuffles indices with a Fisher-Yates pass driven by an LCG keyed on the
/// seed.
fn shuffle_indices(indices: &mut [usize], seed: u64) {
    let mut rng_state = seed.wrapping_add(12345);

    for i in (1..indices.len()).rev() {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let j = ((rng_state >> 33) as usize) % (i + 1);
        indices.swap(i, j);
    }
}
