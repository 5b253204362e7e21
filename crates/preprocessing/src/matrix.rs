//! Dense row-major feature matrix produced by the fitted transformer.

/// A dense numeric matrix in row-major layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Builds a matrix from a flat row-major buffer.
    ///
    /// Panics if the buffer length is not `n_rows * n_cols`.
    #[must_use]
    pub fn from_flat(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Self {
        assert_eq!(data.len(), n_rows * n_cols, "matrix buffer size mismatch");
        Self {
            n_rows,
            n_cols,
            data,
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Returns a single row as a slice.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.n_cols.max(1))
    }

    /// Builds a new matrix from the rows at the given indices, in order.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols);
        for &index in indices {
            data.extend_from_slice(self.row(index));
        }
        Self::from_flat(data, indices.len(), self.n_cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_access() {
        let m = Matrix::from_flat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.rows().count(), 3);
    }

    #[test]
    fn select_rows_preserves_order() {
        let m = Matrix::from_flat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let picked = m.select_rows(&[2, 0]);
        assert_eq!(picked.row(0), &[5.0, 6.0]);
        assert_eq!(picked.row(1), &[1.0, 2.0]);
    }
}
