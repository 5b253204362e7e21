//! Dynamically keyed tabular data used throughout the pipeline.
//!
//! Columns are kept as a name-keyed ordered set rather than a fixed record
//! type so that the corrector, pruner and clipper stay tolerant of columns
//! being added or removed between schema versions.

/// A single named column: numeric or categorical, with per-cell missingness.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Returns the number of cells in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    /// Returns true if the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        match self {
            Self::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            Self::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// An ordered set of equally sized named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<(String, Column)>,
}

impl Frame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, column)| column.len())
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Iterates over column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Returns true if a column with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Appends a numeric column. Panics if the length does not match the
    /// existing rows.
    pub fn push_numeric(&mut self, name: &str, values: Vec<Option<f64>>) {
        if !self.columns.is_empty() {
            assert_eq!(values.len(), self.n_rows(), "column `{name}` length mismatch");
        }
        self.columns.push((name.to_string(), Column::Numeric(values)));
    }

    /// Appends a categorical column. Panics if the length does not match the
    /// existing rows.
    pub fn push_categorical(&mut self, name: &str, values: Vec<Option<String>>) {
        if !self.columns.is_empty() {
            assert_eq!(values.len(), self.n_rows(), "column `{name}` length mismatch");
        }
        self.columns
            .push((name.to_string(), Column::Categorical(values)));
    }

    /// Returns a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// Returns the cells of a numeric column, or `None` if the column is
    /// absent or categorical.
    #[must_use]
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Some(values),
            _ => None,
        }
    }

    /// Mutable access to the cells of a numeric column.
    pub fn numeric_mut(&mut self, name: &str) -> Option<&mut Vec<Option<f64>>> {
        match self
            .columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
        {
            Some(Column::Numeric(values)) => Some(values),
            _ => None,
        }
    }

    /// Returns the cells of a categorical column, or `None` if the column is
    /// absent or numeric.
    #[must_use]
    pub fn categorical(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name) {
            Some(Column::Categorical(values)) => Some(values),
            _ => None,
        }
    }

    /// Removes a column by name. Returns true if it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|(n, _)| n != name);
        self.columns.len() < before
    }

    /// Fraction of missing cells in a column, or `None` if the column is
    /// absent or the frame has no rows.
    #[must_use]
    pub fn missing_ratio(&self, name: &str) -> Option<f64> {
        let column = self.column(name)?;
        if column.is_empty() {
            return None;
        }
        Some(column.missing_count() as f64 / column.len() as f64)
    }

    /// Keeps only the rows whose flag in `keep` is true, across all columns.
    ///
    /// Panics if `keep` does not have one flag per row.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        assert_eq!(keep.len(), self.n_rows(), "row mask length mismatch");

        for (_, column) in &mut self.columns {
            match column {
                Column::Numeric(values) => {
                    let mut index = 0;
                    values.retain(|_| {
                        let kept = keep[index];
                        index += 1;
                        kept
                    });
                }
                Column::Categorical(values) => {
                    let mut index = 0;
                    values.retain(|_| {
                        let kept = keep[index];
                        index += 1;
                        kept
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        let mut frame = Frame::new();
        frame.push_numeric("a", vec![Some(1.0), None, Some(3.0)]);
        frame.push_categorical(
            "b",
            vec![Some("x".to_string()), Some("y".to_string()), None],
        );
        frame
    }

    #[test]
    fn dimensions_and_lookup() {
        let frame = sample_frame();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.n_columns(), 2);
        assert!(frame.contains("a"));
        assert!(!frame.contains("missing"));
        assert!(frame.numeric("a").is_some());
        // Categorical column is not visible through the numeric accessor.
        assert!(frame.numeric("b").is_none());
        assert!(frame.categorical("b").is_some());
    }

    #[test]
    fn missing_ratio_counts_none_cells() {
        let frame = sample_frame();
        assert_eq!(frame.missing_ratio("a"), Some(1.0 / 3.0));
        assert_eq!(frame.missing_ratio("absent"), None);
    }

    #[test]
    fn retain_rows_applies_to_every_column() {
        let mut frame = sample_frame();
        frame.retain_rows(&[true, false, true]);

        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.numeric("a"), Some(&[Some(1.0), Some(3.0)][..]));
        assert_eq!(
            frame.categorical("b"),
            Some(&[Some("x".to_string()), None][..])
        );
    }

    #[test]
    fn drop_column_removes_by_name() {
        let mut frame = sample_frame();
        assert!(frame.drop_column("a"));
        assert!(!frame.drop_column("a"));
        assert_eq!(frame.n_columns(), 1);
    }
}
