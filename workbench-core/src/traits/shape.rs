//! Shape reporting for operands

/// Anything with a (rows, cols) shape
pub trait Shaped {
    /// Get dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Number of rows
    fn nrows(&self) -> usize {
        self.dimensions().0
    }

    /// Number of columns
    fn ncols(&self) -> usize {
        self.dimensions().1
    }

    /// Whether rows == cols
    fn is_square(&self) -> bool {
        let (rows, cols) = self.dimensions();
        rows == cols
    }
}
