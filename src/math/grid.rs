/// Dense row-major 2D array of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2 {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Grid2 {
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                values.push(f(i, j));
            }
        }
        Self { rows, cols, values }
    }

    /// Applies `f` to the aligned entries of `a` and `b`.
    pub fn zip_map(a: &Grid2, b: &Grid2, f: impl Fn(f64, f64) -> f64) -> Self {
        debug_assert_eq!(a.shape(), b.shape());
        Self {
            rows: a.rows,
            cols: a.cols,
            values: a
                .values
                .iter()
                .zip(&b.values)
                .map(|(&x, &y)| f(x, y))
                .collect(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.cols + j]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Smallest finite entry, `None` when there is none.
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::max)
    }
}

/// `n` evenly spaced values over `[start, end]`, both ends included.
///
/// The last value is written as `end` rather than accumulated so the
/// endpoint is exact regardless of rounding in the step.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Outer combination of two axes: `X[i][j] = xs[j]`, `Y[i][j] = ys[i]`.
pub fn meshgrid(xs: &[f64], ys: &[f64]) -> (Grid2, Grid2) {
    let x = Grid2::from_fn(ys.len(), xs.len(), |_, j| xs[j]);
    let y = Grid2::from_fn(ys.len(), xs.len(), |i, _| ys[i]);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_hits_both_endpoints() {
        let xs = linspace(-7.0, 7.0, 37);
        assert_eq!(xs.len(), 37);
        assert_eq!(xs[0], -7.0);
        assert_eq!(xs[36], 7.0);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn linspace_even_count_has_no_zero() {
        let xs = linspace(-5.0, 5.0, 50);
        assert!(xs.iter().all(|&x| x != 0.0));
        assert_relative_eq!(xs[24], -xs[25], epsilon = 1e-12);
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    }

    #[test]
    fn meshgrid_broadcasts_columns_and_rows() {
        let (x, y) = meshgrid(&[1.0, 2.0, 3.0], &[10.0, 20.0]);
        assert_eq!(x.shape(), (2, 3));
        assert_eq!(y.shape(), (2, 3));
        assert_eq!(x.get(1, 2), 3.0);
        assert_eq!(x.get(0, 2), 3.0);
        assert_eq!(y.get(1, 0), 20.0);
        assert_eq!(y.get(1, 2), 20.0);
    }

    #[test]
    fn min_max_skip_non_finite() {
        let g = Grid2::from_fn(1, 4, |_, j| [1.0, f64::NAN, -2.0, f64::INFINITY][j]);
        assert_eq!(g.min(), Some(-2.0));
        assert_eq!(g.max(), Some(1.0));
    }
}
