//! Synthetic coordinate and field values.

/// Values of a `(y, x)` field where every element encodes its own grid
/// position as `x * 1000 + y`.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(4, 2);
/// assert_eq!(grid[1], 1000.0); // x = 1, y = 0
/// assert_eq!(grid[4], 1.0); // x = 0, y = 1
/// ```
pub fn create_test_grid(x_len: usize, y_len: usize) -> Vec<f64> {
    (0..y_len)
        .flat_map(|y| (0..x_len).map(move |x| (x * 1000 + y) as f64))
        .collect()
}

/// Reorder a `(y, x)` field into `(x, y)` order.
pub fn transpose_grid<T: Copy>(data: &[T], x_len: usize, y_len: usize) -> Vec<T> {
    (0..x_len)
        .flat_map(|x| (0..y_len).map(move |y| data[y * x_len + x]))
        .collect()
}

/// `count` coordinates from `start` in steps of `step`.
pub fn create_axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// A smooth `(y, x)` field between 250 and 310, warmest in the last row and
/// column.
pub fn create_smooth_field(x_len: usize, y_len: usize) -> Vec<f32> {
    let fx = 30.0 / x_len.max(1) as f32;
    let fy = 30.0 / y_len.max(1) as f32;
    (0..y_len)
        .flat_map(|y| (0..x_len).map(move |x| 250.0 + x as f32 * fx + y as f32 * fy))
        .collect()
}
