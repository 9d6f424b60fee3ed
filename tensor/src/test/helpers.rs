//! Test helpers for realize() validation.

use ndarray::ArrayD;

use crate::Tensor;

/// Compare float arrays with tolerance.
///
/// # Panics
/// Panics if the lengths differ or any value differs by more than `tol`.
#[track_caller]
pub fn assert_close_f32(actual: &ArrayD<f32>, expected: &[f32], tol: f32) {
    let actual_flat: Vec<f32> = actual.iter().copied().collect();
    assert_eq!(actual_flat.len(), expected.len(), "Length mismatch: {} != {}", actual_flat.len(), expected.len());

    for (i, (a, e)) in actual_flat.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= tol, "Mismatch at index {}: {} != {} (diff: {})", i, a, e, (a - e).abs());
    }
}

/// Realize tensor and extract f32 ndarray.
///
/// # Panics
/// Panics if realize or to_ndarray fails.
pub fn realize_f32(t: Tensor) -> ArrayD<f32> {
    t.realize().expect("realize failed").to_ndarray::<f32>().expect("to_ndarray failed")
}

/// `0.0, 1.0, ...` with `n` elements.
pub fn arange_f32(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}
