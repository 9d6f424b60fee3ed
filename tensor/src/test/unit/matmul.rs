use ndarray::{Array2, ArrayD, IxDyn};
use test_case::test_case;

use crate::test::helpers::*;
use crate::{Error, Tensor};

fn matrix(rows: usize, cols: usize, offset: usize) -> (Tensor, Array2<f32>) {
    let data: Vec<f32> = (0..rows * cols).map(|i| ((i + offset) % 7) as f32 - 3.0).collect();
    let tensor = Tensor::from_slice(&data, &[rows, cols]).unwrap();
    (tensor, Array2::from_shape_vec((rows, cols), data).unwrap())
}

#[test_case(2, 3, 4 ; "2x3 @ 3x4")]
#[test_case(1, 5, 1 ; "row @ column")]
#[test_case(4, 1, 3 ; "outer product")]
fn test_matmul_and_dot_match_ndarray(m: usize, k: usize, n: usize) {
    let (a, a_ref) = matrix(m, k, 0);
    let (b, b_ref) = matrix(k, n, 3);
    let expected = a_ref.dot(&b_ref).into_dyn();

    assert_eq!(realize_f32(a.matmul(&b).unwrap()), expected);
    assert_eq!(realize_f32(a.dot(&b).unwrap()), expected);
}

#[test]
fn test_vector_matmul() {
    let v = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3]).unwrap();
    let (m, m_ref) = matrix(3, 2, 1);

    let out = v.matmul(&m).unwrap();
    assert_eq!(out.shape(), &[2]);

    let v_ref = ndarray::arr1(&[1.0f32, 2.0, 3.0]);
    assert_eq!(realize_f32(out), v_ref.dot(&m_ref).into_dyn());
}

#[test]
fn test_batched_lhs_matmul() {
    let data = arange_f32(12);
    let a = Tensor::from_slice(&data, &[2, 2, 3]).unwrap();
    let (b, b_ref) = matrix(3, 2, 0);

    let out = a.matmul(&b).unwrap();
    assert_eq!(out.shape(), &[2, 2, 2]);

    let lhs = Array2::from_shape_vec((4, 3), data).unwrap();
    let expected: ArrayD<f32> = lhs.dot(&b_ref).into_shape_with_order(IxDyn(&[2, 2, 2])).unwrap();
    assert_eq!(realize_f32(out), expected);
}

#[test]
fn test_matmul_of_transposed_operand() {
    let (a, a_ref) = matrix(3, 2, 2);
    let (b, b_ref) = matrix(3, 4, 5);

    let out = a.transpose().unwrap().dot(&b).unwrap();
    assert_eq!(realize_f32(out), a_ref.t().dot(&b_ref).into_dyn());
}

#[test]
fn test_contraction_mismatch() {
    let (a, _) = matrix(2, 3, 0);
    let (b, _) = matrix(2, 3, 0);

    assert!(matches!(a.matmul(&b), Err(Error::Ir { source: kiln_ir::Error::ShapeMismatch { .. } })));
    assert!(matches!(a.dot(&b), Err(Error::Ir { source: kiln_ir::Error::ShapeMismatch { .. } })));
}

#[test]
fn test_dot_requires_matrices() {
    let a = Tensor::ones(&[2, 2, 2]).unwrap();
    let b = Tensor::ones(&[2, 2]).unwrap();
    assert!(a.dot(&b).is_err());
}

#[test]
fn test_matmul_of_broadcast_operand() {
    let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3, 1]).unwrap().try_expand(&[3, 4]).unwrap();
    let b = Tensor::ones(&[4, 2]).unwrap();

    let c = a.matmul(&b).unwrap();
    assert_close_f32(&realize_f32(c), &[4.0, 4.0, 8.0, 8.0, 12.0, 12.0], 0.0);
}
