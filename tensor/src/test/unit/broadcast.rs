//! Broadcasting is explicit: operands are expanded before elementwise ops,
//! and results must match the fully tiled reference.

use kiln_ir::{BinaryOp, UnaryOp};
use proptest::prelude::*;
use test_case::test_case;

use crate::Tensor;
use crate::test::helpers::*;
use crate::test::reference::{binary_f32, tile, unary_f32};

/// Base shape of an operand broadcast to `[m, n]`: along rows, columns or not at all.
fn base_shape(kind: u8, m: usize, n: usize) -> Vec<usize> {
    match kind {
        0 => vec![m, 1],
        1 => vec![1, n],
        _ => vec![m, n],
    }
}

fn arb_operand(m: usize, n: usize) -> impl Strategy<Value = (Vec<usize>, Vec<f32>)> {
    (0u8..3).prop_flat_map(move |kind| {
        let shape = base_shape(kind, m, n);
        let len: usize = shape.iter().product();
        (Just(shape), prop::collection::vec((-8i8..8).prop_map(f32::from), len))
    })
}

fn arb_case() -> impl Strategy<Value = (usize, usize, (Vec<usize>, Vec<f32>), (Vec<usize>, Vec<f32>), BinaryOp)> {
    (1usize..4, 1usize..4).prop_flat_map(|(m, n)| {
        let ops = vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Max];
        (Just(m), Just(n), arb_operand(m, n), arb_operand(m, n), prop::sample::select(ops))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn independently_broadcast_operands_match_tiled((m, n, lhs, rhs, op) in arb_case()) {
        let a = Tensor::from_slice(&lhs.1, &lhs.0).unwrap().try_expand(&[m, n]).unwrap();
        let b = Tensor::from_slice(&rhs.1, &rhs.0).unwrap().try_expand(&[m, n]).unwrap();
        let c = Tensor::from_buffer(a.buffer().binary(op, b.buffer()).unwrap());

        let expected = binary_f32(op, &tile(&lhs.1, &lhs.0, &[m, n]), &tile(&rhs.1, &rhs.0, &[m, n]));
        prop_assert_eq!(realize_f32(c), expected);
    }
}

#[test_case(UnaryOp::Neg ; "neg")]
#[test_case(UnaryOp::Sin ; "sin")]
#[test_case(UnaryOp::Sqrt ; "sqrt")]
#[test_case(UnaryOp::Exp2 ; "exp2")]
#[test_case(UnaryOp::Log2 ; "log2")]
fn test_unary_after_expand_matches_tiled(op: UnaryOp) {
    let data = [0.5f32, 1.0, 2.0, 4.0];
    let expanded = Tensor::from_slice(&data, &[4, 1]).unwrap().try_expand(&[4, 3]).unwrap();
    let lazy = Tensor::from_buffer(expanded.buffer().unary(op).unwrap());

    // Materialize the expansion first, then map.
    let tiled = tile(&data, &[4, 1], &[4, 3]);
    let dense = Tensor::from_slice(tiled.as_slice().unwrap(), &[4, 3]).unwrap();
    let eager = Tensor::from_buffer(dense.buffer().unary(op).unwrap());

    let expected: Vec<f32> = tiled.iter().map(|&x| unary_f32(op, x)).collect();
    let lazy = realize_f32(lazy);
    assert_close_f32(&lazy, &expected, 1e-6);
    assert_close_f32(&realize_f32(eager), lazy.as_slice().unwrap(), 0.0);
}

#[test]
fn test_unary_on_broadcast_computes_unique_elements_only() {
    let t = Tensor::rand_seeded(&[10, 1, 1], 1).unwrap().try_expand(&[10, 5, 8]).unwrap().sin().unwrap();
    let t = t.realize().unwrap();

    assert_eq!(t.to_vec::<f32>().unwrap().len(), 10);
    assert_eq!(t.to_ndarray::<f32>().unwrap().shape(), &[10, 5, 8]);
}

#[test]
fn test_expand_composes() {
    let t = Tensor::from_slice(&[1.0f32, 2.0], &[2, 1, 1]).unwrap();
    let t = t.try_expand(&[2, 3, 1]).unwrap().try_expand(&[2, 3, 4]).unwrap();

    let expected = tile(&[1.0, 2.0], &[2, 1, 1], &[2, 3, 4]);
    assert_eq!(realize_f32(t.try_mul(&Tensor::ones(&[2, 3, 4]).unwrap()).unwrap()), expected);
}
