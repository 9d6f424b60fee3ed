use kiln_codegen::rand::uniform_f32;
use test_case::test_case;

use crate::test::helpers::*;
use crate::{DType, Tensor};

#[test_case(Tensor::zeros(&[2, 3]).unwrap(), 0.0 ; "zeros")]
#[test_case(Tensor::ones(&[2, 3]).unwrap(), 1.0 ; "ones")]
#[test_case(Tensor::full(&[2, 3], -2.5).unwrap(), -2.5 ; "full")]
#[test_case(Tensor::empty(&[2, 3]).unwrap(), 0.0 ; "empty")]
fn test_constant_constructors(t: Tensor, expected: f32) {
    assert_eq!(t.shape(), &[2, 3]);
    assert_eq!(t.dtype(), DType::Float32);
    assert!(!t.is_realized());

    assert_close_f32(&realize_f32(t), &[expected; 6], 0.0);
}

#[test]
fn test_full_f64() {
    let t = Tensor::full_with_dtype(&[3], 0.1, DType::Float64).unwrap().realize().unwrap();
    assert_eq!(t.to_vec::<f64>().unwrap(), [0.1; 3]);
}

#[test]
fn test_rand_seeded_matches_generator() {
    let t = Tensor::rand_seeded(&[4, 5], 42).unwrap();

    let expected: Vec<f32> = (0..20).map(|i| uniform_f32(42, i)).collect();
    let actual = realize_f32(t);
    assert_close_f32(&actual, &expected, 0.0);
    assert!(actual.iter().all(|v| (0.0..1.0).contains(v)));
}

#[test]
fn test_rand_advances_seed() {
    Tensor::manual_seed(100);
    let a = realize_f32(Tensor::rand(&[16]).unwrap());
    let b = realize_f32(Tensor::rand(&[16]).unwrap());
    assert_ne!(a, b, "consecutive rand calls must use different seeds");

    Tensor::manual_seed(100);
    let again = realize_f32(Tensor::rand(&[16]).unwrap());
    assert_eq!(a, again);
}

#[test]
fn test_from_slice_is_realized() {
    let t = Tensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2]).unwrap();

    assert!(t.is_realized());
    assert_eq!(t.dtype(), DType::Float64);
    assert!(t.schedule().unwrap().is_empty());
    assert_eq!(t.to_vec::<f64>().unwrap(), [1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_invalid_shapes() {
    assert!(matches!(Tensor::zeros(&[2, 0]), Err(crate::Error::Ir { source: kiln_ir::Error::InvalidShape { .. } })));
    assert!(matches!(
        Tensor::from_slice(&[1.0f32, 2.0], &[3]),
        Err(crate::Error::Ir { source: kiln_ir::Error::DataLength { expected: 3, actual: 2, .. } })
    ));
}
