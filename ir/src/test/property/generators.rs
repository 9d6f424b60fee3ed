//! Generators for shapes and broadcast targets.

use proptest::prelude::*;

use crate::Shape;

/// Shapes of rank 1..=4 with small positive dimensions.
pub fn arb_shape() -> impl Strategy<Value = Shape> {
    prop::collection::vec(1usize..=5, 1..=4).prop_map(Shape::from_vec)
}

/// A shape with some dimensions collapsed to 1, and a target that broadcasts them.
pub fn arb_broadcast() -> impl Strategy<Value = (Shape, Shape)> {
    arb_shape().prop_flat_map(|target| {
        let rank = target.len();
        prop::collection::vec(any::<bool>(), rank).prop_map(move |mask| {
            let source = target.iter().zip(&mask).map(|(&d, &keep)| if keep { d } else { 1 }).collect();
            (source, target.clone())
        })
    })
}
