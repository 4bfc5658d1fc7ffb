//! Fitness functions the swarm maximises.

use crate::core::range::RangeValue;
use std::sync::Arc;

/// Pluggable fitness. Higher is better.
///
/// Implementations must be pure: the same position always scores the same.
/// A position that cannot be scored returns `f32::NEG_INFINITY`.
pub trait Objective: Send + Sync {
    fn fitness(&self, position: &[RangeValue]) -> f32;
}

impl<O: Objective + ?Sized> Objective for Arc<O> {
    fn fitness(&self, position: &[RangeValue]) -> f32 {
        (**self).fitness(position)
    }
}

impl<O: Objective + ?Sized> Objective for &O {
    fn fitness(&self, position: &[RangeValue]) -> f32 {
        (**self).fitness(position)
    }
}

/// Benchmark landscape: sum of squared coordinates.
///
/// Maximised at the corner of the box furthest from the origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumOfSquares;

impl Objective for SumOfSquares {
    fn fitness(&self, position: &[RangeValue]) -> f32 {
        position.iter().map(|v| v.value() * v.value()).sum()
    }
}
