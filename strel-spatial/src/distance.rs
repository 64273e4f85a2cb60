//! Algebras for measuring the length of routes between locations.
//!
//! Edge labels of a [`SpatialModel`](crate::model::SpatialModel) are turned into distances by a
//! user supplied function, and a [`DistanceDomain`] describes how distances accumulate along a
//! route and how they are compared. Distances are kept separate from the
//! [`ValueDomain`](strel_core::domains::ValueDomain) of the monitor since the two are usually
//! different algebras, for example hop counts and robustness values.
use std::fmt::Debug;

/// Ordered monoid of route lengths.
///
/// `zero` is the length of the empty route, `sum` must be associative and monotone, and
/// `infinity` must be greater than or equal to every other distance.
pub trait DistanceDomain {
    type Value: Clone + PartialEq + Debug;

    fn zero(&self) -> Self::Value;

    fn infinity(&self) -> Self::Value;

    fn sum(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    fn less(&self, left: &Self::Value, right: &Self::Value) -> bool;

    fn equal_to(&self, left: &Self::Value, right: &Self::Value) -> bool {
        left == right
    }

    fn less_or_equal(&self, left: &Self::Value, right: &Self::Value) -> bool {
        self.less(left, right) || self.equal_to(left, right)
    }

    /// Smallest distance that is not below the given lower bound of an operator.
    fn lower_bound(&self, bound: f64) -> Self::Value;

    /// Greatest distance that is not above the given upper bound of an operator. An infinite
    /// bound maps to [`DistanceDomain::infinity`].
    fn upper_bound(&self, bound: f64) -> Self::Value;
}

/// Real valued distances, such as the euclidean length of the edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleDistance;

impl DistanceDomain for DoubleDistance {
    type Value = f64;

    fn zero(&self) -> f64 {
        0.0
    }

    fn infinity(&self) -> f64 {
        f64::INFINITY
    }

    fn sum(&self, left: &f64, right: &f64) -> f64 {
        left + right
    }

    fn less(&self, left: &f64, right: &f64) -> bool {
        left < right
    }

    fn less_or_equal(&self, left: &f64, right: &f64) -> bool {
        left <= right
    }

    fn lower_bound(&self, bound: f64) -> f64 {
        bound
    }

    fn upper_bound(&self, bound: f64) -> f64 {
        bound
    }
}

/// Integer distances, most commonly the number of hops of a route.
///
/// Sums saturate at [`u64::MAX`], which plays the role of infinity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerDistance;

impl DistanceDomain for IntegerDistance {
    type Value = u64;

    fn zero(&self) -> u64 {
        0
    }

    fn infinity(&self) -> u64 {
        u64::MAX
    }

    fn sum(&self, left: &u64, right: &u64) -> u64 {
        left.saturating_add(*right)
    }

    fn less(&self, left: &u64, right: &u64) -> bool {
        left < right
    }

    fn less_or_equal(&self, left: &u64, right: &u64) -> bool {
        left <= right
    }

    fn lower_bound(&self, bound: f64) -> u64 {
        bound.ceil() as u64
    }

    fn upper_bound(&self, bound: f64) -> u64 {
        if bound.is_finite() {
            bound.floor() as u64
        } else {
            u64::MAX
        }
    }
}
