//! Algebraic domains of satisfaction values.
//!
//! Every operator of the logic is defined in terms of a small set of lattice operations over the
//! values produced by the atomic propositions. A [`ValueDomain`] collects these operations for one
//! type of value, so the same monitoring algorithms compute boolean verdicts, [robustness] values,
//! or robustness intervals depending on the domain they are given.
//!
//! A domain is passed to the algorithms explicitly as a value rather than derived from the value
//! type, which allows one value type to be used with different domains.
//!
//! [robustness]: https://link.springer.com/chapter/10.1007/11940197_12
//!
//! # Examples
//!
//! ```rust
//! use strel_core::domains::{BooleanDomain, RobustnessDomain, ValueDomain};
//!
//! assert!(!BooleanDomain.conjunction(&true, &false));
//! assert_eq!(RobustnessDomain.disjunction(&-1.0, &2.0), 2.0);
//! assert_eq!(RobustnessDomain.negation(&2.0), -2.0);
//! ```
use std::fmt::Debug;

/// Lattice operations over a set of satisfaction values.
///
/// Implementations should form a bounded lattice, where [`ValueDomain::min`] is the bottom,
/// [`ValueDomain::max`] is the top, conjunction is the meet and disjunction is the join.
/// Negation must reverse the order and be an involution, so that the De Morgan laws hold.
pub trait ValueDomain {
    type Value: Clone + PartialEq + Debug;

    /// Value that is smaller than every other value of the domain.
    fn min(&self) -> Self::Value;

    /// Value that is greater than every other value of the domain.
    fn max(&self) -> Self::Value;

    /// Greatest lower bound of two values.
    fn conjunction(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    /// Least upper bound of two values.
    fn disjunction(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    fn negation(&self, value: &Self::Value) -> Self::Value;

    fn equal_to(&self, left: &Self::Value, right: &Self::Value) -> bool {
        left == right
    }

    /// Lattice order derived from the conjunction.
    fn less_or_equal(&self, left: &Self::Value, right: &Self::Value) -> bool {
        self.equal_to(&self.conjunction(left, right), left)
    }

    /// Whether every pair of values is comparable.
    ///
    /// Windowed reductions rely on this to read the extremum of a window from a single candidate.
    fn is_totally_ordered(&self) -> bool {
        true
    }
}

impl<D> ValueDomain for &D
where
    D: ValueDomain + ?Sized,
{
    type Value = D::Value;

    fn min(&self) -> Self::Value {
        (**self).min()
    }

    fn max(&self) -> Self::Value {
        (**self).max()
    }

    fn conjunction(&self, left: &Self::Value, right: &Self::Value) -> Self::Value {
        (**self).conjunction(left, right)
    }

    fn disjunction(&self, left: &Self::Value, right: &Self::Value) -> Self::Value {
        (**self).disjunction(left, right)
    }

    fn negation(&self, value: &Self::Value) -> Self::Value {
        (**self).negation(value)
    }

    fn equal_to(&self, left: &Self::Value, right: &Self::Value) -> bool {
        (**self).equal_to(left, right)
    }

    fn less_or_equal(&self, left: &Self::Value, right: &Self::Value) -> bool {
        (**self).less_or_equal(left, right)
    }

    fn is_totally_ordered(&self) -> bool {
        (**self).is_totally_ordered()
    }
}

/// Classical two-valued semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanDomain;

impl ValueDomain for BooleanDomain {
    type Value = bool;

    fn min(&self) -> bool {
        false
    }

    fn max(&self) -> bool {
        true
    }

    fn conjunction(&self, left: &bool, right: &bool) -> bool {
        *left && *right
    }

    fn disjunction(&self, left: &bool, right: &bool) -> bool {
        *left || *right
    }

    fn negation(&self, value: &bool) -> bool {
        !*value
    }
}

/// Quantitative semantics where the sign of a value is the verdict and its magnitude the margin.
///
/// NaN values are propagated by both conjunction and disjunction so that problems in the atomic
/// functions surface in the result instead of being silently discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RobustnessDomain;

impl ValueDomain for RobustnessDomain {
    type Value = f64;

    fn min(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn max(&self) -> f64 {
        f64::INFINITY
    }

    fn conjunction(&self, left: &f64, right: &f64) -> f64 {
        if left.is_nan() || right.is_nan() {
            f64::NAN
        } else {
            f64::min(*left, *right)
        }
    }

    fn disjunction(&self, left: &f64, right: &f64) -> f64 {
        if left.is_nan() || right.is_nan() {
            f64::NAN
        } else {
            f64::max(*left, *right)
        }
    }

    fn negation(&self, value: &f64) -> f64 {
        -*value
    }

    fn less_or_equal(&self, left: &f64, right: &f64) -> bool {
        left <= right
    }
}

/// Closed interval of robustness values, used when the exact robustness is only known to lie
/// between two bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustnessInterval {
    pub lower: f64,
    pub upper: f64,
}

impl RobustnessInterval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Interval containing a single known value.
    pub fn exact(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl From<f64> for RobustnessInterval {
    fn from(value: f64) -> Self {
        Self::exact(value)
    }
}

/// Interval semantics, where every operation is applied to both bounds.
///
/// Intervals are ordered componentwise, which is not a total order: `[0, 3]` and `[1, 2]` are not
/// comparable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalDomain;

impl ValueDomain for IntervalDomain {
    type Value = RobustnessInterval;

    fn min(&self) -> RobustnessInterval {
        RobustnessInterval::exact(f64::NEG_INFINITY)
    }

    fn max(&self) -> RobustnessInterval {
        RobustnessInterval::exact(f64::INFINITY)
    }

    fn conjunction(&self, left: &RobustnessInterval, right: &RobustnessInterval) -> RobustnessInterval {
        RobustnessInterval {
            lower: RobustnessDomain.conjunction(&left.lower, &right.lower),
            upper: RobustnessDomain.conjunction(&left.upper, &right.upper),
        }
    }

    fn disjunction(&self, left: &RobustnessInterval, right: &RobustnessInterval) -> RobustnessInterval {
        RobustnessInterval {
            lower: RobustnessDomain.disjunction(&left.lower, &right.lower),
            upper: RobustnessDomain.disjunction(&left.upper, &right.upper),
        }
    }

    fn negation(&self, value: &RobustnessInterval) -> RobustnessInterval {
        RobustnessInterval {
            lower: -value.upper,
            upper: -value.lower,
        }
    }

    fn is_totally_ordered(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{BooleanDomain, IntervalDomain, RobustnessDomain, RobustnessInterval, ValueDomain};

    #[test]
    fn boolean() {
        let domain = BooleanDomain;

        assert!(domain.max());
        assert!(!domain.min());
        assert!(domain.disjunction(&false, &true));
        assert!(!domain.conjunction(&false, &true));
        assert!(domain.less_or_equal(&false, &true));
        assert!(!domain.less_or_equal(&true, &false));
    }

    #[test]
    fn robustness_propagates_nan() {
        let domain = RobustnessDomain;

        assert!(domain.conjunction(&f64::NAN, &1.0).is_nan());
        assert!(domain.disjunction(&1.0, &f64::NAN).is_nan());
        assert_eq!(domain.conjunction(&-1.0, &3.0), -1.0);
        assert_eq!(domain.negation(&domain.max()), domain.min());
    }

    #[test]
    fn interval_is_componentwise() {
        let domain = IntervalDomain;
        let a = RobustnessInterval::new(0.0, 3.0);
        let b = RobustnessInterval::new(1.0, 2.0);

        assert_eq!(domain.conjunction(&a, &b), RobustnessInterval::new(0.0, 2.0));
        assert_eq!(domain.disjunction(&a, &b), RobustnessInterval::new(1.0, 3.0));
        assert_eq!(domain.negation(&a), RobustnessInterval::new(-3.0, 0.0));
        assert!(!domain.less_or_equal(&a, &b));
        assert!(!domain.less_or_equal(&b, &a));
        assert!(!domain.is_totally_ordered());
    }
}
