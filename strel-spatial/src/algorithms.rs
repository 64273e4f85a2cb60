//! Spatial operators evaluated at a single instant.
//!
//! Every function in this module takes the values of its operands at every location of a model
//! and returns the value of the operator at every location. The model is represented by a
//! finished [`DistanceStructure`], which is only read, so the per-location computations are
//! independent and run in parallel when the `parallel` feature is enabled.
//!
//! | operator           | value at location `i`                                                                  |
//! | ------------------ | -------------------------------------------------------------------------------------- |
//! | [`everywhere`]     | conjunction of `phi(j)` over every `j` within bounds from `i`                           |
//! | [`somewhere`]      | disjunction of `phi(j)` over every `j` within bounds from `i`                           |
//! | [`reach`]          | best route from `i` to some `j` satisfying `right`, within bounds, through `left`       |
//! | [`escape`]         | best route from `i` to some `j` within bounds, with `phi` holding along the whole route |
use std::collections::VecDeque;

use strel_core::domains::ValueDomain;
use tracing::trace;

use crate::distance::DistanceDomain;
use crate::structure::DistanceStructure;

#[cfg(feature = "parallel")]
fn per_location<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    use rayon::prelude::*;

    (0..size).into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn per_location<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    (0..size).map(f).collect()
}

/// Require the values to hold at every location within bounds.
///
/// A location without any other location within bounds evaluates to the top of the domain.
pub fn everywhere<V, D>(domain: &V, structure: &DistanceStructure<D>, values: &[V::Value]) -> Vec<V::Value>
where
    V: ValueDomain + Sync,
    V::Value: Send + Sync,
    D: DistanceDomain + Sync,
    D::Value: Sync,
{
    per_location(structure.size(), |location| {
        structure
            .targets(location)
            .into_iter()
            .fold(domain.max(), |acc, target| domain.conjunction(&acc, &values[target]))
    })
}

/// Require the values to hold at some location within bounds.
///
/// A location without any other location within bounds evaluates to the bottom of the domain.
pub fn somewhere<V, D>(domain: &V, structure: &DistanceStructure<D>, values: &[V::Value]) -> Vec<V::Value>
where
    V: ValueDomain + Sync,
    V::Value: Send + Sync,
    D: DistanceDomain + Sync,
    D::Value: Sync,
{
    per_location(structure.size(), |location| {
        structure
            .targets(location)
            .into_iter()
            .fold(domain.min(), |acc, target| domain.disjunction(&acc, &values[target]))
    })
}

/// Require a route from the location to a location satisfying `right`, such that `left` holds at
/// every location of the route before the last one and the length of the route is within the
/// bounds of the structure.
///
/// Routes are explored backwards from every location, keeping for each location the best value
/// found for every distinct route length. A label is only propagated again when its value strictly
/// improves. When the upper bound is infinite, lengths beyond the lower bound are merged into the
/// lower bound so that the number of labels stays finite.
pub fn reach<V, D>(
    domain: &V,
    structure: &DistanceStructure<D>,
    left: &[V::Value],
    right: &[V::Value],
) -> Vec<V::Value>
where
    V: ValueDomain + Sync,
    V::Value: Send + Sync,
    D: DistanceDomain + Sync,
    D::Value: Sync,
{
    let distances = structure.domain();
    let lower = structure.lower();
    let upper = structure.upper();
    let unbounded = structure.is_unbounded();
    let size = structure.size();

    let mut labels: Vec<Vec<(D::Value, V::Value)>> = (0..size)
        .map(|location| vec![(distances.zero(), right[location].clone())])
        .collect();

    let mut queue: VecDeque<(usize, D::Value, V::Value)> = (0..size)
        .map(|location| (location, distances.zero(), right[location].clone()))
        .collect();

    while let Some((location, length, value)) = queue.pop_front() {
        for (source, weight) in structure.previous(location) {
            let mut extended = distances.sum(weight, &length);

            if distances.less(upper, &extended) {
                continue;
            }

            if unbounded && distances.less_or_equal(lower, &extended) {
                extended = lower.clone();
            }

            let candidate = domain.conjunction(&value, &left[*source]);
            let entry = labels[*source]
                .iter_mut()
                .find(|(known, _)| distances.equal_to(known, &extended));

            let improved = match entry {
                Some((_, known)) => {
                    let joined = domain.disjunction(known, &candidate);

                    if domain.equal_to(&joined, known) {
                        None
                    } else {
                        *known = joined.clone();
                        Some(joined)
                    }
                }
                None => {
                    labels[*source].push((extended.clone(), candidate.clone()));
                    Some(candidate)
                }
            };

            if let Some(improved) = improved {
                queue.push_back((*source, extended, improved));
            }
        }
    }

    per_location(size, |location| {
        labels[location]
            .iter()
            .filter(|(length, _)| structure.in_bounds(length))
            .fold(domain.min(), |acc, (_, value)| domain.disjunction(&acc, value))
    })
}

/// Require a route from the location to a location within bounds, such that the values hold at
/// every location of the route.
///
/// The best route between every pair of locations is computed with full relaxation passes over
/// the edges of the model until a pass does not change any value.
pub fn escape<V, D>(domain: &V, structure: &DistanceStructure<D>, values: &[V::Value]) -> Vec<V::Value>
where
    V: ValueDomain + Sync,
    V::Value: Send + Sync,
    D: DistanceDomain + Sync,
    D::Value: Sync,
{
    let size = structure.size();
    let mut routes: Vec<Vec<V::Value>> = (0..size)
        .map(|from| {
            (0..size)
                .map(|to| if from == to { values[from].clone() } else { domain.min() })
                .collect()
        })
        .collect();

    let mut passes = 0usize;
    let mut changed = true;

    while changed {
        changed = false;
        passes += 1;

        for location in 0..size {
            for (source, _) in structure.previous(location) {
                for target in 0..size {
                    let extended = domain.conjunction(&values[*source], &routes[location][target]);
                    let joined = domain.disjunction(&routes[*source][target], &extended);

                    if !domain.equal_to(&joined, &routes[*source][target]) {
                        routes[*source][target] = joined;
                        changed = true;
                    }
                }
            }
        }
    }

    trace!(passes, "escape reached a fixpoint");

    per_location(size, |location| {
        structure
            .targets(location)
            .into_iter()
            .fold(domain.min(), |acc, target| domain.disjunction(&acc, &routes[location][target]))
    })
}
