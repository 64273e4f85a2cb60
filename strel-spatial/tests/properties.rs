//! Property-based tests for distance structures and spatial operators.
//!
//! Models are generated with integer weights so that distances compare exactly.

use proptest::prelude::*;
use strel_core::domains::{BooleanDomain, RobustnessDomain};
use strel_spatial::algorithms;
use strel_spatial::{DistanceStructure, DoubleDistance, IntegerDistance, SpatialModel};

fn undirected_models() -> impl Strategy<Value = SpatialModel<f64>> {
    (2usize..7).prop_flat_map(|size| {
        prop::collection::vec((0..size, 1u32..5, 0..size), 0..12).prop_map(move |edges| {
            SpatialModel::undirected(size, edges.into_iter().map(|(from, w, to)| (from, f64::from(w), to))).unwrap()
        })
    })
}

fn directed_models() -> impl Strategy<Value = SpatialModel<f64>> {
    (2usize..7).prop_flat_map(|size| {
        prop::collection::vec((0..size, 1u32..5, 0..size), 0..12).prop_map(move |edges| {
            SpatialModel::from_edges(size, edges.into_iter().map(|(from, w, to)| (from, f64::from(w), to))).unwrap()
        })
    })
}

fn values(size: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-10i32..10).prop_map(f64::from), size)
}

proptest! {
    /// dist(i, j) = dist(j, i) when every edge goes both ways
    #[test]
    fn prop_distance_symmetry(model in undirected_models()) {
        let structure = DistanceStructure::new(&model, |w: &f64| *w, DoubleDistance, 0.0, f64::INFINITY);

        for from in 0..model.size() {
            for to in 0..model.size() {
                prop_assert_eq!(structure.distance(from, to), structure.distance(to, from));
            }
        }
    }

    /// dist(i, k) <= dist(i, j) + dist(j, k)
    #[test]
    fn prop_triangle_inequality(model in directed_models()) {
        let structure = DistanceStructure::new(&model, |w: &f64| *w, DoubleDistance, 0.0, f64::INFINITY);
        let size = model.size();

        for (i, j, k) in (0..size).flat_map(|i| (0..size).flat_map(move |j| (0..size).map(move |k| (i, j, k)))) {
            if let (Some(first), Some(second)) = (structure.distance(i, j), structure.distance(j, k)) {
                let direct = structure.distance(i, k).copied().unwrap_or(f64::INFINITY);
                prop_assert!(direct <= first + second);
            }
        }
    }

    /// Widening the upper bound never makes reach false
    #[test]
    fn prop_reach_monotone_in_upper_bound(
        (model, left, right) in directed_models().prop_flat_map(|model| {
            let size = model.size();
            (Just(model), prop::collection::vec(any::<bool>(), size), prop::collection::vec(any::<bool>(), size))
        }),
        upper in 0u64..4,
    ) {
        let narrow = DistanceStructure::new(&model, |_: &f64| 1u64, IntegerDistance, 0, upper);
        let wide = DistanceStructure::new(&model, |_: &f64| 1u64, IntegerDistance, 0, upper + 1);
        let narrow = algorithms::reach(&BooleanDomain, &narrow, &left, &right);
        let wide = algorithms::reach(&BooleanDomain, &wide, &left, &right);

        for (n, w) in narrow.iter().zip(wide.iter()) {
            prop_assert!(!n || *w);
        }
    }

    /// everywhere <= phi <= somewhere when every location is within bounds of itself
    #[test]
    fn prop_everywhere_below_somewhere(
        (model, phi) in directed_models().prop_flat_map(|model| {
            let size = model.size();
            (Just(model), values(size))
        }),
    ) {
        let structure = DistanceStructure::new(&model, |w: &f64| *w, DoubleDistance, 0.0, 3.0);
        let everywhere = algorithms::everywhere(&RobustnessDomain, &structure, &phi);
        let somewhere = algorithms::somewhere(&RobustnessDomain, &structure, &phi);

        for location in 0..model.size() {
            prop_assert!(everywhere[location] <= phi[location]);
            prop_assert!(phi[location] <= somewhere[location]);
        }
    }

    /// escape without a lower bound is the value at the location itself
    #[test]
    fn prop_escape_from_zero(
        (model, phi) in undirected_models().prop_flat_map(|model| {
            let size = model.size();
            (Just(model), values(size))
        }),
    ) {
        let structure = DistanceStructure::new(&model, |w: &f64| *w, DoubleDistance, 0.0, f64::INFINITY);

        prop_assert_eq!(algorithms::escape(&RobustnessDomain, &structure, &phi), phi);
    }
}
