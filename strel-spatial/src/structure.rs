use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::distance::DistanceDomain;
use crate::model::SpatialModel;

/// Bounded distances between every pair of locations of a [`SpatialModel`].
///
/// The distance from `i` to `j` is the length of the shortest route from `i` to `j` following
/// the direction of the edges, measured in a [`DistanceDomain`]. Only the distances that do not
/// exceed the upper bound are stored, every other pair is treated as unreachable.
///
/// Since the order of a distance domain is only required to be compatible with `sum`, the
/// distances are computed with a label-correcting relaxation rather than Dijkstra's algorithm:
/// for every target location a worklist is seeded with the target itself and locations are
/// re-examined every time their distance strictly improves.
///
/// # Examples
///
/// ```rust
/// use strel_spatial::distance::DoubleDistance;
/// use strel_spatial::model::SpatialModel;
/// use strel_spatial::structure::DistanceStructure;
///
/// let model = SpatialModel::from_edges(3, [(0, 1.0, 1), (1, 1.0, 2), (2, 1.0, 0)]).unwrap();
/// let structure = DistanceStructure::new(&model, |w: &f64| *w, DoubleDistance, 0.0, 1.0);
///
/// assert!(structure.check_distance(0, 1));
/// assert!(!structure.check_distance(0, 2));
/// assert_eq!(structure.distance(2, 0), Some(&1.0));
/// ```
#[derive(Debug, Clone)]
pub struct DistanceStructure<D>
where
    D: DistanceDomain,
{
    domain: D,
    lower: D::Value,
    upper: D::Value,
    previous: Vec<Vec<(usize, D::Value)>>,
    distances: Vec<HashMap<usize, D::Value>>,
}

impl<D> DistanceStructure<D>
where
    D: DistanceDomain,
{
    /// Compute the distances between the locations of `model` up to `upper`, measuring every
    /// edge with `distance`. Pairs are considered within bounds if their distance lies in the
    /// closed interval `[lower, upper]`.
    pub fn new<E, F>(model: &SpatialModel<E>, distance: F, domain: D, lower: D::Value, upper: D::Value) -> Self
    where
        F: Fn(&E) -> D::Value,
    {
        let size = model.size();
        let previous: Vec<Vec<(usize, D::Value)>> = (0..size)
            .map(|location| {
                model
                    .previous(location)
                    .map(|(source, label)| (source, distance(label)))
                    .collect()
            })
            .collect();

        let mut distances = vec![HashMap::new(); size];

        for target in 0..size {
            let mut best: Vec<Option<D::Value>> = vec![None; size];
            let mut queue = VecDeque::from([target]);
            best[target] = Some(domain.zero());

            while let Some(location) = queue.pop_front() {
                let current = match &best[location] {
                    Some(current) => current.clone(),
                    None => continue,
                };

                for (source, weight) in &previous[location] {
                    let candidate = domain.sum(weight, &current);

                    if domain.less(&upper, &candidate) {
                        continue;
                    }

                    let improves = match &best[*source] {
                        Some(known) => domain.less(&candidate, known),
                        None => true,
                    };

                    if improves {
                        best[*source] = Some(candidate);
                        queue.push_back(*source);
                    }
                }
            }

            for (source, value) in best.into_iter().enumerate() {
                if let Some(value) = value {
                    distances[source].insert(target, value);
                }
            }
        }

        let pairs: usize = distances.iter().map(HashMap::len).sum();
        debug!(locations = size, pairs, "built distance structure");

        Self {
            domain,
            lower,
            upper,
            previous,
            distances,
        }
    }

    /// Number of locations of the model the structure was built from.
    pub fn size(&self) -> usize {
        self.distances.len()
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn lower(&self) -> &D::Value {
        &self.lower
    }

    pub fn upper(&self) -> &D::Value {
        &self.upper
    }

    /// Whether the upper bound of the structure is the infinity of its domain.
    pub fn is_unbounded(&self) -> bool {
        self.domain.equal_to(&self.upper, &self.domain.infinity())
    }

    /// Distance from `from` to `to`, or [`None`] if `to` cannot be reached without exceeding the
    /// upper bound.
    pub fn distance(&self, from: usize, to: usize) -> Option<&D::Value> {
        self.distances.get(from).and_then(|row| row.get(&to))
    }

    /// Whether the distance from `from` to `to` lies in `[lower, upper]`.
    pub fn check_distance(&self, from: usize, to: usize) -> bool {
        self.distance(from, to)
            .map_or(false, |distance| self.in_bounds(distance))
    }

    /// Whether a distance lies in `[lower, upper]`.
    pub fn in_bounds(&self, distance: &D::Value) -> bool {
        self.domain.less_or_equal(&self.lower, distance) && self.domain.less_or_equal(distance, &self.upper)
    }

    /// Locations within bounds from `from`, in increasing order.
    pub fn targets(&self, from: usize) -> Vec<usize> {
        let mut targets: Vec<usize> = self.distances[from]
            .iter()
            .filter(|(_, distance)| self.in_bounds(distance))
            .map(|(target, _)| *target)
            .collect();

        targets.sort_unstable();
        targets
    }

    /// Edges into `location` as `(source, distance)` pairs.
    pub(crate) fn previous(&self, location: usize) -> &[(usize, D::Value)] {
        &self.previous[location]
    }
}

#[cfg(test)]
mod tests {
    use super::DistanceStructure;
    use crate::distance::{DoubleDistance, IntegerDistance};
    use crate::model::SpatialModel;

    fn ring() -> SpatialModel<f64> {
        SpatialModel::from_edges(3, [(0, 1.0, 1), (1, 1.0, 2), (2, 1.0, 0)]).unwrap()
    }

    #[test]
    fn directed_ring() {
        let structure = DistanceStructure::new(&ring(), |w: &f64| *w, DoubleDistance, 0.0, 1.0);

        assert_eq!(structure.distance(0, 0), Some(&0.0));
        assert_eq!(structure.distance(0, 1), Some(&1.0));
        assert_eq!(structure.distance(1, 2), Some(&1.0));
        assert_eq!(structure.distance(2, 0), Some(&1.0));
        assert_eq!(structure.distance(0, 2), None);
        assert_eq!(structure.distance(1, 0), None);
        assert_eq!(structure.targets(0), vec![0, 1]);
    }

    #[test]
    fn lower_bound_is_inclusive() {
        let structure = DistanceStructure::new(&ring(), |w: &f64| *w, DoubleDistance, 1.0, f64::INFINITY);

        assert!(!structure.check_distance(0, 0));
        assert!(structure.check_distance(0, 1));
        assert!(structure.check_distance(0, 2));
        assert_eq!(structure.distance(1, 0), Some(&2.0));
        assert!(structure.is_unbounded());
    }

    #[test]
    fn relaxation_finds_shorter_routes() {
        // The direct edge 0 -> 3 is longer than the route through 1 and 2
        let model = SpatialModel::from_edges(4, [(0, 10.0, 3), (0, 1.0, 1), (1, 1.0, 2), (2, 1.0, 3)]).unwrap();
        let structure = DistanceStructure::new(&model, |w: &f64| *w, DoubleDistance, 0.0, f64::INFINITY);

        assert_eq!(structure.distance(0, 3), Some(&3.0));
        assert_eq!(structure.distance(3, 0), None);
    }

    #[test]
    fn hop_counts() {
        let model = SpatialModel::undirected(4, [(0, 7.5, 1), (1, 0.5, 2), (2, 2.0, 3)]).unwrap();
        let structure = DistanceStructure::new(&model, |_: &f64| 1u64, IntegerDistance, 0, 2);

        assert_eq!(structure.distance(0, 2), Some(&2));
        assert_eq!(structure.distance(0, 3), None);
        assert_eq!(structure.targets(1), vec![0, 1, 2, 3]);
    }
}
