use ordered_float::NotNan;

use super::window::{sliding_window, Direction, Reduction};
use super::{advance, Window};
use crate::domains::ValueDomain;
use crate::formula::Interval;
use crate::signal::Signal;

fn suffix<D>(domain: &D, signal: &Signal<D::Value>, lower: f64, reduction: Reduction) -> Signal<D::Value>
where
    D: ValueDomain,
{
    let (start, end) = match (signal.start(), signal.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => return Signal::new(),
    };

    signal
        .fold_backward(reduction.identity(domain), |value, acc| reduction.combine(domain, value, acc))
        .shift(-lower)
        .restrict(start, end - lower)
}

/// Require the signal to hold at some time in the future, written `F` or `<>`.
///
/// The value at time `t` is the disjunction of the values over `[t + a, t + b]`. The bounded
/// operator is computed with a sliding window in a single pass over the signal:
///
/// | time | subformula | eventually | eventually\[0,2\] |
/// | ---- | ---------- | ---------- | ----------------- |
/// | 0.0  |        4.0 |        5.0 |               4.0 |
/// | 1.0  |        2.0 |        5.0 |               5.0 |
/// | 2.0  |        1.0 |        5.0 |               5.0 |
/// | 3.0  |        5.0 |        5.0 |                   |
/// | 4.0  |        3.0 |        3.0 |                   |
pub fn eventually<D>(domain: &D, signal: &Signal<D::Value>, interval: Option<Interval>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    match Window::from(interval) {
        Window::Bounded(a, b) => sliding_window(domain, signal, a, b, Direction::Future, Reduction::Join),
        Window::Unbounded(a) => suffix(domain, signal, a, Reduction::Join),
    }
}

/// Require the signal to hold at every time in the future, written `G` or `[]`.
///
/// The value at time `t` is the conjunction of the values over `[t + a, t + b]`.
pub fn globally<D>(domain: &D, signal: &Signal<D::Value>, interval: Option<Interval>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    match Window::from(interval) {
        Window::Bounded(a, b) => sliding_window(domain, signal, a, b, Direction::Future, Reduction::Meet),
        Window::Unbounded(a) => suffix(domain, signal, a, Reduction::Meet),
    }
}

/// Require the right signal to hold at some time in the future and the left signal to hold from
/// the current time up to and including that time, written `U`.
///
/// The value at time `t` is
///
/// ```text
/// sup { min(right(τ), inf { left(σ) | σ ∈ [t, τ] }) | τ ∈ [t + a, t + b] }
/// ```
///
/// Both signals are evaluated on the intersection of their domains, which is then shrunk like
/// the other future operators.
pub fn until<D>(
    domain: &D,
    left: &Signal<D::Value>,
    right: &Signal<D::Value>,
    interval: Option<Interval>,
) -> Signal<D::Value>
where
    D: ValueDomain,
{
    let pairs = left.merge(right, |l, r| (l.clone(), r.clone()));

    if pairs.is_empty() {
        return Signal::new();
    }

    match Window::from(interval) {
        Window::Bounded(a, b) => bounded_until(domain, &pairs, a, b),
        Window::Unbounded(a) => unbounded_until(domain, &pairs, a),
    }
}

/// Witness scan over the merged signal.
///
/// The value at `t` only depends on the segments containing `t`, `t + a` and `t + b`, so it can
/// only change when one of these times crosses a segment start.
fn bounded_until<D>(domain: &D, pairs: &Signal<(D::Value, D::Value)>, a: f64, b: f64) -> Signal<D::Value>
where
    D: ValueDomain,
{
    let start = pairs.start_unchecked();
    let last = pairs.end_unchecked() - b;

    if start > last {
        return Signal::new();
    }

    let mut times: Vec<NotNan<f64>> = pairs
        .segments()
        .iter()
        .flat_map(|segment| {
            let time = segment.start_time();
            [time, time - a, time - b]
        })
        .filter(|time| *time >= start && *time <= last)
        .collect();

    times.push(start);
    times.sort_unstable();
    times.dedup();

    let segments = pairs.segments();
    let mut result = Signal::new();
    let (mut current, mut first_witness, mut last_witness) = (0, 0, 0);

    for time in times {
        advance(segments, &mut current, 0.0, time);
        advance(segments, &mut first_witness, -a, time);
        advance(segments, &mut last_witness, -b, time);

        let mut guard = domain.max();
        let mut best = domain.min();

        for index in current..=last_witness {
            let (l, r) = segments[index].value();
            guard = domain.conjunction(&guard, l);

            if index >= first_witness {
                best = domain.disjunction(&best, &domain.conjunction(r, &guard));
            }
        }

        result.append(time, best);
    }

    result.close(last)
}

/// `U_k = L_k /\ (R_k \/ U_{k+1})` gives the unbounded until starting at every segment. A positive
/// lower bound additionally requires the left signal to hold over `[t, t + a]`.
fn unbounded_until<D>(domain: &D, pairs: &Signal<(D::Value, D::Value)>, a: f64) -> Signal<D::Value>
where
    D: ValueDomain,
{
    let recurrence = pairs.fold_backward(domain.min(), |(l, r), acc| {
        domain.conjunction(l, &domain.disjunction(r, acc))
    });

    if a == 0.0 {
        return recurrence;
    }

    let left = pairs.map(|(l, _)| l.clone());
    let guard = sliding_window(domain, &left, 0.0, a, Direction::Future, Reduction::Meet);

    guard.merge(&recurrence.shift(-a), |g, u| domain.conjunction(g, u))
}

#[cfg(test)]
mod tests {
    use super::{eventually, globally, until};
    use crate::domains::{BooleanDomain, RobustnessDomain};
    use crate::formula::Interval;
    use crate::signal::Signal;

    fn input() -> Signal<f64> {
        Signal::from([(0, 4.0), (1, 2.0), (2, 1.0), (3, 5.0), (4, 3.0)])
    }

    #[test]
    fn unbounded_eventually() {
        let result = eventually(&RobustnessDomain, &input(), None);
        let expected = Signal::from([(0, 5.0), (4, 3.0)]);

        assert_eq!(result, expected);
    }

    #[test]
    fn bounded_eventually() {
        let interval = Interval::new(0.0, 2.0).unwrap();
        let result = eventually(&RobustnessDomain, &input(), Some(interval));
        let expected = Signal::from([(0, 4.0), (1, 5.0), (2, 5.0)]);

        assert_eq!(result, expected);
    }

    #[test]
    fn unbounded_globally() {
        let result = globally(&RobustnessDomain, &input(), None);
        let expected = Signal::from([(0, 1.0), (3, 3.0), (4, 3.0)]);

        assert_eq!(result, expected);
    }

    #[test]
    fn globally_with_lower_bound() {
        let interval = Interval::from_lower(2.0).unwrap();
        let result = globally(&RobustnessDomain, &input(), Some(interval));

        // G[2,inf) at t is the minimum over [t + 2, 4]
        assert_eq!(result.start(), Some(0.0));
        assert_eq!(result.end(), Some(2.0));
        assert_eq!(result.value_at(0.0), Some(&1.0));
        assert_eq!(result.value_at(1.5), Some(&3.0));
        assert_eq!(result.value_at(2.0), Some(&3.0));
    }

    #[test]
    fn window_longer_than_signal() {
        let interval = Interval::new(0.0, 10.0).unwrap();

        assert!(eventually(&RobustnessDomain, &input(), Some(interval)).is_empty());
        assert!(globally(&RobustnessDomain, &Signal::new(), None).is_empty());
    }

    #[test]
    fn bounded_until() {
        let left = Signal::from([(0, 3.0), (1, 2.0), (2, -1.0), (3, 4.0), (4, 4.0)]);
        let right = Signal::from([(0, -2.0), (1, 1.0), (2, -3.0), (3, 5.0), (4, 5.0)]);
        let interval = Interval::new(0.0, 2.0).unwrap();
        let result = until(&RobustnessDomain, &left, &right, Some(interval));

        // t = 0: witness at 1 gives min(1, 3, 2) = 1
        // t = 1: witness at 1 gives min(1, 2) = 1, witness at 3 is guarded by -1
        // t = 2: witness at 3 gives min(5, -1, 4) = -1
        assert_eq!(result.end(), Some(2.0));
        assert_eq!(result.value_at(0.0), Some(&1.0));
        assert_eq!(result.value_at(1.0), Some(&1.0));
        assert_eq!(result.value_at(2.0), Some(&-1.0));
    }

    #[test]
    fn until_breakpoints_follow_window_edges() {
        let left = Signal::from([(0, true), (10, true)]);
        let right = Signal::from([(0, false), (5, true), (6, false), (10, false)]);
        let interval = Interval::new(1.0, 2.0).unwrap();
        let result = until(&BooleanDomain, &left, &right, Some(interval));

        // right holds on [5, 6), reachable from t when [t + 1, t + 2] meets it
        let expected = Signal::from([(0, false), (3, true), (5, false), (8, false)]);
        assert_eq!(result, expected);
    }

    #[test]
    fn unbounded_until() {
        let left = Signal::from([(0, true), (2, false), (3, true), (6, true)]);
        let right = Signal::from([(0, false), (1, true), (2, false), (5, true), (6, true)]);
        let result = until(&BooleanDomain, &left, &right, None);

        let expected = Signal::from([(0, true), (2, false), (3, true), (6, true)]);
        assert_eq!(result, expected);
    }

    #[test]
    fn unbounded_until_with_lower_bound() {
        let left = Signal::from([(0, true), (2, false), (3, true), (6, true)]);
        let right = Signal::from([(0, false), (5, true), (6, true)]);
        let interval = Interval::from_lower(1.0).unwrap();
        let result = until(&BooleanDomain, &left, &right, Some(interval));

        // left must hold on [t, t + 1] and then until right holds on [5, 6]
        assert_eq!(result.start(), Some(0.0));
        assert_eq!(result.end(), Some(5.0));
        assert_eq!(result.value_at(0.0), Some(&false));
        assert_eq!(result.value_at(2.5), Some(&false));
        assert_eq!(result.value_at(3.0), Some(&true));
        assert_eq!(result.value_at(5.0), Some(&true));
    }

    #[test]
    fn bounded_until_with_fractional_times() {
        let left = Signal::constant(0.0, 2.0, f64::INFINITY).unwrap();
        let right = Signal::from([(0.0, 10.0), (0.9, -5.0), (2.0, -5.0)]);
        let interval = Interval::new(0.2, 0.5).unwrap();
        let result = until(&RobustnessDomain, &left, &right, Some(interval));

        // [0.8 + 0.2, 0.8 + 0.5] only covers the second segment
        assert_eq!(result.value_at(0.4), Some(&10.0));
        assert_eq!(result.value_at(0.8), Some(&-5.0));
        assert_eq!(result, eventually(&RobustnessDomain, &right, Some(interval)));
    }
}
