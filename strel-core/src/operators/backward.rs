use ordered_float::NotNan;

use super::window::{sliding_window, Direction, Reduction};
use super::{advance, Window};
use crate::domains::ValueDomain;
use crate::formula::Interval;
use crate::signal::Signal;

fn prefix<D>(domain: &D, signal: &Signal<D::Value>, lower: f64, reduction: Reduction) -> Signal<D::Value>
where
    D: ValueDomain,
{
    let (start, end) = match (signal.start(), signal.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => return Signal::new(),
    };

    signal
        .fold_forward(reduction.identity(domain), |value, acc| reduction.combine(domain, value, acc))
        .shift(lower)
        .restrict(start + lower, end)
}

/// Require the signal to have held at some time in the past, written `O`.
///
/// The value at time `t` is the disjunction of the values over `[t - b, t - a]`.
///
/// | time | subformula | once | once\[0,2\] |
/// | ---- | ---------- | ---- | ----------- |
/// | 0.0  |        1.0 |  1.0 |             |
/// | 1.0  |        3.0 |  3.0 |             |
/// | 2.0  |        0.0 |  3.0 |         3.0 |
/// | 3.0  |        0.0 |  3.0 |         3.0 |
/// | 4.0  |       -1.0 |  3.0 |         0.0 |
pub fn once<D>(domain: &D, signal: &Signal<D::Value>, interval: Option<Interval>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    match Window::from(interval) {
        Window::Bounded(a, b) => sliding_window(domain, signal, a, b, Direction::Past, Reduction::Join),
        Window::Unbounded(a) => prefix(domain, signal, a, Reduction::Join),
    }
}

/// Require the signal to have held at every time in the past, written `H`.
///
/// The value at time `t` is the conjunction of the values over `[t - b, t - a]`.
pub fn historically<D>(domain: &D, signal: &Signal<D::Value>, interval: Option<Interval>) -> Signal<D::Value>
where
    D: ValueDomain,
{
    match Window::from(interval) {
        Window::Bounded(a, b) => sliding_window(domain, signal, a, b, Direction::Past, Reduction::Meet),
        Window::Unbounded(a) => prefix(domain, signal, a, Reduction::Meet),
    }
}

/// Require the right signal to have held at some time in the past and the left signal to have
/// held from that time up to and including the current time, written `S`.
///
/// The value at time `t` is
///
/// ```text
/// sup { min(right(τ), inf { left(σ) | σ ∈ [τ, t] }) | τ ∈ [t - b, t - a] }
/// ```
pub fn since<D>(
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
        Window::Bounded(a, b) => bounded_since(domain, &pairs, a, b),
        Window::Unbounded(a) => unbounded_since(domain, &pairs, a),
    }
}

fn bounded_since<D>(domain: &D, pairs: &Signal<(D::Value, D::Value)>, a: f64, b: f64) -> Signal<D::Value>
where
    D: ValueDomain,
{
    let first = pairs.start_unchecked() + b;
    let end = pairs.end_unchecked();

    if first > end {
        return Signal::new();
    }

    let mut times: Vec<NotNan<f64>> = pairs
        .segments()
        .iter()
        .flat_map(|segment| {
            let time = segment.start_time();
            [time, time + a, time + b]
        })
        .filter(|time| *time >= first && *time <= end)
        .collect();

    times.push(first);
    times.sort_unstable();
    times.dedup();

    let segments = pairs.segments();
    let mut result = Signal::new();
    let (mut current, mut first_witness, mut last_witness) = (0, 0, 0);

    for time in times {
        advance(segments, &mut current, 0.0, time);
        advance(segments, &mut last_witness, a, time);
        advance(segments, &mut first_witness, b, time);

        let mut guard = domain.max();
        let mut best = domain.min();

        for index in (first_witness..=current).rev() {
            let (l, r) = segments[index].value();
            guard = domain.conjunction(&guard, l);

            if index <= last_witness {
                best = domain.disjunction(&best, &domain.conjunction(r, &guard));
            }
        }

        result.append(time, best);
    }

    result.close(end)
}

fn unbounded_since<D>(domain: &D, pairs: &Signal<(D::Value, D::Value)>, a: f64) -> Signal<D::Value>
where
    D: ValueDomain,
{
    let recurrence = pairs.fold_forward(domain.min(), |(l, r), acc| {
        domain.conjunction(l, &domain.disjunction(r, acc))
    });

    if a == 0.0 {
        return recurrence;
    }

    let left = pairs.map(|(l, _)| l.clone());
    let guard = sliding_window(domain, &left, 0.0, a, Direction::Past, Reduction::Meet);

    guard.merge(&recurrence.shift(a), |g, s| domain.conjunction(g, s))
}
