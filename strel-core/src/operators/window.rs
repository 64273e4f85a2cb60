use std::collections::VecDeque;

use ordered_float::NotNan;

use crate::domains::ValueDomain;
use crate::signal::Signal;

/// Lattice operation used to reduce the values inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reduction {
    Meet,
    Join,
}

impl Reduction {
    pub(crate) fn identity<D: ValueDomain>(self, domain: &D) -> D::Value {
        match self {
            Self::Meet => domain.max(),
            Self::Join => domain.min(),
        }
    }

    pub(crate) fn combine<D: ValueDomain>(self, domain: &D, left: &D::Value, right: &D::Value) -> D::Value {
        match self {
            Self::Meet => domain.conjunction(left, right),
            Self::Join => domain.disjunction(left, right),
        }
    }

    /// True if `old` can never be the result of the reduction while `new` is in the window.
    fn dominated<D: ValueDomain>(self, domain: &D, old: &D::Value, new: &D::Value) -> bool {
        match self {
            Self::Meet => domain.less_or_equal(new, old),
            Self::Join => domain.less_or_equal(old, new),
        }
    }
}

/// Direction of the window relative to the evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Window `[t + lower, t + upper]`
    Future,

    /// Window `[t - upper, t - lower]`
    Past,
}

/// Deque of the segments that can still be the extremum of the window.
///
/// Segments enter at the back and expire from the front in index order. Entering a segment evicts
/// every candidate at the back that it dominates, so for totally ordered domains the deque is
/// monotone and its front is the extremum.
struct MonotonicWindow<'a, D: ValueDomain> {
    domain: &'a D,
    reduction: Reduction,
    candidates: VecDeque<(usize, D::Value)>,
}

impl<'a, D: ValueDomain> MonotonicWindow<'a, D> {
    fn new(domain: &'a D, reduction: Reduction) -> Self {
        Self {
            domain,
            reduction,
            candidates: VecDeque::new(),
        }
    }

    fn push(&mut self, index: usize, value: &D::Value) {
        while let Some((_, back)) = self.candidates.back() {
            if self.reduction.dominated(self.domain, back, value) {
                self.candidates.pop_back();
            } else {
                break;
            }
        }

        self.candidates.push_back((index, value.clone()));
    }

    fn expire(&mut self, index: usize) {
        if matches!(self.candidates.front(), Some((front, _)) if *front == index) {
            self.candidates.pop_front();
        }
    }

    fn value(&self) -> D::Value {
        if self.domain.is_totally_ordered() {
            if let Some((_, front)) = self.candidates.front() {
                return front.clone();
            }
        }

        self.candidates
            .iter()
            .fold(self.reduction.identity(self.domain), |acc, (_, value)| {
                self.reduction.combine(self.domain, &acc, value)
            })
    }
}

/// Reduce every window `[t + lower, t + upper]` (future) or `[t - upper, t - lower]` (past) of the
/// signal with the given lattice operation. The bounds must be finite.
///
/// A segment `[s_i, s_{i+1})` of the input contributes to the output for the times
/// `[s_i - upper, s_{i+1} - lower)` in the future direction and `[s_i + lower, s_{i+1} + upper)` in
/// the past direction. Both the activation and the expiration times increase with the segment
/// index, so the active segments can be tracked with a two-pointer sweep over a
/// [`MonotonicWindow`]. The last segment never expires since it also holds at the end time.
///
/// The output is defined on `[start, end - upper]` for the future direction and
/// `[start + upper, end]` for the past direction, and is empty if the window does not fit inside
/// the signal.
pub(crate) fn sliding_window<D>(
    domain: &D,
    signal: &Signal<D::Value>,
    lower: f64,
    upper: f64,
    direction: Direction,
    reduction: Reduction,
) -> Signal<D::Value>
where
    D: ValueDomain,
{
    if signal.is_empty() {
        return Signal::new();
    }

    let (first, last) = match direction {
        Direction::Future => (signal.start_unchecked(), signal.end_unchecked() - upper),
        Direction::Past => (signal.start_unchecked() + upper, signal.end_unchecked()),
    };

    if first > last {
        return Signal::new();
    }

    let segments = signal.segments();
    let count = segments.len();
    let start_of = |index: usize| segments[index].start_time();

    let activation = |index: usize| -> NotNan<f64> {
        match direction {
            Direction::Future => start_of(index) - upper,
            Direction::Past => start_of(index) + lower,
        }
    };

    let expiration = |index: usize| -> Option<NotNan<f64>> {
        if index + 1 == count {
            return None;
        }

        match direction {
            Direction::Future => Some(start_of(index + 1) - lower),
            Direction::Past => Some(start_of(index + 1) + upper),
        }
    };

    let advance = |time: NotNan<f64>, window: &mut MonotonicWindow<D>, entering: &mut usize, leaving: &mut usize| {
        while *entering < count && activation(*entering) <= time {
            window.push(*entering, segments[*entering].value());
            *entering += 1;
        }

        while *leaving < *entering && expiration(*leaving).map_or(false, |expires| expires <= time) {
            window.expire(*leaving);
            *leaving += 1;
        }
    };

    let mut window = MonotonicWindow::new(domain, reduction);
    let mut entering = 0;
    let mut leaving = 0;
    let mut result = Signal::new();

    advance(first, &mut window, &mut entering, &mut leaving);
    result.append(first, window.value());

    loop {
        let next_activation = (entering < count).then(|| activation(entering));
        let next_expiration = if leaving < count { expiration(leaving) } else { None };
        let next = match (next_activation, next_expiration) {
            (Some(a), Some(e)) => a.min(e),
            (Some(a), None) => a,
            (None, Some(e)) => e,
            (None, None) => break,
        };

        if next > last {
            break;
        }

        advance(next, &mut window, &mut entering, &mut leaving);
        result.append(next, window.value());
    }

    result.close(last)
}

#[cfg(test)]
mod tests {
    use super::{sliding_window, Direction, Reduction};
    use crate::domains::{IntervalDomain, RobustnessDomain, RobustnessInterval};
    use crate::signal::Signal;

    #[test]
    fn future_join() {
        let input = Signal::from([(0, 4.0), (1, 2.0), (2, 1.0), (3, 5.0), (4, 3.0), (6, 3.0)]);
        let result = sliding_window(&RobustnessDomain, &input, 0.0, 2.0, Direction::Future, Reduction::Join);
        let expected = Signal::from([(0, 4.0), (1, 5.0), (4, 3.0)]);

        assert_eq!(result, expected);
    }

    #[test]
    fn future_meet_with_offset() {
        let input = Signal::from([(0, 4.0), (1, 2.0), (2, 3.0), (3, 1.0), (4, 3.0), (5, 3.0)]);
        let result = sliding_window(&RobustnessDomain, &input, 1.0, 2.0, Direction::Future, Reduction::Meet);

        // [t+1, t+2] must fully fit inside [0, 5]
        assert_eq!(result.start(), Some(0.0));
        assert_eq!(result.end(), Some(3.0));
        assert_eq!(result.value_at(0.0), Some(&2.0));
        assert_eq!(result.value_at(0.5), Some(&2.0));
        assert_eq!(result.value_at(1.0), Some(&1.0));
        assert_eq!(result.value_at(2.5), Some(&1.0));
        assert_eq!(result.value_at(3.0), Some(&3.0));
    }

    #[test]
    fn past_join() {
        let input = Signal::from([(0, 1.0), (1, 3.0), (2, 0.0), (3, 0.0), (5, 0.0)]);
        let result = sliding_window(&RobustnessDomain, &input, 0.0, 1.0, Direction::Past, Reduction::Join);

        assert_eq!(result.start(), Some(1.0));
        assert_eq!(result.end(), Some(5.0));
        assert_eq!(result.value_at(1.0), Some(&3.0));
        assert_eq!(result.value_at(2.9), Some(&3.0));
        assert_eq!(result.value_at(3.0), Some(&0.0));
    }

    #[test]
    fn window_longer_than_signal() {
        let input = Signal::from([(0, 1.0), (1, 2.0)]);
        let result = sliding_window(&RobustnessDomain, &input, 0.0, 1.5, Direction::Future, Reduction::Join);

        assert!(result.is_empty());
    }

    #[test]
    fn partial_order_folds_candidates() {
        let input = Signal::from([
            (0, RobustnessInterval::new(0.0, 3.0)),
            (1, RobustnessInterval::new(1.0, 2.0)),
            (2, RobustnessInterval::new(-1.0, -1.0)),
            (3, RobustnessInterval::new(-1.0, -1.0)),
        ]);
        let result = sliding_window(&IntervalDomain, &input, 0.0, 1.0, Direction::Future, Reduction::Join);

        assert_eq!(result.value_at(0.0), Some(&RobustnessInterval::new(1.0, 3.0)));
        assert_eq!(result.value_at(1.0), Some(&RobustnessInterval::new(1.0, 2.0)));
        assert_eq!(result.value_at(2.0), Some(&RobustnessInterval::new(-1.0, -1.0)));
    }
}
