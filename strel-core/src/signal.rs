//! Piecewise-constant values over time.
//!
//! A [`Signal`] is a sequence of segments, where each segment holds a single value from its
//! start time up to (but not including) the start time of the next segment. The last segment
//! holds its value up to and including the [`Signal::end`] time. In the context of this library
//! signals represent both the observed states of a system and the satisfaction values computed
//! from them.
//!
//! Signals are kept in canonical form: two consecutive segments never hold equal values. Adding a
//! value equal to the current one only extends the signal.
//!
//! # Safety
//!
//! Times are `f64` values, which do not implement `Ord` because of NaN. Times are stored as
//! [`NotNan`] values, so every fallible constructor rejects NaN with [`SignalError::NanTime`]
//! while the infallible conversions ([`FromIterator`], [`From`]) panic on invalid input.
//!
//! # Examples
//!
//! An empty `Signal` is created with [`Signal::new`] and extended with [`Signal::add`]:
//!
//! ```rust
//! use strel_core::Signal;
//!
//! let mut signal = Signal::new();
//! signal.add(0.0, 1.0).unwrap();
//! signal.add(1.0, 2.0).unwrap();
//! signal.add(2.0, 2.0).unwrap();  // Extends the segment started at 1.0
//! signal.end_at(4.0).unwrap();
//!
//! assert_eq!(signal.len(), 2);
//! assert_eq!(signal.value_at(3.5), Some(&2.0));
//! assert_eq!(signal.value_at(4.5), None);
//! ```
//!
//! A `Signal` can also be collected from `(time, value)` samples, in which case its end time is
//! the time of the last sample:
//!
//! ```rust
//! use strel_core::Signal;
//!
//! let signal = Signal::from([
//!     (0.0, 100.0),
//!     (1.0, 105.3),
//!     (2.0, 107.1),
//! ]);
//!
//! let doubled: Signal<f64> = signal.map(|value| value * 2.0);
//! ```
use ordered_float::NotNan;
use thiserror::Error;

/// Error produced while constructing a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SignalError {
    #[error("Time {time} is not after the last recorded time {last}")]
    NonMonotonicTime { time: f64, last: f64 },

    #[error("Signal times cannot be NaN")]
    NanTime,
}

fn not_nan(time: f64) -> Result<NotNan<f64>, SignalError> {
    NotNan::new(time).map_err(|_| SignalError::NanTime)
}

/// A maximal right-open time interval over which a [`Signal`] holds one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<V> {
    start: NotNan<f64>,
    value: V,
}

impl<V> Segment<V> {
    /// Time at which the segment starts holding its value.
    pub fn start(&self) -> f64 {
        self.start.into_inner()
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn start_time(&self) -> NotNan<f64> {
        self.start
    }
}

/// A piecewise-constant time series.
///
/// See the [`signal`](crate::signal) module for more information about the semantics of this
/// type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal<V> {
    segments: Vec<Segment<V>>,
    end: NotNan<f64>,
}

impl<V> Default for Signal<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Signal<V> {
    /// Create a new signal that is undefined everywhere. Equivalent to [`Signal::default()`].
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            end: NotNan::default(),
        }
    }

    /// Number of segments in the signal
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Determine if the signal is undefined everywhere
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First time at which the signal is defined, or [`None`] for an empty signal.
    pub fn start(&self) -> Option<f64> {
        self.segments.first().map(Segment::start)
    }

    /// Last time at which the signal is defined, or [`None`] for an empty signal.
    pub fn end(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.end.into_inner())
        }
    }

    /// The segments of the signal in chronological order.
    pub fn segments(&self) -> &[Segment<V>] {
        &self.segments
    }

    /// Create an iterator yielding the (start time, &value) pairs of the segments.
    pub fn iter(&self) -> Iter<'_, V> {
        self.into_iter()
    }

    /// Create an iterator yielding the start time of every segment.
    pub fn times(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.segments.iter().map(Segment::start)
    }

    /// Create an iterator yielding the value of every segment.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.segments.iter().map(Segment::value)
    }

    /// Index of the segment containing `time`. The time must lie inside the signal domain.
    pub(crate) fn index_of(&self, time: NotNan<f64>) -> usize {
        self.segments.partition_point(|segment| segment.start <= time).saturating_sub(1)
    }

    pub(crate) fn start_unchecked(&self) -> NotNan<f64> {
        self.segments[0].start
    }

    pub(crate) fn end_unchecked(&self) -> NotNan<f64> {
        self.end
    }

    /// Return the value of the signal at `time`, or [`None`] if the signal is undefined there.
    ///
    /// The signal is defined on the closed interval `[start, end]`, the end time carrying the
    /// value of the last segment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strel_core::Signal;
    ///
    /// let signal = Signal::from([(0.0, 'a'), (2.0, 'b'), (3.0, 'c')]);
    ///
    /// assert_eq!(signal.value_at(1.9), Some(&'a'));
    /// assert_eq!(signal.value_at(2.0), Some(&'b'));
    /// assert_eq!(signal.value_at(3.0), Some(&'c'));
    /// assert_eq!(signal.value_at(3.1), None);
    /// ```
    pub fn value_at(&self, time: f64) -> Option<&V> {
        let time = NotNan::new(time).ok()?;
        let first = self.segments.first()?;

        if time < first.start || time > self.end {
            return None;
        }

        Some(&self.segments[self.index_of(time)].value)
    }

    /// Close the signal at `time` without starting a new segment.
    ///
    /// Fails if `time` is earlier than the current end of the signal. Closing an empty signal has
    /// no effect.
    pub fn end_at(&mut self, time: f64) -> Result<(), SignalError> {
        let time = not_nan(time)?;

        if self.is_empty() {
            return Ok(());
        }

        if time < self.end {
            return Err(SignalError::NonMonotonicTime {
                time: time.into_inner(),
                last: self.end.into_inner(),
            });
        }

        self.end = time;
        Ok(())
    }
}

impl<V> Signal<V>
where
    V: PartialEq,
{
    /// Append a value starting at `time`.
    ///
    /// The time must be strictly greater than the last recorded time of the signal. If the value
    /// is equal to the value of the last segment, the last segment is extended instead.
    pub fn add(&mut self, time: f64, value: V) -> Result<(), SignalError> {
        let time = not_nan(time)?;

        if !self.is_empty() && time <= self.end {
            return Err(SignalError::NonMonotonicTime {
                time: time.into_inner(),
                last: self.end.into_inner(),
            });
        }

        self.append(time, value);
        self.end = time;
        Ok(())
    }

    /// Create a signal from a sequence of samples, closed at `end`.
    pub fn from_samples<I>(samples: I, end: f64) -> Result<Self, SignalError>
    where
        I: IntoIterator<Item = (f64, V)>,
    {
        let mut signal = Self::new();

        for (time, value) in samples {
            signal.add(time, value)?;
        }

        signal.end_at(end)?;
        Ok(signal)
    }

    /// Create a signal holding `value` over `[start, end]`.
    pub fn constant(start: f64, end: f64, value: V) -> Result<Self, SignalError> {
        Self::from_samples([(start, value)], end)
    }

    /// Unchecked append used by the transformations, which produce times in increasing order.
    /// A segment starting at the same time as the last one replaces it.
    pub(crate) fn append(&mut self, start: NotNan<f64>, value: V) {
        if let Some(last) = self.segments.last_mut() {
            debug_assert!(start >= last.start);

            if start == last.start {
                last.value = value;

                let len = self.segments.len();
                if len > 1 && self.segments[len - 2].value == self.segments[len - 1].value {
                    self.segments.pop();
                }

                return;
            }

            if last.value == value {
                return;
            }
        }

        self.segments.push(Segment { start, value });
    }

    /// Finish a signal produced by [`Signal::append`] at the given end time.
    pub(crate) fn close(mut self, end: NotNan<f64>) -> Self {
        self.segments.retain(|segment| segment.start <= end);

        if self.segments.is_empty() {
            Self::new()
        } else {
            self.end = end;
            self
        }
    }
}

impl<V> Signal<V> {
    /// Create a new signal by applying `f` to the value of every segment.
    ///
    /// Adjacent segments that become equal are merged, so the result is canonical.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strel_core::Signal;
    ///
    /// let signal = Signal::from([(0.0, 1.0), (1.0, -2.0), (2.0, 3.0)]);
    /// let positive = signal.map(|value| *value > 0.0);
    ///
    /// assert_eq!(positive.len(), 3);
    /// assert_eq!(signal.map(|value: &f64| value.abs() > 0.0).len(), 1);
    /// ```
    pub fn map<U, F>(&self, mut f: F) -> Signal<U>
    where
        F: FnMut(&V) -> U,
        U: PartialEq,
    {
        let mut result = Signal::new();

        for segment in &self.segments {
            result.append(segment.start, f(&segment.value));
        }

        result.close(self.end)
    }

    /// Create a new signal by combining the values of two signals with `f`.
    ///
    /// The result is defined on the intersection of the two signal domains, and its breakpoints
    /// are the union of the breakpoints of both signals inside that intersection. If the domains
    /// do not overlap the result is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strel_core::Signal;
    ///
    /// let left = Signal::from([(0.0, 1.0), (2.0, 3.0), (4.0, 3.0)]);
    /// let right = Signal::from([(1.0, 2.0), (3.0, 5.0), (5.0, 5.0)]);
    /// let sum = left.merge(&right, |l, r| l + r);
    ///
    /// assert_eq!(sum.start(), Some(1.0));
    /// assert_eq!(sum.end(), Some(4.0));
    /// assert_eq!(sum.value_at(2.5), Some(&5.0));
    /// ```
    pub fn merge<W, U, F>(&self, other: &Signal<W>, mut f: F) -> Signal<U>
    where
        F: FnMut(&V, &W) -> U,
        U: PartialEq,
    {
        if self.is_empty() || other.is_empty() {
            return Signal::new();
        }

        let start = self.start_unchecked().max(other.start_unchecked());
        let end = self.end.min(other.end);

        if start > end {
            return Signal::new();
        }

        let mut left = self.index_of(start);
        let mut right = other.index_of(start);
        let mut time = start;
        let mut result = Signal::new();

        loop {
            result.append(time, f(&self.segments[left].value, &other.segments[right].value));

            let next_left = self.segments.get(left + 1).map(|segment| segment.start);
            let next_right = other.segments.get(right + 1).map(|segment| segment.start);
            let next = match (next_left, next_right) {
                (Some(l), Some(r)) => l.min(r),
                (Some(l), None) => l,
                (None, Some(r)) => r,
                (None, None) => break,
            };

            if next > end {
                break;
            }

            if next_left == Some(next) {
                left += 1;
            }

            if next_right == Some(next) {
                right += 1;
            }

            time = next;
        }

        result.close(end)
    }

    /// Single left-to-right pass where every output segment holds `f(value, accumulator)`,
    /// which then becomes the accumulator of the following segment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strel_core::Signal;
    ///
    /// let signal = Signal::from([(0.0, 3.0), (1.0, 1.0), (2.0, 2.0)]);
    /// let running_min = signal.fold_forward(f64::INFINITY, |value: &f64, acc: &f64| value.min(*acc));
    ///
    /// assert_eq!(running_min.values().copied().collect::<Vec<_>>(), vec![3.0, 1.0]);
    /// ```
    pub fn fold_forward<A, F>(&self, init: A, mut f: F) -> Signal<A>
    where
        F: FnMut(&V, &A) -> A,
        A: Clone + PartialEq,
    {
        let mut accumulator = init;
        let mut result = Signal::new();

        for segment in &self.segments {
            accumulator = f(&segment.value, &accumulator);
            result.append(segment.start, accumulator.clone());
        }

        result.close(self.end)
    }

    /// Single right-to-left pass where every output segment holds `f(value, accumulator)`,
    /// which then becomes the accumulator of the preceding segment.
    pub fn fold_backward<A, F>(&self, init: A, mut f: F) -> Signal<A>
    where
        F: FnMut(&V, &A) -> A,
        A: Clone + PartialEq,
    {
        let mut accumulator = init;
        let mut values = Vec::with_capacity(self.segments.len());

        for segment in self.segments.iter().rev() {
            accumulator = f(&segment.value, &accumulator);
            values.push(accumulator.clone());
        }

        let mut result = Signal::new();

        for (segment, value) in self.segments.iter().zip(values.into_iter().rev()) {
            result.append(segment.start, value);
        }

        result.close(self.end)
    }
}

impl<V> Signal<V>
where
    V: Clone,
{
    /// Create a new signal with every time moved by `offset`.
    ///
    /// # Safety
    ///
    /// This method panics if `offset` is not finite.
    pub fn shift(&self, offset: f64) -> Self {
        assert!(offset.is_finite(), "Signal offset must be finite");

        if self.is_empty() {
            return Self::new();
        }

        let segments = self
            .segments
            .iter()
            .map(|segment| Segment {
                start: segment.start + offset,
                value: segment.value.clone(),
            })
            .collect();

        Self {
            segments,
            end: self.end + offset,
        }
    }

    /// Create a new signal restricted to the times inside `[lower, upper]`.
    ///
    /// The result is empty if the interval does not overlap the signal domain.
    pub fn restrict(&self, lower: f64, upper: f64) -> Self {
        match (NotNan::new(lower), NotNan::new(upper)) {
            (Ok(lower), Ok(upper)) => self.restrict_to(lower, upper),
            _ => Self::new(),
        }
    }

    pub(crate) fn restrict_to(&self, lower: NotNan<f64>, upper: NotNan<f64>) -> Self {
        if self.is_empty() {
            return Self::new();
        }

        let lower = lower.max(self.start_unchecked());
        let upper = upper.min(self.end);

        if lower > upper {
            return Self::new();
        }

        let first = self.index_of(lower);
        let last = self.index_of(upper);
        let mut segments = self.segments[first..=last].to_vec();
        segments[0].start = lower;

        Self { segments, end: upper }
    }
}

/// Borrowing iterator over the (start time, &value) pairs of the segments of a signal.
pub struct Iter<'a, V>(std::slice::Iter<'a, Segment<V>>);

impl<'a, V> Iter<'a, V> {
    fn map_element(segment: &'a Segment<V>) -> (f64, &'a V) {
        (segment.start(), &segment.value)
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (f64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(Self::map_element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(Self::map_element)
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Owning iterator over the (start time, value) pairs of the segments of a signal.
pub struct IntoIter<V>(std::vec::IntoIter<Segment<V>>);

impl<V> Iterator for IntoIter<V> {
    type Item = (f64, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|segment| (segment.start(), segment.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|segment| (segment.start(), segment.value))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'a, V> IntoIterator for &'a Signal<V> {
    type Item = (f64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(self.segments.iter())
    }
}

impl<V> IntoIterator for Signal<V> {
    type Item = (f64, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.segments.into_iter())
    }
}

/// Collect samples into a signal ending at the time of the last sample.
///
/// # Safety
///
/// Panics if a time is NaN or the times are not strictly increasing.
impl<A, V> FromIterator<(A, V)> for Signal<V>
where
    A: Into<f64>,
    V: PartialEq,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (A, V)>,
    {
        let mut signal = Self::new();

        for (time, value) in iter {
            signal
                .add(time.into(), value)
                .expect("Signal samples must have increasing, non-NaN times");
        }

        signal
    }
}

impl<A, V, const N: usize> From<[(A, V); N]> for Signal<V>
where
    A: Into<f64>,
    V: PartialEq,
{
    #[inline]
    fn from(values: [(A, V); N]) -> Self {
        Self::from_iter(values)
    }
}

impl<A, V> From<Vec<(A, V)>> for Signal<V>
where
    A: Into<f64>,
    V: PartialEq,
{
    #[inline]
    fn from(values: Vec<(A, V)>) -> Self {
        Self::from_iter(values)
    }
}

#[cfg(test)]
mod tests {
    use super::{Signal, SignalError};

    #[test]
    fn add_rejects_non_monotonic_times() {
        let mut signal = Signal::new();
        signal.add(1.0, 1.0).unwrap();

        assert_eq!(
            signal.add(1.0, 2.0),
            Err(SignalError::NonMonotonicTime { time: 1.0, last: 1.0 })
        );
        assert_eq!(
            signal.add(0.5, 2.0),
            Err(SignalError::NonMonotonicTime { time: 0.5, last: 1.0 })
        );
        assert_eq!(signal.add(f64::NAN, 2.0), Err(SignalError::NanTime));
    }

    #[test]
    fn canonical_form() {
        let signal = Signal::from([(0, 1.0), (1, 1.0), (2, 2.0), (3, 2.0), (4, 1.0)]);

        assert_eq!(signal.len(), 3);
        assert_eq!(signal.times().collect::<Vec<_>>(), vec![0.0, 2.0, 4.0]);
        assert_eq!(signal.end(), Some(4.0));
    }

    #[test]
    fn value_at() {
        let mut signal = Signal::from([(0.0, 'a'), (2.0, 'b')]);
        signal.end_at(5.0).unwrap();

        assert_eq!(signal.value_at(-0.1), None);
        assert_eq!(signal.value_at(0.0), Some(&'a'));
        assert_eq!(signal.value_at(1.99), Some(&'a'));
        assert_eq!(signal.value_at(2.0), Some(&'b'));
        assert_eq!(signal.value_at(5.0), Some(&'b'));
        assert_eq!(signal.value_at(5.1), None);
        assert_eq!(Signal::<char>::new().value_at(0.0), None);
    }

    #[test]
    fn end_at() {
        let mut signal = Signal::from([(0.0, 1)]);

        assert!(signal.end_at(3.0).is_ok());
        assert_eq!(signal.end(), Some(3.0));
        assert!(signal.end_at(2.0).is_err());
        assert!(signal.add(3.0, 2).is_err());
        assert!(signal.add(3.5, 2).is_ok());
    }

    #[test]
    fn map_merges_equal_segments() {
        let signal = Signal::from([(0.0, 1.0), (1.0, -1.0), (2.0, 2.0), (3.0, -3.0)]);
        let mapped = signal.map(|value: &f64| value.abs() > 1.5);

        assert_eq!(mapped.times().collect::<Vec<_>>(), vec![0.0, 2.0]);
        assert_eq!(mapped.end(), Some(3.0));
    }

    #[test]
    fn merge_intersects_domains() {
        let left = Signal::from([(0.0, 1.0), (2.0, 4.0), (6.0, 4.0)]);
        let right = Signal::from([(1.0, 2.0), (3.0, 0.0), (8.0, 0.0)]);
        let merged = left.merge(&right, |l, r| f64::min(*l, *r));
        let expected = Signal::from([(1.0, 1.0), (2.0, 2.0), (3.0, 0.0), (6.0, 0.0)]);

        assert_eq!(merged, expected);
    }

    #[test]
    fn merge_disjoint_is_empty() {
        let left = Signal::from([(0.0, 1.0), (1.0, 1.0)]);
        let right = Signal::from([(2.0, 1.0), (3.0, 1.0)]);

        assert!(left.merge(&right, |l, r| l + r).is_empty());
    }

    #[test]
    fn merge_at_single_point() {
        let left = Signal::from([(0.0, 1.0), (2.0, 5.0)]);
        let right = Signal::from([(2.0, 3.0), (4.0, 3.0)]);
        let merged = left.merge(&right, |l, r| l + r);

        assert_eq!(merged.start(), Some(2.0));
        assert_eq!(merged.end(), Some(2.0));
        assert_eq!(merged.value_at(2.0), Some(&8.0));
    }

    #[test]
    fn folds() {
        let signal = Signal::from([(0.0, 3.0), (1.0, 1.0), (2.0, 2.0), (3.0, 0.5)]);
        let prefix = signal.fold_forward(f64::NEG_INFINITY, |v: &f64, acc: &f64| v.max(*acc));
        let suffix = signal.fold_backward(f64::NEG_INFINITY, |v: &f64, acc: &f64| v.max(*acc));

        assert_eq!(prefix, Signal::from([(0.0, 3.0), (3.0, 3.0)]));
        assert_eq!(suffix.values().copied().collect::<Vec<_>>(), vec![3.0, 2.0, 0.5]);
        assert_eq!(suffix.times().collect::<Vec<_>>(), vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn shift_and_restrict() {
        let signal = Signal::from([(0.0, 'a'), (2.0, 'b'), (4.0, 'c'), (6.0, 'c')]);
        let shifted = signal.shift(-1.0);

        assert_eq!(shifted.start(), Some(-1.0));
        assert_eq!(shifted.end(), Some(5.0));

        let restricted = signal.restrict(1.0, 4.0);
        assert_eq!(restricted, Signal::from([(1.0, 'a'), (2.0, 'b'), (4.0, 'c')]));

        assert!(signal.restrict(7.0, 9.0).is_empty());
        assert!(signal.restrict(3.0, 2.0).is_empty());
    }
}
