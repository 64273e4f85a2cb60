//! Signal transformations implementing the operators of the logic.
//!
//! Every operator takes the satisfaction signal(s) of its operands and produces a new satisfaction
//! signal over the same [`ValueDomain`](crate::domains::ValueDomain). The inputs are never
//! modified. The functions in this module are the building blocks used by
//! [`TemporalMonitor`](crate::monitor::TemporalMonitor), and can also be called directly on
//! signals that were computed some other way.
//!
//! # First Order Operators
//!
//!   - [`not`]
//!   - [`and`]
//!   - [`or`]
//!   - [`implies`]
//!
//! These operators are time-invariant: the output at a time only depends on the inputs at the same
//! time. Binary operators are defined on the intersection of the domains of their inputs.
//!
//! # Temporal Operators
//!
//! Temporal operators depend on the values of their inputs over a window of time relative to the
//! current one, given by an optional [`Interval`](crate::formula::Interval). Without an interval
//! the window extends to the end (or the beginning) of the signal.
//!
//! ## Future Operators
//!
//! [`eventually`], [`globally`] and [`until`] consider the window `[t + a, t + b]`. For the
//! interval `[0, 3]` the value at `T2` depends on the following segments:
//!
//! ```text
//! T1 T2 T3 T4 T5 T6
//! V1 V2 V3 V4 V5 V6
//!     |--------|
//! ```
//!
//! Since the values after the end of the signal are unknown, a bounded future operator is only
//! defined on `[start, end - b]`.
//!
//! ## Past Operators
//!
//! [`once`], [`historically`] and [`since`] consider the window `[t - b, t - a]`, and are only
//! defined on `[start + b, end]`:
//!
//! ```text
//! T1 T2 T3 T4 T5 T6
//! V1 V2 V3 V4 V5 V6
//!     |--------|
//!             ^ T5
//! ```
//!
//! # Examples
//!
//! ```rust
//! use strel_core::Signal;
//! use strel_core::domains::RobustnessDomain;
//! use strel_core::formula::Interval;
//! use strel_core::operators;
//!
//! let signal = Signal::from([(0, 4.0), (1, 2.0), (2, 3.0), (3, 1.0), (4, 3.0)]);
//! let window = Interval::new(0.0, 2.0).unwrap();
//! let result = operators::globally(&RobustnessDomain, &signal, Some(window));
//!
//! assert_eq!(result.end(), Some(2.0));
//! assert_eq!(result.value_at(0.0), Some(&2.0));
//! assert_eq!(result.value_at(1.0), Some(&1.0));
//! ```

mod backward;
mod first_order;
mod forward;
pub(crate) mod window;

pub use self::backward::{historically, once, since};
pub use self::first_order::{and, implies, not, or};
pub use self::forward::{eventually, globally, until};

use ordered_float::NotNan;

use crate::formula::Interval;
use crate::signal::Segment;

/// Time window of a temporal operator after resolving the optional interval.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Window {
    Bounded(f64, f64),
    Unbounded(f64),
}

impl From<Option<Interval>> for Window {
    fn from(interval: Option<Interval>) -> Self {
        match interval {
            Some(interval) if interval.is_bounded() => Self::Bounded(interval.lower(), interval.upper()),
            Some(interval) => Self::Unbounded(interval.lower()),
            None => Self::Unbounded(0.0),
        }
    }
}

/// Move `index` forward to the last segment whose start plus `offset` is at or before `time`.
///
/// The shifted start is compared with `time` directly, so a breakpoint computed as
/// `start + offset` always selects the segment it was computed from.
fn advance<T>(segments: &[Segment<T>], index: &mut usize, offset: f64, time: NotNan<f64>) {
    while *index + 1 < segments.len() && segments[*index + 1].start_time() + offset <= time {
        *index += 1;
    }
}
