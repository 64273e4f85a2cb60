//! Signals, value domains and temporal operators for monitoring Signal Temporal Logic formulas.
//!
//! This crate holds the parts of the monitor that do not depend on a spatial structure. Spatial
//! operators are provided by the `strel-spatial` crate, which builds on the types defined here.
use std::borrow::Borrow;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

pub mod domains;
pub mod formula;
pub mod monitor;
pub mod operators;
pub mod signal;

pub use crate::domains::{BooleanDomain, IntervalDomain, RobustnessDomain, RobustnessInterval, ValueDomain};
pub use crate::formula::{Formula, Interval, IntervalError};
pub use crate::monitor::{Bindings, MonitorError, TemporalMonitor};
pub use crate::signal::{Segment, Signal, SignalError};

/// A compiled formula that can be evaluated over signals of states.
pub trait Monitor<State> {
    type Value;
    type Error;

    fn monitor(&self, signal: &Signal<State>) -> Result<Signal<Self::Value>, Self::Error>;
}

impl<State, T> Monitor<State> for &T
where
    T: Monitor<State> + ?Sized,
{
    type Value = T::Value;
    type Error = T::Error;

    fn monitor(&self, signal: &Signal<State>) -> Result<Signal<Self::Value>, Self::Error> {
        (**self).monitor(signal)
    }
}

macro_rules! impl_monitor_for_pointer {
    ($($pointer:ident),+) => {
        $(
            impl<State, T> Monitor<State> for $pointer<T>
            where
                T: Monitor<State> + ?Sized,
            {
                type Value = T::Value;
                type Error = T::Error;

                fn monitor(&self, signal: &Signal<State>) -> Result<Signal<Self::Value>, Self::Error> {
                    (**self).monitor(signal)
                }
            }
        )+
    };
}

impl_monitor_for_pointer!(Box, Arc, Rc);

#[derive(Debug, Error)]
enum ErrorKind<Err> {
    #[error("monitor failed: {0}")]
    Monitor(Err),

    #[error("the monitor produced an empty signal")]
    EmptySignal,

    #[error("the monitor produced no value at time {0}")]
    Undefined(f64),
}

/// Error produced by [`evaluate`] and [`evaluate_at`].
#[derive(Debug, Error)]
#[error(transparent)]
pub struct EvaluationError<Err>(ErrorKind<Err>);

impl<Err> EvaluationError<Err> {
    /// Whether the output of the monitor has no segments at all.
    pub fn is_empty_signal(&self) -> bool {
        matches!(self.0, ErrorKind::EmptySignal)
    }

    /// The requested time, when the output is not empty but does not cover it.
    pub fn undefined_at(&self) -> Option<f64> {
        match self.0 {
            ErrorKind::Undefined(time) => Some(time),
            _ => None,
        }
    }

    /// The error returned by the monitor itself, if evaluation failed there.
    pub fn monitor_error(&self) -> Option<&Err> {
        match &self.0 {
            ErrorKind::Monitor(err) => Some(err),
            _ => None,
        }
    }
}

/// Monitor a signal and return the satisfaction value at the start of the output.
///
/// Past operators with a bounded window start their output after the start of the input, so the
/// value returned is the first one the formula defines. Use [`evaluate_at`] to ask for a given
/// time instead.
///
/// # Examples
///
/// ```rust
/// use strel_core::{evaluate, Bindings, Formula, RobustnessDomain, Signal, TemporalMonitor};
///
/// let bindings = Bindings::new().with_atom("x", |x: &f64| 10.0 - x);
/// let formula = Formula::globally(Formula::atomic("x"));
/// let monitor = TemporalMonitor::new(&formula, &bindings, RobustnessDomain).unwrap();
/// let signal = Signal::from([(0.0, 1.0), (1.0, 4.0), (2.0, 2.0)]);
///
/// assert_eq!(evaluate(&signal, &monitor).unwrap(), 6.0);
/// ```
pub fn evaluate<T, M, State>(signal: T, monitor: M) -> Result<M::Value, EvaluationError<M::Error>>
where
    T: Borrow<Signal<State>>,
    M: Monitor<State>,
{
    let output = monitor
        .monitor(signal.borrow())
        .map_err(|err| EvaluationError(ErrorKind::Monitor(err)))?;

    match output.into_iter().next() {
        Some((_, value)) => Ok(value),
        None => Err(EvaluationError(ErrorKind::EmptySignal)),
    }
}

/// Monitor a signal and return the satisfaction value at `time`.
///
/// ```rust
/// use strel_core::{evaluate_at, Bindings, Formula, Interval, RobustnessDomain, Signal, TemporalMonitor};
///
/// let bindings = Bindings::new().with_atom("x", |x: &f64| *x);
/// let formula = Formula::once_within(Interval::new(0.0, 1.0).unwrap(), Formula::atomic("x"));
/// let monitor = TemporalMonitor::new(&formula, &bindings, RobustnessDomain).unwrap();
/// let signal = Signal::from([(0.0, 1.0), (1.0, 4.0), (2.0, 2.0), (3.0, 2.0)]);
///
/// assert_eq!(evaluate_at(&signal, &monitor, 3.0).unwrap(), 2.0);
/// assert_eq!(evaluate_at(&signal, &monitor, 0.5).unwrap_err().undefined_at(), Some(0.5));
/// ```
pub fn evaluate_at<T, M, State>(signal: T, monitor: M, time: f64) -> Result<M::Value, EvaluationError<M::Error>>
where
    T: Borrow<Signal<State>>,
    M: Monitor<State>,
    M::Value: Clone,
{
    let output = monitor
        .monitor(signal.borrow())
        .map_err(|err| EvaluationError(ErrorKind::Monitor(err)))?;

    if output.is_empty() {
        return Err(EvaluationError(ErrorKind::EmptySignal));
    }

    output
        .value_at(time)
        .cloned()
        .ok_or(EvaluationError(ErrorKind::Undefined(time)))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use super::{evaluate, evaluate_at, Bindings, Formula, Interval, Monitor, RobustnessDomain, Signal, TemporalMonitor};

    fn monitor() -> TemporalMonitor<f64, RobustnessDomain> {
        let bindings = Bindings::new().with_atom("x", |x: &f64| *x);
        let formula = Formula::eventually_within(Interval::new(0.0, 5.0).unwrap(), Formula::atomic("x"));

        TemporalMonitor::new(&formula, &bindings, RobustnessDomain).unwrap()
    }

    #[test]
    fn evaluate_empty_result() {
        let signal = Signal::from([(0.0, 1.0), (1.0, 2.0)]);
        let error = evaluate(&signal, monitor()).unwrap_err();

        assert!(error.is_empty_signal());
        assert_eq!(error.undefined_at(), None);
        assert!(error.monitor_error().is_none());
    }

    #[test]
    fn evaluate_at_outside_output() {
        let signal = Signal::from([(0.0, 1.0), (3.0, 4.0), (6.0, 2.0), (8.0, 2.0)]);
        let monitor = monitor();

        assert_eq!(evaluate_at(&signal, &monitor, 0.0).unwrap(), 4.0);
        assert_eq!(evaluate_at(&signal, &monitor, 3.0).unwrap(), 4.0);

        // the output of eventually[0,5] ends at 8 - 5
        let error = evaluate_at(&signal, &monitor, 4.0).unwrap_err();
        assert_eq!(error.undefined_at(), Some(4.0));
        assert!(!error.is_empty_signal());
    }

    #[test]
    fn shared_monitors() {
        let signal = Signal::from([(0.0, 1.0), (3.0, 4.0), (6.0, 2.0), (8.0, 2.0)]);
        let boxed: Box<dyn Monitor<f64, Value = f64, Error = std::convert::Infallible>> = Box::new(monitor());

        assert_eq!(evaluate(&signal, &boxed).unwrap(), 4.0);
        assert_eq!(evaluate(&signal, Rc::new(monitor())).unwrap(), 4.0);
        assert_eq!(evaluate(&signal, Arc::new(monitor())).unwrap(), 4.0);
    }
}
