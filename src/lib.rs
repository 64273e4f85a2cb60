//! Offline monitoring of [Signal Temporal Logic] and [STREL] formulas.
//!
//! A monitor evaluates a formula over a _signal_: a piecewise-constant function from time to the
//! states of a system, such as the readings of a sensor. The result is another signal holding the
//! satisfaction value of the formula at every time. Depending on the chosen domain this value is
//! a boolean verdict, a [robustness] value measuring how far the system is from violating the
//! formula, or an interval of robustness values.
//!
//! STREL extends the temporal operators with spatial ones, which evaluate a formula over a set of
//! locations connected by a graph that may change over time. Spatial monitoring is enabled by the
//! `spatial` feature, which is on by default.
//!
//! [Signal Temporal Logic]: https://link.springer.com/chapter/10.1007/978-3-540-30206-3_12
//! [STREL]: https://arxiv.org/abs/2101.11433
//! [robustness]: https://link.springer.com/chapter/10.1007/11940197_12
//!
//! # Examples
//!
//! A formula is built from named atomic propositions and operators. The names are bound to
//! functions from states to values when the monitor is compiled:
//!
//! ```rust
//! use strel::{Bindings, Formula, Interval, Monitor, RobustnessDomain, Signal, TemporalMonitor};
//!
//! // Whenever the gear is 3, the gear should be 4 within 2 time units
//! let formula = Formula::globally(Formula::implies(
//!     Formula::atomic("gear_3"),
//!     Formula::eventually_within(Interval::new(0.0, 2.0).unwrap(), Formula::atomic("gear_4")),
//! ));
//!
//! let bindings = Bindings::new()
//!     .with_atom("gear_3", |gear: &f64| 0.5 - (gear - 3.0).abs())
//!     .with_atom("gear_4", |gear: &f64| 0.5 - (gear - 4.0).abs());
//!
//! let monitor = TemporalMonitor::new(&formula, &bindings, RobustnessDomain).unwrap();
//! let gears = Signal::from([(0.0, 2.0), (1.0, 3.0), (2.0, 4.0), (5.0, 4.0)]);
//! let robustness = monitor.monitor(&gears).unwrap();
//!
//! assert_eq!(robustness.value_at(0.0), Some(&0.5));
//! ```
//!
//! The same formula can be evaluated in the boolean domain by binding boolean functions and
//! using [`BooleanDomain`] instead.

extern crate strel_core as core;

#[doc(inline)]
pub use core::{evaluate, evaluate_at, EvaluationError, Monitor};

#[doc(inline)]
pub use core::domains::{BooleanDomain, IntervalDomain, RobustnessDomain, RobustnessInterval, ValueDomain};

#[doc(inline)]
pub use core::formula::{Formula, Interval, IntervalError};

#[doc(inline)]
pub use core::monitor::{Bindings, MonitorError, TemporalMonitor};

#[doc(inline)]
pub use core::operators;

#[doc(inline)]
pub use core::signal::{Segment, Signal, SignalError};

#[doc(inline)]
pub use core::{domains, signal};

#[cfg(feature = "spatial")]
#[doc(inline)]
pub use strel_spatial as spatial;
