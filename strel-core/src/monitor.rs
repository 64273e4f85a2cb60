//! Compilation of formulas into monitors.
//!
//! A [`Formula`] names its atomic propositions, but does not say how they are computed from the
//! states of the system. [`Bindings`] associate every name with a function from a state to a
//! value of the chosen [`ValueDomain`], and a [`TemporalMonitor`] is compiled from a formula, its
//! bindings and a domain. Compilation fails if the formula refers to a name without a binding, so
//! a compiled monitor can always evaluate its formula.
//!
//! # Examples
//!
//! ```rust
//! use strel_core::{Formula, Interval, Monitor, Signal};
//! use strel_core::domains::RobustnessDomain;
//! use strel_core::monitor::{Bindings, TemporalMonitor};
//!
//! let bindings = Bindings::new().with_atom("speed_ok", |speed: &f64| 120.0 - speed);
//! let formula = Formula::globally_within(Interval::new(0.0, 2.0).unwrap(), Formula::atomic("speed_ok"));
//! let monitor = TemporalMonitor::new(&formula, &bindings, RobustnessDomain).unwrap();
//!
//! let speeds = Signal::from([(0.0, 100.0), (1.0, 115.0), (2.0, 130.0), (3.0, 90.0), (4.0, 90.0)]);
//! let robustness = monitor.monitor(&speeds).unwrap();
//!
//! assert_eq!(robustness.value_at(0.0), Some(&-10.0));
//! assert_eq!(robustness.end(), Some(2.0));
//! ```
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::domains::ValueDomain;
use crate::formula::{Formula, Interval};
use crate::operators;
use crate::signal::Signal;
use crate::Monitor;

/// Function computing the value of an atomic proposition from a single state.
pub type AtomicFunction<S, V> = Arc<dyn Fn(&S) -> V + Send + Sync>;

/// Error produced while compiling a formula into a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("No function is bound to the atomic proposition \"{0}\"")]
    UnboundAtom(String),

    #[error("The {0} operator is spatial and requires a spatio-temporal monitor")]
    SpatialOperator(&'static str),
}

/// Mapping from atomic proposition names to the functions that evaluate them.
pub struct Bindings<S, V> {
    atoms: HashMap<String, AtomicFunction<S, V>>,
}

impl<S, V> Bindings<S, V> {
    pub fn new() -> Self {
        Self { atoms: HashMap::new() }
    }

    /// Add a binding, returning the extended set of bindings.
    pub fn with_atom<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.insert(name, function);
        self
    }

    /// Add a binding, replacing any function previously bound to the same name.
    pub fn insert<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.atoms.insert(name.into(), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&AtomicFunction<S, V>> {
        self.atoms.get(name)
    }

    /// Look up a binding, failing with [`MonitorError::UnboundAtom`] if there is none.
    pub fn resolve(&self, name: &str) -> Result<AtomicFunction<S, V>, MonitorError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| MonitorError::UnboundAtom(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.atoms.keys().map(String::as_str)
    }
}

impl<S, V> Default for Bindings<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V> Clone for Bindings<S, V> {
    fn clone(&self) -> Self {
        Self { atoms: self.atoms.clone() }
    }
}

impl<S, V> Debug for Bindings<S, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();

        f.debug_struct("Bindings").field("atoms", &names).finish()
    }
}

enum Node<S, V> {
    Atomic(String, AtomicFunction<S, V>),
    Not(Box<Node<S, V>>),
    And(Box<Node<S, V>>, Box<Node<S, V>>),
    Or(Box<Node<S, V>>, Box<Node<S, V>>),
    Implies(Box<Node<S, V>>, Box<Node<S, V>>),
    Eventually(Box<Node<S, V>>, Option<Interval>),
    Globally(Box<Node<S, V>>, Option<Interval>),
    Once(Box<Node<S, V>>, Option<Interval>),
    Historically(Box<Node<S, V>>, Option<Interval>),
    Until(Box<Node<S, V>>, Box<Node<S, V>>, Option<Interval>),
    Since(Box<Node<S, V>>, Box<Node<S, V>>, Option<Interval>),
}

impl<S, V> Node<S, V> {
    fn compile(formula: &Formula, bindings: &Bindings<S, V>) -> Result<Self, MonitorError> {
        let compile = |sub: &Formula| Self::compile(sub, bindings).map(Box::new);
        let node = match formula {
            Formula::Atomic(name) => Self::Atomic(name.clone(), bindings.resolve(name)?),
            Formula::Not(sub) => Self::Not(compile(sub)?),
            Formula::And(left, right) => Self::And(compile(left)?, compile(right)?),
            Formula::Or(left, right) => Self::Or(compile(left)?, compile(right)?),
            Formula::Implies(left, right) => Self::Implies(compile(left)?, compile(right)?),
            Formula::Eventually { subformula, interval } => Self::Eventually(compile(subformula)?, *interval),
            Formula::Globally { subformula, interval } => Self::Globally(compile(subformula)?, *interval),
            Formula::Once { subformula, interval } => Self::Once(compile(subformula)?, *interval),
            Formula::Historically { subformula, interval } => Self::Historically(compile(subformula)?, *interval),
            Formula::Until { left, right, interval } => Self::Until(compile(left)?, compile(right)?, *interval),
            Formula::Since { left, right, interval } => Self::Since(compile(left)?, compile(right)?, *interval),
            Formula::Everywhere { .. } | Formula::Somewhere { .. } | Formula::Reach { .. } | Formula::Escape { .. } => {
                return Err(MonitorError::SpatialOperator(formula.kind()));
            }
        };

        Ok(node)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Atomic(..) => "atomic",
            Self::Not(_) => "not",
            Self::And(..) => "and",
            Self::Or(..) => "or",
            Self::Implies(..) => "implies",
            Self::Eventually(..) => "eventually",
            Self::Globally(..) => "globally",
            Self::Once(..) => "once",
            Self::Historically(..) => "historically",
            Self::Until(..) => "until",
            Self::Since(..) => "since",
        }
    }

    /// Names of the atomic propositions in the compiled formula, sorted and without repetitions.
    fn atoms(&self) -> Vec<&str> {
        fn collect<'a, S, V>(node: &'a Node<S, V>, atoms: &mut Vec<&'a str>) {
            match node {
                Node::Atomic(name, _) => atoms.push(name),
                Node::Not(sub)
                | Node::Eventually(sub, _)
                | Node::Globally(sub, _)
                | Node::Once(sub, _)
                | Node::Historically(sub, _) => collect(sub, atoms),
                Node::And(left, right)
                | Node::Or(left, right)
                | Node::Implies(left, right)
                | Node::Until(left, right, _)
                | Node::Since(left, right, _) => {
                    collect(left, atoms);
                    collect(right, atoms);
                }
            }
        }

        let mut atoms = Vec::new();
        collect(self, &mut atoms);
        atoms.sort_unstable();
        atoms.dedup();
        atoms
    }

    fn evaluate<D>(&self, domain: &D, signal: &Signal<S>) -> Signal<V>
    where
        D: ValueDomain<Value = V>,
        V: PartialEq,
    {
        let result = match self {
            Self::Atomic(name, function) => {
                trace!(atom = %name, "evaluating atomic proposition");
                signal.map(|state| function(state))
            }
            Self::Not(sub) => operators::not(domain, &sub.evaluate(domain, signal)),
            Self::And(left, right) => {
                operators::and(domain, &left.evaluate(domain, signal), &right.evaluate(domain, signal))
            }
            Self::Or(left, right) => {
                operators::or(domain, &left.evaluate(domain, signal), &right.evaluate(domain, signal))
            }
            Self::Implies(left, right) => {
                operators::implies(domain, &left.evaluate(domain, signal), &right.evaluate(domain, signal))
            }
            Self::Eventually(sub, interval) => operators::eventually(domain, &sub.evaluate(domain, signal), *interval),
            Self::Globally(sub, interval) => operators::globally(domain, &sub.evaluate(domain, signal), *interval),
            Self::Once(sub, interval) => operators::once(domain, &sub.evaluate(domain, signal), *interval),
            Self::Historically(sub, interval) => {
                operators::historically(domain, &sub.evaluate(domain, signal), *interval)
            }
            Self::Until(left, right, interval) => operators::until(
                domain,
                &left.evaluate(domain, signal),
                &right.evaluate(domain, signal),
                *interval,
            ),
            Self::Since(left, right, interval) => operators::since(
                domain,
                &left.evaluate(domain, signal),
                &right.evaluate(domain, signal),
                *interval,
            ),
        };

        trace!(operator = self.name(), segments = result.len(), "evaluated operator");
        result
    }
}

/// Monitor for formulas without spatial operators.
///
/// The formula is compiled once, and the monitor can then be applied to any number of signals.
/// Evaluation never fails: operators whose time window does not fit inside the signal produce
/// an empty signal instead.
pub struct TemporalMonitor<S, D>
where
    D: ValueDomain,
{
    formula: Formula,
    root: Node<S, D::Value>,
    domain: D,
}

impl<S, D> TemporalMonitor<S, D>
where
    D: ValueDomain,
{
    /// Compile a formula using the given bindings.
    ///
    /// Fails with [`MonitorError::UnboundAtom`] if an atomic proposition has no binding, and with
    /// [`MonitorError::SpatialOperator`] if the formula contains a spatial operator.
    pub fn new(formula: &Formula, bindings: &Bindings<S, D::Value>, domain: D) -> Result<Self, MonitorError> {
        let root = Node::compile(formula, bindings)?;
        debug!(formula = %formula, "compiled temporal monitor");

        Ok(Self {
            formula: formula.clone(),
            root,
            domain,
        })
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }
}

impl<S, D> Debug for TemporalMonitor<S, D>
where
    D: ValueDomain + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalMonitor")
            .field("formula", &self.formula.to_string())
            .field("atoms", &self.root.atoms())
            .field("domain", &self.domain)
            .finish()
    }
}

impl<S, D> Monitor<S> for TemporalMonitor<S, D>
where
    D: ValueDomain,
{
    type Value = D::Value;
    type Error = std::convert::Infallible;

    fn monitor(&self, signal: &Signal<S>) -> Result<Signal<Self::Value>, Self::Error> {
        Ok(self.root.evaluate(&self.domain, signal))
    }
}

#[cfg(test)]
mod tests {
    use super::{Bindings, MonitorError, TemporalMonitor};
    use crate::domains::{BooleanDomain, RobustnessDomain};
    use crate::formula::{Formula, Interval};
    use crate::signal::Signal;
    use crate::Monitor;

    #[test]
    fn unbound_atom() {
        let bindings: Bindings<f64, f64> = Bindings::new().with_atom("x", |x: &f64| *x);
        let formula = Formula::and(Formula::atomic("x"), Formula::atomic("y"));
        let result = TemporalMonitor::new(&formula, &bindings, RobustnessDomain);

        assert_eq!(result.err(), Some(MonitorError::UnboundAtom("y".to_string())));
    }

    #[test]
    fn spatial_operator() {
        let bindings: Bindings<f64, bool> = Bindings::new().with_atom("p", |x: &f64| *x > 0.0);
        let formula = Formula::eventually(Formula::somewhere("hops", Interval::unbounded(), Formula::atomic("p")));
        let result = TemporalMonitor::new(&formula, &bindings, BooleanDomain);

        assert_eq!(result.err(), Some(MonitorError::SpatialOperator("somewhere")));
    }

    #[test]
    fn bindings_replace_and_list() {
        let mut bindings: Bindings<f64, f64> = Bindings::default();
        bindings.insert("x", |x: &f64| *x);
        bindings.insert("x", |x: &f64| -x);

        let mut names: Vec<&str> = bindings.names().collect();
        names.sort_unstable();

        assert_eq!(names, vec!["x"]);
        assert_eq!(bindings.get("x").map(|f| f(&2.0)), Some(-2.0));
        assert_eq!(format!("{:?}", bindings), "Bindings { atoms: [\"x\"] }");
    }

    #[test]
    fn nested_formula() {
        let bindings = Bindings::new()
            .with_atom("gear_3", |gear: &u8| *gear == 3)
            .with_atom("gear_4", |gear: &u8| *gear == 4);

        let formula = Formula::globally(Formula::implies(
            Formula::atomic("gear_3"),
            Formula::eventually_within(Interval::new(0.0, 2.0).unwrap(), Formula::atomic("gear_4")),
        ));

        let monitor = TemporalMonitor::new(&formula, &bindings, BooleanDomain).unwrap();
        let gears = Signal::from([(0, 2u8), (1, 3), (2, 4), (4, 3), (5, 3), (8, 3)]);
        let result = monitor.monitor(&gears).unwrap();

        // gear 3 from 4 onwards is never followed by gear 4
        assert_eq!(result.end(), Some(6.0));
        assert_eq!(result.value_at(0.0), Some(&false));
        assert_eq!(result.value_at(6.0), Some(&false));
    }

    #[test]
    fn shared_subformulas_are_evaluated_independently() {
        let bindings = Bindings::new().with_atom("x", |x: &f64| *x);
        let formula = Formula::or(Formula::atomic("x"), Formula::not(Formula::atomic("x")));
        let monitor = TemporalMonitor::new(&formula, &bindings, RobustnessDomain).unwrap();
        let result = monitor.monitor(&Signal::from([(0, -1.0), (1, 2.0), (2, 2.0)])).unwrap();

        assert_eq!(result, Signal::from([(0, 1.0), (1, 2.0), (2, 2.0)]));
    }

    #[test]
    fn debug_lists_compiled_atoms() {
        let bindings = Bindings::new()
            .with_atom("x", |x: &f64| *x)
            .with_atom("y", |x: &f64| -x)
            .with_atom("unused", |x: &f64| *x);

        let formula = Formula::until(Formula::atomic("y"), Formula::and(Formula::atomic("x"), Formula::atomic("y")));
        let monitor = TemporalMonitor::new(&formula, &bindings, RobustnessDomain).unwrap();
        let debug = format!("{:?}", monitor);

        assert!(debug.contains("atoms: [\"x\", \"y\"]"), "{}", debug);
    }
}
