//! Monitoring of formulas with spatial operators.
//!
//! A [`SpatialTemporalSignal`] holds one signal of states for every location of the space. The
//! temporal operators of a formula are evaluated independently at every location, while the
//! spatial operators combine the values of all the locations at every instant using the
//! [`SpatialModel`](crate::model::SpatialModel) returned by a [`LocationService`] for that instant.
//!
//! # Examples
//!
//! ```rust
//! use strel_core::{BooleanDomain, Formula, Interval, Signal};
//! use strel_spatial::distance::IntegerDistance;
//! use strel_spatial::location::StaticLocationService;
//! use strel_spatial::model::SpatialModel;
//! use strel_spatial::monitor::{SpatialBindings, SpatialTemporalMonitor, SpatialTemporalSignal};
//!
//! let model = SpatialModel::undirected(3, [(0, (), 1), (1, (), 2)]).unwrap();
//! let locations = StaticLocationService::new(model);
//!
//! let bindings = SpatialBindings::new()
//!     .with_atom("alarm", |level: &f64| *level > 10.0)
//!     .with_distance("hops", |_: &()| 1u64);
//!
//! let formula = Formula::somewhere("hops", Interval::new(0.0, 1.0).unwrap(), Formula::atomic("alarm"));
//! let monitor = SpatialTemporalMonitor::new(&formula, &bindings, BooleanDomain, IntegerDistance).unwrap();
//!
//! let signal = SpatialTemporalSignal::from_locations(vec![
//!     Signal::from([(0.0, 0.0), (2.0, 0.0)]),
//!     Signal::from([(0.0, 0.0), (2.0, 0.0)]),
//!     Signal::from([(0.0, 20.0), (1.0, 0.0), (2.0, 0.0)]),
//! ]);
//!
//! let result = monitor.monitor(&locations, &signal).unwrap();
//!
//! assert_eq!(result.location(0).and_then(|s| s.value_at(0.0)), Some(&false));
//! assert_eq!(result.location(1).and_then(|s| s.value_at(0.0)), Some(&true));
//! assert_eq!(result.location(1).and_then(|s| s.value_at(1.0)), Some(&false));
//! ```
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use strel_core::domains::ValueDomain;
use strel_core::formula::{Formula, Interval};
use strel_core::monitor::{AtomicFunction, Bindings, MonitorError};
use strel_core::operators;
use strel_core::signal::{Signal, SignalError};
use thiserror::Error;
use tracing::{debug, trace};

use crate::algorithms;
use crate::distance::DistanceDomain;
use crate::location::LocationService;
use crate::model::SpatialModel;
use crate::structure::DistanceStructure;

/// One signal for every location of a space.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialTemporalSignal<V> {
    locations: Vec<Signal<V>>,
}

impl<V> SpatialTemporalSignal<V> {
    /// Create a signal with `size` empty locations.
    pub fn new(size: usize) -> Self {
        Self {
            locations: (0..size).map(|_| Signal::new()).collect(),
        }
    }

    pub fn from_locations(locations: Vec<Signal<V>>) -> Self {
        Self { locations }
    }

    /// Number of locations
    pub fn size(&self) -> usize {
        self.locations.len()
    }

    pub fn location(&self, index: usize) -> Option<&Signal<V>> {
        self.locations.get(index)
    }

    pub fn locations(&self) -> &[Signal<V>] {
        &self.locations
    }

    pub fn into_locations(self) -> Vec<Signal<V>> {
        self.locations
    }

    /// Apply a function to the value of every segment of every location.
    pub fn map<U, F>(&self, mut f: F) -> SpatialTemporalSignal<U>
    where
        F: FnMut(&V) -> U,
        U: PartialEq,
    {
        SpatialTemporalSignal {
            locations: self.locations.iter().map(|signal| signal.map(&mut f)).collect(),
        }
    }
}

impl<V> SpatialTemporalSignal<V>
where
    V: PartialEq,
{
    /// Append the values of every location starting at `time`.
    ///
    /// The number of values must match the number of locations, and `time` must be greater than
    /// the last time of every location.
    pub fn push<I>(&mut self, time: f64, values: I) -> Result<(), SpatialMonitorError>
    where
        I: IntoIterator<Item = V>,
    {
        let values: Vec<V> = values.into_iter().collect();

        if values.len() != self.size() {
            return Err(SpatialMonitorError::LocationMismatch {
                signal: self.size(),
                model: values.len(),
            });
        }

        for (signal, value) in self.locations.iter_mut().zip(values) {
            signal.add(time, value)?;
        }

        Ok(())
    }
}

impl<V> FromIterator<Signal<V>> for SpatialTemporalSignal<V> {
    fn from_iter<I: IntoIterator<Item = Signal<V>>>(iter: I) -> Self {
        Self::from_locations(iter.into_iter().collect())
    }
}

/// Function computing the length of an edge from its label.
pub type DistanceFunction<E, A> = Arc<dyn Fn(&E) -> A + Send + Sync>;

/// Error produced while compiling or evaluating a spatio-temporal monitor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialMonitorError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("No function is bound to the distance \"{0}\"")]
    UnboundDistance(String),

    #[error("No spatial model is available at time {0}")]
    MissingModel(f64),

    #[error("The signal has {signal} locations but the spatial model has {model}")]
    LocationMismatch { signal: usize, model: usize },

    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// Atomic propositions over states and distances over edge labels.
///
/// `S` is the type of the states, `V` the type of the satisfaction values, `E` the type of the
/// edge labels and `A` the type of the distances.
pub struct SpatialBindings<S, V, E, A> {
    atoms: Bindings<S, V>,
    distances: HashMap<String, DistanceFunction<E, A>>,
}

impl<S, V, E, A> SpatialBindings<S, V, E, A> {
    pub fn new() -> Self {
        Self {
            atoms: Bindings::new(),
            distances: HashMap::new(),
        }
    }

    pub fn with_atom<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.atoms.insert(name, function);
        self
    }

    pub fn with_distance<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&E) -> A + Send + Sync + 'static,
    {
        self.insert_distance(name, function);
        self
    }

    pub fn insert_atom<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.atoms.insert(name, function);
    }

    /// Add a distance, replacing any function previously bound to the same name.
    pub fn insert_distance<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&E) -> A + Send + Sync + 'static,
    {
        self.distances.insert(name.into(), Arc::new(function));
    }

    pub fn atoms(&self) -> &Bindings<S, V> {
        &self.atoms
    }

    /// Look up a distance, failing with [`SpatialMonitorError::UnboundDistance`] if there is none.
    pub fn resolve_distance(&self, name: &str) -> Result<DistanceFunction<E, A>, SpatialMonitorError> {
        self.distances
            .get(name)
            .cloned()
            .ok_or_else(|| SpatialMonitorError::UnboundDistance(name.to_string()))
    }
}

impl<S, V, E, A> Default for SpatialBindings<S, V, E, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V, E, A> Clone for SpatialBindings<S, V, E, A> {
    fn clone(&self) -> Self {
        Self {
            atoms: self.atoms.clone(),
            distances: self.distances.clone(),
        }
    }
}

impl<S, V, E, A> Debug for SpatialBindings<S, V, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut distances: Vec<&str> = self.distances.keys().map(String::as_str).collect();
        distances.sort_unstable();

        f.debug_struct("SpatialBindings")
            .field("atoms", &self.atoms)
            .field("distances", &distances)
            .finish()
    }
}

struct Neighbourhood<E, A> {
    distance: DistanceFunction<E, A>,
    bound: Interval,
}

enum Node<S, V, E, A> {
    Atomic(AtomicFunction<S, V>),
    Not(Box<Node<S, V, E, A>>),
    And(Box<Node<S, V, E, A>>, Box<Node<S, V, E, A>>),
    Or(Box<Node<S, V, E, A>>, Box<Node<S, V, E, A>>),
    Implies(Box<Node<S, V, E, A>>, Box<Node<S, V, E, A>>),
    Eventually(Box<Node<S, V, E, A>>, Option<Interval>),
    Globally(Box<Node<S, V, E, A>>, Option<Interval>),
    Once(Box<Node<S, V, E, A>>, Option<Interval>),
    Historically(Box<Node<S, V, E, A>>, Option<Interval>),
    Until(Box<Node<S, V, E, A>>, Box<Node<S, V, E, A>>, Option<Interval>),
    Since(Box<Node<S, V, E, A>>, Box<Node<S, V, E, A>>, Option<Interval>),
    Everywhere(Box<Node<S, V, E, A>>, Neighbourhood<E, A>),
    Somewhere(Box<Node<S, V, E, A>>, Neighbourhood<E, A>),
    Escape(Box<Node<S, V, E, A>>, Neighbourhood<E, A>),
    Reach(Box<Node<S, V, E, A>>, Box<Node<S, V, E, A>>, Neighbourhood<E, A>),
}

/// Everything an evaluation needs besides the formula and the signal.
struct Context<'a, VD, DD, L> {
    domain: &'a VD,
    distances: &'a DD,
    locations: &'a L,
}

type Locations<V> = Vec<Signal<V>>;

fn unary<V, F>(operand: Locations<V>, f: F) -> Locations<V>
where
    F: Fn(&Signal<V>) -> Signal<V>,
{
    operand.iter().map(f).collect()
}

fn binary<V, F>(left: Locations<V>, right: Locations<V>, f: F) -> Locations<V>
where
    F: Fn(&Signal<V>, &Signal<V>) -> Signal<V>,
{
    left.iter().zip(right.iter()).map(|(left, right)| f(left, right)).collect()
}

impl<S, V, E, A> Node<S, V, E, A> {
    fn compile(formula: &Formula, bindings: &SpatialBindings<S, V, E, A>) -> Result<Self, SpatialMonitorError> {
        let compile = |sub: &Formula| Self::compile(sub, bindings).map(Box::new);
        let neighbourhood = |distance: &str, bound: &Interval| -> Result<Neighbourhood<E, A>, SpatialMonitorError> {
            Ok(Neighbourhood {
                distance: bindings.resolve_distance(distance)?,
                bound: *bound,
            })
        };

        let node = match formula {
            Formula::Atomic(name) => Self::Atomic(bindings.atoms().resolve(name)?),
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
            Formula::Everywhere {
                subformula,
                distance,
                bound,
            } => Self::Everywhere(compile(subformula)?, neighbourhood(distance, bound)?),
            Formula::Somewhere {
                subformula,
                distance,
                bound,
            } => Self::Somewhere(compile(subformula)?, neighbourhood(distance, bound)?),
            Formula::Escape {
                subformula,
                distance,
                bound,
            } => Self::Escape(compile(subformula)?, neighbourhood(distance, bound)?),
            Formula::Reach {
                left,
                right,
                distance,
                bound,
            } => Self::Reach(compile(left)?, compile(right)?, neighbourhood(distance, bound)?),
        };

        Ok(node)
    }

    fn evaluate<VD, DD, L>(
        &self,
        context: &Context<'_, VD, DD, L>,
        signal: &SpatialTemporalSignal<S>,
    ) -> Result<Locations<V>, SpatialMonitorError>
    where
        VD: ValueDomain<Value = V> + Sync,
        V: Clone + PartialEq + Send + Sync,
        DD: DistanceDomain<Value = A> + Clone + Sync,
        A: Clone + Sync,
        L: LocationService<E>,
    {
        let domain = context.domain;
        let result: Locations<V> = match self {
            Self::Atomic(function) => signal.locations().iter().map(|s| s.map(|state| function(state))).collect(),
            Self::Not(sub) => unary(sub.evaluate(context, signal)?, |s| operators::not(domain, s)),
            Self::And(left, right) => binary(left.evaluate(context, signal)?, right.evaluate(context, signal)?, |l, r| {
                operators::and(domain, l, r)
            }),
            Self::Or(left, right) => binary(left.evaluate(context, signal)?, right.evaluate(context, signal)?, |l, r| {
                operators::or(domain, l, r)
            }),
            Self::Implies(left, right) => {
                binary(left.evaluate(context, signal)?, right.evaluate(context, signal)?, |l, r| {
                    operators::implies(domain, l, r)
                })
            }
            Self::Eventually(sub, interval) => unary(sub.evaluate(context, signal)?, |s| {
                operators::eventually(domain, s, *interval)
            }),
            Self::Globally(sub, interval) => unary(sub.evaluate(context, signal)?, |s| {
                operators::globally(domain, s, *interval)
            }),
            Self::Once(sub, interval) => unary(sub.evaluate(context, signal)?, |s| {
                operators::once(domain, s, *interval)
            }),
            Self::Historically(sub, interval) => unary(sub.evaluate(context, signal)?, |s| {
                operators::historically(domain, s, *interval)
            }),
            Self::Until(left, right, interval) => {
                binary(left.evaluate(context, signal)?, right.evaluate(context, signal)?, |l, r| {
                    operators::until(domain, l, r, *interval)
                })
            }
            Self::Since(left, right, interval) => {
                binary(left.evaluate(context, signal)?, right.evaluate(context, signal)?, |l, r| {
                    operators::since(domain, l, r, *interval)
                })
            }
            Self::Everywhere(sub, neighbourhood) => {
                let operand = sub.evaluate(context, signal)?;
                spatial(context, neighbourhood, &[&operand], |structure, values| {
                    algorithms::everywhere(domain, structure, &values[0])
                })?
            }
            Self::Somewhere(sub, neighbourhood) => {
                let operand = sub.evaluate(context, signal)?;
                spatial(context, neighbourhood, &[&operand], |structure, values| {
                    algorithms::somewhere(domain, structure, &values[0])
                })?
            }
            Self::Escape(sub, neighbourhood) => {
                let operand = sub.evaluate(context, signal)?;
                spatial(context, neighbourhood, &[&operand], |structure, values| {
                    algorithms::escape(domain, structure, &values[0])
                })?
            }
            Self::Reach(left, right, neighbourhood) => {
                let left = left.evaluate(context, signal)?;
                let right = right.evaluate(context, signal)?;
                spatial(context, neighbourhood, &[&left, &right], |structure, values| {
                    algorithms::reach(domain, structure, &values[0], &values[1])
                })?
            }
        };

        Ok(result)
    }
}

/// Evaluate a spatial operator at every time where one of its operands or the spatial model
/// changes, and collect the results into one signal per location.
fn spatial<V, E, A, VD, DD, L, F>(
    context: &Context<'_, VD, DD, L>,
    neighbourhood: &Neighbourhood<E, A>,
    operands: &[&Locations<V>],
    apply: F,
) -> Result<Locations<V>, SpatialMonitorError>
where
    V: Clone + PartialEq,
    DD: DistanceDomain<Value = A> + Clone,
    A: Clone,
    L: LocationService<E>,
    F: Fn(&DistanceStructure<DD>, &[Vec<V>]) -> Vec<V>,
{
    let size = operands.first().map_or(0, |operand| operand.len());
    let mut outputs: Locations<V> = (0..size).map(|_| Signal::new()).collect();

    let signals: Vec<&Signal<V>> = operands.iter().flat_map(|operand| operand.iter()).collect();
    let bounds = signals
        .iter()
        .map(|signal| signal.start().zip(signal.end()))
        .collect::<Option<Vec<(f64, f64)>>>();

    let (start, end) = match bounds {
        Some(bounds) if !bounds.is_empty() => bounds.into_iter().fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(start, end), (lower, upper)| (start.max(lower), end.min(upper)),
        ),
        _ => return Ok(outputs),
    };

    if start > end {
        return Ok(outputs);
    }

    let mut breakpoints: Vec<f64> = signals
        .iter()
        .flat_map(|signal| signal.times())
        .chain(context.locations.change_times())
        .filter(|time| *time > start && *time <= end)
        .chain(std::iter::once(start))
        .collect();

    breakpoints.sort_unstable_by(f64::total_cmp);
    breakpoints.dedup();

    let lower = context.distances.lower_bound(neighbourhood.bound.lower());
    let upper = context.distances.upper_bound(neighbourhood.bound.upper());
    let mut cache: Option<(&SpatialModel<E>, DistanceStructure<DD>)> = None;
    let mut rebuilds = 0usize;

    for time in &breakpoints {
        let model = context
            .locations
            .model_at(*time)
            .ok_or(SpatialMonitorError::MissingModel(*time))?;

        if model.size() != size {
            return Err(SpatialMonitorError::LocationMismatch {
                signal: size,
                model: model.size(),
            });
        }

        let stale = match &cache {
            Some((cached, _)) => !std::ptr::eq(*cached, model),
            None => true,
        };

        if stale {
            let distance = &neighbourhood.distance;
            let structure = DistanceStructure::new(
                model,
                |label: &E| distance(label),
                context.distances.clone(),
                lower.clone(),
                upper.clone(),
            );

            cache = Some((model, structure));
            rebuilds += 1;
        }

        let values = operands
            .iter()
            .map(|operand| {
                operand
                    .iter()
                    .map(|signal| signal.value_at(*time).cloned())
                    .collect::<Option<Vec<V>>>()
            })
            .collect::<Option<Vec<Vec<V>>>>();

        let (values, structure) = match (values, &cache) {
            (Some(values), Some((_, structure))) => (values, structure),
            _ => continue,
        };

        for (output, value) in outputs.iter_mut().zip(apply(structure, &values)) {
            output.add(*time, value)?;
        }
    }

    for output in &mut outputs {
        output.end_at(end)?;
    }

    trace!(breakpoints = breakpoints.len(), rebuilds, "evaluated spatial operator");
    Ok(outputs)
}

/// Monitor for formulas with spatial operators.
///
/// `D` is the value domain of the monitor and `DD` the domain of the distances used by the
/// spatial operators.
pub struct SpatialTemporalMonitor<S, E, D, DD>
where
    D: ValueDomain,
    DD: DistanceDomain,
{
    formula: Formula,
    root: Node<S, D::Value, E, DD::Value>,
    domain: D,
    distances: DD,
}

impl<S, E, D, DD> SpatialTemporalMonitor<S, E, D, DD>
where
    D: ValueDomain,
    DD: DistanceDomain,
{
    /// Compile a formula using the given bindings.
    ///
    /// Fails if an atomic proposition or a distance used by the formula has no binding.
    pub fn new(
        formula: &Formula,
        bindings: &SpatialBindings<S, D::Value, E, DD::Value>,
        domain: D,
        distances: DD,
    ) -> Result<Self, SpatialMonitorError> {
        let root = Node::compile(formula, bindings)?;
        debug!(formula = %formula, spatial = formula.is_spatial(), "compiled spatio-temporal monitor");

        Ok(Self {
            formula: formula.clone(),
            root,
            domain,
            distances,
        })
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn distances(&self) -> &DD {
        &self.distances
    }
}

impl<S, E, D, DD> SpatialTemporalMonitor<S, E, D, DD>
where
    D: ValueDomain + Sync,
    D::Value: Send + Sync,
    DD: DistanceDomain + Clone + Sync,
    DD::Value: Sync,
{
    /// Evaluate the formula at every location of `signal`, using `locations` to obtain the space
    /// at every time.
    ///
    /// Fails if the space is unknown at a time where a spatial operator has to be evaluated, or if
    /// the number of locations of the space does not match the signal.
    pub fn monitor<L>(
        &self,
        locations: &L,
        signal: &SpatialTemporalSignal<S>,
    ) -> Result<SpatialTemporalSignal<D::Value>, SpatialMonitorError>
    where
        L: LocationService<E>,
    {
        let context = Context {
            domain: &self.domain,
            distances: &self.distances,
            locations,
        };

        self.root
            .evaluate(&context, signal)
            .map(SpatialTemporalSignal::from_locations)
    }
}

impl<S, E, D, DD> Debug for SpatialTemporalMonitor<S, E, D, DD>
where
    D: ValueDomain + Debug,
    DD: DistanceDomain + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialTemporalMonitor")
            .field("formula", &self.formula.to_string())
            .field("domain", &self.domain)
            .field("distances", &self.distances)
            .finish()
    }
}
