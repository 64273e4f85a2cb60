//! Syntax tree of spatio-temporal formulas.
//!
//! A [`Formula`] only describes the structure of a property. It does not know how to evaluate the
//! atomic propositions or how to measure distances between locations; those are supplied by name
//! through [`Bindings`](crate::monitor::Bindings) when the formula is compiled into a monitor.
//!
//! # Examples
//!
//! ```rust
//! use strel_core::formula::{Formula, Interval};
//!
//! // At every time, if the gear is 3 then within 3 time units the gear is 4
//! let phi = Formula::globally(Formula::implies(
//!     Formula::atomic("gear_3"),
//!     Formula::eventually_within(Interval::new(0.0, 3.0).unwrap(), Formula::atomic("gear_4")),
//! ));
//!
//! assert_eq!(phi.to_string(), "G (gear_3 -> F[0,3] gear_4)");
//! ```
use std::fmt::{Display, Formatter};
use std::ops::{RangeFrom, RangeInclusive};

use thiserror::Error;

/// Error produced when constructing an [`Interval`] from invalid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntervalError {
    #[error("Interval bounds cannot be NaN")]
    NotANumber,

    #[error("Interval lower bound {0} is negative")]
    Negative(f64),

    #[error("Interval lower bound {0} is not finite")]
    InfiniteLower(f64),

    #[error("Interval lower bound {lower} is greater than the upper bound {upper}")]
    Reversed { lower: f64, upper: f64 },
}

/// Closed interval `[lower, upper]` of non-negative values.
///
/// Intervals bound the time window of temporal operators and the distance window of spatial
/// operators. The upper bound may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    lower: f64,
    upper: f64,
}

impl Interval {
    /// Create the interval `[lower, upper]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strel_core::formula::Interval;
    ///
    /// assert!(Interval::new(0.0, 2.0).is_ok());
    /// assert!(Interval::new(2.0, 1.0).is_err());
    /// assert!(Interval::new(-1.0, 1.0).is_err());
    /// ```
    pub fn new(lower: f64, upper: f64) -> Result<Self, IntervalError> {
        if lower.is_nan() || upper.is_nan() {
            return Err(IntervalError::NotANumber);
        }

        if lower < 0.0 {
            return Err(IntervalError::Negative(lower));
        }

        if lower.is_infinite() {
            return Err(IntervalError::InfiniteLower(lower));
        }

        if lower > upper {
            return Err(IntervalError::Reversed { lower, upper });
        }

        Ok(Self { lower, upper })
    }

    /// Create the interval `[lower, ∞)`.
    pub fn from_lower(lower: f64) -> Result<Self, IntervalError> {
        Self::new(lower, f64::INFINITY)
    }

    /// The interval `[0, ∞)`.
    pub fn unbounded() -> Self {
        Self { lower: 0.0, upper: f64::INFINITY }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Whether the upper bound is finite.
    pub fn is_bounded(&self) -> bool {
        self.upper.is_finite()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_bounded() {
            write!(f, "[{},{}]", self.lower, self.upper)
        } else {
            write!(f, "[{},inf)", self.lower)
        }
    }
}

impl<T> TryFrom<RangeInclusive<T>> for Interval
where
    T: Into<f64>,
{
    type Error = IntervalError;

    fn try_from(range: RangeInclusive<T>) -> Result<Self, Self::Error> {
        let (lower, upper) = range.into_inner();
        Self::new(lower.into(), upper.into())
    }
}

impl<T> TryFrom<RangeFrom<T>> for Interval
where
    T: Into<f64>,
{
    type Error = IntervalError;

    fn try_from(range: RangeFrom<T>) -> Result<Self, Self::Error> {
        Self::from_lower(range.start.into())
    }
}

/// Immutable formula tree.
///
/// Temporal operators carry an optional [`Interval`]; `None` means the operator considers the
/// whole remaining signal (or, for past operators, the whole signal prefix). Spatial operators
/// carry the name of the distance function used to measure edges and the distance bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Atomic(String),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Eventually {
        subformula: Box<Formula>,
        interval: Option<Interval>,
    },
    Globally {
        subformula: Box<Formula>,
        interval: Option<Interval>,
    },
    Once {
        subformula: Box<Formula>,
        interval: Option<Interval>,
    },
    Historically {
        subformula: Box<Formula>,
        interval: Option<Interval>,
    },
    Until {
        left: Box<Formula>,
        right: Box<Formula>,
        interval: Option<Interval>,
    },
    Since {
        left: Box<Formula>,
        right: Box<Formula>,
        interval: Option<Interval>,
    },
    Everywhere {
        subformula: Box<Formula>,
        distance: String,
        bound: Interval,
    },
    Somewhere {
        subformula: Box<Formula>,
        distance: String,
        bound: Interval,
    },
    Reach {
        left: Box<Formula>,
        right: Box<Formula>,
        distance: String,
        bound: Interval,
    },
    Escape {
        subformula: Box<Formula>,
        distance: String,
        bound: Interval,
    },
}

impl Formula {
    pub fn atomic(name: impl Into<String>) -> Self {
        Self::Atomic(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(subformula: Formula) -> Self {
        Self::Not(Box::new(subformula))
    }

    pub fn and(left: Formula, right: Formula) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(ante: Formula, cons: Formula) -> Self {
        Self::Implies(Box::new(ante), Box::new(cons))
    }

    pub fn eventually(subformula: Formula) -> Self {
        Self::Eventually { subformula: Box::new(subformula), interval: None }
    }

    pub fn eventually_within(interval: Interval, subformula: Formula) -> Self {
        Self::Eventually { subformula: Box::new(subformula), interval: Some(interval) }
    }

    pub fn globally(subformula: Formula) -> Self {
        Self::Globally { subformula: Box::new(subformula), interval: None }
    }

    pub fn globally_within(interval: Interval, subformula: Formula) -> Self {
        Self::Globally { subformula: Box::new(subformula), interval: Some(interval) }
    }

    pub fn once(subformula: Formula) -> Self {
        Self::Once { subformula: Box::new(subformula), interval: None }
    }

    pub fn once_within(interval: Interval, subformula: Formula) -> Self {
        Self::Once { subformula: Box::new(subformula), interval: Some(interval) }
    }

    pub fn historically(subformula: Formula) -> Self {
        Self::Historically { subformula: Box::new(subformula), interval: None }
    }

    pub fn historically_within(interval: Interval, subformula: Formula) -> Self {
        Self::Historically { subformula: Box::new(subformula), interval: Some(interval) }
    }

    pub fn until(left: Formula, right: Formula) -> Self {
        Self::Until { left: Box::new(left), right: Box::new(right), interval: None }
    }

    pub fn until_within(interval: Interval, left: Formula, right: Formula) -> Self {
        Self::Until { left: Box::new(left), right: Box::new(right), interval: Some(interval) }
    }

    pub fn since(left: Formula, right: Formula) -> Self {
        Self::Since { left: Box::new(left), right: Box::new(right), interval: None }
    }

    pub fn since_within(interval: Interval, left: Formula, right: Formula) -> Self {
        Self::Since { left: Box::new(left), right: Box::new(right), interval: Some(interval) }
    }

    pub fn everywhere(distance: impl Into<String>, bound: Interval, subformula: Formula) -> Self {
        Self::Everywhere { subformula: Box::new(subformula), distance: distance.into(), bound }
    }

    pub fn somewhere(distance: impl Into<String>, bound: Interval, subformula: Formula) -> Self {
        Self::Somewhere { subformula: Box::new(subformula), distance: distance.into(), bound }
    }

    pub fn reach(distance: impl Into<String>, bound: Interval, left: Formula, right: Formula) -> Self {
        Self::Reach {
            left: Box::new(left),
            right: Box::new(right),
            distance: distance.into(),
            bound,
        }
    }

    pub fn escape(distance: impl Into<String>, bound: Interval, subformula: Formula) -> Self {
        Self::Escape { subformula: Box::new(subformula), distance: distance.into(), bound }
    }

    /// Short name of the top-level operator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Atomic(_) => "atomic",
            Self::Not(_) => "not",
            Self::And(..) => "and",
            Self::Or(..) => "or",
            Self::Implies(..) => "implies",
            Self::Eventually { .. } => "eventually",
            Self::Globally { .. } => "globally",
            Self::Once { .. } => "once",
            Self::Historically { .. } => "historically",
            Self::Until { .. } => "until",
            Self::Since { .. } => "since",
            Self::Everywhere { .. } => "everywhere",
            Self::Somewhere { .. } => "somewhere",
            Self::Reach { .. } => "reach",
            Self::Escape { .. } => "escape",
        }
    }

    /// Whether the formula contains a spatial operator.
    pub fn is_spatial(&self) -> bool {
        match self {
            Self::Atomic(_) => false,
            Self::Not(sub)
            | Self::Eventually { subformula: sub, .. }
            | Self::Globally { subformula: sub, .. }
            | Self::Once { subformula: sub, .. }
            | Self::Historically { subformula: sub, .. } => sub.is_spatial(),
            Self::And(left, right)
            | Self::Or(left, right)
            | Self::Implies(left, right)
            | Self::Until { left, right, .. }
            | Self::Since { left, right, .. } => left.is_spatial() || right.is_spatial(),
            Self::Everywhere { .. } | Self::Somewhere { .. } | Self::Reach { .. } | Self::Escape { .. } => true,
        }
    }
}

fn write_bounds(f: &mut Formatter<'_>, interval: &Option<Interval>) -> std::fmt::Result {
    match interval {
        Some(interval) => write!(f, "{}", interval),
        None => Ok(()),
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atomic(name) => write!(f, "{}", name),
            Self::Not(sub) => write!(f, "!{}", sub),
            Self::And(left, right) => write!(f, "({} & {})", left, right),
            Self::Or(left, right) => write!(f, "({} | {})", left, right),
            Self::Implies(left, right) => write!(f, "({} -> {})", left, right),
            Self::Eventually { subformula, interval } => {
                write!(f, "F")?;
                write_bounds(f, interval)?;
                write!(f, " {}", subformula)
            }
            Self::Globally { subformula, interval } => {
                write!(f, "G")?;
                write_bounds(f, interval)?;
                write!(f, " {}", subformula)
            }
            Self::Once { subformula, interval } => {
                write!(f, "O")?;
                write_bounds(f, interval)?;
                write!(f, " {}", subformula)
            }
            Self::Historically { subformula, interval } => {
                write!(f, "H")?;
                write_bounds(f, interval)?;
                write!(f, " {}", subformula)
            }
            Self::Until { left, right, interval } => {
                write!(f, "({} U", left)?;
                write_bounds(f, interval)?;
                write!(f, " {})", right)
            }
            Self::Since { left, right, interval } => {
                write!(f, "({} S", left)?;
                write_bounds(f, interval)?;
                write!(f, " {})", right)
            }
            Self::Everywhere { subformula, distance, bound } => {
                write!(f, "everywhere{}<{}> {}", bound, distance, subformula)
            }
            Self::Somewhere { subformula, distance, bound } => {
                write!(f, "somewhere{}<{}> {}", bound, distance, subformula)
            }
            Self::Reach { left, right, distance, bound } => {
                write!(f, "({} reach{}<{}> {})", left, bound, distance, right)
            }
            Self::Escape { subformula, distance, bound } => {
                write!(f, "escape{}<{}> {}", bound, distance, subformula)
            }
        }
    }
}
