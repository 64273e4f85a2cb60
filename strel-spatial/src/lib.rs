//! Spatial models and spatio-temporal operators for monitoring STREL formulas.
//!
//! STREL extends Signal Temporal Logic with operators that reason about the distance between the
//! locations of a system, such as the nodes of a sensor network or a fleet of vehicles. The space
//! is a [`SpatialModel`] whose edges are measured in a [`DistanceDomain`], and the
//! [`SpatialTemporalMonitor`] evaluates a formula at every location of a
//! [`SpatialTemporalSignal`].
//!
//! | operator   | constructor                             |
//! | ---------- | --------------------------------------- |
//! | everywhere | [`Formula::everywhere`](strel_core::Formula::everywhere) |
//! | somewhere  | [`Formula::somewhere`](strel_core::Formula::somewhere)   |
//! | reach      | [`Formula::reach`](strel_core::Formula::reach)           |
//! | escape     | [`Formula::escape`](strel_core::Formula::escape)         |
//!
//! With the `parallel` feature, which is enabled by default, the spatial operators evaluate the
//! locations of a model on the [rayon] thread pool.
//!
//! [rayon]: https://docs.rs/rayon

pub mod algorithms;
pub mod distance;
pub mod location;
pub mod model;
pub mod monitor;
pub mod structure;

pub use crate::distance::{DistanceDomain, DoubleDistance, IntegerDistance};
pub use crate::location::{LocationService, StaticLocationService, TimedLocationService};
pub use crate::model::{SpatialModel, SpatialModelError};
pub use crate::monitor::{
    DistanceFunction, SpatialBindings, SpatialMonitorError, SpatialTemporalMonitor, SpatialTemporalSignal,
};
pub use crate::structure::DistanceStructure;
