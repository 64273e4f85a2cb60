//! Sources of the spatial model at every time.
//!
//! The space of a system can change while it is being observed, for example when mobile agents
//! move in and out of communication range. A [`LocationService`] returns the model that holds at
//! a given time together with the times at which the model changes, so that the monitor only
//! rebuilds its distance structures when necessary.
use strel_core::SignalError;

use crate::model::SpatialModel;

pub trait LocationService<E> {
    /// Model holding at `time`, or [`None`] if the space is unknown at that time.
    fn model_at(&self, time: f64) -> Option<&SpatialModel<E>>;

    /// Times at which the model changes, in increasing order.
    fn change_times(&self) -> Vec<f64>;
}

impl<E, T> LocationService<E> for &T
where
    T: LocationService<E> + ?Sized,
{
    fn model_at(&self, time: f64) -> Option<&SpatialModel<E>> {
        (**self).model_at(time)
    }

    fn change_times(&self) -> Vec<f64> {
        (**self).change_times()
    }
}

/// A single model that holds at every time.
#[derive(Debug, Clone)]
pub struct StaticLocationService<E> {
    model: SpatialModel<E>,
}

impl<E> StaticLocationService<E> {
    pub fn new(model: SpatialModel<E>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &SpatialModel<E> {
        &self.model
    }
}

impl<E> From<SpatialModel<E>> for StaticLocationService<E> {
    fn from(model: SpatialModel<E>) -> Self {
        Self::new(model)
    }
}

impl<E> LocationService<E> for StaticLocationService<E> {
    fn model_at(&self, _: f64) -> Option<&SpatialModel<E>> {
        Some(&self.model)
    }

    fn change_times(&self) -> Vec<f64> {
        Vec::new()
    }
}

/// A piecewise-constant sequence of models.
///
/// Each model holds from the time it was added until the time of the next one. The last model
/// holds forever, and no model is known before the first time.
///
/// # Examples
///
/// ```rust
/// use strel_spatial::location::{LocationService, TimedLocationService};
/// use strel_spatial::model::SpatialModel;
///
/// let mut service = TimedLocationService::new();
/// service.add(0.0, SpatialModel::<f64>::new(2)).unwrap();
/// service.add(5.0, SpatialModel::from_edges(2, [(0, 1.0, 1)]).unwrap()).unwrap();
///
/// assert!(service.model_at(-1.0).is_none());
/// assert_eq!(service.model_at(4.9).map(|model| model.edges().count()), Some(0));
/// assert_eq!(service.model_at(5.0).map(|model| model.edges().count()), Some(1));
/// assert_eq!(service.change_times(), vec![0.0, 5.0]);
/// ```
#[derive(Debug, Clone)]
pub struct TimedLocationService<E> {
    models: Vec<(f64, SpatialModel<E>)>,
}

impl<E> TimedLocationService<E> {
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// Add a model holding from `time` onwards. Times must be strictly increasing.
    pub fn add(&mut self, time: f64, model: SpatialModel<E>) -> Result<(), SignalError> {
        if time.is_nan() {
            return Err(SignalError::NanTime);
        }

        if let Some((last, _)) = self.models.last() {
            if time <= *last {
                return Err(SignalError::NonMonotonicTime { time, last: *last });
            }
        }

        self.models.push((time, model));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<E> Default for TimedLocationService<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> LocationService<E> for TimedLocationService<E> {
    fn model_at(&self, time: f64) -> Option<&SpatialModel<E>> {
        let index = self.models.partition_point(|(start, _)| *start <= time);

        index.checked_sub(1).map(|index| &self.models[index].1)
    }

    fn change_times(&self) -> Vec<f64> {
        self.models.iter().map(|(time, _)| *time).collect()
    }
}

#[cfg(test)]
mod tests {
    use strel_core::SignalError;

    use super::{LocationService, StaticLocationService, TimedLocationService};
    use crate::model::SpatialModel;

    #[test]
    fn static_service() {
        let service = StaticLocationService::from(SpatialModel::<()>::new(3));

        assert_eq!(service.model_at(-100.0).map(SpatialModel::size), Some(3));
        assert_eq!(service.model_at(100.0).map(SpatialModel::size), Some(3));
        assert!(service.change_times().is_empty());
    }

    #[test]
    fn timed_service_rejects_unordered_models() {
        let mut service = TimedLocationService::new();
        service.add(1.0, SpatialModel::<()>::new(1)).unwrap();

        assert_eq!(
            service.add(1.0, SpatialModel::new(1)),
            Err(SignalError::NonMonotonicTime { time: 1.0, last: 1.0 })
        );
        assert_eq!(service.add(f64::NAN, SpatialModel::new(1)), Err(SignalError::NanTime));
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn timed_service_lookup() {
        let mut service = TimedLocationService::new();
        service.add(0.0, SpatialModel::<()>::new(1)).unwrap();
        service.add(2.0, SpatialModel::new(2)).unwrap();
        service.add(4.0, SpatialModel::new(3)).unwrap();

        assert_eq!(service.model_at(1.9).map(SpatialModel::size), Some(1));
        assert_eq!(service.model_at(2.0).map(SpatialModel::size), Some(2));
        assert_eq!(service.model_at(10.0).map(SpatialModel::size), Some(3));
    }
}
