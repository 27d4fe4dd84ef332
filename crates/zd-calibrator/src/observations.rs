//! The calibrator's JSON input: observed `y`/`ẏ` trajectories keyed by
//! variable name, mirroring `applications/calibrator.cpp`'s input shape.

use std::collections::HashMap;

use nalgebra::DVector;
use serde::Deserialize;
use zd_core::numeric::Real;
use zd_graph::DofHandler;

use crate::error::{CalibratorError, CalibratorResult};

/// Raw observation JSON: two maps, each keyed by the variable name the DOF
/// handler registered it under, holding one sample per observed time point.
#[derive(Debug, Deserialize)]
pub struct ObservationSet {
    pub y: HashMap<String, Vec<Real>>,
    pub dy: HashMap<String, Vec<Real>>,
}

impl ObservationSet {
    pub fn from_json(text: &str) -> CalibratorResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Number of observed time points, taken from the first series seen;
    /// every series in both `y` and `dy` must agree with it.
    fn num_samples(&self) -> CalibratorResult<usize> {
        let t = self
            .y
            .values()
            .next()
            .or_else(|| self.dy.values().next())
            .map(|v| v.len())
            .ok_or_else(|| CalibratorError::MalformedObservations {
                what: "observation set has no series".to_string(),
            })?;
        for (name, series) in self.y.iter().chain(self.dy.iter()) {
            if series.len() != t {
                return Err(CalibratorError::MalformedObservations {
                    what: format!("series \"{name}\" has {} samples, expected {t}", series.len()),
                });
            }
        }
        Ok(t)
    }

    /// Scatter this observation set's named series into dense `(y, ẏ)` pairs
    /// ordered by the DOF handler's global variable indices, one pair per
    /// observed time point. A variable present in the model but absent from
    /// the observation set is left at zero — `update_gradient` only reads
    /// the DOFs its block actually needs.
    pub fn to_dense(
        &self,
        dofhandler: &DofHandler,
    ) -> CalibratorResult<Vec<(DVector<Real>, DVector<Real>)>> {
        let t = self.num_samples()?;
        let n = dofhandler.size();
        let mut samples = vec![(DVector::zeros(n), DVector::zeros(n)); t];

        for (name, series) in &self.y {
            let idx = dofhandler.index_of_variable(name)?;
            for (sample, &v) in samples.iter_mut().zip(series.iter()) {
                sample.0[idx] = v;
            }
        }
        for (name, series) in &self.dy {
            let idx = dofhandler.index_of_variable(name)?;
            for (sample, &v) in samples.iter_mut().zip(series.iter()) {
                sample.1[idx] = v;
            }
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatters_named_series_into_dof_order() {
        let mut dh = DofHandler::new();
        zd_graph::Node::register(zd_core::NodeId::from_index(0), "N0", &mut dh);

        let mut y = HashMap::new();
        y.insert("N0:P".to_string(), vec![1.0, 2.0, 3.0]);
        let mut dy = HashMap::new();
        dy.insert("N0:Q".to_string(), vec![10.0, 20.0, 30.0]);
        let obs = ObservationSet { y, dy };

        let samples = obs.to_dense(&dh).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].0[0], 2.0);
        assert_eq!(samples[2].1[1], 30.0);
    }

    #[test]
    fn mismatched_series_lengths_rejected() {
        let mut dh = DofHandler::new();
        zd_graph::Node::register(zd_core::NodeId::from_index(0), "N0", &mut dh);

        let mut y = HashMap::new();
        y.insert("N0:P".to_string(), vec![1.0, 2.0]);
        y.insert("N0:Q".to_string(), vec![1.0]);
        let obs = ObservationSet {
            y,
            dy: HashMap::new(),
        };

        assert!(obs.to_dense(&dh).is_err());
    }

    #[test]
    fn unknown_variable_name_is_rejected() {
        let dh = DofHandler::new();
        let mut y = HashMap::new();
        y.insert("ghost:P".to_string(), vec![1.0]);
        let obs = ObservationSet {
            y,
            dy: HashMap::new(),
        };
        assert!(matches!(obs.to_dense(&dh), Err(CalibratorError::Graph(_))));
    }
}
