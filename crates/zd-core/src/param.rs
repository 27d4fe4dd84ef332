//! Parameter values and the flat parameter store.
//!
//! A [`Parameter`] is either a constant scalar or a piecewise-linear time
//! series, optionally periodic. Blocks never own a `Parameter` directly —
//! they hold [`ParamId`]s into a shared [`ParamStore`], so the calibrator and
//! the scripting-rename surface can update parameter values uniformly
//! without reaching into block internals.

use crate::numeric::Real;
use crate::ZdError;

/// Index into a [`ParamStore`].
pub type ParamId = usize;

/// A scalar or time-series parameter value.
///
/// Time-series parameters may be periodic (evaluation wraps `t` into
/// `[times[0], times[0] + period)` before interpolating) or aperiodic (`t`
/// is used directly, with the nearest segment used for extrapolation beyond
/// the stored range — the externally-coupled mode).
#[derive(Clone, Debug)]
pub enum Parameter {
    Constant(Real),
    Series(Series),
}

#[derive(Clone, Debug)]
pub struct Series {
    times: Vec<Real>,
    values: Vec<Real>,
    periodic: bool,
    cache: Option<(Vec<Real>, Vec<Real>, bool)>,
}

impl Parameter {
    pub fn constant(value: Real) -> Self {
        Parameter::Constant(value)
    }

    /// Build a time-series parameter. `times` must be sorted ascending and
    /// the same length as `values`; a single-element series behaves like a
    /// constant.
    pub fn series(times: Vec<Real>, values: Vec<Real>, periodic: bool) -> Result<Self, ZdError> {
        if times.len() != values.len() {
            return Err(ZdError::SizeMismatch {
                what: "parameter time series",
                expected: times.len(),
                got: values.len(),
            });
        }
        if times.is_empty() {
            return Err(ZdError::InvalidArg {
                what: "parameter time series must not be empty",
            });
        }
        if values.len() == 1 {
            return Ok(Parameter::Constant(values[0]));
        }
        Ok(Parameter::Series(Series {
            times,
            values,
            periodic,
            cache: None,
        }))
    }

    /// Evaluate the parameter at time `t`.
    pub fn evaluate(&self, t: Real) -> Real {
        match self {
            Parameter::Constant(v) => *v,
            Parameter::Series(s) => s.evaluate(t),
        }
    }

    /// Replace a time-series parameter with its mean, caching the original
    /// series so `to_unsteady` can restore it. No-op on a constant.
    pub fn to_steady(&mut self) {
        if let Parameter::Series(s) = self {
            s.to_steady();
        }
    }

    /// Restore a parameter previously collapsed by `to_steady`. No-op if no
    /// prior `to_steady` call happened.
    pub fn to_unsteady(&mut self) {
        if let Parameter::Series(s) = self {
            s.to_unsteady();
        }
    }

    /// Replace the stored values (constant: a single value; series: one
    /// value per existing time point).
    pub fn update(&mut self, values: &[Real]) -> Result<(), ZdError> {
        match self {
            Parameter::Constant(v) => {
                if values.len() != 1 {
                    return Err(ZdError::SizeMismatch {
                        what: "constant parameter update",
                        expected: 1,
                        got: values.len(),
                    });
                }
                *v = values[0];
                Ok(())
            }
            Parameter::Series(s) => s.update_values(values),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Parameter::Constant(_))
    }
}

impl Series {
    fn evaluate(&self, t: Real) -> Real {
        let period = self.times.last().unwrap() - self.times[0];
        let rtime = if self.periodic && period > 0.0 {
            let m = (t - self.times[0]) % period;
            let m = if m < 0.0 { m + period } else { m };
            self.times[0] + m
        } else {
            t
        };

        match self
            .times
            .binary_search_by(|probe| probe.partial_cmp(&rtime).unwrap())
        {
            Ok(k) => self.values[k],
            Err(k) => {
                if k == 0 {
                    self.values[0]
                } else if k >= self.times.len() {
                    self.values[self.times.len() - 1]
                } else {
                    let l = k - 1;
                    let frac = (rtime - self.times[l]) / (self.times[k] - self.times[l]);
                    self.values[l] + frac * (self.values[k] - self.values[l])
                }
            }
        }
    }

    fn to_steady(&mut self) {
        let mean = self.values.iter().sum::<Real>() / self.values.len() as Real;
        self.cache = Some((
            std::mem::take(&mut self.times),
            std::mem::take(&mut self.values),
            self.periodic,
        ));
        self.times = vec![0.0];
        self.values = vec![mean];
    }

    fn to_unsteady(&mut self) {
        if let Some((times, values, periodic)) = self.cache.take() {
            self.times = times;
            self.values = values;
            self.periodic = periodic;
        }
    }

    fn update_values(&mut self, values: &[Real]) -> Result<(), ZdError> {
        if values.len() != self.values.len() {
            return Err(ZdError::SizeMismatch {
                what: "time series parameter update",
                expected: self.values.len(),
                got: values.len(),
            });
        }
        self.values.copy_from_slice(values);
        Ok(())
    }
}

/// Flat, append-only storage for every parameter in a model.
///
/// Blocks reference parameters by [`ParamId`] (their index here) rather than
/// owning them, so the calibrator can treat every parameter uniformly and a
/// scripting binding can rename/update a parameter by name without touching
/// any block.
#[derive(Clone, Debug, Default)]
pub struct ParamStore {
    params: Vec<Parameter>,
    names: Vec<String>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter under `name`, returning its id.
    pub fn push(&mut self, name: impl Into<String>, param: Parameter) -> ParamId {
        let id = self.params.len();
        self.params.push(param);
        self.names.push(name.into());
        id
    }

    pub fn evaluate(&self, id: ParamId, t: Real) -> Real {
        self.params[id].evaluate(t)
    }

    pub fn get(&self, id: ParamId) -> &Parameter {
        &self.params[id]
    }

    pub fn get_mut(&mut self, id: ParamId) -> &mut Parameter {
        &mut self.params[id]
    }

    pub fn name(&self, id: ParamId) -> &str {
        &self.names[id]
    }

    /// Look up a parameter id by name, used by the scripting-rename surface
    /// and by config loading error messages.
    pub fn id_by_name(&self, name: &str) -> Option<ParamId> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn to_steady_all(&mut self) {
        for p in &mut self.params {
            p.to_steady();
        }
    }

    pub fn to_unsteady_all(&mut self) {
        for p in &mut self.params {
            p.to_unsteady();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_evaluates_to_itself() {
        let p = Parameter::constant(4.0);
        assert_eq!(p.evaluate(0.0), 4.0);
        assert_eq!(p.evaluate(123.0), 4.0);
    }

    #[test]
    fn single_value_series_collapses_to_constant() {
        let p = Parameter::series(vec![0.0], vec![7.0], true).unwrap();
        assert!(p.is_constant());
    }

    #[test]
    fn periodic_series_wraps() {
        let p = Parameter::series(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 0.0], true).unwrap();
        assert!((p.evaluate(0.5) - 5.0).abs() < 1e-12);
        // period is 2.0, so t=2.5 behaves like t=0.5
        assert!((p.evaluate(2.5) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn aperiodic_series_extrapolates_nearest_segment() {
        let p = Parameter::series(vec![0.0, 1.0], vec![0.0, 10.0], false).unwrap();
        assert_eq!(p.evaluate(5.0), 10.0);
        assert_eq!(p.evaluate(-5.0), 0.0);
    }

    #[test]
    fn to_steady_then_unsteady_round_trips() {
        let mut p = Parameter::series(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0], true).unwrap();
        p.to_steady();
        assert!(p.is_constant());
        assert!((p.evaluate(999.0) - 10.0).abs() < 1e-12);
        p.to_unsteady();
        assert!(!p.is_constant());
        assert!((p.evaluate(1.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn param_store_round_trips_by_name() {
        let mut store = ParamStore::new();
        let id = store.push("R_poiseuille", Parameter::constant(100.0));
        assert_eq!(store.id_by_name("R_poiseuille"), Some(id));
        assert_eq!(store.evaluate(id, 0.0), 100.0);
    }
}
