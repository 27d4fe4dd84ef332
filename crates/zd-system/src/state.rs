//! The DAE state: a pair of vectors sized to the DOF count.

use nalgebra::DVector;
use zd_core::numeric::Real;

/// `y` and `ẏ`, the solution and its time derivative.
///
/// Both are zero-initialized; individual blocks may install block-specific
/// initial conditions after a `State` is created (the heart/pulmonary block
/// seeds four chamber volumes and the pulmonary pressure).
#[derive(Clone, Debug)]
pub struct State {
    pub y: DVector<Real>,
    pub ydot: DVector<Real>,
}

impl State {
    pub fn zeros(n: usize) -> Self {
        Self {
            y: DVector::zeros(n),
            ydot: DVector::zeros(n),
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_sizes_both_vectors() {
        let s = State::zeros(5);
        assert_eq!(s.y.len(), 5);
        assert_eq!(s.ydot.len(), 5);
        assert!(s.y.iter().all(|&v| v == 0.0));
    }
}
