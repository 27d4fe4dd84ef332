//! Dense nalgebra-backed system backend.
//!
//! Mirrors the sparse backend's position-reservation discipline purely so
//! the two backends behave identically under §8's sparse/dense equivalence
//! property, even though a dense matrix never actually needs a sparsity
//! pattern to be useful.

use std::collections::HashSet;

use nalgebra::{DMatrix, DVector};
use zd_core::numeric::Real;

use crate::error::{SystemError, SystemResult};
use crate::system::System;

#[derive(Clone, Debug)]
pub struct DenseSystem {
    n: usize,
    pub e: DMatrix<Real>,
    pub f: DMatrix<Real>,
    pub d: DMatrix<Real>,
    pub c: DVector<Real>,
    reserved: HashSet<(usize, usize)>,
    compressed: bool,
}

impl DenseSystem {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            e: DMatrix::zeros(n, n),
            f: DMatrix::zeros(n, n),
            d: DMatrix::zeros(n, n),
            c: DVector::zeros(n),
            reserved: HashSet::new(),
            compressed: false,
        }
    }

    fn check_position(&mut self, row: usize, col: usize) -> SystemResult<()> {
        if !self.compressed {
            self.reserved.insert((row, col));
            return Ok(());
        }
        if self.reserved.contains(&(row, col)) {
            Ok(())
        } else {
            Err(SystemError::UnreservedPosition { row, col })
        }
    }

    /// `residual = -E·ẏ - F·y - c`, per §4.7 step 3.
    pub fn residual(&self, y: &DVector<Real>, ydot: &DVector<Real>) -> DVector<Real> {
        -(&self.e * ydot) - (&self.f * y) - &self.c
    }

    /// `Jacobian = F + D + coeff·E`, where `coeff = α_m / (α_f·γ·h)`.
    pub fn jacobian(&self, coeff: Real) -> DMatrix<Real> {
        &self.f + &self.d + coeff * &self.e
    }

    /// Solve `jacobian · dy = residual` via nalgebra's dense LU.
    pub fn solve(&self, jacobian: &DMatrix<Real>, residual: &DVector<Real>) -> SystemResult<DVector<Real>> {
        jacobian
            .clone()
            .lu()
            .solve(residual)
            .ok_or(SystemError::SingularDense)
    }
}

impl System for DenseSystem {
    fn size(&self) -> usize {
        self.n
    }

    fn set_e(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
        self.check_position(row, col)?;
        self.e[(row, col)] = val;
        Ok(())
    }

    fn set_f(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
        self.check_position(row, col)?;
        self.f[(row, col)] = val;
        Ok(())
    }

    fn set_d(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
        self.check_position(row, col)?;
        self.d[(row, col)] = val;
        Ok(())
    }

    fn set_c(&mut self, row: usize, val: Real) {
        self.c[row] = val;
    }

    fn reset_c(&mut self) {
        self.c.fill(0.0);
    }

    fn compress(&mut self) -> SystemResult<()> {
        self.compressed = true;
        Ok(())
    }

    fn residual(&self, y: &DVector<Real>, ydot: &DVector<Real>) -> DVector<Real> {
        DenseSystem::residual(self, y, ydot)
    }

    fn solve_step(&mut self, coeff: Real, residual: &DVector<Real>) -> SystemResult<DVector<Real>> {
        let jacobian = self.jacobian(coeff);
        self.solve(&jacobian, residual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_matches_hand_computed_value() {
        let mut sys = DenseSystem::new(2);
        sys.set_f(0, 0, 2.0).unwrap();
        sys.set_f(1, 1, 3.0).unwrap();
        sys.set_c(0, 1.0);
        sys.compress().unwrap();

        let y = DVector::from_vec(vec![1.0, 2.0]);
        let ydot = DVector::zeros(2);
        let r = sys.residual(&y, &ydot);
        // residual = -F*y - c = -(2*1) - 0, -(3*2) - 0
        assert!((r[0] - (-2.0)).abs() < 1e-12);
        assert!((r[1] - (-6.0)).abs() < 1e-12);
    }

    #[test]
    fn unreserved_position_rejected_after_compress() {
        let mut sys = DenseSystem::new(2);
        sys.set_f(0, 0, 1.0).unwrap();
        sys.compress().unwrap();
        assert!(sys.set_f(1, 1, 1.0).is_err());
    }

    #[test]
    fn jacobian_sums_f_d_and_scaled_e() {
        let mut sys = DenseSystem::new(1);
        sys.set_f(0, 0, 2.0).unwrap();
        sys.set_e(0, 0, 4.0).unwrap();
        sys.set_d(0, 0, 1.0).unwrap();
        sys.compress().unwrap();

        let jac = sys.jacobian(0.5);
        assert!((jac[(0, 0)] - (2.0 + 1.0 + 0.5 * 4.0)).abs() < 1e-12);
    }
}
