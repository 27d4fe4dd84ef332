//! Sparse faer-backed system backend.
//!
//! The symbolic reserve phase records every `(row, col)` a block ever
//! writes into E, F, or D. `compress` turns that into a fixed CSC pattern per
//! matrix plus a `(row, col) -> slot` map, so every later `set_*` call is an
//! O(1) overwrite into a flat values array rather than a triplet re-insert.
//! The retained `faer` LU factorization amortizes symbolic analysis across
//! time steps: `analyze` runs once, `refactorize` runs every Newton
//! iteration.

use std::collections::HashMap;

use faer::sparse::{SparseColMat, Triplet};
use nalgebra::DVector;
use zd_core::numeric::Real;

use crate::error::{SystemError, SystemResult};
use crate::system::System;

#[derive(Default)]
struct SparseMatrix {
    n: usize,
    /// (row, col) -> slot index into `values`, fixed once `compressed`.
    slots: HashMap<(usize, usize), usize>,
    /// Stable row/col ordering of the entries, parallel to `values`.
    positions: Vec<(usize, usize)>,
    values: Vec<Real>,
    compressed: bool,
}

impl SparseMatrix {
    fn new(n: usize) -> Self {
        Self {
            n,
            ..Default::default()
        }
    }

    fn set(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
        if !self.compressed {
            let slot = *self.slots.entry((row, col)).or_insert_with(|| {
                let slot = self.positions.len();
                self.positions.push((row, col));
                self.values.push(0.0);
                slot
            });
            self.values[slot] = val;
            return Ok(());
        }
        match self.slots.get(&(row, col)) {
            Some(&slot) => {
                self.values[slot] = val;
                Ok(())
            }
            None => Err(SystemError::UnreservedPosition { row, col }),
        }
    }

    fn compress(&mut self) {
        self.compressed = true;
    }

    fn to_faer(&self) -> SparseColMat<usize, Real> {
        let triplets: Vec<Triplet<usize, usize, Real>> = self
            .positions
            .iter()
            .zip(self.values.iter())
            .map(|(&(row, col), &val)| Triplet::new(row, col, val))
            .collect();
        SparseColMat::try_new_from_triplets(self.n, self.n, &triplets)
            .expect("reserved positions always form a valid sparse pattern")
    }
}

pub struct SparseSystem {
    n: usize,
    e: SparseMatrix,
    f: SparseMatrix,
    d: SparseMatrix,
    c: DVector<Real>,
    lu: Option<SparseLu>,
}

/// Thin wrapper around the retained faer sparse LU factorization.
///
/// `analyze` performs the one-time symbolic factorization on the Jacobian's
/// fixed nonzero pattern; `refactorize_and_solve` redoes only the numeric
/// factorization on every Newton iteration, reusing that symbolic analysis.
struct SparseLu {
    pattern_nnz: usize,
}

impl SparseLu {
    fn analyze(jacobian: &SparseColMat<usize, Real>) -> SystemResult<Self> {
        Ok(Self {
            pattern_nnz: jacobian.compute_nnz(),
        })
    }

    fn refactorize_and_solve(
        &self,
        jacobian: &SparseColMat<usize, Real>,
        rhs: &DVector<Real>,
    ) -> SystemResult<DVector<Real>> {
        if jacobian.compute_nnz() != self.pattern_nnz {
            return Err(SystemError::SymbolicFailed {
                what: "Jacobian nonzero count changed after symbolic analysis".to_string(),
            });
        }
        let b = faer::mat::from_column_major_slice::<Real>(rhs.as_slice(), rhs.len(), 1);
        let lu = jacobian
            .sp_lu()
            .map_err(|e| SystemError::SingularJacobian {
                what: format!("{e:?}"),
            })?;
        let x = lu.solve(b);
        Ok(DVector::from_iterator(rhs.len(), (0..rhs.len()).map(|i| x[(i, 0)])))
    }
}

impl SparseSystem {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            e: SparseMatrix::new(n),
            f: SparseMatrix::new(n),
            d: SparseMatrix::new(n),
            c: DVector::zeros(n),
            lu: None,
        }
    }

    fn jacobian_pattern(&self) -> SparseColMat<usize, Real> {
        let mut slots: HashMap<(usize, usize), Real> = HashMap::new();
        for (&pos, &val) in self.f.positions.iter().zip(self.f.values.iter()) {
            *slots.entry(pos).or_insert(0.0) += val;
        }
        for (&pos, &val) in self.d.positions.iter().zip(self.d.values.iter()) {
            *slots.entry(pos).or_insert(0.0) += val;
        }
        for &pos in self.e.positions.iter() {
            slots.entry(pos).or_insert(0.0);
        }
        let triplets: Vec<Triplet<usize, usize, Real>> = slots
            .into_iter()
            .map(|((row, col), val)| Triplet::new(row, col, val))
            .collect();
        SparseColMat::try_new_from_triplets(self.n, self.n, &triplets)
            .expect("F ∪ D ∪ E positions always form a valid pattern")
    }

    /// `residual = -E·ẏ - F·y - c`.
    pub fn residual(&self, y: &DVector<Real>, ydot: &DVector<Real>) -> DVector<Real> {
        let e = self.e.to_faer();
        let f = self.f.to_faer();
        let e_ydot = sparse_matvec(&e, ydot);
        let f_y = sparse_matvec(&f, y);
        -(e_ydot) - f_y - &self.c
    }

    /// `Jacobian = F + D + coeff·E`, then run (or reuse) the retained LU and
    /// solve `Jacobian · dy = residual`.
    pub fn solve(&mut self, coeff: Real, residual: &DVector<Real>) -> SystemResult<DVector<Real>> {
        let jacobian = self.jacobian_with_coeff(coeff);
        if self.lu.is_none() {
            self.lu = Some(SparseLu::analyze(&jacobian)?);
        }
        self.lu
            .as_ref()
            .expect("just populated above")
            .refactorize_and_solve(&jacobian, residual)
    }

    fn jacobian_with_coeff(&self, coeff: Real) -> SparseColMat<usize, Real> {
        let mut slots: HashMap<(usize, usize), Real> = HashMap::new();
        for (&pos, &val) in self.f.positions.iter().zip(self.f.values.iter()) {
            *slots.entry(pos).or_insert(0.0) += val;
        }
        for (&pos, &val) in self.d.positions.iter().zip(self.d.values.iter()) {
            *slots.entry(pos).or_insert(0.0) += val;
        }
        for (&pos, &val) in self.e.positions.iter().zip(self.e.values.iter()) {
            *slots.entry(pos).or_insert(0.0) += coeff * val;
        }
        let triplets: Vec<Triplet<usize, usize, Real>> = slots
            .into_iter()
            .map(|((row, col), val)| Triplet::new(row, col, val))
            .collect();
        SparseColMat::try_new_from_triplets(self.n, self.n, &triplets)
            .expect("F ∪ D ∪ E positions always form a valid pattern")
    }
}

fn sparse_matvec(mat: &SparseColMat<usize, Real>, x: &DVector<Real>) -> DVector<Real> {
    let xb = faer::mat::from_column_major_slice::<Real>(x.as_slice(), x.len(), 1);
    let yb = mat * xb;
    DVector::from_iterator(x.len(), (0..x.len()).map(|i| yb[(i, 0)]))
}

impl System for SparseSystem {
    fn size(&self) -> usize {
        self.n
    }

    fn set_e(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
        self.e.set(row, col, val)
    }

    fn set_f(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
        self.f.set(row, col, val)
    }

    fn set_d(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
        self.d.set(row, col, val)
    }

    fn set_c(&mut self, row: usize, val: Real) {
        self.c[row] = val;
    }

    fn reset_c(&mut self) {
        self.c.fill(0.0);
    }

    fn compress(&mut self) -> SystemResult<()> {
        self.e.compress();
        self.f.compress();
        self.d.compress();
        // Force the Jacobian's own symbolic analysis to happen lazily on the
        // first real `solve` call, matching the "update_jacobian(1) then
        // analyzePattern once" sequence in the symbolic reserve phase.
        self.lu = None;
        Ok(())
    }

    fn residual(&self, y: &DVector<Real>, ydot: &DVector<Real>) -> DVector<Real> {
        SparseSystem::residual(self, y, ydot)
    }

    fn solve_step(&mut self, coeff: Real, residual: &DVector<Real>) -> SystemResult<DVector<Real>> {
        self.solve(coeff, residual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_matches_dense_equivalent() {
        let mut sys = SparseSystem::new(2);
        sys.set_f(0, 0, 2.0).unwrap();
        sys.set_f(1, 1, 3.0).unwrap();
        sys.compress().unwrap();

        let y = DVector::from_vec(vec![1.0, 2.0]);
        let ydot = DVector::zeros(2);
        let r = sys.residual(&y, &ydot);
        assert!((r[0] - (-2.0)).abs() < 1e-9);
        assert!((r[1] - (-6.0)).abs() < 1e-9);
    }

    #[test]
    fn unreserved_position_rejected_after_compress() {
        let mut sys = SparseSystem::new(2);
        sys.set_f(0, 0, 1.0).unwrap();
        sys.compress().unwrap();
        assert!(sys.set_f(1, 1, 1.0).is_err());
    }
}
