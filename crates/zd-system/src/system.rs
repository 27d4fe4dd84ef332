//! The backend-agnostic assembly surface blocks write into.
//!
//! [`DenseSystem`](crate::dense::DenseSystem) and
//! [`SparseSystem`](crate::sparse::SparseSystem) both implement [`System`];
//! every block writes its contributions through this trait so the same block
//! code drives either backend (§8 "sparse vs. dense equivalence").

use nalgebra::DVector;
use zd_core::numeric::Real;

use crate::error::SystemResult;

/// Upper bound on the number of distinct (row, column) positions a block
/// will ever write into each of E, F, D across every phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumTriplets {
    pub e: usize,
    pub f: usize,
    pub d: usize,
}

impl NumTriplets {
    pub fn new(e: usize, f: usize, d: usize) -> Self {
        Self { e, f, d }
    }

    pub fn accumulate(&mut self, other: NumTriplets) {
        self.e += other.e;
        self.f += other.f;
        self.d += other.d;
    }
}

/// Assembly surface for one of E, F, D, c (and the residual/Jacobian derived
/// from them).
///
/// During the symbolic reserve phase, `set_*` calls register the
/// (row, column) positions a block touches; after `compress` those positions
/// are frozen and every subsequent `set_*` call must target an already
/// registered position (`SystemError::UnreservedPosition` otherwise).
pub trait System {
    /// System dimension N (= DofHandler::size()).
    fn size(&self) -> usize;

    /// During the reserve phase: register the position. After compression:
    /// overwrite the value stored there.
    fn set_e(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()>;
    fn set_f(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()>;
    fn set_d(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()>;

    /// `c` is dense (length N); no reservation needed.
    fn set_c(&mut self, row: usize, val: Real);

    /// Reset `c` to zero ahead of a fresh `update_time`/`update_solution`
    /// pass, since unlike E/F/D its entries are a plain overwrite of a dense
    /// vector rather than a sparse position.
    fn reset_c(&mut self);

    /// Freeze the sparsity pattern established so far. No-op on a dense
    /// backend. Must be called exactly once, after the symbolic reserve pass
    /// and before any real time step.
    fn compress(&mut self) -> SystemResult<()>;

    /// `residual = -E·ẏ - F·y - c`, per §4.7 step 3. Object-safe so the
    /// generalized-α integrator can drive either backend through `&mut dyn
    /// System` and satisfy the dense/sparse equivalence property with one
    /// code path.
    fn residual(&self, y: &DVector<Real>, ydot: &DVector<Real>) -> DVector<Real>;

    /// Assemble `Jacobian = F + D + coeff·E` and solve `Jacobian · δ =
    /// residual`, reusing whatever retained factorization the backend keeps
    /// (the sparse backend's symbolic analysis; the dense backend has
    /// nothing to retain and just re-runs LU).
    fn solve_step(&mut self, coeff: Real, residual: &DVector<Real>) -> SystemResult<DVector<Real>>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// A trivial in-memory System used only to unit-test block assembly
    /// logic without pulling in the dense/sparse backends.
    #[derive(Default)]
    pub struct RecordingSystem {
        pub n: usize,
        pub e: HashMap<(usize, usize), Real>,
        pub f: HashMap<(usize, usize), Real>,
        pub d: HashMap<(usize, usize), Real>,
        pub c: Vec<Real>,
    }

    impl RecordingSystem {
        pub fn new(n: usize) -> Self {
            Self {
                n,
                c: vec![0.0; n],
                ..Default::default()
            }
        }
    }

    impl System for RecordingSystem {
        fn size(&self) -> usize {
            self.n
        }
        fn set_e(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
            self.e.insert((row, col), val);
            Ok(())
        }
        fn set_f(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
            self.f.insert((row, col), val);
            Ok(())
        }
        fn set_d(&mut self, row: usize, col: usize, val: Real) -> SystemResult<()> {
            self.d.insert((row, col), val);
            Ok(())
        }
        fn set_c(&mut self, row: usize, val: Real) {
            self.c[row] = val;
        }
        fn reset_c(&mut self) {
            self.c.iter_mut().for_each(|v| *v = 0.0);
        }
        fn compress(&mut self) -> SystemResult<()> {
            Ok(())
        }
        fn residual(&self, _y: &DVector<Real>, _ydot: &DVector<Real>) -> DVector<Real> {
            DVector::zeros(self.n)
        }
        fn solve_step(&mut self, _coeff: Real, _residual: &DVector<Real>) -> SystemResult<DVector<Real>> {
            Ok(DVector::zeros(self.n))
        }
    }
}
