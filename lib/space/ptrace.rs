//! Reduction of a joint operator by partial trace.
//!
//! The engine works entirely on the structurally nonzero entries of the flat
//! sparse matrix: each entry's coordinate is converted to its per-factor
//! multi-index, entries where the traced factor sits off its diagonal are
//! discarded, and the survivors are summed into a function-scoped
//! accumulator keyed by the truncated multi-index. The reduced operator is
//! only ever as dense as the input demands.

use num_complex::Complex64 as C64;
use rustc_hash::FxHashMap;
use crate::{
    sparse::SpMat,
    view::{ SubView, pack_index, unpack_index },
};
use super::{ Space, SpaceError, SpaceResult };

impl Space {
    /// Remove the factor at position `pos` from `self` by summing over its
    /// diagonal, returning the reduced space and the reduced operator.
    ///
    /// The reduced space is the Kronecker composition of all factors except
    /// the one at `pos`, preserving relative order; for a single-factor
    /// space it degenerates to the [scalar space][Space::scalar] and the
    /// reduced operator holds the scalar trace. The reduced operator's trace
    /// always equals the trace of the viewed operator.
    ///
    /// Fails if `pos` is out of range, the view is rank-1, or the view was
    /// created over a space with different dimensions.
    pub fn ptrace(&self, pos: usize, view: &SubView<'_>)
        -> SpaceResult<(Space, SpMat)>
    {
        let op = view.as_op()?;
        if view.dims() != self.size() {
            return Err(SpaceError::DimensionMismatch(format!(
                "view dimensions {:?} do not match space dimensions {:?}",
                view.dims(), self.size(),
            )));
        }
        self.ptrace_inner(pos, op)
    }

    /// Convenience form of [`ptrace`][Self::ptrace] accepting the raw flat
    /// operator.
    ///
    /// Fails if `pos` is out of range or `op` is not square with side equal
    /// to the space's total dimension.
    pub fn ptrace_op(&self, pos: usize, op: &SpMat)
        -> SpaceResult<(Space, SpMat)>
    {
        let len = self.len();
        if op.shape() != (len, len) {
            return Err(SpaceError::DimensionMismatch(format!(
                "operator has shape {:?}, expected ({}, {})",
                op.shape(), len, len,
            )));
        }
        self.ptrace_inner(pos, op)
    }

    fn ptrace_inner(&self, pos: usize, op: &SpMat)
        -> SpaceResult<(Space, SpMat)>
    {
        let nsys = self.factors.len();
        if pos >= nsys {
            return Err(SpaceError::InvalidSubsystem(pos, nsys));
        }
        let dims = self.size();
        let reduced = Space::compose(
            self.factors.iter().enumerate()
                .filter(|(k, _)| *k != pos)
                .map(|(_, fac)| fac.clone())
        );
        let rdims = reduced.size();
        // the sparse storage holds each coordinate at most once, so the
        // entries are already distinct; collisions appear only after
        // truncation and are summed here
        let mut acc: FxHashMap<(usize, usize), C64> = FxHashMap::default();
        let mut ridx: Vec<usize> = Vec::with_capacity(nsys - 1);
        let mut cidx: Vec<usize> = Vec::with_capacity(nsys - 1);
        for ((i, j), val) in op.iter() {
            let imulti = unpack_index(&dims, i);
            let jmulti = unpack_index(&dims, j);
            if imulti[pos] != jmulti[pos] { continue; }
            ridx.clear();
            cidx.clear();
            ridx.extend(
                imulti.iter().enumerate()
                    .filter_map(|(k, i)| (k != pos).then_some(*i))
            );
            cidx.extend(
                jmulti.iter().enumerate()
                    .filter_map(|(k, j)| (k != pos).then_some(*j))
            );
            let coord =
                (pack_index(&rdims, &ridx), pack_index(&rdims, &cidx));
            *acc.entry(coord).or_insert_with(|| 0.0.into()) += val;
        }
        let rlen = reduced.len();
        let mut out = SpMat::zero(rlen, rlen);
        for ((i, j), val) in acc.into_iter() {
            out.add_to(i, j, val);
        }
        Ok((reduced, out))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use super::*;
    use crate::{ c, c64_eq };
    use crate::space::{ Factor, oscillator, qubit };
    use crate::sparse::SpVec;

    fn random_op(len: usize) -> SpMat {
        let mut gen = rand::thread_rng();
        SpMat::from_elems(
            len, len,
            (0..len * len).map(|k| {
                let re: f64 = gen.gen_range(-1.0..1.0);
                let im: f64 = gen.gen_range(-1.0..1.0);
                (k / len, k % len, c!(re, im))
            }),
        )
    }

    #[test]
    fn identity_reduces_to_scaled_identity() {
        let sp = Space::compose([
            Factor::new(2, "A").unwrap(),
            Factor::new(3, "B").unwrap(),
        ]);
        let mut eye = SpMat::identity(6);
        let view = sp.subview(&mut eye).unwrap();
        let (reduced, op) = sp.ptrace(0, &view).unwrap();
        assert_eq!(reduced.size(), vec![3]);
        assert_eq!(reduced.name(), "B");
        assert_eq!(op, 2.0 * SpMat::identity(3));

        let (reduced, op) = sp.ptrace(1, &view).unwrap();
        assert_eq!(reduced.size(), vec![2]);
        assert_eq!(op, 3.0 * SpMat::identity(2));
    }

    #[test]
    fn trace_is_preserved() {
        let sp = Space::compose([
            Factor::new(2, "A").unwrap(),
            Factor::new(3, "B").unwrap(),
            Factor::new(2, "C").unwrap(),
        ]);
        let op = random_op(sp.len());
        for pos in 0..3 {
            let (_, reduced_op) = sp.ptrace_op(pos, &op).unwrap();
            assert!(c64_eq(reduced_op.trace(), op.trace()));
        }
    }

    #[test]
    fn reduction_reenters_the_pipeline() {
        let sp = Space::compose([
            qubit("A"),
            oscillator("cav", 3).unwrap(),
            qubit("B"),
        ]);
        let op = random_op(sp.len());
        let (sp1, op1) = sp.ptrace_op(1, &op).unwrap();
        assert_eq!(sp1.name(), "A ⊗ B");
        assert_eq!(sp1.size(), vec![2, 2]);
        assert_eq!(op1.shape(), (4, 4));
        let (sp2, op2) = sp1.ptrace_op(0, &op1).unwrap();
        assert_eq!(sp2.size(), vec![2]);
        let (sp3, op3) = sp2.ptrace_op(0, &op2).unwrap();
        assert!(sp3.is_scalar());
        assert_eq!(op3.shape(), (1, 1));
        assert!(c64_eq(op3.get(0, 0), op.trace()));
    }

    #[test]
    fn bell_state_reduces_to_maximally_mixed() {
        let sp = Space::compose([qubit("A"), qubit("B")]);
        let bell =
            (&sp.ket(&[0, 0]).unwrap() + &sp.ket(&[1, 1]).unwrap())
            * std::f64::consts::FRAC_1_SQRT_2;
        let rho = bell.outer(&bell);
        let (_, reduced) = sp.ptrace_op(0, &rho).unwrap();
        assert_eq!(reduced, 0.5 * SpMat::identity(2));
    }

    #[test]
    fn off_diagonal_entries_are_excluded() {
        // the traced factor contributes nothing off its diagonal: X on the
        // first qubit is traceless, so X ⊗ P reduces to zero
        let sp = Space::compose([qubit("A"), qubit("B")]);
        let op = sp.op("xp").unwrap();
        let (_, reduced) = sp.ptrace_op(0, op).unwrap();
        assert_eq!(reduced.nnz(), 0);

        // Z ⊗ P is likewise traceless over A, but entry-by-entry the two
        // diagonal contributions cancel instead of being skipped
        let op = sp.op("zp").unwrap();
        let (_, reduced) = sp.ptrace_op(0, op).unwrap();
        assert_eq!(reduced.nnz(), 0);

        // P ⊗ Z keeps only the ∣0⟩⟨0∣-diagonal part of P... which is empty
        let op = sp.op("pz").unwrap();
        let (_, reduced) = sp.ptrace_op(0, op).unwrap();
        assert_eq!(reduced.nnz(), 0);
    }

    #[test]
    fn truncation_collisions_are_summed() {
        // two distinct nonzeros that agree after dropping the traced factor
        let sp = Space::compose([qubit("A"), qubit("B")]);
        let mut op = SpMat::zero(4, 4);
        let mut view = sp.subview(&mut op).unwrap();
        view.set(&[0, 1, 0, 0], c!(2.0)).unwrap();
        view.set(&[1, 1, 1, 0], c!(3.0)).unwrap();
        let (_, reduced) = sp.ptrace(0, &view).unwrap();
        assert_eq!(reduced.get(1, 0), c!(5.0));
        assert_eq!(reduced.nnz(), 1);
    }

    #[test]
    fn single_factor_degenerates_to_scalar_trace() {
        let sp = Space::from(qubit("A"));
        let op = random_op(2);
        let (reduced, out) = sp.ptrace_op(0, &op).unwrap();
        assert!(reduced.is_scalar());
        assert_eq!(out.shape(), (1, 1));
        assert!(c64_eq(out.get(0, 0), op.trace()));
    }

    #[test]
    fn invalid_subsystem() {
        let sp = Space::compose([qubit("A"), qubit("B")]);
        let op = SpMat::identity(4);
        assert!(matches!(
            sp.ptrace_op(2, &op),
            Err(SpaceError::InvalidSubsystem(2, 2)),
        ));
    }

    #[test]
    fn rank_and_shape_validation() {
        let sp = Space::compose([qubit("A"), qubit("B")]);
        let mut ket = SpVec::zero(4);
        let view = sp.subview_ket(&mut ket).unwrap();
        assert!(matches!(
            sp.ptrace(0, &view), Err(SpaceError::UnsupportedRank(2, 1))));

        assert!(matches!(
            sp.ptrace_op(0, &SpMat::identity(3)),
            Err(SpaceError::DimensionMismatch(_)),
        ));

        let other = Space::compose([qubit("A"), qubit("B"), qubit("C")]);
        let mut op = SpMat::identity(8);
        let view = other.subview(&mut op).unwrap();
        assert!(matches!(
            sp.ptrace(0, &view), Err(SpaceError::DimensionMismatch(_))));
    }
}
