//! Convenience constructors for common physical factors.
//!
//! These populate a [`Factor`]'s operator catalogue before it is handed out;
//! the core pipeline treats the results like any other factor.

use std::f64::consts::FRAC_1_SQRT_2;
use num_complex::Complex64 as C64;
use crate::{
    c,
    namemap::NameMap,
    sparse::SpMat,
};
use super::{ Factor, SpaceError, SpaceResult };

/// Create a qubit factor.
///
/// The catalogue holds, besides the identity `"i"`: the Pauli operators
/// `"x"`, `"y"`, `"z"`; the raising and lowering operators `"p"` = ∣1⟩⟨0∣
/// and `"m"` = ∣0⟩⟨1∣; and the Hadamard `"h"`.
pub fn qubit<S>(name: S) -> Factor
where S: Into<String>
{
    let mut ops: NameMap<SpMat> = NameMap::new();
    ops.insert("i", SpMat::identity(2));
    ops.insert("x", SpMat::from_elems(
        2, 2, [(0, 1, c!(1.0)), (1, 0, c!(1.0))]));
    ops.insert("y", SpMat::from_elems(
        2, 2, [(0, 1, c!(i (-1.0))), (1, 0, c!(i 1.0))]));
    ops.insert("z", SpMat::from_elems(
        2, 2, [(0, 0, c!(1.0)), (1, 1, c!(-1.0))]));
    ops.insert("p", SpMat::from_elems(2, 2, [(1, 0, c!(1.0))]));
    ops.insert("m", SpMat::from_elems(2, 2, [(0, 1, c!(1.0))]));
    ops.insert("h", SpMat::from_elems(
        2, 2,
        [
            (0, 0, c!(FRAC_1_SQRT_2)),
            (0, 1, c!(FRAC_1_SQRT_2)),
            (1, 0, c!(FRAC_1_SQRT_2)),
            (1, 1, c!(-FRAC_1_SQRT_2)),
        ],
    ));
    Factor { dim: 2, name: name.into(), ops }
}

/// Create a truncated harmonic-oscillator factor with levels
/// `∣0⟩, …, ∣nmax - 1⟩`.
///
/// The catalogue holds, besides the identity `"i"`: the annihilation
/// operator `"a"` with `a ∣n⟩ = √n ∣n - 1⟩`, its adjoint `"at"`, and the
/// number operator `"n"`.
///
/// Fails if `nmax` is zero.
pub fn oscillator<S>(name: S, nmax: usize) -> SpaceResult<Factor>
where S: Into<String>
{
    if nmax == 0 { return Err(SpaceError::InvalidDimension); }
    let lower = SpMat::from_elems(
        nmax, nmax,
        (1..nmax).map(|n| (n - 1, n, C64::from((n as f64).sqrt()))),
    );
    let mut ops: NameMap<SpMat> = NameMap::new();
    ops.insert("i", SpMat::identity(nmax));
    ops.insert("a", lower.clone());
    ops.insert("at", lower.dagger());
    ops.insert("n", SpMat::from_elems(
        nmax, nmax,
        (1..nmax).map(|n| (n, n, C64::from(n as f64))),
    ));
    Ok(Factor { dim: nmax, name: name.into(), ops })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c;
    use crate::sparse::SpVec;

    #[test]
    fn qubit_operators() {
        let q = qubit("q");
        assert_eq!(q.dim(), 2);
        let x = q.op("x").unwrap();
        let y = q.op("y").unwrap();
        let z = q.op("z").unwrap();
        // XY = iZ
        assert_eq!(&(x * y), &(c!(i 1.0) * z.clone()));
        // X = P + M
        assert_eq!(&(q.op("p").unwrap() + q.op("m").unwrap()), x);
        // H² = I
        let h = q.op("h").unwrap();
        assert_eq!(&(h * h), q.op("i").unwrap());
    }

    #[test]
    fn qubit_ladder() {
        let q = qubit("q");
        let p = q.op("p").unwrap();
        assert_eq!(p.apply(&q.ket(0).unwrap()), q.ket(1).unwrap());
        assert_eq!(p.apply(&q.ket(1).unwrap()), SpVec::zero(2));
    }

    #[test]
    fn oscillator_operators() {
        let osc = oscillator("cav", 4).unwrap();
        assert_eq!(osc.dim(), 4);
        let a = osc.op("a").unwrap();
        let at = osc.op("at").unwrap();
        let n = osc.op("n").unwrap();
        // a ∣2⟩ = √2 ∣1⟩
        let ket2 = osc.ket(2).unwrap();
        assert_eq!(a.apply(&ket2), osc.ket(1).unwrap() * 2.0_f64.sqrt());
        // a† a = n
        assert_eq!(&(at * a), n);
        // n ∣3⟩ = 3 ∣3⟩
        let ket3 = osc.ket(3).unwrap();
        assert_eq!(n.apply(&ket3), ket3 * 3.0);
    }

    #[test]
    fn oscillator_needs_levels() {
        assert!(matches!(
            oscillator("cav", 0), Err(SpaceError::InvalidDimension)));
    }
}
