use std::fmt;
use itertools::Itertools;
use crate::{
    namemap::NameMap,
    sparse::{ SpMat, SpVec },
    view::pack_index,
};
use super::{ Factor, SpaceError, SpaceResult };

/// An ordered tensor product of [`Factor`]s.
///
/// The order of the factor list is significant: it defines the index
/// ordering of every joint operator, with the leftmost factor as the most
/// significant digit of the flat Kronecker index. The operator catalogue
/// holds joint operators sized `len × len` where `len` is the product of all
/// factor dimensions.
///
/// A `Space` is built from a single factor (its catalogue carried over
/// unchanged) or by Kronecker composition of other spaces and factors, in
/// which case the catalogue holds the Kronecker product of every combination
/// of one named operator chosen from each operand, keyed by the
/// concatenation of the chosen names.
#[derive(Clone, Debug, PartialEq)]
pub struct Space {
    pub(crate) factors: Vec<Factor>,
    pub(crate) ops: NameMap<SpMat>,
}

impl From<Factor> for Space {
    fn from(factor: Factor) -> Self {
        let ops = factor.ops.clone();
        Self { factors: vec![factor], ops }
    }
}

impl From<&Factor> for Space {
    fn from(factor: &Factor) -> Self { Self::from(factor.clone()) }
}

impl Space {
    /// Create the zero-factor scalar space.
    ///
    /// The scalar space has total dimension 1 and a catalogue holding only
    /// the 1×1 identity; it is the degenerate result of tracing out the only
    /// factor of a single-factor space.
    pub fn scalar() -> Self {
        let mut ops: NameMap<SpMat> = NameMap::new();
        ops.insert("i", SpMat::identity(1));
        Self { factors: Vec::new(), ops }
    }

    /// Compute the tensor product `self ⊗ rhs`.
    ///
    /// The factor list of the result is the concatenation of the operands'
    /// factor lists, and its catalogue holds, for every pair of operator
    /// names `(na, nb)` drawn from the operands in insertion order, the
    /// Kronecker product of the named operators keyed by the concatenated
    /// name.
    pub fn kron(&self, rhs: &Space) -> Space {
        let mut factors = self.factors.clone();
        factors.extend(rhs.factors.iter().cloned());
        let mut ops: NameMap<SpMat> =
            NameMap::with_capacity(self.ops.len() * rhs.ops.len());
        for (na, a) in self.ops.iter() {
            for (nb, b) in rhs.ops.iter() {
                ops.insert(format!("{}{}", na, nb), a.kron(b));
            }
        }
        Space { factors, ops }
    }

    /// Compose a sequence of spaces and/or factors into their tensor
    /// product, in operand order.
    ///
    /// An empty sequence yields the [scalar space][Self::scalar]; a single
    /// factor composes as a one-factor space.
    pub fn compose<I>(operands: I) -> Space
    where
        I: IntoIterator,
        I::Item: Into<Space>,
    {
        let mut iter = operands.into_iter();
        if let Some(first) = iter.next() {
            iter.fold(first.into(), |acc, rhs| acc.kron(&rhs.into()))
        } else {
            Self::scalar()
        }
    }

    /// Return the number of factors.
    pub fn nsys(&self) -> usize { self.factors.len() }

    /// Return `true` if `self` is the zero-factor scalar space.
    pub fn is_scalar(&self) -> bool { self.factors.is_empty() }

    /// Return the per-factor dimensions, in factor order.
    pub fn size(&self) -> Vec<usize> {
        self.factors.iter().map(|fac| fac.dim).collect()
    }

    /// Return the total dimension, i.e. the product of all factor
    /// dimensions (1 for the scalar space).
    pub fn len(&self) -> usize {
        self.factors.iter().map(|fac| fac.dim).product()
    }

    /// Return the display name: the factor names joined by the
    /// tensor-product separator (`"1"` for the scalar space).
    pub fn name(&self) -> String {
        if self.factors.is_empty() {
            "1".to_string()
        } else {
            self.factors.iter().map(|fac| fac.name.as_str()).join(" ⊗ ")
        }
    }

    /// Return the factor list.
    pub fn factors(&self) -> &[Factor] { &self.factors }

    /// Return a reference to the factor at position `pos`, if it exists.
    pub fn factor(&self, pos: usize) -> Option<&Factor> {
        self.factors.get(pos)
    }

    /// Return a reference to the operator catalogue.
    pub fn ops(&self) -> &NameMap<SpMat> { &self.ops }

    /// Look up a joint operator by name.
    ///
    /// Fails if the catalogue does not contain `name`.
    pub fn op(&self, name: &str) -> SpaceResult<&SpMat> {
        self.ops.get(name)
            .ok_or_else(|| SpaceError::UnknownOperatorName(name.to_string()))
    }

    /// Embed a single-factor operator into the joint space at position
    /// `pos`, Kronecker-composing with each other factor's identity in
    /// factor order.
    ///
    /// Fails if `pos` is out of range or `op` is not square with side equal
    /// to the dimension of the factor at `pos`.
    pub fn lift(&self, pos: usize, op: &SpMat) -> SpaceResult<SpMat> {
        let nsys = self.factors.len();
        if pos >= nsys {
            return Err(SpaceError::InvalidSubsystem(pos, nsys));
        }
        let d = self.factors[pos].dim;
        if op.shape() != (d, d) {
            return Err(SpaceError::DimensionMismatch(format!(
                "lifted operator has shape {:?}, expected ({}, {})",
                op.shape(), d, d,
            )));
        }
        let mut acc = SpMat::identity(1);
        for (k, fac) in self.factors.iter().enumerate() {
            acc = if k == pos {
                acc.kron(op)
            } else {
                acc.kron(fac.op("i")?)
            };
        }
        Ok(acc)
    }

    // validate one per-factor index tuple of length nsys
    fn check_multi_index(&self, idx: &[usize]) -> SpaceResult<()> {
        for (k, (fac, i)) in self.factors.iter().zip(idx).enumerate() {
            if *i >= fac.dim {
                return Err(SpaceError::MalformedIndexing(format!(
                    "index {} at position {} out of range for dimension {}",
                    i, k, fac.dim,
                )));
            }
        }
        Ok(())
    }

    /// Return the canonical basis vector at flat index `k`.
    ///
    /// Fails if `k` is out of range.
    pub fn ket_flat(&self, k: usize) -> SpaceResult<SpVec> {
        let len = self.len();
        if k >= len {
            return Err(SpaceError::MalformedIndexing(format!(
                "basis index {} out of range for total dimension {}", k, len,
            )));
        }
        Ok(SpVec::basis(len, k))
    }

    /// Return the basis projector ∣`i`⟩⟨`j`∣ at flat coordinate `(i, j)`.
    ///
    /// Fails if `i` or `j` is out of range.
    pub fn proj_flat(&self, i: usize, j: usize) -> SpaceResult<SpMat> {
        let len = self.len();
        if i >= len || j >= len {
            return Err(SpaceError::MalformedIndexing(format!(
                "basis coordinate ({}, {}) out of range for total dimension \
                {}",
                i, j, len,
            )));
        }
        Ok(SpMat::unit(len, len, i, j))
    }

    /// Return the canonical basis vector addressed in per-factor
    /// coordinates.
    ///
    /// Fails if `idx` does not hold exactly one index per factor, or any
    /// index is out of range.
    pub fn ket(&self, idx: &[usize]) -> SpaceResult<SpVec> {
        let nsys = self.factors.len();
        if idx.len() != nsys {
            return Err(SpaceError::MalformedIndexing(format!(
                "index tuple has length {}, expected {}", idx.len(), nsys,
            )));
        }
        self.check_multi_index(idx)?;
        let dims = self.size();
        Ok(SpVec::basis(self.len(), pack_index(&dims, idx)))
    }

    /// Return the basis projector addressed in per-factor coordinates: the
    /// first `nsys` indices address the ket side, the remaining `nsys` the
    /// bra side.
    ///
    /// Fails if `idx` does not hold exactly two indices per factor, or any
    /// index is out of range.
    pub fn proj(&self, idx: &[usize]) -> SpaceResult<SpMat> {
        let nsys = self.factors.len();
        if idx.len() != 2 * nsys {
            return Err(SpaceError::MalformedIndexing(format!(
                "index tuple has length {}, expected {}",
                idx.len(), 2 * nsys,
            )));
        }
        let (ridx, cidx) = idx.split_at(nsys);
        self.check_multi_index(ridx)?;
        self.check_multi_index(cidx)?;
        let dims = self.size();
        let len = self.len();
        Ok(SpMat::unit(
            len, len, pack_index(&dims, ridx), pack_index(&dims, cidx)))
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            write!(f, "Space (scalar) [{}]", self.ops.keys().join(", "))
        } else {
            write!(
                f, "Space \"{}\" (dims {}) [{}]",
                self.name(),
                self.factors.iter()
                    .map(|fac| fac.dim.to_string())
                    .join(" ⊗ "),
                self.ops.keys().join(", "),
            )
        }
    }
}

impl std::ops::Mul<&Space> for &Space {
    type Output = Space;

    fn mul(self, rhs: &Space) -> Self::Output { self.kron(rhs) }
}

impl std::ops::Mul<&Factor> for &Space {
    type Output = Space;

    fn mul(self, rhs: &Factor) -> Self::Output {
        self.kron(&Space::from(rhs))
    }
}

impl std::ops::Mul<&Space> for &Factor {
    type Output = Space;

    fn mul(self, rhs: &Space) -> Self::Output {
        Space::from(self).kron(rhs)
    }
}

impl std::ops::Mul<&Factor> for &Factor {
    type Output = Space;

    fn mul(self, rhs: &Factor) -> Self::Output {
        Space::from(self).kron(&Space::from(rhs))
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64 as C64;
    use super::*;
    use crate::c;
    use crate::space::qubit;

    fn factor_with_x(dim: usize, name: &str) -> Factor {
        let mut fac = Factor::new(dim, name).unwrap();
        let x = SpMat::from_elems(
            dim, dim,
            (0..dim).map(|k| (k, (k + 1) % dim, C64::from(1.0))),
        );
        fac.insert_op("x", x).unwrap();
        fac
    }

    #[test]
    fn from_factor_carries_operators() {
        let fac = factor_with_x(2, "A");
        let sp = Space::from(&fac);
        assert_eq!(sp.nsys(), 1);
        assert_eq!(sp.len(), 2);
        assert_eq!(sp.op("x").unwrap(), fac.op("x").unwrap());
    }

    #[test]
    fn dimension_consistency() {
        let sp = Space::compose([
            factor_with_x(2, "A"),
            factor_with_x(3, "B"),
            factor_with_x(3, "C"),
        ]);
        assert_eq!(sp.nsys(), 3);
        assert_eq!(sp.size(), vec![2, 3, 3]);
        assert_eq!(sp.len(), 18);
        assert_eq!(sp.name(), "A ⊗ B ⊗ C");
        for (_, op) in sp.ops().iter() {
            assert_eq!(op.shape(), (18, 18));
        }
    }

    #[test]
    fn composed_operator_names() {
        let a = factor_with_x(2, "A");
        let b = factor_with_x(2, "B");
        let ab = &a * &b;
        let names: Vec<&str> = ab.ops().keys().collect();
        assert_eq!(names, vec!["ii", "ix", "xi", "xx"]);
        assert_eq!(
            ab.op("xi").unwrap(),
            &a.op("x").unwrap().kron(b.op("i").unwrap()),
        );
    }

    #[test]
    fn compose_associates() {
        let a = factor_with_x(2, "A");
        let b = factor_with_x(3, "B");
        let c = factor_with_x(4, "C");
        let l = Space::compose([
            (&a * &b),
            Space::from(&c),
        ]);
        let r = Space::compose([
            Space::from(&a),
            (&b * &c),
        ]);
        assert_eq!(l, r);
        assert_eq!(l.name(), "A ⊗ B ⊗ C");
    }

    #[test]
    fn compose_empty_is_scalar() {
        let sp = Space::compose(Vec::<Factor>::new());
        assert!(sp.is_scalar());
        assert_eq!(sp.len(), 1);
        assert_eq!(sp.op("i").unwrap(), &SpMat::identity(1));
    }

    #[test]
    fn op_lookup_miss() {
        let sp = Space::from(factor_with_x(2, "A"));
        assert!(matches!(
            sp.op("z"),
            Err(SpaceError::UnknownOperatorName(name)) if name == "z",
        ));
    }

    #[test]
    fn basis_elements() {
        let sp = Space::compose([
            factor_with_x(2, "A"),
            factor_with_x(3, "B"),
        ]);
        // (1, 2) packs to flat 1 * 3 + 2 = 5
        let ket = sp.ket(&[1, 2]).unwrap();
        assert_eq!(ket, sp.ket_flat(5).unwrap());
        assert_eq!(ket.get(5), c!(1.0));

        let proj = sp.proj(&[1, 2, 0, 0]).unwrap();
        assert_eq!(proj, sp.proj_flat(5, 0).unwrap());

        assert!(matches!(
            sp.ket(&[1, 2, 0]), Err(SpaceError::MalformedIndexing(_))));
        assert!(matches!(
            sp.proj(&[1, 2, 0]), Err(SpaceError::MalformedIndexing(_))));
        assert!(matches!(
            sp.ket(&[1, 3]), Err(SpaceError::MalformedIndexing(_))));
        assert!(matches!(
            sp.ket_flat(6), Err(SpaceError::MalformedIndexing(_))));
    }

    #[test]
    fn lift_matches_manual_kron() {
        let a = qubit("A");
        let b = qubit("B");
        let ab = &a * &b;
        let lifted = ab.lift(1, b.op("p").unwrap()).unwrap();
        let manual = a.op("i").unwrap().kron(b.op("p").unwrap());
        assert_eq!(lifted, manual);

        // raising the second qubit takes ∣00⟩ to ∣01⟩
        let ket00 = ab.ket(&[0, 0]).unwrap();
        let ket01 = ab.ket(&[0, 1]).unwrap();
        assert_eq!(&lifted * &ket00, ket01);
    }

    #[test]
    fn lift_validates() {
        let ab = Space::compose([qubit("A"), qubit("B")]);
        assert!(matches!(
            ab.lift(2, &SpMat::identity(2)),
            Err(SpaceError::InvalidSubsystem(2, 2)),
        ));
        assert!(matches!(
            ab.lift(0, &SpMat::identity(3)),
            Err(SpaceError::DimensionMismatch(_)),
        ));
    }

    #[test]
    fn display() {
        let sp = Space::compose([qubit("A"), qubit("B")]);
        let shown = sp.to_string();
        assert!(shown.starts_with("Space \"A ⊗ B\" (dims 2 ⊗ 2)"));
        assert!(shown.contains("ii"));
    }
}
