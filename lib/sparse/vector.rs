use std::fmt;
use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rustc_hash::FxHashMap;
use crate::{ c64_eq, EPSILON };
use super::SpMat;

/// A sparse complex column vector.
///
/// Elements not present in the underlying storage are implicit zeros; writes
/// of values with magnitude below `1e-12` remove the element.
#[derive(Clone, Debug)]
pub struct SpVec {
    pub(crate) dim: usize,
    pub(crate) elems: FxHashMap<usize, C64>,
}

impl SpVec {
    /// Create a new all-zero vector of length `dim`.
    pub fn zero(dim: usize) -> Self {
        Self { dim, elems: FxHashMap::default() }
    }

    /// Create the canonical basis vector ∣`k`⟩ of length `dim`.
    ///
    /// *Panics if `k` is out of range.*
    pub fn basis(dim: usize, k: usize) -> Self {
        if k >= dim { panic!("SpVec::basis: index out of range"); }
        let mut new = Self::zero(dim);
        new.elems.insert(k, 1.0.into());
        new
    }

    /// Create a new vector of length `dim` from an iterator over
    /// `(index, value)` pairs, summing values for repeated indices.
    ///
    /// *Panics if any index is out of range.*
    pub fn from_elems<I>(dim: usize, elems: I) -> Self
    where I: IntoIterator<Item = (usize, C64)>
    {
        let mut new = Self::zero(dim);
        elems.into_iter()
            .for_each(|(k, val)| { new.add_to(k, val); });
        new
    }

    /// Create a new vector from a dense array, skipping elements with
    /// magnitude below `1e-12`.
    pub fn from_dense(arr: &nd::Array1<C64>) -> Self {
        let elems: FxHashMap<usize, C64> =
            arr.iter().enumerate()
            .filter(|(_, a)| a.norm() >= EPSILON)
            .map(|(k, a)| (k, *a))
            .collect();
        Self { dim: arr.len(), elems }
    }

    /// Return the length of the vector.
    pub fn dim(&self) -> usize { self.dim }

    /// Return the number of structurally nonzero elements.
    pub fn nnz(&self) -> usize { self.elems.len() }

    /// Return the element at index `k`.
    ///
    /// *Panics if `k` is out of range.*
    pub fn get(&self, k: usize) -> C64 {
        if k >= self.dim { panic!("SpVec::get: index out of range"); }
        self.elems.get(&k).copied().unwrap_or_else(|| 0.0.into())
    }

    /// Set the element at index `k`, removing it from storage if `val` has
    /// magnitude below `1e-12`.
    ///
    /// *Panics if `k` is out of range.*
    pub fn set(&mut self, k: usize, val: C64) {
        if k >= self.dim { panic!("SpVec::set: index out of range"); }
        if val.norm() < EPSILON {
            self.elems.remove(&k);
        } else {
            self.elems.insert(k, val);
        }
    }

    /// Add `val` to the element at index `k`, removing the element if the
    /// sum falls below the storage threshold.
    ///
    /// *Panics if `k` is out of range.*
    pub fn add_to(&mut self, k: usize, val: C64) {
        if k >= self.dim { panic!("SpVec::add_to: index out of range"); }
        let sum = self.elems.get(&k).copied().unwrap_or_else(|| 0.0.into())
            + val;
        if sum.norm() < EPSILON {
            self.elems.remove(&k);
        } else {
            self.elems.insert(k, sum);
        }
    }

    /// Return an iterator over all structurally nonzero elements in arbitrary
    /// order.
    ///
    /// The iterator item type is `(usize, C64)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, C64)> + '_ {
        self.elems.iter().map(|(k, val)| (*k, *val))
    }

    /// Return an iterator over all structurally nonzero elements in index
    /// order.
    ///
    /// The iterator item type is `(usize, C64)`.
    pub fn sorted_iter(&self) -> impl Iterator<Item = (usize, C64)> + '_ {
        self.elems.iter()
            .map(|(k, val)| (*k, *val))
            .sorted_by_key(|(k, _)| *k)
    }

    /// Compute the Kronecker product `self ⊗ rhs`.
    ///
    /// The result has length `self.dim() * rhs.dim()`, with the left operand
    /// as the most significant index digit.
    pub fn kron(&self, rhs: &Self) -> Self {
        let mut new = Self::zero(self.dim * rhs.dim);
        for (i, a) in self.iter() {
            for (j, b) in rhs.iter() {
                new.add_to(i * rhs.dim + j, a * b);
            }
        }
        new
    }

    /// Compute the inner product `⟨self∣rhs⟩`, conjugating `self`.
    ///
    /// *Panics if the lengths disagree.*
    pub fn dot(&self, rhs: &Self) -> C64 {
        if self.dim != rhs.dim { panic!("SpVec::dot: length mismatch"); }
        self.iter()
            .filter_map(|(k, a)| rhs.elems.get(&k).map(|b| a.conj() * *b))
            .sum()
    }

    /// Compute the outer product `∣self⟩⟨rhs∣`, conjugating `rhs`.
    pub fn outer(&self, rhs: &Self) -> SpMat {
        let mut new = SpMat::zero(self.dim, rhs.dim);
        for (i, a) in self.iter() {
            for (j, b) in rhs.iter() {
                new.add_to(i, j, a * b.conj());
            }
        }
        new
    }

    /// Return the Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.elems.values()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Return the element-wise complex conjugate.
    pub fn conj(&self) -> Self {
        let elems: FxHashMap<usize, C64> =
            self.elems.iter().map(|(k, a)| (*k, a.conj())).collect();
        Self { dim: self.dim, elems }
    }

    /// Convert to a dense array.
    pub fn to_dense(&self) -> nd::Array1<C64> {
        let mut arr: nd::Array1<C64> = nd::Array1::zeros(self.dim);
        for (k, val) in self.iter() { arr[k] = val; }
        arr
    }
}

impl PartialEq for SpVec {
    fn eq(&self, other: &Self) -> bool {
        self.dim == other.dim
            && self.iter().all(|(k, a)| c64_eq(a, other.get(k)))
            && other.iter().all(|(k, b)| c64_eq(b, self.get(k)))
    }
}

impl fmt::Display for SpVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let n = self.nnz();
        for (j, (k, val)) in self.sorted_iter().enumerate() {
            write!(f, "{}: {}", k, val)?;
            if j < n - 1 { write!(f, ", ")?; }
        }
        write!(f, "}}")?;
        Ok(())
    }
}

impl std::ops::AddAssign<&SpVec> for SpVec {
    /// *Panics if the lengths disagree.*
    fn add_assign(&mut self, rhs: &SpVec) {
        if self.dim != rhs.dim { panic!("SpVec: length mismatch in +"); }
        rhs.iter().for_each(|(k, val)| { self.add_to(k, val); });
    }
}

impl std::ops::Add<&SpVec> for &SpVec {
    type Output = SpVec;

    fn add(self, rhs: &SpVec) -> Self::Output {
        let mut new = self.clone();
        new += rhs;
        new
    }
}

impl std::ops::SubAssign<&SpVec> for SpVec {
    /// *Panics if the lengths disagree.*
    fn sub_assign(&mut self, rhs: &SpVec) {
        if self.dim != rhs.dim { panic!("SpVec: length mismatch in -"); }
        rhs.iter().for_each(|(k, val)| { self.add_to(k, -val); });
    }
}

impl std::ops::Sub<&SpVec> for &SpVec {
    type Output = SpVec;

    fn sub(self, rhs: &SpVec) -> Self::Output {
        let mut new = self.clone();
        new -= rhs;
        new
    }
}

impl std::ops::Neg for &SpVec {
    type Output = SpVec;

    fn neg(self) -> Self::Output {
        let elems: FxHashMap<usize, C64> =
            self.elems.iter().map(|(k, a)| (*k, -*a)).collect();
        SpVec { dim: self.dim, elems }
    }
}

impl std::ops::MulAssign<C64> for SpVec {
    fn mul_assign(&mut self, z: C64) {
        if z.norm() < EPSILON {
            self.elems.clear();
        } else {
            self.elems.values_mut().for_each(|val| { *val *= z; });
        }
    }
}

impl std::ops::Mul<C64> for SpVec {
    type Output = SpVec;

    fn mul(mut self, z: C64) -> Self::Output {
        self *= z;
        self
    }
}

impl std::ops::Mul<SpVec> for C64 {
    type Output = SpVec;

    fn mul(self, mut rhs: SpVec) -> Self::Output {
        rhs *= self;
        rhs
    }
}

impl std::ops::MulAssign<f64> for SpVec {
    fn mul_assign(&mut self, z: f64) { *self *= C64::from(z); }
}

impl std::ops::Mul<f64> for SpVec {
    type Output = SpVec;

    fn mul(mut self, z: f64) -> Self::Output {
        self *= z;
        self
    }
}

impl std::ops::Mul<SpVec> for f64 {
    type Output = SpVec;

    fn mul(self, mut rhs: SpVec) -> Self::Output {
        rhs *= self;
        rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c;

    #[test]
    fn basis() {
        let e2 = SpVec::basis(5, 2);
        assert_eq!(e2.dim(), 5);
        assert_eq!(e2.nnz(), 1);
        assert_eq!(e2.get(2), c!(1.0));
        assert_eq!(e2.get(0), c!(0.0));
    }

    #[test]
    #[should_panic]
    fn bad_basis() { let _ = SpVec::basis(3, 3); }

    #[test]
    fn set_prunes_small_values() {
        let mut v = SpVec::zero(4);
        v.set(1, c!(0.5));
        assert_eq!(v.nnz(), 1);
        v.set(1, c!(1e-15));
        assert_eq!(v.nnz(), 0);
        v.add_to(3, c!(1.0));
        v.add_to(3, c!(-1.0));
        assert_eq!(v.nnz(), 0);
    }

    #[test]
    fn from_elems_sums_duplicates() {
        let v = SpVec::from_elems(
            3, [(0, c!(1.0)), (2, c!(i 1.0)), (0, c!(2.0))]);
        assert_eq!(v.get(0), c!(3.0));
        assert_eq!(v.get(2), c!(i 1.0));
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn kron() {
        // e_1 ⊗ e_2 over dims (2, 3) lands at flat index 1 * 3 + 2
        let l = SpVec::basis(2, 1);
        let r = SpVec::basis(3, 2);
        let lr = l.kron(&r);
        assert_eq!(lr.dim(), 6);
        assert_eq!(lr.get(5), c!(1.0));
        assert_eq!(lr.nnz(), 1);

        let a = SpVec::from_elems(2, [(0, c!(1.0)), (1, c!(2.0))]);
        let b = SpVec::from_elems(2, [(0, c!(3.0)), (1, c!(i 1.0))]);
        let ab = a.kron(&b);
        assert_eq!(ab.get(0), c!(3.0));
        assert_eq!(ab.get(1), c!(i 1.0));
        assert_eq!(ab.get(2), c!(6.0));
        assert_eq!(ab.get(3), c!(i 2.0));
    }

    #[test]
    fn dot() {
        let a = SpVec::from_elems(2, [(0, c!(i 1.0)), (1, c!(1.0))]);
        let b = SpVec::from_elems(2, [(0, c!(1.0)), (1, c!(1.0))]);
        assert_eq!(a.dot(&b), c!(1.0 - 1.0 i));
        assert!((a.norm() - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn outer() {
        let a = SpVec::basis(2, 0);
        let b = SpVec::from_elems(2, [(1, c!(i 1.0))]);
        let ab = a.outer(&b);
        assert_eq!(ab.get(0, 1), c!(i (-1.0)));
        assert_eq!(ab.nnz(), 1);
    }

    #[test]
    fn arith() {
        let a = SpVec::from_elems(3, [(0, c!(1.0)), (1, c!(2.0))]);
        let b = SpVec::from_elems(3, [(1, c!(-2.0)), (2, c!(1.0))]);
        let sum = &a + &b;
        assert_eq!(sum.get(0), c!(1.0));
        assert_eq!(sum.get(1), c!(0.0));
        assert_eq!(sum.get(2), c!(1.0));
        assert_eq!(sum.nnz(), 2);

        let scaled = c!(i 1.0) * a.clone();
        assert_eq!(scaled.get(0), c!(i 1.0));
        assert_eq!(scaled.get(1), c!(i 2.0));

        let zeroed = a * 0.0;
        assert_eq!(zeroed.nnz(), 0);
    }

    #[test]
    fn dense_round_trip() {
        let v = SpVec::from_elems(4, [(1, c!(1.0)), (3, c!(i 2.0))]);
        let dense = v.to_dense();
        assert_eq!(dense[0], c!(0.0));
        assert_eq!(dense[1], c!(1.0));
        assert_eq!(dense[3], c!(i 2.0));
        assert_eq!(SpVec::from_dense(&dense), v);
    }
}
