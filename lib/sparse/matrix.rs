use std::fmt;
use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rustc_hash::FxHashMap;
use crate::{ c64_eq, EPSILON };
use super::SpVec;

/// A sparse complex matrix.
///
/// Elements not present in the underlying storage are implicit zeros; writes
/// of values with magnitude below `1e-12` remove the element.
#[derive(Clone, Debug)]
pub struct SpMat {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) elems: FxHashMap<(usize, usize), C64>,
}

impl SpMat {
    /// Create a new all-zero matrix of shape `rows × cols`.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self { rows, cols, elems: FxHashMap::default() }
    }

    /// Create the `dim × dim` identity matrix.
    pub fn identity(dim: usize) -> Self {
        let elems: FxHashMap<(usize, usize), C64> =
            (0..dim).map(|k| ((k, k), C64::from(1.0))).collect();
        Self { rows: dim, cols: dim, elems }
    }

    /// Create the basis matrix ∣`i`⟩⟨`j`∣ of shape `rows × cols`.
    ///
    /// *Panics if `i` or `j` is out of range.*
    pub fn unit(rows: usize, cols: usize, i: usize, j: usize) -> Self {
        if i >= rows || j >= cols {
            panic!("SpMat::unit: index out of range");
        }
        let mut new = Self::zero(rows, cols);
        new.elems.insert((i, j), 1.0.into());
        new
    }

    /// Create a new matrix of shape `rows × cols` from an iterator over
    /// `(row, col, value)` triples, summing values for repeated coordinates.
    ///
    /// *Panics if any coordinate is out of range.*
    pub fn from_elems<I>(rows: usize, cols: usize, elems: I) -> Self
    where I: IntoIterator<Item = (usize, usize, C64)>
    {
        let mut new = Self::zero(rows, cols);
        elems.into_iter()
            .for_each(|(i, j, val)| { new.add_to(i, j, val); });
        new
    }

    /// Create a new matrix from a dense array, skipping elements with
    /// magnitude below `1e-12`.
    pub fn from_dense(arr: &nd::Array2<C64>) -> Self {
        let elems: FxHashMap<(usize, usize), C64> =
            arr.indexed_iter()
            .filter(|(_, a)| a.norm() >= EPSILON)
            .map(|((i, j), a)| ((i, j), *a))
            .collect();
        Self { rows: arr.nrows(), cols: arr.ncols(), elems }
    }

    /// Return the shape `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) { (self.rows, self.cols) }

    /// Return the number of rows.
    pub fn rows(&self) -> usize { self.rows }

    /// Return the number of columns.
    pub fn cols(&self) -> usize { self.cols }

    /// Return `true` if the matrix is square.
    pub fn is_square(&self) -> bool { self.rows == self.cols }

    /// Return the number of structurally nonzero elements.
    pub fn nnz(&self) -> usize { self.elems.len() }

    /// Return the element at coordinate `(i, j)`.
    ///
    /// *Panics if the coordinate is out of range.*
    pub fn get(&self, i: usize, j: usize) -> C64 {
        if i >= self.rows || j >= self.cols {
            panic!("SpMat::get: coordinate out of range");
        }
        self.elems.get(&(i, j)).copied().unwrap_or_else(|| 0.0.into())
    }

    /// Set the element at coordinate `(i, j)`, removing it from storage if
    /// `val` has magnitude below `1e-12`.
    ///
    /// *Panics if the coordinate is out of range.*
    pub fn set(&mut self, i: usize, j: usize, val: C64) {
        if i >= self.rows || j >= self.cols {
            panic!("SpMat::set: coordinate out of range");
        }
        if val.norm() < EPSILON {
            self.elems.remove(&(i, j));
        } else {
            self.elems.insert((i, j), val);
        }
    }

    /// Add `val` to the element at coordinate `(i, j)`, removing the element
    /// if the sum falls below the storage threshold.
    ///
    /// *Panics if the coordinate is out of range.*
    pub fn add_to(&mut self, i: usize, j: usize, val: C64) {
        if i >= self.rows || j >= self.cols {
            panic!("SpMat::add_to: coordinate out of range");
        }
        let sum = self.elems.get(&(i, j)).copied()
            .unwrap_or_else(|| 0.0.into())
            + val;
        if sum.norm() < EPSILON {
            self.elems.remove(&(i, j));
        } else {
            self.elems.insert((i, j), sum);
        }
    }

    /// Return an iterator over all structurally nonzero elements in arbitrary
    /// order.
    ///
    /// The iterator item type is `((usize, usize), C64)`.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), C64)> + '_ {
        self.elems.iter().map(|(coord, val)| (*coord, *val))
    }

    /// Return an iterator over all structurally nonzero elements in row-major
    /// coordinate order.
    ///
    /// The iterator item type is `((usize, usize), C64)`.
    pub fn sorted_iter(&self)
        -> impl Iterator<Item = ((usize, usize), C64)> + '_
    {
        self.elems.iter()
            .map(|(coord, val)| (*coord, *val))
            .sorted_by_key(|(coord, _)| *coord)
    }

    /// Compute the Kronecker product `self ⊗ rhs`.
    ///
    /// The result has shape `(self.rows * rhs.rows, self.cols * rhs.cols)`,
    /// with the left operand as the most significant index digit on both
    /// axes.
    pub fn kron(&self, rhs: &Self) -> Self {
        let mut new = Self::zero(self.rows * rhs.rows, self.cols * rhs.cols);
        for ((i1, j1), a) in self.iter() {
            for ((i2, j2), b) in rhs.iter() {
                new.add_to(i1 * rhs.rows + i2, j1 * rhs.cols + j2, a * b);
            }
        }
        new
    }

    /// Return the sum of the diagonal elements.
    ///
    /// *Panics if the matrix is not square.*
    pub fn trace(&self) -> C64 {
        if !self.is_square() { panic!("SpMat::trace: non-square matrix"); }
        self.elems.iter()
            .filter_map(|((i, j), val)| (i == j).then_some(*val))
            .sum()
    }

    /// Return the conjugate transpose.
    pub fn dagger(&self) -> Self {
        let elems: FxHashMap<(usize, usize), C64> =
            self.elems.iter()
            .map(|((i, j), val)| ((*j, *i), val.conj()))
            .collect();
        Self { rows: self.cols, cols: self.rows, elems }
    }

    /// Return the transpose.
    pub fn transpose(&self) -> Self {
        let elems: FxHashMap<(usize, usize), C64> =
            self.elems.iter()
            .map(|((i, j), val)| ((*j, *i), *val))
            .collect();
        Self { rows: self.cols, cols: self.rows, elems }
    }

    /// Apply `self` to a ket, computing `self ∣rhs⟩`.
    ///
    /// *Panics if the shapes disagree.*
    pub fn apply(&self, rhs: &SpVec) -> SpVec {
        if self.cols != rhs.dim() {
            panic!("SpMat::apply: shape mismatch");
        }
        let mut new = SpVec::zero(self.rows);
        for ((i, j), a) in self.iter() {
            if let Some(b) = rhs.elems.get(&j) {
                new.add_to(i, a * *b);
            }
        }
        new
    }

    /// Convert to a dense array.
    pub fn to_dense(&self) -> nd::Array2<C64> {
        let mut arr: nd::Array2<C64> =
            nd::Array2::zeros((self.rows, self.cols));
        for ((i, j), val) in self.iter() { arr[[i, j]] = val; }
        arr
    }
}

impl PartialEq for SpMat {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.iter().all(|((i, j), a)| c64_eq(a, other.get(i, j)))
            && other.iter().all(|((i, j), b)| c64_eq(b, self.get(i, j)))
    }
}

impl fmt::Display for SpMat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let n = self.nnz();
        for (k, ((i, j), val)) in self.sorted_iter().enumerate() {
            write!(f, "({}, {}): {}", i, j, val)?;
            if k < n - 1 { write!(f, ", ")?; }
        }
        write!(f, "}}")?;
        Ok(())
    }
}

impl std::ops::AddAssign<&SpMat> for SpMat {
    /// *Panics if the shapes disagree.*
    fn add_assign(&mut self, rhs: &SpMat) {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("SpMat: shape mismatch in +");
        }
        rhs.iter().for_each(|((i, j), val)| { self.add_to(i, j, val); });
    }
}

impl std::ops::Add<&SpMat> for &SpMat {
    type Output = SpMat;

    fn add(self, rhs: &SpMat) -> Self::Output {
        let mut new = self.clone();
        new += rhs;
        new
    }
}

impl std::ops::SubAssign<&SpMat> for SpMat {
    /// *Panics if the shapes disagree.*
    fn sub_assign(&mut self, rhs: &SpMat) {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("SpMat: shape mismatch in -");
        }
        rhs.iter().for_each(|((i, j), val)| { self.add_to(i, j, -val); });
    }
}

impl std::ops::Sub<&SpMat> for &SpMat {
    type Output = SpMat;

    fn sub(self, rhs: &SpMat) -> Self::Output {
        let mut new = self.clone();
        new -= rhs;
        new
    }
}

impl std::ops::Neg for &SpMat {
    type Output = SpMat;

    fn neg(self) -> Self::Output {
        let elems: FxHashMap<(usize, usize), C64> =
            self.elems.iter().map(|(coord, a)| (*coord, -*a)).collect();
        SpMat { rows: self.rows, cols: self.cols, elems }
    }
}

impl std::ops::Mul<&SpMat> for &SpMat {
    type Output = SpMat;

    /// *Panics if the inner dimensions disagree.*
    fn mul(self, rhs: &SpMat) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("SpMat: inner dimension mismatch in *");
        }
        // bucket the right operand by row so each left nonzero scans only
        // the rows it can meet
        let mut rhs_rows: FxHashMap<usize, Vec<(usize, C64)>> =
            FxHashMap::default();
        for ((k, j), b) in rhs.iter() {
            rhs_rows.entry(k).or_default().push((j, b));
        }
        let mut new = SpMat::zero(self.rows, rhs.cols);
        for ((i, k), a) in self.iter() {
            if let Some(row) = rhs_rows.get(&k) {
                for (j, b) in row.iter() {
                    new.add_to(i, *j, a * *b);
                }
            }
        }
        new
    }
}

impl std::ops::Mul<&SpVec> for &SpMat {
    type Output = SpVec;

    /// *Panics if the shapes disagree.*
    fn mul(self, rhs: &SpVec) -> Self::Output { self.apply(rhs) }
}

impl std::ops::MulAssign<C64> for SpMat {
    fn mul_assign(&mut self, z: C64) {
        if z.norm() < EPSILON {
            self.elems.clear();
        } else {
            self.elems.values_mut().for_each(|val| { *val *= z; });
        }
    }
}

impl std::ops::Mul<C64> for SpMat {
    type Output = SpMat;

    fn mul(mut self, z: C64) -> Self::Output {
        self *= z;
        self
    }
}

impl std::ops::Mul<SpMat> for C64 {
    type Output = SpMat;

    fn mul(self, mut rhs: SpMat) -> Self::Output {
        rhs *= self;
        rhs
    }
}

impl std::ops::MulAssign<f64> for SpMat {
    fn mul_assign(&mut self, z: f64) { *self *= C64::from(z); }
}

impl std::ops::Mul<f64> for SpMat {
    type Output = SpMat;

    fn mul(mut self, z: f64) -> Self::Output {
        self *= z;
        self
    }
}

impl std::ops::Mul<SpMat> for f64 {
    type Output = SpMat;

    fn mul(self, mut rhs: SpMat) -> Self::Output {
        rhs *= self;
        rhs
    }
}
