use std::fmt;
use itertools::Itertools;
use crate::{
    namemap::NameMap,
    sparse::{ SpMat, SpVec },
};
use super::{ SpaceError, SpaceResult };

/// An atomic Hilbert-space factor.
///
/// A `Factor` couples a positive dimension with a display name and an
/// insertion-ordered catalogue of named operators acting on the factor.
/// Every operator in the catalogue is square with side equal to the factor's
/// dimension, and the catalogue always contains the identity under the name
/// `"i"`. Factors are immutable values once finalized; constructors may
/// populate additional named operators via [`insert_op`][Self::insert_op]
/// before handing the factor out.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    pub(crate) dim: usize,
    pub(crate) name: String,
    pub(crate) ops: NameMap<SpMat>,
}

impl Factor {
    /// Create a new factor of dimension `dim` with an operator catalogue
    /// holding only the identity.
    ///
    /// Fails if `dim` is zero.
    pub fn new<S>(dim: usize, name: S) -> SpaceResult<Self>
    where S: Into<String>
    {
        if dim == 0 { return Err(SpaceError::InvalidDimension); }
        let mut ops: NameMap<SpMat> = NameMap::new();
        ops.insert("i", SpMat::identity(dim));
        Ok(Self { dim, name: name.into(), ops })
    }

    /// Create a new factor of dimension `dim` with an explicit operator
    /// catalogue.
    ///
    /// Every operator must be square with side `dim`; the identity is
    /// inserted under `"i"` if the catalogue does not already contain it.
    /// Fails if `dim` is zero or any operator has the wrong shape.
    pub fn with_operators<S>(dim: usize, name: S, ops: NameMap<SpMat>)
        -> SpaceResult<Self>
    where S: Into<String>
    {
        if dim == 0 { return Err(SpaceError::InvalidDimension); }
        for (opname, op) in ops.iter() {
            if op.shape() != (dim, dim) {
                return Err(SpaceError::DimensionMismatch(format!(
                    "operator '{}' has shape {:?}, expected ({}, {})",
                    opname, op.shape(), dim, dim,
                )));
            }
        }
        let mut ops = ops;
        if !ops.contains_key("i") {
            ops.insert("i", SpMat::identity(dim));
        }
        Ok(Self { dim, name: name.into(), ops })
    }

    /// Add an operator to the catalogue under `name`, replacing and
    /// returning any existing operator under the same name.
    ///
    /// Fails if the operator is not square with side equal to the factor's
    /// dimension.
    pub fn insert_op<S>(&mut self, name: S, op: SpMat)
        -> SpaceResult<Option<SpMat>>
    where S: Into<String>
    {
        if op.shape() != (self.dim, self.dim) {
            return Err(SpaceError::DimensionMismatch(format!(
                "operator has shape {:?}, expected ({}, {})",
                op.shape(), self.dim, self.dim,
            )));
        }
        Ok(self.ops.insert(name, op))
    }

    /// Return the dimension of the factor.
    pub fn dim(&self) -> usize { self.dim }

    /// Return the display name of the factor.
    pub fn name(&self) -> &str { &self.name }

    /// Return a reference to the operator catalogue.
    pub fn ops(&self) -> &NameMap<SpMat> { &self.ops }

    /// Look up an operator by name.
    ///
    /// Fails if the catalogue does not contain `name`.
    pub fn op(&self, name: &str) -> SpaceResult<&SpMat> {
        self.ops.get(name)
            .ok_or_else(|| SpaceError::UnknownOperatorName(name.to_string()))
    }

    /// Return the canonical basis vector ∣`k`⟩ of the factor.
    ///
    /// Fails if `k` is out of range.
    pub fn ket(&self, k: usize) -> SpaceResult<SpVec> {
        if k >= self.dim {
            return Err(SpaceError::MalformedIndexing(format!(
                "basis index {} out of range for dimension {}", k, self.dim,
            )));
        }
        Ok(SpVec::basis(self.dim, k))
    }

    /// Return the basis projector ∣`i`⟩⟨`j`∣ of the factor.
    ///
    /// Fails if `i` or `j` is out of range.
    pub fn proj(&self, i: usize, j: usize) -> SpaceResult<SpMat> {
        if i >= self.dim || j >= self.dim {
            return Err(SpaceError::MalformedIndexing(format!(
                "basis coordinate ({}, {}) out of range for dimension {}",
                i, j, self.dim,
            )));
        }
        Ok(SpMat::unit(self.dim, self.dim, i, j))
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f, "Factor \"{}\" (dim {}) [{}]",
            self.name, self.dim, self.ops.keys().join(", "),
        )
    }
}
