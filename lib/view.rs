//! Subsystem-aware multi-index views over flat sparse storage.
//!
//! The flat linear index of a Kronecker product runs over the per-factor
//! indices with the *leftmost* factor as the most significant digit: for
//! factor dimensions `d_0, …, d_{k-1}` the multi-index `(i_0, …, i_{k-1})`
//! addresses flat element `(((i_0) d_1 + i_1) d_2 + …) + i_{k-1}`. A
//! [`SubView`] wraps a flat sparse vector or matrix together with the
//! per-factor dimensions of the [`Space`] it was created from, exposing
//! multi-index reads and writes that pass straight through to the underlying
//! storage -- nothing is copied or densified.
//!
//! [`pack_index`] and [`unpack_index`] are the only two functions in the
//! crate that translate between the flat and per-factor index spaces; every
//! view access and the partial trace route through them.

use num_complex::Complex64 as C64;
use crate::{
    sparse::{ SpMat, SpVec },
    space::{ Space, SpaceError, SpaceResult },
};

/// Convert a per-factor multi-index to its flat Kronecker index.
///
/// The leftmost factor is the most significant digit.
///
/// *Panics if the lengths of `dims` and `idx` disagree, or any index
/// component is out of range.*
pub fn pack_index(dims: &[usize], idx: &[usize]) -> usize {
    if dims.len() != idx.len() {
        panic!("pack_index: multi-index length mismatch");
    }
    dims.iter().zip(idx)
        .fold(0, |acc, (d, i)| {
            if i >= d { panic!("pack_index: index component out of range"); }
            acc * d + i
        })
}

/// Convert a flat Kronecker index to its per-factor multi-index.
///
/// Inverse of [`pack_index`].
///
/// *Panics if `flat` is out of range for the total dimension.*
pub fn unpack_index(dims: &[usize], flat: usize) -> Vec<usize> {
    if flat >= dims.iter().product() {
        panic!("unpack_index: flat index out of range");
    }
    let mut rem = flat;
    let mut idx: Vec<usize> = vec![0; dims.len()];
    for (slot, d) in idx.iter_mut().zip(dims).rev() {
        *slot = rem % d;
        rem /= d;
    }
    idx
}

#[derive(Debug)]
enum ViewData<'a> {
    Ket(&'a mut SpVec),
    Op(&'a mut SpMat),
}

/// A non-owning, subsystem-aware multi-index wrapper over a flat sparse
/// vector (rank 1) or matrix (rank 2).
///
/// For a rank-1 view over a space of `nsys` factors, an index tuple holds
/// one index per factor; for a rank-2 view it holds `nsys` row indices
/// followed by `nsys` column indices. Reads and writes pass through to the
/// wrapped storage, and [`unview_ket`][Self::unview_ket] /
/// [`unview_op`][Self::unview_op] recover the exclusive reference to it.
///
/// Views are ephemeral: create one for the duration of an indexing or trace
/// operation and let it go.
#[derive(Debug)]
pub struct SubView<'a> {
    dims: Vec<usize>,
    data: ViewData<'a>,
}

impl<'a> SubView<'a> {
    /// Return the rank of the wrapped data: 1 for a ket, 2 for an operator.
    pub fn rank(&self) -> usize {
        match &self.data {
            ViewData::Ket(_) => 1,
            ViewData::Op(_) => 2,
        }
    }

    /// Return the per-factor dimensions of the originating space.
    pub fn dims(&self) -> &[usize] { &self.dims }

    /// Return the number of indices in a full index tuple: `nsys` for a
    /// rank-1 view, `2 nsys` for a rank-2 view.
    pub fn nidx(&self) -> usize { self.rank() * self.dims.len() }

    /// Return the total flat dimension along one axis of the wrapped data.
    pub fn flat_len(&self) -> usize { self.dims.iter().product() }

    fn check_idx(&self, idx: &[usize]) -> SpaceResult<()> {
        if idx.len() != self.nidx() {
            return Err(SpaceError::MalformedIndexing(format!(
                "index tuple has length {}, expected {}",
                idx.len(), self.nidx(),
            )));
        }
        for (k, (i, d)) in
            idx.iter().zip(self.dims.iter().cycle()).enumerate()
        {
            if i >= d {
                return Err(SpaceError::MalformedIndexing(format!(
                    "index {} at position {} out of range for dimension {}",
                    i, k, d,
                )));
            }
        }
        Ok(())
    }

    /// Read the element at a per-factor index tuple.
    ///
    /// Fails if the tuple has the wrong length or any component is out of
    /// range.
    pub fn get(&self, idx: &[usize]) -> SpaceResult<C64> {
        self.check_idx(idx)?;
        match &self.data {
            ViewData::Ket(ket) => Ok(ket.get(pack_index(&self.dims, idx))),
            ViewData::Op(op) => {
                let (ridx, cidx) = idx.split_at(self.dims.len());
                Ok(op.get(
                    pack_index(&self.dims, ridx),
                    pack_index(&self.dims, cidx),
                ))
            },
        }
    }

    /// Write the element at a per-factor index tuple, passing through to
    /// the wrapped storage.
    ///
    /// Fails if the tuple has the wrong length or any component is out of
    /// range.
    pub fn set(&mut self, idx: &[usize], val: C64) -> SpaceResult<()> {
        self.check_idx(idx)?;
        match &mut self.data {
            ViewData::Ket(ket) => {
                let k = pack_index(&self.dims, idx);
                ket.set(k, val);
            },
            ViewData::Op(op) => {
                let (ridx, cidx) = idx.split_at(self.dims.len());
                let i = pack_index(&self.dims, ridx);
                let j = pack_index(&self.dims, cidx);
                op.set(i, j, val);
            },
        }
        Ok(())
    }

    fn check_flat(&self, k: usize) -> SpaceResult<usize> {
        let len = self.flat_len();
        let total = if self.rank() == 1 { len } else { len * len };
        if k >= total {
            return Err(SpaceError::MalformedIndexing(format!(
                "flat index {} out of range for {} elements", k, total,
            )));
        }
        Ok(len)
    }

    /// Read the element at a single flat index.
    ///
    /// For a rank-2 view the flat index runs row-major over all `len²`
    /// elements. Fails if `k` is out of range.
    pub fn get_flat(&self, k: usize) -> SpaceResult<C64> {
        let len = self.check_flat(k)?;
        match &self.data {
            ViewData::Ket(ket) => Ok(ket.get(k)),
            ViewData::Op(op) => Ok(op.get(k / len, k % len)),
        }
    }

    /// Write the element at a single flat index.
    ///
    /// For a rank-2 view the flat index runs row-major over all `len²`
    /// elements. Fails if `k` is out of range.
    pub fn set_flat(&mut self, k: usize, val: C64) -> SpaceResult<()> {
        let len = self.check_flat(k)?;
        match &mut self.data {
            ViewData::Ket(ket) => { ket.set(k, val); },
            ViewData::Op(op) => { op.set(k / len, k % len, val); },
        }
        Ok(())
    }

    /// Borrow the wrapped operator.
    ///
    /// Fails with `UnsupportedRank` if `self` wraps a rank-1 ket.
    pub fn as_op(&self) -> SpaceResult<&SpMat> {
        match &self.data {
            ViewData::Op(op) => Ok(op),
            ViewData::Ket(_) => Err(SpaceError::UnsupportedRank(2, 1)),
        }
    }

    /// Borrow the wrapped ket.
    ///
    /// Fails with `UnsupportedRank` if `self` wraps a rank-2 operator.
    pub fn as_ket(&self) -> SpaceResult<&SpVec> {
        match &self.data {
            ViewData::Ket(ket) => Ok(ket),
            ViewData::Op(_) => Err(SpaceError::UnsupportedRank(1, 2)),
        }
    }

    /// Recover the exclusive reference to the wrapped flat operator,
    /// consuming the view.
    ///
    /// Fails with `UnsupportedRank` if `self` wraps a rank-1 ket.
    pub fn unview_op(self) -> SpaceResult<&'a mut SpMat> {
        match self.data {
            ViewData::Op(op) => Ok(op),
            ViewData::Ket(_) => Err(SpaceError::UnsupportedRank(2, 1)),
        }
    }

    /// Recover the exclusive reference to the wrapped flat ket, consuming
    /// the view.
    ///
    /// Fails with `UnsupportedRank` if `self` wraps a rank-2 operator.
    pub fn unview_ket(self) -> SpaceResult<&'a mut SpVec> {
        match self.data {
            ViewData::Ket(ket) => Ok(ket),
            ViewData::Op(_) => Err(SpaceError::UnsupportedRank(1, 2)),
        }
    }
}

impl Space {
    /// Wrap a flat joint operator in a rank-2 [`SubView`] over `self`.
    ///
    /// Fails if `op` is not square with side equal to the space's total
    /// dimension.
    pub fn subview<'a>(&self, op: &'a mut SpMat) -> SpaceResult<SubView<'a>> {
        let len = self.len();
        if op.shape() != (len, len) {
            return Err(SpaceError::DimensionMismatch(format!(
                "operator has shape {:?}, expected ({}, {})",
                op.shape(), len, len,
            )));
        }
        Ok(SubView { dims: self.size(), data: ViewData::Op(op) })
    }

    /// Wrap a flat joint ket in a rank-1 [`SubView`] over `self`.
    ///
    /// Fails if `ket`'s length does not equal the space's total dimension.
    pub fn subview_ket<'a>(&self, ket: &'a mut SpVec)
        -> SpaceResult<SubView<'a>>
    {
        let len = self.len();
        if ket.dim() != len {
            return Err(SpaceError::DimensionMismatch(format!(
                "ket has length {}, expected {}", ket.dim(), len,
            )));
        }
        Ok(SubView { dims: self.size(), data: ViewData::Ket(ket) })
    }
}
