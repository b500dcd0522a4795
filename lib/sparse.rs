//! Sparse complex-valued vectors and matrices.
//!
//! [`SpVec`] and [`SpMat`] store only their structurally nonzero elements,
//! keyed by flat index; writes of values with magnitude below `1e-12` remove
//! the element instead. These are the operand types for every operator and
//! ket in the crate -- any vector or matrix of the correct size is a valid
//! operand for a [`Space`][crate::space::Space], with no ownership relation
//! beyond matching dimension.
//!
//! Shape agreement between operands is the caller's responsibility here:
//! arithmetic on mismatched shapes is a programmer error and panics. The
//! fallible, validated surface lives at the [`space`][crate::space] level.

pub(crate) mod vector;
pub use vector::*;

pub(crate) mod matrix;
pub use matrix::*;
