//! This package contains tools for working with quantum-mechanical state
//! spaces represented as explicit tensor products of labeled factor spaces,
//! and for doing algebra over sparse operators defined on those spaces
//! without losing track of which tensor factor each index belongs to.
//!
//! - [`space`] provides the core data model: an atomic [`Factor`][space::Factor]
//! carrying a dimension and a catalogue of named sparse operators, and a
//! [`Space`][space::Space] formed as an ordered tensor product of factors.
//! Spaces are composed by Kronecker product, single-factor operators are
//! lifted into joint spaces, and joint operators are reduced by partial
//! trace.
//! - [`sparse`] provides the sparse complex vector and matrix types backing
//! every operator, storing only structurally nonzero elements.
//! - [`view`] exposes subsystem-aware multi-index access over the flat
//! sparse storage, maintaining the bijection between flat Kronecker indices
//! and per-factor multi-indices so that no operation ever materializes a
//! dense representation of the joint space.
//! - [`namemap`] is the insertion-ordered name-to-operator catalogue used
//! throughout.
//!
//! # See also
//! - [QuantumOptics.jl](https://qojulia.org/): a Julia framework built
//! around the same composite-basis ideas.
//! - [QuTiP](https://qutip.org/): the Python quantum toolbox whose `ptrace`
//! this crate's reduction mirrors.
//!

pub mod namemap;
pub mod sparse;
pub mod space;
pub mod view;

use num_complex::Complex64 as C64;

pub(crate) const EPSILON: f64 = 1e-12;

/// Compare two complex numbers for equality within [`EPSILON`].
pub(crate) fn c64_eq<T>(a: C64, b: T) -> bool
where T: Into<C64>
{
    (a - b.into()).norm() < EPSILON
}

pub extern crate num_complex;
/// Handy macro to create `num_complex::Complex64`s from more natural and
/// succinct syntax.
///
/// ```
/// use std::f64::consts::PI;
/// use num_complex::Complex64;
/// use tensor_space::c;
///
/// assert_eq!( c!(i (-1.0)),    Complex64::new(0.0, -1.0)      );
/// assert_eq!( c!(e PI),        Complex64::cis(PI)             );
/// assert_eq!( c!(1.0),         Complex64::new(1.0, 0.0)       );
/// assert_eq!( c!(1.0 + i 1.0), Complex64::new(1.0, 1.0)       );
/// assert_eq!( c!(1.0 - i 1.0), Complex64::new(1.0, -1.0)      );
/// assert_eq!( c!(1.0 + 1.0 i), Complex64::new(1.0, 1.0)       );
/// assert_eq!( c!(1.0 - 1.0 i), Complex64::new(1.0, -1.0)      );
/// assert_eq!( c!(1.0, 1.0),    Complex64::new(1.0, 1.0)       );
/// assert_eq!( c!(1.0, e PI),   Complex64::from_polar(1.0, PI) );
/// ```
#[macro_export]
macro_rules! c {
    ( i $im:expr )
        => { $crate::num_complex::Complex64::new(0.0, $im) };
    ( e $ph:expr )
        => { $crate::num_complex::Complex64::cis($ph) };
    ( $re:expr )
        => { $crate::num_complex::Complex64::new($re, 0.0) };
    ( $re:literal + i $im:literal )
        => { $crate::num_complex::Complex64::new($re, $im) };
    ( $re:literal - i $im:literal )
        => { $crate::num_complex::Complex64::new($re, -$im) };
    ( $re:literal + $im:literal i )
        => { $crate::num_complex::Complex64::new($re, $im) };
    ( $re:literal - $im:literal i )
        => { $crate::num_complex::Complex64::new($re, -$im) };
    ( $r:expr, e $ph:expr )
        => { $crate::num_complex::Complex64::from_polar($r, $ph) };
    ( $re:expr, $im:expr )
        => { $crate::num_complex::Complex64::new($re, $im) };
}
