//! Modular GCD pipeline (spec sections 4.9-4.10): a dense driver (Brown)
//! and a sparse driver (Zippel), sharing the recursive evaluation-
//! interpolation engine that bottoms out at a univariate GCD in `dense.rs`.

pub mod brown;
pub mod zippel;

use crate::sparse::MPoly;

/// Result of a successful GCD: the GCD itself and both cofactors
/// (`A/G`, `B/G`).
pub struct GcdResult {
    pub gcd: MPoly,
    pub cofactor_a: MPoly,
    pub cofactor_b: MPoly,
}
