//! Sparse distributed multivariate polynomial arithmetic over Z and F_p.
//!
//! A packed-exponent monomial representation (`monomial`) backs a sparse
//! polynomial container (`sparse`) whose multiplication, multiply-subtract,
//! and division are driven by a shared heap-scheduled kernel (`heap`). A
//! univariate-with-multivariate-coefficients view (`univar`) and an
//! evaluator/lifter pair (`eval`, `lift`) feed the two modular GCD drivers
//! under `gcd`: a dense driver (`gcd::brown`) and a sparse driver
//! (`gcd::zippel`), both bottoming out at the dense univariate engine
//! (`dense`) over `F_p` (`nmod`) and reconstructing integer coefficients via
//! `bigint`'s CRT helpers. `vandermonde` supplies Zippel's transposed
//! Vandermonde solver, `quadratic` the finite-field quadratic root used by
//! the quadratic-extension machinery, and `division`/`threadpool` the
//! chunked parallel exact-division protocol.

pub mod bigint;
pub mod dense;
pub mod division;
pub mod error;
pub mod eval;
pub mod gcd;
pub mod heap;
pub mod lift;
pub mod monomial;
pub mod nmod;
pub mod quadratic;
pub mod sparse;
pub mod threadpool;
pub mod univar;
pub mod vandermonde;

// Curated re-exports of the types callers reach for most often.

pub use bigint::{bits, content, crt, exact_divide, symmetric_lift};
pub use dense::DensePoly;
pub use division::{divides, divides_parallel, divrem};
pub use error::MPolyError;
pub use gcd::brown::gcd_brown;
pub use gcd::zippel::gcd_zippel;
pub use gcd::GcdResult;
pub use monomial::{Context, Exponent, MonomialOrder};
pub use nmod::Nmod;
pub use quadratic::quadratic_root;
pub use sparse::{Coeff, MPoly};
pub use threadpool::{Scope, ThreadPool};
pub use vandermonde::solve_transposed_vandermonde;

/// Convenience prelude for the common construction/arithmetic path.
pub mod prelude {
    pub use crate::monomial::{Context, MonomialOrder};
    pub use crate::nmod::Nmod;
    pub use crate::sparse::{Coeff, MPoly};
    pub use crate::{divides, divides_parallel, divrem};
    pub use crate::{gcd_brown, gcd_zippel, GcdResult};
    pub use crate::{quadratic_root, solve_transposed_vandermonde};
}
