//! Homomorphic lifters (spec section 4.8): reduce ℤ to 𝔽ₚ, lift back, and
//! Chinese-remainder merge a new prime's image into a running ℤ lift.

use crate::bigint;
use crate::monomial::Context;
use crate::nmod::Nmod;
use crate::sparse::{Coeff, MPoly};
use num_bigint::BigInt;
use num_integer::Integer;
use std::sync::Arc;

/// `reduce_mod_p(A)`: reduces every ℤ coefficient mod `p`; a term whose
/// coefficient is divisible by `p` dies (support may shrink).
pub fn reduce_mod_p(a: &MPoly, p: u64) -> MPoly {
    let pctx = Context::new(a.ctx.nvars, a.ctx.order, a.ctx.bits_per_field);
    let mut out = MPoly::zero(&pctx);
    for (c, e) in a.coeffs().iter().zip(a.exps().iter()) {
        let v = match c {
            Coeff::Z(v) => v,
            Coeff::P(_) => panic!("reduce_mod_p expects Z coefficients"),
        };
        let reduced = mod_u64(v, p);
        if reduced != 0 {
            out.push_term(Coeff::P(Nmod::new(reduced, p)), e.clone());
        }
    }
    out
}

fn mod_u64(v: &BigInt, p: u64) -> u64 {
    let r = v.mod_floor(&BigInt::from(p));
    let (_, digits) = r.to_u64_digits();
    digits.first().copied().unwrap_or(0)
}

/// `lift_mod_p(A_p)`: maps 𝔽ₚ coefficients back to ℤ via the symmetric
/// lift. Used for the first prime in a Brown run.
pub fn lift_mod_p(a_p: &MPoly) -> MPoly {
    let zctx = Context::new(a_p.ctx.nvars, a_p.ctx.order, a_p.ctx.bits_per_field);
    let mut out = MPoly::zero(&zctx);
    for (c, e) in a_p.coeffs().iter().zip(a_p.exps().iter()) {
        let v = match c {
            Coeff::P(v) => v,
            Coeff::Z(_) => panic!("lift_mod_p expects F_p coefficients"),
        };
        let lifted = bigint::symmetric_lift(&BigInt::from(v.value()), &BigInt::from(v.modulus()));
        out.push_term(Coeff::Z(lifted), e.clone());
    }
    out
}

/// `crt_p(H, m, A_p, p)`: updates `H` so that `H mod m` is unchanged and
/// `H mod p == A_p`, merging monomial supports (the union of both). Returns
/// `(merged, changed)`.
pub fn crt_p(h: &MPoly, m: &BigInt, a_p: &MPoly, p: u64) -> (MPoly, bool) {
    let ctx = h.ctx.clone();
    let mut out = MPoly::zero(&ctx);
    let mut changed = false;

    let (mut i, mut j) = (0, 0);
    let h_exps = h.exps();
    let h_coeffs = h.coeffs();
    let a_exps = a_p.exps();
    let a_coeffs = a_p.coeffs();

    while i < h_exps.len() || j < a_exps.len() {
        let cmp = if i >= h_exps.len() {
            std::cmp::Ordering::Less
        } else if j >= a_exps.len() {
            std::cmp::Ordering::Greater
        } else {
            ctx.cmp(&h_exps[i], &a_exps[j])
        };

        match cmp {
            std::cmp::Ordering::Greater => {
                // term only in H: merging with an implicit 0 mod p.
                let old = as_bigint(&h_coeffs[i]);
                let merged = bigint::crt(&old, m, &BigInt::from(0), &BigInt::from(p));
                if merged != old {
                    changed = true;
                }
                if !merged_is_zero(&merged) {
                    out.push_term(Coeff::Z(merged), h_exps[i].clone());
                }
                i += 1;
            }
            std::cmp::Ordering::Less => {
                // term only in A_p: merging an implicit 0 in H.
                let new_val = BigInt::from(as_nmod(&a_coeffs[j]).value());
                let merged = bigint::crt(&BigInt::from(0), m, &new_val, &BigInt::from(p));
                changed = true;
                if !merged_is_zero(&merged) {
                    out.push_term(Coeff::Z(merged), a_exps[j].clone());
                }
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                let old = as_bigint(&h_coeffs[i]);
                let new_val = BigInt::from(as_nmod(&a_coeffs[j]).value());
                let merged = bigint::crt(&old, m, &new_val, &BigInt::from(p));
                if merged != old {
                    changed = true;
                }
                if !merged_is_zero(&merged) {
                    out.push_term(Coeff::Z(merged), h_exps[i].clone());
                }
                i += 1;
                j += 1;
            }
        }
    }
    (out, changed)
}

/// `mcrt_p`: fast-path CRT merge used by Zippel once the outer form is
/// fixed. Precondition: `h` and `a_p` already have identical monomial
/// support, so no merge pass is needed.
pub fn mcrt_p(h: &MPoly, m: &BigInt, a_p: &MPoly, p: u64) -> (MPoly, bool) {
    debug_assert_eq!(h.len(), a_p.len());
    let ctx = h.ctx.clone();
    let mut out = MPoly::zero(&ctx);
    let mut changed = false;
    for i in 0..h.len() {
        debug_assert_eq!(h.exps()[i], a_p.exps()[i]);
        let old = as_bigint(&h.coeffs()[i]);
        let new_val = BigInt::from(as_nmod(&a_p.coeffs()[i]).value());
        let merged = bigint::crt(&old, m, &new_val, &BigInt::from(p));
        if merged != old {
            changed = true;
        }
        out.push_term(Coeff::Z(merged), h.exps()[i].clone());
    }
    (out, changed)
}

fn as_bigint(c: &Coeff) -> BigInt {
    match c {
        Coeff::Z(v) => v.clone(),
        Coeff::P(_) => panic!("expected Z coefficient"),
    }
}

fn as_nmod(c: &Coeff) -> Nmod {
    match c {
        Coeff::P(v) => *v,
        Coeff::Z(_) => panic!("expected F_p coefficient"),
    }
}

fn merged_is_zero(v: &BigInt) -> bool {
    v == &BigInt::from(0)
}

/// `interp_reduce(E, alpha)`: reduces a last-variable-dense form at
/// `x_last = alpha`, yielding a polynomial in the remaining variables.
/// Here `E` is represented as a dense `Vec` indexed by the last variable's
/// exponent, each slot an (n-1)-variable polynomial over 𝔽ₚ.
pub fn interp_reduce(e: &[MPoly], alpha: Nmod, inner_ctx: &Arc<Context>) -> MPoly {
    let mut acc = MPoly::zero(inner_ctx);
    let mut power = Nmod::one(alpha.modulus());
    for coeff in e {
        if !coeff.is_zero() {
            acc = acc.add(&coeff.scalar_mul(&Coeff::P(power)));
        }
        power = power * alpha;
    }
    acc
}

/// `interp_crt(H, evaluated_so_far, G, alpha)`: univariate CRT update along
/// the last variable. Given an interpolant `H` (dense, indexed by
/// last-variable exponent) that already matches target values at the
/// evaluation points recorded in `evaluated_so_far`, folds in a new target
/// value `G` observed at `alpha`, by Lagrange-updating each dense slot:
/// `H_k := H_k + (G - interp_reduce(H, alpha)) * basis_k(alpha)`, where
/// `basis_k` is the Lagrange basis polynomial for slot `k` over the points
/// seen so far. Monomial supports merge the way `crt_p` does.
pub fn interp_crt(h: &mut Vec<MPoly>, points_seen: &[Nmod], g: &MPoly, alpha: Nmod, inner_ctx: &Arc<Context>) {
    let current = interp_reduce(h, alpha, inner_ctx);
    let residual = g.sub(&current);
    if residual.is_zero() {
        return;
    }
    // Build the correction polynomial c(x) = Π_{s in points_seen} (x - s) /
    // Π_{s in points_seen} (alpha - s), so c(alpha) = 1 and c(s) = 0 for
    // every previously matched point; adding residual * c(x) to H preserves
    // all earlier matches while fixing the new one.
    let modulus = alpha.modulus();
    let mut denom = Nmod::one(modulus);
    for &s in points_seen {
        denom = denom * (alpha - s);
    }
    let scale = denom.inverse().expect("evaluation points must be distinct");

    // c(x) as dense coefficients in x, built by successive multiplication
    // by (x - s).
    let mut c_coeffs = vec![Nmod::one(modulus)];
    for &s in points_seen {
        let mut next = vec![Nmod::zero(modulus); c_coeffs.len() + 1];
        for (i, &coeff) in c_coeffs.iter().enumerate() {
            next[i + 1] = next[i + 1] + coeff;
            next[i] = next[i] - coeff * s;
        }
        c_coeffs = next;
    }

    if h.len() < c_coeffs.len() {
        h.resize_with(c_coeffs.len(), || MPoly::zero(inner_ctx));
    }
    for (k, &ck) in c_coeffs.iter().enumerate() {
        let term = residual.scalar_mul(&Coeff::P(ck * scale));
        if !term.is_zero() {
            h[k] = h[k].add(&term);
        }
    }
}
