//! Dense modular GCD (Brown), spec section 4.9. Ground truth:
//! `examples/original_source/fmpz_mpoly/gcd_brown.c`'s
//! `fmpz_mpolyu_gcd_brown`/`fmpz_mpoly_gcd_brown`, read in full — the
//! asymmetric leading-monomial comparison rule (spec section 9's first open
//! question) and the "failed termination check never resets the modulus"
//! rule are taken from there verbatim.

use crate::bigint;
use crate::dense::DensePoly;
use crate::eval::eval_one_p;
use crate::gcd::GcdResult;
use crate::heap;
use crate::lift;
use crate::monomial::Context;
use crate::nmod::Nmod;
use crate::sparse::{Coeff, MPoly};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::sync::Arc;

const MAX_EVAL_ATTEMPTS: u32 = 40;

/// `gcd_brown(A, B)`: full ℤ pipeline (content split, Landau-Mignotte
/// bound, machine-prime loop, CRT lift, norm-based termination).
pub fn gcd_brown(a: &MPoly, b: &MPoly) -> Option<GcdResult> {
    let ctx = a.ctx.clone();
    if a.is_zero() {
        return Some(boundary_result(&ctx, b));
    }
    if b.is_zero() {
        return Some(boundary_result(&ctx, a));
    }

    // 1. Content split.
    let c_a = a.content();
    let c_b = b.content();
    let c_g = c_a.gcd(&c_b);
    let a_prime = a.divide_content(&c_a);
    let b_prime = b.divide_content(&c_b);

    // 2. Bound.
    let lc_a = as_z(a_prime.leading_coeff().unwrap());
    let lc_b = as_z(b_prime.leading_coeff().unwrap());
    let gamma = lc_a.gcd(&lc_b);
    let bound = BigInt::from(2) * &gamma * height_inf(&a_prime).max(height_inf(&b_prime));

    // 3. Machine-prime loop.
    let mut modulus = BigInt::from(1);
    let mut g: Option<MPoly> = None; // running ℤ lift of G
    let mut abar: Option<MPoly> = None;
    let mut bbar: Option<MPoly> = None;
    let mut prime: u64 = 1 << 20;

    loop {
        prime = Nmod::next_prime(prime);
        if modulus > &bound * BigInt::from(4) {
            // Exhausted a generous multiple of the bound without success:
            // report failure so the caller can try another strategy.
            return None;
        }
        let gamma_mod_p = gamma.mod_floor(&BigInt::from(prime));
        if gamma_mod_p.is_zero() {
            continue;
        }

        let a_p = lift::reduce_mod_p(&a_prime, prime);
        let b_p = lift::reduce_mod_p(&b_prime, prime);
        if a_p.is_zero() || b_p.is_zero() {
            continue; // unlucky prime: a leading coefficient vanished
        }

        let sub = match gcd_mod_p(&a_p, &b_p, prime) {
            Some(r) => r,
            None => continue, // recursive sub-call was unlucky
        };
        let (mut g_p, mut abar_p, mut bbar_p) = sub;

        // (d) scale G_p so its leading coefficient matches gamma mod p.
        let gamma_p = Nmod::new(u64_mod(&gamma_mod_p, prime), prime);
        let lc_gp = as_p(g_p.leading_coeff().unwrap());
        if lc_gp.is_zero() {
            continue;
        }
        let scale = gamma_p * lc_gp.inverse().expect("leading coeff of a nonzero image is invertible");
        g_p = g_p.scalar_mul(&Coeff::P(scale));
        let inv_scale = scale.inverse().expect("scale is nonzero");
        abar_p = abar_p.scalar_mul(&Coeff::P(inv_scale));
        bbar_p = bbar_p.scalar_mul(&Coeff::P(inv_scale));

        // (e) asymmetric leading-monomial comparison.
        let restart = match &g {
            None => false,
            Some(g_running) => {
                let running_lm = lift::reduce_mod_p(g_running, prime);
                match (running_lm.leading_monomial(), g_p.leading_monomial()) {
                    (Some(old_lm), Some(new_lm)) => match ctx.cmp(old_lm, new_lm) {
                        Ordering::Greater => true, // old lift was unlucky: discard history and restart.
                        Ordering::Less => {
                            // new prime unlucky: skip this prime entirely.
                            continue;
                        }
                        Ordering::Equal => false,
                    },
                    _ => false,
                }
            }
        };
        if restart {
            modulus = BigInt::from(1);
            g = None;
            abar = None;
            bbar = None;
        }

        // (f) CRT merge.
        let (new_g, _) = match &g {
            Some(g_old) => lift::crt_p(g_old, &modulus, &g_p, prime),
            None => (lift::lift_mod_p(&g_p), false),
        };
        let (new_abar, _) = match &abar {
            Some(a_old) => lift::crt_p(a_old, &modulus, &abar_p, prime),
            None => (lift::lift_mod_p(&abar_p), false),
        };
        let (new_bbar, _) = match &bbar {
            Some(b_old) => lift::crt_p(b_old, &modulus, &bbar_p, prime),
            None => (lift::lift_mod_p(&bbar_p), false),
        };
        g = Some(new_g);
        abar = Some(new_abar);
        bbar = Some(new_bbar);
        modulus = &modulus * BigInt::from(prime);

        // (g) termination test.
        if modulus > bound {
            let g_ref = g.as_ref().unwrap();
            let abar_ref = abar.as_ref().unwrap();
            let bbar_ref = bbar.as_ref().unwrap();
            if terminates(g_ref, abar_ref, &modulus) && terminates(g_ref, bbar_ref, &modulus) {
                // g_ref = content(g_ref) * g_primitive, and a_prime = g_ref *
                // abar, so a_prime = g_primitive * (content(g_ref) * abar);
                // pushing g_ref's content onto the cofactors instead keeps
                // the primitive-part identity exact.
                let content_g = g_ref.content();
                let g_primitive = if content_g.is_zero() || content_g == BigInt::from(1) {
                    g_ref.clone()
                } else {
                    g_ref.divide_content(&content_g)
                };
                let abar_final = abar_ref.scalar_mul(&Coeff::Z(content_g.clone())).scalar_mul(&Coeff::Z(
                    bigint::exact_divide(&c_a, &c_g).unwrap_or_else(|| BigInt::from(1)),
                ));
                let bbar_final = bbar_ref.scalar_mul(&Coeff::Z(content_g)).scalar_mul(&Coeff::Z(
                    bigint::exact_divide(&c_b, &c_g).unwrap_or_else(|| BigInt::from(1)),
                ));
                let g_final = g_primitive.scalar_mul(&Coeff::Z(c_g.clone()));
                return Some(GcdResult { gcd: g_final, cofactor_a: abar_final, cofactor_b: bbar_final });
            }
        }
    }
}

fn terminates(g: &MPoly, cofactor: &MPoly, modulus: &BigInt) -> bool {
    let norm_inf_g = height_inf(g);
    let norm_one_g = height_one(g);
    let norm_inf_c = height_inf(cofactor);
    let norm_one_c = height_one(cofactor);
    let lhs = BigInt::from(2) * (norm_inf_c * norm_one_g).max(norm_one_c * norm_inf_g);
    lhs < *modulus
}

fn boundary_result(ctx: &Arc<Context>, nonzero: &MPoly) -> GcdResult {
    let sign = if as_z(nonzero.leading_coeff().unwrap()) < BigInt::from(0) { -1 } else { 1 };
    let g = if sign < 0 { nonzero.neg() } else { nonzero.clone() };
    let one = MPoly::constant(ctx, Coeff::Z(BigInt::from(sign)));
    GcdResult { gcd: g, cofactor_a: one.clone(), cofactor_b: one }
}

fn as_z(c: &Coeff) -> BigInt {
    match c {
        Coeff::Z(v) => v.clone(),
        Coeff::P(_) => panic!("expected Z coefficient"),
    }
}

fn as_p(c: &Coeff) -> Nmod {
    match c {
        Coeff::P(v) => *v,
        Coeff::Z(_) => panic!("expected F_p coefficient"),
    }
}

fn u64_mod(v: &BigInt, p: u64) -> u64 {
    let r = v.mod_floor(&BigInt::from(p));
    let (_, digits) = r.to_u64_digits();
    digits.first().copied().unwrap_or(0)
}

fn height_inf(p: &MPoly) -> BigInt {
    p.coeffs().iter().map(|c| as_z(c).abs()).max().unwrap_or_else(|| BigInt::from(0))
}

fn height_one(p: &MPoly) -> BigInt {
    p.coeffs().iter().map(|c| as_z(c).abs()).sum()
}

/// The recursive multivariate GCD over 𝔽ₚ that both Brown and Zippel's
/// dense probe bottom out into. Eliminates the last variable one at a time
/// via evaluation, recurses, and lifts the result back up by Lagrange
/// interpolation over the sample points, verifying each candidate by exact
/// division before accepting it (the safety net that makes an imperfect
/// interpolation harmless: a wrong guess is simply discarded as unlucky).
pub fn gcd_mod_p(a: &MPoly, b: &MPoly, p: u64) -> Option<(MPoly, MPoly, MPoly)> {
    if a.is_zero() {
        return Some(monic_boundary(b, p));
    }
    if b.is_zero() {
        return Some(monic_boundary(a, p));
    }
    if a.ctx.nvars == 1 {
        return gcd_univariate(a, b, p);
    }

    let ctx = a.ctx.clone();
    let last = ctx.nvars - 1;
    let degbound = a.degree_in(last).min(b.degree_in(last));
    let npoints = (degbound as usize) + 2;

    let mut samples: Vec<(Nmod, MPoly)> = Vec::new();
    let mut seed: u64 = 7;
    let attempt_cap = (MAX_EVAL_ATTEMPTS as usize) * npoints.max(1) + 16;
    let mut attempts = 0usize;

    while samples.len() < npoints && attempts < attempt_cap {
        attempts += 1;
        seed = seed.wrapping_mul(2654435761).wrapping_add(1);
        let candidate = 1 + seed % (p - 1);
        let alpha = Nmod::new(candidate, p);
        if samples.iter().any(|(s, _)| *s == alpha) {
            continue;
        }

        let a_e = eval_one_p(a, last, alpha);
        let b_e = eval_one_p(b, last, alpha);
        if a_e.is_zero() || b_e.is_zero() {
            continue;
        }
        let (g_e, _, _) = match gcd_mod_p(&a_e, &b_e, p) {
            Some(r) => r,
            None => continue,
        };
        samples.push((alpha, g_e));
    }

    if samples.len() < npoints {
        return None;
    }

    let points: Vec<Nmod> = samples.iter().map(|(s, _)| *s).collect();
    let g_images: Vec<MPoly> = samples.iter().map(|(_, g)| g.clone()).collect();
    let g_full = lagrange_embed(&points, &g_images, last, &ctx);

    // Verify by exact division, the safety net for the interpolation step:
    // a wrong guess at G is simply discarded as an unlucky evaluation set.
    if g_full.is_zero() {
        return None;
    }
    let abar_full = heap::divides(a, &g_full)?;
    let bbar_full = heap::divides(b, &g_full)?;
    Some((g_full, abar_full, bbar_full))
}

fn monic_boundary(nonzero: &MPoly, p: u64) -> (MPoly, MPoly, MPoly) {
    let lc = as_p(nonzero.leading_coeff().unwrap());
    let inv = lc.inverse().unwrap();
    let g = nonzero.scalar_mul(&Coeff::P(inv));
    let one = MPoly::constant(&nonzero.ctx, Coeff::P(Nmod::one(p)));
    let lc_poly = MPoly::constant(&nonzero.ctx, Coeff::P(lc));
    (g, lc_poly, one)
}

fn gcd_univariate(a: &MPoly, b: &MPoly, p: u64) -> Option<(MPoly, MPoly, MPoly)> {
    let da = to_dense(a, p);
    let db = to_dense(b, p);
    let g = da.gcd(&db);
    if g.is_zero() {
        return None;
    }
    let (abar, ra) = da.div_rem(&g);
    let (bbar, rb) = db.div_rem(&g);
    if !ra.is_zero() || !rb.is_zero() {
        return None;
    }
    Some((from_dense(&g, &a.ctx), from_dense(&abar, &a.ctx), from_dense(&bbar, &a.ctx)))
}

fn to_dense(a: &MPoly, p: u64) -> DensePoly {
    let deg = a.degree_in(0) as usize;
    let mut coeffs = vec![Nmod::zero(p); deg + 1];
    for (c, e) in a.coeffs().iter().zip(a.exps().iter()) {
        let user = a.ctx.unpack(e);
        coeffs[user[0] as usize] = as_p(c);
    }
    DensePoly::from_coeffs(coeffs, p)
}

fn from_dense(d: &DensePoly, ctx: &Arc<Context>) -> MPoly {
    let mut out = MPoly::zero(ctx);
    for (i, &c) in d.coefficients().iter().enumerate() {
        if !c.is_zero() {
            out.push_term(Coeff::P(c), ctx.pack(&[i as u64]));
        }
    }
    out.sort_and_combine();
    out
}

/// Embeds a set of (point, image-in-remaining-vars) samples into a single
/// polynomial in the full variable set, via Lagrange interpolation along
/// the eliminated variable.
fn lagrange_embed(points: &[Nmod], images: &[MPoly], var: usize, outer_ctx: &Arc<Context>) -> MPoly {
    let p = points[0].modulus();
    let n = points.len();
    let mut out = MPoly::zero(outer_ctx);

    for j in 0..n {
        // basis_j(x) = Π_{k != j} (x - points[k]) / (points[j] - points[k])
        let mut basis = DensePoly::constant(Nmod::one(p), p);
        let mut denom = Nmod::one(p);
        for k in 0..n {
            if k == j {
                continue;
            }
            let linear = DensePoly::from_coeffs(vec![-points[k], Nmod::one(p)], p);
            basis = basis.mul(&linear);
            denom = denom * (points[j] - points[k]);
        }
        let scale = denom.inverse().expect("sample points must be distinct");
        let basis = basis.scale(scale);

        for (deg, &coeff) in basis.coefficients().iter().enumerate() {
            if coeff.is_zero() {
                continue;
            }
            let scaled_image = images[j].scalar_mul(&Coeff::P(coeff));
            for (c, e) in scaled_image.coeffs().iter().zip(scaled_image.exps().iter()) {
                let mut user = scaled_image.ctx.unpack(e);
                user.insert(var, deg as u64);
                out.push_term(c.clone(), outer_ctx.pack(&user));
            }
        }
    }
    out.sort_and_combine();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::MonomialOrder;

    fn z(v: i64) -> Coeff {
        Coeff::Z(BigInt::from(v))
    }

    fn term(ctx: &Arc<Context>, coeff: i64, exps: &[u64]) -> MPoly {
        MPoly::from_term(ctx, z(coeff), ctx.pack(exps))
    }

    #[test]
    fn test_gcd_brown_boundary_zero() {
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let a = MPoly::zero(&ctx);
        let b = term(&ctx, 6, &[2]);
        let result = gcd_brown(&a, &b).unwrap();
        assert_eq!(result.gcd.coeffs(), b.coeffs());
    }

    #[test]
    fn test_gcd_brown_univariate_shared_factor() {
        // A = (x+1)(x+2) = x^2+3x+2, B = (x+1)(x+3) = x^2+4x+3; gcd = x+1.
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let mut a = MPoly::zero(&ctx);
        a.push_term(z(1), ctx.pack(&[2]));
        a.push_term(z(3), ctx.pack(&[1]));
        a.push_term(z(2), ctx.pack(&[0]));
        a.sort_and_combine();

        let mut b = MPoly::zero(&ctx);
        b.push_term(z(1), ctx.pack(&[2]));
        b.push_term(z(4), ctx.pack(&[1]));
        b.push_term(z(3), ctx.pack(&[0]));
        b.sort_and_combine();

        let result = gcd_brown(&a, &b).unwrap();
        assert_eq!(result.gcd.len(), 2);
        assert_eq!(ctx.unpack(result.gcd.leading_monomial().unwrap()), vec![1]);

        // Cofactors and the GCD must reconstruct the inputs exactly.
        let recon_a = heap::mul(&result.gcd, &result.cofactor_a);
        let recon_b = heap::mul(&result.gcd, &result.cofactor_b);
        assert_eq!(recon_a.coeffs(), a.coeffs());
        assert_eq!(recon_b.coeffs(), b.coeffs());
    }

    #[test]
    fn test_gcd_brown_bivariate_shared_factor_s1() {
        // Spec S1 with gcd_brown directly (2-variable slice): shared factor
        // T = x^2 + y^2 times two coprime-ish cofactors.
        let ctx = Context::new(2, MonomialOrder::Grevlex, 16);
        let mut t = MPoly::zero(&ctx);
        t.push_term(z(1), ctx.pack(&[2, 0]));
        t.push_term(z(1), ctx.pack(&[0, 2]));
        t.sort_and_combine();

        let mut f1 = MPoly::zero(&ctx);
        f1.push_term(z(1), ctx.pack(&[1, 0]));
        f1.push_term(z(1), ctx.pack(&[0, 0]));
        f1.sort_and_combine();

        let mut f2 = MPoly::zero(&ctx);
        f2.push_term(z(1), ctx.pack(&[0, 1]));
        f2.push_term(z(2), ctx.pack(&[0, 0]));
        f2.sort_and_combine();

        let a = heap::mul(&t, &f1);
        let b = heap::mul(&t, &f2);
        let result = gcd_brown(&a, &b).unwrap();

        assert!(heap::divides(&a, &result.gcd).is_some());
        assert!(heap::divides(&b, &result.gcd).is_some());
        assert!(heap::divides(&result.gcd, &t).is_some());
        assert!(heap::divides(&t, &result.gcd).is_some());
    }

    #[test]
    fn test_gcd_brown_content_is_extracted() {
        // A = 6xy, B = 9xy: content gcd is 3, polynomial part gcd is xy.
        let ctx = Context::new(2, MonomialOrder::Lex, 16);
        let a = term(&ctx, 6, &[1, 1]);
        let b = term(&ctx, 9, &[1, 1]);
        let result = gcd_brown(&a, &b).unwrap();
        assert_eq!(result.gcd.len(), 1);
        assert_eq!(as_z(result.gcd.leading_coeff().unwrap()), BigInt::from(3));
        assert_eq!(ctx.unpack(result.gcd.leading_monomial().unwrap()), vec![1, 1]);
    }
}
