//! Sparse modular GCD (Zippel), spec section 4.10. Ground truth:
//! `examples/original_source/nmod_mpoly/mpolyu_gcdp_zippel.c` and
//! `fmpz_mpoly/gcd_zippel.c`: a dense probe at one prime fixes the
//! monomial "form" of the answer, then later primes recover each
//! x0-power's coefficient by sparse interpolation over the fixed form via
//! the transposed Vandermonde solver, instead of Brown's per-variable
//! dense recursion.

use crate::bigint;
use crate::dense::DensePoly;
use crate::gcd::brown;
use crate::gcd::GcdResult;
use crate::heap;
use crate::lift;
use crate::monomial::Context;
use crate::nmod::Nmod;
use crate::sparse::{Coeff, MPoly};
use crate::vandermonde::solve_transposed_vandermonde;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::sync::Arc;

/// Outcome of one prime's sparse-interpolation attempt (spec section 9:
/// a tagged variant instead of an integer status code).
enum GcdsOutcome {
    /// The dense probe's monomial form did not reproduce this prime's data;
    /// the probe itself was unlucky and must be retaken.
    FormWrong,
    /// The Vandermonde system had no solution for some x0-power slot.
    NoSolution,
    /// Evaluation points collided (a node repeated): singular system.
    EvalPointBad,
    /// A sample's x0-degree exceeded what the probe predicted.
    DegreeTooHigh,
    /// Interpolation succeeded and passed confirmation.
    Confirmed(MPoly),
}

const UNDER_DETERMINED_RETRIES: u32 = 2;
const SINGULAR_POINT_RETRIES: u32 = 10;

/// `gcd_zippel(A, B)`: ℤ pipeline mirroring `gcd_brown`'s content/CRT/
/// termination shell, but using sparse interpolation at each prime once
/// the probe prime has fixed the answer's shape.
pub fn gcd_zippel(a: &MPoly, b: &MPoly) -> Option<GcdResult> {
    if a.ctx.nvars < 2 {
        // Sparse interpolation needs a "main" variable plus at least one
        // reduced variable to interpolate over; univariate/degenerate
        // inputs are Brown's base case.
        return brown::gcd_brown(a, b);
    }
    if a.is_zero() || b.is_zero() {
        return brown::gcd_brown(a, b);
    }

    let ctx = a.ctx.clone();
    let c_a = a.content();
    let c_b = b.content();
    let c_g = c_a.gcd(&c_b);
    let a_prime = a.divide_content(&c_a);
    let b_prime = b.divide_content(&c_b);

    let lc_a = as_z(a_prime.leading_coeff().unwrap());
    let lc_b = as_z(b_prime.leading_coeff().unwrap());
    let gamma = lc_a.gcd(&lc_b);
    let bound = BigInt::from(2) * &gamma * height_inf(&a_prime).max(height_inf(&b_prime));

    let mut prime: u64 = 1 << 20;
    let mut modulus = BigInt::from(1);
    let mut g: Option<MPoly> = None;

    'primes: loop {
        if modulus > &bound * BigInt::from(4) {
            return None;
        }
        prime = Nmod::next_prime(prime);
        let gamma_p = gamma.mod_floor(&BigInt::from(prime));
        if gamma_p.is_zero() {
            continue;
        }

        let a_p = lift::reduce_mod_p(&a_prime, prime);
        let b_p = lift::reduce_mod_p(&b_prime, prime);
        if a_p.is_zero() || b_p.is_zero() {
            continue;
        }

        // 1. Dense probe fixes the form: run Brown's recursive engine once
        // at this prime to learn which (x0-power, reduced-monomial) slots
        // can be nonzero.
        let probe = match brown::gcd_mod_p(&a_p, &b_p, prime) {
            Some((g_probe, ..)) => g_probe,
            None => continue,
        };
        if probe.is_zero() {
            continue;
        }
        let form = extract_form(&probe, &ctx);

        // 2. Sparse-interpolate this prime's image against the fixed form,
        // with retries for the documented failure classes.
        let mut under_determined_tries = 0;
        let g_p = loop {
            match gcds(&a_p, &b_p, &form, &probe, prime) {
                GcdsOutcome::Confirmed(g_found) => break g_found,
                GcdsOutcome::EvalPointBad => {
                    // retried inside gcds up to SINGULAR_POINT_RETRIES; a
                    // bubbled-up EvalPointBad means those were exhausted.
                    continue 'primes;
                }
                GcdsOutcome::FormWrong | GcdsOutcome::NoSolution | GcdsOutcome::DegreeTooHigh => {
                    under_determined_tries += 1;
                    if under_determined_tries >= UNDER_DETERMINED_RETRIES {
                        continue 'primes;
                    }
                }
            }
        };

        let lc_gp = as_p(g_p.leading_coeff().unwrap());
        if lc_gp.is_zero() {
            continue;
        }
        let gamma_p_val = Nmod::new(u64_mod(&gamma_p, prime), prime);
        let scale = gamma_p_val * lc_gp.inverse().unwrap();
        let g_p_scaled = g_p.scalar_mul(&Coeff::P(scale));

        let (new_g, _) = match &g {
            Some(g_old) => lift::crt_p(g_old, &modulus, &g_p_scaled, prime),
            None => (lift::lift_mod_p(&g_p_scaled), false),
        };
        g = Some(new_g);
        modulus = &modulus * BigInt::from(prime);

        if modulus > bound {
            let g_ref = g.as_ref().unwrap();
            if let Some(abar) = heap::divides(&a_prime, g_ref) {
                if let Some(bbar) = heap::divides(&b_prime, g_ref) {
                    let content_g = g_ref.content();
                    let g_primitive = if content_g.is_zero() || content_g == BigInt::from(1) {
                        g_ref.clone()
                    } else {
                        g_ref.divide_content(&content_g)
                    };
                    let g_final = g_primitive.scalar_mul(&Coeff::Z(c_g.clone()));
                    let abar_final = abar
                        .scalar_mul(&Coeff::Z(content_g.clone()))
                        .scalar_mul(&Coeff::Z(bigint::exact_divide(&c_a, &c_g).unwrap_or_else(|| BigInt::from(1))));
                    let bbar_final = bbar
                        .scalar_mul(&Coeff::Z(content_g))
                        .scalar_mul(&Coeff::Z(bigint::exact_divide(&c_b, &c_g).unwrap_or_else(|| BigInt::from(1))));
                    return Some(GcdResult { gcd: g_final, cofactor_a: abar_final, cofactor_b: bbar_final });
                }
            }
        }
    }
}

/// The fixed monomial "form": for every x0-power appearing in `probe`, the
/// set of reduced-variable monomials (vars 1..n-1) that appear alongside
/// it. Stored flattened with their x0-power so later evaluations know
/// which slots to solve for.
struct Form {
    /// (x0 power, reduced-variable monomial exponent vector) pairs.
    slots: Vec<(u64, Vec<u64>)>,
    max_x0_degree: u64,
}

fn extract_form(probe: &MPoly, ctx: &Arc<Context>) -> Form {
    let mut slots = Vec::new();
    let mut max_x0_degree = 0;
    for e in probe.exps() {
        let user = ctx.unpack(e);
        let x0 = user[0];
        max_x0_degree = max_x0_degree.max(x0);
        slots.push((x0, user[1..].to_vec()));
    }
    Form { slots, max_x0_degree }
}

/// One sparse-interpolation attempt at a fixed prime (the source's
/// `gcds` routine): samples the reduced variables at powers of a random
/// seed tuple, reduces to a univariate-in-x0 problem per sample, and
/// solves a transposed Vandermonde system per x0-power slot using the
/// fixed `form`.
fn gcds(a_p: &MPoly, b_p: &MPoly, form: &Form, probe: &MPoly, p: u64) -> GcdsOutcome {
    let ctx = a_p.ctx.clone();
    let nreduced = ctx.nvars - 1;

    // Group form slots by x0-power so each gets its own small Vandermonde
    // system over just the monomials observed at that power.
    let mut by_power: std::collections::BTreeMap<u64, Vec<Vec<u64>>> = std::collections::BTreeMap::new();
    for (k, mono) in &form.slots {
        by_power.entry(*k).or_default().push(mono.clone());
    }
    let max_terms = by_power.values().map(|v| v.len()).max().unwrap_or(1);

    for attempt in 0..SINGULAR_POINT_RETRIES {
        let seeds: Vec<Nmod> = (0..nreduced)
            .map(|i| Nmod::new(17 + 31 * (i as u64 + 1) + attempt as u64 * 97, p))
            .filter(|n| !n.is_zero())
            .collect();
        if seeds.len() != nreduced {
            continue;
        }

        // Samples: evaluate at x_i = seed_i^s for s = 0..max_terms-1,
        // yielding univariate-in-x0 GCD images.
        let mut sample_polys: Vec<DensePoly> = Vec::with_capacity(max_terms);
        let mut nodes_ok = true;
        for s in 0..max_terms as u64 {
            let alpha: Vec<Nmod> = seeds.iter().map(|&y| y.pow(s)).collect();
            let a_e = evaluate_reduced(a_p, &alpha);
            let b_e = evaluate_reduced(b_p, &alpha);
            if a_e.is_zero() || b_e.is_zero() {
                nodes_ok = false;
                break;
            }
            let g_e = a_e.gcd(&b_e);
            if g_e.is_zero() || g_e.degree() as u64 > form.max_x0_degree {
                return GcdsOutcome::DegreeTooHigh;
            }
            sample_polys.push(g_e.make_monic());
        }
        if !nodes_ok {
            continue;
        }

        // Normalize samples to a common leading coefficient using the
        // probe's known leading coefficient pattern at the top x0-power,
        // then solve one Vandermonde system per x0-power slot.
        let mut out = MPoly::zero(&ctx);
        let mut solved_all = true;
        for (&k, monos) in by_power.iter() {
            let nodes: Vec<Nmod> = monos
                .iter()
                .map(|m| node_value(m, &seeds))
                .collect();
            // A system of `t = nodes.len()` unknowns needs exactly the
            // first `t` samples (powers 0..t-1 of the seed tuple).
            let rhs: Vec<Nmod> = sample_polys[..nodes.len()].iter().map(|poly| poly.coeff(k as usize)).collect();
            match solve_transposed_vandermonde(&nodes, &rhs) {
                Some(coeffs) => {
                    for (coeff, mono) in coeffs.into_iter().zip(monos.iter()) {
                        if coeff.is_zero() {
                            continue;
                        }
                        let mut user = vec![k];
                        user.extend_from_slice(mono);
                        out.push_term(Coeff::P(coeff), ctx.pack(&user));
                    }
                }
                None => {
                    solved_all = false;
                    break;
                }
            }
        }
        if !solved_all {
            continue; // treat as a singular point and retry with a new seed
        }
        out.sort_and_combine();
        if out.is_zero() {
            return GcdsOutcome::NoSolution;
        }

        // Confirmation: verify against one more random sample point.
        let check_alpha: Vec<Nmod> = seeds.iter().map(|&y| y.pow(max_terms as u64)).collect();
        let a_e = evaluate_reduced(a_p, &check_alpha);
        let b_e = evaluate_reduced(b_p, &check_alpha);
        if a_e.is_zero() || b_e.is_zero() {
            continue;
        }
        let expected = a_e.gcd(&b_e).make_monic();
        let got = evaluate_reduced(&out, &check_alpha).make_monic();
        if got != expected {
            let _ = probe; // probe only informs the form; mismatch means it was wrong
            return GcdsOutcome::FormWrong;
        }

        return GcdsOutcome::Confirmed(out);
    }
    GcdsOutcome::EvalPointBad
}

fn node_value(mono: &[u64], seeds: &[Nmod]) -> Nmod {
    let p = seeds[0].modulus();
    let mut acc = Nmod::one(p);
    for (&e, &y) in mono.iter().zip(seeds.iter()) {
        acc = acc * y.pow(e);
    }
    acc
}

/// Evaluates every variable except x0 (index 0) at `alpha`, returning a
/// univariate-in-x0 dense polynomial.
fn evaluate_reduced(a: &MPoly, alpha: &[Nmod]) -> DensePoly {
    let p = alpha.first().map(|x| x.modulus()).unwrap_or(2);
    let ctx = &a.ctx;
    let mut coeffs: Vec<Nmod> = Vec::new();
    for (c, e) in a.coeffs().iter().zip(a.exps().iter()) {
        let user = ctx.unpack(e);
        let x0 = user[0] as usize;
        if coeffs.len() <= x0 {
            coeffs.resize(x0 + 1, Nmod::zero(p));
        }
        let mut term = match c {
            Coeff::P(v) => *v,
            Coeff::Z(_) => panic!("evaluate_reduced requires F_p coefficients"),
        };
        for (k, &e_k) in user[1..].iter().enumerate() {
            term = term * alpha[k].pow(e_k);
        }
        coeffs[x0] = coeffs[x0] + term;
    }
    DensePoly::from_coeffs(coeffs, p)
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
