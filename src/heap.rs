//! Heap-scheduled kernel: multiplication, multiply-subtract, and division
//! with remainder, per spec sections 3-4.2-4.5.
//!
//! The chain pool and history indices of the source are reimplemented per
//! the design notes of spec section 9: no raw pointers (an arena of
//! `(row, col)` pairs keyed by encoded monomial takes the place of the
//! linked chain), and `hind[i]`'s packed `(next_j, parity)` integer is split
//! into two explicit per-row fields, `next_j` and `seeded`.

use crate::monomial::{Context, Exponent, MonomialOrder};
use crate::sparse::{Coeff, MPoly};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

/// Wraps an `Exponent` with the context needed to order it, so it can live
/// in a `std::collections::BinaryHeap` (whose `Ord` bound can't otherwise
/// depend on external state).
struct HeapKey {
    ctx: Arc<Context>,
    exp: Exponent,
}

impl PartialEq for HeapKey {
    fn eq(&self, other: &Self) -> bool {
        self.exp == other.exp
    }
}
impl Eq for HeapKey {}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; the context's comparator already orders
        // "larger monomial" as greater, which is exactly the pop order the
        // spec wants (output already sorted strictly decreasing).
        self.ctx.cmp(&self.exp, &other.exp)
    }
}

/// A pending cross-product contribution: row index into the left factor
/// (or a negative tag for a special stream), column index into the right
/// factor / quotient.
#[derive(Clone, Copy, Debug)]
struct Entry {
    row: i64,
    col: u32,
}

/// Per-row scheduling state, replacing the packed `hind[i] = 2j + parity`.
#[derive(Clone, Copy, Debug, Default)]
struct RowState {
    next_col: u32,
    seeded: bool,
}

/// Multiplies two sparse polynomials via the heap kernel, retrying at a
/// wider bit width on exponent overflow (spec 4.2).
pub fn mul(a: &MPoly, b: &MPoly) -> MPoly {
    let mut bits = a.ctx.bits_per_field;
    loop {
        let ctx = if bits == a.ctx.bits_per_field {
            a.ctx.clone()
        } else {
            Context::new(a.ctx.nvars, a.ctx.order, bits)
        };
        let aw = repack_into(a, &ctx);
        let bw = repack_into(b, &ctx);
        match try_mul(&ctx, &aw, &bw) {
            Some(p) => return p,
            None => bits *= 2,
        }
    }
}

fn repack_into(p: &MPoly, ctx: &Arc<Context>) -> MPoly {
    if Arc::ptr_eq(&p.ctx, ctx) || p.ctx.bits_per_field == ctx.bits_per_field {
        return p.clone();
    }
    let mut out = MPoly::zero(ctx);
    for (c, e) in p.coeffs().iter().zip(p.exps().iter()) {
        let user = p.ctx.unpack(e);
        out.push_term(c.clone(), ctx.pack(&user));
    }
    out.sort_and_combine();
    out
}

/// Core multiplication attempt at a fixed bit width. Returns `None` on
/// exponent overflow (caller retries wider).
fn try_mul(ctx: &Arc<Context>, a: &MPoly, b: &MPoly) -> Option<MPoly> {
    if a.is_zero() || b.is_zero() {
        return Some(MPoly::zero(ctx));
    }

    let mut chains: HashMap<Exponent, Vec<Entry>> = HashMap::new();
    let mut heap: BinaryHeap<HeapKey> = BinaryHeap::new();
    let mut rows: Vec<RowState> = vec![RowState::default(); a.len()];

    let push = |chains: &mut HashMap<Exponent, Vec<Entry>>,
                heap: &mut BinaryHeap<HeapKey>,
                exp: Exponent,
                entry: Entry| {
        if let Some(v) = chains.get_mut(&exp) {
            v.push(entry);
        } else {
            chains.insert(exp.clone(), vec![entry]);
            heap.push(HeapKey { ctx: ctx.clone(), exp });
        }
    };

    let seed_exp = ctx.add(&a.exps()[0], &b.exps()[0]);
    push(&mut chains, &mut heap, seed_exp, Entry { row: 0, col: 0 });
    rows[0].next_col = 1;
    rows[0].seeded = true;

    let mut out = MPoly::zero(ctx);

    while let Some(top) = heap.pop() {
        if ctx.overflows(&top.exp) {
            return None;
        }
        let entries = chains.remove(&top.exp).unwrap();

        let mut acc = zero_like(a.coeffs()[0].clone());
        for e in &entries {
            let c = a.coeffs()[e.row as usize].clone();
            let d = b.coeffs()[e.col as usize].clone();
            acc = acc.add(&c.mul(&d));
        }
        if !acc.is_zero() {
            out.push_term(acc, top.exp.clone());
        }

        for e in &entries {
            let i = e.row as usize;
            let j = e.col as usize;

            // "right": advance this row to the next column.
            if j + 1 < b.len() {
                let exp = ctx.add(&a.exps()[i], &b.exps()[j + 1]);
                push(&mut chains, &mut heap, exp, Entry { row: i as i64, col: (j + 1) as u32 });
            }

            // "down": seed the next row once its first column becomes due.
            if j == 0 && i + 1 < a.len() && !rows[i + 1].seeded {
                rows[i + 1].seeded = true;
                rows[i + 1].next_col = 1;
                let exp = ctx.add(&a.exps()[i + 1], &b.exps()[0]);
                push(&mut chains, &mut heap, exp, Entry { row: (i + 1) as i64, col: 0 });
            }
        }
    }

    Some(out)
}

fn zero_like(c: Coeff) -> Coeff {
    match c {
        Coeff::Z(_) => Coeff::Z(num_bigint::BigInt::from(0)),
        Coeff::P(n) => Coeff::P(crate::nmod::Nmod::zero(n.modulus())),
    }
}

/// `D - B*C`, streamed: the cross-product heap of `B*C` merged against a
/// verbatim stream of `D`'s own terms (spec 4.3). Caller guarantees
/// `D.exp[0] <= B.exp[0] + C.exp[0]`.
pub fn mulsub(d: &MPoly, b: &MPoly, c: &MPoly) -> MPoly {
    let mut bits = d.ctx.bits_per_field.max(b.ctx.bits_per_field).max(c.ctx.bits_per_field);
    loop {
        let ctx = Context::new(d.ctx.nvars, d.ctx.order, bits);
        let dw = repack_into(d, &ctx);
        let bw = repack_into(b, &ctx);
        let cw = repack_into(c, &ctx);
        match try_mulsub(&ctx, &dw, &bw, &cw) {
            Some(p) => return p,
            None => bits *= 2,
        }
    }
}

fn try_mulsub(ctx: &Arc<Context>, d: &MPoly, b: &MPoly, c: &MPoly) -> Option<MPoly> {
    if b.is_zero() || c.is_zero() {
        return Some(d.clone());
    }

    let mut chains: HashMap<Exponent, Vec<Entry>> = HashMap::new();
    let mut heap: BinaryHeap<HeapKey> = BinaryHeap::new();
    let mut rows: Vec<RowState> = vec![RowState::default(); b.len()];

    let push = |chains: &mut HashMap<Exponent, Vec<Entry>>,
                heap: &mut BinaryHeap<HeapKey>,
                exp: Exponent,
                entry: Entry| {
        if let Some(v) = chains.get_mut(&exp) {
            v.push(entry);
        } else {
            chains.insert(exp.clone(), vec![entry]);
            heap.push(HeapKey { ctx: ctx.clone(), exp });
        }
    };

    let seed_exp = ctx.add(&b.exps()[0], &c.exps()[0]);
    push(&mut chains, &mut heap, seed_exp, Entry { row: 0, col: 0 });
    rows[0].next_col = 1;
    rows[0].seeded = true;

    let mut d_idx = 0usize;
    let mut out = MPoly::zero(ctx);

    loop {
        let top_exp = match heap.peek() {
            Some(k) => Some(k.exp.clone()),
            None => None,
        };
        // Determine which source contributes the next (largest) monomial:
        // the cross-product heap top, or the next verbatim D term.
        let d_exp = if d_idx < d.len() { Some(d.exps()[d_idx].clone()) } else { None };

        let take_d_only = match (&top_exp, &d_exp) {
            (None, Some(_)) => true,
            (Some(h), Some(de)) => ctx.cmp(de, h) == Ordering::Greater,
            (_, None) => false,
        };

        if take_d_only {
            out.push_term(d.coeffs()[d_idx].clone(), d.exps()[d_idx].clone());
            d_idx += 1;
            continue;
        }

        let exp = match top_exp {
            Some(e) => e,
            None => break,
        };
        if ctx.overflows(&exp) {
            return None;
        }
        let entries = chains.remove(&exp).unwrap();

        let mut acc = if d_idx < d.len() && d.exps()[d_idx] == exp {
            let v = d.coeffs()[d_idx].clone();
            d_idx += 1;
            v
        } else {
            zero_like(b.coeffs()[0].clone())
        };
        heap.pop();

        for e in &entries {
            let bc = b.coeffs()[e.row as usize].clone();
            let cc = c.coeffs()[e.col as usize].clone();
            acc = acc.sub(&bc.mul(&cc));
        }
        if !acc.is_zero() {
            out.push_term(acc, exp.clone());
        }

        for e in &entries {
            let i = e.row as usize;
            let j = e.col as usize;
            if j + 1 < c.len() {
                let nexp = ctx.add(&b.exps()[i], &c.exps()[j + 1]);
                push(&mut chains, &mut heap, nexp, Entry { row: i as i64, col: (j + 1) as u32 });
            }
            if j == 0 && i + 1 < b.len() && !rows[i + 1].seeded {
                rows[i + 1].seeded = true;
                rows[i + 1].next_col = 1;
                let nexp = ctx.add(&b.exps()[i + 1], &c.exps()[0]);
                push(&mut chains, &mut heap, nexp, Entry { row: (i + 1) as i64, col: 0 });
            }
        }
    }

    while d_idx < d.len() {
        out.push_term(d.coeffs()[d_idx].clone(), d.exps()[d_idx].clone());
        d_idx += 1;
    }

    Some(out)
}

/// Division with remainder (spec 4.4): `A = B*Q + R`, no term of `R`
/// divisible by `lt(B)`. `B` must be non-zero and `lc(B)` invertible.
pub fn divrem(a: &MPoly, b: &MPoly) -> (MPoly, MPoly) {
    assert!(!b.is_zero(), "divrem by zero polynomial");
    divrem_bounded(a, b, None).expect("exact-mode not requested")
}

/// `divides` (spec 4.5): exact division test. Aborts (returns `None`) the
/// moment a popped monomial is not divisible by `lt(B)`, or if a non-empty
/// remainder would result.
pub fn divides(a: &MPoly, b: &MPoly) -> Option<MPoly> {
    assert!(!b.is_zero(), "divides by zero polynomial");
    if a.is_zero() {
        return Some(MPoly::zero(&a.ctx));
    }
    let (q, r) = divrem_bounded(a, b, Some(None))?;
    if r.is_zero() {
        Some(q)
    } else {
        None
    }
}

/// Chunk-aware exact division used by the parallel division protocol
/// (spec 4.5/5): only emits quotient terms whose monomial is `>= emin`
/// under the context order; terms that would fall below `emin` are left
/// for the chunk that owns that range.
pub fn divides_with_emin(a: &MPoly, b: &MPoly, emin: &Exponent) -> Option<MPoly> {
    let (q, r) = divrem_bounded(a, b, Some(Some(emin.clone())))?;
    if r.is_zero() {
        Some(q)
    } else {
        None
    }
}

/// `exact` is `None` for ordinary divrem (remainder allowed), or
/// `Some(emin)` for exact-division mode (abort on non-dividing monomial;
/// `emin` optionally bounds how far down quotient terms are emitted).
fn divrem_bounded(
    a: &MPoly,
    b: &MPoly,
    exact: Option<Option<Exponent>>,
) -> Option<(MPoly, MPoly)> {
    if a.is_zero() {
        return Some((MPoly::zero(&a.ctx), MPoly::zero(&a.ctx)));
    }
    let lc_b = b.leading_coeff().unwrap().clone();
    // Ordinary divrem over Z is restricted to |lc(B)| == 1 per spec section
    // 4.4 (the heap scheduler multiplies by an inverse, which Z only has
    // for units); exact-division mode instead divides each candidate
    // quotient coefficient exactly, so it works for any nonzero lc(B) and
    // is what the GCD drivers need to verify `G | A` for a non-unit-leading
    // integer GCD.
    let divider = QuotientDivider::new(&lc_b, exact.is_some());

    let mut bits = a.ctx.bits_per_field.max(b.ctx.bits_per_field);
    loop {
        let ctx = Context::new(a.ctx.nvars, a.ctx.order, bits);
        let aw = repack_into(a, &ctx);
        let bw = repack_into(b, &ctx);
        let emin = match &exact {
            Some(Some(e)) => Some(repack_exp(e, &a.ctx, &ctx)),
            _ => None,
        };
        match try_divrem(&ctx, &aw, &bw, &divider, exact.is_some(), emin.as_ref()) {
            Some(r) => return Some(r),
            // try_divrem reports a genuine non-divisibility as Some((0, term))
            // in exact mode, so None here is always an exponent overflow.
            None => bits *= 2,
        }
    }
}

fn repack_exp(e: &Exponent, from: &Arc<Context>, to: &Arc<Context>) -> Exponent {
    if from.bits_per_field == to.bits_per_field {
        e.clone()
    } else {
        to.pack(&from.unpack(e))
    }
}

fn invert_leading(c: &Coeff) -> Coeff {
    match c {
        Coeff::Z(v) => {
            if v == &num_bigint::BigInt::from(1) {
                Coeff::Z(num_bigint::BigInt::from(1))
            } else if v == &num_bigint::BigInt::from(-1) {
                Coeff::Z(num_bigint::BigInt::from(-1))
            } else {
                panic!("divrem over Z requires |lc(B)| == 1; use a content-aware routine otherwise")
            }
        }
        Coeff::P(v) => Coeff::P(v.inverse().expect("leading coefficient must be invertible")),
    }
}

/// How a candidate quotient coefficient is produced from the accumulator:
/// multiply by a precomputed inverse (always available over 𝔽ₚ, and over Z
/// only when `lc(B)` is a unit), or, in exact-division mode over Z, an exact
/// bigint division that fails closed (returns `None`) on any non-unit
/// remainder rather than panicking.
enum QuotientDivider {
    Inverse(Coeff),
    ExactZ(num_bigint::BigInt),
}

impl QuotientDivider {
    fn new(lc_b: &Coeff, exact_mode: bool) -> QuotientDivider {
        match lc_b {
            Coeff::Z(_) if exact_mode => QuotientDivider::ExactZ(as_bigint(lc_b)),
            _ => QuotientDivider::Inverse(invert_leading(lc_b)),
        }
    }

    /// `None` means "does not divide evenly" (only possible for `ExactZ`).
    fn apply(&self, acc: &Coeff) -> Option<Coeff> {
        match self {
            QuotientDivider::Inverse(inv) => Some(acc.mul(inv)),
            QuotientDivider::ExactZ(lc) => match acc {
                Coeff::Z(v) => crate::bigint::exact_divide(v, lc).map(Coeff::Z),
                Coeff::P(_) => unreachable!("ExactZ divider only built for Z coefficients"),
            },
        }
    }
}

fn as_bigint(c: &Coeff) -> num_bigint::BigInt {
    match c {
        Coeff::Z(v) => v.clone(),
        Coeff::P(_) => unreachable!("as_bigint only called on Z coefficients"),
    }
}

fn try_divrem(
    ctx: &Arc<Context>,
    a: &MPoly,
    b: &MPoly,
    divider: &QuotientDivider,
    exact_mode: bool,
    emin: Option<&Exponent>,
) -> Option<(MPoly, MPoly)> {
    let lt_b = b.leading_monomial().unwrap().clone();

    let mut chains: HashMap<Exponent, Vec<Entry>> = HashMap::new();
    let mut heap: BinaryHeap<HeapKey> = BinaryHeap::new();
    // row >= 0 indexes B (cross term B[row]*Q[col]); row == -1 is the A stream.
    let mut a_idx;

    let push = |chains: &mut HashMap<Exponent, Vec<Entry>>,
                heap: &mut BinaryHeap<HeapKey>,
                exp: Exponent,
                entry: Entry| {
        if let Some(v) = chains.get_mut(&exp) {
            v.push(entry);
        } else {
            chains.insert(exp.clone(), vec![entry]);
            heap.push(HeapKey { ctx: ctx.clone(), exp });
        }
    };

    push(&mut chains, &mut heap, a.exps()[0].clone(), Entry { row: -1, col: 0 });
    a_idx = 1;

    let mut q = MPoly::zero(ctx);
    let mut r = MPoly::zero(ctx);

    while let Some(top) = heap.pop() {
        let exp = top.exp;
        if ctx.overflows(&exp) {
            return None;
        }
        let entries = chains.remove(&exp).unwrap();

        let mut acc = zero_like(b.coeffs()[0].clone());
        for e in &entries {
            if e.row == -1 {
                acc = acc.add(&a.coeffs()[e.col as usize]);
            } else {
                let i = e.row as usize;
                let j = e.col as usize;
                acc = acc.sub(&b.coeffs()[i].mul(&q.coeffs()[j]));
            }
        }

        for e in &entries {
            if e.row == -1 && a_idx < a.len() && e.col as usize == a_idx - 1 {
                push(&mut chains, &mut heap, a.exps()[a_idx].clone(), Entry { row: -1, col: a_idx as u32 });
                a_idx += 1;
            }
        }

        if acc.is_zero() {
            continue;
        }

        let below_emin = emin.map(|m| ctx.cmp(&exp, m) == Ordering::Less).unwrap_or(false);

        let monomial_divides = ctx.divides(&exp, &lt_b);
        let qcoeff = match &monomial_divides {
            Some(_) if !below_emin => divider.apply(&acc),
            _ => None,
        };

        match (monomial_divides, qcoeff) {
            (Some(qexp), Some(qcoeff)) if !below_emin => {
                let qlen = q.len();
                q.push_term(qcoeff, qexp);

                for i in 1..b.len() {
                    let nexp = ctx.add(&b.exps()[i], &q.exps()[qlen]);
                    push(&mut chains, &mut heap, nexp, Entry { row: i as i64, col: qlen as u32 });
                }
            }
            _ => {
                // In exact mode a genuine non-divisibility (whether the
                // monomial didn't divide, or it did but the coefficient
                // division over Z wasn't exact) aborts immediately; a term
                // merely deferred past `emin` is not this chunk's problem
                // and is recorded like any other remainder term.
                if exact_mode && !below_emin {
                    return Some((MPoly::zero(ctx), MPoly::from_term(ctx, acc, exp)));
                }
                r.push_term(acc, exp);
            }
        }
    }

    Some((q, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::MonomialOrder;
    use num_bigint::BigInt;

    fn ctx() -> Arc<Context> {
        Context::new(2, MonomialOrder::Lex, 16)
    }

    fn z(v: i64) -> Coeff {
        Coeff::Z(BigInt::from(v))
    }

    fn mono(ctx: &Arc<Context>, exps: &[u64], coeff: i64) -> MPoly {
        MPoly::from_term(ctx, z(coeff), ctx.pack(exps))
    }

    #[test]
    fn test_mul_single_terms() {
        let ctx = ctx();
        let a = mono(&ctx, &[2, 0], 3);
        let b = mono(&ctx, &[0, 1], 5);
        let p = mul(&a, &b);
        assert_eq!(p.len(), 1);
        assert_eq!(p.leading_coeff(), Some(&z(15)));
        assert_eq!(ctx.unpack(p.leading_monomial().unwrap()), vec![2, 1]);
    }

    #[test]
    fn test_mul_binomials() {
        let ctx = ctx();
        // (x + 1)(x + 2) = x^2 + 3x + 2
        let mut a = MPoly::zero(&ctx);
        a.push_term(z(1), ctx.pack(&[1, 0]));
        a.push_term(z(1), ctx.pack(&[0, 0]));
        a.sort_and_combine();

        let mut b = MPoly::zero(&ctx);
        b.push_term(z(1), ctx.pack(&[1, 0]));
        b.push_term(z(2), ctx.pack(&[0, 0]));
        b.sort_and_combine();

        let p = mul(&a, &b);
        assert_eq!(p.len(), 3);
        let coeffs: Vec<_> = p.coeffs().iter().cloned().collect();
        assert_eq!(coeffs, vec![z(1), z(3), z(2)]);
    }

    #[test]
    fn test_divrem_exact() {
        let ctx = ctx();
        // divides(x*y, x) should be y with zero remainder over F_p.
        let pctx = Context::new(2, MonomialOrder::Lex, 16);
        let xy = MPoly::from_term(&pctx, Coeff::P(crate::nmod::Nmod::new(1, 1009)), pctx.pack(&[1, 1]));
        let x = MPoly::from_term(&pctx, Coeff::P(crate::nmod::Nmod::new(1, 1009)), pctx.pack(&[1, 0]));
        let q = divides(&xy, &x).unwrap();
        assert_eq!(ctx.unpack(q.leading_monomial().unwrap()), vec![0, 1]);
    }

    #[test]
    fn test_divides_fails_when_not_exact() {
        let pctx = Context::new(1, MonomialOrder::Lex, 16);
        let a = MPoly::from_term(&pctx, Coeff::P(crate::nmod::Nmod::new(1, 1009)), pctx.pack(&[3]));
        let mut b = MPoly::zero(&pctx);
        b.push_term(Coeff::P(crate::nmod::Nmod::new(1, 1009)), pctx.pack(&[1]));
        b.push_term(Coeff::P(crate::nmod::Nmod::new(1, 1009)), pctx.pack(&[0]));
        b.sort_and_combine();
        assert!(divides(&a, &b).is_none());
    }

    #[test]
    fn test_mulsub() {
        let ctx = ctx();
        let b = mono(&ctx, &[1, 0], 1);
        let c = mono(&ctx, &[0, 1], 1);
        let bc = mul(&b, &c);
        let d = bc.clone();
        let result = mulsub(&d, &b, &c);
        assert!(result.is_zero());
    }

    #[test]
    fn test_divides_exact_z_non_unit_leading_coeff() {
        // (2x + 2) * (3x + 1) = 6x^2 + 8x + 2; dividing by (2x + 2), whose
        // leading coefficient is 2 (not a unit in Z), must still succeed in
        // exact-division mode instead of panicking.
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let mut divisor = MPoly::zero(&ctx);
        divisor.push_term(z(2), ctx.pack(&[1]));
        divisor.push_term(z(2), ctx.pack(&[0]));
        divisor.sort_and_combine();

        let mut cofactor = MPoly::zero(&ctx);
        cofactor.push_term(z(3), ctx.pack(&[1]));
        cofactor.push_term(z(1), ctx.pack(&[0]));
        cofactor.sort_and_combine();

        let product = mul(&divisor, &cofactor);

        let q = divides(&product, &divisor).expect("exact division by non-unit lc(B) should succeed");
        assert_eq!(q.coeffs().to_vec(), cofactor.coeffs().to_vec());
        assert_eq!(q.exps().to_vec(), cofactor.exps().to_vec());
    }

    #[test]
    fn test_divides_exact_z_non_unit_leading_coeff_fails_cleanly() {
        // (2x + 2) does not divide (6x^2 + 8x + 3): the constant term is off
        // by one, so the final remainder coefficient isn't exactly divisible.
        // This must return None, not panic.
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let mut divisor = MPoly::zero(&ctx);
        divisor.push_term(z(2), ctx.pack(&[1]));
        divisor.push_term(z(2), ctx.pack(&[0]));
        divisor.sort_and_combine();

        let mut a = MPoly::zero(&ctx);
        a.push_term(z(6), ctx.pack(&[2]));
        a.push_term(z(8), ctx.pack(&[1]));
        a.push_term(z(3), ctx.pack(&[0]));
        a.sort_and_combine();

        assert!(divides(&a, &divisor).is_none());
    }
}
