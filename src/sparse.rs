//! Sparse distributed polynomial container: a parallel `(coeffs, exps)` pair
//! sorted strictly decreasing in the context's monomial order, with no zero
//! coefficients, per spec section 3.

use crate::bigint;
use crate::monomial::{Context, Exponent};
use crate::nmod::Nmod;
use num_bigint::BigInt;
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A coefficient in one of the two rings the core supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Coeff {
    Z(BigInt),
    P(Nmod),
}

impl Coeff {
    pub fn is_zero(&self) -> bool {
        match self {
            Coeff::Z(v) => v.is_zero(),
            Coeff::P(v) => v.is_zero(),
        }
    }

    pub fn add(&self, other: &Coeff) -> Coeff {
        match (self, other) {
            (Coeff::Z(a), Coeff::Z(b)) => Coeff::Z(a + b),
            (Coeff::P(a), Coeff::P(b)) => Coeff::P(*a + *b),
            _ => panic!("coefficient ring mismatch"),
        }
    }

    pub fn sub(&self, other: &Coeff) -> Coeff {
        match (self, other) {
            (Coeff::Z(a), Coeff::Z(b)) => Coeff::Z(a - b),
            (Coeff::P(a), Coeff::P(b)) => Coeff::P(*a - *b),
            _ => panic!("coefficient ring mismatch"),
        }
    }

    pub fn neg(&self) -> Coeff {
        match self {
            Coeff::Z(a) => Coeff::Z(-a),
            Coeff::P(a) => Coeff::P(-*a),
        }
    }

    pub fn mul(&self, other: &Coeff) -> Coeff {
        match (self, other) {
            (Coeff::Z(a), Coeff::Z(b)) => Coeff::Z(a * b),
            (Coeff::P(a), Coeff::P(b)) => Coeff::P(*a * *b),
            _ => panic!("coefficient ring mismatch"),
        }
    }

    pub fn is_positive_leading(&self) -> bool {
        match self {
            Coeff::Z(a) => a > &BigInt::zero(),
            Coeff::P(_) => true,
        }
    }
}

impl fmt::Display for Coeff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Coeff::Z(v) => write!(f, "{v}"),
            Coeff::P(v) => write!(f, "{v}"),
        }
    }
}

/// A multivariate polynomial in sparse distributed form.
#[derive(Debug, Clone)]
pub struct MPoly {
    pub ctx: Arc<Context>,
    coeffs: Vec<Coeff>,
    exps: Vec<Exponent>,
}

impl MPoly {
    pub fn zero(ctx: &Arc<Context>) -> Self {
        MPoly { ctx: ctx.clone(), coeffs: Vec::new(), exps: Vec::new() }
    }

    pub fn from_term(ctx: &Arc<Context>, coeff: Coeff, exp: Exponent) -> Self {
        if coeff.is_zero() {
            MPoly::zero(ctx)
        } else {
            MPoly { ctx: ctx.clone(), coeffs: vec![coeff], exps: vec![exp] }
        }
    }

    pub fn constant(ctx: &Arc<Context>, coeff: Coeff) -> Self {
        let zero_exp = ctx.pack(&vec![0u64; ctx.nvars]);
        MPoly::from_term(ctx, coeff, zero_exp)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn leading_term(&self) -> Option<(&Coeff, &Exponent)> {
        self.coeffs.first().zip(self.exps.first())
    }

    pub fn leading_coeff(&self) -> Option<&Coeff> {
        self.coeffs.first()
    }

    pub fn leading_monomial(&self) -> Option<&Exponent> {
        self.exps.first()
    }

    pub fn coeffs(&self) -> &[Coeff] {
        &self.coeffs
    }

    pub fn exps(&self) -> &[Exponent] {
        &self.exps
    }

    /// `get_term_exp(i)`.
    pub fn get_term_exp(&self, i: usize) -> &Exponent {
        &self.exps[i]
    }

    /// `set_term_coeff(i, c)`. Caller must not introduce a zero coefficient;
    /// use `sort_and_combine` afterwards to restore that invariant if
    /// needed.
    pub fn set_term_coeff(&mut self, i: usize, c: Coeff) {
        self.coeffs[i] = c;
    }

    /// `get_coeff_at_monomial`: linear scan, since the container does not
    /// keep an index by monomial.
    pub fn get_coeff_at_monomial(&self, exp: &Exponent) -> Coeff {
        for (c, e) in self.coeffs.iter().zip(self.exps.iter()) {
            if e == exp {
                return c.clone();
            }
        }
        self.zero_coeff()
    }

    fn zero_coeff(&self) -> Coeff {
        match self.coeffs.first() {
            Some(Coeff::P(n)) => Coeff::P(Nmod::zero(n.modulus())),
            _ => Coeff::Z(BigInt::zero()),
        }
    }

    /// Unsorted append (`push_term`); caller must call `sort_and_combine`
    /// afterwards to restore the container invariants.
    pub fn push_term(&mut self, coeff: Coeff, exp: Exponent) {
        if !coeff.is_zero() {
            self.coeffs.push(coeff);
            self.exps.push(exp);
        }
    }

    /// Restores strict monomial order, combines equal-monomial terms by
    /// summation, and drops any term that became zero.
    pub fn sort_and_combine(&mut self) {
        let ctx = self.ctx.clone();
        let mut idx: Vec<usize> = (0..self.coeffs.len()).collect();
        idx.sort_by(|&a, &b| ctx.cmp(&self.exps[b], &self.exps[a]));

        let mut new_coeffs = Vec::with_capacity(idx.len());
        let mut new_exps = Vec::with_capacity(idx.len());
        let mut i = 0;
        while i < idx.len() {
            let e = self.exps[idx[i]].clone();
            let mut acc = self.coeffs[idx[i]].clone();
            let mut j = i + 1;
            while j < idx.len() && self.exps[idx[j]] == e {
                acc = acc.add(&self.coeffs[idx[j]]);
                j += 1;
            }
            if !acc.is_zero() {
                new_coeffs.push(acc);
                new_exps.push(e);
            }
            i = j;
        }
        self.coeffs = new_coeffs;
        self.exps = new_exps;
    }

    fn assert_same_ring(&self, other: &MPoly) {
        debug_assert_eq!(self.ctx.nvars, other.ctx.nvars);
    }

    pub fn add(&self, other: &MPoly) -> MPoly {
        self.assert_same_ring(other);
        let ctx = self.ctx.clone();
        let mut out = MPoly::zero(&ctx);
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            match ctx.cmp(&self.exps[i], &other.exps[j]) {
                Ordering::Greater => {
                    out.push_raw(self.coeffs[i].clone(), self.exps[i].clone());
                    i += 1;
                }
                Ordering::Less => {
                    out.push_raw(other.coeffs[j].clone(), other.exps[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    let sum = self.coeffs[i].add(&other.coeffs[j]);
                    if !sum.is_zero() {
                        out.push_raw(sum, self.exps[i].clone());
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        while i < self.len() {
            out.push_raw(self.coeffs[i].clone(), self.exps[i].clone());
            i += 1;
        }
        while j < other.len() {
            out.push_raw(other.coeffs[j].clone(), other.exps[j].clone());
            j += 1;
        }
        out
    }

    pub fn sub(&self, other: &MPoly) -> MPoly {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> MPoly {
        MPoly {
            ctx: self.ctx.clone(),
            coeffs: self.coeffs.iter().map(|c| c.neg()).collect(),
            exps: self.exps.clone(),
        }
    }

    pub fn scalar_mul(&self, scalar: &Coeff) -> MPoly {
        if scalar.is_zero() {
            return MPoly::zero(&self.ctx);
        }
        MPoly {
            ctx: self.ctx.clone(),
            coeffs: self.coeffs.iter().map(|c| c.mul(scalar)).collect(),
            exps: self.exps.clone(),
        }
    }

    /// Full polynomial multiplication, driven by the heap kernel (spec
    /// section 4.2). A thin wrapper kept here so `MPoly` exposes the same
    /// `add`/`sub`/`neg`/`mul` surface as a single method set, the way a
    /// caller working only from `sparse.rs`'s API would expect.
    pub fn mul(&self, other: &MPoly) -> MPoly {
        crate::heap::mul(self, other)
    }

    /// Multiplies every term's monomial by `m` (used by the heap kernel and
    /// by lifters); coefficients are untouched.
    pub fn mul_monomial(&self, m: &Exponent) -> MPoly {
        MPoly {
            ctx: self.ctx.clone(),
            coeffs: self.coeffs.clone(),
            exps: self.exps.iter().map(|e| self.ctx.add(e, m)).collect(),
        }
    }

    fn push_raw(&mut self, coeff: Coeff, exp: Exponent) {
        self.coeffs.push(coeff);
        self.exps.push(exp);
    }

    pub fn total_degree(&self) -> u64 {
        self.exps.iter().map(|e| self.ctx.total_degree(e)).max().unwrap_or(0)
    }

    /// Degree in a single variable `var` (0-indexed).
    pub fn degree_in(&self, var: usize) -> u64 {
        self.exps
            .iter()
            .map(|e| self.ctx.unpack(e)[var])
            .max()
            .unwrap_or(0)
    }

    /// `derivative(A, var)`.
    pub fn derivative(&self, var: usize) -> MPoly {
        let mut out = MPoly::zero(&self.ctx);
        for (c, e) in self.coeffs.iter().zip(self.exps.iter()) {
            let mut user = self.ctx.unpack(e);
            let power = user[var];
            if power == 0 {
                continue;
            }
            user[var] -= 1;
            let new_exp = self.ctx.pack(&user);
            let scaled = match c {
                Coeff::Z(v) => Coeff::Z(v * BigInt::from(power)),
                Coeff::P(v) => Coeff::P(*v * Nmod::new(power % v.modulus(), v.modulus())),
            };
            out.push_raw(scaled, new_exp);
        }
        out.sort_and_combine();
        out
    }

    /// Content (gcd of all integer coefficients); only meaningful over ℤ.
    pub fn content(&self) -> BigInt {
        let zs: Vec<BigInt> = self
            .coeffs
            .iter()
            .map(|c| match c {
                Coeff::Z(v) => v.clone(),
                Coeff::P(_) => panic!("content is only defined over Z"),
            })
            .collect();
        bigint::content(&zs)
    }

    /// Divides every integer coefficient by `d` (caller guarantees it
    /// divides exactly, e.g. the content).
    pub fn divide_content(&self, d: &BigInt) -> MPoly {
        MPoly {
            ctx: self.ctx.clone(),
            coeffs: self
                .coeffs
                .iter()
                .map(|c| match c {
                    Coeff::Z(v) => Coeff::Z(bigint::exact_divide(v, d).expect("exact content division")),
                    Coeff::P(_) => panic!("divide_content is only defined over Z"),
                })
                .collect(),
            exps: self.exps.clone(),
        }
    }
}

impl fmt::Display for MPoly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (idx, (c, e)) in self.coeffs.iter().zip(self.exps.iter()).enumerate() {
            if idx > 0 {
                write!(f, " + ")?;
            }
            let user = self.ctx.unpack(e);
            write!(f, "{c}*{user:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::MonomialOrder;

    fn ctx() -> Arc<Context> {
        Context::new(2, MonomialOrder::Lex, 16)
    }

    fn z(v: i64) -> Coeff {
        Coeff::Z(BigInt::from(v))
    }

    #[test]
    fn test_zero_is_zero() {
        let ctx = ctx();
        assert!(MPoly::zero(&ctx).is_zero());
    }

    #[test]
    fn test_add_sub_roundtrip() {
        let ctx = ctx();
        let a = MPoly::from_term(&ctx, z(3), ctx.pack(&[2, 0]));
        let b = MPoly::from_term(&ctx, z(5), ctx.pack(&[1, 1]));
        let sum = a.add(&b);
        let back = sum.sub(&b);
        assert_eq!(back.len(), a.len());
        assert_eq!(back.leading_coeff(), a.leading_coeff());
    }

    #[test]
    fn test_push_then_sort_and_combine() {
        let ctx = ctx();
        let mut p = MPoly::zero(&ctx);
        p.push_term(z(3), ctx.pack(&[1, 0]));
        p.push_term(z(4), ctx.pack(&[1, 0]));
        p.push_term(z(1), ctx.pack(&[0, 1]));
        p.sort_and_combine();
        assert_eq!(p.len(), 2);
        assert_eq!(p.leading_coeff(), Some(&z(7)));
    }

    #[test]
    fn test_derivative() {
        let ctx = ctx();
        // d/dx (3 x^2) = 6x
        let p = MPoly::from_term(&ctx, z(3), ctx.pack(&[2, 0]));
        let d = p.derivative(0);
        assert_eq!(d.leading_coeff(), Some(&z(6)));
        assert_eq!(ctx.unpack(d.leading_monomial().unwrap()), vec![1, 0]);
    }

    #[test]
    fn test_content() {
        let ctx = ctx();
        let mut p = MPoly::zero(&ctx);
        p.push_term(z(12), ctx.pack(&[1, 0]));
        p.push_term(z(18), ctx.pack(&[0, 1]));
        p.sort_and_combine();
        assert_eq!(p.content(), BigInt::from(6));
    }
}
