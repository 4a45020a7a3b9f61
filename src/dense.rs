//! Dense univariate polynomial over 𝔽ₚ: the external collaborator spec
//! section 1 names (`gcd`, `divrem`, `evaluate`, `resultant`,
//! `product_of_roots`), and the form the Brown/Zippel drivers bottom out
//! into. Modeled on `mathhook-core`'s `finite_field::poly::PolyZp`, with its
//! `mul` rewritten without the raw-pointer block it used.

use crate::nmod::Nmod;

/// Coefficients `coeffs[i]` is the coefficient of `x^i`; no trailing zero
/// coefficients (degree = `coeffs.len() - 1`, or the zero polynomial has an
/// empty `coeffs`).
#[derive(Debug, Clone, PartialEq)]
pub struct DensePoly {
    coeffs: Vec<Nmod>,
    modulus: u64,
}

impl DensePoly {
    pub fn from_coeffs(coeffs: Vec<Nmod>, modulus: u64) -> Self {
        let mut p = DensePoly { coeffs, modulus };
        p.trim();
        p
    }

    pub fn zero(modulus: u64) -> Self {
        DensePoly { coeffs: Vec::new(), modulus }
    }

    pub fn constant(value: Nmod, modulus: u64) -> Self {
        DensePoly::from_coeffs(vec![value], modulus)
    }

    pub fn x(modulus: u64) -> Self {
        DensePoly::from_coeffs(vec![Nmod::zero(modulus), Nmod::one(modulus)], modulus)
    }

    fn trim(&mut self) {
        while matches!(self.coeffs.last(), Some(c) if c.is_zero()) {
            self.coeffs.pop();
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    pub fn degree(&self) -> i64 {
        if self.coeffs.is_empty() {
            -1
        } else {
            (self.coeffs.len() - 1) as i64
        }
    }

    pub fn leading_coeff(&self) -> Nmod {
        *self.coeffs.last().unwrap_or(&Nmod::zero(self.modulus))
    }

    pub fn coeff(&self, i: usize) -> Nmod {
        self.coeffs.get(i).copied().unwrap_or(Nmod::zero(self.modulus))
    }

    pub fn coefficients(&self) -> &[Nmod] {
        &self.coeffs
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn add(&self, other: &DensePoly) -> DensePoly {
        let len = self.coeffs.len().max(other.coeffs.len());
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            out.push(self.coeff(i) + other.coeff(i));
        }
        DensePoly::from_coeffs(out, self.modulus)
    }

    pub fn sub(&self, other: &DensePoly) -> DensePoly {
        let len = self.coeffs.len().max(other.coeffs.len());
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            out.push(self.coeff(i) - other.coeff(i));
        }
        DensePoly::from_coeffs(out, self.modulus)
    }

    pub fn neg(&self) -> DensePoly {
        DensePoly::from_coeffs(self.coeffs.iter().map(|c| -*c).collect(), self.modulus)
    }

    pub fn scale(&self, s: Nmod) -> DensePoly {
        DensePoly::from_coeffs(self.coeffs.iter().map(|&c| c * s).collect(), self.modulus)
    }

    /// Schoolbook multiplication; safe indexing replaces the source's
    /// pointer-block implementation.
    pub fn mul(&self, other: &DensePoly) -> DensePoly {
        if self.is_zero() || other.is_zero() {
            return DensePoly::zero(self.modulus);
        }
        let mut out = vec![Nmod::zero(self.modulus); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, &b) in other.coeffs.iter().enumerate() {
                out[i + j] = out[i + j] + a * b;
            }
        }
        DensePoly::from_coeffs(out, self.modulus)
    }

    /// Division with remainder; requires `other` non-zero.
    pub fn div_rem(&self, other: &DensePoly) -> (DensePoly, DensePoly) {
        assert!(!other.is_zero(), "division by zero polynomial");
        let lc_inv = other.leading_coeff().inverse().expect("leading coefficient must be invertible");
        let mut r = self.coeffs.clone();
        let mut q = vec![Nmod::zero(self.modulus); (self.degree() - other.degree()).max(-1) as usize + 1];

        while (r.len() as i64 - 1) >= other.degree() && !r.is_empty() {
            while matches!(r.last(), Some(c) if c.is_zero()) {
                r.pop();
            }
            if (r.len() as i64 - 1) < other.degree() {
                break;
            }
            let shift = r.len() - other.coeffs.len();
            let coeff = r.last().copied().unwrap() * lc_inv;
            q[shift] = coeff;
            for (j, &bc) in other.coeffs.iter().enumerate() {
                r[shift + j] = r[shift + j] - coeff * bc;
            }
        }
        (DensePoly::from_coeffs(q, self.modulus), DensePoly::from_coeffs(r, self.modulus))
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: Nmod) -> Nmod {
        let mut acc = Nmod::zero(self.modulus);
        for &c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// Scales so the leading coefficient is 1.
    pub fn make_monic(&self) -> DensePoly {
        if self.is_zero() {
            return self.clone();
        }
        let inv = self.leading_coeff().inverse().expect("leading coefficient must be invertible");
        self.scale(inv)
    }

    /// Euclidean GCD, monic.
    pub fn gcd(&self, other: &DensePoly) -> DensePoly {
        let (mut a, mut b) = (self.clone(), other.clone());
        while !b.is_zero() {
            let (_, r) = a.div_rem(&b);
            a = b;
            b = r;
        }
        a.make_monic()
    }

    /// Extended Euclidean algorithm: returns `(gcd, s, t)` with
    /// `s*self + t*other = gcd` (gcd monic).
    pub fn extended_gcd(&self, other: &DensePoly) -> (DensePoly, DensePoly, DensePoly) {
        let modulus = self.modulus;
        let (mut old_r, mut r) = (self.clone(), other.clone());
        let (mut old_s, mut s) = (DensePoly::constant(Nmod::one(modulus), modulus), DensePoly::zero(modulus));
        let (mut old_t, mut t) = (DensePoly::zero(modulus), DensePoly::constant(Nmod::one(modulus), modulus));

        while !r.is_zero() {
            let (q, rem) = old_r.div_rem(&r);
            old_r = r;
            r = rem;
            let new_s = old_s.sub(&q.mul(&s));
            old_s = s;
            s = new_s;
            let new_t = old_t.sub(&q.mul(&t));
            old_t = t;
            t = new_t;
        }

        if old_r.is_zero() {
            return (old_r, old_s, old_t);
        }
        let inv = old_r.leading_coeff().inverse().expect("leading coefficient must be invertible");
        (old_r.scale(inv), old_s.scale(inv), old_t.scale(inv))
    }

    /// Resultant of `self` and `other` via the bottom-up Euclidean
    /// algorithm: the product of leading-coefficient powers picked up at
    /// each degree-reducing step, sign-corrected for each operand swap.
    pub fn resultant(&self, other: &DensePoly) -> Nmod {
        if self.is_zero() || other.is_zero() {
            return Nmod::zero(self.modulus);
        }
        let (mut a, mut b) = (self.clone(), other.clone());
        let mut res = Nmod::one(self.modulus);
        let mut sign = 1i32;

        loop {
            if b.is_zero() {
                return Nmod::zero(self.modulus);
            }
            if b.degree() == 0 {
                // res *= lc(b)^deg(a)
                res = res * b.leading_coeff().pow(a.degree() as u64);
                break;
            }
            let deg_a = a.degree();
            let deg_b = b.degree();
            let (_, r) = a.div_rem(&b);
            let deg_r = r.degree();
            // Res(a,b) = (-1)^(deg_a*deg_b) * lc(b)^(deg_a - deg_r) * Res(b, r)
            res = res * b.leading_coeff().pow((deg_a - deg_r).max(0) as u64);
            if (deg_a * deg_b) % 2 == 1 {
                sign = -sign;
            }
            a = b;
            b = r;
        }
        if sign < 0 {
            res.negate()
        } else {
            res
        }
    }

    /// Discriminant: `disc(A) = (-1)^(n(n-1)/2) * resultant(A, A') / lc(A)`.
    pub fn discriminant(&self) -> Nmod {
        let n = self.degree();
        if n <= 0 {
            return Nmod::one(self.modulus);
        }
        let deriv = self.derivative();
        let res = self.resultant(&deriv);
        let lc_inv = self.leading_coeff().inverse().expect("leading coefficient must be invertible");
        let sign_exp = (n * (n - 1) / 2) % 2;
        let signed = if sign_exp == 1 { res.negate() } else { res };
        signed * lc_inv
    }

    pub fn derivative(&self) -> DensePoly {
        if self.coeffs.len() <= 1 {
            return DensePoly::zero(self.modulus);
        }
        let out: Vec<Nmod> = self.coeffs[1..]
            .iter()
            .enumerate()
            .map(|(i, &c)| c * Nmod::new((i + 1) as u64 % self.modulus, self.modulus))
            .collect();
        DensePoly::from_coeffs(out, self.modulus)
    }

    /// `product_of_roots(roots)`: `Π (x - r_i)`, built by successive
    /// multiplication by a linear factor. Used by the transposed-Vandermonde
    /// solver (`P(y) = Π(y - mon_j(alpha))`).
    pub fn product_of_roots(roots: &[Nmod], modulus: u64) -> DensePoly {
        let mut out = DensePoly::constant(Nmod::one(modulus), modulus);
        for &r in roots {
            let linear = DensePoly::from_coeffs(vec![-r, Nmod::one(modulus)], modulus);
            out = out.mul(&linear);
        }
        out
    }
}
