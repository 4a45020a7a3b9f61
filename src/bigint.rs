//! Arbitrary-precision integer helpers for the ℤ coefficient layer — the
//! `fmpz_add`/`fmpz_mul`/`fmpz_divexact`/`fmpz_CRT_ui`/`fmpz_bits` family of
//! spec section 2 row B, built over `num-bigint`'s `BigInt`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Chinese-remainder update: given `h ≡ a (mod m)` and a new residue
/// `b (mod p)` with `gcd(m, p) = 1`, returns the unique representative of
/// `h` modulo `m*p` congruent to `a` mod `m` and `b` mod `p`, using the
/// symmetric range `[-m*p/2, m*p/2)`.
pub fn crt(a: &BigInt, m: &BigInt, b: &BigInt, p: &BigInt) -> BigInt {
    if m.is_one() {
        return symmetric_lift(b, p);
    }
    let (gcd, m_inv, _) = extended_gcd(m, p);
    debug_assert!(gcd.is_one(), "crt requires coprime moduli");
    let mp = m * p;
    let diff = b - a;
    let t = (&diff * &m_inv).mod_floor(p);
    let result = a + m * &t;
    symmetric_lift(&result, &mp)
}

/// Extended Euclidean algorithm over `BigInt`: returns `(gcd, x, y)` with
/// `a*x + b*y = gcd`.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        (a.clone(), BigInt::one(), BigInt::zero())
    } else {
        let q = a.div_floor(b);
        let r = a - &q * b;
        let (g, x1, y1) = extended_gcd(b, &r);
        (g, y1.clone(), x1 - &q * &y1)
    }
}

/// Maps `v (mod m)`, `v` assumed already reduced into `[0, m)`, to the
/// symmetric representative in `[-m/2, m/2)`.
pub fn symmetric_lift(v: &BigInt, m: &BigInt) -> BigInt {
    let v = v.mod_floor(m);
    let half = m / 2;
    if v > half {
        v - m
    } else {
        v
    }
}

/// Number of bits required to represent `|n|` (0 for n == 0).
pub fn bits(n: &BigInt) -> u64 {
    if n.is_zero() {
        0
    } else {
        n.magnitude().bits()
    }
}

/// Exact division: `Some(n/d)` iff `d` divides `n`, else `None`.
pub fn exact_divide(n: &BigInt, d: &BigInt) -> Option<BigInt> {
    if d.is_zero() {
        return None;
    }
    let (q, r) = n.div_rem(d);
    if r.is_zero() {
        Some(q)
    } else {
        None
    }
}

/// GCD of a coefficient list (the polynomial's content); `0` for an empty
/// or all-zero list.
pub fn content(coeffs: &[BigInt]) -> BigInt {
    coeffs.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c))
}
