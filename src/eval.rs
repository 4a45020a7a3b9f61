//! Evaluation: substituting ring elements for variables (spec section 4.7).

use crate::monomial::Context;
use crate::nmod::Nmod;
use crate::sparse::{Coeff, MPoly};

/// `eval_all(A, alpha)`: substitutes `x_i := alpha[i]` for every variable
/// and returns a single coefficient. Powers of each `alpha_i` are cached
/// and reused by binary exponentiation (spec 4.7's "three companion
/// arrays" reduced here to a per-variable power cache, since this crate
/// has no packed exponent-bit cache distinct from the monomial words
/// themselves).
pub fn eval_all_p(a: &MPoly, alpha: &[Nmod]) -> Nmod {
    assert_eq!(alpha.len(), a.ctx.nvars);
    let modulus = alpha.first().map(|x| x.modulus()).unwrap_or(1);
    let mut caches: Vec<PowerCache> = alpha.iter().map(|&x| PowerCache::new(x)).collect();

    let mut acc = Nmod::zero(modulus);
    for (c, e) in a.coeffs().iter().zip(a.exps().iter()) {
        let user = a.ctx.unpack(e);
        let mut term = match c {
            Coeff::P(v) => *v,
            Coeff::Z(_) => panic!("eval_all_p requires F_p coefficients"),
        };
        for (k, &power) in user.iter().enumerate() {
            term = term * caches[k].pow(power);
        }
        acc = acc + term;
    }
    acc
}

struct PowerCache {
    base: Nmod,
    cache: std::collections::HashMap<u64, Nmod>,
}

impl PowerCache {
    fn new(base: Nmod) -> Self {
        PowerCache { base, cache: std::collections::HashMap::new() }
    }

    fn pow(&mut self, e: u64) -> Nmod {
        if let Some(&v) = self.cache.get(&e) {
            return v;
        }
        let v = self.base.pow(e);
        self.cache.insert(e, v);
        v
    }
}

/// `eval_one(A, k, alpha_k)`: substitutes only variable `k`, returning a
/// polynomial in the remaining `n-1` variables. Terms are grouped by the
/// projection of their exponent onto the other variables and each group's
/// univariate-in-`x_k` polynomial is evaluated and accumulated — the
/// minimal legal stand-in for the generic geobucket accumulator spec
/// section 1 excludes.
pub fn eval_one_p(a: &MPoly, k: usize, alpha_k: Nmod) -> MPoly {
    let ctx = &a.ctx;
    let inner_ctx = Context::new(ctx.nvars - 1, ctx.order, ctx.bits_per_field);
    let mut out = MPoly::zero(&inner_ctx);

    let mut cache = PowerCache::new(alpha_k);
    for (c, e) in a.coeffs().iter().zip(a.exps().iter()) {
        let mut user = ctx.unpack(e);
        let power = user.remove(k);
        let coeff = match c {
            Coeff::P(v) => *v,
            Coeff::Z(_) => panic!("eval_one_p requires F_p coefficients"),
        };
        let scaled = coeff * cache.pow(power);
        out.push_term(Coeff::P(scaled), inner_ctx.pack(&user));
    }
    out.sort_and_combine();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::MonomialOrder;

    #[test]
    fn test_eval_all_additive() {
        let ctx = Context::new(2, MonomialOrder::Lex, 16);
        let p = 1009u64;
        let mut a = MPoly::zero(&ctx);
        a.push_term(Coeff::P(Nmod::new(3, p)), ctx.pack(&[1, 0]));
        a.push_term(Coeff::P(Nmod::new(2, p)), ctx.pack(&[0, 1]));
        a.sort_and_combine();

        let mut b = MPoly::zero(&ctx);
        b.push_term(Coeff::P(Nmod::new(5, p)), ctx.pack(&[1, 0]));
        b.sort_and_combine();

        let alpha = [Nmod::new(2, p), Nmod::new(3, p)];
        let sum = a.add(&b);
        assert_eq!(eval_all_p(&sum, &alpha).value(), (eval_all_p(&a, &alpha) + eval_all_p(&b, &alpha)).value());
    }

    #[test]
    fn test_eval_one_reduces_var_count() {
        let ctx = Context::new(2, MonomialOrder::Lex, 16);
        let p = 1009u64;
        let mut a = MPoly::zero(&ctx);
        a.push_term(Coeff::P(Nmod::new(1, p)), ctx.pack(&[2, 1]));
        a.sort_and_combine();

        let reduced = eval_one_p(&a, 0, Nmod::new(3, p));
        assert_eq!(reduced.ctx.nvars, 1);
        assert_eq!(reduced.leading_coeff(), Some(&Coeff::P(Nmod::new(9, p))));
    }
}
