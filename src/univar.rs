//! Univariate-with-multivariate-coefficients view (spec section 3 "U" form
//! and section 4.6): groups a polynomial's terms by their exponent in one
//! distinguished "main" variable.

use crate::monomial::Context;
use crate::sparse::MPoly;
use std::sync::Arc;

/// `(main_exp_k, coeff_k)` pairs, strictly decreasing in `main_exp_k`, each
/// `coeff_k` non-zero and missing the main variable's field.
pub struct UnivarPoly {
    pub main_exps: Vec<u64>,
    pub coeffs: Vec<MPoly>,
    /// Context of the inner (n-1 variable) coefficients.
    pub inner_ctx: Arc<Context>,
    pub main_var: usize,
}

/// `to_univar(A, main_var)`.
pub fn to_univar(a: &MPoly, main_var: usize) -> UnivarPoly {
    let ctx = &a.ctx;
    let inner_ctx = Context::new(ctx.nvars - 1, ctx.order, ctx.bits_per_field);

    let mut groups: Vec<(u64, MPoly)> = Vec::new();
    for (c, e) in a.coeffs().iter().zip(a.exps().iter()) {
        let user = ctx.unpack(e);
        let main = user[main_var];
        let mut rest = user.clone();
        rest.remove(main_var);
        let inner_exp = inner_ctx.pack(&rest);

        match groups.iter_mut().find(|(m, _)| *m == main) {
            Some((_, poly)) => poly.push_term(c.clone(), inner_exp),
            None => {
                let mut poly = MPoly::zero(&inner_ctx);
                poly.push_term(c.clone(), inner_exp);
                groups.push((main, poly));
            }
        }
    }
    for (_, poly) in groups.iter_mut() {
        poly.sort_and_combine();
    }
    groups.sort_by(|a, b| b.0.cmp(&a.0));

    let (main_exps, coeffs) = groups.into_iter().unzip();
    UnivarPoly { main_exps, coeffs, inner_ctx, main_var }
}

/// `from_univar(U, main_var)`: inverse of `to_univar`. Caller guarantees
/// (as `to_univar` ensures) that inner coefficients are non-zero and
/// monomial-disjoint with respect to the non-main fields.
pub fn from_univar(u: &UnivarPoly, outer_ctx: &Arc<Context>) -> MPoly {
    let mut out = MPoly::zero(outer_ctx);
    for (main, inner) in u.main_exps.iter().zip(u.coeffs.iter()) {
        for (c, e) in inner.coeffs().iter().zip(inner.exps().iter()) {
            let mut user = u.inner_ctx.unpack(e);
            user.insert(u.main_var, *main);
            out.push_term(c.clone(), outer_ctx.pack(&user));
        }
    }
    out.sort_and_combine();
    out
}
