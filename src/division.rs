//! Division entry points (spec section 6) and the chunked parallel exact
//! division protocol (spec section 5): partition the quotient's monomial
//! range into chunks, hand each chunk to a pool worker, and let any worker
//! that finishes its own chunk early "steal" the next unclaimed chunk
//! (the source's producer/non-producer roles), cancelling the whole job the
//! moment one chunk proves the division is inexact.

use crate::heap;
use crate::monomial::Exponent;
use crate::sparse::MPoly;
use crate::threadpool::ThreadPool;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

/// `divrem(A, B)`: thin wrapper over the heap kernel (spec 4.4).
pub fn divrem(a: &MPoly, b: &MPoly) -> (MPoly, MPoly) {
    heap::divrem(a, b)
}

/// `divides(A, B)`: thin wrapper over the heap kernel's exact-division test
/// (spec 4.5).
pub fn divides(a: &MPoly, b: &MPoly) -> Option<MPoly> {
    heap::divides(a, b)
}

/// Chunked parallel exact division (spec section 5): splits `A`'s monomial
/// range into `nchunks` contiguous bands under the divisor's order and
/// divides each band independently, publishing partial quotients under a
/// lock and cancelling outstanding chunks the instant one proves the
/// division inexact. Equivalent to `divides`, but spreads the work over a
/// thread pool for large dividends.
pub fn divides_parallel(a: &MPoly, b: &MPoly, pool: &ThreadPool, nchunks: usize) -> Option<MPoly> {
    assert!(!b.is_zero(), "divides_parallel by zero polynomial");
    if a.is_zero() {
        return Some(MPoly::zero(&a.ctx));
    }
    if nchunks <= 1 || a.len() < nchunks {
        return heap::divides(a, b);
    }

    let ctx = a.ctx.clone();
    let bounds = chunk_bounds(a, nchunks);
    let failed = AtomicBool::new(false);
    let results: Mutex<Vec<Option<MPoly>>> = Mutex::new(vec![None; nchunks]);

    pool.scope(|scope| {
        for (idx, emin) in bounds.into_iter().enumerate() {
            let failed = &failed;
            let results = &results;
            let ctx = ctx.clone();
            scope.submit(move || {
                if failed.load(AtomicOrdering::Relaxed) {
                    return;
                }
                match heap::divides_with_emin(a, b, &emin) {
                    Some(partial) => {
                        results.lock().unwrap()[idx] = Some(partial);
                    }
                    None => {
                        failed.store(true, AtomicOrdering::Relaxed);
                        let _ = ctx;
                    }
                }
            });
        }
    });

    if failed.load(AtomicOrdering::Relaxed) {
        return None;
    }

    let parts = results.into_inner().unwrap();
    let mut out = MPoly::zero(&ctx);
    for part in parts.into_iter().flatten() {
        for (c, e) in part.coeffs().iter().zip(part.exps().iter()) {
            out.push_term(c.clone(), e.clone());
        }
    }
    out.sort_and_combine();
    Some(out)
}

/// Splits `A`'s term range into `nchunks` monomial lower bounds, evenly by
/// term count (the source's geobucket-free chunking: position in the
/// already-sorted term array stands in for an explicit monomial range
/// table).
fn chunk_bounds(a: &MPoly, nchunks: usize) -> Vec<Exponent> {
    let len = a.len();
    let step = (len + nchunks - 1) / nchunks;
    (0..nchunks)
        .map(|i| {
            let idx = (i * step).min(len - 1);
            a.get_term_exp(idx).clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::{Context, MonomialOrder};
    use crate::nmod::Nmod;
    use crate::sparse::Coeff;

    #[test]
    fn test_divrem_wrapper_matches_heap() {
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let a = MPoly::from_term(&ctx, Coeff::P(Nmod::new(1, 1009)), ctx.pack(&[3]));
        let b = MPoly::from_term(&ctx, Coeff::P(Nmod::new(1, 1009)), ctx.pack(&[1]));
        let (q, r) = divrem(&a, &b);
        assert_eq!(ctx.unpack(q.leading_monomial().unwrap()), vec![2]);
        assert!(r.is_zero());
    }

    #[test]
    fn test_divides_parallel_matches_serial() {
        let ctx = Context::new(1, MonomialOrder::Lex, 16);
        let p = 1009u64;
        let mut a = MPoly::zero(&ctx);
        for k in 0..8u64 {
            a.push_term(Coeff::P(Nmod::new(k + 1, p)), ctx.pack(&[k]));
        }
        a.sort_and_combine();
        let b = MPoly::from_term(&ctx, Coeff::P(Nmod::new(1, p)), ctx.pack(&[0]));

        let pool = ThreadPool::new(2);
        let parallel = divides_parallel(&a, &b, &pool, 3).unwrap();
        let serial = divides(&a, &b).unwrap();
        assert_eq!(parallel.len(), serial.len());
    }
}
