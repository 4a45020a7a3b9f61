//! Transposed Vandermonde solver (spec section 4.10.iv, Glossary): given a
//! fixed set of monomial "nodes" and several right-hand-side vectors sampled
//! at powers of evaluation points, recovers each node's coefficient without
//! ever forming the Vandermonde matrix explicitly. Grounds Zippel's sparse
//! interpolation step in `gcd_zippel.c`'s `nmod_mpoly_vec_from_evals`-style
//! diagonal-of-inverse trick: build `P(y) = Π(y - node_j)`, then each node's
//! coefficient falls out of `P(y)/(y - node_j)` evaluated at `node_j`, the
//! standard Lagrange-style closed form for the dual Vandermonde system.

use crate::dense::DensePoly;
use crate::nmod::Nmod;

/// Solves `V^T * x = rhs` where `V` is the (rectangular, n x n) Vandermonde
/// matrix of `nodes` (`V[i][j] = nodes[j]^i`), i.e. recovers the coefficient
/// vector `x` given samples `rhs[i] = sum_j nodes[j]^i * x[j]`.
///
/// `rhs` must have exactly `nodes.len()` entries (one evaluation per power
/// `0..n`). Returns `None` if two nodes coincide (singular system), the
/// "singular evaluation point" failure spec section 7 budgets ten retries
/// for.
pub fn solve_transposed_vandermonde(nodes: &[Nmod], rhs: &[Nmod]) -> Option<Vec<Nmod>> {
    let n = nodes.len();
    if rhs.len() != n || n == 0 {
        return None;
    }
    let p = nodes[0].modulus();
    if has_duplicates(nodes) {
        return None;
    }

    // P(y) = Π (y - node_j); each coefficient's own poly is P(y)/(y-node_j).
    let full = DensePoly::product_of_roots(nodes, p);

    let mut solution = Vec::with_capacity(n);
    for &node in nodes {
        let linear = DensePoly::from_coeffs(vec![-node, Nmod::one(p)], p);
        let (quotient, remainder) = full.div_rem(&linear);
        if !remainder.is_zero() {
            return None; // node wasn't actually a root: duplicate/singular
        }
        let denom = quotient.evaluate(node);
        let inv_denom = denom.inverse()?;

        // rhs = sum_i rhs_i * y^i evaluated against the dual basis: the
        // coefficient for `node` is (sum_i rhs[i] * node^i-weighted dual) /
        // denom, computed here as an explicit dot product since `rhs` is
        // indexed by power, not by node.
        let mut acc = Nmod::zero(p);
        let mut power = Nmod::one(p);
        for &r in rhs {
            acc = acc + r * power;
            power = power * node;
        }
        solution.push(acc * inv_denom);
    }
    Some(solution)
}

fn has_duplicates(nodes: &[Nmod]) -> bool {
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            if nodes[i] == nodes[j] {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u64 = 1009;

    #[test]
    fn test_solve_recovers_known_coefficients() {
        // x = [3, 5], nodes = [2, 7]; rhs[i] = 3*2^i + 5*7^i for i = 0, 1.
        let nodes = vec![Nmod::new(2, P), Nmod::new(7, P)];
        let x = vec![Nmod::new(3, P), Nmod::new(5, P)];
        let mut rhs = Vec::new();
        for i in 0..2u64 {
            let mut acc = Nmod::zero(P);
            for (xj, &node) in x.iter().zip(nodes.iter()) {
                acc = acc + *xj * node.pow(i);
            }
            rhs.push(acc);
        }
        let solved = solve_transposed_vandermonde(&nodes, &rhs).unwrap();
        assert_eq!(solved, x);
    }

    #[test]
    fn test_duplicate_nodes_fail() {
        let nodes = vec![Nmod::new(2, P), Nmod::new(2, P)];
        let rhs = vec![Nmod::new(1, P), Nmod::new(1, P)];
        assert!(solve_transposed_vandermonde(&nodes, &rhs).is_none());
    }
}
