//! Error types for the multivariate polynomial engine
//!
//! Only the caller-visible failure modes of spec section 7 live here:
//! modulus exhaustion in the modular GCD drivers, a leading coefficient that
//! turns out not to be invertible, division by the zero polynomial, and
//! inexact division. Per-prime and per-evaluation-point "unlucky" outcomes,
//! and exponent overflow, are recovered locally by retrying and never reach
//! this enum (see `heap`, `gcd::brown`, `gcd::zippel`).

use std::fmt;

/// Errors that cross the public API boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum MPolyError {
    /// The GCD drivers ran out of machine primes without the running modulus
    /// exceeding the Landau-Mignotte (or Zippel coefficient-bit) bound.
    ModulusExhausted { driver: &'static str },

    /// A leading coefficient was required to be a unit in the coefficient
    /// ring and was not (composite modulus sharing a factor with it).
    NotInvertible { value: String, modulus: u64 },

    /// Division by the zero polynomial.
    DivisionByZero,

    /// Exact division was requested (`divides`) and the dividend is not a
    /// multiple of the divisor.
    NotExact,

    /// A context operation was given mismatched contexts (different variable
    /// count, order, or bit width) for two operands that must share one.
    ContextMismatch { reason: String },

    /// The requested modulus is not prime, but a prime modulus is required
    /// for the GCD / quadratic-root pipelines.
    NonPrimeModulus { modulus: u64 },
}

impl fmt::Display for MPolyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MPolyError::ModulusExhausted { driver } => {
                write!(f, "{driver}: ran out of primes before the coefficient bound was met")
            }
            MPolyError::NotInvertible { value, modulus } => {
                write!(f, "{value} has no inverse mod {modulus}")
            }
            MPolyError::DivisionByZero => write!(f, "division by zero polynomial"),
            MPolyError::NotExact => write!(f, "divisor does not divide dividend exactly"),
            MPolyError::ContextMismatch { reason } => write!(f, "context mismatch: {reason}"),
            MPolyError::NonPrimeModulus { modulus } => {
                write!(f, "{modulus} is not prime; a prime modulus is required here")
            }
        }
    }
}

impl std::error::Error for MPolyError {}

/// Result alias used throughout the crate.
pub type MPolyResult<T> = Result<T, MPolyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MPolyError::DivisionByZero;
        assert_eq!(err.to_string(), "division by zero polynomial");

        let err = MPolyError::ModulusExhausted { driver: "gcd_brown" };
        assert!(err.to_string().contains("gcd_brown"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = MPolyError::DivisionByZero;
        let err2 = MPolyError::DivisionByZero;
        assert_eq!(err1, err2);

        let err3 = MPolyError::NotExact;
        assert_ne!(err1, err3);
    }
}
