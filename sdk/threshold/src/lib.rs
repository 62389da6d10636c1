//! Pixelshare Threshold Scheme
//!
//! (k, n) Shamir secret sharing over GF(p), one field element at a time.
//!
//! ```text
//!   secret s ──▶ P(X) = s + c1·X + ... + c(k-1)·X^(k-1)
//!                 │
//!                 ├──▶ (1, P(1))
//!                 ├──▶ (2, P(2))      any k points ──▶ Lagrange at X=0 ──▶ s
//!                 └──▶ (n, P(n))
//! ```
//!
//! Coefficients come from an injected [`CoefficientSource`]. Any
//! cryptographically secure `rand` generator is one; seeded generators make
//! share generation reproducible in tests.

pub mod shares;
pub mod source;

pub use pixelshare_field::{DEFAULT_PRIME, FieldError, PrimeField};
pub use shares::{
    Point, ThresholdError, ThresholdScheme, interpolate_at_zero, lagrange_basis_at_zero,
};
pub use source::{CoefficientSource, FixedCoefficients};
