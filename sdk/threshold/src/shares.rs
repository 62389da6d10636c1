//! Shamir Secret Sharing over GF(p)
//!
//! Implements K-of-N sharing of single field elements.

use pixelshare_field::{FieldError, PrimeField};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::CoefficientSource;

/// A share: the point (x, P(x)) on the secret polynomial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Share index (1 to N)
    pub x: u8,
    /// Share value
    pub y: u8,
}

impl Point {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Threshold scheme errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("invalid parameters: k={k}, n={n}, p={p} (need 1 <= k <= n < p)")]
    InvalidParameters { k: usize, n: usize, p: u16 },

    #[error("invalid share set: got {got} points, need {need}")]
    InvalidShareSet { got: usize, need: usize },

    #[error("share index {x} outside [1, {n}]")]
    ShareIndexOutOfRange { x: u8, n: usize },

    #[error("secret {secret} is not an element of GF({p})")]
    SecretOutOfRange { secret: u8, p: u16 },

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// An immutable (k, n) threshold scheme over GF(p).
///
/// Holds no generator and no mutable state, so one instance can be shared
/// read-only across any number of workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdScheme {
    threshold: usize,
    total_shares: usize,
    field: PrimeField,
}

impl ThresholdScheme {
    /// Create a scheme requiring `threshold` of `total_shares` shares over GF(`prime`)
    pub fn new(threshold: usize, total_shares: usize, prime: u16) -> Result<Self, ThresholdError> {
        Self::with_field(threshold, total_shares, PrimeField::new(prime)?)
    }

    /// Create a scheme over an existing field
    pub fn with_field(
        threshold: usize,
        total_shares: usize,
        field: PrimeField,
    ) -> Result<Self, ThresholdError> {
        let p = field.modulus();
        // x = 1..=n must be distinct non-zero field elements
        if threshold == 0 || threshold > total_shares || total_shares >= p as usize {
            return Err(ThresholdError::InvalidParameters {
                k: threshold,
                n: total_shares,
                p,
            });
        }

        log::debug!("Threshold scheme k={threshold} n={total_shares} p={p}");
        Ok(Self {
            threshold,
            total_shares,
            field,
        })
    }

    /// K
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// N
    pub fn total_shares(&self) -> usize {
        self.total_shares
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    pub fn modulus(&self) -> u16 {
        self.field.modulus()
    }

    /// Split `secret` into N shares at x = 1..=N, in x-ascending order.
    ///
    /// Draws K-1 fresh coefficients from `source` on every call. X = 0 is
    /// never issued since P(0) is the secret itself.
    pub fn generate_shares<S>(
        &self,
        secret: u8,
        source: &mut S,
    ) -> Result<Vec<Point>, ThresholdError>
    where
        S: CoefficientSource + ?Sized,
    {
        let coeffs = self.random_polynomial(secret, source)?;

        Ok((1..=self.total_shares as u8)
            .map(|x| Point::new(x, self.field.eval_polynomial(&coeffs, x)))
            .collect())
    }

    /// Coefficients `[secret, c1, ..., c(k-1)]` of a fresh sharing polynomial
    pub fn random_polynomial<S>(
        &self,
        secret: u8,
        source: &mut S,
    ) -> Result<Vec<u8>, ThresholdError>
    where
        S: CoefficientSource + ?Sized,
    {
        if !self.field.contains(secret as u16) {
            return Err(ThresholdError::SecretOutOfRange {
                secret,
                p: self.field.modulus(),
            });
        }

        let mut coeffs = Vec::with_capacity(self.threshold);
        coeffs.push(secret);
        for _ in 1..self.threshold {
            coeffs.push(source.next_field_element(&self.field));
        }
        Ok(coeffs)
    }

    /// Recover the secret from K or more points by Lagrange interpolation at X = 0.
    ///
    /// Every supplied point takes part. Points from one polynomial of degree
    /// K-1 give the same answer whichever K or more of them are used.
    pub fn reconstruct_secret(&self, points: &[Point]) -> Result<u8, ThresholdError> {
        self.check_indices(points.iter().map(|p| p.x), points.len())?;
        Ok(interpolate_at_zero(&self.field, points)?)
    }

    /// Lagrange basis values at X = 0 for a fixed set of share indices.
    ///
    /// Lets a caller reconstructing many secrets from the same indices pay for
    /// the inversions once. Pair the result with [`Self::combine_weighted`].
    pub fn lagrange_weights(&self, xs: &[u8]) -> Result<Vec<u8>, ThresholdError> {
        self.check_indices(xs.iter().copied(), xs.len())?;
        Ok(lagrange_basis_at_zero(&self.field, xs)?)
    }

    /// Σ weight_i · y_i (mod p)
    pub fn combine_weighted(&self, weights: &[u8], ys: &[u8]) -> u8 {
        weighted_sum(&self.field, weights, ys.iter().copied())
    }

    fn check_indices<I>(&self, xs: I, count: usize) -> Result<(), ThresholdError>
    where
        I: IntoIterator<Item = u8>,
    {
        if count < self.threshold {
            return Err(ThresholdError::InvalidShareSet {
                got: count,
                need: self.threshold,
            });
        }

        for x in xs {
            if x == 0 || x as usize > self.total_shares {
                return Err(ThresholdError::ShareIndexOutOfRange {
                    x,
                    n: self.total_shares,
                });
            }
        }
        Ok(())
    }
}

/// Lagrange basis polynomials evaluated at X = 0.
///
/// l_i(0) = Π_{j≠i} (-x_j) / (x_i - x_j). No threshold checks are made here;
/// equal x-values fail with [`FieldError::DivisionByZero`].
pub fn lagrange_basis_at_zero(field: &PrimeField, xs: &[u8]) -> Result<Vec<u8>, FieldError> {
    xs.iter()
        .enumerate()
        .map(|(i, &xi)| {
            let mut numerator = 1;
            let mut denominator = 1;

            for (j, &xj) in xs.iter().enumerate() {
                if i != j {
                    numerator = field.mul(numerator, field.neg(field.reduce(xj as u32)));
                    denominator = field.mul(
                        denominator,
                        field.sub(field.reduce(xi as u32), field.reduce(xj as u32)),
                    );
                }
            }

            field.div(numerator, denominator)
        })
        .collect()
}

/// Value at X = 0 of the polynomial through `points`.
///
/// Raw interpolation with no threshold checks. With fewer points than the
/// sharing threshold this yields some field element, generally not the secret.
pub fn interpolate_at_zero(field: &PrimeField, points: &[Point]) -> Result<u8, FieldError> {
    let xs: Vec<u8> = points.iter().map(|p| p.x).collect();
    let weights = lagrange_basis_at_zero(field, &xs)?;
    Ok(weighted_sum(field, &weights, points.iter().map(|p| p.y)))
}

fn weighted_sum<I>(field: &PrimeField, weights: &[u8], ys: I) -> u8
where
    I: IntoIterator<Item = u8>,
{
    weights.iter().zip(ys).fold(0, |acc, (&w, y)| {
        field.add(acc, field.mul(w, field.reduce(y as u32)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FixedCoefficients;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_split_and_combine() {
        let scheme = ThresholdScheme::new(3, 5, 251).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let shares = scheme.generate_shares(42, &mut rng).unwrap();
        assert_eq!(shares.len(), 5);
        assert_eq!(
            shares.iter().map(|p| p.x).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );

        // Reconstruct with exactly threshold shares
        assert_eq!(scheme.reconstruct_secret(&shares[0..3]).unwrap(), 42);

        // Reconstruct with different subset of shares
        assert_eq!(scheme.reconstruct_secret(&shares[2..5]).unwrap(), 42);

        // More than threshold
        assert_eq!(scheme.reconstruct_secret(&shares).unwrap(), 42);
    }

    #[test]
    fn test_two_of_three_secret_200() {
        let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
        let mut source = FixedCoefficients::new(vec![100]);

        // P(X) = 200 + 100X
        let shares = scheme.generate_shares(200, &mut source).unwrap();
        assert_eq!(
            shares,
            vec![Point::new(1, 49), Point::new(2, 149), Point::new(3, 249)]
        );

        assert_eq!(scheme.reconstruct_secret(&shares[0..2]).unwrap(), 200);
        assert_eq!(scheme.reconstruct_secret(&shares[1..3]).unwrap(), 200);
    }

    #[test]
    fn test_k_equals_one_shares_are_the_secret() {
        let scheme = ThresholdScheme::new(1, 4, 251).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let shares = scheme.generate_shares(77, &mut rng).unwrap();
        assert!(shares.iter().all(|p| p.y == 77));
        assert_eq!(scheme.reconstruct_secret(&shares[3..]).unwrap(), 77);
    }

    #[test]
    fn test_invalid_parameters() {
        // k > n
        assert!(matches!(
            ThresholdScheme::new(5, 3, 251),
            Err(ThresholdError::InvalidParameters { k: 5, n: 3, p: 251 })
        ));

        // k = 0
        assert!(matches!(
            ThresholdScheme::new(0, 3, 251),
            Err(ThresholdError::InvalidParameters { .. })
        ));

        // n >= p
        assert!(matches!(
            ThresholdScheme::new(2, 251, 251),
            Err(ThresholdError::InvalidParameters { .. })
        ));
        assert!(ThresholdScheme::new(2, 250, 251).is_ok());

        // p not prime
        assert_eq!(
            ThresholdScheme::new(2, 3, 250),
            Err(ThresholdError::Field(FieldError::InvalidModulus(250)))
        );
    }

    #[test]
    fn test_secret_out_of_range() {
        let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            scheme.generate_shares(251, &mut rng),
            Err(ThresholdError::SecretOutOfRange { secret: 251, p: 251 })
        );
        assert!(scheme.generate_shares(250, &mut rng).is_ok());
    }

    #[test]
    fn test_insufficient_shares() {
        let scheme = ThresholdScheme::new(3, 5, 251).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let shares = scheme.generate_shares(42, &mut rng).unwrap();

        assert_eq!(
            scheme.reconstruct_secret(&shares[0..2]),
            Err(ThresholdError::InvalidShareSet { got: 2, need: 3 })
        );
        assert_eq!(
            scheme.reconstruct_secret(&[]),
            Err(ThresholdError::InvalidShareSet { got: 0, need: 3 })
        );
    }

    #[test]
    fn test_duplicate_index_is_division_by_zero() {
        let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
        let points = [Point::new(2, 10), Point::new(2, 10)];
        assert_eq!(
            scheme.reconstruct_secret(&points),
            Err(ThresholdError::Field(FieldError::DivisionByZero))
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
        assert_eq!(
            scheme.reconstruct_secret(&[Point::new(0, 1), Point::new(1, 2)]),
            Err(ThresholdError::ShareIndexOutOfRange { x: 0, n: 3 })
        );
        assert_eq!(
            scheme.lagrange_weights(&[1, 4]),
            Err(ThresholdError::ShareIndexOutOfRange { x: 4, n: 3 })
        );
    }

    #[test]
    fn test_lagrange_weights_match_reconstruction() {
        let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
        // l_1(0) = -3 / (1 - 3) = 3/2, l_3(0) = -1 / (3 - 1) = -1/2
        let weights = scheme.lagrange_weights(&[1, 3]).unwrap();
        let f = scheme.field();
        assert_eq!(weights[0], f.div(3, 2).unwrap());
        assert_eq!(weights[1], f.neg(f.div(1, 2).unwrap()));

        let mut rng = StdRng::seed_from_u64(5);
        for secret in [0u8, 1, 125, 250] {
            let shares = scheme.generate_shares(secret, &mut rng).unwrap();
            let ys = [shares[0].y, shares[2].y];
            assert_eq!(scheme.combine_weighted(&weights, &ys), secret);
        }
    }

    #[test]
    fn test_accessors() {
        let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
        assert_eq!(scheme.threshold(), 2);
        assert_eq!(scheme.total_shares(), 3);
        assert_eq!(scheme.modulus(), 251);
        assert_eq!(
            ThresholdScheme::with_field(2, 3, PrimeField::default()).unwrap(),
            scheme
        );
    }
}
