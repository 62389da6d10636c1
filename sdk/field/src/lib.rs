//! Pixelshare Field Arithmetic
//!
//! Modular arithmetic over a small prime field GF(p) with p ≤ 256, so every
//! field element fits in a `u8`. Intermediate sums and products are widened
//! to `u32` before reduction.
//!
//! The default modulus is 251, the largest prime below 256.

use thiserror::Error;

/// Largest prime below 256.
pub const DEFAULT_PRIME: u16 = 251;

/// Field arithmetic errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid modulus {0}: must be a prime in [2, 256]")]
    InvalidModulus(u16),
}

/// A prime field GF(p).
///
/// Elements are plain `u8` values in `[0, p)`. Every operation assumes its
/// inputs are already reduced and returns a reduced result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimeField {
    modulus: u16,
}

impl Default for PrimeField {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_PRIME,
        }
    }
}

impl PrimeField {
    /// Create a field with the given prime modulus
    pub fn new(modulus: u16) -> Result<Self, FieldError> {
        if modulus > 256 || !is_prime(modulus) {
            return Err(FieldError::InvalidModulus(modulus));
        }
        Ok(Self { modulus })
    }

    /// The prime p
    pub fn modulus(&self) -> u16 {
        self.modulus
    }

    /// Largest element of the field (p - 1)
    pub fn max_element(&self) -> u8 {
        (self.modulus - 1) as u8
    }

    /// Whether `value` is a reduced element of this field
    pub fn contains(&self, value: u16) -> bool {
        value < self.modulus
    }

    /// Reduce an unsigned integer into `[0, p)`
    pub fn reduce(&self, value: u32) -> u8 {
        (value % self.modulus as u32) as u8
    }

    /// Reduce a signed integer into `[0, p)`.
    ///
    /// Uses the euclidean remainder, so negative inputs never leak through.
    pub fn reduce_signed(&self, value: i64) -> u8 {
        value.rem_euclid(self.modulus as i64) as u8
    }

    pub fn add(&self, a: u8, b: u8) -> u8 {
        self.reduce(a as u32 + b as u32)
    }

    pub fn sub(&self, a: u8, b: u8) -> u8 {
        self.reduce(a as u32 + self.modulus as u32 - b as u32)
    }

    pub fn mul(&self, a: u8, b: u8) -> u8 {
        self.reduce(a as u32 * b as u32)
    }

    pub fn neg(&self, a: u8) -> u8 {
        self.reduce(self.modulus as u32 - a as u32)
    }

    /// Raise `base` to `exp` by square-and-multiply
    pub fn pow(&self, base: u8, mut exp: u32) -> u8 {
        let mut result = self.reduce(1);
        let mut base = base;
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse.
    ///
    /// Since p is prime, a^(p-1) = 1 for every a ≠ 0, so a^(-1) = a^(p-2).
    pub fn inverse(&self, a: u8) -> Result<u8, FieldError> {
        if self.reduce(a as u32) == 0 {
            return Err(FieldError::DivisionByZero);
        }
        Ok(self.pow(a, self.modulus as u32 - 2))
    }

    pub fn div(&self, a: u8, b: u8) -> Result<u8, FieldError> {
        Ok(self.mul(a, self.inverse(b)?))
    }

    /// Evaluate `coeffs[0] + coeffs[1]*x + ... + coeffs[d]*x^d` with Horner's rule
    pub fn eval_polynomial(&self, coeffs: &[u8], x: u8) -> u8 {
        coeffs
            .iter()
            .rev()
            .fold(0, |acc, &c| self.add(self.mul(acc, x), c))
    }
}

fn is_prime(n: u16) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
