//! Coefficient sources
//!
//! Share generation draws its random polynomial coefficients through
//! [`CoefficientSource`] instead of reaching for ambient global randomness.

use pixelshare_field::PrimeField;
use rand::{CryptoRng, RngCore};

/// Supplies uniformly distributed field elements
pub trait CoefficientSource {
    /// Next element in `[0, p)`
    fn next_field_element(&mut self, field: &PrimeField) -> u8;
}

/// Any cryptographically secure generator is a coefficient source.
///
/// Bytes at or above the largest multiple of p below 256 are rejected, so
/// every element of the field is equally likely.
impl<R: RngCore + CryptoRng + ?Sized> CoefficientSource for R {
    fn next_field_element(&mut self, field: &PrimeField) -> u8 {
        let p = field.modulus() as u32;
        let zone = 256 - 256 % p;

        loop {
            let mut byte = [0u8; 1];
            self.fill_bytes(&mut byte);
            if (byte[0] as u32) < zone {
                return field.reduce(byte[0] as u32);
            }
        }
    }
}

/// Replays a fixed list of coefficients, cycling when exhausted.
///
/// Not random. Useful for pinning a polynomial in tests and fixtures.
#[derive(Debug, Clone)]
pub struct FixedCoefficients {
    values: Vec<u8>,
    next: usize,
}

impl FixedCoefficients {
    pub fn new(values: Vec<u8>) -> Self {
        Self { values, next: 0 }
    }
}

impl CoefficientSource for FixedCoefficients {
    fn next_field_element(&mut self, field: &PrimeField) -> u8 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        field.reduce(value as u32)
    }
}
