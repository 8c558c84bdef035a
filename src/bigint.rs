use std::ops;

#[cfg(all(feature = "srp-default-math", not(feature = "srp-fast-math")))]
use num_bigint::{BigInt as Inner, Sign};
#[cfg(feature = "srp-fast-math")]
use rug::integer::Order;
#[cfg(feature = "srp-fast-math")]
use rug::Integer as Inner;

#[cfg(not(any(feature = "srp-fast-math", feature = "srp-default-math")))]
compile_error!("Either the 'srp-fast-math' feature or the 'srp-default-math' feature must be enabled.\n\n The features exclusively select an arbitrary integer library.\n Use 'srp-default-math' for pure Rust compilation but slow execution speed. Use 'srp-fast-math' for exceptional execution speed but external dependencies.");

/// Non-negative arbitrary precision integer.
///
/// Every value entering or leaving this type is a **little endian** byte array,
/// matching the layout of the login packets.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Integer {
    value: Inner,
}

impl Integer {
    #[cfg(all(feature = "srp-default-math", not(feature = "srp-fast-math")))]
    pub fn from_bytes_le(v: &[u8]) -> Self {
        Self::from_inner(Inner::from_bytes_le(Sign::Plus, v))
    }
    #[cfg(feature = "srp-fast-math")]
    pub fn from_bytes_le(v: &[u8]) -> Self {
        Self::from_inner(Inner::from_digits(v, Order::LsfLe))
    }

    /// Little endian bytes without padding. Zero is returned as an empty vector
    /// by `rug` and as `[0]` by `num-bigint`, callers always pad afterwards.
    #[cfg(all(feature = "srp-default-math", not(feature = "srp-fast-math")))]
    pub fn to_bytes_le(&self) -> Vec<u8> {
        self.value.to_bytes_le().1
    }
    #[cfg(feature = "srp-fast-math")]
    pub fn to_bytes_le(&self) -> Vec<u8> {
        self.value.to_digits(Order::LsfLe)
    }

    /// `self^exponent % modulus`, always in `[0, modulus)`.
    #[cfg(all(feature = "srp-default-math", not(feature = "srp-fast-math")))]
    pub fn modpow(&self, exponent: &Self, modulus: &Self) -> Self {
        Self::from_inner(self.value.modpow(&exponent.value, &modulus.value))
    }
    #[cfg(feature = "srp-fast-math")]
    pub fn modpow(&self, exponent: &Self, modulus: &Self) -> Self {
        // Panics on a non-positive exponent, which the SRP6 exponents never are.
        let value = self
            .value
            .clone()
            .secure_pow_mod(&exponent.value, &modulus.value);
        Self::from_inner(value)
    }

    /// Zero padded little endian array of exactly `N` bytes.
    ///
    /// Values wider than `N` bytes are truncated to their `N` least significant bytes,
    /// which never happens for values reduced modulo the 32 byte prime.
    pub fn to_padded_array_le<const N: usize>(&self) -> [u8; N] {
        let value = self.to_bytes_le();
        let len = value.len().min(N);

        let mut array = [0_u8; N];
        array[..len].copy_from_slice(&value[..len]);

        array
    }

    pub fn is_zero(&self) -> bool {
        self.value == Inner::from(0_u8)
    }

    const fn from_inner(value: Inner) -> Self {
        Self { value }
    }
}

impl From<u8> for Integer {
    fn from(v: u8) -> Self {
        Self::from_inner(Inner::from(v))
    }
}

impl ops::Mul<&Integer> for &Integer {
    type Output = Integer;

    fn mul(self, rhs: &Integer) -> Self::Output {
        Integer::from_inner(Inner::from(&self.value * &rhs.value))
    }
}

impl ops::Add<&Integer> for &Integer {
    type Output = Integer;

    fn add(self, rhs: &Integer) -> Self::Output {
        Integer::from_inner(Inner::from(&self.value + &rhs.value))
    }
}

impl ops::Sub<&Integer> for &Integer {
    type Output = Integer;

    fn sub(self, rhs: &Integer) -> Self::Output {
        Integer::from_inner(Inner::from(&self.value - &rhs.value))
    }
}

impl ops::Rem<&Integer> for &Integer {
    type Output = Integer;

    fn rem(self, rhs: &Integer) -> Self::Output {
        Integer::from_inner(Inner::from(&self.value % &rhs.value))
    }
}

#[cfg(test)]
mod test {
    use crate::bigint::Integer;

    #[test]
    fn little_endian_round_trip_is_padded() {
        let i = Integer::from_bytes_le(&[0xEF, 0xBE, 0xAD, 0xDE]);
        let padded: [u8; 8] = i.to_padded_array_le();
        assert_eq!(padded, [0xEF, 0xBE, 0xAD, 0xDE, 0, 0, 0, 0]);
    }

    #[test]
    fn zero_is_zero() {
        assert!(Integer::from(0).is_zero());
        assert!(Integer::from_bytes_le(&[0, 0, 0]).is_zero());
        assert!(!Integer::from(7).is_zero());

        let padded: [u8; 4] = Integer::from(0).to_padded_array_le();
        assert_eq!(padded, [0; 4]);
    }

    #[test]
    fn modpow_small_values() {
        // 7^3 % 10 = 343 % 10 = 3
        let r = Integer::from(7).modpow(&Integer::from(3), &Integer::from(10));
        assert!(r == Integer::from(3));
    }
}
