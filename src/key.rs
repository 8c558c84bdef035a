use rand::{thread_rng, RngCore};

use crate::bigint;
use crate::error::InvalidPublicKeyError;
use crate::primes::{LargeSafePrime, LARGE_SAFE_PRIME_LENGTH};

macro_rules! key_wrapper {
    ($(#[$meta:meta])* $name: ident; $size: expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            key: [u8; $size],
        }

        impl $name {
            #[cfg(test)]
            #[allow(dead_code)]
            pub(crate) fn from_le_hex_str(s: &str) -> Self {
                let key = hex::decode(s).unwrap();
                Self {
                    key: std::convert::TryInto::try_into(key).unwrap(),
                }
            }
        }
    };
}

macro_rules! key_as_le {
    ($name: ident; $size: expr) => {
        impl $name {
            /// Returns the value as little endian bytes.
            ///
            /// The bytes are stored internally as little endian, so this causes no reversal.
            pub const fn as_le(&self) -> &[u8; $size] {
                &self.key
            }
        }
    };
}

macro_rules! key_bigint {
    ($name: ident) => {
        impl $name {
            pub(crate) fn to_bigint(&self) -> bigint::Integer {
                bigint::Integer::from_bytes_le(&self.key)
            }
        }
    };
}

macro_rules! key_randomized {
    ($name: ident; $size: expr) => {
        impl $name {
            pub(crate) fn randomized() -> Self {
                let mut key = [0_u8; $size];
                thread_rng().fill_bytes(&mut key);
                Self { key }
            }
        }
    };
}

macro_rules! key_no_checks_initialization {
    ($name: ident; $size: expr) => {
        impl $name {
            pub(crate) const fn from_le_bytes(key: [u8; $size]) -> Self {
                Self { key }
            }
        }

        impl From<bigint::Integer> for $name {
            fn from(b: bigint::Integer) -> Self {
                Self {
                    key: b.to_padded_array_le(),
                }
            }
        }
    };
}

/// Length of the salt in bytes.
///
/// The server always sends a 32 byte salt field and leading zeros take part in the calculation.
#[doc(alias = "salt")]
pub const SALT_LENGTH: u8 = 32;
key_wrapper!(Salt; SALT_LENGTH as usize);
key_as_le!(Salt; SALT_LENGTH as usize);
key_no_checks_initialization!(Salt; SALT_LENGTH as usize);

/// Length of the client private key `a` in bytes.
#[doc(alias = "a")]
pub const PRIVATE_KEY_LENGTH: u8 = LARGE_SAFE_PRIME_LENGTH;
key_wrapper!(PrivateKey; PRIVATE_KEY_LENGTH as usize);
key_randomized!(PrivateKey; PRIVATE_KEY_LENGTH as usize);
key_bigint!(PrivateKey);
key_no_checks_initialization!(PrivateKey; PRIVATE_KEY_LENGTH as usize);

/// Length in bytes for both client and server public key.
///
/// Always 32 bytes because of the fixed width fields in the
/// [CMD_AUTH_LOGON_PROOF_Client](https://wowdev.wiki/CMD_AUTH_LOGON_PROOF_Client)
/// and
/// [CMD_AUTH_LOGON_CHALLENGE_Server](https://wowdev.wiki/CMD_AUTH_LOGON_CHALLENGE_Server)
/// packets.
#[doc(alias = "A")]
#[doc(alias = "B")]
pub const PUBLIC_KEY_LENGTH: u8 = LARGE_SAFE_PRIME_LENGTH;
key_wrapper!(
    /// Public key for both the client (`A`) and the server (`B`).
    ///
    /// Can only be constructed from a value that is neither zero nor a multiple of
    /// [the large safe prime](crate::LARGE_SAFE_PRIME_LITTLE_ENDIAN).
    /// Twice the prime does not fit in 32 bytes, so the only multiples to check for are
    /// zero and the prime itself.
    PublicKey; PUBLIC_KEY_LENGTH as usize
);
key_as_le!(PublicKey; PUBLIC_KEY_LENGTH as usize);
key_bigint!(PublicKey);

impl PublicKey {
    /// Creates the key from little endian bytes as they are received from the server.
    ///
    /// # Errors
    ///
    /// If the key is zero or exactly equal to the large safe prime.
    pub fn from_le_bytes(key: [u8; PUBLIC_KEY_LENGTH as usize]) -> Result<Self, InvalidPublicKeyError> {
        let key_as_int = bigint::Integer::from_bytes_le(&key);
        Self::check(&key_as_int, &LargeSafePrime::default())?;

        Ok(Self { key })
    }

    pub(crate) fn try_from_bigint(
        b: bigint::Integer,
        large_safe_prime: &LargeSafePrime,
    ) -> Result<Self, InvalidPublicKeyError> {
        Self::check(&b, large_safe_prime)?;

        Ok(Self {
            key: b.to_padded_array_le(),
        })
    }

    fn check(
        b: &bigint::Integer,
        large_safe_prime: &LargeSafePrime,
    ) -> Result<(), InvalidPublicKeyError> {
        if b.is_zero() {
            return Err(InvalidPublicKeyError::PublicKeyIsZero);
        }
        if (b % &large_safe_prime.to_bigint()).is_zero() {
            return Err(InvalidPublicKeyError::PublicKeyModLargeSafePrimeIsZero);
        }

        Ok(())
    }
}

/// A SHA-1 hash is always 20 bytes (160 bits) as specified in [RFC3174](https://tools.ietf.org/html/rfc3174).
pub const SHA1_HASH_LENGTH: u8 = 20;
key_wrapper!(Sha1Hash; SHA1_HASH_LENGTH as usize);
key_as_le!(Sha1Hash; SHA1_HASH_LENGTH as usize);
key_bigint!(Sha1Hash);
key_no_checks_initialization!(Sha1Hash; SHA1_HASH_LENGTH as usize);

/// Length of a proof in bytes.
///
/// Proofs are SHA-1 hashes and share their length.
#[doc(alias = "M1")]
#[doc(alias = "M2")]
pub const PROOF_LENGTH: u8 = SHA1_HASH_LENGTH;
key_wrapper!(Proof; PROOF_LENGTH as usize);
key_as_le!(Proof; PROOF_LENGTH as usize);
key_no_checks_initialization!(Proof; PROOF_LENGTH as usize);

pub(crate) const S_LENGTH: u8 = LARGE_SAFE_PRIME_LENGTH;
key_wrapper!(SKey; S_LENGTH as usize);
key_as_le!(SKey; S_LENGTH as usize);
key_no_checks_initialization!(SKey; S_LENGTH as usize);

/// Size of the session key `K` in bytes.
///
/// Always 40 bytes since it is two interleaved SHA-1 hashes.
#[doc(alias = "K")]
pub const SESSION_KEY_LENGTH: u8 = PROOF_LENGTH * 2;
key_wrapper!(SessionKey; SESSION_KEY_LENGTH as usize);
key_as_le!(SessionKey; SESSION_KEY_LENGTH as usize);
key_no_checks_initialization!(SessionKey; SESSION_KEY_LENGTH as usize);
