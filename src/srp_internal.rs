//! The SRP6 formulas as used by the client.
//!
//! Every value is **little endian**, both as input and output, and hashes are fed the
//! fixed width little endian byte arrays.
//! `H()` is SHA-1 and `|` is concatenation.

use sha1::{Digest, Sha1};

use crate::error::InvalidPublicKeyError;
use crate::key::{
    PrivateKey, Proof, PublicKey, SKey, Salt, SessionKey, Sha1Hash, SESSION_KEY_LENGTH,
    SHA1_HASH_LENGTH, S_LENGTH,
};
use crate::normalized_string::NormalizedString;
use crate::primes::{Generator, KValue, LargeSafePrime};

/// `H(N) xor H(g)` for the fixed prime and generator. See [`calculate_xor_hash`].
#[cfg(test)]
const PRECALCULATED_XOR_HASH: [u8; SHA1_HASH_LENGTH as usize] = [
    221, 123, 176, 58, 56, 172, 115, 17, 3, 152, 124, 90, 80, 111, 202, 150, 108, 123, 194, 167,
];

/// `x = H( salt | H( upper(username) | : | upper(password) ) )`
pub(crate) fn calculate_x(
    username: &NormalizedString,
    password: &NormalizedString,
    salt: &Salt,
) -> Sha1Hash {
    let p = Sha1::new()
        .chain_update(username.as_ref())
        .chain_update(":")
        .chain_update(password.as_ref())
        .finalize();

    let x = Sha1::new()
        .chain_update(salt.as_le())
        .chain_update(p)
        .finalize();

    Sha1Hash::from_le_bytes(x.into())
}

/// `u = H( A | B )`
pub(crate) fn calculate_u(client_public_key: &PublicKey, server_public_key: &PublicKey) -> Sha1Hash {
    let u = Sha1::new()
        .chain_update(client_public_key.as_le())
        .chain_update(server_public_key.as_le())
        .finalize();

    Sha1Hash::from_le_bytes(u.into())
}

/// `A = g^a % N`
pub(crate) fn calculate_client_public_key(
    client_private_key: &PrivateKey,
    generator: &Generator,
    large_safe_prime: &LargeSafePrime,
) -> Result<PublicKey, InvalidPublicKeyError> {
    let client_public_key = generator.to_bigint().modpow(
        &client_private_key.to_bigint(),
        &large_safe_prime.to_bigint(),
    );

    PublicKey::try_from_bigint(client_public_key, large_safe_prime)
}

/// `S = (B - k * g^x % N)^(a + u * x) % N`
///
/// `k * N` is added to the base so that it never goes negative.
#[allow(non_snake_case)]
pub(crate) fn calculate_client_S(
    server_public_key: &PublicKey,
    x: &Sha1Hash,
    client_private_key: &PrivateKey,
    u: &Sha1Hash,
    generator: &Generator,
    large_safe_prime: &LargeSafePrime,
) -> SKey {
    let k = KValue::bigint();
    let N = large_safe_prime.to_bigint();
    let x = x.to_bigint();

    let g_x = generator.to_bigint().modpow(&x, &N);
    let base = &(&(&server_public_key.to_bigint() + &(&k * &N)) - &(&k * &g_x)) % &N;
    let exponent = &client_private_key.to_bigint() + &(&u.to_bigint() * &x);

    SKey::from(base.modpow(&exponent, &N))
}

/// `K = interleave( H(even bytes of S), H(odd bytes of S) )`
///
/// `S` is always the full 32 bytes, leading zeros included.
#[allow(non_snake_case)]
pub(crate) fn calculate_interleaved(S: &SKey) -> SessionKey {
    let S = S.as_le();

    let mut even = [0_u8; S_LENGTH as usize / 2];
    let mut odd = [0_u8; S_LENGTH as usize / 2];
    for (i, pair) in S.chunks_exact(2).enumerate() {
        even[i] = pair[0];
        odd[i] = pair[1];
    }

    let G = Sha1::new().chain_update(even).finalize();
    let H = Sha1::new().chain_update(odd).finalize();

    let mut result = [0_u8; SESSION_KEY_LENGTH as usize];
    for (i, (g, h)) in G.iter().zip(H.iter()).enumerate() {
        result[i * 2] = *g;
        result[i * 2 + 1] = *h;
    }

    SessionKey::from_le_bytes(result)
}

/// `H(N) xor H(g)`
pub(crate) fn calculate_xor_hash(
    large_safe_prime: &LargeSafePrime,
    generator: &Generator,
) -> Sha1Hash {
    let large_safe_prime_hash = Sha1::new()
        .chain_update(large_safe_prime.as_le_bytes())
        .finalize();

    let g_hash = Sha1::new().chain_update([generator.as_u8()]).finalize();

    let mut xor_hash = [0_u8; SHA1_HASH_LENGTH as usize];
    for (i, (n, g)) in large_safe_prime_hash.iter().zip(g_hash.iter()).enumerate() {
        xor_hash[i] = n ^ g;
    }

    Sha1Hash::from_le_bytes(xor_hash)
}

/// `M1 = H( (H(N) xor H(g)) | H(username) | salt | A | B | K )`
pub(crate) fn calculate_client_proof(
    username: &NormalizedString,
    session_key: &SessionKey,
    client_public_key: &PublicKey,
    server_public_key: &PublicKey,
    salt: &Salt,
    large_safe_prime: &LargeSafePrime,
    generator: &Generator,
) -> Proof {
    let xor_hash = calculate_xor_hash(large_safe_prime, generator);

    let username_hash = Sha1::new().chain_update(username.as_ref()).finalize();

    let out = Sha1::new()
        .chain_update(xor_hash.as_le())
        .chain_update(username_hash)
        .chain_update(salt.as_le())
        .chain_update(client_public_key.as_le())
        .chain_update(server_public_key.as_le())
        .chain_update(session_key.as_le())
        .finalize();

    Proof::from_le_bytes(out.into())
}

/// `M2 = H( A | M1 | K )`
pub(crate) fn calculate_server_proof(
    client_public_key: &PublicKey,
    client_proof: &Proof,
    session_key: &SessionKey,
) -> Proof {
    let s = Sha1::new()
        .chain_update(client_public_key.as_le())
        .chain_update(client_proof.as_le())
        .chain_update(session_key.as_le())
        .finalize();

    Proof::from_le_bytes(s.into())
}

/// Digest for `CMSG_AUTH_SESSION`.
///
/// `H( username | 0_u32 | client_seed | server_seed | K )` with both seeds as little endian `u32`.
pub(crate) fn calculate_world_proof(
    username: &NormalizedString,
    client_seed: u32,
    server_seed: u32,
    session_key: &SessionKey,
) -> Proof {
    let s = Sha1::new()
        .chain_update(username.as_ref())
        .chain_update(0_u32.to_le_bytes())
        .chain_update(client_seed.to_le_bytes())
        .chain_update(server_seed.to_le_bytes())
        .chain_update(session_key.as_le())
        .finalize();

    Proof::from_le_bytes(s.into())
}
