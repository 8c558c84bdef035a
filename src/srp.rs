//! The client side of the SRP6 logon handshake.
//!
//! All arrays are **little endian**.
//!
//! # Usage
//!
//! The [Typestate](https://yoric.github.io/post/rust-typestate/) pattern is used
//! in order to prevent incorrect use.
//! Whenever the next step of computation takes place a function taking `self` is called,
//! consuming the old object and returning the new one.
//!
//! ```text
//! SrpClientUser -> SrpClientChallenge -> SrpClient
//! ```
//!
//! When reaching [`SrpClient`] the client has proven that it knows the password and the server
//! has proven that it knows the verifier. The session key is then used for the
//! [`HeaderCrypto`](crate::header_crypto::HeaderCrypto) of the world connection.
//!
//! ```
//! use wow_client::normalized_string::NormalizedString;
//! use wow_client::srp::SrpClientUser;
//!
//! let username = NormalizedString::new("alice").unwrap();
//! let password = NormalizedString::new("password123").unwrap();
//! let client = SrpClientUser::new(username, password);
//! // Send the logon challenge, wait for the server response, then call `into_challenge`.
//! # let _ = client;
//! ```
//!
//! # Limitations
//!
//! * The [large safe prime](crate::LARGE_SAFE_PRIME_LITTLE_ENDIAN) and
//! [generator](crate::GENERATOR) are fixed. The packet fields are variable sized, but a server
//! sending anything else is treated as malformed.
//! * Only [`NormalizedString`] credentials are accepted.

use crate::error::{MalformedHandshakeError, MatchProofsError};
use crate::key::{
    PrivateKey, Proof, PublicKey, Salt, SessionKey, PROOF_LENGTH, PUBLIC_KEY_LENGTH, SALT_LENGTH,
    SESSION_KEY_LENGTH,
};
#[cfg(test)]
use crate::key::PRIVATE_KEY_LENGTH;
use crate::normalized_string::NormalizedString;
use crate::primes::{Generator, LargeSafePrime};
use crate::srp_internal::{
    calculate_client_S, calculate_client_proof, calculate_client_public_key,
    calculate_interleaved, calculate_server_proof, calculate_u, calculate_x,
};

/// Final part of the state machine, previous was [`SrpClientChallenge`].
///
/// Both sides have proven that they share the same session key.
pub struct SrpClient {
    username: NormalizedString,
    session_key: SessionKey,
}

impl SrpClient {
    /// Called `K` in [RFC2945](https://tools.ietf.org/html/rfc2945).
    ///
    /// Always [40 bytes](SESSION_KEY_LENGTH) since it is two interleaved SHA-1 hashes.
    #[doc(alias = "K")]
    pub const fn session_key(&self) -> [u8; SESSION_KEY_LENGTH as usize] {
        *self.session_key.as_le()
    }

    /// The uppercased username the session belongs to.
    pub const fn username(&self) -> &NormalizedString {
        &self.username
    }
}

/// Second step of the client. First is [`SrpClientUser`], next is [`SrpClient`].
///
/// The client public key and proof are sent in the logon proof request
/// before the server proof is available.
pub struct SrpClientChallenge {
    username: NormalizedString,
    client_proof: Proof,
    client_public_key: PublicKey,

    session_key: SessionKey,
}

impl SrpClientChallenge {
    /// Called `M1` in most literature.
    #[doc(alias = "M")]
    #[doc(alias = "M1")]
    pub const fn client_proof(&self) -> &[u8; PROOF_LENGTH as usize] {
        self.client_proof.as_le()
    }

    /// Called `A` in [RFC2945](https://tools.ietf.org/html/rfc2945).
    #[doc(alias = "A")]
    pub const fn client_public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH as usize] {
        self.client_public_key.as_le()
    }

    /// Verifies that the server proof `M2` is `H( A | M1 | K )`.
    ///
    /// # Errors
    ///
    /// If the proofs differ. The server either does not know the verifier or the
    /// exchange has been tampered with.
    #[doc(alias = "M2")]
    pub fn verify_server_proof(
        self,
        server_proof: [u8; PROOF_LENGTH as usize],
    ) -> Result<SrpClient, MatchProofsError> {
        let client_server_proof = calculate_server_proof(
            &self.client_public_key,
            &self.client_proof,
            &self.session_key,
        );

        let server_proof = Proof::from_le_bytes(server_proof);
        if server_proof != client_server_proof {
            return Err(MatchProofsError {
                client_proof: *client_server_proof.as_le(),
                server_proof: *server_proof.as_le(),
            });
        }

        Ok(SrpClient {
            username: self.username,
            session_key: self.session_key,
        })
    }
}

/// Starting point of the client. Next step is [`SrpClientChallenge`].
pub struct SrpClientUser {
    username: NormalizedString,
    password: NormalizedString,
    client_private_key: PrivateKey,
}

impl SrpClientUser {
    /// Creates a new [`SrpClientUser`] with a random private key `a`.
    pub fn new(username: NormalizedString, password: NormalizedString) -> Self {
        Self {
            username,
            password,
            client_private_key: PrivateKey::randomized(),
        }
    }

    #[cfg(test)]
    pub(crate) const fn with_specific_private_key(
        username: NormalizedString,
        password: NormalizedString,
        client_private_key: [u8; PRIVATE_KEY_LENGTH as usize],
    ) -> Self {
        Self {
            username,
            password,
            client_private_key: PrivateKey::from_le_bytes(client_private_key),
        }
    }

    /// The uppercased username, as sent in the logon challenge.
    pub const fn username(&self) -> &NormalizedString {
        &self.username
    }

    /// Takes the values from the logon challenge response and computes `A`, `K` and `M1`.
    ///
    /// # Errors
    ///
    /// * The large safe prime or generator differ from the fixed protocol values.
    /// * The server public key `B` is zero or a multiple of the large safe prime.
    /// * The computed client public key `A` is invalid, which only happens with a broken RNG.
    pub fn into_challenge(
        self,
        generator: u8,
        large_safe_prime: &[u8],
        server_public_key: [u8; PUBLIC_KEY_LENGTH as usize],
        salt: [u8; SALT_LENGTH as usize],
    ) -> Result<SrpClientChallenge, MalformedHandshakeError> {
        let default_prime = LargeSafePrime::default();
        if large_safe_prime != default_prime.as_le_bytes().as_slice() {
            return Err(MalformedHandshakeError::LargeSafePrimeMismatch);
        }

        let default_generator = Generator::default();
        if generator != default_generator.as_u8() {
            return Err(MalformedHandshakeError::GeneratorMismatch);
        }

        let server_public_key = PublicKey::from_le_bytes(server_public_key)?;
        let salt = Salt::from_le_bytes(salt);

        let client_public_key = calculate_client_public_key(
            &self.client_private_key,
            &default_generator,
            &default_prime,
        )?;

        let x = calculate_x(&self.username, &self.password, &salt);
        let u = calculate_u(&client_public_key, &server_public_key);

        #[allow(non_snake_case)]
        let S = calculate_client_S(
            &server_public_key,
            &x,
            &self.client_private_key,
            &u,
            &default_generator,
            &default_prime,
        );

        let session_key = calculate_interleaved(&S);

        let client_proof = calculate_client_proof(
            &self.username,
            &session_key,
            &client_public_key,
            &server_public_key,
            &salt,
            &default_prime,
            &default_generator,
        );

        Ok(SrpClientChallenge {
            username: self.username,
            client_proof,
            client_public_key,
            session_key,
        })
    }
}
