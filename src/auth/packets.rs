//! Messages of the login server protocol.
//!
//! Auth messages have no length header: the first byte is the command and the rest is
//! implied by the command and its contents. Readers therefore return
//! [`MessageError::Underflow`] until every field has arrived.
//!
//! See [`CMD_AUTH_LOGON_CHALLENGE_Client`](https://wowdev.wiki/CMD_AUTH_LOGON_CHALLENGE_Client) and
//! the pages linked from there.

use crate::auth::realm::{read_realm_list, Realm};
use crate::auth::result::RESULT_SUCCESS;
use crate::config::{tag_bytes, ClientConfig};
use crate::error::MessageError;
use crate::message::{MessageReader, MessageWriter};
use crate::normalized_string::NormalizedString;
use crate::{
    GENERATOR_LENGTH, LARGE_SAFE_PRIME_LENGTH, PROOF_LENGTH, PUBLIC_KEY_LENGTH, SALT_LENGTH,
};

pub(crate) const CMD_AUTH_LOGON_CHALLENGE: u8 = 0x00;
pub(crate) const CMD_AUTH_LOGON_PROOF: u8 = 0x01;
pub(crate) const CMD_REALM_LIST: u8 = 0x10;

/// Protocol version byte of the logon challenge.
const PROTOCOL_VERSION: u8 = 8;

/// Sent in place of the client file checksum, which servers do not verify.
const CRC_HASH: [u8; 20] = [
    0x48, 0x47, 0x2e, 0x72, 0x62, 0x07, 0x3c, 0x3e, 0x07, 0x62, 0x79, 0x07, 0x53, 0x69, 0x61, 0x72,
    0x6b, 0x6f, 0x77, 0x79,
];

const SECURITY_FLAG_PIN: u8 = 0x01;
const SECURITY_FLAG_MATRIX_CARD: u8 = 0x02;
const SECURITY_FLAG_AUTHENTICATOR: u8 = 0x04;

/// Bytes between the size field and the username.
const LOGON_CHALLENGE_FIXED_SIZE: u16 = 30;

pub(crate) fn logon_challenge(config: &ClientConfig, username: &NormalizedString) -> Vec<u8> {
    // The username is at most 32 bytes, so its length always fits in a u8.
    let name_length = username.len() as u8;

    let mut w = MessageWriter::with_capacity(34 + username.len());
    w.write_u8(CMD_AUTH_LOGON_CHALLENGE);
    w.write_u8(PROTOCOL_VERSION);
    w.write_u16(LOGON_CHALLENGE_FIXED_SIZE + u16::from(name_length));
    w.write_bytes(&tag_bytes(&config.game_name));
    w.write_bytes(&config.version);
    w.write_u16(config.build);
    w.write_bytes(&tag_bytes(&config.platform));
    w.write_bytes(&tag_bytes(&config.os));
    w.write_bytes(&tag_bytes(&config.locale));
    w.write_u32(config.timezone_bias);
    w.write_u32(config.ip);
    w.write_u8(name_length);
    w.write_bytes(username.as_ref().as_bytes());

    w.into_vec()
}

pub(crate) fn logon_proof(
    client_public_key: &[u8; PUBLIC_KEY_LENGTH as usize],
    client_proof: &[u8; PROOF_LENGTH as usize],
) -> Vec<u8> {
    let mut w = MessageWriter::with_capacity(75);
    w.write_u8(CMD_AUTH_LOGON_PROOF);
    w.write_bytes(client_public_key);
    w.write_bytes(client_proof);
    w.write_bytes(&CRC_HASH);
    w.write_u8(0); // number of keys
    w.write_u8(0); // security flags

    w.into_vec()
}

pub(crate) fn realm_list_request() -> Vec<u8> {
    let mut w = MessageWriter::with_capacity(5);
    w.write_u8(CMD_REALM_LIST);
    w.write_u32(0);

    w.into_vec()
}

/// Values needed to continue the SRP6 exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServerChallenge {
    pub server_public_key: [u8; PUBLIC_KEY_LENGTH as usize],
    pub generator: Vec<u8>,
    pub large_safe_prime: Vec<u8>,
    pub salt: [u8; SALT_LENGTH as usize],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogonChallengeResponse {
    Success(ServerChallenge),
    Failure { result: u8 },
}

impl LogonChallengeResponse {
    /// Reads everything after the command byte.
    pub(crate) fn read(r: &mut MessageReader) -> Result<Self, MessageError> {
        let _protocol_version = r.read_u8()?;
        let result = r.read_u8()?;

        if result != RESULT_SUCCESS {
            return Ok(Self::Failure { result });
        }

        let server_public_key = r.read_array()?;

        let generator_length = r.read_u8()?;
        expect_length(generator_length, GENERATOR_LENGTH)?;
        let generator = r.read_bytes(generator_length.into())?.to_vec();

        let large_safe_prime_length = r.read_u8()?;
        expect_length(large_safe_prime_length, LARGE_SAFE_PRIME_LENGTH)?;
        let large_safe_prime = r.read_bytes(large_safe_prime_length.into())?.to_vec();

        let salt = r.read_array()?;
        let _crc_salt = r.read_array::<16>()?;

        let security_flags = r.read_u8()?;
        if security_flags & SECURITY_FLAG_PIN != 0 {
            // Grid seed and PIN salt
            r.skip(4 + 16)?;
        }
        if security_flags & SECURITY_FLAG_MATRIX_CARD != 0 {
            // Width, height, digit count, challenge count and seed
            r.skip(1 + 1 + 1 + 1 + 8)?;
        }
        if security_flags & SECURITY_FLAG_AUTHENTICATOR != 0 {
            r.skip(1)?;
        }

        Ok(Self::Success(ServerChallenge {
            server_public_key,
            generator,
            large_safe_prime,
            salt,
        }))
    }
}

/// Length prefixes are checked before reading so a wrong length fails at once
/// instead of waiting for bytes that never arrive.
const fn expect_length(actual: u8, expected: u8) -> Result<(), MessageError> {
    if actual == expected {
        Ok(())
    } else {
        Err(MessageError::UnexpectedLength {
            expected: expected as usize,
            actual: actual as usize,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogonProofResponse {
    Success {
        server_proof: [u8; PROOF_LENGTH as usize],
    },
    Failure {
        result: u8,
    },
}

impl LogonProofResponse {
    /// Reads everything after the command byte.
    ///
    /// Servers pad failures differently, only the result is read since the
    /// connection is over either way.
    pub(crate) fn read(r: &mut MessageReader) -> Result<Self, MessageError> {
        let result = r.read_u8()?;
        if result != RESULT_SUCCESS {
            return Ok(Self::Failure { result });
        }

        let server_proof = r.read_array()?;
        let _account_flags = r.read_u32()?;
        let _survey_id = r.read_u32()?;
        let _login_flags = r.read_u16()?;

        Ok(Self::Success { server_proof })
    }
}

/// Reads everything after the command byte.
///
/// The size field covers the realm list body, so trailing bytes are skipped
/// even when the realm records end earlier. Records running past the body are
/// [`MessageError::UnexpectedLength`], not an underflow, since no further bytes belong
/// to this message.
pub(crate) fn read_realm_list_response(r: &mut MessageReader) -> Result<Vec<Realm>, MessageError> {
    let size = r.read_u16()?;
    let body = r.read_bytes(size.into())?;

    read_realm_list(&mut MessageReader::new(body)).map_err(|e| match e {
        MessageError::Underflow { needed } => MessageError::UnexpectedLength {
            expected: usize::from(size) + needed,
            actual: size.into(),
        },
        e => e,
    })
}
