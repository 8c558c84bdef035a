//! The various errors that can happen while authenticating and running a world session.
//!
//! [`ClientError`] is an enum that can represent all the error types, and is what the
//! [`AuthConnection`](crate::auth::AuthConnection) and
//! [`WorldConnection`](crate::world::WorldConnection) return.
//! [`ClientError::kind`] sorts every error into an [`ErrorKind`].
//!
//! Every [`ClientError`] is fatal for the connection that produced it.
//! Unknown opcodes are never errors, they are ignored by the dispatcher.

use crate::key::PROOF_LENGTH;
use std::error::Error;
use std::fmt::{Display, Formatter, Result};

/// Broad category of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The peer sent something that breaks the protocol: malformed lengths,
    /// a wrong prime or generator, a degenerate public key, an out of place message.
    ProtocolViolation,
    /// The server refused the credentials or the session.
    AuthenticationRejected,
    /// The server proof did not match the locally computed one.
    VerificationFailure,
    /// The header cipher has fallen out of step with the server.
    CipherDesync,
    /// The server returned no realm that can be connected to.
    Unavailable,
    /// The caller supplied unusable input, like an invalid username.
    InvalidInput,
    /// The connection already failed and no longer accepts data.
    Closed,
}

/// Enum that covers every error the connections can return.
#[derive(Debug)]
pub enum ClientError {
    /// Username or password is not usable.
    InvalidCredentials(NormalizedStringError),
    /// The logon challenge contained values that can not come from an honest server.
    MalformedHandshake(MalformedHandshakeError),
    /// The login server refused the logon attempt.
    AuthRejected(AuthRejectedError),
    /// Server proof does not match the client calculated one.
    ProofsDoNotMatch(MatchProofsError),
    /// The world server refused the session.
    WorldAuthRejected(WorldAuthError),
    /// A message could not be decoded.
    Message(MessageError),
    /// A world message header could not be framed.
    Frame(FrameError),
    /// Realm list was unusable.
    Realm(RealmError),
    /// A known message arrived in a state where it is not expected.
    UnexpectedMessage {
        /// Opcode of the message.
        opcode: u16,
        /// Name of the state the connection was in.
        state: &'static str,
    },
    /// The connection has already failed.
    ConnectionFailed,
}

impl ClientError {
    /// The [`ErrorKind`] of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ClientError::InvalidCredentials(_) => ErrorKind::InvalidInput,
            ClientError::MalformedHandshake(_)
            | ClientError::Message(_)
            | ClientError::UnexpectedMessage { .. }
            | ClientError::Realm(RealmError::InvalidAddress(_)) => ErrorKind::ProtocolViolation,
            ClientError::AuthRejected(_) | ClientError::WorldAuthRejected(_) => {
                ErrorKind::AuthenticationRejected
            }
            ClientError::ProofsDoNotMatch(_) => ErrorKind::VerificationFailure,
            ClientError::Frame(FrameError::CipherDesync { .. }) => ErrorKind::CipherDesync,
            ClientError::Frame(FrameError::InvalidLength { .. }) => ErrorKind::ProtocolViolation,
            ClientError::Realm(RealmError::NoRealmAvailable) => ErrorKind::Unavailable,
            ClientError::ConnectionFailed => ErrorKind::Closed,
        }
    }

    pub(crate) const fn is_underflow(&self) -> bool {
        matches!(self, ClientError::Message(MessageError::Underflow { .. }))
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::InvalidCredentials(e) => Some(e),
            ClientError::MalformedHandshake(e) => Some(e),
            ClientError::AuthRejected(e) => Some(e),
            ClientError::ProofsDoNotMatch(e) => Some(e),
            ClientError::WorldAuthRejected(e) => Some(e),
            ClientError::Message(e) => Some(e),
            ClientError::Frame(e) => Some(e),
            ClientError::Realm(e) => Some(e),
            ClientError::UnexpectedMessage { .. } | ClientError::ConnectionFailed => None,
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ClientError::InvalidCredentials(e) => write!(f, "Invalid credentials: {}", e),
            ClientError::MalformedHandshake(e) => write!(f, "Malformed handshake: {}", e),
            ClientError::AuthRejected(e) => write!(f, "{}", e),
            ClientError::ProofsDoNotMatch(e) => write!(f, "{}", e),
            ClientError::WorldAuthRejected(e) => write!(f, "{}", e),
            ClientError::Message(e) => write!(f, "Malformed message: {}", e),
            ClientError::Frame(e) => write!(f, "{}", e),
            ClientError::Realm(e) => write!(f, "{}", e),
            ClientError::UnexpectedMessage { opcode, state } => {
                write!(f, "Unexpected message 0x{:02X} in state {}", opcode, state)
            }
            ClientError::ConnectionFailed => write!(f, "Connection has already failed"),
        }
    }
}

impl From<NormalizedStringError> for ClientError {
    fn from(e: NormalizedStringError) -> Self {
        Self::InvalidCredentials(e)
    }
}

impl From<MalformedHandshakeError> for ClientError {
    fn from(e: MalformedHandshakeError) -> Self {
        Self::MalformedHandshake(e)
    }
}

impl From<AuthRejectedError> for ClientError {
    fn from(e: AuthRejectedError) -> Self {
        Self::AuthRejected(e)
    }
}

impl From<MatchProofsError> for ClientError {
    fn from(e: MatchProofsError) -> Self {
        Self::ProofsDoNotMatch(e)
    }
}

impl From<WorldAuthError> for ClientError {
    fn from(e: WorldAuthError) -> Self {
        Self::WorldAuthRejected(e)
    }
}

impl From<MessageError> for ClientError {
    fn from(e: MessageError) -> Self {
        Self::Message(e)
    }
}

impl From<FrameError> for ClientError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl From<RealmError> for ClientError {
    fn from(e: RealmError) -> Self {
        Self::Realm(e)
    }
}

/// Error for when server and client proofs do not match.
///
/// Either the session key differs between client and server or something
/// is tampering with the connection.
#[derive(Debug)]
pub struct MatchProofsError {
    /// Client calculated proof
    pub client_proof: [u8; PROOF_LENGTH as usize],
    /// Server sent proof
    pub server_proof: [u8; PROOF_LENGTH as usize],
}

impl Error for MatchProofsError {}

impl Display for MatchProofsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "Proofs do not match. Client proof: '{:x?}', server proof: '{:x?}'",
            self.client_proof, self.server_proof,
        )
    }
}

/// A public key is invalid either if it equal to 0, or the public key modulus the
/// [large safe prime](crate::LARGE_SAFE_PRIME_LITTLE_ENDIAN) is zero.
#[derive(Debug)]
pub enum InvalidPublicKeyError {
    /// The public key is zero.
    PublicKeyIsZero,
    /// The public key modulus the [large safe prime](crate::LARGE_SAFE_PRIME_LITTLE_ENDIAN) is zero.
    PublicKeyModLargeSafePrimeIsZero,
}

impl Error for InvalidPublicKeyError {}

impl Display for InvalidPublicKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            InvalidPublicKeyError::PublicKeyIsZero => write!(f, "Public key is zero."),
            InvalidPublicKeyError::PublicKeyModLargeSafePrimeIsZero => {
                write!(f, "Public key modulus the large safe prime is zero.")
            }
        }
    }
}

/// The server sent SRP6 parameters that differ from the fixed protocol values.
#[derive(Debug)]
pub enum MalformedHandshakeError {
    /// Received `N` is not the [large safe prime](crate::LARGE_SAFE_PRIME_LITTLE_ENDIAN).
    LargeSafePrimeMismatch,
    /// Received `g` is not the [generator](crate::GENERATOR).
    GeneratorMismatch,
    /// Either public key is zero or a multiple of the large safe prime.
    InvalidPublicKey(InvalidPublicKeyError),
}

impl Error for MalformedHandshakeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MalformedHandshakeError::InvalidPublicKey(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for MalformedHandshakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            MalformedHandshakeError::LargeSafePrimeMismatch => {
                write!(f, "Server large safe prime does not match the protocol prime.")
            }
            MalformedHandshakeError::GeneratorMismatch => {
                write!(f, "Server generator does not match the protocol generator.")
            }
            MalformedHandshakeError::InvalidPublicKey(e) => write!(f, "{}", e),
        }
    }
}

impl From<InvalidPublicKeyError> for MalformedHandshakeError {
    fn from(e: InvalidPublicKeyError) -> Self {
        Self::InvalidPublicKey(e)
    }
}

/// The login server returned a failure result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRejectedError {
    code: u8,
}

impl AuthRejectedError {
    pub(crate) const fn new(code: u8) -> Self {
        Self { code }
    }

    /// Raw result code sent by the server.
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.code
    }

    /// Human readable reason as the game client displays it,
    /// or `None` for codes without a known message.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        use crate::auth::result::*;

        match self.code {
            RESULT_FAIL_BANNED => {
                Some("This account has been closed and is no longer available for use")
            }
            RESULT_FAIL_UNKNOWN_ACCOUNT => Some("The information you have entered is not valid"),
            RESULT_FAIL_VERSION_INVALID | RESULT_FAIL_VERSION_UPDATE => {
                Some("Unable to validate game version")
            }
            RESULT_FAIL_SUSPENDED => Some("This account has been temporarily suspended"),
            RESULT_FAIL_LOCKED_ENFORCED => Some("You have applied a lock to your account"),
            _ => None,
        }
    }
}

impl Error for AuthRejectedError {}

impl Display for AuthRejectedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.reason() {
            Some(reason) => write!(f, "{}", reason),
            None => write!(f, "Unknown authentication failure (0x{:02X})", self.code),
        }
    }
}

/// The world server answered the auth session with something other than success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldAuthError {
    /// Response code from the server.
    pub code: u8,
}

impl Error for WorldAuthError {}

impl Display for WorldAuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "Server authentication response error (0x{:02X})",
            self.code
        )
    }
}

/// Errors from the [`message`](crate::message) codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The buffer ended before the message did.
    Underflow {
        /// Bytes still missing for the read that failed.
        needed: usize,
    },
    /// A string was not terminated or not valid UTF-8.
    InvalidString,
    /// The message has a fixed length and this is not it.
    UnexpectedLength {
        /// Required length in bytes.
        expected: usize,
        /// Received length in bytes.
        actual: usize,
    },
}

impl Error for MessageError {}

impl Display for MessageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            MessageError::Underflow { needed } => {
                write!(f, "message ended {} bytes too early", needed)
            }
            MessageError::InvalidString => write!(f, "invalid string"),
            MessageError::UnexpectedLength { expected, actual } => write!(
                f,
                "message is {} bytes, expected {} bytes",
                actual, expected
            ),
        }
    }
}

/// Errors from reassembling world messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A plaintext header declares a size too small to hold the opcode.
    InvalidLength {
        /// Declared size.
        size: u16,
    },
    /// A decrypted header declares an impossible size.
    ///
    /// The header cipher is out of step with the server and every following
    /// header will be garbage too.
    CipherDesync {
        /// Declared size after decryption.
        size: u16,
    },
}

impl Error for FrameError {}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FrameError::InvalidLength { size } => {
                write!(f, "Invalid world message size: {}", size)
            }
            FrameError::CipherDesync { size } => write!(
                f,
                "Header decryption out of sync, decrypted size was {}",
                size
            ),
        }
    }
}

/// Errors from the realm list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealmError {
    /// Every realm is invalid, offline or full.
    NoRealmAvailable,
    /// The realm address is not in `host:port` form.
    InvalidAddress(String),
}

impl Error for RealmError {}

impl Display for RealmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            RealmError::NoRealmAvailable => write!(f, "No realm available"),
            RealmError::InvalidAddress(address) => {
                write!(f, "Invalid realm address: '{}'", address)
            }
        }
    }
}

/// Error for the [`normalized_string`](`crate::normalized_string`) module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedStringError {
    /// The specific character is not allowed.
    CharacterNotAllowed(char),
    /// The string is too long.
    StringTooLong,
    /// The string is empty.
    StringEmpty,
}

impl Error for NormalizedStringError {}

impl Display for NormalizedStringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            NormalizedStringError::CharacterNotAllowed(c) => {
                write!(f, "Character is not allowed: '{}'", c)
            }
            NormalizedStringError::StringTooLong => {
                write!(f, "String is longer than allowed length.")
            }
            NormalizedStringError::StringEmpty => write!(f, "String is empty."),
        }
    }
}

/// Error for loading a [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid TOML for the configuration.
    Toml(toml::de::Error),
    /// A four character tag is too long or not ASCII.
    InvalidTag {
        /// Name of the setting.
        field: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Toml(e) => Some(e),
            ConfigError::InvalidTag { .. } => None,
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config: {}", e),
            ConfigError::Toml(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::InvalidTag { field, value } => write!(
                f,
                "'{}' is not a valid value for {}, at most 4 ASCII characters are allowed",
                value, field
            ),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}
