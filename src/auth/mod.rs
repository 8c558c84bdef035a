//! Connection to the login server.
//!
//! [`AuthConnection`] performs the SRP6 logon and picks a realm. It does no I/O itself:
//! the driver calls [`AuthConnection::on_connect`] once the transport is up, passes every
//! received chunk to [`AuthConnection::feed`], and sends whatever
//! [`AuthConnection::poll_transmit`] returns.
//!
//! ```text
//! Idle -> ChallengeSent -> ProofSent -> RealmListRequested -> Done
//!   |           |              |                |
//!   |-----------|--------------|----------------|-----------> Failed
//! ```
//!
//! Once [`AuthPhase::Done`] is reached, [`AuthConnection::handoff`] returns everything the
//! [`WorldConnection`](crate::world::WorldConnection) needs and the transport can be closed.
//!
//! ```
//! use wow_client::auth::{AuthConnection, AuthPhase};
//! use wow_client::config::ClientConfig;
//!
//! let mut auth = AuthConnection::new("alice", "password123", ClientConfig::default()).unwrap();
//! auth.on_connect();
//! assert_eq!(auth.phase(), AuthPhase::ChallengeSent);
//!
//! let challenge = auth.poll_transmit().unwrap();
//! assert_eq!(challenge[0], 0x00);
//! ```

use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::mem;
use std::sync::OnceLock;

use bytes::{Buf, BytesMut};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::error::{AuthRejectedError, ClientError};
use crate::event::Event;
use crate::message::MessageReader;
use crate::normalized_string::NormalizedString;
use crate::srp::{SrpClient, SrpClientChallenge, SrpClientUser};
use crate::SESSION_KEY_LENGTH;

use packets::{
    logon_challenge, logon_proof, read_realm_list_response, realm_list_request,
    LogonChallengeResponse, LogonProofResponse, CMD_AUTH_LOGON_CHALLENGE, CMD_AUTH_LOGON_PROOF,
    CMD_REALM_LIST,
};

pub use realm::{
    select_realm, Realm, RealmVersion, REALM_FLAG_FULL, REALM_FLAG_INVALID, REALM_FLAG_OFFLINE,
    REALM_FLAG_SPECIFY_BUILD,
};

mod packets;
mod realm;
pub mod result;

/// Where the auth connection is in the logon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthPhase {
    /// Waiting for the transport.
    Idle,
    /// Logon challenge sent, waiting for `B`, `g`, `N` and the salt.
    ChallengeSent,
    /// Logon proof sent, waiting for `M2`.
    ProofSent,
    /// Authenticated, waiting for the realm list.
    RealmListRequested,
    /// A realm was selected.
    Done,
    /// A fatal error occurred or the transport closed early.
    Failed,
}

/// Everything the world connection needs from the login.
pub struct WorldHandoff {
    realm: Realm,
    host: String,
    port: u16,
    username: NormalizedString,
    session_key: [u8; SESSION_KEY_LENGTH as usize],
}

impl WorldHandoff {
    /// The selected realm.
    pub const fn realm(&self) -> &Realm {
        &self.realm
    }

    /// World server host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// World server port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The uppercased username.
    pub const fn username(&self) -> &NormalizedString {
        &self.username
    }

    /// Session key `K`.
    pub const fn session_key(&self) -> [u8; SESSION_KEY_LENGTH as usize] {
        self.session_key
    }
}

impl Debug for WorldHandoff {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldHandoff")
            .field("realm", &self.realm.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

enum AuthState {
    Idle(SrpClientUser),
    ChallengeSent(SrpClientUser),
    ProofSent(SrpClientChallenge),
    RealmListRequested(SrpClient),
    Done(Option<WorldHandoff>),
    Failed,
}

impl AuthState {
    const fn phase(&self) -> AuthPhase {
        match self {
            AuthState::Idle(_) => AuthPhase::Idle,
            AuthState::ChallengeSent(_) => AuthPhase::ChallengeSent,
            AuthState::ProofSent(_) => AuthPhase::ProofSent,
            AuthState::RealmListRequested(_) => AuthPhase::RealmListRequested,
            AuthState::Done(_) => AuthPhase::Done,
            AuthState::Failed => AuthPhase::Failed,
        }
    }
}

/// State the auth handlers work on.
pub(crate) struct AuthSession {
    config: ClientConfig,
    state: AuthState,
    transmit: VecDeque<Vec<u8>>,
    events: VecDeque<Event>,
}

impl AuthSession {
    fn send(&mut self, opcode: u8, packet: Vec<u8>) {
        debug!("Sending auth message 0x{:02X} ({} bytes)", opcode, packet.len());
        self.transmit.push_back(packet);
    }

    fn unexpected(&self, opcode: u8) -> ClientError {
        ClientError::UnexpectedMessage {
            opcode: opcode.into(),
            state: match self.state.phase() {
                AuthPhase::Idle => "Idle",
                AuthPhase::ChallengeSent => "ChallengeSent",
                AuthPhase::ProofSent => "ProofSent",
                AuthPhase::RealmListRequested => "RealmListRequested",
                AuthPhase::Done => "Done",
                AuthPhase::Failed => "Failed",
            },
        }
    }
}

fn dispatcher() -> &'static Dispatcher<u8, AuthSession> {
    static DISPATCHER: OnceLock<Dispatcher<u8, AuthSession>> = OnceLock::new();

    DISPATCHER.get_or_init(|| {
        let mut d = Dispatcher::new();
        d.register(CMD_AUTH_LOGON_CHALLENGE, handle_logon_challenge)
            .register(CMD_AUTH_LOGON_PROOF, handle_logon_proof)
            .register(CMD_REALM_LIST, handle_realm_list);
        d
    })
}

fn handle_logon_challenge(s: &mut AuthSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let response = LogonChallengeResponse::read(r)?;

    let AuthState::ChallengeSent(_) = s.state else {
        return Err(s.unexpected(CMD_AUTH_LOGON_CHALLENGE));
    };

    let challenge = match response {
        LogonChallengeResponse::Success(c) => c,
        LogonChallengeResponse::Failure { result } => {
            return Err(AuthRejectedError::new(result).into())
        }
    };

    let AuthState::ChallengeSent(user) = mem::replace(&mut s.state, AuthState::Failed) else {
        return Err(s.unexpected(CMD_AUTH_LOGON_CHALLENGE));
    };

    let generator = match challenge.generator.as_slice() {
        [g] => *g,
        _ => return Err(crate::error::MalformedHandshakeError::GeneratorMismatch.into()),
    };

    let challenge = user.into_challenge(
        generator,
        &challenge.large_safe_prime,
        challenge.server_public_key,
        challenge.salt,
    )?;

    s.send(
        CMD_AUTH_LOGON_PROOF,
        logon_proof(challenge.client_public_key(), challenge.client_proof()),
    );
    s.state = AuthState::ProofSent(challenge);
    info!("Logon challenge accepted, proof sent");

    Ok(())
}

fn handle_logon_proof(s: &mut AuthSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let response = LogonProofResponse::read(r)?;

    let AuthState::ProofSent(_) = s.state else {
        return Err(s.unexpected(CMD_AUTH_LOGON_PROOF));
    };

    let server_proof = match response {
        LogonProofResponse::Success { server_proof } => server_proof,
        LogonProofResponse::Failure { result } => {
            return Err(AuthRejectedError::new(result).into())
        }
    };

    let AuthState::ProofSent(challenge) = mem::replace(&mut s.state, AuthState::Failed) else {
        return Err(s.unexpected(CMD_AUTH_LOGON_PROOF));
    };

    let client = challenge.verify_server_proof(server_proof)?;

    s.send(CMD_REALM_LIST, realm_list_request());
    s.state = AuthState::RealmListRequested(client);
    info!("Server proof verified, realm list requested");

    Ok(())
}

fn handle_realm_list(s: &mut AuthSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let realms = read_realm_list_response(r)?;

    let AuthState::RealmListRequested(client) = &s.state else {
        return Err(s.unexpected(CMD_REALM_LIST));
    };

    debug!("Received {} realms", realms.len());
    let realm = select_realm(&realms)?;
    let (host, port) = realm.host_and_port()?;

    let handoff = WorldHandoff {
        realm: realm.clone(),
        host: host.to_string(),
        port,
        username: client.username().clone(),
        session_key: client.session_key(),
    };
    info!("Selected realm '{}' at {}:{}", realm.name, host, port);

    s.events.push_back(Event::RealmSelected(realm.clone()));
    s.events.push_back(Event::AuthClosed);
    s.state = AuthState::Done(Some(handoff));

    Ok(())
}

/// Sans-IO client for the login server.
pub struct AuthConnection {
    session: AuthSession,
    buffer: BytesMut,
}

impl AuthConnection {
    /// Validates the credentials and prepares a fresh SRP6 exchange.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidCredentials`] if the username or password is empty, longer than
    /// 32 bytes or not ASCII.
    pub fn new(username: &str, password: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let username = NormalizedString::new(username)?;
        let password = NormalizedString::new(password)?;

        Ok(Self::from_user(SrpClientUser::new(username, password), config))
    }

    pub(crate) fn from_user(user: SrpClientUser, config: ClientConfig) -> Self {
        Self {
            session: AuthSession {
                config,
                state: AuthState::Idle(user),
                transmit: VecDeque::new(),
                events: VecDeque::new(),
            },
            buffer: BytesMut::new(),
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> AuthPhase {
        self.session.state.phase()
    }

    /// The transport is connected. Queues the logon challenge.
    ///
    /// Does nothing unless the connection is [`AuthPhase::Idle`].
    pub fn on_connect(&mut self) {
        let s = &mut self.session;

        if !matches!(s.state, AuthState::Idle(_)) {
            warn!("Auth connection is already connected");
            return;
        }
        let AuthState::Idle(user) = mem::replace(&mut s.state, AuthState::Failed) else {
            return;
        };

        let packet = logon_challenge(&s.config, user.username());
        s.send(CMD_AUTH_LOGON_CHALLENGE, packet);
        s.state = AuthState::ChallengeSent(user);
        s.events.push_back(Event::AuthOpened);
        info!("Connected to login server, logon challenge sent");
    }

    /// Bytes received from the transport.
    ///
    /// Messages may be split across calls or several may arrive in one call.
    /// Bytes after the realm list are ignored.
    ///
    /// # Errors
    ///
    /// Every error is fatal and moves the connection to [`AuthPhase::Failed`].
    /// Calling again afterwards returns [`ClientError::ConnectionFailed`].
    pub fn feed(&mut self, data: &[u8]) -> Result<(), ClientError> {
        match self.session.state {
            AuthState::Failed => return Err(ClientError::ConnectionFailed),
            AuthState::Done(_) => {
                debug!("Ignoring {} bytes after the realm list", data.len());
                return Ok(());
            }
            _ => {}
        }

        self.buffer.extend_from_slice(data);

        while let Some(&opcode) = self.buffer.first() {
            if let AuthState::Done(_) = self.session.state {
                self.buffer.clear();
                break;
            }

            let mut reader = MessageReader::new(&self.buffer[1..]);
            match dispatcher().dispatch(opcode, &mut self.session, &mut reader) {
                Ok(Dispatch::Handled) => {
                    let consumed = 1 + reader.position();
                    debug!("Received auth message 0x{:02X} ({} bytes)", opcode, consumed);
                    self.buffer.advance(consumed);
                }
                Ok(Dispatch::Ignored) => {
                    warn!(
                        "Ignoring unknown auth message 0x{:02X}, discarding {} buffered bytes",
                        opcode,
                        self.buffer.len()
                    );
                    self.buffer.clear();
                }
                Err(e) if e.is_underflow() => break,
                Err(e) => return Err(self.fail(e)),
            }
        }

        Ok(())
    }

    /// Next message to send, in order.
    pub fn poll_transmit(&mut self) -> Option<Vec<u8>> {
        self.session.transmit.pop_front()
    }

    /// Next notification, in order.
    pub fn poll_event(&mut self) -> Option<Event> {
        self.session.events.pop_front()
    }

    /// The transport closed. Before [`AuthPhase::Done`] this fails the connection.
    pub fn on_close(&mut self) {
        match self.session.state {
            AuthState::Done(_) => {}
            AuthState::Failed => {
                self.session.events.push_back(Event::AuthClosed);
            }
            _ => {
                warn!("Login server closed the connection during the logon");
                self.session.state = AuthState::Failed;
                self.session.events.push_back(Event::AuthClosed);
            }
        }
    }

    /// Takes the result of the logon once [`AuthPhase::Done`] is reached.
    ///
    /// Returns `None` before that and on every call after the first.
    pub fn handoff(&mut self) -> Option<WorldHandoff> {
        match &mut self.session.state {
            AuthState::Done(handoff) => handoff.take(),
            _ => None,
        }
    }

    fn fail(&mut self, e: ClientError) -> ClientError {
        let kind = e.kind();
        error!("Auth connection failed ({:?}): {}", kind, e);

        self.session.events.push_back(Event::AuthError {
            kind,
            message: e.to_string(),
        });
        self.session.state = AuthState::Failed;
        self.buffer.clear();

        e
    }
}
