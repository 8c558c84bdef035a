//! Connection to the world server.
//!
//! [`WorldConnection`] answers the server seed with the session proof, turns on the
//! [header cipher](crate::header_crypto) and then routes every message through a static
//! opcode table. Like [`AuthConnection`](crate::auth::AuthConnection) it does no I/O.
//!
//! ```text
//! Idle -> AwaitingChallenge -> AwaitingResponse -> CharacterSelect <-> LoggingIn -> InWorld
//!                                                        ^                            |
//!                                                        '----------------------------'
//! ```
//!
//! Every phase can end in `Failed` after a fatal error or `Closed` after the transport closes.

use std::collections::{HashMap, HashSet, VecDeque};

use bytes::BufMut;
use tracing::{debug, error, info, trace, warn};

use crate::auth::WorldHandoff;
use crate::config::ClientConfig;
use crate::dispatch::Dispatch;
use crate::error::{ClientError, ErrorKind};
use crate::event::{Character, Event};
use crate::header_crypto::{HeaderCrypto, CLIENT_HEADER_LENGTH};
use crate::message::MessageReader;
use crate::normalized_string::NormalizedString;
use crate::SESSION_KEY_LENGTH;

use frame::FrameReassembler;
use handlers::dispatcher;
use opcodes::{server_opcode_name, CMSG_LOGOUT_REQUEST, CMSG_PLAYER_LOGIN};

pub use frame::Frame;
pub use handlers::AUTH_OK;

pub mod frame;
mod handlers;
pub mod opcodes;
mod packets;

/// Size field plus opcode field of a client header; the size field counts the opcode.
const CLIENT_OPCODE_LENGTH: usize = 4;

/// Where the world connection is in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldPhase {
    /// Waiting for the transport.
    Idle,
    /// Waiting for `SMSG_AUTH_CHALLENGE`.
    AwaitingChallenge,
    /// Session proof sent, waiting for `SMSG_AUTH_RESPONSE`.
    AwaitingResponse,
    /// Authenticated, no character in the world.
    CharacterSelect,
    /// `CMSG_PLAYER_LOGIN` sent.
    LoggingIn,
    /// A character is in the world.
    InWorld,
    /// A fatal error occurred.
    Failed,
    /// The transport closed.
    Closed,
}

impl WorldPhase {
    const fn name(self) -> &'static str {
        match self {
            WorldPhase::Idle => "Idle",
            WorldPhase::AwaitingChallenge => "AwaitingChallenge",
            WorldPhase::AwaitingResponse => "AwaitingResponse",
            WorldPhase::CharacterSelect => "CharacterSelect",
            WorldPhase::LoggingIn => "LoggingIn",
            WorldPhase::InWorld => "InWorld",
            WorldPhase::Failed => "Failed",
            WorldPhase::Closed => "Closed",
        }
    }
}

/// State the world handlers work on.
pub(crate) struct WorldSession {
    username: NormalizedString,
    session_key: [u8; SESSION_KEY_LENGTH as usize],
    config: ClientConfig,
    phase: WorldPhase,
    crypto: Option<HeaderCrypto>,
    transmit: VecDeque<Vec<u8>>,
    events: VecDeque<Event>,
    characters: Vec<Character>,
    active_character: Option<u64>,
    names: HashMap<u64, String>,
    pending_names: HashSet<u64>,
}

impl WorldSession {
    /// Adds the header, encrypted once the cipher is active, and queues the message.
    fn send(&mut self, opcode: u32, body: &[u8]) {
        // Client bodies are all far below u16::MAX.
        let size = (body.len() + CLIENT_OPCODE_LENGTH) as u16;

        let header = match &mut self.crypto {
            Some(crypto) => crypto.encrypt_client_header(size, opcode),
            None => {
                let mut header = [0_u8; CLIENT_HEADER_LENGTH as usize];
                header[..2].copy_from_slice(&size.to_be_bytes());
                header[2..].copy_from_slice(&opcode.to_le_bytes());
                header
            }
        };
        trace!("Client header {:02x?}", header);

        let mut packet = Vec::with_capacity(header.len() + body.len());
        packet.put_slice(&header);
        packet.put_slice(body);

        debug!("Sending world message 0x{:03X} ({} bytes)", opcode, body.len());
        self.transmit.push_back(packet);
        self.events.push_back(Event::PacketSent {
            opcode,
            size: size - CLIENT_OPCODE_LENGTH as u16,
        });
    }

    fn unexpected(&self, opcode: u16) -> ClientError {
        ClientError::UnexpectedMessage {
            opcode,
            state: self.phase.name(),
        }
    }
}

/// Sans-IO client for the world server.
pub struct WorldConnection {
    session: WorldSession,
    frames: FrameReassembler,
}

impl WorldConnection {
    /// Creates a connection for `username` with the session key from the login.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidCredentials`] if the username is not usable.
    pub fn new(
        username: &str,
        session_key: [u8; SESSION_KEY_LENGTH as usize],
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let username = NormalizedString::new(username)?;
        Ok(Self::with_username(username, session_key, config))
    }

    /// Creates a connection from a finished [`AuthConnection`](crate::auth::AuthConnection).
    pub fn from_handoff(handoff: &WorldHandoff, config: ClientConfig) -> Self {
        Self::with_username(handoff.username().clone(), handoff.session_key(), config)
    }

    fn with_username(
        username: NormalizedString,
        session_key: [u8; SESSION_KEY_LENGTH as usize],
        config: ClientConfig,
    ) -> Self {
        Self {
            session: WorldSession {
                username,
                session_key,
                config,
                phase: WorldPhase::Idle,
                crypto: None,
                transmit: VecDeque::new(),
                events: VecDeque::new(),
                characters: Vec::new(),
                active_character: None,
                names: HashMap::new(),
                pending_names: HashSet::new(),
            },
            frames: FrameReassembler::new(),
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> WorldPhase {
        self.session.phase
    }

    /// Characters from the last `SMSG_CHAR_ENUM`.
    pub fn characters(&self) -> &[Character] {
        &self.session.characters
    }

    /// The character that is logging in or in the world.
    pub fn active_character(&self) -> Option<&Character> {
        let guid = self.session.active_character?;
        self.session.characters.iter().find(|c| c.guid == guid)
    }

    /// Name of `guid` if it has been resolved.
    pub fn name_of(&self, guid: u64) -> Option<&str> {
        self.session.names.get(&guid).map(String::as_str)
    }

    /// Whether headers are encrypted.
    pub const fn is_encrypted(&self) -> bool {
        self.session.crypto.is_some()
    }

    /// The transport is connected. The server speaks first.
    pub fn on_connect(&mut self) {
        if self.session.phase != WorldPhase::Idle {
            warn!("World connection is already connected");
            return;
        }

        self.session.phase = WorldPhase::AwaitingChallenge;
        self.session.events.push_back(Event::WorldOpened);
        info!("Connected to world server as {}", self.session.username);
    }

    /// Bytes received from the transport.
    ///
    /// # Errors
    ///
    /// Every error is fatal and moves the connection to [`WorldPhase::Failed`].
    /// After that, and after the transport closed, [`ClientError::ConnectionFailed`] is returned.
    pub fn feed(&mut self, data: &[u8]) -> Result<(), ClientError> {
        if matches!(self.session.phase, WorldPhase::Failed | WorldPhase::Closed) {
            return Err(ClientError::ConnectionFailed);
        }

        self.frames.extend(data);

        loop {
            let decrypter = self.session.crypto.as_mut().map(HeaderCrypto::decrypter);
            let frame = match self.frames.next_frame(decrypter) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => return Err(self.fail(e.into())),
            };

            debug!(
                "Received world message 0x{:03X} {} ({} bytes)",
                frame.opcode,
                server_opcode_name(frame.opcode).unwrap_or("unhandled"),
                frame.body.len()
            );
            self.session.events.push_back(Event::PacketReceived {
                opcode: frame.opcode,
                size: frame.body.len() as u16,
            });

            let mut reader = MessageReader::new(&frame.body);
            match dispatcher().dispatch(frame.opcode, &mut self.session, &mut reader) {
                Ok(Dispatch::Handled) => {}
                Ok(Dispatch::Ignored) => trace!("No handler for 0x{:03X}", frame.opcode),
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

    /// The transport closed.
    pub fn on_close(&mut self) {
        if self.session.phase == WorldPhase::Closed {
            return;
        }

        if self.session.phase != WorldPhase::Failed {
            info!("World connection closed");
        }
        self.session.phase = WorldPhase::Closed;
        self.session.events.push_back(Event::WorldClosed);
    }

    /// Enters the world with the listed character called `name`.
    ///
    /// Returns `false` if no such character was listed or the connection is not at the
    /// character selection.
    pub fn login(&mut self, name: &str) -> bool {
        if self.session.phase != WorldPhase::CharacterSelect {
            warn!("Can not log in while {}", self.session.phase.name());
            return false;
        }

        let Some(guid) = self
            .session
            .characters
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.guid)
        else {
            return false;
        };

        info!("Logging in as {}", name);
        self.session.active_character = Some(guid);
        self.session.phase = WorldPhase::LoggingIn;
        self.session
            .send(CMSG_PLAYER_LOGIN, &packets::guid_only(guid));

        true
    }

    /// Asks to leave the world. Returns `false` if no character is in the world.
    pub fn logout(&mut self) -> bool {
        if self.session.phase != WorldPhase::InWorld {
            return false;
        }

        self.session.send(CMSG_LOGOUT_REQUEST, &[]);
        true
    }

    fn fail(&mut self, e: ClientError) -> ClientError {
        let kind = e.kind();
        error!("World connection failed ({:?}): {}", kind, e);

        if kind == ErrorKind::AuthenticationRejected {
            self.session.events.push_back(Event::AuthError {
                kind,
                message: e.to_string(),
            });
            self.session.events.push_back(Event::LoginFailed);
        }

        self.session.phase = WorldPhase::Failed;
        e
    }
}

impl std::fmt::Debug for WorldConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldConnection")
            .field("username", &self.session.username)
            .field("phase", &self.session.phase)
            .field("encrypted", &self.is_encrypted())
            .field("buffered", &self.frames.buffered())
            .finish_non_exhaustive()
    }
}
