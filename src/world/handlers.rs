//! Handlers for the server opcodes the client understands.

use std::sync::OnceLock;

use rand::random;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::error::{ClientError, WorldAuthError};
use crate::event::Event;
use crate::header_crypto::HeaderCrypto;
use crate::key::SessionKey;
use crate::message::MessageReader;
use crate::srp_internal::calculate_world_proof;
use crate::world::opcodes::*;
use crate::world::packets::{
    auth_session, contact_list_request, guid_only, read_channel_notify, read_char_enum,
    read_chat_message, read_contact_list, read_guild_roster, read_motd, read_name_query_response,
};
use crate::world::{WorldPhase, WorldSession};

/// `SMSG_AUTH_RESPONSE` code for an accepted session.
pub const AUTH_OK: u8 = 0x0C;

const AUTH_CHALLENGE_LENGTH: usize = 4;

pub(crate) fn dispatcher() -> &'static Dispatcher<u16, WorldSession> {
    static DISPATCHER: OnceLock<Dispatcher<u16, WorldSession>> = OnceLock::new();

    DISPATCHER.get_or_init(|| {
        let mut d = Dispatcher::new();
        d.register(SMSG_AUTH_CHALLENGE, handle_auth_challenge)
            .register(SMSG_AUTH_RESPONSE, handle_auth_response)
            .register(SMSG_CHAR_ENUM, handle_char_enum)
            .register(SMSG_CHARACTER_LOGIN_FAILED, handle_character_login_failed)
            .register(SMSG_LOGIN_VERIFY_WORLD, handle_login_verify_world)
            .register(SMSG_LOGOUT_COMPLETE, handle_logout_complete)
            .register(SMSG_MESSAGECHAT, handle_messagechat)
            .register(SMSG_NAME_QUERY_RESPONSE, handle_name_query_response)
            .register(SMSG_CONTACT_LIST, handle_contact_list)
            .register(SMSG_FRIEND_STATUS, handle_friend_status)
            .register(SMSG_GUILD_ROSTER, handle_guild_roster)
            .register(SMSG_MOTD, handle_motd)
            .register(SMSG_NOTIFICATION, handle_notification)
            .register(SMSG_CHAT_PLAYER_NOT_FOUND, handle_chat_player_not_found)
            .register(SMSG_CHANNEL_NOTIFY, handle_channel_notify);
        d
    })
}

fn handle_auth_challenge(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    r.expect_remaining(AUTH_CHALLENGE_LENGTH)?;
    let server_seed = r.read_u32()?;

    if s.phase != WorldPhase::AwaitingChallenge {
        return Err(s.unexpected(SMSG_AUTH_CHALLENGE));
    }

    let client_seed = s.config.client_seed.unwrap_or_else(random);
    let proof = calculate_world_proof(
        &s.username,
        client_seed,
        server_seed,
        &SessionKey::from_le_bytes(s.session_key),
    );

    // Sent before the cipher is active, so the header stays plaintext.
    let body = auth_session(s.config.build, &s.username, client_seed, proof.as_le());
    s.send(CMSG_AUTH_SESSION, &body);

    s.crypto = Some(HeaderCrypto::new(s.session_key));
    s.phase = WorldPhase::AwaitingResponse;
    info!("Received server seed, session proof sent");

    Ok(())
}

fn handle_auth_response(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let code = r.read_u8()?;

    if s.phase != WorldPhase::AwaitingResponse {
        return Err(s.unexpected(SMSG_AUTH_RESPONSE));
    }

    if code != AUTH_OK {
        return Err(WorldAuthError { code }.into());
    }

    s.phase = WorldPhase::CharacterSelect;
    s.send(CMSG_CHAR_ENUM, &[]);
    info!("World session accepted");

    Ok(())
}

fn handle_char_enum(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let characters = read_char_enum(r)?;

    debug!("Account has {} characters", characters.len());
    s.characters = characters.clone();
    s.events.push_back(Event::CharacterEnum(characters));

    Ok(())
}

fn handle_character_login_failed(
    s: &mut WorldSession,
    r: &mut MessageReader,
) -> Result<(), ClientError> {
    let code = r.read_u8()?;

    warn!("Entering the world failed (0x{:02X})", code);
    s.active_character = None;
    s.phase = WorldPhase::CharacterSelect;
    s.events.push_back(Event::LoginFailed);

    Ok(())
}

fn handle_login_verify_world(s: &mut WorldSession, _: &mut MessageReader) -> Result<(), ClientError> {
    s.phase = WorldPhase::InWorld;
    s.send(CMSG_GUILD_ROSTER, &[]);
    s.events.push_back(Event::LoginSucceeded);
    info!("Entered the world");

    Ok(())
}

fn handle_logout_complete(s: &mut WorldSession, _: &mut MessageReader) -> Result<(), ClientError> {
    s.active_character = None;
    // Names are resolved again for the next character.
    s.names.clear();
    s.pending_names.clear();
    s.phase = WorldPhase::CharacterSelect;
    s.send(CMSG_CHAR_ENUM, &[]);
    s.events.push_back(Event::LogoutSucceeded);
    info!("Left the world");

    Ok(())
}

fn handle_messagechat(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let mut message = read_chat_message(r)?;

    message.sender_name = s.names.get(&message.sender).cloned();
    if message.sender_name.is_none() {
        s.query_name(message.sender);
    }

    s.events.push_back(Event::ChatMessage(message));

    Ok(())
}

fn handle_name_query_response(
    s: &mut WorldSession,
    r: &mut MessageReader,
) -> Result<(), ClientError> {
    let name = read_name_query_response(r)?;

    s.pending_names.remove(&name.guid);
    s.names.insert(name.guid, name.name.clone());
    s.events.push_back(Event::NameResolved(name));

    Ok(())
}

fn handle_contact_list(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let contacts = read_contact_list(r)?;

    for contact in &contacts {
        if !s.names.contains_key(&contact.guid) {
            s.query_name(contact.guid);
        }
    }

    s.events.push_back(Event::SocialUpdated(contacts));

    Ok(())
}

fn handle_friend_status(s: &mut WorldSession, _: &mut MessageReader) -> Result<(), ClientError> {
    s.send(CMSG_CONTACT_LIST, &contact_list_request());

    Ok(())
}

fn handle_guild_roster(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let roster = read_guild_roster(r)?;

    for member in &roster.members {
        s.names.insert(member.guid, member.name.clone());
    }
    s.events.push_back(Event::GuildUpdated(roster));

    Ok(())
}

fn handle_motd(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let motd = read_motd(r)?;
    s.events.push_back(Event::Motd(motd));

    Ok(())
}

fn handle_notification(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let text = r.read_cstring()?;
    s.events.push_back(Event::ServerNotification(text));

    Ok(())
}

fn handle_chat_player_not_found(
    s: &mut WorldSession,
    r: &mut MessageReader,
) -> Result<(), ClientError> {
    let name = r.read_cstring()?;
    s.events.push_back(Event::PlayerNotFound(name));

    Ok(())
}

fn handle_channel_notify(s: &mut WorldSession, r: &mut MessageReader) -> Result<(), ClientError> {
    let notification = read_channel_notify(r)?;
    s.events.push_back(Event::ChannelNotification(notification));

    Ok(())
}

impl WorldSession {
    /// Sends one `CMSG_NAME_QUERY` per unknown guid until it is answered.
    fn query_name(&mut self, guid: u64) {
        if guid != 0 && self.pending_names.insert(guid) {
            self.send(CMSG_NAME_QUERY, &guid_only(guid));
        }
    }
}
