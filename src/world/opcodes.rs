//! Opcodes of the 2.4.3 world protocol that the client sends or handles.
//!
//! Server opcodes are 2 bytes on the wire and client opcodes are 4 bytes.

/// Request for the character list.
pub const CMSG_CHAR_ENUM: u32 = 0x037;
/// Enter the world with a character.
pub const CMSG_PLAYER_LOGIN: u32 = 0x03D;
/// Leave the world.
pub const CMSG_LOGOUT_REQUEST: u32 = 0x04B;
/// Look up the name of a guid.
pub const CMSG_NAME_QUERY: u32 = 0x050;
/// Request for the friend and ignore list.
pub const CMSG_CONTACT_LIST: u32 = 0x066;
/// Request for the guild roster.
pub const CMSG_GUILD_ROSTER: u32 = 0x089;
/// Answer to [`SMSG_AUTH_CHALLENGE`].
pub const CMSG_AUTH_SESSION: u32 = 0x1ED;

/// Character list.
pub const SMSG_CHAR_ENUM: u16 = 0x03B;
/// Entering the world failed.
pub const SMSG_CHARACTER_LOGIN_FAILED: u16 = 0x041;
/// Logout finished.
pub const SMSG_LOGOUT_COMPLETE: u16 = 0x04D;
/// Answer to [`CMSG_NAME_QUERY`].
pub const SMSG_NAME_QUERY_RESPONSE: u16 = 0x051;
/// Friend and ignore list.
pub const SMSG_CONTACT_LIST: u16 = 0x067;
/// A friend came online, went offline or was added or removed.
pub const SMSG_FRIEND_STATUS: u16 = 0x068;
/// Guild roster.
pub const SMSG_GUILD_ROSTER: u16 = 0x08A;
/// Chat message.
pub const SMSG_MESSAGECHAT: u16 = 0x096;
/// Chat channel notification.
pub const SMSG_CHANNEL_NOTIFY: u16 = 0x099;
/// Server wide notification.
pub const SMSG_NOTIFICATION: u16 = 0x1CB;
/// First message of the world server, carries the server seed.
pub const SMSG_AUTH_CHALLENGE: u16 = 0x1EC;
/// Result of [`CMSG_AUTH_SESSION`].
pub const SMSG_AUTH_RESPONSE: u16 = 0x1EE;
/// The character entered the world.
pub const SMSG_LOGIN_VERIFY_WORLD: u16 = 0x236;
/// Whisper target does not exist.
pub const SMSG_CHAT_PLAYER_NOT_FOUND: u16 = 0x2A9;
/// Message of the day.
pub const SMSG_MOTD: u16 = 0x33D;

/// Name of a server opcode for logging, `None` for opcodes without a handler.
pub const fn server_opcode_name(opcode: u16) -> Option<&'static str> {
    Some(match opcode {
        SMSG_CHAR_ENUM => "SMSG_CHAR_ENUM",
        SMSG_CHARACTER_LOGIN_FAILED => "SMSG_CHARACTER_LOGIN_FAILED",
        SMSG_LOGOUT_COMPLETE => "SMSG_LOGOUT_COMPLETE",
        SMSG_NAME_QUERY_RESPONSE => "SMSG_NAME_QUERY_RESPONSE",
        SMSG_CONTACT_LIST => "SMSG_CONTACT_LIST",
        SMSG_FRIEND_STATUS => "SMSG_FRIEND_STATUS",
        SMSG_GUILD_ROSTER => "SMSG_GUILD_ROSTER",
        SMSG_MESSAGECHAT => "SMSG_MESSAGECHAT",
        SMSG_CHANNEL_NOTIFY => "SMSG_CHANNEL_NOTIFY",
        SMSG_NOTIFICATION => "SMSG_NOTIFICATION",
        SMSG_AUTH_CHALLENGE => "SMSG_AUTH_CHALLENGE",
        SMSG_AUTH_RESPONSE => "SMSG_AUTH_RESPONSE",
        SMSG_LOGIN_VERIFY_WORLD => "SMSG_LOGIN_VERIFY_WORLD",
        SMSG_CHAT_PLAYER_NOT_FOUND => "SMSG_CHAT_PLAYER_NOT_FOUND",
        SMSG_MOTD => "SMSG_MOTD",
        _ => return None,
    })
}
