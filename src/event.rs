//! Notifications emitted by the connections.
//!
//! Events are queued while bytes are fed and drained with `poll_event`.

use crate::auth::Realm;
use crate::error::ErrorKind;

/// Something the application may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The auth connection is established and the logon challenge was queued.
    AuthOpened,
    /// The auth connection is finished, either by success or by the transport closing.
    AuthClosed,
    /// A realm was picked from the realm list.
    RealmSelected(Realm),
    /// The logon failed: rejected credentials, a server proof that did not verify or a
    /// malformed message. On the world connection only a refused session.
    AuthError {
        /// Category of the failure.
        kind: ErrorKind,
        /// Human readable reason.
        message: String,
    },
    /// The world connection is established.
    WorldOpened,
    /// The world transport closed.
    WorldClosed,
    /// A complete world message arrived.
    PacketReceived {
        /// Message opcode.
        opcode: u16,
        /// Body size in bytes.
        size: u16,
    },
    /// A world message was queued for sending.
    PacketSent {
        /// Message opcode.
        opcode: u32,
        /// Body size in bytes.
        size: u16,
    },
    /// The characters on the account.
    CharacterEnum(Vec<Character>),
    /// The selected character entered the world.
    LoginSucceeded,
    /// Entering the world failed, or the world server refused the session.
    LoginFailed,
    /// The character left the world and the character list was requested again.
    LogoutSucceeded,
    /// A chat message was received.
    ChatMessage(ChatMessage),
    /// A name query was answered.
    NameResolved(PlayerName),
    /// The friend and ignore list.
    SocialUpdated(Vec<Contact>),
    /// The guild roster.
    GuildUpdated(GuildRoster),
    /// Message of the day, lines joined by `\n`.
    Motd(String),
    /// Server wide notification.
    ServerNotification(String),
    /// A whisper target does not exist.
    PlayerNotFound(String),
    /// Joined, left or was otherwise notified about a chat channel.
    ChannelNotification(ChannelNotification),
}

/// Entry of `SMSG_CHAR_ENUM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    /// Unique id.
    pub guid: u64,
    /// Name.
    pub name: String,
    /// Race id.
    pub race: u8,
    /// Class id.
    pub class: u8,
    /// Level.
    pub level: u8,
}

/// Chat type of channel messages, the only type that carries a channel name.
pub const CHAT_MSG_CHANNEL: u8 = 0x11;

/// Decoded `SMSG_MESSAGECHAT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Chat type, like say, whisper or channel.
    pub chat_type: u8,
    /// Language id.
    pub language: u32,
    /// Guid of the sender.
    pub sender: u64,
    /// Known once the sender's name has been resolved.
    pub sender_name: Option<String>,
    /// Only set for [`CHAT_MSG_CHANNEL`].
    pub channel: Option<String>,
    /// Message text.
    pub text: String,
    /// Chat tag, like AFK or DND.
    pub tag: u8,
}

/// Decoded `SMSG_NAME_QUERY_RESPONSE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerName {
    /// Unique id.
    pub guid: u64,
    /// Name.
    pub name: String,
    /// Race id.
    pub race: u32,
    /// Gender id.
    pub gender: u32,
    /// Class id.
    pub class: u32,
}

/// Social flag for friends. Only friends carry an online status.
pub const SOCIAL_FLAG_FRIEND: u32 = 0x01;

/// Entry of `SMSG_CONTACT_LIST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Unique id.
    pub guid: u64,
    /// Social flags.
    pub flags: u32,
    /// Public note.
    pub note: String,
    /// Set for friends.
    pub friend: Option<FriendStatus>,
}

/// Online state of a friend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendStatus {
    /// 0 is offline.
    pub status: u8,
    /// Set when online.
    pub location: Option<FriendLocation>,
}

/// Where an online friend is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendLocation {
    /// Area id.
    pub area: u32,
    /// Level.
    pub level: u32,
    /// Class id.
    pub class: u32,
}

/// Decoded `SMSG_GUILD_ROSTER`.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildRoster {
    /// Guild message of the day.
    pub motd: String,
    /// Guild information text.
    pub info: String,
    /// Roster entries.
    pub members: Vec<GuildMember>,
}

/// Entry of [`GuildRoster`].
#[derive(Debug, Clone, PartialEq)]
pub struct GuildMember {
    /// Unique id.
    pub guid: u64,
    /// Whether the member is online.
    pub online: bool,
    /// Name.
    pub name: String,
    /// Guild rank index.
    pub rank: u32,
    /// Level.
    pub level: u8,
    /// Class id.
    pub class: u8,
    /// Zone id.
    pub zone: u32,
    /// Seconds since last seen, only for offline members.
    pub offline_seconds: Option<f32>,
    /// Public note.
    pub note: String,
    /// Officer note.
    pub officer_note: String,
}

/// Decoded `SMSG_CHANNEL_NOTIFY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelNotification {
    /// Notification type.
    pub notify_type: u8,
    /// Channel name.
    pub channel: String,
}
