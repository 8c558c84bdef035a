//! Bodies of the world messages the client sends and reads.
//!
//! Client bodies are returned without header, the connection adds and encrypts it.

use crate::error::MessageError;
use crate::event::{
    ChannelNotification, Character, ChatMessage, Contact, FriendLocation, FriendStatus,
    GuildMember, GuildRoster, PlayerName, CHAT_MSG_CHANNEL, SOCIAL_FLAG_FRIEND,
};
use crate::message::{MessageReader, MessageWriter};
use crate::normalized_string::NormalizedString;
use crate::PROOF_LENGTH;

/// Gender, skin, face, hair style, hair color and facial hair.
const CHAR_ENUM_APPEARANCE_LENGTH: usize = 6;
/// Zone, map, position, guild, flags, first login, pet and 20 inventory slots.
const CHAR_ENUM_TRAILER_LENGTH: usize = 4 + 4 + 12 + 4 + 4 + 1 + 12 + 20 * 9;
/// Rights and bank tab rights of one guild rank.
const GUILD_RANK_LENGTH: usize = 56;
const FRIEND_STATUS_OFFLINE: u8 = 0;
const SECONDS_PER_DAY: f32 = 86400.0;

pub(crate) fn auth_session(
    build: u16,
    username: &NormalizedString,
    client_seed: u32,
    proof: &[u8; PROOF_LENGTH as usize],
) -> Vec<u8> {
    let mut w = MessageWriter::with_capacity(4 + 4 + username.len() + 1 + 4 + proof.len());
    w.write_u32(build.into());
    w.write_u32(0);
    w.write_cstring(username.as_ref());
    w.write_u32(client_seed);
    w.write_bytes(proof);

    w.into_vec()
}

pub(crate) fn guid_only(guid: u64) -> Vec<u8> {
    guid.to_le_bytes().to_vec()
}

pub(crate) fn contact_list_request() -> Vec<u8> {
    SOCIAL_FLAG_FRIEND.to_le_bytes().to_vec()
}

pub(crate) fn read_char_enum(r: &mut MessageReader) -> Result<Vec<Character>, MessageError> {
    let amount = r.read_u8()?;

    let mut characters = Vec::with_capacity(amount.into());
    for _ in 0..amount {
        let guid = r.read_u64()?;
        let name = r.read_cstring()?;
        let race = r.read_u8()?;
        let class = r.read_u8()?;
        r.skip(CHAR_ENUM_APPEARANCE_LENGTH)?;
        let level = r.read_u8()?;
        r.skip(CHAR_ENUM_TRAILER_LENGTH)?;

        characters.push(Character {
            guid,
            name,
            race,
            class,
            level,
        });
    }

    Ok(characters)
}

pub(crate) fn read_chat_message(r: &mut MessageReader) -> Result<ChatMessage, MessageError> {
    let chat_type = r.read_u8()?;
    let language = r.read_u32()?;
    let sender = r.read_u64()?;
    let _ = r.read_u32()?;
    let channel = if chat_type == CHAT_MSG_CHANNEL {
        Some(r.read_cstring()?)
    } else {
        None
    };
    let _target = r.read_u64()?;
    let _text_length = r.read_u32()?;
    let text = r.read_cstring()?;
    let tag = r.read_u8()?;

    Ok(ChatMessage {
        chat_type,
        language,
        sender,
        sender_name: None,
        channel,
        text,
        tag,
    })
}

pub(crate) fn read_name_query_response(r: &mut MessageReader) -> Result<PlayerName, MessageError> {
    let guid = r.read_u64()?;
    let name = r.read_cstring()?;
    let _realm_name = r.read_cstring()?;
    let race = r.read_u32()?;
    let gender = r.read_u32()?;
    let class = r.read_u32()?;

    Ok(PlayerName {
        guid,
        name,
        race,
        gender,
        class,
    })
}

pub(crate) fn read_contact_list(r: &mut MessageReader) -> Result<Vec<Contact>, MessageError> {
    let _flags = r.read_u32()?;
    let amount = r.read_u32()?;

    let mut contacts = Vec::new();
    for _ in 0..amount {
        let guid = r.read_u64()?;
        let flags = r.read_u32()?;
        let note = r.read_cstring()?;

        let friend = if flags & SOCIAL_FLAG_FRIEND != 0 {
            let status = r.read_u8()?;
            let location = if status == FRIEND_STATUS_OFFLINE {
                None
            } else {
                Some(FriendLocation {
                    area: r.read_u32()?,
                    level: r.read_u32()?,
                    class: r.read_u32()?,
                })
            };

            Some(FriendStatus { status, location })
        } else {
            None
        };

        contacts.push(Contact {
            guid,
            flags,
            note,
            friend,
        });
    }

    Ok(contacts)
}

pub(crate) fn read_guild_roster(r: &mut MessageReader) -> Result<GuildRoster, MessageError> {
    let amount = r.read_u32()?;
    let motd = r.read_cstring()?;
    let info = r.read_cstring()?;

    let ranks = r.read_u32()?;
    for _ in 0..ranks {
        r.skip(GUILD_RANK_LENGTH)?;
    }

    let mut members = Vec::new();
    for _ in 0..amount {
        let guid = r.read_u64()?;
        let online = r.read_u8()? != 0;
        let name = r.read_cstring()?;
        let rank = r.read_u32()?;
        let level = r.read_u8()?;
        let class = r.read_u8()?;
        let _gender = r.read_u8()?;
        let zone = r.read_u32()?;
        let offline_seconds = if online {
            None
        } else {
            Some(r.read_f32()? * SECONDS_PER_DAY)
        };
        let note = r.read_cstring()?;
        let officer_note = r.read_cstring()?;

        members.push(GuildMember {
            guid,
            online,
            name,
            rank,
            level,
            class,
            zone,
            offline_seconds,
            note,
            officer_note,
        });
    }

    Ok(GuildRoster {
        motd,
        info,
        members,
    })
}

pub(crate) fn read_motd(r: &mut MessageReader) -> Result<String, MessageError> {
    let lines = r.read_u32()?;

    let mut motd = Vec::new();
    for _ in 0..lines {
        motd.push(r.read_cstring()?);
    }

    Ok(motd.join("\n"))
}

pub(crate) fn read_channel_notify(
    r: &mut MessageReader,
) -> Result<ChannelNotification, MessageError> {
    Ok(ChannelNotification {
        notify_type: r.read_u8()?,
        channel: r.read_cstring()?,
    })
}

#[cfg(test)]
pub(crate) mod test {
    use crate::error::MessageError;
    use crate::event::{Contact, FriendLocation, FriendStatus, CHAT_MSG_CHANNEL};
    use crate::message::{MessageReader, MessageWriter};
    use crate::normalized_string::NormalizedString;
    use crate::world::packets::*;

    pub(crate) fn write_character(w: &mut MessageWriter, guid: u64, name: &str, level: u8) {
        w.write_u64(guid);
        w.write_cstring(name);
        w.write_u8(10); // Blood elf
        w.write_u8(8); // Mage
        w.write_bytes(&[0; CHAR_ENUM_APPEARANCE_LENGTH]);
        w.write_u8(level);
        w.write_bytes(&[0; CHAR_ENUM_TRAILER_LENGTH]);
    }

    pub(crate) fn write_chat(w: &mut MessageWriter, chat_type: u8, sender: u64, text: &str) {
        w.write_u8(chat_type);
        w.write_u32(1); // Orcish
        w.write_u64(sender);
        w.write_u32(0);
        if chat_type == CHAT_MSG_CHANNEL {
            w.write_cstring("world");
        }
        w.write_u64(0);
        w.write_u32(text.len() as u32 + 1);
        w.write_cstring(text);
        w.write_u8(0);
    }

    #[test]
    fn auth_session_layout() {
        let username = NormalizedString::new("a").unwrap();
        let body = auth_session(8606, &username, 0xBB40E64D, &[0xAA; 20]);

        let mut expected = hex::decode("9e210000000000004100" /* build, 0, "A\0" */).unwrap();
        expected.extend_from_slice(&[0x4D, 0xE6, 0x40, 0xBB]);
        expected.extend_from_slice(&[0xAA; 20]);
        assert_eq!(body, expected);
        assert_eq!(body.len() + 4, 37 + username.len());
    }

    #[test]
    fn char_enum() {
        let mut w = MessageWriter::new();
        w.write_u8(2);
        write_character(&mut w, 0x10, "Kael", 70);
        write_character(&mut w, 0x11, "Lor", 1);
        let body = w.into_vec();

        let mut r = MessageReader::new(&body);
        let characters = read_char_enum(&mut r).unwrap();
        assert!(r.is_empty());
        assert_eq!(characters.len(), 2);
        assert_eq!(characters[0].name, "Kael");
        assert_eq!(characters[0].level, 70);
        assert_eq!(characters[0].race, 10);
        assert_eq!(characters[1].guid, 0x11);

        // Truncated record
        assert_eq!(
            read_char_enum(&mut MessageReader::new(&body[..body.len() - 1])),
            Err(MessageError::Underflow { needed: 1 })
        );
    }

    #[test]
    fn chat_message() {
        let mut w = MessageWriter::new();
        write_chat(&mut w, CHAT_MSG_CHANNEL, 0x42, "hello");
        let body = w.into_vec();

        let mut r = MessageReader::new(&body);
        let message = read_chat_message(&mut r).unwrap();
        assert!(r.is_empty());
        assert_eq!(message.channel.as_deref(), Some("world"));
        assert_eq!(message.text, "hello");
        assert_eq!(message.sender, 0x42);
        assert_eq!(message.sender_name, None);

        let mut w = MessageWriter::new();
        write_chat(&mut w, 0x01, 0x42, "hi");
        let message = read_chat_message(&mut MessageReader::new(w.as_slice())).unwrap();
        assert_eq!(message.channel, None);
        assert_eq!(message.text, "hi");
    }

    #[test]
    fn name_query_response() {
        let mut w = MessageWriter::new();
        w.write_u64(0x42);
        w.write_cstring("Thrall");
        w.write_cstring("");
        w.write_u32(2);
        w.write_u32(0);
        w.write_u32(7);

        let name = read_name_query_response(&mut MessageReader::new(w.as_slice())).unwrap();
        assert_eq!(name.name, "Thrall");
        assert_eq!((name.race, name.gender, name.class), (2, 0, 7));
    }

    #[test]
    fn contact_list() {
        let mut w = MessageWriter::new();
        w.write_u32(7);
        w.write_u32(3);
        // Online friend
        w.write_u64(1);
        w.write_u32(SOCIAL_FLAG_FRIEND);
        w.write_cstring("raid lead");
        w.write_u8(1);
        w.write_u32(3703);
        w.write_u32(70);
        w.write_u32(2);
        // Offline friend
        w.write_u64(2);
        w.write_u32(SOCIAL_FLAG_FRIEND);
        w.write_cstring("");
        w.write_u8(0);
        // Ignored
        w.write_u64(3);
        w.write_u32(0x02);
        w.write_cstring("");

        let mut r = MessageReader::new(w.as_slice());
        let contacts = read_contact_list(&mut r).unwrap();
        assert!(r.is_empty());
        assert_eq!(
            contacts[0],
            Contact {
                guid: 1,
                flags: SOCIAL_FLAG_FRIEND,
                note: "raid lead".to_string(),
                friend: Some(FriendStatus {
                    status: 1,
                    location: Some(FriendLocation {
                        area: 3703,
                        level: 70,
                        class: 2
                    }),
                }),
            }
        );
        assert_eq!(
            contacts[1].friend,
            Some(FriendStatus {
                status: 0,
                location: None
            })
        );
        assert_eq!(contacts[2].friend, None);
    }

    #[test]
    fn guild_roster() {
        let mut w = MessageWriter::new();
        w.write_u32(2);
        w.write_cstring("Raid at 8");
        w.write_cstring("Be nice");
        w.write_u32(2);
        w.write_bytes(&[0; 2 * GUILD_RANK_LENGTH]);
        for (guid, online) in [(1_u64, true), (2, false)] {
            w.write_u64(guid);
            w.write_u8(online.into());
            w.write_cstring("Member");
            w.write_u32(1);
            w.write_u8(70);
            w.write_u8(1);
            w.write_u8(0);
            w.write_u32(3703);
            if !online {
                w.write_f32(0.5);
            }
            w.write_cstring("note");
            w.write_cstring("officer note");
        }

        let mut r = MessageReader::new(w.as_slice());
        let roster = read_guild_roster(&mut r).unwrap();
        assert!(r.is_empty());
        assert_eq!(roster.motd, "Raid at 8");
        assert_eq!(roster.info, "Be nice");
        assert_eq!(roster.members.len(), 2);
        assert!(roster.members[0].online);
        assert_eq!(roster.members[0].offline_seconds, None);
        assert_eq!(roster.members[1].offline_seconds, Some(43200.0));
        assert_eq!(roster.members[1].officer_note, "officer note");
    }

    #[test]
    fn motd_lines_are_joined() {
        let mut w = MessageWriter::new();
        w.write_u32(2);
        w.write_cstring("Welcome");
        w.write_cstring("Have fun");

        assert_eq!(
            read_motd(&mut MessageReader::new(w.as_slice())).unwrap(),
            "Welcome\nHave fun"
        );
    }
}
