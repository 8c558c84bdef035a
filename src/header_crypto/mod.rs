//! Functionality for encrypting/decrypting [World Packet] headers.
//!
//! After the world server has accepted `CMSG_AUTH_SESSION`, the headers of every message
//! in both directions are obfuscated with a stream cipher keyed from the session key
//! obtained during the SRP6 exchange. Message bodies are never touched.
//!
//! The packet headers are different length depending on if they are
//! [client](CLIENT_HEADER_LENGTH) or [server](SERVER_HEADER_LENGTH) headers.
//!
//! The sending party encrypts with an [`EncrypterHalf`] and the receiving party decrypts with a
//! [`DecrypterHalf`]. Both halves carry their own state, so a header must be processed exactly once
//! and in stream order. Decrypting the same bytes twice, or skipping a header, desynchronizes the
//! receiver for the rest of the connection.
//!
//! ```text
//!                 |-> EncrypterHalf
//! HeaderCrypto ---|
//!                 |-> DecrypterHalf
//! ```
//!
//! # Example
//!
//! ```
//! use wow_client::header_crypto::HeaderCrypto;
//! use wow_client::SESSION_KEY_LENGTH;
//!
//! fn first_messages(session_key: [u8; SESSION_KEY_LENGTH as usize], raw_header: [u8; 4]) {
//!     let mut crypto = HeaderCrypto::new(session_key);
//!
//!     // CMSG_CHAR_ENUM has an empty body, so the size only covers the opcode.
//!     let header = crypto.encrypt_client_header(4, 0x037);
//!     // Send header
//!
//!     let server_header = crypto.decrypt_server_header(raw_header);
//!     // Read `server_header.size - 2` body bytes
//! #   let _ = (header, server_header);
//! }
//! # first_messages([0; 40], [0; 4]);
//! ```
//!
//! [World Packet]: https://wowdev.wiki/World_Packet

pub use decrypt::DecrypterHalf;
pub use encrypt::EncrypterHalf;

use crate::key::SessionKey;
use crate::{PROOF_LENGTH, SESSION_KEY_LENGTH};
use hmac::{Hmac, Mac};
use sha1::Sha1;

mod decrypt;
mod encrypt;

/// Size in bytes of the client [world packet] header.
///
/// Always 6 bytes because the size is 2 bytes and the opcode is 4 bytes.
///
/// [world packet]: https://wowdev.wiki/World_Packet
pub const CLIENT_HEADER_LENGTH: u8 =
    (std::mem::size_of::<u16>() + std::mem::size_of::<u32>()) as u8;
/// Size in bytes of the server [world packet] header.
///
/// Always 4 bytes because the size is 2 bytes and the opcode is 2 bytes.
///
/// [world packet]: https://wowdev.wiki/World_Packet
pub const SERVER_HEADER_LENGTH: u8 =
    (std::mem::size_of::<u16>() + std::mem::size_of::<u16>()) as u8;

/// Key for the HMAC that turns the session key into the cipher key.
const HMAC_SEED: [u8; 16] = [
    0x38, 0xA7, 0x83, 0x15, 0xF8, 0x92, 0x25, 0x30, 0x71, 0x98, 0x67, 0xB1, 0x8C, 0x04, 0xE2, 0xAA,
];

/// Header sent by the server.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct ServerHeader {
    /// Size of the message in bytes.
    /// Includes the opcode field but not the size field
    pub size: u16,
    /// Opcode of the message. Note that the size is not the same as the [`ClientHeader`].
    pub opcode: u16,
}

/// Header sent by the client.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct ClientHeader {
    /// Size of the message in bytes.
    /// Includes the opcode field but not the size field
    pub size: u16,
    /// Opcode of the message. Note that the size is not the same as the [`ServerHeader`].
    pub opcode: u32,
}

/// Main struct for encryption or decryption.
///
/// Handles both encryption and decryption of headers through the
/// [`EncrypterHalf`] and [`DecrypterHalf`] structs.
/// Can be split with [`HeaderCrypto::split`].
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct HeaderCrypto {
    decrypt: DecrypterHalf,
    encrypt: EncrypterHalf,
}

impl HeaderCrypto {
    /// Derives the cipher key from the session key. Both halves start at index 0
    /// with a previous value of 0.
    pub fn new(session_key: [u8; SESSION_KEY_LENGTH as usize]) -> Self {
        let key = create_key(&SessionKey::from_le_bytes(session_key));

        Self {
            decrypt: DecrypterHalf::new(key),
            encrypt: EncrypterHalf::new(key),
        }
    }

    /// Direct access to the internal [`DecrypterHalf`].
    #[must_use]
    pub fn decrypter(&mut self) -> &mut DecrypterHalf {
        &mut self.decrypt
    }

    /// Direct access to the internal [`EncrypterHalf`].
    #[must_use]
    pub fn encrypter(&mut self) -> &mut EncrypterHalf {
        &mut self.encrypt
    }

    /// Encrypts arbitrary data in place. See [`EncrypterHalf::encrypt`].
    pub fn encrypt(&mut self, data: &mut [u8]) {
        self.encrypt.encrypt(data);
    }

    /// Decrypts arbitrary data in place. See [`DecrypterHalf::decrypt`].
    pub fn decrypt(&mut self, data: &mut [u8]) {
        self.decrypt.decrypt(data);
    }

    /// See [`EncrypterHalf::encrypt_client_header`].
    pub fn encrypt_client_header(
        &mut self,
        size: u16,
        opcode: u32,
    ) -> [u8; CLIENT_HEADER_LENGTH as usize] {
        self.encrypt.encrypt_client_header(size, opcode)
    }

    /// See [`DecrypterHalf::decrypt_server_header`].
    pub fn decrypt_server_header(
        &mut self,
        data: [u8; SERVER_HEADER_LENGTH as usize],
    ) -> ServerHeader {
        self.decrypt.decrypt_server_header(data)
    }

    /// Splits the struct into two halves that can be moved independently.
    #[must_use]
    pub fn split(self) -> (EncrypterHalf, DecrypterHalf) {
        (self.encrypt, self.decrypt)
    }
}

fn create_key(session_key: &SessionKey) -> [u8; PROOF_LENGTH as usize] {
    #[allow(clippy::expect_used)]
    let mut hmac: Hmac<Sha1> =
        Hmac::new_from_slice(HMAC_SEED.as_slice()).expect("HMAC takes keys of any size");
    hmac.update(session_key.as_le());

    hmac.finalize().into_bytes().into()
}

#[cfg(test)]
mod test {
    use crate::header_crypto::{
        ClientHeader, DecrypterHalf, EncrypterHalf, HeaderCrypto, ServerHeader,
    };
    use crate::SESSION_KEY_LENGTH;

    const SESSION_KEY: [u8; SESSION_KEY_LENGTH as usize] = [
        99, 131, 9, 219, 107, 35, 248, 24, 247, 161, 213, 174, 25, 135, 70, 253, 173, 103, 149,
        186, 85, 162, 130, 144, 129, 83, 118, 179, 93, 82, 160, 128, 165, 215, 35, 125, 224, 8,
        156, 140,
    ];

    // Headers as sent by a server after the session was accepted.
    const SERVER_HEADERS: [([u8; 4], u16, u16); 5] = [
        ([0x36, 0xbe, 0x24, 0x58], 13, 0x1EE),
        ([0x6c, 0x4b, 0xd1, 0x75], 246, 0x3B),
        ([0x47, 0x44, 0x54, 0xee], 246, 0x3B),
        ([0xca, 0x63, 0xd2, 0x21], 22, 0x236),
        ([0x9d, 0xe5, 0xa4, 0xc8], 34, 0xFD),
    ];

    const CLIENT_HEADERS: [([u8; 6], u16, u32); 3] = [
        ([0x36, 0xb7, 0x76, 0xab, 0xbf, 0xe8], 4, 0x37),
        ([0xa5, 0x51, 0xaf, 0xb7, 0xe2, 0x7c], 8, 0x38C),
        ([0x58, 0xe3, 0x51, 0x9e, 0x1a, 0x84], 4, 0x37),
    ];

    #[test]
    fn decrypt_server_headers() {
        let mut crypto = HeaderCrypto::new(SESSION_KEY);

        for (raw, size, opcode) in SERVER_HEADERS {
            assert_eq!(
                crypto.decrypt_server_header(raw),
                ServerHeader { size, opcode }
            );
        }
    }

    #[test]
    fn encrypt_client_headers() {
        let mut crypto = HeaderCrypto::new(SESSION_KEY);

        for (expected, size, opcode) in CLIENT_HEADERS {
            assert_eq!(crypto.encrypt_client_header(size, opcode), expected);
        }
    }

    #[test]
    fn halves_are_independent() {
        let (mut encrypt, mut decrypt) = HeaderCrypto::new(SESSION_KEY).split();

        // Interleaving sends and receives must not disturb either stream.
        assert_eq!(encrypt.encrypt_client_header(4, 0x37), CLIENT_HEADERS[0].0);
        assert_eq!(
            decrypt.decrypt_server_header(SERVER_HEADERS[0].0),
            ServerHeader {
                size: 13,
                opcode: 0x1EE
            }
        );
        assert_eq!(encrypt.encrypt_client_header(8, 0x38C), CLIENT_HEADERS[1].0);
        assert_eq!(
            decrypt.decrypt_server_header(SERVER_HEADERS[1].0),
            ServerHeader {
                size: 246,
                opcode: 0x3B
            }
        );
    }

    #[test]
    fn server_side_mirrors_client_side() {
        let mut server_encrypt = EncrypterHalf::from_session_key(SESSION_KEY);
        for (expected, size, opcode) in SERVER_HEADERS {
            assert_eq!(server_encrypt.encrypt_server_header(size, opcode), expected);
        }

        let mut server_decrypt = DecrypterHalf::from_session_key(SESSION_KEY);
        for (raw, size, opcode) in CLIENT_HEADERS {
            assert_eq!(
                server_decrypt.decrypt_client_header(raw),
                ClientHeader { size, opcode }
            );
        }
    }

    #[test]
    fn out_of_order_decryption_gives_garbage() {
        let mut crypto = HeaderCrypto::new(SESSION_KEY);

        let skipped = crypto.decrypt_server_header(SERVER_HEADERS[1].0);
        assert_ne!(
            skipped,
            ServerHeader {
                size: 246,
                opcode: 0x3B
            }
        );
    }

    #[test]
    fn key_index_wraps_around() {
        let mut encrypt = EncrypterHalf::from_session_key(SESSION_KEY);
        let mut decrypt = DecrypterHalf::from_session_key(SESSION_KEY);

        let original: Vec<u8> = (0..=255).collect();
        let mut data = original.clone();
        encrypt.encrypt(&mut data);
        assert_ne!(data, original);

        decrypt.decrypt(&mut data);
        assert_eq!(data, original);
    }
}
