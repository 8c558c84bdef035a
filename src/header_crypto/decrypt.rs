use crate::header_crypto::{
    create_key, ClientHeader, ServerHeader, CLIENT_HEADER_LENGTH, SERVER_HEADER_LENGTH,
};
use crate::key::SessionKey;
use crate::{PROOF_LENGTH, SESSION_KEY_LENGTH};

/// Decryption part of a [`HeaderCrypto`](crate::header_crypto::HeaderCrypto).
///
/// Intended to be kept with the reader half of a connection.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct DecrypterHalf {
    key: [u8; PROOF_LENGTH as usize],
    index: u8,
    previous_value: u8,
}

impl DecrypterHalf {
    /// Decrypts in place and advances the cipher state.
    ///
    /// Prefer [`DecrypterHalf::decrypt_server_header`] for headers.
    pub fn decrypt(&mut self, data: &mut [u8]) {
        decrypt(data, &self.key, &mut self.index, &mut self.previous_value);
    }

    /// Convenience function for decrypting server headers.
    pub fn decrypt_server_header(
        &mut self,
        mut data: [u8; SERVER_HEADER_LENGTH as usize],
    ) -> ServerHeader {
        self.decrypt(&mut data);

        let size = u16::from_be_bytes([data[0], data[1]]);
        let opcode = u16::from_le_bytes([data[2], data[3]]);

        ServerHeader { size, opcode }
    }

    /// Convenience function for decrypting client headers.
    ///
    /// Only useful for standing in for a server, like in tests.
    pub fn decrypt_client_header(
        &mut self,
        mut data: [u8; CLIENT_HEADER_LENGTH as usize],
    ) -> ClientHeader {
        self.decrypt(&mut data);

        let size = u16::from_be_bytes([data[0], data[1]]);
        let opcode = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);

        ClientHeader { size, opcode }
    }

    /// Creates a standalone half, for the side that only ever decrypts.
    pub fn from_session_key(session_key: [u8; SESSION_KEY_LENGTH as usize]) -> Self {
        Self::new(create_key(&SessionKey::from_le_bytes(session_key)))
    }

    pub(crate) const fn new(key: [u8; PROOF_LENGTH as usize]) -> Self {
        Self {
            key,
            index: 0,
            previous_value: 0,
        }
    }
}

fn decrypt(
    data: &mut [u8],
    key: &[u8; PROOF_LENGTH as usize],
    index: &mut u8,
    previous_value: &mut u8,
) {
    for encrypted in data {
        // unencrypted = (encrypted - previous_value) ^ key[index]
        let unencrypted = encrypted.wrapping_sub(*previous_value) ^ key[*index as usize];

        // Use the key as a circular buffer
        *index = (*index + 1) % PROOF_LENGTH;

        *previous_value = *encrypted;
        *encrypted = unencrypted;
    }
}
