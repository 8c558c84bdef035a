use crate::header_crypto::{create_key, CLIENT_HEADER_LENGTH, SERVER_HEADER_LENGTH};
use crate::key::SessionKey;
use crate::{PROOF_LENGTH, SESSION_KEY_LENGTH};

/// Encryption part of a [`HeaderCrypto`](crate::header_crypto::HeaderCrypto).
///
/// Intended to be kept with the writer half of a connection.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct EncrypterHalf {
    key: [u8; PROOF_LENGTH as usize],
    index: u8,
    previous_value: u8,
}

impl EncrypterHalf {
    /// Encrypts in place and advances the cipher state.
    ///
    /// Prefer [`EncrypterHalf::encrypt_client_header`] for headers.
    pub fn encrypt(&mut self, data: &mut [u8]) {
        encrypt(data, &self.key, &mut self.index, &mut self.previous_value);
    }

    /// Convenience function for encrypting client headers.
    ///
    /// The size is big endian and the opcode little endian.
    pub fn encrypt_client_header(
        &mut self,
        size: u16,
        opcode: u32,
    ) -> [u8; CLIENT_HEADER_LENGTH as usize] {
        let size = size.to_be_bytes();
        let opcode = opcode.to_le_bytes();

        let mut header = [size[0], size[1], opcode[0], opcode[1], opcode[2], opcode[3]];
        self.encrypt(&mut header);

        header
    }

    /// Convenience function for encrypting server headers.
    ///
    /// Only useful for standing in for a server, like in tests.
    pub fn encrypt_server_header(
        &mut self,
        size: u16,
        opcode: u16,
    ) -> [u8; SERVER_HEADER_LENGTH as usize] {
        let size = size.to_be_bytes();
        let opcode = opcode.to_le_bytes();

        let mut header = [size[0], size[1], opcode[0], opcode[1]];
        self.encrypt(&mut header);

        header
    }

    /// Creates a standalone half, for the side that only ever encrypts.
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

fn encrypt(
    data: &mut [u8],
    key: &[u8; PROOF_LENGTH as usize],
    index: &mut u8,
    previous_value: &mut u8,
) {
    for unencrypted in data {
        // x = (d ^ key[index]) + previous_value
        let encrypted = (*unencrypted ^ key[*index as usize]).wrapping_add(*previous_value);

        // Use the key as a circular buffer
        *index = (*index + 1) % PROOF_LENGTH;

        *unencrypted = encrypted;
        *previous_value = encrypted;
    }
}
