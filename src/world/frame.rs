//! Splits the world byte stream into messages.
//!
//! Every server message starts with a 4 byte header: the size as a big endian `u16` and the
//! opcode as a little endian `u16`. The size counts the opcode and the body but not itself.
//! Once the session is accepted the header is encrypted, the body never is.
//!
//! A header can only be decrypted once since the cipher is stateful. When the header of a
//! message has arrived but the body has not, the decrypted header stays in the buffer and
//! the next call skips decryption.

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::error::FrameError;
use crate::header_crypto::{DecrypterHalf, SERVER_HEADER_LENGTH};

const HEADER_LENGTH: usize = SERVER_HEADER_LENGTH as usize;
const SIZE_FIELD_LENGTH: usize = 2;
const OPCODE_LENGTH: u16 = 2;

/// A complete world message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Server opcode.
    pub opcode: u16,
    /// Everything after the header.
    pub body: Bytes,
}

/// Buffers received bytes until complete messages are available.
#[derive(Debug, Default)]
pub struct FrameReassembler {
    buffer: BytesMut,
    decrypt_skip: bool,
}

impl FrameReassembler {
    /// Creates an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes from the transport.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Amount of bytes not yet returned as a [`Frame`].
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the header at the front of the buffer has already been decrypted.
    pub const fn is_waiting_for_body(&self) -> bool {
        self.decrypt_skip
    }

    /// Returns the next complete message, or `None` if more bytes are needed.
    ///
    /// `decrypter` must be `Some` from the first message after the session is accepted.
    ///
    /// # Errors
    ///
    /// If a header declares a size too small to contain the opcode. With a decrypter
    /// this is [`FrameError::CipherDesync`], otherwise [`FrameError::InvalidLength`].
    pub fn next_frame(
        &mut self,
        decrypter: Option<&mut DecrypterHalf>,
    ) -> Result<Option<Frame>, FrameError> {
        if self.buffer.len() < HEADER_LENGTH {
            return Ok(None);
        }

        let encrypted = decrypter.is_some();
        if let Some(decrypter) = decrypter {
            if !self.decrypt_skip {
                trace!("Encrypted header {:02x?}", &self.buffer[..HEADER_LENGTH]);
                decrypter.decrypt(&mut self.buffer[..HEADER_LENGTH]);
                trace!("Decrypted header {:02x?}", &self.buffer[..HEADER_LENGTH]);
            }
        }

        let size = u16::from_be_bytes([self.buffer[0], self.buffer[1]]);
        let opcode = u16::from_le_bytes([self.buffer[2], self.buffer[3]]);

        if size < OPCODE_LENGTH {
            self.decrypt_skip = false;
            return Err(if encrypted {
                FrameError::CipherDesync { size }
            } else {
                FrameError::InvalidLength { size }
            });
        }

        let total = SIZE_FIELD_LENGTH + usize::from(size);
        if self.buffer.len() < total {
            self.decrypt_skip = encrypted;
            return Ok(None);
        }

        let mut message = self.buffer.split_to(total);
        message.advance(HEADER_LENGTH);
        self.decrypt_skip = false;

        Ok(Some(Frame {
            opcode,
            body: message.freeze(),
        }))
    }
}

#[cfg(test)]
mod test {
    use crate::error::FrameError;
    use crate::header_crypto::{DecrypterHalf, EncrypterHalf};
    use crate::world::frame::{Frame, FrameReassembler};
    use crate::SESSION_KEY_LENGTH;

    const SESSION_KEY: [u8; SESSION_KEY_LENGTH as usize] = [
        99, 131, 9, 219, 107, 35, 248, 24, 247, 161, 213, 174, 25, 135, 70, 253, 173, 103, 149,
        186, 85, 162, 130, 144, 129, 83, 118, 179, 93, 82, 160, 128, 165, 215, 35, 125, 224, 8,
        156, 140,
    ];

    fn message(opcode: u16, body: &[u8]) -> Vec<u8> {
        let mut v = ((body.len() + 2) as u16).to_be_bytes().to_vec();
        v.extend_from_slice(&opcode.to_le_bytes());
        v.extend_from_slice(body);
        v
    }

    fn encrypted_stream() -> Vec<u8> {
        let mut encrypter = EncrypterHalf::from_session_key(SESSION_KEY);
        let mut stream = Vec::new();
        for (opcode, body) in [(0x3B_u16, &[1_u8, 2, 3][..]), (0x96, &[]), (0x1CB, &[0x41, 0])] {
            let mut m = message(opcode, body);
            encrypter.encrypt(&mut m[..4]);
            stream.extend(m);
        }
        stream
    }

    fn collect(chunks: &[&[u8]], encrypted: bool) -> Vec<Frame> {
        let mut decrypter = DecrypterHalf::from_session_key(SESSION_KEY);
        let mut r = FrameReassembler::new();
        let mut frames = Vec::new();

        for chunk in chunks {
            r.extend(chunk);
            while let Some(frame) = r.next_frame(encrypted.then_some(&mut decrypter)).unwrap() {
                frames.push(frame);
            }
        }

        assert_eq!(r.buffered(), 0);
        frames
    }

    fn expected() -> Vec<Frame> {
        vec![
            Frame {
                opcode: 0x3B,
                body: vec![1, 2, 3].into(),
            },
            Frame {
                opcode: 0x96,
                body: vec![].into(),
            },
            Frame {
                opcode: 0x1CB,
                body: vec![0x41, 0].into(),
            },
        ]
    }

    #[test]
    fn chunking_does_not_matter() {
        let stream = encrypted_stream();

        // One chunk
        assert_eq!(collect(&[&stream], true), expected());

        // Single bytes
        let bytes: Vec<&[u8]> = stream.chunks(1).collect();
        assert_eq!(collect(&bytes, true), expected());

        // Split at the first header boundary
        assert_eq!(collect(&[&stream[..4], &stream[4..]], true), expected());

        // Split one byte into the first header
        assert_eq!(collect(&[&stream[..1], &stream[1..]], true), expected());

        // Split inside the second header, after the first body
        assert_eq!(collect(&[&stream[..9], &stream[9..]], true), expected());
    }

    #[test]
    fn plaintext_frames() {
        let mut stream = message(0x1EC, &[0xEF, 0xBE, 0xAD, 0xDE]);
        stream.extend(message(0x1EE, &[0x0C]));

        let frames = collect(&[&stream[..6], &stream[6..]], false);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].opcode, 0x1EC);
        assert_eq!(&frames[0].body[..], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(frames[1].opcode, 0x1EE);
    }

    #[test]
    fn header_is_decrypted_once() {
        let stream = encrypted_stream();
        let mut decrypter = DecrypterHalf::from_session_key(SESSION_KEY);
        let mut r = FrameReassembler::new();

        r.extend(&stream[..5]);
        assert_eq!(r.next_frame(Some(&mut decrypter)).unwrap(), None);
        assert!(r.is_waiting_for_body());
        assert_eq!(r.next_frame(Some(&mut decrypter)).unwrap(), None);

        r.extend(&stream[5..7]);
        let frame = r.next_frame(Some(&mut decrypter)).unwrap().unwrap();
        assert_eq!(frame.opcode, 0x3B);
        assert!(!r.is_waiting_for_body());
    }

    #[test]
    fn plaintext_waiting_does_not_skip() {
        let stream = message(0x1EC, &[1, 2, 3, 4]);
        let mut r = FrameReassembler::new();

        r.extend(&stream[..5]);
        assert_eq!(r.next_frame(None).unwrap(), None);
        assert!(!r.is_waiting_for_body());
    }

    #[test]
    fn impossible_sizes() {
        let mut r = FrameReassembler::new();
        r.extend(&[0, 1, 0xEC, 0x01]);
        assert_eq!(
            r.next_frame(None),
            Err(FrameError::InvalidLength { size: 1 })
        );

        let mut decrypter = DecrypterHalf::from_session_key(SESSION_KEY);
        let mut zero_size = [0_u8, 0, 0, 0];
        EncrypterHalf::from_session_key(SESSION_KEY).encrypt(&mut zero_size);
        let mut r = FrameReassembler::new();
        r.extend(&zero_size);
        assert_eq!(
            r.next_frame(Some(&mut decrypter)),
            Err(FrameError::CipherDesync { size: 0 })
        );
    }
}
