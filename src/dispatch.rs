//! Opcode to handler routing.
//!
//! Each protocol phase builds one [`Dispatcher`] the first time it is needed and only reads from
//! it afterwards. Handlers are plain function pointers that receive the connection state explicitly,
//! so a table can be shared by every connection of that phase.
//!
//! ```
//! use wow_client::dispatch::{Dispatch, Dispatcher};
//! use wow_client::error::ClientError;
//! use wow_client::message::MessageReader;
//!
//! #[derive(Default)]
//! struct Counter {
//!     total: u32,
//! }
//!
//! fn add(state: &mut Counter, r: &mut MessageReader) -> Result<(), ClientError> {
//!     state.total += r.read_u32()?;
//!     Ok(())
//! }
//!
//! let mut dispatcher: Dispatcher<u16, Counter> = Dispatcher::new();
//! dispatcher.register(0x01, add);
//!
//! let mut state = Counter::default();
//! let body = 5_u32.to_le_bytes();
//! let r = dispatcher.dispatch(0x01, &mut state, &mut MessageReader::new(&body));
//! assert_eq!(r.unwrap(), Dispatch::Handled);
//! assert_eq!(state.total, 5);
//!
//! let r = dispatcher.dispatch(0x02, &mut state, &mut MessageReader::new(&body));
//! assert_eq!(r.unwrap(), Dispatch::Ignored);
//! ```

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;

use crate::error::ClientError;
use crate::message::MessageReader;

/// Handler for a single opcode.
///
/// Receives the connection state and a reader positioned at the start of the message body.
pub type Handler<S> = fn(&mut S, &mut MessageReader<'_>) -> Result<(), ClientError>;

/// Outcome of [`Dispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran and returned successfully.
    Handled,
    /// No handler is registered for the opcode. Nothing was read.
    Ignored,
}

/// Registry from opcode to [`Handler`].
pub struct Dispatcher<O, S> {
    handlers: HashMap<O, Handler<S>>,
}

impl<O: Copy + Eq + Hash, S> Dispatcher<O, S> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `opcode`, replacing any previous handler.
    pub fn register(&mut self, opcode: O, handler: Handler<S>) -> &mut Self {
        self.handlers.insert(opcode, handler);
        self
    }

    /// Whether a handler exists for `opcode`.
    pub fn is_registered(&self, opcode: O) -> bool {
        self.handlers.contains_key(&opcode)
    }

    /// Runs the handler registered for `opcode`, if any.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns.
    pub fn dispatch(
        &self,
        opcode: O,
        state: &mut S,
        reader: &mut MessageReader<'_>,
    ) -> Result<Dispatch, ClientError> {
        match self.handlers.get(&opcode) {
            Some(handler) => {
                handler(state, reader)?;
                Ok(Dispatch::Handled)
            }
            None => Ok(Dispatch::Ignored),
        }
    }
}

impl<O: Copy + Eq + Hash, S> Default for Dispatcher<O, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Debug, S> Debug for Dispatcher<O, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod test {
    use crate::dispatch::{Dispatch, Dispatcher};
    use crate::error::{ClientError, MessageError};
    use crate::message::MessageReader;

    fn first(state: &mut Vec<u8>, _: &mut MessageReader) -> Result<(), ClientError> {
        state.push(1);
        Ok(())
    }

    fn second(state: &mut Vec<u8>, r: &mut MessageReader) -> Result<(), ClientError> {
        state.push(r.read_u8()?);
        Ok(())
    }

    #[test]
    fn later_registration_overwrites() {
        let mut d: Dispatcher<u8, Vec<u8>> = Dispatcher::new();
        d.register(7, first).register(7, second);

        let mut state = Vec::new();
        let r = d.dispatch(7, &mut state, &mut MessageReader::new(&[42]));
        assert_eq!(r.unwrap(), Dispatch::Handled);
        assert_eq!(state, [42]);
    }

    #[test]
    fn unknown_opcode_is_ignored() {
        let mut d: Dispatcher<u16, Vec<u8>> = Dispatcher::new();
        d.register(1, first);
        assert!(d.is_registered(1));
        assert!(!d.is_registered(2));

        let mut state = Vec::new();
        let mut reader = MessageReader::new(&[1, 2, 3]);
        let r = d.dispatch(2, &mut state, &mut reader);
        assert_eq!(r.unwrap(), Dispatch::Ignored);
        assert!(state.is_empty());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn handler_errors_are_returned() {
        let mut d: Dispatcher<u16, Vec<u8>> = Dispatcher::new();
        d.register(1, second);

        let mut state = Vec::new();
        let r = d.dispatch(1, &mut state, &mut MessageReader::new(&[]));
        assert!(matches!(
            r,
            Err(ClientError::Message(MessageError::Underflow { needed: 1 }))
        ));
    }
}
