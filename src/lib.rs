//! A client for the World of Warcraft 2.4.3 login and world protocols.
//!
//! The crate covers everything between a TCP socket and the application:
//! the SRP6 logon against the login server, realm selection, the encrypted headers of the
//! world connection, reassembly of world messages and routing them to handlers.
//!
//! **THIS SHOULD NOT BE USED FOR ANYTHING OTHER THAN WORLD OF WARCRAFT EMULATION.
//! THE CODE IS NOT CRYPTOGRAPHICALLY VERIFIED, HAS VERY LOW KEY SIZES BECAUSE OF
//! PACKET REQUIREMENTS AND MOST LIKELY CONTAINS EXPLOITS.**
//!
//! # Usage
//!
//! Neither connection does any I/O. The driver owns the sockets and moves bytes:
//!
//! 1. Create an [`AuthConnection`](auth::AuthConnection), connect to the login server and call
//! `on_connect`.
//! 2. Send everything `poll_transmit` returns and pass every received chunk to `feed`.
//! 3. Once `handoff` returns the [`WorldHandoff`](auth::WorldHandoff), close the login
//! connection and connect to the realm.
//! 4. Drive a [`WorldConnection`](world::WorldConnection) the same way and react to the
//! [`Event`](event::Event)s from `poll_event`.
//!
//! A blocking driver over `std::net::TcpStream` is in `demos/client.rs` and can be run with
//! `cargo run --example client`.
//!
//! The crate is split into:
//! * An [`auth`] module with the login server connection and realm list.
//! * A [`world`] module with the world server connection, reassembly and handlers.
//! * A [`srp`] module with the SRP6 calculations.
//! * A [`header_crypto`] module with the world header cipher.
//! * A [`message`] module for reading and writing message bodies.
//! * A [`dispatch`] module mapping opcodes to handlers.
//! * An [`event`] module with the notifications for the application.
//! * A [`config`] module with the client identity, loadable from TOML.
//! * An [`error`] module for errors that are shared by all modules.
//! * A [`normalized_string`] module used for all modules to correctly handle strings.
//!
//! # Logging
//!
//! Everything is logged through [`tracing`](https://docs.rs/tracing). Secrets are never logged.
//!
//! # Other implementations
//!
//! * [Ember](https://github.com/EmberEmu/Ember/tree/development/src/libs/srp6) is a C++ implementation for 1.12 with a clean, tested implementation of the protocol.
//! * [WoWCore](https://github.com/RomanRom2/WoWCore/blob/92b7646c2bafb22ad6dca0acc9496a35561292c4/05875_1.12.1/pas/sandbox/AuthServer.pas#L133) is a Pascal implementation that has 1.12, 2.4.3 and 3.3.5 versions.

#![forbid(unsafe_code)]
#![warn(
    clippy::perf,
    clippy::correctness,
    clippy::style,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown,
    clippy::unseparated_literal_suffix,
    missing_docs
)]

pub use key::PublicKey;
pub use key::PROOF_LENGTH;
pub use key::PUBLIC_KEY_LENGTH;
pub use key::SALT_LENGTH;
pub use key::SESSION_KEY_LENGTH;
pub use primes::GENERATOR;
pub use primes::GENERATOR_LENGTH;
pub use primes::LARGE_SAFE_PRIME_BIG_ENDIAN;
pub use primes::LARGE_SAFE_PRIME_LENGTH;
pub use primes::LARGE_SAFE_PRIME_LITTLE_ENDIAN;

pub mod auth;
pub(crate) mod bigint;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod header_crypto;
mod key;
pub mod message;
pub mod normalized_string;
pub(crate) mod primes;
pub mod srp;
pub(crate) mod srp_internal;
pub mod world;
