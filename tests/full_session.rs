#![cfg(feature = "srp-default-math")]

use num_bigint::BigUint;
use sha1::{Digest, Sha1};
use wow_client::auth::{AuthConnection, AuthPhase, REALM_FLAG_OFFLINE};
use wow_client::config::ClientConfig;
use wow_client::event::Event;
use wow_client::header_crypto::{DecrypterHalf, EncrypterHalf};
use wow_client::world::opcodes::*;
use wow_client::world::{WorldConnection, WorldPhase, AUTH_OK};
use wow_client::{GENERATOR, LARGE_SAFE_PRIME_LITTLE_ENDIAN, SESSION_KEY_LENGTH};

const USERNAME: &str = "TESTUSER";
const PASSWORD: &str = "TESTPASS";
const SALT: [u8; 32] = [0x11; 32];
const SERVER_PRIVATE_KEY: [u8; 32] = [0x22; 32];
const CLIENT_SEED: u32 = 0xBB40E64D;
const SERVER_SEED: u32 = 0xDEADBEEF;

fn sha1(parts: &[&[u8]]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn padded_le(i: &BigUint) -> [u8; 32] {
    let mut v = [0_u8; 32];
    let bytes = i.to_bytes_le();
    v[..bytes.len()].copy_from_slice(&bytes);
    v
}

/// The login server side of SRP6.
struct LoginServer {
    n: BigUint,
    verifier: BigUint,
    server_public_key: [u8; 32],
    session_key: Option<[u8; SESSION_KEY_LENGTH as usize]>,
}

impl LoginServer {
    fn new() -> Self {
        let n = BigUint::from_bytes_le(&LARGE_SAFE_PRIME_LITTLE_ENDIAN);
        let g = BigUint::from(GENERATOR);

        let p = sha1(&[format!("{}:{}", USERNAME, PASSWORD).as_bytes()]);
        let x = BigUint::from_bytes_le(&sha1(&[&SALT, &p]));
        let verifier = g.modpow(&x, &n);

        let b = BigUint::from_bytes_le(&SERVER_PRIVATE_KEY);
        let server_public_key =
            padded_le(&((BigUint::from(3_u8) * &verifier + g.modpow(&b, &n)) % &n));

        Self {
            n,
            verifier,
            server_public_key,
            session_key: None,
        }
    }

    fn challenge_response(&self) -> Vec<u8> {
        let mut v = vec![0x00, 0x00, 0x00];
        v.extend_from_slice(&self.server_public_key);
        v.extend_from_slice(&[1, GENERATOR, 32]);
        v.extend_from_slice(&LARGE_SAFE_PRIME_LITTLE_ENDIAN);
        v.extend_from_slice(&SALT);
        v.extend_from_slice(&[0; 16]);
        v.push(0);
        v
    }

    /// Checks `M1` and returns the logon proof response with `M2`.
    fn proof_response(&mut self, logon_proof: &[u8]) -> Vec<u8> {
        assert_eq!(logon_proof.len(), 75);
        assert_eq!(logon_proof[0], 0x01);
        let client_public_key = &logon_proof[1..33];
        let client_proof = &logon_proof[33..53];

        let a = BigUint::from_bytes_le(client_public_key);
        let u = BigUint::from_bytes_le(&sha1(&[client_public_key, &self.server_public_key]));
        let b = BigUint::from_bytes_le(&SERVER_PRIVATE_KEY);
        let s = (a * self.verifier.modpow(&u, &self.n)).modpow(&b, &self.n);

        let s = padded_le(&s);
        let even: Vec<u8> = s.iter().step_by(2).copied().collect();
        let odd: Vec<u8> = s.iter().skip(1).step_by(2).copied().collect();
        let (even, odd) = (sha1(&[&even]), sha1(&[&odd]));
        let mut session_key = [0_u8; 40];
        for i in 0..20 {
            session_key[i * 2] = even[i];
            session_key[i * 2 + 1] = odd[i];
        }

        let n_hash = sha1(&[&LARGE_SAFE_PRIME_LITTLE_ENDIAN]);
        let g_hash = sha1(&[&[GENERATOR]]);
        let mut xor_hash = [0_u8; 20];
        for (i, x) in xor_hash.iter_mut().enumerate() {
            *x = n_hash[i] ^ g_hash[i];
        }
        let expected_client_proof = sha1(&[
            &xor_hash,
            &sha1(&[USERNAME.as_bytes()]),
            &SALT,
            client_public_key,
            &self.server_public_key,
            &session_key,
        ]);
        assert_eq!(client_proof, expected_client_proof);

        let server_proof = sha1(&[client_public_key, client_proof, &session_key]);
        self.session_key = Some(session_key);

        let mut v = vec![0x01, 0x00];
        v.extend_from_slice(&server_proof);
        v.extend_from_slice(&0x0080_0000_u32.to_le_bytes());
        v.extend_from_slice(&0_u32.to_le_bytes());
        v.extend_from_slice(&0_u16.to_le_bytes());
        v
    }

    fn realm_list_response(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0_u32.to_le_bytes());
        body.extend_from_slice(&2_u16.to_le_bytes());
        for (name, address, flags) in [
            ("Down", "10.0.0.1:8085", REALM_FLAG_OFFLINE),
            ("Outland", "127.0.0.1:8085", 0),
        ] {
            body.extend_from_slice(&[1, 0, flags]);
            body.extend_from_slice(name.as_bytes());
            body.push(0);
            body.extend_from_slice(address.as_bytes());
            body.push(0);
            body.extend_from_slice(&1.0_f32.to_le_bytes());
            body.extend_from_slice(&[1, 1, 1]);
        }
        body.extend_from_slice(&0x0010_u16.to_le_bytes());

        let mut v = vec![0x10];
        v.extend_from_slice(&(body.len() as u16).to_le_bytes());
        v.extend(body);
        v
    }
}

/// The world server side of the header cipher.
struct WorldServer {
    session_key: [u8; SESSION_KEY_LENGTH as usize],
    encrypter: Option<EncrypterHalf>,
    decrypter: Option<DecrypterHalf>,
}

impl WorldServer {
    fn message(&mut self, opcode: u16, body: &[u8]) -> Vec<u8> {
        let mut m = ((body.len() + 2) as u16).to_be_bytes().to_vec();
        m.extend_from_slice(&opcode.to_le_bytes());
        if let Some(e) = &mut self.encrypter {
            e.encrypt(&mut m);
        }
        m.extend_from_slice(body);
        m
    }

    fn receive(&mut self, mut m: Vec<u8>) -> (u32, Vec<u8>) {
        if let Some(d) = &mut self.decrypter {
            d.decrypt(&mut m[..6]);
        }
        let size = u16::from_be_bytes([m[0], m[1]]);
        assert_eq!(usize::from(size) + 2, m.len());
        (u32::from_le_bytes([m[2], m[3], m[4], m[5]]), m[6..].to_vec())
    }

    fn start_crypto(&mut self) {
        self.encrypter = Some(EncrypterHalf::from_session_key(self.session_key));
        self.decrypter = Some(DecrypterHalf::from_session_key(self.session_key));
    }
}

fn character_enum() -> Vec<u8> {
    let mut body = vec![1];
    body.extend_from_slice(&0x10_u64.to_le_bytes());
    body.extend_from_slice(b"Kael\0");
    body.extend_from_slice(&[10, 8]);
    body.extend_from_slice(&[0; 6]);
    body.push(70);
    body.extend_from_slice(&[0; 221]);
    body
}

fn login(chunk_size: usize) -> (WorldConnection, WorldServer) {
    let config = ClientConfig {
        client_seed: Some(CLIENT_SEED),
        ..ClientConfig::default()
    };

    // Login server
    let mut server = LoginServer::new();
    let mut auth = AuthConnection::new("testuser", "testpass", config.clone()).unwrap();
    auth.on_connect();

    let challenge = auth.poll_transmit().unwrap();
    assert_eq!(&challenge[challenge.len() - 8..], USERNAME.as_bytes());

    for chunk in server.challenge_response().chunks(chunk_size) {
        auth.feed(chunk).unwrap();
    }
    let response = server.proof_response(&auth.poll_transmit().unwrap());
    for chunk in response.chunks(chunk_size) {
        auth.feed(chunk).unwrap();
    }
    assert_eq!(auth.poll_transmit().unwrap(), [0x10, 0, 0, 0, 0]);
    for chunk in server.realm_list_response().chunks(chunk_size) {
        auth.feed(chunk).unwrap();
    }

    assert_eq!(auth.phase(), AuthPhase::Done);
    let handoff = auth.handoff().unwrap();
    assert_eq!(handoff.realm().name, "Outland");
    assert_eq!((handoff.host(), handoff.port()), ("127.0.0.1", 8085));

    let session_key = server.session_key.unwrap();
    assert_eq!(handoff.session_key(), session_key);

    // World server
    let mut server = WorldServer {
        session_key,
        encrypter: None,
        decrypter: None,
    };
    let mut world = WorldConnection::from_handoff(&handoff, config);
    world.on_connect();

    world
        .feed(&server.message(SMSG_AUTH_CHALLENGE, &SERVER_SEED.to_le_bytes()))
        .unwrap();
    let (opcode, body) = server.receive(world.poll_transmit().unwrap());
    assert_eq!(opcode, CMSG_AUTH_SESSION);
    assert_eq!(&body[8..17], b"TESTUSER\0");
    assert_eq!(&body[17..21], &CLIENT_SEED.to_le_bytes());
    let digest = sha1(&[
        USERNAME.as_bytes(),
        &0_u32.to_le_bytes(),
        &CLIENT_SEED.to_le_bytes(),
        &SERVER_SEED.to_le_bytes(),
        &session_key,
    ]);
    assert_eq!(&body[21..], &digest);

    server.start_crypto();
    (world, server)
}

#[test]
fn login_to_world() {
    let (mut world, mut server) = login(usize::MAX);

    let mut stream = server.message(SMSG_AUTH_RESPONSE, &[AUTH_OK]);
    stream.extend(server.message(SMSG_CHAR_ENUM, &character_enum()));
    world.feed(&stream).unwrap();
    assert_eq!(world.phase(), WorldPhase::CharacterSelect);

    let (opcode, _) = server.receive(world.poll_transmit().unwrap());
    assert_eq!(opcode, CMSG_CHAR_ENUM);

    assert!(world.login("Kael"));
    let (opcode, body) = server.receive(world.poll_transmit().unwrap());
    assert_eq!(opcode, CMSG_PLAYER_LOGIN);
    assert_eq!(body, 0x10_u64.to_le_bytes());

    world
        .feed(&server.message(SMSG_LOGIN_VERIFY_WORLD, &[0; 20]))
        .unwrap();
    assert_eq!(world.phase(), WorldPhase::InWorld);

    let events: Vec<Event> = std::iter::from_fn(|| world.poll_event()).collect();
    assert_eq!(events[0], Event::WorldOpened);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::CharacterEnum(c) if c[0].name == "Kael")));
    assert!(events.contains(&Event::LoginSucceeded));
}

#[test]
fn chunking_does_not_change_the_result() {
    for chunk_size in [1, 2, 3, 4, 5, 7, 64] {
        let (mut world, mut server) = login(chunk_size);

        let mut stream = server.message(SMSG_AUTH_RESPONSE, &[AUTH_OK]);
        stream.extend(server.message(SMSG_CHAR_ENUM, &character_enum()));
        stream.extend(server.message(SMSG_NOTIFICATION, b"Hello\0"));

        for chunk in stream.chunks(chunk_size) {
            world.feed(chunk).unwrap();
        }

        let received: Vec<u16> = std::iter::from_fn(|| world.poll_event())
            .filter_map(|e| match e {
                Event::PacketReceived { opcode, .. } => Some(opcode),
                _ => None,
            })
            .collect();
        assert_eq!(
            received,
            [
                SMSG_AUTH_CHALLENGE,
                SMSG_AUTH_RESPONSE,
                SMSG_CHAR_ENUM,
                SMSG_NOTIFICATION
            ],
            "chunk size {}",
            chunk_size
        );
        assert_eq!(world.characters().len(), 1);
    }
}

#[test]
fn header_boundary_splits() {
    let body = character_enum();
    let header_end = 4;

    for split in [header_end, 1, header_end + 1] {
        let (mut world, mut server) = login(usize::MAX);
        world
            .feed(&server.message(SMSG_AUTH_RESPONSE, &[AUTH_OK]))
            .unwrap();

        let message = server.message(SMSG_CHAR_ENUM, &body);
        world.feed(&message[..split]).unwrap();
        assert!(world.characters().is_empty());
        world.feed(&message[split..]).unwrap();
        assert_eq!(world.characters()[0].name, "Kael", "split at {}", split);
    }
}
