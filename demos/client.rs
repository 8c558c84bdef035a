use std::io::{Read, Write};
use std::net::TcpStream;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wow_client::auth::AuthConnection;
use wow_client::config::ClientConfig;
use wow_client::event::Event;
use wow_client::world::WorldConnection;

// Logs in, enters the world with the first character (or the one given as third argument)
// and prints chat until the connection closes.
//
// cargo run --example client -- <username> <password> [character] [config.toml]
//
// Set RUST_LOG=wow_client=debug to see every message.

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(username), Some(password)) = (args.next(), args.next()) else {
        bail!("usage: client <username> <password> [character] [config.toml]");
    };
    let character = args.next();
    let config = match args.next() {
        Some(path) => ClientConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => ClientConfig::default(),
    };

    let mut auth = AuthConnection::new(&username, &password, config.clone())?;
    let mut stream = TcpStream::connect((config.auth_host.as_str(), config.auth_port))
        .context("connecting to the login server")?;
    auth.on_connect();

    let mut buffer = [0_u8; 4096];
    let handoff = loop {
        while let Some(packet) = auth.poll_transmit() {
            stream.write_all(&packet)?;
        }
        while let Some(event) = auth.poll_event() {
            info!("{:?}", event);
        }
        if let Some(handoff) = auth.handoff() {
            break handoff;
        }

        let amount = stream.read(&mut buffer)?;
        if amount == 0 {
            auth.on_close();
            bail!("login server closed the connection");
        }
        auth.feed(&buffer[..amount])?;
    };
    drop(stream);

    let mut world = WorldConnection::from_handoff(&handoff, config);
    let mut stream = TcpStream::connect((handoff.host(), handoff.port()))
        .with_context(|| format!("connecting to realm '{}'", handoff.realm().name))?;
    world.on_connect();

    loop {
        while let Some(event) = world.poll_event() {
            match event {
                Event::CharacterEnum(characters) => {
                    let name = match &character {
                        Some(name) => name.clone(),
                        None => match characters.first() {
                            Some(c) => c.name.clone(),
                            None => bail!("account has no characters"),
                        },
                    };
                    if !world.login(&name) {
                        bail!("no character called '{}'", name);
                    }
                }
                Event::ChatMessage(message) => {
                    let sender = message.sender_name.as_deref().unwrap_or("?");
                    match &message.channel {
                        Some(channel) => info!("[{}] {}: {}", channel, sender, message.text),
                        None => info!("{}: {}", sender, message.text),
                    }
                }
                Event::PacketReceived { .. } | Event::PacketSent { .. } => {}
                event => info!("{:?}", event),
            }
        }
        while let Some(packet) = world.poll_transmit() {
            stream.write_all(&packet)?;
        }

        let amount = stream.read(&mut buffer)?;
        if amount == 0 {
            world.on_close();
            info!("World server closed the connection");
            return Ok(());
        }
        world.feed(&buffer[..amount])?;
    }
}
