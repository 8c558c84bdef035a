//! Realm list parsing and selection.

use crate::error::{MessageError, RealmError};
use crate::message::MessageReader;

/// Realm can not be connected to.
pub const REALM_FLAG_INVALID: u8 = 0x01;
/// Realm is down.
pub const REALM_FLAG_OFFLINE: u8 = 0x02;
/// The record carries the version the realm runs.
pub const REALM_FLAG_SPECIFY_BUILD: u8 = 0x04;
/// Realm is not accepting more players.
pub const REALM_FLAG_FULL: u8 = 0x80;

const REALM_FLAGS_UNAVAILABLE: u8 = REALM_FLAG_INVALID | REALM_FLAG_OFFLINE | REALM_FLAG_FULL;

/// Client version a realm runs, only present with [`REALM_FLAG_SPECIFY_BUILD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmVersion {
    /// Major, minor and patch version.
    pub version: [u8; 3],
    /// Build number.
    pub build: u16,
}

/// Entry of the realm list.
#[derive(Debug, Clone, PartialEq)]
pub struct Realm {
    /// PvP, PvE, RP and so on.
    pub realm_type: u8,
    /// Whether the realm is locked for new characters.
    pub locked: bool,
    /// `REALM_FLAG_*` bits.
    pub flags: u8,
    /// Display name.
    pub name: String,
    /// World server address as `host:port`.
    pub address: String,
    /// Relative population.
    pub population: f32,
    /// Characters the account has on the realm.
    pub characters: u8,
    /// Realm category, like a language or region.
    pub category: u8,
    /// Realm id.
    pub id: u8,
    /// Only set with [`REALM_FLAG_SPECIFY_BUILD`].
    pub version: Option<RealmVersion>,
}

impl Realm {
    /// Neither invalid, offline nor full.
    pub const fn is_available(&self) -> bool {
        self.flags & REALM_FLAGS_UNAVAILABLE == 0
    }

    /// Splits [`Realm::address`] into host and port.
    ///
    /// # Errors
    ///
    /// If the address is not `host:port` with a non empty host and a valid port.
    pub fn host_and_port(&self) -> Result<(&str, u16), RealmError> {
        let invalid = || RealmError::InvalidAddress(self.address.clone());

        let (host, port) = self.address.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse().map_err(|_| invalid())?;

        Ok((host, port))
    }

    fn read(r: &mut MessageReader) -> Result<Self, MessageError> {
        let realm_type = r.read_u8()?;
        let locked = r.read_u8()? != 0;
        let flags = r.read_u8()?;
        let name = r.read_cstring()?;
        let address = r.read_cstring()?;
        let population = r.read_f32()?;
        let characters = r.read_u8()?;
        let category = r.read_u8()?;
        let id = r.read_u8()?;

        let version = if flags & REALM_FLAG_SPECIFY_BUILD != 0 {
            Some(RealmVersion {
                version: r.read_array()?,
                build: r.read_u16()?,
            })
        } else {
            None
        };

        Ok(Self {
            realm_type,
            locked,
            flags,
            name,
            address,
            population,
            characters,
            category,
            id,
            version,
        })
    }
}

/// Reads the body of the realm list response.
pub(crate) fn read_realm_list(r: &mut MessageReader) -> Result<Vec<Realm>, MessageError> {
    let _unknown = r.read_u32()?;
    let count = r.read_u16()?;

    let mut realms = Vec::with_capacity(count.into());
    for _ in 0..count {
        realms.push(Realm::read(r)?);
    }

    Ok(realms)
}

/// The first realm that [is available](Realm::is_available).
///
/// # Errors
///
/// [`RealmError::NoRealmAvailable`] if every realm is invalid, offline or full.
pub fn select_realm(realms: &[Realm]) -> Result<&Realm, RealmError> {
    realms
        .iter()
        .find(|realm| realm.is_available())
        .ok_or(RealmError::NoRealmAvailable)
}
