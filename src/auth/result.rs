//! Result codes of the logon challenge and logon proof responses.

/// The step succeeded.
pub const RESULT_SUCCESS: u8 = 0x00;
/// Account closed.
pub const RESULT_FAIL_BANNED: u8 = 0x03;
/// Unknown account or wrong password.
pub const RESULT_FAIL_UNKNOWN_ACCOUNT: u8 = 0x04;
/// Client version is not accepted.
pub const RESULT_FAIL_VERSION_INVALID: u8 = 0x09;
/// Client needs a patch.
pub const RESULT_FAIL_VERSION_UPDATE: u8 = 0x0A;
/// Account temporarily suspended.
pub const RESULT_FAIL_SUSPENDED: u8 = 0x0C;
/// Account locked to another IP.
pub const RESULT_FAIL_LOCKED_ENFORCED: u8 = 0x10;
