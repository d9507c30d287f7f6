//! Server configuration.
//!
//! `ServerConfig` holds the limits and identifiers a server advertises to
//! clients through file attributes and enforces on requests. Every
//! connection context shares one configuration.

use crate::protocol::xdr::nfs4::fsid4;

/// Default lease period in seconds.
pub const DEFAULT_LEASE_TIME: u32 = 90;
/// Default maximum READ and WRITE payload in bytes.
pub const DEFAULT_MAX_IO: u32 = 1024 * 1024;
/// Default maximum length of a name component in bytes.
pub const DEFAULT_MAX_NAME_LEN: u32 = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Lease period advertised through the `lease_time` attribute
    pub lease_time: u32,
    /// Largest READ reply payload; longer requests are shortened
    pub max_read: u32,
    /// Largest WRITE payload accepted
    pub max_write: u32,
    /// Longest name component accepted (NFS4ERR_NAMETOOLONG beyond)
    pub max_name_len: u32,
    /// File system id reported for every object
    pub fsid: fsid4,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            lease_time: DEFAULT_LEASE_TIME,
            max_read: DEFAULT_MAX_IO,
            max_write: DEFAULT_MAX_IO,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            fsid: fsid4 { major: 0, minor: 0 },
        }
    }
}

impl ServerConfig {
    pub fn with_lease_time(mut self, seconds: u32) -> Self {
        self.lease_time = seconds;
        self
    }

    pub fn with_max_read(mut self, bytes: u32) -> Self {
        self.max_read = bytes;
        self
    }

    pub fn with_max_write(mut self, bytes: u32) -> Self {
        self.max_write = bytes;
        self
    }

    pub fn with_max_name_len(mut self, bytes: u32) -> Self {
        self.max_name_len = bytes;
        self
    }

    pub fn with_fsid(mut self, major: u64, minor: u64) -> Self {
        self.fsid = fsid4 { major, minor };
        self
    }
}
