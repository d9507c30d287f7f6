//! The module defines XDR data types and constants for Network File System (NFS)
//! version 4.0, as defined in RFC 7530 and RFC 7531.
//!
//! Unlike version 3, NFSv4 is stateful and has exactly two RPC procedures:
//! NULL and COMPOUND. Every file system operation travels as one element of
//! a COMPOUND request, and the server keeps per-client state (open owners,
//! stateids, share reservations, byte-range locks) between requests.
//!
//! Sub-modules group the per-operation argument and result structures:
//!
//! - `attr`: the `fattr4` attribute numbers and a typed attribute view
//! - `open`: OPEN, OPEN_CONFIRM, OPEN_DOWNGRADE and CLOSE
//! - `lock`: LOCK, LOCKT, LOCKU and RELEASE_LOCKOWNER
//! - `dir`: name space operations (LOOKUP, CREATE, READDIR, ...)
//! - `file`: data and attribute operations (READ, WRITE, GETATTR, ...)
//! - `client`: client id establishment (SETCLIENTID, RENEW, ...)
//! - `compound`: the `nfs_argop4`/`nfs_resop4` unions and COMPOUND itself

// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]
#![allow(clippy::upper_case_acronyms)]

use std::fmt;
use std::io::{Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use num_derive::{FromPrimitive, ToPrimitive};
use smallvec::SmallVec;

use super::{deserialize, utils, Deserialize, Serialize, UsizeAsU32};
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

pub mod attr;
pub mod client;
pub mod compound;
pub mod dir;
pub mod file;
pub mod lock;
pub mod open;

pub use attr::FileAttributes;
pub use compound::{nfs_argop4, nfs_resop4, COMPOUND4args, COMPOUND4res};

/// The RPC program number of the NFS service.
pub const PROGRAM: u32 = 100003;
/// The version number of the NFSv4 protocol.
pub const VERSION: u32 = 4;
/// The only minor version this implementation speaks.
pub const MINOR_VERSION: u32 = 0;

/// NULL procedure, does nothing.
pub const NFSPROC4_NULL: u32 = 0;
/// COMPOUND procedure, carries all NFSv4 operations.
pub const NFSPROC4_COMPOUND: u32 = 1;

// Section 2.2 of RFC 7531
/// Maximum size in bytes of a file handle.
pub const NFS4_FHSIZE: usize = 128;
/// Size in bytes of a verifier.
pub const NFS4_VERIFIER_SIZE: usize = 8;
/// Size in bytes of the `other` field of a stateid.
pub const NFS4_OTHER_SIZE: usize = 12;
/// Maximum size of owner and client id opaque strings.
pub const NFS4_OPAQUE_LIMIT: usize = 1024;

pub const NFS4_INT64_MAX: i64 = 0x7fffffffffffffff;
pub const NFS4_UINT64_MAX: u64 = 0xffffffffffffffff;
pub const NFS4_INT32_MAX: i32 = 0x7fffffff;
pub const NFS4_UINT32_MAX: u32 = 0xffffffff;

// ACCESS bits
pub const ACCESS4_READ: u32 = 0x00000001;
pub const ACCESS4_LOOKUP: u32 = 0x00000002;
pub const ACCESS4_MODIFY: u32 = 0x00000004;
pub const ACCESS4_EXTEND: u32 = 0x00000008;
pub const ACCESS4_DELETE: u32 = 0x00000010;
pub const ACCESS4_EXECUTE: u32 = 0x00000020;

// Share reservation bits carried by OPEN and OPEN_DOWNGRADE
pub const OPEN4_SHARE_ACCESS_READ: u32 = 0x00000001;
pub const OPEN4_SHARE_ACCESS_WRITE: u32 = 0x00000002;
pub const OPEN4_SHARE_ACCESS_BOTH: u32 = 0x00000003;
pub const OPEN4_SHARE_DENY_NONE: u32 = 0x00000000;
pub const OPEN4_SHARE_DENY_READ: u32 = 0x00000001;
pub const OPEN4_SHARE_DENY_WRITE: u32 = 0x00000002;
pub const OPEN4_SHARE_DENY_BOTH: u32 = 0x00000003;

// OPEN result flags
/// The client must confirm the open with OPEN_CONFIRM.
pub const OPEN4_RESULT_CONFIRM: u32 = 0x00000002;
/// The server uses POSIX byte-range lock semantics.
pub const OPEN4_RESULT_LOCKTYPE_POSIX: u32 = 0x00000004;

/// File handle expiry type: handles persist until the object is removed.
pub const FH4_PERSISTENT: u32 = 0x00000000;

// ACE types and mask bits used by the `acl` attribute
pub const ACE4_ACCESS_ALLOWED_ACE_TYPE: u32 = 0x00000000;
pub const ACE4_ACCESS_DENIED_ACE_TYPE: u32 = 0x00000001;
pub const ACL4_SUPPORT_ALLOW_ACL: u32 = 0x00000001;
pub const ACL4_SUPPORT_DENY_ACL: u32 = 0x00000002;

/// Status codes returned by every NFSv4 operation (RFC 7530 section 13).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfsstat4 {
    #[default]
    NFS4_OK = 0,
    NFS4ERR_PERM = 1,
    NFS4ERR_NOENT = 2,
    NFS4ERR_IO = 5,
    NFS4ERR_NXIO = 6,
    NFS4ERR_ACCESS = 13,
    NFS4ERR_EXIST = 17,
    NFS4ERR_XDEV = 18,
    NFS4ERR_NOTDIR = 20,
    NFS4ERR_ISDIR = 21,
    NFS4ERR_INVAL = 22,
    NFS4ERR_FBIG = 27,
    NFS4ERR_NOSPC = 28,
    NFS4ERR_ROFS = 30,
    NFS4ERR_MLINK = 31,
    NFS4ERR_NAMETOOLONG = 63,
    NFS4ERR_NOTEMPTY = 66,
    NFS4ERR_DQUOT = 69,
    NFS4ERR_STALE = 70,
    NFS4ERR_BADHANDLE = 10001,
    NFS4ERR_BAD_COOKIE = 10003,
    NFS4ERR_NOTSUPP = 10004,
    NFS4ERR_TOOSMALL = 10005,
    NFS4ERR_SERVERFAULT = 10006,
    NFS4ERR_BADTYPE = 10007,
    NFS4ERR_DELAY = 10008,
    NFS4ERR_SAME = 10009,
    NFS4ERR_DENIED = 10010,
    NFS4ERR_EXPIRED = 10011,
    NFS4ERR_LOCKED = 10012,
    NFS4ERR_GRACE = 10013,
    NFS4ERR_FHEXPIRED = 10014,
    NFS4ERR_SHARE_DENIED = 10015,
    NFS4ERR_WRONGSEC = 10016,
    NFS4ERR_CLID_INUSE = 10017,
    NFS4ERR_RESOURCE = 10018,
    NFS4ERR_MOVED = 10019,
    NFS4ERR_NOFILEHANDLE = 10020,
    NFS4ERR_MINOR_VERS_MISMATCH = 10021,
    NFS4ERR_STALE_CLIENTID = 10022,
    NFS4ERR_STALE_STATEID = 10023,
    NFS4ERR_OLD_STATEID = 10024,
    NFS4ERR_BAD_STATEID = 10025,
    NFS4ERR_BAD_SEQID = 10026,
    NFS4ERR_NOT_SAME = 10027,
    NFS4ERR_LOCK_RANGE = 10028,
    NFS4ERR_SYMLINK = 10029,
    NFS4ERR_RESTOREFH = 10030,
    NFS4ERR_LEASE_MOVED = 10031,
    NFS4ERR_ATTRNOTSUPP = 10032,
    NFS4ERR_NO_GRACE = 10033,
    NFS4ERR_RECLAIM_BAD = 10034,
    NFS4ERR_RECLAIM_CONFLICT = 10035,
    NFS4ERR_BADXDR = 10036,
    NFS4ERR_LOCKS_HELD = 10037,
    NFS4ERR_OPENMODE = 10038,
    NFS4ERR_BADOWNER = 10039,
    NFS4ERR_BADCHAR = 10040,
    NFS4ERR_BADNAME = 10041,
    NFS4ERR_BAD_RANGE = 10042,
    NFS4ERR_LOCK_NOTSUPP = 10043,
    NFS4ERR_OP_ILLEGAL = 10044,
    NFS4ERR_DEADLOCK = 10045,
    NFS4ERR_FILE_OPEN = 10046,
    NFS4ERR_ADMIN_REVOKED = 10047,
    NFS4ERR_CB_PATH_DOWN = 10048,
}
SerializeEnum!(nfsstat4);
DeserializeEnum!(nfsstat4);

impl nfsstat4 {
    pub fn is_ok(&self) -> bool {
        *self == nfsstat4::NFS4_OK
    }
}

impl fmt::Display for nfsstat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, *self as u32)
    }
}

/// File types (`nfs_ftype4`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfs_ftype4 {
    /// Regular file
    #[default]
    NF4REG = 1,
    /// Directory
    NF4DIR = 2,
    /// Special file, block device
    NF4BLK = 3,
    /// Special file, character device
    NF4CHR = 4,
    /// Symbolic link
    NF4LNK = 5,
    /// Special file, socket
    NF4SOCK = 6,
    /// Special file, fifo
    NF4FIFO = 7,
    /// Attribute directory
    NF4ATTRDIR = 8,
    /// Named attribute
    NF4NAMEDATTR = 9,
}
SerializeEnum!(nfs_ftype4);
DeserializeEnum!(nfs_ftype4);

/// Operation numbers of the COMPOUND procedure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfs_opnum4 {
    OP_ACCESS = 3,
    OP_CLOSE = 4,
    OP_COMMIT = 5,
    OP_CREATE = 6,
    OP_DELEGPURGE = 7,
    OP_DELEGRETURN = 8,
    OP_GETATTR = 9,
    OP_GETFH = 10,
    OP_LINK = 11,
    OP_LOCK = 12,
    OP_LOCKT = 13,
    OP_LOCKU = 14,
    OP_LOOKUP = 15,
    OP_LOOKUPP = 16,
    OP_NVERIFY = 17,
    OP_OPEN = 18,
    OP_OPENATTR = 19,
    OP_OPEN_CONFIRM = 20,
    OP_OPEN_DOWNGRADE = 21,
    OP_PUTFH = 22,
    OP_PUTPUBFH = 23,
    OP_PUTROOTFH = 24,
    OP_READ = 25,
    OP_READDIR = 26,
    OP_READLINK = 27,
    OP_REMOVE = 28,
    OP_RENAME = 29,
    OP_RENEW = 30,
    OP_RESTOREFH = 31,
    OP_SAVEFH = 32,
    OP_SECINFO = 33,
    OP_SETATTR = 34,
    OP_SETCLIENTID = 35,
    OP_SETCLIENTID_CONFIRM = 36,
    OP_VERIFY = 37,
    OP_WRITE = 38,
    OP_RELEASE_LOCKOWNER = 39,
    OP_ILLEGAL = 10044,
}
SerializeEnum!(nfs_opnum4);
DeserializeEnum!(nfs_opnum4);

pub type attrlist4 = Vec<u8>;
pub type changeid4 = u64;
pub type clientid4 = u64;
pub type count4 = u32;
pub type length4 = u64;
pub type nfs_cookie4 = u64;
pub type offset4 = u64;
pub type qop4 = u32;
pub type seqid4 = u32;
pub type sec_oid4 = Vec<u8>;
pub type verifier4 = [u8; NFS4_VERIFIER_SIZE];
/// `utf8str_cs`: case-sensitive UTF-8 string
pub type utf8str_cs = String;
/// `utf8str_mixed`: used for owner and group names
pub type utf8str_mixed = String;
/// A single path component
pub type component4 = String;
/// Symbolic link contents
pub type linktext4 = String;
/// Sequence of path components
pub type pathname4 = Vec<component4>;

/// Opaque file handle (`nfs_fh4`), at most [`NFS4_FHSIZE`] bytes.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct nfs_fh4 {
    pub data: Vec<u8>,
}

impl fmt::Debug for nfs_fh4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fh(")?;
        for b in &self.data {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

impl Serialize for nfs_fh4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.data.serialize(dest)
    }
}

impl Deserialize for nfs_fh4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.data.deserialize(src)?;
        if self.data.len() > NFS4_FHSIZE {
            return Err(utils::invalid_data("file handle longer than NFS4_FHSIZE"));
        }
        Ok(())
    }
}

/// Time value with nanosecond precision (`nfstime4`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct nfstime4 {
    pub seconds: i64,
    pub nseconds: u32,
}
SerializeStruct!(nfstime4, seconds, nseconds);
DeserializeStruct!(nfstime4, seconds, nseconds);

impl nfstime4 {
    pub fn now() -> nfstime4 {
        filetime::FileTime::now().into()
    }
}

impl From<SystemTime> for nfstime4 {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => nfstime4 { seconds: d.as_secs() as i64, nseconds: d.subsec_nanos() },
            Err(e) => {
                let d = e.duration();
                if d.subsec_nanos() == 0 {
                    nfstime4 { seconds: -(d.as_secs() as i64), nseconds: 0 }
                } else {
                    nfstime4 {
                        seconds: -(d.as_secs() as i64) - 1,
                        nseconds: 1_000_000_000 - d.subsec_nanos(),
                    }
                }
            }
        }
    }
}

impl From<filetime::FileTime> for nfstime4 {
    fn from(time: filetime::FileTime) -> Self {
        nfstime4 { seconds: time.unix_seconds(), nseconds: time.nanoseconds() }
    }
}

impl From<nfstime4> for filetime::FileTime {
    fn from(time: nfstime4) -> Self {
        filetime::FileTime::from_unix_time(time.seconds, time.nseconds)
    }
}

impl From<nfstime4> for Duration {
    fn from(time: nfstime4) -> Self {
        Duration::new(time.seconds.max(0) as u64, time.nseconds)
    }
}

/// Selector of [`settime4`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum time_how4 {
    #[default]
    SET_TO_SERVER_TIME4 = 0,
    SET_TO_CLIENT_TIME4 = 1,
}
SerializeEnum!(time_how4);
DeserializeEnum!(time_how4);

/// Time value used by the settable time attributes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum settime4 {
    #[default]
    SET_TO_SERVER_TIME4,
    SET_TO_CLIENT_TIME4(nfstime4),
}

impl Serialize for settime4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            settime4::SET_TO_SERVER_TIME4 => time_how4::SET_TO_SERVER_TIME4.serialize(dest),
            settime4::SET_TO_CLIENT_TIME4(time) => {
                time_how4::SET_TO_CLIENT_TIME4.serialize(dest)?;
                time.serialize(dest)
            }
        }
    }
}

impl Deserialize for settime4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<time_how4>(src)? {
            time_how4::SET_TO_SERVER_TIME4 => settime4::SET_TO_SERVER_TIME4,
            time_how4::SET_TO_CLIENT_TIME4 => settime4::SET_TO_CLIENT_TIME4(deserialize(src)?),
        };
        Ok(())
    }
}

/// Device numbers of block and character special files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct specdata4 {
    pub specdata1: u32,
    pub specdata2: u32,
}
SerializeStruct!(specdata4, specdata1, specdata2);
DeserializeStruct!(specdata4, specdata1, specdata2);

/// File system identifier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct fsid4 {
    pub major: u64,
    pub minor: u64,
}
SerializeStruct!(fsid4, major, minor);
DeserializeStruct!(fsid4, major, minor);

/// Access control entry of the `acl` attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct nfsace4 {
    pub acetype: u32,
    pub flag: u32,
    pub access_mask: u32,
    pub who: utf8str_mixed,
}
SerializeStruct!(nfsace4, acetype, flag, access_mask, who);
DeserializeStruct!(nfsace4, acetype, flag, access_mask, who);

/// Identifies a specific open or lock instance.
///
/// Equality is exact on both fields. The all-zero and all-ones `other`
/// values are the special anonymous and read-bypass stateids.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct stateid4 {
    pub seqid: u32,
    pub other: [u8; NFS4_OTHER_SIZE],
}
SerializeStruct!(stateid4, seqid, other);
DeserializeStruct!(stateid4, seqid, other);

impl stateid4 {
    /// The anonymous stateid, all fields zero.
    pub const ANONYMOUS: stateid4 = stateid4 { seqid: 0, other: [0; NFS4_OTHER_SIZE] };
    /// The READ bypass stateid, all bits set.
    pub const READ_BYPASS: stateid4 =
        stateid4 { seqid: NFS4_UINT32_MAX, other: [0xff; NFS4_OTHER_SIZE] };

    /// Special stateids are never issued by the server; they let clients do
    /// I/O without holding an open.
    pub fn is_special(&self) -> bool {
        self.other == [0; NFS4_OTHER_SIZE] || self.other == [0xff; NFS4_OTHER_SIZE]
    }
}

impl fmt::Debug for stateid4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stateid({}, ", self.seqid)?;
        for b in &self.other {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// Owner of opens or locks: a client id plus an opaque owner string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct state_owner4 {
    pub clientid: clientid4,
    pub owner: Vec<u8>,
}
SerializeStruct!(state_owner4, clientid, owner);

impl Deserialize for state_owner4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.clientid.deserialize(src)?;
        self.owner.deserialize(src)?;
        if self.owner.len() > NFS4_OPAQUE_LIMIT {
            return Err(utils::invalid_data("owner longer than NFS4_OPAQUE_LIMIT"));
        }
        Ok(())
    }
}

pub type open_owner4 = state_owner4;
pub type lock_owner4 = state_owner4;

/// Attribute mask: bit `i` of word `w` selects attribute `32 * w + i`.
///
/// Trailing zero words carry no meaning, so two masks that differ only in
/// such padding compare equal.
#[derive(Clone, Debug, Default)]
pub struct bitmap4(pub SmallVec<[u32; 2]>);

impl bitmap4 {
    pub fn new() -> bitmap4 {
        bitmap4::default()
    }

    /// Builds a mask with the given attribute numbers set.
    pub fn from_attrs(attrs: &[u32]) -> bitmap4 {
        let mut mask = bitmap4::new();
        for attr in attrs {
            mask.set(*attr);
        }
        mask
    }

    pub fn set(&mut self, attr: u32) {
        let word = (attr / 32) as usize;
        if self.0.len() <= word {
            self.0.resize(word + 1, 0);
        }
        self.0[word] |= 1 << (attr % 32);
    }

    pub fn is_set(&self, attr: u32) -> bool {
        self.0.get((attr / 32) as usize).is_some_and(|word| word & (1 << (attr % 32)) != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|word| *word == 0)
    }

    /// Attribute numbers that are set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().enumerate().flat_map(|(w, word)| {
            (0..32).filter(move |bit| word & (1 << bit) != 0).map(move |bit| w as u32 * 32 + bit)
        })
    }

    /// Bits set in both masks.
    pub fn intersection(&self, other: &bitmap4) -> bitmap4 {
        bitmap4(self.0.iter().zip(other.0.iter()).map(|(a, b)| a & b).collect())
    }

    fn significant_words(&self) -> &[u32] {
        let len = self.0.iter().rposition(|word| *word != 0).map_or(0, |pos| pos + 1);
        &self.0[..len]
    }
}

impl PartialEq for bitmap4 {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for bitmap4 {}

impl Serialize for bitmap4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.as_slice().serialize(dest)
    }
}

impl Deserialize for bitmap4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let length = deserialize::<UsizeAsU32>(src)?.0;
        self.0.clear();
        for _ in 0..length {
            self.0.push(deserialize::<u32>(src)?);
        }
        Ok(())
    }
}

/// Encoded attributes: a mask plus the values of the selected attributes
/// concatenated in ascending attribute number order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct fattr4 {
    pub attrmask: bitmap4,
    pub attr_vals: attrlist4,
}
SerializeStruct!(fattr4, attrmask, attr_vals);
DeserializeStruct!(fattr4, attrmask, attr_vals);

/// Directory change information returned by operations that modify a directory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct change_info4 {
    pub atomic: bool,
    pub before: changeid4,
    pub after: changeid4,
}
SerializeStruct!(change_info4, atomic, before, after);
DeserializeStruct!(change_info4, atomic, before, after);

/// Access to the status of any operation result.
pub trait OpStatus {
    fn status(&self) -> nfsstat4;
}

/// Result of an operation whose failure arm carries no data:
///
/// ```text
/// union XXX4res switch (nfsstat4 status) {
///  case NFS4_OK:
///      XXX4resok resok4;
///  default:
///      void;
/// };
/// ```
///
/// `NfsResult<()>` models the results that consist of a bare status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NfsResult<T> {
    Ok(T),
    Err(nfsstat4),
}

impl<T> NfsResult<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            NfsResult::Ok(v) => Some(v),
            NfsResult::Err(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, nfsstat4> {
        self.into()
    }
}

impl<T> OpStatus for NfsResult<T> {
    fn status(&self) -> nfsstat4 {
        match self {
            NfsResult::Ok(_) => nfsstat4::NFS4_OK,
            NfsResult::Err(stat) => *stat,
        }
    }
}

impl<T> Default for NfsResult<T> {
    fn default() -> Self {
        NfsResult::Err(nfsstat4::NFS4ERR_SERVERFAULT)
    }
}

impl<T> From<Result<T, nfsstat4>> for NfsResult<T> {
    fn from(res: Result<T, nfsstat4>) -> Self {
        match res {
            Ok(v) => NfsResult::Ok(v),
            Err(stat) => NfsResult::Err(stat),
        }
    }
}

impl<T> From<NfsResult<T>> for Result<T, nfsstat4> {
    fn from(res: NfsResult<T>) -> Self {
        match res {
            NfsResult::Ok(v) => Ok(v),
            NfsResult::Err(stat) => Err(stat),
        }
    }
}

impl<T: Serialize> Serialize for NfsResult<T> {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            NfsResult::Ok(v) => {
                nfsstat4::NFS4_OK.serialize(dest)?;
                v.serialize(dest)
            }
            NfsResult::Err(stat) => stat.serialize(dest),
        }
    }
}

impl<T: Deserialize + Default> Deserialize for NfsResult<T> {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<nfsstat4>(src)? {
            nfsstat4::NFS4_OK => NfsResult::Ok(deserialize(src)?),
            stat => NfsResult::Err(stat),
        };
        Ok(())
    }
}
