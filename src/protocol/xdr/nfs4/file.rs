//! Data and attribute operations: ACCESS, COMMIT, GETATTR, GETFH, PUTFH,
//! READ, SETATTR, WRITE, VERIFY and NVERIFY.

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::{
    bitmap4, count4, fattr4, nfs_fh4, nfsstat4, offset4, stateid4, verifier4,
    Deserialize, NfsResult, OpStatus, Serialize,
};
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ACCESS4args {
    pub access: u32,
}
SerializeStruct!(ACCESS4args, access);
DeserializeStruct!(ACCESS4args, access);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ACCESS4resok {
    /// Access bits the server could evaluate
    pub supported: u32,
    /// Access bits granted, a subset of `supported`
    pub access: u32,
}
SerializeStruct!(ACCESS4resok, supported, access);
DeserializeStruct!(ACCESS4resok, supported, access);

pub type ACCESS4res = NfsResult<ACCESS4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct COMMIT4args {
    pub offset: offset4,
    pub count: count4,
}
SerializeStruct!(COMMIT4args, offset, count);
DeserializeStruct!(COMMIT4args, offset, count);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct COMMIT4resok {
    pub writeverf: verifier4,
}
SerializeStruct!(COMMIT4resok, writeverf);
DeserializeStruct!(COMMIT4resok, writeverf);

pub type COMMIT4res = NfsResult<COMMIT4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GETATTR4args {
    pub attr_request: bitmap4,
}
SerializeStruct!(GETATTR4args, attr_request);
DeserializeStruct!(GETATTR4args, attr_request);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GETATTR4resok {
    pub obj_attributes: fattr4,
}
SerializeStruct!(GETATTR4resok, obj_attributes);
DeserializeStruct!(GETATTR4resok, obj_attributes);

pub type GETATTR4res = NfsResult<GETATTR4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GETFH4resok {
    pub object: nfs_fh4,
}
SerializeStruct!(GETFH4resok, object);
DeserializeStruct!(GETFH4resok, object);

pub type GETFH4res = NfsResult<GETFH4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PUTFH4args {
    pub object: nfs_fh4,
}
SerializeStruct!(PUTFH4args, object);
DeserializeStruct!(PUTFH4args, object);

pub type PUTFH4res = NfsResult<()>;
pub type PUTPUBFH4res = NfsResult<()>;
pub type PUTROOTFH4res = NfsResult<()>;
pub type RESTOREFH4res = NfsResult<()>;
pub type SAVEFH4res = NfsResult<()>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct READ4args {
    pub stateid: stateid4,
    pub offset: offset4,
    pub count: count4,
}
SerializeStruct!(READ4args, stateid, offset, count);
DeserializeStruct!(READ4args, stateid, offset, count);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct READ4resok {
    pub eof: bool,
    pub data: Vec<u8>,
}
SerializeStruct!(READ4resok, eof, data);
DeserializeStruct!(READ4resok, eof, data);

pub type READ4res = NfsResult<READ4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SETATTR4args {
    /// Needed when the size changes, otherwise ignored
    pub stateid: stateid4,
    pub obj_attributes: fattr4,
}
SerializeStruct!(SETATTR4args, stateid, obj_attributes);
DeserializeStruct!(SETATTR4args, stateid, obj_attributes);

/// SETATTR reports the attributes it did set even when it fails.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SETATTR4res {
    pub status: nfsstat4,
    pub attrsset: bitmap4,
}
SerializeStruct!(SETATTR4res, status, attrsset);
DeserializeStruct!(SETATTR4res, status, attrsset);

impl OpStatus for SETATTR4res {
    fn status(&self) -> nfsstat4 {
        self.status
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum stable_how4 {
    #[default]
    UNSTABLE4 = 0,
    DATA_SYNC4 = 1,
    FILE_SYNC4 = 2,
}
SerializeEnum!(stable_how4);
DeserializeEnum!(stable_how4);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WRITE4args {
    pub stateid: stateid4,
    pub offset: offset4,
    pub stable: stable_how4,
    pub data: Vec<u8>,
}
SerializeStruct!(WRITE4args, stateid, offset, stable, data);
DeserializeStruct!(WRITE4args, stateid, offset, stable, data);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WRITE4resok {
    pub count: count4,
    pub committed: stable_how4,
    pub writeverf: verifier4,
}
SerializeStruct!(WRITE4resok, count, committed, writeverf);
DeserializeStruct!(WRITE4resok, count, committed, writeverf);

pub type WRITE4res = NfsResult<WRITE4resok>;

/// Shared by VERIFY and NVERIFY.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VERIFY4args {
    pub obj_attributes: fattr4,
}
SerializeStruct!(VERIFY4args, obj_attributes);
DeserializeStruct!(VERIFY4args, obj_attributes);

pub type NVERIFY4args = VERIFY4args;
pub type VERIFY4res = NfsResult<()>;
pub type NVERIFY4res = NfsResult<()>;
