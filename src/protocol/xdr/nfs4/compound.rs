//! The COMPOUND procedure (RFC 7530 section 15.2).
//!
//! A COMPOUND request is a tag, a minor version and an ordered array of
//! operations. The server runs them in order and stops at the first one
//! that does not return NFS4_OK, so the result array may be shorter than
//! the argument array.

use std::io::{Read, Write};

use num_traits::FromPrimitive;

use super::client::*;
use super::dir::*;
use super::file::*;
use super::lock::*;
use super::open::*;
use super::{
    deserialize, nfs_opnum4, nfsstat4, utf8str_cs, utils, Deserialize, NfsResult, OpStatus,
    Serialize, UsizeAsU32,
};
use crate::{DeserializeStruct, SerializeStruct};

macro_rules! operations {
    ($($op:ident($args:ty, $res:ty),)*) => {
        /// One operation of a COMPOUND request, tagged by its opcode.
        ///
        /// An opcode this implementation does not know decodes as
        /// [`nfs_argop4::OP_ILLEGAL`]; nothing after it can be decoded.
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub enum nfs_argop4 {
            $($op($args),)*
            #[default]
            OP_ILLEGAL,
        }

        /// One operation result of a COMPOUND reply.
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum nfs_resop4 {
            $($op($res),)*
            OP_ILLEGAL(NfsResult<()>),
        }

        impl nfs_argop4 {
            pub fn opnum(&self) -> nfs_opnum4 {
                match self {
                    $(nfs_argop4::$op(_) => nfs_opnum4::$op,)*
                    nfs_argop4::OP_ILLEGAL => nfs_opnum4::OP_ILLEGAL,
                }
            }
        }

        impl nfs_resop4 {
            pub fn opnum(&self) -> nfs_opnum4 {
                match self {
                    $(nfs_resop4::$op(_) => nfs_opnum4::$op,)*
                    nfs_resop4::OP_ILLEGAL(_) => nfs_opnum4::OP_ILLEGAL,
                }
            }
        }

        impl OpStatus for nfs_resop4 {
            fn status(&self) -> nfsstat4 {
                match self {
                    $(nfs_resop4::$op(res) => res.status(),)*
                    nfs_resop4::OP_ILLEGAL(res) => res.status(),
                }
            }
        }

        impl Serialize for nfs_argop4 {
            fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
                self.opnum().serialize(dest)?;
                match self {
                    $(nfs_argop4::$op(args) => args.serialize(dest),)*
                    nfs_argop4::OP_ILLEGAL => Ok(()),
                }
            }
        }

        impl Deserialize for nfs_argop4 {
            fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                *self = match nfs_opnum4::from_u32(deserialize::<u32>(src)?) {
                    $(Some(nfs_opnum4::$op) => nfs_argop4::$op(deserialize(src)?),)*
                    Some(nfs_opnum4::OP_ILLEGAL) | None => nfs_argop4::OP_ILLEGAL,
                };
                Ok(())
            }
        }

        impl Serialize for nfs_resop4 {
            fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
                self.opnum().serialize(dest)?;
                match self {
                    $(nfs_resop4::$op(res) => res.serialize(dest),)*
                    nfs_resop4::OP_ILLEGAL(res) => res.serialize(dest),
                }
            }
        }

        impl Deserialize for nfs_resop4 {
            fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                let opnum = deserialize::<u32>(src)?;
                *self = match nfs_opnum4::from_u32(opnum) {
                    $(Some(nfs_opnum4::$op) => nfs_resop4::$op(deserialize(src)?),)*
                    Some(nfs_opnum4::OP_ILLEGAL) => nfs_resop4::OP_ILLEGAL(deserialize(src)?),
                    None => return Err(utils::invalid_discriminant("nfs_resop4", opnum)),
                };
                Ok(())
            }
        }
    };
}

operations! {
    OP_ACCESS(ACCESS4args, ACCESS4res),
    OP_CLOSE(CLOSE4args, CLOSE4res),
    OP_COMMIT(COMMIT4args, COMMIT4res),
    OP_CREATE(CREATE4args, CREATE4res),
    OP_DELEGPURGE(DELEGPURGE4args, DELEGPURGE4res),
    OP_DELEGRETURN(DELEGRETURN4args, DELEGRETURN4res),
    OP_GETATTR(GETATTR4args, GETATTR4res),
    OP_GETFH((), GETFH4res),
    OP_LINK(LINK4args, LINK4res),
    OP_LOCK(LOCK4args, LOCK4res),
    OP_LOCKT(LOCKT4args, LOCKT4res),
    OP_LOCKU(LOCKU4args, LOCKU4res),
    OP_LOOKUP(LOOKUP4args, LOOKUP4res),
    OP_LOOKUPP((), LOOKUPP4res),
    OP_NVERIFY(NVERIFY4args, NVERIFY4res),
    OP_OPEN(OPEN4args, OPEN4res),
    OP_OPENATTR(OPENATTR4args, OPENATTR4res),
    OP_OPEN_CONFIRM(OPEN_CONFIRM4args, OPEN_CONFIRM4res),
    OP_OPEN_DOWNGRADE(OPEN_DOWNGRADE4args, OPEN_DOWNGRADE4res),
    OP_PUTFH(PUTFH4args, PUTFH4res),
    OP_PUTPUBFH((), PUTPUBFH4res),
    OP_PUTROOTFH((), PUTROOTFH4res),
    OP_READ(READ4args, READ4res),
    OP_READDIR(READDIR4args, READDIR4res),
    OP_READLINK((), READLINK4res),
    OP_REMOVE(REMOVE4args, REMOVE4res),
    OP_RENAME(RENAME4args, RENAME4res),
    OP_RENEW(RENEW4args, RENEW4res),
    OP_RESTOREFH((), RESTOREFH4res),
    OP_SAVEFH((), SAVEFH4res),
    OP_SECINFO(SECINFO4args, SECINFO4res),
    OP_SETATTR(SETATTR4args, SETATTR4res),
    OP_SETCLIENTID(SETCLIENTID4args, SETCLIENTID4res),
    OP_SETCLIENTID_CONFIRM(SETCLIENTID_CONFIRM4args, SETCLIENTID_CONFIRM4res),
    OP_VERIFY(VERIFY4args, VERIFY4res),
    OP_WRITE(WRITE4args, WRITE4res),
    OP_RELEASE_LOCKOWNER(RELEASE_LOCKOWNER4args, RELEASE_LOCKOWNER4res),
}

impl Default for nfs_resop4 {
    fn default() -> Self {
        nfs_resop4::OP_ILLEGAL(NfsResult::Err(nfsstat4::NFS4ERR_OP_ILLEGAL))
    }
}

impl nfs_resop4 {
    /// Result of an operation the server does not recognise.
    pub fn illegal() -> nfs_resop4 {
        nfs_resop4::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct COMPOUND4args {
    pub tag: utf8str_cs,
    pub minorversion: u32,
    pub argarray: Vec<nfs_argop4>,
}
SerializeStruct!(COMPOUND4args, tag, minorversion, argarray);

/// Decoding stops after an operation with an unknown opcode: its arguments
/// have an unknown layout, so later operations cannot be located.
impl Deserialize for COMPOUND4args {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.tag.deserialize(src)?;
        self.minorversion.deserialize(src)?;
        let count = deserialize::<UsizeAsU32>(src)?.0;
        self.argarray.clear();
        for _ in 0..count {
            let op = deserialize::<nfs_argop4>(src)?;
            let illegal = op == nfs_argop4::OP_ILLEGAL;
            self.argarray.push(op);
            if illegal {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct COMPOUND4res {
    /// Status of the last operation executed
    pub status: nfsstat4,
    pub tag: utf8str_cs,
    pub resarray: Vec<nfs_resop4>,
}
SerializeStruct!(COMPOUND4res, status, tag, resarray);
DeserializeStruct!(COMPOUND4res, status, tag, resarray);
