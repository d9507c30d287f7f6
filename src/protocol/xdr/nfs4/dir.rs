//! Name space operations: LOOKUP, LOOKUPP, CREATE, REMOVE, RENAME, LINK,
//! READDIR, READLINK and SECINFO.

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use super::{
    bitmap4, change_info4, component4, count4, deserialize, fattr4, linktext4, nfs_cookie4,
    nfs_ftype4, qop4, sec_oid4, specdata4, utils, verifier4, Deserialize, NfsResult, Serialize,
};
use crate::protocol::xdr::rpc::auth_flavor;
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LOOKUP4args {
    pub objname: component4,
}
SerializeStruct!(LOOKUP4args, objname);
DeserializeStruct!(LOOKUP4args, objname);

pub type LOOKUP4res = NfsResult<()>;
pub type LOOKUPP4res = NfsResult<()>;

/// Type and type specific data of an object made by CREATE.
///
/// Regular files are created with OPEN; CREATE with any type other than
/// the ones below decodes as [`createtype4::OTHER`] and is refused with
/// NFS4ERR_BADTYPE.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum createtype4 {
    NF4LNK(linktext4),
    NF4BLK(specdata4),
    NF4CHR(specdata4),
    NF4SOCK,
    NF4FIFO,
    NF4DIR,
    OTHER(u32),
}

impl Default for createtype4 {
    fn default() -> Self {
        createtype4::NF4DIR
    }
}

impl createtype4 {
    /// Numeric `nfs_ftype4` discriminant.
    pub fn discriminant(&self) -> u32 {
        match self {
            createtype4::NF4LNK(_) => nfs_ftype4::NF4LNK as u32,
            createtype4::NF4BLK(_) => nfs_ftype4::NF4BLK as u32,
            createtype4::NF4CHR(_) => nfs_ftype4::NF4CHR as u32,
            createtype4::NF4SOCK => nfs_ftype4::NF4SOCK as u32,
            createtype4::NF4FIFO => nfs_ftype4::NF4FIFO as u32,
            createtype4::NF4DIR => nfs_ftype4::NF4DIR as u32,
            createtype4::OTHER(other) => *other,
        }
    }
}

impl Serialize for createtype4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.discriminant().serialize(dest)?;
        match self {
            createtype4::NF4LNK(linkdata) => linkdata.serialize(dest),
            createtype4::NF4BLK(devdata) | createtype4::NF4CHR(devdata) => devdata.serialize(dest),
            createtype4::NF4SOCK
            | createtype4::NF4FIFO
            | createtype4::NF4DIR
            | createtype4::OTHER(_) => Ok(()),
        }
    }
}

impl Deserialize for createtype4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let discriminant = deserialize::<u32>(src)?;
        *self = match nfs_ftype4::from_u32(discriminant) {
            Some(nfs_ftype4::NF4LNK) => createtype4::NF4LNK(deserialize(src)?),
            Some(nfs_ftype4::NF4BLK) => createtype4::NF4BLK(deserialize(src)?),
            Some(nfs_ftype4::NF4CHR) => createtype4::NF4CHR(deserialize(src)?),
            Some(nfs_ftype4::NF4SOCK) => createtype4::NF4SOCK,
            Some(nfs_ftype4::NF4FIFO) => createtype4::NF4FIFO,
            Some(nfs_ftype4::NF4DIR) => createtype4::NF4DIR,
            _ => createtype4::OTHER(discriminant),
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CREATE4args {
    pub objtype: createtype4,
    pub objname: component4,
    pub createattrs: fattr4,
}
SerializeStruct!(CREATE4args, objtype, objname, createattrs);
DeserializeStruct!(CREATE4args, objtype, objname, createattrs);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CREATE4resok {
    pub cinfo: change_info4,
    /// Attributes set
    pub attrset: bitmap4,
}
SerializeStruct!(CREATE4resok, cinfo, attrset);
DeserializeStruct!(CREATE4resok, cinfo, attrset);

pub type CREATE4res = NfsResult<CREATE4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct REMOVE4args {
    pub target: component4,
}
SerializeStruct!(REMOVE4args, target);
DeserializeStruct!(REMOVE4args, target);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct REMOVE4resok {
    pub cinfo: change_info4,
}
SerializeStruct!(REMOVE4resok, cinfo);
DeserializeStruct!(REMOVE4resok, cinfo);

pub type REMOVE4res = NfsResult<REMOVE4resok>;

/// RENAME moves `oldname` in the saved directory to `newname` in the current one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RENAME4args {
    pub oldname: component4,
    pub newname: component4,
}
SerializeStruct!(RENAME4args, oldname, newname);
DeserializeStruct!(RENAME4args, oldname, newname);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RENAME4resok {
    pub source_cinfo: change_info4,
    pub target_cinfo: change_info4,
}
SerializeStruct!(RENAME4resok, source_cinfo, target_cinfo);
DeserializeStruct!(RENAME4resok, source_cinfo, target_cinfo);

pub type RENAME4res = NfsResult<RENAME4resok>;

/// LINK makes the saved filehandle known as `newname` in the current directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LINK4args {
    pub newname: component4,
}
SerializeStruct!(LINK4args, newname);
DeserializeStruct!(LINK4args, newname);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LINK4resok {
    pub cinfo: change_info4,
}
SerializeStruct!(LINK4resok, cinfo);
DeserializeStruct!(LINK4resok, cinfo);

pub type LINK4res = NfsResult<LINK4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct READDIR4args {
    pub cookie: nfs_cookie4,
    pub cookieverf: verifier4,
    pub dircount: count4,
    pub maxcount: count4,
    pub attr_request: bitmap4,
}
SerializeStruct!(READDIR4args, cookie, cookieverf, dircount, maxcount, attr_request);
DeserializeStruct!(READDIR4args, cookie, cookieverf, dircount, maxcount, attr_request);

/// One directory entry. The `nextentry` pointer of the XDR definition is
/// expressed by [`dirlist4`] holding the entries in a vector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct entry4 {
    pub cookie: nfs_cookie4,
    pub name: component4,
    pub attrs: fattr4,
}
SerializeStruct!(entry4, cookie, name, attrs);
DeserializeStruct!(entry4, cookie, name, attrs);

/// Directory listing: a linked list of entries on the wire, each preceded by
/// a TRUE value-follows flag and terminated by FALSE, then the eof flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct dirlist4 {
    pub entries: Vec<entry4>,
    pub eof: bool,
}

impl Serialize for dirlist4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        for entry in &self.entries {
            true.serialize(dest)?;
            entry.serialize(dest)?;
        }
        false.serialize(dest)?;
        self.eof.serialize(dest)
    }
}

impl Deserialize for dirlist4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.entries.clear();
        while deserialize::<bool>(src)? {
            self.entries.push(deserialize(src)?);
        }
        self.eof.deserialize(src)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct READDIR4resok {
    pub cookieverf: verifier4,
    pub reply: dirlist4,
}
SerializeStruct!(READDIR4resok, cookieverf, reply);
DeserializeStruct!(READDIR4resok, cookieverf, reply);

pub type READDIR4res = NfsResult<READDIR4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct READLINK4resok {
    pub link: linktext4,
}
SerializeStruct!(READLINK4resok, link);
DeserializeStruct!(READLINK4resok, link);

pub type READLINK4res = NfsResult<READLINK4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SECINFO4args {
    pub name: component4,
}
SerializeStruct!(SECINFO4args, name);
DeserializeStruct!(SECINFO4args, name);

/// RPCSEC_GSS service levels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum rpc_gss_svc_t {
    #[default]
    RPC_GSS_SVC_NONE = 1,
    RPC_GSS_SVC_INTEGRITY = 2,
    RPC_GSS_SVC_PRIVACY = 3,
}
SerializeEnum!(rpc_gss_svc_t);
DeserializeEnum!(rpc_gss_svc_t);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct rpcsec_gss_info {
    pub oid: sec_oid4,
    pub qop: qop4,
    pub service: rpc_gss_svc_t,
}
SerializeStruct!(rpcsec_gss_info, oid, qop, service);
DeserializeStruct!(rpcsec_gss_info, oid, qop, service);

/// A security flavor acceptable for the named object; only RPCSEC_GSS
/// carries data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum secinfo4 {
    AUTH_NONE,
    AUTH_SYS,
    RPCSEC_GSS(rpcsec_gss_info),
    OTHER(u32),
}

impl Default for secinfo4 {
    fn default() -> Self {
        secinfo4::AUTH_SYS
    }
}

impl Serialize for secinfo4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            secinfo4::AUTH_NONE => (auth_flavor::AUTH_NONE as u32).serialize(dest),
            secinfo4::AUTH_SYS => (auth_flavor::AUTH_UNIX as u32).serialize(dest),
            secinfo4::RPCSEC_GSS(info) => {
                (auth_flavor::RPCSEC_GSS as u32).serialize(dest)?;
                info.serialize(dest)
            }
            secinfo4::OTHER(flavor) => {
                if *flavor == auth_flavor::RPCSEC_GSS as u32 {
                    return Err(utils::invalid_data("RPCSEC_GSS secinfo requires info"));
                }
                flavor.serialize(dest)
            }
        }
    }
}

impl Deserialize for secinfo4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let flavor = deserialize::<u32>(src)?;
        *self = match auth_flavor::from_u32(flavor) {
            Some(auth_flavor::AUTH_NONE) => secinfo4::AUTH_NONE,
            Some(auth_flavor::AUTH_UNIX) => secinfo4::AUTH_SYS,
            Some(auth_flavor::RPCSEC_GSS) => secinfo4::RPCSEC_GSS(deserialize(src)?),
            _ => secinfo4::OTHER(flavor),
        };
        Ok(())
    }
}

/// Flavors acceptable for the object, in order of preference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SECINFO4resok(pub Vec<secinfo4>);

impl Serialize for SECINFO4resok {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for SECINFO4resok {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

pub type SECINFO4res = NfsResult<SECINFO4resok>;
