//! Arguments and results of OPEN, OPEN_CONFIRM, OPEN_DOWNGRADE and CLOSE
//! (RFC 7530 sections 16.16 to 16.19 and 16.2).

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::{
    bitmap4, change_info4, component4, deserialize, fattr4, nfsace4, open_owner4, seqid4,
    stateid4, verifier4, Deserialize, NfsResult, Serialize,
};
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

/// Selector of [`openflag4`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum opentype4 {
    #[default]
    OPEN4_NOCREATE = 0,
    OPEN4_CREATE = 1,
}
SerializeEnum!(opentype4);
DeserializeEnum!(opentype4);

/// Selector of [`createhow4`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum createmode4 {
    #[default]
    UNCHECKED4 = 0,
    GUARDED4 = 1,
    EXCLUSIVE4 = 2,
}
SerializeEnum!(createmode4);
DeserializeEnum!(createmode4);

/// How OPEN creates a file that may already exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum createhow4 {
    /// Create, or open the existing file and apply the attributes
    UNCHECKED4(fattr4),
    /// Create, failing with NFS4ERR_EXIST if the file exists
    GUARDED4(fattr4),
    /// Create once per verifier, retransmissions see the same file
    EXCLUSIVE4(verifier4),
}

impl Default for createhow4 {
    fn default() -> Self {
        createhow4::UNCHECKED4(fattr4::default())
    }
}

impl createhow4 {
    pub fn mode(&self) -> createmode4 {
        match self {
            createhow4::UNCHECKED4(_) => createmode4::UNCHECKED4,
            createhow4::GUARDED4(_) => createmode4::GUARDED4,
            createhow4::EXCLUSIVE4(_) => createmode4::EXCLUSIVE4,
        }
    }
}

impl Serialize for createhow4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.mode().serialize(dest)?;
        match self {
            createhow4::UNCHECKED4(attrs) | createhow4::GUARDED4(attrs) => attrs.serialize(dest),
            createhow4::EXCLUSIVE4(verf) => verf.serialize(dest),
        }
    }
}

impl Deserialize for createhow4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<createmode4>(src)? {
            createmode4::UNCHECKED4 => createhow4::UNCHECKED4(deserialize(src)?),
            createmode4::GUARDED4 => createhow4::GUARDED4(deserialize(src)?),
            createmode4::EXCLUSIVE4 => createhow4::EXCLUSIVE4(deserialize(src)?),
        };
        Ok(())
    }
}

/// Whether OPEN may create the file (`openflag4`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum openflag4 {
    #[default]
    OPEN4_NOCREATE,
    OPEN4_CREATE(createhow4),
}

impl Serialize for openflag4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            openflag4::OPEN4_NOCREATE => opentype4::OPEN4_NOCREATE.serialize(dest),
            openflag4::OPEN4_CREATE(how) => {
                opentype4::OPEN4_CREATE.serialize(dest)?;
                how.serialize(dest)
            }
        }
    }
}

impl Deserialize for openflag4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<opentype4>(src)? {
            opentype4::OPEN4_NOCREATE => openflag4::OPEN4_NOCREATE,
            opentype4::OPEN4_CREATE => openflag4::OPEN4_CREATE(deserialize(src)?),
        };
        Ok(())
    }
}

/// Selector of [`open_claim4`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum open_claim_type4 {
    #[default]
    CLAIM_NULL = 0,
    CLAIM_PREVIOUS = 1,
    CLAIM_DELEGATE_CUR = 2,
    CLAIM_DELEGATE_PREV = 3,
}
SerializeEnum!(open_claim_type4);
DeserializeEnum!(open_claim_type4);

/// Delegation types, also the selector of [`open_delegation4`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum open_delegation_type4 {
    #[default]
    OPEN_DELEGATE_NONE = 0,
    OPEN_DELEGATE_READ = 1,
    OPEN_DELEGATE_WRITE = 2,
}
SerializeEnum!(open_delegation_type4);
DeserializeEnum!(open_delegation_type4);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct open_claim_delegate_cur4 {
    pub delegate_stateid: stateid4,
    pub file: component4,
}
SerializeStruct!(open_claim_delegate_cur4, delegate_stateid, file);
DeserializeStruct!(open_claim_delegate_cur4, delegate_stateid, file);

/// What the OPEN refers to. Only `CLAIM_NULL` (open by name in the current
/// directory) is served; the reclaim and delegation claims decode but are
/// answered with NFS4ERR_NOTSUPP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum open_claim4 {
    /// Name of the file relative to the current filehandle
    CLAIM_NULL(component4),
    /// Reclaim after server restart, current filehandle is the file
    CLAIM_PREVIOUS(open_delegation_type4),
    /// Open under an existing delegation
    CLAIM_DELEGATE_CUR(open_claim_delegate_cur4),
    /// Reclaim a delegation after client restart
    CLAIM_DELEGATE_PREV(component4),
}

impl Default for open_claim4 {
    fn default() -> Self {
        open_claim4::CLAIM_NULL(component4::default())
    }
}

impl open_claim4 {
    pub fn claim_type(&self) -> open_claim_type4 {
        match self {
            open_claim4::CLAIM_NULL(_) => open_claim_type4::CLAIM_NULL,
            open_claim4::CLAIM_PREVIOUS(_) => open_claim_type4::CLAIM_PREVIOUS,
            open_claim4::CLAIM_DELEGATE_CUR(_) => open_claim_type4::CLAIM_DELEGATE_CUR,
            open_claim4::CLAIM_DELEGATE_PREV(_) => open_claim_type4::CLAIM_DELEGATE_PREV,
        }
    }
}

impl Serialize for open_claim4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.claim_type().serialize(dest)?;
        match self {
            open_claim4::CLAIM_NULL(file) | open_claim4::CLAIM_DELEGATE_PREV(file) => {
                file.serialize(dest)
            }
            open_claim4::CLAIM_PREVIOUS(delegate_type) => delegate_type.serialize(dest),
            open_claim4::CLAIM_DELEGATE_CUR(cur) => cur.serialize(dest),
        }
    }
}

impl Deserialize for open_claim4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<open_claim_type4>(src)? {
            open_claim_type4::CLAIM_NULL => open_claim4::CLAIM_NULL(deserialize(src)?),
            open_claim_type4::CLAIM_PREVIOUS => open_claim4::CLAIM_PREVIOUS(deserialize(src)?),
            open_claim_type4::CLAIM_DELEGATE_CUR => {
                open_claim4::CLAIM_DELEGATE_CUR(deserialize(src)?)
            }
            open_claim_type4::CLAIM_DELEGATE_PREV => {
                open_claim4::CLAIM_DELEGATE_PREV(deserialize(src)?)
            }
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OPEN4args {
    pub seqid: seqid4,
    pub share_access: u32,
    pub share_deny: u32,
    pub owner: open_owner4,
    pub openhow: openflag4,
    pub claim: open_claim4,
}
SerializeStruct!(OPEN4args, seqid, share_access, share_deny, owner, openhow, claim);
DeserializeStruct!(OPEN4args, seqid, share_access, share_deny, owner, openhow, claim);

/// Selector of [`nfs_space_limit4`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum limit_by4 {
    #[default]
    NFS_LIMIT_SIZE = 1,
    NFS_LIMIT_BLOCKS = 2,
}
SerializeEnum!(limit_by4);
DeserializeEnum!(limit_by4);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct nfs_modified_limit4 {
    pub num_blocks: u32,
    pub bytes_per_block: u32,
}
SerializeStruct!(nfs_modified_limit4, num_blocks, bytes_per_block);
DeserializeStruct!(nfs_modified_limit4, num_blocks, bytes_per_block);

/// Space the client may use locally under a write delegation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum nfs_space_limit4 {
    NFS_LIMIT_SIZE(u64),
    NFS_LIMIT_BLOCKS(nfs_modified_limit4),
}

impl Default for nfs_space_limit4 {
    fn default() -> Self {
        nfs_space_limit4::NFS_LIMIT_SIZE(0)
    }
}

impl Serialize for nfs_space_limit4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            nfs_space_limit4::NFS_LIMIT_SIZE(filesize) => {
                limit_by4::NFS_LIMIT_SIZE.serialize(dest)?;
                filesize.serialize(dest)
            }
            nfs_space_limit4::NFS_LIMIT_BLOCKS(blocks) => {
                limit_by4::NFS_LIMIT_BLOCKS.serialize(dest)?;
                blocks.serialize(dest)
            }
        }
    }
}

impl Deserialize for nfs_space_limit4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<limit_by4>(src)? {
            limit_by4::NFS_LIMIT_SIZE => nfs_space_limit4::NFS_LIMIT_SIZE(deserialize(src)?),
            limit_by4::NFS_LIMIT_BLOCKS => nfs_space_limit4::NFS_LIMIT_BLOCKS(deserialize(src)?),
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct open_read_delegation4 {
    pub stateid: stateid4,
    pub recall: bool,
    pub permissions: nfsace4,
}
SerializeStruct!(open_read_delegation4, stateid, recall, permissions);
DeserializeStruct!(open_read_delegation4, stateid, recall, permissions);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct open_write_delegation4 {
    pub stateid: stateid4,
    pub recall: bool,
    pub space_limit: nfs_space_limit4,
    pub permissions: nfsace4,
}
SerializeStruct!(open_write_delegation4, stateid, recall, space_limit, permissions);
DeserializeStruct!(open_write_delegation4, stateid, recall, space_limit, permissions);

/// Delegation granted by OPEN. This server never grants one, but clients
/// decode whatever a server sends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum open_delegation4 {
    #[default]
    OPEN_DELEGATE_NONE,
    OPEN_DELEGATE_READ(open_read_delegation4),
    OPEN_DELEGATE_WRITE(open_write_delegation4),
}

impl Serialize for open_delegation4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            open_delegation4::OPEN_DELEGATE_NONE => {
                open_delegation_type4::OPEN_DELEGATE_NONE.serialize(dest)
            }
            open_delegation4::OPEN_DELEGATE_READ(read) => {
                open_delegation_type4::OPEN_DELEGATE_READ.serialize(dest)?;
                read.serialize(dest)
            }
            open_delegation4::OPEN_DELEGATE_WRITE(write) => {
                open_delegation_type4::OPEN_DELEGATE_WRITE.serialize(dest)?;
                write.serialize(dest)
            }
        }
    }
}

impl Deserialize for open_delegation4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<open_delegation_type4>(src)? {
            open_delegation_type4::OPEN_DELEGATE_NONE => open_delegation4::OPEN_DELEGATE_NONE,
            open_delegation_type4::OPEN_DELEGATE_READ => {
                open_delegation4::OPEN_DELEGATE_READ(deserialize(src)?)
            }
            open_delegation_type4::OPEN_DELEGATE_WRITE => {
                open_delegation4::OPEN_DELEGATE_WRITE(deserialize(src)?)
            }
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OPEN4resok {
    /// Stateid for the open
    pub stateid: stateid4,
    /// Directory change info
    pub cinfo: change_info4,
    /// Result flags
    pub rflags: u32,
    /// Attributes set on create
    pub attrset: bitmap4,
    /// Info on any open delegation
    pub delegation: open_delegation4,
}
SerializeStruct!(OPEN4resok, stateid, cinfo, rflags, attrset, delegation);
DeserializeStruct!(OPEN4resok, stateid, cinfo, rflags, attrset, delegation);

pub type OPEN4res = NfsResult<OPEN4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OPEN_CONFIRM4args {
    pub open_stateid: stateid4,
    pub seqid: seqid4,
}
SerializeStruct!(OPEN_CONFIRM4args, open_stateid, seqid);
DeserializeStruct!(OPEN_CONFIRM4args, open_stateid, seqid);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OPEN_CONFIRM4resok {
    pub open_stateid: stateid4,
}
SerializeStruct!(OPEN_CONFIRM4resok, open_stateid);
DeserializeStruct!(OPEN_CONFIRM4resok, open_stateid);

pub type OPEN_CONFIRM4res = NfsResult<OPEN_CONFIRM4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OPEN_DOWNGRADE4args {
    pub open_stateid: stateid4,
    pub seqid: seqid4,
    pub share_access: u32,
    pub share_deny: u32,
}
SerializeStruct!(OPEN_DOWNGRADE4args, open_stateid, seqid, share_access, share_deny);
DeserializeStruct!(OPEN_DOWNGRADE4args, open_stateid, seqid, share_access, share_deny);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OPEN_DOWNGRADE4resok {
    pub open_stateid: stateid4,
}
SerializeStruct!(OPEN_DOWNGRADE4resok, open_stateid);
DeserializeStruct!(OPEN_DOWNGRADE4resok, open_stateid);

pub type OPEN_DOWNGRADE4res = NfsResult<OPEN_DOWNGRADE4resok>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CLOSE4args {
    pub seqid: seqid4,
    pub open_stateid: stateid4,
}
SerializeStruct!(CLOSE4args, seqid, open_stateid);
DeserializeStruct!(CLOSE4args, seqid, open_stateid);

/// On success carries the (now invalid) open stateid.
pub type CLOSE4res = NfsResult<stateid4>;
