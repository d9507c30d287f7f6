//! Byte-range locking: LOCK, LOCKT, LOCKU and RELEASE_LOCKOWNER
//! (RFC 7530 sections 16.10 to 16.12 and 16.37).

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::{
    deserialize, length4, lock_owner4, nfsstat4, offset4, seqid4, stateid4, Deserialize,
    NfsResult, OpStatus, Serialize,
};
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfs_lock_type4 {
    #[default]
    READ_LT = 1,
    WRITE_LT = 2,
    /// Blocking read lock
    READW_LT = 3,
    /// Blocking write lock
    WRITEW_LT = 4,
}
SerializeEnum!(nfs_lock_type4);
DeserializeEnum!(nfs_lock_type4);

impl nfs_lock_type4 {
    /// Write and blocking write locks are exclusive.
    pub fn is_write(&self) -> bool {
        matches!(self, nfs_lock_type4::WRITE_LT | nfs_lock_type4::WRITEW_LT)
    }

    /// The non-blocking variant of this lock type.
    pub fn non_blocking(&self) -> nfs_lock_type4 {
        if self.is_write() {
            nfs_lock_type4::WRITE_LT
        } else {
            nfs_lock_type4::READ_LT
        }
    }
}

/// First lock for a lock owner: the open it is derived from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct open_to_lock_owner4 {
    pub open_seqid: seqid4,
    pub open_stateid: stateid4,
    pub lock_seqid: seqid4,
    pub lock_owner: lock_owner4,
}
SerializeStruct!(open_to_lock_owner4, open_seqid, open_stateid, lock_seqid, lock_owner);
DeserializeStruct!(open_to_lock_owner4, open_seqid, open_stateid, lock_seqid, lock_owner);

/// Subsequent locks for a lock owner that already has a lock stateid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct exist_lock_owner4 {
    pub lock_stateid: stateid4,
    pub lock_seqid: seqid4,
}
SerializeStruct!(exist_lock_owner4, lock_stateid, lock_seqid);
DeserializeStruct!(exist_lock_owner4, lock_stateid, lock_seqid);

/// `locker4`, discriminated by the `new_lock_owner` boolean.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum locker4 {
    /// `new_lock_owner == TRUE`
    OpenOwner(open_to_lock_owner4),
    /// `new_lock_owner == FALSE`
    LockOwner(exist_lock_owner4),
}

impl Default for locker4 {
    fn default() -> Self {
        locker4::LockOwner(exist_lock_owner4::default())
    }
}

impl Serialize for locker4 {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            locker4::OpenOwner(open_owner) => {
                true.serialize(dest)?;
                open_owner.serialize(dest)
            }
            locker4::LockOwner(lock_owner) => {
                false.serialize(dest)?;
                lock_owner.serialize(dest)
            }
        }
    }
}

impl Deserialize for locker4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = if deserialize::<bool>(src)? {
            locker4::OpenOwner(deserialize(src)?)
        } else {
            locker4::LockOwner(deserialize(src)?)
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LOCK4args {
    pub locktype: nfs_lock_type4,
    pub reclaim: bool,
    pub offset: offset4,
    pub length: length4,
    pub locker: locker4,
}
SerializeStruct!(LOCK4args, locktype, reclaim, offset, length, locker);
DeserializeStruct!(LOCK4args, locktype, reclaim, offset, length, locker);

/// Description of the lock that prevented a LOCK or LOCKT from succeeding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LOCK4denied {
    pub offset: offset4,
    pub length: length4,
    pub locktype: nfs_lock_type4,
    pub owner: lock_owner4,
}
SerializeStruct!(LOCK4denied, offset, length, locktype, owner);
DeserializeStruct!(LOCK4denied, offset, length, locktype, owner);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LOCK4resok {
    pub lock_stateid: stateid4,
}
SerializeStruct!(LOCK4resok, lock_stateid);
DeserializeStruct!(LOCK4resok, lock_stateid);

/// LOCK result: besides success, NFS4ERR_DENIED carries the conflicting lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LOCK4res {
    Ok(LOCK4resok),
    Denied(LOCK4denied),
    Err(nfsstat4),
}

impl Default for LOCK4res {
    fn default() -> Self {
        LOCK4res::Err(nfsstat4::NFS4ERR_SERVERFAULT)
    }
}

impl OpStatus for LOCK4res {
    fn status(&self) -> nfsstat4 {
        match self {
            LOCK4res::Ok(_) => nfsstat4::NFS4_OK,
            LOCK4res::Denied(_) => nfsstat4::NFS4ERR_DENIED,
            LOCK4res::Err(stat) => *stat,
        }
    }
}

impl Serialize for LOCK4res {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status().serialize(dest)?;
        match self {
            LOCK4res::Ok(resok) => resok.serialize(dest),
            LOCK4res::Denied(denied) => denied.serialize(dest),
            LOCK4res::Err(_) => Ok(()),
        }
    }
}

impl Deserialize for LOCK4res {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<nfsstat4>(src)? {
            nfsstat4::NFS4_OK => LOCK4res::Ok(deserialize(src)?),
            nfsstat4::NFS4ERR_DENIED => LOCK4res::Denied(deserialize(src)?),
            stat => LOCK4res::Err(stat),
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LOCKT4args {
    pub locktype: nfs_lock_type4,
    pub offset: offset4,
    pub length: length4,
    pub owner: lock_owner4,
}
SerializeStruct!(LOCKT4args, locktype, offset, length, owner);
DeserializeStruct!(LOCKT4args, locktype, offset, length, owner);

/// LOCKT result: success carries nothing, NFS4ERR_DENIED the conflicting lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LOCKT4res {
    Ok,
    Denied(LOCK4denied),
    Err(nfsstat4),
}

impl Default for LOCKT4res {
    fn default() -> Self {
        LOCKT4res::Err(nfsstat4::NFS4ERR_SERVERFAULT)
    }
}

impl OpStatus for LOCKT4res {
    fn status(&self) -> nfsstat4 {
        match self {
            LOCKT4res::Ok => nfsstat4::NFS4_OK,
            LOCKT4res::Denied(_) => nfsstat4::NFS4ERR_DENIED,
            LOCKT4res::Err(stat) => *stat,
        }
    }
}

impl Serialize for LOCKT4res {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status().serialize(dest)?;
        match self {
            LOCKT4res::Denied(denied) => denied.serialize(dest),
            LOCKT4res::Ok | LOCKT4res::Err(_) => Ok(()),
        }
    }
}

impl Deserialize for LOCKT4res {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<nfsstat4>(src)? {
            nfsstat4::NFS4_OK => LOCKT4res::Ok,
            nfsstat4::NFS4ERR_DENIED => LOCKT4res::Denied(deserialize(src)?),
            stat => LOCKT4res::Err(stat),
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LOCKU4args {
    pub locktype: nfs_lock_type4,
    pub seqid: seqid4,
    pub lock_stateid: stateid4,
    pub offset: offset4,
    pub length: length4,
}
SerializeStruct!(LOCKU4args, locktype, seqid, lock_stateid, offset, length);
DeserializeStruct!(LOCKU4args, locktype, seqid, lock_stateid, offset, length);

pub type LOCKU4res = NfsResult<stateid4>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RELEASE_LOCKOWNER4args {
    pub lock_owner: lock_owner4,
}
SerializeStruct!(RELEASE_LOCKOWNER4args, lock_owner);
DeserializeStruct!(RELEASE_LOCKOWNER4args, lock_owner);

pub type RELEASE_LOCKOWNER4res = NfsResult<()>;
