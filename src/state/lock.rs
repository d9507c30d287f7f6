//! Byte-range locks held on one file.
//!
//! Locks are advisory and follow POSIX record locking: locks of one owner
//! never conflict with each other, a new lock replaces whatever part of the
//! owner's existing locks it covers, and unlocking part of a range splits it.

use crate::protocol::xdr::nfs4::lock::{nfs_lock_type4, LOCK4denied};
use crate::protocol::xdr::nfs4::{length4, lock_owner4, nfsstat4, offset4, NFS4_UINT64_MAX};

/// Half-open byte range `[start, end)`. `end == u64::MAX` extends to
/// the end of the file and beyond.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LockRange {
    pub start: u64,
    pub end: u64,
}

impl LockRange {
    /// Range of a LOCK, LOCKT or LOCKU request.
    ///
    /// A length of all ones means "to the end of file". Zero lengths and
    /// ranges past the largest offset are NFS4ERR_INVAL.
    pub fn new(offset: offset4, length: length4) -> Result<LockRange, nfsstat4> {
        if length == 0 {
            return Err(nfsstat4::NFS4ERR_INVAL);
        }
        if length == NFS4_UINT64_MAX {
            return Ok(LockRange { start: offset, end: u64::MAX });
        }
        let end = offset.checked_add(length).ok_or(nfsstat4::NFS4ERR_INVAL)?;
        Ok(LockRange { start: offset, end })
    }

    pub fn overlaps(&self, other: &LockRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn offset(&self) -> offset4 {
        self.start
    }

    pub fn length(&self) -> length4 {
        if self.end == u64::MAX {
            NFS4_UINT64_MAX
        } else {
            self.end - self.start
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeldLock {
    pub owner: lock_owner4,
    pub range: LockRange,
    pub write: bool,
}

impl HeldLock {
    /// Describes this lock to a client whose request it blocks.
    pub fn denied(&self) -> LOCK4denied {
        LOCK4denied {
            offset: self.range.offset(),
            length: self.range.length(),
            locktype: if self.write { nfs_lock_type4::WRITE_LT } else { nfs_lock_type4::READ_LT },
            owner: self.owner.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FileLocks {
    held: Vec<HeldLock>,
}

impl FileLocks {
    /// First lock of another owner that blocks `owner` from taking `range`.
    pub fn conflict(&self, owner: &lock_owner4, range: &LockRange, write: bool) -> Option<&HeldLock> {
        self.held
            .iter()
            .find(|held| held.owner != *owner && held.range.overlaps(range) && (write || held.write))
    }

    /// Grants `range` to `owner`, replacing the owner's locks it overlaps.
    pub fn add(&mut self, owner: &lock_owner4, range: LockRange, write: bool) {
        self.remove(owner, &range);
        self.held.push(HeldLock { owner: owner.clone(), range, write });
    }

    /// Releases `range` for `owner`, keeping the uncovered parts of
    /// partially overlapping locks.
    pub fn remove(&mut self, owner: &lock_owner4, range: &LockRange) {
        let mut kept = Vec::with_capacity(self.held.len() + 1);
        for held in self.held.drain(..) {
            if held.owner != *owner || !held.range.overlaps(range) {
                kept.push(held);
                continue;
            }
            if held.range.start < range.start {
                kept.push(HeldLock {
                    range: LockRange { start: held.range.start, end: range.start },
                    ..held.clone()
                });
            }
            if range.end < held.range.end {
                kept.push(HeldLock {
                    range: LockRange { start: range.end, end: held.range.end },
                    ..held.clone()
                });
            }
        }
        self.held = kept;
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn holds_any(&self, owner: &lock_owner4) -> bool {
        self.held.iter().any(|held| held.owner == *owner)
    }
}
