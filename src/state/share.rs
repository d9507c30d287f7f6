//! Share reservations of one file.
//!
//! An open grants its owner `access` (READ, WRITE or BOTH) and denies
//! others `deny` (NONE, READ, WRITE or BOTH). A new reservation conflicts
//! with an existing one held by another open when either side denies what
//! the other wants to access.

use std::collections::HashMap;

use super::StateOther;
use crate::protocol::xdr::nfs4::{
    nfsstat4, OPEN4_SHARE_ACCESS_BOTH, OPEN4_SHARE_DENY_BOTH,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Share {
    pub access: u32,
    pub deny: u32,
}

impl Share {
    /// Validates share bits as sent by OPEN and OPEN_DOWNGRADE.
    pub fn new(access: u32, deny: u32) -> Result<Share, nfsstat4> {
        if access == 0 || access & !OPEN4_SHARE_ACCESS_BOTH != 0 || deny & !OPEN4_SHARE_DENY_BOTH != 0
        {
            return Err(nfsstat4::NFS4ERR_INVAL);
        }
        Ok(Share { access, deny })
    }

    pub fn conflicts_with(&self, other: &Share) -> bool {
        self.access & other.deny != 0 || self.deny & other.access != 0
    }

    /// True when both access and deny of `self` are contained in `other`.
    pub fn is_subset_of(&self, other: &Share) -> bool {
        self.access & !other.access == 0 && self.deny & !other.deny == 0
    }

    pub fn union(&self, other: &Share) -> Share {
        Share { access: self.access | other.access, deny: self.deny | other.deny }
    }
}

/// The reservations currently granted on a file, keyed by open stateid.
#[derive(Debug, Default)]
pub struct FileShares {
    opens: HashMap<StateOther, Share>,
}

impl FileShares {
    pub fn get(&self, open: &StateOther) -> Option<Share> {
        self.opens.get(open).copied()
    }

    /// Checks `share` against every reservation except the one of `open`.
    pub fn check(&self, open: Option<&StateOther>, share: &Share) -> Result<(), nfsstat4> {
        let conflict = self
            .opens
            .iter()
            .filter(|(other, _)| Some(*other) != open)
            .any(|(_, existing)| existing.conflicts_with(share));
        if conflict {
            Err(nfsstat4::NFS4ERR_SHARE_DENIED)
        } else {
            Ok(())
        }
    }

    /// True when some open denies the given access bits, which blocks I/O
    /// through the special stateids.
    pub fn denies(&self, access: u32) -> bool {
        self.opens.values().any(|share| share.deny & access != 0)
    }

    pub fn insert(&mut self, open: StateOther, share: Share) {
        self.opens.insert(open, share);
    }

    pub fn remove(&mut self, open: &StateOther) -> Option<Share> {
        self.opens.remove(open)
    }

    pub fn len(&self) -> usize {
        self.opens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opens.is_empty()
    }
}
