//! Sequence id tracking for open owners and lock owners.
//!
//! Every state changing request of an owner carries a sequence id which
//! must be exactly one more than the last one the server accepted, with
//! zero skipped on wrap-around. The server keeps the last accepted value
//! per owner and only moves it forward when a request succeeds.

use crate::protocol::xdr::nfs4::{nfsstat4, seqid4};

/// Successor of `seqid`: wraps from 0xffffffff to 1, never to 0.
pub fn next_seqid(seqid: seqid4) -> seqid4 {
    if seqid == seqid4::MAX {
        1
    } else {
        seqid + 1
    }
}

/// Last sequence id accepted from an owner.
///
/// `None` stands for an owner the server has not accepted any request
/// from yet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceState {
    last: Option<seqid4>,
}

impl SequenceState {
    pub fn last(&self) -> Option<seqid4> {
        self.last
    }

    /// Checks a requested sequence id without recording it.
    ///
    /// Returns the value to store once the request succeeds:
    /// - zero is always accepted and restarts the sequence at 1
    /// - an unseen owner accepts any value
    /// - otherwise only the successor of the last accepted value passes
    pub fn check(&self, requested: seqid4) -> Result<seqid4, nfsstat4> {
        match (requested, self.last) {
            (0, _) => Ok(1),
            (requested, None) => Ok(requested),
            (requested, Some(last)) if requested == next_seqid(last) => Ok(requested),
            _ => Err(nfsstat4::NFS4ERR_BAD_SEQID),
        }
    }

    /// Records a value previously returned by [`SequenceState::check`].
    pub fn advance(&mut self, accepted: seqid4) {
        self.last = Some(accepted);
    }

    /// Forgets the owner's history.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
