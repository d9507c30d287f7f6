//! NFSv4.0 (Network File System version 4) protocol implementation as
//! specified in RFC 7530.
//!
//! Version 4 has two RPC procedures:
//!
//! 0. NULL - Do nothing (ping the server)
//! 1. COMPOUND - Run a list of operations in order
//!
//! A COMPOUND carries operations that share a current and a saved file
//! handle. Execution stops at the first operation that fails; the reply
//! holds the results of every operation executed so far. Operations are
//! implemented in their own modules and dispatched from `compound`.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::{change_info4, nfs_fh4, nfs_ftype4, nfsstat4};
use crate::protocol::xdr::{self, nfs4, Serialize};
use crate::vfs::fileid;

mod access;
mod attrs;
mod clientid;
mod close;
mod commit;
mod compound;
mod create;
mod fh;
mod getattr;
mod link;
mod lock;
mod lookup;
mod open;
mod read;
mod readdir;
mod readlink;
mod remove;
mod rename;
mod secinfo;
mod setattr;
mod verify;
mod write;

pub use attrs::supported_attrs;
pub use compound::{nfsproc4_compound, run_compound};

/// Main handler for NFSv4 protocol
///
/// Validates the protocol version and routes the call to NULL or COMPOUND.
/// Any other procedure number is answered with PROC_UNAVAIL.
pub async fn handle_nfs(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    if call.vers != nfs4::VERSION {
        warn!("Invalid NFS Version number {} != {}", call.vers, nfs4::VERSION);
        xdr::rpc::prog_mismatch_reply_message(xid, nfs4::VERSION).serialize(output)?;
        return Ok(());
    }
    match call.proc {
        nfs4::NFSPROC4_NULL => {
            debug!("nfsproc4_null({:?}) ", xid);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
        }
        nfs4::NFSPROC4_COMPOUND => nfsproc4_compound(xid, input, output, context).await?,
        _ => {
            warn!("Unimplemented message {}", call.proc);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}

/// File handles shared by the operations of one COMPOUND.
#[derive(Clone, Debug, Default)]
pub struct CompoundState {
    pub current_fh: Option<nfs_fh4>,
    pub saved_fh: Option<nfs_fh4>,
}

impl CompoundState {
    pub fn current_fh(&self) -> Result<&nfs_fh4, nfsstat4> {
        self.current_fh.as_ref().ok_or(nfsstat4::NFS4ERR_NOFILEHANDLE)
    }

    /// File id of the current file handle.
    pub fn current_id(&self, context: &rpc::Context) -> Result<fileid, nfsstat4> {
        context.vfs.fh_to_id(self.current_fh()?)
    }

    /// File id of the current file handle, which must be a directory.
    pub async fn current_dir(&self, context: &rpc::Context) -> Result<fileid, nfsstat4> {
        let id = self.current_id(context)?;
        match context.vfs.getattr(id).await?.file_type {
            nfs_ftype4::NF4DIR => Ok(id),
            nfs_ftype4::NF4LNK => Err(nfsstat4::NFS4ERR_SYMLINK),
            _ => Err(nfsstat4::NFS4ERR_NOTDIR),
        }
    }

    pub fn set_current(&mut self, context: &rpc::Context, id: fileid) {
        self.current_fh = Some(context.vfs.id_to_fh(id));
    }
}

/// Validates a name component sent by the client.
pub(crate) fn check_component(context: &rpc::Context, name: &str) -> Result<(), nfsstat4> {
    if name.is_empty() {
        return Err(nfsstat4::NFS4ERR_INVAL);
    }
    if name == "." || name == ".." {
        return Err(nfsstat4::NFS4ERR_BADNAME);
    }
    if name.contains(['/', '\0']) {
        return Err(nfsstat4::NFS4ERR_BADCHAR);
    }
    if name.len() > context.config.max_name_len as usize {
        return Err(nfsstat4::NFS4ERR_NAMETOOLONG);
    }
    Ok(())
}

/// Fails with NFS4ERR_ROFS on read-only file systems.
pub(crate) fn check_writable(context: &rpc::Context) -> Result<(), nfsstat4> {
    match context.vfs.capabilities() {
        crate::vfs::Capabilities::ReadWrite => Ok(()),
        crate::vfs::Capabilities::ReadOnly => Err(nfsstat4::NFS4ERR_ROFS),
    }
}

/// Change attribute of a directory, sampled around a modification.
pub(crate) async fn dir_change(context: &rpc::Context, dirid: fileid) -> Result<u64, nfsstat4> {
    Ok(context.vfs.getattr(dirid).await?.change)
}

pub(crate) fn change_info(before: u64, after: u64) -> change_info4 {
    // before and after come from separate getattr calls
    change_info4 { atomic: false, before, after }
}
