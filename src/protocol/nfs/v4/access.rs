//! Implementation of the ACCESS operation (operation 3) for NFS version 4
//! as defined in RFC 7530 section 16.1.
//!
//! ACCESS reports which of the requested rights the caller holds on the
//! current file. Rights are derived from the mode bits and the AUTH_UNIX
//! identity of the caller; write rights are never granted on a read-only
//! file system.

use tracing::debug;

use super::CompoundState;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{ACCESS4args, ACCESS4res, ACCESS4resok};
use crate::protocol::xdr::nfs4::{
    nfsstat4, ACCESS4_DELETE, ACCESS4_EXECUTE, ACCESS4_EXTEND, ACCESS4_LOOKUP, ACCESS4_MODIFY,
    ACCESS4_READ,
};
use crate::vfs::{self, Metadata};

const ALL_ACCESS: u32 = ACCESS4_READ
    | ACCESS4_LOOKUP
    | ACCESS4_MODIFY
    | ACCESS4_EXTEND
    | ACCESS4_DELETE
    | ACCESS4_EXECUTE;

pub async fn nfsop4_access(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &ACCESS4args,
) -> ACCESS4res {
    debug!("nfsop4_access({:?}, {:#x})", state.current_fh, args.access);
    access(context, state, args).await.into()
}

async fn access(
    context: &rpc::Context,
    state: &CompoundState,
    args: &ACCESS4args,
) -> Result<ACCESS4resok, nfsstat4> {
    let id = state.current_id(context)?;
    let meta = context.vfs.getattr(id).await?;
    let supported = args.access & ALL_ACCESS;
    let mut granted = permitted(context, &meta);
    if matches!(context.vfs.capabilities(), vfs::Capabilities::ReadOnly) {
        granted &= !(ACCESS4_MODIFY | ACCESS4_EXTEND | ACCESS4_DELETE);
    }
    Ok(ACCESS4resok { supported, access: supported & granted })
}

fn permitted(context: &rpc::Context, meta: &Metadata) -> u32 {
    let auth = &context.auth;
    let bits = if auth.uid == 0 {
        0o7
    } else if auth.uid == meta.uid {
        (meta.mode >> 6) & 0o7
    } else if auth.gid == meta.gid || auth.gids.contains(&meta.gid) {
        (meta.mode >> 3) & 0o7
    } else {
        meta.mode & 0o7
    };
    let mut access = 0;
    if bits & 0o4 != 0 {
        access |= ACCESS4_READ;
    }
    if bits & 0o2 != 0 {
        access |= ACCESS4_MODIFY | ACCESS4_EXTEND | ACCESS4_DELETE;
    }
    if bits & 0o1 != 0 {
        access |= if meta.is_dir() { ACCESS4_LOOKUP } else { ACCESS4_EXECUTE };
    }
    access
}
