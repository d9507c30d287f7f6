//! Implementation of the LINK operation (operation 11) for NFS version 4
//! as defined in RFC 7530 section 16.9.
//!
//! The saved file handle names the existing object, the current file handle
//! the directory receiving the new name.

use tracing::debug;

use super::{change_info, check_component, check_writable, dir_change, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{LINK4args, LINK4res, LINK4resok};
use crate::protocol::xdr::nfs4::nfsstat4;

pub async fn nfsop4_link(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &LINK4args,
) -> LINK4res {
    debug!("nfsop4_link({:?}, {:?}, {:?})", state.saved_fh, state.current_fh, args.newname);
    link(context, state, args).await.into()
}

async fn link(
    context: &rpc::Context,
    state: &CompoundState,
    args: &LINK4args,
) -> Result<LINK4resok, nfsstat4> {
    let source = state.saved_fh.as_ref().ok_or(nfsstat4::NFS4ERR_NOFILEHANDLE)?;
    let file = context.vfs.fh_to_id(source)?;
    let dirid = state.current_dir(context).await?;
    if context.vfs.getattr(file).await?.is_dir() {
        return Err(nfsstat4::NFS4ERR_ISDIR);
    }
    check_writable(context)?;
    check_component(context, &args.newname)?;
    let before = dir_change(context, dirid).await?;
    context.vfs.link(file, dirid, &args.newname).await?;
    let after = dir_change(context, dirid).await?;
    Ok(LINK4resok { cinfo: change_info(before, after) })
}
