//! Implementation of the RENAME operation (operation 29) for NFS version 4
//! as defined in RFC 7530 section 16.27.
//!
//! The saved file handle is the source directory and the current file
//! handle the target directory.

use tracing::debug;

use super::{change_info, check_component, check_writable, dir_change, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{RENAME4args, RENAME4res, RENAME4resok};
use crate::protocol::xdr::nfs4::{nfs_ftype4, nfsstat4};
use crate::vfs::fileid;

pub async fn nfsop4_rename(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &RENAME4args,
) -> RENAME4res {
    debug!(
        "nfsop4_rename({:?}, {:?}, {:?}, {:?})",
        state.saved_fh, args.oldname, state.current_fh, args.newname
    );
    rename(context, state, args).await.into()
}

async fn rename(
    context: &rpc::Context,
    state: &CompoundState,
    args: &RENAME4args,
) -> Result<RENAME4resok, nfsstat4> {
    let from_dir = saved_dir(context, state).await?;
    let to_dir = state.current_dir(context).await?;
    check_writable(context)?;
    check_component(context, &args.oldname)?;
    check_component(context, &args.newname)?;

    let source_before = dir_change(context, from_dir).await?;
    let target_before = dir_change(context, to_dir).await?;
    context.vfs.rename(from_dir, &args.oldname, to_dir, &args.newname).await?;
    let source_after = dir_change(context, from_dir).await?;
    let target_after = dir_change(context, to_dir).await?;
    Ok(RENAME4resok {
        source_cinfo: change_info(source_before, source_after),
        target_cinfo: change_info(target_before, target_after),
    })
}

async fn saved_dir(context: &rpc::Context, state: &CompoundState) -> Result<fileid, nfsstat4> {
    let fh = state.saved_fh.as_ref().ok_or(nfsstat4::NFS4ERR_NOFILEHANDLE)?;
    let id = context.vfs.fh_to_id(fh)?;
    match context.vfs.getattr(id).await?.file_type {
        nfs_ftype4::NF4DIR => Ok(id),
        _ => Err(nfsstat4::NFS4ERR_NOTDIR),
    }
}
