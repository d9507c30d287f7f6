//! Implementation of the SETATTR operation (operation 34) for NFS version 4
//! as defined in RFC 7530 section 16.32.
//!
//! Changing the size is a write to the file: the stateid must allow
//! writing, exactly as for WRITE.

use tracing::debug;

use super::{attrs, check_writable, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{SETATTR4args, SETATTR4res};
use crate::protocol::xdr::nfs4::{bitmap4, nfs_ftype4, nfsstat4, OPEN4_SHARE_ACCESS_WRITE};

pub async fn nfsop4_setattr(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &SETATTR4args,
) -> SETATTR4res {
    debug!("nfsop4_setattr({:?}, {:?})", state.current_fh, args);
    match setattr(context, state, args).await {
        Ok(attrsset) => SETATTR4res { status: nfsstat4::NFS4_OK, attrsset },
        Err(status) => SETATTR4res { status, attrsset: bitmap4::new() },
    }
}

async fn setattr(
    context: &rpc::Context,
    state: &CompoundState,
    args: &SETATTR4args,
) -> Result<bitmap4, nfsstat4> {
    let fh = state.current_fh()?;
    let id = context.vfs.fh_to_id(fh)?;
    check_writable(context)?;
    let info = context.vfs.fsinfo().await?;
    let changes = attrs::decode_for_set(&args.obj_attributes, &info)?;
    if changes.size.is_some() {
        match context.vfs.getattr(id).await?.file_type {
            nfs_ftype4::NF4REG => {}
            nfs_ftype4::NF4DIR => return Err(nfsstat4::NFS4ERR_ISDIR),
            _ => return Err(nfsstat4::NFS4ERR_INVAL),
        }
        context.state.check_io(fh, &args.stateid, OPEN4_SHARE_ACCESS_WRITE).await?;
    }
    context.vfs.setattr(id, changes).await?;
    Ok(args.obj_attributes.attrmask.clone())
}
