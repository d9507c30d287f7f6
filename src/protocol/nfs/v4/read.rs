//! Implementation of the READ operation (operation 25) for NFS version 4
//! as defined in RFC 7530 section 16.23.
//!
//! The stateid must be one of the special stateids or an open or lock
//! stateid of the current file. Replies are capped at the configured
//! `max_read`; a short read without eof is legal.

use tracing::debug;

use super::CompoundState;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{READ4args, READ4res, READ4resok};
use crate::protocol::xdr::nfs4::{nfs_ftype4, nfsstat4, OPEN4_SHARE_ACCESS_READ};

pub async fn nfsop4_read(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &READ4args,
) -> READ4res {
    debug!("nfsop4_read({:?}, {:?}, {}, {})", state.current_fh, args.stateid, args.offset, args.count);
    read(context, state, args).await.into()
}

async fn read(
    context: &rpc::Context,
    state: &CompoundState,
    args: &READ4args,
) -> Result<READ4resok, nfsstat4> {
    let fh = state.current_fh()?;
    let id = context.vfs.fh_to_id(fh)?;
    match context.vfs.getattr(id).await?.file_type {
        nfs_ftype4::NF4REG => {}
        nfs_ftype4::NF4DIR => return Err(nfsstat4::NFS4ERR_ISDIR),
        _ => return Err(nfsstat4::NFS4ERR_INVAL),
    }
    context.state.check_io(fh, &args.stateid, OPEN4_SHARE_ACCESS_READ).await?;
    let count = args.count.min(context.config.max_read);
    let (data, eof) = context.vfs.read(id, args.offset, count).await?;
    Ok(READ4resok { eof, data })
}
