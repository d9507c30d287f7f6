//! Implementation of the WRITE operation (operation 38) for NFS version 4
//! as defined in RFC 7530 section 16.36.
//!
//! Writing through an open or lock stateid requires an open with write
//! access. Special stateids may write unless some open denies writing.

use tracing::debug;

use super::{check_writable, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{WRITE4args, WRITE4res, WRITE4resok};
use crate::protocol::xdr::nfs4::{nfs_ftype4, nfsstat4, OPEN4_SHARE_ACCESS_WRITE};

pub async fn nfsop4_write(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &WRITE4args,
) -> WRITE4res {
    debug!(
        "nfsop4_write({:?}, {:?}, {}, {} bytes, {:?})",
        state.current_fh,
        args.stateid,
        args.offset,
        args.data.len(),
        args.stable
    );
    write(context, state, args).await.into()
}

async fn write(
    context: &rpc::Context,
    state: &CompoundState,
    args: &WRITE4args,
) -> Result<WRITE4resok, nfsstat4> {
    let fh = state.current_fh()?;
    let id = context.vfs.fh_to_id(fh)?;
    check_writable(context)?;
    match context.vfs.getattr(id).await?.file_type {
        nfs_ftype4::NF4REG => {}
        nfs_ftype4::NF4DIR => return Err(nfsstat4::NFS4ERR_ISDIR),
        _ => return Err(nfsstat4::NFS4ERR_INVAL),
    }
    if args.data.len() > context.config.max_write as usize {
        return Err(nfsstat4::NFS4ERR_INVAL);
    }
    let maxfilesize = context.vfs.fsinfo().await?.maxfilesize;
    match args.offset.checked_add(args.data.len() as u64) {
        Some(end) if end <= maxfilesize => {}
        _ => return Err(nfsstat4::NFS4ERR_FBIG),
    }
    context.state.check_io(fh, &args.stateid, OPEN4_SHARE_ACCESS_WRITE).await?;
    let (count, committed) = context.vfs.write(id, args.offset, &args.data, args.stable).await?;
    Ok(WRITE4resok { count, committed, writeverf: context.vfs.write_verifier() })
}
