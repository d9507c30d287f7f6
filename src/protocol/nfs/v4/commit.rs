//! Implementation of the COMMIT operation (operation 5) for NFS version 4
//! as defined in RFC 7530 section 16.3.
//!
//! The returned verifier lets the client detect a server restart between
//! its unstable WRITEs and the COMMIT.

use tracing::debug;

use super::CompoundState;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{COMMIT4args, COMMIT4res, COMMIT4resok};
use crate::protocol::xdr::nfs4::{nfs_ftype4, nfsstat4};

pub async fn nfsop4_commit(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &COMMIT4args,
) -> COMMIT4res {
    debug!("nfsop4_commit({:?}, {}, {})", state.current_fh, args.offset, args.count);
    commit(context, state, args).await.into()
}

async fn commit(
    context: &rpc::Context,
    state: &CompoundState,
    args: &COMMIT4args,
) -> Result<COMMIT4resok, nfsstat4> {
    let id = state.current_id(context)?;
    match context.vfs.getattr(id).await?.file_type {
        nfs_ftype4::NF4REG => {}
        nfs_ftype4::NF4DIR => return Err(nfsstat4::NFS4ERR_ISDIR),
        _ => return Err(nfsstat4::NFS4ERR_INVAL),
    }
    if args.offset.checked_add(args.count as u64).is_none() {
        return Err(nfsstat4::NFS4ERR_INVAL);
    }
    context.vfs.commit(id, args.offset, args.count).await?;
    Ok(COMMIT4resok { writeverf: context.vfs.write_verifier() })
}
