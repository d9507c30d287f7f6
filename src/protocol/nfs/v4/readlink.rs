//! Implementation of the READLINK operation (operation 27) for NFS version 4
//! as defined in RFC 7530 section 16.25.

use tracing::debug;

use super::CompoundState;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{READLINK4res, READLINK4resok};
use crate::protocol::xdr::nfs4::{nfs_ftype4, nfsstat4};

pub async fn nfsop4_readlink(context: &rpc::Context, state: &mut CompoundState) -> READLINK4res {
    debug!("nfsop4_readlink({:?})", state.current_fh);
    readlink(context, state).await.into()
}

async fn readlink(
    context: &rpc::Context,
    state: &CompoundState,
) -> Result<READLINK4resok, nfsstat4> {
    let id = state.current_id(context)?;
    if context.vfs.getattr(id).await?.file_type != nfs_ftype4::NF4LNK {
        return Err(nfsstat4::NFS4ERR_INVAL);
    }
    Ok(READLINK4resok { link: context.vfs.readlink(id).await? })
}
