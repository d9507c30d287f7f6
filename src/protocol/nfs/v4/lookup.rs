//! LOOKUP (operation 15) and LOOKUPP (operation 16) for NFS version 4 as
//! defined in RFC 7530 sections 16.13 and 16.14.
//!
//! Both replace the current file handle with the object found; on failure
//! the current file handle is left as it was.

use tracing::debug;

use super::{check_component, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{LOOKUP4args, LOOKUP4res, LOOKUPP4res};
use crate::protocol::xdr::nfs4::nfsstat4;

pub async fn nfsop4_lookup(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &LOOKUP4args,
) -> LOOKUP4res {
    debug!("nfsop4_lookup({:?}, {:?})", state.current_fh, args.objname);
    lookup(context, state, &args.objname).await.into()
}

async fn lookup(
    context: &rpc::Context,
    state: &mut CompoundState,
    name: &str,
) -> Result<(), nfsstat4> {
    let dirid = state.current_dir(context).await?;
    check_component(context, name)?;
    let id = context.vfs.lookup(dirid, name).await?;
    state.set_current(context, id);
    Ok(())
}

pub async fn nfsop4_lookupp(context: &rpc::Context, state: &mut CompoundState) -> LOOKUPP4res {
    debug!("nfsop4_lookupp({:?})", state.current_fh);
    lookupp(context, state).await.into()
}

async fn lookupp(context: &rpc::Context, state: &mut CompoundState) -> Result<(), nfsstat4> {
    let dirid = state.current_dir(context).await?;
    let parent = context.vfs.lookup_parent(dirid).await?;
    state.set_current(context, parent);
    Ok(())
}
