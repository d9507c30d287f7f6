//! Implementation of the REMOVE operation (operation 28) for NFS version 4
//! as defined in RFC 7530 section 16.26.
//!
//! REMOVE deletes files as well as empty directories, relative to the
//! current directory.

use tracing::debug;

use super::{change_info, check_component, check_writable, dir_change, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{REMOVE4args, REMOVE4res, REMOVE4resok};
use crate::protocol::xdr::nfs4::nfsstat4;

pub async fn nfsop4_remove(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &REMOVE4args,
) -> REMOVE4res {
    debug!("nfsop4_remove({:?}, {:?})", state.current_fh, args.target);
    remove(context, state, args).await.into()
}

async fn remove(
    context: &rpc::Context,
    state: &CompoundState,
    args: &REMOVE4args,
) -> Result<REMOVE4resok, nfsstat4> {
    let dirid = state.current_dir(context).await?;
    check_writable(context)?;
    check_component(context, &args.target)?;
    let before = dir_change(context, dirid).await?;
    context.vfs.remove(dirid, &args.target).await?;
    let after = dir_change(context, dirid).await?;
    Ok(REMOVE4resok { cinfo: change_info(before, after) })
}
