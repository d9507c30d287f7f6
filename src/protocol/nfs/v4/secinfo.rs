//! Implementation of the SECINFO operation (operation 33) for NFS version 4
//! as defined in RFC 7530 section 16.31.
//!
//! Every object of the export accepts the same flavors. After a successful
//! SECINFO the current file handle is consumed.

use tracing::debug;

use super::{check_component, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{secinfo4, SECINFO4args, SECINFO4res, SECINFO4resok};
use crate::protocol::xdr::nfs4::nfsstat4;

pub async fn nfsop4_secinfo(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &SECINFO4args,
) -> SECINFO4res {
    debug!("nfsop4_secinfo({:?}, {:?})", state.current_fh, args.name);
    secinfo(context, state, args).await.into()
}

async fn secinfo(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &SECINFO4args,
) -> Result<SECINFO4resok, nfsstat4> {
    let dirid = state.current_dir(context).await?;
    check_component(context, &args.name)?;
    context.vfs.lookup(dirid, &args.name).await?;
    state.current_fh = None;
    Ok(SECINFO4resok(vec![secinfo4::AUTH_SYS, secinfo4::AUTH_NONE]))
}
