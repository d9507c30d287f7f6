//! Implementation of the CLOSE operation (operation 4) for NFS version 4
//! as defined in RFC 7530 section 16.2.

use tracing::debug;

use super::CompoundState;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::open::{CLOSE4args, CLOSE4res};
use crate::protocol::xdr::nfs4::{nfsstat4, stateid4};

/// Releases the share reservation of an open. Closing a stateid twice
/// succeeds both times.
pub async fn nfsop4_close(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &CLOSE4args,
) -> CLOSE4res {
    debug!("nfsop4_close({:?}, {:?})", args.open_stateid, args.seqid);
    close(context, state, args).await.into()
}

async fn close(
    context: &rpc::Context,
    state: &CompoundState,
    args: &CLOSE4args,
) -> Result<stateid4, nfsstat4> {
    let fh = state.current_fh()?;
    context.state.close(fh, &args.open_stateid, args.seqid).await
}
