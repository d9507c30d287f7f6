//! Implementation of the GETATTR operation (operation 9) for NFS version 4
//! as defined in RFC 7530 section 16.7.
//!
//! The reply holds the requested attributes the server supports; others
//! are silently left out of the returned mask.

use tracing::debug;

use super::{attrs, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{GETATTR4args, GETATTR4res, GETATTR4resok};
use crate::protocol::xdr::nfs4::nfsstat4;

pub async fn nfsop4_getattr(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &GETATTR4args,
) -> GETATTR4res {
    debug!("nfsop4_getattr({:?}, {:?})", state.current_fh, args.attr_request);
    getattr(context, state, args).await.into()
}

async fn getattr(
    context: &rpc::Context,
    state: &CompoundState,
    args: &GETATTR4args,
) -> Result<GETATTR4resok, nfsstat4> {
    let id = state.current_id(context)?;
    if !args.attr_request.intersection(&attrs::write_only_attrs()).is_empty() {
        return Err(nfsstat4::NFS4ERR_INVAL);
    }
    let found = attrs::get_attributes(context, id, &args.attr_request).await?;
    Ok(GETATTR4resok { obj_attributes: attrs::encode(&found)? })
}
