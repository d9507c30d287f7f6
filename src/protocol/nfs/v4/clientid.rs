//! Client id operations for NFS version 4 as defined in RFC 7530:
//! SETCLIENTID (operation 35, section 16.33), SETCLIENTID_CONFIRM
//! (operation 36, section 16.34) and RENEW (operation 30, section 16.28).
//!
//! A client id is bound to the principal of the call that created it,
//! here the AUTH_UNIX uid and machine name.

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::client::{
    RENEW4args, RENEW4res, SETCLIENTID4args, SETCLIENTID4res, SETCLIENTID_CONFIRM4args,
    SETCLIENTID_CONFIRM4res,
};

pub async fn nfsop4_setclientid(
    context: &rpc::Context,
    args: &SETCLIENTID4args,
) -> SETCLIENTID4res {
    let principal = context.principal();
    debug!("nfsop4_setclientid({:?}, {})", args.client, principal);
    context.state.clients().setclientid(args, &principal).await
}

pub async fn nfsop4_setclientid_confirm(
    context: &rpc::Context,
    args: &SETCLIENTID_CONFIRM4args,
) -> SETCLIENTID_CONFIRM4res {
    debug!("nfsop4_setclientid_confirm({:#x})", args.clientid);
    context.state.clients().confirm(args.clientid, args.setclientid_confirm).await.into()
}

pub async fn nfsop4_renew(context: &rpc::Context, args: &RENEW4args) -> RENEW4res {
    debug!("nfsop4_renew({:#x})", args.clientid);
    context.state.clients().renew(args.clientid).await.into()
}
