//! Implementation of the VERIFY (operation 37) and NVERIFY (operation 17)
//! operations for NFS version 4 as defined in RFC 7530 sections 16.35 and
//! 16.15.
//!
//! Both compare client supplied attribute values with the current ones:
//! VERIFY fails with NFS4ERR_NOT_SAME when they differ, NVERIFY fails with
//! NFS4ERR_SAME when they match. A compound can use them as a guard for
//! the operations that follow.

use tracing::debug;

use super::{attrs, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{NVERIFY4args, NVERIFY4res, VERIFY4args, VERIFY4res};
use crate::protocol::xdr::nfs4::{fattr4, nfsstat4, NfsResult};

pub async fn nfsop4_verify(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &VERIFY4args,
) -> VERIFY4res {
    debug!("nfsop4_verify({:?})", state.current_fh);
    match matches(context, state, &args.obj_attributes).await {
        Ok(true) => NfsResult::Ok(()),
        Ok(false) => NfsResult::Err(nfsstat4::NFS4ERR_NOT_SAME),
        Err(stat) => NfsResult::Err(stat),
    }
}

pub async fn nfsop4_nverify(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &NVERIFY4args,
) -> NVERIFY4res {
    debug!("nfsop4_nverify({:?})", state.current_fh);
    match matches(context, state, &args.obj_attributes).await {
        Ok(true) => NfsResult::Err(nfsstat4::NFS4ERR_SAME),
        Ok(false) => NfsResult::Ok(()),
        Err(stat) => NfsResult::Err(stat),
    }
}

async fn matches(
    context: &rpc::Context,
    state: &CompoundState,
    expected: &fattr4,
) -> Result<bool, nfsstat4> {
    let id = state.current_id(context)?;
    let expected = attrs::decode_for_compare(expected)?;
    let current = attrs::get_attributes(context, id, &expected.mask()).await?;
    Ok(current == expected)
}
