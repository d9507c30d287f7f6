//! Byte-range locking operations for NFS version 4 as defined in RFC 7530:
//! LOCK (operation 12, section 16.10), LOCKT (operation 13, section 16.11),
//! LOCKU (operation 14, section 16.12) and RELEASE_LOCKOWNER (operation 39,
//! section 16.37).
//!
//! Locks are advisory POSIX style record locks kept by the state manager.
//! Blocking lock types are served like their non-blocking counterparts;
//! a conflicting request fails at once with NFS4ERR_DENIED. Reclaims are
//! refused since the server has no grace period.

use tracing::debug;

use super::CompoundState;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::lock::{
    LOCK4args, LOCK4res, LOCK4resok, LOCKT4args, LOCKT4res, LOCKU4args, LOCKU4res,
    RELEASE_LOCKOWNER4args, RELEASE_LOCKOWNER4res,
};
use crate::protocol::xdr::nfs4::{nfs_fh4, nfs_ftype4, nfsstat4, stateid4};
use crate::state::LockFailure;

pub async fn nfsop4_lock(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &LOCK4args,
) -> LOCK4res {
    debug!("nfsop4_lock({:?}, {:?})", state.current_fh, args);
    match lock(context, state, args).await {
        Ok(lock_stateid) => LOCK4res::Ok(LOCK4resok { lock_stateid }),
        Err(LockFailure::Denied(denied)) => {
            debug!("lock denied by {:?}", denied);
            LOCK4res::Denied(denied)
        }
        Err(LockFailure::Status(stat)) => LOCK4res::Err(stat),
    }
}

async fn lock(
    context: &rpc::Context,
    state: &CompoundState,
    args: &LOCK4args,
) -> Result<stateid4, LockFailure> {
    let fh = lockable_file(context, state).await?;
    if args.reclaim {
        return Err(nfsstat4::NFS4ERR_NO_GRACE.into());
    }
    context.state.lock(fh, args).await
}

pub async fn nfsop4_lockt(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &LOCKT4args,
) -> LOCKT4res {
    debug!("nfsop4_lockt({:?}, {:?})", state.current_fh, args);
    let res = match lockable_file(context, state).await {
        Ok(fh) => context.state.lockt(fh, args).await,
        Err(stat) => Err(stat.into()),
    };
    match res {
        Ok(()) => LOCKT4res::Ok,
        Err(LockFailure::Denied(denied)) => LOCKT4res::Denied(denied),
        Err(LockFailure::Status(stat)) => LOCKT4res::Err(stat),
    }
}

pub async fn nfsop4_locku(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &LOCKU4args,
) -> LOCKU4res {
    debug!("nfsop4_locku({:?}, {:?})", state.current_fh, args);
    let res = match lockable_file(context, state).await {
        Ok(fh) => context.state.locku(fh, args).await,
        Err(stat) => Err(stat),
    };
    res.into()
}

pub async fn nfsop4_release_lockowner(
    context: &rpc::Context,
    args: &RELEASE_LOCKOWNER4args,
) -> RELEASE_LOCKOWNER4res {
    debug!("nfsop4_release_lockowner({:?})", args.lock_owner);
    context.state.release_lockowner(&args.lock_owner).await.into()
}

/// The current file handle, which must name a regular file.
async fn lockable_file<'a>(
    context: &rpc::Context,
    state: &'a CompoundState,
) -> Result<&'a nfs_fh4, nfsstat4> {
    let fh = state.current_fh()?;
    let id = context.vfs.fh_to_id(fh)?;
    match context.vfs.getattr(id).await?.file_type {
        nfs_ftype4::NF4REG => Ok(fh),
        nfs_ftype4::NF4DIR => Err(nfsstat4::NFS4ERR_ISDIR),
        _ => Err(nfsstat4::NFS4ERR_INVAL),
    }
}
