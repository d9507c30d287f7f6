//! File handle operations: PUTFH, PUTROOTFH, PUTPUBFH, GETFH, SAVEFH and
//! RESTOREFH (RFC 7530 sections 16.8, 16.20 to 16.22, 16.29 and 16.30).
//!
//! These only move handles between the client and the two slots of the
//! compound state. The public file handle is the root of the export.

use tracing::debug;

use super::CompoundState;
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::file::{
    GETFH4res, GETFH4resok, PUTFH4args, PUTFH4res, PUTROOTFH4res, RESTOREFH4res, SAVEFH4res,
};
use crate::protocol::xdr::nfs4::{nfsstat4, NfsResult};

pub fn nfsop4_putfh(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &PUTFH4args,
) -> PUTFH4res {
    debug!("nfsop4_putfh({:?})", args.object);
    // reject handles of other server instances right away
    if let Err(stat) = context.vfs.fh_to_id(&args.object) {
        return NfsResult::Err(stat);
    }
    state.current_fh = Some(args.object.clone());
    NfsResult::Ok(())
}

pub fn nfsop4_putrootfh(context: &rpc::Context, state: &mut CompoundState) -> PUTROOTFH4res {
    let root = context.vfs.root_dir();
    state.set_current(context, root);
    debug!("nfsop4_putrootfh -> {:?}", state.current_fh);
    NfsResult::Ok(())
}

pub fn nfsop4_getfh(state: &CompoundState) -> GETFH4res {
    match state.current_fh() {
        Ok(fh) => NfsResult::Ok(GETFH4resok { object: fh.clone() }),
        Err(stat) => NfsResult::Err(stat),
    }
}

pub fn nfsop4_savefh(state: &mut CompoundState) -> SAVEFH4res {
    match state.current_fh.clone() {
        Some(fh) => {
            state.saved_fh = Some(fh);
            NfsResult::Ok(())
        }
        None => NfsResult::Err(nfsstat4::NFS4ERR_NOFILEHANDLE),
    }
}

pub fn nfsop4_restorefh(state: &mut CompoundState) -> RESTOREFH4res {
    match state.saved_fh.clone() {
        Some(fh) => {
            state.current_fh = Some(fh);
            NfsResult::Ok(())
        }
        None => NfsResult::Err(nfsstat4::NFS4ERR_RESTOREFH),
    }
}
