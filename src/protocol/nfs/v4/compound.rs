//! Implementation of the COMPOUND procedure (procedure 1) for NFS version 4
//! as defined in RFC 7530 section 15.2.
//!
//! Operations run strictly in the order the client sent them. Each
//! result is appended to the reply, and the first result that is not
//! NFS4_OK ends the compound; its status becomes the status of the whole
//! reply.

use std::io::{Read, Write};

use tracing::{debug, warn};
use tracing_attributes::instrument;

use super::{
    access, clientid, close, commit, create, fh, getattr, link, lock, lookup, open, read,
    readdir, readlink, remove, rename, secinfo, setattr, verify, write, CompoundState,
};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::{
    nfs_argop4, nfs_resop4, nfsstat4, NfsResult, OpStatus, COMPOUND4args, COMPOUND4res,
    MINOR_VERSION,
};
use crate::protocol::xdr::{self, deserialize, Serialize};

/// Handles the `NFSv4` COMPOUND procedure
///
/// Arguments that cannot be decoded are answered with GARBAGE_ARGS at the
/// RPC level; every other outcome is a COMPOUND4res.
pub async fn nfsproc4_compound(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = match deserialize::<COMPOUND4args>(input) {
        Ok(args) => args,
        Err(e) => {
            warn!("nfsproc4_compound({:?}) undecodable arguments: {}", xid, e);
            xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
            return Ok(());
        }
    };
    debug!("nfsproc4_compound({:?}, tag {:?}, {} ops)", xid, args.tag, args.argarray.len());
    let res = run_compound(context, args).await;
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    res.serialize(output)?;
    Ok(())
}

/// Executes the operations of a COMPOUND and collects their results.
#[instrument(level = "debug", skip_all, fields(tag = %args.tag))]
pub async fn run_compound(context: &rpc::Context, args: COMPOUND4args) -> COMPOUND4res {
    if args.minorversion != MINOR_VERSION {
        debug!("minor version {} not supported", args.minorversion);
        return COMPOUND4res {
            status: nfsstat4::NFS4ERR_MINOR_VERS_MISMATCH,
            tag: args.tag,
            resarray: Vec::new(),
        };
    }

    let mut state = CompoundState::default();
    let mut status = nfsstat4::NFS4_OK;
    let mut resarray = Vec::with_capacity(args.argarray.len());
    for op in &args.argarray {
        let res = dispatch(context, &mut state, op).await;
        status = res.status();
        debug!("{:?} -> {:?}", op.opnum(), status);
        resarray.push(res);
        if status != nfsstat4::NFS4_OK {
            break;
        }
    }
    COMPOUND4res { status, tag: args.tag, resarray }
}

async fn dispatch(
    context: &rpc::Context,
    state: &mut CompoundState,
    op: &nfs_argop4,
) -> nfs_resop4 {
    match op {
        nfs_argop4::OP_ACCESS(args) => {
            nfs_resop4::OP_ACCESS(access::nfsop4_access(context, state, args).await)
        }
        nfs_argop4::OP_CLOSE(args) => {
            nfs_resop4::OP_CLOSE(close::nfsop4_close(context, state, args).await)
        }
        nfs_argop4::OP_COMMIT(args) => {
            nfs_resop4::OP_COMMIT(commit::nfsop4_commit(context, state, args).await)
        }
        nfs_argop4::OP_CREATE(args) => {
            nfs_resop4::OP_CREATE(create::nfsop4_create(context, state, args).await)
        }
        nfs_argop4::OP_DELEGPURGE(_) => {
            nfs_resop4::OP_DELEGPURGE(NfsResult::Err(nfsstat4::NFS4ERR_NOTSUPP))
        }
        nfs_argop4::OP_DELEGRETURN(_) => {
            nfs_resop4::OP_DELEGRETURN(NfsResult::Err(nfsstat4::NFS4ERR_NOTSUPP))
        }
        nfs_argop4::OP_GETATTR(args) => {
            nfs_resop4::OP_GETATTR(getattr::nfsop4_getattr(context, state, args).await)
        }
        nfs_argop4::OP_GETFH(()) => nfs_resop4::OP_GETFH(fh::nfsop4_getfh(state)),
        nfs_argop4::OP_LINK(args) => {
            nfs_resop4::OP_LINK(link::nfsop4_link(context, state, args).await)
        }
        nfs_argop4::OP_LOCK(args) => {
            nfs_resop4::OP_LOCK(lock::nfsop4_lock(context, state, args).await)
        }
        nfs_argop4::OP_LOCKT(args) => {
            nfs_resop4::OP_LOCKT(lock::nfsop4_lockt(context, state, args).await)
        }
        nfs_argop4::OP_LOCKU(args) => {
            nfs_resop4::OP_LOCKU(lock::nfsop4_locku(context, state, args).await)
        }
        nfs_argop4::OP_LOOKUP(args) => {
            nfs_resop4::OP_LOOKUP(lookup::nfsop4_lookup(context, state, args).await)
        }
        nfs_argop4::OP_LOOKUPP(()) => {
            nfs_resop4::OP_LOOKUPP(lookup::nfsop4_lookupp(context, state).await)
        }
        nfs_argop4::OP_NVERIFY(args) => {
            nfs_resop4::OP_NVERIFY(verify::nfsop4_nverify(context, state, args).await)
        }
        nfs_argop4::OP_OPEN(args) => {
            nfs_resop4::OP_OPEN(open::nfsop4_open(context, state, args).await)
        }
        nfs_argop4::OP_OPENATTR(_) => {
            nfs_resop4::OP_OPENATTR(NfsResult::Err(nfsstat4::NFS4ERR_NOTSUPP))
        }
        nfs_argop4::OP_OPEN_CONFIRM(args) => {
            nfs_resop4::OP_OPEN_CONFIRM(open::nfsop4_open_confirm(context, state, args).await)
        }
        nfs_argop4::OP_OPEN_DOWNGRADE(args) => nfs_resop4::OP_OPEN_DOWNGRADE(
            open::nfsop4_open_downgrade(context, state, args).await,
        ),
        nfs_argop4::OP_PUTFH(args) => nfs_resop4::OP_PUTFH(fh::nfsop4_putfh(context, state, args)),
        nfs_argop4::OP_PUTPUBFH(()) => nfs_resop4::OP_PUTPUBFH(fh::nfsop4_putrootfh(context, state)),
        nfs_argop4::OP_PUTROOTFH(()) => {
            nfs_resop4::OP_PUTROOTFH(fh::nfsop4_putrootfh(context, state))
        }
        nfs_argop4::OP_READ(args) => {
            nfs_resop4::OP_READ(read::nfsop4_read(context, state, args).await)
        }
        nfs_argop4::OP_READDIR(args) => {
            nfs_resop4::OP_READDIR(readdir::nfsop4_readdir(context, state, args).await)
        }
        nfs_argop4::OP_READLINK(()) => {
            nfs_resop4::OP_READLINK(readlink::nfsop4_readlink(context, state).await)
        }
        nfs_argop4::OP_REMOVE(args) => {
            nfs_resop4::OP_REMOVE(remove::nfsop4_remove(context, state, args).await)
        }
        nfs_argop4::OP_RENAME(args) => {
            nfs_resop4::OP_RENAME(rename::nfsop4_rename(context, state, args).await)
        }
        nfs_argop4::OP_RENEW(args) => {
            nfs_resop4::OP_RENEW(clientid::nfsop4_renew(context, args).await)
        }
        nfs_argop4::OP_RESTOREFH(()) => nfs_resop4::OP_RESTOREFH(fh::nfsop4_restorefh(state)),
        nfs_argop4::OP_SAVEFH(()) => nfs_resop4::OP_SAVEFH(fh::nfsop4_savefh(state)),
        nfs_argop4::OP_SECINFO(args) => {
            nfs_resop4::OP_SECINFO(secinfo::nfsop4_secinfo(context, state, args).await)
        }
        nfs_argop4::OP_SETATTR(args) => {
            nfs_resop4::OP_SETATTR(setattr::nfsop4_setattr(context, state, args).await)
        }
        nfs_argop4::OP_SETCLIENTID(args) => {
            nfs_resop4::OP_SETCLIENTID(clientid::nfsop4_setclientid(context, args).await)
        }
        nfs_argop4::OP_SETCLIENTID_CONFIRM(args) => nfs_resop4::OP_SETCLIENTID_CONFIRM(
            clientid::nfsop4_setclientid_confirm(context, args).await,
        ),
        nfs_argop4::OP_VERIFY(args) => {
            nfs_resop4::OP_VERIFY(verify::nfsop4_verify(context, state, args).await)
        }
        nfs_argop4::OP_WRITE(args) => {
            nfs_resop4::OP_WRITE(write::nfsop4_write(context, state, args).await)
        }
        nfs_argop4::OP_RELEASE_LOCKOWNER(args) => nfs_resop4::OP_RELEASE_LOCKOWNER(
            lock::nfsop4_release_lockowner(context, args).await,
        ),
        nfs_argop4::OP_ILLEGAL => {
            warn!("illegal operation in compound");
            nfs_resop4::illegal()
        }
    }
}
