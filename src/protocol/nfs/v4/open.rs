//! Implementation of OPEN (operation 18), OPEN_CONFIRM (operation 20) and
//! OPEN_DOWNGRADE (operation 21) for NFS version 4 as defined in RFC 7530
//! sections 16.16, 16.18 and 16.19.
//!
//! OPEN resolves or creates a regular file by name in the current directory
//! and records a share reservation for the open owner. The whole operation
//! runs with the open owner locked, so two OPENs of one owner never
//! interleave and the owner's sequence id moves only once the reservation
//! is in place. A truncation that fails after the reservation was recorded
//! takes the reservation back. Only `CLAIM_NULL` is served: this server never grants
//! delegations and keeps no state across restarts to reclaim.

use tracing::debug;

use super::{attrs, change_info, check_component, check_writable, dir_change, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::open::{
    createhow4, open_claim4, open_delegation4, openflag4, OPEN4args, OPEN4res, OPEN4resok,
    OPEN_CONFIRM4args, OPEN_CONFIRM4res, OPEN_CONFIRM4resok, OPEN_DOWNGRADE4args,
    OPEN_DOWNGRADE4res, OPEN_DOWNGRADE4resok,
};
use crate::protocol::xdr::nfs4::{
    attr::FATTR4_SIZE, bitmap4, nfs_fh4, nfs_ftype4, nfsstat4, OPEN4_RESULT_CONFIRM,
    OPEN4_RESULT_LOCKTYPE_POSIX, OPEN4_SHARE_ACCESS_WRITE,
};
use crate::state::{OwnerState, Share};
use crate::vfs::{fileid, SetAttributes};

pub async fn nfsop4_open(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &OPEN4args,
) -> OPEN4res {
    debug!("nfsop4_open({:?}, {:?})", state.current_fh, args);
    open(context, state, args).await.into()
}

/// The file an OPEN ends up on.
struct Target {
    id: fileid,
    /// Attributes applied while creating the file
    attrset: bitmap4,
    /// Size to apply to an existing file once the open is granted
    truncate: Option<u64>,
}

async fn open(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &OPEN4args,
) -> Result<OPEN4resok, nfsstat4> {
    state.current_fh()?;
    let name = match &args.claim {
        open_claim4::CLAIM_NULL(name) => name,
        claim => {
            debug!("unsupported open claim {:?}", claim.claim_type());
            return Err(nfsstat4::NFS4ERR_NOTSUPP);
        }
    };
    let dirid = match state.current_dir(context).await {
        Err(nfsstat4::NFS4ERR_SYMLINK) => return Err(nfsstat4::NFS4ERR_NOTDIR),
        res => res?,
    };
    check_component(context, name)?;
    let share = Share::new(args.share_access, args.share_deny)?;
    if args.share_access & OPEN4_SHARE_ACCESS_WRITE != 0 {
        check_writable(context)?;
    }

    let mut owner = context.state.lock_open_owner(&args.owner).await;
    let opened = match open_as_owner(context, &mut owner, args, dirid, name, share).await {
        Ok(opened) => opened,
        Err(stat) => {
            drop(owner);
            context.state.forget_open_owner(&args.owner).await;
            return Err(stat);
        }
    };
    drop(owner);
    state.current_fh = Some(opened.fh);
    Ok(opened.resok)
}

struct Opened {
    fh: nfs_fh4,
    resok: OPEN4resok,
}

/// The part of an OPEN that runs with the open owner locked. On failure
/// neither the owner's sequence id nor the share reservations have moved.
async fn open_as_owner(
    context: &rpc::Context,
    owner: &mut OwnerState,
    args: &OPEN4args,
    dirid: fileid,
    name: &str,
    share: Share,
) -> Result<Opened, nfsstat4> {
    let sequence = owner.sequence;
    let seqid = sequence.check(args.seqid)?;

    let before = dir_change(context, dirid).await?;
    let target = resolve(context, dirid, name, &args.openhow).await?;
    match context.vfs.getattr(target.id).await?.file_type {
        nfs_ftype4::NF4REG => {}
        nfs_ftype4::NF4DIR => return Err(nfsstat4::NFS4ERR_ISDIR),
        nfs_ftype4::NF4LNK => return Err(nfsstat4::NFS4ERR_SYMLINK),
        _ => return Err(nfsstat4::NFS4ERR_INVAL),
    }
    let after = dir_change(context, dirid).await?;

    let fh = context.vfs.id_to_fh(target.id);
    let grant = context.state.grant_open(owner, seqid, &fh, share).await?;

    let mut attrset = target.attrset;
    if let Some(size) = target.truncate {
        let changes = SetAttributes { size: Some(size), ..SetAttributes::default() };
        if let Err(stat) = context.vfs.setattr(target.id, changes).await {
            context.state.withdraw_open(owner, sequence, &fh, &grant).await;
            return Err(stat);
        }
        attrset.set(FATTR4_SIZE);
    }

    let mut rflags = OPEN4_RESULT_LOCKTYPE_POSIX;
    if grant.confirm {
        rflags |= OPEN4_RESULT_CONFIRM;
    }
    let resok = OPEN4resok {
        stateid: grant.stateid,
        cinfo: change_info(before, after),
        rflags,
        attrset,
        delegation: open_delegation4::OPEN_DELEGATE_NONE,
    };
    Ok(Opened { fh, resok })
}

/// Finds `name` in `dirid`, creating it as `openhow` allows.
async fn resolve(
    context: &rpc::Context,
    dirid: fileid,
    name: &str,
    openhow: &openflag4,
) -> Result<Target, nfsstat4> {
    let found = match context.vfs.lookup(dirid, name).await {
        Ok(id) => Some(id),
        Err(nfsstat4::NFS4ERR_NOENT) => None,
        Err(stat) => return Err(stat),
    };
    let how = match openhow {
        openflag4::OPEN4_NOCREATE => {
            let id = found.ok_or(nfsstat4::NFS4ERR_NOENT)?;
            return Ok(Target { id, attrset: bitmap4::new(), truncate: None });
        }
        openflag4::OPEN4_CREATE(how) => how,
    };
    check_writable(context)?;
    let info = context.vfs.fsinfo().await?;
    match how {
        createhow4::UNCHECKED4(fattr) => {
            let changes = attrs::decode_for_set(fattr, &info)?;
            match found {
                // only the size of an existing file is touched
                Some(id) => Ok(Target { id, attrset: bitmap4::new(), truncate: changes.size }),
                None => {
                    let id = context.vfs.create(dirid, name, changes).await?;
                    Ok(Target { id, attrset: fattr.attrmask.clone(), truncate: None })
                }
            }
        }
        createhow4::GUARDED4(fattr) => {
            if found.is_some() {
                return Err(nfsstat4::NFS4ERR_EXIST);
            }
            let changes = attrs::decode_for_set(fattr, &info)?;
            let id = context.vfs.create(dirid, name, changes).await?;
            Ok(Target { id, attrset: fattr.attrmask.clone(), truncate: None })
        }
        createhow4::EXCLUSIVE4(verifier) => {
            let id = context.vfs.create_exclusive(dirid, name, *verifier).await?;
            Ok(Target { id, attrset: bitmap4::new(), truncate: None })
        }
    }
}

pub async fn nfsop4_open_confirm(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &OPEN_CONFIRM4args,
) -> OPEN_CONFIRM4res {
    debug!("nfsop4_open_confirm({:?}, {:?})", args.open_stateid, args.seqid);
    open_confirm(context, state, args).await.into()
}

async fn open_confirm(
    context: &rpc::Context,
    state: &CompoundState,
    args: &OPEN_CONFIRM4args,
) -> Result<OPEN_CONFIRM4resok, nfsstat4> {
    let fh = state.current_fh()?;
    let open_stateid = context.state.open_confirm(fh, &args.open_stateid, args.seqid).await?;
    Ok(OPEN_CONFIRM4resok { open_stateid })
}

pub async fn nfsop4_open_downgrade(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &OPEN_DOWNGRADE4args,
) -> OPEN_DOWNGRADE4res {
    debug!("nfsop4_open_downgrade({:?})", args);
    open_downgrade(context, state, args).await.into()
}

async fn open_downgrade(
    context: &rpc::Context,
    state: &CompoundState,
    args: &OPEN_DOWNGRADE4args,
) -> Result<OPEN_DOWNGRADE4resok, nfsstat4> {
    let fh = state.current_fh()?;
    let open_stateid = context
        .state
        .open_downgrade(fh, &args.open_stateid, args.seqid, args.share_access, args.share_deny)
        .await?;
    Ok(OPEN_DOWNGRADE4resok { open_stateid })
}
