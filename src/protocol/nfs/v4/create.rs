//! Implementation of the CREATE operation (operation 6) for NFS version 4
//! as defined in RFC 7530 section 16.4.
//!
//! CREATE makes directories, symbolic links and special files; regular
//! files are created through OPEN and are refused with NFS4ERR_BADTYPE.
//! On success the new object becomes the current file handle.

use tracing::debug;

use super::{attrs, change_info, check_component, check_writable, dir_change, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{createtype4, CREATE4args, CREATE4res, CREATE4resok};
use crate::protocol::xdr::nfs4::{nfs_ftype4, nfsstat4, specdata4};

pub async fn nfsop4_create(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &CREATE4args,
) -> CREATE4res {
    debug!("nfsop4_create({:?}, {:?}, {:?})", state.current_fh, args.objname, args.objtype);
    create(context, state, args).await.into()
}

async fn create(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &CREATE4args,
) -> Result<CREATE4resok, nfsstat4> {
    let dirid = state.current_dir(context).await?;
    if let createtype4::OTHER(_) = args.objtype {
        return Err(nfsstat4::NFS4ERR_BADTYPE);
    }
    check_writable(context)?;
    check_component(context, &args.objname)?;
    let info = context.vfs.fsinfo().await?;
    let changes = attrs::decode_for_set(&args.createattrs, &info)?;
    let name = args.objname.as_str();
    let vfs = &context.vfs;

    let before = dir_change(context, dirid).await?;
    let id = match &args.objtype {
        createtype4::NF4DIR => vfs.mkdir(dirid, name, changes).await?,
        createtype4::NF4LNK(target) => vfs.symlink(dirid, name, target, changes).await?,
        createtype4::NF4BLK(dev) => vfs.mknod(dirid, name, nfs_ftype4::NF4BLK, *dev, changes).await?,
        createtype4::NF4CHR(dev) => vfs.mknod(dirid, name, nfs_ftype4::NF4CHR, *dev, changes).await?,
        createtype4::NF4SOCK => {
            vfs.mknod(dirid, name, nfs_ftype4::NF4SOCK, specdata4::default(), changes).await?
        }
        createtype4::NF4FIFO => {
            vfs.mknod(dirid, name, nfs_ftype4::NF4FIFO, specdata4::default(), changes).await?
        }
        createtype4::OTHER(_) => return Err(nfsstat4::NFS4ERR_BADTYPE),
    };
    let after = dir_change(context, dirid).await?;
    state.set_current(context, id);
    Ok(CREATE4resok {
        cinfo: change_info(before, after),
        attrset: args.createattrs.attrmask.clone(),
    })
}
