//! Conversion between file system metadata and NFSv4 attributes.

use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::attr::*;
use crate::protocol::xdr::nfs4::{bitmap4, fattr4, nfs_fh4, nfsstat4, FH4_PERSISTENT};
use crate::vfs::{fileid, FsInfo, Metadata, SetAttributes};

/// Attributes this server reports or accepts.
pub fn supported_attrs() -> bitmap4 {
    bitmap4::from_attrs(&[
        FATTR4_SUPPORTED_ATTRS,
        FATTR4_TYPE,
        FATTR4_FH_EXPIRE_TYPE,
        FATTR4_CHANGE,
        FATTR4_SIZE,
        FATTR4_LINK_SUPPORT,
        FATTR4_SYMLINK_SUPPORT,
        FATTR4_NAMED_ATTR,
        FATTR4_FSID,
        FATTR4_UNIQUE_HANDLES,
        FATTR4_LEASE_TIME,
        FATTR4_RDATTR_ERROR,
        FATTR4_ACLSUPPORT,
        FATTR4_CANSETTIME,
        FATTR4_CASE_INSENSITIVE,
        FATTR4_CASE_PRESERVING,
        FATTR4_CHOWN_RESTRICTED,
        FATTR4_FILEHANDLE,
        FATTR4_FILEID,
        FATTR4_FILES_AVAIL,
        FATTR4_FILES_FREE,
        FATTR4_FILES_TOTAL,
        FATTR4_HOMOGENEOUS,
        FATTR4_MAXFILESIZE,
        FATTR4_MAXLINK,
        FATTR4_MAXNAME,
        FATTR4_MAXREAD,
        FATTR4_MAXWRITE,
        FATTR4_MODE,
        FATTR4_NO_TRUNC,
        FATTR4_NUMLINKS,
        FATTR4_OWNER,
        FATTR4_OWNER_GROUP,
        FATTR4_RAWDEV,
        FATTR4_SPACE_AVAIL,
        FATTR4_SPACE_FREE,
        FATTR4_SPACE_TOTAL,
        FATTR4_SPACE_USED,
        FATTR4_TIME_ACCESS,
        FATTR4_TIME_ACCESS_SET,
        FATTR4_TIME_DELTA,
        FATTR4_TIME_METADATA,
        FATTR4_TIME_MODIFY,
        FATTR4_TIME_MODIFY_SET,
        FATTR4_MOUNTED_ON_FILEID,
    ])
}

/// The subset of [`supported_attrs`] that SETATTR, OPEN and CREATE accept.
fn writable_attrs() -> bitmap4 {
    bitmap4::from_attrs(&[
        FATTR4_SIZE,
        FATTR4_MODE,
        FATTR4_OWNER,
        FATTR4_OWNER_GROUP,
        FATTR4_TIME_ACCESS_SET,
        FATTR4_TIME_MODIFY_SET,
    ])
}

pub(super) fn write_only_attrs() -> bitmap4 {
    bitmap4::from_attrs(&[FATTR4_TIME_ACCESS_SET, FATTR4_TIME_MODIFY_SET])
}

/// Every readable attribute of the object.
pub fn attributes_of(
    context: &rpc::Context,
    meta: &Metadata,
    fh: &nfs_fh4,
    info: &FsInfo,
) -> FileAttributes {
    FileAttributes {
        supported_attrs: Some(supported_attrs()),
        file_type: Some(meta.file_type),
        fh_expire_type: Some(FH4_PERSISTENT),
        change: Some(meta.change),
        size: Some(meta.size),
        link_support: Some(true),
        symlink_support: Some(true),
        named_attr: Some(false),
        fsid: Some(context.config.fsid),
        unique_handles: Some(true),
        lease_time: Some(context.config.lease_time),
        rdattr_error: Some(nfsstat4::NFS4_OK),
        aclsupport: Some(0),
        cansettime: Some(true),
        case_insensitive: Some(false),
        case_preserving: Some(true),
        chown_restricted: Some(true),
        filehandle: Some(fh.clone()),
        fileid: Some(meta.fileid),
        files_avail: Some(info.files_free),
        files_free: Some(info.files_free),
        files_total: Some(info.files_total),
        homogeneous: Some(true),
        maxfilesize: Some(info.maxfilesize),
        maxlink: Some(info.maxlink),
        maxname: Some(info.maxname.min(context.config.max_name_len)),
        maxread: Some(context.config.max_read as u64),
        maxwrite: Some(context.config.max_write as u64),
        mode: Some(meta.mode),
        no_trunc: Some(true),
        numlinks: Some(meta.nlink),
        owner: Some(meta.uid.to_string()),
        owner_group: Some(meta.gid.to_string()),
        rawdev: Some(meta.rawdev),
        space_avail: Some(info.space_free),
        space_free: Some(info.space_free),
        space_total: Some(info.space_total),
        space_used: Some(meta.used),
        time_access: Some(meta.atime),
        time_delta: Some(info.time_delta),
        time_metadata: Some(meta.ctime),
        time_modify: Some(meta.mtime),
        mounted_on_fileid: Some(meta.fileid),
        ..FileAttributes::default()
    }
}

/// The attributes selected by `request` of file `id`.
pub async fn get_attributes(
    context: &rpc::Context,
    id: fileid,
    request: &bitmap4,
) -> Result<FileAttributes, nfsstat4> {
    let meta = context.vfs.getattr(id).await?;
    let info = context.vfs.fsinfo().await?;
    let mut attrs = attributes_of(context, &meta, &context.vfs.id_to_fh(id), &info);
    attrs.retain(request);
    Ok(attrs)
}

pub fn encode(attrs: &FileAttributes) -> Result<fattr4, nfsstat4> {
    attrs.to_fattr().map_err(|_| nfsstat4::NFS4ERR_SERVERFAULT)
}

/// Decodes attributes sent by a client for comparison (VERIFY, NVERIFY).
///
/// Attributes the server does not support are NFS4ERR_ATTRNOTSUPP;
/// write-only attributes and `rdattr_error` cannot be compared and are
/// NFS4ERR_INVAL.
pub fn decode_for_compare(fattr: &fattr4) -> Result<FileAttributes, nfsstat4> {
    let supported = supported_attrs();
    let write_only = write_only_attrs();
    for attr in fattr.attrmask.iter() {
        if !supported.is_set(attr) {
            return Err(nfsstat4::NFS4ERR_ATTRNOTSUPP);
        }
        if write_only.is_set(attr) || attr == FATTR4_RDATTR_ERROR {
            return Err(nfsstat4::NFS4ERR_INVAL);
        }
    }
    FileAttributes::from_fattr(fattr).map_err(|_| nfsstat4::NFS4ERR_BADXDR)
}

/// Decodes attributes sent to be applied by SETATTR, OPEN or CREATE.
///
/// Unsupported attributes are NFS4ERR_ATTRNOTSUPP, read-only ones
/// NFS4ERR_INVAL, owners that are not numeric ids NFS4ERR_BADOWNER and
/// sizes beyond `maxfilesize` NFS4ERR_FBIG.
pub fn decode_for_set(fattr: &fattr4, info: &FsInfo) -> Result<SetAttributes, nfsstat4> {
    let supported = supported_attrs();
    let writable = writable_attrs();
    for attr in fattr.attrmask.iter() {
        if !supported.is_set(attr) {
            return Err(nfsstat4::NFS4ERR_ATTRNOTSUPP);
        }
        if !writable.is_set(attr) {
            return Err(nfsstat4::NFS4ERR_INVAL);
        }
    }
    let attrs = FileAttributes::from_fattr(fattr).map_err(|_| nfsstat4::NFS4ERR_BADXDR)?;
    if attrs.size.is_some_and(|size| size > info.maxfilesize) {
        return Err(nfsstat4::NFS4ERR_FBIG);
    }
    Ok(SetAttributes {
        mode: attrs.mode,
        uid: attrs.owner.as_deref().map(parse_id).transpose()?,
        gid: attrs.owner_group.as_deref().map(parse_id).transpose()?,
        size: attrs.size,
        atime: attrs.time_access_set,
        mtime: attrs.time_modify_set,
    })
}

/// Owners travel as `id` or `id@domain`; only numeric ids are mapped.
fn parse_id(name: &str) -> Result<u32, nfsstat4> {
    let id = name.split('@').next().unwrap_or_default();
    id.parse::<u32>().map_err(|_| nfsstat4::NFS4ERR_BADOWNER)
}
