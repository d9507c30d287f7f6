//! Constructors for the operations of a COMPOUND request.
//!
//! Every function takes exactly the wire fields of its operation and
//! returns the tagged [`nfs_argop4`]; nothing is validated or sent here.
//! Names are taken as `&str` and copied.

use crate::protocol::xdr::nfs4::client::{
    cb_client4, nfs_client_id4, RENEW4args, SETCLIENTID4args, SETCLIENTID_CONFIRM4args,
};
use crate::protocol::xdr::nfs4::dir::{
    createtype4, CREATE4args, LINK4args, LOOKUP4args, READDIR4args, REMOVE4args, RENAME4args,
    SECINFO4args,
};
use crate::protocol::xdr::nfs4::file::{
    stable_how4, ACCESS4args, COMMIT4args, GETATTR4args, PUTFH4args, READ4args, SETATTR4args,
    VERIFY4args, WRITE4args,
};
use crate::protocol::xdr::nfs4::lock::{
    exist_lock_owner4, locker4, nfs_lock_type4, open_to_lock_owner4, LOCK4args, LOCKT4args,
    LOCKU4args, RELEASE_LOCKOWNER4args,
};
use crate::protocol::xdr::nfs4::open::{
    createhow4, open_claim4, openflag4, CLOSE4args, OPEN4args, OPEN_CONFIRM4args,
    OPEN_DOWNGRADE4args,
};
use crate::protocol::xdr::nfs4::{
    bitmap4, clientid4, count4, fattr4, length4, lock_owner4, nfs_argop4, nfs_cookie4, nfs_fh4,
    offset4, open_owner4, seqid4, state_owner4, stateid4, verifier4,
};

pub fn access(access: u32) -> nfs_argop4 {
    nfs_argop4::OP_ACCESS(ACCESS4args { access })
}

pub fn close(seqid: seqid4, open_stateid: stateid4) -> nfs_argop4 {
    nfs_argop4::OP_CLOSE(CLOSE4args { seqid, open_stateid })
}

pub fn commit(offset: offset4, count: count4) -> nfs_argop4 {
    nfs_argop4::OP_COMMIT(COMMIT4args { offset, count })
}

pub fn create(objtype: createtype4, objname: &str, createattrs: fattr4) -> nfs_argop4 {
    nfs_argop4::OP_CREATE(CREATE4args { objtype, objname: objname.to_string(), createattrs })
}

pub fn getattr(attr_request: bitmap4) -> nfs_argop4 {
    nfs_argop4::OP_GETATTR(GETATTR4args { attr_request })
}

pub fn getfh() -> nfs_argop4 {
    nfs_argop4::OP_GETFH(())
}

/// Links the saved file handle into the current directory as `newname`.
pub fn link(newname: &str) -> nfs_argop4 {
    nfs_argop4::OP_LINK(LINK4args { newname: newname.to_string() })
}

pub fn lock(
    locktype: nfs_lock_type4,
    reclaim: bool,
    offset: offset4,
    length: length4,
    locker: locker4,
) -> nfs_argop4 {
    nfs_argop4::OP_LOCK(LOCK4args { locktype, reclaim, offset, length, locker })
}

pub fn lockt(
    locktype: nfs_lock_type4,
    offset: offset4,
    length: length4,
    owner: lock_owner4,
) -> nfs_argop4 {
    nfs_argop4::OP_LOCKT(LOCKT4args { locktype, offset, length, owner })
}

pub fn locku(
    locktype: nfs_lock_type4,
    seqid: seqid4,
    lock_stateid: stateid4,
    offset: offset4,
    length: length4,
) -> nfs_argop4 {
    nfs_argop4::OP_LOCKU(LOCKU4args { locktype, seqid, lock_stateid, offset, length })
}

pub fn lookup(objname: &str) -> nfs_argop4 {
    nfs_argop4::OP_LOOKUP(LOOKUP4args { objname: objname.to_string() })
}

pub fn lookupp() -> nfs_argop4 {
    nfs_argop4::OP_LOOKUPP(())
}

pub fn nverify(obj_attributes: fattr4) -> nfs_argop4 {
    nfs_argop4::OP_NVERIFY(VERIFY4args { obj_attributes })
}

pub fn open(
    seqid: seqid4,
    share_access: u32,
    share_deny: u32,
    owner: open_owner4,
    openhow: openflag4,
    claim: open_claim4,
) -> nfs_argop4 {
    nfs_argop4::OP_OPEN(OPEN4args { seqid, share_access, share_deny, owner, openhow, claim })
}

pub fn open_confirm(open_stateid: stateid4, seqid: seqid4) -> nfs_argop4 {
    nfs_argop4::OP_OPEN_CONFIRM(OPEN_CONFIRM4args { open_stateid, seqid })
}

pub fn open_downgrade(
    open_stateid: stateid4,
    seqid: seqid4,
    share_access: u32,
    share_deny: u32,
) -> nfs_argop4 {
    nfs_argop4::OP_OPEN_DOWNGRADE(OPEN_DOWNGRADE4args {
        open_stateid,
        seqid,
        share_access,
        share_deny,
    })
}

pub fn putfh(object: nfs_fh4) -> nfs_argop4 {
    nfs_argop4::OP_PUTFH(PUTFH4args { object })
}

pub fn putpubfh() -> nfs_argop4 {
    nfs_argop4::OP_PUTPUBFH(())
}

pub fn putrootfh() -> nfs_argop4 {
    nfs_argop4::OP_PUTROOTFH(())
}

pub fn read(stateid: stateid4, offset: offset4, count: count4) -> nfs_argop4 {
    nfs_argop4::OP_READ(READ4args { stateid, offset, count })
}

pub fn readdir(
    cookie: nfs_cookie4,
    cookieverf: verifier4,
    dircount: count4,
    maxcount: count4,
    attr_request: bitmap4,
) -> nfs_argop4 {
    nfs_argop4::OP_READDIR(READDIR4args { cookie, cookieverf, dircount, maxcount, attr_request })
}

pub fn readlink() -> nfs_argop4 {
    nfs_argop4::OP_READLINK(())
}

pub fn release_lockowner(lock_owner: lock_owner4) -> nfs_argop4 {
    nfs_argop4::OP_RELEASE_LOCKOWNER(RELEASE_LOCKOWNER4args { lock_owner })
}

pub fn remove(target: &str) -> nfs_argop4 {
    nfs_argop4::OP_REMOVE(REMOVE4args { target: target.to_string() })
}

/// Renames `oldname` in the saved directory to `newname` in the current one.
pub fn rename(oldname: &str, newname: &str) -> nfs_argop4 {
    nfs_argop4::OP_RENAME(RENAME4args {
        oldname: oldname.to_string(),
        newname: newname.to_string(),
    })
}

pub fn renew(clientid: clientid4) -> nfs_argop4 {
    nfs_argop4::OP_RENEW(RENEW4args { clientid })
}

pub fn restorefh() -> nfs_argop4 {
    nfs_argop4::OP_RESTOREFH(())
}

pub fn savefh() -> nfs_argop4 {
    nfs_argop4::OP_SAVEFH(())
}

pub fn secinfo(name: &str) -> nfs_argop4 {
    nfs_argop4::OP_SECINFO(SECINFO4args { name: name.to_string() })
}

pub fn setattr(stateid: stateid4, obj_attributes: fattr4) -> nfs_argop4 {
    nfs_argop4::OP_SETATTR(SETATTR4args { stateid, obj_attributes })
}

pub fn setclientid(client: nfs_client_id4, callback: cb_client4, callback_ident: u32) -> nfs_argop4 {
    nfs_argop4::OP_SETCLIENTID(SETCLIENTID4args { client, callback, callback_ident })
}

pub fn setclientid_confirm(clientid: clientid4, setclientid_confirm: verifier4) -> nfs_argop4 {
    nfs_argop4::OP_SETCLIENTID_CONFIRM(SETCLIENTID_CONFIRM4args { clientid, setclientid_confirm })
}

pub fn verify(obj_attributes: fattr4) -> nfs_argop4 {
    nfs_argop4::OP_VERIFY(VERIFY4args { obj_attributes })
}

pub fn write(stateid: stateid4, offset: offset4, stable: stable_how4, data: Vec<u8>) -> nfs_argop4 {
    nfs_argop4::OP_WRITE(WRITE4args { stateid, offset, stable, data })
}

/// Open or lock owner `owner` of client `clientid`.
pub fn state_owner(clientid: clientid4, owner: &[u8]) -> state_owner4 {
    state_owner4 { clientid, owner: owner.to_vec() }
}

/// Opens the file `name` of the current directory.
pub fn claim_null(name: &str) -> open_claim4 {
    open_claim4::CLAIM_NULL(name.to_string())
}

pub fn no_create() -> openflag4 {
    openflag4::OPEN4_NOCREATE
}

/// Creates the file or opens it if it exists; `attrs` apply to a new file.
pub fn create_unchecked(attrs: fattr4) -> openflag4 {
    openflag4::OPEN4_CREATE(createhow4::UNCHECKED4(attrs))
}

/// Creates the file, failing with NFS4ERR_EXIST if it exists.
pub fn create_guarded(attrs: fattr4) -> openflag4 {
    openflag4::OPEN4_CREATE(createhow4::GUARDED4(attrs))
}

pub fn create_exclusive(verifier: verifier4) -> openflag4 {
    openflag4::OPEN4_CREATE(createhow4::EXCLUSIVE4(verifier))
}

/// Locker for the first lock of `lock_owner`, derived from an open.
pub fn new_lock_owner(
    open_seqid: seqid4,
    open_stateid: stateid4,
    lock_seqid: seqid4,
    lock_owner: lock_owner4,
) -> locker4 {
    locker4::OpenOwner(open_to_lock_owner4 { open_seqid, open_stateid, lock_seqid, lock_owner })
}

/// Locker for a lock owner that already has a lock stateid.
pub fn existing_lock_owner(lock_stateid: stateid4, lock_seqid: seqid4) -> locker4 {
    locker4::LockOwner(exist_lock_owner4 { lock_stateid, lock_seqid })
}
