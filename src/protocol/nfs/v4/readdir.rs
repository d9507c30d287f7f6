//! Implementation of the READDIR operation (operation 26) for NFS version 4
//! as defined in RFC 7530 section 16.24.
//!
//! Cookies 0, 1 and 2 are reserved by the protocol, so the entry at
//! position `i` of a directory gets cookie `i + 3`. The cookie verifier is
//! the change attribute of the directory: a client continuing a listing
//! after the directory changed gets NFS4ERR_NOT_SAME.
//!
//! Replies are bounded by `maxcount` (the whole READDIR4resok) and, once at
//! least one entry is in, by `dircount` (cookies and names only). Entries
//! are measured in their encoded form before being added.

use tracing::{debug, trace};

use super::{attrs, CompoundState};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::dir::{dirlist4, entry4, READDIR4args, READDIR4res, READDIR4resok};
use crate::protocol::xdr::nfs4::{nfs_cookie4, nfsstat4, verifier4, NFS4_VERIFIER_SIZE};
use crate::write_counter::encoded_len;

const FIRST_COOKIE: nfs_cookie4 = 3;

/// status, cookieverf, end of list marker and eof flag
const REPLY_OVERHEAD: usize = 4 + NFS4_VERIFIER_SIZE + 4 + 4;

pub async fn nfsop4_readdir(
    context: &rpc::Context,
    state: &mut CompoundState,
    args: &READDIR4args,
) -> READDIR4res {
    debug!("nfsop4_readdir({:?}, {:?})", state.current_fh, args);
    readdir(context, state, args).await.into()
}

async fn readdir(
    context: &rpc::Context,
    state: &CompoundState,
    args: &READDIR4args,
) -> Result<READDIR4resok, nfsstat4> {
    let dirid = state.current_dir(context).await?;
    if !args.attr_request.intersection(&attrs::write_only_attrs()).is_empty() {
        return Err(nfsstat4::NFS4ERR_INVAL);
    }
    let start = match args.cookie {
        0 => 0,
        1 | 2 => return Err(nfsstat4::NFS4ERR_BAD_COOKIE),
        cookie => usize::try_from(cookie - FIRST_COOKIE + 1)
            .map_err(|_| nfsstat4::NFS4ERR_BAD_COOKIE)?,
    };

    let cookieverf: verifier4 = context.vfs.getattr(dirid).await?.change.to_be_bytes();
    if args.cookie != 0
        && args.cookieverf != [0; NFS4_VERIFIER_SIZE]
        && args.cookieverf != cookieverf
    {
        debug!("stale readdir cookie verifier {:?}", args.cookieverf);
        return Err(nfsstat4::NFS4ERR_NOT_SAME);
    }

    let info = context.vfs.fsinfo().await?;
    let max_bytes = args.maxcount as usize;
    let max_dircount = args.dircount as usize;
    let max_entries = (max_bytes / 16).max(1);
    let result = context.vfs.readdir(dirid, start, max_entries).await?;

    let mut reply_bytes = REPLY_OVERHEAD;
    let mut dir_bytes = 0;
    let mut entries = Vec::new();
    let mut all_entries_written = true;
    for (index, entry) in result.entries.into_iter().enumerate() {
        let mut found = attrs::attributes_of(
            context,
            &entry.attr,
            &context.vfs.id_to_fh(entry.fileid),
            &info,
        );
        found.retain(&args.attr_request);
        let entry = entry4 {
            cookie: (start + index) as nfs_cookie4 + FIRST_COOKIE,
            name: entry.name,
            attrs: attrs::encode(&found)?,
        };
        // value-follows flag plus the entry itself
        let added_bytes =
            4 + encoded_len(&entry).map_err(|_| nfsstat4::NFS4ERR_SERVERFAULT)?;
        let added_dircount =
            8 + encoded_len(&entry.name).map_err(|_| nfsstat4::NFS4ERR_SERVERFAULT)?;
        let over_dircount =
            max_dircount > 0 && !entries.is_empty() && dir_bytes + added_dircount > max_dircount;
        if reply_bytes + added_bytes > max_bytes || over_dircount {
            all_entries_written = false;
            break;
        }
        trace!("  -- dirent {:?}", entry.name);
        reply_bytes += added_bytes;
        dir_bytes += added_dircount;
        entries.push(entry);
    }
    if entries.is_empty() && !all_entries_written {
        return Err(nfsstat4::NFS4ERR_TOOSMALL);
    }
    let eof = all_entries_written && result.end;
    debug!("readdir from {} returns {} entries, eof {}", start, entries.len(), eof);
    Ok(READDIR4resok { cookieverf, reply: dirlist4 { entries, eof } })
}
