//! Runs a short NFSv4 session against an in-memory file system.
//!
//! The client talks to the server through a [`LocalTransport`], so every
//! call still travels as an encoded RPC record. Run with
//! `cargo run --example memfs` and watch the server log on stderr.

use std::sync::Arc;

use anyhow::{anyhow, bail};
use nfs4_mamont::client::{ops, Client, CompoundResult, LocalTransport};
use nfs4_mamont::memfs::MemFs;
use nfs4_mamont::protocol::rpc::Context;
use nfs4_mamont::xdr::nfs4::attr::{FileAttributes, FATTR4_MODE, FATTR4_SIZE, FATTR4_TYPE};
use nfs4_mamont::xdr::nfs4::client::{cb_client4, nfs_client_id4, SETCLIENTID4res};
use nfs4_mamont::xdr::nfs4::file::stable_how4;
use nfs4_mamont::xdr::nfs4::lock::{nfs_lock_type4, LOCK4res};
use nfs4_mamont::xdr::nfs4::{
    bitmap4, clientid4, nfs_resop4, NfsResult, OPEN4_RESULT_CONFIRM, OPEN4_SHARE_ACCESS_BOTH,
    OPEN4_SHARE_DENY_WRITE,
};

async fn establish_client_id(client: &Client<LocalTransport>) -> anyhow::Result<clientid4> {
    let id = nfs_client_id4 { verifier: *b"memfs-01", id: b"memfs-demo".to_vec() };
    let res = client.compound(vec![ops::setclientid(id, cb_client4::default(), 0)]).await?;
    let ok = match res.get(0) {
        Some(nfs_resop4::OP_SETCLIENTID(SETCLIENTID4res::Ok(ok))) => ok.clone(),
        other => bail!("SETCLIENTID failed: {other:?}"),
    };
    client
        .compound(vec![ops::setclientid_confirm(ok.clientid, ok.setclientid_confirm)])
        .await?
        .check()?;
    Ok(ok.clientid)
}

fn list(res: &CompoundResult) -> anyhow::Result<()> {
    let Some(nfs_resop4::OP_READDIR(NfsResult::Ok(ok))) = res.last() else {
        bail!("READDIR failed with {:?}", res.status);
    };
    for entry in &ok.reply.entries {
        let attrs = FileAttributes::from_fattr(&entry.attrs)?;
        println!(
            "  {:<12} {:?} mode {:o} size {}",
            entry.name,
            attrs.file_type.unwrap_or_default(),
            attrs.mode.unwrap_or_default(),
            attrs.size.unwrap_or_default()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let fs = MemFs::new();
    fs.add_file("/README", b"served from memory\n").await.map_err(|e| anyhow!("{e:?}"))?;
    fs.add_dir("/projects").await.map_err(|e| anyhow!("{e:?}"))?;
    let client = Client::new(LocalTransport::new(Context::new(Arc::new(fs)))).with_tag("memfs");
    client.null().await?;

    let clientid = establish_client_id(&client).await?;
    println!("client id {clientid:#x}");

    let owner = ops::state_owner(clientid, b"demo-owner");
    let res = client
        .compound(vec![
            ops::putrootfh(),
            ops::lookup("projects"),
            ops::open(
                1,
                OPEN4_SHARE_ACCESS_BOTH,
                OPEN4_SHARE_DENY_WRITE,
                owner.clone(),
                ops::create_unchecked(FileAttributes::default().to_fattr()?),
                ops::claim_null("notes.txt"),
            ),
            ops::getfh(),
        ])
        .await?
        .check()?;
    let (Some(nfs_resop4::OP_OPEN(NfsResult::Ok(open))), Some(nfs_resop4::OP_GETFH(NfsResult::Ok(fh)))) =
        (res.get(2), res.get(3))
    else {
        bail!("unexpected OPEN reply");
    };
    let fh = fh.object.clone();
    let mut seqid = 2;
    let mut stateid = open.stateid;
    if open.rflags & OPEN4_RESULT_CONFIRM != 0 {
        let res = client
            .compound(vec![ops::putfh(fh.clone()), ops::open_confirm(stateid, seqid)])
            .await?
            .check()?;
        if let Some(nfs_resop4::OP_OPEN_CONFIRM(NfsResult::Ok(ok))) = res.get(1) {
            stateid = ok.open_stateid;
        }
        seqid += 1;
    }

    let lock_owner = ops::state_owner(clientid, b"demo-lock");
    let res = client
        .compound(vec![
            ops::putfh(fh.clone()),
            ops::lock(
                nfs_lock_type4::WRITE_LT,
                false,
                0,
                u64::MAX,
                ops::new_lock_owner(seqid, stateid, 0, lock_owner),
            ),
        ])
        .await?;
    let lock_stateid = match res.get(1) {
        Some(nfs_resop4::OP_LOCK(LOCK4res::Ok(ok))) => ok.lock_stateid,
        other => bail!("LOCK failed: {other:?}"),
    };
    seqid += 1;

    let text = b"NFSv4 compounds run in one round trip\n".to_vec();
    let res = client
        .compound(vec![
            ops::putfh(fh.clone()),
            ops::write(lock_stateid, 0, stable_how4::FILE_SYNC4, text),
            ops::read(lock_stateid, 0, 1024),
        ])
        .await?
        .check()?;
    if let Some(nfs_resop4::OP_READ(NfsResult::Ok(read))) = res.get(2) {
        print!("read back: {}", String::from_utf8_lossy(&read.data));
    }

    client
        .compound(vec![
            ops::putfh(fh.clone()),
            ops::locku(nfs_lock_type4::WRITE_LT, 2, lock_stateid, 0, u64::MAX),
            ops::close(seqid, stateid),
        ])
        .await?
        .check()?;

    let attrs = bitmap4::from_attrs(&[FATTR4_TYPE, FATTR4_SIZE, FATTR4_MODE]);
    for dir in [None, Some("projects")] {
        let mut request = vec![ops::putrootfh()];
        request.extend(dir.map(ops::lookup));
        request.push(ops::readdir(0, [0; 8], 0, 4096, attrs.clone()));
        let res = client.compound(request).await?;
        println!("/{}", dir.unwrap_or_default());
        list(&res)?;
    }
    Ok(())
}
