#![allow(dead_code)]

use std::sync::{Arc, Once};

use nfs4_mamont::client::{ops, Client, CompoundResult, LocalTransport};
use nfs4_mamont::config::ServerConfig;
use nfs4_mamont::memfs::MemFs;
use nfs4_mamont::protocol::rpc::Context;
use nfs4_mamont::state::next_seqid;
use nfs4_mamont::xdr::nfs4::open::OPEN4resok;
use nfs4_mamont::xdr::nfs4::{
    nfs_fh4, nfs_resop4, open_owner4, seqid4, stateid4, NfsResult, OPEN4_RESULT_CONFIRM,
};

pub const HELLO: &[u8] = b"hello world";

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// A file system holding `/hello.txt`, `/dir/a`, `/dir/b` and an empty
/// directory `/empty`.
pub async fn sample_fs() -> Arc<MemFs> {
    fill_sample(MemFs::new()).await
}

async fn fill_sample(fs: MemFs) -> Arc<MemFs> {
    fs.add_file("/hello.txt", HELLO).await.expect("add hello.txt");
    fs.add_file("/dir/a", b"a").await.expect("add dir/a");
    fs.add_file("/dir/b", b"bb").await.expect("add dir/b");
    fs.add_dir("/empty").await.expect("add empty");
    Arc::new(fs)
}

pub async fn test_context() -> Context {
    init_tracing();
    Context::new(sample_fs().await)
}

pub async fn test_context_with(config: ServerConfig) -> Context {
    init_tracing();
    Context::with_config(sample_fs().await, config)
}

/// The sample files on a file system whose files may not grow beyond
/// `max_file_size` bytes.
pub async fn test_context_limited(max_file_size: u64) -> Context {
    init_tracing();
    Context::new(fill_sample(MemFs::new().with_max_file_size(max_file_size)).await)
}

pub fn client(context: &Context) -> Client<LocalTransport> {
    Client::new(LocalTransport::new(context.clone()))
}

pub fn owner(name: &str) -> open_owner4 {
    ops::state_owner(1, name.as_bytes())
}

pub fn fh_at(res: &CompoundResult, index: usize) -> nfs_fh4 {
    match res.get(index) {
        Some(nfs_resop4::OP_GETFH(NfsResult::Ok(ok))) => ok.object.clone(),
        other => panic!("expected GETFH result at {index}, got {other:?}"),
    }
}

pub fn open_at(res: &CompoundResult, index: usize) -> OPEN4resok {
    match res.get(index) {
        Some(nfs_resop4::OP_OPEN(NfsResult::Ok(ok))) => ok.clone(),
        other => panic!("expected OPEN result at {index}, got {other:?}"),
    }
}

pub async fn root_fh(client: &Client<LocalTransport>) -> nfs_fh4 {
    let res = client.compound(vec![ops::putrootfh(), ops::getfh()]).await.expect("compound");
    fh_at(&res.check().expect("root fh"), 1)
}

/// An open whose stateid is ready for I/O.
#[derive(Clone, Debug)]
pub struct Opened {
    pub fh: nfs_fh4,
    pub stateid: stateid4,
    /// Next seqid of the open owner
    pub seqid: seqid4,
}

/// Opens the existing root file `name` and confirms the open if the server
/// asks for it.
pub async fn open_existing(
    client: &Client<LocalTransport>,
    owner: &open_owner4,
    seqid: seqid4,
    name: &str,
    access: u32,
    deny: u32,
) -> Opened {
    let res = client
        .compound(vec![
            ops::putrootfh(),
            ops::open(seqid, access, deny, owner.clone(), ops::no_create(), ops::claim_null(name)),
            ops::getfh(),
        ])
        .await
        .expect("compound")
        .check()
        .expect("open");
    let ok = open_at(&res, 1);
    let fh = fh_at(&res, 2);
    let mut opened = Opened { fh, stateid: ok.stateid, seqid: next_seqid(seqid) };
    if ok.rflags & OPEN4_RESULT_CONFIRM != 0 {
        opened.stateid = confirm(client, &opened).await;
        opened.seqid = next_seqid(opened.seqid);
    }
    opened
}

async fn confirm(client: &Client<LocalTransport>, opened: &Opened) -> stateid4 {
    let res = client
        .compound(vec![
            ops::putfh(opened.fh.clone()),
            ops::open_confirm(opened.stateid, opened.seqid),
        ])
        .await
        .expect("compound")
        .check()
        .expect("open_confirm");
    match res.get(1) {
        Some(nfs_resop4::OP_OPEN_CONFIRM(NfsResult::Ok(ok))) => ok.open_stateid,
        other => panic!("expected OPEN_CONFIRM result, got {other:?}"),
    }
}
