mod support;

use nfs4_mamont::client::{ops, Client, CompoundResult, LocalTransport};
use nfs4_mamont::config::ServerConfig;
use nfs4_mamont::memfs::MemFs;
use nfs4_mamont::protocol::nfs::v4::run_compound;
use nfs4_mamont::xdr::nfs4::attr::{
    FileAttributes, FATTR4_MAXFILESIZE, FATTR4_MODE, FATTR4_SIZE, FATTR4_TIME_MODIFY_SET,
    FATTR4_TYPE,
};
use nfs4_mamont::xdr::nfs4::dir::{createtype4, secinfo4, READDIR4resok, SECINFO4resok};
use nfs4_mamont::xdr::nfs4::file::stable_how4;
use nfs4_mamont::xdr::nfs4::{
    bitmap4, fattr4, nfs_argop4, nfs_fh4, nfs_ftype4, nfs_resop4, nfsstat4, stateid4, NfsResult,
    COMPOUND4args, ACCESS4_LOOKUP, ACCESS4_MODIFY, ACCESS4_READ,
};
use nfs4_mamont::vfs::{NFSFileSystem, SetAttributes};

use support::{
    client, fh_at, root_fh, test_context, test_context_limited, test_context_with, HELLO,
};

async fn run(client: &Client<LocalTransport>, ops: Vec<nfs_argop4>) -> CompoundResult {
    client.compound(ops).await.expect("compound call")
}

fn attrs_at(res: &CompoundResult, index: usize) -> FileAttributes {
    match res.get(index) {
        Some(nfs_resop4::OP_GETATTR(NfsResult::Ok(ok))) => {
            FileAttributes::from_fattr(&ok.obj_attributes).expect("decode attributes")
        }
        other => panic!("expected GETATTR result at {index}, got {other:?}"),
    }
}

fn readdir_at(res: &CompoundResult, index: usize) -> READDIR4resok {
    match res.get(index) {
        Some(nfs_resop4::OP_READDIR(NfsResult::Ok(ok))) => ok.clone(),
        other => panic!("expected READDIR result at {index}, got {other:?}"),
    }
}

fn read_at(res: &CompoundResult, index: usize) -> (Vec<u8>, bool) {
    match res.get(index) {
        Some(nfs_resop4::OP_READ(NfsResult::Ok(ok))) => (ok.data.clone(), ok.eof),
        other => panic!("expected READ result at {index}, got {other:?}"),
    }
}

fn size_attr(size: u64) -> fattr4 {
    FileAttributes { size: Some(size), ..FileAttributes::default() }.to_fattr().expect("encode")
}

#[tokio::test]
async fn null_and_empty_compound() {
    let context = test_context().await;
    let client = client(&context).with_tag("empty");
    client.null().await.expect("null");

    let res = run(&client, Vec::new()).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    assert_eq!(res.tag, "empty");
    assert!(res.results.is_empty());
}

#[tokio::test]
async fn stops_at_first_failure() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("missing"), ops::getattr(bitmap4::from_attrs(&[FATTR4_TYPE]))],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOENT);
    assert_eq!(res.results.len(), 2);
    assert_eq!(res.last(), Some(&nfs_resop4::OP_LOOKUP(NfsResult::Err(nfsstat4::NFS4ERR_NOENT))));

    let err = res.check().expect_err("failed compound");
    assert!(err.to_string().contains("operation 1"), "unexpected error: {err}");
}

#[tokio::test]
async fn minor_version_mismatch_runs_nothing() {
    let context = test_context().await;
    let res = run_compound(
        &context,
        COMPOUND4args {
            tag: "v1".to_string(),
            minorversion: 1,
            argarray: vec![ops::putrootfh(), ops::getfh()],
        },
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_MINOR_VERS_MISMATCH);
    assert_eq!(res.tag, "v1");
    assert!(res.resarray.is_empty());
}

#[tokio::test]
async fn illegal_operation_ends_compound() {
    let context = test_context().await;
    let res = run_compound(
        &context,
        COMPOUND4args {
            tag: String::new(),
            minorversion: 0,
            argarray: vec![ops::putrootfh(), nfs_argop4::OP_ILLEGAL, ops::getfh()],
        },
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_OP_ILLEGAL);
    assert_eq!(res.resarray, vec![nfs_resop4::OP_PUTROOTFH(NfsResult::Ok(())), nfs_resop4::illegal()]);
}

#[tokio::test]
async fn operations_need_a_current_filehandle() {
    let context = test_context().await;
    let client = client(&context);
    for op in [
        ops::getfh(),
        ops::lookup("hello.txt"),
        ops::getattr(bitmap4::from_attrs(&[FATTR4_SIZE])),
        ops::read(stateid4::ANONYMOUS, 0, 10),
        ops::savefh(),
    ] {
        let res = run(&client, vec![op]).await;
        assert_eq!(res.status, nfsstat4::NFS4ERR_NOFILEHANDLE);
    }
    let res = run(&client, vec![ops::putrootfh(), ops::restorefh()]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_RESTOREFH);
}

#[tokio::test]
async fn saved_filehandle_survives_lookups() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("dir"),
            ops::getfh(),
            ops::savefh(),
            ops::lookup("a"),
            ops::restorefh(),
            ops::getfh(),
        ],
    )
    .await
    .check()
    .expect("compound");
    assert_eq!(fh_at(&res, 2), fh_at(&res, 6));
}

#[tokio::test]
async fn lookupp_walks_up() {
    let context = test_context().await;
    let client = client(&context);
    let root = root_fh(&client).await;

    let res = run(&client, vec![ops::putrootfh(), ops::lookup("dir"), ops::lookupp(), ops::getfh()])
        .await
        .check()
        .expect("compound");
    assert_eq!(fh_at(&res, 3), root);

    let res = run(&client, vec![ops::putrootfh(), ops::lookupp()]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOENT);

    let res = run(&client, vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::lookupp()]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOTDIR);
}

#[tokio::test]
async fn lookup_through_a_file_is_notdir() {
    let context = test_context().await;
    let client = client(&context);
    let res =
        run(&client, vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::lookup("x")]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOTDIR);
    assert_eq!(res.results.len(), 3);
}

#[tokio::test]
async fn name_components_are_validated() {
    let context = test_context_with(ServerConfig::default().with_max_name_len(8)).await;
    let client = client(&context);
    for (name, status) in [
        ("", nfsstat4::NFS4ERR_INVAL),
        (".", nfsstat4::NFS4ERR_BADNAME),
        ("..", nfsstat4::NFS4ERR_BADNAME),
        ("dir/a", nfsstat4::NFS4ERR_BADCHAR),
        ("nul\0", nfsstat4::NFS4ERR_BADCHAR),
        ("too-long-name", nfsstat4::NFS4ERR_NAMETOOLONG),
    ] {
        let res = run(&client, vec![ops::putrootfh(), ops::lookup(name)]).await;
        assert_eq!(res.status, status, "lookup of {name:?}");
        let res =
            run(&client, vec![ops::putrootfh(), ops::create(createtype4::NF4DIR, name, fattr4::default())])
                .await;
        assert_eq!(res.status, status, "create of {name:?}");
    }
}

#[tokio::test]
async fn putfh_rejects_foreign_handles() {
    let context = test_context().await;
    let client = client(&context);
    let root = root_fh(&client).await;

    let res = run(&client, vec![ops::putfh(nfs_fh4 { data: vec![1, 2, 3] })]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_BADHANDLE);

    let mut stale = root.clone();
    let generation = u64::from_le_bytes(stale.data[..8].try_into().expect("generation"));
    stale.data[..8].copy_from_slice(&(generation - 1).to_le_bytes());
    let res = run(&client, vec![ops::putfh(stale)]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_STALE);

    let res = run(&client, vec![ops::putfh(root.clone()), ops::getfh()]).await.check().expect("putfh");
    assert_eq!(fh_at(&res, 1), root);

    let res = run(&client, vec![ops::putpubfh(), ops::getfh()]).await.check().expect("putpubfh");
    assert_eq!(fh_at(&res, 1), root);
}

#[tokio::test]
async fn getattr_returns_requested_attributes() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::getattr(bitmap4::from_attrs(&[FATTR4_TYPE, FATTR4_SIZE, FATTR4_MODE])),
        ],
    )
    .await
    .check()
    .expect("getattr");
    let attrs = attrs_at(&res, 2);
    assert_eq!(attrs.file_type, Some(nfs_ftype4::NF4REG));
    assert_eq!(attrs.size, Some(HELLO.len() as u64));
    assert_eq!(attrs.mode, Some(0o644));
    assert_eq!(attrs.mask(), bitmap4::from_attrs(&[FATTR4_TYPE, FATTR4_SIZE, FATTR4_MODE]));

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::getattr(bitmap4::from_attrs(&[FATTR4_TIME_MODIFY_SET]))],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_INVAL);
}

#[tokio::test]
async fn access_is_limited_to_requested_bits() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(&client, vec![ops::putrootfh(), ops::access(ACCESS4_READ | ACCESS4_LOOKUP | 0x100)])
        .await
        .check()
        .expect("access");
    match res.get(1) {
        Some(nfs_resop4::OP_ACCESS(NfsResult::Ok(ok))) => {
            assert_eq!(ok.supported, ACCESS4_READ | ACCESS4_LOOKUP);
            assert_eq!(ok.access, ACCESS4_READ | ACCESS4_LOOKUP);
        }
        other => panic!("expected ACCESS result, got {other:?}"),
    }

    let client = client.with_credentials(&nfs4_mamont::xdr::rpc::auth_unix {
        uid: 1000,
        gid: 1000,
        machinename: b"host".to_vec(),
        ..Default::default()
    });
    let client = client.expect("credentials");
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::access(ACCESS4_READ | ACCESS4_MODIFY)],
    )
    .await
    .check()
    .expect("access");
    match res.get(2) {
        Some(nfs_resop4::OP_ACCESS(NfsResult::Ok(ok))) => {
            assert_eq!(ok.supported, ACCESS4_READ | ACCESS4_MODIFY);
            // 0o644 owned by root: others may only read
            assert_eq!(ok.access, ACCESS4_READ);
        }
        other => panic!("expected ACCESS result, got {other:?}"),
    }
}

#[tokio::test]
async fn readdir_pages_through_directory() {
    let context = test_context().await;
    let client = client(&context);

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::readdir(0, [0; 8], 0, 4096, bitmap4::default())],
    )
    .await
    .check()
    .expect("readdir");
    let listing = readdir_at(&res, 2);
    let names: Vec<_> = listing.reply.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    let cookies: Vec<_> = listing.reply.entries.iter().map(|e| e.cookie).collect();
    assert_eq!(cookies, [3, 4]);
    assert!(listing.reply.eof);

    // room for exactly one entry without attributes
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::readdir(0, [0; 8], 0, 48, bitmap4::default())],
    )
    .await
    .check()
    .expect("first page");
    let first = readdir_at(&res, 2);
    assert_eq!(first.reply.entries.len(), 1);
    assert_eq!(first.reply.entries[0].name, "a");
    assert!(!first.reply.eof);

    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("dir"),
            ops::readdir(first.reply.entries[0].cookie, first.cookieverf, 0, 48, bitmap4::default()),
        ],
    )
    .await
    .check()
    .expect("second page");
    let second = readdir_at(&res, 2);
    assert_eq!(second.reply.entries.len(), 1);
    assert_eq!(second.reply.entries[0].name, "b");
    assert_eq!(second.reply.entries[0].cookie, 4);
    assert!(second.reply.eof);
}

#[tokio::test]
async fn readdir_returns_requested_attributes() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("dir"),
            ops::readdir(0, [0; 8], 0, 4096, bitmap4::from_attrs(&[FATTR4_SIZE])),
        ],
    )
    .await
    .check()
    .expect("readdir");
    let sizes: Vec<_> = readdir_at(&res, 2)
        .reply
        .entries
        .iter()
        .map(|e| FileAttributes::from_fattr(&e.attrs).expect("decode").size)
        .collect();
    assert_eq!(sizes, [Some(1), Some(2)]);
}

#[tokio::test]
async fn readdir_rejects_bad_cookies_and_small_buffers() {
    let context = test_context().await;
    let client = client(&context);

    for cookie in [1, 2] {
        let res = run(
            &client,
            vec![ops::putrootfh(), ops::lookup("dir"), ops::readdir(cookie, [0; 8], 0, 4096, bitmap4::default())],
        )
        .await;
        assert_eq!(res.status, nfsstat4::NFS4ERR_BAD_COOKIE);
    }

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::readdir(0, [0; 8], 0, 30, bitmap4::default())],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_TOOSMALL);

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::readdir(0, [0; 8], 0, 4096, bitmap4::default())],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOTDIR);

    // an empty directory lists nothing, at eof
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("empty"), ops::readdir(0, [0; 8], 0, 4096, bitmap4::default())],
    )
    .await
    .check()
    .expect("empty readdir");
    let listing = readdir_at(&res, 2);
    assert!(listing.reply.entries.is_empty());
    assert!(listing.reply.eof);
}

#[tokio::test]
async fn readdir_detects_directory_changes() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::readdir(0, [0; 8], 0, 48, bitmap4::default())],
    )
    .await
    .check()
    .expect("first page");
    let first = readdir_at(&res, 2);

    run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::create(createtype4::NF4DIR, "c", fattr4::default())],
    )
    .await
    .check()
    .expect("create");

    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("dir"),
            ops::readdir(first.reply.entries[0].cookie, first.cookieverf, 0, 4096, bitmap4::default()),
        ],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOT_SAME);
}

#[tokio::test]
async fn create_directory_symlink_and_device() {
    let context = test_context().await;
    let client = client(&context);
    let mode = FileAttributes { mode: Some(0o700), ..FileAttributes::default() }
        .to_fattr()
        .expect("encode");

    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::create(createtype4::NF4DIR, "newdir", mode),
            ops::getattr(bitmap4::from_attrs(&[FATTR4_TYPE, FATTR4_MODE])),
        ],
    )
    .await
    .check()
    .expect("mkdir");
    match res.get(1) {
        Some(nfs_resop4::OP_CREATE(NfsResult::Ok(ok))) => {
            assert!(ok.cinfo.after > ok.cinfo.before);
            assert_eq!(ok.attrset, bitmap4::from_attrs(&[FATTR4_MODE]));
        }
        other => panic!("expected CREATE result, got {other:?}"),
    }
    let attrs = attrs_at(&res, 2);
    assert_eq!(attrs.file_type, Some(nfs_ftype4::NF4DIR));
    assert_eq!(attrs.mode, Some(0o700));

    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::create(createtype4::NF4LNK("hello.txt".to_string()), "ln", fattr4::default()),
            ops::readlink(),
        ],
    )
    .await
    .check()
    .expect("symlink");
    match res.get(2) {
        Some(nfs_resop4::OP_READLINK(NfsResult::Ok(ok))) => assert_eq!(ok.link, "hello.txt"),
        other => panic!("expected READLINK result, got {other:?}"),
    }

    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::create(createtype4::NF4FIFO, "fifo", fattr4::default()),
            ops::getattr(bitmap4::from_attrs(&[FATTR4_TYPE])),
        ],
    )
    .await
    .check()
    .expect("mknod");
    assert_eq!(attrs_at(&res, 2).file_type, Some(nfs_ftype4::NF4FIFO));

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::create(createtype4::OTHER(1), "file", fattr4::default())],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_BADTYPE);

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::create(createtype4::NF4DIR, "dir", fattr4::default())],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_EXIST);

    let res = run(&client, vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::readlink()]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_INVAL);
}

#[tokio::test]
async fn remove_reports_directory_change() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(&client, vec![ops::putrootfh(), ops::remove("hello.txt")])
        .await
        .check()
        .expect("remove");
    match res.get(1) {
        Some(nfs_resop4::OP_REMOVE(NfsResult::Ok(ok))) => assert!(ok.cinfo.after > ok.cinfo.before),
        other => panic!("expected REMOVE result, got {other:?}"),
    }
    let res = run(&client, vec![ops::putrootfh(), ops::lookup("hello.txt")]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOENT);

    let res = run(&client, vec![ops::putrootfh(), ops::remove("dir")]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOTEMPTY);
    let res = run(&client, vec![ops::putrootfh(), ops::remove("empty")]).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn rename_moves_between_directories() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::savefh(), ops::lookup("dir"), ops::rename("hello.txt", "c")],
    )
    .await
    .check()
    .expect("rename");
    match res.get(3) {
        Some(nfs_resop4::OP_RENAME(NfsResult::Ok(ok))) => {
            assert!(ok.source_cinfo.after > ok.source_cinfo.before);
            assert!(ok.target_cinfo.after > ok.target_cinfo.before);
        }
        other => panic!("expected RENAME result, got {other:?}"),
    }
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::lookup("c"), ops::read(stateid4::ANONYMOUS, 0, 100)],
    )
    .await
    .check()
    .expect("read renamed");
    assert_eq!(read_at(&res, 3).0, HELLO);

    let res = run(&client, vec![ops::putrootfh(), ops::rename("a", "b")]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOFILEHANDLE);
}

#[tokio::test]
async fn link_adds_a_second_name() {
    let context = test_context().await;
    let client = client(&context);
    run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::savefh(),
            ops::putrootfh(),
            ops::lookup("dir"),
            ops::link("h"),
        ],
    )
    .await
    .check()
    .expect("link");
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::lookup("h"), ops::read(stateid4::ANONYMOUS, 0, 100)],
    )
    .await
    .check()
    .expect("read link");
    assert_eq!(read_at(&res, 3).0, HELLO);

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("dir"), ops::savefh(), ops::putrootfh(), ops::link("d")],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_ISDIR);
}

#[tokio::test]
async fn read_and_write_with_special_stateids() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::write(stateid4::ANONYMOUS, 6, stable_how4::UNSTABLE4, b"there".to_vec()),
            ops::commit(0, 0),
            ops::read(stateid4::READ_BYPASS, 0, 100),
        ],
    )
    .await
    .check()
    .expect("write");
    let writeverf = match res.get(2) {
        Some(nfs_resop4::OP_WRITE(NfsResult::Ok(ok))) => {
            assert_eq!(ok.count, 5);
            ok.writeverf
        }
        other => panic!("expected WRITE result, got {other:?}"),
    };
    match res.get(3) {
        Some(nfs_resop4::OP_COMMIT(NfsResult::Ok(ok))) => assert_eq!(ok.writeverf, writeverf),
        other => panic!("expected COMMIT result, got {other:?}"),
    }
    assert_eq!(read_at(&res, 4), (b"hello there".to_vec(), true));

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::read(stateid4::ANONYMOUS, 100, 10)],
    )
    .await
    .check()
    .expect("read past eof");
    assert_eq!(read_at(&res, 2), (Vec::new(), true));

    let res = run(&client, vec![ops::putrootfh(), ops::read(stateid4::ANONYMOUS, 0, 10)]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_ISDIR);
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::write(stateid4::ANONYMOUS, 0, stable_how4::FILE_SYNC4, vec![1])],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_ISDIR);

    let bogus = stateid4 { seqid: 1, other: [7; 12] };
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::read(bogus, 0, 10)],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_BAD_STATEID);
}

#[tokio::test]
async fn io_sizes_follow_configuration() {
    let context =
        test_context_with(ServerConfig::default().with_max_read(4).with_max_write(4)).await;
    let client = client(&context);
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::read(stateid4::ANONYMOUS, 0, 100)],
    )
    .await
    .check()
    .expect("short read");
    assert_eq!(read_at(&res, 2), (b"hell".to_vec(), false));

    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::write(stateid4::ANONYMOUS, 0, stable_how4::FILE_SYNC4, b"12345".to_vec()),
        ],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_INVAL);
}

#[tokio::test]
async fn setattr_changes_mode_and_size() {
    let context = test_context().await;
    let client = client(&context);
    let mut attrs = FileAttributes { mode: Some(0o600), size: Some(5), ..FileAttributes::default() };
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::setattr(stateid4::ANONYMOUS, attrs.to_fattr().expect("encode")),
            ops::getattr(bitmap4::from_attrs(&[FATTR4_SIZE, FATTR4_MODE])),
            ops::read(stateid4::ANONYMOUS, 0, 100),
        ],
    )
    .await
    .check()
    .expect("setattr");
    match res.get(2) {
        Some(nfs_resop4::OP_SETATTR(res)) => {
            assert_eq!(res.status, nfsstat4::NFS4_OK);
            assert_eq!(res.attrsset, bitmap4::from_attrs(&[FATTR4_SIZE, FATTR4_MODE]));
        }
        other => panic!("expected SETATTR result, got {other:?}"),
    }
    assert_eq!(attrs_at(&res, 3), attrs);
    assert_eq!(read_at(&res, 4).0, b"hello");

    attrs.mode = None;
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::setattr(stateid4::ANONYMOUS, attrs.to_fattr().expect("encode"))],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_ISDIR);
    match res.last() {
        Some(nfs_resop4::OP_SETATTR(res)) => assert!(res.attrsset.is_empty()),
        other => panic!("expected SETATTR result, got {other:?}"),
    }
}

#[tokio::test]
async fn setattr_size_is_bounded_by_max_file_size() {
    let context = test_context().await;
    let client = client(&context);
    for size in [u64::MAX, 1 << 40] {
        let res = run(
            &client,
            vec![
                ops::putrootfh(),
                ops::lookup("hello.txt"),
                ops::setattr(stateid4::ANONYMOUS, size_attr(size)),
            ],
        )
        .await;
        assert_eq!(res.status, nfsstat4::NFS4ERR_FBIG, "size {size}");
    }
    let res = run(
        &client,
        vec![ops::putrootfh(), ops::create(createtype4::NF4DIR, "big", size_attr(u64::MAX))],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_FBIG);
    let res = run(&client, vec![ops::putrootfh(), ops::lookup("big")]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOENT);

    let context = test_context_limited(16).await;
    let client = support::client(&context);
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::getattr(bitmap4::from_attrs(&[FATTR4_MAXFILESIZE])),
            ops::setattr(stateid4::ANONYMOUS, size_attr(17)),
        ],
    )
    .await;
    assert_eq!(attrs_at(&res, 2).maxfilesize, Some(16));
    assert_eq!(res.status, nfsstat4::NFS4ERR_FBIG);

    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::setattr(stateid4::ANONYMOUS, size_attr(16)),
            ops::getattr(bitmap4::from_attrs(&[FATTR4_SIZE])),
        ],
    )
    .await
    .check()
    .expect("setattr to the limit");
    assert_eq!(attrs_at(&res, 3).size, Some(16));
}

#[tokio::test]
async fn write_is_bounded_by_max_file_size() {
    let context = test_context().await;
    let client = client(&context);
    for offset in [1 << 62, u64::MAX] {
        let res = run(
            &client,
            vec![
                ops::putrootfh(),
                ops::lookup("hello.txt"),
                ops::write(stateid4::ANONYMOUS, offset, stable_how4::UNSTABLE4, b"x".to_vec()),
            ],
        )
        .await;
        assert_eq!(res.status, nfsstat4::NFS4ERR_FBIG, "offset {offset}");
    }

    let context = test_context_limited(16).await;
    let client = support::client(&context);
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::write(stateid4::ANONYMOUS, 12, stable_how4::FILE_SYNC4, b"hello".to_vec()),
        ],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_FBIG);
    let res = run(
        &client,
        vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::write(stateid4::ANONYMOUS, 11, stable_how4::FILE_SYNC4, b"hello".to_vec()),
            ops::read(stateid4::ANONYMOUS, 0, 100),
        ],
    )
    .await
    .check()
    .expect("write up to the limit");
    assert_eq!(read_at(&res, 3), (b"hello worldhello".to_vec(), true));
}

#[tokio::test]
async fn memfs_refuses_oversized_files() {
    let fs = MemFs::new().with_max_file_size(8);
    let id = fs.add_file("/f", b"1234").await.expect("add file");

    let res = fs.write(id, 1 << 62, b"x", stable_how4::UNSTABLE4).await;
    assert_eq!(res, Err(nfsstat4::NFS4ERR_FBIG));
    let res = fs.write(id, 4, b"56789", stable_how4::UNSTABLE4).await;
    assert_eq!(res, Err(nfsstat4::NFS4ERR_FBIG));
    let res = fs.setattr(id, SetAttributes { size: Some(u64::MAX), ..SetAttributes::default() });
    assert_eq!(res.await.map(|meta| meta.size), Err(nfsstat4::NFS4ERR_FBIG));

    let res = fs.write(id, 4, b"5678", stable_how4::UNSTABLE4).await;
    assert_eq!(res, Ok((4, stable_how4::FILE_SYNC4)));
    assert_eq!(fs.getattr(id).await.map(|meta| meta.size), Ok(8));
    assert_eq!(fs.fsinfo().await.map(|info| info.maxfilesize), Ok(8));
}

#[tokio::test]
async fn verify_guards_following_operations() {
    let context = test_context().await;
    let client = client(&context);
    let size = HELLO.len() as u64;

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::verify(size_attr(size)), ops::getfh()],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    assert_eq!(res.results.len(), 4);

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::verify(size_attr(size + 1)), ops::getfh()],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOT_SAME);
    assert_eq!(res.results.len(), 3);

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::nverify(size_attr(size))],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_SAME);

    let res = run(
        &client,
        vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::nverify(size_attr(0))],
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn secinfo_consumes_current_filehandle() {
    let context = test_context().await;
    let client = client(&context);
    let res = run(&client, vec![ops::putrootfh(), ops::secinfo("hello.txt"), ops::getfh()]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOFILEHANDLE);
    assert_eq!(
        res.get(1),
        Some(&nfs_resop4::OP_SECINFO(NfsResult::Ok(SECINFO4resok(vec![
            secinfo4::AUTH_SYS,
            secinfo4::AUTH_NONE
        ]))))
    );

    let res = run(&client, vec![ops::putrootfh(), ops::secinfo("missing")]).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOENT);
}
