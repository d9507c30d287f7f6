mod support;

use futures::future::join_all;

use nfs4_mamont::client::{ops, Client, CompoundResult, LocalTransport};
use nfs4_mamont::state::StateStats;
use nfs4_mamont::xdr::nfs4::attr::{FileAttributes, FATTR4_SIZE};
use nfs4_mamont::xdr::nfs4::file::stable_how4;
use nfs4_mamont::xdr::nfs4::open::{open_claim4, open_delegation4, open_delegation_type4, openflag4};
use nfs4_mamont::xdr::nfs4::{
    bitmap4, nfs_resop4, nfsstat4, open_owner4, seqid4, stateid4, NfsResult,
    OPEN4_RESULT_CONFIRM, OPEN4_RESULT_LOCKTYPE_POSIX, OPEN4_SHARE_ACCESS_BOTH,
    OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_ACCESS_WRITE, OPEN4_SHARE_DENY_BOTH,
    OPEN4_SHARE_DENY_NONE, OPEN4_SHARE_DENY_READ, OPEN4_SHARE_DENY_WRITE,
};

use support::{
    client, open_at, open_existing, owner, test_context, test_context_limited, Opened, HELLO,
};

async fn open_with(
    client: &Client<LocalTransport>,
    owner: &open_owner4,
    seqid: seqid4,
    openhow: openflag4,
    claim: open_claim4,
    access: u32,
    deny: u32,
) -> CompoundResult {
    client
        .compound(vec![ops::putrootfh(), ops::open(seqid, access, deny, owner.clone(), openhow, claim)])
        .await
        .expect("compound")
}

async fn open_status(
    client: &Client<LocalTransport>,
    owner: &open_owner4,
    seqid: seqid4,
    name: &str,
    access: u32,
    deny: u32,
) -> nfsstat4 {
    open_with(client, owner, seqid, ops::no_create(), ops::claim_null(name), access, deny)
        .await
        .status
}

async fn close(client: &Client<LocalTransport>, opened: &Opened, seqid: seqid4) -> CompoundResult {
    client
        .compound(vec![ops::putfh(opened.fh.clone()), ops::close(seqid, opened.stateid)])
        .await
        .expect("compound")
}

async fn read_with(client: &Client<LocalTransport>, opened: &Opened, stateid: stateid4) -> nfsstat4 {
    client
        .compound(vec![ops::putfh(opened.fh.clone()), ops::read(stateid, 0, 100)])
        .await
        .expect("compound")
        .status
}

async fn write_with(client: &Client<LocalTransport>, opened: &Opened, stateid: stateid4) -> nfsstat4 {
    client
        .compound(vec![
            ops::putfh(opened.fh.clone()),
            ops::write(stateid, 0, stable_how4::FILE_SYNC4, b"HELLO".to_vec()),
        ])
        .await
        .expect("compound")
        .status
}

#[tokio::test]
async fn first_open_needs_confirmation() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");

    let res = open_with(
        &client,
        &alice,
        1,
        ops::no_create(),
        ops::claim_null("hello.txt"),
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await
    .check()
    .expect("open");
    let ok = open_at(&res, 1);
    assert_eq!(ok.rflags, OPEN4_RESULT_LOCKTYPE_POSIX | OPEN4_RESULT_CONFIRM);
    assert_eq!(ok.delegation, open_delegation4::OPEN_DELEGATE_NONE);
    assert!(!ok.stateid.is_special());

    let res = client
        .compound(vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::getfh()])
        .await
        .expect("compound")
        .check()
        .expect("lookup");
    let unconfirmed = Opened { fh: support::fh_at(&res, 2), stateid: ok.stateid, seqid: 2 };
    assert_eq!(read_with(&client, &unconfirmed, ok.stateid).await, nfsstat4::NFS4ERR_BAD_STATEID);

    let res = client
        .compound(vec![ops::putfh(unconfirmed.fh.clone()), ops::open_confirm(ok.stateid, 2)])
        .await
        .expect("compound")
        .check()
        .expect("open_confirm");
    let confirmed = match res.get(1) {
        Some(nfs_resop4::OP_OPEN_CONFIRM(NfsResult::Ok(ok))) => ok.open_stateid,
        other => panic!("expected OPEN_CONFIRM result, got {other:?}"),
    };
    assert_eq!(confirmed.other, ok.stateid.other);
    assert_eq!(confirmed.seqid, ok.stateid.seqid + 1);
    assert_eq!(read_with(&client, &unconfirmed, confirmed).await, nfsstat4::NFS4_OK);

    // a confirmed owner is not asked again
    let res = open_with(
        &client,
        &alice,
        3,
        ops::no_create(),
        ops::claim_null("dir/a"),
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_BADCHAR);
    let res = client
        .compound(vec![
            ops::putrootfh(),
            ops::lookup("dir"),
            ops::open(
                3,
                OPEN4_SHARE_ACCESS_READ,
                OPEN4_SHARE_DENY_NONE,
                alice.clone(),
                ops::no_create(),
                ops::claim_null("a"),
            ),
        ])
        .await
        .expect("compound")
        .check()
        .expect("second open");
    assert_eq!(open_at(&res, 2).rflags, OPEN4_RESULT_LOCKTYPE_POSIX);
}

#[tokio::test]
async fn seqid_must_advance_by_one() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let opened = open_existing(
        &client,
        &alice,
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(opened.seqid, 3);

    for seqid in [1, 2, 4, 100] {
        let status = open_status(
            &client,
            &alice,
            seqid,
            "hello.txt",
            OPEN4_SHARE_ACCESS_READ,
            OPEN4_SHARE_DENY_NONE,
        )
        .await;
        assert_eq!(status, nfsstat4::NFS4ERR_BAD_SEQID, "seqid {seqid}");
    }

    // a failed request leaves the sequence where it was
    let status =
        open_status(&client, &alice, 3, "missing", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4ERR_NOENT);
    let status =
        open_status(&client, &alice, 3, "hello.txt", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn seqid_wraps_past_zero_and_restarts_at_zero() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let opened = open_existing(
        &client,
        &alice,
        u32::MAX,
        "hello.txt",
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    // the confirmation after 0xffffffff carried 1
    assert_eq!(opened.seqid, 2);

    // zero is always taken and the sequence continues from 1
    close(&client, &opened, 0).await.check().expect("close with seqid 0");
    let status =
        open_status(&client, &alice, 1, "hello.txt", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4ERR_BAD_SEQID);
    let status =
        open_status(&client, &alice, 2, "hello.txt", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn deny_modes_conflict_until_close() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let bob = owner("bob");

    let opened = open_existing(
        &client,
        &alice,
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_READ,
    )
    .await;
    let status =
        open_status(&client, &bob, 1, "hello.txt", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4ERR_SHARE_DENIED);
    // bob denying what alice uses conflicts as well
    let status = open_status(
        &client,
        &bob,
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_WRITE,
        OPEN4_SHARE_DENY_READ,
    )
    .await;
    assert_eq!(status, nfsstat4::NFS4ERR_SHARE_DENIED);
    // anonymous reads are locked out
    assert_eq!(read_with(&client, &opened, stateid4::ANONYMOUS).await, nfsstat4::NFS4ERR_LOCKED);

    close(&client, &opened, opened.seqid).await.check().expect("close");
    let status =
        open_status(&client, &bob, 1, "hello.txt", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4_OK);
    assert_eq!(read_with(&client, &opened, stateid4::ANONYMOUS).await, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn close_is_idempotent() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let opened = open_existing(
        &client,
        &alice,
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;

    let res = close(&client, &opened, opened.seqid).await.check().expect("close");
    let closed = match res.get(1) {
        Some(nfs_resop4::OP_CLOSE(NfsResult::Ok(stateid))) => *stateid,
        other => panic!("expected CLOSE result, got {other:?}"),
    };
    assert_eq!(closed.other, opened.stateid.other);
    assert_eq!(context.state.open_count(&opened.fh).await, 0);

    close(&client, &opened, opened.seqid + 1).await.check().expect("second close");
    assert_eq!(read_with(&client, &opened, opened.stateid).await, nfsstat4::NFS4ERR_BAD_STATEID);

    let never_issued = Opened { stateid: stateid4 { seqid: 1, other: [9; 12] }, ..opened.clone() };
    let res = close(&client, &never_issued, opened.seqid + 2).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_BAD_STATEID);
}

#[tokio::test]
async fn open_rejects_non_regular_files_and_other_claims() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");

    let status =
        open_status(&client, &alice, 1, "dir", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4ERR_ISDIR);

    let res = client
        .compound(vec![
            ops::putrootfh(),
            ops::create(
                nfs4_mamont::xdr::nfs4::dir::createtype4::NF4LNK("hello.txt".to_string()),
                "ln",
                Default::default(),
            ),
            ops::putrootfh(),
            ops::open(
                1,
                OPEN4_SHARE_ACCESS_READ,
                OPEN4_SHARE_DENY_NONE,
                alice.clone(),
                ops::no_create(),
                ops::claim_null("ln"),
            ),
        ])
        .await
        .expect("compound");
    assert_eq!(res.status, nfsstat4::NFS4ERR_SYMLINK);

    let res = open_with(
        &client,
        &alice,
        1,
        ops::no_create(),
        open_claim4::CLAIM_PREVIOUS(open_delegation_type4::OPEN_DELEGATE_NONE),
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOTSUPP);

    for (access, deny) in [(0, OPEN4_SHARE_DENY_NONE), (4, OPEN4_SHARE_DENY_NONE), (OPEN4_SHARE_ACCESS_READ, 4)] {
        let status = open_status(&client, &alice, 1, "hello.txt", access, deny).await;
        assert_eq!(status, nfsstat4::NFS4ERR_INVAL, "access {access} deny {deny}");
    }

    let res = client
        .compound(vec![
            ops::putrootfh(),
            ops::lookup("hello.txt"),
            ops::open(
                1,
                OPEN4_SHARE_ACCESS_READ,
                OPEN4_SHARE_DENY_NONE,
                alice.clone(),
                ops::no_create(),
                ops::claim_null("x"),
            ),
        ])
        .await
        .expect("compound");
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOTDIR);
}

#[tokio::test]
async fn open_create_modes() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let zero = FileAttributes { size: Some(0), ..FileAttributes::default() }
        .to_fattr()
        .expect("encode");

    let res = open_with(
        &client,
        &alice,
        1,
        ops::create_guarded(zero.clone()),
        ops::claim_null("new.txt"),
        OPEN4_SHARE_ACCESS_BOTH,
        OPEN4_SHARE_DENY_NONE,
    )
    .await
    .check()
    .expect("guarded create");
    let ok = open_at(&res, 1);
    assert!(ok.cinfo.after > ok.cinfo.before);
    assert_eq!(ok.attrset, bitmap4::from_attrs(&[FATTR4_SIZE]));

    let res = open_with(
        &client,
        &alice,
        2,
        ops::create_guarded(zero.clone()),
        ops::claim_null("new.txt"),
        OPEN4_SHARE_ACCESS_BOTH,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_EXIST);

    let status =
        open_status(&client, &alice, 2, "absent", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4ERR_NOENT);

    for seqid in [2, 3] {
        open_with(
            &client,
            &alice,
            seqid,
            ops::create_exclusive(*b"verifier"),
            ops::claim_null("excl.txt"),
            OPEN4_SHARE_ACCESS_READ,
            OPEN4_SHARE_DENY_NONE,
        )
        .await
        .check()
        .expect("exclusive create is repeatable");
    }
    let res = open_with(
        &client,
        &alice,
        4,
        ops::create_exclusive(*b"another!"),
        ops::claim_null("excl.txt"),
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_EXIST);

    // unchecked on an existing file only truncates
    let res = open_with(
        &client,
        &alice,
        4,
        ops::create_unchecked(zero),
        ops::claim_null("hello.txt"),
        OPEN4_SHARE_ACCESS_BOTH,
        OPEN4_SHARE_DENY_NONE,
    )
    .await
    .check()
    .expect("unchecked open");
    assert_eq!(open_at(&res, 1).attrset, bitmap4::from_attrs(&[FATTR4_SIZE]));
    let res = client
        .compound(vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::read(stateid4::ANONYMOUS, 0, 100)])
        .await
        .expect("compound")
        .check()
        .expect("read");
    match res.get(2) {
        Some(nfs_resop4::OP_READ(NfsResult::Ok(ok))) => assert!(ok.data.is_empty()),
        other => panic!("expected READ result, got {other:?}"),
    }
}

#[tokio::test]
async fn denied_open_does_not_truncate() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let bob = owner("bob");
    open_existing(&client, &alice, 1, "hello.txt", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_WRITE)
        .await;

    let zero = FileAttributes { size: Some(0), ..FileAttributes::default() }
        .to_fattr()
        .expect("encode");
    let res = open_with(
        &client,
        &bob,
        1,
        ops::create_unchecked(zero),
        ops::claim_null("hello.txt"),
        OPEN4_SHARE_ACCESS_WRITE,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_SHARE_DENIED);

    let res = client
        .compound(vec![ops::putrootfh(), ops::lookup("hello.txt"), ops::read(stateid4::ANONYMOUS, 0, 100)])
        .await
        .expect("compound")
        .check()
        .expect("read");
    match res.get(2) {
        Some(nfs_resop4::OP_READ(NfsResult::Ok(ok))) => assert_eq!(ok.data, HELLO),
        other => panic!("expected READ result, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_truncation_leaves_no_open() {
    let context = test_context_limited(16).await;
    let client = client(&context);
    let alice = owner("alice");
    let huge = FileAttributes { size: Some(17), ..FileAttributes::default() }
        .to_fattr()
        .expect("encode");

    let res = open_with(
        &client,
        &alice,
        1,
        ops::create_unchecked(huge.clone()),
        ops::claim_null("hello.txt"),
        OPEN4_SHARE_ACCESS_WRITE,
        OPEN4_SHARE_DENY_BOTH,
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_FBIG);
    let res = open_with(
        &client,
        &alice,
        1,
        ops::create_guarded(huge),
        ops::claim_null("big"),
        OPEN4_SHARE_ACCESS_WRITE,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_FBIG);
    let res = client
        .compound(vec![ops::putrootfh(), ops::lookup("big")])
        .await
        .expect("compound");
    assert_eq!(res.status, nfsstat4::NFS4ERR_NOENT);
    assert_eq!(context.state.stats().await, StateStats::default());

    // nothing was reserved and the owner's sequence did not move
    let bob = open_existing(
        &client,
        &owner("bob"),
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(context.state.open_count(&bob.fh).await, 1);
    let opened = open_existing(
        &client,
        &alice,
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_WRITE,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(opened.seqid, 3);
    assert_eq!(context.state.open_count(&opened.fh).await, 2);
}

#[tokio::test]
async fn finished_opens_do_not_accumulate_state() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");

    let mut seqid = 1;
    for _ in 0..8 {
        let opened = open_existing(
            &client,
            &alice,
            seqid,
            "hello.txt",
            OPEN4_SHARE_ACCESS_BOTH,
            OPEN4_SHARE_DENY_NONE,
        )
        .await;
        close(&client, &opened, opened.seqid).await.check().expect("close");
        seqid = opened.seqid + 1;
    }
    // only the last closed stateid is remembered
    assert_eq!(
        context.state.stats().await,
        StateStats { open_owners: 1, lock_owners: 0, files: 0, stateids: 1 }
    );

    // owners whose first OPEN fails are not kept
    for (i, name) in ["missing", "dir", "hello.txt"].into_iter().enumerate() {
        let stranger = owner(&format!("stranger-{i}"));
        let status =
            open_status(&client, &stranger, 1, name, OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
                .await;
        if name == "hello.txt" {
            assert_eq!(status, nfsstat4::NFS4_OK);
        } else {
            assert_ne!(status, nfsstat4::NFS4_OK, "open of {name}");
        }
    }
    assert_eq!(
        context.state.stats().await,
        StateStats { open_owners: 2, lock_owners: 0, files: 1, stateids: 2 }
    );

    let held = open_existing(
        &client,
        &owner("holder"),
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_WRITE,
    )
    .await;
    let status = open_status(
        &client,
        &owner("writer"),
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_WRITE,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(status, nfsstat4::NFS4ERR_SHARE_DENIED);
    let stats = context.state.stats().await;
    assert_eq!(stats.open_owners, 3);
    assert_eq!(context.state.open_count(&held.fh).await, 2);
}

#[tokio::test]
async fn reopen_by_same_owner_upgrades_stateid() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let opened = open_existing(
        &client,
        &alice,
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_READ,
        OPEN4_SHARE_DENY_NONE,
    )
    .await;
    assert_eq!(write_with(&client, &opened, opened.stateid).await, nfsstat4::NFS4ERR_OPENMODE);

    let res = open_with(
        &client,
        &alice,
        opened.seqid,
        ops::no_create(),
        ops::claim_null("hello.txt"),
        OPEN4_SHARE_ACCESS_WRITE,
        OPEN4_SHARE_DENY_NONE,
    )
    .await
    .check()
    .expect("upgrade");
    let upgraded = open_at(&res, 1).stateid;
    assert_eq!(upgraded.other, opened.stateid.other);
    assert_eq!(upgraded.seqid, opened.stateid.seqid + 1);
    assert_eq!(context.state.open_count(&opened.fh).await, 1);

    assert_eq!(write_with(&client, &opened, upgraded).await, nfsstat4::NFS4_OK);
    assert_eq!(read_with(&client, &opened, opened.stateid).await, nfsstat4::NFS4ERR_OLD_STATEID);
    let future = stateid4 { seqid: upgraded.seqid + 1, ..upgraded };
    assert_eq!(read_with(&client, &opened, future).await, nfsstat4::NFS4ERR_BAD_STATEID);
}

#[tokio::test]
async fn downgrade_only_narrows() {
    let context = test_context().await;
    let client = client(&context);
    let alice = owner("alice");
    let bob = owner("bob");
    let opened = open_existing(
        &client,
        &alice,
        1,
        "hello.txt",
        OPEN4_SHARE_ACCESS_BOTH,
        OPEN4_SHARE_DENY_WRITE,
    )
    .await;
    let status =
        open_status(&client, &bob, 1, "hello.txt", OPEN4_SHARE_ACCESS_WRITE, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4ERR_SHARE_DENIED);

    let res = client
        .compound(vec![
            ops::putfh(opened.fh.clone()),
            ops::open_downgrade(
                opened.stateid,
                opened.seqid,
                OPEN4_SHARE_ACCESS_READ,
                OPEN4_SHARE_DENY_NONE,
            ),
        ])
        .await
        .expect("compound")
        .check()
        .expect("downgrade");
    let downgraded = match res.get(1) {
        Some(nfs_resop4::OP_OPEN_DOWNGRADE(NfsResult::Ok(ok))) => ok.open_stateid,
        other => panic!("expected OPEN_DOWNGRADE result, got {other:?}"),
    };
    assert_eq!(downgraded.other, opened.stateid.other);

    let res = client
        .compound(vec![
            ops::putfh(opened.fh.clone()),
            ops::open_downgrade(
                downgraded,
                opened.seqid + 1,
                OPEN4_SHARE_ACCESS_BOTH,
                OPEN4_SHARE_DENY_NONE,
            ),
        ])
        .await
        .expect("compound");
    assert_eq!(res.status, nfsstat4::NFS4ERR_INVAL);

    assert_eq!(write_with(&client, &opened, downgraded).await, nfsstat4::NFS4ERR_OPENMODE);
    let status =
        open_status(&client, &bob, 1, "hello.txt", OPEN4_SHARE_ACCESS_WRITE, OPEN4_SHARE_DENY_NONE)
            .await;
    assert_eq!(status, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn concurrent_owners_share_a_file() {
    let context = test_context().await;
    let client = client(&context);
    let owners: Vec<_> = (0..8).map(|i| owner(&format!("reader-{i}"))).collect();

    let results = join_all(owners.iter().map(|owner| {
        open_existing(&client, owner, 1, "hello.txt", OPEN4_SHARE_ACCESS_READ, OPEN4_SHARE_DENY_NONE)
    }))
    .await;
    let mut others: Vec<_> = results.iter().map(|opened| opened.stateid.other).collect();
    others.sort();
    others.dedup();
    assert_eq!(others.len(), 8);
    assert_eq!(context.state.open_count(&results[0].fh).await, 8);
}

#[tokio::test]
async fn concurrent_exclusive_opens_admit_one() {
    let context = test_context().await;
    let client = client(&context);
    let owners: Vec<_> = (0..8).map(|i| owner(&format!("writer-{i}"))).collect();

    let statuses = join_all(owners.iter().map(|owner| {
        open_status(&client, owner, 1, "hello.txt", OPEN4_SHARE_ACCESS_BOTH, OPEN4_SHARE_DENY_BOTH)
    }))
    .await;
    let granted = statuses.iter().filter(|s| **s == nfsstat4::NFS4_OK).count();
    let denied = statuses.iter().filter(|s| **s == nfsstat4::NFS4ERR_SHARE_DENIED).count();
    assert_eq!((granted, denied), (1, 7));
}
