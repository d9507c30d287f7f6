mod support;

use nfs4_mamont::client::{ops, Client, LocalTransport};
use nfs4_mamont::xdr::nfs4::client::{
    cb_client4, clientaddr4, nfs_client_id4, SETCLIENTID4res, SETCLIENTID4resok,
};
use nfs4_mamont::xdr::nfs4::{nfs_resop4, nfsstat4, verifier4};
use nfs4_mamont::xdr::rpc::auth_unix;

use support::{client, test_context};

fn callback(addr: &str) -> cb_client4 {
    cb_client4 {
        cb_program: 0x40000000,
        cb_location: clientaddr4 { r_netid: "tcp".to_string(), r_addr: addr.to_string() },
    }
}

async fn setclientid(
    client: &Client<LocalTransport>,
    id: &[u8],
    verifier: verifier4,
    addr: &str,
) -> SETCLIENTID4res {
    let res = client
        .compound(vec![ops::setclientid(
            nfs_client_id4 { verifier, id: id.to_vec() },
            callback(addr),
            1,
        )])
        .await
        .expect("compound");
    match res.get(0) {
        Some(nfs_resop4::OP_SETCLIENTID(res)) => res.clone(),
        other => panic!("expected SETCLIENTID result, got {other:?}"),
    }
}

fn issued(res: SETCLIENTID4res) -> SETCLIENTID4resok {
    match res {
        SETCLIENTID4res::Ok(ok) => ok,
        other => panic!("expected client id, got {other:?}"),
    }
}

async fn confirm(client: &Client<LocalTransport>, ok: &SETCLIENTID4resok) -> nfsstat4 {
    client
        .compound(vec![ops::setclientid_confirm(ok.clientid, ok.setclientid_confirm)])
        .await
        .expect("compound")
        .status
}

async fn renew(client: &Client<LocalTransport>, clientid: u64) -> nfsstat4 {
    client.compound(vec![ops::renew(clientid)]).await.expect("compound").status
}

#[tokio::test]
async fn client_id_lifecycle() {
    let context = test_context().await;
    let client = client(&context);

    let ok = issued(setclientid(&client, b"linux-client", [1; 8], "10.0.0.1.8.1").await);
    assert_eq!(renew(&client, ok.clientid).await, nfsstat4::NFS4ERR_STALE_CLIENTID);
    let record = context.state.clients().get(ok.clientid).await.expect("record");
    assert!(!record.confirmed);
    assert_eq!(record.id, b"linux-client");

    assert_eq!(confirm(&client, &ok).await, nfsstat4::NFS4_OK);
    assert_eq!(renew(&client, ok.clientid).await, nfsstat4::NFS4_OK);
    assert!(context.state.clients().get(ok.clientid).await.expect("record").confirmed);

    // confirming twice is harmless
    assert_eq!(confirm(&client, &ok).await, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn confirm_needs_matching_verifier() {
    let context = test_context().await;
    let client = client(&context);
    let ok = issued(setclientid(&client, b"linux-client", [1; 8], "10.0.0.1.8.1").await);

    let wrong = SETCLIENTID4resok { setclientid_confirm: [0xaa; 8], ..ok.clone() };
    assert_eq!(confirm(&client, &wrong).await, nfsstat4::NFS4ERR_STALE_CLIENTID);
    let unknown = SETCLIENTID4resok { clientid: ok.clientid + 1000, ..ok.clone() };
    assert_eq!(confirm(&client, &unknown).await, nfsstat4::NFS4ERR_STALE_CLIENTID);
    assert_eq!(renew(&client, 0xdead).await, nfsstat4::NFS4ERR_STALE_CLIENTID);

    assert_eq!(confirm(&client, &ok).await, nfsstat4::NFS4_OK);
}

#[tokio::test]
async fn same_verifier_keeps_client_id() {
    let context = test_context().await;
    let client = client(&context);
    let first = issued(setclientid(&client, b"linux-client", [1; 8], "10.0.0.1.8.1").await);
    assert_eq!(confirm(&client, &first).await, nfsstat4::NFS4_OK);

    let again = issued(setclientid(&client, b"linux-client", [1; 8], "10.0.0.1.8.2").await);
    assert_eq!(again.clientid, first.clientid);
    assert_ne!(again.setclientid_confirm, first.setclientid_confirm);
    assert_eq!(confirm(&client, &again).await, nfsstat4::NFS4_OK);
    let record = context.state.clients().get(first.clientid).await.expect("record");
    assert_eq!(record.callback.cb_location.r_addr, "10.0.0.1.8.2");
}

#[tokio::test]
async fn rebooted_client_gets_new_id() {
    let context = test_context().await;
    let client = client(&context);
    let before = issued(setclientid(&client, b"linux-client", [1; 8], "10.0.0.1.8.1").await);
    assert_eq!(confirm(&client, &before).await, nfsstat4::NFS4_OK);

    let after = issued(setclientid(&client, b"linux-client", [2; 8], "10.0.0.1.8.1").await);
    assert_ne!(after.clientid, before.clientid);
    // the old id stays valid until the new one is confirmed
    assert_eq!(renew(&client, before.clientid).await, nfsstat4::NFS4_OK);

    assert_eq!(confirm(&client, &after).await, nfsstat4::NFS4_OK);
    assert_eq!(renew(&client, after.clientid).await, nfsstat4::NFS4_OK);
    assert_eq!(renew(&client, before.clientid).await, nfsstat4::NFS4ERR_STALE_CLIENTID);
    assert!(context.state.clients().get(before.clientid).await.is_none());
}

#[tokio::test]
async fn identity_of_another_principal_is_in_use() {
    let context = test_context().await;
    let root = client(&context);
    let ok = issued(setclientid(&root, b"shared-id", [1; 8], "10.0.0.1.8.1").await);
    assert_eq!(confirm(&root, &ok).await, nfsstat4::NFS4_OK);

    let other = client(&context)
        .with_credentials(&auth_unix {
            uid: 1000,
            gid: 1000,
            machinename: b"elsewhere".to_vec(),
            ..Default::default()
        })
        .expect("credentials");
    let res = setclientid(&other, b"shared-id", [1; 8], "10.0.0.2.8.1").await;
    assert_eq!(
        res,
        SETCLIENTID4res::ClidInUse(clientaddr4 {
            r_netid: "tcp".to_string(),
            r_addr: "10.0.0.1.8.1".to_string(),
        })
    );

    // an unconfirmed id is not protected
    let pending = issued(setclientid(&other, b"pending-id", [3; 8], "10.0.0.2.8.1").await);
    let taken = issued(setclientid(&root, b"pending-id", [4; 8], "10.0.0.1.8.1").await);
    assert_ne!(taken.clientid, pending.clientid);
    assert_eq!(confirm(&other, &pending).await, nfsstat4::NFS4ERR_STALE_CLIENTID);
    assert_eq!(confirm(&root, &taken).await, nfsstat4::NFS4_OK);
}
