//! Client id table backing SETCLIENTID, SETCLIENTID_CONFIRM and RENEW.
//!
//! A client presents a long-lived identity string plus a verifier that
//! changes whenever the client reboots. The server answers with a short
//! client id and a confirmation verifier; the id becomes usable once the
//! client echoes both back with SETCLIENTID_CONFIRM.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::debug;

use crate::protocol::xdr::nfs4::client::{
    cb_client4, SETCLIENTID4args, SETCLIENTID4res, SETCLIENTID4resok,
};
use crate::protocol::xdr::nfs4::{clientid4, nfsstat4, verifier4};

#[derive(Clone, Debug)]
pub struct ClientRecord {
    pub clientid: clientid4,
    /// Identity string from `nfs_client_id4`
    pub id: Vec<u8>,
    /// Client boot verifier
    pub verifier: verifier4,
    /// Verifier the client must echo in SETCLIENTID_CONFIRM
    pub confirm: verifier4,
    pub confirmed: bool,
    /// Who established the id, as `uid@machine` from AUTH_UNIX
    pub principal: String,
    pub callback: cb_client4,
    pub last_renewed: Instant,
}

#[derive(Debug, Default)]
struct Records {
    by_clientid: HashMap<clientid4, ClientRecord>,
    next: u32,
}

impl Records {
    fn next_counter(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1);
        self.next
    }
}

#[derive(Debug)]
pub struct ClientTable {
    boot: u32,
    records: Mutex<Records>,
}

impl ClientTable {
    pub fn new(boot: u32) -> ClientTable {
        ClientTable { boot, records: Mutex::new(Records::default()) }
    }

    /// Handles SETCLIENTID.
    ///
    /// A confirmed identity established by another principal yields
    /// NFS4ERR_CLID_INUSE. The same client with the same boot verifier keeps
    /// its client id and gets a fresh confirmation verifier; a new identity or
    /// a rebooted client gets a new, unconfirmed client id.
    pub async fn setclientid(&self, args: &SETCLIENTID4args, principal: &str) -> SETCLIENTID4res {
        let mut records = self.records.lock().await;
        let confirmed = records
            .by_clientid
            .values()
            .find(|r| r.confirmed && r.id == args.client.id)
            .map(|r| (r.clientid, r.verifier, r.principal.clone(), r.callback.clone()));

        if let Some((_, _, owner, callback)) = &confirmed {
            if owner != principal {
                debug!("setclientid: id in use by {}", owner);
                return SETCLIENTID4res::ClidInUse(callback.cb_location.clone());
            }
        }
        records.by_clientid.retain(|_, r| r.confirmed || r.id != args.client.id);

        let counter = records.next_counter();
        let confirm = self.verifier(counter);
        let clientid = match confirmed {
            Some((clientid, verifier, _, _)) if verifier == args.client.verifier => {
                if let Some(record) = records.by_clientid.get_mut(&clientid) {
                    record.confirm = confirm;
                    record.callback = args.callback.clone();
                }
                clientid
            }
            _ => {
                let clientid = ((self.boot as u64) << 32) | counter as u64;
                records.by_clientid.insert(
                    clientid,
                    ClientRecord {
                        clientid,
                        id: args.client.id.clone(),
                        verifier: args.client.verifier,
                        confirm,
                        confirmed: false,
                        principal: principal.to_string(),
                        callback: args.callback.clone(),
                        last_renewed: Instant::now(),
                    },
                );
                clientid
            }
        };
        debug!("setclientid: issued clientid {:#x}", clientid);
        SETCLIENTID4res::Ok(SETCLIENTID4resok { clientid, setclientid_confirm: confirm })
    }

    /// Handles SETCLIENTID_CONFIRM. Confirming a rebooted client's new id
    /// retires the ids of its previous incarnation.
    pub async fn confirm(&self, clientid: clientid4, confirm: verifier4) -> Result<(), nfsstat4> {
        let mut records = self.records.lock().await;
        let record =
            records.by_clientid.get_mut(&clientid).ok_or(nfsstat4::NFS4ERR_STALE_CLIENTID)?;
        if record.confirm != confirm {
            return Err(nfsstat4::NFS4ERR_STALE_CLIENTID);
        }
        record.confirmed = true;
        record.last_renewed = Instant::now();
        let id = record.id.clone();
        records.by_clientid.retain(|other, r| *other == clientid || r.id != id);
        Ok(())
    }

    /// Handles RENEW. Leases never expire, so this only records the time.
    pub async fn renew(&self, clientid: clientid4) -> Result<(), nfsstat4> {
        let mut records = self.records.lock().await;
        match records.by_clientid.get_mut(&clientid) {
            Some(record) if record.confirmed => {
                record.last_renewed = Instant::now();
                Ok(())
            }
            _ => Err(nfsstat4::NFS4ERR_STALE_CLIENTID),
        }
    }

    pub async fn get(&self, clientid: clientid4) -> Option<ClientRecord> {
        self.records.lock().await.by_clientid.get(&clientid).cloned()
    }

    fn verifier(&self, counter: u32) -> verifier4 {
        let mut verifier = [0; 8];
        verifier[..4].copy_from_slice(&self.boot.to_be_bytes());
        verifier[4..].copy_from_slice(&counter.to_be_bytes());
        verifier
    }
}
