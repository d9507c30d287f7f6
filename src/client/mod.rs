//! NFSv4 client: builds COMPOUND requests, sends them over a [`Transport`]
//! and decodes the replies.
//!
//! The executor never retries and never interprets operation statuses: a
//! compound that stopped on an error is still a successful call whose
//! [`CompoundResult`] carries the failing status. Only transport failures
//! and RPC level problems (mismatched xid, rejected or unexecuted calls,
//! undecodable replies) are returned as errors.
//!
//! ```no_run
//! # async fn demo(client: nfs4_mamont::client::Client<nfs4_mamont::client::LocalTransport>)
//! # -> anyhow::Result<()> {
//! use nfs4_mamont::client::ops;
//!
//! let res = client.compound(vec![ops::putrootfh(), ops::lookup("etc"), ops::getfh()]).await?;
//! res.check()?;
//! # Ok(())
//! # }
//! ```

use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{anyhow, bail, Context as _};
use tracing::{debug, trace};

use crate::protocol::xdr::nfs4::{
    nfs_argop4, nfs_resop4, nfsstat4, OpStatus, COMPOUND4args, COMPOUND4res, MINOR_VERSION,
    NFSPROC4_COMPOUND, NFSPROC4_NULL,
};
use crate::protocol::xdr::rpc::{
    accept_body, auth_unix, call_message, opaque_auth, reply_body, rpc_body, rpc_msg,
};
use crate::protocol::xdr::{deserialize, nfs4, Serialize};

pub mod ops;
mod transport;

pub use transport::{LocalTransport, Transport};

/// Outcome of one COMPOUND call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundResult {
    /// Status of the last operation executed
    pub status: nfsstat4,
    pub tag: String,
    /// Results of the executed operations, in request order
    pub results: Vec<nfs_resop4>,
}

impl CompoundResult {
    pub fn is_ok(&self) -> bool {
        self.status == nfsstat4::NFS4_OK
    }

    /// Turns a compound that did not run to completion into an error naming
    /// the failing operation and its status.
    pub fn check(self) -> anyhow::Result<CompoundResult> {
        if self.is_ok() {
            return Ok(self);
        }
        match self.results.last() {
            Some(res) => Err(anyhow!(
                "operation {} ({:?}) failed with {:?}",
                self.results.len() - 1,
                res.opnum(),
                self.status
            )),
            None => Err(anyhow!("compound failed with {:?}", self.status)),
        }
    }

    pub fn get(&self, index: usize) -> Option<&nfs_resop4> {
        self.results.get(index)
    }

    pub fn last(&self) -> Option<&nfs_resop4> {
        self.results.last()
    }
}

/// Sends NFSv4 calls through a transport `T`.
pub struct Client<T> {
    transport: T,
    xid: AtomicU32,
    credentials: opaque_auth,
    tag: String,
}

impl<T: Transport> Client<T> {
    /// A client calling with AUTH_NONE credentials and an empty tag.
    pub fn new(transport: T) -> Client<T> {
        Client {
            transport,
            xid: AtomicU32::new(1),
            credentials: opaque_auth::default(),
            tag: String::new(),
        }
    }

    /// Calls with AUTH_UNIX credentials from now on.
    pub fn with_credentials(mut self, auth: &auth_unix) -> anyhow::Result<Client<T>> {
        self.credentials = auth.to_opaque_auth()?;
        Ok(self)
    }

    /// Tag sent with every COMPOUND, echoed back by the server.
    pub fn with_tag(mut self, tag: &str) -> Client<T> {
        self.tag = tag.to_string();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls the NULL procedure.
    pub async fn null(&self) -> anyhow::Result<()> {
        self.call(NFSPROC4_NULL, &()).await?;
        Ok(())
    }

    /// Sends `ops` as one COMPOUND and decodes the results.
    pub async fn compound(&self, ops: Vec<nfs_argop4>) -> anyhow::Result<CompoundResult> {
        let sent = ops.len();
        let args = COMPOUND4args { tag: self.tag.clone(), minorversion: MINOR_VERSION, argarray: ops };
        let mut reply = self.call(NFSPROC4_COMPOUND, &args).await?;
        let res = deserialize::<COMPOUND4res>(&mut reply).context("undecodable COMPOUND reply")?;
        if res.resarray.len() > sent {
            bail!("{} results for {} operations", res.resarray.len(), sent);
        }
        if let Some(last) = res.resarray.last() {
            if last.status() != res.status {
                bail!("compound status {:?} differs from last result {:?}", res.status, last.status());
            }
        }
        debug!("compound of {} ops: {} results, {:?}", sent, res.resarray.len(), res.status);
        Ok(CompoundResult { status: res.status, tag: res.tag, results: res.resarray })
    }

    fn next_xid(&self) -> u32 {
        self.xid.fetch_add(1, Ordering::Relaxed)
    }

    /// Performs one call and returns the reader positioned at the procedure
    /// results.
    async fn call(&self, proc: u32, args: &impl Serialize) -> anyhow::Result<Cursor<Vec<u8>>> {
        let xid = self.next_xid();
        let mut request = Vec::new();
        call_message(xid, nfs4::PROGRAM, nfs4::VERSION, proc, self.credentials.clone())
            .serialize(&mut request)?;
        args.serialize(&mut request)?;
        trace!("call {} procedure {}: {} bytes", xid, proc, request.len());

        let mut reply = Cursor::new(self.transport.call(request).await?);
        let msg = deserialize::<rpc_msg>(&mut reply).context("undecodable RPC reply")?;
        if msg.xid != xid {
            bail!("reply xid {} does not match call xid {}", msg.xid, xid);
        }
        match msg.body {
            rpc_body::REPLY(reply_body::MSG_ACCEPTED(accepted)) => match accepted.reply_data {
                accept_body::SUCCESS => Ok(reply),
                other => Err(anyhow!("call {} accepted but not executed: {:?}", xid, other)),
            },
            rpc_body::REPLY(reply_body::MSG_DENIED(rejected)) => {
                Err(anyhow!("call {} rejected: {:?}", xid, rejected))
            }
            rpc_body::CALL(_) => Err(anyhow!("received a call instead of the reply to {}", xid)),
        }
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Client").field("tag", &self.tag).finish()
    }
}

