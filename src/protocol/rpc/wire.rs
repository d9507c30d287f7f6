//! RPC call dispatching as specified in RFC 5531.
//!
//! Record marking and sockets belong to the surrounding runtime. This module
//! starts from one complete RPC record: it decodes the call header, checks the
//! RPC version and credentials, routes the call to the NFSv4 program and
//! writes exactly one reply record.

use std::io::{Cursor, Read, Write};

use anyhow::anyhow;
use tracing::{error, trace, warn};

use crate::protocol::xdr::{self, deserialize, nfs4, Serialize};
use crate::protocol::{nfs, rpc};

// Information from RFC 5531 (ONC RPC v2)
// https://datatracker.ietf.org/doc/html/rfc5531

/// RPC program number for NFS Access Control Lists
const NFS_ACL_PROGRAM: u32 = 100227;
/// RPC program number for NFS ID Mapping
const NFS_ID_MAP_PROGRAM: u32 = 100270;
/// Initial size of RPC response buffer
const DEFAULT_RESPONSE_BUFFER_CAPACITY: usize = 8192;

/// Processes a single RPC message
///
/// This function forms the core of the RPC message dispatcher. It:
/// 1. Deserializes the incoming RPC message using XDR format
/// 2. Validates the RPC version number (must be version 2)
/// 3. Extracts AUTH_UNIX credentials, rejecting flavors it cannot verify
/// 4. Routes the call to the NFSv4 handler
///
/// A message that is not a call, or whose header cannot be decoded, is an
/// error: no reply can be addressed to its sender.
pub async fn handle_rpc(
    input: &mut impl Read,
    output: &mut impl Write,
    mut context: rpc::Context,
) -> Result<(), anyhow::Error> {
    let recv = deserialize::<xdr::rpc::rpc_msg>(input)?;
    let xid = recv.xid;
    let xdr::rpc::rpc_body::CALL(call) = recv.body else {
        error!("Unexpectedly received a Reply instead of a Call");
        return Err(anyhow!("Bad RPC Call format"));
    };
    if call.rpcvers != xdr::rpc::RPC_VERSION {
        warn!("Invalid RPC version {} != {}", call.rpcvers, xdr::rpc::RPC_VERSION);
        xdr::rpc::rpc_vers_mismatch(xid).serialize(output)?;
        return Ok(());
    }

    match call.cred.flavor {
        xdr::rpc::auth_flavor::AUTH_UNIX => {
            match deserialize::<xdr::rpc::auth_unix>(&mut Cursor::new(&call.cred.body)) {
                Ok(auth) => context.auth = auth,
                Err(e) => {
                    warn!("Malformed AUTH_UNIX credentials: {}", e);
                    xdr::rpc::auth_error_reply_message(xid, xdr::rpc::auth_stat::AUTH_BADCRED)
                        .serialize(output)?;
                    return Ok(());
                }
            }
        }
        xdr::rpc::auth_flavor::AUTH_NONE => {}
        flavor => {
            warn!("Unsupported credential flavor {:?}", flavor);
            xdr::rpc::auth_error_reply_message(xid, xdr::rpc::auth_stat::AUTH_TOOWEAK)
                .serialize(output)?;
            return Ok(());
        }
    }

    match call.prog {
        nfs4::PROGRAM => nfs::v4::handle_nfs(xid, call, input, output, &context).await,
        NFS_ACL_PROGRAM | NFS_ID_MAP_PROGRAM => {
            trace!("ignoring NFS auxiliary program {}", call.prog);
            xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
            Ok(())
        }
        unknown_number => {
            warn!("Unknown RPC Program number {} != {}", unknown_number, nfs4::PROGRAM);
            xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
            Ok(())
        }
    }
}

/// Runs one RPC record through [`handle_rpc`] and returns the reply record.
pub async fn process_rpc(data: &[u8], context: rpc::Context) -> anyhow::Result<Vec<u8>> {
    let mut input = Cursor::new(data);
    let mut output = Cursor::new(Vec::with_capacity(DEFAULT_RESPONSE_BUFFER_CAPACITY));
    handle_rpc(&mut input, &mut output, context).await?;
    Ok(output.into_inner())
}
