//! ONC RPC version 2 message structures as defined in RFC 5531.
//!
//! NFSv4 COMPOUND requests travel inside an RPC CALL and their results inside
//! an accepted RPC REPLY. Both the server dispatcher and the client executor
//! use the types below to build and take apart that envelope.

// Keep original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::*;

/// The only RPC protocol version this crate speaks.
pub const RPC_VERSION: u32 = 2;

/// Authentication status codes indicating why authentication failed
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum auth_stat {
    /// Bad credential (seal broken)
    #[default]
    AUTH_BADCRED = 1,
    /// Client must begin new session
    AUTH_REJECTEDCRED = 2,
    /// Bad verifier (seal broken)
    AUTH_BADVERF = 3,
    /// Verifier expired or replayed
    AUTH_REJECTEDVERF = 4,
    /// Rejected for security reasons
    AUTH_TOOWEAK = 5,
}
SerializeEnum!(auth_stat);
DeserializeEnum!(auth_stat);

/// Authentication flavor (mechanism) identifiers for RPC
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum auth_flavor {
    /// No authentication
    #[default]
    AUTH_NONE = 0,
    /// UNIX-style authentication (uid/gid), `AUTH_SYS` in RFC 5531
    AUTH_UNIX = 1,
    /// Short-form authentication
    AUTH_SHORT = 2,
    /// DES authentication
    AUTH_DES = 3,
    /// RPCSEC_GSS, recognised on the wire but never accepted
    RPCSEC_GSS = 6,
}
SerializeEnum!(auth_flavor);
DeserializeEnum!(auth_flavor);

/// UNIX-style credentials (`authsys_parms`)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct auth_unix {
    /// Arbitrary id generated by the caller
    pub stamp: u32,
    /// The name of the client machine
    pub machinename: Vec<u8>,
    /// The effective user ID of the caller
    pub uid: u32,
    /// The effective group ID of the caller
    pub gid: u32,
    /// Supplementary group IDs of the caller
    pub gids: Vec<u32>,
}
DeserializeStruct!(auth_unix, stamp, machinename, uid, gid, gids);
SerializeStruct!(auth_unix, stamp, machinename, uid, gid, gids);

impl auth_unix {
    /// Wraps these credentials into an `AUTH_UNIX` [`opaque_auth`].
    pub fn to_opaque_auth(&self) -> std::io::Result<opaque_auth> {
        Ok(opaque_auth { flavor: auth_flavor::AUTH_UNIX, body: to_bytes(self)? })
    }
}

/// Credential or verifier: a flavor plus flavor-specific opaque bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct opaque_auth {
    /// The authentication mechanism being used
    pub flavor: auth_flavor,
    /// The opaque authentication data associated with that mechanism
    pub body: Vec<u8>,
}
DeserializeStruct!(opaque_auth, flavor, body);
SerializeStruct!(opaque_auth, flavor, body);

/// An RPC message: transaction id followed by a CALL or REPLY body.
///
/// The xid of a REPLY always matches the xid of the CALL that caused it;
/// the client executor relies on this to pair responses with requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct rpc_msg {
    /// Transaction identifier used to match calls and replies
    pub xid: u32,
    /// The body of the RPC message (call or reply)
    pub body: rpc_body,
}
DeserializeStruct!(rpc_msg, xid, body);
SerializeStruct!(rpc_msg, xid, body);

/// The body of an RPC message, which can be either a call or a reply
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum rpc_body {
    /// A call to a remote procedure
    CALL(call_body),
    /// A reply from a remote procedure
    REPLY(reply_body),
}

impl Default for rpc_body {
    fn default() -> rpc_body {
        rpc_body::CALL(call_body::default())
    }
}

impl Serialize for rpc_body {
    fn serialize<R: Write>(&self, dest: &mut R) -> std::io::Result<()> {
        match self {
            rpc_body::CALL(v) => {
                0_u32.serialize(dest)?;
                v.serialize(dest)
            }
            rpc_body::REPLY(v) => {
                1_u32.serialize(dest)?;
                v.serialize(dest)
            }
        }
    }
}

impl Deserialize for rpc_body {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = rpc_body::CALL(deserialize(src)?),
            1 => *self = rpc_body::REPLY(deserialize(src)?),
            msg_type => return Err(utils::invalid_discriminant("rpc_body", msg_type)),
        }
        Ok(())
    }
}

/// Header of an RPC call; procedure arguments follow it on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct call_body {
    /// RPC version, must be 2
    pub rpcvers: u32,
    /// The program to call
    pub prog: u32,
    /// The version of the program
    pub vers: u32,
    /// The procedure within the program to call
    pub proc: u32,
    /// Authentication credentials for the caller
    pub cred: opaque_auth,
    /// Authentication verifier for the caller
    pub verf: opaque_auth,
}
DeserializeStruct!(call_body, rpcvers, prog, vers, proc, cred, verf);
SerializeStruct!(call_body, rpcvers, prog, vers, proc, cred, verf);

/// The body of an RPC reply, indicating whether the call was accepted or denied
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum reply_body {
    /// The call was accepted
    MSG_ACCEPTED(accepted_reply),
    /// The call was denied
    MSG_DENIED(rejected_reply),
}

impl Default for reply_body {
    fn default() -> reply_body {
        reply_body::MSG_ACCEPTED(accepted_reply::default())
    }
}

impl Serialize for reply_body {
    fn serialize<R: Write>(&self, dest: &mut R) -> std::io::Result<()> {
        match self {
            reply_body::MSG_ACCEPTED(v) => {
                0_u32.serialize(dest)?;
                v.serialize(dest)
            }
            reply_body::MSG_DENIED(v) => {
                1_u32.serialize(dest)?;
                v.serialize(dest)
            }
        }
    }
}

impl Deserialize for reply_body {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = reply_body::MSG_ACCEPTED(deserialize(src)?),
            1 => *self = reply_body::MSG_DENIED(deserialize(src)?),
            reply_stat => return Err(utils::invalid_discriminant("reply_body", reply_stat)),
        }
        Ok(())
    }
}

/// Supported version range returned on a version mismatch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct mismatch_info {
    /// Lowest version supported
    pub low: u32,
    /// Highest version supported
    pub high: u32,
}
DeserializeStruct!(mismatch_info, low, high);
SerializeStruct!(mismatch_info, low, high);

/// Reply to an RPC call that was accepted by the server.
///
/// Acceptance only means the RPC layer understood the call, `reply_data`
/// still tells whether the program ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct accepted_reply {
    /// Authentication verifier from server
    pub verf: opaque_auth,
    /// Reply data union discriminated by accept_stat
    pub reply_data: accept_body,
}
DeserializeStruct!(accepted_reply, verf, reply_data);
SerializeStruct!(accepted_reply, verf, reply_data);

/// Outcome of an accepted call, discriminated by `accept_stat`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum accept_body {
    /// Call completed, procedure results follow
    #[default]
    SUCCESS,
    /// Program is not available on this server
    PROG_UNAVAIL,
    /// Program version mismatch, includes supported version range
    PROG_MISMATCH(mismatch_info),
    /// Requested procedure is not available
    PROC_UNAVAIL,
    /// Server could not decode the call arguments
    GARBAGE_ARGS,
    /// Memory allocation failure or similar
    SYSTEM_ERR,
}

impl Serialize for accept_body {
    fn serialize<R: Write>(&self, dest: &mut R) -> std::io::Result<()> {
        match self {
            accept_body::SUCCESS => 0_u32.serialize(dest),
            accept_body::PROG_UNAVAIL => 1_u32.serialize(dest),
            accept_body::PROG_MISMATCH(v) => {
                2_u32.serialize(dest)?;
                v.serialize(dest)
            }
            accept_body::PROC_UNAVAIL => 3_u32.serialize(dest),
            accept_body::GARBAGE_ARGS => 4_u32.serialize(dest),
            accept_body::SYSTEM_ERR => 5_u32.serialize(dest),
        }
    }
}

impl Deserialize for accept_body {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = accept_body::SUCCESS,
            1 => *self = accept_body::PROG_UNAVAIL,
            2 => *self = accept_body::PROG_MISMATCH(deserialize(src)?),
            3 => *self = accept_body::PROC_UNAVAIL,
            4 => *self = accept_body::GARBAGE_ARGS,
            5 => *self = accept_body::SYSTEM_ERR,
            accept_stat => return Err(utils::invalid_discriminant("accept_body", accept_stat)),
        }
        Ok(())
    }
}

/// Reply sent when an RPC call is rejected by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum rejected_reply {
    /// RPC version mismatch, includes supported version range
    RPC_MISMATCH(mismatch_info),
    /// Authentication failed, includes specific error code
    AUTH_ERROR(auth_stat),
}

impl Default for rejected_reply {
    fn default() -> rejected_reply {
        rejected_reply::AUTH_ERROR(auth_stat::default())
    }
}

impl Serialize for rejected_reply {
    fn serialize<R: Write>(&self, dest: &mut R) -> std::io::Result<()> {
        match self {
            rejected_reply::RPC_MISMATCH(v) => {
                0_u32.serialize(dest)?;
                v.serialize(dest)
            }
            rejected_reply::AUTH_ERROR(v) => {
                1_u32.serialize(dest)?;
                v.serialize(dest)
            }
        }
    }
}

impl Deserialize for rejected_reply {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => *self = rejected_reply::RPC_MISMATCH(deserialize(src)?),
            1 => *self = rejected_reply::AUTH_ERROR(deserialize(src)?),
            stat => return Err(utils::invalid_discriminant("rejected_reply", stat)),
        }
        Ok(())
    }
}

/// Builds a CALL message header for `prog`/`vers`/`proc`.
pub fn call_message(xid: u32, prog: u32, vers: u32, proc: u32, cred: opaque_auth) -> rpc_msg {
    let call = call_body {
        rpcvers: RPC_VERSION,
        prog,
        vers,
        proc,
        cred,
        verf: opaque_auth::default(),
    };
    rpc_msg { xid, body: rpc_body::CALL(call) }
}

fn accepted_reply_message(xid: u32, reply_data: accept_body) -> rpc_msg {
    let reply = reply_body::MSG_ACCEPTED(accepted_reply { verf: opaque_auth::default(), reply_data });
    rpc_msg { xid, body: rpc_body::REPLY(reply) }
}

/// Creates a reply message indicating that the requested procedure is not available
pub fn proc_unavail_reply_message(xid: u32) -> rpc_msg {
    accepted_reply_message(xid, accept_body::PROC_UNAVAIL)
}

/// Creates a reply message indicating that the requested program is not available
pub fn prog_unavail_reply_message(xid: u32) -> rpc_msg {
    accepted_reply_message(xid, accept_body::PROG_UNAVAIL)
}

/// Creates a reply message indicating a program version mismatch
pub fn prog_mismatch_reply_message(xid: u32, accepted_ver: u32) -> rpc_msg {
    accepted_reply_message(
        xid,
        accept_body::PROG_MISMATCH(mismatch_info { low: accepted_ver, high: accepted_ver }),
    )
}

/// Creates a reply message indicating that the arguments could not be decoded
pub fn garbage_args_reply_message(xid: u32) -> rpc_msg {
    accepted_reply_message(xid, accept_body::GARBAGE_ARGS)
}

/// Creates a reply message indicating an RPC version mismatch
pub fn rpc_vers_mismatch(xid: u32) -> rpc_msg {
    let info = mismatch_info { low: RPC_VERSION, high: RPC_VERSION };
    let reply = reply_body::MSG_DENIED(rejected_reply::RPC_MISMATCH(info));
    rpc_msg { xid, body: rpc_body::REPLY(reply) }
}

/// Creates a reply message rejecting the caller's credentials
pub fn auth_error_reply_message(xid: u32, stat: auth_stat) -> rpc_msg {
    let reply = reply_body::MSG_DENIED(rejected_reply::AUTH_ERROR(stat));
    rpc_msg { xid, body: rpc_body::REPLY(reply) }
}

/// Creates a successful reply header; procedure results follow it
pub fn make_success_reply(xid: u32) -> rpc_msg {
    accepted_reply_message(xid, accept_body::SUCCESS)
}
