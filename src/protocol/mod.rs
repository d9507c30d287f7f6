//! Protocol module implements NFS version 4.0 as specified in RFC 7530.
//!
//! This module contains three main components:
//!
//! - `xdr`: External Data Representation (XDR) for serialization and
//!   deserialization of data structures according to RFC 4506, including
//!   the RPC and NFSv4 message types.
//!
//! - `nfs`: The NFSv4 procedures and the handlers of every COMPOUND
//!   operation.
//!
//! - `rpc`: Remote Procedure Call (RPC) protocol implementation for decoding
//!   calls, checking credentials and dispatching to the NFS program, as
//!   defined in RFC 5531.
//!
//! Unlike its predecessors NFSv4 is stateful: the server tracks opens and
//! locks per client. That state lives in [`crate::state`] and is reached by
//! the handlers through [`rpc::Context`].

pub mod nfs;
pub mod rpc;
pub mod xdr;
