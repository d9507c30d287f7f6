//! RPC (Remote Procedure Call) protocol implementation as specified in RFC 5531.
//!
//! NFSv4 runs as program 100003 version 4 on top of ONC RPC version 2. This
//! module implements the server side of that contract:
//!
//! 1. Call header validation (RPC version, credentials)
//! 2. Authentication (AUTH_UNIX and AUTH_NONE)
//! 3. Program/version/procedure dispatching
//! 4. Error replies (PROG_UNAVAIL, PROG_MISMATCH, PROC_UNAVAIL, GARBAGE_ARGS)
//!
//! Transport framing is left to the embedding runtime, which hands complete
//! RPC records to [`process_rpc`] or [`handle_rpc`].

mod context;
mod wire;

pub use context::Context;
pub use wire::{handle_rpc, process_rpc};
