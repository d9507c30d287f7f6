//! NFS4 Mamont - the NFS version 4.0 COMPOUND protocol in Rust
//!
//! This library implements the core of NFSv4.0 as defined in RFC 7530: the
//! XDR wire format, the typed message model, a client side compound
//! executor and the server side operation handlers together with the state
//! they maintain (open owners, stateids, share reservations, byte-range
//! locks and client ids).
//!
//! ## Main Components
//!
//! - `protocol`: XDR encoding/decoding (RFC 4506), the ONC RPC layer
//!   (RFC 5531) and the NFSv4 operation handlers.
//!
//! - `state`: The server state table. Requests of one open owner are
//!   sequenced by seqid; unrelated owners proceed concurrently.
//!
//! - `client`: Builders for every supported operation and an executor that
//!   sends a COMPOUND over a [`client::Transport`] and decodes the reply.
//!
//! - `vfs`: The Virtual File System API that must be implemented to export
//!   a file system. `memfs` is an in-memory implementation of it.
//!
//! - `config`: Server limits and identity advertised through attributes.
//!
//! ## Usage
//!
//! A server wraps a file system into an [`protocol::rpc::Context`] and feeds
//! each received RPC record to [`protocol::rpc::process_rpc`]. In process, a
//! [`client::LocalTransport`] does exactly that:
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use std::sync::Arc;
//!
//! use nfs4_mamont::client::{ops, Client, LocalTransport};
//! use nfs4_mamont::memfs::MemFs;
//! use nfs4_mamont::protocol::rpc::Context;
//!
//! let context = Context::new(Arc::new(MemFs::new()));
//! let client = Client::new(LocalTransport::new(context));
//! client.compound(vec![ops::putrootfh(), ops::getfh()]).await?.check()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod memfs;
pub mod protocol;
pub mod state;
pub mod vfs;
pub mod write_counter;

pub use protocol::xdr;
