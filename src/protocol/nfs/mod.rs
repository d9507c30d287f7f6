//! NFS protocol implementation module.
//!
//! - `v4`: The NFS version 4.0 protocol as specified in RFC 7530: the NULL
//!   and COMPOUND procedures and a handler for every operation a COMPOUND
//!   may carry.
//!
//! NFSv4 needs neither MOUNT nor PORTMAP: clients reach the root of the
//! export through PUTROOTFH and the server listens on a well-known port.

pub mod v4;
