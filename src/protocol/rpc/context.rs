//! RPC context implementation for maintaining server and client state.
//!
//! The Context carries everything an NFSv4 operation handler needs besides
//! its arguments:
//!
//! - Client identification and AUTH_UNIX credentials
//! - Access to the exported file system
//! - The server wide state table (owners, stateids, locks, client ids)
//! - Server configuration
//!
//! A server creates one context and clones it for every connection; the
//! clones share the file system, the state table and the configuration.

use std::fmt;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::protocol::xdr;
use crate::state::StateManager;
use crate::vfs;

/// Represents the execution context for RPC operations
#[derive(Clone)]
pub struct Context {
    /// Client's network address used for logging
    pub client_addr: String,

    /// UNIX-style authentication credentials from the client
    /// Contains user ID, group IDs, and other identity information
    pub auth: xdr::rpc::auth_unix,

    /// Virtual File System implementation that handles actual file operations
    pub vfs: Arc<dyn vfs::NFSFileSystem + Send + Sync>,

    /// Opens, locks and client ids of every client of this server
    pub state: Arc<StateManager>,

    pub config: Arc<ServerConfig>,
}

impl Context {
    /// Creates a context with the default configuration.
    pub fn new(vfs: Arc<dyn vfs::NFSFileSystem + Send + Sync>) -> Context {
        Context::with_config(vfs, ServerConfig::default())
    }

    pub fn with_config(
        vfs: Arc<dyn vfs::NFSFileSystem + Send + Sync>,
        config: ServerConfig,
    ) -> Context {
        let state = Arc::new(StateManager::new(vfs.generation()));
        Context {
            client_addr: String::from("local"),
            auth: xdr::rpc::auth_unix::default(),
            vfs,
            state,
            config: Arc::new(config),
        }
    }

    /// A context for another connection to the same server.
    pub fn for_client(&self, client_addr: &str) -> Context {
        Context { client_addr: client_addr.to_string(), ..self.clone() }
    }

    /// Principal used to tell clients apart in SETCLIENTID.
    pub fn principal(&self) -> String {
        format!("{}@{}", self.auth.uid, String::from_utf8_lossy(&self.auth.machinename))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("rpc::Context")
            .field("client_addr", &self.client_addr)
            .field("auth", &self.auth)
            .field("config", &self.config)
            .finish()
    }
}
