//! Transports carrying RPC records between a [`Client`](super::Client) and
//! a server.

use async_trait::async_trait;

use crate::protocol::rpc;

/// Delivers one complete RPC call record and returns the reply record.
///
/// Record marking, if any, is the transport's business; the client only
/// deals with whole messages.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: Vec<u8>) -> anyhow::Result<Vec<u8>>;
}

/// Runs calls against an in-process server, through the same wire
/// encoding a network transport would carry.
#[derive(Clone, Debug)]
pub struct LocalTransport {
    context: rpc::Context,
}

impl LocalTransport {
    pub fn new(context: rpc::Context) -> LocalTransport {
        LocalTransport { context }
    }

    /// The server context calls are dispatched to.
    pub fn context(&self) -> &rpc::Context {
        &self.context
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn call(&self, request: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        rpc::process_rpc(&request, self.context.clone()).await
    }
}
