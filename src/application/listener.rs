//! TCP listener serving the axum router

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::error::BootstrapError;
use crate::services::bootstrap::{Listener, ServerHandle};

pub struct AxumListener {
    router: Router,
    shutdown: CancellationToken,
}

impl AxumListener {
    /// Serve `router` until `shutdown` is cancelled
    pub fn new(router: Router, shutdown: CancellationToken) -> Self {
        Self { router, shutdown }
    }
}

#[async_trait]
impl Listener for AxumListener {
    async fn listen(&self, addr: SocketAddr) -> Result<ServerHandle, BootstrapError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| BootstrapError::ListenerBind(format!("{}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| BootstrapError::ListenerBind(e.to_string()))?;

        let router = self.router.clone();
        let shutdown = self.shutdown.clone();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        });

        Ok(ServerHandle::new(local_addr, task))
    }
}
