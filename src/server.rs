//! Cache Server
//!
//! Binds a listener, serves the API on it, and shuts down gracefully on
//! request.

use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::{create_router, AppState};
use crate::dispatcher::Dispatcher;

/// A cache server that has a listener but is not serving yet.
#[derive(Debug)]
pub struct CacheServer {
    listener: TcpListener,
    state: AppState,
}

impl CacheServer {
    /// Binds `address` and prepares a cache holding at most `max_entries`
    /// entries (0 = unbounded).
    pub async fn new(address: impl ToSocketAddrs, max_entries: usize) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self::with_listener(listener, max_entries))
    }

    /// Uses an already bound listener.
    pub fn with_listener(listener: TcpListener, max_entries: usize) -> Self {
        Self {
            listener,
            state: AppState::with_max_entries(max_entries),
        }
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle onto the server's cache, usable alongside the network API.
    pub fn dispatcher(&self) -> Dispatcher {
        self.state.dispatcher.clone()
    }

    /// Starts serving in a background task.
    pub fn start(self) -> io::Result<ServerHandle> {
        let addr = self.listener.local_addr()?;
        let app = create_router(self.state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let result = axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    // a dropped sender counts as a shutdown request too
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(err) = &result {
                error!("Cache server failed: {}", err);
            }
            result
        });

        info!("Cache server listening on http://{}", addr);
        Ok(ServerHandle {
            addr,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// A running cache server.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Returns the address the server is serving on.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits for in-flight requests to
    /// finish.
    pub async fn stop(self) -> io::Result<()> {
        info!("Stopping cache server on {}", self.addr);
        let _ = self.shutdown.send(());
        self.task.await.map_err(io::Error::other)?
    }
}
