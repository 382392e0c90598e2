use crate::filters;
use crate::responder::Responder;
use crate::ServeError;
use common_env::METRICS_PATH;
use log::{error, info};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// A bound, running responder server
pub struct Server {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Server {
    /// Bind `addr` and start serving the responder and the metrics exporter.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(addr: SocketAddr, responder: Arc<Responder>) -> Result<Self, ServeError> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (local_addr, server) = warp::serve(filters::routes(responder))
            .try_bind_with_graceful_shutdown(addr, async {
                shutdown_rx.await.ok();
            })
            .map_err(ServeError::Launch)?;
        let handle = tokio::spawn(server);
        Ok(Server {
            local_addr,
            shutdown_tx,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait up to `grace` for in-flight requests. The server
    /// is aborted when the grace period runs out.
    pub async fn shutdown(mut self, grace: Duration) -> Result<(), ServeError> {
        let _ = self.shutdown_tx.send(());
        match timeout(grace, &mut self.handle).await {
            Ok(Ok(())) => {
                info!("server stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("server task failed: {}", e);
                Err(ServeError::Aborted(e))
            }
            Err(_) => {
                self.handle.abort();
                error!("failed to gracefully shutdown within {:?}", grace);
                Err(ServeError::ShutdownTimeout(grace))
            }
        }
    }
}

/// Serve until `shutdown_signal` resolves, then shut down gracefully within `grace`.
///
/// A shutdown signal that fails still stops the server, and the failure is returned.
pub async fn serve<S>(
    addr: SocketAddr,
    responder: Arc<Responder>,
    shutdown_signal: S,
    grace: Duration,
) -> Result<(), ServeError>
where
    S: Future<Output = io::Result<()>>,
{
    let server = Server::bind(addr, responder).map_err(|e| {
        error!("error while launching metrics server: {}", e);
        e
    })?;
    info!(
        "launching metrics server on {}{}",
        server.local_addr(),
        METRICS_PATH
    );
    match shutdown_signal.await {
        Ok(()) => {
            info!("interrupt received, gracefully shutting down");
            server.shutdown(grace).await
        }
        Err(e) => {
            error!("failed to listen for interrupt: {}", e);
            let _ = server.shutdown(grace).await;
            Err(ServeError::Signal(e))
        }
    }
}
