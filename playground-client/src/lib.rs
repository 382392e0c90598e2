//! Bounded-concurrency request generator for the playground server.
//!
//! At most `concurrency` requests are in flight at any time. Each admitted request uses a
//! method picked uniformly from [`METHODS`] and targets [`common_env::RANDO_PATH`]. A failed
//! request stops the whole run.

use common_env::RANDO_PATH;
use http::{Method, Request, Uri};
use hyper::client::HttpConnector;
use hyper::{Body, Client};
use log::{debug, error, info};
use std::future::Future;
use std::io;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

pub const METHODS: [Method; 4] = [Method::GET, Method::DELETE, Method::PUT, Method::POST];

pub fn random_method() -> Method {
    METHODS[fastrand::usize(0..METHODS.len())].clone()
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("request to {uri} failed: {source}")]
    Transport {
        uri: Uri,
        #[source]
        source: hyper::Error,
    },
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] http::Error),
    #[error("admission gate closed")]
    Closed,
    #[error("failed to listen for interrupt: {0}")]
    Signal(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// number of requests admitted before the run stopped
    pub dispatched: u64,
}

type FatalError = Arc<Mutex<Option<GeneratorError>>>;

pub struct Generator {
    client: Client<HttpConnector>,
    target: Uri,
    concurrency: usize,
    permits: Arc<Semaphore>,
}

impl Generator {
    /// `authority` is the `host:port` of the playground server.
    pub fn new(concurrency: NonZeroUsize, authority: &str) -> Result<Self, GeneratorError> {
        let target = Uri::builder()
            .scheme("http")
            .authority(authority)
            .path_and_query(RANDO_PATH)
            .build()?;
        Ok(Generator {
            client: Client::new(),
            target,
            concurrency: concurrency.get(),
            permits: Arc::new(Semaphore::new(concurrency.get())),
        })
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    /// number of requests currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.concurrency - self.permits.available_permits()
    }

    /// Send requests until `cancel` fires.
    ///
    /// Waiting for a free permit is interrupted by cancellation. Requests already sent are
    /// not awaited. A transport failure cancels `cancel` and is returned as the result.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary, GeneratorError> {
        let fatal: FatalError = Arc::new(Mutex::new(None));
        let mut dispatched = 0u64;
        loop {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = self.permits.clone().acquire_owned() => {
                    permit.map_err(|_| GeneratorError::Closed)?
                }
            };

            let method = random_method();
            let request = Request::builder()
                .method(method)
                .uri(self.target.clone())
                .body(Body::empty())?;
            info!("making request {} {}", request.method(), request.uri());
            dispatched += 1;
            tokio::spawn(send_request(
                self.client.clone(),
                request,
                permit,
                fatal.clone(),
                cancel.clone(),
            ));
        }

        let fatal = fatal.lock().await.take();
        match fatal {
            Some(e) => Err(e),
            None => {
                info!("stopped after dispatching {} requests", dispatched);
                Ok(RunSummary { dispatched })
            }
        }
    }

    /// Run until `interrupt` resolves, then cancel and return once admission stopped.
    ///
    /// An interrupt listener that fails is reported as [`GeneratorError::Signal`].
    pub async fn run_until<S>(
        &self,
        cancel: CancellationToken,
        interrupt: S,
    ) -> Result<RunSummary, GeneratorError>
    where
        S: Future<Output = io::Result<()>>,
    {
        let run = self.run(cancel.clone());
        tokio::pin!(run);
        tokio::select! {
            result = &mut run => result,
            signal = interrupt => match signal {
                Ok(()) => {
                    info!("interrupt received, gracefully shutting down");
                    cancel.cancel();
                    run.await
                }
                Err(e) => {
                    error!("failed to listen for interrupt: {}", e);
                    cancel.cancel();
                    Err(GeneratorError::Signal(e))
                }
            }
        }
    }
}

async fn send_request(
    client: Client<HttpConnector>,
    request: Request<Body>,
    permit: OwnedSemaphorePermit,
    fatal: FatalError,
    cancel: CancellationToken,
) {
    let uri = request.uri().clone();
    let result = match client.request(request).await {
        Ok(response) => {
            let status = response.status();
            hyper::body::to_bytes(response.into_body())
                .await
                .map(|_| status)
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(status) => debug!("{} responded with {}", &uri, status),
        Err(e) => {
            error!("request to {} failed: {}", &uri, &e);
            {
                let mut fatal = fatal.lock().await;
                if fatal.is_none() {
                    *fatal = Some(GeneratorError::Transport { uri, source: e });
                }
            }
            cancel.cancel();
        }
    }
    drop(permit);
}
