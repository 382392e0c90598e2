//! An unpredictable http endpoint for playing with prometheus metrics.
//!
//! `ANY /rando` sleeps for a random number of seconds and answers with a random status,
//! recording latency, a synthetic response size and a request count for every request.
//! Sending requests to it in a loop produces a random distribution of metric points.

pub mod filters;
pub mod outcome;
pub mod responder;
pub mod server;

pub use outcome::{OutcomeSource, RandomOutcomes, SyntheticOutcome, STATUS_CODES};
pub use responder::Responder;
pub use server::{serve, Server};

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to launch server: {0}")]
    Launch(#[source] warp::Error),
    #[error("in-flight requests did not finish within {0:?}")]
    ShutdownTimeout(Duration),
    #[error("failed to listen for interrupt: {0}")]
    Signal(#[source] std::io::Error),
    #[error("server task aborted: {0}")]
    Aborted(#[source] tokio::task::JoinError),
}
