use http::StatusCode;
use std::time::Duration;

/// Statuses the responder picks from, each with the same probability
pub const STATUS_CODES: [StatusCode; 4] = [
    StatusCode::OK,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::NOT_FOUND,
    StatusCode::CREATED,
];

pub const DEFAULT_MAX_DELAY_SECS: u64 = 120;
/// Exclusive upper bound of synthetic response sizes
pub const MAX_SIZE_BYTES: u64 = 2_000_000;

/// Status, size and latency decided for a single handled request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticOutcome {
    pub status: StatusCode,
    pub size_bytes: u64,
    pub delay: Duration,
}

pub trait OutcomeSource: Send + Sync {
    fn draw(&self) -> SyntheticOutcome;
}

/// A fixed outcome always draws itself.
impl OutcomeSource for SyntheticOutcome {
    fn draw(&self) -> SyntheticOutcome {
        *self
    }
}

/// Draws delay, size and status independently and uniformly, in that order.
#[derive(Debug, Clone)]
pub struct RandomOutcomes {
    max_delay_secs: u64,
}

impl RandomOutcomes {
    /// Delays are whole seconds in `[0, max_delay_secs)`. A bound of zero is treated as one,
    /// meaning every response is immediate.
    pub fn new(max_delay_secs: u64) -> Self {
        RandomOutcomes {
            max_delay_secs: max_delay_secs.max(1),
        }
    }
}

impl Default for RandomOutcomes {
    fn default() -> Self {
        RandomOutcomes::new(DEFAULT_MAX_DELAY_SECS)
    }
}

impl OutcomeSource for RandomOutcomes {
    fn draw(&self) -> SyntheticOutcome {
        let delay = Duration::from_secs(fastrand::u64(0..self.max_delay_secs));
        let size_bytes = fastrand::u64(0..MAX_SIZE_BYTES);
        let status = STATUS_CODES[fastrand::usize(0..STATUS_CODES.len())];
        SyntheticOutcome {
            status,
            size_bytes,
            delay,
        }
    }
}
