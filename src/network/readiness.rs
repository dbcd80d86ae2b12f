//! Bounded-retry TCP reachability checks.
//!
//! Used to approximate when a consensus process has started serving (its
//! client port accepts connections) or has gone away (connections are
//! refused). Exhausting all attempts is a normal outcome, never an error:
//! callers only lose confidence before reporting.

use std::fmt;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::metrics::READINESS_POLLS;
use crate::utils::net::is_server_ready;
use crate::ReadinessConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl fmt::Display for Reachability {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Reachability::Reachable => f.write_str("reachable"),
            Reachability::Unreachable => f.write_str("unreachable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The desired reachability was seen on the given attempt (1-based)
    Observed { attempt: usize },
    Exhausted,
}

impl PollOutcome {
    pub fn is_observed(&self) -> bool {
        matches!(self, PollOutcome::Observed { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            PollOutcome::Observed { .. } => "observed",
            PollOutcome::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadinessPoller {
    attempts: usize,
    interval: Duration,
}

impl ReadinessPoller {
    pub fn new(
        attempts: usize,
        interval: Duration,
    ) -> Self {
        Self { attempts, interval }
    }

    pub fn from_config(config: &ReadinessConfig) -> Self {
        Self::new(config.attempts, config.interval())
    }

    /// Sleeps one interval, then makes one connect attempt (itself bounded by
    /// the interval), up to `attempts` times. Returns on the first attempt that
    /// observes `desired`. There is no cancellation: a call always runs to
    /// that point or to exhaustion.
    pub async fn wait_until(
        &self,
        target: &str,
        desired: Reachability,
    ) -> PollOutcome {
        let mut outcome = PollOutcome::Exhausted;
        for attempt in 1..=self.attempts {
            sleep(self.interval).await;

            let reachable = is_server_ready(target, self.interval).await;
            let observed = match desired {
                Reachability::Reachable => reachable,
                Reachability::Unreachable => !reachable,
            };
            if observed {
                outcome = PollOutcome::Observed { attempt };
                break;
            }
            debug!(%target, %desired, attempt, "not yet {}", desired);
        }

        READINESS_POLLS
            .with_label_values(&[&desired.to_string(), outcome.label()])
            .inc();
        debug!(%target, %desired, ?outcome, "readiness poll finished");
        outcome
    }

    pub async fn wait_until_reachable(
        &self,
        target: &str,
    ) -> PollOutcome {
        self.wait_until(target, Reachability::Reachable).await
    }

    pub async fn wait_until_unreachable(
        &self,
        target: &str,
    ) -> PollOutcome {
        self.wait_until(target, Reachability::Unreachable).await
    }
}
