//! Generation state machine.

use std::time::Duration;

use crate::error::GenerationError;

use super::RetryPolicy;

/// Where a generation run stands. Attempts are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// A remote call for this attempt is (about to be) in flight.
    Attempting { attempt: u32 },
    /// The attempt failed; waiting `delay` before the next one.
    BackingOff { attempt: u32, delay: Duration },
    /// The attempt produced a plan.
    Succeeded { attempt: u32 },
    /// No plan; the attempt was the last one allowed.
    Failed { attempt: u32 },
}

impl GenerationState {
    /// Initial state.
    pub fn start() -> Self {
        Self::Attempting { attempt: 1 }
    }

    /// The attempt this state belongs to.
    pub fn attempt(&self) -> u32 {
        match *self {
            Self::Attempting { attempt }
            | Self::BackingOff { attempt, .. }
            | Self::Succeeded { attempt }
            | Self::Failed { attempt } => attempt,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// The current attempt returned a plan. Only meaningful from `Attempting`.
    pub fn on_success(self) -> Self {
        match self {
            Self::Attempting { attempt } => Self::Succeeded { attempt },
            other => other,
        }
    }

    /// The current attempt failed. Backs off if the error is retryable and
    /// attempts remain, otherwise fails. Only meaningful from `Attempting`.
    pub fn on_failure(self, error: &GenerationError, policy: &RetryPolicy) -> Self {
        match self {
            Self::Attempting { attempt } => {
                if error.is_retryable() && attempt < policy.max_attempts {
                    Self::BackingOff {
                        attempt,
                        delay: policy.backoff_after(attempt),
                    }
                } else {
                    Self::Failed { attempt }
                }
            }
            other => other,
        }
    }

    /// The backoff wait is over; start the next attempt.
    pub fn on_backoff_elapsed(self) -> Self {
        match self {
            Self::BackingOff { attempt, .. } => Self::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// The caller gave up. Any non-terminal state fails.
    pub fn on_cancel(self) -> Self {
        if self.is_terminal() {
            self
        } else {
            Self::Failed {
                attempt: self.attempt(),
            }
        }
    }
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attempting { attempt } => write!(f, "attempting({attempt})"),
            Self::BackingOff { attempt, delay } => {
                write!(f, "backing_off({attempt}, {}s)", delay.as_secs_f64())
            }
            Self::Succeeded { attempt } => write!(f, "succeeded({attempt})"),
            Self::Failed { attempt } => write!(f, "failed({attempt})"),
        }
    }
}
