//! Generation orchestrator: obtains a chart from the remote generator with a
//! per-attempt timeout, bounded retries and exponential backoff.
//!
//! Attempts run strictly one after another. Each remote call gets its own child
//! cancellation token; when the attempt times out (or the caller cancels) the
//! token is cancelled and the call's future dropped, so a late response can never
//! reach a later attempt or the caller.

pub mod policy;
pub mod progress;
pub mod state;

pub use policy::RetryPolicy;
pub use progress::{LogProgress, Progress, ProgressSink};
pub use state::GenerationState;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{GenerationError, GenerationFailure};
use crate::plan::DietChart;
use crate::profile::Profile;
use crate::service::PlanGenerator;

/// Runs the retry loop around a [`PlanGenerator`].
pub struct GenerationOrchestrator {
    generator: Arc<dyn PlanGenerator>,
    policy: RetryPolicy,
    progress: Arc<dyn ProgressSink>,
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn PlanGenerator>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            policy,
            progress: Arc::new(LogProgress),
        }
    }

    /// Send progress notifications to `sink` instead of the log.
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Produce a chart for `profile`, or the cause of the last failed attempt.
    ///
    /// Cancelling `cancel` aborts the current call or backoff and ends the run
    /// with [`GenerationError::Cancelled`].
    pub async fn generate(
        &self,
        profile: &Profile,
        cancel: &CancellationToken,
    ) -> Result<DietChart, GenerationFailure> {
        let mut state = GenerationState::start();
        let mut last: Result<DietChart, GenerationError> = Err(GenerationError::Cancelled);

        while !state.is_terminal() {
            state = match state {
                GenerationState::Attempting { attempt } => {
                    self.progress.report(&Progress::Attempting {
                        attempt,
                        max_attempts: self.policy.max_attempts,
                        wait_bound: self.policy.attempt_timeout,
                    });
                    info!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        "Requesting diet chart"
                    );

                    last = self.attempt(profile, cancel).await;
                    match &last {
                        Ok(_) => state.on_success(),
                        Err(cause) => {
                            let next = state.on_failure(cause, &self.policy);
                            warn!(attempt, error = %cause, next = %next, "Diet chart attempt failed");
                            if let GenerationError::Timeout(_) = cause {
                                self.progress.report(&Progress::TimedOut {
                                    attempt,
                                    will_retry: !next.is_terminal(),
                                });
                            }
                            next
                        }
                    }
                }
                GenerationState::BackingOff { attempt, delay } => {
                    self.progress.report(&Progress::RetryingIn { delay });
                    info!(attempt, delay_secs = delay.as_secs_f64(), "Backing off before retry");

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            last = Err(GenerationError::Cancelled);
                            state.on_cancel()
                        }
                        _ = tokio::time::sleep(delay) => state.on_backoff_elapsed(),
                    }
                }
                terminal => terminal,
            };
        }

        match last {
            Ok(chart) => {
                info!(attempts = state.attempt(), "Diet chart generated");
                Ok(chart)
            }
            Err(cause) => {
                error!(attempts = state.attempt(), error = %cause, "Diet chart generation failed");
                Err(GenerationFailure {
                    cause,
                    attempts: state.attempt(),
                })
            }
        }
    }

    /// One remote call, bounded by the attempt timeout and the caller's token.
    async fn attempt(
        &self,
        profile: &Profile,
        cancel: &CancellationToken,
    ) -> Result<DietChart, GenerationError> {
        let call_token = cancel.child_token();
        let call = self.generator.generate(profile, call_token.clone());
        let timeout = self.policy.attempt_timeout;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            outcome = tokio::time::timeout(timeout, call) => match outcome {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout(timeout)),
            },
        };

        // The call future is gone by now; tell the transport as well.
        call_token.cancel();
        result
    }
}
