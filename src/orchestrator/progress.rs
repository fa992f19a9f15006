//! Progress notifications emitted while a chart is being produced.

use std::time::Duration;

use tokio::sync::watch;

/// A step in producing a chart, rendered as a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Started,
    Attempting {
        attempt: u32,
        max_attempts: u32,
        wait_bound: Duration,
    },
    TimedOut {
        attempt: u32,
        will_retry: bool,
    },
    RetryingIn {
        delay: Duration,
    },
    BuildingTemplate,
    /// Nothing in progress; renders as an empty message.
    Idle,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => f.write_str("Initializing diet chart generation..."),
            Self::Attempting {
                attempt,
                max_attempts,
                wait_bound,
            } => write!(
                f,
                "Generating your personalized diet chart (attempt {attempt}/{max_attempts})... \
                 This may take up to {}.",
                describe(*wait_bound)
            ),
            Self::TimedOut { will_retry, .. } => {
                if *will_retry {
                    f.write_str("Request timed out. Retrying...")
                } else {
                    f.write_str("Request timed out.")
                }
            }
            Self::RetryingIn { delay } => write!(f, "Retrying in {}...", describe(*delay)),
            Self::BuildingTemplate => f.write_str("Generating basic diet chart template..."),
            Self::Idle => Ok(()),
        }
    }
}

/// "2 minutes", "1 minute", "4 seconds", "250 ms".
fn describe(duration: Duration) -> String {
    let secs = duration.as_secs();
    if duration.subsec_nanos() != 0 {
        return format!("{} ms", duration.as_millis());
    }
    match secs {
        60 => "1 minute".to_string(),
        s if s > 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}

/// Receives progress notifications. Called synchronously, before the step it
/// describes starts.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &Progress);
}

/// Publishes the rendered message as the "current progress" value.
impl ProgressSink for watch::Sender<String> {
    fn report(&self, progress: &Progress) {
        self.send_replace(progress.to_string());
    }
}

/// Sends progress to the tracing log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, progress: &Progress) {
        if *progress != Progress::Idle {
            tracing::info!(progress = %progress, "Diet chart progress");
        }
    }
}
