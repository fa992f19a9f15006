use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use diet_chart::config::ServiceConfig;
use diet_chart::plan::{PlanViolation, check_complete};
use diet_chart::profile::{Dosha, PrakritiAttributes, Profile};
use diet_chart::service::{DoshaClassifier, HttpBackend};
use diet_chart::session::{CurrentPlan, DietChartSession};

#[derive(Parser)]
#[command(name = "diet-chart", about = "Ayurvedic diet chart client", version)]
struct Cli {
    /// Backend base URL (overrides DIET_CHART_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the dominant dosha for a profile
    Classify {
        /// Profile JSON file
        profile: PathBuf,
    },
    /// Generate a personalized 7-day chart through the backend
    Generate {
        /// Profile JSON file
        profile: PathBuf,
        /// What to do if generation fails
        #[arg(long, value_enum, default_value_t = FallbackMode::Ask)]
        fallback: FallbackMode,
        /// Save the profile and chart afterwards
        #[arg(long)]
        save: bool,
    },
    /// Build the basic template chart without contacting the backend
    Fallback {
        /// Profile JSON file
        profile: PathBuf,
        /// Save the profile and chart afterwards
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FallbackMode {
    /// Ask on the terminal
    Ask,
    /// Use the basic template without asking
    Always,
    /// Give up
    Never,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ServiceConfig::from_env().context("reading DIET_CHART_* settings")?;
    if let Some(url) = cli.api_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }

    let backend = Arc::new(HttpBackend::from_config(&config));

    match cli.command {
        Commands::Classify { profile } => {
            let profile = load_profile(&profile).await?;
            let attributes = PrakritiAttributes::from_profile(&profile);
            let label = backend
                .classify(&attributes)
                .await
                .context("predicting dosha")?;
            eprintln!("Predicted Prakriti: {}", Dosha::resolve(&label));
            println!("{label}");
        }

        Commands::Generate {
            profile,
            fallback,
            save,
        } => {
            let profile = load_profile(&profile).await?;
            eprintln!("🌿 diet-chart v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("   Backend: {}", config.base_url);
            eprintln!(
                "   Attempts: {} (timeout {}s each)\n",
                config.retry.max_attempts,
                config.retry.attempt_timeout.as_secs()
            );

            let session = DietChartSession::new(backend.clone(), config.retry);
            let printer = spawn_progress_printer(&session);

            // Ctrl-C stops waiting on the backend.
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let plan = match session.generate(&profile, &cancel).await {
                Ok(plan) => plan,
                Err(failure) => {
                    let accept = match fallback {
                        FallbackMode::Always => true,
                        FallbackMode::Never => false,
                        FallbackMode::Ask => {
                            let stdin = BufReader::new(tokio::io::stdin());
                            confirm(&failure.fallback_prompt(), stdin, &cancel).await?
                        }
                    };
                    if !accept {
                        printer.abort();
                        eprintln!("Please try again later or contact support if the issue persists.");
                        return Err(failure.into());
                    }
                    session.use_fallback(&profile)
                }
            };
            printer.abort();

            print_plan(&plan)?;
            if save {
                let receipt = session
                    .submit(backend.as_ref(), &profile)
                    .await
                    .context("saving patient")?;
                eprintln!("{} (id {})", receipt.message, receipt.id);
            }
        }

        Commands::Fallback { profile, save } => {
            let profile = load_profile(&profile).await?;
            let session = DietChartSession::new(backend.clone(), config.retry);
            let plan = session.use_fallback(&profile);

            print_plan(&plan)?;
            if save {
                let receipt = session
                    .submit(backend.as_ref(), &profile)
                    .await
                    .context("saving patient")?;
                eprintln!("{} (id {})", receipt.message, receipt.id);
            }
        }
    }

    Ok(())
}

async fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    Profile::load(path)
        .await
        .with_context(|| format!("loading profile from {}", path.display()))
}

/// Echo progress messages to stderr as they change.
fn spawn_progress_printer(session: &DietChartSession) -> tokio::task::JoinHandle<()> {
    let mut progress = session.subscribe_progress();
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let message = progress.borrow_and_update().clone();
            if !message.is_empty() {
                eprintln!("   {message}");
            }
        }
    })
}

/// Ask a yes/no question. An interrupt (before or while asking) counts as no.
async fn confirm<R>(question: &str, input: R, cancel: &CancellationToken) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    if cancel.is_cancelled() {
        return Ok(false);
    }
    eprint!("{question} [y/N] ");
    let mut lines = input.lines();
    tokio::select! {
        _ = cancel.cancelled() => {
            eprintln!();
            Ok(false)
        }
        line = lines.next_line() => {
            let answer = line?.unwrap_or_default();
            Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
        }
    }
}

fn print_plan(plan: &CurrentPlan) -> anyhow::Result<()> {
    match check_complete(&plan.chart) {
        Ok(()) => {}
        Err(PlanViolation::MissingMeal { day, slot } | PlanViolation::EmptyMeal { day, slot }) => {
            tracing::warn!(day, meal = slot.label(), "Diet chart is missing a meal");
        }
        Err(gap) => tracing::warn!(%gap, "Diet chart is incomplete"),
    }
    let days = plan.chart.weekly_plan.len();
    eprintln!(
        "\n✅ {days}-day chart ready (source: {:?}, {})",
        plan.source,
        plan.obtained_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("{}", serde_json::to_string_pretty(&plan.chart)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn confirm_reads_answer() {
        let cancel = CancellationToken::new();
        assert!(confirm("Use template?", &b"y\n"[..], &cancel).await.unwrap());
        assert!(confirm("Use template?", &b" YES \n"[..], &cancel).await.unwrap());
        assert!(!confirm("Use template?", &b"\n"[..], &cancel).await.unwrap());
        assert!(!confirm("Use template?", &b""[..], &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn interrupted_run_declines_without_reading() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!confirm("Use template?", &b"y\n"[..], &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn interrupt_while_waiting_for_answer_declines() {
        // Nothing is ever written, so the read stays pending.
        let (_writer, reader) = tokio::io::duplex(64);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let answer = tokio::time::timeout(
            Duration::from_secs(5),
            confirm("Use template?", BufReader::new(reader), &cancel),
        )
        .await
        .expect("prompt ignored the interrupt");
        assert!(!answer.unwrap());
    }
}
