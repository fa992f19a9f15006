//! Caller-side state: the current chart and the current progress message.
//!
//! Both values live in `watch` channels and are only ever replaced whole, so
//! observers never see a half-updated chart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{GenerationFailure, ServiceError};
use crate::orchestrator::{GenerationOrchestrator, Progress, ProgressSink, RetryPolicy};
use crate::plan::{DietChart, fallback};
use crate::profile::Profile;
use crate::service::{PatientStore, PlanGenerator, SaveReceipt};

/// Where the current chart came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Remote,
    Fallback,
}

/// A chart the session is holding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPlan {
    pub chart: DietChart,
    pub source: PlanSource,
    pub obtained_at: DateTime<Utc>,
}

/// One person's pass through chart generation.
pub struct DietChartSession {
    orchestrator: GenerationOrchestrator,
    progress: Arc<watch::Sender<String>>,
    current: watch::Sender<Option<Arc<CurrentPlan>>>,
}

impl DietChartSession {
    pub fn new(generator: Arc<dyn PlanGenerator>, policy: RetryPolicy) -> Self {
        let progress = Arc::new(watch::Sender::new(String::new()));
        let orchestrator =
            GenerationOrchestrator::new(generator, policy).with_progress(progress.clone());
        Self {
            orchestrator,
            progress,
            current: watch::Sender::new(None),
        }
    }

    /// The chart currently held, if any.
    pub fn current(&self) -> Option<Arc<CurrentPlan>> {
        self.current.borrow().clone()
    }

    /// Watch the current chart.
    pub fn subscribe_plan(&self) -> watch::Receiver<Option<Arc<CurrentPlan>>> {
        self.current.subscribe()
    }

    /// Watch the progress message. Empty when nothing is running.
    pub fn subscribe_progress(&self) -> watch::Receiver<String> {
        self.progress.subscribe()
    }

    /// Ask the remote generator for a chart. On success it replaces the current
    /// chart; on failure the current chart is left alone and the caller decides
    /// whether to call [`use_fallback`](Self::use_fallback).
    pub async fn generate(
        &self,
        profile: &Profile,
        cancel: &CancellationToken,
    ) -> Result<Arc<CurrentPlan>, GenerationFailure> {
        self.progress.report(&Progress::Started);
        let result = self.orchestrator.generate(profile, cancel).await;
        self.progress.report(&Progress::Idle);

        let chart = result?;
        Ok(self.replace(chart, PlanSource::Remote))
    }

    /// Build the basic template chart and make it current.
    pub fn use_fallback(&self, profile: &Profile) -> Arc<CurrentPlan> {
        self.progress.report(&Progress::BuildingTemplate);
        let chart = fallback::synthesize(profile);
        self.progress.report(&Progress::Idle);
        self.replace(chart, PlanSource::Fallback)
    }

    /// Store the profile together with the current chart (if any).
    pub async fn submit(
        &self,
        store: &dyn PatientStore,
        profile: &Profile,
    ) -> Result<SaveReceipt, ServiceError> {
        let current = self.current();
        let receipt = store
            .save(profile, current.as_ref().map(|plan| &plan.chart))
            .await?;
        info!(id = %receipt.id, with_chart = current.is_some(), "Patient saved");
        Ok(receipt)
    }

    fn replace(&self, chart: DietChart, source: PlanSource) -> Arc<CurrentPlan> {
        let plan = Arc::new(CurrentPlan {
            chart,
            source,
            obtained_at: Utc::now(),
        });
        self.current.send_replace(Some(plan.clone()));
        info!(source = ?source, "Current diet chart replaced");
        plan
    }
}
