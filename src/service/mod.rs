//! Remote collaborators: plan generation, dosha classification, patient storage.

pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{GenerationError, ServiceError};
use crate::plan::DietChart;
use crate::profile::{PrakritiAttributes, Profile};

/// Produces a diet chart for a profile.
///
/// Implementations must stop work and return promptly once `cancel` fires; the
/// caller discards anything returned after that point.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(
        &self,
        profile: &Profile,
        cancel: CancellationToken,
    ) -> Result<DietChart, GenerationError>;
}

/// Predicts a dominant dosha label from assessment answers.
#[async_trait]
pub trait DoshaClassifier: Send + Sync {
    async fn classify(&self, attributes: &PrakritiAttributes) -> Result<String, ServiceError>;
}

/// Stores a profile together with its chosen chart.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn save(
        &self,
        profile: &Profile,
        chart: Option<&DietChart>,
    ) -> Result<SaveReceipt, ServiceError>;
}

/// Acknowledgement returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    #[serde(default)]
    pub message: String,
    pub id: String,
}
