//! Integration tests for the HTTP backend and the generation orchestrator.
//!
//! Each test spins up an Axum stub of the diet chart backend on a random port
//! and drives the real reqwest client against it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use diet_chart::error::{GenerationError, ServiceError};
use diet_chart::orchestrator::RetryPolicy;
use diet_chart::plan::fallback;
use diet_chart::profile::{PrakritiAttributes, Profile};
use diet_chart::service::{DoshaClassifier, HttpBackend, PatientStore, PlanGenerator};
use diet_chart::session::{DietChartSession, PlanSource};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What the stub does for one `/generate-diet-chart` call.
enum Reply {
    Status(u16, Value),
    Stall(Duration),
}

/// Stub backend state. Generation replies are scripted; an empty script means
/// "answer with a valid chart".
#[derive(Default)]
struct Stub {
    script: Mutex<VecDeque<Reply>>,
    generate_calls: AtomicU32,
    predictions: Mutex<Vec<Value>>,
    saved: Mutex<Vec<Value>>,
}

impl Stub {
    fn scripted(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    fn calls(&self) -> u32 {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

fn chart_body(dosha: &str) -> Value {
    let profile = Profile {
        dominant_dosha: dosha.into(),
        ..Default::default()
    };
    json!({
        "dietChart": fallback::synthesize(&profile),
        "metadata": { "dosha": dosha }
    })
}

async fn generate(State(stub): State<Arc<Stub>>, Json(_profile): Json<Value>) -> Response {
    stub.generate_calls.fetch_add(1, Ordering::SeqCst);
    let next = stub.script.lock().unwrap().pop_front();
    match next {
        Some(Reply::Status(status, body)) => {
            (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
        }
        Some(Reply::Stall(delay)) => {
            tokio::time::sleep(delay).await;
            Json(chart_body("VATA")).into_response()
        }
        None => Json(chart_body("PITTA")).into_response(),
    }
}

async fn predict(State(stub): State<Arc<Stub>>, Json(attributes): Json<Value>) -> Response {
    stub.predictions.lock().unwrap().push(attributes);
    Json(json!({ "dosha": "Pitta-Kapha" })).into_response()
}

async fn save_patient(State(stub): State<Arc<Stub>>, Json(document): Json<Value>) -> Response {
    let mut saved = stub.saved.lock().unwrap();
    saved.push(document);
    Json(json!({
        "message": "Patient data saved successfully!",
        "id": format!("patient-{}", saved.len())
    }))
    .into_response()
}

/// Start an Axum stub on a random port, return its base URL.
async fn start_server(stub: Arc<Stub>) -> String {
    let app = Router::new()
        .route("/generate-diet-chart", post(generate))
        .route("/predict", post(predict))
        .route("/save-patient", post(save_patient))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

/// A policy short enough for real-time tests.
fn quick_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        attempt_timeout: Duration::from_millis(300),
        backoff_base: Duration::from_millis(20),
    }
}

fn patient() -> Profile {
    Profile {
        name: "Asha".into(),
        age: "34".into(),
        dominant_dosha: "Pitta".into(),
        diet_type: "non-vegetarian".into(),
        ..Default::default()
    }
}

// ── Generation endpoint ──────────────────────────────────────────────

#[tokio::test]
async fn generate_decodes_valid_chart() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(Arc::new(Stub::default())).await;
        let backend = HttpBackend::new(base);

        let chart = backend
            .generate(&patient(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chart.weekly_plan.len(), 7);
        assert_eq!(chart.weekly_plan[0].day_name, "Monday");
        assert_eq!(chart.ayurvedic_supplements[0].name, "Brahmi");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generate_maps_server_error() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::scripted(vec![Reply::Status(
            500,
            json!({ "error": "Failed to generate diet chart" }),
        )]);
        let backend = HttpBackend::new(start_server(stub).await);

        let err = backend
            .generate(&patient(), CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::ServerError {
                status: 500,
                message: "Failed to generate diet chart".into(),
            }
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generate_rejects_incomplete_week() {
    timeout(TEST_TIMEOUT, async {
        let mut body = chart_body("KAPHA");
        body["dietChart"]["weeklyPlan"]
            .as_array_mut()
            .unwrap()
            .truncate(5);
        let stub = Stub::scripted(vec![Reply::Status(200, body)]);
        let backend = HttpBackend::new(start_server(stub).await);

        let err = backend
            .generate(&patient(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::InvalidResponse(_)), "{err:?}");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_backend_is_network_unavailable() {
    timeout(TEST_TIMEOUT, async {
        // Grab a free port, then close it so nothing is listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let backend = HttpBackend::new(format!("http://127.0.0.1:{port}"));
        let err = backend
            .generate(&patient(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::NetworkUnavailable(_)), "{err:?}");
    })
    .await
    .expect("test timed out");
}

// ── Orchestrated generation ──────────────────────────────────────────

#[tokio::test]
async fn session_retries_after_server_error() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::scripted(vec![Reply::Status(504, json!({}))]);
        let backend = Arc::new(HttpBackend::new(start_server(stub.clone()).await));
        let session = DietChartSession::new(backend, quick_policy());

        let plan = session
            .generate(&patient(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stub.calls(), 2);
        assert_eq!(plan.source, PlanSource::Remote);
        assert_eq!(plan.chart.weekly_plan.len(), 7);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn session_gives_up_after_two_timeouts() {
    timeout(TEST_TIMEOUT, async {
        let stall = Duration::from_secs(3);
        let stub = Stub::scripted(vec![Reply::Stall(stall), Reply::Stall(stall)]);
        let backend = Arc::new(HttpBackend::new(start_server(stub.clone()).await));
        let session = DietChartSession::new(backend, quick_policy());

        let started = tokio::time::Instant::now();
        let failure = session
            .generate(&patient(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(started.elapsed() < stall);
        assert_eq!(stub.calls(), 2);
        assert_eq!(failure.attempts, 2);
        assert_eq!(
            failure.cause,
            GenerationError::Timeout(Duration::from_millis(300))
        );
        assert!(session.current().is_none());

        // The caller opts in to the template; nothing else produces it.
        let plan = session.use_fallback(&patient());
        assert_eq!(plan.source, PlanSource::Fallback);
        assert!(
            plan.chart.weekly_plan[0]
                .meals
                .lunch
                .as_ref()
                .unwrap()
                .items
                .iter()
                .any(|item| item.contains("chicken"))
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn cancelling_stops_waiting_on_the_backend() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::scripted(vec![Reply::Stall(Duration::from_secs(5))]);
        let backend = Arc::new(HttpBackend::new(start_server(stub.clone()).await));
        let session = DietChartSession::new(
            backend,
            RetryPolicy {
                attempt_timeout: Duration::from_secs(5),
                ..quick_policy()
            },
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let failure = session.generate(&patient(), &cancel).await.unwrap_err();

        assert_eq!(failure.cause, GenerationError::Cancelled);
        assert_eq!(stub.calls(), 1);
    })
    .await
    .expect("test timed out");
}

// ── Classification and storage ───────────────────────────────────────

#[tokio::test]
async fn classify_sends_attribute_record() {
    timeout(TEST_TIMEOUT, async {
        let stub = Arc::new(Stub::default());
        let backend = HttpBackend::new(start_server(stub.clone()).await);

        let profile = Profile {
            body_size: Some("Large".into()),
            ..patient()
        };
        let label = backend
            .classify(&PrakritiAttributes::from_profile(&profile))
            .await
            .unwrap();

        assert_eq!(label, "Pitta-Kapha");
        let sent = stub.predictions.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["Body Size"], "Large");
        assert_eq!(sent[0].as_object().unwrap().len(), 29);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submit_stores_profile_with_chart() {
    timeout(TEST_TIMEOUT, async {
        let stub = Arc::new(Stub::default());
        let backend = Arc::new(HttpBackend::new(start_server(stub.clone()).await));
        let session = DietChartSession::new(backend.clone(), quick_policy());

        session.use_fallback(&patient());
        let receipt = session.submit(backend.as_ref(), &patient()).await.unwrap();

        assert_eq!(receipt.id, "patient-1");
        assert_eq!(receipt.message, "Patient data saved successfully!");

        let saved = stub.saved.lock().unwrap();
        assert_eq!(saved[0]["name"], "Asha");
        assert_eq!(saved[0]["dominantDosha"], "Pitta");
        assert_eq!(saved[0]["dietChart"]["weeklyPlan"][6]["dayName"], "Sunday");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn save_to_unreachable_backend_reports_network() {
    timeout(TEST_TIMEOUT, async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let backend = HttpBackend::new(format!("http://127.0.0.1:{port}/"));
        let err = backend.save(&patient(), None).await.unwrap_err();

        assert!(
            matches!(&err, ServiceError::Network { endpoint, .. } if endpoint == "save-patient"),
            "{err:?}"
        );
    })
    .await
    .expect("test timed out");
}
