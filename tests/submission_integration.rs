//! Integration tests for the submission flow over real HTTP.
//!
//! Each test spins up an Axum stub of the onboarding endpoint on a random
//! port and drives a `SubmissionController` through `HttpTransport`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::Router;
use reqwest::Url;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;

use onboarding_form::config::OnboardingConfig;
use onboarding_form::form::schema::today;
use onboarding_form::form::{Field, FormInput, Service};
use onboarding_form::submission::{
    HttpTransport, SubmissionController, SubmissionOutcome, SubmissionState, SubmitError,
};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What the stub endpoint saw.
#[derive(Debug, Clone)]
struct Received {
    content_type: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct StubEndpoint {
    status: StatusCode,
    reply: &'static str,
    hits: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Received>>>,
}

impl StubEndpoint {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last(&self) -> Received {
        self.received.lock().unwrap().last().cloned().expect("no request received")
    }
}

async fn handle(
    State(stub): State<StubEndpoint>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = serde_json::from_str(&body).unwrap_or(Value::Null);
    stub.received
        .lock()
        .unwrap()
        .push(Received { content_type, body });
    (stub.status, stub.reply)
}

/// Start a stub endpoint on a random port, return (endpoint url, stub).
async fn start_endpoint(status: StatusCode, reply: &'static str) -> (Url, StubEndpoint) {
    let stub = StubEndpoint {
        status,
        reply,
        hits: Arc::new(AtomicUsize::new(0)),
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/api/onboarding", post(handle))
        .with_state(stub.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let url = Url::parse(&format!("http://127.0.0.1:{port}/api/onboarding")).unwrap();
    (url, stub)
}

fn controller_for(endpoint: Url) -> SubmissionController {
    let transport = HttpTransport::new(&OnboardingConfig::new(endpoint)).unwrap();
    SubmissionController::new(Arc::new(transport))
}

/// Scenario input: Jane Doe at Acme Co, Web Dev, starting today.
fn jane() -> FormInput {
    FormInput {
        full_name: "Jane Doe".into(),
        email: "jane@acme.com".into(),
        company_name: "Acme Co".into(),
        services: [Service::WebDev].into_iter().collect(),
        budget: None,
        start_date: today().to_string(),
        terms: true,
    }
}

#[tokio::test]
async fn accepted_submission_resets_form() {
    timeout(TEST_TIMEOUT, async {
        let (url, stub) = start_endpoint(StatusCode::OK, "").await;
        let controller = controller_for(url);
        controller.set_form(jane()).await;

        let outcome = controller.submit().await.unwrap();

        assert_eq!(outcome, SubmissionOutcome::Success(jane()));
        assert_eq!(controller.state(), SubmissionState::Success(jane()));
        assert_eq!(controller.form().await, FormInput::default());
        assert!(!controller.is_busy());
        assert_eq!(stub.hits(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn request_is_canonical_json() {
    timeout(TEST_TIMEOUT, async {
        let (url, stub) = start_endpoint(StatusCode::CREATED, "").await;
        let controller = controller_for(url);
        let input = FormInput {
            services: [Service::MobileApp, Service::UiUx].into_iter().collect(),
            budget: Some(25_000.0),
            ..jane()
        };

        controller.submit_input(input).await.unwrap();

        let received = stub.last();
        assert_eq!(received.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            received.body,
            serde_json::json!({
                "fullName": "Jane Doe",
                "email": "jane@acme.com",
                "companyName": "Acme Co",
                "services": ["UI/UX", "Mobile App"],
                "budget": 25000,
                "startDate": today().to_string(),
                "terms": true,
            })
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn absent_budget_is_omitted_from_request() {
    timeout(TEST_TIMEOUT, async {
        let (url, stub) = start_endpoint(StatusCode::OK, "").await;
        controller_for(url).submit_input(jane()).await.unwrap();
        assert!(stub.last().body.get("budget").is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn server_error_surfaces_body_and_keeps_form() {
    timeout(TEST_TIMEOUT, async {
        let (url, stub) = start_endpoint(StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded").await;
        let controller = controller_for(url);
        controller.set_form(jane()).await;

        let outcome = controller.submit().await.unwrap();

        assert_eq!(outcome, SubmissionOutcome::Failure("quota exceeded".into()));
        assert_eq!(
            controller.state(),
            SubmissionState::Failure("quota exceeded".into())
        );
        assert_eq!(controller.form().await, jane());
        assert_eq!(stub.hits(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_error_body_uses_generic_message() {
    timeout(TEST_TIMEOUT, async {
        let (url, _stub) = start_endpoint(StatusCode::BAD_REQUEST, "").await;
        let outcome = controller_for(url).submit_input(jane()).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Failure("Submit failed".into()));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_services_blocks_without_network_call() {
    timeout(TEST_TIMEOUT, async {
        let (url, stub) = start_endpoint(StatusCode::OK, "").await;
        let controller = controller_for(url);
        controller
            .set_form(FormInput {
                services: Default::default(),
                ..jane()
            })
            .await;

        let err = controller.submit().await.unwrap_err();

        match err {
            SubmitError::Invalid(errors) => {
                assert_eq!(errors.fields(), vec![Field::Services]);
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(stub.hits(), 0);
        assert_eq!(controller.state(), SubmissionState::Idle);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_endpoint_becomes_failure() {
    timeout(TEST_TIMEOUT, async {
        // Reserve a port, then close it so nothing is listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = Url::parse(&format!("http://127.0.0.1:{port}/api/onboarding")).unwrap();
        let controller = controller_for(url);
        controller.set_form(jane()).await;

        let outcome = controller.submit().await.unwrap();

        match outcome {
            SubmissionOutcome::Failure(message) => assert!(!message.is_empty()),
            other => panic!("expected Failure, got {other:?}"),
        }
        // The draft survives so the user can retry.
        assert_eq!(controller.form().await, jane());
        assert!(!controller.is_busy());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn retry_after_failure_sends_a_fresh_request() {
    timeout(TEST_TIMEOUT, async {
        let (url, stub) = start_endpoint(StatusCode::SERVICE_UNAVAILABLE, "maintenance").await;
        let controller = controller_for(url);
        controller.set_form(jane()).await;

        controller.submit().await.unwrap();
        assert_eq!(stub.hits(), 1, "no automatic retry");

        controller.submit().await.unwrap();
        assert_eq!(stub.hits(), 2);
    })
    .await
    .expect("test timed out");
}
