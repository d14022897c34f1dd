//! SubmissionController: validate → serialize → send → interpret → update state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::form::{Field, FieldError, FormInput, Schema, ValidationResult};

use super::state::{SubmissionOutcome, SubmissionState, TRANSPORT_FAILURE};
use super::transport::OnboardingTransport;

/// Why `submit` returned without dispatching anything.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// Pre-flight gate: the form has field errors. Nothing was sent.
    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(ValidationResult),

    /// A submission is already outstanding.
    #[error("A submission is already in flight")]
    InFlight,
}

/// Snapshot for a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionStatus {
    pub busy: bool,
    #[serde(flatten)]
    pub state: SubmissionState,
    pub errors: ValidationResult,
}

/// Owns the form draft and the single `SubmissionState`.
///
/// The state lives in a `watch` channel: the controller is its only writer,
/// presentation layers observe it through `subscribe`.
pub struct SubmissionController {
    schema: Schema,
    transport: Arc<dyn OnboardingTransport>,
    form: RwLock<FormInput>,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionController {
    pub fn new(transport: Arc<dyn OnboardingTransport>) -> Self {
        Self::with_schema(transport, Schema::onboarding())
    }

    pub fn with_schema(transport: Arc<dyn OnboardingTransport>, schema: Schema) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            schema,
            transport,
            form: RwLock::new(FormInput::default()),
            state,
        }
    }

    // ── Form draft ──────────────────────────────────────────────────

    pub async fn form(&self) -> FormInput {
        self.form.read().await.clone()
    }

    pub async fn set_form(&self, input: FormInput) {
        *self.form.write().await = input;
    }

    /// Edit the draft in place, returning whatever `edit` returns.
    pub async fn update_form<F, T>(&self, edit: F) -> T
    where
        F: FnOnce(&mut FormInput) -> T,
    {
        let mut form = self.form.write().await;
        edit(&mut form)
    }

    /// Back to the empty default shape.
    pub async fn reset_form(&self) {
        *self.form.write().await = FormInput::default();
    }

    /// Validate the current draft.
    pub async fn validate(&self) -> ValidationResult {
        self.schema.validate(&*self.form.read().await)
    }

    /// Validate one field of the current draft.
    pub async fn validate_field(&self, field: Field) -> Option<FieldError> {
        self.schema.validate_field(field, &*self.form.read().await)
    }

    // ── State ───────────────────────────────────────────────────────

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub async fn status(&self) -> SubmissionStatus {
        let state = self.state();
        SubmissionStatus {
            busy: state.is_busy(),
            state,
            errors: self.validate().await,
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submit the current draft.
    pub async fn submit(&self) -> Result<SubmissionOutcome, SubmitError> {
        let input = self.form().await;
        self.submit_input(input).await
    }

    /// Submit `input`.
    ///
    /// Field errors and an outstanding submission both return `Err` without
    /// touching the network or the state. Otherwise exactly one request is
    /// sent and the state ends in `Success` or `Failure`.
    pub async fn submit_input(&self, input: FormInput) -> Result<SubmissionOutcome, SubmitError> {
        let errors = self.schema.validate(&input);
        if !errors.is_empty() {
            debug!(fields = ?errors.fields(), "Submission blocked by validation");
            return Err(SubmitError::Invalid(errors));
        }

        if !self.transition(SubmissionState::Submitting) {
            return Err(SubmitError::InFlight);
        }

        let attempt_id = Uuid::new_v4();
        let mut guard = InFlightGuard {
            state: &self.state,
            attempt_id,
            armed: true,
        };
        let outcome = self.dispatch(attempt_id, &input).await;

        if outcome.is_success() {
            self.reset_form().await;
        }
        guard.armed = false;
        if !self.transition(outcome.clone().into()) {
            warn!(%attempt_id, "Submission outcome could not be applied to state");
        }
        Ok(outcome)
    }

    async fn dispatch(&self, attempt_id: Uuid, input: &FormInput) -> SubmissionOutcome {
        let payload = match input.to_payload() {
            Ok(p) => p,
            Err(e) => {
                warn!(%attempt_id, error = %e, "Failed to serialize onboarding form");
                return SubmissionOutcome::fault(&e.to_string());
            }
        };

        info!(
            %attempt_id,
            services = input.services.len(),
            has_budget = input.budget.is_some(),
            "Dispatching onboarding submission"
        );

        match self.transport.post_json(&payload).await {
            Ok(resp) if resp.is_success() => {
                info!(%attempt_id, status = resp.status, "Onboarding submission accepted");
                SubmissionOutcome::Success(input.clone())
            }
            Ok(resp) => {
                warn!(
                    %attempt_id,
                    status = resp.status,
                    body = %resp.body.chars().take(200).collect::<String>(),
                    "Onboarding submission rejected"
                );
                SubmissionOutcome::rejected(&resp.body)
            }
            Err(e) => {
                warn!(%attempt_id, error = %e, "Onboarding submission failed in transport");
                SubmissionOutcome::fault(&e.to_string())
            }
        }
    }

    /// Apply `target` if legal from the current state. Atomic with respect to
    /// other callers; returns whether the state changed.
    fn transition(&self, target: SubmissionState) -> bool {
        self.state.send_if_modified(|current| {
            if current.can_transition_to(&target) {
                *current = target;
                true
            } else {
                false
            }
        })
    }
}

/// Settles an abandoned `Submitting` state as a failure.
///
/// Armed while a submission awaits the transport. If the caller drops the
/// `submit` future before the outcome is applied, the state would otherwise
/// stay busy and block every later submission.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<SubmissionState>,
    attempt_id: Uuid,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let settled = self.state.send_if_modified(|current| {
            if current.is_busy() {
                *current = SubmissionState::Failure(TRANSPORT_FAILURE.to_string());
                true
            } else {
                false
            }
        });
        if settled {
            warn!(attempt_id = %self.attempt_id, "Submission abandoned before a response arrived");
        }
    }
}
