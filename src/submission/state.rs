//! Submission state machine: Idle → Submitting → Success | Failure.

use serde::Serialize;

use crate::form::FormInput;

/// Message used when the endpoint rejects a submission with an empty body.
pub const GENERIC_FAILURE: &str = "Submit failed";
/// Message used when a transport fault carries no text of its own.
pub const TRANSPORT_FAILURE: &str = "Server error";

/// UI-visible lifecycle of a submission.
///
/// `Success` and `Failure` are variants of one enum, so they can never hold at
/// the same time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success(FormInput),
    Failure(String),
}

impl SubmissionState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, target),
            (Idle | Success(_) | Failure(_), Submitting) | (Submitting, Success(_) | Failure(_))
        )
    }

    /// True iff a submission is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Whether a call has resolved into a banner-worthy outcome.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }

    /// The resolved outcome, if any.
    pub fn outcome(&self) -> Option<SubmissionOutcome> {
        match self {
            Self::Success(input) => Some(SubmissionOutcome::Success(input.clone())),
            Self::Failure(message) => Some(SubmissionOutcome::Failure(message.clone())),
            Self::Idle | Self::Submitting => None,
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success(_) => "success",
            Self::Failure(_) => "failure",
        };
        write!(f, "{s}")
    }
}

/// How a dispatched submission resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// The endpoint accepted the payload.
    Success(FormInput),
    /// Rejected by the endpoint or lost in transit; the form-level message.
    Failure(String),
}

impl SubmissionOutcome {
    /// Failure from a non-2xx response body. Empty bodies get the generic message.
    pub fn rejected(body: &str) -> Self {
        if body.is_empty() {
            Self::Failure(GENERIC_FAILURE.to_string())
        } else {
            Self::Failure(body.to_string())
        }
    }

    /// Failure from a transport fault where no response was received.
    pub fn fault(message: &str) -> Self {
        if message.trim().is_empty() {
            Self::Failure(TRANSPORT_FAILURE.to_string())
        } else {
            Self::Failure(message.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<SubmissionOutcome> for SubmissionState {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Success(input) => Self::Success(input),
            SubmissionOutcome::Failure(message) => Self::Failure(message),
        }
    }
}
