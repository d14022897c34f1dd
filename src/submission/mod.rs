//! Submission: the controller, its state machine, and the outbound transport.

pub mod controller;
pub mod state;
pub mod transport;

pub use controller::{SubmissionController, SubmissionStatus, SubmitError};
pub use state::{SubmissionOutcome, SubmissionState};
pub use transport::{HttpTransport, OnboardingTransport, TransportResponse};
