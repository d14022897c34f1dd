//! Onboarding form — schema-driven validation and a single-shot submission
//! state machine for client onboarding.

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod submission;
