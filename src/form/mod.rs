//! Onboarding form: the data model, its decode stage, and the validation schema.
//!
//! Validation is pure. Any number of passes can run (one per keystroke, say)
//! without touching submission state.

pub mod field;
pub mod model;
pub mod schema;

pub use field::{Field, FieldError};
pub use model::{FormInput, Service};
pub use schema::{FieldRule, Schema, ValidationResult, validate};
