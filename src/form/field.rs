//! Form fields and the field-level failures the schema can report.

use serde::Serialize;

/// A field of the onboarding form.
///
/// Ordering follows the form's display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Email,
    CompanyName,
    Services,
    Budget,
    StartDate,
    Terms,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::FullName,
        Field::Email,
        Field::CompanyName,
        Field::Services,
        Field::Budget,
        Field::StartDate,
        Field::Terms,
    ];

    /// Wire key, matching the request body.
    pub fn key(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::CompanyName => "companyName",
            Self::Services => "services",
            Self::Budget => "budget",
            Self::StartDate => "startDate",
            Self::Terms => "terms",
        }
    }

    /// Human label used by prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullName => "Full name",
            Self::Email => "Email",
            Self::CompanyName => "Company name",
            Self::Services => "Services",
            Self::Budget => "Budget (optional)",
            Self::StartDate => "Start date (YYYY-MM-DD)",
            Self::Terms => "Accept terms",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a single field was rejected. `Display` is the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Must be at least {min} characters")]
    TooShort { min: usize },

    #[error("Must be at most {max} characters")]
    TooLong { max: usize },

    #[error("Only letters, spaces, apostrophes and hyphens are allowed")]
    InvalidCharacters,

    #[error("Enter a valid email address")]
    InvalidFormat,

    #[error("Select at least one service")]
    EmptySelection,

    #[error("Must be between {min} and {max}")]
    OutOfRange { min: u32, max: u32 },

    #[error("Enter a valid date")]
    InvalidDate,

    #[error("Start date cannot be in the past")]
    PastDate,

    #[error("You must accept the terms")]
    NotAccepted,
}
