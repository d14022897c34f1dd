//! Form data model and the decode stage from the wire format.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::DecodeError;

/// A service the client can request.
///
/// Declaration order is the canonical order used when serializing a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Service {
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Branding")]
    Branding,
    #[serde(rename = "Web Dev")]
    WebDev,
    #[serde(rename = "Mobile App")]
    MobileApp,
}

impl Service {
    /// All selectable services, in display order.
    pub const ALL: [Service; 4] = [
        Service::UiUx,
        Service::Branding,
        Service::WebDev,
        Service::MobileApp,
    ];

    /// The wire label for this service.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UiUx => "UI/UX",
            Self::Branding => "Branding",
            Self::WebDev => "Web Dev",
            Self::MobileApp => "Mobile App",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Service {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|svc| svc.label() == s)
            .ok_or_else(|| DecodeError::InvalidEnum {
                field: "services".to_string(),
                value: s.to_string(),
            })
    }
}

/// Raw, untrusted onboarding input as entered by the user.
///
/// Serializes to the canonical request body: camelCase keys, `services` as an
/// ordered array of labels, `budget` omitted when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub services: BTreeSet<Service>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_budget")]
    pub budget: Option<f64>,
    /// Calendar date as typed, normally `YYYY-MM-DD`.
    pub start_date: String,
    pub terms: bool,
}

/// Whole amounts go out as integers, so `2500` is sent back as `2500`.
fn serialize_budget<S: Serializer>(budget: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match *budget {
        Some(b) if b.fract() == 0.0 && b.abs() <= MAX_EXACT_INTEGER => s.serialize_i64(b as i64),
        Some(b) => s.serialize_f64(b),
        None => s.serialize_none(),
    }
}

/// Largest magnitude at which every whole `f64` is exact (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Wire shape accepted by the decode stage. Services stay as strings here so
/// unknown labels surface as `InvalidEnum` rather than a generic JSON error.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawFormInput {
    full_name: String,
    email: String,
    company_name: String,
    services: Vec<String>,
    budget: Option<f64>,
    start_date: String,
    terms: bool,
}

impl TryFrom<RawFormInput> for FormInput {
    type Error = DecodeError;

    fn try_from(raw: RawFormInput) -> Result<Self, Self::Error> {
        let services = raw
            .services
            .iter()
            .map(|label| label.parse::<Service>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            full_name: raw.full_name,
            email: raw.email,
            company_name: raw.company_name,
            services,
            budget: raw.budget,
            start_date: raw.start_date,
            terms: raw.terms,
        })
    }
}

impl FormInput {
    /// Decode a submitted JSON document.
    ///
    /// Missing fields decode to their empty defaults so the validator, not the
    /// decoder, reports them.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let raw: RawFormInput = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Canonical JSON request body.
    pub fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Toggle a service in the selection. Returns whether it is now selected.
    pub fn toggle_service(&mut self, service: Service) -> bool {
        if self.services.remove(&service) {
            false
        } else {
            self.services.insert(service);
            true
        }
    }

    /// Whether the form is still in its empty default shape.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}
