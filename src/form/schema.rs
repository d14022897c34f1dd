//! Declarative validation schema for the onboarding form.
//!
//! A `Schema` is an ordered list of `FieldRule`s. Every rule is evaluated on
//! every pass; the first failing rule for a field wins, so a field reports at
//! most one error while all fields are reported together.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate};
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::field::{Field, FieldError};
use super::model::FormInput;

pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 80;
pub const COMPANY_NAME_MIN: usize = 2;
pub const COMPANY_NAME_MAX: usize = 100;
pub const BUDGET_MIN: u32 = 100;
pub const BUDGET_MAX: u32 = 1_000_000;

static NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Alphabetic} '\-]+$").unwrap());

// Local part may not start with a dot or contain "..": checked outside the regex.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$").unwrap()
});

type Check = Box<dyn Fn(&FormInput, NaiveDate) -> Option<FieldError> + Send + Sync>;

/// A single predicate over the form, attributed to one field.
pub struct FieldRule {
    field: Field,
    check: Check,
}

impl FieldRule {
    /// A rule from an arbitrary predicate. `today` is the local calendar day.
    pub fn new<F>(field: Field, check: F) -> Self
    where
        F: Fn(&FormInput, NaiveDate) -> Option<FieldError> + Send + Sync + 'static,
    {
        Self {
            field,
            check: Box::new(check),
        }
    }

    /// Length bounds on a text field, counted in characters.
    pub fn length(field: Field, get: fn(&FormInput) -> &str, min: usize, max: usize) -> Self {
        Self::new(field, move |input, _| {
            let len = get(input).chars().count();
            if len < min {
                Some(FieldError::TooShort { min })
            } else if len > max {
                Some(FieldError::TooLong { max })
            } else {
                None
            }
        })
    }

    /// A text field must fully match `pattern`.
    pub fn pattern(
        field: Field,
        get: fn(&FormInput) -> &str,
        pattern: &'static LazyLock<Regex>,
        error: FieldError,
    ) -> Self {
        Self::new(field, move |input, _| {
            (!pattern.is_match(get(input))).then_some(error)
        })
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn check(&self, input: &FormInput, today: NaiveDate) -> Option<FieldError> {
        (self.check)(input, today)
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule").field("field", &self.field).finish()
    }
}

/// Field-level failures from one validation pass. Empty means acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationResult {
    /// Record a failure unless the field already has one.
    fn record(&mut self, field: Field, error: FieldError) {
        self.errors.entry(field).or_insert(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    /// Failing fields in display order.
    pub fn fields(&self) -> Vec<Field> {
        self.errors.keys().copied().collect()
    }

    /// Failures in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.errors.iter().map(|(f, e)| (*f, *e))
    }

    /// Wire key → human-readable message.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.errors
            .iter()
            .map(|(field, error)| (field.key(), error.to_string()))
            .collect()
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, error) in &self.errors {
            map.serialize_entry(field.key(), &error.to_string())?;
        }
        map.end()
    }
}

/// An ordered rule set. Holds no state between passes.
#[derive(Debug)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// The client-onboarding rule set.
    pub fn onboarding() -> Self {
        Self::new(vec![
            FieldRule::length(
                Field::FullName,
                |i| i.full_name.as_str(),
                FULL_NAME_MIN,
                FULL_NAME_MAX,
            ),
            FieldRule::pattern(
                Field::FullName,
                |i| i.full_name.as_str(),
                &NAME_CHARS,
                FieldError::InvalidCharacters,
            ),
            FieldRule::new(Field::Email, |i, _| {
                (!is_valid_email(&i.email)).then_some(FieldError::InvalidFormat)
            }),
            FieldRule::length(
                Field::CompanyName,
                |i| i.company_name.as_str(),
                COMPANY_NAME_MIN,
                COMPANY_NAME_MAX,
            ),
            FieldRule::new(Field::Services, |i, _| {
                i.services.is_empty().then_some(FieldError::EmptySelection)
            }),
            FieldRule::new(Field::Budget, |i, _| {
                let budget = i.budget?;
                let range = f64::from(BUDGET_MIN)..=f64::from(BUDGET_MAX);
                (!range.contains(&budget)).then_some(FieldError::OutOfRange {
                    min: BUDGET_MIN,
                    max: BUDGET_MAX,
                })
            }),
            FieldRule::new(Field::StartDate, |i, today| {
                match parse_start_date(&i.start_date) {
                    None => Some(FieldError::InvalidDate),
                    Some(date) if date < today => Some(FieldError::PastDate),
                    Some(_) => None,
                }
            }),
            FieldRule::new(Field::Terms, |i, _| {
                (!i.terms).then_some(FieldError::NotAccepted)
            }),
        ])
    }

    /// Validate against the local current day.
    pub fn validate(&self, input: &FormInput) -> ValidationResult {
        self.validate_on(input, today())
    }

    /// Validate with an explicit "today".
    pub fn validate_on(&self, input: &FormInput, today: NaiveDate) -> ValidationResult {
        let mut result = ValidationResult::default();
        for rule in &self.rules {
            if let Some(error) = rule.check(input, today) {
                result.record(rule.field, error);
            }
        }
        result
    }

    /// Run only the rules for one field, e.g. the field being edited.
    pub fn validate_field(&self, field: Field, input: &FormInput) -> Option<FieldError> {
        self.validate_field_on(field, input, today())
    }

    pub fn validate_field_on(
        &self,
        field: Field,
        input: &FormInput,
        today: NaiveDate,
    ) -> Option<FieldError> {
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .find_map(|rule| rule.check(input, today))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::onboarding()
    }
}

/// Validate with the onboarding schema against the local current day.
pub fn validate(input: &FormInput) -> ValidationResult {
    Schema::onboarding().validate(input)
}

/// The local calendar day (time of day dropped).
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a start date into a calendar day.
///
/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps; timestamps are converted to
/// the local zone before the time of day is dropped.
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    !local.starts_with('.') && !local.contains("..") && EMAIL.is_match(email)
}
