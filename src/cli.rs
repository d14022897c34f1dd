//! Terminal rendition of the onboarding form.
//!
//! Reads answers line by line, shows field errors as they are entered, and
//! drives the `SubmissionController` once the form validates.

use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::form::{Field, FormInput, Service, ValidationResult};
use crate::submission::{SubmissionController, SubmissionOutcome, SubmitError};

/// Lines typed by the user, trimmed.
pub type LineStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Stream stdin lines from a background task.
pub fn stdin_lines() -> LineStream {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}

/// Interactive prompt loop over a `SubmissionController`.
pub struct TerminalForm<W> {
    controller: Arc<SubmissionController>,
    lines: LineStream,
    out: W,
}

impl<W: Write> TerminalForm<W> {
    pub fn new(controller: Arc<SubmissionController>, lines: LineStream, out: W) -> Self {
        Self {
            controller,
            lines,
            out,
        }
    }

    /// Run until the endpoint accepts the form, the user declines to resubmit,
    /// or input ends. `None` means input ended before anything resolved.
    pub async fn run(&mut self) -> anyhow::Result<Option<SubmissionOutcome>> {
        let mut pending: Vec<Field> = Field::ALL.to_vec();

        loop {
            for field in pending.drain(..) {
                if !self.prompt_field(field).await? {
                    return Ok(None);
                }
            }

            match self.controller.submit().await {
                Err(SubmitError::Invalid(errors)) => {
                    self.show_errors(&errors)?;
                    pending = errors.fields();
                }
                Err(SubmitError::InFlight) => {
                    writeln!(self.out, "A submission is already in progress, waiting...")?;
                    let mut state = self.controller.subscribe();
                    state.wait_for(|s| !s.is_busy()).await?;
                }
                Ok(outcome @ SubmissionOutcome::Success(_)) => {
                    writeln!(self.out, "\n✅ Thanks! Your onboarding details were submitted.")?;
                    return Ok(Some(outcome));
                }
                Ok(SubmissionOutcome::Failure(message)) => {
                    writeln!(self.out, "\n❌ {message}")?;
                    write!(self.out, "Resubmit? [y/N] ")?;
                    self.out.flush()?;
                    match self.lines.next().await {
                        Some(answer) if is_yes(&answer) => continue,
                        _ => return Ok(Some(SubmissionOutcome::Failure(message))),
                    }
                }
            }
        }
    }

    /// Prompt until the answer can be stored in the field. Returns false on EOF.
    async fn prompt_field(&mut self, field: Field) -> anyhow::Result<bool> {
        if field == Field::Services {
            writeln!(self.out, "{}:", field.label())?;
            for (i, svc) in Service::ALL.iter().enumerate() {
                writeln!(self.out, "  {}) {}", i + 1, svc)?;
            }
        }

        loop {
            write!(self.out, "{}{} ", field.label(), prompt_hint(field))?;
            self.out.flush()?;

            let Some(answer) = self.lines.next().await else {
                return Ok(false);
            };

            let stored = self
                .controller
                .update_form(|form| apply_answer(field, answer, form))
                .await;

            match stored {
                Ok(()) => {
                    if let Some(error) = self.controller.validate_field(field).await {
                        writeln!(self.out, "  ⚠ {error}")?;
                    }
                    return Ok(true);
                }
                Err(message) => writeln!(self.out, "  ⚠ {message}")?,
            }
        }
    }

    fn show_errors(&mut self, errors: &ValidationResult) -> anyhow::Result<()> {
        writeln!(self.out, "\nPlease fix the following:")?;
        for (field, error) in errors.iter() {
            writeln!(self.out, "  • {}: {}", field.label(), error)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

/// Store a typed answer in `form`. Leaves the form untouched when the answer
/// cannot be parsed.
fn apply_answer(field: Field, answer: String, form: &mut FormInput) -> Result<(), String> {
    match field {
        Field::FullName => form.full_name = answer,
        Field::Email => form.email = answer,
        Field::CompanyName => form.company_name = answer,
        Field::StartDate => form.start_date = answer,
        Field::Services => form.services = parse_services(&answer)?.into_iter().collect(),
        Field::Budget => form.budget = parse_budget(&answer)?,
        Field::Terms => form.terms = is_yes(&answer),
    }
    Ok(())
}

fn prompt_hint(field: Field) -> &'static str {
    match field {
        Field::Services => " (numbers or names, comma-separated):",
        Field::Budget => " (leave blank to skip):",
        Field::Terms => " [y/N]:",
        _ => ":",
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Parse "1, 3" or "Web Dev, Branding" into services. Blank is an empty selection.
fn parse_services(answer: &str) -> Result<Vec<Service>, String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(n) if (1..=Service::ALL.len()).contains(&n) => Ok(Service::ALL[n - 1]),
            Ok(n) => Err(format!("{n} is not one of the listed options")),
            Err(_) => token.parse::<Service>().map_err(|e| e.to_string()),
        })
        .collect()
}

fn parse_budget(answer: &str) -> Result<Option<f64>, String> {
    let cleaned: String = answer.chars().filter(|c| !matches!(c, ',' | '_')).collect();
    if cleaned.trim().is_empty() {
        return Ok(None);
    }
    cleaned
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| "Enter a number".to_string())
}
