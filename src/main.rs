use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use onboarding_form::cli::{TerminalForm, stdin_lines};
use onboarding_form::config::ENDPOINT_ENV;
use onboarding_form::form::FormInput;
use onboarding_form::submission::{
    HttpTransport, SubmissionController, SubmissionOutcome, SubmitError,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let transport = HttpTransport::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export {ENDPOINT_ENV}=https://example.com/api/onboarding");
        std::process::exit(1);
    });

    eprintln!("📝 Client onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Endpoint: {}\n", transport.endpoint());

    let transport = Arc::new(transport);
    let controller = Arc::new(SubmissionController::new(transport));

    let outcome = match json_path_arg() {
        Some(path) => submit_file(&controller, &path).await?,
        None => {
            let mut form = TerminalForm::new(Arc::clone(&controller), stdin_lines(), std::io::stderr());
            form.run().await?
        }
    };

    Ok(match outcome {
        Some(SubmissionOutcome::Success(_)) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// `--json <file>`: submit a prepared document instead of prompting.
fn json_path_arg() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--json" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--json=") {
            return Some(path.to_string());
        }
    }
    None
}

async fn submit_file(
    controller: &SubmissionController,
    path: &str,
) -> anyhow::Result<Option<SubmissionOutcome>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let input = FormInput::from_json(&raw).with_context(|| format!("decoding {path}"))?;
    controller.set_form(input).await;

    match controller.submit().await {
        Ok(SubmissionOutcome::Success(input)) => {
            println!("Submitted onboarding for {}", input.company_name);
            Ok(Some(SubmissionOutcome::Success(input)))
        }
        Ok(SubmissionOutcome::Failure(message)) => {
            eprintln!("Submission failed: {message}");
            Ok(Some(SubmissionOutcome::Failure(message)))
        }
        Err(SubmitError::Invalid(errors)) => {
            eprintln!("{}", serde_json::to_string_pretty(&errors)?);
            Ok(None)
        }
        Err(e @ SubmitError::InFlight) => Err(e.into()),
    }
}
