//! `starq capture`: submit a short-form lead.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Instrument;

use starclean_observe::lead_attrs;
use starclean_types::error::BookingError;
use starclean_types::quote::LeadCapture;

use crate::state::AppState;

/// Post a capture to the lead webhook.
///
/// A delivery failure prints the fallback phone number and still exits with
/// an error.
pub async fn capture_lead(state: &AppState, capture: LeadCapture, json: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Sending your request...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let span = tracing::info_span!(
        lead_attrs::OP_CAPTURE_LEAD,
        { lead_attrs::LEAD_FORM_SOURCE } = %capture.form_source,
        { lead_attrs::LEAD_STAGE } = "Lead Captured",
    );
    let result = state.engine.capture(&capture).instrument(span).await;
    spinner.finish_and_clear();

    let payload = match result {
        Ok(payload) => payload,
        Err(e) => {
            if !json {
                print_failure(&e);
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Thanks {}! We'll be in touch shortly.",
        style("✓").green().bold(),
        style(&capture.first_name).cyan()
    );
    println!(
        "  {}",
        style(format!("stage: {} | source: {}", payload.stage, capture.form_source)).dim()
    );
    println!();

    Ok(())
}

/// Styled error line, with the call-us fallback for delivery failures.
pub(crate) fn print_failure(error: &BookingError) {
    println!();
    match error {
        BookingError::Submission { fallback_phone, .. } => {
            println!(
                "  {} We couldn't send your request.",
                style("✗").red().bold()
            );
            println!(
                "  Please call us directly at {}",
                style(fallback_phone).yellow().bold()
            );
        }
        BookingError::Wizard(e) => {
            println!("  {} {e}", style("✗").red().bold());
        }
    }
    println!();
}
