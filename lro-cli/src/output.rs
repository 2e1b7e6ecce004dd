//! Terminal output helpers

use colored::*;
use lro_core::{PollingError, PollingStatus, ResponseSnapshot};

/// Print the outcome of a completed operation
pub fn print_success(status: PollingStatus, response: Option<&ResponseSnapshot>) {
    println!("{} {}", "✓".green(), colorize_status(status));

    if let Some(response) = response {
        println!("  HTTP Status: {}", response.status.to_string().dimmed());
        print_body(response);
    }
}

/// Print details of a polling failure
///
/// The error itself is reported by the caller's return value.
pub fn print_failure(error: &PollingError) {
    let label = match error {
        PollingError::Cancelled { .. } => colorize_status(PollingStatus::Cancelled),
        PollingError::Failed { .. } => colorize_status(PollingStatus::Failed),
        PollingError::DeadlineExceeded | PollingError::ContextCancelled => {
            "Outcome unknown".yellow()
        }
        _ => "Error".red(),
    };
    eprintln!("{} {}", "✗".red(), label);

    if let Some(response) = error.response() {
        eprintln!("  HTTP Status: {}", response.status.to_string().dimmed());
        print_body(response);
    }
}

fn print_body(response: &ResponseSnapshot) {
    match response.json() {
        Some(Ok(body)) => {
            if let Ok(pretty) = serde_json::to_string_pretty(&body) {
                println!("{}", pretty);
            }
        }
        Some(Err(_)) => println!("{}", response.body),
        None => {}
    }
}

/// Colorize polling status for display
fn colorize_status(status: PollingStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        PollingStatus::InProgress => status_str.cyan(),
        PollingStatus::Succeeded => status_str.green(),
        PollingStatus::Failed => status_str.red(),
        PollingStatus::Cancelled => status_str.dimmed(),
        PollingStatus::Unknown => status_str.yellow(),
    }
}
