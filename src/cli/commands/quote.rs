//! Quote command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::quote::QuoteRequest;
use anyhow::Result;

/// Run the quote command.
pub async fn run_quote(
    topic: Option<String>,
    grade_level: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    let orchestrator = match Orchestrator::connect(&settings).await {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'qotd doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let request = QuoteRequest { topic, grade_level };
    let spinner = Output::spinner("Finding a quote...");

    match orchestrator.get_quote(&request).await {
        Ok(quote) => {
            spinner.finish_and_clear();
            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                Output::quote(&quote);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to get a quote: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
