//! Doctor command - verify the model server, search provider and configuration.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::OllamaModel;
use crate::search::{DuckDuckGoSearch, SearchProvider};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("qotd Doctor");
    println!();
    println!("Checking model server, search provider and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Language Model").bold());
    let model_check = check_model(settings).await;
    model_check.print();
    checks.push(model_check);

    println!();

    println!("{}", style("Web Search").bold());
    let search_check = check_search(settings).await;
    search_check.print();
    checks.push(search_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![
        check_config_file(config_path),
        check_cors_origins(&settings.server.cors_origins),
        check_prompts(settings),
    ];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. The server will answer 503 until they are fixed.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! qotd is ready to serve quotes.");
    }

    Ok(())
}

/// Check that the model server answers and has the configured model.
async fn check_model(settings: &Settings) -> CheckResult {
    let name = format!("{} @ {}", settings.llm.model, settings.llm.base_url);

    let model = match OllamaModel::new(&settings.llm, settings.agent.temperature) {
        Ok(model) => model,
        Err(e) => return CheckResult::error(&name, &e.to_string(), "Check the [llm] section"),
    };

    match model.verify().await {
        Ok(()) => CheckResult::ok(&name, "available"),
        Err(e) => CheckResult::error(
            &name,
            &e.to_string(),
            &format!(
                "Start Ollama (https://ollama.com/) and run: ollama pull {}",
                settings.llm.model
            ),
        ),
    }
}

/// Run one real query against the search provider.
async fn check_search(settings: &Settings) -> CheckResult {
    let search = match DuckDuckGoSearch::new(&settings.search) {
        Ok(search) => search,
        Err(e) => {
            return CheckResult::error("Search endpoint", &e.to_string(), "Check [search] endpoint")
        }
    };

    let name = search.endpoint().to_string();
    match search.search("quote of the day").await {
        Ok(results) if results.starts_with("No results found") => CheckResult::warning(
            &name,
            "reachable but returned no results",
            "The result page layout may have changed, or requests are being throttled",
        ),
        Ok(_) => CheckResult::ok(&name, "reachable"),
        Err(e) => CheckResult::warning(
            &name,
            &e.to_string(),
            "The agent can still answer from the model's own knowledge",
        ),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: qotd config init",
        )
    }
}

/// Check that every CORS origin is usable as an exact-match header value.
fn check_cors_origins(origins: &[String]) -> CheckResult {
    if origins.is_empty() {
        return CheckResult::warning(
            "CORS origins",
            "none configured",
            "Browsers on other origins will be unable to call the API",
        );
    }

    let invalid: Vec<&str> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !is_exact_origin(o))
        .collect();

    if invalid.is_empty() {
        CheckResult::ok("CORS origins", &origins.join(", "))
    } else {
        CheckResult::error(
            "CORS origins",
            &format!("invalid: {}", invalid.join(", ")),
            "Use bare origins such as http://localhost:8000 (no wildcard, path or trailing slash)",
        )
    }
}

/// Browsers send `Origin` as scheme, host and port only, so anything else never matches.
fn is_exact_origin(origin: &str) -> bool {
    match url::Url::parse(origin) {
        Ok(url) => url.origin().is_tuple() && url.origin().ascii_serialization() == origin,
        Err(_) => false,
    }
}

/// Check that custom prompts, if any, load.
fn check_prompts(settings: &Settings) -> CheckResult {
    let Some(dir) = settings.prompts.custom_dir.as_deref() else {
        return CheckResult::ok("Prompts", "built-in");
    };

    match Prompts::load(Some(dir), Some(&settings.prompts.variables)) {
        Ok(_) => CheckResult::ok("Prompts", &format!("custom ({})", dir)),
        Err(e) => CheckResult::error("Prompts", &e.to_string(), "Fix or remove quote.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_default_cors_origins_pass() {
        let origins = Settings::default().server.cors_origins;
        assert_eq!(check_cors_origins(&origins).status, CheckStatus::Ok);
    }

    #[test]
    fn test_wildcard_and_garbage_origins_fail() {
        let origins = vec!["*".to_string(), "localhost".to_string()];
        let result = check_cors_origins(&origins);
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.message.contains('*'));
    }

    #[test]
    fn test_origins_with_paths_fail() {
        let origins = vec![
            "http://localhost:8000/".to_string(),
            "https://school.example/app".to_string(),
            "https://school.example".to_string(),
        ];
        let result = check_cors_origins(&origins);
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.message.contains("http://localhost:8000/"));
        assert!(result.message.contains("https://school.example/app"));
        assert!(!result.message.contains("https://school.example,"));
    }

    #[test]
    fn test_missing_config_file_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_config_file(&dir.path().join("config.toml"));
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[tokio::test]
    async fn test_unreachable_model_server_is_an_error() {
        let mut settings = Settings::default();
        // Port 9 (discard) is closed on test machines
        settings.llm.base_url = "http://127.0.0.1:9/v1".to_string();
        settings.llm.request_timeout_secs = 2;

        let result = check_model(&settings).await;
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.hint.unwrap().contains("ollama pull gemma:2b"));
    }
}
