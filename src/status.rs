// Configuration status display: which settings are present, secrets masked.

use colored::Colorize;

use crate::config::Config;
use crate::inference::vertex;

/// One line of the status report.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub name: &'static str,
    pub value: Option<String>,
}

/// Collect the status lines for a config. Secrets are masked.
pub fn report(config: &Config) -> Vec<StatusLine> {
    vec![
        line("FB_USER_ID", present(&config.fb_user_id)),
        line("FB_ACCESS_TOKEN", present(&config.fb_access_token).map(mask)),
        line("GRAPH_API_URL", Some(config.graph_api_url.clone())),
        line("POST_LIMIT", Some(config.post_limit.to_string())),
        line("PROJECT_ID", present(&config.project_id)),
        line("LOCATION", present(&config.location)),
        line("MODEL_ENDPOINT", present(&config.model_endpoint)),
        line("GOOGLE_ACCESS_TOKEN", present(&config.google_access_token).map(mask)),
        line("GOOGLE_API_KEY", present(&config.google_api_key).map(mask)),
        line("OUTPUT_DIR", Some(config.output_dir.display().to_string())),
        line(
            "REQUEST_TIMEOUT_SECS",
            Some(config.request_timeout_secs.to_string()),
        ),
    ]
}

/// Display configuration status to the terminal.
pub fn show(config: &Config) {
    for entry in report(config) {
        match entry.value {
            Some(value) => println!("  {:<22} {}", entry.name, value),
            None => println!("  {:<22} {}", entry.name, "not set".yellow()),
        }
    }

    println!();
    if config.has_graph_credentials() {
        println!("Facebook: configured");
    } else {
        println!("Facebook: {}", "incomplete, /analyze will serve sample data".yellow());
    }

    match config.require_vertex() {
        Ok(()) => match vertex::resource_path(
            &config.project_id,
            &config.location,
            &config.model_endpoint,
        ) {
            Ok(path) => println!("Model: {path}"),
            Err(e) => println!("Model: {}", e.to_string().yellow()),
        },
        Err(e) => println!("Model: {}", e.to_string().red()),
    }
}

fn line(name: &'static str, value: Option<String>) -> StatusLine {
    StatusLine { name, value }
}

fn present(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Keep the first four characters of a secret, mask the rest.
fn mask(secret: String) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}
