use std::fs;
use std::io::Write;
use std::path::Path;

use crate::outputs::Outputs;
use crate::report::Reporter;

pub const FRONTEND_URL: &str = "http://localhost:5173";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Failed to create {path}: {reason}")]
    WriteError { path: String, reason: String },
}

/// Each entry: comment line, variable name, stack output key.
const OUTPUT_VARIABLES: [(&str, &str, &str); 4] = [
    ("Cognito User Pool ID", "VITE_USER_POOL_ID", "UserPoolId"),
    ("Cognito User Pool Client ID", "VITE_USER_POOL_CLIENT_ID", "UserPoolClientId"),
    ("Cognito Hosted UI Domain", "VITE_USER_POOL_DOMAIN", "UserPoolDomain"),
    ("API Gateway Endpoint URL", "VITE_API_URL", "ApiUrl"),
];

pub fn render_env_file(outputs: &Outputs, region: &str) -> String {
    let mut contents = String::from(
        "# AWS Amplify Configuration\n# Auto-generated by deploy-and-configure\n",
    );

    for (comment, variable, key) in OUTPUT_VARIABLES {
        let value = outputs.get(key).map(String::as_str).unwrap_or("");
        contents.push_str(&format!("\n# {}\n{}={}\n", comment, variable, value));
    }

    contents.push_str(&format!(
        "\n# Frontend URL (using localhost for local development)\nVITE_FRONTEND_URL={}\n",
        FRONTEND_URL
    ));
    contents.push_str(&format!("\n# AWS Region\nVITE_AWS_REGION={}\n", region));

    return contents;
}

/// The `KEY=VALUE` lines of a rendered env file, split at the first `=`.
pub fn assignments(contents: &str) -> Vec<(&str, &str)> {
    return contents
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .collect();
}

pub fn write_env_file<O: Write, E: Write>(
    reporter: &mut Reporter<O, E>,
    path: &Path,
    outputs: &Outputs,
    region: &str,
) -> Result<(), Error> {
    reporter.step("Creating frontend .env file...");

    let contents = render_env_file(outputs, region);
    if let Err(error) = fs::write(path, &contents) {
        return Err(Error::WriteError {
            path: path.display().to_string(),
            reason: error.to_string(),
        });
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "env file written");
    reporter.success(&format!("Created {}", path.display()));

    reporter.heading("Environment variables configured:");
    for (key, value) in assignments(&contents) {
        reporter.line(&format!("  {}: {}", key, value));
    }

    return Ok(());
}

/// Stack outputs as `KEY=VALUE` lines for a CI system to capture.
pub fn render_ci_outputs(outputs: &Outputs) -> String {
    return outputs
        .iter()
        .fold(String::new(), |mut acc, (key, value)| {
            acc.push_str(&format!("{}={}\n", key, value));
            acc
        });
}
