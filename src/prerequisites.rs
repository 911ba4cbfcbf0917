use std::io::Write;

use crate::command::{CommandRunner, CommandSpec};
use crate::report::Reporter;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Missing required tools ({}). Please install them and try again.", .0.join(", "))]
    MissingTools(Vec<String>),
}

pub const REQUIRED_TOOLS: [&str; 2] = ["sam", "aws"];

/// Queries every required tool's version. All tools are checked so the
/// operator sees every missing one at once.
pub fn check<R, O, E>(runner: &R, reporter: &mut Reporter<O, E>) -> Result<(), Error>
where
    R: CommandRunner,
    O: Write,
    E: Write,
{
    reporter.step("Checking prerequisites...");

    let mut missing = Vec::new();
    for tool in REQUIRED_TOOLS {
        let result = runner.run(&CommandSpec::new(tool).arg("--version"));
        if result.success {
            let version = first_line(&result.stdout);
            tracing::debug!(tool, version, "tool found");
            reporter.success(&format!("{}: {}", tool, version));
        } else {
            tracing::debug!(tool, stderr = %result.stderr.trim(), "tool missing");
            reporter.error(&format!("{} is not installed or not in PATH", tool));
            missing.push(tool.to_string());
        }
    }

    if !missing.is_empty() {
        return Err(Error::MissingTools(missing));
    }

    return Ok(());
}

fn first_line(text: &str) -> &str {
    return text.trim().lines().next().unwrap_or("");
}
