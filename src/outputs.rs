use std::collections::BTreeMap;
use std::io::Write;

use serde::Deserialize;

use crate::command::{CommandRunner, CommandSpec};
use crate::report::Reporter;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Failed to retrieve stack outputs: {0}")]
    ServiceError(String),

    #[error("Failed to parse stack outputs: {0}")]
    ParsingError(String),

    #[error("Stack {0} has no outputs")]
    NoOutputs(String),
}

/// Stack output values keyed by `OutputKey`.
pub type Outputs = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
struct StackOutput {
    #[serde(rename = "OutputKey")]
    key: String,

    #[serde(rename = "OutputValue")]
    value: String,
}

pub struct Stack {
    pub stack_name: String,

    profile: Option<String>,
    region: Option<String>,
}

impl Stack {
    pub fn new(stack_name: &str, profile: Option<&str>, region: Option<&str>) -> Self {
        return Self {
            stack_name: stack_name.to_string(),
            profile: profile.map(str::to_string),
            region: region.map(str::to_string),
        };
    }

    pub fn describe_command(&self) -> CommandSpec {
        let mut command = CommandSpec::new("aws").args(&[
            "cloudformation",
            "describe-stacks",
            "--stack-name",
            &self.stack_name,
            "--query",
            "Stacks[0].Outputs",
            "--output",
            "json",
        ]);

        if let Some(profile) = &self.profile {
            command = command.args(&["--profile", profile]);
        }
        if let Some(region) = &self.region {
            command = command.args(&["--region", region]);
        }

        return command.profile_env(self.profile.as_deref());
    }

    pub fn get_outputs<R, O, E>(
        &self,
        runner: &R,
        reporter: &mut Reporter<O, E>,
    ) -> Result<Outputs, Error>
    where
        R: CommandRunner,
        O: Write,
        E: Write,
    {
        reporter.step("Retrieving stack outputs...");

        let result = runner.run(&self.describe_command());
        if !result.success {
            let reason = match result.stderr.trim() {
                "" => "no error output",
                stderr => stderr,
            };
            return Err(Error::ServiceError(reason.to_string()));
        }

        let outputs = parse_outputs(&result.stdout)?;
        if outputs.is_empty() {
            return Err(Error::NoOutputs(self.stack_name.clone()));
        }

        let keys: Vec<&String> = outputs.keys().collect();
        tracing::debug!(stack = %self.stack_name, ?keys, "parsed outputs");
        reporter.success(&format!("Retrieved {} outputs", outputs.len()));

        return Ok(outputs);
    }
}

/// Turns the `Stacks[0].Outputs` JSON array into a map. Later records win
/// on duplicate keys.
pub fn parse_outputs(raw: &str) -> Result<Outputs, Error> {
    let records: Vec<StackOutput> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(error) => return Err(Error::ParsingError(error.to_string())),
    };

    let outputs = records
        .into_iter()
        .fold(Outputs::new(), |mut acc, output| {
            acc.insert(output.key, output.value);
            acc
        });

    return Ok(outputs);
}
