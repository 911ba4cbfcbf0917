use std::io::Write;
use std::path::Path;

use crate::command::{CommandRunner, CommandSpec};
use crate::report::Reporter;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Backend {step} failed")]
    CommandFailed {
        step: &'static str,
        command: String,
        stdout: String,
        stderr: String,
    },
}

pub fn build_command(backend_dir: &Path, profile: Option<&str>, ci: bool) -> CommandSpec {
    let mut command = CommandSpec::new("sam").arg("build");
    if ci {
        command = command.arg("--debug");
    }

    return command.current_dir(backend_dir).profile_env(profile);
}

pub fn deploy_command(
    backend_dir: &Path,
    profile: Option<&str>,
    region: Option<&str>,
    stack_name: Option<&str>,
    ci: bool,
) -> CommandSpec {
    let mut command = CommandSpec::new("sam").args(&[
        "deploy",
        "--resolve-s3",
        "--capabilities",
        "CAPABILITY_IAM",
    ]);

    if let Some(profile) = profile {
        command = command.args(&["--profile", profile]);
    }
    if let Some(region) = region {
        command = command.args(&["--region", region]);
    }
    if let Some(stack_name) = stack_name {
        command = command.args(&["--stack-name", stack_name]);
    }
    if ci {
        command = command.args(&["--no-confirm-changeset", "--no-fail-on-empty-changeset"]);
    }

    return command.current_dir(backend_dir).profile_env(profile);
}

pub fn build<R, O, E>(
    runner: &R,
    reporter: &mut Reporter<O, E>,
    backend_dir: &Path,
    profile: Option<&str>,
    ci: bool,
) -> Result<(), Error>
where
    R: CommandRunner,
    O: Write,
    E: Write,
{
    reporter.step("Building backend...");
    run_step(runner, "build", &build_command(backend_dir, profile, ci))?;
    reporter.success("Backend built successfully");

    return Ok(());
}

pub fn deploy<R, O, E>(
    runner: &R,
    reporter: &mut Reporter<O, E>,
    backend_dir: &Path,
    profile: Option<&str>,
    region: Option<&str>,
    stack_name: Option<&str>,
    ci: bool,
) -> Result<(), Error>
where
    R: CommandRunner,
    O: Write,
    E: Write,
{
    reporter.step("Deploying backend...");
    let command = deploy_command(backend_dir, profile, region, stack_name, ci);
    run_step(runner, "deployment", &command)?;
    reporter.success("Backend deployed successfully");

    return Ok(());
}

fn run_step<R: CommandRunner>(
    runner: &R,
    step: &'static str,
    command: &CommandSpec,
) -> Result<(), Error> {
    let result = runner.run(command);
    if result.success {
        return Ok(());
    }

    tracing::debug!(step, command = %command.display(), "backend command failed");

    return Err(Error::CommandFailed {
        step,
        command: command.display(),
        stdout: result.stdout,
        stderr: result.stderr,
    });
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{build, build_command, deploy, deploy_command, Error};
    use crate::command::testing::ScriptedRunner;
    use crate::command::Invocation;
    use crate::report::{captured, contents};

    #[test]
    fn build_command_runs_in_backend_dir() {
        let command = build_command(Path::new("/app/backend"), None, false);
        assert_eq!("sam build", command.display());
        assert_eq!(Some(PathBuf::from("/app/backend")), command.cwd);
        assert_eq!(true, command.envs.is_empty());
    }

    #[test]
    fn build_command_in_ci_with_profile() {
        let command = build_command(Path::new("backend"), Some("dev"), true);
        assert_eq!("sam build --debug", command.display());
        assert_eq!(
            vec![("AWS_PROFILE".to_string(), "dev".to_string())],
            command.envs
        );
    }

    #[test]
    fn deploy_command_always_resolves_s3_and_acknowledges_iam() {
        let command = deploy_command(Path::new("backend"), None, None, None, false);
        assert_eq!(
            "sam deploy --resolve-s3 --capabilities CAPABILITY_IAM",
            command.display()
        );
    }

    #[test]
    fn deploy_command_with_everything() {
        let command = deploy_command(
            Path::new("backend"),
            Some("dev"),
            Some("eu-west-1"),
            Some("garden"),
            true,
        );
        assert_eq!(
            "sam deploy --resolve-s3 --capabilities CAPABILITY_IAM \
             --profile dev --region eu-west-1 --stack-name garden \
             --no-confirm-changeset --no-fail-on-empty-changeset",
            command.display()
        );
        assert_eq!(
            vec![("AWS_PROFILE".to_string(), "dev".to_string())],
            command.envs
        );
    }

    #[test]
    fn build_failure_carries_captured_output() {
        let runner = ScriptedRunner::new().respond(
            "sam build",
            Invocation {
                success: false,
                stdout: "Building codeuri\n".to_string(),
                stderr: "Error: Cargo build failed\n".to_string(),
            },
        );
        let mut reporter = captured();

        let result = build(&runner, &mut reporter, Path::new("backend"), None, false);
        assert_eq!(
            Err(Error::CommandFailed {
                step: "build",
                command: "sam build".to_string(),
                stdout: "Building codeuri\n".to_string(),
                stderr: "Error: Cargo build failed\n".to_string(),
            }),
            result
        );

        let (out, _) = contents(reporter);
        assert_eq!(false, out.contains("built successfully"));
    }

    #[test]
    fn deploy_success_is_reported() {
        let runner = ScriptedRunner::new();
        let mut reporter = captured();

        let result = deploy(
            &runner,
            &mut reporter,
            Path::new("backend"),
            None,
            Some("us-east-1"),
            Some("community-garden"),
            false,
        );
        assert_eq!(Ok(()), result);
        assert_eq!(1, runner.calls().len());

        let (out, _) = contents(reporter);
        assert_eq!(true, out.contains("+ Backend deployed successfully"));
    }

    #[test]
    fn deploy_failure_names_the_step() {
        let runner = ScriptedRunner::new().respond("sam deploy", Invocation::failed("denied"));
        let mut reporter = captured();

        let error = deploy(
            &runner,
            &mut reporter,
            Path::new("backend"),
            None,
            None,
            None,
            false,
        )
        .unwrap_err();
        assert_eq!("Backend deployment failed", error.to_string());
    }
}
