use std::io::Write;
use std::path::PathBuf;

use crate::backend;
use crate::command::CommandRunner;
use crate::config::RunConfig;
use crate::outputs::{self, Outputs, Stack};
use crate::prerequisites;
use crate::report::Reporter;
use crate::writer::{self, FRONTEND_URL};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("{kind} directory not found: {}", .path.display())]
    MissingDirectory { kind: &'static str, path: PathBuf },

    #[error(transparent)]
    Prerequisites(#[from] prerequisites::Error),

    #[error(transparent)]
    Backend(#[from] backend::Error),

    #[error(transparent)]
    Outputs(#[from] outputs::Error),

    #[error(transparent)]
    Writer(#[from] writer::Error),
}

/// Which optional stages a run goes through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan {
    pub build: bool,
    pub deploy: bool,
    pub write_config: bool,
}

impl Plan {
    pub fn for_config(config: &RunConfig) -> Self {
        return Self {
            // Skipping the deploy makes a fresh build pointless.
            build: !config.skip_build && !config.skip_deploy,
            deploy: !config.skip_deploy,
            write_config: !config.ci,
        };
    }
}

pub fn run<R, O, E>(
    config: &RunConfig,
    runner: &R,
    reporter: &mut Reporter<O, E>,
) -> Result<(), Error>
where
    R: CommandRunner,
    O: Write,
    E: Write,
{
    check_directories(config)?;
    print_banner(config, reporter);

    prerequisites::check(runner, reporter)?;

    let plan = Plan::for_config(config);
    tracing::info!(?plan, ci = config.ci, "starting run");

    let profile = config.profile.as_deref();

    if plan.build {
        backend::build(runner, reporter, &config.backend_dir, profile, config.ci)?;
    } else {
        reporter.warning("Skipping build");
    }

    if plan.deploy {
        backend::deploy(
            runner,
            reporter,
            &config.backend_dir,
            profile,
            Some(config.region.as_str()),
            Some(config.stack_name.as_str()),
            config.ci,
        )?;
    } else {
        reporter.warning("Skipping deployment");
    }

    let stack = Stack::new(&config.stack_name, profile, Some(config.region.as_str()));
    let outputs = stack.get_outputs(runner, reporter)?;

    if plan.write_config {
        writer::write_env_file(reporter, &config.env_file, &outputs, &config.region)?;
        print_next_steps(config, reporter);
    } else {
        reporter.warning("CI mode: skipping frontend .env creation");
        emit_for_ci(&outputs, reporter);
    }

    return Ok(());
}

/// Prints a failed run's error, plus the captured output of a failed
/// backend command.
pub fn report_failure<O: Write, E: Write>(error: &Error, reporter: &mut Reporter<O, E>) {
    reporter.error(&error.to_string());

    if let Error::Backend(backend::Error::CommandFailed {
        command,
        stdout,
        stderr,
        ..
    }) = error
    {
        if !stdout.trim().is_empty() {
            reporter.line(stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            reporter.error_line(stderr.trim_end());
        }
        reporter.error(&format!("Command: {}", command));
    }
}

fn check_directories(config: &RunConfig) -> Result<(), Error> {
    let directories = [
        ("Backend", &config.backend_dir),
        ("Frontend", &config.frontend_dir),
    ];
    for (kind, path) in directories {
        if !path.is_dir() {
            return Err(Error::MissingDirectory {
                kind,
                path: path.clone(),
            });
        }
    }

    return Ok(());
}

fn print_banner<O: Write, E: Write>(config: &RunConfig, reporter: &mut Reporter<O, E>) {
    reporter.banner(&format!("{} - Deploy & Configure", config.name));
    reporter.line("");
    reporter.line(&format!("Backend:  {}", config.backend_dir.display()));
    reporter.line(&format!("Frontend: {}", config.frontend_dir.display()));
    reporter.line(&format!(
        "Profile:  {}",
        config.profile.as_deref().unwrap_or("(default)")
    ));
    reporter.line(&format!("Region:   {}", config.region));
    reporter.line(&format!("Stack:    {}", config.stack_name));
}

fn print_next_steps<O: Write, E: Write>(config: &RunConfig, reporter: &mut Reporter<O, E>) {
    let frontend = config
        .frontend_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "frontend".to_string());

    reporter.done("Deployment and configuration complete!");
    reporter.heading("Next steps:");
    reporter.line(&format!("  1. cd {}", frontend));
    reporter.line("  2. npm install (if not already done)");
    reporter.line("  3. npm run dev");
    reporter.heading(&format!("Frontend will be available at: {}", FRONTEND_URL));
}

fn emit_for_ci<O: Write, E: Write>(outputs: &Outputs, reporter: &mut Reporter<O, E>) {
    reporter.done("Deployment complete!");
    reporter.heading("Stack outputs:");
    for line in writer::render_ci_outputs(outputs).lines() {
        reporter.line(line);
    }
}
