use std::path::PathBuf;
use std::process::Command;

/// Set for every subprocess unless the parent environment already has them.
/// Keeps `sam` from prompting about telemetry and `aws` from paging output.
pub const ENV_DEFAULTS: [(&str, &str); 2] = [("SAM_CLI_TELEMETRY", "0"), ("AWS_PAGER", "")];

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: &str) -> Self {
        return Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        };
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        return self;
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|arg| arg.to_string()));
        return self;
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        return self;
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        return self;
    }

    /// Injects `AWS_PROFILE` when a profile was selected.
    pub fn profile_env(self, profile: Option<&str>) -> Self {
        match profile {
            Some(profile) => self.env("AWS_PROFILE", profile),
            None => self,
        }
    }

    /// The command line as an operator would type it.
    pub fn display(&self) -> String {
        let mut parts = vec![quote_arg(&self.program)];
        parts.extend(self.args.iter().map(|arg| quote_arg(arg)));
        return parts.join(" ");
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    if !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return arg.to_string();
    }
    return format!("'{}'", arg.replace('\'', "'\\''"));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl Invocation {
    #[cfg(test)]
    pub fn succeeded(stdout: &str) -> Self {
        return Self {
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        };
    }

    pub fn failed(stderr: &str) -> Self {
        return Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        };
    }
}

pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Invocation;
}

/// Runs commands as real blocking subprocesses.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Invocation {
        let mut command = platform_command(spec);

        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in ENV_DEFAULTS {
            if std::env::var_os(key).is_none() {
                command.env(key, value);
            }
        }
        for (key, value) in &spec.envs {
            command.env(key, value);
        }

        tracing::debug!(command = %spec.display(), cwd = ?spec.cwd, "spawning");

        let output = match command.output() {
            Ok(output) => output,
            Err(error) => {
                tracing::debug!(program = %spec.program, %error, "spawn failed");
                return Invocation::failed(&error.to_string());
            }
        };

        tracing::debug!(program = %spec.program, status = %output.status, "finished");

        return Invocation {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
    }
}

// `sam` and `aws` ship as .cmd shims on Windows, which only resolve through the shell.
#[cfg(windows)]
fn platform_command(spec: &CommandSpec) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(&spec.program).args(&spec.args);
    return command;
}

#[cfg(not(windows))]
fn platform_command(spec: &CommandSpec) -> Command {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args);
    return command;
}
