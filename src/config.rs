use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use validator::{Validate, ValidationError};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_STACK_NAME: &str = "community-garden";
pub const DEFAULT_NAME: &str = "Community Garden App";
pub const DEFAULT_SETTINGS_FILE: &str = "deploy.yaml";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("Validation errors: {0}")]
    ValidationError(String),

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}

/// Project settings read from `deploy.yaml`. Every field is optional;
/// command-line flags take precedence.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[validate(length(min = 1))]
    pub profile: Option<String>,

    #[validate(length(min = 1))]
    pub region: Option<String>,

    #[validate(length(min = 1))]
    pub stack_name: Option<String>,

    pub backend_dir: Option<PathBuf>,

    pub frontend_dir: Option<PathBuf>,

    #[validate(custom = "validate_env_file")]
    pub env_file: Option<String>,
}

pub fn parse(path: &Path) -> Result<Settings, Error> {
    let contents = match fs::read_to_string(path) {
        Ok(raw_contents) => Ok(raw_contents),
        Err(error) => match error.kind() {
            io::ErrorKind::NotFound => Err(Error::FileNotFound(path.display().to_string())),
            _ => Err(Error::Unknown(error.to_string())),
        },
    }?;

    let settings: Settings = match serde_yaml::from_str(&contents) {
        Ok(data) => Ok(data),
        Err(error) => Err(Error::ParsingError(error.to_string())),
    }?;

    match settings.validate() {
        Ok(_) => (),
        Err(error) => return Err(Error::ValidationError(error.to_string())),
    }

    return Ok(settings);
}

/// Loads the explicit settings file, or `<root>/deploy.yaml` when it exists.
pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Settings, Error> {
    if let Some(path) = explicit {
        return parse(path);
    }

    let discovered = root.join(DEFAULT_SETTINGS_FILE);
    if discovered.is_file() {
        tracing::debug!(path = %discovered.display(), "using discovered settings file");
        return parse(&discovered);
    }

    return Ok(Settings::default());
}

fn validate_env_file(env_file: &str) -> Result<(), ValidationError> {
    if env_file.is_empty() || env_file == "." || env_file == ".." {
        return Err(ValidationError::new(
            "The env file has to be a plain file name",
        ));
    }
    if env_file.contains(|c: char| c == '/' || c == '\\') {
        return Err(ValidationError::new(
            "The env file has to be a file name inside the frontend directory",
        ));
    }

    return Ok(());
}

/// What the command line asked for, before settings and defaults apply.
#[derive(Debug, Default, Clone)]
pub struct Flags {
    pub root: PathBuf,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub stack_name: Option<String>,
    pub skip_build: bool,
    pub skip_deploy: bool,
    pub config_only: bool,
    pub ci: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub name: String,
    pub profile: Option<String>,
    pub region: String,
    pub stack_name: String,
    pub skip_build: bool,
    pub skip_deploy: bool,
    pub ci: bool,
    pub color: bool,
    pub backend_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub env_file: PathBuf,
}

impl RunConfig {
    /// `ci_env` is the value of the `CI` environment variable, if set.
    pub fn resolve(flags: Flags, settings: Settings, ci_env: Option<&str>, color: bool) -> Self {
        let backend_dir = flags
            .root
            .join(settings.backend_dir.unwrap_or_else(|| PathBuf::from("backend")));
        let frontend_dir = flags
            .root
            .join(settings.frontend_dir.unwrap_or_else(|| PathBuf::from("frontend")));
        let env_file = frontend_dir.join(settings.env_file.as_deref().unwrap_or(".env"));

        return Self {
            name: settings.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            profile: non_empty(flags.profile).or(settings.profile),
            region: non_empty(flags.region)
                .or(settings.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            stack_name: non_empty(flags.stack_name)
                .or(settings.stack_name)
                .unwrap_or_else(|| DEFAULT_STACK_NAME.to_string()),
            skip_build: flags.skip_build || flags.config_only,
            skip_deploy: flags.skip_deploy || flags.config_only,
            ci: flags.ci || ci_from_env(ci_env),
            color,
            backend_dir,
            frontend_dir,
            env_file,
        };
    }
}

// An empty flag (`--profile "$UNSET"`) means the flag was not given.
fn non_empty(value: Option<String>) -> Option<String> {
    return value.filter(|value| !value.is_empty());
}

pub fn ci_from_env(value: Option<&str>) -> bool {
    return match value {
        Some(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"),
        None => false,
    };
}
