use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub mod backend;
pub mod command;
pub mod config;
pub mod outputs;
pub mod pipeline;
pub mod prerequisites;
pub mod report;
pub mod writer;

use command::SystemRunner;
use config::{Flags, RunConfig};
use report::{Palette, Reporter};

#[derive(Parser)]
#[command(name = "deploy-and-configure")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deploy the backend stack and configure the frontend environment", long_about = None)]
struct Cli {
    /// AWS profile to use (default: AWS SDK/CLI default chain)
    #[arg(long)]
    profile: Option<String>,

    /// AWS region [default: us-east-1]
    #[arg(long)]
    region: Option<String>,

    /// CloudFormation stack name [default: community-garden]
    #[arg(long)]
    stack_name: Option<String>,

    /// Skip the build step (use existing build)
    #[arg(long)]
    skip_build: bool,

    /// Skip deployment (only update .env from existing stack)
    #[arg(long)]
    skip_deploy: bool,

    /// Only update frontend .env from existing stack (same as --skip-build --skip-deploy)
    #[arg(long)]
    config_only: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// CI mode: skip frontend .env creation and print outputs to stdout
    #[arg(long)]
    ci: bool,

    /// Project root containing the backend and frontend directories
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Settings file (default: <root>/deploy.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color = report::should_colorize(cli.no_color);

    let settings = match config::load(cli.config.as_deref(), &cli.root) {
        Ok(settings) => settings,
        Err(error) => {
            Reporter::stdio(Palette::new(color)).error(&error.to_string());
            return ExitCode::FAILURE;
        }
    };

    let flags = Flags {
        root: cli.root,
        profile: cli.profile,
        region: cli.region,
        stack_name: cli.stack_name,
        skip_build: cli.skip_build,
        skip_deploy: cli.skip_deploy,
        config_only: cli.config_only,
        ci: cli.ci,
    };
    let ci_env = std::env::var("CI").ok();
    let config = RunConfig::resolve(flags, settings, ci_env.as_deref(), color);
    tracing::debug!(?config, "resolved configuration");

    let mut reporter = Reporter::stdio(Palette::new(config.color));
    match pipeline::run(&config, &SystemRunner, &mut reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            pipeline::report_failure(&error, &mut reporter);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::Cli;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "deploy-and-configure",
            "--profile",
            "dev",
            "--region",
            "eu-west-1",
            "--stack-name",
            "garden",
            "--config-only",
            "--no-color",
            "--ci",
            "--root",
            "/app",
        ]);
        assert_eq!(Some("dev".to_string()), cli.profile);
        assert_eq!(Some("eu-west-1".to_string()), cli.region);
        assert_eq!(Some("garden".to_string()), cli.stack_name);
        assert_eq!(true, cli.config_only);
        assert_eq!(true, cli.no_color);
        assert_eq!(true, cli.ci);
        assert_eq!(std::path::PathBuf::from("/app"), cli.root);
    }

    #[test]
    fn defaults_leave_overrides_unset() {
        let cli = Cli::parse_from(["deploy-and-configure"]);
        assert_eq!(None, cli.region);
        assert_eq!(None, cli.stack_name);
        assert_eq!(false, cli.skip_build);
        assert_eq!(std::path::PathBuf::from("."), cli.root);
    }
}
