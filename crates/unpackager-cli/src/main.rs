use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unpackager_core::prelude::*;

#[derive(Parser)]
#[command(name = "unpackager")]
#[command(version = unpackager_core::VERSION)]
#[command(about = "Convert a packaged WinUI/MAUI project into an unpackaged one")]
struct Cli {
    /// Path to the .csproj file
    project: Option<PathBuf>,

    /// JSON file with default options; flags given here take precedence
    #[arg(long = "config", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Spaces per nesting level when rewriting the project file [default: 2]
    #[arg(long)]
    indent: Option<usize>,

    /// Rewrite launchSettings.json as JSON instead of line by line
    #[arg(long)]
    structured_launch_settings: bool,

    /// Exit with a distinct non-zero status for each kind of failure
    #[arg(long)]
    strict_exit_codes: bool,

    /// Log each stage to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<UnpackConfig, UnpackError> {
        let mut config = match &self.config_file {
            Some(path) => UnpackConfig::load(path)?,
            None => UnpackConfig::default(),
        };
        if let Some(indent) = self.indent {
            config.indent = indent;
        }
        if self.structured_launch_settings {
            config.launch_settings_mode = LaunchSettingsMode::Structured;
        }
        if self.strict_exit_codes {
            config.exit_code_policy = ExitCodePolicy::PerKind;
        }
        Ok(config)
    }

    fn exit_code_policy(&self) -> ExitCodePolicy {
        if self.strict_exit_codes {
            ExitCodePolicy::PerKind
        } else {
            ExitCodePolicy::AlwaysSuccess
        }
    }
}

/// Initialize tracing on stderr; stdout carries the user-facing messages
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose {
        "unpackager=debug,unpackager_core=debug"
    } else {
        "unpackager=warn,unpackager_core=warn"
    };
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| default.into());
    let filter = tracing_subscriber::EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid RUST_LOG filter '{}'", directives))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(u8::try_from(status).unwrap_or(1))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e);
            return Ok(exit_code(cli.exit_code_policy().for_error(e.kind())));
        }
    };
    let policy = config.exit_code_policy;

    let Some(project) = cli.project else {
        println!("{}", UnpackError::Usage);
        return Ok(exit_code(policy.for_error(ErrorKind::Usage)));
    };

    match Unpackager::new(config).run(&project) {
        Ok(RunOutcome::Completed {
            script,
            target_framework,
            ..
        }) => {
            tracing::debug!(
                "Publish script {} targets {}",
                script.display(),
                target_framework
            );
            println!("MauiUnpackager completed successfully.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::NoTargetFramework) => {
            println!("No valid TargetFramework found in the csproj file.");
            Ok(exit_code(policy.for_no_target_framework()))
        }
        Err(e) => {
            println!("{}", e);
            Ok(exit_code(policy.for_error(e.kind())))
        }
    }
}
