use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use arch_guard::checks::{self, CheckSpec, REGISTRY};
use arch_guard::config::LinterConfig;
use arch_guard::error::ConfigError;
use arch_guard::reporter::{self, ColorChoice};

const LOG_ENV: &str = "ARCH_GUARD_LOG";

/// Architecture conformance checks for the monorepo.
#[derive(Debug, Parser)]
#[command(name = "arch-guard", version, about)]
struct Cli {
    /// Repository root; discovered from the current directory when omitted.
    #[arg(long, value_name = "PATH")]
    root_dir: Option<PathBuf>,

    /// Run only these checks (repeatable). See --list for ids.
    #[arg(long = "only", value_name = "CHECK_ID")]
    only: Vec<String>,

    /// Print every check id and name in run order, then exit.
    #[arg(long)]
    list: bool,

    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Run checks one at a time instead of on the thread pool.
    #[arg(long)]
    sequential: bool,

    /// Debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(root_dir: Option<PathBuf>) -> Result<LinterConfig, ConfigError> {
    match root_dir {
        Some(dir) => LinterConfig::from_explicit_root(&dir),
        None => LinterConfig::discover(),
    }
}

fn selected_checks(only: &[String]) -> Result<Vec<&'static CheckSpec>, clap::Error> {
    if only.is_empty() {
        return Ok(REGISTRY.iter().collect());
    }
    only.iter()
        .map(|id| {
            checks::find(id).ok_or_else(|| {
                let valid: Vec<&str> = REGISTRY.iter().map(|s| s.id).collect();
                Cli::command().error(
                    ErrorKind::InvalidValue,
                    format!("unknown check id '{id}'. Valid ids: {}", valid.join(", ")),
                )
            })
        })
        .collect()
}

fn print_list(out: &mut impl Write) -> io::Result<()> {
    for spec in REGISTRY {
        writeln!(out, "{:<26} {}", spec.id, spec.name)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        return match print_list(&mut io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    }

    let specs = match selected_checks(&cli.only) {
        Ok(specs) => specs,
        Err(e) => e.exit(),
    };

    let config = match resolve_config(cli.root_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(root = %config.root_dir.display(), checks = specs.len(), "starting run");

    let results = arch_guard::run_checks(&config, &specs, !cli.sequential);
    let freshness = checks::quality_grades_freshness::check(&config);

    let color = cli.color.enabled();
    if let Err(e) = reporter::render(&mut io::stdout().lock(), &results, &freshness, color) {
        tracing::error!(error = %e, "failed to write report");
        return ExitCode::FAILURE;
    }
    ExitCode::from(reporter::exit_code(&results))
}
