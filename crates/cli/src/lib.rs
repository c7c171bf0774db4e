use anyhow::{Context as AnyhowContext, Result};
use ccg_graph::{repository_name, GraphAssembler, GraphError};
use ccg_indexer::IndexerError;
use clap::error::ErrorKind;
use clap::Parser;
use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;

pub use config::{AnalyzerConfig, ConfigError, ENV_JOBS, ENV_OUTPUT_DIR, ENV_SOURCE_SUFFIX};

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_PATH_NOT_FOUND: u8 = 2;
pub const EXIT_WRITE: u8 = 3;
pub const EXIT_CONFIG: u8 = 4;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "ccg")]
#[command(about = "Build a code context graph (declarations and call edges) for a source tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to scan
    path: PathBuf,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base directory for <repository>/ccg.json (default: ./outputs)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Worker threads for parsing (1 = sequential, 0 = one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Source file-name suffix (default: the language's, e.g. .py)
    #[arg(long)]
    suffix: Option<String>,

    /// Do not descend into symlinked directories
    #[arg(long)]
    no_follow_symlinks: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

pub fn main_entry() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    config.apply_env(|name| env::var(name).ok())?;

    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if let Some(suffix) = &cli.suffix {
        config.source_suffix = Some(suffix.clone());
    }
    if cli.no_follow_symlinks {
        config.follow_symlinks = false;
    }

    log::debug!("Effective config: {config:?}");
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir().context("Failed to resolve working directory")?;
    let config = resolve_config(&cli)?;
    let options = config.assembler_options()?;

    ccg_indexer::ensure_root(&cli.path)?;
    print_stdout(&format!(
        "[ccg] Analyzing {} files in {} ...",
        options.language,
        cli.path.display()
    ))?;

    let (graph, stats) = GraphAssembler::new(options).assemble(&cli.path)?;

    let repository = repository_name(&cli.path);
    let out_path = config.output_layout(&cwd).write(&repository, &graph)?;

    print_stdout(&format!(
        "[ccg] CCG written to {} ({} files, {} edges, {} parse failures)",
        out_path.display(),
        stats.files,
        stats.edges,
        stats.parse_failures
    ))?;
    Ok(())
}

/// Exit status for a fatal error, chosen from the first recognised cause
fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(IndexerError::PathNotFound(_)) = cause.downcast_ref::<IndexerError>() {
            return EXIT_PATH_NOT_FOUND;
        }
        if let Some(GraphError::Write { .. } | GraphError::Serialize(_)) =
            cause.downcast_ref::<GraphError>()
        {
            return EXIT_WRITE;
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_CONFIG;
        }
    }
    EXIT_USAGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn exit_codes_follow_error_chain() {
        let missing = anyhow::Error::new(GraphError::Discovery(IndexerError::PathNotFound(
            PathBuf::from("nope"),
        )));
        assert_eq!(exit_code(&missing), EXIT_PATH_NOT_FOUND);

        let write = anyhow::Error::new(GraphError::write(
            Path::new("out/ccg.json"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ))
        .context("while saving");
        assert_eq!(exit_code(&write), EXIT_WRITE);

        let config = anyhow::Error::new(ConfigError::EmptySuffix);
        assert_eq!(exit_code(&config), EXIT_CONFIG);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), EXIT_USAGE);
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::try_parse_from([
            "ccg",
            "repo",
            "--jobs",
            "3",
            "--suffix",
            ".pyi",
            "--no-follow-symlinks",
        ])
        .unwrap();
        assert_eq!(cli.path, PathBuf::from("repo"));
        assert_eq!(cli.jobs, Some(3));
        assert_eq!(cli.suffix.as_deref(), Some(".pyi"));
        assert!(cli.no_follow_symlinks);

        let err = Cli::try_parse_from(["ccg"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
