use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

use proto_legacy::config::Config;
use proto_legacy::logging;
use proto_legacy::pipeline::Pipeline;
use proto_legacy::resolver::NameKind;

#[derive(Parser)]
#[command(name = "proto-legacy")]
#[command(about = "Generate deprecated aliases from the legacy proto package into the split wa* packages")]
#[command(version)]
struct Cli {
    /// Config file (defaults to proto-legacy.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the alias file (default)
    Generate {
        #[command(flatten)]
        paths: PathArgs,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resolve every legacy name and report all that fail
    Check {
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Show where a single legacy name resolves to
    Resolve {
        name: String,
        #[arg(long, value_enum, default_value_t = NameKind::Type)]
        kind: NameKind,
        /// Root directory of the split proto packages
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct PathArgs {
    /// Legacy type name list
    #[arg(long)]
    types: Option<PathBuf>,
    /// Legacy enum constant list
    #[arg(long)]
    enums: Option<PathBuf>,
    /// Root directory of the split proto packages
    #[arg(long)]
    corpus: Option<PathBuf>,
}

impl PathArgs {
    fn apply(self, config: &mut Config) {
        if let Some(types) = self.types {
            config.types_file = types;
        }
        if let Some(enums) = self.enums {
            config.enums_file = enums;
        }
        if let Some(corpus) = self.corpus {
            config.corpus_root = corpus;
        }
    }
}

fn run_generate(pipeline: &Pipeline, output: Option<PathBuf>) -> Result<()> {
    // Buffer the whole file so a failed run never truncates an existing output
    let mut buf = Vec::new();
    let summary = pipeline.generate(&mut buf)?;

    match output {
        Some(path) => {
            fs::write(&path, &buf).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "alias file written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(&buf).context("Failed to write to stdout")?;
            lock.flush()?;
        }
    }

    info!(
        modules = summary.modules_scanned,
        imports = summary.imports,
        types = summary.type_aliases,
        consts = summary.const_aliases,
        nested = summary.nested,
        "done"
    );
    Ok(())
}

fn run_check(pipeline: &Pipeline) -> Result<()> {
    let report = pipeline.check()?;
    for failure in &report.failures {
        eprintln!("{}", failure);
    }
    if !report.is_clean() {
        error!(
            resolved = report.resolved,
            unresolved = report.failures.len(),
            "legacy names failed to resolve"
        );
    }

    // Return instead of exiting: the log file guard in main flushes on drop
    let resolved = report.ensure_clean()?;
    println!("ok: {} names resolved", resolved);
    Ok(())
}

fn run_resolve(pipeline: &Pipeline, name: &str, kind: NameKind) -> Result<()> {
    let resolution = pipeline.resolve_one(name, kind)?;
    if resolution.nested {
        println!(
            "{} (nested under {})",
            resolution.qualified(),
            pipeline.config().container
        );
    } else {
        println!("{}", resolution.qualified());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose, cli.log_file.as_deref());

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Generate {
        paths: PathArgs::default(),
        output: None,
    }) {
        Commands::Generate { paths, output } => {
            paths.apply(&mut config);
            run_generate(&Pipeline::new(config), output)
        }
        Commands::Check { paths } => {
            paths.apply(&mut config);
            run_check(&Pipeline::new(config))
        }
        Commands::Resolve { name, kind, corpus } => {
            if let Some(corpus) = corpus {
                config.corpus_root = corpus;
            }
            run_resolve(&Pipeline::new(config), &name, kind)
        }
    }
}
