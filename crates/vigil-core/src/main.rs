use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, Command};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vigil_core::{
    ConfigStore, EngineError, HostGraph, ModuleRegistry, Orchestrator, SceneDocument,
    TomlFileStore, ValidatorConfig,
};
use vigil_diagnostics::{DiagnosticCounters, DiagnosticRecord};
use vigil_model::Severity;

#[derive(Serialize)]
struct Report<'a> {
    records: Vec<&'a DiagnosticRecord>,
    counters: &'a DiagnosticCounters,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("vigil")
        .version(vigil_core::VERSION)
        .about("Validate a scene document")
        .subcommand_required(true)
        .subcommand(
            Command::new("scan")
                .about("Run a full scan and print the findings")
                .arg(
                    Arg::new("scene")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Scene document (JSON)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Validator configuration (TOML)"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Ignore filter settings"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("init-config")
                .about("Write the default configuration")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination file"),
                ),
        );

    let matches = cli.get_matches();
    let result = match matches.subcommand() {
        Some(("scan", args)) => match args.get_one::<PathBuf>("scene") {
            Some(scene) => scan(
                scene,
                args.get_one::<PathBuf>("config").map(PathBuf::as_path),
                args.get_flag("all"),
                args.get_flag("json"),
            ),
            None => Ok(ExitCode::FAILURE),
        },
        Some(("init-config", args)) => match args.get_one::<PathBuf>("path") {
            Some(path) => TomlFileStore::new(path)
                .save(&ValidatorConfig::default())
                .map(|()| ExitCode::SUCCESS),
            None => Ok(ExitCode::FAILURE),
        },
        _ => Ok(ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(%err, "vigil failed");
            ExitCode::FAILURE
        }
    }
}

fn scan(
    scene: &Path,
    config: Option<&Path>,
    all: bool,
    json: bool,
) -> Result<ExitCode, EngineError> {
    let config = match config {
        Some(path) => TomlFileStore::new(path).load()?,
        None => ValidatorConfig::default(),
    };
    let world = SceneDocument::load(scene)?.into_world()?;
    let registry = ModuleRegistry::with_defaults(world.features().clone());
    let mut orchestrator = Orchestrator::new(registry, config);
    orchestrator.run_full_scan(&world)?;

    let records: Vec<&DiagnosticRecord> = if all {
        orchestrator.records().iter().collect()
    } else {
        orchestrator.filtered(&orchestrator.pipeline())
    };

    if json {
        let report = Report {
            records,
            counters: orchestrator.counters(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for record in &records {
            println!("{record}");
        }
        let counters = orchestrator.counters();
        println!();
        println!(
            "{} containers, {} findings ({} errors, {} warnings, {} infos)",
            world.graph().len(),
            counters.total(),
            counters.severity(Severity::Error),
            counters.severity(Severity::Warning),
            counters.severity(Severity::Info),
        );
    }

    Ok(if orchestrator.counters().severity(Severity::Error) > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
