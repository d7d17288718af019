use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use devirt_config::DevirtConfig;
use devirt_descriptor::ProgramDescriptor;
use serde::Serialize;
use std::path::{Path, PathBuf};

mod report;

use report::{Analysis, CheckReport, ResolveReport, SpecializeReport};

#[derive(Parser)]
#[command(
    name = "devirt",
    version,
    about = "Whole-program method resolution and return-type specialization"
)]
struct Cli {
    /// Path to a `devirt.toml` config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the class hierarchy and report its size
    Check(ProgramArgs),
    /// Resolve every call site of a program
    Resolve(ProgramArgs),
    /// Compute covariant return-type specializations
    Specialize(ProgramArgs),
    /// Print the JSON schema of `devirt.toml`
    ConfigSchema,
}

#[derive(Args)]
struct ProgramArgs {
    /// Program description (JSON with `classes` and `call_sites`)
    program: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    devirt_config::init_tracing(&config.logging);

    match cli.command {
        Command::ConfigSchema => {
            print_output(&devirt_config::json_schema(), true)?;
            Ok(0)
        }
        Command::Check(args) => with_analysis(&config, &args, |analysis| {
            print_output(&CheckReport::new(analysis), args.json)
        }),
        Command::Resolve(args) => with_analysis(&config, &args, |analysis| {
            print_output(&ResolveReport::new(analysis, &config.analysis), args.json)
        }),
        Command::Specialize(args) => with_analysis(&config, &args, |analysis| {
            print_output(&SpecializeReport::new(analysis, &config.analysis), args.json)
        }),
    }
}

fn load_config(path: Option<&Path>) -> Result<DevirtConfig> {
    let Some(path) = path else {
        return Ok(DevirtConfig::default());
    };
    let (config, diagnostics) = DevirtConfig::load_from_path_with_diagnostics(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    for key in &diagnostics.unknown_keys {
        eprintln!("warning: unknown config key `{key}`");
    }
    for warning in &diagnostics.warnings {
        eprintln!("warning: {warning:?}");
    }
    if let Some(error) = diagnostics.errors.first() {
        anyhow::bail!("invalid config {}: {error:?}", path.display());
    }
    Ok(config)
}

/// Loads and analyzes a program. A malformed hierarchy is reported and exits with 1.
fn with_analysis(
    config: &DevirtConfig,
    args: &ProgramArgs,
    report: impl FnOnce(&Analysis) -> Result<()>,
) -> Result<i32> {
    let program = ProgramDescriptor::load_from_path(&args.program)
        .with_context(|| format!("loading program {}", args.program.display()))?;

    match Analysis::build(&program, &config.analysis) {
        Ok(analysis) => {
            report(&analysis)?;
            Ok(0)
        }
        Err(err) => {
            if args.json {
                print_output(&serde_json::json!({ "error": err.to_string() }), true)?;
            } else {
                eprintln!("error: {err}");
            }
            Ok(1)
        }
    }
}

fn print_output<T: Serialize + 'static>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
        return Ok(());
    }

    // Human output for the report types. Everything else falls back to pretty JSON.
    let any = value as &dyn std::any::Any;
    if let Some(report) = any.downcast_ref::<CheckReport>() {
        println!("root: {}", report.root_type);
        println!("  classes: {}", report.classes);
        println!("  external_classes: {}", report.external_classes);
        println!("  methods: {}", report.methods);
        println!("  call_sites: {}", report.call_sites);
    } else if let Some(report) = any.downcast_ref::<ResolveReport>() {
        for site in &report.call_sites {
            let detail = site
                .target
                .as_deref()
                .or(site.result_type.as_deref())
                .or(site.reason.as_deref())
                .unwrap_or("");
            let super_note = match site.desuperify {
                Some(true) => " (desuperify)",
                _ => "",
            };
            println!("{} [{}] {}: {detail}{super_note}", site.id, site.kind, site.status);
        }
        println!(
            "summary: {} resolved, {} unresolved, {} invalid",
            report.summary.resolved, report.summary.unresolved, report.summary.invalid
        );
    } else if let Some(report) = any.downcast_ref::<SpecializeReport>() {
        for slot in &report.slots {
            println!(
                "{}: {} {} -> {}",
                slot.method, slot.decision, slot.declared, slot.effective
            );
            if !slot.conflict_candidates.is_empty() {
                println!("  tied: {}", slot.conflict_candidates.join(", "));
            }
            if !slot.licensed_call_sites.is_empty() {
                println!("  call sites: {}", slot.licensed_call_sites.join(", "));
            }
        }
        println!(
            "summary: {} specialized, {} conflicts",
            report.summary.specialized, report.summary.conflicts
        );
    } else {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    }
    Ok(())
}
