//! Command-line interface for the module loader.

mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use modreq_core::config::env_vars;
use modreq_core::diagnostics;
use modreq_core::prelude::*;

/// modreq - Load runtime modules and their dependencies.
#[derive(Parser, Debug)]
#[command(name = "modreq")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Module search path (defaults to $EPICS_DRIVER_PATH, then ".").
    #[arg(short, long, global = true)]
    path: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Load a module and its dependencies, then list loaded modules.
    Require {
        /// Module name.
        module: String,
        /// Version constraint; append '+' to accept newer compatible versions.
        version: Option<String>,
        /// Print loaded modules as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load a shared library by path.
    Ld {
        /// Path to the library.
        library: PathBuf,
    },
    /// Run a startup script of loader commands.
    Run {
        /// Script file; `iocInit` marks initialization complete.
        script: PathBuf,
        /// Print loaded modules as JSON when the script ends.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let search_path = match &args.path {
        Some(path) => SearchPathSource::Fixed(path.clone()),
        None => SearchPathSource::default(),
    };
    let config = LoaderConfig::default().with_search_path(search_path);
    let loader = Loader::new(config, Arc::new(DlLoader::new()), Arc::new(DbdFileLoader::new()));
    let requirer = Arc::new(Requirer::new(loader, Context::new()));
    requirer
        .context()
        .exit_hooks()
        .register(|| tracing::debug!("Exit handlers executing"));

    match args.command {
        Command::Require {
            module,
            version,
            json,
        } => run_require(&requirer, &module, version.as_deref().unwrap_or(""), json),
        Command::Ld { library } => {
            requirer.loader().load_library(&library)?;
            Ok(())
        }
        Command::Run { script, json } => run_script(requirer, &script, json),
    }
}

/// Set up tracing: human-readable by default, JSON when requested.
fn init_logging(verbose: bool) {
    let json_logging = std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_directive = if verbose { "modreq=debug" } else { "modreq=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact()
            .init();
    }
}

/// Load one module outside of startup: failures are reported, not fatal.
fn run_require(requirer: &Requirer, module: &str, version: &str, json: bool) -> Result<()> {
    requirer.context().mark_initialized();
    requirer
        .require(module, version)
        .with_context(|| format!("require {} {}", module, version))?;
    print_loaded(requirer, json)
}

/// Run each script line through the command table.
///
/// A failed `require` before `iocInit` aborts the process; other failures are
/// reported and the script continues.
fn run_script(requirer: Arc<Requirer>, script: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let commands = CommandTable::with_loader_commands(requirer.clone());

    for (number, line) in text.lines().enumerate() {
        let number = number + 1;
        let invocation = match script::parse_line(line) {
            Ok(Some(invocation)) => invocation,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}:{}: {}", script.display(), number, e);
                continue;
            }
        };

        if invocation.name == "iocInit" {
            if requirer.context().mark_initialized() {
                tracing::info!("initialization complete");
            }
            continue;
        }

        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
        match commands.dispatch(&invocation.name, &args) {
            Ok(output) if !output.is_empty() => println!("{}", output),
            Ok(_) => {}
            Err(e) => eprintln!("{}:{}: {}", script.display(), number, e),
        }
    }

    if json {
        print_loaded(&requirer, true)?;
    }
    requirer.context().exit_hooks().run_all();
    Ok(())
}

fn print_loaded(requirer: &Requirer, json: bool) -> Result<()> {
    let table = requirer.loader().table();
    if json {
        println!("{}", serde_json::to_string_pretty(&table.list())?);
    } else if !table.is_empty() {
        println!("{}", diagnostics::libversion_show(&table, None));
    }
    Ok(())
}
