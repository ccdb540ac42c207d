//! haloshell - panel window host
//!
//! This is the main entry point for the haloshell coordinator/child
//! process.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use halo::native::fake::FakeNativeBackend;
use halo::native::NativeBackend;
use halo::Engine;
use halo_core::{logging, ContextDescriptor, HostConfig};

/// haloshell - panel window host
#[derive(Parser, Debug)]
#[command(name = "haloshell", version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (uses XDG lookup if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print example configuration and exit
    #[arg(long)]
    print_example_config: bool,

    /// Validate configuration and exit (returns non-zero on errors)
    #[arg(long)]
    check_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate configuration and exit
    CheckConfig,
    /// Print example configuration and exit
    PrintExampleConfig,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose, "info");

    if matches!(args.command, Some(Command::PrintExampleConfig)) || args.print_example_config {
        print!("{}", halo_core::config::DEFAULT_CONFIG_TOML);
        return ExitCode::SUCCESS;
    }

    let load_result = match HostConfig::find_and_load(args.config.as_deref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref source) = load_result.source {
        info!("loaded configuration from {:?}", source);
    } else if load_result.used_defaults {
        warn!("using default configuration (no config file found)");
    }

    if matches!(args.command, Some(Command::CheckConfig)) || args.check_config {
        if let Some(ref source) = load_result.source {
            println!("Configuration valid: {}", source.display());
        } else {
            println!("Configuration valid (using defaults)");
        }
        return ExitCode::SUCCESS;
    }

    run_host(load_result.config)
}

/// Build a real `NativeBackend` on a platform that has one, else fall
/// back to the in-memory backend with a loud warning: there is nowhere
/// for a non-macOS build to put a real window yet.
fn build_backend() -> Arc<dyn NativeBackend> {
    #[cfg(target_os = "macos")]
    {
        match halo::native::appkit::AppKitBackend::new() {
            Ok(backend) => return Arc::new(backend),
            Err(e) => warn!(error = %e, "failed to initialize AppKit backend, falling back to in-memory backend"),
        }
    }

    warn!("no native backend available on this platform, running with an in-memory backend");
    Arc::new(FakeNativeBackend::new())
}

fn run_host(config: HostConfig) -> ExitCode {
    let context = ContextDescriptor::from_env();
    debug!(?context, "resolved process context");

    let backend = build_backend();
    let (mut engine, handle, receiver) = Engine::new(backend, &config, &context);

    let socket_path = config.resolved_ipc_socket_path();
    if let Err(e) = halo::ipc::spawn(&socket_path, handle) {
        eprintln!("Error: failed to start IPC listener: {}", e);
        return ExitCode::FAILURE;
    }

    info!("haloshell engine running");
    engine.run(receiver);

    ExitCode::SUCCESS
}
