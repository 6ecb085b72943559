//! gpuexpose - GPU visibility resolver
//!
//! Resolves the GPU selection for a container launch and exposes the
//! matching NVIDIA device nodes and driver libraries.

use clap::Parser;
use gpuexpose::cli::args::{generate_completions, Cli, Commands};
use gpuexpose::commands::{run_apply, run_inventory, run_plan};
use gpuexpose::config::{Config, ConfigBuilder};
use gpuexpose::error::{AppError, ExposureError, InventoryError};

fn main() {
    let cli = Cli::parse();

    // Config is loaded first so its verbose flag can pick the log level
    let config = load_config(&cli);
    let verbose = cli.verbose || config.as_ref().is_ok_and(|c| c.general.verbose);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .format_timestamp(None)
    .init();

    let result = config.and_then(|config| run(&cli, &config));

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    match &cli.command {
        Commands::Plan(args) => run_plan(args, config, cli.format),

        Commands::Apply(args) => run_apply(args, config, cli.format),

        Commands::Inventory => run_inventory(config, cli.format),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_verbose(cli.verbose.then_some(true))
        .with_dry_run(cli.dry_run.then_some(true))
        .with_device_dir(cli.device_dir.clone())
        .with_library_dirs(cli.library_dirs.clone())
        .build()?;

    Ok(config)
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Exposure(e)
            if e.io_source().map(|s| s.kind()) == Some(std::io::ErrorKind::PermissionDenied) =>
        {
            eprintln!();
            eprintln!("Hint: Bind mounts need root (CAP_SYS_ADMIN).");
            eprintln!("      Use --mode copy to stage files without privileges.");
        }
        AppError::Exposure(ExposureError::InvalidRootfs(_)) => {
            eprintln!();
            eprintln!("Hint: --rootfs must point at the container's root directory.");
        }
        AppError::Exposure(ExposureError::SymlinkInRootfs(_)) => {
            eprintln!();
            eprintln!("Hint: The image ships this path as a symlink; GPU support needs a real directory there.");
        }
        AppError::Inventory(InventoryError::DeviceDirUnreadable { .. }) => {
            eprintln!();
            eprintln!("Hint: Check --device-dir or [host] device_dir in the config file.");
        }
        _ => {}
    }
}
