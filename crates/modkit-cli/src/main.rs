use clap::{Parser, Subcommand};
use modkit::{
    commands::{clean, doctor, init, lifecycle, list, reload, specs},
    GlobalOpts,
};
use modkit_logger as logger;

#[derive(Parser)]
#[command(name = "modkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Application module registry",
    long_about = "modkit discovers application modules from package metadata and loose module files, tracks their install/enable state, and keeps the module manifest in sync."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List modules known to the registry
    List {
        /// Emit the full module set as JSON
        #[arg(long)]
        json: bool,
    },
    /// List build specs found in the specs directory
    Specs,
    /// Mark a module as installed
    Install { id: String },
    /// Mark a module as uninstalled (also disables it)
    Uninstall { id: String },
    /// Enable an installed module
    Enable {
        id: String,
        /// Install the module first if needed
        #[arg(long)]
        install: bool,
    },
    /// Disable a module without uninstalling it
    Disable { id: String },
    /// Re-run module discovery and rewrite the manifest
    Reload {
        /// Do not write the manifest after reloading
        #[arg(long)]
        no_cache: bool,
    },
    /// Forget all modules and delete the manifest
    Clean {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Check the registry setup and module health
    Doctor,
    /// Create a starter modkit.toml and the standard directories
    Init {
        /// Overwrite an existing modkit.toml
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {e}");
    }
    init_tracing(cli.global.verbosity_level());

    let result = match cli.command {
        Commands::List { json } => list::list_modules(&cli.global, json),
        Commands::Specs => specs::list_specs(&cli.global),
        Commands::Install { id } => lifecycle::install_module(&id, &cli.global),
        Commands::Uninstall { id } => lifecycle::uninstall_module(&id, &cli.global),
        Commands::Enable { id, install } => lifecycle::enable_module(&id, install, &cli.global),
        Commands::Disable { id } => lifecycle::disable_module(&id, &cli.global),
        Commands::Reload { no_cache } => reload::reload_modules(no_cache, &cli.global),
        Commands::Clean { yes } => clean::clean_manifest(yes, &cli.global),
        Commands::Doctor => doctor::run_doctor(&cli.global),
        Commands::Init { force } => init::handle_init(force, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&e);
        std::process::exit(1);
    }
}

/// Route library tracing through stderr so stdout stays parseable.
fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
