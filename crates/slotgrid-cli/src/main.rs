use clap::{Parser, Subcommand};

mod commands;
mod ops;

#[derive(Parser)]
#[command(
    name = "slotctl",
    about = "SlotGrid — spatial resource allocation engine",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a demo slotgrid.toml layout
    Init {
        /// Output file
        #[arg(short, long, default_value = "slotgrid.toml")]
        path: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load a layout, provision it, and print pool statistics
    Check {
        /// Layout file
        #[arg(short, long, default_value = "slotgrid.toml")]
        layout: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Apply a sequence of operations to a pool.
    ///
    /// Operations:
    ///   park:<car|motorcycle>:<owner>
    ///   leave:<owner>
    ///   free:<unit>
    ///   strategy:<first-match|best-fit|closest|most-available>
    ///   provision:<container>:<unit>:<class>:<cost>
    Run {
        /// Layout file to start from
        #[arg(short, long, default_value = "slotgrid.toml", conflicts_with = "resume")]
        layout: String,
        /// Resume from a JSON snapshot instead of a layout
        #[arg(long)]
        resume: Option<String>,
        /// Override the starting strategy
        #[arg(short, long)]
        strategy: Option<String>,
        /// Write the final pool state as a JSON snapshot
        #[arg(long)]
        save: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Operations to apply, in order
        ops: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slotgrid=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, force } => commands::init::init(&path, force),
        Commands::Check { layout, format } => commands::check::check(&layout, &format),
        Commands::Run {
            layout,
            resume,
            strategy,
            save,
            format,
            ops,
        } => {
            let source = match resume {
                Some(snapshot) => commands::run::Source::Snapshot(snapshot),
                None => commands::run::Source::Layout(layout),
            };
            commands::run::run(&source, strategy.as_deref(), &ops, save.as_deref(), &format)
        }
    }
}
