use crate::demo::{run_catalog, run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use urbanista::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Urbanista",
    about = "Run the property classifieds service and its CLI demos",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the offer kinds, property types, and rule buckets
    Catalog,
    /// Seed an in-memory repository and walk the create/search/media flows
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog => run_catalog(),
        Command::Demo(args) => run_demo(args),
    }
}
