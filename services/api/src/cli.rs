use crate::calculate::{run_calculate, run_demo, run_table, CalculateArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use unterhalt::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Kindesunterhalt",
    about = "Child support under the Duesseldorfer Tabelle for privately insured obligors",
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
    /// Calculate support for a household described in a JSON file
    Calculate(CalculateArgs),
    /// Calculate support for a built-in sample household
    Demo(DemoArgs),
    /// Print the loaded support table
    Table,
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
        Command::Calculate(args) => run_calculate(args),
        Command::Demo(args) => run_demo(args),
        Command::Table => run_table(),
    }
}
