use crate::demo::{run_demo, run_scoring_preview, DemoArgs, ScoringPreviewArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use talent_grid::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Talent Grid",
    about = "Run and demonstrate the sales competency management service from the command line",
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
    /// Inspect the scoring model without touching any stored data
    Scoring {
        #[command(subcommand)]
        command: ScoringCommand,
    },
    /// Run an end-to-end CLI demo covering versioning and assessments
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ScoringCommand {
    /// Classify a synthetic score sheet against the built-in demo framework
    Preview(ScoringPreviewArgs),
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
        Command::Scoring {
            command: ScoringCommand::Preview(args),
        } => run_scoring_preview(args),
        Command::Demo(args) => run_demo(args),
    }
}
