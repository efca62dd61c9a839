use crate::report::{print_questionnaire, run_rank_report, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use roommate_match::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Roommate Match",
    about = "Run the roommate matching service or score a candidate export from the command line",
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
    /// Rank a candidate CSV export for one viewer and summarize the pool
    Rank(RankArgs),
    /// Print the questionnaire in step order
    Questionnaire,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Candidate CSV export to enroll in the match pool at startup
    #[arg(long)]
    pub(crate) pool: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank_report(args),
        Command::Questionnaire => {
            print_questionnaire();
            Ok(())
        }
    }
}
