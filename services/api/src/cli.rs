use crate::demo::{run_banks, run_demo, BanksArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use skillgate::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Skillgate",
    about = "Run timed technical assessments over HTTP or from the command line",
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
    /// Inspect question banks and rehearse assessment sessions
    Assessment {
        #[command(subcommand)]
        command: AssessmentCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AssessmentCommand {
    /// List the available role banks with their budgets
    Banks(BanksArgs),
    /// Run a session end to end against a simulated clock
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
        Command::Assessment {
            command: AssessmentCommand::Banks(args),
        } => run_banks(args),
        Command::Assessment {
            command: AssessmentCommand::Demo(args),
        } => run_demo(args).await,
    }
}
