use crate::demo::{run_assess, run_demo, run_logout, run_status, run_tiers, AssessArgs, DemoArgs};
use crate::doctors::{run_doctors, DoctorsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use photoguard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "PhotoGuard",
    about = "Run the photosensitivity self-assessment from the terminal or as an HTTP service",
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
    /// Take the questionnaire interactively
    Assess(AssessArgs),
    /// Score a scripted answer sequence and print the triage result
    Demo(DemoArgs),
    /// Print the triage tier table
    Tiers,
    /// Show the stored phone number and latest assessment
    Status,
    /// Forget the stored phone number
    Logout,
    /// Manage saved doctor and pharmacist contacts
    Doctors(DoctorsArgs),
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
        Command::Assess(args) => run_assess(args),
        Command::Demo(args) => run_demo(args),
        Command::Tiers => run_tiers(),
        Command::Status => run_status(),
        Command::Logout => run_logout(),
        Command::Doctors(args) => run_doctors(args),
    }
}
