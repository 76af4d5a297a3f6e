use crate::reconcile::{run_reconcile, ReconcileArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use subscription_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Subscription Intake",
    about = "Run the subscription-financing intake service or reconcile a roster export",
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
    /// Re-derive every status in a customer sheet export from its documents
    Reconcile(ReconcileArgs),
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
        Command::Reconcile(args) => run_reconcile(args),
    }
}
