mod cli;
mod infra;
mod reconcile;
mod routes;
mod server;

use subscription_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
