mod cli;
mod demo;
mod doctors;
mod infra;
mod routes;
mod server;

use photoguard::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
