mod cli;
mod demo;
mod infra;

use review_gate::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
