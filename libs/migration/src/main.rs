//! `cargo run -p migration -- up` applies the notes/tasks schema.

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
