use sea_orm_migration::prelude::*;

use boxoffice_reservations_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
