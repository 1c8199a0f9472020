use sea_orm_migration::prelude::*;

mod m20260801_000001_create_event_sessions;
mod m20260801_000002_create_seats;
mod m20260801_000003_create_reservations;
mod m20260801_000004_create_sales;
mod m20260801_000005_create_outbox_events;
mod m20260801_000006_create_expiration_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_event_sessions::Migration),
            Box::new(m20260801_000002_create_seats::Migration),
            Box::new(m20260801_000003_create_reservations::Migration),
            Box::new(m20260801_000004_create_sales::Migration),
            Box::new(m20260801_000005_create_outbox_events::Migration),
            Box::new(m20260801_000006_create_expiration_outbox_events::Migration),
        ]
    }
}
