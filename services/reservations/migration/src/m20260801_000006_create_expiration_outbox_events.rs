use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExpirationOutboxEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::ReservationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::SessionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::SeatId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::SeatReleased)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ExpirationOutboxEvents::LastError).string())
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::NextAttemptAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::ProcessedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(ExpirationOutboxEvents::FailedAt)
                            .timestamp_with_time_zone(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ExpirationOutboxEvents::Table)
                    .col(ExpirationOutboxEvents::ProcessedAt)
                    .col(ExpirationOutboxEvents::NextAttemptAt)
                    .name("idx_expiration_outbox_processed_next_attempt")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ExpirationOutboxEvents::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum ExpirationOutboxEvents {
    Table,
    Id,
    ReservationId,
    SessionId,
    SeatId,
    SeatReleased,
    Attempts,
    LastError,
    CreatedAt,
    NextAttemptAt,
    ProcessedAt,
    FailedAt,
}
