use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Seats::SessionId).uuid().not_null())
                    .col(ColumnDef::new(Seats::Label).string().not_null())
                    .col(ColumnDef::new(Seats::Status).string().not_null())
                    .col(
                        ColumnDef::new(Seats::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Seats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Seats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One label per session.
        manager
            .create_index(
                Index::create()
                    .table(Seats::Table)
                    .col(Seats::SessionId)
                    .col(Seats::Label)
                    .unique()
                    .name("uq_seats_session_id_label")
                    .to_owned(),
            )
            .await?;

        // Seat-map listing and provisioned-seat counts filter by session + status.
        manager
            .create_index(
                Index::create()
                    .table(Seats::Table)
                    .col(Seats::SessionId)
                    .col(Seats::Status)
                    .name("idx_seats_session_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Seats::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Seats {
    Table,
    Id,
    SessionId,
    Label,
    Status,
    Version,
    CreatedAt,
    UpdatedAt,
}
