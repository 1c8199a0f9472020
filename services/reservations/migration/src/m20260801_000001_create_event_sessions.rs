use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventSessions::Name).string().not_null())
                    .col(ColumnDef::new(EventSessions::Status).string().not_null())
                    .col(
                        ColumnDef::new(EventSessions::TicketPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventSessions::MinSeats)
                            .integer()
                            .not_null()
                            .default(16),
                    )
                    .col(
                        ColumnDef::new(EventSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventSessions {
    Table,
    Id,
    Name,
    Status,
    TicketPrice,
    MinSeats,
    CreatedAt,
    UpdatedAt,
}
