use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Sales::ReservationId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sales::SessionId).uuid().not_null())
                    .col(ColumnDef::new(Sales::SeatId).uuid().not_null())
                    .col(ColumnDef::new(Sales::UserId).uuid().not_null())
                    .col(ColumnDef::new(Sales::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Sales::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_reservation_id")
                            .from(Sales::Table, Sales::ReservationId)
                            .to(Reservations::Table, Reservations::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // A seat is sold at most once per session.
        manager
            .create_index(
                Index::create()
                    .table(Sales::Table)
                    .col(Sales::SeatId)
                    .col(Sales::SessionId)
                    .unique()
                    .name("uq_sales_seat_id_session_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    ReservationId,
    SessionId,
    SeatId,
    UserId,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum Reservations {
    Table,
    Id,
}
