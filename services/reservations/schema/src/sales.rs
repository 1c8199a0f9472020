use sea_orm::entity::prelude::*;

/// Durable record that a seat was paid for. Immutable once written.
///
/// Unique (seat_id, session_id) — a seat is sold at most once per session.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub reservation_id: Uuid,
    pub session_id: Uuid,
    pub seat_id: Uuid,
    pub user_id: Uuid,
    /// Amount paid in minor currency units.
    pub amount: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
