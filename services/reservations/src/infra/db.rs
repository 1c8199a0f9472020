use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr, TransactionError, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use boxoffice_domain::pagination::PageRequest;
use boxoffice_domain::reservation::ReservationStatus;
use boxoffice_domain::seat::SeatStatus;
use boxoffice_domain::session::SessionStatus;

use boxoffice_reservations_schema::{
    event_sessions, expiration_outbox_events, outbox_events, reservations, sales, seats,
};

use crate::domain::repository::{
    ExpirationOutboxRepository, OutboxRepository, ReservationRepository, SaleRepository,
    SeatRepository, SessionProvider,
};
use crate::domain::types::{
    EVENT_PAYMENT_CONFIRMED, EVENT_RESERVATION_CREATED, EVENT_SEAT_RELEASED, EventSession,
    ExpirationOutboxEvent, ExpireOutcome, OutboxEvent, Reservation, ReservationBatch, Sale, Seat,
};
use crate::error::ReservationsServiceError;

/// Unwrap SeaORM's transaction error envelope: connection-level failures are
/// internal, domain errors raised inside the closure pass through.
fn map_txn_err<T>(
    result: Result<T, TransactionError<ReservationsServiceError>>,
) -> Result<T, ReservationsServiceError> {
    match result {
        Ok(value) => Ok(value),
        Err(TransactionError::Connection(e)) => Err(ReservationsServiceError::Internal(
            anyhow::Error::new(e).context("database transaction"),
        )),
        Err(TransactionError::Transaction(e)) => Err(e),
    }
}

// ── Session provider ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionProvider {
    pub db: DatabaseConnection,
}

impl SessionProvider for DbSessionProvider {
    async fn get_session(
        &self,
        id: Uuid,
    ) -> Result<Option<EventSession>, ReservationsServiceError> {
        let model = event_sessions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find session by id")?;
        model.map(session_from_model).transpose()
    }
}

fn session_from_model(
    model: event_sessions::Model,
) -> Result<EventSession, ReservationsServiceError> {
    let status = SessionStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown session status {:?}", model.status))?;
    Ok(EventSession {
        id: model.id,
        status,
        ticket_price: model.ticket_price,
        min_seats: model.min_seats,
    })
}

// ── Seat repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSeatRepository {
    pub db: DatabaseConnection,
}

impl SeatRepository for DbSeatRepository {
    async fn count_in_session(&self, session_id: Uuid) -> Result<u64, ReservationsServiceError> {
        let count = seats::Entity::find()
            .filter(seats::Column::SessionId.eq(session_id))
            .count(&self.db)
            .await
            .context("count seats in session")?;
        Ok(count)
    }

    async fn list_in_session(
        &self,
        session_id: Uuid,
        status: Option<SeatStatus>,
        page: PageRequest,
    ) -> Result<Vec<Seat>, ReservationsServiceError> {
        let mut query = seats::Entity::find().filter(seats::Column::SessionId.eq(session_id));
        if let Some(status) = status {
            query = query.filter(seats::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_asc(seats::Column::Label)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list seats in session")?;
        models.into_iter().map(seat_from_model).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Seat>, ReservationsServiceError> {
        let model = seats::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find seat by id")?;
        model.map(seat_from_model).transpose()
    }

    async fn provision(
        &self,
        session_id: Uuid,
        labels: &[String],
    ) -> Result<Vec<Seat>, ReservationsServiceError> {
        let labels = labels.to_vec();
        let result = self
            .db
            .transaction::<_, Vec<Seat>, ReservationsServiceError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let mut created = Vec::with_capacity(labels.len());
                    for label in &labels {
                        let seat = Seat {
                            id: Uuid::now_v7(),
                            session_id,
                            label: label.clone(),
                            status: SeatStatus::Available,
                            version: 0,
                            created_at: now,
                            updated_at: now,
                        };
                        seats::ActiveModel {
                            id: Set(seat.id),
                            session_id: Set(seat.session_id),
                            label: Set(seat.label.clone()),
                            status: Set(seat.status.as_str().to_owned()),
                            version: Set(seat.version),
                            created_at: Set(seat.created_at),
                            updated_at: Set(seat.updated_at),
                        }
                        .insert(txn)
                        .await
                        .map_err(|e| match e.sql_err() {
                            Some(SqlErr::UniqueConstraintViolation(_)) => {
                                ReservationsServiceError::DuplicateSeatLabel
                            }
                            _ => ReservationsServiceError::Internal(
                                anyhow::Error::new(e).context("insert seat"),
                            ),
                        })?;
                        created.push(seat);
                    }
                    Ok(created)
                })
            })
            .await;
        map_txn_err(result)
    }

    async fn transition(
        &self,
        seat_id: Uuid,
        from: SeatStatus,
        to: SeatStatus,
    ) -> Result<bool, ReservationsServiceError> {
        let result = seats::Entity::update_many()
            .col_expr(seats::Column::Status, Expr::value(to.as_str()))
            .col_expr(
                seats::Column::Version,
                Expr::col(seats::Column::Version).add(1),
            )
            .col_expr(seats::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(seats::Column::Id.eq(seat_id))
            .filter(seats::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .context("transition seat status")?;
        Ok(result.rows_affected > 0)
    }
}

fn seat_from_model(model: seats::Model) -> Result<Seat, ReservationsServiceError> {
    let status = SeatStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown seat status {:?}", model.status))?;
    Ok(Seat {
        id: model.id,
        session_id: model.session_id,
        label: model.label,
        status,
        version: model.version,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Reservation repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReservationRepository {
    pub db: DatabaseConnection,
}

impl ReservationRepository for DbReservationRepository {
    async fn reserve_seats(
        &self,
        batch: &ReservationBatch,
    ) -> Result<Vec<Reservation>, ReservationsServiceError> {
        let batch = batch.clone();
        let result = self
            .db
            .transaction::<_, Vec<Reservation>, ReservationsServiceError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let mut created = Vec::with_capacity(batch.seat_ids.len());
                    // Seats arrive in canonical order; claiming in that order
                    // keeps concurrent batches deadlock-free.
                    for seat_id in &batch.seat_ids {
                        let claimed = seats::Entity::update_many()
                            .col_expr(
                                seats::Column::Status,
                                Expr::value(SeatStatus::Reserved.as_str()),
                            )
                            .col_expr(
                                seats::Column::Version,
                                Expr::col(seats::Column::Version).add(1),
                            )
                            .col_expr(seats::Column::UpdatedAt, Expr::value(now))
                            .filter(seats::Column::Id.eq(*seat_id))
                            .filter(seats::Column::SessionId.eq(batch.session_id))
                            .filter(seats::Column::Status.eq(SeatStatus::Available.as_str()))
                            .exec(txn)
                            .await
                            .context("claim seat")?;
                        // Affected-row count is the success signal; zero means
                        // the seat was not available. Abort rolls back every
                        // claim made so far in this batch.
                        if claimed.rows_affected == 0 {
                            return Err(ReservationsServiceError::SeatConflict(*seat_id));
                        }

                        let reservation = Reservation {
                            id: Uuid::now_v7(),
                            session_id: batch.session_id,
                            seat_id: *seat_id,
                            user_id: batch.user_id,
                            status: ReservationStatus::Pending,
                            expires_at: batch.expires_at,
                            created_at: now,
                            updated_at: now,
                        };
                        insert_reservation(txn, &reservation).await.map_err(|e| {
                            match e.sql_err() {
                                // The partial unique pending index fired — a
                                // race the conditional claim missed.
                                Some(SqlErr::UniqueConstraintViolation(_)) => {
                                    ReservationsServiceError::SeatConflict(*seat_id)
                                }
                                _ => ReservationsServiceError::Internal(
                                    anyhow::Error::new(e).context("insert reservation"),
                                ),
                            }
                        })?;

                        let payload = json!({
                            "reservationId": reservation.id,
                            "sessionId": reservation.session_id,
                            "seatId": reservation.seat_id,
                            "userId": reservation.user_id,
                            "expiresAt": reservation.expires_at,
                        });
                        insert_outbox_event(txn, EVENT_RESERVATION_CREATED, payload, now)
                            .await
                            .context("insert reservation outbox event")?;

                        created.push(reservation);
                    }
                    Ok(created)
                })
            })
            .await;
        map_txn_err(result)
    }

    async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Reservation>, ReservationsServiceError> {
        let models = reservations::Entity::find()
            .filter(reservations::Column::Status.eq(ReservationStatus::Pending.as_str()))
            .filter(reservations::Column::ExpiresAt.lte(now))
            .order_by_asc(reservations::Column::ExpiresAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("find due reservations")?;
        models.into_iter().map(reservation_from_model).collect()
    }

    async fn expire_one(
        &self,
        reservation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ExpireOutcome>, ReservationsServiceError> {
        let result = self
            .db
            .transaction::<_, Option<ExpireOutcome>, ReservationsServiceError>(move |txn| {
                Box::pin(async move {
                    // Exclusive lock serializes this against a concurrent sale
                    // confirmation on the same reservation.
                    let Some(row) = reservations::Entity::find_by_id(reservation_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock reservation for expiry")?
                    else {
                        return Ok(None);
                    };
                    // Time has passed since the select; re-validate.
                    if row.status != ReservationStatus::Pending.as_str() {
                        return Ok(None);
                    }

                    reservations::ActiveModel {
                        id: Set(row.id),
                        status: Set(ReservationStatus::Expired.as_str().to_owned()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .context("mark reservation expired")?;

                    // Release only a seat that is still reserved; a seat the
                    // sale engine already moved to sold stays sold.
                    let released = seats::Entity::update_many()
                        .col_expr(
                            seats::Column::Status,
                            Expr::value(SeatStatus::Available.as_str()),
                        )
                        .col_expr(
                            seats::Column::Version,
                            Expr::col(seats::Column::Version).add(1),
                        )
                        .col_expr(seats::Column::UpdatedAt, Expr::value(now))
                        .filter(seats::Column::Id.eq(row.seat_id))
                        .filter(seats::Column::Status.eq(SeatStatus::Reserved.as_str()))
                        .exec(txn)
                        .await
                        .context("release seat")?
                        .rows_affected
                        > 0;

                    insert_expiration_event(txn, &row, released, now)
                        .await
                        .context("insert expiration outbox event")?;

                    Ok(Some(ExpireOutcome {
                        reservation_id: row.id,
                        seat_id: row.seat_id,
                        seat_released: released,
                    }))
                })
            })
            .await;
        map_txn_err(result)
    }

    async fn cancel(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ReservationsServiceError> {
        let result = self
            .db
            .transaction::<_, (), ReservationsServiceError>(move |txn| {
                Box::pin(async move {
                    let row = reservations::Entity::find_by_id(reservation_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock reservation for cancel")?
                        .ok_or(ReservationsServiceError::ReservationNotFound)?;
                    let reservation = reservation_from_model(row)?;
                    reservation.ensure_cancellable(user_id)?;

                    let now = Utc::now();
                    reservations::ActiveModel {
                        id: Set(reservation.id),
                        status: Set(ReservationStatus::Cancelled.as_str().to_owned()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .context("mark reservation cancelled")?;

                    let released = seats::Entity::update_many()
                        .col_expr(
                            seats::Column::Status,
                            Expr::value(SeatStatus::Available.as_str()),
                        )
                        .col_expr(
                            seats::Column::Version,
                            Expr::col(seats::Column::Version).add(1),
                        )
                        .col_expr(seats::Column::UpdatedAt, Expr::value(now))
                        .filter(seats::Column::Id.eq(reservation.seat_id))
                        .filter(seats::Column::Status.eq(SeatStatus::Reserved.as_str()))
                        .exec(txn)
                        .await
                        .context("release cancelled seat")?
                        .rows_affected
                        > 0;

                    if released {
                        let payload = json!({
                            "seatId": reservation.seat_id,
                            "sessionId": reservation.session_id,
                        });
                        insert_outbox_event(txn, EVENT_SEAT_RELEASED, payload, now)
                            .await
                            .context("insert seat released outbox event")?;
                    }
                    Ok(())
                })
            })
            .await;
        map_txn_err(result)
    }
}

fn reservation_from_model(
    model: reservations::Model,
) -> Result<Reservation, ReservationsServiceError> {
    let status = ReservationStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown reservation status {:?}", model.status))?;
    Ok(Reservation {
        id: model.id,
        session_id: model.session_id,
        seat_id: model.seat_id,
        user_id: model.user_id,
        status,
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

async fn insert_reservation(
    txn: &DatabaseTransaction,
    reservation: &Reservation,
) -> Result<(), DbErr> {
    reservations::ActiveModel {
        id: Set(reservation.id),
        session_id: Set(reservation.session_id),
        seat_id: Set(reservation.seat_id),
        user_id: Set(reservation.user_id),
        status: Set(reservation.status.as_str().to_owned()),
        expires_at: Set(reservation.expires_at),
        created_at: Set(reservation.created_at),
        updated_at: Set(reservation.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    kind: &str,
    payload: serde_json::Value,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    outbox_events::ActiveModel {
        id: Set(Uuid::now_v7()),
        kind: Set(kind.to_owned()),
        payload: Set(payload),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(None),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_expiration_event(
    txn: &DatabaseTransaction,
    reservation: &reservations::Model,
    seat_released: bool,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    expiration_outbox_events::ActiveModel {
        id: Set(Uuid::now_v7()),
        reservation_id: Set(reservation.id),
        session_id: Set(reservation.session_id),
        seat_id: Set(reservation.seat_id),
        seat_released: Set(seat_released),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(None),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

// ── Sale repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSaleRepository {
    pub db: DatabaseConnection,
}

impl SaleRepository for DbSaleRepository {
    async fn confirm_sale(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Sale, ReservationsServiceError> {
        let result = self
            .db
            .transaction::<_, Sale, ReservationsServiceError>(move |txn| {
                Box::pin(async move {
                    // Exclusive lock on the reservation row: either we run
                    // before the sweeper (it then skips the now-confirmed row)
                    // or after it (the status check below fails as expired).
                    let row = reservations::Entity::find_by_id(reservation_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock reservation for sale")?
                        .ok_or(ReservationsServiceError::ReservationNotFound)?;
                    let reservation = reservation_from_model(row)?;
                    reservation.ensure_confirmable(user_id, now)?;

                    let seat_row = seats::Entity::find_by_id(reservation.seat_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock seat for sale")?
                        .ok_or_else(|| anyhow::anyhow!("seat row missing for pending reservation"))?;
                    // A pending reservation's seat must be exactly reserved;
                    // anything else is an invariant violation.
                    if seat_row.status != SeatStatus::Reserved.as_str() {
                        return Err(ReservationsServiceError::SeatNotReserved);
                    }

                    let session = event_sessions::Entity::find_by_id(reservation.session_id)
                        .one(txn)
                        .await
                        .context("load session for sale")?
                        .ok_or_else(|| anyhow::anyhow!("session row missing for reservation"))?;

                    reservations::ActiveModel {
                        id: Set(reservation.id),
                        status: Set(ReservationStatus::Confirmed.as_str().to_owned()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .context("mark reservation confirmed")?;

                    seats::ActiveModel {
                        id: Set(seat_row.id),
                        status: Set(SeatStatus::Sold.as_str().to_owned()),
                        version: Set(seat_row.version + 1),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .context("mark seat sold")?;

                    let sale = Sale {
                        id: Uuid::now_v7(),
                        reservation_id: reservation.id,
                        session_id: reservation.session_id,
                        seat_id: reservation.seat_id,
                        user_id: reservation.user_id,
                        amount: session.ticket_price,
                        created_at: now,
                    };
                    sales::ActiveModel {
                        id: Set(sale.id),
                        reservation_id: Set(sale.reservation_id),
                        session_id: Set(sale.session_id),
                        seat_id: Set(sale.seat_id),
                        user_id: Set(sale.user_id),
                        amount: Set(sale.amount),
                        created_at: Set(sale.created_at),
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| match e.sql_err() {
                        // unique (seat_id, session_id): the seat is already
                        // sold — the storage layer's no-double-sale guarantee.
                        Some(SqlErr::UniqueConstraintViolation(_)) => {
                            ReservationsServiceError::SeatConflict(sale.seat_id)
                        }
                        _ => ReservationsServiceError::Internal(
                            anyhow::Error::new(e).context("insert sale"),
                        ),
                    })?;

                    let payload = json!({
                        "saleId": sale.id,
                        "reservationId": sale.reservation_id,
                        "sessionId": sale.session_id,
                        "seatId": sale.seat_id,
                        "userId": sale.user_id,
                        "amount": sale.amount,
                    });
                    insert_outbox_event(txn, EVENT_PAYMENT_CONFIRMED, payload, now)
                        .await
                        .context("insert payment outbox event")?;

                    Ok(sale)
                })
            })
            .await;
        map_txn_err(result)
    }
}

// ── Outbox repositories ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxRepository {
    pub db: DatabaseConnection,
}

impl OutboxRepository for DbOutboxRepository {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<OutboxEvent>, ReservationsServiceError> {
        let models = outbox_events::Entity::find()
            .filter(outbox_events::Column::ProcessedAt.is_null())
            .filter(outbox_events::Column::FailedAt.is_null())
            .filter(
                Condition::any()
                    .add(outbox_events::Column::NextAttemptAt.is_null())
                    .add(outbox_events::Column::NextAttemptAt.lte(now)),
            )
            .order_by_asc(outbox_events::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("fetch due outbox events")?;
        Ok(models.into_iter().map(outbox_from_model).collect())
    }

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        outbox_events::ActiveModel {
            id: Set(id),
            processed_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark outbox event published")?;
        Ok(())
    }

    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        let mut row = outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            next_attempt_at: Set(next_attempt_at),
            ..Default::default()
        };
        if next_attempt_at.is_none() {
            row.failed_at = Set(Some(now));
        }
        row.update(&self.db)
            .await
            .context("record outbox publish failure")?;
        Ok(())
    }

    async fn delete_published_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationsServiceError> {
        let result = outbox_events::Entity::delete_many()
            .filter(outbox_events::Column::ProcessedAt.is_not_null())
            .filter(outbox_events::Column::ProcessedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("delete published outbox events")?;
        Ok(result.rows_affected)
    }
}

fn outbox_from_model(model: outbox_events::Model) -> OutboxEvent {
    OutboxEvent {
        id: model.id,
        kind: model.kind,
        payload: model.payload,
        attempts: model.attempts,
        last_error: model.last_error,
        created_at: model.created_at,
        next_attempt_at: model.next_attempt_at,
        processed_at: model.processed_at,
        failed_at: model.failed_at,
    }
}

#[derive(Clone)]
pub struct DbExpirationOutboxRepository {
    pub db: DatabaseConnection,
}

impl ExpirationOutboxRepository for DbExpirationOutboxRepository {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<ExpirationOutboxEvent>, ReservationsServiceError> {
        let models = expiration_outbox_events::Entity::find()
            .filter(expiration_outbox_events::Column::ProcessedAt.is_null())
            .filter(expiration_outbox_events::Column::FailedAt.is_null())
            .filter(
                Condition::any()
                    .add(expiration_outbox_events::Column::NextAttemptAt.is_null())
                    .add(expiration_outbox_events::Column::NextAttemptAt.lte(now)),
            )
            .order_by_asc(expiration_outbox_events::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("fetch due expiration outbox events")?;
        Ok(models.into_iter().map(expiration_from_model).collect())
    }

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        expiration_outbox_events::ActiveModel {
            id: Set(id),
            processed_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark expiration outbox event published")?;
        Ok(())
    }

    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        let mut row = expiration_outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            next_attempt_at: Set(next_attempt_at),
            ..Default::default()
        };
        if next_attempt_at.is_none() {
            row.failed_at = Set(Some(now));
        }
        row.update(&self.db)
            .await
            .context("record expiration outbox publish failure")?;
        Ok(())
    }

    async fn delete_published_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationsServiceError> {
        let result = expiration_outbox_events::Entity::delete_many()
            .filter(expiration_outbox_events::Column::ProcessedAt.is_not_null())
            .filter(expiration_outbox_events::Column::ProcessedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("delete published expiration outbox events")?;
        Ok(result.rows_affected)
    }
}

fn expiration_from_model(model: expiration_outbox_events::Model) -> ExpirationOutboxEvent {
    ExpirationOutboxEvent {
        id: model.id,
        reservation_id: model.reservation_id,
        session_id: model.session_id,
        seat_id: model.seat_id,
        seat_released: model.seat_released,
        attempts: model.attempts,
        last_error: model.last_error,
        created_at: model.created_at,
        next_attempt_at: model.next_attempt_at,
        processed_at: model.processed_at,
        failed_at: model.failed_at,
    }
}
