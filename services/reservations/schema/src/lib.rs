//! SeaORM entities for the reservations service.

pub mod event_sessions;
pub mod expiration_outbox_events;
pub mod outbox_events;
pub mod reservations;
pub mod sales;
pub mod seats;
