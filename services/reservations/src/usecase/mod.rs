pub mod cancel;
pub mod cleanup;
pub mod confirm_sale;
pub mod expire;
pub mod idempotency;
pub mod provision;
pub mod relay;
pub mod reserve;
pub mod seats;
