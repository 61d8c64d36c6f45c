pub mod api;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod outbox;
pub mod payments;
pub mod schema;
pub mod store;
